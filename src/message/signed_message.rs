// Copyright 2019-2023 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use crate::utils::cid::CidCborExt;
use fvm_ipld_encoding::tuple::*;
use fvm_ipld_encoding::to_vec;
use fvm_shared::crypto::signature::{Signature, SignatureType};
use fvm_shared::message::Message;

/// Represents a wrapped message with signature bytes.
#[derive(PartialEq, Clone, Debug, Serialize_tuple, Deserialize_tuple, Hash, Eq)]
pub struct SignedMessage {
    pub message: Message,
    pub signature: Signature,
}

impl SignedMessage {
    /// Generate a new signed message from fields. The signature is carried
    /// as-is; authenticating it belongs to the signature collaborator.
    pub fn new_unchecked(message: Message, signature: Signature) -> SignedMessage {
        SignedMessage { message, signature }
    }

    /// Returns reference to the unsigned message.
    pub fn message(&self) -> &Message {
        &self.message
    }

    /// Returns signature of the signed message.
    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    /// Consumes self and returns its unsigned message.
    pub fn into_message(self) -> Message {
        self.message
    }

    /// Checks if the signed message is a BLS message.
    pub fn is_bls(&self) -> bool {
        self.signature.signature_type() == SignatureType::BLS
    }

    /// Checks if the signed message is a SECP message.
    pub fn is_secp256k1(&self) -> bool {
        self.signature.signature_type() == SignatureType::Secp256k1
    }

    /// Identifier of the chain message. For BLS messages the signature is
    /// aggregated out of band, so the identifier covers the bare message;
    /// for SECP messages it covers the signed envelope.
    pub fn cid(&self) -> cid::Cid {
        if self.is_bls() {
            cid::Cid::from_cbor_blake2b256(&self.message)
        } else {
            cid::Cid::from_cbor_blake2b256(self)
        }
        .expect("message serialization is infallible")
    }

    /// Returns the length of the chain message in bytes.
    pub fn chain_length(&self) -> anyhow::Result<usize> {
        let serialized = if self.is_bls() {
            // BLS chain message length doesn't include the signature
            to_vec(&self.message)?
        } else {
            to_vec(&self)?
        };
        Ok(serialized.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fvm_shared::address::Address;

    fn message() -> Message {
        Message {
            to: Address::new_id(1),
            from: Address::new_id(2),
            ..Message::default()
        }
    }

    #[test]
    fn chain_length_excludes_bls_signature() {
        let bls_sig = Signature::new_bls(vec![0; 96]);
        let signed = SignedMessage::new_unchecked(message(), bls_sig);
        assert_eq!(
            signed.chain_length().unwrap(),
            to_vec(&message()).unwrap().len()
        );

        let secp_sig = Signature::new_secp256k1(vec![0; 65]);
        let signed = SignedMessage::new_unchecked(message(), secp_sig);
        assert_eq!(
            signed.chain_length().unwrap(),
            to_vec(&signed).unwrap().len()
        );
    }

    #[test]
    fn cid_depends_on_signature_type() {
        let bls = SignedMessage::new_unchecked(message(), Signature::new_bls(vec![0; 96]));
        let secp = SignedMessage::new_unchecked(message(), Signature::new_secp256k1(vec![0; 65]));
        assert_eq!(bls.cid(), cid::Cid::from_cbor_blake2b256(&message()).unwrap());
        assert_ne!(bls.cid(), secp.cid());
    }
}
