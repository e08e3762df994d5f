// Copyright 2019-2023 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

mod randomness;
mod signer;
mod vrf;

pub use self::randomness::DomainSeparationTag;
pub use self::signer::{MemorySigner, Signer};
pub use self::vrf::verify_vrf;

use bls_signatures::{
    verify_messages, PublicKey as BlsPubKey, Serialize as BlsSerialize, Signature as BlsSignature,
};
use fvm_shared::address::Address;

/// Returns `String` error if a bls signature is invalid.
pub(crate) fn verify_bls_sig(signature: &[u8], data: &[u8], addr: &Address) -> Result<(), String> {
    let pub_k = addr.payload_bytes();

    // generate public key object from bytes
    let pk = BlsPubKey::from_bytes(&pub_k).map_err(|e| e.to_string())?;

    // generate signature struct from bytes
    let sig = BlsSignature::from_bytes(signature).map_err(|e| e.to_string())?;

    // BLS verify hash against key
    if verify_messages(&sig, &[data], &[pk]) {
        Ok(())
    } else {
        Err(format!(
            "bls signature verification failed for addr: {}",
            addr
        ))
    }
}
