// Copyright 2019-2023 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use ahash::AHashMap;
use bls_signatures::{PrivateKey as BlsPrivate, Serialize as BlsSerialize};
use fvm_shared::{address::Address, crypto::signature::Signature};
use rand::{CryptoRng, RngCore};

/// Signer is a trait which allows a key implementation to sign data for an
/// address. Production implementations may reach a secure enclave or a
/// remote signer; failures surface to the caller unchanged.
pub trait Signer {
    /// Function signs any arbitrary data given the [`Address`].
    fn sign_bytes(&self, data: &[u8], address: &Address) -> Result<Signature, anyhow::Error>;
}

/// In-memory BLS keystore implementing [`Signer`]. Used by tests and local
/// mining setups; keys never leave the process.
#[derive(Default)]
pub struct MemorySigner {
    keys: AHashMap<Address, BlsPrivate>,
}

impl MemorySigner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Generates a fresh BLS worker key and returns its address.
    pub fn register(&mut self, rng: &mut (impl RngCore + CryptoRng)) -> anyhow::Result<Address> {
        let key = BlsPrivate::generate(rng);
        let address = Address::new_bls(&key.public_key().as_bytes())?;
        self.keys.insert(address, key);
        Ok(address)
    }
}

impl Signer for MemorySigner {
    fn sign_bytes(&self, data: &[u8], address: &Address) -> Result<Signature, anyhow::Error> {
        let key = self
            .keys
            .get(address)
            .ok_or_else(|| anyhow::anyhow!("no private key for address {}", address))?;
        let sig = key.sign(data);
        Ok(Signature::new_bls(sig.as_bytes()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn sign_requires_registered_key() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let mut signer = MemorySigner::new();
        let addr = signer.register(&mut rng).unwrap();

        assert!(signer.sign_bytes(b"payload", &addr).is_ok());

        let stranger = Address::new_id(42);
        assert!(signer.sign_bytes(b"payload", &stranger).is_err());
    }
}
