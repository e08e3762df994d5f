// Copyright 2019-2023 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use crate::crypto::verify_bls_sig;
use fvm_shared::address::Address;

/// Verifies a raw VRF proof against the worker key. The VRF proof is a BLS
/// signature over the domain-separated randomness it was drawn for, so
/// verification is a pure function of (proof, public key, randomness).
pub fn verify_vrf(worker: &Address, vrf_base: &[u8], vrf_proof: &[u8]) -> Result<(), String> {
    verify_bls_sig(vrf_proof, vrf_base, worker).map_err(|e| format!("VRF was invalid: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::{MemorySigner, Signer};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn vrf_round_trip() {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let mut signer = MemorySigner::new();
        let worker = signer.register(&mut rng).unwrap();

        let base = b"vrf input bytes";
        let sig = signer.sign_bytes(base, &worker).unwrap();

        assert!(verify_vrf(&worker, base, sig.bytes()).is_ok());
        assert!(verify_vrf(&worker, b"different input", sig.bytes()).is_err());
    }
}
