// Copyright 2019-2023 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

mod sampler;

pub use sampler::{ChainRandomness, ChainSampler, MemoryTipsetLoader, TipsetLoader};

use crate::crypto::DomainSeparationTag;
use crate::utils::encoding::blake2b_256;
use blake2b_simd::Params;
use byteorder::{BigEndian, WriteBytesExt};
use fvm_shared::clock::ChainEpoch;
use std::io::Write;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ChainError {
    #[error("Tipset not found for key {0}")]
    TipsetNotFound(String),
    #[error("Tipset has no ticket to draw randomness from")]
    TipsetWithoutTicket,
    #[error("No beacon entry available for epoch {0}")]
    BeaconUnavailable(ChainEpoch),
    #[error("Cannot draw randomness from the future: epoch {0} > tipset epoch {1}")]
    EpochInFuture(ChainEpoch, ChainEpoch),
    #[error("Drawing chain randomness failed: {0}")]
    DrawingRandomness(String),
}

/// Computes a pseudo random 32 byte array.
///
/// The digest folds the domain separation tag, the randomness base, the
/// epoch and the caller-supplied entropy through BLAKE2b-256. The output is
/// a pure function of the four inputs; it never depends on the clock, the
/// network or local state, so two honest nodes always agree on it.
pub fn draw_randomness(
    rbase: &[u8],
    pers: DomainSeparationTag,
    round: ChainEpoch,
    entropy: &[u8],
) -> anyhow::Result<[u8; 32]> {
    let mut state = Params::new().hash_length(32).to_state();
    state.write_i64::<BigEndian>(pers as i64)?;
    let vrf_digest = blake2b_256(rbase);
    state.write_all(&vrf_digest)?;
    state.write_i64::<BigEndian>(round)?;
    state.write_all(entropy)?;
    let mut ret = [0u8; 32];
    ret.clone_from_slice(state.finalize().as_bytes());
    Ok(ret)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn randomness_is_deterministic() {
        let a = draw_randomness(b"base", DomainSeparationTag::TicketProduction, 10, b"ent").unwrap();
        let b = draw_randomness(b"base", DomainSeparationTag::TicketProduction, 10, b"ent").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn randomness_format_is_pinned() {
        // Changing the digest construction is a consensus break; this
        // vector pins it.
        let rand = draw_randomness(
            b"ticket",
            DomainSeparationTag::ElectionProofProduction,
            123,
            b"entropy",
        )
        .unwrap();
        assert_eq!(
            hex::encode(rand),
            "a52de7fed915b0e11fb532af74d6804aab67f347358d7a0000f66ef58bf908f5"
        );
    }

    #[test]
    fn distinct_tags_diverge() {
        let a = draw_randomness(b"base", DomainSeparationTag::TicketProduction, 10, b"ent").unwrap();
        let b = draw_randomness(
            b"base",
            DomainSeparationTag::ElectionProofProduction,
            10,
            b"ent",
        )
        .unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn epoch_and_entropy_are_folded_in() {
        let base = draw_randomness(b"base", DomainSeparationTag::TicketProduction, 10, b"ent");
        let other_epoch = draw_randomness(b"base", DomainSeparationTag::TicketProduction, 11, b"ent");
        let other_entropy = draw_randomness(b"base", DomainSeparationTag::TicketProduction, 10, b"x");
        assert_ne!(base.unwrap(), other_epoch.unwrap());
        let base = draw_randomness(b"base", DomainSeparationTag::TicketProduction, 10, b"ent");
        assert_ne!(base.unwrap(), other_entropy.unwrap());
    }
}
