// Copyright 2019-2023 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use crate::blocks::{Tipset, TipsetKey};
use crate::chain::{draw_randomness, ChainError};
use crate::crypto::DomainSeparationTag;
use ahash::AHashMap;
use fvm_shared::clock::ChainEpoch;
use std::sync::Arc;
use tracing::debug;

/// Resolves a [`TipsetKey`] to the tipset it names. The chain store behind
/// this seam may hit disk; the sampler itself performs no I/O.
pub trait TipsetLoader {
    fn load_tipset(&self, key: &TipsetKey) -> Result<Arc<Tipset>, ChainError>;
}

/// Allows for deriving the randomness anchored at a particular tipset.
pub trait ChainRandomness {
    /// Gets 32 bytes of randomness parameterized by the
    /// [`DomainSeparationTag`], epoch and entropy, drawn from the ticket
    /// chain of the tipset named by `key`.
    fn sample_chain_randomness(
        &self,
        key: &TipsetKey,
        pers: DomainSeparationTag,
        round: ChainEpoch,
        entropy: &[u8],
    ) -> Result<[u8; 32], ChainError>;

    /// Same parameterization, but drawn from the latest beacon entry the
    /// tipset committed, for randomness that must be unpredictable even to
    /// the block's own miner.
    fn sample_randomness_from_beacon(
        &self,
        key: &TipsetKey,
        pers: DomainSeparationTag,
        round: ChainEpoch,
        entropy: &[u8],
    ) -> Result<[u8; 32], ChainError>;
}

/// Production [`ChainRandomness`] implementation over a [`TipsetLoader`].
pub struct ChainSampler<L> {
    loader: L,
}

impl<L> ChainSampler<L> {
    pub fn new(loader: L) -> Self {
        Self { loader }
    }
}

impl<L> ChainSampler<L>
where
    L: TipsetLoader,
{
    fn resolve(&self, key: &TipsetKey, round: ChainEpoch) -> Result<Arc<Tipset>, ChainError> {
        let ts = self.loader.load_tipset(key)?;
        if round > ts.epoch() {
            return Err(ChainError::EpochInFuture(round, ts.epoch()));
        }
        Ok(ts)
    }
}

impl<L> ChainRandomness for ChainSampler<L>
where
    L: TipsetLoader,
{
    fn sample_chain_randomness(
        &self,
        key: &TipsetKey,
        pers: DomainSeparationTag,
        round: ChainEpoch,
        entropy: &[u8],
    ) -> Result<[u8; 32], ChainError> {
        let ts = self.resolve(key, round)?;
        let min_ticket = ts.min_ticket().ok_or(ChainError::TipsetWithoutTicket)?;
        debug!(epoch = round, tag = pers as i64, "sampling ticket chain");

        draw_randomness(min_ticket.vrfproof.as_bytes(), pers, round, entropy)
            .map_err(|e| ChainError::DrawingRandomness(e.to_string()))
    }

    fn sample_randomness_from_beacon(
        &self,
        key: &TipsetKey,
        pers: DomainSeparationTag,
        round: ChainEpoch,
        entropy: &[u8],
    ) -> Result<[u8; 32], ChainError> {
        let ts = self.resolve(key, round)?;
        let entry = ts
            .latest_beacon_entry()
            .ok_or(ChainError::BeaconUnavailable(round))?;
        debug!(epoch = round, beacon_round = entry.round(), "sampling beacon");

        draw_randomness(entry.data(), pers, round, entropy)
            .map_err(|e| ChainError::DrawingRandomness(e.to_string()))
    }
}

/// In-memory [`TipsetLoader`] holding a fixed tipset index. Deterministic
/// stand-in for the chain store in tests and tooling.
#[derive(Default)]
pub struct MemoryTipsetLoader {
    tipsets: AHashMap<TipsetKey, Arc<Tipset>>,
}

impl MemoryTipsetLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, tipset: Tipset) -> Arc<Tipset> {
        let ts = Arc::new(tipset);
        self.tipsets.insert(ts.key().clone(), Arc::clone(&ts));
        ts
    }
}

impl TipsetLoader for MemoryTipsetLoader {
    fn load_tipset(&self, key: &TipsetKey) -> Result<Arc<Tipset>, ChainError> {
        self.tipsets
            .get(key)
            .cloned()
            .ok_or_else(|| ChainError::TipsetNotFound(key.to_string()))
    }
}

impl<L: TipsetLoader> TipsetLoader for Arc<L> {
    fn load_tipset(&self, key: &TipsetKey) -> Result<Arc<Tipset>, ChainError> {
        self.as_ref().load_tipset(key)
    }
}
