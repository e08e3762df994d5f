// Copyright 2019-2023 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use ahash::AHashMap;
use cid::Cid;
use fvm_shared::{address::Address, clock::ChainEpoch, sector::StoragePower};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StateError {
    #[error("State root not found: {0}")]
    RootNotFound(Cid),
    #[error("State lookup failed: {0}")]
    Lookup(String),
}

/// A miner's claimed power next to the network total, read at one state
/// root. Snapshots are ephemeral: they are recomputed per evaluation and
/// never reused across state roots.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PowerFraction {
    pub miner_power: StoragePower,
    pub network_power: StoragePower,
}

/// A miner's fault status at one state root. A faulted miner is excluded
/// from leader election regardless of its power.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FaultInfo {
    pub is_faulty: bool,
    pub fault_epoch: Option<ChainEpoch>,
}

/// Read-only access to miner power at a given state root. `Ok(None)` means
/// the miner has no power entry, which callers treat as zero power rather
/// than an error.
pub trait PowerStateView {
    fn miner_power(&self, root: &Cid, miner: &Address)
        -> Result<Option<PowerFraction>, StateError>;
}

/// Read-only access to miner fault records at a given state root.
/// `Ok(None)` means no fault record exists for the miner.
pub trait FaultStateView {
    fn miner_fault_status(
        &self,
        root: &Cid,
        miner: &Address,
        epoch: ChainEpoch,
    ) -> Result<Option<FaultInfo>, StateError>;
}

impl<'a, T: PowerStateView + ?Sized> PowerStateView for &'a T {
    fn miner_power(
        &self,
        root: &Cid,
        miner: &Address,
    ) -> Result<Option<PowerFraction>, StateError> {
        (**self).miner_power(root, miner)
    }
}

impl<'a, T: FaultStateView + ?Sized> FaultStateView for &'a T {
    fn miner_fault_status(
        &self,
        root: &Cid,
        miner: &Address,
        epoch: ChainEpoch,
    ) -> Result<Option<FaultInfo>, StateError> {
        (**self).miner_fault_status(root, miner, epoch)
    }
}

impl<T: PowerStateView + ?Sized> PowerStateView for std::sync::Arc<T> {
    fn miner_power(
        &self,
        root: &Cid,
        miner: &Address,
    ) -> Result<Option<PowerFraction>, StateError> {
        (**self).miner_power(root, miner)
    }
}

impl<T: FaultStateView + ?Sized> FaultStateView for std::sync::Arc<T> {
    fn miner_fault_status(
        &self,
        root: &Cid,
        miner: &Address,
        epoch: ChainEpoch,
    ) -> Result<Option<FaultInfo>, StateError> {
        (**self).miner_fault_status(root, miner, epoch)
    }
}

/// In-memory state view implementing both read traits. Deterministic
/// substitute for the state-tree-backed views in tests and tooling; always
/// injected explicitly, never resolved from ambient state.
#[derive(Default)]
pub struct MemoryStateView {
    power: AHashMap<(Cid, Address), PowerFraction>,
    faults: AHashMap<(Cid, Address), FaultInfo>,
}

impl MemoryStateView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_power(
        &mut self,
        root: Cid,
        miner: Address,
        miner_power: impl Into<StoragePower>,
        network_power: impl Into<StoragePower>,
    ) {
        self.power.insert(
            (root, miner),
            PowerFraction {
                miner_power: miner_power.into(),
                network_power: network_power.into(),
            },
        );
    }

    pub fn set_fault(&mut self, root: Cid, miner: Address, fault_epoch: ChainEpoch) {
        self.faults.insert(
            (root, miner),
            FaultInfo {
                is_faulty: true,
                fault_epoch: Some(fault_epoch),
            },
        );
    }
}

impl PowerStateView for MemoryStateView {
    fn miner_power(
        &self,
        root: &Cid,
        miner: &Address,
    ) -> Result<Option<PowerFraction>, StateError> {
        Ok(self.power.get(&(*root, *miner)).cloned())
    }
}

impl FaultStateView for MemoryStateView {
    fn miner_fault_status(
        &self,
        root: &Cid,
        miner: &Address,
        _epoch: ChainEpoch,
    ) -> Result<Option<FaultInfo>, StateError> {
        Ok(self.faults.get(&(*root, *miner)).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::cid::CidCborExt;

    #[test]
    fn absent_records_read_as_none() {
        let view = MemoryStateView::new();
        let root = Cid::from_cbor_blake2b256(&"root").unwrap();
        let miner = Address::new_id(1000);

        assert_eq!(view.miner_power(&root, &miner).unwrap(), None);
        assert_eq!(view.miner_fault_status(&root, &miner, 5).unwrap(), None);
    }

    #[test]
    fn snapshots_are_keyed_by_root() {
        let mut view = MemoryStateView::new();
        let root_a = Cid::from_cbor_blake2b256(&"a").unwrap();
        let root_b = Cid::from_cbor_blake2b256(&"b").unwrap();
        let miner = Address::new_id(1000);

        view.set_power(root_a, miner, 5, 100);

        assert!(view.miner_power(&root_a, &miner).unwrap().is_some());
        assert_eq!(view.miner_power(&root_b, &miner).unwrap(), None);
    }
}
