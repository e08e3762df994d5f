// Copyright 2019-2023 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use crate::beacon::{Beacon, BeaconEntry, BeaconError};
use crate::utils::encoding::blake2b_256;
use async_trait::async_trait;
use byteorder::{BigEndian, ByteOrder};
use fvm_shared::clock::ChainEpoch;

/// Mock beacon for tests and local devnets. Entries are a deterministic
/// function of the round number, so every node derives the same schedule.
#[derive(Default)]
pub struct MockBeacon {}

impl MockBeacon {
    fn entry_for_index(index: u64) -> BeaconEntry {
        let mut buf = [0; 8];
        BigEndian::write_u64(&mut buf, index);
        let rval = blake2b_256(&buf);
        BeaconEntry::new(index, rval.to_vec())
    }
}

#[async_trait]
impl Beacon for MockBeacon {
    async fn verify_entry(
        &self,
        curr: &BeaconEntry,
        _prev: &BeaconEntry,
    ) -> Result<bool, BeaconError> {
        let oe = Self::entry_for_index(curr.round());
        Ok(oe.data() == curr.data())
    }

    async fn entry(&self, round: u64) -> Result<BeaconEntry, BeaconError> {
        Ok(Self::entry_for_index(round))
    }

    fn max_beacon_round_for_epoch(&self, epoch: ChainEpoch) -> u64 {
        epoch as u64
    }
}
