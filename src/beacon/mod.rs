// Copyright 2019-2023 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

mod beacon_entries;
mod mock_beacon;

pub use beacon_entries::BeaconEntry;
pub use mock_beacon::MockBeacon;

use async_trait::async_trait;
use fvm_shared::clock::ChainEpoch;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BeaconError {
    /// The beacon has no entry for the requested round. The operation that
    /// needed it must be deferred; local randomness is never substituted.
    #[error("No beacon entry available for round {0}")]
    Unavailable(u64),
    #[error("Invalid beacon schedule, no valid beacon for epoch {0}")]
    NoBeaconForEpoch(ChainEpoch),
    #[error("Beacon entry validation failed: {0}")]
    Validation(String),
}

/// Source of externally verifiable randomness, one entry per round.
/// Fetching an entry may involve a network round trip in production.
#[async_trait]
pub trait Beacon: Send + Sync {
    /// Verify a new beacon entry against the most recent one before it.
    async fn verify_entry(
        &self,
        curr: &BeaconEntry,
        prev: &BeaconEntry,
    ) -> Result<bool, BeaconError>;

    /// Returns the [`BeaconEntry`] for a round.
    async fn entry(&self, round: u64) -> Result<BeaconEntry, BeaconError>;

    /// Returns the most recent beacon round below the given chain epoch.
    fn max_beacon_round_for_epoch(&self, epoch: ChainEpoch) -> u64;
}

/// Ordered list of beacons forming a schedule over chain epochs. Later
/// entries supersede earlier ones from their start height onward.
pub struct BeaconSchedule<T>(pub Vec<BeaconPoint<T>>);

pub struct BeaconPoint<T> {
    pub height: ChainEpoch,
    pub beacon: Arc<T>,
}

impl<T> BeaconSchedule<T>
where
    T: Beacon,
{
    pub fn beacon_for_epoch(&self, epoch: ChainEpoch) -> Result<(ChainEpoch, &T), BeaconError> {
        self.0
            .iter()
            .rev()
            .find(|upgrade| epoch >= upgrade.height)
            .map(|upgrade| (upgrade.height, upgrade.beacon.as_ref()))
            .ok_or(BeaconError::NoBeaconForEpoch(epoch))
    }

    /// Fetches the beacon entry anchoring the given epoch, from whichever
    /// beacon the schedule assigns to that epoch.
    pub async fn entry_for_epoch(&self, epoch: ChainEpoch) -> Result<BeaconEntry, BeaconError> {
        let (_, beacon) = self.beacon_for_epoch(epoch)?;
        let round = beacon.max_beacon_round_for_epoch(epoch);
        beacon.entry(round).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn schedule_selects_beacon_by_height() {
        let schedule = BeaconSchedule(vec![
            BeaconPoint {
                height: 0,
                beacon: Arc::new(MockBeacon::default()),
            },
            BeaconPoint {
                height: 100,
                beacon: Arc::new(MockBeacon::default()),
            },
        ]);

        let (start, _) = schedule.beacon_for_epoch(50).unwrap();
        assert_eq!(start, 0);
        let (start, _) = schedule.beacon_for_epoch(100).unwrap();
        assert_eq!(start, 100);

        let entry = schedule.entry_for_epoch(50).await.unwrap();
        assert_eq!(entry.round(), 50);
    }

    #[tokio::test]
    async fn mock_beacon_entries_verify() {
        let beacon = MockBeacon::default();
        let prev = beacon.entry(4).await.unwrap();
        let curr = beacon.entry(5).await.unwrap();
        assert!(beacon.verify_entry(&curr, &prev).await.unwrap());

        let bogus = BeaconEntry::new(5, vec![1, 2, 3]);
        assert!(!beacon.verify_entry(&bogus, &prev).await.unwrap());
    }
}
