// Copyright 2019-2023 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use fvm_shared::clock::ChainEpoch;
use serde::Deserialize;

/// Protocol parameters for one chain. Every node on a network must run
/// with identical values or eligibility verdicts stop agreeing.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ChainConfig {
    /// Expected number of election winners per epoch. The eligibility
    /// threshold scales with this, so several miners may legitimately win
    /// the same epoch.
    pub expected_winners_per_epoch: u64,
    /// Number of epochs between beacon anchor points. At a period boundary
    /// tickets mix in the external beacon entry.
    pub beacon_period: ChainEpoch,
    /// How many epochs behind the ticket epoch the chain randomness for a
    /// new ticket is sampled.
    pub ticket_randomness_lookback: ChainEpoch,
    /// Upper bound on the gas limit of a single message.
    pub block_gas_limit: u64,
    /// Upper bound on messages referenced by one block.
    pub block_message_limit: usize,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            expected_winners_per_epoch: 5,
            beacon_period: 2880,
            ticket_randomness_lookback: 1,
            block_gas_limit: 10_000_000_000,
            block_message_limit: 10_000,
        }
    }
}

impl ChainConfig {
    /// True when `epoch` starts a new beacon period, meaning tickets made
    /// for it must anchor to the external beacon.
    pub fn is_new_beacon_period(&self, epoch: ChainEpoch) -> bool {
        epoch % self.beacon_period == 0
    }
}
