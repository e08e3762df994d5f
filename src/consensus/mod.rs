// Copyright 2019-2023 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

mod election;
mod ticket;

pub use election::{is_winning_ticket, ElectionVerifier};
pub use ticket::TicketMachine;

use crate::chain::ChainError;
use crate::state_manager::StateError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConsensusError {
    /// The ticket or its proof failed verification. The block carrying it
    /// must be rejected; this is never retried.
    #[error("Ticket was invalid: {0}")]
    InvalidTicket(String),
    /// The signing capability could not produce a VRF proof. Fatal for this
    /// attempt; a higher layer may try again next epoch.
    #[error("Could not sign ticket data: {0}")]
    Signing(String),
    /// A beacon entry was required at a period boundary but none was
    /// supplied. The operation must be deferred, never substituted.
    #[error("Beacon entry required at period boundary but unavailable")]
    BeaconUnavailable,
    #[error("Miner isn't eligible to mine")]
    MinerNotEligibleToMine,
    #[error("Drawing chain randomness failed: {0}")]
    DrawingChainRandomness(String),
    #[error("Chain error: {0}")]
    Chain(#[from] ChainError),
    #[error("State view error: {0}")]
    StateView(#[from] StateError),
    #[error("Encoding error: {0}")]
    Encoding(#[from] fvm_ipld_encoding::Error),
}
