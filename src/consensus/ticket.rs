// Copyright 2019-2023 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use crate::beacon::BeaconEntry;
use crate::blocks::{Ticket, TipsetKey, VRFProof};
use crate::chain::{draw_randomness, ChainRandomness};
use crate::consensus::ConsensusError;
use crate::crypto::{verify_vrf, DomainSeparationTag, Signer};
use crate::networks::ChainConfig;
use fvm_shared::{address::Address, clock::ChainEpoch};
use tracing::debug;

/// Produces and verifies per-epoch VRF tickets.
///
/// Each ticket's VRF input folds in the parent tipset's resolved ticket
/// digest, so the ticket sequence forms a hash chain: the resulting
/// randomness is unpredictable until the parent is revealed, yet fully
/// verifiable after the fact. At beacon period boundaries the input is
/// re-anchored to the external beacon entry instead, which stops a miner
/// from retroactively growing a favorable self-only ticket chain.
pub struct TicketMachine<R> {
    sampler: R,
    lookback: ChainEpoch,
}

impl<R> TicketMachine<R>
where
    R: ChainRandomness,
{
    pub fn new(sampler: R, config: &ChainConfig) -> Self {
        Self {
            sampler,
            lookback: config.ticket_randomness_lookback,
        }
    }

    /// Creates a new ticket for the given epoch, chained to the parent
    /// tipset, signed with the worker key.
    #[allow(clippy::too_many_arguments)]
    pub fn make_ticket(
        &self,
        base: &TipsetKey,
        epoch: ChainEpoch,
        miner: &Address,
        entry: Option<&BeaconEntry>,
        is_new_period: bool,
        worker: &Address,
        signer: &impl Signer,
    ) -> Result<Ticket, ConsensusError> {
        let vrf_base = self.ticket_vrf_randomness(base, entry, is_new_period, epoch, miner)?;
        let sig = signer
            .sign_bytes(&vrf_base, worker)
            .map_err(|e| ConsensusError::Signing(e.to_string()))?;
        debug!(%miner, epoch, "produced ticket");
        Ok(Ticket::new(VRFProof::new(sig.bytes().to_vec())))
    }

    /// Checks that a ticket was correctly generated by the miner's worker
    /// key for the given epoch and parent tipset. Success is binary: there
    /// is no partial validation.
    #[allow(clippy::too_many_arguments)]
    pub fn is_valid_ticket(
        &self,
        base: &TipsetKey,
        entry: Option<&BeaconEntry>,
        is_new_period: bool,
        epoch: ChainEpoch,
        miner: &Address,
        worker: &Address,
        ticket: &Ticket,
    ) -> Result<(), ConsensusError> {
        if ticket.vrfproof.as_bytes().is_empty() {
            return Err(ConsensusError::InvalidTicket(
                "ticket has empty VRF proof".to_string(),
            ));
        }
        let vrf_base = self.ticket_vrf_randomness(base, entry, is_new_period, epoch, miner)?;
        verify_vrf(worker, &vrf_base, ticket.vrfproof.as_bytes())
            .map_err(ConsensusError::InvalidTicket)
    }

    /// The deterministic VRF input for a ticket: domain-separated digest
    /// over the parent chain (or the beacon entry at period boundaries),
    /// the lookback epoch and the miner address.
    fn ticket_vrf_randomness(
        &self,
        base: &TipsetKey,
        entry: Option<&BeaconEntry>,
        is_new_period: bool,
        epoch: ChainEpoch,
        miner: &Address,
    ) -> Result<[u8; 32], ConsensusError> {
        let entropy = fvm_ipld_encoding::to_vec(miner)?;
        let round = epoch - self.lookback;

        if is_new_period {
            let entry = entry.ok_or(ConsensusError::BeaconUnavailable)?;
            draw_randomness(
                entry.data(),
                DomainSeparationTag::TicketProduction,
                round,
                &entropy,
            )
            .map_err(|e| ConsensusError::DrawingChainRandomness(e.to_string()))
        } else {
            Ok(self.sampler.sample_chain_randomness(
                base,
                DomainSeparationTag::TicketProduction,
                round,
                &entropy,
            )?)
        }
    }
}
