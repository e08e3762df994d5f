// Copyright 2019-2023 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use crate::blocks::Ticket;
use crate::chain::draw_randomness;
use crate::consensus::ConsensusError;
use crate::crypto::DomainSeparationTag;
use crate::networks::ChainConfig;
use crate::state_manager::{FaultStateView, PowerFraction, PowerStateView};
use cid::Cid;
use fvm_shared::{address::Address, clock::ChainEpoch};
use num_bigint::{BigInt, Sign};
use num_traits::Zero;
use std::sync::LazyLock;
use tracing::debug;

/// The lottery draws a 256-bit value, so thresholds are scaled against
/// 2^256.
static MAX_LOTTERY: LazyLock<BigInt> = LazyLock::new(|| BigInt::from(1) << 256usize);

/// Decides whether a ticket wins the leader election for its epoch.
///
/// The ticket's election-proof randomness is interpreted as a uniform
/// 256-bit integer `h`; the miner wins iff
/// `h * network_power < miner_power * expected_winners * 2^256`.
/// All arithmetic is exact integer math so every node reaches the same
/// verdict bit-for-bit. The check answers per-miner eligibility only;
/// several miners may win the same epoch, and ranking among them is
/// block-assembly policy.
pub fn is_winning_ticket(
    ticket: &Ticket,
    epoch: ChainEpoch,
    power: &PowerFraction,
    expected_winners: u64,
) -> Result<bool, ConsensusError> {
    if power.network_power.is_zero() || power.miner_power.is_zero() {
        return Ok(false);
    }

    let rand = draw_randomness(
        ticket.vrfproof.as_bytes(),
        DomainSeparationTag::ElectionProofProduction,
        epoch,
        &[],
    )
    .map_err(|e| ConsensusError::DrawingChainRandomness(e.to_string()))?;

    let h = BigInt::from_bytes_be(Sign::Plus, &rand);
    let lhs = h * &power.network_power;
    let rhs = &power.miner_power * expected_winners * &*MAX_LOTTERY;
    Ok(lhs < rhs)
}

/// Evaluates miner eligibility against power and fault state.
///
/// The state views are injected at construction and queried per state
/// root; verdicts are never cached across roots. The verifier holds no
/// mutable state, so one instance may serve many concurrent validations.
pub struct ElectionVerifier<P, F> {
    power_view: P,
    fault_view: F,
    expected_winners: u64,
}

impl<P, F> ElectionVerifier<P, F>
where
    P: PowerStateView,
    F: FaultStateView,
{
    pub fn new(power_view: P, fault_view: F, config: &ChainConfig) -> Self {
        Self {
            power_view,
            fault_view,
            expected_winners: config.expected_winners_per_epoch,
        }
    }

    /// A miner may mine when it is not faulted and holds non-zero power at
    /// the given state root. A missing power or fault record reads as zero
    /// power and no fault respectively.
    pub fn eligible_to_mine(
        &self,
        root: &Cid,
        miner: &Address,
        epoch: ChainEpoch,
    ) -> Result<bool, ConsensusError> {
        if let Some(fault) = self.fault_view.miner_fault_status(root, miner, epoch)? {
            if fault.is_faulty {
                debug!(%miner, epoch, "faulted miner excluded from election");
                return Ok(false);
            }
        }
        match self.power_view.miner_power(root, miner)? {
            Some(power) => Ok(!power.miner_power.is_zero()),
            None => Ok(false),
        }
    }

    /// Full verification-side election check for one miner: fault status,
    /// power lookup, then the ticket lottery. Returns the per-miner
    /// verdict; a faulted or powerless miner never wins regardless of its
    /// ticket's numeric outcome.
    pub fn verify_winner(
        &self,
        root: &Cid,
        miner: &Address,
        epoch: ChainEpoch,
        ticket: &Ticket,
    ) -> Result<bool, ConsensusError> {
        if !self.eligible_to_mine(root, miner, epoch)? {
            return Ok(false);
        }
        let Some(power) = self.power_view.miner_power(root, miner)? else {
            return Ok(false);
        };
        is_winning_ticket(ticket, epoch, &power, self.expected_winners)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blocks::VRFProof;
    use crate::state_manager::MemoryStateView;
    use crate::utils::cid::CidCborExt;
    use fvm_shared::sector::StoragePower;

    fn ticket(seed: &[u8]) -> Ticket {
        Ticket::new(VRFProof::new(seed.to_vec()))
    }

    fn fraction(miner: i64, network: i64) -> PowerFraction {
        PowerFraction {
            miner_power: StoragePower::from(miner),
            network_power: StoragePower::from(network),
        }
    }

    #[test]
    fn verdict_is_deterministic() {
        let t = ticket(b"some vrf proof");
        let power = fraction(5, 100);
        let first = is_winning_ticket(&t, 10, &power, 5).unwrap();
        for _ in 0..10 {
            assert_eq!(is_winning_ticket(&t, 10, &power, 5).unwrap(), first);
        }
    }

    #[test]
    fn zero_power_never_wins() {
        for i in 0..64u8 {
            let t = ticket(&[i]);
            assert!(!is_winning_ticket(&t, 10, &fraction(0, 100), 5).unwrap());
        }
    }

    #[test]
    fn sole_power_holder_always_wins() {
        for i in 0..64u8 {
            let t = ticket(&[i]);
            assert!(is_winning_ticket(&t, 10, &fraction(100, 100), 5).unwrap());
        }
    }

    #[test]
    fn empty_network_never_elects() {
        let t = ticket(b"proof");
        assert!(!is_winning_ticket(&t, 10, &fraction(0, 0), 5).unwrap());
    }

    #[test]
    fn win_rate_tracks_power_share() {
        // With one expected winner and a 1/4 power share, roughly a quarter
        // of tickets should win. The margin is generous; the point is that
        // the threshold scales with the fraction, not the exact rate.
        let trials = 512;
        let mut wins = 0;
        for i in 0..trials {
            let t = ticket(format!("trial {}", i).as_bytes());
            if is_winning_ticket(&t, 10, &fraction(25, 100), 1).unwrap() {
                wins += 1;
            }
        }
        assert!(wins > trials / 8, "won only {}/{} trials", wins, trials);
        assert!(wins < trials / 2, "won {}/{} trials", wins, trials);
    }

    #[test]
    fn faulted_miner_is_never_eligible() {
        let root = Cid::from_cbor_blake2b256(&"root").unwrap();
        let miner = Address::new_id(1000);
        let mut view = MemoryStateView::new();
        view.set_power(root, miner, 100, 100);
        view.set_fault(root, miner, 9);

        let verifier = ElectionVerifier::new(&view, &view, &ChainConfig::default());
        assert!(!verifier.eligible_to_mine(&root, &miner, 10).unwrap());
        assert!(!verifier
            .verify_winner(&root, &miner, 10, &ticket(b"proof"))
            .unwrap());
    }

    #[test]
    fn unknown_miner_reads_as_zero_power() {
        let root = Cid::from_cbor_blake2b256(&"root").unwrap();
        let miner = Address::new_id(1000);
        let view = MemoryStateView::new();

        let verifier = ElectionVerifier::new(&view, &view, &ChainConfig::default());
        assert!(!verifier.eligible_to_mine(&root, &miner, 10).unwrap());
    }

    #[test]
    fn healthy_sole_miner_wins() {
        let root = Cid::from_cbor_blake2b256(&"root").unwrap();
        let miner = Address::new_id(1000);
        let mut view = MemoryStateView::new();
        view.set_power(root, miner, 100, 100);

        let verifier = ElectionVerifier::new(&view, &view, &ChainConfig::default());
        assert!(verifier
            .verify_winner(&root, &miner, 10, &ticket(b"proof"))
            .unwrap());
    }
}
