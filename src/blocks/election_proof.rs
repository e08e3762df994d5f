// Copyright 2019-2023 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use crate::blocks::VRFProof;
use fvm_ipld_encoding::tuple::*;

/// Proof that a miner won the leader-election lottery for an epoch. Expected
/// consensus admits several winners per epoch; `win_count` records how many
/// draws this miner claims. Ranking among simultaneous winners is left to
/// block-assembly policy.
#[derive(Clone, Debug, PartialEq, Eq, Default, Serialize_tuple, Deserialize_tuple, Hash)]
pub struct ElectionProof {
    pub win_count: i64,
    pub vrfproof: VRFProof,
}

impl ElectionProof {
    pub fn new(win_count: i64, vrfproof: VRFProof) -> Self {
        Self {
            win_count,
            vrfproof,
        }
    }
}
