// Copyright 2019-2023 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use num_derive::FromPrimitive;

/// Specifies a domain for randomness generation.
///
/// Every derivation call names exactly one tag, and a tag is never reused
/// across semantically distinct purposes. Randomness drawn under one tag is
/// independent of randomness drawn under any other, even for identical
/// remaining inputs.
#[derive(PartialEq, Eq, Copy, Clone, FromPrimitive, Debug, Hash)]
#[repr(i64)]
pub enum DomainSeparationTag {
    TicketProduction = 1,
    ElectionProofProduction = 2,
    PoStChallengeSeed = 3,
    BeaconEntropy = 4,
}
