// Copyright 2019-2023 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use crate::beacon::BeaconEntry;
use crate::blocks::{ElectionProof, Ticket, TipsetKey};
use crate::utils::cid::CidCborExt;
use cid::Cid;
use fvm_ipld_encoding::tuple::*;
use fvm_shared::{address::Address, clock::ChainEpoch};

/// Header of a block mined for one epoch. Only the fields the election and
/// randomness paths read are carried here; messages, receipts and weight
/// accounting live with the surrounding node.
#[derive(Clone, Debug, PartialEq, Eq, Serialize_tuple, Deserialize_tuple, Hash)]
pub struct BlockHeader {
    /// The address of the miner actor that mined this block.
    pub miner_address: Address,
    /// The ticket submitted with this block. Absent only on genesis.
    pub ticket: Option<Ticket>,
    /// The verified VRF result this miner won the epoch's election with.
    pub election_proof: Option<ElectionProof>,
    /// The verifiable oracle randomness used to elect this block's author
    /// leader.
    pub beacon_entries: Vec<BeaconEntry>,
    /// The set of parents this block was based on.
    pub parents: TipsetKey,
    /// The period in which a new block is generated. There may be multiple
    /// rounds in an epoch.
    pub epoch: ChainEpoch,
    /// The CID of the parent state root after calculating parent tipset.
    pub state_root: Cid,
    /// The block creation time, in seconds since the Unix epoch.
    pub timestamp: u64,
}

impl BlockHeader {
    /// Identifier of the header: BLAKE2b-256 over its `dag-cbor` encoding.
    pub fn cid(&self) -> Cid {
        Cid::from_cbor_blake2b256(self).expect("header serialization is infallible")
    }
}
