// Copyright 2019-2023 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use crate::beacon::BeaconEntry;
use crate::blocks::{BlockHeader, Error, Ticket};
use cid::Cid;
use fvm_shared::clock::ChainEpoch;
use serde::{Deserialize, Serialize};

/// An immutable set of CIDs forming a unique key for a tipset.
///
/// Equal keys will have equivalent iteration order. The CIDs are maintained
/// in the canonical iteration order of blocks in the tipset, which is by
/// ticket, with the block CID breaking ties.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TipsetKey {
    cids: Vec<Cid>,
}

impl TipsetKey {
    /// Builds a key from block identifiers. The set must be non-empty and
    /// free of duplicates.
    pub fn new(cids: Vec<Cid>) -> Result<Self, Error> {
        if cids.is_empty() {
            return Err(Error::NoBlocks);
        }
        for (i, cid) in cids.iter().enumerate() {
            if cids[..i].contains(cid) {
                return Err(Error::InvalidTipset(format!("duplicate block CID {}", cid)));
            }
        }
        Ok(Self { cids })
    }

    /// Returns the block identifiers in canonical order.
    pub fn cids(&self) -> &[Cid] {
        &self.cids
    }

    /// `dag-cbor` encoding of the key, usable as derivation entropy.
    pub fn cbor_bytes(&self) -> Result<Vec<u8>, Error> {
        fvm_ipld_encoding::to_vec(self).map_err(|e| Error::Validation(e.to_string()))
    }
}

impl std::fmt::Display for TipsetKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let cids: Vec<String> = self.cids.iter().map(|c| c.to_string()).collect();
        write!(f, "{{{}}}", cids.join(", "))
    }
}

/// A non-empty group of blocks sharing the same parent set and epoch,
/// forming one round's frontier of the chain. Immutable once constructed;
/// all accessors observe the canonical ticket ordering.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Tipset {
    headers: Vec<BlockHeader>,
    key: TipsetKey,
}

impl Tipset {
    /// Builds a new tipset from a collection of block headers.
    ///
    /// The headers must be distinct, share the same epoch, and share the
    /// same parent key. They are sorted into canonical order, so two nodes
    /// holding the same block set always derive the same [`TipsetKey`].
    pub fn new(mut headers: Vec<BlockHeader>) -> Result<Self, Error> {
        verify_headers(&headers)?;

        headers.sort_by_key(|h| (h.ticket.as_ref().map(|t| t.vrfproof.digest()), h.cid()));

        let key = TipsetKey::new(headers.iter().map(BlockHeader::cid).collect())?;
        Ok(Self { headers, key })
    }

    /// Returns the member block headers in canonical order.
    pub fn blocks(&self) -> &[BlockHeader] {
        &self.headers
    }

    /// Returns the epoch all member blocks were mined for.
    pub fn epoch(&self) -> ChainEpoch {
        self.headers[0].epoch
    }

    /// Returns the key identifying this tipset.
    pub fn key(&self) -> &TipsetKey {
        &self.key
    }

    /// Returns the key of the parent tipset.
    pub fn parents(&self) -> &TipsetKey {
        &self.headers[0].parents
    }

    /// Returns the smallest ticket of all blocks in the tipset. This is the
    /// tipset's contribution to the ticket chain.
    pub fn min_ticket(&self) -> Option<&Ticket> {
        self.headers[0].ticket.as_ref()
    }

    /// Returns the most recent beacon entry committed by the tipset, if any
    /// block carries one.
    pub fn latest_beacon_entry(&self) -> Option<&BeaconEntry> {
        self.headers[0].beacon_entries.last()
    }
}

fn verify_headers(headers: &[BlockHeader]) -> Result<(), Error> {
    let first = headers.first().ok_or(Error::NoBlocks)?;

    for header in &headers[1..] {
        if header.epoch != first.epoch {
            return Err(Error::InvalidTipset(format!(
                "headers have different epochs {} {}",
                header.epoch, first.epoch
            )));
        }
        if header.parents != first.parents {
            return Err(Error::InvalidTipset(
                "headers have different parents".to_string(),
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blocks::VRFProof;
    use crate::utils::cid::CidCborExt;
    use fvm_shared::address::Address;

    fn dummy_cid(tag: u64) -> Cid {
        Cid::from_cbor_blake2b256(&tag).unwrap()
    }

    fn header(miner: u64, epoch: ChainEpoch, proof: &[u8]) -> BlockHeader {
        BlockHeader {
            miner_address: Address::new_id(miner),
            ticket: Some(Ticket::new(VRFProof::new(proof.to_vec()))),
            election_proof: None,
            beacon_entries: vec![],
            parents: TipsetKey::new(vec![dummy_cid(0)]).unwrap(),
            epoch,
            state_root: dummy_cid(1),
            timestamp: 1_000_000 + epoch as u64,
        }
    }

    #[test]
    fn empty_key_is_rejected() {
        assert_eq!(TipsetKey::new(vec![]), Err(Error::NoBlocks));
    }

    #[test]
    fn duplicate_cids_are_rejected() {
        let cid = dummy_cid(3);
        assert!(matches!(
            TipsetKey::new(vec![cid, cid]),
            Err(Error::InvalidTipset(_))
        ));
    }

    #[test]
    fn tipset_requires_matching_epochs() {
        let res = Tipset::new(vec![header(1, 5, b"a"), header(2, 6, b"b")]);
        assert!(matches!(res, Err(Error::InvalidTipset(_))));
    }

    #[test]
    fn tipset_requires_matching_parents() {
        let mut mismatched = header(2, 5, b"b");
        mismatched.parents = TipsetKey::new(vec![dummy_cid(9)]).unwrap();
        let res = Tipset::new(vec![header(1, 5, b"a"), mismatched]);
        assert!(matches!(res, Err(Error::InvalidTipset(_))));
    }

    #[test]
    fn key_is_independent_of_insertion_order() {
        let (a, b, c) = (header(1, 5, b"a"), header(2, 5, b"b"), header(3, 5, b"c"));
        let ts1 = Tipset::new(vec![a.clone(), b.clone(), c.clone()]).unwrap();
        let ts2 = Tipset::new(vec![c, a, b]).unwrap();
        assert_eq!(ts1.key(), ts2.key());
        assert_eq!(ts1.min_ticket(), ts2.min_ticket());
    }

    #[test]
    fn min_ticket_is_smallest_digest() {
        let headers = vec![header(1, 5, b"a"), header(2, 5, b"b"), header(3, 5, b"c")];
        let expected = headers
            .iter()
            .filter_map(|h| h.ticket.clone())
            .min_by_key(|t| t.vrfproof.digest())
            .unwrap();

        let ts = Tipset::new(headers).unwrap();
        assert_eq!(ts.min_ticket(), Some(&expected));
    }
}
