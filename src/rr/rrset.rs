// Copyright 2022 Matthew Ingwersen.
//
// Licensed under the Apache License, Version 2.0 (the "License"); you
// may not use this file except in compliance with the License. You may
// obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or
// implied. See the License for the specific language governing
// permissions and limitations under the License.

//! Data structures for the record-lists owned by a domain name.

use std::fmt;
use std::sync::Arc;

use super::{Rdata, Ttl, Type};

/// An RRset: all records of one type owned by one name.
///
/// This is missing the NAME and CLASS fields. The owner is carried by
/// the [`Node`](crate::db::Node) holding the `Rrset`, and every record
/// served by this crate is of class IN.
#[derive(Clone, Debug)]
pub struct Rrset {
    pub rr_type: Type,
    pub ttl: Ttl,
    pub rdatas: Vec<Rdata>,
}

impl Rrset {
    /// Returns an iterator over the [`Rdata`]s of the `Rrset`.
    pub fn iter(&self) -> std::slice::Iter<'_, Rdata> {
        self.rdatas.iter()
    }
}

/// Stores all of the RRsets owned by a name, ordered by type.
///
/// Each [`Rrset`] sits behind an [`Arc`], so that RRsets can be handed
/// out to callers (see [`Rdataset`](crate::db::Rdataset)) without
/// copying any RDATA.
#[derive(Clone, Debug, Default)]
pub struct RrsetList {
    rrsets: Vec<Arc<Rrset>>,
}

impl RrsetList {
    /// Creates an empty `RrsetList`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a resource record to the [`RrsetList`].
    ///
    /// This will fail if the [`Ttl`] of the new record does not match the
    /// rest of the records in its [`Rrset`]. If the target [`Rrset`]
    /// already contains bitwise-equal [`Rdata`], the new [`Rdata`] is
    /// silently ignored.
    pub fn add(&mut self, rr_type: Type, ttl: Ttl, rdata: Rdata) -> Result<(), AddError> {
        match self.rrsets.binary_search_by_key(&rr_type, |r| r.rr_type) {
            Ok(index) => {
                let rrset = Arc::make_mut(&mut self.rrsets[index]);
                if rrset.ttl != ttl {
                    Err(AddError::TtlMismatch)
                } else {
                    if !rrset.rdatas.contains(&rdata) {
                        rrset.rdatas.push(rdata);
                    }
                    Ok(())
                }
            }
            Err(index) => {
                let rrset = Rrset {
                    rr_type,
                    ttl,
                    rdatas: vec![rdata],
                };
                self.rrsets.insert(index, Arc::new(rrset));
                Ok(())
            }
        }
    }

    /// Looks up the [`Rrset`] of type `rr_type` in the `RrsetList`.
    pub fn lookup(&self, rr_type: Type) -> Option<&Arc<Rrset>> {
        self.rrsets
            .binary_search_by_key(&rr_type, |r| r.rr_type)
            .map(|index| &self.rrsets[index])
            .ok()
    }

    /// Returns an iterator over the [`Rrset`]s of the `RrsetList`.
    pub fn iter(&self) -> std::slice::Iter<'_, Arc<Rrset>> {
        self.rrsets.iter()
    }

    /// Returns the number of [`Rrset`]s in the `RrsetList`.
    pub fn len(&self) -> usize {
        self.rrsets.len()
    }

    /// Returns whether the `RrsetList` holds no [`Rrset`]s.
    pub fn is_empty(&self) -> bool {
        self.rrsets.is_empty()
    }
}

/// Errors that arise when adding a record to an [`RrsetList`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum AddError {
    /// The record's TTL differs from that of the existing RRset.
    TtlMismatch,
}

impl fmt::Display for AddError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::TtlMismatch => f.write_str("TTL does not match the rest of the RRset"),
        }
    }
}

impl std::error::Error for AddError {}

////////////////////////////////////////////////////////////////////////
// TESTS                                                              //
////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;

    fn rdata(octets: &[u8]) -> Rdata {
        octets.try_into().unwrap()
    }

    #[test]
    fn rrsetlist_works() {
        let loopback1 = rdata(&[127, 0, 0, 1]);
        let loopback2 = rdata(&[127, 0, 0, 2]);
        let domain = rdata(b"\x04test\x00");
        let mut rrsets = RrsetList::new();
        rrsets.add(Type::CNAME, Ttl::from(7200), domain.clone()).unwrap();
        rrsets.add(Type::A, Ttl::from(3600), loopback1.clone()).unwrap();
        rrsets.add(Type::A, Ttl::from(3600), loopback2.clone()).unwrap();

        let a_rrset = rrsets.lookup(Type::A).unwrap();
        assert_eq!(a_rrset.rdatas, [loopback1, loopback2]);
        let cname_rrset = rrsets.lookup(Type::CNAME).unwrap();
        assert_eq!(cname_rrset.rdatas, [domain]);
        assert!(rrsets.lookup(Type::AAAA).is_none());

        let types: Vec<Type> = rrsets.iter().map(|r| r.rr_type).collect();
        assert_eq!(types, [Type::A, Type::CNAME]);
        assert_eq!(rrsets.len(), 2);
    }

    #[test]
    fn rrsetlist_ignores_duplicates() {
        let mut rrsets = RrsetList::new();
        rrsets.add(Type::A, Ttl::from(60), rdata(&[192, 0, 2, 1])).unwrap();
        rrsets.add(Type::A, Ttl::from(60), rdata(&[192, 0, 2, 1])).unwrap();
        assert_eq!(rrsets.lookup(Type::A).unwrap().rdatas.len(), 1);
    }

    #[test]
    fn rrsetlist_rejects_ttl_mismatch() {
        let mut rrsets = RrsetList::new();
        rrsets.add(Type::NS, Ttl::from(3600), rdata(b"\x04test\x00")).unwrap();
        assert_eq!(
            rrsets.add(Type::NS, Ttl::from(7200), rdata(b"\x07invalid\x00")),
            Err(AddError::TtlMismatch),
        );
    }

    #[test]
    fn cloned_lists_share_rrsets_until_modified() {
        let mut original = RrsetList::new();
        original.add(Type::A, Ttl::from(60), rdata(&[192, 0, 2, 1])).unwrap();
        let mut copy = original.clone();
        assert!(Arc::ptr_eq(
            original.lookup(Type::A).unwrap(),
            copy.lookup(Type::A).unwrap()
        ));
        copy.add(Type::A, Ttl::from(60), rdata(&[192, 0, 2, 2])).unwrap();
        assert_eq!(original.lookup(Type::A).unwrap().rdatas.len(), 1);
        assert_eq!(copy.lookup(Type::A).unwrap().rdatas.len(), 2);
    }
}
