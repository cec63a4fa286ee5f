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

//! Sources of record data.
//!
//! A [`Resolver`] turns a domain name into the RRsets bound to it. The
//! [`LdapDb`](crate::ldapdb::LdapDb) database does not keep any data
//! itself; every lookup goes to its resolver. In deployment that is a
//! directory server. This crate ships the [`MemoryResolver`], which
//! serves records loaded from a TOML file.

use std::sync::Arc;

use crate::db::Error;
use crate::name::Name;
use crate::rr::{Rrset, RrsetList, Type};

mod memory;

pub use memory::{LoadError, MemoryResolver, RecordProblem};

/// Trait for sources of record data.
pub trait Resolver: Send + Sync {
    /// Returns the RRsets bound to `name`.
    ///
    /// If nothing is bound exactly to `name` but the resolver knows of
    /// data near it, it returns [`Resolution::PartialMatch`]. If it
    /// knows nothing about `name`, it fails with [`Error::NotFound`].
    /// The only other error a resolver should report is
    /// [`Error::NoMemory`], which databases pass on unchanged.
    fn resolve(&self, name: &Name) -> Result<Resolution, Error>;

    /// Selects the RRset of type `rr_type` from `rrsets`, which this
    /// resolver returned earlier.
    fn find_type<'a>(&self, rrsets: &'a RrsetList, rr_type: Type) -> Result<&'a Arc<Rrset>, Error> {
        rrsets.lookup(rr_type).ok_or(Error::NotFound)
    }

    /// Takes back RRsets that this resolver returned earlier.
    fn release(&self, rrsets: RrsetList) {
        drop(rrsets)
    }
}

/// The outcome of a successful [`Resolver::resolve`].
#[derive(Debug)]
pub enum Resolution {
    /// The RRsets are bound exactly to the name.
    Match(RrsetList),

    /// Nothing is bound exactly to the name; the RRsets (possibly none)
    /// are the closest the resolver could find.
    PartialMatch(RrsetList),
}

impl Resolution {
    /// Returns whether this is a [`Resolution::PartialMatch`].
    pub fn is_partial(&self) -> bool {
        matches!(self, Self::PartialMatch(_))
    }

    /// Consumes the `Resolution`, returning its RRsets.
    pub fn into_rrsets(self) -> RrsetList {
        match self {
            Self::Match(rrsets) | Self::PartialMatch(rrsets) => rrsets,
        }
    }
}
