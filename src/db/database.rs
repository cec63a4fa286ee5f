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

//! The [`Database`] trait and related types.

use std::any::Any;
use std::collections::HashMap;
use std::io;
use std::path::Path;
use std::sync::Arc;

use super::{Error, NodeRef};
use crate::class::Class;
use crate::name::Name;
use crate::rr::{Rdata, Rrset, Ttl, Type};

////////////////////////////////////////////////////////////////////////
// DATABASE TRAIT                                                     //
////////////////////////////////////////////////////////////////////////

/// Trait for the databases a host nameserver serves data from.
///
/// The host requires every operation below to exist. A database needs
/// to provide only the version model, node handling, and the lookup
/// operations; every other operation has a provided implementation
/// that reports [`Error::NotImplemented`] (or a fixed answer, for
/// operations that cannot fail).
///
/// Databases are shared between the host's worker threads, so all
/// operations take `&self`. Handles to a database are
/// `Arc<dyn Database>`; see [`attach`] and [`detach`].
pub trait Database: Send + Sync {
    /// Returns the origin of the database.
    fn origin(&self) -> &Name;

    /// Returns the DNS class of the database.
    fn class(&self) -> Class;

    /// Returns whether this is a zone or a cache database.
    fn db_type(&self) -> DbType;

    /// Prepares the database for loading records.
    fn begin_load(&self) -> Result<(), Error> {
        Err(Error::NotImplemented)
    }

    /// Finishes loading records.
    fn end_load(&self) -> Result<(), Error> {
        Err(Error::NotImplemented)
    }

    /// Writes the contents of `version` of the database to `path`.
    fn dump(&self, _version: Option<Version>, _path: &Path) -> Result<(), Error> {
        Err(Error::NotImplemented)
    }

    /// Returns the current version of the database.
    fn current_version(&self) -> Version;

    /// Opens a new version of the database for writing.
    fn new_version(&self) -> Result<Version, Error>;

    /// Returns another handle to the version `source`.
    fn attach_version(&self, source: Version) -> Version;

    /// Closes the version held in `version`, committing its changes if
    /// `commit` is set. `version` is left empty.
    fn close_version(&self, version: &mut Option<Version>, commit: bool);

    /// Finds the node for `name`. If `create` is set, the database may
    /// create the node if it does not already exist.
    fn find_node(&self, name: &Name, create: bool) -> Result<NodeRef, Error>;

    /// Returns another handle to `source`.
    fn attach_node(&self, source: &NodeRef) -> NodeRef;

    /// Gives back a node handle obtained from this database.
    fn detach_node(&self, node: NodeRef);

    /// Marks `node` as expired.
    fn expire_node(&self, _node: &NodeRef, _now: u32) -> Result<(), Error> {
        Err(Error::NotImplemented)
    }

    /// Writes a debugging description of `node` to `out`.
    fn print_node(&self, _node: &NodeRef, _out: &mut dyn io::Write) {}

    /// Moves the node handle in `source` into `target`.
    fn transfer_node(&self, _source: &mut Option<NodeRef>, _target: &mut Option<NodeRef>) {}

    /// Returns the node at the origin of the database.
    fn get_origin_node(&self) -> Result<NodeRef, Error> {
        Err(Error::NotImplemented)
    }

    /// Returns the number of nodes in the database.
    fn node_count(&self) -> usize {
        0
    }

    /// Returns an iterator over the nodes of the database.
    fn create_iterator(
        &self,
        _options: u32,
    ) -> Result<Box<dyn Iterator<Item = NodeRef> + '_>, Error> {
        Err(Error::NotImplemented)
    }

    /// Looks up the RRset of type `rr_type` at `name`, falling back to
    /// a CNAME RRset if there is none.
    fn find(
        &self,
        name: &Name,
        version: Option<Version>,
        rr_type: Type,
        options: FindOptions,
        now: u32,
    ) -> Result<FindResult, Error>;

    /// Finds the deepest zone cut at or above `name`.
    fn find_zone_cut(&self, _name: &Name, _options: FindOptions, _now: u32) -> Result<Found, Error> {
        Err(Error::NotImplemented)
    }

    /// Looks up the RRset of type `rr_type` at an existing node.
    /// `covers` is the covered type for signature RRsets.
    fn find_rdataset(
        &self,
        node: &NodeRef,
        version: Option<Version>,
        rr_type: Type,
        covers: Type,
        now: u32,
    ) -> Result<Rdataset, Error>;

    /// Returns an iterator over all RRsets at `node`.
    fn all_rdatasets(
        &self,
        _node: &NodeRef,
        _version: Option<Version>,
        _now: u32,
    ) -> Result<Box<dyn Iterator<Item = Rdataset> + '_>, Error> {
        Err(Error::NotImplemented)
    }

    /// Merges `rdataset` into the data at `node`.
    fn add_rdataset(
        &self,
        _node: &NodeRef,
        _version: Option<Version>,
        _now: u32,
        _rdataset: &Rdataset,
        _options: u32,
    ) -> Result<Rdataset, Error> {
        Err(Error::NotImplemented)
    }

    /// Removes the records of `rdataset` from the data at `node`.
    fn subtract_rdataset(
        &self,
        _node: &NodeRef,
        _version: Option<Version>,
        _rdataset: &Rdataset,
        _options: u32,
    ) -> Result<Rdataset, Error> {
        Err(Error::NotImplemented)
    }

    /// Deletes the RRset of type `rr_type` at `node`.
    fn delete_rdataset(
        &self,
        _node: &NodeRef,
        _version: Option<Version>,
        _rr_type: Type,
        _covers: Type,
    ) -> Result<(), Error> {
        Err(Error::NotImplemented)
    }

    /// Returns whether `version` of the database is signed.
    fn is_secure(&self, _version: Option<Version>) -> bool {
        false
    }

    /// Returns whether the database is DNSSEC-aware.
    fn is_dnssec(&self) -> bool {
        false
    }

    /// Returns the NSEC3 parameters of `version` of the database.
    fn get_nsec3_parameters(&self, _version: Option<Version>) -> Result<Nsec3Parameters, Error> {
        Err(Error::NotImplemented)
    }

    /// Finds the node for `name` in the NSEC3 tree.
    fn find_nsec3_node(&self, _name: &Name, _create: bool) -> Result<NodeRef, Error> {
        Err(Error::NotImplemented)
    }

    /// Sets the time at which `rdataset` must be re-signed.
    fn set_signing_time(&self, _rdataset: &Rdataset, _resign: u32) -> Result<(), Error> {
        Err(Error::NotImplemented)
    }

    /// Returns the RRset due to be re-signed first, with its owner.
    fn get_signing_time(&self) -> Result<(Rdataset, Name), Error> {
        Err(Error::NotImplemented)
    }

    /// Notes that `rdataset` has been re-signed in `version`.
    fn resigned(&self, _rdataset: &Rdataset, _version: Option<Version>) {}

    /// Returns whether the database persists across restarts.
    fn is_persistent(&self) -> bool {
        false
    }

    /// Tells the database whether the host is over its memory limit.
    fn over_mem(&self, _over: bool) {}

    /// Gives the database a host task for deferred work.
    fn set_task(&self, _task: Option<Task>) {}

    /// Returns per-type RRset statistics, if the database keeps them.
    fn get_rrset_stats(&self) -> Option<Arc<RrsetStats>> {
        None
    }
}

/// Returns another handle to the database `source`.
pub fn attach(source: &Arc<dyn Database>) -> Arc<dyn Database> {
    Arc::clone(source)
}

/// Gives up a database handle. The database is destroyed when its last
/// handle is given up.
pub fn detach(db: Arc<dyn Database>) {
    drop(db)
}

////////////////////////////////////////////////////////////////////////
// SUPPORTING TYPES                                                   //
////////////////////////////////////////////////////////////////////////

/// The kinds of database a host may instantiate.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum DbType {
    Zone,
    Cache,
}

/// An opaque token naming a version of a database.
///
/// Tokens are only meaningful to the database that issued them.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Version(u32);

impl Version {
    /// Creates a `Version` from its raw value.
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }
}

impl From<u32> for Version {
    fn from(raw: u32) -> Self {
        Self(raw)
    }
}

/// Options for [`Database::find`] and [`Database::find_zone_cut`].
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct FindOptions {
    /// Return glue below a zone cut.
    pub glue_ok: bool,

    /// Do not synthesize answers from wildcards.
    pub no_wild: bool,

    /// Do not return an exact match for the name.
    pub no_exact: bool,
}

/// A successful result of [`Database::find`].
#[derive(Debug)]
pub enum FindResult {
    /// An RRset of the requested type was found.
    Success(Found),

    /// The name owns a CNAME RRset instead; the caller should follow
    /// it.
    Cname(Found),
}

impl FindResult {
    /// Returns the [`Found`] data, whichever variant this is.
    pub fn found(&self) -> &Found {
        match self {
            Self::Success(found) | Self::Cname(found) => found,
        }
    }

    /// Consumes the `FindResult`, returning the [`Found`] data.
    pub fn into_found(self) -> Found {
        match self {
            Self::Success(found) | Self::Cname(found) => found,
        }
    }
}

/// The data returned by a successful lookup.
#[derive(Debug)]
pub struct Found {
    /// The node the RRset was found at.
    pub node: NodeRef,

    /// The name the RRset is owned by.
    pub foundname: Name,

    /// The RRset found.
    pub rdataset: Rdataset,
}

/// An RRset handed to the host, with its class.
///
/// This shares the underlying [`Rrset`] rather than copying it.
#[derive(Clone, Debug)]
pub struct Rdataset {
    pub class: Class,
    pub rrset: Arc<Rrset>,
}

impl Rdataset {
    /// Creates an `Rdataset` for `rrset`.
    pub fn new(class: Class, rrset: &Arc<Rrset>) -> Self {
        Self {
            class,
            rrset: Arc::clone(rrset),
        }
    }

    /// Returns the RR type of the `Rdataset`.
    pub fn rr_type(&self) -> Type {
        self.rrset.rr_type
    }

    /// Returns the TTL of the `Rdataset`.
    pub fn ttl(&self) -> Ttl {
        self.rrset.ttl
    }

    /// Returns an iterator over the [`Rdata`]s of the `Rdataset`.
    pub fn iter(&self) -> std::slice::Iter<'_, Rdata> {
        self.rrset.iter()
    }
}

/// NSEC3 chain parameters (see [RFC 5155 § 4]).
///
/// [RFC 5155 § 4]: https://datatracker.ietf.org/doc/html/rfc5155#section-4
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Nsec3Parameters {
    pub hash: u8,
    pub flags: u8,
    pub iterations: u16,
    pub salt: Vec<u8>,
}

/// An opaque host task handed to [`Database::set_task`].
pub type Task = Arc<dyn Any + Send + Sync>;

/// Per-type RRset counts returned by [`Database::get_rrset_stats`].
pub type RrsetStats = HashMap<Type, u64>;
