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

//! The [`LdapDb`] database.
//!
//! An `LdapDb` keeps no records of its own. Each lookup asks the
//! database's [`Resolver`] for the RRsets of the queried name and wraps
//! them in a fresh [`Node`]; nodes are never cached. The database is
//! read-only and has exactly one version, [`LdapDb::VERSION`].

use std::sync::{Arc, Mutex};

use log::{debug, error, trace};

use crate::class::Class;
use crate::db::{
    Database, DbType, Error, FindOptions, FindResult, Found, Node, NodeRef, Operation, Rdataset,
    Version,
};
use crate::manager;
use crate::name::Name;
use crate::resolver::{Resolution, Resolver};
use crate::rr::{RrsetList, Type};

/// A read-only database backed by a [`Resolver`] instance.
pub struct LdapDb {
    origin: Name,
    // TODO: convert to an RwLock once records can be modified.
    #[allow(dead_code)]
    lock: Mutex<()>,
    ldap_db: Arc<dyn Resolver>,
}

impl LdapDb {
    /// The one and only version of every `LdapDb`.
    pub const VERSION: Version = Version::new(0x1da9_db00);

    /// Creates a database for the zone `origin`, bound to the resolver
    /// instance named by `args[0]`. This is the constructor the driver
    /// registers, so it has the [`CreateFn`](crate::db::registry::CreateFn)
    /// signature.
    ///
    /// # Panics
    ///
    /// This panics unless `db_type` is [`DbType::Zone`], `class` is
    /// [`Class::IN`], and at least one argument is given.
    pub fn create(
        origin: &Name,
        db_type: DbType,
        class: Class,
        args: &[String],
    ) -> Result<Arc<dyn Database>, Error> {
        assert!(!args.is_empty(), "an LdapDb needs an instance name");
        assert_eq!(db_type, DbType::Zone, "an LdapDb can only be a zone");
        assert_eq!(class, Class::IN, "an LdapDb can only serve class IN");

        let origin = origin.try_clone()?;
        let lock = Mutex::new(());
        let ldap_db = manager::get_instance(&args[0])?;
        debug!("Created database for {origin} using instance {}.", args[0]);
        Ok(Arc::new(Self {
            origin,
            lock,
            ldap_db,
        }))
    }

    /// Panics if `version` was not issued by an `LdapDb`.
    fn check_version(version: Version) {
        assert_eq!(version, Self::VERSION, "foreign database version");
    }

    /// Wraps `rrsets` in a new node owned by a copy of `name`. If the
    /// copy fails, the RRsets go back to the resolver.
    fn new_node(&self, name: &Name, rrsets: RrsetList) -> Result<NodeRef, Error> {
        match name.try_clone() {
            Ok(owner) => Ok(Arc::new(Node::new(owner, rrsets))),
            Err(err) => {
                self.ldap_db.release(rrsets);
                Err(err.into())
            }
        }
    }

    fn unreachable(&self, operation: Operation) -> Error {
        error!(
            "{operation} was called on the read-only database for {}.",
            self.origin
        );
        Error::Unreachable(operation)
    }
}

impl Drop for LdapDb {
    fn drop(&mut self) {
        debug!("Destroying database for {}.", self.origin);
    }
}

impl Database for LdapDb {
    fn origin(&self) -> &Name {
        &self.origin
    }

    fn class(&self) -> Class {
        Class::IN
    }

    fn db_type(&self) -> DbType {
        DbType::Zone
    }

    fn begin_load(&self) -> Result<(), Error> {
        Err(self.unreachable(Operation::BeginLoad))
    }

    fn end_load(&self) -> Result<(), Error> {
        Err(self.unreachable(Operation::EndLoad))
    }

    fn dump(&self, _version: Option<Version>, _path: &std::path::Path) -> Result<(), Error> {
        Err(self.unreachable(Operation::Dump))
    }

    fn current_version(&self) -> Version {
        Self::VERSION
    }

    fn new_version(&self) -> Result<Version, Error> {
        Ok(Self::VERSION)
    }

    fn attach_version(&self, source: Version) -> Version {
        Self::check_version(source);
        source
    }

    fn close_version(&self, version: &mut Option<Version>, _commit: bool) {
        assert_eq!(*version, Some(Self::VERSION), "foreign database version");
        *version = None;
    }

    fn find_node(&self, name: &Name, create: bool) -> Result<NodeRef, Error> {
        trace!("find_node: name={name}, create={create}");

        let rrsets = match self.ldap_db.resolve(name) {
            Ok(Resolution::PartialMatch(rrsets)) if !create => {
                self.ldap_db.release(rrsets);
                trace!("find_node: partial match rejected");
                return Err(Error::NotFound);
            }
            Ok(resolution) => resolution.into_rrsets(),
            Err(Error::NotFound) if create => RrsetList::new(),
            Err(err) => {
                trace!("find_node: {err}");
                return Err(err);
            }
        };

        let node = self.new_node(name, rrsets)?;
        trace!("find_node: success");
        Ok(node)
    }

    fn attach_node(&self, source: &NodeRef) -> NodeRef {
        Arc::clone(source)
    }

    fn detach_node(&self, node: NodeRef) {
        if let Some(node) = Arc::into_inner(node) {
            self.ldap_db.release(node.into_rrsets());
        }
    }

    fn find(
        &self,
        name: &Name,
        version: Option<Version>,
        rr_type: Type,
        _options: FindOptions,
        _now: u32,
    ) -> Result<FindResult, Error> {
        trace!("find: name={name}, type={rr_type}");
        assert!(rr_type != Type::ANY, "ANY lookups are not supported");
        if let Some(version) = version {
            Self::check_version(version);
        }

        // Unlike find_node, a partial match is served here as though it
        // were exact.
        let resolution = self.ldap_db.resolve(name)?;
        if resolution.is_partial() {
            debug!("Serving partial match for {name} as an exact match.");
        }
        let node = self.new_node(name, resolution.into_rrsets())?;

        let selected = match self.ldap_db.find_type(node.rrsets(), rr_type) {
            Ok(rrset) => Some((Arc::clone(rrset), false)),
            Err(_) => node
                .rrsets()
                .iter()
                .find(|rrset| rrset.rr_type == Type::CNAME)
                .map(|rrset| (Arc::clone(rrset), true)),
        };
        let (rrset, is_cname) = match selected {
            Some(selected) => selected,
            None => {
                self.detach_node(node);
                trace!("find: no RRset of type {rr_type} or CNAME");
                return Err(Error::NxRrset);
            }
        };

        let rdataset = Rdataset::new(Class::IN, &rrset);
        let foundname = match name.try_clone() {
            Ok(foundname) => foundname,
            Err(err) => {
                self.detach_node(node);
                return Err(err.into());
            }
        };

        let found = Found {
            node,
            foundname,
            rdataset,
        };
        if is_cname {
            trace!("find: CNAME");
            Ok(FindResult::Cname(found))
        } else {
            trace!("find: success");
            Ok(FindResult::Success(found))
        }
    }

    fn find_rdataset(
        &self,
        node: &NodeRef,
        version: Option<Version>,
        rr_type: Type,
        covers: Type,
        _now: u32,
    ) -> Result<Rdataset, Error> {
        assert_eq!(covers, Type::from(0), "covered types need DNSSEC support");
        if let Some(version) = version {
            Self::check_version(version);
        }
        self.ldap_db
            .find_type(node.rrsets(), rr_type)
            .map(|rrset| Rdataset::new(Class::IN, rrset))
    }
}

////////////////////////////////////////////////////////////////////////
// TESTS                                                              //
////////////////////////////////////////////////////////////////////////
