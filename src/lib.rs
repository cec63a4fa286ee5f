// Copyright 2023 Matthew Ingwersen.
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

//! A read-only DNS database backend driven by an external directory.
//!
//! This crate provides a record store that a host nameserver can load
//! as a database implementation. Lookups are not answered from zone
//! data held by the server; instead, each lookup is translated into a
//! query against a record source (historically an LDAP directory),
//! and the records that come back are handed to the host through the
//! [`db::Database`] contract.
//!
//! The pieces fit together as follows:
//!
//! * [`resolver`] defines the [`Resolver`](resolver::Resolver) trait
//!   for record sources, along with an in-memory implementation that
//!   is loaded from a TOML records file.
//! * [`manager`] keeps the process-wide table of named resolver
//!   instances.
//! * [`ldapdb`] implements the store itself ([`LdapDb`](ldapdb::LdapDb))
//!   on top of a resolver instance.
//! * [`driver`] registers the store with the host's implementation
//!   registry ([`db::registry`]) and sets up resolver instances from
//!   configuration arguments.
//!
//! The store is permanently read-only. It has exactly one version,
//! does not support iteration, zone transfers, dynamic updates, or
//! DNSSEC, and reports most of the operations of the contract as
//! unimplemented.

pub mod class;
pub mod db;
pub mod driver;
pub mod ldapdb;
pub mod manager;
pub mod name;
pub mod resolver;
pub mod rr;
pub mod settings;
mod util;
