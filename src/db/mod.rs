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

//! The record-store contract between a host nameserver and its
//! database implementations.
//!
//! A host nameserver does not look at DNS data directly. Instead, it
//! asks a database, through the [`Database`] trait, for the [`Node`]
//! bound to a name or for the RRset of a given type at a name. The
//! contract is broad: it covers loading, versioning, iteration,
//! modification, and DNSSEC maintenance, and the host expects every
//! operation to be present. Read-only databases implement only the
//! lookup operations and the version model; everything else has a
//! provided implementation that reports [`Error::NotImplemented`].
//!
//! ## Handles and reference counting
//!
//! Databases and nodes are shared between the host's worker threads.
//! Both are handed out behind [`Arc`](std::sync::Arc)s: cloning a
//! handle attaches, and dropping it detaches. The last detach of a
//! database destroys it. Nodes carry no reference back to the database
//! that produced them, so the host gives node handles back through
//! [`Database::detach_node`] on the originating database, which lets
//! the database return the node's RRsets to wherever they came from.
//!
//! ## Implementations
//!
//! Database implementations make themselves known by name through the
//! [`registry`]. The host then creates a database for each configured
//! zone with [`registry::create`].

mod database;
mod error;
mod node;
pub mod registry;

pub use database::{
    attach, detach, Database, DbType, FindOptions, FindResult, Found, Nsec3Parameters, Rdataset,
    RrsetStats, Task, Version,
};
pub use error::{Error, Operation};
pub use node::{Node, NodeRef};
