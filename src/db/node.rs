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

//! The [`Node`] type.

use std::sync::Arc;

use crate::name::Name;
use crate::rr::RrsetList;

/// A shared handle to a [`Node`]. Cloning the handle attaches to the
/// node; dropping it detaches.
pub type NodeRef = Arc<Node>;

/// The data bound to one domain name, as returned by a lookup.
///
/// A `Node` owns its own copy of the owner name and is immutable once
/// built. It carries no reference back to the database that produced
/// it; the final handle must be given back through
/// [`Database::detach_node`](super::Database::detach_node) on that
/// database so the RRsets can be returned to their source.
#[derive(Debug)]
pub struct Node {
    owner: Name,
    rrsets: RrsetList,
}

impl Node {
    /// Creates a new `Node`.
    pub fn new(owner: Name, rrsets: RrsetList) -> Self {
        Self { owner, rrsets }
    }

    /// Returns the owner name of the `Node`.
    pub fn owner(&self) -> &Name {
        &self.owner
    }

    /// Returns the RRsets bound to the `Node`.
    pub fn rrsets(&self) -> &RrsetList {
        &self.rrsets
    }

    /// Consumes the `Node`, returning its RRsets.
    pub fn into_rrsets(self) -> RrsetList {
        self.rrsets
    }
}
