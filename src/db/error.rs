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

//! Implementation of the [`Error`] type for database operations.

use std::collections::TryReserveError;
use std::fmt;

/// Result codes for database operations.
///
/// Apart from [`Error::Unreachable`], these are ordinary outcomes that
/// callers are expected to handle. Precondition violations (such as
/// passing a foreign [`Version`](super::Version)) are not represented
/// here; they panic.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Error {
    /// Memory could not be allocated.
    NoMemory,

    /// The name (or the requested object) does not exist.
    NotFound,

    /// The name exists, but has no RRset of the requested type.
    NxRrset,

    /// The operation is not supported by this database.
    NotImplemented,

    /// The object to register already exists.
    Exists,

    /// The host called an operation that it must never call on this
    /// database. The host should abort when it sees this.
    Unreachable(Operation),
}

impl Error {
    /// Returns whether the error indicates a broken contract from which
    /// the host cannot meaningfully recover.
    pub fn is_fatal(self) -> bool {
        matches!(self, Self::Unreachable(_))
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::NoMemory => f.write_str("out of memory"),
            Self::NotFound => f.write_str("not found"),
            Self::NxRrset => f.write_str("no such RRset"),
            Self::NotImplemented => f.write_str("not implemented"),
            Self::Exists => f.write_str("already exists"),
            Self::Unreachable(op) => write!(f, "{op} must never be called on this database"),
        }
    }
}

impl std::error::Error for Error {}

impl From<TryReserveError> for Error {
    fn from(_: TryReserveError) -> Self {
        Self::NoMemory
    }
}

/// Database operations that a read-only database treats as contract
/// violations.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Operation {
    BeginLoad,
    EndLoad,
    Dump,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::BeginLoad => f.write_str("beginload"),
            Self::EndLoad => f.write_str("endload"),
            Self::Dump => f.write_str("dump"),
        }
    }
}
