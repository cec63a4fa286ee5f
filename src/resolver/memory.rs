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

//! Implementation of the [`MemoryResolver`].

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::fs;
use std::io;
use std::path::Path;

use log::debug;
use serde::Deserialize;

use super::{Resolution, Resolver};
use crate::db::Error;
use crate::name::{self, Name};
use crate::rr::rdata::ParseError;
use crate::rr::{AddError, Rdata, RrsetList, Ttl, Type};

////////////////////////////////////////////////////////////////////////
// MEMORY RESOLVER                                                    //
////////////////////////////////////////////////////////////////////////

/// A [`Resolver`] that serves records held in memory.
///
/// A name that owns no records but has descendants that do (an empty
/// non-terminal) resolves to a [`Resolution::PartialMatch`] with no
/// RRsets. Any other name without records is not found.
#[derive(Debug, Default)]
pub struct MemoryResolver {
    nodes: HashMap<Name, RrsetList>,
    empty_non_terminals: HashSet<Name>,
}

impl MemoryResolver {
    /// Creates an empty `MemoryResolver`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a record.
    pub fn add(&mut self, owner: Name, rr_type: Type, ttl: Ttl, rdata: Rdata) -> Result<(), AddError> {
        if !self.nodes.contains_key(&owner) {
            for skip in 1..owner.len() {
                if let Some(ancestor) = owner.superdomain(skip) {
                    self.empty_non_terminals.insert(ancestor);
                }
            }
        }
        self.nodes.entry(owner).or_default().add(rr_type, ttl, rdata)
    }

    /// Loads records from the TOML records file at `path`. Records
    /// without a `ttl` get `default_ttl`.
    pub fn load_from_path(path: impl AsRef<Path>, default_ttl: Ttl) -> Result<Self, LoadError> {
        let text = fs::read_to_string(path.as_ref())?;
        let resolver = Self::load_from_str(&text, default_ttl)?;
        debug!(
            "Loaded {} names from {}.",
            resolver.len(),
            path.as_ref().display()
        );
        Ok(resolver)
    }

    /// Loads records from TOML text. See
    /// [`MemoryResolver::load_from_path`].
    pub fn load_from_str(text: &str, default_ttl: Ttl) -> Result<Self, LoadError> {
        let file: RecordsFile = toml::from_str(text)?;
        let mut resolver = Self::new();
        for (index, record) in file.records.into_iter().enumerate() {
            let wrap = |problem| LoadError::Record {
                index,
                owner: record.name.clone(),
                problem,
            };
            let owner: Name = record.name.parse().map_err(|e| wrap(RecordProblem::Name(e)))?;
            let rr_type: Type = record
                .rr_type
                .parse()
                .map_err(|e| wrap(RecordProblem::Type(e)))?;
            if rr_type.is_meta() {
                return Err(wrap(RecordProblem::MetaType(rr_type)));
            }
            let ttl = record.ttl.map(Ttl::from).unwrap_or(default_ttl);
            let rdata =
                Rdata::from_text(rr_type, &record.data).map_err(|e| wrap(RecordProblem::Rdata(e)))?;
            resolver
                .add(owner, rr_type, ttl, rdata)
                .map_err(|e| wrap(RecordProblem::Add(e)))?;
        }
        Ok(resolver)
    }

    /// Returns the number of names that own records.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns whether the `MemoryResolver` holds no records.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

impl Resolver for MemoryResolver {
    fn resolve(&self, name: &Name) -> Result<Resolution, Error> {
        if let Some(rrsets) = self.nodes.get(name) {
            Ok(Resolution::Match(rrsets.clone()))
        } else if self.empty_non_terminals.contains(name) {
            Ok(Resolution::PartialMatch(RrsetList::new()))
        } else {
            Err(Error::NotFound)
        }
    }
}

////////////////////////////////////////////////////////////////////////
// RECORDS FILE                                                       //
////////////////////////////////////////////////////////////////////////

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RecordsFile {
    #[serde(default)]
    records: Vec<RecordEntry>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RecordEntry {
    name: String,
    #[serde(rename = "type")]
    rr_type: String,
    ttl: Option<u32>,
    data: String,
}

////////////////////////////////////////////////////////////////////////
// ERRORS                                                             //
////////////////////////////////////////////////////////////////////////

/// Errors that arise when loading a records file.
#[derive(Debug)]
pub enum LoadError {
    /// The file could not be read.
    Io(io::Error),

    /// The file is not valid TOML, or does not have the expected
    /// structure.
    Syntax(toml::de::Error),

    /// A record is invalid. `index` counts from zero.
    Record {
        index: usize,
        owner: String,
        problem: RecordProblem,
    },
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Io(_) => f.write_str("failed to read the records file"),
            Self::Syntax(_) => f.write_str("failed to parse the records file"),
            Self::Record {
                index,
                owner,
                problem,
            } => write!(f, "record {} (owner {owner}): {problem}", index + 1),
        }
    }
}

impl std::error::Error for LoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Syntax(err) => Some(err),
            Self::Record { problem, .. } => problem.source(),
        }
    }
}

impl From<io::Error> for LoadError {
    fn from(err: io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<toml::de::Error> for LoadError {
    fn from(err: toml::de::Error) -> Self {
        Self::Syntax(err)
    }
}

/// The ways in which a record in a records file can be invalid.
#[derive(Debug)]
pub enum RecordProblem {
    Name(name::Error),
    Type(&'static str),
    MetaType(Type),
    Rdata(ParseError),
    Add(AddError),
}

impl RecordProblem {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Name(err) => Some(err),
            Self::Rdata(err) => Some(err),
            Self::Add(err) => Some(err),
            _ => None,
        }
    }
}

impl fmt::Display for RecordProblem {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Name(_) => f.write_str("invalid owner name"),
            Self::Type(msg) => write!(f, "invalid type: {msg}"),
            Self::MetaType(rr_type) => write!(f, "{rr_type} cannot appear in zone data"),
            Self::Rdata(_) => f.write_str("invalid data"),
            Self::Add(_) => f.write_str("record conflicts with an earlier record"),
        }
    }
}

////////////////////////////////////////////////////////////////////////
// TESTS                                                              //
////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use std::error::Error as _;

    use lazy_static::lazy_static;

    use super::*;

    const RECORDS: &str = r#"
        [[records]]
        name = "example."
        type = "SOA"
        data = "ns.example. admin.example. 1 7200 3600 1209600 300"

        [[records]]
        name = "www.example."
        type = "A"
        ttl = 300
        data = "192.0.2.1"

        [[records]]
        name = "www.example."
        type = "A"
        ttl = 300
        data = "192.0.2.2"

        [[records]]
        name = "host.sub.example."
        type = "AAAA"
        data = "2001:db8::1"
    "#;

    lazy_static! {
        static ref RESOLVER: MemoryResolver =
            MemoryResolver::load_from_str(RECORDS, Ttl::from(3600)).unwrap();
    }

    fn resolve(name: &str) -> Result<Resolution, Error> {
        RESOLVER.resolve(&name.parse().unwrap())
    }

    #[test]
    fn loading_works() {
        assert_eq!(RESOLVER.len(), 3);
        let rrsets = resolve("www.example.").unwrap().into_rrsets();
        let a = rrsets.lookup(Type::A).unwrap();
        assert_eq!(a.ttl, Ttl::from(300));
        assert_eq!(a.rdatas.len(), 2);

        let rrsets = resolve("example.").unwrap().into_rrsets();
        assert_eq!(rrsets.lookup(Type::SOA).unwrap().ttl, Ttl::from(3600));
    }

    #[test]
    fn resolution_is_case_insensitive() {
        assert!(matches!(resolve("WWW.Example."), Ok(Resolution::Match(_))));
    }

    #[test]
    fn empty_non_terminals_are_partial_matches() {
        match resolve("sub.example.") {
            Ok(Resolution::PartialMatch(rrsets)) => assert!(rrsets.is_empty()),
            other => panic!("unexpected resolution {other:?}"),
        }
    }

    #[test]
    fn unknown_names_are_not_found() {
        assert!(matches!(resolve("nope.example."), Err(Error::NotFound)));
        assert!(matches!(resolve("www.www.example."), Err(Error::NotFound)));
        assert!(matches!(resolve("test."), Err(Error::NotFound)));
    }

    #[test]
    fn data_at_a_former_empty_non_terminal_is_a_match() {
        let mut resolver = MemoryResolver::new();
        let rdata = Rdata::from_text(Type::A, "192.0.2.1").unwrap();
        resolver
            .add("a.b.test.".parse().unwrap(), Type::A, Ttl::from(60), rdata.clone())
            .unwrap();
        resolver
            .add("b.test.".parse().unwrap(), Type::A, Ttl::from(60), rdata)
            .unwrap();
        assert!(matches!(
            resolver.resolve(&"b.test.".parse().unwrap()),
            Ok(Resolution::Match(_))
        ));
    }

    #[test]
    fn loading_reports_bad_records() {
        let text = r#"
            [[records]]
            name = "ok.test."
            type = "A"
            data = "192.0.2.1"

            [[records]]
            name = "bad.test."
            type = "A"
            data = "not-an-address"
        "#;
        match MemoryResolver::load_from_str(text, Ttl::from(60)) {
            Err(err @ LoadError::Record { index: 1, .. }) => {
                assert!(err.to_string().contains("bad.test."));
                assert!(err.source().is_some());
            }
            other => panic!("unexpected result {other:?}"),
        }
    }

    #[test]
    fn loading_rejects_meta_types_and_ttl_conflicts() {
        let any = r#"
            [[records]]
            name = "any.test."
            type = "ANY"
            data = "\\# 0"
        "#;
        assert!(matches!(
            MemoryResolver::load_from_str(any, Ttl::from(60)),
            Err(LoadError::Record {
                problem: RecordProblem::MetaType(Type::ANY),
                ..
            })
        ));

        let conflict = r#"
            [[records]]
            name = "x.test."
            type = "A"
            ttl = 60
            data = "192.0.2.1"

            [[records]]
            name = "x.test."
            type = "A"
            ttl = 120
            data = "192.0.2.2"
        "#;
        assert!(matches!(
            MemoryResolver::load_from_str(conflict, Ttl::from(60)),
            Err(LoadError::Record {
                problem: RecordProblem::Add(AddError::TtlMismatch),
                ..
            })
        ));
    }

    #[test]
    fn loading_rejects_unknown_fields() {
        let text = r#"
            [[records]]
            name = "x.test."
            type = "A"
            class = "IN"
            data = "192.0.2.1"
        "#;
        assert!(matches!(
            MemoryResolver::load_from_str(text, Ttl::from(60)),
            Err(LoadError::Syntax(_))
        ));
    }
}
