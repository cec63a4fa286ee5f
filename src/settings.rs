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

//! Parsing of driver instance arguments.
//!
//! The host passes each instance a list of arguments of the form
//! `"key value"`. The recognized keys are:
//!
//! * `records` (required): the path of the TOML records file to serve.
//! * `ttl`: the TTL, in seconds, of records that do not specify one.
//!   Defaults to 86,400.

use std::fmt;
use std::path::PathBuf;

use crate::rr::Ttl;

/// The TTL used when neither the records nor the settings give one.
pub const DEFAULT_TTL: u32 = 86400;

/// The settings of a driver instance.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Settings {
    pub records: PathBuf,
    pub default_ttl: Ttl,
}

impl Settings {
    /// Parses instance arguments.
    pub fn parse<S: AsRef<str>>(args: &[S]) -> Result<Self, Error> {
        let mut records = None;
        let mut default_ttl = None;

        for arg in args {
            let arg = arg.as_ref().trim();
            let (key, value) = match arg.split_once(char::is_whitespace) {
                Some((key, value)) => (key, value.trim_start()),
                None => return Err(Error::MissingValue(arg.to_owned())),
            };
            match key {
                "records" => set_once(&mut records, key, PathBuf::from(value))?,
                "ttl" => {
                    let ttl = value.parse::<Ttl>().map_err(Error::InvalidTtl)?;
                    set_once(&mut default_ttl, key, ttl)?
                }
                _ => return Err(Error::UnknownKey(key.to_owned())),
            }
        }

        Ok(Self {
            records: records.ok_or(Error::MissingKey("records"))?,
            default_ttl: default_ttl.unwrap_or_else(|| Ttl::from(DEFAULT_TTL)),
        })
    }
}

fn set_once<T>(slot: &mut Option<T>, key: &str, value: T) -> Result<(), Error> {
    if slot.is_some() {
        Err(Error::DuplicateKey(key.to_owned()))
    } else {
        *slot = Some(value);
        Ok(())
    }
}

/// Errors that arise when parsing instance arguments.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Error {
    MissingValue(String),
    UnknownKey(String),
    DuplicateKey(String),
    MissingKey(&'static str),
    InvalidTtl(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::MissingValue(key) => write!(f, "argument {key} has no value"),
            Self::UnknownKey(key) => write!(f, "unknown argument {key}"),
            Self::DuplicateKey(key) => write!(f, "argument {key} given more than once"),
            Self::MissingKey(key) => write!(f, "required argument {key} is missing"),
            Self::InvalidTtl(msg) => write!(f, "invalid ttl: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parsing_works() {
        let settings = Settings::parse(&["records /etc/example.toml", "ttl  300"]).unwrap();
        assert_eq!(settings.records, PathBuf::from("/etc/example.toml"));
        assert_eq!(settings.default_ttl, Ttl::from(300));
    }

    #[test]
    fn ttl_defaults() {
        let settings = Settings::parse(&["records x.toml"]).unwrap();
        assert_eq!(settings.default_ttl, Ttl::from(DEFAULT_TTL));
    }

    #[test]
    fn parsing_rejects_bad_arguments() {
        let no_args: [&str; 0] = [];
        assert_eq!(Settings::parse(&no_args), Err(Error::MissingKey("records")));
        assert_eq!(
            Settings::parse(&["records"]),
            Err(Error::MissingValue("records".to_owned()))
        );
        assert_eq!(
            Settings::parse(&["records a", "records b"]),
            Err(Error::DuplicateKey("records".to_owned()))
        );
        assert_eq!(
            Settings::parse(&["records a", "uri ldap://localhost"]),
            Err(Error::UnknownKey("uri".to_owned()))
        );
        assert!(matches!(
            Settings::parse(&["records a", "ttl forever"]),
            Err(Error::InvalidTtl(_))
        ));
    }
}
