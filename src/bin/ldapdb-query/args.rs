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

//! Implements command-line argument parsing.

use std::path::PathBuf;

use clap::Parser;

use ldapdb::name::Name;
use ldapdb::rr::Type;

/// Parses the command line arguments.
pub fn parse() -> Args {
    Args::parse()
}

/// Look up records through the dynamic-ldap database
#[derive(Debug, Parser)]
#[clap(author, version)]
pub struct Args {
    /// Set the configuration file to use
    #[clap(long, value_name = "FILE")]
    pub config: PathBuf,

    /// Set the RR type to look up
    #[clap(long = "type", short = 't', default_value = "A", value_name = "TYPE")]
    pub rr_type: Type,

    /// Print CNAME records instead of following them
    #[clap(long)]
    pub no_follow: bool,

    /// The fully qualified domain name to look up
    #[clap(value_name = "NAME")]
    pub name: Name,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn args_parse() {
        let args = Args::try_parse_from([
            "ldapdb-query",
            "--config",
            "query.toml",
            "--type",
            "mx",
            "www.example.",
        ])
        .unwrap();
        assert_eq!(args.config, PathBuf::from("query.toml"));
        assert_eq!(args.rr_type, Type::MX);
        assert!(!args.no_follow);
        assert_eq!(args.name, "www.example.".parse().unwrap());
    }

    #[test]
    fn type_defaults_to_a() {
        let args =
            Args::try_parse_from(["ldapdb-query", "--config", "q.toml", "example."]).unwrap();
        assert_eq!(args.rr_type, Type::A);
    }

    #[test]
    fn relative_names_are_rejected() {
        assert!(Args::try_parse_from(["ldapdb-query", "--config", "q.toml", "www"]).is_err());
    }
}
