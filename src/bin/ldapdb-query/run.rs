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

//! Implements the query itself.

use std::fmt::Write;
use std::process;

use anyhow::{anyhow, Context, Result};
use env_logger::Env;
use log::{error, info};

use ldapdb::db::{self, registry, DbType, FindOptions, FindResult, Found};
use ldapdb::driver;
use ldapdb::name::Name;
use ldapdb::rr::Type;

use crate::args::Args;
use crate::config::{self, Config};

/// The longest chain of CNAME records that will be followed.
const MAX_CNAME_CHAIN: usize = 8;

/// Runs the query.
pub fn run(args: Args) {
    env_logger::init_from_env(Env::new().default_filter_or("warn"));

    if let Err(e) = try_running(args) {
        let mut message = String::from("Failed to run:");
        for (i, cause) in e.chain().enumerate() {
            write!(message, "\n[{}] {}", i + 1, cause).unwrap();
        }
        message.push_str("\nExiting with failure.");
        error!("{}", message);
        process::exit(1);
    }
    info!("Exiting with success.");
}

fn try_running(args: Args) -> Result<()> {
    info!("Loading the configuration from {}.", args.config.display());
    let config =
        config::load_from_path(&args.config).context("failed to load the configuration")?;

    for instance in &config.instances {
        driver::init(&instance.name, instance.args.as_slice())
            .with_context(|| format!("failed to set up instance {}", instance.name))?;
    }
    let result = query(&config, &args);
    driver::destroy();
    result
}

/// Looks up `args.name`, following CNAME records unless told not to.
fn query(config: &Config, args: &Args) -> Result<()> {
    let mut name = args.name.clone();
    for _ in 0..=MAX_CNAME_CHAIN {
        let zone = config
            .zone_for(&name)
            .ok_or_else(|| anyhow!("no configured zone contains {name}"))?;
        let db = registry::create(
            driver::IMPLEMENTATION_NAME,
            &zone.origin.0,
            DbType::Zone,
            zone.class.0,
            &[zone.instance.clone()],
        )
        .with_context(|| format!("failed to create the database for {}", zone.origin.0))?;

        match db.find(&name, None, args.rr_type, FindOptions::default(), 0) {
            Ok(FindResult::Success(found)) => {
                print_found(&found);
                db.detach_node(found.node);
                return Ok(());
            }
            Ok(FindResult::Cname(found)) => {
                print_found(&found);
                let target = cname_target(&found);
                db.detach_node(found.node);
                if args.no_follow {
                    return Ok(());
                }
                name = target?;
            }
            Err(db::Error::NxRrset) => {
                println!(";; {name} has no {} records", args.rr_type);
                return Ok(());
            }
            Err(db::Error::NotFound) => {
                println!(";; {name} does not exist");
                return Ok(());
            }
            Err(e) => return Err(e).with_context(|| format!("failed to look up {name}")),
        }
    }
    Err(anyhow!(
        "gave up after following {MAX_CNAME_CHAIN} CNAME records"
    ))
}

/// Prints an answer in zone file format.
fn print_found(found: &Found) {
    let rdataset = &found.rdataset;
    for rdata in rdataset.iter() {
        println!(
            "{}\t{}\t{}\t{}\t{}",
            found.foundname,
            rdataset.ttl(),
            rdataset.class,
            rdataset.rr_type(),
            rdata,
        );
    }
}

/// Extracts the target of the CNAME record in `found`.
fn cname_target(found: &Found) -> Result<Name> {
    debug_assert_eq!(found.rdataset.rr_type(), Type::CNAME);
    let rdata = found
        .rdataset
        .iter()
        .next()
        .ok_or_else(|| anyhow!("the CNAME RRset at {} is empty", found.foundname))?;
    Name::try_from_uncompressed_all(rdata.octets())
        .with_context(|| format!("the CNAME record at {} is invalid", found.foundname))
}
