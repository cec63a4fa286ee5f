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

//! Exercises the driver's process-wide lifecycle. The registry and the
//! instance table are global, so everything happens in a single test.

use std::path::PathBuf;
use std::sync::Arc;

use ldapdb::class::Class;
use ldapdb::db::{self, registry, Database, DbType, FindOptions, FindResult};
use ldapdb::driver::{self, IMPLEMENTATION_NAME};
use ldapdb::name::Name;
use ldapdb::resolver::LoadError;
use ldapdb::rr::{Rdata, Ttl, Type};

fn records_arg() -> String {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/data/example.records.toml");
    format!("records {}", path.display())
}

fn name(text: &str) -> Name {
    text.parse().unwrap()
}

fn create(origin: &str, instance: &str) -> Result<Arc<dyn Database>, db::Error> {
    registry::create(
        IMPLEMENTATION_NAME,
        &name(origin),
        DbType::Zone,
        Class::IN,
        &[instance.to_owned()],
    )
}

fn find(db: &Arc<dyn Database>, owner: &str, rr_type: Type) -> Result<FindResult, db::Error> {
    db.find(&name(owner), None, rr_type, FindOptions::default(), 0)
}

#[test]
fn driver_lifecycle() {
    let records = records_arg();

    // Set-up. A second instance re-registers the implementation, which
    // must count as success.
    driver::init("example", &[records.as_str(), "ttl 600"]).unwrap();
    driver::init("example-default-ttl", &[records.as_str()]).unwrap();
    assert!(registry::is_registered(IMPLEMENTATION_NAME));

    assert!(matches!(
        driver::init("example", &[records.as_str()]),
        Err(driver::Error::Db(db::Error::Exists))
    ));
    assert!(matches!(
        driver::init("no-records", &["ttl 600"]),
        Err(driver::Error::Settings(_))
    ));
    assert!(matches!(
        driver::init("missing-records", &["records /nonexistent/example.records.toml"]),
        Err(driver::Error::Load(LoadError::Io(_)))
    ));

    // Lookups through databases created by the host.
    let db = create("example.", "example").unwrap();
    match find(&db, "www.example.", Type::A) {
        Ok(FindResult::Success(found)) => {
            assert_eq!(found.foundname, name("www.example."));
            assert_eq!(found.rdataset.ttl(), Ttl::from(300));
            assert_eq!(
                found.rdataset.rrset.rdatas,
                [Rdata::from_text(Type::A, "192.0.2.1").unwrap()]
            );
            db.detach_node(found.node);
        }
        other => panic!("unexpected result {other:?}"),
    }
    assert!(matches!(
        find(&db, "www.example.", Type::MX),
        Err(db::Error::NxRrset)
    ));
    match find(&db, "alias.example.", Type::A) {
        Ok(FindResult::Cname(found)) => {
            assert_eq!(found.rdataset.rr_type(), Type::CNAME);
            let target = found.rdataset.iter().next().unwrap();
            assert_eq!(
                Name::try_from_uncompressed_all(target.octets()).unwrap(),
                name("canon.example.")
            );
        }
        other => panic!("unexpected result {other:?}"),
    }
    assert!(matches!(
        find(&db, "nope.example.", Type::A),
        Err(db::Error::NotFound)
    ));

    // Records without a TTL get the instance's default.
    let soa = find(&db, "example.", Type::SOA).unwrap().into_found();
    assert_eq!(soa.rdataset.ttl(), Ttl::from(600));
    let db_default = create("example.", "example-default-ttl").unwrap();
    let soa = find(&db_default, "example.", Type::SOA).unwrap().into_found();
    assert_eq!(soa.rdataset.ttl(), Ttl::from(86400));

    assert!(matches!(
        create("example.", "unknown"),
        Err(db::Error::NotFound)
    ));

    // Tear-down. Databases that are still held keep their resolvers.
    driver::destroy();
    assert!(!registry::is_registered(IMPLEMENTATION_NAME));
    assert!(matches!(
        create("example.", "example"),
        Err(db::Error::NotFound)
    ));
    assert!(matches!(
        find(&db, "www.example.", Type::A),
        Ok(FindResult::Success(_))
    ));
    driver::destroy();

    // The driver can be set up again afterwards.
    driver::init("example", &[records.as_str()]).unwrap();
    assert!(create("example.", "example").is_ok());
    driver::destroy();
}
