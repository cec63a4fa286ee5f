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

//! Checks that databases and nodes leave nothing allocated behind,
//! using a global allocator that counts live allocations per thread.

use std::alloc::{GlobalAlloc, Layout, System};
use std::cell::Cell;
use std::sync::Arc;

use ldapdb::class::Class;
use ldapdb::db::{DbType, Error, FindOptions, FindResult};
use ldapdb::ldapdb::LdapDb;
use ldapdb::manager;
use ldapdb::name::Name;
use ldapdb::resolver::MemoryResolver;
use ldapdb::rr::{Rdata, Ttl, Type};

////////////////////////////////////////////////////////////////////////
// COUNTING ALLOCATOR                                                 //
////////////////////////////////////////////////////////////////////////

struct CountingAllocator;

thread_local! {
    static LIVE: Cell<isize> = const { Cell::new(0) };
}

unsafe impl GlobalAlloc for CountingAllocator {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        let _ = LIVE.try_with(|live| live.set(live.get() + 1));
        System.alloc(layout)
    }

    unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
        let _ = LIVE.try_with(|live| live.set(live.get() - 1));
        System.dealloc(ptr, layout)
    }
}

#[global_allocator]
static ALLOCATOR: CountingAllocator = CountingAllocator;

/// Returns the number of allocations made by this thread that are
/// still live.
fn live() -> isize {
    LIVE.with(Cell::get)
}

////////////////////////////////////////////////////////////////////////
// TESTS                                                              //
////////////////////////////////////////////////////////////////////////

fn origin() -> Name {
    "example.".parse().unwrap()
}

#[test]
fn failed_create_leaves_nothing_allocated() {
    let origin = origin();
    let args = vec!["allocation-test-missing".to_owned()];

    // The first call initializes the instance table.
    assert!(matches!(
        LdapDb::create(&origin, DbType::Zone, Class::IN, &args),
        Err(Error::NotFound)
    ));

    let before = live();
    let result = LdapDb::create(&origin, DbType::Zone, Class::IN, &args);
    assert!(matches!(result, Err(Error::NotFound)));
    drop(result);
    assert_eq!(live(), before);
}

#[test]
fn lookups_leave_nothing_allocated() {
    let mut resolver = MemoryResolver::new();
    resolver
        .add(
            "www.example.".parse().unwrap(),
            Type::A,
            Ttl::from(300),
            Rdata::from_text(Type::A, "192.0.2.1").unwrap(),
        )
        .unwrap();
    manager::add_instance("allocation-test-lookups", Arc::new(resolver)).unwrap();
    let origin = origin();
    let www: Name = "www.example.".parse().unwrap();
    let args = vec!["allocation-test-lookups".to_owned()];

    let before = live();
    let db = match LdapDb::create(&origin, DbType::Zone, Class::IN, &args) {
        Ok(db) => db,
        Err(err) => panic!("failed to create database: {err}"),
    };
    for rr_type in [Type::A, Type::MX] {
        match db.find(&www, None, rr_type, FindOptions::default(), 0) {
            Ok(FindResult::Success(found)) => db.detach_node(found.node),
            Err(Error::NxRrset) => (),
            other => panic!("unexpected result {other:?}"),
        }
    }
    let node = db.find_node(&www, false).unwrap();
    let attached = db.attach_node(&node);
    db.detach_node(node);
    db.detach_node(attached);
    drop(db);
    assert_eq!(live(), before);
}
