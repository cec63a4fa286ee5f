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

//! The process-wide table of configured [`Resolver`] instances.
//!
//! The driver binds each configured instance here under its name, and
//! databases look up their instance by that name when they are created.

use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use lazy_static::lazy_static;
use log::debug;

use crate::db::Error;
use crate::resolver::Resolver;

lazy_static! {
    static ref INSTANCES: RwLock<HashMap<String, Arc<dyn Resolver>>> = RwLock::new(HashMap::new());
}

/// Returns a handle to the instance named `name`, or fails with
/// [`Error::NotFound`].
pub fn get_instance(name: &str) -> Result<Arc<dyn Resolver>, Error> {
    read().get(name).cloned().ok_or(Error::NotFound)
}

/// Binds `resolver` under `name`. This fails with [`Error::Exists`] if
/// the name is already bound, in which case `resolver` is dropped.
pub fn add_instance(name: &str, resolver: Arc<dyn Resolver>) -> Result<(), Error> {
    let mut instances = write();
    if instances.contains_key(name) {
        return Err(Error::Exists);
    }
    instances.insert(name.to_owned(), resolver);
    debug!("Added resolver instance {name}.");
    Ok(())
}

/// Removes all instances. Databases created from them keep their own
/// handles, so an instance lives on until its last database is gone.
pub fn destroy_all() {
    let mut instances = write();
    let count = instances.len();
    instances.clear();
    debug!("Destroyed {count} resolver instance(s).");
}

// Poisoning is ignored: every critical section leaves the map intact.

fn read() -> RwLockReadGuard<'static, HashMap<String, Arc<dyn Resolver>>> {
    INSTANCES.read().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn write() -> RwLockWriteGuard<'static, HashMap<String, Arc<dyn Resolver>>> {
    INSTANCES
        .write()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

////////////////////////////////////////////////////////////////////////
// TESTS                                                              //
////////////////////////////////////////////////////////////////////////

// These tests share the table with every other unit test in the crate,
// so each uses its own instance names and none calls destroy_all.
#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::MemoryResolver;

    #[test]
    fn instances_can_be_added_and_retrieved() {
        let resolver: Arc<dyn Resolver> = Arc::new(MemoryResolver::new());
        add_instance("manager-test-add", Arc::clone(&resolver)).unwrap();
        let retrieved = get_instance("manager-test-add").unwrap();
        assert!(Arc::ptr_eq(&resolver, &retrieved));
    }

    #[test]
    fn duplicate_instances_are_rejected() {
        add_instance("manager-test-dup", Arc::new(MemoryResolver::new())).unwrap();
        assert_eq!(
            add_instance("manager-test-dup", Arc::new(MemoryResolver::new())),
            Err(Error::Exists)
        );
    }

    #[test]
    fn unknown_instances_are_not_found() {
        assert!(matches!(
            get_instance("manager-test-unknown"),
            Err(Error::NotFound)
        ));
    }
}
