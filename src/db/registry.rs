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

//! The process-wide registry of database implementations.
//!
//! A database implementation registers a constructor under a name. The
//! host then instantiates databases for its configured zones with
//! [`create`], naming the implementation to use.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use lazy_static::lazy_static;
use log::debug;

use super::{Database, DbType, Error};
use crate::class::Class;
use crate::name::Name;

/// The constructor signature of a database implementation.
pub type CreateFn =
    fn(origin: &Name, db_type: DbType, class: Class, args: &[String]) -> Result<Arc<dyn Database>, Error>;

lazy_static! {
    static ref IMPLEMENTATIONS: Mutex<HashMap<String, CreateFn>> = Mutex::new(HashMap::new());
}

/// A registration of a database implementation, returned by
/// [`register`]. Pass it to [`unregister`] to remove the registration.
#[derive(Debug)]
pub struct Implementation {
    name: String,
}

impl Implementation {
    /// Returns the name the implementation is registered under.
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Registers the database constructor `create` under `name`. This fails
/// with [`Error::Exists`] if the name is already taken.
pub fn register(name: &str, create: CreateFn) -> Result<Implementation, Error> {
    let mut implementations = lock();
    if implementations.contains_key(name) {
        return Err(Error::Exists);
    }
    implementations.insert(name.to_owned(), create);
    debug!("Registered database implementation {name}.");
    Ok(Implementation {
        name: name.to_owned(),
    })
}

/// Removes a registration made by [`register`].
pub fn unregister(implementation: Implementation) {
    lock().remove(&implementation.name);
    debug!("Unregistered database implementation {}.", implementation.name);
}

/// Creates a database using the implementation registered under
/// `impname`. This fails with [`Error::NotFound`] if there is no such
/// implementation; otherwise the implementation's constructor decides.
pub fn create(
    impname: &str,
    origin: &Name,
    db_type: DbType,
    class: Class,
    args: &[String],
) -> Result<Arc<dyn Database>, Error> {
    // The constructor runs without the registry locked.
    let create = *lock().get(impname).ok_or(Error::NotFound)?;
    create(origin, db_type, class, args)
}

/// Returns whether an implementation is registered under `name`.
pub fn is_registered(name: &str) -> bool {
    lock().contains_key(name)
}

/// Locks the registry. A panic while the lock was held cannot leave the
/// map itself inconsistent, so poisoning is ignored.
fn lock() -> std::sync::MutexGuard<'static, HashMap<String, CreateFn>> {
    IMPLEMENTATIONS
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

////////////////////////////////////////////////////////////////////////
// TESTS                                                              //
////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;

    fn refuse(_: &Name, _: DbType, _: Class, _: &[String]) -> Result<Arc<dyn Database>, Error> {
        Err(Error::NotImplemented)
    }

    #[test]
    fn registration_works() {
        let name = "registry-test-registration";
        let implementation = register(name, refuse).unwrap();
        assert_eq!(implementation.name(), name);
        assert!(is_registered(name));
        assert!(matches!(register(name, refuse), Err(Error::Exists)));

        let origin = Name::root();
        assert!(matches!(
            create(name, &origin, DbType::Zone, Class::IN, &[]),
            Err(Error::NotImplemented)
        ));

        unregister(implementation);
        assert!(!is_registered(name));
        assert!(matches!(
            create(name, &origin, DbType::Zone, Class::IN, &[]),
            Err(Error::NotFound)
        ));
    }
}
