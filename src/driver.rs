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

//! Registration of the [`LdapDb`] implementation with the host.
//!
//! The host calls [`init`] once per configured driver instance, and
//! [`destroy`] once at shutdown. The first [`init`] registers
//! [`LdapDb::create`] under [`IMPLEMENTATION_NAME`]; every call builds
//! a resolver from the instance's arguments (see [`crate::settings`])
//! and binds it in the [`manager`] under the instance's name. The host
//! then creates databases with
//! [`registry::create`](crate::db::registry::create), passing the
//! instance name as the first argument.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};

use lazy_static::lazy_static;
use log::{debug, info};

use crate::db::{self, registry, registry::Implementation};
use crate::ldapdb::LdapDb;
use crate::manager;
use crate::resolver::{LoadError, MemoryResolver};
use crate::settings::{self, Settings};

/// The name the implementation is registered under.
pub const IMPLEMENTATION_NAME: &str = "dynamic-ldap";

lazy_static! {
    static ref IMPLEMENTATION: Mutex<Option<Implementation>> = Mutex::new(None);
}

/// Sets up the driver instance `instance_name` from its arguments.
///
/// Registering the implementation is idempotent: if it is already
/// registered, that counts as success. If the instance cannot be bound
/// (for instance, because the name is taken), its resolver is
/// destroyed again before the error is returned.
pub fn init<S: AsRef<str>>(instance_name: &str, args: &[S]) -> Result<(), Error> {
    debug!("Registering dynamic ldap driver for {instance_name}.");
    for arg in args {
        debug!("Arg: {}", arg.as_ref());
    }

    {
        let mut implementation = lock();
        match registry::register(IMPLEMENTATION_NAME, LdapDb::create) {
            Ok(registered) => *implementation = Some(registered),
            Err(db::Error::Exists) => (),
            Err(err) => return Err(err.into()),
        }
    }

    let settings = Settings::parse(args)?;
    let resolver = MemoryResolver::load_from_path(&settings.records, settings.default_ttl)?;
    let names = resolver.len();
    manager::add_instance(instance_name, Arc::new(resolver))?;
    info!("Driver instance {instance_name} is serving {names} names.");
    Ok(())
}

/// Unregisters the implementation and destroys all instances. Calling
/// this again does nothing.
pub fn destroy() {
    if let Some(implementation) = lock().take() {
        registry::unregister(implementation);
    }
    manager::destroy_all();
}

fn lock() -> MutexGuard<'static, Option<Implementation>> {
    IMPLEMENTATION
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

////////////////////////////////////////////////////////////////////////
// ERRORS                                                             //
////////////////////////////////////////////////////////////////////////

/// Errors that arise when setting up a driver instance.
#[derive(Debug)]
pub enum Error {
    /// Registration or instance binding failed.
    Db(db::Error),

    /// The instance arguments are invalid.
    Settings(settings::Error),

    /// The records could not be loaded.
    Load(LoadError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Db(err) => write!(f, "failed to set up the instance: {err}"),
            Self::Settings(_) => f.write_str("invalid instance arguments"),
            Self::Load(_) => f.write_str("failed to load the instance's records"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Db(_) => None,
            Self::Settings(err) => Some(err),
            Self::Load(err) => Some(err),
        }
    }
}

impl From<db::Error> for Error {
    fn from(err: db::Error) -> Self {
        Self::Db(err)
    }
}

impl From<settings::Error> for Error {
    fn from(err: settings::Error) -> Self {
        Self::Settings(err)
    }
}

impl From<LoadError> for Error {
    fn from(err: LoadError) -> Self {
        Self::Load(err)
    }
}
