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

//! Implements the configuration file.
//!
//! ```toml
//! [[instances]]
//! name = "example"
//! args = ["records example.records.toml", "ttl 3600"]
//!
//! [[zones]]
//! origin = "example."
//! class = "IN"  # optional; IN is the only class the driver serves
//! instance = "example"
//! ```

use std::fmt::{self, Write};
use std::fs;
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use log::Level::Debug;
use log::{debug, log_enabled};
use paste::paste;
use serde::{de, Deserialize};

use ldapdb::class::Class;
use ldapdb::name::Name;

////////////////////////////////////////////////////////////////////////
// CONFIGURATION LOADING                                              //
////////////////////////////////////////////////////////////////////////

/// Loads the configuration from the file given by `path`.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<Config> {
    let dir = match path.as_ref().parent() {
        Some(p) => p,
        None => return Err(anyhow!("the configuration file path has no parent")),
    };
    let raw_config =
        fs::read_to_string(path.as_ref()).context("failed to read the configuration file")?;
    let mut config = load_from_str(&raw_config)?;

    // Records file paths are interpreted relative to the configuration
    // file's directory.
    for instance in &mut config.instances {
        for arg in &mut instance.args {
            if let Some(records) = arg.strip_prefix("records ") {
                let records = Path::new(records.trim_start());
                if records.is_relative() {
                    *arg = format!("records {}", dir.join(records).display());
                }
            }
        }
    }

    log_config_summary(&config);
    Ok(config)
}

/// Parses the configuration from TOML text.
pub fn load_from_str(text: &str) -> Result<Config> {
    let config: Config =
        toml::from_str(text).context("failed to parse the configuration file")?;
    for zone in &config.zones {
        if zone.class.0 != Class::IN {
            return Err(anyhow!(
                "zone {}/{} is not of class IN, the only class the driver serves",
                zone.origin.0,
                zone.class.0,
            ));
        }
    }
    Ok(config)
}

/// Summarizes the configuration in the log, if the debug log level is
/// enabled.
fn log_config_summary(config: &Config) {
    if !log_enabled!(Debug) {
        // Don't compute the message if it will never be printed.
        return;
    }

    let mut message = String::from("Configuration loaded:\nInstances: ");
    if config.instances.is_empty() {
        message.push_str("none");
    }
    for instance in &config.instances {
        write!(message, "\n  {} ({} args)", instance.name, instance.args.len()).unwrap();
    }
    message.push_str("\nZones: ");
    if config.zones.is_empty() {
        message.push_str("none");
    }
    for zone in &config.zones {
        write!(
            message,
            "\n  {}/{} -> {}",
            zone.origin.0, zone.class.0, zone.instance,
        )
        .unwrap();
    }
    debug!("{}", message);
}

////////////////////////////////////////////////////////////////////////
// CONFIGURATION FILE STRUCTURE                                       //
////////////////////////////////////////////////////////////////////////

/// The complete configuration file.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub instances: Vec<InstanceConfig>,
    #[serde(default)]
    pub zones: Vec<ZoneConfig>,
}

impl Config {
    /// Returns the configured zone that most closely encloses `name`.
    pub fn zone_for(&self, name: &Name) -> Option<&ZoneConfig> {
        self.zones
            .iter()
            .filter(|zone| name.eq_or_subdomain_of(&zone.origin.0))
            .max_by_key(|zone| zone.origin.0.len())
    }
}

/// A driver instance and the arguments it is set up with.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InstanceConfig {
    pub name: String,
    #[serde(default)]
    pub args: Vec<String>,
}

/// A zone, served by a database bound to the named instance.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ZoneConfig {
    pub origin: ConfigName,
    #[serde(default = "default_zone_class")]
    pub class: ConfigClass,
    pub instance: String,
}

fn default_zone_class() -> ConfigClass {
    ConfigClass(Class::IN)
}

////////////////////////////////////////////////////////////////////////
// WRAPPERS OVER LDAPDB TYPES FOR SERDE                               //
////////////////////////////////////////////////////////////////////////

/// Generates a deserializable `ConfigX` structure wrapping an `X` type
/// from [`ldapdb`], using its [`FromStr`](std::str::FromStr)
/// implementation.
macro_rules! make_serde_wrapper {
    ($wrapper:ident, $over:ty, $description:literal) => {
        /// A macro-generated deserializable wrapper over an [`ldapdb`]
        /// type.
        #[derive(Clone, Debug)]
        pub struct $wrapper(pub $over);

        impl<'de> Deserialize<'de> for $wrapper {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: de::Deserializer<'de>,
            {
                deserializer.deserialize_str(paste! { [<$wrapper Visitor>] })
            }
        }

        paste! {
            /// A macro-generated [`Visitor`](de::Visitor).
            #[derive(Debug)]
            struct [<$wrapper Visitor>];
        }

        impl<'de> de::Visitor<'de> for paste! { [<$wrapper Visitor>] } {
            type Value = $wrapper;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str($description)
            }

            fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                value
                    .parse()
                    .map($wrapper)
                    .map_err(|e| E::custom(format!("invalid {}: {}", $description, e)))
            }
        }
    };
}

make_serde_wrapper!(ConfigName, Name, "domain name");
make_serde_wrapper!(ConfigClass, Class, "DNS class");

#[cfg(test)]
mod tests {
    use super::*;

    const CONFIG: &str = r#"
        [[instances]]
        name = "example"
        args = ["records example.records.toml"]

        [[zones]]
        origin = "example."
        instance = "example"

        [[zones]]
        origin = "sub.example."
        instance = "example"
    "#;

    #[test]
    fn zone_for_picks_the_closest_enclosing_zone() {
        let config = load_from_str(CONFIG).unwrap();
        let zone_for = |name: &str| {
            config
                .zone_for(&name.parse().unwrap())
                .map(|zone| zone.origin.0.to_string())
        };
        assert_eq!(zone_for("www.example."), Some("example.".to_owned()));
        assert_eq!(zone_for("a.sub.example."), Some("sub.example.".to_owned()));
        assert_eq!(zone_for("example."), Some("example.".to_owned()));
        assert_eq!(zone_for("example.com."), None);
    }

    #[test]
    fn zone_class_defaults_to_in() {
        let config = load_from_str(CONFIG).unwrap();
        assert!(config.zones.iter().all(|zone| zone.class.0 == Class::IN));

        let text = r#"
            [[zones]]
            origin = "example."
            class = "in"
            instance = "example"
        "#;
        assert_eq!(load_from_str(text).unwrap().zones[0].class.0, Class::IN);
    }

    #[test]
    fn zones_of_other_classes_are_rejected() {
        let chaos = r#"
            [[zones]]
            origin = "example."
            class = "CH"
            instance = "example"
        "#;
        assert!(load_from_str(chaos).is_err());

        let bogus = r#"
            [[zones]]
            origin = "example."
            class = "XX"
            instance = "example"
        "#;
        assert!(load_from_str(bogus).is_err());
    }

    #[test]
    fn invalid_origins_are_rejected() {
        let text = r#"
            [[zones]]
            origin = "example"
            instance = "example"
        "#;
        assert!(load_from_str(text).is_err());
    }
}
