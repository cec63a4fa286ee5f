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

//! Provides the [`Ttl`] structure for DNS RR TTLs.

use std::fmt;
use std::str::FromStr;

/// The time to live (TTL) of a DNS record.
///
/// [RFC 2181 § 8] defines TTL values as unsigned integers between 0 and
/// 2³¹ - 1, inclusive, and says that a value with the most significant
/// bit set is to be treated as zero. `Ttl::from(u32)` implements that
/// rule, so every `Ttl` holds a value in range.
///
/// [RFC 2181 § 8]: https://datatracker.ietf.org/doc/html/rfc2181#section-8
#[derive(Clone, Copy, Eq, Hash, PartialEq, PartialOrd, Ord)]
pub struct Ttl(u32);

impl From<u32> for Ttl {
    fn from(raw: u32) -> Self {
        if raw > i32::MAX as u32 {
            Self(0)
        } else {
            Self(raw)
        }
    }
}

impl From<Ttl> for u32 {
    fn from(ttl: Ttl) -> Self {
        ttl.0
    }
}

/// Parses a TTL given in seconds. Unlike `Ttl::from(u32)`, an
/// out-of-range value is an error here, since it can only come from a
/// configuration mistake.
impl FromStr for Ttl {
    type Err = &'static str;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        match text.parse::<u32>() {
            Ok(value) if value <= i32::MAX as u32 => Ok(Self(value)),
            Ok(_) => Err("TTL is larger than 2147483647 seconds"),
            Err(_) => Err("TTL is not a valid unsigned integer"),
        }
    }
}

impl fmt::Debug for Ttl {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for Ttl {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn large_wire_ttls_become_zero() {
        assert_eq!(u32::from(Ttl::from(300)), 300);
        assert_eq!(u32::from(Ttl::from(i32::MAX as u32 + 1)), 0);
    }

    #[test]
    fn parsing_rejects_out_of_range_ttls() {
        assert_eq!("86400".parse::<Ttl>(), Ok(Ttl::from(86400)));
        assert!("2147483648".parse::<Ttl>().is_err());
        assert!("-1".parse::<Ttl>().is_err());
    }
}
