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

//! Implementation of the [`Rdata`] type.

use std::fmt::{self, Write};

use super::Type;
use crate::name;
use crate::util::nibble_to_ascii_hex_digit;

mod text;

/// The largest permissible RDATA length.
pub const MAX_RDATA_LEN: usize = u16::MAX as usize;

////////////////////////////////////////////////////////////////////////
// RDATA TYPE                                                         //
////////////////////////////////////////////////////////////////////////

/// A type for record RDATA.
///
/// The RDATA of a record is limited to 65,535 octets. The `Rdata` type
/// owns its octets in uncompressed wire format and can only be
/// constructed if they have a valid length.
#[derive(Clone, Eq, Hash, PartialEq)]
pub struct Rdata {
    octets: Box<[u8]>,
}

impl Rdata {
    /// Returns the octets of this `Rdata`.
    pub fn octets(&self) -> &[u8] {
        &self.octets
    }

    /// Returns the length of this `Rdata`.
    pub fn len(&self) -> usize {
        self.octets.len()
    }

    /// Returns whether this `Rdata` is empty.
    pub fn is_empty(&self) -> bool {
        self.octets.is_empty()
    }

    /// Parses RDATA of type `rr_type` from presentation format.
    ///
    /// The RFC 3597 generic syntax (`\# <length> <hex>`) is accepted for
    /// every type. Otherwise, type-specific syntax is supported for A,
    /// NS, CNAME, SOA, PTR, MX, TXT, and AAAA records. TXT data is
    /// either a sequence of quoted character-strings (`"a" "b"`) or,
    /// if it does not start with a double quote, the record's text
    /// taken whole and split into character-strings of at most 255
    /// octets.
    pub fn from_text(rr_type: Type, text: &str) -> Result<Self, ParseError> {
        text::parse(rr_type, text)
    }
}

impl TryFrom<Vec<u8>> for Rdata {
    type Error = RdataTooLongError;

    fn try_from(octets: Vec<u8>) -> Result<Self, Self::Error> {
        if octets.len() > MAX_RDATA_LEN {
            Err(RdataTooLongError)
        } else {
            Ok(Self {
                octets: octets.into_boxed_slice(),
            })
        }
    }
}

impl TryFrom<&[u8]> for Rdata {
    type Error = RdataTooLongError;

    fn try_from(octets: &[u8]) -> Result<Self, Self::Error> {
        octets.to_vec().try_into()
    }
}

impl AsRef<[u8]> for Rdata {
    fn as_ref(&self) -> &[u8] {
        &self.octets
    }
}

/// Formats the RDATA in the generic syntax of [RFC 3597 § 5].
///
/// [RFC 3597 § 5]: https://datatracker.ietf.org/doc/html/rfc3597#section-5
impl fmt::Display for Rdata {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "\\# {}", self.octets.len())?;
        if !self.octets.is_empty() {
            f.write_char(' ')?;
            for octet in self.octets.iter() {
                f.write_char(nibble_to_ascii_hex_digit(octet >> 4) as char)?;
                f.write_char(nibble_to_ascii_hex_digit(octet & 0xf) as char)?;
            }
        }
        Ok(())
    }
}

impl fmt::Debug for Rdata {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "\"{self}\"")
    }
}

////////////////////////////////////////////////////////////////////////
// ERRORS                                                             //
////////////////////////////////////////////////////////////////////////

/// An error signaling that octets are too long to be RDATA.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct RdataTooLongError;

impl fmt::Display for RdataTooLongError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("RDATA is longer than 65,535 octets")
    }
}

impl std::error::Error for RdataTooLongError {}

/// Errors that arise when parsing RDATA from presentation format.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ParseError {
    /// The RDATA had fewer fields than its type requires.
    MissingField,

    /// The RDATA had more fields than its type allows.
    ExtraField,

    /// An address field was invalid.
    InvalidAddress,

    /// An integer field was invalid or out of range.
    InvalidInteger,

    /// The RFC 3597 generic syntax was malformed, or its length did not
    /// match the data given.
    InvalidGeneric,

    /// An embedded domain name was invalid.
    InvalidName(name::Error),

    /// A quoted character-string was unterminated, malformed, or longer
    /// than 255 octets.
    InvalidString,

    /// The RDATA was longer than 65,535 octets.
    TooLong,

    /// Presentation format for the type is not supported; use the
    /// generic syntax instead.
    UnsupportedType(Type),
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::MissingField => f.write_str("a required field is missing"),
            Self::ExtraField => f.write_str("there are too many fields"),
            Self::InvalidAddress => f.write_str("invalid address"),
            Self::InvalidInteger => f.write_str("invalid integer"),
            Self::InvalidGeneric => f.write_str("invalid RFC 3597 generic RDATA"),
            Self::InvalidName(_) => f.write_str("invalid domain name"),
            Self::InvalidString => f.write_str("invalid character-string"),
            Self::TooLong => fmt::Display::fmt(&RdataTooLongError, f),
            Self::UnsupportedType(rr_type) => write!(
                f,
                "presentation format for {rr_type} is not supported; use \\# syntax"
            ),
        }
    }
}

impl std::error::Error for ParseError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::InvalidName(err) => Some(err),
            _ => None,
        }
    }
}

impl From<name::Error> for ParseError {
    fn from(err: name::Error) -> Self {
        Self::InvalidName(err)
    }
}

impl From<RdataTooLongError> for ParseError {
    fn from(_: RdataTooLongError) -> Self {
        Self::TooLong
    }
}

////////////////////////////////////////////////////////////////////////
// TESTS                                                              //
////////////////////////////////////////////////////////////////////////
