// Copyright 2021 Matthew Ingwersen.
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

//! Implementation of data structures related to domain names.

use std::collections::TryReserveError;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::iter::FusedIterator;
use std::str::FromStr;

use arrayvec::ArrayVec;

mod error;
pub use error::Error;

/// The maximum number of labels in a domain name.
const MAX_N_LABELS: usize = 128;

/// The maximum length of the uncompressed on-the-wire representation of
/// a domain name.
const MAX_WIRE_LEN: usize = 255;

/// The maximum length of a label in a domain name (not including the
/// octet that provides the length).
const MAX_LABEL_LEN: usize = 63;

////////////////////////////////////////////////////////////////////////
// NAME STRUCTURE                                                     //
////////////////////////////////////////////////////////////////////////

/// An owned, fully qualified domain name.
///
/// A `Name` keeps the uncompressed on-the-wire representation of the
/// name ([RFC 1035 § 3.1]) along with the offset of each label within
/// it, so that individual labels and superdomains can be reached
/// without re-parsing. Both are always present; there is no "name
/// without offsets" in this crate.
///
/// Comparison and hashing are ASCII-case-insensitive, per RFC 4343.
///
/// Since stores copy names into the objects they hand out, `Name` also
/// provides [`Name::try_clone`], which reports allocation failure
/// instead of aborting the process.
///
/// [RFC 1035 § 3.1]: https://datatracker.ietf.org/doc/html/rfc1035#section-3.1
#[derive(Clone)]
pub struct Name {
    label_offsets: ArrayVec<u8, MAX_N_LABELS>,
    wire: Box<[u8]>,
}

#[allow(clippy::len_without_is_empty)] // A domain name is never empty!
impl Name {
    /// Returns the name of the DNS root, `.`.
    pub fn root() -> Self {
        let mut label_offsets = ArrayVec::new();
        label_offsets.push(0);
        Self {
            label_offsets,
            wire: Box::new([0]),
        }
    }

    /// Returns whether the `Name` is the DNS root `.`.
    pub fn is_root(&self) -> bool {
        self.len() == 1
    }

    /// Returns the number of labels in this `Name`, including the
    /// terminal null label.
    pub fn len(&self) -> usize {
        self.label_offsets.len()
    }

    /// Returns the offsets of the labels in the `Name`'s on-the-wire
    /// representation.
    pub fn label_offsets(&self) -> &[u8] {
        &self.label_offsets
    }

    /// Returns the (uncompressed) on-the-wire representation of the
    /// `Name`.
    pub fn wire_repr(&self) -> &[u8] {
        &self.wire
    }

    /// Returns the octets of label `n`, not including the length octet.
    /// This panics if `n >= self.len()`.
    pub fn label(&self, n: usize) -> &[u8] {
        let offset = self.label_offsets[n] as usize;
        let len = self.wire[offset] as usize;
        &self.wire[offset + 1..offset + 1 + len]
    }

    /// Returns an iterator over the labels of this `Name`.
    pub fn labels(&self) -> Labels<'_> {
        Labels {
            name: self,
            front: 0,
            back: self.len(),
        }
    }

    /// Returns whether this `Name` is equal to or a subdomain of
    /// `other`.
    pub fn eq_or_subdomain_of(&self, other: &Name) -> bool {
        self.len() >= other.len()
            && self
                .labels()
                .rev()
                .zip(other.labels().rev())
                .all(|(a, b)| a.eq_ignore_ascii_case(b))
    }

    /// Returns the superdomain obtained by skipping the first `skip`
    /// labels of the `Name`, or `None` if there aren't enough labels.
    pub fn superdomain(&self, skip: usize) -> Option<Self> {
        if skip >= self.len() {
            return None;
        }
        let start = self.label_offsets[skip];
        Some(Self {
            label_offsets: self.label_offsets[skip..]
                .iter()
                .map(|offset| offset - start)
                .collect(),
            wire: self.wire[start as usize..].into(),
        })
    }

    /// Duplicates the `Name`, including its label offsets, reporting
    /// allocation failure rather than aborting.
    pub fn try_clone(&self) -> Result<Self, TryReserveError> {
        let mut wire = Vec::new();
        wire.try_reserve_exact(self.wire.len())?;
        wire.extend_from_slice(&self.wire);
        Ok(Self {
            label_offsets: self.label_offsets.clone(),
            wire: wire.into_boxed_slice(),
        })
    }

    /// Parses an uncompressed on-the-wire name that occupies all of
    /// `octets`. This is how domain names embedded in RDATA (e.g. the
    /// target of a CNAME record) are recovered.
    pub fn try_from_uncompressed_all(octets: &[u8]) -> Result<Self, Error> {
        let mut builder = NameBuilder::new();
        let mut cursor = 0;
        loop {
            let len = *octets.get(cursor).ok_or(Error::UnexpectedEom)? as usize;
            if len > MAX_LABEL_LEN {
                return Err(Error::LabelTooLong);
            }
            let label = octets
                .get(cursor + 1..cursor + 1 + len)
                .ok_or(Error::UnexpectedEom)?;
            cursor += 1 + len;
            if len == 0 {
                break;
            }
            for octet in label {
                builder.try_push(*octet)?;
            }
            builder.next_label()?;
        }
        if cursor != octets.len() {
            Err(Error::ExtraData)
        } else {
            builder.finish()
        }
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.is_root() {
            return f.write_str(".");
        }
        for label in self.labels().take(self.len() - 1) {
            for octet in label {
                match *octet {
                    b'.' => f.write_str("\\.")?,
                    b'\\' => f.write_str("\\\\")?,
                    o if o.is_ascii_graphic() => write!(f, "{}", o as char)?,
                    o => write!(f, "\\{o:03}")?,
                }
            }
            f.write_str(".")?;
        }
        Ok(())
    }
}

impl fmt::Debug for Name {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "\"{self}\"")
    }
}

/// In accordance with RFC 1034 § 3.1 (clarified by RFC 4343),
/// comparison of `Name`s is ASCII-case-insensitive.
impl PartialEq for Name {
    fn eq(&self, other: &Self) -> bool {
        self.wire.eq_ignore_ascii_case(&other.wire)
    }
}

impl Eq for Name {}

impl Hash for Name {
    fn hash<H: Hasher>(&self, state: &mut H) {
        // Hashing must be case-insensitive to agree with PartialEq.
        for octet in self.wire.iter() {
            state.write_u8(octet.to_ascii_lowercase());
        }
    }
}

////////////////////////////////////////////////////////////////////////
// ITERATION OVER A NAME'S LABELS                                     //
////////////////////////////////////////////////////////////////////////

/// An iterator over the labels of a [`Name`], produced by
/// [`Name::labels`].
#[derive(Clone, Debug)]
pub struct Labels<'a> {
    name: &'a Name,
    front: usize,
    back: usize,
}

impl<'a> Iterator for Labels<'a> {
    type Item = &'a [u8];

    fn next(&mut self) -> Option<Self::Item> {
        if self.front < self.back {
            self.front += 1;
            Some(self.name.label(self.front - 1))
        } else {
            None
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let len = self.back - self.front;
        (len, Some(len))
    }
}

impl DoubleEndedIterator for Labels<'_> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.back > self.front {
            self.back -= 1;
            Some(self.name.label(self.back))
        } else {
            None
        }
    }
}

impl ExactSizeIterator for Labels<'_> {}

impl FusedIterator for Labels<'_> {}

////////////////////////////////////////////////////////////////////////
// NAME CONSTRUCTION                                                  //
////////////////////////////////////////////////////////////////////////

/// Builds a [`Name`] label by label in fixed-size buffers, so that only
/// the final [`NameBuilder::finish`] allocates.
struct NameBuilder {
    wire: ArrayVec<u8, MAX_WIRE_LEN>,
    label_offsets: ArrayVec<u8, MAX_N_LABELS>,
    label_start: usize,
}

impl NameBuilder {
    /// Starts a new name whose first label is empty.
    fn new() -> Self {
        let mut wire = ArrayVec::new();
        wire.push(0);
        let mut label_offsets = ArrayVec::new();
        label_offsets.push(0);
        Self {
            wire,
            label_offsets,
            label_start: 0,
        }
    }

    fn current_label_len(&self) -> usize {
        self.wire[self.label_start] as usize
    }

    /// Adds an octet to the current label.
    fn try_push(&mut self, octet: u8) -> Result<(), Error> {
        if self.current_label_len() >= MAX_LABEL_LEN {
            return Err(Error::LabelTooLong);
        }
        self.wire.try_push(octet).or(Err(Error::NameTooLong))?;
        self.wire[self.label_start] += 1;
        Ok(())
    }

    /// Closes the current label and starts a new, empty one.
    fn next_label(&mut self) -> Result<(), Error> {
        if self.current_label_len() == 0 {
            return Err(Error::NullNonTerminal);
        }
        let start = self.wire.len();
        self.wire.try_push(0).or(Err(Error::NameTooLong))?;
        self.label_offsets
            .try_push(start as u8)
            .or(Err(Error::NameTooLong))?;
        self.label_start = start;
        Ok(())
    }

    /// Finishes the name, which must end with the null label.
    fn finish(self) -> Result<Name, Error> {
        if self.current_label_len() != 0 {
            Err(Error::NonNullTerminal)
        } else {
            Ok(Name {
                label_offsets: self.label_offsets,
                wire: self.wire.as_slice().into(),
            })
        }
    }
}

/// Parses a fully qualified domain name in presentation format. The
/// string must be strictly ASCII. Escape sequences as defined by
/// [RFC 4343 § 2.1] are supported.
///
/// [RFC 4343 § 2.1]: https://datatracker.ietf.org/doc/html/rfc4343#section-2.1
impl FromStr for Name {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(Error::StrEmpty);
        } else if s == "." {
            return Ok(Self::root());
        }

        let mut remaining: &[u8] = s.as_bytes();
        let mut builder = NameBuilder::new();
        while let Some(&octet) = remaining.first() {
            if octet == b'\\' {
                let (value, consumed) = parse_escape(&remaining[1..])?;
                builder.try_push(value)?;
                remaining = &remaining[consumed + 1..];
            } else if octet == b'.' {
                builder.next_label()?;
                remaining = &remaining[1..];
            } else if !octet.is_ascii() {
                return Err(Error::StrNotAscii);
            } else {
                builder.try_push(octet)?;
                remaining = &remaining[1..];
            }
        }
        builder.finish()
    }
}

/// Parses an escape sequence. `remaining` starts with the octet
/// immediately after the backslash. Returns the escaped value and the
/// number of octets consumed.
fn parse_escape(remaining: &[u8]) -> Result<(u8, usize), Error> {
    match remaining {
        [] => Err(Error::InvalidEscape),
        [a, b, c, ..] if a.is_ascii_digit() && b.is_ascii_digit() && c.is_ascii_digit() => {
            let value =
                100 * (a - b'0') as usize + 10 * (b - b'0') as usize + (c - b'0') as usize;
            u8::try_from(value)
                .map(|v| (v, 3))
                .or(Err(Error::InvalidEscape))
        }
        [d, ..] if d.is_ascii_digit() => Err(Error::InvalidEscape),
        [other, ..] => Ok((*other, 1)),
    }
}

////////////////////////////////////////////////////////////////////////
// TESTS                                                              //
////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_has_expected_characteristics() {
        let root = Name::root();
        assert!(root.is_root());
        assert_eq!(root.len(), 1);
        assert_eq!(root.label_offsets(), &[0]);
        assert_eq!(root.wire_repr(), &[0]);
        assert_eq!(".".parse::<Name>().unwrap(), root);
    }

    #[test]
    fn fromstr_works() {
        let name: Name = "www.example.".parse().unwrap();
        assert_eq!(name.wire_repr(), b"\x03www\x07example\x00");
        assert_eq!(name.label_offsets(), &[0, 4, 12]);
        assert_eq!(name.len(), 3);
    }

    #[test]
    fn fromstr_rejects_invalid_names() {
        assert_eq!("".parse::<Name>(), Err(Error::StrEmpty));
        assert_eq!("✈.aero.".parse::<Name>(), Err(Error::StrNotAscii));
        assert_eq!("non.fqdn".parse::<Name>(), Err(Error::NonNullTerminal));
        assert_eq!("a..b.".parse::<Name>(), Err(Error::NullNonTerminal));
        assert_eq!(
            format!("{}.", "x".repeat(64)).parse::<Name>(),
            Err(Error::LabelTooLong)
        );
        assert_eq!("x.".repeat(128).parse::<Name>(), Err(Error::NameTooLong));
    }

    #[test]
    fn fromstr_escaping_works() {
        let escaped: Name = "\\000.\\\\\\..".parse().unwrap();
        assert_eq!(escaped.wire_repr(), b"\x01\x00\x02\\.\x00");
        assert_eq!(escaped.to_string(), "\\000.\\\\\\..");
        assert_eq!("\\256.".parse::<Name>(), Err(Error::InvalidEscape));
        assert_eq!("\\00x.".parse::<Name>(), Err(Error::InvalidEscape));
    }

    #[test]
    fn comparison_is_case_insensitive() {
        let lower: Name = "www.example.".parse().unwrap();
        let upper: Name = "WWW.Example.".parse().unwrap();
        assert_eq!(lower, upper);
        assert_eq!(upper.to_string(), "WWW.Example.");
    }

    #[test]
    fn superdomain_works() {
        let name: Name = "a.b.example.".parse().unwrap();
        let superdomain = name.superdomain(1).unwrap();
        assert_eq!(superdomain, "b.example.".parse().unwrap());
        assert_eq!(superdomain.label_offsets(), &[0, 2, 10]);
        assert_eq!(name.superdomain(3), Some(Name::root()));
        assert_eq!(name.superdomain(4), None);
    }

    #[test]
    fn eq_or_subdomain_of_works() {
        let sub: Name = "www.example.".parse().unwrap();
        let domain: Name = "EXAMPLE.".parse().unwrap();
        let other: Name = "example.com.".parse().unwrap();
        assert!(sub.eq_or_subdomain_of(&domain));
        assert!(domain.eq_or_subdomain_of(&domain));
        assert!(sub.eq_or_subdomain_of(&Name::root()));
        assert!(!domain.eq_or_subdomain_of(&sub));
        assert!(!other.eq_or_subdomain_of(&domain));
    }

    #[test]
    fn try_clone_preserves_offsets() {
        let name: Name = "canon.example.".parse().unwrap();
        let copy = name.try_clone().unwrap();
        assert_eq!(copy.wire_repr(), name.wire_repr());
        assert_eq!(copy.label_offsets(), name.label_offsets());
    }

    #[test]
    fn try_from_uncompressed_all_works() {
        let name = Name::try_from_uncompressed_all(b"\x05canon\x07example\x00").unwrap();
        assert_eq!(name, "canon.example.".parse().unwrap());
        assert_eq!(
            Name::try_from_uncompressed_all(b"\x05canon\x00\x00"),
            Err(Error::ExtraData)
        );
        assert_eq!(
            Name::try_from_uncompressed_all(b"\x05can"),
            Err(Error::UnexpectedEom)
        );
    }
}
