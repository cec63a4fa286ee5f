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

//! Parsing of RDATA presentation formats.

use std::net::{Ipv4Addr, Ipv6Addr};
use std::str::SplitAsciiWhitespace;

use super::{ParseError, Rdata};
use crate::name::Name;
use crate::rr::Type;
use crate::util::decode_hex;

pub(super) fn parse(rr_type: Type, text: &str) -> Result<Rdata, ParseError> {
    let mut fields = text.split_ascii_whitespace();
    if text.trim_start().starts_with("\\#") {
        fields.next();
        return parse_generic(fields);
    }

    let mut octets = Vec::new();
    match rr_type {
        Type::A => {
            let address: Ipv4Addr = next_field(&mut fields)?
                .parse()
                .or(Err(ParseError::InvalidAddress))?;
            octets.extend_from_slice(&address.octets());
        }
        Type::AAAA => {
            let address: Ipv6Addr = next_field(&mut fields)?
                .parse()
                .or(Err(ParseError::InvalidAddress))?;
            octets.extend_from_slice(&address.octets());
        }
        Type::NS | Type::CNAME | Type::PTR => {
            push_name(&mut octets, next_field(&mut fields)?)?;
        }
        Type::MX => {
            let preference: u16 = parse_integer(next_field(&mut fields)?)?;
            octets.extend_from_slice(&preference.to_be_bytes());
            push_name(&mut octets, next_field(&mut fields)?)?;
        }
        Type::SOA => {
            push_name(&mut octets, next_field(&mut fields)?)?;
            push_name(&mut octets, next_field(&mut fields)?)?;
            for _ in 0..5 {
                let value: u32 = parse_integer(next_field(&mut fields)?)?;
                octets.extend_from_slice(&value.to_be_bytes());
            }
        }
        Type::TXT => {
            parse_txt(text, &mut octets)?;
            return Ok(octets.try_into()?);
        }
        _ => return Err(ParseError::UnsupportedType(rr_type)),
    }

    if fields.next().is_some() {
        Err(ParseError::ExtraField)
    } else {
        Ok(octets.try_into()?)
    }
}

/// Parses the remainder of the RFC 3597 generic syntax, after the
/// `\#` token.
fn parse_generic(mut fields: SplitAsciiWhitespace) -> Result<Rdata, ParseError> {
    let len: usize = fields
        .next()
        .ok_or(ParseError::InvalidGeneric)?
        .parse()
        .or(Err(ParseError::InvalidGeneric))?;
    let hex: String = fields.collect();
    let octets = decode_hex(&hex).ok_or(ParseError::InvalidGeneric)?;
    if octets.len() != len {
        Err(ParseError::InvalidGeneric)
    } else {
        Ok(octets.try_into()?)
    }
}

/// Parses TXT data. Data starting with a double quote is a sequence of
/// quoted character-strings separated by whitespace, in which `\`
/// escapes the next octet or introduces a `\DDD` decimal value. Any
/// other data is the text itself, split into character-strings of at
/// most 255 octets.
fn parse_txt(text: &str, octets: &mut Vec<u8>) -> Result<(), ParseError> {
    let trimmed = text.trim_start();
    if !trimmed.starts_with('"') {
        // An empty TXT record still has one (empty) character-string.
        let text = text.as_bytes();
        if text.is_empty() {
            octets.push(0);
        }
        for chunk in text.chunks(255) {
            octets.push(chunk.len() as u8);
            octets.extend_from_slice(chunk);
        }
        return Ok(());
    }

    let mut remaining = trimmed.as_bytes();
    while let Some(&first) = remaining.first() {
        if first.is_ascii_whitespace() {
            remaining = &remaining[1..];
            continue;
        } else if first != b'"' {
            return Err(ParseError::InvalidString);
        }
        remaining = &remaining[1..];
        let mut string = Vec::new();
        loop {
            match remaining {
                [] => return Err(ParseError::InvalidString),
                [b'"', rest @ ..] => {
                    remaining = rest;
                    break;
                }
                [b'\\', a, b, c, rest @ ..]
                    if a.is_ascii_digit() && b.is_ascii_digit() && c.is_ascii_digit() =>
                {
                    let value =
                        100 * (a - b'0') as u16 + 10 * (b - b'0') as u16 + (c - b'0') as u16;
                    string.push(u8::try_from(value).or(Err(ParseError::InvalidString))?);
                    remaining = rest;
                }
                [b'\\', escaped, rest @ ..] | [escaped, rest @ ..] => {
                    string.push(*escaped);
                    remaining = rest;
                }
            }
        }
        if string.len() > 255 {
            return Err(ParseError::InvalidString);
        }
        octets.push(string.len() as u8);
        octets.extend_from_slice(&string);
    }
    Ok(())
}

fn next_field<'a>(fields: &mut SplitAsciiWhitespace<'a>) -> Result<&'a str, ParseError> {
    fields.next().ok_or(ParseError::MissingField)
}

fn parse_integer<T: std::str::FromStr>(field: &str) -> Result<T, ParseError> {
    field.parse().or(Err(ParseError::InvalidInteger))
}

fn push_name(octets: &mut Vec<u8>, field: &str) -> Result<(), ParseError> {
    let name: Name = field.parse()?;
    octets.extend_from_slice(name.wire_repr());
    Ok(())
}

////////////////////////////////////////////////////////////////////////
// TESTS                                                              //
////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_addresses() {
        let a = Rdata::from_text(Type::A, "192.0.2.1").unwrap();
        assert_eq!(a.octets(), &[192, 0, 2, 1]);
        let aaaa = Rdata::from_text(Type::AAAA, "2001:db8::1").unwrap();
        assert_eq!(aaaa.len(), 16);
        assert_eq!(aaaa.octets()[..4], [0x20, 0x01, 0x0d, 0xb8]);
        assert_eq!(
            Rdata::from_text(Type::A, "192.0.2"),
            Err(ParseError::InvalidAddress)
        );
    }

    #[test]
    fn parses_names() {
        let cname = Rdata::from_text(Type::CNAME, "www.example.").unwrap();
        assert_eq!(cname.octets(), b"\x03www\x07example\x00");
        assert!(matches!(
            Rdata::from_text(Type::NS, "relative"),
            Err(ParseError::InvalidName(_))
        ));
    }

    #[test]
    fn parses_mx_and_soa() {
        let mx = Rdata::from_text(Type::MX, "10 mail.example.").unwrap();
        assert_eq!(mx.octets(), b"\x00\x0a\x04mail\x07example\x00");

        let soa = Rdata::from_text(
            Type::SOA,
            "ns.example. admin.example. 2022010101 7200 3600 1209600 300",
        )
        .unwrap();
        assert_eq!(soa.len(), 12 + 15 + 20);
        assert_eq!(soa.octets()[27..31], 2022010101_u32.to_be_bytes());
    }

    #[test]
    fn parses_txt_as_character_strings() {
        let txt = Rdata::from_text(Type::TXT, "hello world").unwrap();
        assert_eq!(txt.octets(), b"\x0bhello world");

        let long = "a".repeat(300);
        let txt = Rdata::from_text(Type::TXT, &long).unwrap();
        assert_eq!(txt.len(), 302);
        assert_eq!(txt.octets()[0], 255);
        assert_eq!(txt.octets()[256], 45);

        assert_eq!(Rdata::from_text(Type::TXT, "").unwrap().octets(), &[0]);
    }

    #[test]
    fn parses_quoted_txt_strings() {
        let txt = Rdata::from_text(Type::TXT, r#""a" "b c""#).unwrap();
        assert_eq!(txt.octets(), b"\x01a\x03b c");

        let escaped = Rdata::from_text(Type::TXT, r#""say \"hi\"" "\065\\""#).unwrap();
        assert_eq!(escaped.octets(), b"\x08say \"hi\"\x02A\\");

        let empty = Rdata::from_text(Type::TXT, r#""""#).unwrap();
        assert_eq!(empty.octets(), &[0]);

        for bad in [r#""open"#, r#""a"b"#, r#""\256""#] {
            assert_eq!(
                Rdata::from_text(Type::TXT, bad),
                Err(ParseError::InvalidString)
            );
        }
        let long = format!("\"{}\"", "a".repeat(256));
        assert_eq!(
            Rdata::from_text(Type::TXT, &long),
            Err(ParseError::InvalidString)
        );
    }

    #[test]
    fn parses_generic_syntax() {
        let rdata = Rdata::from_text(Type::from(65280), "\\# 3 abcd ef").unwrap();
        assert_eq!(rdata.octets(), &[0xab, 0xcd, 0xef]);
        let empty = Rdata::from_text(Type::from(65280), "\\# 0").unwrap();
        assert!(empty.is_empty());
        assert_eq!(
            Rdata::from_text(Type::A, "\\# 4 c00002"),
            Err(ParseError::InvalidGeneric)
        );
    }

    #[test]
    fn rejects_bad_field_counts() {
        assert_eq!(
            Rdata::from_text(Type::MX, "10"),
            Err(ParseError::MissingField)
        );
        assert_eq!(
            Rdata::from_text(Type::A, "192.0.2.1 192.0.2.2"),
            Err(ParseError::ExtraField)
        );
        assert_eq!(
            Rdata::from_text(Type::SRV, "0 0 53 ns.example."),
            Err(ParseError::UnsupportedType(Type::SRV))
        );
    }
}
