// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! STEP string decoding
//!
//! IFC exporters write non-ASCII text as `\X2\<hex>\X0\` spans, where the
//! payload is a run of 4-digit UTF-16 code units: `Ma\X2\00DF\X0\e` is
//! `Maße`. Everything outside a span is passed through untouched.

use memchr::memchr_iter;
use nom::{
    bytes::complete::{tag_no_case, take_while_m_n},
    combinator::{all_consuming, map_res},
    multi::many1,
    IResult,
};
use std::borrow::Cow;
use thiserror::Error;

const OPEN: &str = "\\X2\\";
const CLOSE: &str = "\\X0\\";

/// Malformed `\X2\` payload
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("Empty escape payload")]
    Empty,

    #[error("Escape payload length {0} is not a multiple of 4")]
    Length(usize),

    #[error("Invalid hex in escape payload: {0:?}")]
    InvalidHex(String),
}

/// Decode every `\X2\...\X0\` span in `input`.
///
/// Returns the input borrowed when no span decodes. A span whose payload is
/// malformed is kept verbatim. Back-to-back spans form one run of code units,
/// so a surrogate pair split across two spans still joins.
pub fn decode_ifc_string(input: &str) -> Cow<'_, str> {
    let bytes = input.as_bytes();
    let mut out: Option<String> = None;
    let mut copied = 0;
    let mut pos = 0;

    while let Some(offset) = memchr::memchr(b'\\', &bytes[pos..]) {
        let start = pos + offset;

        let (rest, payload) = match escape_span(&input[start..]) {
            Ok(span) => span,
            // an opener without a closer: nothing after it can close either
            Err(_) if has_open(&bytes[start..]) => break,
            Err(_) => {
                pos = start + 1;
                continue;
            }
        };
        let mut end = input.len() - rest.len();

        let mut units = match code_unit_payload(payload) {
            Ok(units) => units,
            Err(e) => {
                tracing::trace!(error = %e, escape = &input[start..end], "Leaving escape span undecoded");
                pos = end;
                continue;
            }
        };

        // extend the run over directly following well-formed spans
        while let Ok((next_rest, next_payload)) = escape_span(&input[end..]) {
            match code_unit_payload(next_payload) {
                Ok(more) => {
                    units.extend(more);
                    end = input.len() - next_rest.len();
                }
                Err(_) => break,
            }
        }

        let buf = out.get_or_insert_with(|| String::with_capacity(input.len()));
        buf.push_str(&input[copied..start]);
        buf.extend(char::decode_utf16(units).map(|c| c.unwrap_or(char::REPLACEMENT_CHARACTER)));
        copied = end;
        pos = end;
    }

    match out {
        Some(mut buf) => {
            buf.push_str(&input[copied..]);
            Cow::Owned(buf)
        }
        None => Cow::Borrowed(input),
    }
}

/// [`decode_ifc_string`] for optional attributes; `None` stays `None`
pub fn decode_opt(input: Option<&str>) -> Option<Cow<'_, str>> {
    input.map(decode_ifc_string)
}

/// Decode one payload (the text between `\X2\` and `\X0\`)
pub fn decode_payload(payload: &str) -> Result<String, DecodeError> {
    let units = code_unit_payload(payload)?;
    Ok(char::decode_utf16(units)
        .map(|c| c.unwrap_or(char::REPLACEMENT_CHARACTER))
        .collect())
}

/// UTF-16 code units of one payload
fn code_unit_payload(payload: &str) -> Result<Vec<u16>, DecodeError> {
    if payload.is_empty() {
        return Err(DecodeError::Empty);
    }
    if payload.len() % 4 != 0 {
        return Err(DecodeError::Length(payload.len()));
    }

    let (_, units) = all_consuming(code_units)(payload)
        .map_err(|_| DecodeError::InvalidHex(payload.to_string()))?;
    Ok(units)
}

/// Parse `\X2\<payload>\X0\`, returning the payload.
/// The payload ends at the first closing delimiter.
fn escape_span(input: &str) -> IResult<&str, &str> {
    let (input, _) = tag_no_case(OPEN)(input)?;

    let close = find_close(input).ok_or_else(|| {
        nom::Err::Error(nom::error::Error::new(input, nom::error::ErrorKind::TakeUntil))
    })?;
    let (payload, rest) = input.split_at(close);
    let (rest, _) = tag_no_case(CLOSE)(rest)?;

    Ok((rest, payload))
}

fn has_open(bytes: &[u8]) -> bool {
    bytes
        .get(..OPEN.len())
        .is_some_and(|b| b.eq_ignore_ascii_case(OPEN.as_bytes()))
}

fn find_close(input: &str) -> Option<usize> {
    let bytes = input.as_bytes();
    memchr_iter(b'\\', bytes).find(|&i| {
        bytes[i..]
            .get(..CLOSE.len())
            .is_some_and(|b| b.eq_ignore_ascii_case(CLOSE.as_bytes()))
    })
}

/// Parse 4-digit hex groups: `00480065` -> [0x48, 0x65]
fn code_units(input: &str) -> IResult<&str, Vec<u16>> {
    many1(map_res(
        take_while_m_n(4, 4, |c: char| c.is_ascii_hexdigit()),
        |group: &str| u16::from_str_radix(group, 16),
    ))(input)
}
