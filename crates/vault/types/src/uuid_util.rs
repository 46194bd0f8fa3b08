//! UUID text and byte conversions
//!
//! Resolvers that store mappings often keep UUIDs in the 32 character
//! "short" form (no hyphens) or as 16 raw bytes. These helpers convert
//! between those forms and the 36 character hyphenated form.
//!
//! Example long form: `ed5f12cd-6007-45d9-a4b9-940524ddaecf`
//! Example short form: `ed5f12cd600745d9a4b9940524ddaecf`

use crate::error::UuidFormatError;
use uuid::Uuid;

const SHORT_LEN: usize = 32;
const FULL_LEN: usize = 36;

/// Insert hyphens into a 32 character short UUID string.
///
/// Only the length is checked; the characters are copied as-is.
pub fn expand_short(short: &str) -> Result<String, UuidFormatError> {
    check_len(short, SHORT_LEN)?;
    let mut out = String::with_capacity(FULL_LEN);
    out.push_str(&short[0..8]);
    out.push('-');
    out.push_str(&short[8..12]);
    out.push('-');
    out.push_str(&short[12..16]);
    out.push('-');
    out.push_str(&short[16..20]);
    out.push('-');
    out.push_str(&short[20..32]);
    Ok(out)
}

/// Strip the hyphens from a 36 character UUID string.
pub fn contract_full(full: &str) -> Result<String, UuidFormatError> {
    check_len(full, FULL_LEN)?;
    let mut out = String::with_capacity(SHORT_LEN);
    out.push_str(&full[0..8]);
    out.push_str(&full[9..13]);
    out.push_str(&full[14..18]);
    out.push_str(&full[19..23]);
    out.push_str(&full[24..36]);
    Ok(out)
}

pub fn to_short_string(uuid: Uuid) -> String {
    uuid.simple().to_string()
}

pub fn from_short_string(short: &str) -> Result<Uuid, UuidFormatError> {
    check_len(short, SHORT_LEN)?;
    Uuid::try_parse(short).map_err(|e| UuidFormatError::Parse(e.to_string()))
}

/// Big-endian bytes, most significant half first.
pub fn to_bytes(uuid: Uuid) -> [u8; 16] {
    *uuid.as_bytes()
}

pub fn from_bytes(data: &[u8]) -> Result<Uuid, UuidFormatError> {
    Uuid::from_slice(data).map_err(|_| UuidFormatError::ByteLength(data.len()))
}

fn check_len(input: &str, expected: usize) -> Result<(), UuidFormatError> {
    // Byte length: non-ASCII input is rejected here rather than split mid-char.
    if input.len() != expected || !input.is_ascii() {
        return Err(UuidFormatError::Length {
            expected,
            actual: input.chars().count(),
            input: input.to_string(),
        });
    }
    Ok(())
}
