//! Report wire format, field parsing and output formatting.
//!
//! A report datagram is a line of space-separated tokens:
//!
//! ```text
//! TIMESTAMP LATITUDE LONGITUDE ACCURACY [DIGEST] [ignored...]
//! ```

use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

use crate::error::Rejection;

/// Default freshness window in seconds.
pub const MAX_TIME_DIFF: u64 = 60 * 5;
/// Default upper bound for accuracy, in meters.
pub const MAX_ACCURACY: u32 = 10_000;

/// Tokens required in an unsigned report.
pub const UNSIGNED_TOKENS: usize = 4;
/// Tokens required in a signed report.
pub const SIGNED_TOKENS: usize = 5;

/// Token separator. Only the literal space counts; tabs are part of a token.
pub const SEPARATOR: u8 = b' ';

const LATITUDE_RANGE: RangeInclusive<f64> = -90.0..=90.0;
const LONGITUDE_RANGE: RangeInclusive<f64> = -180.0..=180.0;

/// A fully validated location report.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Record {
    /// Unix time in seconds
    pub timestamp: i64,
    /// Degrees, within [-90, 90]
    pub latitude: f64,
    /// Degrees, within [-180, 180]
    pub longitude: f64,
    /// Meters, within [0, max accuracy]
    pub accuracy: u32,
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {:.7} {:.7} {}",
            self.timestamp, self.latitude, self.longitude, self.accuracy
        )
    }
}

/// Render a record as one output line, newline included.
pub fn format_record(record: &Record) -> String {
    format!("{record}\n")
}

/// Drop one trailing line terminator (`"\n"` or `"\r\n"`).
pub fn strip_terminator(datagram: &[u8]) -> &[u8] {
    let datagram = datagram.strip_suffix(b"\n").unwrap_or(datagram);
    datagram.strip_suffix(b"\r").unwrap_or(datagram)
}

/// Split a datagram on the separator byte, discarding empty tokens from
/// repeated separators. Tokens stay raw bytes; only the ones actually used
/// are decoded.
pub fn tokenize(datagram: &[u8]) -> Vec<&[u8]> {
    strip_terminator(datagram)
        .split(|&b| b == SEPARATOR)
        .filter(|t| !t.is_empty())
        .collect()
}

/// Decode the leading `count` tokens as UTF-8.
pub fn decode_tokens<'a>(tokens: &[&'a [u8]], count: usize) -> Result<Vec<&'a str>, Rejection> {
    if tokens.len() < count {
        return Err(Rejection::TooFewTokens);
    }
    tokens[..count]
        .iter()
        .map(|t| std::str::from_utf8(t).map_err(|_| Rejection::NotUtf8))
        .collect()
}

/// Rejoin the first four tokens into the payload covered by the digest.
pub fn canonical_payload(tokens: &[&str]) -> String {
    tokens[..UNSIGNED_TOKENS.min(tokens.len())].join(" ")
}

fn parse_field<T: FromStr>(token: &str) -> Result<T, Rejection> {
    token
        .trim_matches(|c: char| c.is_ascii_whitespace())
        .parse()
        .map_err(|_| Rejection::InvalidField)
}

// Typed fields before range checks. Never leaves this crate.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Fields {
    pub(crate) timestamp: i64,
    latitude: f64,
    longitude: f64,
    accuracy: i64,
}

impl Fields {
    /// Parse the four leading tokens. Whitespace other than the separator
    /// around a number is tolerated; accuracy must be an integer literal.
    pub(crate) fn parse(tokens: &[&str]) -> Result<Self, Rejection> {
        if tokens.len() < UNSIGNED_TOKENS {
            return Err(Rejection::TooFewTokens);
        }

        Ok(Self {
            timestamp: parse_field(tokens[0])?,
            latitude: parse_field(tokens[1])?,
            longitude: parse_field(tokens[2])?,
            accuracy: parse_field(tokens[3])?,
        })
    }

    /// Apply domain checks and produce a [`Record`]. NaN fails every range.
    pub(crate) fn into_record(self, max_accuracy: u32) -> Result<Record, Rejection> {
        if !LATITUDE_RANGE.contains(&self.latitude) || !LONGITUDE_RANGE.contains(&self.longitude)
        {
            return Err(Rejection::OutOfRange);
        }

        let accuracy = u32::try_from(self.accuracy).map_err(|_| Rejection::OutOfRange)?;
        if accuracy > max_accuracy {
            return Err(Rejection::OutOfRange);
        }

        Ok(Record {
            timestamp: self.timestamp,
            latitude: self.latitude,
            longitude: self.longitude,
            accuracy,
        })
    }
}
