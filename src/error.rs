//! Error types for gps2udp.

use thiserror::Error;

/// Reason a datagram was rejected by the packet validator.
///
/// Rejections are routine outcomes of processing untrusted input. They are
/// used for logging and counters only; the server never reports them back to
/// the sender.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// Datagram is not valid UTF-8
    #[error("datagram is not valid utf-8")]
    NotUtf8,
    /// Fewer tokens than the wire format requires
    #[error("too few tokens")]
    TooFewTokens,
    /// Signing is enabled but no secret is configured
    #[error("no secret configured")]
    MissingSecret,
    /// Supplied digest does not match the computed one
    #[error("digest mismatch")]
    DigestMismatch,
    /// A field failed to parse as its expected type
    #[error("invalid field")]
    InvalidField,
    /// Timestamp lies outside the freshness window
    #[error("timestamp outside freshness window")]
    Stale,
    /// Timestamp is not greater than the last accepted one
    #[error("timestamp not increasing")]
    NotIncreasing,
    /// Latitude, longitude or accuracy outside its domain
    #[error("field out of range")]
    OutOfRange,
}

/// Fatal errors raised by the receive loop.
#[derive(Error, Debug)]
pub enum ServerError {
    /// Receiving from the socket failed
    #[error("socket error: {0}")]
    Socket(#[source] std::io::Error),
    /// Writing an accepted line to the output failed
    #[error("output error: {0}")]
    Output(#[source] std::io::Error),
}

/// Errors raised by the report sender.
#[derive(Error, Debug)]
pub enum SendError {
    /// Signed mode is enabled but there is no secret to sign with
    #[error("signing enabled but no secret configured")]
    MissingSecret,
    /// Socket creation or transmission failed
    #[error("send failed: {0}")]
    Io(#[from] std::io::Error),
}
