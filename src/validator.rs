//! Datagram validation.

use std::time::{SystemTime, UNIX_EPOCH};

use crate::config::{SigningMode, ValidatorConfig};
use crate::crypto;
use crate::error::Rejection;
use crate::packet::{self, Fields, Record, SIGNED_TOKENS, UNSIGNED_TOKENS};
use crate::replay::SequenceGuard;

/// Current Unix time in whole seconds.
pub fn unix_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| i64::try_from(d.as_secs()).unwrap_or(i64::MAX))
        .unwrap_or(0)
}

/// Validates report datagrams for one logical stream.
///
/// Owns the sequence guard, so one instance must see every datagram of the
/// stream in delivery order. Each check is a hard gate; the guard only
/// advances once a datagram has passed all of them.
#[derive(Debug, Clone)]
pub struct PacketValidator {
    config: ValidatorConfig,
    guard: SequenceGuard,
}

impl PacketValidator {
    /// Create a validator with no accepted history.
    pub fn new(config: ValidatorConfig) -> Self {
        Self {
            config,
            guard: SequenceGuard::new(),
        }
    }

    /// Active configuration.
    pub fn config(&self) -> &ValidatorConfig {
        &self.config
    }

    /// Timestamp of the last accepted report.
    pub fn last_accepted(&self) -> Option<i64> {
        self.guard.last_accepted()
    }

    /// Forget the accepted history.
    pub fn reset(&mut self) {
        self.guard.reset();
    }

    /// Validate a datagram against the system clock.
    pub fn validate(&mut self, datagram: &[u8]) -> Result<Record, Rejection> {
        self.validate_at(datagram, unix_now())
    }

    /// Validate a datagram as if the current Unix time were `now`.
    pub fn validate_at(&mut self, datagram: &[u8], now: i64) -> Result<Record, Rejection> {
        let raw = packet::tokenize(datagram);

        // Only the tokens the checks use are decoded; trailing ones may be
        // arbitrary bytes.
        let tokens = match &self.config.signing {
            SigningMode::Signed(secret) => {
                if raw.len() < SIGNED_TOKENS {
                    return Err(Rejection::TooFewTokens);
                }
                // Fail closed: without a secret no digest is ever compared.
                let secret = secret.as_ref().ok_or(Rejection::MissingSecret)?;
                let tokens = packet::decode_tokens(&raw, SIGNED_TOKENS)?;
                let payload = packet::canonical_payload(&tokens);
                if !crypto::verify(&payload, secret.as_bytes(), tokens[UNSIGNED_TOKENS]) {
                    return Err(Rejection::DigestMismatch);
                }
                tokens
            }
            SigningMode::Unsigned => packet::decode_tokens(&raw, UNSIGNED_TOKENS)?,
        };

        let fields = Fields::parse(&tokens)?;

        if fields.timestamp.abs_diff(now) > self.config.max_time_diff {
            return Err(Rejection::Stale);
        }

        if !self.guard.admits(fields.timestamp) {
            return Err(Rejection::NotIncreasing);
        }

        let record = fields.into_record(self.config.max_accuracy)?;
        self.guard.commit(record.timestamp);
        Ok(record)
    }
}

impl Default for PacketValidator {
    fn default() -> Self {
        Self::new(ValidatorConfig::default())
    }
}
