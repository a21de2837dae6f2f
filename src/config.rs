//! Runtime configuration.

use std::fmt;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use crate::packet::{MAX_ACCURACY, MAX_TIME_DIFF};

/// Environment variable holding the shared signing secret.
pub const SECRET_ENV: &str = "GPS2UDP_SECRET";
/// Default UDP port to listen on.
pub const DEFAULT_PORT: u16 = 5000;

/// Shared secret used to sign reports.
///
/// Never empty. `Debug` does not reveal the contents.
#[derive(Clone, PartialEq, Eq)]
pub struct Secret(String);

impl Secret {
    /// Wrap a secret, treating an empty string as no secret at all.
    pub fn new(secret: impl Into<String>) -> Option<Self> {
        let secret = secret.into();
        (!secret.is_empty()).then_some(Self(secret))
    }

    /// Read the secret from [`SECRET_ENV`]. Unset, empty or non-unicode
    /// values all yield `None`.
    pub fn from_env() -> Option<Self> {
        std::env::var(SECRET_ENV).ok().and_then(Self::new)
    }

    /// Raw secret bytes as fed to the digest.
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(***)")
    }
}

/// Whether reports must carry a digest.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SigningMode {
    /// Reports are accepted without a digest
    #[default]
    Unsigned,
    /// Reports must carry a digest made with the secret. With no secret
    /// nothing validates.
    Signed(Option<Secret>),
}

impl SigningMode {
    /// Signed mode with the secret taken from the environment.
    pub fn signed_from_env() -> Self {
        Self::Signed(Secret::from_env())
    }

    /// True for [`SigningMode::Signed`], with or without a secret.
    pub fn is_signed(&self) -> bool {
        matches!(self, Self::Signed(_))
    }
}

/// Validation limits and signing mode.
#[derive(Debug, Clone)]
pub struct ValidatorConfig {
    /// Digest requirement
    pub signing: SigningMode,
    /// Freshness window in seconds
    pub max_time_diff: u64,
    /// Largest accepted accuracy value
    pub max_accuracy: u32,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            signing: SigningMode::Unsigned,
            max_time_diff: MAX_TIME_DIFF,
            max_accuracy: MAX_ACCURACY,
        }
    }
}

impl ValidatorConfig {
    /// Unsigned configuration with default limits.
    pub fn unsigned() -> Self {
        Self::default()
    }

    /// Signed configuration with default limits.
    pub fn signed(secret: Option<Secret>) -> Self {
        Self {
            signing: SigningMode::Signed(secret),
            ..Self::default()
        }
    }
}

/// Server configuration, normally built from command-line options.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Local address to bind
    pub bind: SocketAddr,
    /// Validation settings
    pub validator: ValidatorConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), DEFAULT_PORT),
            validator: ValidatorConfig::default(),
        }
    }
}
