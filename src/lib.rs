#![doc = include_str!("../README.md")]
#![deny(unsafe_code, missing_docs)]

pub mod client;
pub mod config;
pub mod crypto;
pub mod error;
pub mod packet;
pub mod replay;
pub mod server;
pub mod validator;

pub use config::{Secret, ServerConfig, SigningMode, ValidatorConfig};
pub use error::Rejection;
pub use packet::{format_record, Record};
pub use validator::PacketValidator;
