//! Report sender, the client side of the wire format.

use std::io;
use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr, UdpSocket};

use crate::config::SigningMode;
use crate::crypto;
use crate::error::SendError;
use crate::packet::Record;

/// Sends location reports to a gps2udp server.
///
/// Coordinates go out with six decimals, matching what mobile clients send.
/// Each datagram ends with a newline.
#[derive(Debug, Clone)]
pub struct Sender {
    target: SocketAddr,
    signing: SigningMode,
}

impl Sender {
    /// Create a sender for `target`.
    pub fn new(target: SocketAddr, signing: SigningMode) -> Self {
        Self { target, signing }
    }

    /// Server address reports are sent to.
    pub fn target(&self) -> SocketAddr {
        self.target
    }

    /// Build the datagram for `record`.
    ///
    /// # Errors
    /// [`SendError::MissingSecret`] in signed mode without a secret.
    pub fn encode(&self, record: &Record) -> Result<String, SendError> {
        let payload = format!(
            "{} {:.6} {:.6} {}",
            record.timestamp, record.latitude, record.longitude, record.accuracy
        );

        match &self.signing {
            SigningMode::Unsigned => Ok(format!("{payload}\n")),
            SigningMode::Signed(Some(secret)) => {
                let digest = crypto::digest(&payload, secret.as_bytes());
                Ok(format!("{payload} {digest}\n"))
            }
            SigningMode::Signed(None) => Err(SendError::MissingSecret),
        }
    }

    /// Encode and send `record` from a fresh ephemeral socket.
    pub fn send(&self, record: &Record) -> Result<usize, SendError> {
        let datagram = self.encode(record)?;
        let socket = self.ephemeral_socket()?;
        Ok(socket.send_to(datagram.as_bytes(), self.target)?)
    }

    fn ephemeral_socket(&self) -> io::Result<UdpSocket> {
        match self.target {
            SocketAddr::V4(_) => UdpSocket::bind((Ipv4Addr::UNSPECIFIED, 0)),
            SocketAddr::V6(_) => UdpSocket::bind((Ipv6Addr::UNSPECIFIED, 0)),
        }
    }
}
