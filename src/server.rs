//! UDP receive loop forwarding accepted reports to an output stream.

use std::io::{self, Write};
use std::net::{SocketAddr, ToSocketAddrs, UdpSocket};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tracing::{debug, error, info, warn};

use crate::config::{ServerConfig, SigningMode};
use crate::error::{Rejection, ServerError};
use crate::packet::{format_record, Record};
use crate::validator::PacketValidator;

/// Receive buffer size. Reports are well under 100 bytes; longer datagrams
/// are truncated by the socket and usually fail validation.
pub const MAX_DATAGRAM_SIZE: usize = 1024;

/// Operational counters for the receive loop.
///
/// Counters are shared behind `Arc<Mutex<_>>` so a monitoring thread can
/// read them while the loop runs.
#[derive(Clone, Debug)]
pub struct ServerMetrics {
    /// Datagrams read from the socket
    pub datagrams_received_total: Arc<Mutex<u64>>,
    /// Reports accepted and written to the output
    pub reports_accepted_total: Arc<Mutex<u64>>,
    /// Datagrams with a bad shape: not text, too few tokens, unparsable fields
    pub rejected_malformed_total: Arc<Mutex<u64>>,
    /// Datagrams failing the digest check, including missing secret
    pub rejected_signature_total: Arc<Mutex<u64>>,
    /// Datagrams outside the freshness window
    pub rejected_stale_total: Arc<Mutex<u64>>,
    /// Datagrams with a non-increasing timestamp
    pub rejected_replay_total: Arc<Mutex<u64>>,
    /// Datagrams with an out-of-range field
    pub rejected_range_total: Arc<Mutex<u64>>,
}

impl ServerMetrics {
    fn new() -> Self {
        Self {
            datagrams_received_total: Arc::new(Mutex::new(0)),
            reports_accepted_total: Arc::new(Mutex::new(0)),
            rejected_malformed_total: Arc::new(Mutex::new(0)),
            rejected_signature_total: Arc::new(Mutex::new(0)),
            rejected_stale_total: Arc::new(Mutex::new(0)),
            rejected_replay_total: Arc::new(Mutex::new(0)),
            rejected_range_total: Arc::new(Mutex::new(0)),
        }
    }

    fn record_rejection(&self, reason: Rejection) {
        let counter = match reason {
            Rejection::NotUtf8 | Rejection::TooFewTokens | Rejection::InvalidField => {
                &self.rejected_malformed_total
            }
            Rejection::MissingSecret | Rejection::DigestMismatch => &self.rejected_signature_total,
            Rejection::Stale => &self.rejected_stale_total,
            Rejection::NotIncreasing => &self.rejected_replay_total,
            Rejection::OutOfRange => &self.rejected_range_total,
        };
        *counter.lock() += 1;
    }

    /// Total rejected datagrams across all categories.
    pub fn rejected_total(&self) -> u64 {
        *self.rejected_malformed_total.lock()
            + *self.rejected_signature_total.lock()
            + *self.rejected_stale_total.lock()
            + *self.rejected_replay_total.lock()
            + *self.rejected_range_total.lock()
    }

    /// Export counters in Prometheus text exposition format.
    pub fn export_metrics(&self) -> String {
        format!(
            "gps2udp_datagrams_received_total {}\n\
             gps2udp_reports_accepted_total {}\n\
             gps2udp_rejected_total{{reason=\"malformed\"}} {}\n\
             gps2udp_rejected_total{{reason=\"signature\"}} {}\n\
             gps2udp_rejected_total{{reason=\"stale\"}} {}\n\
             gps2udp_rejected_total{{reason=\"replay\"}} {}\n\
             gps2udp_rejected_total{{reason=\"range\"}} {}\n",
            self.datagrams_received_total.lock(),
            self.reports_accepted_total.lock(),
            self.rejected_malformed_total.lock(),
            self.rejected_signature_total.lock(),
            self.rejected_stale_total.lock(),
            self.rejected_replay_total.lock(),
            self.rejected_range_total.lock(),
        )
    }
}

/// Single-stream report server.
///
/// Reads datagrams one at a time, validates each with its own
/// [`PacketValidator`] and writes one line per accepted report. Rejected
/// datagrams produce no output and no reply.
///
/// # Example
/// ```ignore
/// let mut server = Server::bind("0.0.0.0:5000", PacketValidator::default())?;
/// server.run(&mut std::io::stdout().lock())?;
/// ```
pub struct Server {
    socket: UdpSocket,
    validator: PacketValidator,
    /// Operational counters
    pub metrics: ServerMetrics,
}

impl Server {
    /// Bind a server to `addr`.
    ///
    /// # Errors
    /// Returns `std::io::Error` if the address is invalid or already in use.
    pub fn bind(addr: impl ToSocketAddrs, validator: PacketValidator) -> io::Result<Self> {
        let socket = UdpSocket::bind(addr)?;
        let local = socket.local_addr()?;
        let signing = &validator.config().signing;

        if let SigningMode::Signed(None) = signing {
            warn!("signing enabled without a secret, every report will be rejected");
        }
        info!(addr = %local, signed = signing.is_signed(), "listening");

        Ok(Self {
            socket,
            validator,
            metrics: ServerMetrics::new(),
        })
    }

    /// Bind using a [`ServerConfig`].
    pub fn from_config(config: &ServerConfig) -> io::Result<Self> {
        Self::bind(config.bind, PacketValidator::new(config.validator.clone()))
    }

    /// Address the socket is bound to.
    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.socket.local_addr()
    }

    /// Limit how long [`serve_one`](Self::serve_one) blocks. `None` blocks forever.
    pub fn set_read_timeout(&self, timeout: Option<Duration>) -> io::Result<()> {
        self.socket.set_read_timeout(timeout)
    }

    /// The validator, for inspecting accepted history.
    pub fn validator(&self) -> &PacketValidator {
        &self.validator
    }

    /// Receive and process a single datagram.
    ///
    /// Returns the accepted record, or `None` if the datagram was rejected
    /// or the read timed out.
    pub fn serve_one<W: Write>(&mut self, out: &mut W) -> Result<Option<Record>, ServerError> {
        let mut buf = [0u8; MAX_DATAGRAM_SIZE];

        match self.socket.recv_from(&mut buf) {
            Ok((len, peer)) => self.handle_datagram(&buf[..len], peer, out),
            Err(e)
                if matches!(
                    e.kind(),
                    io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut | io::ErrorKind::Interrupted
                ) =>
            {
                Ok(None)
            }
            Err(e) => Err(ServerError::Socket(e)),
        }
    }

    /// Validate one datagram and write the line if accepted.
    pub fn handle_datagram<W: Write>(
        &mut self,
        datagram: &[u8],
        peer: SocketAddr,
        out: &mut W,
    ) -> Result<Option<Record>, ServerError> {
        *self.metrics.datagrams_received_total.lock() += 1;

        let record = match self.validator.validate(datagram) {
            Ok(record) => record,
            Err(reason) => {
                debug!(%peer, %reason, len = datagram.len(), "dropped datagram");
                self.metrics.record_rejection(reason);
                return Ok(None);
            }
        };

        out.write_all(format_record(&record).as_bytes())
            .and_then(|()| out.flush())
            .map_err(ServerError::Output)?;
        *self.metrics.reports_accepted_total.lock() += 1;
        debug!(%peer, timestamp = record.timestamp, "accepted report");

        Ok(Some(record))
    }

    /// Run the receive loop until a socket or output error occurs.
    pub fn run<W: Write>(&mut self, out: &mut W) -> Result<(), ServerError> {
        loop {
            if let Err(e) = self.serve_one(out) {
                error!(error = %e, "receive loop stopped");
                return Err(e);
            }
        }
    }
}
