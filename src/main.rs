//! gps2udp - receive location reports over UDP and forward them to stdout.
//!
//! Accepted reports are written to stdout one line each; diagnostics go to
//! stderr so the data stream stays clean.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use anyhow::{Context, Result};
use clap::Parser;
use gps2udp::config::DEFAULT_PORT;
use gps2udp::packet::{MAX_ACCURACY, MAX_TIME_DIFF};
use gps2udp::server::Server;
use gps2udp::{ServerConfig, SigningMode, ValidatorConfig};
use tracing_subscriber::EnvFilter;

/// Receive location reports over UDP and print the valid ones
#[derive(Parser, Debug)]
#[command(name = "gps2udp")]
#[command(version, about, long_about = None)]
struct Args {
    /// UDP port number to listen on
    #[arg(long, default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Local address to bind
    #[arg(long, default_value_t = IpAddr::V4(Ipv4Addr::UNSPECIFIED))]
    bind: IpAddr,

    /// Check every report for a digest made with the secret in GPS2UDP_SECRET
    #[arg(long)]
    signed: bool,

    /// Maximum difference between a report timestamp and local time, in seconds
    #[arg(long, default_value_t = MAX_TIME_DIFF)]
    max_time_diff: u64,

    /// Maximum accepted accuracy value, in meters
    #[arg(long, default_value_t = MAX_ACCURACY)]
    max_accuracy: u32,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn")]
    log_level: String,
}

impl Args {
    fn server_config(&self) -> ServerConfig {
        let signing = if self.signed {
            SigningMode::signed_from_env()
        } else {
            SigningMode::Unsigned
        };

        ServerConfig {
            bind: SocketAddr::new(self.bind, self.port),
            validator: ValidatorConfig {
                signing,
                max_time_diff: self.max_time_diff,
                max_accuracy: self.max_accuracy,
            },
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    let filter = EnvFilter::try_new(&args.log_level).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config = args.server_config();

    let mut server = Server::from_config(&config)
        .with_context(|| format!("failed to bind UDP socket on {}", config.bind))?;

    let stdout = std::io::stdout();
    server
        .run(&mut stdout.lock())
        .context("receive loop failed")?;

    Ok(())
}
