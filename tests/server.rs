use std::net::{SocketAddr, UdpSocket};
use std::time::Duration;

use gps2udp::client::Sender;
use gps2udp::config::{Secret, SigningMode, ValidatorConfig};
use gps2udp::error::SendError;
use gps2udp::packet::Record;
use gps2udp::server::Server;
use gps2udp::validator::{unix_now, PacketValidator};

fn loopback_server(config: ValidatorConfig) -> Server {
    let server = Server::bind("127.0.0.1:0", PacketValidator::new(config)).expect("bind failed");
    server
        .set_read_timeout(Some(Duration::from_secs(2)))
        .expect("set timeout failed");
    server
}

fn record(timestamp: i64) -> Record {
    Record {
        timestamp,
        latitude: 55.7558,
        longitude: -37.6173,
        accuracy: 12,
    }
}

fn send_raw(target: SocketAddr, datagram: &[u8]) {
    let socket = UdpSocket::bind("127.0.0.1:0").unwrap();
    socket.send_to(datagram, target).unwrap();
}

#[test]
fn forwards_accepted_reports() {
    let mut server = loopback_server(ValidatorConfig::unsigned());
    let sender = Sender::new(server.local_addr().unwrap(), SigningMode::Unsigned);
    let now = unix_now();
    let mut out = Vec::new();

    sender.send(&record(now)).unwrap();
    let accepted = server.serve_one(&mut out).unwrap();

    assert_eq!(accepted.map(|r| r.timestamp), Some(now));
    assert_eq!(
        String::from_utf8(out).unwrap(),
        format!("{now} 55.7558000 -37.6173000 12\n")
    );
    assert_eq!(*server.metrics.reports_accepted_total.lock(), 1);
}

#[test]
fn rejected_datagrams_produce_no_output() {
    let mut server = loopback_server(ValidatorConfig::unsigned());
    let target = server.local_addr().unwrap();
    let now = unix_now();
    let mut out = Vec::new();

    send_raw(target, b"garbage");
    assert!(server.serve_one(&mut out).unwrap().is_none());

    send_raw(target, format!("{now} 1.1 2.2 3\n").as_bytes());
    assert!(server.serve_one(&mut out).unwrap().is_some());

    send_raw(target, format!("{now} 1.1 2.2 3\n").as_bytes());
    assert!(server.serve_one(&mut out).unwrap().is_none());

    assert_eq!(String::from_utf8(out).unwrap().lines().count(), 1);
    assert_eq!(*server.metrics.datagrams_received_total.lock(), 3);
    assert_eq!(*server.metrics.rejected_malformed_total.lock(), 1);
    assert_eq!(*server.metrics.rejected_replay_total.lock(), 1);
    assert_eq!(server.metrics.rejected_total(), 2);
}

#[test]
fn signed_sender_and_server_agree() {
    let secret = Secret::new("shared");
    let mut server = loopback_server(ValidatorConfig::signed(secret.clone()));
    let sender = Sender::new(server.local_addr().unwrap(), SigningMode::Signed(secret));
    let now = unix_now();
    let mut out = Vec::new();

    sender.send(&record(now)).unwrap();
    assert!(server.serve_one(&mut out).unwrap().is_some());
    assert_eq!(server.validator().last_accepted(), Some(now));
}

#[test]
fn signed_server_drops_unsigned_reports() {
    let mut server = loopback_server(ValidatorConfig::signed(Secret::new("shared")));
    let sender = Sender::new(server.local_addr().unwrap(), SigningMode::Unsigned);
    let mut out = Vec::new();

    sender.send(&record(unix_now())).unwrap();
    assert!(server.serve_one(&mut out).unwrap().is_none());
    assert!(out.is_empty());
}

#[test]
fn sender_refuses_to_sign_without_secret() {
    let sender = Sender::new("127.0.0.1:5000".parse().unwrap(), SigningMode::Signed(None));
    assert!(matches!(
        sender.encode(&record(0)),
        Err(SendError::MissingSecret)
    ));
}

#[test]
fn sender_encodes_six_decimals_and_newline() {
    let sender = Sender::new("127.0.0.1:5000".parse().unwrap(), SigningMode::Unsigned);
    assert_eq!(
        sender.encode(&record(100)).unwrap(),
        "100 55.755800 -37.617300 12\n"
    );
}

#[test]
fn read_timeout_yields_none() {
    let mut server = loopback_server(ValidatorConfig::unsigned());
    server
        .set_read_timeout(Some(Duration::from_millis(50)))
        .unwrap();
    let mut out = Vec::new();

    assert!(server.serve_one(&mut out).unwrap().is_none());
    assert_eq!(*server.metrics.datagrams_received_total.lock(), 0);
}

#[test]
fn metrics_export_lists_every_counter() {
    let server = loopback_server(ValidatorConfig::unsigned());
    let exported = server.metrics.export_metrics();

    assert!(exported.contains("gps2udp_datagrams_received_total 0"));
    assert!(exported.contains("gps2udp_reports_accepted_total 0"));
    assert_eq!(exported.lines().count(), 7);
}
