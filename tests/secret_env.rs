// Runs as its own test binary so changing the process environment cannot
// race with other tests.

use gps2udp::config::{SigningMode, ValidatorConfig, SECRET_ENV};
use gps2udp::crypto;
use gps2udp::error::Rejection;
use gps2udp::validator::PacketValidator;

const NOW: i64 = 1_700_000_000;

fn validator_from_env() -> PacketValidator {
    let config = ValidatorConfig {
        signing: SigningMode::signed_from_env(),
        ..ValidatorConfig::default()
    };
    PacketValidator::new(config)
}

#[test]
fn secret_comes_from_environment() {
    let payload = format!("{NOW} 1.1 2.2 3");

    std::env::remove_var(SECRET_ENV);
    assert_eq!(SigningMode::signed_from_env(), SigningMode::Signed(None));
    let datagram = format!("{payload} {}", crypto::digest(&payload, b""));
    assert_eq!(
        validator_from_env().validate_at(datagram.as_bytes(), NOW),
        Err(Rejection::MissingSecret)
    );

    std::env::set_var(SECRET_ENV, "");
    assert_eq!(SigningMode::signed_from_env(), SigningMode::Signed(None));
    assert_eq!(
        validator_from_env().validate_at(datagram.as_bytes(), NOW),
        Err(Rejection::MissingSecret)
    );

    std::env::set_var(SECRET_ENV, "from-env");
    let datagram = format!("{payload} {}", crypto::digest(&payload, b"from-env"));
    assert!(validator_from_env()
        .validate_at(datagram.as_bytes(), NOW)
        .is_ok());

    std::env::remove_var(SECRET_ENV);
}
