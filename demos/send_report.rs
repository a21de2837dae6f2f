use gps2udp::client::Sender;
use gps2udp::config::SigningMode;
use gps2udp::packet::Record;
use gps2udp::validator::unix_now;

// Sends one report per second to 127.0.0.1:5000. Signs the reports when
// GPS2UDP_SECRET is set.
fn main() -> Result<(), Box<dyn std::error::Error>> {
    let signing = match SigningMode::signed_from_env() {
        SigningMode::Signed(None) => SigningMode::Unsigned,
        signed => signed,
    };
    let sender = Sender::new("127.0.0.1:5000".parse()?, signing);

    for i in 0..10 {
        let record = Record {
            timestamp: unix_now(),
            latitude: 48.8583 + f64::from(i) * 0.0001,
            longitude: 2.2945,
            accuracy: 25,
        };
        sender.send(&record)?;
        eprintln!("sent {record} to {}", sender.target());
        std::thread::sleep(std::time::Duration::from_secs(1));
    }

    Ok(())
}
