use gps2udp::server::Server;
use gps2udp::validator::PacketValidator;

fn main() -> std::io::Result<()> {
    let mut server = Server::bind("127.0.0.1:5000", PacketValidator::default())?;

    eprintln!("Listening for reports on 127.0.0.1:5000");
    eprintln!("Press Ctrl+C to exit");

    let stdout = std::io::stdout();
    if let Err(e) = server.run(&mut stdout.lock()) {
        eprintln!("{e}");
    }

    Ok(())
}
