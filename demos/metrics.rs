use gps2udp::server::Server;
use gps2udp::validator::PacketValidator;
use std::thread;
use std::time::Duration;

fn main() -> std::io::Result<()> {
    let mut server = Server::bind("127.0.0.1:5001", PacketValidator::default())?;

    let metrics = server.metrics.clone();

    let metrics_thread = thread::spawn(move || loop {
        thread::sleep(Duration::from_secs(10));
        eprintln!("{}", metrics.export_metrics());
    });

    eprintln!("Listening for reports on 127.0.0.1:5001");
    eprintln!("Metrics exported every 10 seconds");

    let stdout = std::io::stdout();
    if let Err(e) = server.run(&mut stdout.lock()) {
        eprintln!("{e}");
    }

    let _ = metrics_thread.join();
    Ok(())
}
