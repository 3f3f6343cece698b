use clap::Parser;
use client::network::Connection;
use log::info;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Host address to connect to
    #[arg(short = 's', long, default_value = "127.0.0.1")]
    server: String,

    /// Host port
    #[arg(short, long, default_value_t = shared::DEFAULT_PORT)]
    port: u16,

    /// Display name shown to the host and other players
    #[arg(short, long)]
    name: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args = Args::parse();

    let addr = format!("{}:{}", args.server, args.port);
    info!("Connecting to {}...", addr);
    let mut connection = Connection::connect(&addr, &args.name).await?;
    println!("Connected as {}. Waiting for the game to start...", args.name);

    // Keyboard lines flow to the protocol loop over a channel; the loop
    // decides what they mean based on the state of the round.
    let (typed_tx, typed_rx) = mpsc::unbounded_channel();
    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            if typed_tx.send(line).is_err() {
                break;
            }
        }
    });

    connection.run(typed_rx).await
}
