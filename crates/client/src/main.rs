mod client;

use std::io::BufReader;
use std::net::TcpStream;

use anyhow::{Context, Result};
use clap::Parser;

use client::MirrorClient;
use enkinet::{FrameReader, SyncConfig, UnknownIdPolicy};

#[derive(Parser)]
#[command(name = "enkinet-client")]
#[command(about = "Mirrors a world streamed by enkinet-server")]
struct Args {
    #[arg(
        short,
        long,
        default_value = "127.0.0.1:7070",
        help = "Server address to connect to"
    )]
    server: String,

    #[arg(
        long,
        default_value_t = enkinet::config::DEFAULT_PRECISION,
        help = "Fractional digits the server writes"
    )]
    precision: usize,

    #[arg(long, help = "Hold deltas for unknown objects until the next snapshot")]
    buffer_unknown: bool,

    #[arg(long, default_value_t = enkinet::config::DEFAULT_PENDING_CAPACITY)]
    pending_capacity: usize,

    #[arg(long, help = "Stop after this many frames")]
    frames: Option<u64>,

    #[arg(long, default_value_t = 100, help = "Frames between two world summaries")]
    summary_every: u64,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let config = SyncConfig {
        precision: args.precision,
        unknown_id_policy: if args.buffer_unknown {
            UnknownIdPolicy::Buffer
        } else {
            UnknownIdPolicy::Ignore
        },
        pending_capacity: args.pending_capacity,
    };

    log::info!("Connecting to {}", args.server);
    let stream = TcpStream::connect(&args.server)
        .with_context(|| format!("connecting to {}", args.server))?;
    stream.set_nodelay(true)?;

    let mut reader = FrameReader::new(BufReader::new(stream));
    let mut client = MirrorClient::new(config);
    client.run(&mut reader, args.frames, args.summary_every)?;

    log::info!("Disconnected: {:?}", client.stats());
    Ok(())
}
