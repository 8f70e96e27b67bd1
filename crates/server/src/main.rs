mod config;
mod events;
mod generator;
mod server;
mod simulation;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use config::ServerConfig;
use generator::WorldGenerator;
use server::WorldServer;

#[derive(Parser)]
#[command(name = "enkinet-server")]
#[command(about = "Simulates a random robot world and streams it to clients")]
struct Args {
    #[arg(short, long, help = "TOML configuration file")]
    config: Option<PathBuf>,

    #[arg(short, long)]
    bind: Option<String>,

    #[arg(short, long)]
    port: Option<u16>,

    #[arg(short, long)]
    tick_rate: Option<u32>,

    #[arg(long, help = "Ticks between snapshots sent to a client")]
    snapshot_interval: Option<u64>,

    #[arg(short, long)]
    max_clients: Option<usize>,

    #[arg(long, help = "World generator seed")]
    seed: Option<u64>,

    #[arg(long, help = "Fractional digits written for floats")]
    precision: Option<usize>,

    #[arg(long, help = "Stop after this many ticks")]
    ticks: Option<u64>,
}

impl Args {
    fn apply(&self, config: &mut ServerConfig) {
        if let Some(bind) = &self.bind {
            config.bind = bind.clone();
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(tick_rate) = self.tick_rate {
            config.tick_rate = tick_rate;
        }
        if let Some(interval) = self.snapshot_interval {
            config.snapshot_interval = interval;
        }
        if let Some(max_clients) = self.max_clients {
            config.max_clients = max_clients;
        }
        if let Some(seed) = self.seed {
            config.generator.seed = Some(seed);
        }
        if let Some(precision) = self.precision {
            config.sync.precision = precision;
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => ServerConfig::load(path)?,
        None => ServerConfig::default(),
    };
    args.apply(&mut config);
    config.validate()?;

    let mut generator = WorldGenerator::from_config(&config.generator);
    let world = generator.populated(&config.generator);
    log::info!("Seed {} produced {} objects", generator.seed(), world.object_count());

    let bind_addr = config.bind_addr();
    let mut server = WorldServer::new(&bind_addr, config, world)
        .with_context(|| format!("binding {}", bind_addr))?;

    log::info!("Server started on {}", server.local_addr()?);
    server.run(args.ticks);
    log::info!(
        "Server shutting down after {} ticks, {} frames sent",
        server.tick(),
        server.frames_sent()
    );

    Ok(())
}
