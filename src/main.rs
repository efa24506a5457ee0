//! sente: a Monte-Carlo Go engine speaking GTP.
//!
//! ## Usage
//!
//! - `sente` or `sente gtp` — speak GTP on stdin/stdout
//! - `sente bench` — run a playout benchmark
//!
//! Logging goes to stderr and is controlled by `RUST_LOG` (the GTP
//! stream owns stdout).

use anyhow::Result;
use clap::{Parser, Subcommand};

use sente::engine::Engine;
use sente::gtp::GtpSession;

/// Monte-Carlo Go engine with RAVE and tactical playouts.
#[derive(Parser)]
#[command(name = "sente")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Initial board size.
    #[arg(long, default_value_t = 9)]
    size: usize,

    /// Playouts per move decision.
    #[arg(long)]
    playouts: Option<u32>,

    /// Seed for reproducible searches.
    #[arg(long)]
    seed: Option<u64>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Speak GTP on stdin/stdout (the default).
    Gtp,
    /// Time raw playouts from the starting position.
    Bench {
        /// Number of playouts to run.
        #[arg(long, default_value_t = 10_000)]
        playouts: u32,
    },
}

fn main() -> Result<()> {
    let _logger = flexi_logger::Logger::try_with_env_or_str("info")?.start()?;
    let cli = Cli::parse();

    let mut engine = match cli.seed {
        Some(seed) => Engine::with_seed(seed),
        None => Engine::new(),
    };
    engine.set_size(cli.size)?;
    if let Some(playouts) = cli.playouts {
        engine.set_playouts(playouts);
    }

    match cli.command {
        Some(Commands::Bench { playouts }) => bench(engine, playouts),
        Some(Commands::Gtp) | None => GtpSession::new(engine).run(),
    }
}

fn bench(mut engine: Engine, playouts: u32) -> Result<()> {
    let start = std::time::Instant::now();
    let moves = engine.perft(playouts);
    let secs = start.elapsed().as_secs_f64();
    println!(
        "{playouts} playouts in {secs:.2}s: {:.0} playouts/s, average length {:.1}",
        playouts as f64 / secs,
        moves as f64 / playouts.max(1) as f64,
    );
    Ok(())
}
