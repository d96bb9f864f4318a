//! Red packet splitter CLI
//!
//! Reads packet definitions from a CSV file, hands out every share of every
//! packet and writes the shares to stdout.
//!
//! # Usage
//!
//! ```bash
//! cargo run -- packets.csv > shares.csv
//! cargo run -- --seed 42 packets.csv > shares.csv
//! cargo run -- --strategy async --grabbers 8 --batch-size 50 packets.csv > shares.csv
//! RUST_LOG=debug cargo run -- packets.csv > shares.csv
//! ```
//!
//! # Processing Strategies
//!
//! - **sync**: One packet at a time, one grabber (default)
//! - **async**: Batches of packets drained concurrently by racing grabbers
//!
//! # Exit Codes
//!
//! - 0: Success
//! - 1: Error (invalid limits, file not found, file not readable, etc.)

use red_packet_engine::cli;
use red_packet_engine::strategy;
use std::process;
use tracing::error;
use tracing_subscriber::EnvFilter;

fn main() {
    // Diagnostics go to stderr so stdout stays pure CSV
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = cli::parse_args();

    let split = match args.to_split_config() {
        Ok(split) => split,
        Err(e) => {
            error!("Invalid share limits: {}", e);
            process::exit(1);
        }
    };

    let batch = matches!(args.strategy, cli::StrategyType::Async).then(|| args.to_batch_config());
    let strategy = strategy::create_strategy(args.strategy, split, batch);

    let mut output = std::io::stdout();
    if let Err(e) = strategy.process(&args.input_file, &mut output) {
        error!("{}", e);
        process::exit(1);
    }
}
