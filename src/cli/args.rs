use crate::core::limits::{
    ShareLimits, SplitConfig, DEFAULT_MAX_SHARE, DEFAULT_MIN_SHARE, DEFAULT_MULTIPLIER,
};
use crate::strategy::BatchConfig;
use clap::{Parser, ValueEnum};
use rust_decimal::Decimal;
use std::path::PathBuf;

/// Split red packets into lucky-money shares
#[derive(Parser, Debug)]
#[command(name = "red-packet")]
#[command(about = "Split red packets into lucky-money shares", long_about = None)]
pub struct CliArgs {
    /// Input CSV file path containing packet definitions
    #[arg(value_name = "INPUT", help = "Path to the input CSV file")]
    pub input_file: PathBuf,

    /// Processing strategy to use
    #[arg(
        long = "strategy",
        value_name = "STRATEGY",
        default_value = "sync",
        help = "Processing strategy: 'sync' for sequential or 'async' for concurrent grabbers"
    )]
    pub strategy: StrategyType,

    /// Number of packets per batch (async mode only)
    #[arg(
        long = "batch-size",
        value_name = "SIZE",
        help = "Number of packets per batch (default: 100)"
    )]
    pub batch_size: Option<usize>,

    /// Number of runtime worker threads (async mode only)
    #[arg(
        long = "max-concurrent",
        value_name = "COUNT",
        help = "Number of runtime worker threads (default: CPU cores)"
    )]
    pub max_concurrent: Option<usize>,

    /// Concurrent grabbers per packet (async mode only)
    #[arg(
        long = "grabbers",
        value_name = "COUNT",
        help = "Concurrent grabbers per packet (default: 4)"
    )]
    pub grabbers: Option<usize>,

    /// Seed for reproducible random shares
    #[arg(long = "seed", value_name = "SEED")]
    pub seed: Option<u64>,

    /// Smallest points share
    #[arg(long = "min-share", value_name = "POINTS", default_value_t = DEFAULT_MIN_SHARE)]
    pub min_share: u64,

    /// Largest points share
    #[arg(long = "max-share", value_name = "POINTS", default_value_t = DEFAULT_MAX_SHARE)]
    pub max_share: u64,

    /// Random-mode cap as a multiple of the remaining average
    #[arg(long = "multiplier", value_name = "FACTOR", default_value_t = DEFAULT_MULTIPLIER)]
    pub multiplier: Decimal,
}

/// Available processing strategies
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum StrategyType {
    Sync,
    Async,
}

impl CliArgs {
    /// Create a BatchConfig from CLI arguments
    ///
    /// Missing values use the defaults; zero values fall back to the
    /// defaults with a warning.
    pub fn to_batch_config(&self) -> BatchConfig {
        if self.batch_size.is_none() && self.max_concurrent.is_none() && self.grabbers.is_none() {
            return BatchConfig::default();
        }

        let default = BatchConfig::default();
        BatchConfig::new(
            self.batch_size.unwrap_or(default.batch_size),
            self.max_concurrent.unwrap_or(default.max_concurrent),
            self.grabbers.unwrap_or(default.grabbers),
        )
    }

    /// Create a SplitConfig from CLI arguments
    ///
    /// # Errors
    ///
    /// Returns a message if the share limits are inconsistent.
    pub fn to_split_config(&self) -> Result<SplitConfig, String> {
        let limits = ShareLimits::new(self.min_share, self.max_share, self.multiplier)
            .map_err(|e| e.to_string())?;
        Ok(SplitConfig::new(limits, self.seed))
    }
}
