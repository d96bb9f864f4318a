//! Processing strategy module for packet splitting
//!
//! This module defines the Strategy pattern for complete splitting pipelines,
//! covering CSV parsing, packet draining and share output. Different
//! implementations (synchronous, asynchronous batch) are selected at runtime.

use crate::cli::StrategyType;
use crate::core::limits::SplitConfig;
use crate::core::packet::PacketOutcome;
use std::io::Write;
use std::path::Path;
use tracing::warn;

pub mod r#async;
pub mod sync;

pub use self::r#async::{AsyncProcessingStrategy, BatchConfig};
pub use sync::SyncProcessingStrategy;

/// Processing strategy trait for complete splitting pipelines
///
/// Each strategy reads packet definitions from a CSV file, hands out every
/// share of every packet and writes the shares to output.
pub trait ProcessingStrategy: Send + Sync {
    /// Split the packets from `input_path` and write their shares to `output`
    ///
    /// Shares are written ordered by packet (input order) then recipient.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The input file cannot be opened
    /// - A fatal I/O error occurs during reading or writing
    ///
    /// Invalid rows, duplicate packet ids and packets stopped by a split
    /// error are logged and skipped; processing continues with the next
    /// packet.
    fn process(&self, input_path: &Path, output: &mut dyn Write) -> Result<(), String>;
}

/// Create a processing strategy based on the specified strategy type
///
/// # Arguments
///
/// * `strategy_type` - The type of processing strategy to create (Sync or Async)
/// * `split` - Share limits and seed used to open packets
/// * `batch` - Optional configuration for async batch processing (ignored for sync)
pub fn create_strategy(
    strategy_type: StrategyType,
    split: SplitConfig,
    batch: Option<BatchConfig>,
) -> Box<dyn ProcessingStrategy> {
    match strategy_type {
        StrategyType::Sync => Box::new(SyncProcessingStrategy::new(split)),
        StrategyType::Async => {
            let batch = batch.unwrap_or_default();
            Box::new(AsyncProcessingStrategy::new(split, batch))
        }
    }
}

/// Log a packet that stopped before every recipient was paid
pub(crate) fn report_outcome(outcome: &PacketOutcome) {
    if let Some(error) = &outcome.error {
        warn!(
            packet = outcome.packet,
            issued = outcome.shares.len(),
            error = %error,
            "Packet stopped early"
        );
    }
}
