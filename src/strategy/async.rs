//! Asynchronous batch processing strategy
//!
//! This module provides a multi-threaded implementation of the
//! ProcessingStrategy trait. Packets are read in batches; the packets of a
//! batch are drained concurrently, each by several racing grabber tasks.
//!
//! # Architecture
//!
//! ```text
//! AsyncProcessingStrategy
//!     ├── BatchConfig (batch_size, max_concurrent, grabbers)
//!     ├── AsyncReader (batch CSV reading)
//!     ├── PacketRegistry (open packets by id)
//!     └── GrabProcessor (concurrent grabbers per packet)
//! ```
//!
//! # Ordering
//!
//! Batches are processed one after another and `drain_all` keeps packet
//! order, so the output follows input order exactly as the sync strategy's
//! does. With the same seed both strategies write the same shares.

use crate::core::limits::SplitConfig;
use crate::core::r#async::grab_processor::DEFAULT_GRABBERS;
use crate::core::r#async::{GrabProcessor, PacketRegistry};
use crate::io::async_reader::AsyncReader;
use crate::io::csv_format::ShareWriter;
use crate::strategy::{report_outcome, ProcessingStrategy};
use crate::types::SplitError;
use std::collections::HashSet;
use std::io::Write;
use std::path::Path;
use tracing::{debug, warn};

/// Default number of packets per batch
pub const DEFAULT_BATCH_SIZE: usize = 100;

/// Configuration for batch processing
///
/// Controls how packets are batched, the number of runtime worker threads
/// and the number of concurrent grabbers per packet.
#[derive(Clone, Debug, PartialEq)]
pub struct BatchConfig {
    /// Number of packets per batch
    pub batch_size: usize,
    /// Number of runtime worker threads
    pub max_concurrent: usize,
    /// Number of grabber tasks racing on each packet
    pub grabbers: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            max_concurrent: num_cpus::get(),
            grabbers: DEFAULT_GRABBERS,
        }
    }
}

impl BatchConfig {
    /// Create a new BatchConfig with custom values
    ///
    /// Zero values are replaced by their defaults with a warning.
    pub fn new(batch_size: usize, max_concurrent: usize, grabbers: usize) -> Self {
        let default = Self::default();

        Self {
            batch_size: or_default("batch_size", batch_size, default.batch_size),
            max_concurrent: or_default("max_concurrent", max_concurrent, default.max_concurrent),
            grabbers: or_default("grabbers", grabbers, default.grabbers),
        }
    }
}

fn or_default(name: &str, value: usize, default: usize) -> usize {
    if value == 0 {
        warn!(
            option = name,
            value,
            default,
            "Invalid batch option, using default"
        );
        default
    } else {
        value
    }
}

/// Asynchronous batch processing strategy
///
/// # Configuration
///
/// - `batch_size`: Number of packets per batch (default: 100)
/// - `max_concurrent`: Number of worker threads (default: CPU cores)
/// - `grabbers`: Concurrent grabbers per packet (default: 4)
#[derive(Debug, Clone)]
pub struct AsyncProcessingStrategy {
    split: SplitConfig,
    batch: BatchConfig,
}

impl AsyncProcessingStrategy {
    pub fn new(split: SplitConfig, batch: BatchConfig) -> Self {
        Self { split, batch }
    }
}

impl ProcessingStrategy for AsyncProcessingStrategy {
    /// Split packets from input file and write shares to output
    ///
    /// 1. Creates a tokio multi-threaded runtime
    /// 2. Reads packet definitions in batches using AsyncReader
    /// 3. Opens each packet in the registry, skipping ids already seen and
    ///    invalid totals
    /// 4. Drains the batch's packets concurrently and waits for all of them
    /// 5. Writes the batch's shares and drops the packets from the registry
    ///    before reading the next batch
    ///
    /// Fatal errors (file not found, I/O errors, runtime errors) are
    /// returned immediately.
    fn process(&self, input_path: &Path, output: &mut dyn Write) -> Result<(), String> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(self.batch.max_concurrent)
            .build()
            .map_err(|e| format!("Failed to create tokio runtime: {}", e))?;

        runtime.block_on(async {
            let registry = PacketRegistry::new(self.split);
            let processor = GrabProcessor::new(self.batch.grabbers);

            let file = tokio::fs::File::open(input_path)
                .await
                .map_err(|e| format!("Failed to open file '{}': {}", input_path.display(), e))?;

            // Wrap tokio file in a compatibility layer for csv-async
            let compat_file = tokio_util::compat::TokioAsyncReadCompatExt::compat(file);
            let mut reader = AsyncReader::new(compat_file);
            let mut writer = ShareWriter::new(output)?;
            let mut seen = HashSet::new();

            loop {
                let batch = reader.read_batch(self.batch.batch_size).await;
                if batch.is_empty() {
                    break;
                }

                let mut packets = Vec::with_capacity(batch.len());
                for spec in &batch {
                    if !seen.insert(spec.id) {
                        warn!(packet = spec.id, error = %SplitError::duplicate_packet(spec.id), "Skipping packet");
                        continue;
                    }
                    match registry.open(spec) {
                        Ok(packet) => packets.push(packet),
                        Err(e) => warn!(packet = spec.id, error = %e, "Failed to open packet"),
                    }
                }

                debug!(packets = packets.len(), "Draining batch");
                for outcome in processor.drain_all(packets).await {
                    report_outcome(&outcome);
                    writer.write_outcome(&outcome)?;
                    registry.remove(outcome.packet);
                }
            }

            writer.finish()
        })
    }
}
