//! Synchronous processing strategy
//!
//! This module provides a single-threaded implementation of the
//! ProcessingStrategy trait. Packets are opened one at a time as rows are
//! read and drained before the next row.
//!
//! # Design
//!
//! The SyncProcessingStrategy focuses on orchestration, delegating:
//! - CSV parsing to `SyncReader` (iterator interface)
//! - Share computation to `Packet` (packet sessions)
//! - CSV output to `csv_format::ShareWriter` (format handling)
//!
//! # Memory Efficiency
//!
//! Only the packet being drained and the set of seen packet ids are kept.
//! Shares are written as soon as their packet is drained.

use crate::core::limits::SplitConfig;
use crate::core::packet::Packet;
use crate::io::csv_format::ShareWriter;
use crate::io::sync_reader::SyncReader;
use crate::strategy::{report_outcome, ProcessingStrategy};
use crate::types::SplitError;
use std::collections::HashSet;
use std::io::Write;
use std::path::Path;
use tracing::{debug, warn};

/// Synchronous processing strategy
///
/// # Examples
///
/// ```no_run
/// use red_packet_engine::core::SplitConfig;
/// use red_packet_engine::strategy::{ProcessingStrategy, SyncProcessingStrategy};
/// use std::path::Path;
/// use std::io;
///
/// let strategy = SyncProcessingStrategy::new(SplitConfig::default());
/// let mut output = io::stdout();
///
/// strategy.process(Path::new("packets.csv"), &mut output)
///     .expect("Processing failed");
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct SyncProcessingStrategy {
    config: SplitConfig,
}

impl SyncProcessingStrategy {
    pub fn new(config: SplitConfig) -> Self {
        Self { config }
    }
}

impl ProcessingStrategy for SyncProcessingStrategy {
    /// Split packets from input file and write shares to output
    ///
    /// 1. Streams packet definitions from the CSV file
    /// 2. Skips rows that fail to parse and ids that were already seen
    /// 3. Opens and drains each packet in turn
    /// 4. Writes each packet's shares before reading the next row
    ///
    /// Fatal errors (file not found, I/O errors) are returned immediately.
    fn process(&self, input_path: &Path, output: &mut dyn Write) -> Result<(), String> {
        let reader = SyncReader::new(input_path)?;
        let mut writer = ShareWriter::new(output)?;
        let mut seen = HashSet::new();

        for result in reader {
            let spec = match result {
                Ok(spec) => spec,
                Err(e) => {
                    warn!(error = %e, "Skipping invalid packet record");
                    continue;
                }
            };

            if !seen.insert(spec.id) {
                warn!(
                    packet = spec.id,
                    error = %SplitError::duplicate_packet(spec.id),
                    "Skipping packet"
                );
                continue;
            }

            let packet = match Packet::open(&spec, &self.config) {
                Ok(packet) => packet,
                Err(e) => {
                    warn!(packet = spec.id, error = %e, "Failed to open packet");
                    continue;
                }
            };

            let outcome = packet.drain();
            debug!(packet = outcome.packet, shares = outcome.shares.len(), "Packet drained");
            report_outcome(&outcome);
            writer.write_outcome(&outcome)?;
        }

        writer.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::limits::ShareLimits;
    use std::io::Write;
    use tempfile::NamedTempFile;

    /// Helper function to create a temporary CSV file for testing
    fn create_temp_csv(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("Failed to create temp file");
        file.write_all(content.as_bytes())
            .expect("Failed to write to temp file");
        file.flush().expect("Failed to flush temp file");
        file
    }

    fn run(content: &str) -> String {
        let file = create_temp_csv(content);
        let strategy = SyncProcessingStrategy::new(SplitConfig::new(ShareLimits::default(), Some(3)));
        let mut output = Vec::new();

        strategy.process(file.path(), &mut output).unwrap();

        String::from_utf8(output).unwrap()
    }

    #[test]
    fn test_sync_strategy_splits_fair_packets() {
        let output = run("packet,unit,total,count,mode\n\
                          1,points,11,5,fair\n\
                          2,cash,10.00,3,fair\n");

        assert_eq!(
            output,
            "packet,recipient,share\n\
             1,1,2\n1,2,2\n1,3,2\n1,4,2\n1,5,3\n\
             2,1,3.33\n2,2,3.33\n2,3,3.34\n"
        );
    }

    #[test]
    fn test_sync_strategy_handles_missing_file() {
        let strategy = SyncProcessingStrategy::default();
        let mut output = Vec::new();

        let result = strategy.process(Path::new("nonexistent.csv"), &mut output);
        assert!(result.is_err());
        assert!(result.unwrap_err().contains("Failed to open file"));
    }

    #[test]
    fn test_sync_strategy_skips_duplicate_and_invalid_packets() {
        let output = run("packet,unit,total,count,mode\n\
                          1,points,4,2,fair\n\
                          1,points,100,2,fair\n\
                          2,points,3.5,2,fair\n\
                          3,coins,10,2,fair\n\
                          4,points,6,3,fair\n");

        assert_eq!(
            output,
            "packet,recipient,share\n1,1,2\n1,2,2\n4,1,2\n4,2,2\n4,3,2\n"
        );
    }

    #[test]
    fn test_sync_strategy_writes_nothing_for_invalid_distribution() {
        let output = run("packet,unit,total,count,mode\n\
                          1,points,0,5,random\n\
                          2,points,3,1,random\n");

        assert_eq!(output, "packet,recipient,share\n2,1,3\n");
    }

    #[test]
    fn test_sync_strategy_random_packets_sum_to_total() {
        let output = run("packet,unit,total,count,mode\n\
                          1,points,1000,10,random\n");

        let shares: Vec<u64> = output
            .lines()
            .skip(1)
            .map(|line| line.rsplit(',').next().unwrap().parse().unwrap())
            .collect();

        assert_eq!(shares.len(), 10);
        assert_eq!(shares.iter().sum::<u64>(), 1000);
    }
}
