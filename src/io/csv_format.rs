//! CSV format handling for packet definitions and share output
//!
//! This module centralizes all CSV format concerns, providing:
//! - CsvPacketRecord structure for deserialization
//! - Conversion from CSV records to packet definitions
//! - Share output serialization
//!
//! All functions are pure (no file I/O) for easy testing.

use crate::core::packet::PacketOutcome;
use crate::types::{PacketId, PacketSpec, PacketUnit, ShareRecord, SplitMode};
use csv::Writer;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::io::Write;
use std::str::FromStr;

/// CSV record structure for deserialization
///
/// Matches the input CSV format with columns: packet, unit, total, count, mode
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct CsvPacketRecord {
    pub packet: PacketId,
    pub unit: String,
    pub total: String,
    pub count: u32,
    pub mode: String,
}

/// Convert a CsvPacketRecord to a PacketSpec
///
/// Parses the unit and mode names (case-insensitive) and the total as a
/// decimal. Whether the total suits the unit is checked when the packet is
/// opened.
///
/// # Returns
///
/// * `Ok(PacketSpec)` - Successfully converted record
/// * `Err(String)` - Error message naming the packet
pub fn convert_csv_record(csv_record: CsvPacketRecord) -> Result<PacketSpec, String> {
    let packet = csv_record.packet;

    let unit = PacketUnit::from_str(&csv_record.unit)
        .map_err(|e| format!("{} for packet {}", e, packet))?;
    let mode = SplitMode::from_str(&csv_record.mode)
        .map_err(|e| format!("{} for packet {}", e, packet))?;

    let total = csv_record.total.trim();
    if total.is_empty() {
        return Err(format!("Packet {} requires a total", packet));
    }
    let total = Decimal::from_str(total)
        .map_err(|_| format!("Invalid total '{}' for packet {}", csv_record.total, packet))?;

    Ok(PacketSpec {
        id: packet,
        unit,
        total,
        count: csv_record.count,
        mode,
    })
}

/// Streaming writer for share records
///
/// Writes the `packet,recipient,share` header on creation. Cash shares keep
/// their two decimal places; points shares are written as integers.
pub struct ShareWriter<W: Write> {
    writer: Writer<W>,
}

impl<W: Write> ShareWriter<W> {
    pub fn new(output: W) -> Result<Self, String> {
        let mut writer = Writer::from_writer(output);
        writer
            .write_record(["packet", "recipient", "share"])
            .map_err(|e| format!("Failed to write CSV header: {}", e))?;
        Ok(Self { writer })
    }

    pub fn write_share(&mut self, share: &ShareRecord) -> Result<(), String> {
        self.writer
            .write_record(&[
                share.packet.to_string(),
                share.recipient.to_string(),
                share.share.to_string(),
            ])
            .map_err(|e| format!("Failed to write share record: {}", e))
    }

    /// Write every share of a packet outcome, in order
    pub fn write_outcome(&mut self, outcome: &PacketOutcome) -> Result<(), String> {
        outcome
            .shares
            .iter()
            .try_for_each(|share| self.write_share(share))
    }

    pub fn finish(mut self) -> Result<(), String> {
        self.writer
            .flush()
            .map_err(|e| format!("Failed to flush output: {}", e))
    }
}

/// Write share records to CSV format
///
/// Shares are written in the order given, after the header.
pub fn write_shares_csv(shares: &[ShareRecord], output: &mut dyn Write) -> Result<(), String> {
    let mut writer = ShareWriter::new(output)?;
    for share in shares {
        writer.write_share(share)?;
    }
    writer.finish()
}
