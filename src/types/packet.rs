//! Packet-related types for the red packet engine
//!
//! This module defines how a red packet is described before it is opened
//! (`PacketSpec`) and the identifiers and modes used across the engine.

use rust_decimal::Decimal;
use std::fmt;
use std::str::FromStr;

/// Red packet identifier
///
/// Supports packet IDs from 0 to 4,294,967,295
pub type PacketId = u32;

/// How shares of a packet are distributed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplitMode {
    /// Near-equal shares, fully deterministic
    ///
    /// Every recipient gets the floored average; the last one absorbs the remainder.
    Fair,

    /// Bounded pseudo-random shares
    ///
    /// Shares vary between draws but always respect the share limits
    /// and the sum invariant.
    Random,
}

impl SplitMode {
    /// Map the boolean `fair` flag used by the stateless entry points
    pub fn from_fair(fair: bool) -> Self {
        if fair {
            SplitMode::Fair
        } else {
            SplitMode::Random
        }
    }

    pub fn is_fair(self) -> bool {
        matches!(self, SplitMode::Fair)
    }
}

impl fmt::Display for SplitMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SplitMode::Fair => write!(f, "fair"),
            SplitMode::Random => write!(f, "random"),
        }
    }
}

impl FromStr for SplitMode {
    type Err = String;

    /// Parse a mode name, ignoring case and surrounding whitespace
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "fair" => Ok(SplitMode::Fair),
            "random" => Ok(SplitMode::Random),
            other => Err(format!("Invalid split mode: '{}'", other)),
        }
    }
}

/// Numeric precision of a packet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PacketUnit {
    /// Whole units ("points"), split by the integer allocator
    Points,

    /// Currency with two decimal places, split by the fractional allocator
    Cash,
}

impl fmt::Display for PacketUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PacketUnit::Points => write!(f, "points"),
            PacketUnit::Cash => write!(f, "cash"),
        }
    }
}

impl FromStr for PacketUnit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "points" => Ok(PacketUnit::Points),
            "cash" => Ok(PacketUnit::Cash),
            other => Err(format!("Invalid packet unit: '{}'", other)),
        }
    }
}

/// Definition of a red packet as read from the input CSV
///
/// The total is kept as a `Decimal` regardless of unit; a points packet
/// is checked for an integral total when it is opened.
#[derive(Debug, Clone, PartialEq)]
pub struct PacketSpec {
    /// Unique packet identifier
    pub id: PacketId,

    /// Which allocator splits this packet
    pub unit: PacketUnit,

    /// Total amount to split across all recipients
    pub total: Decimal,

    /// Number of recipients
    pub count: u32,

    /// Fair or random distribution
    pub mode: SplitMode,
}

/// One recipient's share, as written to the output CSV
#[derive(Debug, Clone, PartialEq)]
pub struct ShareRecord {
    /// Packet the share was drawn from
    pub packet: PacketId,

    /// 1-based position of this share in the packet's grab order
    pub recipient: u32,

    /// Share amount (integral for points packets, 2 decimal places for cash)
    pub share: Decimal,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::fair(true, SplitMode::Fair)]
    #[case::random(false, SplitMode::Random)]
    fn test_split_mode_from_fair(#[case] fair: bool, #[case] expected: SplitMode) {
        assert_eq!(SplitMode::from_fair(fair), expected);
        assert_eq!(SplitMode::from_fair(fair).is_fair(), fair);
    }

    #[rstest]
    #[case::lowercase("fair", SplitMode::Fair)]
    #[case::uppercase("RANDOM", SplitMode::Random)]
    #[case::padded("  Fair ", SplitMode::Fair)]
    fn test_split_mode_parsing(#[case] input: &str, #[case] expected: SplitMode) {
        assert_eq!(input.parse::<SplitMode>(), Ok(expected));
    }

    #[rstest]
    #[case::points("points", PacketUnit::Points)]
    #[case::cash("Cash", PacketUnit::Cash)]
    fn test_packet_unit_parsing(#[case] input: &str, #[case] expected: PacketUnit) {
        assert_eq!(input.parse::<PacketUnit>(), Ok(expected));
    }

    #[test]
    fn test_parsing_rejects_unknown_names() {
        assert!("even".parse::<SplitMode>().unwrap_err().contains("Invalid split mode"));
        assert!("coins".parse::<PacketUnit>().unwrap_err().contains("Invalid packet unit"));
    }

    #[test]
    fn test_display_matches_csv_spelling() {
        assert_eq!(SplitMode::Fair.to_string(), "fair");
        assert_eq!(SplitMode::Random.to_string(), "random");
        assert_eq!(PacketUnit::Points.to_string(), "points");
        assert_eq!(PacketUnit::Cash.to_string(), "cash");
    }
}
