//! Error types for the red packet engine
//!
//! This module defines all error types that can occur while splitting packets
//! or while driving packets to completion.
//!
//! # Error Categories
//!
//! - **Split Errors**: No legal share exists, the repair interval collapsed,
//!   arithmetic overflow, invalid amounts
//! - **Packet Errors**: Grabbing from an exhausted packet, duplicate packet IDs
//!
//! File and CSV problems never reach this type; the readers report them as
//! messages with line numbers.

use crate::types::PacketId;
use rust_decimal::Decimal;
use thiserror::Error;

/// Main error type for the red packet engine
///
/// None of these are retried internally. A split error ends the packet's
/// sequence; the caller decides whether anything else continues.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SplitError {
    /// The remaining total cannot be split across the remaining recipients
    ///
    /// Raised when the floored average falls outside the share limits,
    /// or when no recipients are left to split across.
    #[error("Cannot split {total} across {recipients} recipient(s) within share limits")]
    InvalidDistribution {
        /// Remaining total at the time of the call
        total: Decimal,
        /// Remaining recipients at the time of the call
        recipients: u32,
    },

    /// The random draw's bound repair ran out of candidates
    ///
    /// Every candidate share in the original interval left an illegal
    /// remainder. Never returned as an out-of-bounds share.
    #[error("Share interval collapsed to [{lower}, {upper}] while splitting {remaining} across {recipients} recipient(s)")]
    IntervalCollapse {
        /// Lower bound when the interval collapsed
        lower: u64,
        /// Upper bound when the interval collapsed
        upper: u64,
        /// Remaining total being split
        remaining: u64,
        /// Remaining recipients
        recipients: u32,
    },

    /// Arithmetic overflow would occur
    #[error("Arithmetic overflow in {operation}")]
    ArithmeticOverflow {
        /// Operation that would overflow
        operation: String,
    },

    /// Amount that cannot be split (negative, fractional points, etc.)
    #[error("Invalid amount '{amount}': {reason}")]
    InvalidAmount {
        /// The offending amount
        amount: String,
        /// Why the amount was rejected
        reason: String,
    },

    /// Share limits that cannot produce any share
    #[error("Invalid share limits: {reason}")]
    InvalidLimits {
        /// Why the limits were rejected
        reason: String,
    },

    /// Every recipient of the packet has already been paid
    #[error("Packet{} has no recipients left", packet.map(|p| format!(" {}", p)).unwrap_or_default())]
    PacketExhausted {
        /// Packet ID, when known
        packet: Option<PacketId>,
    },

    /// A packet with this ID is already open
    #[error("Packet {packet} is already open")]
    DuplicatePacket {
        /// Duplicated packet ID
        packet: PacketId,
    },
}

// Helper functions for creating common errors

impl SplitError {
    /// Create an InvalidDistribution error
    pub fn invalid_distribution(total: impl Into<Decimal>, recipients: u32) -> Self {
        SplitError::InvalidDistribution {
            total: total.into(),
            recipients,
        }
    }

    /// Create an IntervalCollapse error
    pub fn interval_collapse(lower: u64, upper: u64, remaining: u64, recipients: u32) -> Self {
        SplitError::IntervalCollapse {
            lower,
            upper,
            remaining,
            recipients,
        }
    }

    /// Create an ArithmeticOverflow error
    pub fn arithmetic_overflow(operation: &str) -> Self {
        SplitError::ArithmeticOverflow {
            operation: operation.to_string(),
        }
    }

    /// Create an InvalidAmount error
    pub fn invalid_amount(amount: impl ToString, reason: &str) -> Self {
        SplitError::InvalidAmount {
            amount: amount.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Create an InvalidLimits error
    pub fn invalid_limits(reason: &str) -> Self {
        SplitError::InvalidLimits {
            reason: reason.to_string(),
        }
    }

    /// Create a PacketExhausted error
    pub fn packet_exhausted(packet: Option<PacketId>) -> Self {
        SplitError::PacketExhausted { packet }
    }

    /// Create a DuplicatePacket error
    pub fn duplicate_packet(packet: PacketId) -> Self {
        SplitError::DuplicatePacket { packet }
    }

    /// Whether this error only means the packet has been fully handed out
    pub fn is_exhausted(&self) -> bool {
        matches!(self, SplitError::PacketExhausted { .. })
    }
}
