//! Red Packet Engine Library
//! # Overview
//!
//! This library splits "red packets" (lucky money) into per-recipient shares,
//! with a CSV-driven pipeline implementing both a sync and an async strategy.
//!
//! # Architecture
//!
//! - [`types`] - Core data types (PacketSpec, ShareRecord, SplitError, etc.)
//! - [`cli`] - CLI arguments parsing
//! - [`core`] - Splitting logic:
//!   - [`core::integer`] - Whole-unit ("points") allocator
//!   - [`core::fractional`] - Two-decimal ("cash") allocator
//!   - [`core::packet`] - Mutex-guarded packet sessions
//!   - [`core::global`] - Process-wide serialized split entry points
//! - [`io`] - CSV reading and share output
//! - [`strategy`] - Sync and async processing pipelines
//!
//! # Split Modes
//!
//! - **Fair**: Every recipient gets the floored average; the last recipient
//!   also takes whatever is left
//! - **Random**: Each share is random, bounded so that the remaining total can
//!   still be split legally
//!
//! # Example
//!
//! ```
//! use red_packet_engine::split_integer;
//!
//! let mut remaining = 11;
//! let mut shares = Vec::new();
//! for left in (1..=5).rev() {
//!     let share = split_integer(remaining, left, true).unwrap();
//!     remaining -= share;
//!     shares.push(share);
//! }
//! assert_eq!(shares, vec![2, 2, 2, 2, 3]);
//! ```

pub mod cli;
pub mod core;
pub mod io;
pub mod strategy;
pub mod types;

pub use core::{
    split_fractional, split_integer, FractionalAllocator, IntegerAllocator, Packet,
    PacketRegistry, RedPacket, ShareLimits, SplitConfig,
};
pub use io::write_shares_csv;
pub use types::{PacketId, PacketSpec, PacketUnit, ShareRecord, SplitError, SplitMode};
