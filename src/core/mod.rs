//! Core splitting logic
//!
//! This module contains the red packet splitting components:
//! - `traits` - Allocator abstraction shared by both units
//! - `limits` - Share bounds, validity predicate and split configuration
//! - `integer` - Whole-unit ("points") allocator
//! - `fractional` - Two-decimal ("cash") allocator
//! - `packet` - Mutex-guarded packet sessions
//! - `global` - Process-wide serialized split entry points
//! - `async` - Concurrent registry and grab processing

pub mod fractional;
pub mod global;
pub mod integer;
pub mod limits;
pub mod packet;
pub mod r#async;
pub mod traits;

pub use fractional::FractionalAllocator;
pub use global::{split_fractional, split_integer, AllocationGuard};
pub use integer::IntegerAllocator;
pub use limits::{ShareLimits, SplitConfig};
pub use packet::{Grab, Packet, PacketOutcome, RedPacket};
pub use r#async::{GrabProcessor, PacketRegistry};
pub use traits::Allocator;
