//! Types module
//!
//! Contains core data structures used throughout the application.
//! This module organizes types into logical submodules:
//! - `packet`: Packet definitions, identifiers, modes and share records
//! - `error`: Error types for the red packet engine

pub mod error;
pub mod packet;

pub use error::SplitError;
pub use packet::{PacketId, PacketSpec, PacketUnit, ShareRecord, SplitMode};
