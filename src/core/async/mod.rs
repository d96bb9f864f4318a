//! Concurrent packet handling
//!
//! This module provides the pieces used by the async strategy:
//!
//! - **PacketRegistry**: Open packets by id in a `DashMap`
//! - **GrabProcessor**: Drains packets with racing tokio grabber tasks
//!
//! # Thread Safety
//!
//! - Grabs on different packets proceed in parallel
//! - Grabs on the same packet are serialized by the packet session
//! - No global locks

pub mod grab_processor;
pub mod registry;

pub use grab_processor::GrabProcessor;
pub use registry::PacketRegistry;
