//! Concurrent grabbing for async packet processing
//!
//! `GrabProcessor` drains packets with several tokio tasks racing to grab
//! from the same packet. The packet session serializes the grabs, so the
//! racing tasks only decide who receives each share, never its amount:
//! recipient `k` gets the same share it would get in a sequential run with
//! the same random source.
//!
//! # Architecture
//!
//! ```text
//! drain_all
//!     └── one task per packet ── drain
//!                                   └── `grabbers` tasks ── Packet::grab loop
//! ```

use crate::core::packet::{Packet, PacketOutcome};
use crate::types::{ShareRecord, SplitError};
use futures::future::join_all;
use std::sync::Arc;
use tracing::{debug, warn};

/// Default number of concurrent grabbers per packet
pub const DEFAULT_GRABBERS: usize = 4;

/// Drains packets with concurrent grabbers
#[derive(Debug, Clone, Copy)]
pub struct GrabProcessor {
    grabbers: usize,
}

impl Default for GrabProcessor {
    fn default() -> Self {
        Self {
            grabbers: DEFAULT_GRABBERS,
        }
    }
}

impl GrabProcessor {
    /// Create a processor running `grabbers` tasks per packet
    ///
    /// Zero is raised to one grabber.
    pub fn new(grabbers: usize) -> Self {
        Self {
            grabbers: grabbers.max(1),
        }
    }

    pub fn grabbers(&self) -> usize {
        self.grabbers
    }

    /// Drain one packet with concurrent grabbers
    ///
    /// Spawns the grabber tasks on the current runtime and waits for all of
    /// them. Shares are returned sorted by recipient number. If a split
    /// error stops the packet early, the shares issued before it are kept
    /// and the error is reported in the outcome.
    pub async fn drain(&self, packet: Arc<Packet>) -> PacketOutcome {
        let tasks: Vec<_> = (0..self.grabbers)
            .map(|_| {
                let packet = Arc::clone(&packet);
                tokio::spawn(async move { grab_until_stopped(&packet).await })
            })
            .collect();

        let mut shares = Vec::new();
        let mut error = None;
        for result in join_all(tasks).await {
            match result {
                Ok((grabbed, stopped)) => {
                    shares.extend(grabbed);
                    if error.is_none() {
                        error = stopped;
                    }
                }
                Err(e) => {
                    warn!(packet = packet.id(), error = %e, "Grabber task panicked");
                }
            }
        }

        shares.sort_by_key(|share| share.recipient);
        debug!(packet = packet.id(), shares = shares.len(), "Packet drained");

        PacketOutcome {
            packet: packet.id(),
            shares,
            error,
        }
    }

    /// Drain several packets concurrently
    ///
    /// Outcomes are returned in the order of `packets`.
    pub async fn drain_all(&self, packets: Vec<Arc<Packet>>) -> Vec<PacketOutcome> {
        let processor = *self;
        let tasks: Vec<_> = packets
            .into_iter()
            .map(|packet| tokio::spawn(async move { processor.drain(packet).await }))
            .collect();

        let mut outcomes = Vec::with_capacity(tasks.len());
        for result in join_all(tasks).await {
            match result {
                Ok(outcome) => outcomes.push(outcome),
                Err(e) => {
                    warn!(error = %e, "Packet task panicked");
                }
            }
        }
        outcomes
    }
}

/// Grab until the packet is exhausted or halted by a split error
async fn grab_until_stopped(packet: &Packet) -> (Vec<ShareRecord>, Option<SplitError>) {
    let mut shares = Vec::new();
    loop {
        match packet.grab() {
            Ok(share) => shares.push(share),
            Err(error) if error.is_exhausted() => return (shares, None),
            Err(error) => return (shares, Some(error)),
        }
        // Let the other grabbers in between shares
        tokio::task::yield_now().await;
    }
}
