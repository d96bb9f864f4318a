//! Concurrent registry of open packets
//!
//! `PacketRegistry` keeps every open packet behind an `Arc` in a `DashMap`,
//! keyed by packet id. Tasks look a packet up and grab from it without
//! holding any registry lock; each packet serializes its own grabs.

use crate::core::limits::SplitConfig;
use crate::core::packet::Packet;
use crate::types::{PacketId, PacketSpec, SplitError};
use dashmap::DashMap;
use std::sync::Arc;

/// Thread-safe store of open packets
///
/// Operations on different packets never block each other. Opening two
/// packets with the same id is rejected, so a packet's shares are only ever
/// handed out by one session.
#[derive(Debug, Default)]
pub struct PacketRegistry {
    /// Open packets by id
    packets: DashMap<PacketId, Arc<Packet>>,

    /// Limits and seed used for every packet opened here
    config: SplitConfig,
}

impl PacketRegistry {
    pub fn new(config: SplitConfig) -> Self {
        Self {
            packets: DashMap::new(),
            config,
        }
    }

    pub fn config(&self) -> &SplitConfig {
        &self.config
    }

    /// Open a packet and register it under its id
    ///
    /// # Errors
    ///
    /// - `DuplicatePacket` if a packet with the same id is already open
    /// - `InvalidAmount` if the packet's total cannot be opened
    ///
    /// # Thread Safety
    ///
    /// If two callers race to open the same id, exactly one succeeds.
    pub fn open(&self, spec: &PacketSpec) -> Result<Arc<Packet>, SplitError> {
        let packet = Arc::new(Packet::open(spec, &self.config)?);

        let registered = self
            .packets
            .entry(spec.id)
            .or_insert_with(|| Arc::clone(&packet))
            .clone();

        if Arc::ptr_eq(&registered, &packet) {
            Ok(packet)
        } else {
            Err(SplitError::duplicate_packet(spec.id))
        }
    }

    pub fn get(&self, id: PacketId) -> Option<Arc<Packet>> {
        self.packets.get(&id).map(|entry| Arc::clone(&entry))
    }

    /// Unregister a packet, returning it if it was open
    ///
    /// Tasks still holding the packet can keep grabbing from it.
    pub fn remove(&self, id: PacketId) -> Option<Arc<Packet>> {
        self.packets.remove(&id).map(|(_, packet)| packet)
    }

    pub fn len(&self) -> usize {
        self.packets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packets.is_empty()
    }
}
