//! Red packet sessions
//!
//! A session owns one packet's running state (remaining total, remaining
//! recipients and random source) behind a mutex. Each grab computes the
//! next share and commits the updated state while holding the lock, so
//! concurrent grabbers can never spend the same remainder twice.
//!
//! # Failure
//!
//! The first split error halts the session: every later grab returns the
//! same error without touching the state. A packet that simply ran out of
//! recipients reports `PacketExhausted`.

use super::fractional::{to_cents, FractionalAllocator};
use super::integer::IntegerAllocator;
use super::limits::SplitConfig;
use super::traits::Allocator;
use crate::types::{PacketId, PacketSpec, PacketUnit, ShareRecord, SplitError, SplitMode};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::fmt;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// One share handed out by a session
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Grab<T> {
    /// 1-based position in the packet's grab order
    pub recipient: u32,
    /// Share amount
    pub share: T,
}

struct PacketState<T, R> {
    remaining: T,
    recipients: u32,
    issued: u32,
    halted: Option<SplitError>,
    rng: R,
}

/// Single-writer session over one red packet
pub struct RedPacket<A: Allocator, R = StdRng> {
    allocator: A,
    mode: SplitMode,
    state: Mutex<PacketState<A::Amount, R>>,
}

impl<A: Allocator> RedPacket<A, StdRng> {
    /// Open a session whose random source is seeded from the operating system
    pub fn new(allocator: A, total: A::Amount, count: u32, mode: SplitMode) -> Self {
        Self::with_rng(allocator, total, count, mode, StdRng::from_os_rng())
    }
}

impl<A: Allocator, R: Rng> RedPacket<A, R> {
    /// Open a session with an explicit random source
    pub fn with_rng(allocator: A, total: A::Amount, count: u32, mode: SplitMode, rng: R) -> Self {
        Self {
            allocator,
            mode,
            state: Mutex::new(PacketState {
                remaining: total,
                recipients: count,
                issued: 0,
                halted: None,
                rng,
            }),
        }
    }

    pub fn mode(&self) -> SplitMode {
        self.mode
    }

    /// Hand out the next share
    ///
    /// Computing the share and committing the new remaining state happen
    /// under one lock acquisition.
    ///
    /// # Errors
    ///
    /// - `PacketExhausted` once every recipient has been paid
    /// - the allocator's error if no legal share exists; the session stays
    ///   halted on that error afterwards
    pub fn grab(&self) -> Result<Grab<A::Amount>, SplitError> {
        let mut guard = self.lock_state();
        let state = &mut *guard;

        if let Some(error) = &state.halted {
            return Err(error.clone());
        }
        if state.recipients == 0 {
            return Err(SplitError::packet_exhausted(None));
        }

        let outcome = self
            .allocator
            .allocate(state.remaining, state.recipients, self.mode, &mut state.rng)
            .and_then(|share| {
                self.allocator
                    .deduct(state.remaining, share)
                    .map(|left| (share, left))
            });

        match outcome {
            Ok((share, left)) => {
                state.remaining = left;
                state.recipients -= 1;
                state.issued += 1;
                Ok(Grab {
                    recipient: state.issued,
                    share,
                })
            }
            Err(error) => {
                state.halted = Some(error.clone());
                Err(error)
            }
        }
    }

    /// Snapshot of the remaining total and recipients
    pub fn remaining(&self) -> (A::Amount, u32) {
        let state = self.lock_state();
        (state.remaining, state.recipients)
    }

    pub fn is_exhausted(&self) -> bool {
        self.lock_state().recipients == 0
    }

    // State is only written after a share is fully computed, so a poisoned
    // lock still guards a consistent state.
    fn lock_state(&self) -> MutexGuard<'_, PacketState<A::Amount, R>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<A: Allocator + fmt::Debug, R: Rng> fmt::Debug for RedPacket<A, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (remaining, recipients) = self.remaining();
        f.debug_struct("RedPacket")
            .field("allocator", &self.allocator)
            .field("mode", &self.mode)
            .field("remaining", &remaining)
            .field("recipients", &recipients)
            .finish()
    }
}

#[derive(Debug)]
enum Session {
    Points(RedPacket<IntegerAllocator>),
    Cash(RedPacket<FractionalAllocator>),
}

/// Everything drawn from one packet before it stopped
#[derive(Debug, Clone, PartialEq)]
pub struct PacketOutcome {
    pub packet: PacketId,
    /// Shares in recipient order
    pub shares: Vec<ShareRecord>,
    /// The split error that stopped the packet early, if any
    pub error: Option<SplitError>,
}

/// An open red packet of either unit
///
/// Wraps a points or cash session and reports shares as [`ShareRecord`]s.
#[derive(Debug)]
pub struct Packet {
    id: PacketId,
    unit: PacketUnit,
    session: Session,
}

impl Packet {
    /// Open a packet from its definition
    ///
    /// Points totals must be whole and non-negative; cash totals must be
    /// non-negative and are rounded half-up to cents. A packet needs at
    /// least one recipient.
    pub fn open(spec: &PacketSpec, config: &SplitConfig) -> Result<Self, SplitError> {
        if spec.total < Decimal::ZERO {
            return Err(SplitError::invalid_amount(spec.total, "must not be negative"));
        }
        if spec.count == 0 {
            return Err(SplitError::invalid_distribution(spec.total, 0));
        }

        let rng = config.rng_for(spec.id);
        let session = match spec.unit {
            PacketUnit::Points => Session::Points(RedPacket::with_rng(
                IntegerAllocator::new(config.limits),
                whole_points(spec.total)?,
                spec.count,
                spec.mode,
                rng,
            )),
            PacketUnit::Cash => Session::Cash(RedPacket::with_rng(
                FractionalAllocator::new(),
                to_cents(spec.total),
                spec.count,
                spec.mode,
                rng,
            )),
        };

        Ok(Self {
            id: spec.id,
            unit: spec.unit,
            session,
        })
    }

    pub fn id(&self) -> PacketId {
        self.id
    }

    pub fn unit(&self) -> PacketUnit {
        self.unit
    }

    pub fn mode(&self) -> SplitMode {
        match &self.session {
            Session::Points(packet) => packet.mode(),
            Session::Cash(packet) => packet.mode(),
        }
    }

    /// Hand out the next share of this packet
    pub fn grab(&self) -> Result<ShareRecord, SplitError> {
        let grab = match &self.session {
            Session::Points(packet) => packet.grab().map(into_decimal),
            Session::Cash(packet) => packet.grab(),
        };

        match grab {
            Ok(grab) => Ok(ShareRecord {
                packet: self.id,
                recipient: grab.recipient,
                share: grab.share,
            }),
            Err(SplitError::PacketExhausted { .. }) => {
                Err(SplitError::packet_exhausted(Some(self.id)))
            }
            Err(error) => Err(error),
        }
    }

    pub fn remaining_recipients(&self) -> u32 {
        match &self.session {
            Session::Points(packet) => packet.remaining().1,
            Session::Cash(packet) => packet.remaining().1,
        }
    }

    pub fn is_exhausted(&self) -> bool {
        self.remaining_recipients() == 0
    }

    /// Grab until the packet is exhausted or a split error stops it
    pub fn drain(&self) -> PacketOutcome {
        let mut shares = Vec::with_capacity(self.remaining_recipients() as usize);
        loop {
            match self.grab() {
                Ok(share) => shares.push(share),
                Err(error) if error.is_exhausted() => {
                    return PacketOutcome {
                        packet: self.id,
                        shares,
                        error: None,
                    }
                }
                Err(error) => {
                    return PacketOutcome {
                        packet: self.id,
                        shares,
                        error: Some(error),
                    }
                }
            }
        }
    }
}

fn into_decimal(grab: Grab<u64>) -> Grab<Decimal> {
    Grab {
        recipient: grab.recipient,
        share: grab.share.into(),
    }
}

fn whole_points(total: Decimal) -> Result<u64, SplitError> {
    if !total.fract().is_zero() {
        return Err(SplitError::invalid_amount(total, "points must be whole"));
    }
    total
        .to_u64()
        .ok_or_else(|| SplitError::invalid_amount(total, "exceeds the points range"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::limits::ShareLimits;
    use rstest::rstest;
    use rust_decimal_macros::dec;
    use std::collections::HashMap;
    use std::sync::Arc;
    use std::thread;

    fn spec(id: PacketId, unit: PacketUnit, total: Decimal, count: u32, mode: SplitMode) -> PacketSpec {
        PacketSpec {
            id,
            unit,
            total,
            count,
            mode,
        }
    }

    fn seeded(seed: u64) -> SplitConfig {
        SplitConfig::new(ShareLimits::default(), Some(seed))
    }

    #[test]
    fn test_points_fair_session_hands_out_in_order() {
        let packet = RedPacket::with_rng(
            IntegerAllocator::default(),
            11,
            5,
            SplitMode::Fair,
            StdRng::seed_from_u64(0),
        );

        let grabs: Vec<Grab<u64>> = (0..5).map(|_| packet.grab().unwrap()).collect();

        assert_eq!(
            grabs.iter().map(|g| g.share).collect::<Vec<_>>(),
            vec![2, 2, 2, 2, 3]
        );
        assert_eq!(
            grabs.iter().map(|g| g.recipient).collect::<Vec<_>>(),
            vec![1, 2, 3, 4, 5]
        );
        assert_eq!(packet.remaining(), (0, 0));
        assert!(packet.is_exhausted());
        assert_eq!(packet.grab(), Err(SplitError::packet_exhausted(None)));
    }

    #[test]
    fn test_os_seeded_session_keeps_sum() {
        let packet = RedPacket::new(FractionalAllocator::new(), dec!(88.88), 8, SplitMode::Random);

        let total: Decimal = (0..8).map(|_| packet.grab().unwrap().share).sum();

        assert_eq!(total, dec!(88.88));
        assert!(packet.is_exhausted());
    }

    #[test]
    fn test_split_error_halts_session() {
        let packet = RedPacket::with_rng(
            IntegerAllocator::default(),
            3,
            5,
            SplitMode::Random,
            StdRng::seed_from_u64(0),
        );

        let first = packet.grab();
        let second = packet.grab();

        assert_eq!(first, Err(SplitError::invalid_distribution(3u64, 5)));
        assert_eq!(second, first);
        assert_eq!(packet.remaining(), (3, 5));
    }

    #[test]
    fn test_concurrent_grabs_never_double_spend() {
        let packet = Arc::new(RedPacket::with_rng(
            IntegerAllocator::default(),
            10_000,
            1_000,
            SplitMode::Random,
            StdRng::seed_from_u64(17),
        ));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let packet = Arc::clone(&packet);
                thread::spawn(move || {
                    let mut grabs = Vec::new();
                    while let Ok(grab) = packet.grab() {
                        grabs.push(grab);
                    }
                    grabs
                })
            })
            .collect();

        let mut grabs: Vec<Grab<u64>> = handles
            .into_iter()
            .flat_map(|handle| handle.join().unwrap())
            .collect();
        grabs.sort_by_key(|grab| grab.recipient);

        assert_eq!(grabs.len(), 1_000);
        assert_eq!(grabs.iter().map(|g| g.share).sum::<u64>(), 10_000);
        assert!(grabs.iter().enumerate().all(|(i, g)| g.recipient == i as u32 + 1));
    }

    #[test]
    fn test_concurrent_grabs_match_sequential_run_with_same_seed() {
        let sequential = RedPacket::with_rng(
            IntegerAllocator::default(),
            5_000,
            200,
            SplitMode::Random,
            StdRng::seed_from_u64(5),
        );
        let expected: Vec<u64> = (0..200).map(|_| sequential.grab().unwrap().share).collect();

        let shared = Arc::new(RedPacket::with_rng(
            IntegerAllocator::default(),
            5_000,
            200,
            SplitMode::Random,
            StdRng::seed_from_u64(5),
        ));
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let packet = Arc::clone(&shared);
                thread::spawn(move || {
                    let mut grabs = Vec::new();
                    while let Ok(grab) = packet.grab() {
                        grabs.push(grab);
                    }
                    grabs
                })
            })
            .collect();

        let by_recipient: HashMap<u32, u64> = handles
            .into_iter()
            .flat_map(|handle| handle.join().unwrap())
            .map(|grab| (grab.recipient, grab.share))
            .collect();

        for (index, share) in expected.iter().enumerate() {
            assert_eq!(by_recipient[&(index as u32 + 1)], *share);
        }
    }

    #[test]
    fn test_open_points_packet_drains_to_total() {
        let packet = Packet::open(
            &spec(1, PacketUnit::Points, dec!(100), 10, SplitMode::Random),
            &seeded(1),
        )
        .unwrap();

        let outcome = packet.drain();

        assert_eq!(outcome.packet, 1);
        assert_eq!(outcome.error, None);
        assert_eq!(outcome.shares.len(), 10);
        assert_eq!(outcome.shares.iter().map(|s| s.share).sum::<Decimal>(), dec!(100));
        assert!(packet.is_exhausted());
        assert_eq!(packet.grab(), Err(SplitError::packet_exhausted(Some(1))));
    }

    #[test]
    fn test_open_cash_packet_rounds_total_to_cents() {
        let packet = Packet::open(
            &spec(2, PacketUnit::Cash, dec!(10.005), 3, SplitMode::Fair),
            &seeded(1),
        )
        .unwrap();

        let outcome = packet.drain();
        let shares: Vec<Decimal> = outcome.shares.iter().map(|s| s.share).collect();

        // 10.005 rounds to 10.01
        assert_eq!(shares, vec![dec!(3.33), dec!(3.34), dec!(3.34)]);
        assert_eq!(packet.unit(), PacketUnit::Cash);
        assert_eq!(packet.mode(), SplitMode::Fair);
    }

    #[test]
    fn test_drain_reports_split_error() {
        let packet = Packet::open(
            &spec(3, PacketUnit::Points, dec!(0), 5, SplitMode::Fair),
            &seeded(1),
        )
        .unwrap();

        let outcome = packet.drain();

        assert!(outcome.shares.is_empty());
        assert!(matches!(
            outcome.error,
            Some(SplitError::InvalidDistribution { recipients: 5, .. })
        ));
        assert_eq!(packet.remaining_recipients(), 5);
    }

    #[rstest]
    #[case::fractional_points(PacketUnit::Points, dec!(10.5), "points must be whole")]
    #[case::negative_points(PacketUnit::Points, dec!(-10), "must not be negative")]
    #[case::negative_cash(PacketUnit::Cash, dec!(-0.01), "must not be negative")]
    fn test_open_rejects_bad_totals(
        #[case] unit: PacketUnit,
        #[case] total: Decimal,
        #[case] expected: &str,
    ) {
        let result = Packet::open(&spec(4, unit, total, 2, SplitMode::Fair), &seeded(1));

        let error = result.unwrap_err();
        assert!(matches!(error, SplitError::InvalidAmount { .. }));
        assert!(error.to_string().contains(expected));
    }

    #[test]
    fn test_open_rejects_zero_recipients() {
        let result = Packet::open(&spec(5, PacketUnit::Cash, dec!(5.00), 0, SplitMode::Fair), &seeded(1));

        assert!(matches!(
            result,
            Err(SplitError::InvalidDistribution { recipients: 0, .. })
        ));
    }

    #[test]
    fn test_same_seed_reproduces_packet() {
        let definition = spec(9, PacketUnit::Cash, dec!(50.00), 6, SplitMode::Random);

        let first = Packet::open(&definition, &seeded(123)).unwrap().drain();
        let second = Packet::open(&definition, &seeded(123)).unwrap().drain();

        assert_eq!(first, second);
    }
}
