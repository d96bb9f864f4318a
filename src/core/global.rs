//! Process-wide split entry points
//!
//! `split_integer` and `split_fractional` are stateless from the caller's
//! point of view: the caller passes the remaining total and recipient count
//! and commits the returned share itself. Every call runs under one global
//! mutex that also owns the shared random source.
//!
//! A caller that must keep "compute share, then update my own state" atomic
//! with respect to other callers holds an [`AllocationGuard`] from [`lock`]
//! for the whole sequence.

use super::fractional::FractionalAllocator;
use super::integer::IntegerAllocator;
use crate::types::{SplitError, SplitMode};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rust_decimal::Decimal;
use std::sync::{LazyLock, Mutex, MutexGuard, PoisonError};

struct SharedAllocator {
    integer: IntegerAllocator,
    fractional: FractionalAllocator,
    rng: StdRng,
}

static SHARED: LazyLock<Mutex<SharedAllocator>> = LazyLock::new(|| {
    Mutex::new(SharedAllocator {
        integer: IntegerAllocator::default(),
        fractional: FractionalAllocator::new(),
        rng: StdRng::from_os_rng(),
    })
});

/// Exclusive access to the global allocator
pub struct AllocationGuard {
    shared: MutexGuard<'static, SharedAllocator>,
}

impl AllocationGuard {
    /// Next integer share of `total` for one of `count` recipients
    pub fn split_integer(&mut self, total: u64, count: u32, fair: bool) -> Result<u64, SplitError> {
        let shared = &mut *self.shared;
        shared
            .integer
            .split(total, count, SplitMode::from_fair(fair), &mut shared.rng)
    }

    /// Next two-decimal share of `total` for one of `count` recipients
    pub fn split_fractional(
        &mut self,
        total: Decimal,
        count: u32,
        fair: bool,
    ) -> Result<Decimal, SplitError> {
        let shared = &mut *self.shared;
        shared
            .fractional
            .split(total, count, SplitMode::from_fair(fair), &mut shared.rng)
    }

    /// Replace the shared random source with a seeded one
    pub fn reseed(&mut self, seed: u64) {
        self.shared.rng = StdRng::seed_from_u64(seed);
    }
}

/// Acquire the global allocator
///
/// Blocks until no other caller holds it. A poisoned lock is recovered: the
/// allocator state is only the random source, which stays usable.
pub fn lock() -> AllocationGuard {
    AllocationGuard {
        shared: SHARED.lock().unwrap_or_else(PoisonError::into_inner),
    }
}

/// Next integer share, serialized with every other global split
///
/// Uses the default [`ShareLimits`](super::limits::ShareLimits).
pub fn split_integer(total: u64, count: u32, fair: bool) -> Result<u64, SplitError> {
    lock().split_integer(total, count, fair)
}

/// Next two-decimal share, serialized with every other global split
pub fn split_fractional(total: Decimal, count: u32, fair: bool) -> Result<Decimal, SplitError> {
    lock().split_fractional(total, count, fair)
}
