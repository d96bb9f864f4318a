//! Share limits and split configuration
//!
//! `ShareLimits` holds the bounds every integer share must respect and
//! implements the validity predicate shared by the precondition gate and
//! the random draw's bound repair. `SplitConfig` bundles the limits with the
//! optional seed used when packets are opened.

use crate::types::{PacketId, SplitError};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

/// Smallest share a recipient can receive, in points
pub const DEFAULT_MIN_SHARE: u64 = 1;

/// System-wide ceiling on a single share, in points
pub const DEFAULT_MAX_SHARE: u64 = 200 * 100;

/// Random-mode cap on a share, as a multiple of the remaining average (2.1)
pub const DEFAULT_MULTIPLIER: Decimal = Decimal::from_parts(21, 0, 0, false, 1);

/// Bounds applied to integer shares
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShareLimits {
    min_share: u64,
    max_share: u64,
    multiplier: Decimal,
}

impl Default for ShareLimits {
    fn default() -> Self {
        Self {
            min_share: DEFAULT_MIN_SHARE,
            max_share: DEFAULT_MAX_SHARE,
            multiplier: DEFAULT_MULTIPLIER,
        }
    }
}

impl ShareLimits {
    /// Create limits with custom bounds
    ///
    /// # Errors
    ///
    /// Returns `InvalidLimits` if `min_share` is zero, `min_share` exceeds
    /// `max_share`, or the multiplier is below 1.
    pub fn new(min_share: u64, max_share: u64, multiplier: Decimal) -> Result<Self, SplitError> {
        if min_share == 0 {
            return Err(SplitError::invalid_limits("minimum share must be at least 1"));
        }
        if min_share > max_share {
            return Err(SplitError::invalid_limits(
                "minimum share must not exceed maximum share",
            ));
        }
        if multiplier < Decimal::ONE {
            return Err(SplitError::invalid_limits("multiplier must be at least 1"));
        }

        Ok(Self {
            min_share,
            max_share,
            multiplier,
        })
    }

    pub fn min_share(&self) -> u64 {
        self.min_share
    }

    pub fn max_share(&self) -> u64 {
        self.max_share
    }

    pub fn multiplier(&self) -> Decimal {
        self.multiplier
    }

    /// Whether `point` can be split across `count` recipients
    ///
    /// True when `count` is non-zero and the floored average lies within
    /// `[min_share, max_share]`.
    pub fn is_valid(&self, point: u64, count: u32) -> bool {
        if count == 0 {
            return false;
        }
        let average = point / u64::from(count);
        (self.min_share..=self.max_share).contains(&average)
    }

    /// Whether `balance` can still be handed out to `count` recipients
    ///
    /// Stricter than [`is_valid`](Self::is_valid) at the top end: it also
    /// requires `balance <= count * max_share`, so that no later share is
    /// forced above the ceiling. Used to accept random candidates.
    pub fn can_absorb(&self, balance: u64, count: u32) -> bool {
        self.is_valid(balance, count)
            && balance <= self.max_share.saturating_mul(u64::from(count))
    }

    /// Upper bound for a random share of `amount` across `count` recipients
    ///
    /// `min(max_share, floor(amount * multiplier / count))`, computed in
    /// exact decimal arithmetic.
    ///
    /// # Errors
    ///
    /// Returns `InvalidDistribution` for `count == 0` and `ArithmeticOverflow`
    /// if the scaled amount cannot be represented.
    pub fn upper_bound(&self, amount: u64, count: u32) -> Result<u64, SplitError> {
        if count == 0 {
            return Err(SplitError::invalid_distribution(amount, count));
        }

        let scaled = Decimal::from(amount)
            .checked_mul(self.multiplier)
            .and_then(|scaled| scaled.checked_div(Decimal::from(count)))
            .ok_or_else(|| SplitError::arithmetic_overflow("random share upper bound"))?;

        // Anything past u64 is above the ceiling anyway
        let bound = scaled.floor().to_u64().unwrap_or(u64::MAX);

        Ok(bound.min(self.max_share))
    }
}

/// Configuration applied when opening packets
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SplitConfig {
    /// Limits for points packets
    pub limits: ShareLimits,

    /// Base seed for deterministic random sources
    ///
    /// `None` seeds every packet from the operating system.
    pub seed: Option<u64>,
}

impl SplitConfig {
    pub fn new(limits: ShareLimits, seed: Option<u64>) -> Self {
        Self { limits, seed }
    }

    /// Random source for a packet
    ///
    /// With a base seed each packet gets its own reproducible stream, so the
    /// shares of a packet do not depend on which other packets were opened.
    pub fn rng_for(&self, packet: PacketId) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(u64::from(packet))),
            None => StdRng::from_os_rng(),
        }
    }
}
