//! Integer-unit ("points") allocator
//!
//! Splits whole-unit totals. Every share respects the configured
//! [`ShareLimits`], and the remainder left behind by a share is always
//! itself splittable across the remaining recipients.
//!
//! # Random Mode
//!
//! A candidate is drawn from `[lower, upper]` and accepted only if the
//! remaining total can still be handed out within limits
//! ([`ShareLimits::can_absorb`]). A rejected candidate moves
//! one side of the interval past itself:
//!
//! - too little left for the others: `upper` drops below the candidate
//! - too much left for the others: `lower` rises above the candidate
//!
//! The interval strictly shrinks on every rejection, so the loop ends after
//! at most `upper - lower + 1` draws. If it empties, no legal share exists
//! and the call fails with `IntervalCollapse`.

use super::limits::ShareLimits;
use super::traits::Allocator;
use crate::types::{SplitError, SplitMode};
use rand::Rng;

/// Allocator for integer-unit packets
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct IntegerAllocator {
    limits: ShareLimits,
}

impl IntegerAllocator {
    pub fn new(limits: ShareLimits) -> Self {
        Self { limits }
    }

    pub fn limits(&self) -> &ShareLimits {
        &self.limits
    }

    /// Compute the next share of `amount` for one of `count` recipients
    ///
    /// # Errors
    ///
    /// - `InvalidDistribution` if `(amount, count)` fails the validity
    ///   predicate, including `count == 0`
    /// - `IntervalCollapse` if no random share leaves a legal remainder
    /// - `ArithmeticOverflow` if the random upper bound overflows
    pub fn split<R: Rng + ?Sized>(
        &self,
        amount: u64,
        count: u32,
        mode: SplitMode,
        rng: &mut R,
    ) -> Result<u64, SplitError> {
        if !self.limits.is_valid(amount, count) {
            return Err(SplitError::invalid_distribution(amount, count));
        }

        match mode {
            SplitMode::Fair => Ok(Self::fair_share(amount, count)),
            SplitMode::Random => {
                let upper = self.limits.upper_bound(amount, count)?;
                self.random_share(amount, count, self.limits.min_share(), upper, rng)
            }
        }
    }

    /// Floored average; the last recipient takes the remainder as well
    fn fair_share(amount: u64, count: u32) -> u64 {
        let count = u64::from(count);
        let share = amount / count;
        if count == 1 {
            share + amount % count
        } else {
            share
        }
    }

    fn random_share<R: Rng + ?Sized>(
        &self,
        amount: u64,
        count: u32,
        mut lower: u64,
        mut upper: u64,
        rng: &mut R,
    ) -> Result<u64, SplitError> {
        if count == 1 {
            return Ok(amount);
        }

        let rest = count - 1;

        loop {
            let ceiling = upper.min(amount);
            if lower > ceiling {
                return Err(SplitError::interval_collapse(lower, upper, amount, count));
            }

            if lower == upper {
                return if self.limits.can_absorb(amount - lower, rest) {
                    Ok(lower)
                } else {
                    Err(SplitError::interval_collapse(lower, upper, amount, count))
                };
            }

            let candidate = draw_candidate(lower, ceiling, rng).max(lower);
            let balance = amount - candidate;
            if self.limits.can_absorb(balance, rest) {
                return Ok(candidate);
            }

            let width = upper - lower;
            if balance / u64::from(rest) < self.limits.min_share() {
                // candidate >= lower >= min_share >= 1
                upper = candidate - 1;
            } else {
                lower = candidate + 1;
            }
            debug_assert!(lower > upper || upper - lower < width);
        }
    }
}

/// Draw a candidate in `[1, ceiling]`
///
/// `round(r * (ceiling - lower) + lower) mod ceiling + 1`, with `r` uniform
/// in `[0, 1)`. Values that wrap past `ceiling` land on 1; the caller clamps
/// them back into its interval.
fn draw_candidate<R: Rng + ?Sized>(lower: u64, ceiling: u64, rng: &mut R) -> u64 {
    let r: f64 = rng.random();
    let spread = (ceiling - lower) as f64;
    let raw = (r * spread + lower as f64).round_ties_even() as u64;
    raw % ceiling + 1
}

impl Allocator for IntegerAllocator {
    type Amount = u64;

    fn allocate<R: Rng + ?Sized>(
        &self,
        remaining: u64,
        recipients: u32,
        mode: SplitMode,
        rng: &mut R,
    ) -> Result<u64, SplitError> {
        self.split(remaining, recipients, mode, rng)
    }

    fn deduct(&self, remaining: u64, share: u64) -> Result<u64, SplitError> {
        remaining
            .checked_sub(share)
            .ok_or_else(|| SplitError::arithmetic_overflow("points deduction"))
    }
}
