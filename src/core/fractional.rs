//! Fractional ("cash") allocator
//!
//! Splits currency totals with two decimal places. All arithmetic runs on
//! `Decimal`, so no cent is lost or gained between the shares of a packet.
//!
//! Random mode resamples independently on every call: it generates one
//! candidate per remaining recipient and keeps one of them. Unlike the
//! integer path it does not look ahead at what the remainder can still
//! support; the last recipient absorbs whatever is left.

use super::traits::Allocator;
use crate::types::{SplitError, SplitMode};
use rand::Rng;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

/// Number of decimal places in a cash amount
pub const CASH_SCALE: u32 = 2;

/// Allocator for two-decimal currency packets
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FractionalAllocator;

impl FractionalAllocator {
    pub fn new() -> Self {
        Self
    }

    /// Compute the next share of `amount` for one of `count` recipients
    ///
    /// `amount` is normalized to two places (half-up) before splitting, and
    /// every returned share carries exactly two decimal places.
    ///
    /// # Errors
    ///
    /// - `InvalidAmount` if `amount` is negative
    /// - `InvalidDistribution` if `count == 0`
    pub fn split<R: Rng + ?Sized>(
        &self,
        amount: Decimal,
        count: u32,
        mode: SplitMode,
        rng: &mut R,
    ) -> Result<Decimal, SplitError> {
        if amount < Decimal::ZERO {
            return Err(SplitError::invalid_amount(amount, "must not be negative"));
        }
        if count == 0 {
            return Err(SplitError::invalid_distribution(amount, count));
        }

        let amount = to_cents(amount);
        match mode {
            SplitMode::Fair => Ok(Self::fair_share(amount, count)),
            SplitMode::Random => Self::random_share(amount, count, rng),
        }
    }

    /// Equal share, or everything when this is the closing draw
    ///
    /// The draw closes when one recipient is left or when the amount is
    /// below twice the equal share.
    fn fair_share(amount: Decimal, count: u32) -> Decimal {
        if count == 1 {
            return amount;
        }

        let mut share = (amount / Decimal::from(count))
            .round_dp_with_strategy(CASH_SCALE, RoundingStrategy::ToNegativeInfinity);
        share.rescale(CASH_SCALE);

        // Unreachable for count >= 2 while the share is floored; mirrors the
        // closing rule of the fair points split.
        if amount < share * Decimal::TWO {
            amount
        } else {
            share
        }
    }

    /// One of `count` independent candidates in `[0, 2 * amount / count)`
    fn random_share<R: Rng + ?Sized>(
        amount: Decimal,
        count: u32,
        rng: &mut R,
    ) -> Result<Decimal, SplitError> {
        if count == 1 {
            return Ok(amount);
        }

        let cap = amount / Decimal::from(count) * Decimal::TWO;

        // The kept index does not depend on candidate values, so pick it
        // first and let the other candidates fall away as they are drawn.
        let keep = rng.random_range(0..count);
        let mut kept = Decimal::ZERO;
        for index in 0..count {
            let candidate = draw_candidate(cap, rng)?;
            if index == keep {
                kept = candidate;
            }
        }

        Ok(kept)
    }
}

fn draw_candidate<R: Rng + ?Sized>(cap: Decimal, rng: &mut R) -> Result<Decimal, SplitError> {
    let r: f64 = rng.random();
    let r = Decimal::from_f64(r)
        .ok_or_else(|| SplitError::arithmetic_overflow("random cash fraction"))?;
    let scaled = r
        .checked_mul(cap)
        .ok_or_else(|| SplitError::arithmetic_overflow("random cash share"))?;
    Ok(to_cents(scaled))
}

/// Round half-up to two decimal places and pin the scale at two
pub fn to_cents(amount: Decimal) -> Decimal {
    let mut cents =
        amount.round_dp_with_strategy(CASH_SCALE, RoundingStrategy::MidpointAwayFromZero);
    cents.rescale(CASH_SCALE);
    cents
}

impl Allocator for FractionalAllocator {
    type Amount = Decimal;

    fn allocate<R: Rng + ?Sized>(
        &self,
        remaining: Decimal,
        recipients: u32,
        mode: SplitMode,
        rng: &mut R,
    ) -> Result<Decimal, SplitError> {
        self.split(remaining, recipients, mode, rng)
    }

    fn deduct(&self, remaining: Decimal, share: Decimal) -> Result<Decimal, SplitError> {
        remaining
            .checked_sub(share)
            .map(to_cents)
            .ok_or_else(|| SplitError::arithmetic_overflow("cash deduction"))
    }
}
