//! Core trait for share allocation
//!
//! This module defines the abstraction shared by the integer and fractional
//! allocators so that packet sessions can drive either one.

use crate::types::{SplitError, SplitMode};
use rand::Rng;
use rust_decimal::Decimal;
use std::fmt::{Debug, Display};

/// Trait for computing the next share of a red packet
///
/// Allocators hold no per-packet state. The caller passes the remaining
/// total and recipient count on every call and must commit the returned
/// share before asking for the next one.
pub trait Allocator: Send + Sync {
    /// Numeric type of totals and shares
    type Amount: Copy + PartialOrd + Debug + Display + Into<Decimal> + Send + Sync + 'static;

    /// Compute the next share of `remaining` for one of `recipients`
    fn allocate<R: Rng + ?Sized>(
        &self,
        remaining: Self::Amount,
        recipients: u32,
        mode: SplitMode,
        rng: &mut R,
    ) -> Result<Self::Amount, SplitError>;

    /// Subtract a share from the remaining total
    fn deduct(
        &self,
        remaining: Self::Amount,
        share: Self::Amount,
    ) -> Result<Self::Amount, SplitError>;
}
