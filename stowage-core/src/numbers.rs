//! Numeric conversion helpers centralizing safe numeric casts.

use num_traits::cast::cast;

use crate::constants::CAPACITY_EPSILON;

/// Convert a count to f64 while allowing precision loss in a single location.
#[must_use]
pub fn count_to_f64(value: usize) -> f64 {
    cast::<usize, f64>(value).unwrap_or(0.0)
}

/// Convert a u32 quantity to f64.
#[must_use]
pub fn u32_to_f64(value: u32) -> f64 {
    f64::from(value)
}

/// Number of groups of `per_group` needed to hold `total`, rounding up.
///
/// A zero group size is treated as one so callers never divide by zero.
#[must_use]
pub const fn groups_needed(total: u32, per_group: u32) -> u32 {
    let per_group = if per_group == 0 { 1 } else { per_group };
    total.div_ceil(per_group)
}

/// Replace non-finite capacity values with zero.
#[must_use]
pub fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() { value } else { 0.0 }
}

/// Compare two capacity amounts with the shared tolerance.
#[must_use]
pub fn capacity_eq(left: f64, right: f64) -> bool {
    (left - right).abs() <= CAPACITY_EPSILON
}

/// True when a remaining amount should be read as free space.
#[must_use]
pub fn is_positive_capacity(value: f64) -> bool {
    value > CAPACITY_EPSILON
}
