//! Errors returned when constructing or combining collections.

use std::{cmp, mem};
use thiserror::Error;

/// Error raised when a collection is constructed with invalid parameters or when two collections
/// cannot be combined.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum Error {
    /// A size parameter that must be positive was zero.
    #[error("`{name}` must be greater than zero")]
    Zero {
        /// Name of the offending parameter.
        name: &'static str,
    },
    /// A probability-like parameter was outside of the open interval (0, 1).
    #[error("`{name}` must be in (0, 1), got {value}")]
    OutOfUnitInterval {
        /// Name of the offending parameter.
        name: &'static str,
        /// The rejected value.
        value: f64,
    },
    /// The number of register index bits of a `HyperLogLog` was out of range.
    #[error("precision must be in [{min}, {max}], got {precision}")]
    PrecisionOutOfRange {
        /// The rejected precision.
        precision: i64,
        /// Smallest supported precision.
        min: usize,
        /// Largest supported precision.
        max: usize,
    },
    /// A size parameter or a size derived from an error bound is too large to allocate.
    #[error("`{name}` is too large")]
    TooLarge {
        /// Name of the offending parameter.
        name: &'static str,
    },
    /// Two collections differ in shape or hashing and cannot be combined.
    #[error("incompatible collections: {reason}")]
    Incompatible {
        /// What differed between the two collections.
        reason: &'static str,
    },
}

/// Convenient alias for results with [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

pub(crate) fn check_positive(name: &'static str, value: usize) -> Result<()> {
    if value == 0 {
        return Err(Error::Zero { name });
    }
    Ok(())
}

pub(crate) fn check_unit_interval(name: &'static str, value: f64) -> Result<()> {
    // Written so that NaN is rejected.
    if !(value > 0.0 && value < 1.0) {
        return Err(Error::OutOfUnitInterval { name, value });
    }
    Ok(())
}

// Float to integer casts saturate, so anything that does not fit is rejected before the cast.
pub(crate) fn checked_size(name: &'static str, value: f64) -> Result<usize> {
    if !value.is_finite() || value < 0.0 || value >= usize::MAX as f64 {
        return Err(Error::TooLarge { name });
    }
    Ok(value as usize)
}

// No allocation of `V`s may exceed `isize::MAX` bytes.
pub(crate) fn check_capacity<V>(name: &'static str, len: usize) -> Result<()> {
    if len > isize::MAX as usize / cmp::max(mem::size_of::<V>(), 1) {
        return Err(Error::TooLarge { name });
    }
    Ok(())
}
