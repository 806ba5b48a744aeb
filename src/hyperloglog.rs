//! Space-efficient probabilistic data structure for estimating the number of distinct items in a
//! multiset.

use crate::bit_array_vec::BitArrayVec;
use crate::error::{check_unit_interval, Error, Result};
use crate::util::{self, SipHasherBuilder};
use rand::{RngCore, SeedableRng};
use rand_xorshift::XorShiftRng;
use std::borrow::Borrow;
use std::hash::{BuildHasher, Hash};
use std::marker::PhantomData;

/// Smallest supported number of register index bits.
pub const MIN_PRECISION: usize = 4;
/// Largest supported number of register index bits.
pub const MAX_PRECISION: usize = 18;

// Ranks never exceed 64 - MIN_PRECISION + 1 = 61, which fits in six bits.
const REGISTER_BIT_COUNT: usize = 6;

// Constant relating the register count to the relative standard deviation of the estimate.
const RSD_FACTOR: f64 = 1.106;

/// A space-efficient probabilitic data structure to count the number of distinct items in a
/// multiset.
///
/// A `HyperLogLog<T>` uses the observation that the cardinality of a multiset of uniformly
/// distributed items can be estimated by calculating the maximum number of leading zeros in the
/// hash of each item in the multiset. It buckets each item into one of `2^p` registers using the
/// top `p` bits of its hash and takes the harmonic mean of the registers to reduce the variance.
/// Linear counting is used for small cardinalities. Registers are packed six bits each.
///
/// # Examples
///
/// ```
/// use probabilistic_sketches::hyperloglog::HyperLogLog;
///
/// let mut hhl = HyperLogLog::<u32>::from_rsd(0.01)?;
///
/// assert!(hhl.is_empty());
///
/// for key in &[0u32, 1, 2, 0, 1, 2] {
///     hhl.insert(key);
/// }
///
/// assert_eq!(hhl.cardinality(), 3);
/// # Ok::<(), probabilistic_sketches::Error>(())
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct HyperLogLog<T, B = SipHasherBuilder> {
    alpha: f64,
    p: usize,
    registers: BitArrayVec,
    hash_builder: B,
    _marker: PhantomData<T>,
}

impl<T> HyperLogLog<T> {
    // Every `HyperLogLog` built without an explicit hasher uses the same keys so that they can
    // be merged.
    fn default_hasher() -> SipHasherBuilder {
        let mut rng = XorShiftRng::seed_from_u64(0);
        SipHasherBuilder::from_seed(rng.next_u64(), rng.next_u64())
    }

    /// Constructs a new, empty `HyperLogLog<T>` with `2^precision` registers.
    ///
    /// # Errors
    ///
    /// Returns an error if `precision` is not in `[MIN_PRECISION, MAX_PRECISION]`.
    ///
    /// # Examples
    ///
    /// ```
    /// use probabilistic_sketches::hyperloglog::HyperLogLog;
    ///
    /// let hhl = HyperLogLog::<u32>::new(14)?;
    /// assert_eq!(hhl.register_count(), 16384);
    /// # Ok::<(), probabilistic_sketches::Error>(())
    /// ```
    pub fn new(precision: usize) -> Result<Self> {
        Self::with_hasher(precision, Self::default_hasher())
    }

    /// Constructs a new, empty `HyperLogLog<T>` whose estimates have a relative standard
    /// deviation of about `rsd`.
    ///
    /// # Errors
    ///
    /// Returns an error if `rsd` is not in (0, 1) or requires a precision outside of
    /// `[MIN_PRECISION, MAX_PRECISION]`.
    ///
    /// # Examples
    ///
    /// ```
    /// use probabilistic_sketches::hyperloglog::HyperLogLog;
    ///
    /// let hhl = HyperLogLog::<u32>::from_rsd(0.01)?;
    /// assert_eq!(hhl.precision(), 14);
    /// # Ok::<(), probabilistic_sketches::Error>(())
    /// ```
    pub fn from_rsd(rsd: f64) -> Result<Self> {
        Self::from_rsd_with_hasher(rsd, Self::default_hasher())
    }
}

impl<T, B> HyperLogLog<T, B>
where
    B: BuildHasher,
{
    fn get_alpha(p: usize) -> f64 {
        match p {
            4 => 0.673,
            5 => 0.697,
            6 => 0.709,
            p => 0.7213 / (1.0 + 1.079 / (1u64 << p) as f64),
        }
    }

    /// Returns the precision whose estimates have a relative standard deviation of about `rsd`:
    /// `round(log2((1.106 / rsd)^2))`.
    ///
    /// # Errors
    ///
    /// Returns an error if `rsd` is not in (0, 1) or requires a precision outside of
    /// `[MIN_PRECISION, MAX_PRECISION]`.
    ///
    /// # Examples
    ///
    /// ```
    /// use probabilistic_sketches::hyperloglog::HyperLogLog;
    ///
    /// assert_eq!(HyperLogLog::<u32>::precision_for_rsd(0.01)?, 14);
    /// assert_eq!(HyperLogLog::<u32>::precision_for_rsd(0.05)?, 9);
    /// assert!(HyperLogLog::<u32>::precision_for_rsd(0.5).is_err());
    /// # Ok::<(), probabilistic_sketches::Error>(())
    /// ```
    pub fn precision_for_rsd(rsd: f64) -> Result<usize> {
        check_unit_interval("rsd", rsd)?;
        let precision = (RSD_FACTOR / rsd).powi(2).log2().round() as i64;
        check_precision(precision)?;
        Ok(precision as usize)
    }

    /// Constructs a new, empty `HyperLogLog<T>` with `2^precision` registers and a hasher
    /// builder (`hash_builder`).
    ///
    /// # Errors
    ///
    /// Returns an error if `precision` is not in `[MIN_PRECISION, MAX_PRECISION]`.
    ///
    /// # Examples
    ///
    /// ```
    /// use probabilistic_sketches::hyperloglog::HyperLogLog;
    /// use probabilistic_sketches::SipHasherBuilder;
    ///
    /// let hhl = HyperLogLog::<u32>::with_hasher(10, SipHasherBuilder::from_seed(0, 0))?;
    /// assert_eq!(hhl.register_count(), 1024);
    /// # Ok::<(), probabilistic_sketches::Error>(())
    /// ```
    pub fn with_hasher(precision: usize, hash_builder: B) -> Result<Self> {
        check_precision(precision as i64)?;
        let registers_len: usize = 1 << precision;
        tracing::debug!(precision, registers_len, "constructed hyperloglog");
        Ok(HyperLogLog {
            alpha: Self::get_alpha(precision),
            p: precision,
            registers: BitArrayVec::new(REGISTER_BIT_COUNT, registers_len),
            hash_builder,
            _marker: PhantomData,
        })
    }

    /// Constructs a new, empty `HyperLogLog<T>` whose estimates have a relative standard
    /// deviation of about `rsd`, with a hasher builder (`hash_builder`).
    ///
    /// # Errors
    ///
    /// Returns an error if `rsd` is not in (0, 1) or requires a precision outside of
    /// `[MIN_PRECISION, MAX_PRECISION]`.
    pub fn from_rsd_with_hasher(rsd: f64, hash_builder: B) -> Result<Self> {
        let precision = Self::precision_for_rsd(rsd)?;
        Self::with_hasher(precision, hash_builder)
    }

    /// Inserts an item into the `HyperLogLog<T>`.
    ///
    /// # Examples
    ///
    /// ```
    /// use probabilistic_sketches::hyperloglog::HyperLogLog;
    ///
    /// let mut hhl = HyperLogLog::<u32>::new(10)?;
    ///
    /// hhl.insert(&0);
    /// assert_eq!(hhl.cardinality(), 1);
    /// # Ok::<(), probabilistic_sketches::Error>(())
    /// ```
    pub fn insert<U>(&mut self, item: &U)
    where
        T: Borrow<U>,
        U: Hash + ?Sized,
    {
        let hash = util::hash(&self.hash_builder, item);
        let (register_index, rank) = split_hash(hash, self.p);
        self.registers.update_max(register_index, rank);
    }

    fn get_estimate(&self) -> f64 {
        let len = self.registers.len() as f64;
        let sum = self
            .registers
            .iter()
            .map(|value| 1.0 / (1u64 << value) as f64)
            .sum::<f64>();
        self.alpha * len * len / sum
    }

    /// Returns the estimated number of distinct items in the `HyperLogLog<T>`.
    ///
    /// # Examples
    ///
    /// ```
    /// use probabilistic_sketches::hyperloglog::HyperLogLog;
    ///
    /// let mut hhl = HyperLogLog::<u32>::new(10)?;
    /// assert_eq!(hhl.cardinality(), 0);
    ///
    /// hhl.insert(&1);
    /// assert_eq!(hhl.cardinality(), 1);
    /// # Ok::<(), probabilistic_sketches::Error>(())
    /// ```
    pub fn cardinality(&self) -> u64 {
        let len = self.registers.len() as f64;
        let zeros = self.registers.count_zeros();
        let estimate = self.get_estimate();
        if estimate <= 2.5 * len && zeros > 0 {
            (len * (len / zeros as f64).ln()).round() as u64
        } else {
            estimate.round() as u64
        }
    }

    /// Returns `true` if no item was inserted into the `HyperLogLog<T>`.
    pub fn is_empty(&self) -> bool {
        self.registers.count_zeros() == self.registers.len()
    }

    /// Clears the `HyperLogLog<T>`, removing all items.
    ///
    /// # Examples
    ///
    /// ```
    /// use probabilistic_sketches::hyperloglog::HyperLogLog;
    ///
    /// let mut hhl = HyperLogLog::<u32>::new(10)?;
    /// hhl.insert(&1);
    /// assert!(!hhl.is_empty());
    ///
    /// hhl.clear();
    /// assert!(hhl.is_empty());
    /// # Ok::<(), probabilistic_sketches::Error>(())
    /// ```
    pub fn clear(&mut self) {
        tracing::trace!(precision = self.p, "cleared hyperloglog");
        self.registers.clear();
    }

    /// Returns the number of register index bits.
    pub fn precision(&self) -> usize {
        self.p
    }

    /// Returns the number of registers, `2^precision`.
    pub fn register_count(&self) -> usize {
        self.registers.len()
    }

    /// Returns the expected relative standard deviation of the estimates, `1.106 / sqrt(m)`.
    pub fn relative_standard_deviation(&self) -> f64 {
        RSD_FACTOR / (self.registers.len() as f64).sqrt()
    }

    /// Returns a reference to the `HyperLogLog<T>`'s hasher builder.
    pub fn hasher(&self) -> &B {
        &self.hash_builder
    }
}

impl<T, B> HyperLogLog<T, B>
where
    B: BuildHasher + PartialEq,
{
    /// Merges `other` into `self` so that `self` estimates the number of distinct items inserted
    /// into either.
    ///
    /// # Errors
    ///
    /// Returns an error if the two estimators differ in precision or hasher.
    ///
    /// # Examples
    ///
    /// ```
    /// use probabilistic_sketches::hyperloglog::HyperLogLog;
    ///
    /// let mut hhl1 = HyperLogLog::<u32>::new(10)?;
    /// hhl1.insert(&0);
    /// hhl1.insert(&1);
    ///
    /// let mut hhl2 = HyperLogLog::<u32>::new(10)?;
    /// hhl2.insert(&0);
    /// hhl2.insert(&2);
    ///
    /// hhl1.merge(&hhl2)?;
    ///
    /// assert_eq!(hhl1.cardinality(), 3);
    /// # Ok::<(), probabilistic_sketches::Error>(())
    /// ```
    pub fn merge(&mut self, other: &Self) -> Result<()> {
        if self.p != other.p {
            return Err(Error::Incompatible {
                reason: "hyperloglogs have different precisions",
            });
        }
        if self.hash_builder != other.hash_builder {
            return Err(Error::Incompatible {
                reason: "hyperloglogs use different hashers",
            });
        }
        tracing::trace!(precision = self.p, "merged hyperloglogs");
        self.registers.extend(other.registers.iter().enumerate());
        Ok(())
    }
}

fn check_precision(precision: i64) -> Result<()> {
    if precision < MIN_PRECISION as i64 || precision > MAX_PRECISION as i64 {
        return Err(Error::PrecisionOutOfRange {
            precision,
            min: MIN_PRECISION,
            max: MAX_PRECISION,
        });
    }
    Ok(())
}

/// Splits `hash` into the register index given by its top `p` bits and the rank of the
/// remaining `64 - p` bits: the number of leading zeros plus one.
fn split_hash(hash: u64, p: usize) -> (usize, u8) {
    let register_index = (hash >> (64 - p)) as usize;
    let rest = hash << p;
    let rank = if rest == 0 {
        64 - p + 1
    } else {
        rest.leading_zeros() as usize + 1
    };
    (register_index, rank as u8)
}
