use crate::bit_vec::BitVec;
use crate::error::{
    check_capacity, check_positive, check_unit_interval, checked_size, Error, Result,
};
use crate::util::{DoubleHasher, SipHasherBuilder};
use std::borrow::Borrow;
use std::f64::consts::LN_2;
use std::hash::{BuildHasher, Hash};

/// A space-efficient probabilistic data structure to test for membership in a set.
///
/// At its core, a bloom filter is a bit array, initially all set to zero. `K` hash functions
/// map each element to `K` bits in the bit array. An element definitely does not exist in the
/// bloom filter if any of the `K` bits are unset. An element is possibly in the set if all of the
/// `K` bits are set. This implementation hashes each element once and uses double hashing to
/// simulate the `K` hash functions.
///
/// # Examples
///
/// ```
/// use probabilistic_sketches::bloom::BloomFilter;
///
/// let mut filter = BloomFilter::<String>::optimally_sized(10, 0.01)?;
///
/// assert!(!filter.contains("foo"));
/// filter.insert("foo");
/// assert!(filter.contains("foo"));
///
/// filter.clear();
/// assert!(!filter.contains("foo"));
///
/// assert_eq!(filter.len(), 96);
/// assert_eq!(filter.hasher_count(), 7);
/// # Ok::<(), probabilistic_sketches::Error>(())
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct BloomFilter<T, B = SipHasherBuilder> {
    bit_vec: BitVec,
    hasher: DoubleHasher<T, B>,
    hasher_count: usize,
}

impl<T> BloomFilter<T> {
    /// Constructs a new, empty `BloomFilter` with `bit_count` bits and `hasher_count` hash
    /// functions, seeded from entropy.
    ///
    /// # Errors
    ///
    /// Returns an error if `bit_count` or `hasher_count` is zero.
    ///
    /// # Examples
    ///
    /// ```
    /// use probabilistic_sketches::bloom::BloomFilter;
    ///
    /// let filter = BloomFilter::<String>::new(100, 4)?;
    /// assert_eq!(filter.len(), 100);
    /// # Ok::<(), probabilistic_sketches::Error>(())
    /// ```
    pub fn new(bit_count: usize, hasher_count: usize) -> Result<Self> {
        Self::with_hasher(bit_count, hasher_count, SipHasherBuilder::from_entropy())
    }

    /// Constructs a new, empty `BloomFilter` sized for `item_count` items at a false positive
    /// probability of `fpp`, seeded from entropy.
    ///
    /// # Errors
    ///
    /// Returns an error if `item_count` is zero or `fpp` is not in (0, 1).
    ///
    /// # Examples
    ///
    /// ```
    /// use probabilistic_sketches::bloom::BloomFilter;
    ///
    /// let filter = BloomFilter::<String>::optimally_sized(10, 0.01)?;
    /// # Ok::<(), probabilistic_sketches::Error>(())
    /// ```
    pub fn optimally_sized(item_count: usize, fpp: f64) -> Result<Self> {
        Self::optimally_sized_with_hasher(item_count, fpp, SipHasherBuilder::from_entropy())
    }
}

impl<T, B> BloomFilter<T, B>
where
    B: BuildHasher,
{
    /// Returns the number of bits and the number of hash functions that minimize the false
    /// positive probability for `item_count` items at a target of `fpp`.
    ///
    /// The bit count is `ceil(-n ln(p) / ln(2)^2)` and the hash function count is
    /// `round(m / n * ln(2))`, never less than one.
    ///
    /// # Errors
    ///
    /// Returns an error if `item_count` is zero, `fpp` is not in (0, 1), or the bit count does not
    /// fit in a `usize`.
    ///
    /// # Examples
    ///
    /// ```
    /// use probabilistic_sketches::bloom::BloomFilter;
    ///
    /// assert_eq!(BloomFilter::<String>::optimal_size(10, 0.01)?, (96, 7));
    /// assert_eq!(BloomFilter::<String>::optimal_size(1000, 0.001)?, (14378, 10));
    /// # Ok::<(), probabilistic_sketches::Error>(())
    /// ```
    pub fn optimal_size(item_count: usize, fpp: f64) -> Result<(usize, usize)> {
        check_positive("item_count", item_count)?;
        check_unit_interval("fpp", fpp)?;
        let item_count = item_count as f64;
        let bit_count = (-item_count * fpp.ln() / (LN_2 * LN_2)).ceil();
        let hasher_count = (bit_count / item_count * LN_2).round().max(1.0);
        Ok((
            checked_size("bit_count", bit_count)?,
            checked_size("hasher_count", hasher_count)?,
        ))
    }

    /// Constructs a new, empty `BloomFilter` with `bit_count` bits, `hasher_count` hash functions
    /// and a hasher builder for double hashing (`hash_builder`).
    ///
    /// # Errors
    ///
    /// Returns an error if `bit_count` or `hasher_count` is zero, or if `bit_count` is too large to
    /// allocate.
    ///
    /// # Examples
    ///
    /// ```
    /// use probabilistic_sketches::bloom::BloomFilter;
    /// use probabilistic_sketches::SipHasherBuilder;
    ///
    /// let filter = BloomFilter::<String>::with_hasher(100, 4, SipHasherBuilder::from_seed(0, 0))?;
    /// assert_eq!(filter.hasher_count(), 4);
    /// # Ok::<(), probabilistic_sketches::Error>(())
    /// ```
    pub fn with_hasher(bit_count: usize, hasher_count: usize, hash_builder: B) -> Result<Self> {
        check_positive("bit_count", bit_count)?;
        check_positive("hasher_count", hasher_count)?;
        check_capacity::<u64>("bit_count", BitVec::block_count(bit_count))?;
        tracing::debug!(bit_count, hasher_count, "constructed bloom filter");
        Ok(BloomFilter {
            bit_vec: BitVec::new(bit_count),
            hasher: DoubleHasher::new(hash_builder),
            hasher_count,
        })
    }

    /// Constructs a new, empty `BloomFilter` sized for `item_count` items at a false positive
    /// probability of `fpp`, with a hasher builder for double hashing (`hash_builder`).
    ///
    /// # Errors
    ///
    /// Returns an error if `item_count` is zero, `fpp` is not in (0, 1), or the resulting filter is
    /// too large to allocate.
    ///
    /// # Examples
    ///
    /// ```
    /// use probabilistic_sketches::bloom::BloomFilter;
    /// use probabilistic_sketches::SipHasherBuilder;
    ///
    /// let filter = BloomFilter::<String>::optimally_sized_with_hasher(
    ///     10,
    ///     0.01,
    ///     SipHasherBuilder::from_seed(0, 0),
    /// )?;
    /// assert_eq!(filter.len(), 96);
    /// # Ok::<(), probabilistic_sketches::Error>(())
    /// ```
    pub fn optimally_sized_with_hasher(
        item_count: usize,
        fpp: f64,
        hash_builder: B,
    ) -> Result<Self> {
        let (bit_count, hasher_count) = Self::optimal_size(item_count, fpp)?;
        Self::with_hasher(bit_count, hasher_count, hash_builder)
    }

    /// Inserts an element into the bloom filter.
    ///
    /// # Examples
    ///
    /// ```
    /// use probabilistic_sketches::bloom::BloomFilter;
    ///
    /// let mut filter = BloomFilter::<String>::optimally_sized(10, 0.01)?;
    ///
    /// filter.insert("foo");
    /// # Ok::<(), probabilistic_sketches::Error>(())
    /// ```
    pub fn insert<U>(&mut self, item: &U)
    where
        T: Borrow<U>,
        U: Hash + ?Sized,
    {
        let bit_count = self.bit_vec.len();
        for index in self.hasher.hash(item).indices(self.hasher_count, bit_count) {
            self.bit_vec.set(index, true);
        }
    }

    /// Checks if an element is possibly in the bloom filter.
    ///
    /// # Examples
    ///
    /// ```
    /// use probabilistic_sketches::bloom::BloomFilter;
    ///
    /// let mut filter = BloomFilter::<String>::optimally_sized(10, 0.01)?;
    ///
    /// assert!(!filter.contains("foo"));
    /// filter.insert("foo");
    /// assert!(filter.contains("foo"));
    /// # Ok::<(), probabilistic_sketches::Error>(())
    /// ```
    pub fn contains<U>(&self, item: &U) -> bool
    where
        T: Borrow<U>,
        U: Hash + ?Sized,
    {
        self.hasher
            .hash(item)
            .indices(self.hasher_count, self.bit_vec.len())
            .all(|index| self.bit_vec[index])
    }

    /// Returns the number of bits in the bloom filter.
    pub fn len(&self) -> usize {
        self.bit_vec.len()
    }

    /// Returns `true` if no bit of the bloom filter is set.
    ///
    /// # Examples
    ///
    /// ```
    /// use probabilistic_sketches::bloom::BloomFilter;
    ///
    /// let mut filter = BloomFilter::<String>::new(100, 3)?;
    /// assert!(filter.is_empty());
    ///
    /// filter.insert("foo");
    /// assert!(!filter.is_empty());
    /// # Ok::<(), probabilistic_sketches::Error>(())
    /// ```
    pub fn is_empty(&self) -> bool {
        self.bit_vec.count_ones() == 0
    }

    /// Returns the number of hash functions used by the bloom filter.
    pub fn hasher_count(&self) -> usize {
        self.hasher_count
    }

    /// Clears the bloom filter, removing all elements.
    pub fn clear(&mut self) {
        tracing::trace!(bit_count = self.bit_vec.len(), "cleared bloom filter");
        self.bit_vec.clear()
    }

    /// Returns the number of set bits in the bloom filter.
    pub fn count_ones(&self) -> usize {
        self.bit_vec.count_ones()
    }

    /// Returns the number of unset bits in the bloom filter.
    pub fn count_zeros(&self) -> usize {
        self.bit_vec.count_zeros()
    }

    /// Returns the estimated false positive probability of the bloom filter. This value will
    /// increase as more items are added.
    ///
    /// # Examples
    ///
    /// ```
    /// use probabilistic_sketches::bloom::BloomFilter;
    ///
    /// let mut filter = BloomFilter::<String>::optimally_sized(100, 0.01)?;
    /// assert!(filter.estimated_fpp() < std::f64::EPSILON);
    ///
    /// filter.insert("foo");
    /// assert!(filter.estimated_fpp() > 0.0);
    /// assert!(filter.estimated_fpp() < 0.01);
    /// # Ok::<(), probabilistic_sketches::Error>(())
    /// ```
    pub fn estimated_fpp(&self) -> f64 {
        let single_fpp = self.bit_vec.count_ones() as f64 / self.bit_vec.len() as f64;
        single_fpp.powf(self.hasher_count as f64)
    }

    /// Returns a reference to the bloom filter's hasher builder.
    pub fn hasher(&self) -> &B {
        self.hasher.hasher()
    }
}

impl<T, B> BloomFilter<T, B>
where
    B: BuildHasher + PartialEq,
{
    /// Adds every element of `other` to `self`.
    ///
    /// # Errors
    ///
    /// Returns an error if the two filters differ in bit count, hash function count or hasher.
    ///
    /// # Examples
    ///
    /// ```
    /// use probabilistic_sketches::bloom::BloomFilter;
    /// use probabilistic_sketches::SipHasherBuilder;
    ///
    /// let hash_builder = SipHasherBuilder::from_seed(0, 0);
    /// let mut filter1 = BloomFilter::<String>::with_hasher(100, 3, hash_builder)?;
    /// let mut filter2 = BloomFilter::<String>::with_hasher(100, 3, hash_builder)?;
    /// filter1.insert("foo");
    /// filter2.insert("bar");
    ///
    /// filter1.union(&filter2)?;
    /// assert!(filter1.contains("foo"));
    /// assert!(filter1.contains("bar"));
    /// # Ok::<(), probabilistic_sketches::Error>(())
    /// ```
    pub fn union(&mut self, other: &Self) -> Result<()> {
        if self.bit_vec.len() != other.bit_vec.len() || self.hasher_count != other.hasher_count {
            return Err(Error::Incompatible {
                reason: "bloom filters have different dimensions",
            });
        }
        if self.hasher() != other.hasher() {
            return Err(Error::Incompatible {
                reason: "bloom filters use different hashers",
            });
        }
        tracing::trace!(bit_count = self.bit_vec.len(), "merged bloom filters");
        self.bit_vec.union(&other.bit_vec);
        Ok(())
    }
}
