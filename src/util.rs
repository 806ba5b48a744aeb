use rand::Rng;
use siphasher::sip::SipHasher;
use std::borrow::Borrow;
use std::hash::{BuildHasher, Hash, Hasher};
use std::marker::PhantomData;
use std::{cmp, fmt};

/// The default hash builder for all collections.
#[derive(Clone, Copy)]
pub struct SipHasherBuilder {
    k0: u64,
    k1: u64,
    hasher: SipHasher,
}

impl SipHasherBuilder {
    /// Constructs a new `SipHasherBuilder` that uses the thread-local RNG to seed itself.
    ///
    /// # Examples
    ///
    /// ```
    /// use probabilistic_sketches::SipHasherBuilder;
    ///
    /// let hash_builder = SipHasherBuilder::from_entropy();
    /// ```
    pub fn from_entropy() -> Self {
        let mut rng = rand::thread_rng();
        Self::from_seed(rng.gen(), rng.gen())
    }

    /// Constructs a new `SipHasherBuilder` that is seeded with the given keys.
    ///
    /// # Examples
    ///
    /// ```
    /// use probabilistic_sketches::SipHasherBuilder;
    ///
    /// let hash_builder = SipHasherBuilder::from_seed(0, 0);
    /// assert_eq!(hash_builder, SipHasherBuilder::from_seed(0, 0));
    /// ```
    pub fn from_seed(k0: u64, k1: u64) -> Self {
        SipHasherBuilder {
            k0,
            k1,
            hasher: SipHasher::new_with_keys(k0, k1),
        }
    }

    /// Returns the two keys the builder was seeded with.
    pub fn keys(&self) -> (u64, u64) {
        (self.k0, self.k1)
    }
}

impl fmt::Debug for SipHasherBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SipHasherBuilder")
            .field("k0", &self.k0)
            .field("k1", &self.k1)
            .finish()
    }
}

impl cmp::PartialEq for SipHasherBuilder {
    fn eq(&self, other: &SipHasherBuilder) -> bool {
        self.k0 == other.k0 && self.k1 == other.k1
    }
}

impl cmp::Eq for SipHasherBuilder {}

impl BuildHasher for SipHasherBuilder {
    type Hasher = SipHasher;

    #[inline]
    fn build_hasher(&self) -> SipHasher {
        self.hasher
    }
}

/// Hashes `item` once with `hash_builder` and derives a second, independent-looking hash from
/// the first so that any number of indices can be produced from a single hash computation.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct DoubleHasher<T, B = SipHasherBuilder> {
    hash_builder: B,
    _marker: PhantomData<T>,
}

impl<T, B> DoubleHasher<T, B>
where
    B: BuildHasher,
{
    pub fn new(hash_builder: B) -> Self {
        DoubleHasher {
            hash_builder,
            _marker: PhantomData,
        }
    }

    pub fn hash<U>(&self, item: &U) -> HashPair
    where
        T: Borrow<U>,
        U: Hash + ?Sized,
    {
        let hash1 = hash(&self.hash_builder, item);
        HashPair {
            hash1,
            // Odd so that the stride between rounds is never zero.
            hash2: mix64(hash1) | 1,
        }
    }

    pub fn hasher(&self) -> &B {
        &self.hash_builder
    }
}

pub(crate) fn hash<U>(hash_builder: &impl BuildHasher, item: &U) -> u64
where
    U: Hash + ?Sized,
{
    let mut hasher = hash_builder.build_hasher();
    item.hash(&mut hasher);
    hasher.finish()
}

/// The 64-bit finalizer of MurmurHash3.
#[inline]
pub(crate) fn mix64(mut x: u64) -> u64 {
    x ^= x >> 33;
    x = x.wrapping_mul(0xff51_afd7_ed55_8ccd);
    x ^= x >> 33;
    x = x.wrapping_mul(0xc4ce_b9fe_1a85_ec53);
    x ^= x >> 33;
    x
}

/// Returns the index in `[0, modulus)` used by round `round` of double hashing, computed as
/// `(hash1 + round * hash2) mod modulus`.
///
/// # Panics
///
/// Panics if `modulus` is zero.
///
/// # Examples
///
/// ```
/// use probabilistic_sketches::double_hash_index;
///
/// assert_eq!(double_hash_index(10, 3, 0, 7), 3);
/// assert_eq!(double_hash_index(10, 3, 2, 7), 2);
/// ```
#[inline]
pub fn double_hash_index(hash1: u64, hash2: u64, round: u64, modulus: usize) -> usize {
    let combined = hash1.wrapping_add(round.wrapping_mul(hash2));
    (combined % modulus as u64) as usize
}

/// The pair of base hashes of an item.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct HashPair {
    hash1: u64,
    hash2: u64,
}

impl HashPair {
    /// Yields exactly `rounds` indices in `[0, modulus)`.
    pub fn indices(self, rounds: usize, modulus: usize) -> IndexIter {
        IndexIter {
            pair: self,
            round: 0,
            rounds,
            modulus,
        }
    }
}

#[derive(Clone)]
pub(crate) struct IndexIter {
    pair: HashPair,
    round: usize,
    rounds: usize,
    modulus: usize,
}

impl Iterator for IndexIter {
    type Item = usize;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        if self.round == self.rounds {
            return None;
        }
        let index = double_hash_index(
            self.pair.hash1,
            self.pair.hash2,
            self.round as u64,
            self.modulus,
        );
        self.round += 1;
        Some(index)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.rounds - self.round;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for IndexIter {}
