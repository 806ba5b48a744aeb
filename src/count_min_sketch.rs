//! Space-efficient probabilistic data structure for estimating the number of item occurrences.

use crate::error::{
    check_capacity, check_positive, check_unit_interval, checked_size, Error, Result,
};
use crate::util::{DoubleHasher, SipHasherBuilder};
use std::borrow::Borrow;
use std::f64::consts::E;
use std::hash::{BuildHasher, Hash};

/// A space-efficient probabilistic data structure that serves as a frequency table of events in a
/// stream of data.
///
/// `CountMinSketch` hashes every item to one column in each row of a grid of counters and takes
/// the minimum counter as the estimate. It uses sublinear space at the expense of overestimating
/// items due to collisions, but it never underestimates. With a width of `ceil(e / epsilon)` and
/// a depth of `ceil(ln(1 / delta))`, an estimate exceeds the true count by more than
/// `epsilon * total()` with probability at most `delta`.
///
/// # Examples
///
/// ```
/// use probabilistic_sketches::count_min_sketch::CountMinSketch;
///
/// let mut count_min_sketch = CountMinSketch::<String>::new(28, 3)?;
///
/// count_min_sketch.insert("foo", 3);
/// count_min_sketch.insert("bar", 5);
/// assert!(count_min_sketch.estimate("foo") >= 3);
/// assert!(count_min_sketch.estimate("bar") >= 5);
/// assert_eq!(count_min_sketch.total(), 8);
///
/// count_min_sketch.clear();
/// assert_eq!(count_min_sketch.estimate("foo"), 0);
/// assert_eq!(count_min_sketch.estimate("bar"), 0);
///
/// assert_eq!(count_min_sketch.width(), 28);
/// assert_eq!(count_min_sketch.depth(), 3);
/// assert!(count_min_sketch.epsilon() <= 0.1);
/// assert!(count_min_sketch.delta() <= 0.05);
/// # Ok::<(), probabilistic_sketches::Error>(())
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct CountMinSketch<T, B = SipHasherBuilder> {
    // A 2D grid represented as a row-major 1D vector.
    width: usize,
    depth: usize,
    total: u64,
    grid: Vec<u64>,
    hasher: DoubleHasher<T, B>,
}

impl<T> CountMinSketch<T> {
    /// Constructs a new, empty `CountMinSketch` with `width` columns and `depth` rows, seeded
    /// from entropy.
    ///
    /// # Errors
    ///
    /// Returns an error if `width` or `depth` is zero.
    ///
    /// # Examples
    ///
    /// ```
    /// use probabilistic_sketches::count_min_sketch::CountMinSketch;
    ///
    /// let count_min_sketch = CountMinSketch::<String>::new(28, 3)?;
    ///
    /// assert_eq!(count_min_sketch.width(), 28);
    /// assert_eq!(count_min_sketch.depth(), 3);
    /// # Ok::<(), probabilistic_sketches::Error>(())
    /// ```
    pub fn new(width: usize, depth: usize) -> Result<Self> {
        Self::with_hasher(width, depth, SipHasherBuilder::from_entropy())
    }

    /// Constructs a new, empty `CountMinSketch` with an upper bound on the relative error
    /// (`epsilon`) and on the probability of exceeding it (`delta`), seeded from entropy.
    ///
    /// # Errors
    ///
    /// Returns an error if `epsilon` or `delta` is not in (0, 1), or if the resulting grid is too
    /// large to allocate.
    ///
    /// # Examples
    ///
    /// ```
    /// use probabilistic_sketches::count_min_sketch::CountMinSketch;
    ///
    /// let count_min_sketch = CountMinSketch::<String>::from_error(0.1, 0.05)?;
    ///
    /// assert!(count_min_sketch.epsilon() <= 0.1);
    /// assert!(count_min_sketch.delta() <= 0.05);
    /// # Ok::<(), probabilistic_sketches::Error>(())
    /// ```
    pub fn from_error(epsilon: f64, delta: f64) -> Result<Self> {
        Self::from_error_with_hasher(epsilon, delta, SipHasherBuilder::from_entropy())
    }
}

impl<T, B> CountMinSketch<T, B>
where
    B: BuildHasher,
{
    /// Returns the width and depth that bound the error of the estimates by `epsilon` times the
    /// total count with probability at least `1 - delta`.
    ///
    /// The width is `ceil(e / epsilon)` and the depth is `ceil(ln(1 / delta))`.
    ///
    /// # Errors
    ///
    /// Returns an error if `epsilon` or `delta` is not in (0, 1), or if a dimension does not fit
    /// in a `usize`.
    ///
    /// # Examples
    ///
    /// ```
    /// use probabilistic_sketches::count_min_sketch::CountMinSketch;
    ///
    /// assert_eq!(CountMinSketch::<String>::optimal_dims(0.1, 0.05)?, (28, 3));
    /// # Ok::<(), probabilistic_sketches::Error>(())
    /// ```
    pub fn optimal_dims(epsilon: f64, delta: f64) -> Result<(usize, usize)> {
        check_unit_interval("epsilon", epsilon)?;
        check_unit_interval("delta", delta)?;
        let width = checked_size("width", (E / epsilon).ceil())?;
        // Depth is ceil(ln(1 / delta)) rather than ceil(-ln(1 - delta) / ln(2)). The latter is 1
        // for every small delta, which cannot give the 1 - delta guarantee.
        let depth = checked_size("depth", (1.0 / delta).ln().ceil().max(1.0))?;
        Ok((width, depth))
    }

    /// Constructs a new, empty `CountMinSketch` with `width` columns, `depth` rows, and a hasher
    /// builder for double hashing (`hash_builder`).
    ///
    /// # Errors
    ///
    /// Returns an error if `width` or `depth` is zero, or if the grid is too large to allocate.
    ///
    /// # Examples
    ///
    /// ```
    /// use probabilistic_sketches::count_min_sketch::CountMinSketch;
    /// use probabilistic_sketches::SipHasherBuilder;
    ///
    /// let count_min_sketch =
    ///     CountMinSketch::<String>::with_hasher(28, 3, SipHasherBuilder::from_seed(0, 0))?;
    ///
    /// assert_eq!(count_min_sketch.width(), 28);
    /// assert_eq!(count_min_sketch.depth(), 3);
    /// # Ok::<(), probabilistic_sketches::Error>(())
    /// ```
    pub fn with_hasher(width: usize, depth: usize, hash_builder: B) -> Result<Self> {
        check_positive("width", width)?;
        check_positive("depth", depth)?;
        let cell_count = width
            .checked_mul(depth)
            .ok_or(Error::TooLarge { name: "width" })?;
        check_capacity::<u64>("width", cell_count)?;
        tracing::debug!(width, depth, "constructed count-min sketch");
        Ok(CountMinSketch {
            width,
            depth,
            total: 0,
            grid: vec![0; cell_count],
            hasher: DoubleHasher::new(hash_builder),
        })
    }

    /// Constructs a new, empty `CountMinSketch` with an upper bound on the relative error
    /// (`epsilon`), on the probability of exceeding it (`delta`), and a hasher builder for double
    /// hashing (`hash_builder`).
    ///
    /// # Errors
    ///
    /// Returns an error if `epsilon` or `delta` is not in (0, 1), or if the resulting grid is too
    /// large to allocate.
    ///
    /// # Examples
    ///
    /// ```
    /// use probabilistic_sketches::count_min_sketch::CountMinSketch;
    /// use probabilistic_sketches::SipHasherBuilder;
    ///
    /// let count_min_sketch = CountMinSketch::<String>::from_error_with_hasher(
    ///     0.1,
    ///     0.05,
    ///     SipHasherBuilder::from_seed(0, 0),
    /// )?;
    ///
    /// assert!(count_min_sketch.epsilon() <= 0.1);
    /// assert!(count_min_sketch.delta() <= 0.05);
    /// # Ok::<(), probabilistic_sketches::Error>(())
    /// ```
    pub fn from_error_with_hasher(epsilon: f64, delta: f64, hash_builder: B) -> Result<Self> {
        let (width, depth) = Self::optimal_dims(epsilon, delta)?;
        Self::with_hasher(width, depth, hash_builder)
    }

    /// Records `count` occurrences of `item`. Counters saturate at `u64::MAX`.
    ///
    /// # Examples
    ///
    /// ```
    /// use probabilistic_sketches::count_min_sketch::CountMinSketch;
    ///
    /// let mut count_min_sketch = CountMinSketch::<String>::from_error(0.1, 0.05)?;
    /// count_min_sketch.insert("foo", 3);
    /// assert_eq!(count_min_sketch.estimate("foo"), 3);
    /// # Ok::<(), probabilistic_sketches::Error>(())
    /// ```
    pub fn insert<U>(&mut self, item: &U, count: u64)
    where
        T: Borrow<U>,
        U: Hash + ?Sized,
    {
        self.total = self.total.saturating_add(count);
        let width = self.width;
        for (row, col) in self
            .hasher
            .hash(item)
            .indices(self.depth, width)
            .enumerate()
        {
            let cell = &mut self.grid[row * width + col];
            *cell = cell.saturating_add(count);
        }
    }

    /// Returns the estimated number of times `item` was recorded. The estimate is never less
    /// than the true count.
    ///
    /// # Examples
    ///
    /// ```
    /// use probabilistic_sketches::count_min_sketch::CountMinSketch;
    ///
    /// let mut count_min_sketch = CountMinSketch::<String>::from_error(0.1, 0.05)?;
    /// assert_eq!(count_min_sketch.estimate("foo"), 0);
    ///
    /// count_min_sketch.insert("foo", 3);
    /// assert_eq!(count_min_sketch.estimate("foo"), 3);
    /// # Ok::<(), probabilistic_sketches::Error>(())
    /// ```
    pub fn estimate<U>(&self, item: &U) -> u64
    where
        T: Borrow<U>,
        U: Hash + ?Sized,
    {
        self.hasher
            .hash(item)
            .indices(self.depth, self.width)
            .enumerate()
            .map(|(row, col)| self.grid[row * self.width + col])
            .min()
            .unwrap_or(0)
    }

    /// Clears all counters of the count-min sketch.
    pub fn clear(&mut self) {
        tracing::trace!(width = self.width, depth = self.depth, "cleared count-min sketch");
        for value in &mut self.grid {
            *value = 0
        }
        self.total = 0;
    }

    /// Returns the number of columns in each row of the count-min sketch.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Returns the number of rows in the count-min sketch.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Returns the sum of all counts recorded in the count-min sketch.
    pub fn total(&self) -> u64 {
        self.total
    }

    /// Returns the relative error bound of the count-min sketch: estimates exceed the true count
    /// by at most `epsilon() * total()` with high probability.
    pub fn epsilon(&self) -> f64 {
        E / self.width as f64
    }

    /// Returns the probability that an estimate exceeds the error bound.
    pub fn delta(&self) -> f64 {
        1.0 / (self.depth as f64).exp()
    }

    /// Returns a reference to the count-min sketch's hasher builder.
    pub fn hasher(&self) -> &B {
        self.hasher.hasher()
    }
}

impl<T, B> CountMinSketch<T, B>
where
    B: BuildHasher + PartialEq,
{
    /// Adds all counts recorded in `other` to `self`.
    ///
    /// # Errors
    ///
    /// Returns an error if the two sketches differ in dimensions or hasher.
    ///
    /// # Examples
    ///
    /// ```
    /// use probabilistic_sketches::count_min_sketch::CountMinSketch;
    /// use probabilistic_sketches::SipHasherBuilder;
    ///
    /// let hash_builder = SipHasherBuilder::from_seed(0, 0);
    /// let mut cms1 = CountMinSketch::<String>::with_hasher(28, 3, hash_builder)?;
    /// let mut cms2 = CountMinSketch::<String>::with_hasher(28, 3, hash_builder)?;
    /// cms1.insert("foo", 3);
    /// cms2.insert("foo", 2);
    ///
    /// cms1.merge(&cms2)?;
    /// assert!(cms1.estimate("foo") >= 5);
    /// assert_eq!(cms1.total(), 5);
    /// # Ok::<(), probabilistic_sketches::Error>(())
    /// ```
    pub fn merge(&mut self, other: &Self) -> Result<()> {
        if self.width != other.width || self.depth != other.depth {
            return Err(Error::Incompatible {
                reason: "count-min sketches have different dimensions",
            });
        }
        if self.hasher() != other.hasher() {
            return Err(Error::Incompatible {
                reason: "count-min sketches use different hashers",
            });
        }
        tracing::trace!(width = self.width, depth = self.depth, "merged count-min sketches");
        for (value, other_value) in self.grid.iter_mut().zip(&other.grid) {
            *value = value.saturating_add(*other_value);
        }
        self.total = self.total.saturating_add(other.total);
        Ok(())
    }
}
