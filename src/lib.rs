//! # probabilistic-sketches
//!
//! `probabilistic-sketches` contains three classic probabilistic data structures that summarize
//! large or unbounded streams of data in sub-linear space. Each answers its query with a bounded
//! amount of error instead of exactly:
//!
//!  - [`BloomFilter`](bloom::BloomFilter): approximate set membership with false positives but no
//!    false negatives.
//!  - [`CountMinSketch`](count_min_sketch::CountMinSketch): approximate per-item counts that may
//!    overestimate but never underestimate.
//!  - [`HyperLogLog`](hyperloglog::HyperLogLog): approximate number of distinct items.
//!
//! Items are hashed through [`std::hash::Hash`] with a [`std::hash::BuildHasher`] chosen at
//! construction, [`SipHasherBuilder`] by default. The bloom filter and the count-min sketch hash
//! each item once and derive as many indices as they need with [`double_hash_index`].
//!
//! All constructors validate their parameters and return an [`Error`] instead of building a
//! degenerate collection. Insertions and queries never fail.
//!
//! ## Usage
//!
//! Add this to your `Cargo.toml`:
//! ```toml
//! [dependencies]
//! probabilistic-sketches = "*"
//! ```
//!
//! ```rust
//! use probabilistic_sketches::bloom::BloomFilter;
//! use probabilistic_sketches::count_min_sketch::CountMinSketch;
//! use probabilistic_sketches::hyperloglog::HyperLogLog;
//!
//! let mut filter = BloomFilter::<String>::optimally_sized(1000, 0.01)?;
//! let mut sketch = CountMinSketch::<String>::from_error(0.001, 0.01)?;
//! let mut hll = HyperLogLog::<String>::from_rsd(0.02)?;
//!
//! for word in "the quick brown fox jumps over the lazy dog".split(' ') {
//!     filter.insert(word);
//!     sketch.insert(word, 1);
//!     hll.insert(word);
//! }
//!
//! assert!(filter.contains("fox"));
//! assert!(sketch.estimate("the") >= 2);
//! assert_eq!(hll.cardinality(), 8);
//! # Ok::<(), probabilistic_sketches::Error>(())
//! ```
//!
//! ## References
//!
//!  - [Space/Time Trade-offs in Hash Coding with Allowable Errors](https://dl.acm.org/citation.cfm?id=362692)
//!  > Bloom, Burton H. 1970. “Space/Time Trade-Offs in Hash Coding with Allowable Errors.” *Commun. ACM* 13 (7): 422–26. doi:[10.1145/362686.362692](https://doi.org/10.1145/362686.362692).
//!  - [Less hashing, same performance: Building a better Bloom filter](https://dl.acm.org/citation.cfm?id=1400125)
//!  > Kirsch, Adam, and Michael Mitzenmacher. 2008. “Less Hashing, Same Performance: Building a Better Bloom Filter.” *Random Struct. Algorithms* 33 (2). New York, NY, USA: John Wiley & Sons, Inc.: 187–218. doi:[10.1002/rsa.v33:2](https://doi.org/10.1002/rsa.v33:2).
//!  - [An improved data stream summary: the count-min sketch and its applications](https://doi.org/10.1016/j.jalgor.2003.12.001)
//!  > Cormode, Graham, and S. Muthukrishnan. 2005. “An Improved Data Stream Summary: The Count-Min Sketch and Its Applications.” *J. Algorithms* 55 (1): 58–75.
//!  - [HyperLogLog: the analysis of a near-optimal cardinality estimation algorithm](http://algo.inria.fr/flajolet/Publications/FlFuGaMe07.pdf)
//!  > Flajolet, Philippe, Éric Fusy, Olivier Gandouet, and Frédéric Meunier. 2007. “Hyperloglog: The Analysis of a Near-Optimal Cardinality Estimation Algorithm.” In *IN Aofa ’07: PROCEEDINGS of the 2007 International Conference on Analysis of Algorithms*.

#![warn(missing_docs)]

pub mod bit_array_vec;
pub mod bit_vec;
pub mod bloom;
pub mod count_min_sketch;
pub mod error;
pub mod hyperloglog;
mod util;

pub use self::error::{Error, Result};
pub use self::util::{double_hash_index, SipHasherBuilder};
