//! Fixed-length array of bits.

use std::mem;
use std::ops::{Index, Range};

/// A fixed-length array of bits implemented using a `Vec<u64>`.
///
/// The number of set bits is tracked on every write so that `count_ones` and `count_zeros` are
/// constant time.
///
/// # Examples
///
/// ```
/// use probabilistic_sketches::bit_vec::BitVec;
///
/// let mut bv = BitVec::new(5);
///
/// bv.set(0, true);
/// bv.set(2, true);
/// assert_eq!(
///     bv.iter().collect::<Vec<bool>>(),
///     vec![true, false, true, false, false],
/// );
/// assert_eq!(bv.count_ones(), 2);
///
/// let mut other = BitVec::new(5);
/// other.set(4, true);
/// bv.union(&other);
/// assert_eq!(
///     bv.iter().collect::<Vec<bool>>(),
///     vec![true, false, true, false, true],
/// );
///
/// bv.clear();
/// assert_eq!(bv.count_ones(), 0);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct BitVec {
    blocks: Vec<u64>,
    len: usize,
    one_count: usize,
}

const BLOCK_BIT_COUNT: usize = mem::size_of::<u64>() * 8;

impl BitVec {
    pub(crate) fn block_count(len: usize) -> usize {
        len / BLOCK_BIT_COUNT + usize::from(len % BLOCK_BIT_COUNT != 0)
    }

    /// Constructs a new `BitVec` with a certain number of bits. All bits are initialized to false.
    ///
    /// # Examples
    ///
    /// ```
    /// use probabilistic_sketches::bit_vec::BitVec;
    ///
    /// let bv = BitVec::new(5);
    /// assert_eq!(
    ///     bv.iter().collect::<Vec<bool>>(),
    ///     vec![false, false, false, false, false],
    /// );
    /// ```
    pub fn new(len: usize) -> Self {
        BitVec {
            blocks: vec![0; Self::block_count(len)],
            len,
            one_count: 0,
        }
    }

    /// Sets the value at index `index` to `bit` and returns the previous value.
    ///
    /// # Panics
    ///
    /// Panics if attempt to set an index out-of-bounds.
    ///
    /// # Examples
    ///
    /// ```
    /// use probabilistic_sketches::bit_vec::BitVec;
    ///
    /// let mut bv = BitVec::new(5);
    /// assert!(!bv.set(1, true));
    /// assert!(bv.set(1, true));
    ///
    /// assert_eq!(bv.get(0), Some(false));
    /// assert_eq!(bv.get(1), Some(true));
    /// ```
    pub fn set(&mut self, index: usize, bit: bool) -> bool {
        assert!(index < self.len, "index {} out of bounds", index);
        let block = &mut self.blocks[index / BLOCK_BIT_COUNT];
        let mask = 1 << (index % BLOCK_BIT_COUNT);
        let prev = *block & mask != 0;
        if bit {
            *block |= mask;
        } else {
            *block &= !mask;
        }
        match (prev, bit) {
            (false, true) => self.one_count += 1,
            (true, false) => self.one_count -= 1,
            _ => {}
        }
        prev
    }

    /// Returns the value at index `index`, or `None` if index is out of bounds.
    ///
    /// # Examples
    ///
    /// ```
    /// use probabilistic_sketches::bit_vec::BitVec;
    ///
    /// let mut bv = BitVec::new(5);
    /// bv.set(1, true);
    ///
    /// assert_eq!(bv.get(1), Some(true));
    /// assert_eq!(bv.get(5), None);
    /// ```
    pub fn get(&self, index: usize) -> Option<bool> {
        if index >= self.len {
            return None;
        }
        let block = self.blocks[index / BLOCK_BIT_COUNT];
        Some((block >> (index % BLOCK_BIT_COUNT)) & 1 != 0)
    }

    /// Sets every bit to false.
    pub fn clear(&mut self) {
        for block in &mut self.blocks {
            *block = 0;
        }
        self.one_count = 0;
    }

    /// Sets `self` to the union of `self` and `other`.
    ///
    /// # Panics
    ///
    /// Panics if the two `BitVec` are of different lengths.
    pub fn union(&mut self, other: &Self) {
        assert_eq!(self.len, other.len);
        let mut one_count = 0;
        for (block, other_block) in self.blocks.iter_mut().zip(&other.blocks) {
            *block |= *other_block;
            one_count += block.count_ones() as usize;
        }
        self.one_count = one_count;
    }

    /// Returns an iterator over the bits of the vector in order.
    pub fn iter(&self) -> BitVecIter<'_> {
        BitVecIter {
            bit_vec: self,
            range: 0..self.len,
        }
    }

    /// Returns `true` if the `BitVec` holds no bits.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the number of bits in the `BitVec`.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns the number of set bits in the `BitVec`.
    pub fn count_ones(&self) -> usize {
        self.one_count
    }

    /// Returns the number of unset bits in the `BitVec`.
    pub fn count_zeros(&self) -> usize {
        self.len - self.one_count
    }
}

/// An iterator for `BitVec`.
///
/// This iterator yields bits in order.
pub struct BitVecIter<'a> {
    bit_vec: &'a BitVec,
    range: Range<usize>,
}

impl<'a> Iterator for BitVecIter<'a> {
    type Item = bool;

    fn next(&mut self) -> Option<bool> {
        let index = self.range.next()?;
        self.bit_vec.get(index)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.range.size_hint()
    }
}

impl<'a> IntoIterator for &'a BitVec {
    type IntoIter = BitVecIter<'a>;
    type Item = bool;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

static TRUE: bool = true;
static FALSE: bool = false;

impl Index<usize> for BitVec {
    type Output = bool;

    fn index(&self, index: usize) -> &bool {
        match self.get(index) {
            Some(true) => &TRUE,
            Some(false) => &FALSE,
            None => panic!("index {} out of bounds", index),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::BitVec;

    #[test]
    fn test_block_count() {
        assert_eq!(BitVec::block_count(0), 0);
        assert_eq!(BitVec::block_count(64), 1);
        assert_eq!(BitVec::block_count(65), 2);
        assert_eq!(
            BitVec::block_count(usize::max_value()),
            usize::max_value() / 64 + 1
        );
    }

    #[test]
    fn test_new() {
        let bv = BitVec::new(130);
        assert_eq!(bv.len(), 130);
        assert_eq!(bv.blocks.len(), 3);
        assert_eq!(bv.count_ones(), 0);
        assert_eq!(bv.count_zeros(), 130);
        assert!(bv.iter().all(|bit| !bit));
    }

    #[test]
    fn test_set_get_across_blocks() {
        let mut bv = BitVec::new(130);
        for index in &[0, 63, 64, 129] {
            assert!(!bv.set(*index, true));
        }
        assert!(bv[0] && bv[63] && bv[64] && bv[129]);
        assert!(!bv[1] && !bv[65]);
        assert_eq!(bv.count_ones(), 4);

        assert!(bv.set(63, false));
        assert!(!bv[63]);
        assert_eq!(bv.count_ones(), 3);
        assert_eq!(bv.count_zeros(), 127);
    }

    #[test]
    fn test_set_twice_counts_once() {
        let mut bv = BitVec::new(10);
        bv.set(3, true);
        bv.set(3, true);
        assert_eq!(bv.count_ones(), 1);
    }

    #[test]
    #[should_panic]
    fn test_set_out_of_bounds() {
        let mut bv = BitVec::new(10);
        bv.set(10, true);
    }

    #[test]
    #[should_panic]
    fn test_index_out_of_bounds() {
        let bv = BitVec::new(10);
        let _ = bv[10];
    }

    #[test]
    fn test_union() {
        let mut bv1 = BitVec::new(70);
        bv1.set(0, true);
        bv1.set(69, true);

        let mut bv2 = BitVec::new(70);
        bv2.set(0, true);
        bv2.set(5, true);

        bv1.union(&bv2);
        assert_eq!(bv1.count_ones(), 3);
        assert!(bv1[0] && bv1[5] && bv1[69]);
    }

    #[test]
    #[should_panic]
    fn test_union_length_mismatch() {
        let mut bv1 = BitVec::new(10);
        bv1.union(&BitVec::new(11));
    }

    #[test]
    fn test_clear() {
        let mut bv = BitVec::new(10);
        bv.set(1, true);
        bv.clear();
        assert_eq!(bv.count_ones(), 0);
        assert_eq!(bv.get(1), Some(false));
    }

    #[test]
    fn test_is_empty() {
        assert!(BitVec::new(0).is_empty());
        assert!(!BitVec::new(1).is_empty());
    }
}
