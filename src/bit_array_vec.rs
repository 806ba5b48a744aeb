//! Fixed-length list of small packed integers.

use std::cmp;
use std::mem;
use std::ops::Range;

/// A fixed-length list of unsigned integers, each `bit_count` bits wide, packed into a
/// `Vec<u8>`.
///
/// A value may straddle two bytes. `BitArrayVec` is very memory efficient for small values for a
/// small time tradeoff, which makes it a good fit for `HyperLogLog` registers.
///
/// # Examples
///
/// ```
/// use probabilistic_sketches::bit_array_vec::BitArrayVec;
///
/// let mut bav = BitArrayVec::new(6, 4);
///
/// bav.set(0, 0);
/// bav.set(1, 1);
/// bav.set(2, 42);
/// bav.set(3, 63);
///
/// assert_eq!(bav.iter().collect::<Vec<u8>>(), vec![0, 1, 42, 63]);
/// assert_eq!(bav.count_zeros(), 1);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct BitArrayVec {
    blocks: Vec<u8>,
    bit_count: usize,
    len: usize,
    zero_count: usize,
}

const BLOCK_BIT_COUNT: usize = mem::size_of::<u8>() * 8;

impl BitArrayVec {
    fn get_block_count(bit_count: usize, len: usize) -> usize {
        (bit_count * len + BLOCK_BIT_COUNT - 1) / BLOCK_BIT_COUNT
    }

    fn mask(&self) -> u8 {
        (!0u8) >> (BLOCK_BIT_COUNT - self.bit_count)
    }

    /// Constructs a new `BitArrayVec` holding `len` values of `bit_count` bits each. All values
    /// are initialized to zero.
    ///
    /// # Panics
    ///
    /// Panics if `bit_count` is not in `[1, 8]`.
    ///
    /// # Examples
    ///
    /// ```
    /// use probabilistic_sketches::bit_array_vec::BitArrayVec;
    ///
    /// let bav = BitArrayVec::new(5, 4);
    /// assert_eq!(bav.iter().collect::<Vec<u8>>(), vec![0, 0, 0, 0]);
    /// ```
    pub fn new(bit_count: usize, len: usize) -> Self {
        assert!(
            1 <= bit_count && bit_count <= BLOCK_BIT_COUNT,
            "bit_count must be in [1, 8]"
        );
        BitArrayVec {
            blocks: vec![0; Self::get_block_count(bit_count, len)],
            bit_count,
            len,
            zero_count: len,
        }
    }

    /// Returns the value at index `index`.
    ///
    /// # Panics
    ///
    /// Panics if attempt to get an index out-of-bounds.
    ///
    /// # Examples
    ///
    /// ```
    /// use probabilistic_sketches::bit_array_vec::BitArrayVec;
    ///
    /// let mut bav = BitArrayVec::new(5, 4);
    /// bav.set(1, 17);
    ///
    /// assert_eq!(bav.get(0), 0);
    /// assert_eq!(bav.get(1), 17);
    /// ```
    pub fn get(&self, index: usize) -> u8 {
        assert!(index < self.len, "index {} out of bounds", index);
        let bits_offset = index * self.bit_count;
        let block_index = bits_offset / BLOCK_BIT_COUNT;
        let shift = bits_offset % BLOCK_BIT_COUNT;

        let mut value = self.blocks[block_index] >> shift;
        let low_bits = BLOCK_BIT_COUNT - shift;
        if low_bits < self.bit_count {
            value |= self.blocks[block_index + 1] << low_bits;
        }
        value & self.mask()
    }

    /// Sets the value at index `index` to `value`.
    ///
    /// # Panics
    ///
    /// Panics if attempt to set an index out-of-bounds, or if `value` does not fit in
    /// `bit_count` bits.
    ///
    /// # Examples
    ///
    /// ```
    /// use probabilistic_sketches::bit_array_vec::BitArrayVec;
    ///
    /// let mut bav = BitArrayVec::new(5, 4);
    /// bav.set(1, 31);
    ///
    /// assert_eq!(bav.get(1), 31);
    /// ```
    pub fn set(&mut self, index: usize, value: u8) {
        assert!(index < self.len, "index {} out of bounds", index);
        let mask = self.mask();
        assert!(
            value & !mask == 0,
            "value {} does not fit in {} bits",
            value,
            self.bit_count
        );

        let prev_is_zero = self.get(index) == 0;
        let bits_offset = index * self.bit_count;
        let block_index = bits_offset / BLOCK_BIT_COUNT;
        let shift = bits_offset % BLOCK_BIT_COUNT;

        let block = &mut self.blocks[block_index];
        *block = (*block & !(mask << shift)) | (value << shift);

        let low_bits = BLOCK_BIT_COUNT - shift;
        if low_bits < self.bit_count {
            let block = &mut self.blocks[block_index + 1];
            *block = (*block & !(mask >> low_bits)) | (value >> low_bits);
        }

        match (prev_is_zero, value == 0) {
            (true, false) => self.zero_count -= 1,
            (false, true) => self.zero_count += 1,
            _ => {}
        }
    }

    /// Sets the value at index `index` to the maximum of its current value and `value`. Returns
    /// `true` if the stored value changed.
    ///
    /// # Panics
    ///
    /// Panics under the same conditions as `set`.
    ///
    /// # Examples
    ///
    /// ```
    /// use probabilistic_sketches::bit_array_vec::BitArrayVec;
    ///
    /// let mut bav = BitArrayVec::new(6, 2);
    ///
    /// assert!(bav.update_max(0, 5));
    /// assert!(!bav.update_max(0, 3));
    /// assert_eq!(bav.get(0), 5);
    /// ```
    pub fn update_max(&mut self, index: usize, value: u8) -> bool {
        let current = self.get(index);
        if value > current {
            self.set(index, value);
            true
        } else {
            false
        }
    }

    /// Sets every value to zero.
    pub fn clear(&mut self) {
        for block in &mut self.blocks {
            *block = 0;
        }
        self.zero_count = self.len;
    }

    /// Returns an iterator over the values in order.
    pub fn iter(&self) -> BitArrayVecIter<'_> {
        BitArrayVecIter {
            bit_array_vec: self,
            range: 0..self.len,
        }
    }

    /// Returns the number of values in the `BitArrayVec`.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the `BitArrayVec` holds no values.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the width in bits of each value.
    pub fn bit_count(&self) -> usize {
        self.bit_count
    }

    /// Returns the number of values that are zero.
    pub fn count_zeros(&self) -> usize {
        self.zero_count
    }

    /// Returns the number of bytes used to store the values.
    pub fn byte_len(&self) -> usize {
        self.blocks.len()
    }
}

impl Extend<(usize, u8)> for BitArrayVec {
    /// Applies `update_max` for every `(index, value)` pair.
    fn extend<I: IntoIterator<Item = (usize, u8)>>(&mut self, iter: I) {
        for (index, value) in iter {
            self.update_max(index, cmp::min(value, self.mask()));
        }
    }
}

/// An iterator for `BitArrayVec`.
///
/// This iterator yields values in order.
pub struct BitArrayVecIter<'a> {
    bit_array_vec: &'a BitArrayVec,
    range: Range<usize>,
}

impl<'a> Iterator for BitArrayVecIter<'a> {
    type Item = u8;

    fn next(&mut self) -> Option<u8> {
        self.range
            .next()
            .map(|index| self.bit_array_vec.get(index))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.range.size_hint()
    }
}

impl<'a> ExactSizeIterator for BitArrayVecIter<'a> {}

#[cfg(test)]
mod tests {
    use super::BitArrayVec;

    #[test]
    fn test_new() {
        let bav = BitArrayVec::new(6, 16);
        assert_eq!(bav.len(), 16);
        assert_eq!(bav.bit_count(), 6);
        assert_eq!(bav.byte_len(), 12);
        assert_eq!(bav.count_zeros(), 16);
        assert!(bav.iter().all(|value| value == 0));
    }

    #[test]
    #[should_panic]
    fn test_new_too_wide() {
        BitArrayVec::new(9, 4);
    }

    #[test]
    fn test_set_get_straddling_blocks() {
        let mut bav = BitArrayVec::new(6, 16);
        for index in 0..16 {
            bav.set(index, (index * 4 + 3) as u8 & 0b11_1111);
        }
        for index in 0..16 {
            assert_eq!(bav.get(index), (index * 4 + 3) as u8 & 0b11_1111);
        }
    }

    #[test]
    fn test_set_does_not_clobber_neighbors() {
        let mut bav = BitArrayVec::new(5, 8);
        for index in 0..8 {
            bav.set(index, 31);
        }
        bav.set(3, 0);
        assert_eq!(
            bav.iter().collect::<Vec<u8>>(),
            vec![31, 31, 31, 0, 31, 31, 31, 31]
        );
        bav.set(3, 10);
        assert_eq!(
            bav.iter().collect::<Vec<u8>>(),
            vec![31, 31, 31, 10, 31, 31, 31, 31]
        );
    }

    #[test]
    #[should_panic]
    fn test_set_value_too_wide() {
        let mut bav = BitArrayVec::new(5, 8);
        bav.set(0, 32);
    }

    #[test]
    #[should_panic]
    fn test_get_out_of_bounds() {
        let bav = BitArrayVec::new(5, 8);
        bav.get(8);
    }

    #[test]
    fn test_count_zeros() {
        let mut bav = BitArrayVec::new(6, 4);
        bav.set(0, 1);
        bav.set(1, 2);
        assert_eq!(bav.count_zeros(), 2);
        bav.set(1, 3);
        assert_eq!(bav.count_zeros(), 2);
        bav.set(0, 0);
        assert_eq!(bav.count_zeros(), 3);
        bav.clear();
        assert_eq!(bav.count_zeros(), 4);
    }

    #[test]
    fn test_update_max() {
        let mut bav = BitArrayVec::new(6, 3);
        assert!(bav.update_max(1, 7));
        assert!(!bav.update_max(1, 7));
        assert!(!bav.update_max(1, 2));
        assert!(bav.update_max(1, 9));
        assert_eq!(bav.iter().collect::<Vec<u8>>(), vec![0, 9, 0]);
    }

    #[test]
    fn test_extend() {
        let mut bav = BitArrayVec::new(6, 3);
        bav.extend(vec![(0, 4), (0, 2), (2, 70)]);
        assert_eq!(bav.iter().collect::<Vec<u8>>(), vec![4, 0, 63]);
    }

    #[test]
    fn test_full_width() {
        let mut bav = BitArrayVec::new(8, 3);
        bav.set(1, 255);
        assert_eq!(bav.iter().collect::<Vec<u8>>(), vec![0, 255, 0]);
    }
}
