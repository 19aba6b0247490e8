use std::fmt::{self, Debug};
use std::iter;

use either::Either;

use crate::{
    StoreErr,
    bitbuf::BitBuf,
    store::{check_span, check_value},
    traits::{StoreRead, StoreWrite, impl_int_access},
};

/// Store for ranges with no specialized encoding: every element occupies a fixed
/// `ceil(log2(range))`-bit field.
///
/// Power-of-two ranges land here; range 4 in particular takes 2 bits per
/// element, which is already exact without any mixed-radix packing.
#[derive(Clone, PartialEq, Eq)]
pub struct ArbitraryStore {
    len: usize,
    range: u32,
    width: usize,
    buf: BitBuf,
}

impl ArbitraryStore {
    pub fn new(len: usize, range: u32) -> Self {
        debug_assert!(range >= 1, "range must be at least 1");
        let width = Self::width_for(range);
        Self { len, range, width, buf: BitBuf::zeroed(len * width) }
    }

    /// the number of bits needed to hold any value in `[0, range)`
    pub fn width_for(range: u32) -> usize {
        (32 - (range - 1).leading_zeros()) as usize
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn bit_len(&self) -> usize {
        self.buf.bit_len()
    }

    fn check_index(&self, index: usize) -> Result<(), StoreErr> {
        if index >= self.len {
            return Err(StoreErr::Bounds { index, len: self.len });
        }
        Ok(())
    }
}

impl Debug for ArbitraryStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ArbitraryStore({}, range {}, {} bits)", self.len, self.range, self.width)
    }
}

impl StoreRead for ArbitraryStore {
    type Elem = u32;

    fn len(&self) -> usize {
        self.len
    }

    fn range(&self) -> u32 {
        self.range
    }

    fn get(&self, index: usize) -> Result<u32, StoreErr> {
        self.check_index(index)?;
        self.buf.load(index * self.width, self.width)
    }

    fn iter(&self) -> impl Iterator<Item = u32> {
        if self.width == 0 {
            Either::Left(iter::repeat_n(0, self.len))
        } else {
            Either::Right(self.buf.slots(self.width))
        }
    }
}

impl StoreWrite for ArbitraryStore {
    fn set(&mut self, index: usize, value: u32) -> Result<u32, StoreErr> {
        self.check_index(index)?;
        check_value(value, self.range)?;
        let prev = self.buf.load(index * self.width, self.width)?;
        self.buf.store(index * self.width, self.width, value)?;
        Ok(prev)
    }

    fn fill(&mut self, value: u32) -> Result<(), StoreErr> {
        check_value(value, self.range)?;
        self.buf.fill(value, self.width)
    }

    fn fill_range(&mut self, from: usize, to: usize, value: u32) -> Result<(), StoreErr> {
        check_span(from, to, self.len)?;
        check_value(value, self.range)?;
        if self.width == 0 {
            return Ok(());
        }
        self.buf.fill_range(from, to, value, self.width)
    }
}

impl_int_access!(ArbitraryStore);

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;
    use crate::traits::IntAccess;

    #[test]
    fn test_width_selection() {
        assert_eq!(ArbitraryStore::width_for(1), 0);
        assert_eq!(ArbitraryStore::width_for(2), 1);
        assert_eq!(ArbitraryStore::width_for(4), 2);
        assert_eq!(ArbitraryStore::width_for(5), 3);
        assert_eq!(ArbitraryStore::width_for(200), 8);
        assert_eq!(ArbitraryStore::width_for(u32::MAX), 32);
    }

    #[test]
    fn test_range_200_boundaries() {
        let mut store = ArbitraryStore::new(4, 200);
        assert_eq!(store.width(), 8);

        assert_eq!(store.set(2, 199).unwrap(), 0);
        assert_eq!(store.get(2).unwrap(), 199);
        assert_matches!(store.set(2, 200), Err(StoreErr::Range { value: 200, range: 200 }));
        assert_matches!(store.set_int(2, -1), Err(StoreErr::Range { value: -1, range: 200 }));
        // rejected writes leave the slot untouched
        assert_eq!(store.get(2).unwrap(), 199);
    }

    #[test]
    fn test_roundtrip_wide_values() {
        let mut store = ArbitraryStore::new(9, 1 << 20);
        for index in 0..9 {
            let value = (index as u32) * 99_991;
            store.set(index, value).unwrap();
        }
        assert!(store.iter().eq((0..9).map(|i| (i as u32) * 99_991)));
        assert_eq!(store.bit_len(), 9 * 20);
    }

    #[test]
    fn test_fill() {
        let mut store = ArbitraryStore::new(6, 37);
        store.fill(36).unwrap();
        assert!(store.iter().all(|v| v == 36));
        store.fill_range(2, 4, 7).unwrap();
        assert!(store.iter().eq([36, 36, 7, 7, 36, 36]));
    }
}
