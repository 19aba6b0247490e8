use std::fmt::{self, Debug};

use crate::{
    StoreErr,
    bitbuf::BitBuf,
    radix::{TERNARY_DIGITS, TERNARY_GROUP_BITS, pack3, unpack3},
    store::{check_span, check_value},
    traits::{StoreRead, StoreWrite, impl_int_access},
};

/// Store for `range = 3`: five base-3 digits packed into each byte-wide group.
///
/// Digit slots past `len` in the final group stay zero, so buffer equality is
/// value equality.
#[derive(Clone, PartialEq, Eq, Default)]
pub struct TernaryStore {
    len: usize,
    buf: BitBuf,
}

impl TernaryStore {
    pub fn new(len: usize) -> Self {
        let groups = len.div_ceil(TERNARY_DIGITS);
        Self { len, buf: BitBuf::zeroed(groups * TERNARY_GROUP_BITS) }
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

    fn load_group(&self, group: usize) -> Result<[u8; TERNARY_DIGITS], StoreErr> {
        let code = self.buf.load(group * TERNARY_GROUP_BITS, TERNARY_GROUP_BITS)?;
        Ok(unpack3(code as u8))
    }

    fn store_group(&mut self, group: usize, digits: [u8; TERNARY_DIGITS]) -> Result<(), StoreErr> {
        self.buf
            .store(group * TERNARY_GROUP_BITS, TERNARY_GROUP_BITS, u32::from(pack3(digits)))
    }

    /// Replaces one digit without revalidating, returning the previous digit.
    fn set_digit(&mut self, index: usize, value: u32) -> Result<u32, StoreErr> {
        let group = index / TERNARY_DIGITS;
        let slot = index % TERNARY_DIGITS;
        let mut digits = self.load_group(group)?;
        let prev = digits[slot];
        digits[slot] = value as u8;
        self.store_group(group, digits)?;
        Ok(u32::from(prev))
    }
}

impl Debug for TernaryStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TernaryStore({})", self.len)
    }
}

impl StoreRead for TernaryStore {
    type Elem = u32;

    fn len(&self) -> usize {
        self.len
    }

    fn range(&self) -> u32 {
        3
    }

    fn get(&self, index: usize) -> Result<u32, StoreErr> {
        self.check_index(index)?;
        let digits = self.load_group(index / TERNARY_DIGITS)?;
        Ok(u32::from(digits[index % TERNARY_DIGITS]))
    }

    fn iter(&self) -> impl Iterator<Item = u32> {
        self.buf
            .slots(TERNARY_GROUP_BITS)
            .flat_map(|code| unpack3(code as u8))
            .map(u32::from)
            .take(self.len)
    }
}

impl StoreWrite for TernaryStore {
    fn set(&mut self, index: usize, value: u32) -> Result<u32, StoreErr> {
        self.check_index(index)?;
        check_value(value, 3)?;
        self.set_digit(index, value)
    }

    fn fill(&mut self, value: u32) -> Result<(), StoreErr> {
        self.fill_range(0, self.len, value)
    }

    fn fill_range(&mut self, from: usize, to: usize, value: u32) -> Result<(), StoreErr> {
        check_span(from, to, self.len)?;
        check_value(value, 3)?;

        // edge elements sharing a group with the outside of the span are
        // replaced digit by digit; whole groups broadcast one packed code
        let mut lo = from;
        while lo < to && lo % TERNARY_DIGITS != 0 {
            self.set_digit(lo, value)?;
            lo += 1;
        }
        let mut hi = to;
        while hi > lo && hi % TERNARY_DIGITS != 0 {
            hi -= 1;
            self.set_digit(hi, value)?;
        }
        if lo < hi {
            let code = pack3([value as u8; TERNARY_DIGITS]);
            self.buf.fill_range(
                lo / TERNARY_DIGITS,
                hi / TERNARY_DIGITS,
                u32::from(code),
                TERNARY_GROUP_BITS,
            )?;
        }
        Ok(())
    }
}

impl_int_access!(TernaryStore);

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn test_roundtrip_mod3() {
        let mut store = TernaryStore::new(23);
        for index in 0..10 {
            store.set(index, (index % 3) as u32).unwrap();
        }
        for index in 0..10 {
            assert_eq!(store.get(index).unwrap(), (index % 3) as u32);
        }

        store.fill(0).unwrap();
        assert_eq!(store, TernaryStore::new(23));
    }

    #[test]
    fn test_group_packing_density() {
        // 23 elements fit in 5 byte-wide groups
        let store = TernaryStore::new(23);
        assert_eq!(store.bit_len(), 40);
    }

    #[test]
    fn test_set_returns_previous() {
        let mut store = TernaryStore::new(6);
        assert_eq!(store.set(5, 2).unwrap(), 0);
        assert_eq!(store.set(5, 1).unwrap(), 2);
        assert_matches!(store.set(5, 3), Err(StoreErr::Range { value: 3, range: 3 }));
        assert_eq!(store.get(5).unwrap(), 1);
    }

    #[test]
    fn test_fill_range_partial_groups() {
        let mut store = TernaryStore::new(17);
        store.fill_range(2, 13, 2).unwrap();
        for index in 0..17 {
            let expected = if (2..13).contains(&index) { 2 } else { 0 };
            assert_eq!(store.get(index).unwrap(), expected, "index {index}");
        }
    }

    #[test]
    fn test_fill_keeps_canonical_form() {
        // a nonzero whole-store fill must leave digits past len untouched so
        // that equality with an element-wise filled store holds
        let mut broadcast = TernaryStore::new(7);
        broadcast.fill(2).unwrap();

        let mut elementwise = TernaryStore::new(7);
        for index in 0..7 {
            elementwise.set(index, 2).unwrap();
        }
        assert_eq!(broadcast, elementwise);
        assert!(broadcast.iter().eq(std::iter::repeat_n(2, 7)));
    }
}
