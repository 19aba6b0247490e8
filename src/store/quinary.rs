use std::fmt::{self, Debug};

use crate::{
    StoreErr,
    bitbuf::BitBuf,
    radix::{QUINARY_DIGITS, QUINARY_GROUP_BITS, pack5, unpack5},
    store::{check_span, check_value},
    traits::{StoreRead, StoreWrite, impl_int_access},
};

/// Store for `range = 5`: three base-5 digits packed into each 7-bit group.
///
/// Digit slots past `len` in the final group stay zero, so buffer equality is
/// value equality.
#[derive(Clone, PartialEq, Eq, Default)]
pub struct QuinaryStore {
    len: usize,
    buf: BitBuf,
}

impl QuinaryStore {
    pub fn new(len: usize) -> Self {
        let groups = len.div_ceil(QUINARY_DIGITS);
        Self { len, buf: BitBuf::zeroed(groups * QUINARY_GROUP_BITS) }
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

    fn load_group(&self, group: usize) -> Result<[u8; QUINARY_DIGITS], StoreErr> {
        let code = self.buf.load(group * QUINARY_GROUP_BITS, QUINARY_GROUP_BITS)?;
        Ok(unpack5(code as u8))
    }

    fn store_group(&mut self, group: usize, digits: [u8; QUINARY_DIGITS]) -> Result<(), StoreErr> {
        self.buf
            .store(group * QUINARY_GROUP_BITS, QUINARY_GROUP_BITS, u32::from(pack5(digits)))
    }

    /// Replaces one digit without revalidating, returning the previous digit.
    fn set_digit(&mut self, index: usize, value: u32) -> Result<u32, StoreErr> {
        let group = index / QUINARY_DIGITS;
        let slot = index % QUINARY_DIGITS;
        let mut digits = self.load_group(group)?;
        let prev = digits[slot];
        digits[slot] = value as u8;
        self.store_group(group, digits)?;
        Ok(u32::from(prev))
    }
}

impl Debug for QuinaryStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "QuinaryStore({})", self.len)
    }
}

impl StoreRead for QuinaryStore {
    type Elem = u32;

    fn len(&self) -> usize {
        self.len
    }

    fn range(&self) -> u32 {
        5
    }

    fn get(&self, index: usize) -> Result<u32, StoreErr> {
        self.check_index(index)?;
        let digits = self.load_group(index / QUINARY_DIGITS)?;
        Ok(u32::from(digits[index % QUINARY_DIGITS]))
    }

    fn iter(&self) -> impl Iterator<Item = u32> {
        self.buf
            .slots(QUINARY_GROUP_BITS)
            .flat_map(|code| unpack5(code as u8))
            .map(u32::from)
            .take(self.len)
    }
}

impl StoreWrite for QuinaryStore {
    fn set(&mut self, index: usize, value: u32) -> Result<u32, StoreErr> {
        self.check_index(index)?;
        check_value(value, 5)?;
        self.set_digit(index, value)
    }

    fn fill(&mut self, value: u32) -> Result<(), StoreErr> {
        self.fill_range(0, self.len, value)
    }

    fn fill_range(&mut self, from: usize, to: usize, value: u32) -> Result<(), StoreErr> {
        check_span(from, to, self.len)?;
        check_value(value, 5)?;

        let mut lo = from;
        while lo < to && lo % QUINARY_DIGITS != 0 {
            self.set_digit(lo, value)?;
            lo += 1;
        }
        let mut hi = to;
        while hi > lo && hi % QUINARY_DIGITS != 0 {
            hi -= 1;
            self.set_digit(hi, value)?;
        }
        if lo < hi {
            let code = pack5([value as u8; QUINARY_DIGITS]);
            self.buf.fill_range(
                lo / QUINARY_DIGITS,
                hi / QUINARY_DIGITS,
                u32::from(code),
                QUINARY_GROUP_BITS,
            )?;
        }
        Ok(())
    }
}

impl_int_access!(QuinaryStore);
