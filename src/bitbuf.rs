use std::fmt::{self, Debug};

use bitvec::{field::BitField, order::Lsb0, vec::BitVec};

use crate::StoreErr;

/// Maximum field width accepted by [`BitBuf::load`] and [`BitBuf::store`].
pub const MAX_FIELD_WIDTH: usize = 32;

/// A resizable sequence of bits addressed as fixed-width little-endian fields.
///
/// All operations are defined for `0 <= width <= 32` and
/// `bit_offset + width <= bit_len`; anything else fails with [`StoreErr::Bounds`]
/// before touching the buffer, so a rejected call never partially applies.
#[derive(Clone, PartialEq, Eq, Default)]
pub struct BitBuf {
    bits: BitVec<u64, Lsb0>,
}

impl BitBuf {
    /// A buffer of `bit_len` zero bits.
    pub fn zeroed(bit_len: usize) -> Self {
        Self { bits: BitVec::repeat(false, bit_len) }
    }

    pub fn bit_len(&self) -> usize {
        self.bits.len()
    }

    pub fn count_ones(&self) -> usize {
        self.bits.count_ones()
    }

    /// the number of whole `width`-bit slots the buffer holds
    pub fn slot_count(&self, width: usize) -> usize {
        if width == 0 { 0 } else { self.bits.len() / width }
    }

    fn check(&self, bit_offset: usize, width: usize) -> Result<(), StoreErr> {
        let end = bit_offset.checked_add(width);
        if width > MAX_FIELD_WIDTH || end.is_none_or(|end| end > self.bits.len()) {
            return Err(StoreErr::Bounds { index: bit_offset, len: self.bits.len() });
        }
        Ok(())
    }

    /// Reads the `width`-bit field starting at `bit_offset`.
    pub fn load(&self, bit_offset: usize, width: usize) -> Result<u32, StoreErr> {
        self.check(bit_offset, width)?;
        if width == 0 {
            return Ok(0);
        }
        Ok(self.bits[bit_offset..bit_offset + width].load_le::<u32>())
    }

    /// Writes `value` into the `width`-bit field starting at `bit_offset`.
    ///
    /// Bits of `value` at or above `width` must be zero.
    pub fn store(&mut self, bit_offset: usize, width: usize, value: u32) -> Result<(), StoreErr> {
        self.check(bit_offset, width)?;
        if width == 0 {
            return Ok(());
        }
        debug_assert!(
            width == MAX_FIELD_WIDTH || value < (1 << width),
            "value does not fit a {width}-bit field"
        );
        self.bits[bit_offset..bit_offset + width].store_le(value);
        Ok(())
    }

    /// Writes `value` into every whole `width`-bit slot of the buffer.
    pub fn fill(&mut self, value: u32, width: usize) -> Result<(), StoreErr> {
        self.fill_range(0, self.slot_count(width), value, width)
    }

    /// Writes `value` into every `width`-bit slot in `[from, to)`.
    ///
    /// Filling with zero clears the underlying bits directly instead of storing
    /// slot by slot.
    pub fn fill_range(
        &mut self,
        from: usize,
        to: usize,
        value: u32,
        width: usize,
    ) -> Result<(), StoreErr> {
        let slots = self.slot_count(width);
        if width > MAX_FIELD_WIDTH || from > to || to > slots {
            return Err(StoreErr::Bounds { index: to, len: slots });
        }
        if width == 0 || from == to {
            return Ok(());
        }
        if value == 0 {
            self.bits[from * width..to * width].fill(false);
            return Ok(());
        }
        debug_assert!(
            width == MAX_FIELD_WIDTH || value < (1 << width),
            "value does not fit a {width}-bit field"
        );
        for slot in from..to {
            self.bits[slot * width..(slot + 1) * width].store_le(value);
        }
        Ok(())
    }

    /// A new buffer of `new_bit_len` bits: the overlapping prefix is carried over
    /// and any new bits take `fill_bit`.
    pub fn resized(&self, new_bit_len: usize, fill_bit: bool) -> BitBuf {
        let mut bits = self.bits.clone();
        bits.resize(new_bit_len, fill_bit);
        BitBuf { bits }
    }

    /// Iterator over every whole `width`-bit slot.
    pub fn slots(&self, width: usize) -> impl Iterator<Item = u32> + '_ {
        (0..self.slot_count(width)).map(move |slot| {
            self.bits[slot * width..(slot + 1) * width].load_le::<u32>()
        })
    }
}

impl Debug for BitBuf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BitBuf({} bits, {} set)", self.bits.len(), self.bits.count_ones())
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn test_field_roundtrip_across_word_boundaries() {
        let mut buf = BitBuf::zeroed(256);
        // straddle the u64 element boundary at bit 64
        for (offset, width, value) in [(0, 1, 1), (3, 7, 97), (60, 9, 388), (127, 32, 0xDEAD_BEEF)]
        {
            buf.store(offset, width, value).unwrap();
            assert_eq!(buf.load(offset, width).unwrap(), value);
        }
        // earlier fields survive later writes
        assert_eq!(buf.load(3, 7).unwrap(), 97);
        assert_eq!(buf.load(60, 9).unwrap(), 388);
    }

    #[test]
    fn test_zero_width_fields() {
        let mut buf = BitBuf::zeroed(8);
        assert_eq!(buf.load(8, 0).unwrap(), 0);
        buf.store(8, 0, 0).unwrap();
        assert_eq!(buf.slot_count(0), 0);
    }

    #[test]
    fn test_bounds() {
        let mut buf = BitBuf::zeroed(16);
        assert_matches!(buf.load(10, 7), Err(StoreErr::Bounds { index: 10, len: 16 }));
        assert_matches!(buf.store(16, 1, 0), Err(StoreErr::Bounds { .. }));
        assert_matches!(buf.load(0, 33), Err(StoreErr::Bounds { .. }));
        assert_matches!(buf.fill_range(3, 2, 0, 4), Err(StoreErr::Bounds { .. }));
        assert_matches!(buf.fill_range(0, 5, 0, 4), Err(StoreErr::Bounds { .. }));
    }

    #[test]
    fn test_fill_broadcasts_slots() {
        let mut buf = BitBuf::zeroed(35);
        buf.fill(0b10110, 5).unwrap();
        assert!(buf.slots(5).eq(std::iter::repeat_n(0b10110, 7)));

        buf.fill(0, 5).unwrap();
        assert_eq!(buf.count_ones(), 0);
    }

    #[test]
    fn test_fill_range() {
        let mut buf = BitBuf::zeroed(24);
        buf.fill_range(2, 6, 0b111, 3).unwrap();
        let slots: Vec<u32> = buf.slots(3).collect();
        assert_eq!(slots, vec![0, 0, 7, 7, 7, 7, 0, 0]);

        buf.fill_range(3, 5, 0, 3).unwrap();
        let slots: Vec<u32> = buf.slots(3).collect();
        assert_eq!(slots, vec![0, 0, 7, 0, 0, 7, 0, 0]);
    }

    #[test]
    fn test_resized_preserves_prefix() {
        let mut buf = BitBuf::zeroed(12);
        buf.store(0, 12, 0xABC).unwrap();

        let grown = buf.resized(64, false);
        assert_eq!(grown.bit_len(), 64);
        assert_eq!(grown.load(0, 12).unwrap(), 0xABC);
        assert_eq!(grown.load(12, 32).unwrap(), 0);

        let grown_ones = buf.resized(16, true);
        assert_eq!(grown_ones.load(0, 16).unwrap(), 0xFABC);

        let shrunk = buf.resized(4, false);
        assert_eq!(shrunk.load(0, 4).unwrap(), 0xC);
    }
}
