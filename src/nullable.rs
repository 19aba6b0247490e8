use std::fmt::{self, Debug};

use either::Either;

use crate::{
    StoreErr,
    bitbuf::BitBuf,
    store::{IntStore, StoreKind, check_span, check_value},
    traits::{IntAccess, StoreRead, StoreWrite},
};

/// Adds an "absent" state on top of a bounded-integer store.
///
/// For `range >= 2` the overlay exclusively owns an inner [`IntStore`] of range
/// `range + 1`: raw `0` is reserved as the absence code and a present value `v`
/// is stored as `v + 1`. A `range = 1` store carries no information beyond
/// presence itself, so the overlay degenerates to one presence bit per element.
///
/// # Examples
///
/// ```
/// use packlet_rs::{NullableStore, StoreRead, StoreWrite};
///
/// let mut store = NullableStore::with_range(10, 2)?;
/// assert!(store.is_absent(3)?);
///
/// store.set(3, Some(1))?;
/// assert_eq!(store.get(3)?, Some(1));
///
/// store.set(3, None)?;
/// assert!(store.is_absent(3)?);
/// assert_eq!(store.population(), 0);
/// # Ok::<(), packlet_rs::StoreErr>(())
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct NullableStore {
    range: u32,
    repr: NullableRepr,
}

#[derive(Clone, PartialEq, Eq)]
enum NullableRepr {
    Presence(PresenceStore),
    Shifted(IntStore),
}

/// Bit-per-element presence buffer backing the `range = 1` overlay.
#[derive(Clone)]
struct PresenceStore {
    len: usize,
    mutable: bool,
    bits: BitBuf,
}

impl PresenceStore {
    fn new(len: usize) -> Self {
        Self { len, mutable: true, bits: BitBuf::zeroed(len) }
    }

    fn check_index(&self, index: usize) -> Result<(), StoreErr> {
        if index >= self.len {
            return Err(StoreErr::Bounds { index, len: self.len });
        }
        Ok(())
    }

    fn check_mutable(&self) -> Result<(), StoreErr> {
        if !self.mutable {
            return Err(StoreErr::Immutable);
        }
        Ok(())
    }

    fn present(&self, index: usize) -> Result<bool, StoreErr> {
        self.check_index(index)?;
        Ok(self.bits.load(index, 1)? != 0)
    }

    fn set_present(&mut self, index: usize, present: bool) -> Result<bool, StoreErr> {
        self.check_mutable()?;
        let prev = self.present(index)?;
        self.bits.store(index, 1, u32::from(present))?;
        Ok(prev)
    }

    fn fill_present(&mut self, from: usize, to: usize, present: bool) -> Result<(), StoreErr> {
        self.check_mutable()?;
        check_span(from, to, self.len)?;
        self.bits.fill_range(from, to, u32::from(present), 1)
    }
}

/// Equality over `(len, presence bits)`; handle mutability is not compared.
impl PartialEq for PresenceStore {
    fn eq(&self, other: &Self) -> bool {
        self.len == other.len && self.bits == other.bits
    }
}

impl Eq for PresenceStore {}

impl NullableStore {
    /// An all-absent mutable overlay of `len` slots over the value domain
    /// `[0, range)`.
    pub fn with_range(len: usize, range: u32) -> Result<Self, StoreErr> {
        let repr = match range {
            0 => return Err(StoreErr::Construction("range must be at least 1")),
            1 => NullableRepr::Presence(PresenceStore::new(len)),
            _ => {
                let inner_range = range
                    .checked_add(1)
                    .ok_or(StoreErr::Construction("range too large to reserve an absence code"))?;
                NullableRepr::Shifted(IntStore::with_range(len, inner_range)?)
            }
        };
        Ok(Self { range, repr })
    }

    /// The encoding of the inner store, or `None` for the `range = 1` overlay,
    /// which is backed by a plain presence buffer instead.
    pub fn kind(&self) -> Option<StoreKind> {
        match &self.repr {
            NullableRepr::Presence(_) => None,
            NullableRepr::Shifted(inner) => Some(inner.kind()),
        }
    }

    pub fn is_mutable(&self) -> bool {
        match &self.repr {
            NullableRepr::Presence(presence) => presence.mutable,
            NullableRepr::Shifted(inner) => inner.is_mutable(),
        }
    }

    /// the size of the backing buffer in bits
    pub fn bit_len(&self) -> usize {
        match &self.repr {
            NullableRepr::Presence(presence) => presence.bits.bit_len(),
            NullableRepr::Shifted(inner) => inner.bit_len(),
        }
    }

    /// returns true when no value is present at `index`
    pub fn is_absent(&self, index: usize) -> Result<bool, StoreErr> {
        Ok(self.get(index)?.is_none())
    }

    /// the number of present slots
    pub fn population(&self) -> usize {
        match &self.repr {
            NullableRepr::Presence(presence) => presence.bits.count_ones(),
            NullableRepr::Shifted(inner) => inner.iter().filter(|&raw| raw != 0).count(),
        }
    }

    /// Sets every slot to absent.
    pub fn clear(&mut self) -> Result<(), StoreErr> {
        let len = self.len();
        match &mut self.repr {
            NullableRepr::Presence(presence) => presence.fill_present(0, len, false),
            NullableRepr::Shifted(inner) => inner.fill(0),
        }
    }

    /// A deep copy backed by a fresh buffer, writable regardless of this
    /// handle's mutability.
    pub fn mutable_copy(&self) -> NullableStore {
        let repr = match &self.repr {
            NullableRepr::Presence(presence) => {
                NullableRepr::Presence(PresenceStore { mutable: true, ..presence.clone() })
            }
            NullableRepr::Shifted(inner) => NullableRepr::Shifted(inner.mutable_copy()),
        };
        Self { range: self.range, repr }
    }

    /// A deep immutable snapshot; writes through it fail with
    /// [`StoreErr::Immutable`].
    pub fn immutable_copy(&self) -> NullableStore {
        let repr = match &self.repr {
            NullableRepr::Presence(presence) => {
                NullableRepr::Presence(PresenceStore { mutable: false, ..presence.clone() })
            }
            NullableRepr::Shifted(inner) => NullableRepr::Shifted(inner.immutable_copy()),
        };
        Self { range: self.range, repr }
    }

    /// A borrowed read-only view; writes are absent at the type level.
    pub fn immutable_view(&self) -> NullableView<'_> {
        NullableView { store: self }
    }

    /// A new independent, mutable overlay of `new_len` slots: the overlapping
    /// prefix carries over and new trailing slots are absent.
    ///
    /// An overlay always has a fill for new slots, so resizing cannot fail
    /// with [`StoreErr::Unresizable`].
    pub fn resized_copy(&self, new_len: usize) -> Result<NullableStore, StoreErr> {
        let repr = match &self.repr {
            NullableRepr::Presence(presence) => NullableRepr::Presence(PresenceStore {
                len: new_len,
                mutable: true,
                bits: presence.bits.resized(new_len, false),
            }),
            NullableRepr::Shifted(inner) => {
                NullableRepr::Shifted(inner.resized_copy(new_len, Some(0))?)
            }
        };
        Ok(Self { range: self.range, repr })
    }
}

impl Debug for NullableStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "NullableStore(range {}, {}/{} present)",
            self.range,
            self.population(),
            self.len()
        )
    }
}

impl StoreRead for NullableStore {
    type Elem = Option<u32>;

    fn len(&self) -> usize {
        match &self.repr {
            NullableRepr::Presence(presence) => presence.len,
            NullableRepr::Shifted(inner) => inner.len(),
        }
    }

    fn range(&self) -> u32 {
        self.range
    }

    fn get(&self, index: usize) -> Result<Option<u32>, StoreErr> {
        match &self.repr {
            NullableRepr::Presence(presence) => Ok(presence.present(index)?.then_some(0)),
            NullableRepr::Shifted(inner) => Ok(inner.get(index)?.checked_sub(1)),
        }
    }

    fn iter(&self) -> impl Iterator<Item = Option<u32>> {
        match &self.repr {
            NullableRepr::Presence(presence) => {
                Either::Left(presence.bits.slots(1).map(|bit| (bit != 0).then_some(0)))
            }
            NullableRepr::Shifted(inner) => {
                Either::Right(inner.iter().map(|raw| raw.checked_sub(1)))
            }
        }
    }
}

impl StoreWrite for NullableStore {
    fn set(&mut self, index: usize, value: Option<u32>) -> Result<Option<u32>, StoreErr> {
        if let Some(value) = value {
            check_value(value, self.range)?;
        }
        match &mut self.repr {
            NullableRepr::Presence(presence) => {
                let prev = presence.set_present(index, value.is_some())?;
                Ok(prev.then_some(0))
            }
            NullableRepr::Shifted(inner) => {
                let raw = value.map_or(0, |value| value + 1);
                Ok(inner.set(index, raw)?.checked_sub(1))
            }
        }
    }

    fn fill(&mut self, value: Option<u32>) -> Result<(), StoreErr> {
        self.fill_range(0, self.len(), value)
    }

    fn fill_range(&mut self, from: usize, to: usize, value: Option<u32>) -> Result<(), StoreErr> {
        if let Some(value) = value {
            check_value(value, self.range)?;
        }
        match &mut self.repr {
            NullableRepr::Presence(presence) => presence.fill_present(from, to, value.is_some()),
            NullableRepr::Shifted(inner) => {
                inner.fill_range(from, to, value.map_or(0, |value| value + 1))
            }
        }
    }
}

impl IntAccess for NullableStore {
    fn is_int(&self, index: usize) -> bool {
        matches!(self.get(index), Ok(Some(_)))
    }

    fn get_int(&self, index: usize) -> Result<i32, StoreErr> {
        match self.get(index)? {
            None => Err(StoreErr::NotPresent { index }),
            Some(value) => i32::try_from(value).map_err(|_| StoreErr::Range {
                value: i64::from(value),
                range: self.range,
            }),
        }
    }

    fn set_int(&mut self, index: usize, value: i32) -> Result<(), StoreErr> {
        let value = u32::try_from(value).map_err(|_| StoreErr::Range {
            value: i64::from(value),
            range: self.range,
        })?;
        self.set(index, Some(value))?;
        Ok(())
    }
}

/// A borrowed, read-only handle over a [`NullableStore`].
#[derive(Clone, Copy)]
pub struct NullableView<'a> {
    store: &'a NullableStore,
}

impl NullableView<'_> {
    pub fn is_absent(&self, index: usize) -> Result<bool, StoreErr> {
        self.store.is_absent(index)
    }

    pub fn population(&self) -> usize {
        self.store.population()
    }

    pub fn is_int(&self, index: usize) -> bool {
        self.store.is_int(index)
    }

    pub fn get_int(&self, index: usize) -> Result<i32, StoreErr> {
        self.store.get_int(index)
    }
}

impl Debug for NullableView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NullableView({:?})", self.store)
    }
}

impl StoreRead for NullableView<'_> {
    type Elem = Option<u32>;

    fn len(&self) -> usize {
        self.store.len()
    }

    fn range(&self) -> u32 {
        self.store.range()
    }

    fn get(&self, index: usize) -> Result<Option<u32>, StoreErr> {
        self.store.get(index)
    }

    fn iter(&self) -> impl Iterator<Item = Option<u32>> {
        self.store.iter()
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn test_presence_bit_pattern() {
        let mut store = NullableStore::with_range(10, 1).unwrap();
        assert_eq!(store.kind(), None);
        for index in [0, 3, 6] {
            assert_eq!(store.set(index, Some(0)).unwrap(), None);
        }

        let mut word = 0u16;
        for index in 0..10 {
            if !store.is_absent(index).unwrap() {
                word |= 1 << index;
            }
        }
        assert_eq!(format!("{word:010b}"), "0001001001");
        assert_eq!(store.population(), 3);
        assert_eq!(store.bit_len(), 10);
    }

    #[test]
    fn test_presence_store_checks() {
        let mut store = NullableStore::with_range(4, 1).unwrap();
        assert_matches!(store.set(4, None), Err(StoreErr::Bounds { index: 4, len: 4 }));
        assert_matches!(store.set(0, Some(1)), Err(StoreErr::Range { value: 1, range: 1 }));

        store.set(2, Some(0)).unwrap();
        assert_eq!(store.set(2, None).unwrap(), Some(0));
        assert!(store.is_absent(2).unwrap());
    }

    #[test]
    fn test_shifted_over_ternary() {
        // range 2 with nulls rides a range-3 inner store, which is ternary
        let mut store = NullableStore::with_range(8, 2).unwrap();
        assert_eq!(store.kind(), Some(StoreKind::Ternary));

        assert_eq!(store.set(5, None).unwrap(), None);
        assert_eq!(store.get(5).unwrap(), None);

        assert_eq!(store.set(5, Some(1)).unwrap(), None);
        assert_eq!(store.get(5).unwrap(), Some(1));
        assert!(!store.is_absent(5).unwrap());

        assert_eq!(store.set(5, None).unwrap(), Some(1));
        assert!(store.is_absent(5).unwrap());
    }

    #[test]
    fn test_logical_range_is_enforced() {
        // the inner store accepts [0, 3); the overlay must still reject 2
        let mut store = NullableStore::with_range(4, 2).unwrap();
        assert_matches!(store.set(0, Some(2)), Err(StoreErr::Range { value: 2, range: 2 }));
        assert_matches!(store.fill(Some(2)), Err(StoreErr::Range { value: 2, range: 2 }));
    }

    #[test]
    fn test_clear_and_fill() {
        let mut store = NullableStore::with_range(7, 5).unwrap();
        store.fill(Some(4)).unwrap();
        assert_eq!(store.population(), 7);
        itertools::assert_equal(store.iter(), std::iter::repeat_n(Some(4), 7));

        store.clear().unwrap();
        assert_eq!(store.population(), 0);
        assert!(store.iter().all(|value| value.is_none()));

        store.fill_range(2, 5, Some(0)).unwrap();
        itertools::assert_equal(
            store.iter(),
            [None, None, Some(0), Some(0), Some(0), None, None],
        );
    }

    #[test]
    fn test_int_access() {
        let mut store = NullableStore::with_range(5, 100).unwrap();
        assert!(!store.is_int(1));
        assert_matches!(store.get_int(1), Err(StoreErr::NotPresent { index: 1 }));

        store.set_int(1, 42).unwrap();
        assert!(store.is_int(1));
        assert_eq!(store.get_int(1).unwrap(), 42);

        assert_matches!(store.set_int(1, -3), Err(StoreErr::Range { value: -3, range: 100 }));
        assert_matches!(store.set_int(1, 100), Err(StoreErr::Range { value: 100, range: 100 }));
        assert_eq!(store.get_int(1).unwrap(), 42);
    }

    #[test]
    fn test_transpose() {
        let mut store = NullableStore::with_range(6, 3).unwrap();
        store.set(1, Some(2)).unwrap();

        store.transpose(1, 4).unwrap();
        assert_eq!(store.get(1).unwrap(), None);
        assert_eq!(store.get(4).unwrap(), Some(2));

        store.transpose(1, 4).unwrap();
        assert_eq!(store.get(1).unwrap(), Some(2));
        assert_eq!(store.get(4).unwrap(), None);
    }

    #[test]
    fn test_resized_copy() {
        let mut store = NullableStore::with_range(4, 9).unwrap();
        store.set(0, Some(8)).unwrap();
        store.set(2, Some(3)).unwrap();

        let grown = store.resized_copy(7).unwrap();
        itertools::assert_equal(
            grown.iter(),
            [Some(8), None, Some(3), None, None, None, None],
        );

        let shrunk = store.resized_copy(2).unwrap();
        itertools::assert_equal(shrunk.iter(), [Some(8), None]);

        // the range = 1 overlay resizes through its presence buffer
        let mut presence = NullableStore::with_range(3, 1).unwrap();
        presence.set(1, Some(0)).unwrap();
        let grown = presence.resized_copy(5).unwrap();
        itertools::assert_equal(grown.iter(), [None, Some(0), None, None, None]);
    }

    #[test]
    fn test_immutability() {
        for range in [1u32, 2, 7] {
            let mut store = NullableStore::with_range(5, range).unwrap();
            store.set(1, Some(0)).unwrap();

            let mut frozen = store.immutable_copy();
            assert!(!frozen.is_mutable());
            assert_matches!(frozen.set(0, Some(0)), Err(StoreErr::Immutable));
            assert_matches!(frozen.set(0, None), Err(StoreErr::Immutable));
            assert_matches!(frozen.fill(None), Err(StoreErr::Immutable));
            assert_matches!(frozen.clear(), Err(StoreErr::Immutable));
            assert_matches!(frozen.transpose(0, 0), Err(StoreErr::Immutable));
            assert_eq!(frozen.get(1).unwrap(), Some(0));
            assert_eq!(frozen, store);

            assert!(frozen.mutable_copy().is_mutable());
        }
    }

    #[test]
    fn test_view() {
        let mut store = NullableStore::with_range(4, 2).unwrap();
        store.set(3, Some(1)).unwrap();

        let view = store.immutable_view();
        assert_eq!(view.len(), 4);
        assert_eq!(view.range(), 2);
        assert!(view.is_absent(0).unwrap());
        assert_eq!(view.get(3).unwrap(), Some(1));
        assert_eq!(view.get_int(3).unwrap(), 1);
        assert_eq!(view.population(), 1);
    }

    #[test]
    fn test_range_overflow_rejected() {
        assert_matches!(NullableStore::with_range(2, 0), Err(StoreErr::Construction(_)));
        assert_matches!(
            NullableStore::with_range(2, u32::MAX),
            Err(StoreErr::Construction(_))
        );
    }
}
