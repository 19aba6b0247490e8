use std::fmt::{self, Debug};

use crate::{
    StoreErr,
    store::{
        arbitrary::ArbitraryStore, binary::BinaryStore, quinary::QuinaryStore,
        ternary::TernaryStore, unary::UnaryStore,
    },
    traits::{StoreRead, StoreWrite, impl_int_access},
};

pub mod arbitrary;
pub mod binary;
pub mod quinary;
pub mod ternary;
pub mod unary;

/// The encoding selected for a store's declared value range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKind {
    Unary,
    Binary,
    Ternary,
    Quinary,
    Arbitrary,
}

impl StoreKind {
    /// Picks the encoding for the value domain `[0, range)`.
    ///
    /// Range 4 falls through to the arbitrary-width path: 2 bits per element is
    /// already exact, so there is no mixed-radix trick to play.
    pub fn for_range(range: u32) -> StoreKind {
        debug_assert!(range >= 1, "range must be at least 1");
        match range {
            1 => StoreKind::Unary,
            2 => StoreKind::Binary,
            3 => StoreKind::Ternary,
            5 => StoreKind::Quinary,
            _ => StoreKind::Arbitrary,
        }
    }
}

pub(crate) fn check_value(value: u32, range: u32) -> Result<(), StoreErr> {
    if value >= range {
        return Err(StoreErr::Range { value: i64::from(value), range });
    }
    Ok(())
}

pub(crate) fn check_span(from: usize, to: usize, len: usize) -> Result<(), StoreErr> {
    if from > to || to > len {
        return Err(StoreErr::Bounds { index: to, len });
    }
    Ok(())
}

#[derive(Clone, PartialEq, Eq)]
enum Repr {
    Unary(UnaryStore),
    Binary(BinaryStore),
    Ternary(TernaryStore),
    Quinary(QuinaryStore),
    Arbitrary(ArbitraryStore),
}

impl Repr {
    fn zeroed(len: usize, range: u32) -> Result<Repr, StoreErr> {
        if range == 0 {
            return Err(StoreErr::Construction("range must be at least 1"));
        }
        Ok(match StoreKind::for_range(range) {
            StoreKind::Unary => Repr::Unary(UnaryStore::new(len)),
            StoreKind::Binary => Repr::Binary(BinaryStore::new(len)),
            StoreKind::Ternary => Repr::Ternary(TernaryStore::new(len)),
            StoreKind::Quinary => Repr::Quinary(QuinaryStore::new(len)),
            StoreKind::Arbitrary => Repr::Arbitrary(ArbitraryStore::new(len, range)),
        })
    }

    fn kind(&self) -> StoreKind {
        match self {
            Repr::Unary(_) => StoreKind::Unary,
            Repr::Binary(_) => StoreKind::Binary,
            Repr::Ternary(_) => StoreKind::Ternary,
            Repr::Quinary(_) => StoreKind::Quinary,
            Repr::Arbitrary(_) => StoreKind::Arbitrary,
        }
    }

    fn bit_len(&self) -> usize {
        match self {
            Repr::Unary(store) => store.bit_len(),
            Repr::Binary(store) => store.bit_len(),
            Repr::Ternary(store) => store.bit_len(),
            Repr::Quinary(store) => store.bit_len(),
            Repr::Arbitrary(store) => store.bit_len(),
        }
    }
}

impl Debug for Repr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Repr::Unary(store) => store.fmt(f),
            Repr::Binary(store) => store.fmt(f),
            Repr::Ternary(store) => store.fmt(f),
            Repr::Quinary(store) => store.fmt(f),
            Repr::Arbitrary(store) => store.fmt(f),
        }
    }
}

impl StoreRead for Repr {
    type Elem = u32;

    fn len(&self) -> usize {
        match self {
            Repr::Unary(store) => store.len(),
            Repr::Binary(store) => store.len(),
            Repr::Ternary(store) => store.len(),
            Repr::Quinary(store) => store.len(),
            Repr::Arbitrary(store) => store.len(),
        }
    }

    fn range(&self) -> u32 {
        match self {
            Repr::Unary(store) => store.range(),
            Repr::Binary(store) => store.range(),
            Repr::Ternary(store) => store.range(),
            Repr::Quinary(store) => store.range(),
            Repr::Arbitrary(store) => store.range(),
        }
    }

    fn get(&self, index: usize) -> Result<u32, StoreErr> {
        match self {
            Repr::Unary(store) => store.get(index),
            Repr::Binary(store) => store.get(index),
            Repr::Ternary(store) => store.get(index),
            Repr::Quinary(store) => store.get(index),
            Repr::Arbitrary(store) => store.get(index),
        }
    }

    fn iter(&self) -> impl Iterator<Item = u32> {
        match self {
            Repr::Unary(store) => Iter::Unary(store.iter()),
            Repr::Binary(store) => Iter::Binary(store.iter()),
            Repr::Ternary(store) => Iter::Ternary(store.iter()),
            Repr::Quinary(store) => Iter::Quinary(store.iter()),
            Repr::Arbitrary(store) => Iter::Arbitrary(store.iter()),
        }
    }
}

impl StoreWrite for Repr {
    fn set(&mut self, index: usize, value: u32) -> Result<u32, StoreErr> {
        match self {
            Repr::Unary(store) => store.set(index, value),
            Repr::Binary(store) => store.set(index, value),
            Repr::Ternary(store) => store.set(index, value),
            Repr::Quinary(store) => store.set(index, value),
            Repr::Arbitrary(store) => store.set(index, value),
        }
    }

    fn fill(&mut self, value: u32) -> Result<(), StoreErr> {
        match self {
            Repr::Unary(store) => store.fill(value),
            Repr::Binary(store) => store.fill(value),
            Repr::Ternary(store) => store.fill(value),
            Repr::Quinary(store) => store.fill(value),
            Repr::Arbitrary(store) => store.fill(value),
        }
    }

    fn fill_range(&mut self, from: usize, to: usize, value: u32) -> Result<(), StoreErr> {
        match self {
            Repr::Unary(store) => store.fill_range(from, to, value),
            Repr::Binary(store) => store.fill_range(from, to, value),
            Repr::Ternary(store) => store.fill_range(from, to, value),
            Repr::Quinary(store) => store.fill_range(from, to, value),
            Repr::Arbitrary(store) => store.fill_range(from, to, value),
        }
    }
}

enum Iter<UI, BI, TI, QI, AI> {
    Unary(UI),
    Binary(BI),
    Ternary(TI),
    Quinary(QI),
    Arbitrary(AI),
}

impl<T, UI, BI, TI, QI, AI> Iterator for Iter<UI, BI, TI, QI, AI>
where
    UI: Iterator<Item = T>,
    BI: Iterator<Item = T>,
    TI: Iterator<Item = T>,
    QI: Iterator<Item = T>,
    AI: Iterator<Item = T>,
{
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        match self {
            Iter::Unary(iter) => iter.next(),
            Iter::Binary(iter) => iter.next(),
            Iter::Ternary(iter) => iter.next(),
            Iter::Quinary(iter) => iter.next(),
            Iter::Arbitrary(iter) => iter.next(),
        }
    }
}

/// A compact fixed-size store for integers in a declared range `[0, range)`.
///
/// The encoding is selected once at construction from the range (see
/// [`StoreKind::for_range`]) and never changes for the lifetime of the store.
/// Every element decodes to a value in `[0, range)`.
///
/// # Examples
///
/// ```
/// use packlet_rs::{IntStore, StoreKind, StoreRead, StoreWrite};
///
/// let mut store = IntStore::with_range(23, 3)?;
/// assert_eq!(store.kind(), StoreKind::Ternary);
///
/// store.set(7, 2)?;
/// assert_eq!(store.get(7)?, 2);
/// assert_eq!(store.len(), 23);
///
/// // five elements per byte
/// assert_eq!(store.bit_len(), 40);
/// # Ok::<(), packlet_rs::StoreErr>(())
/// ```
///
/// Out-of-range values are rejected without touching the store:
///
/// ```
/// use packlet_rs::{IntStore, StoreErr, StoreRead, StoreWrite};
///
/// let mut store = IntStore::with_range(4, 200)?;
/// assert_eq!(store.set(0, 199)?, 0);
/// assert_eq!(store.set(0, 200), Err(StoreErr::Range { value: 200, range: 200 }));
/// assert_eq!(store.get(0)?, 199);
/// # Ok::<(), packlet_rs::StoreErr>(())
/// ```
#[derive(Clone)]
pub struct IntStore {
    mutable: bool,
    repr: Repr,
}

impl IntStore {
    /// An all-zero mutable store of `len` elements over `[0, range)`.
    pub fn with_range(len: usize, range: u32) -> Result<Self, StoreErr> {
        Ok(Self { mutable: true, repr: Repr::zeroed(len, range)? })
    }

    /// A mutable store of `len` elements, every one set to `value`.
    pub fn filled(len: usize, range: u32, value: u32) -> Result<Self, StoreErr> {
        let mut store = Self::with_range(len, range)?;
        store.fill(value)?;
        Ok(store)
    }

    /// Builds a store sized and populated from `values`.
    pub fn from_values<I>(range: u32, values: I) -> Result<Self, StoreErr>
    where
        I: IntoIterator<Item = u32>,
    {
        let values: Vec<u32> = values.into_iter().collect();
        let mut store = Self::with_range(values.len(), range)?;
        for (index, value) in values.into_iter().enumerate() {
            store.set(index, value)?;
        }
        Ok(store)
    }

    pub fn kind(&self) -> StoreKind {
        self.repr.kind()
    }

    /// the size of the backing buffer in bits
    pub fn bit_len(&self) -> usize {
        self.repr.bit_len()
    }

    pub fn is_mutable(&self) -> bool {
        self.mutable
    }

    /// A deep copy backed by a fresh buffer, writable regardless of this
    /// handle's mutability.
    pub fn mutable_copy(&self) -> IntStore {
        IntStore { mutable: true, repr: self.repr.clone() }
    }

    /// A deep immutable snapshot; writes through it fail with
    /// [`StoreErr::Immutable`].
    pub fn immutable_copy(&self) -> IntStore {
        IntStore { mutable: false, repr: self.repr.clone() }
    }

    /// A borrowed read-only view.
    ///
    /// The write surface is absent from the view type itself, so immutability
    /// is enforced at compile time rather than by a runtime flag. A view
    /// created after a mutation observes it; holding a view borrows the store
    /// and keeps mutation away for the view's lifetime.
    pub fn immutable_view(&self) -> StoreView<'_> {
        StoreView { store: self }
    }

    /// A new independent, mutable store of `new_len` elements: the overlapping
    /// prefix carries over and new trailing slots take `default`.
    ///
    /// Growing without a default fails with [`StoreErr::Unresizable`].
    pub fn resized_copy(&self, new_len: usize, default: Option<u32>) -> Result<IntStore, StoreErr> {
        if let Some(default) = default {
            check_value(default, self.range())?;
        }
        let len = self.len();
        if new_len > len && default.is_none() {
            return Err(StoreErr::Unresizable);
        }
        let mut repr = Repr::zeroed(new_len, self.range())?;
        for index in 0..len.min(new_len) {
            repr.set(index, self.repr.get(index)?)?;
        }
        if let (Some(default), true) = (default, new_len > len) {
            repr.fill_range(len, new_len, default)?;
        }
        Ok(IntStore { mutable: true, repr })
    }

    fn check_mutable(&self) -> Result<(), StoreErr> {
        if !self.mutable {
            return Err(StoreErr::Immutable);
        }
        Ok(())
    }
}

impl Debug for IntStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.mutable {
            self.repr.fmt(f)
        } else {
            write!(f, "{:?} (immutable)", self.repr)
        }
    }
}

/// Equality over `(kind, len, values)`; mutability of the handles is not part
/// of the comparison.
impl PartialEq for IntStore {
    fn eq(&self, other: &Self) -> bool {
        self.repr == other.repr
    }
}

impl Eq for IntStore {}

impl StoreRead for IntStore {
    type Elem = u32;

    fn len(&self) -> usize {
        self.repr.len()
    }

    fn range(&self) -> u32 {
        self.repr.range()
    }

    fn get(&self, index: usize) -> Result<u32, StoreErr> {
        self.repr.get(index)
    }

    fn iter(&self) -> impl Iterator<Item = u32> {
        self.repr.iter()
    }
}

impl StoreWrite for IntStore {
    fn set(&mut self, index: usize, value: u32) -> Result<u32, StoreErr> {
        self.check_mutable()?;
        self.repr.set(index, value)
    }

    fn fill(&mut self, value: u32) -> Result<(), StoreErr> {
        self.check_mutable()?;
        self.repr.fill(value)
    }

    fn fill_range(&mut self, from: usize, to: usize, value: u32) -> Result<(), StoreErr> {
        self.check_mutable()?;
        self.repr.fill_range(from, to, value)
    }
}

impl_int_access!(IntStore);

/// A borrowed, read-only handle over an [`IntStore`].
///
/// There is no write surface to misuse: the type system stands in for the
/// runtime mutability flag.
#[derive(Clone, Copy)]
pub struct StoreView<'a> {
    store: &'a IntStore,
}

impl StoreView<'_> {
    pub fn kind(&self) -> StoreKind {
        self.store.kind()
    }

    pub fn is_int(&self, index: usize) -> bool {
        use crate::traits::IntAccess;
        self.store.is_int(index)
    }

    pub fn get_int(&self, index: usize) -> Result<i32, StoreErr> {
        use crate::traits::IntAccess;
        self.store.get_int(index)
    }
}

impl Debug for StoreView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StoreView({:?})", self.store)
    }
}

impl StoreRead for StoreView<'_> {
    type Elem = u32;

    fn len(&self) -> usize {
        self.store.len()
    }

    fn range(&self) -> u32 {
        self.store.range()
    }

    fn get(&self, index: usize) -> Result<u32, StoreErr> {
        self.store.get(index)
    }

    fn iter(&self) -> impl Iterator<Item = u32> {
        self.store.iter()
    }
}
