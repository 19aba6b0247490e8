use crate::StoreErr;

/// Read half of the element-access contract shared by every store variant and the
/// absence overlay.
pub trait StoreRead {
    /// The logical element type surfaced by this store.
    type Elem;

    /// the number of elements in the store
    fn len(&self) -> usize;

    /// returns true if the store holds no elements
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// the exclusive upper bound of the value domain `[0, range)`
    fn range(&self) -> u32;

    /// returns the value at `index`
    fn get(&self, index: usize) -> Result<Self::Elem, StoreErr>;

    /// returns an iterator over all values in index order
    fn iter(&self) -> impl Iterator<Item = Self::Elem>;
}

/// Write half of the element-access contract.
///
/// Implementations reject out-of-range values and bad indexes without touching the
/// store; a failed call never partially applies.
pub trait StoreWrite: StoreRead {
    /// Replaces the value at `index`, returning the previous value.
    fn set(&mut self, index: usize, value: Self::Elem) -> Result<Self::Elem, StoreErr>;

    /// Writes `value` into every element.
    fn fill(&mut self, value: Self::Elem) -> Result<(), StoreErr>;

    /// Writes `value` into every element in `[from, to)`.
    fn fill_range(&mut self, from: usize, to: usize, value: Self::Elem) -> Result<(), StoreErr>;

    /// Swaps the values at `i` and `j` in place.
    ///
    /// `i == j` leaves the store unchanged but still performs the same bounds and
    /// mutability checks as [`StoreWrite::set`].
    fn transpose(&mut self, i: usize, j: usize) -> Result<(), StoreErr> {
        let vi = self.get(i)?;
        let vj = self.get(j)?;
        self.set(i, vj)?;
        self.set(j, vi)?;
        Ok(())
    }
}

/// Boxing-free numeric access to a store's raw integer domain.
///
/// This is an optional capability a caller holding only the generic element-access
/// contract may additionally require. Every store variant and the absence overlay
/// implement it natively; no adapter object is ever allocated.
pub trait IntAccess {
    /// returns true if `index` holds a present integer value
    fn is_int(&self, index: usize) -> bool;

    /// Reads the value at `index` as a raw integer.
    ///
    /// Reading an absent slot fails with [`StoreErr::NotPresent`]; it is never a
    /// defaulted read.
    fn get_int(&self, index: usize) -> Result<i32, StoreErr>;

    /// Writes a raw integer value at `index`.
    ///
    /// Negative values fail with [`StoreErr::Range`].
    fn set_int(&mut self, index: usize, value: i32) -> Result<(), StoreErr>;
}

/// Implements [`IntAccess`] directly on a store whose element type is `u32`.
macro_rules! impl_int_access {
    ($($ty:ty),+) => {$(
        impl $crate::traits::IntAccess for $ty {
            fn is_int(&self, index: usize) -> bool {
                index < $crate::traits::StoreRead::len(self)
            }

            fn get_int(&self, index: usize) -> Result<i32, $crate::StoreErr> {
                let value = self.get(index)?;
                i32::try_from(value).map_err(|_| $crate::StoreErr::Range {
                    value: i64::from(value),
                    range: self.range(),
                })
            }

            fn set_int(&mut self, index: usize, value: i32) -> Result<(), $crate::StoreErr> {
                let value = u32::try_from(value).map_err(|_| $crate::StoreErr::Range {
                    value: i64::from(value),
                    range: self.range(),
                })?;
                self.set(index, value)?;
                Ok(())
            }
        }
    )+};
}

pub(crate) use impl_int_access;
