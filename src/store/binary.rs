use std::fmt::{self, Debug};

use crate::{
    StoreErr,
    bitbuf::BitBuf,
    store::{check_span, check_value},
    traits::{StoreRead, StoreWrite, impl_int_access},
};

/// Store for `range = 2`: one bit per element.
#[derive(Clone, PartialEq, Eq, Default)]
pub struct BinaryStore {
    len: usize,
    buf: BitBuf,
}

impl BinaryStore {
    pub fn new(len: usize) -> Self {
        Self { len, buf: BitBuf::zeroed(len) }
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

impl Debug for BinaryStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BinaryStore({})", self.len)
    }
}

impl StoreRead for BinaryStore {
    type Elem = u32;

    fn len(&self) -> usize {
        self.len
    }

    fn range(&self) -> u32 {
        2
    }

    fn get(&self, index: usize) -> Result<u32, StoreErr> {
        self.check_index(index)?;
        self.buf.load(index, 1)
    }

    fn iter(&self) -> impl Iterator<Item = u32> {
        self.buf.slots(1)
    }
}

impl StoreWrite for BinaryStore {
    fn set(&mut self, index: usize, value: u32) -> Result<u32, StoreErr> {
        self.check_index(index)?;
        check_value(value, 2)?;
        let prev = self.buf.load(index, 1)?;
        self.buf.store(index, 1, value)?;
        Ok(prev)
    }

    fn fill(&mut self, value: u32) -> Result<(), StoreErr> {
        check_value(value, 2)?;
        self.buf.fill(value, 1)
    }

    fn fill_range(&mut self, from: usize, to: usize, value: u32) -> Result<(), StoreErr> {
        check_span(from, to, self.len)?;
        check_value(value, 2)?;
        self.buf.fill_range(from, to, value, 1)
    }
}

impl_int_access!(BinaryStore);
