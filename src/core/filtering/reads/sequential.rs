use std::marker::PhantomData;

use super::ReadsFilter;
use crate::core::read::AlignedRead;

/// AND-composition of two filters; a read/base must pass both.
#[derive(Debug)]
pub struct SequentialFilter<R: AlignedRead, First: ReadsFilter<R>, Second: ReadsFilter<R>> {
    first: First,
    second: Second,
    phantom: PhantomData<fn() -> R>,
}

// Clone/Copy by hand: the derived impls would demand them from the phantom
// read type as well.
impl<R: AlignedRead, First: ReadsFilter<R> + Clone, Second: ReadsFilter<R> + Clone> Clone
    for SequentialFilter<R, First, Second>
{
    fn clone(&self) -> Self {
        SequentialFilter { first: self.first.clone(), second: self.second.clone(), phantom: Default::default() }
    }
}

impl<R: AlignedRead, First: ReadsFilter<R> + Copy, Second: ReadsFilter<R> + Copy> Copy
    for SequentialFilter<R, First, Second>
{
}

impl<R: AlignedRead, First: ReadsFilter<R>, Second: ReadsFilter<R>> SequentialFilter<R, First, Second> {
    pub fn new(first: First, second: Second) -> Self {
        SequentialFilter { first, second, phantom: Default::default() }
    }
}

impl<R: AlignedRead, First: ReadsFilter<R>, Second: ReadsFilter<R>> ReadsFilter<R>
    for SequentialFilter<R, First, Second>
{
    #[inline]
    fn is_read_ok(&self, record: &R) -> bool {
        self.first.is_read_ok(record) && self.second.is_read_ok(record)
    }

    #[inline]
    fn is_base_ok(&self, record: &R, base: usize) -> bool {
        self.first.is_base_ok(record, base) && self.second.is_base_ok(record, base)
    }
}
