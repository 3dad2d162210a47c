use std::marker::PhantomData;

use super::list::Mutations;
use super::mutation::Mutation;
use crate::error::{invalid, Result};
use crate::traits::BioSequence;

/// Collects mutations in position order and freezes them.
///
/// A reversed builder accepts positions in descending order (as produced by
/// a traceback) and flips them on [`MutationsBuilder::build`].
#[derive(Clone, Debug)]
pub struct MutationsBuilder<S: BioSequence> {
    data: Vec<Mutation>,
    reversed: bool,
    _kind: PhantomData<S>,
}

impl<S: BioSequence> Default for MutationsBuilder<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: BioSequence> MutationsBuilder<S> {
    /// Builder expecting ascending positions.
    pub fn new() -> Self {
        Self {
            data: Vec::new(),
            reversed: false,
            _kind: PhantomData,
        }
    }

    /// Builder expecting descending positions.
    pub fn reversed() -> Self {
        Self {
            reversed: true,
            ..Self::new()
        }
    }

    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.data.reserve(capacity);
        self
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn is_reversed(&self) -> bool {
        self.reversed
    }

    fn out_of_order(&self, m: Mutation) -> bool {
        match self.data.last() {
            Some(&last) if self.reversed => !super::in_order(m, last),
            Some(&last) => !super::in_order(last, m),
            None => false,
        }
    }

    /// Adds `m`, rejecting it when it breaks the list order or does not fit
    /// the alphabet.
    pub fn append(mut self, m: Mutation) -> Result<Self> {
        if self.out_of_order(m) {
            return invalid(format!(
                "mutation at {} appended out of {} order",
                m.position(),
                if self.reversed { "descending" } else { "ascending" }
            ));
        }
        let size = S::alphabet().size() as u8;
        if (!m.is_insertion() && m.from_letter() >= size) || (!m.is_deletion() && m.to_letter() >= size) {
            return invalid(format!("{m:?} does not fit the {} alphabet", S::alphabet()));
        }
        self.data.push(m);
        Ok(self)
    }

    pub fn append_substitution(self, position: i32, from: u8, to: u8) -> Result<Self> {
        self.append(Mutation::substitution(position, from, to))
    }

    pub fn append_deletion(self, position: i32, from: u8) -> Result<Self> {
        self.append(Mutation::deletion(position, from))
    }

    pub fn append_insertion(self, position: i32, to: u8) -> Result<Self> {
        self.append(Mutation::insertion(position, to))
    }

    /// Appends every mutation of `mutations` in order.
    pub fn append_all(self, mutations: &Mutations<S>) -> Result<Self> {
        mutations.iter().try_fold(self, |b, m| b.append(m))
    }

    /// Unchecked push for tracebacks that emit in order by construction.
    pub(crate) fn push(&mut self, m: Mutation) {
        debug_assert!(!self.out_of_order(m), "traceback emitted {m:?} out of order");
        self.data.push(m);
    }

    pub fn build(mut self) -> Mutations<S> {
        if self.reversed {
            self.data.reverse();
        }
        Mutations::from_sorted(self.data)
    }
}
