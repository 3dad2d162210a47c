//! Seams shared by every sequence kind.
//!
//! Alignment, mutation and search code is written once against
//! [`BioSequence`]; the alphabet comes from the implementing type, so a
//! nucleotide edit list can never be replayed against a protein.
//!
//! The trait is sealed: the set of sequence kinds is closed.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt::{Debug, Display};
use std::hash::Hash;

use crate::alphabet::Alphabet;
use crate::error::{invalid, Result};
use crate::range::Range;

pub(crate) mod sealed {
    pub trait Sealed {}
}

/// Immutable array of alphabet codes.
pub trait BioSequence:
    sealed::Sealed
    + Clone
    + Debug
    + Display
    + PartialEq
    + Eq
    + Hash
    + Serialize
    + DeserializeOwned
    + Send
    + Sync
    + 'static
{
    /// Alphabet every code of this sequence kind belongs to.
    fn alphabet() -> &'static Alphabet;

    /// Wraps already-validated codes.
    ///
    /// Callers guarantee every code is `< alphabet().size()`.
    fn from_codes(codes: Vec<u8>) -> Self;

    fn codes(&self) -> &[u8];

    fn size(&self) -> usize {
        self.codes().len()
    }

    fn is_empty(&self) -> bool {
        self.codes().is_empty()
    }

    fn code_at(&self, position: usize) -> u8 {
        self.codes()[position]
    }

    fn symbol_at(&self, position: usize) -> char {
        Self::alphabet().symbol_of(self.code_at(position))
    }

    /// Sub-sequence `[from, to)`.
    fn get_range(&self, from: usize, to: usize) -> Result<Self> {
        if from > to || to > self.size() {
            return invalid(format!(
                "range {from}..{to} outside sequence of length {}",
                self.size()
            ));
        }
        Ok(Self::from_codes(self.codes()[from..to].to_vec()))
    }

    /// Sub-sequence covered by `range`; reversed ranges give the reverse
    /// complement, which only complementable alphabets support.
    fn get_range_of(&self, range: &Range) -> Result<Self> {
        if range.lower() < 0 {
            return invalid(format!("range {range} starts before the sequence"));
        }
        let sub = self.get_range(range.lower() as usize, range.upper() as usize)?;
        if range.is_reverse() {
            sub.reverse_complement()
        } else {
            Ok(sub)
        }
    }

    fn reverse_complement(&self) -> Result<Self> {
        let alphabet = Self::alphabet();
        if !alphabet.has_complement() {
            return invalid(format!("{alphabet} sequences have no complement"));
        }
        Ok(Self::from_codes(
            self.codes()
                .iter()
                .rev()
                .filter_map(|&c| alphabet.complement(c))
                .collect(),
        ))
    }

    fn concatenate(&self, other: &Self) -> Self {
        let mut codes = Vec::with_capacity(self.size() + other.size());
        codes.extend_from_slice(self.codes());
        codes.extend_from_slice(other.codes());
        Self::from_codes(codes)
    }

    fn contains_wildcards(&self) -> bool {
        let alphabet = Self::alphabet();
        self.codes().iter().any(|&c| alphabet.is_wildcard(c))
    }

    /// Parses text in this sequence's alphabet.
    fn parse_text(text: &str) -> Result<Self> {
        let alphabet = Self::alphabet();
        let mut codes = Vec::with_capacity(text.len());
        for (i, ch) in text.chars().enumerate() {
            match alphabet.code_of(ch) {
                Some(c) => codes.push(c),
                None => {
                    return invalid(format!(
                        "symbol {ch:?} at {i} is not in the {alphabet} alphabet"
                    ))
                }
            }
        }
        Ok(Self::from_codes(codes))
    }
}
