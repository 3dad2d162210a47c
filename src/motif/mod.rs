//! Position-specific motifs and the bit-parallel matchers compiled from them.
//!
//! A [`Motif`] allows a set of letters at every position. Wildcards are
//! handled on both sides:
//! - a wildcard in the motif allows each of its basic letters,
//! - a wildcard in the text matches only where all of its basic letters are
//!   allowed.
//!
//! [`Motif::to_bitap_pattern`] turns a motif of at most 64 letters into a
//! [`BitapPattern`] for scanning.

mod bitap;
mod filter;

pub use bitap::{BitapMatcher, BitapPattern, Hits, Matcher, MAX_PATTERN_SIZE};
pub use filter::BitapMatcherFilter;

use std::fmt;
use std::marker::PhantomData;

use crate::error::{invalid, AlignError, Result};
use crate::traits::BioSequence;

/// Per-position allow-sets, one bit per alphabet code.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Motif<S: BioSequence> {
    allowed: Vec<u32>,
    _kind: PhantomData<S>,
}

/// Adds every letter whose basic letters are all in `bits`.
fn close_over_wildcards<S: BioSequence>(bits: u32) -> u32 {
    S::alphabet()
        .wildcards()
        .iter()
        .filter(|w| w.mask() & !(bits as u64) == 0)
        .fold(bits, |acc, w| acc | (1 << w.code))
}

fn basic_bits<S: BioSequence>(code: u8) -> u32 {
    S::alphabet().wildcard(code).mask() as u32
}

impl<S: BioSequence> Motif<S> {
    fn from_positions(positions: Vec<u32>) -> Self {
        Self {
            allowed: positions.into_iter().map(close_over_wildcards::<S>).collect(),
            _kind: PhantomData,
        }
    }

    /// Motif allowing exactly the letters of `seq` (wildcards expanded).
    pub fn from_sequence(seq: &S) -> Self {
        Self::from_positions(seq.codes().iter().map(|&c| basic_bits::<S>(c)).collect())
    }

    /// Parses a motif written with the alphabet's symbols and wildcards.
    pub fn parse(text: &str) -> Result<Self> {
        let alphabet = S::alphabet();
        let positions = text
            .chars()
            .map(|ch| match alphabet.exact_code_of(ch) {
                Some(code) => Ok(basic_bits::<S>(code)),
                None => Err(AlignError::Parse(format!("{ch:?} is not a {alphabet} letter"))),
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::from_positions(positions))
    }

    pub fn size(&self) -> usize {
        self.allowed.len()
    }

    pub fn allows(&self, position: usize, code: u8) -> bool {
        code < 32 && self.allowed[position] & (1 << code) != 0
    }

    /// Whether `seq[offset..offset + size]` fits the motif. Windows running
    /// past the end of the sequence never match.
    pub fn matches(&self, seq: &S, offset: usize) -> bool {
        if offset + self.size() > seq.size() {
            return false;
        }
        seq.codes()[offset..offset + self.size()]
            .iter()
            .enumerate()
            .all(|(i, &c)| self.allows(i, c))
    }

    /// Union of two motifs of the same size.
    pub fn or(&self, other: &Self) -> Result<Self> {
        if self.size() != other.size() {
            return invalid(format!(
                "cannot merge motifs of sizes {} and {}",
                self.size(),
                other.size()
            ));
        }
        Ok(Self::from_positions(
            self.allowed.iter().zip(&other.allowed).map(|(a, b)| a | b).collect(),
        ))
    }

    pub fn to_bitap_pattern(&self) -> Result<BitapPattern<S>> {
        BitapPattern::compile(self)
    }
}

impl<S: BioSequence> fmt::Display for Motif<S> {
    /// Single letters print as themselves, other positions as `[...]`
    /// listing their basic letters.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let alphabet = S::alphabet();
        for &bits in &self.allowed {
            let basic: Vec<char> = (0..alphabet.basic_size() as u8)
                .filter(|&c| bits & (1 << c) != 0)
                .map(|c| alphabet.symbol_of(c))
                .collect();
            if basic.len() == 1 {
                write!(f, "{}", basic[0])?;
            } else {
                write!(f, "[{}]", basic.into_iter().collect::<String>())?;
            }
        }
        Ok(())
    }
}

impl<S: BioSequence> fmt::Debug for Motif<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Motif({self})")
    }
}

/// Consuming builder for motifs assembled letter by letter.
pub struct MotifBuilder<S: BioSequence> {
    positions: Vec<u32>,
    _kind: PhantomData<S>,
}

impl<S: BioSequence> MotifBuilder<S> {
    pub fn new(size: usize) -> Self {
        Self {
            positions: vec![0; size],
            _kind: PhantomData,
        }
    }

    /// Allows `code` at `position`; a wildcard allows each of its letters.
    pub fn allow(mut self, position: usize, code: u8) -> Result<Self> {
        if position >= self.positions.len() {
            return invalid(format!("position {position} outside motif of size {}", self.positions.len()));
        }
        if code as usize >= S::alphabet().size() {
            return invalid(format!("code {code} outside the {} alphabet", S::alphabet()));
        }
        self.positions[position] |= basic_bits::<S>(code);
        Ok(self)
    }

    pub fn build(self) -> Result<Motif<S>> {
        if let Some(p) = self.positions.iter().position(|&bits| bits == 0) {
            return invalid(format!("motif position {p} allows no letter"));
        }
        Ok(Motif::from_positions(self.positions))
    }
}

/// Motif allowing, at every position, the letters of both
/// `seq1[offset1..]` and `seq2[offset2..]`.
pub fn two_sequence_motif<S: BioSequence>(
    seq1: &S,
    offset1: usize,
    seq2: &S,
    offset2: usize,
    length: usize,
) -> Result<Motif<S>> {
    if offset1 + length > seq1.size() || offset2 + length > seq2.size() {
        return invalid(format!(
            "windows {offset1}+{length} / {offset2}+{length} exceed sequences of length {} / {}",
            seq1.size(),
            seq2.size()
        ));
    }
    (0..length)
        .try_fold(MotifBuilder::new(length), |b, i| {
            b.allow(i, seq1.code_at(offset1 + i))?
                .allow(i, seq2.code_at(offset2 + i))
        })?
        .build()
}
