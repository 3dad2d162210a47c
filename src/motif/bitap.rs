//! Shift-and automata over 64-bit words.
//!
//! Bit `i` of an error row is set when the first `i + 1` pattern letters
//! match the text ending at the current position with at most that row's
//! number of errors. Row `k` is updated from row `k` (letter consumed on
//! both sides) and row `k - 1` (substitution; with indels also insertion and
//! deletion).

use std::marker::PhantomData;

use super::Motif;
use crate::error::{invalid, Result};
use crate::traits::BioSequence;

/// Longest pattern a single machine word can hold.
pub const MAX_PATTERN_SIZE: usize = 64;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BitapPattern<S: BioSequence> {
    size: usize,
    masks: Vec<u64>,
    reverse_masks: Vec<u64>,
    _kind: PhantomData<S>,
}

impl<S: BioSequence> BitapPattern<S> {
    pub(super) fn compile(motif: &Motif<S>) -> Result<Self> {
        let size = motif.size();
        if size == 0 || size > MAX_PATTERN_SIZE {
            return invalid(format!(
                "bitap patterns hold 1..={MAX_PATTERN_SIZE} letters, got {size}"
            ));
        }
        let alphabet_size = S::alphabet().size();
        let mut masks = vec![0u64; alphabet_size];
        let mut reverse_masks = vec![0u64; alphabet_size];
        for code in 0..alphabet_size {
            for i in 0..size {
                if motif.allows(i, code as u8) {
                    masks[code] |= 1 << i;
                    reverse_masks[code] |= 1 << (size - 1 - i);
                }
            }
        }
        Ok(Self {
            size,
            masks,
            reverse_masks,
            _kind: PhantomData,
        })
    }

    pub fn from_sequence(seq: &S) -> Result<Self> {
        Motif::from_sequence(seq).to_bitap_pattern()
    }

    pub fn from_motif(motif: &Motif<S>) -> Result<Self> {
        motif.to_bitap_pattern()
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Start of the first exact occurrence.
    pub fn exact_search(&self, seq: &S) -> Option<usize> {
        self.exact_search_in(seq, 0, seq.size())
    }

    /// Start of the first exact occurrence lying entirely in `[from, to)`.
    /// Out-of-range bounds are treated as empty.
    pub fn exact_search_in(&self, seq: &S, from: usize, to: usize) -> Option<usize> {
        let to = to.min(seq.size());
        let hit = 1u64 << (self.size - 1);
        let mut r = 0u64;
        for i in from..to {
            r = shift(r) & self.masks[seq.code_at(i) as usize];
            if r & hit != 0 {
                return Some(i + 1 - self.size);
            }
        }
        None
    }

    fn matcher<'a>(
        &'a self,
        mode: Mode,
        max_errors: usize,
        seq: &'a S,
        from: usize,
        to: usize,
    ) -> Result<Matcher<'a, S>> {
        if from > to || to > seq.size() {
            return invalid(format!(
                "search interval {from}..{to} outside sequence of length {}",
                seq.size()
            ));
        }
        let indels = matches!(mode, Mode::IndelLast | Mode::IndelFirst);
        let rows = (0..=max_errors)
            .map(|k| if !indels { 0 } else if k >= 64 { u64::MAX } else { (1u64 << k) - 1 })
            .collect();
        Ok(Matcher {
            masks: if mode == Mode::IndelFirst { &self.reverse_masks[..] } else { &self.masks[..] },
            size: self.size,
            seq,
            mode,
            rows,
            from,
            to,
            current: if mode == Mode::IndelFirst { to } else { from },
            errors: 0,
        })
    }

    /// Exact occurrences in `[from, to)`, reported by start position.
    pub fn exact_matcher<'a>(&'a self, seq: &'a S, from: usize, to: usize) -> Result<Matcher<'a, S>> {
        self.matcher(Mode::Substitutions, 0, seq, from, to)
    }

    /// Occurrences with up to `max_mismatches` substitutions, reported by
    /// start position, left to right.
    pub fn mismatch_only_matcher<'a>(
        &'a self,
        max_mismatches: usize,
        seq: &'a S,
        from: usize,
        to: usize,
    ) -> Result<Matcher<'a, S>> {
        self.matcher(Mode::Substitutions, max_mismatches, seq, from, to)
    }

    /// Occurrences within `max_errors` substitutions and indels, reported by
    /// their last letter (inclusive), left to right.
    pub fn mismatch_and_indel_matcher_last<'a>(
        &'a self,
        max_errors: usize,
        seq: &'a S,
        from: usize,
        to: usize,
    ) -> Result<Matcher<'a, S>> {
        self.matcher(Mode::IndelLast, max_errors, seq, from, to)
    }

    /// Occurrences within `max_errors` substitutions and indels, reported by
    /// their first letter, scanning right to left from `to`.
    pub fn mismatch_and_indel_matcher_first<'a>(
        &'a self,
        max_errors: usize,
        seq: &'a S,
        from: usize,
        to: usize,
    ) -> Result<Matcher<'a, S>> {
        self.matcher(Mode::IndelFirst, max_errors, seq, from, to)
    }
}

#[inline]
fn shift(r: u64) -> u64 {
    (r << 1) | 1
}

/// Forward-only cursor over the hits of a pattern.
pub trait BitapMatcher {
    /// Next hit, or `None` once the interval is exhausted. Exhausted
    /// matchers stay exhausted.
    fn find_next(&mut self) -> Option<usize>;

    /// Errors used by the hit last returned.
    fn number_of_errors(&self) -> usize;

    fn hits(self) -> Hits<Self>
    where
        Self: Sized,
    {
        Hits(self)
    }
}

/// Iterator of `(position, errors)` pairs.
pub struct Hits<M>(M);

impl<M: BitapMatcher> Iterator for Hits<M> {
    type Item = (usize, usize);

    fn next(&mut self) -> Option<Self::Item> {
        let position = self.0.find_next()?;
        Some((position, self.0.number_of_errors()))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Mode {
    Substitutions,
    IndelLast,
    IndelFirst,
}

pub struct Matcher<'a, S: BioSequence> {
    masks: &'a [u64],
    size: usize,
    seq: &'a S,
    mode: Mode,
    rows: Vec<u64>,
    from: usize,
    to: usize,
    current: usize,
    errors: usize,
}

impl<S: BioSequence> Matcher<'_, S> {
    /// Feeds one text letter; returns the fewest errors of a hit ending here.
    fn advance(&mut self, code: u8) -> Option<usize> {
        let mask = self.masks[code as usize];
        let indels = self.mode != Mode::Substitutions;
        let mut previous_old = self.rows[0];
        self.rows[0] = shift(self.rows[0]) & mask;
        for k in 1..self.rows.len() {
            let old = self.rows[k];
            let mut next = (shift(old) & mask) | shift(previous_old);
            if indels {
                next |= previous_old | shift(self.rows[k - 1]);
            }
            self.rows[k] = next;
            previous_old = old;
        }
        let hit = 1u64 << (self.size - 1);
        self.rows.iter().position(|r| r & hit != 0)
    }
}

impl<S: BioSequence> BitapMatcher for Matcher<'_, S> {
    fn find_next(&mut self) -> Option<usize> {
        if self.mode == Mode::IndelFirst {
            while self.current > self.from {
                self.current -= 1;
                let i = self.current;
                if let Some(k) = self.advance(self.seq.code_at(i)) {
                    self.errors = k;
                    return Some(i);
                }
            }
            return None;
        }
        while self.current < self.to {
            let i = self.current;
            self.current += 1;
            if let Some(k) = self.advance(self.seq.code_at(i)) {
                self.errors = k;
                return Some(match self.mode {
                    Mode::IndelLast => i,
                    _ => i + 1 - self.size,
                });
            }
        }
        None
    }

    fn number_of_errors(&self) -> usize {
        self.errors
    }
}
