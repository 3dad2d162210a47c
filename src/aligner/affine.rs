//! Three-plane affine-gap recurrence (Gotoh).
//!
//! - `matched`: last column pairs two letters,
//! - `inserted`: last column consumes a letter of sequence2 only,
//! - `deleted`: last column consumes a letter of sequence1 only.
//!
//! A gap of length `k` costs `gap_open + (k - 1) * gap_extend`.

use super::matrix::{DpMatrix, NEG_INF};
use super::Segment;
use crate::mutations::{Mutation, Mutations};
use crate::scoring::AffineGapAlignmentScoring;
use crate::traits::BioSequence;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum State {
    Match,
    Insertion,
    Deletion,
}

pub(crate) struct Planes<M: DpMatrix> {
    matched: M,
    inserted: M,
    deleted: M,
}

/// Where a traceback stopped, plus what it collected.
pub(crate) struct Trace<S: BioSequence> {
    pub mutations: Mutations<S>,
    pub score: i32,
    pub i: usize,
    pub j: usize,
}

#[inline]
fn clamp(v: i32) -> i32 {
    v.max(NEG_INF)
}

impl<M: DpMatrix> Planes<M> {
    pub(crate) fn new(template: M) -> Self {
        Self {
            matched: template.clone(),
            inserted: template.clone(),
            deleted: template,
        }
    }

    pub(crate) fn rows(&self) -> usize {
        self.matched.rows()
    }

    /// Leading gaps along row 0 and column 0.
    pub(crate) fn init_borders(&mut self, gap_open: i32, gap_extend: i32) {
        self.matched.set(0, 0, 0);
        let (_, hi) = self.matched.columns(0);
        for j in 1..=hi {
            self.inserted.set(0, j, gap_open + gap_extend * (j as i32 - 1));
        }
        for i in 1..self.rows() {
            if self.matched.columns(i).0 > 0 {
                break;
            }
            self.deleted.set(i, 0, gap_open + gap_extend * (i as i32 - 1));
        }
    }

    /// Best state at a cell; ties go to match, then insertion, then deletion.
    pub(crate) fn best_at(&self, i: usize, j: usize) -> (i32, State) {
        let mut best = (self.matched.get(i, j), State::Match);
        let ins = self.inserted.get(i, j);
        if ins > best.0 {
            best = (ins, State::Insertion);
        }
        let del = self.deleted.get(i, j);
        if del > best.0 {
            best = (del, State::Deletion);
        }
        best
    }

    pub(crate) fn matched(&self) -> &M {
        &self.matched
    }

    /// Fills the stored part of row `i >= 1`. Local mode lets the match
    /// plane restart from zero. Returns the maximum over all states of the
    /// computed cells, border column excluded, and the first column
    /// reaching it.
    pub(crate) fn fill_row<S: BioSequence>(
        &mut self,
        scoring: &AffineGapAlignmentScoring<S>,
        s1: &Segment<'_, S>,
        s2: &Segment<'_, S>,
        i: usize,
        local: bool,
    ) -> (i32, usize) {
        let (open, extend) = (scoring.gap_open, scoring.gap_extend);
        let (lo, hi) = self.matched.columns(i);
        let a = s1.code(i - 1);
        let mut best = (i32::MIN, lo);
        for j in lo.max(1)..=hi {
            let mut entry = self.best_at(i - 1, j - 1).0;
            if local {
                entry = entry.max(0);
            }
            let m = clamp(entry + scoring.score(a, s2.code(j - 1)));
            let x = clamp(
                (self.matched.get(i - 1, j) + open)
                    .max(self.inserted.get(i - 1, j) + open)
                    .max(self.deleted.get(i - 1, j) + extend),
            );
            let y = clamp(
                (self.matched.get(i, j - 1) + open)
                    .max(self.inserted.get(i, j - 1) + extend)
                    .max(self.deleted.get(i, j - 1) + open),
            );
            self.matched.set(i, j, m);
            self.inserted.set(i, j, y);
            self.deleted.set(i, j, x);
            let v = m.max(y).max(x);
            if v > best.0 {
                best = (v, j);
            }
        }
        best
    }

    fn predecessor(&self, i: usize, j: usize, target: i32, via_match: i32, via_ins: i32, via_del: i32) -> State {
        if self.matched.get(i, j) + via_match == target {
            State::Match
        } else if self.inserted.get(i, j) + via_ins == target {
            State::Insertion
        } else {
            debug_assert_eq!(self.deleted.get(i, j) + via_del, target);
            State::Deletion
        }
    }

    /// Walks back from `(i, j)` entered through `state`. Global tracebacks
    /// end at `(0, 0)`; local ones end where the match plane restarted.
    pub(crate) fn traceback_from<S: BioSequence>(
        &self,
        scoring: &AffineGapAlignmentScoring<S>,
        s1: &Segment<'_, S>,
        s2: &Segment<'_, S>,
        mut i: usize,
        mut j: usize,
        mut state: State,
        local: bool,
    ) -> Trace<S> {
        let (open, extend) = (scoring.gap_open, scoring.gap_extend);
        let score = match state {
            State::Match => self.matched.get(i, j),
            State::Insertion => self.inserted.get(i, j),
            State::Deletion => self.deleted.get(i, j),
        };
        let mut builder = s1.traceback_builder();
        while i > 0 || j > 0 {
            match state {
                State::Match => {
                    let (a, b) = (s1.code(i - 1), s2.code(j - 1));
                    let prev = self.matched.get(i, j) - scoring.score(a, b);
                    if a != b {
                        builder.push(Mutation::substitution(s1.letter_position(i - 1), a, b));
                    }
                    i -= 1;
                    j -= 1;
                    if local && prev == 0 {
                        break;
                    }
                    if i > 0 || j > 0 {
                        state = self.predecessor(i, j, prev, 0, 0, 0);
                    }
                }
                State::Insertion => {
                    let v = self.inserted.get(i, j);
                    builder.push(Mutation::insertion(s1.boundary_position(i), s2.code(j - 1)));
                    j -= 1;
                    state = self.predecessor(i, j, v, open, extend, open);
                }
                State::Deletion => {
                    let v = self.deleted.get(i, j);
                    builder.push(Mutation::deletion(s1.letter_position(i - 1), s1.code(i - 1)));
                    i -= 1;
                    state = self.predecessor(i, j, v, open, open, extend);
                }
            }
        }
        Trace {
            mutations: builder.build(),
            score,
            i,
            j,
        }
    }

    /// Global traceback from the bottom-right corner.
    pub(crate) fn traceback<S: BioSequence>(
        &self,
        scoring: &AffineGapAlignmentScoring<S>,
        s1: &Segment<'_, S>,
        s2: &Segment<'_, S>,
    ) -> (Mutations<S>, i32) {
        let (i, j) = (s1.len(), s2.len());
        let (_, state) = self.best_at(i, j);
        let trace = self.traceback_from(scoring, s1, s2, i, j, state, false);
        (trace.mutations, trace.score)
    }
}

pub(crate) fn fill_global<M: DpMatrix, S: BioSequence>(
    template: M,
    scoring: &AffineGapAlignmentScoring<S>,
    s1: &Segment<'_, S>,
    s2: &Segment<'_, S>,
) -> Planes<M> {
    let mut planes = Planes::new(template);
    planes.init_borders(scoring.gap_open, scoring.gap_extend);
    for i in 1..=s1.len() {
        planes.fill_row(scoring, s1, s2, i, false);
    }
    planes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aligner::matrix::FullMatrix;
    use crate::sequence::NucleotideSequence;

    fn nt(s: &str) -> NucleotideSequence {
        s.parse().unwrap()
    }

    #[test]
    fn long_gap_is_opened_once() {
        let scoring = AffineGapAlignmentScoring::nucleotide_default();
        let (a, b) = (nt("ACGTTTTACG"), nt("ACGACG"));
        let (s1, s2) = (Segment::whole(&a), Segment::whole(&b));
        let planes = fill_global(FullMatrix::new(10, 6), &scoring, &s1, &s2);
        let (muts, score) = planes.traceback(&scoring, &s1, &s2);
        assert_eq!(score, 30 - 10 - 3);
        assert_eq!(muts.count_of_indels(), 4);
        assert_eq!(muts.mutate(&a).unwrap(), b);
    }

    #[test]
    fn empty_against_nonempty_is_one_gap() {
        let scoring = AffineGapAlignmentScoring::nucleotide_default();
        let (a, b) = (nt(""), nt("ACG"));
        let (s1, s2) = (Segment::whole(&a), Segment::whole(&b));
        let planes = fill_global(FullMatrix::new(0, 3), &scoring, &s1, &s2);
        let (muts, score) = planes.traceback(&scoring, &s1, &s2);
        assert_eq!(score, -12);
        assert_eq!(muts.encode(), "I0A I0C I0G");
    }
}
