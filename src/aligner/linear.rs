//! Linear-gap recurrence shared by the full and banded aligners.

use super::matrix::DpMatrix;
use super::Segment;
use crate::mutations::{Mutation, Mutations};
use crate::scoring::LinearGapAlignmentScoring;
use crate::traits::BioSequence;

/// Row 0 and column 0: leading gaps.
pub(crate) fn init_borders<M: DpMatrix>(m: &mut M, gap: i32) {
    m.set(0, 0, 0);
    let (_, hi) = m.columns(0);
    for j in 1..=hi {
        m.set(0, j, gap * j as i32);
    }
    for i in 1..m.rows() {
        if m.columns(i).0 > 0 {
            break;
        }
        m.set(i, 0, gap * i as i32);
    }
}

/// Fills the stored part of row `i >= 1` and returns the maximum over the
/// cells it computed (the border column is not one of them), paired with the
/// first column reaching it. A row the band misses yields `i32::MIN`.
pub(crate) fn fill_row<M: DpMatrix, S: BioSequence>(
    m: &mut M,
    scoring: &LinearGapAlignmentScoring<S>,
    s1: &Segment<'_, S>,
    s2: &Segment<'_, S>,
    i: usize,
) -> (i32, usize) {
    let gap = scoring.gap_penalty;
    let (lo, hi) = m.columns(i);
    let a = s1.code(i - 1);
    let mut best = (i32::MIN, lo);
    for j in lo.max(1)..=hi {
        let diagonal = m.get(i - 1, j - 1) + scoring.score(a, s2.code(j - 1));
        let v = diagonal.max(m.get(i, j - 1) + gap).max(m.get(i - 1, j) + gap);
        m.set(i, j, v);
        if v > best.0 {
            best = (v, j);
        }
    }
    best
}

pub(crate) fn fill_global<M: DpMatrix, S: BioSequence>(
    m: &mut M,
    scoring: &LinearGapAlignmentScoring<S>,
    s1: &Segment<'_, S>,
    s2: &Segment<'_, S>,
) {
    init_borders(m, scoring.gap_penalty);
    for i in 1..=s1.len() {
        fill_row(m, scoring, s1, s2, i);
    }
}

/// Walks back from `(i, j)` to `(0, 0)`. Returns the mutations and the score
/// of the end cell.
pub(crate) fn traceback<M: DpMatrix, S: BioSequence>(
    m: &M,
    scoring: &LinearGapAlignmentScoring<S>,
    s1: &Segment<'_, S>,
    s2: &Segment<'_, S>,
    mut i: usize,
    mut j: usize,
) -> (Mutations<S>, i32) {
    let gap = scoring.gap_penalty;
    let score = m.get(i, j);
    let mut builder = s1.traceback_builder();
    while i > 0 || j > 0 {
        let v = m.get(i, j);
        if i > 0 && j > 0 {
            let (a, b) = (s1.code(i - 1), s2.code(j - 1));
            if v == m.get(i - 1, j - 1) + scoring.score(a, b) {
                if a != b {
                    builder.push(Mutation::substitution(s1.letter_position(i - 1), a, b));
                }
                i -= 1;
                j -= 1;
                continue;
            }
        }
        if j > 0 && (v == m.get(i, j - 1) + gap || i == 0) {
            builder.push(Mutation::insertion(s1.boundary_position(i), s2.code(j - 1)));
            j -= 1;
        } else {
            debug_assert!(i > 0 && v == m.get(i - 1, j) + gap, "traceback lost the path at ({i}, {j})");
            builder.push(Mutation::deletion(s1.letter_position(i - 1), s1.code(i - 1)));
            i -= 1;
        }
    }
    (builder.build(), score)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aligner::matrix::{BandedMatrix, FullMatrix};
    use crate::sequence::NucleotideSequence;

    fn nt(s: &str) -> NucleotideSequence {
        s.parse().unwrap()
    }

    #[test]
    fn borders_follow_the_band() {
        let mut m = BandedMatrix::new(6, 6, 2);
        init_borders(&mut m, -5);
        assert_eq!(m.get(0, 2), -10);
        assert_eq!(m.get(2, 0), -10);
        assert!(m.get(3, 0) < -1_000_000);
    }

    #[test]
    fn full_fill_matches_hand_computed_corner() {
        let scoring = LinearGapAlignmentScoring::nucleotide_blast();
        let (a, b) = (nt("ACGT"), nt("AGT"));
        let (s1, s2) = (Segment::whole(&a), Segment::whole(&b));
        let mut m = FullMatrix::new(4, 3);
        fill_global(&mut m, &scoring, &s1, &s2);
        assert_eq!(m.get(4, 3), 10);
        let (muts, score) = traceback(&m, &scoring, &s1, &s2, 4, 3);
        assert_eq!(score, 10);
        assert_eq!(muts.encode(), "DC1");
    }
}
