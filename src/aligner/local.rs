//! Smith-Waterman over the full matrix.

use super::affine::{Planes, State};
use super::matrix::{DpMatrix, FullMatrix};
use super::Segment;
use crate::alignment::Alignment;
use crate::mutations::Mutation;
use crate::scoring::{AffineGapAlignmentScoring, LinearGapAlignmentScoring};
use crate::traits::BioSequence;

pub(crate) fn align_linear<S: BioSequence>(
    scoring: &LinearGapAlignmentScoring<S>,
    seq1: &S,
    seq2: &S,
) -> Alignment<S> {
    let (s1, s2) = (Segment::whole(seq1), Segment::whole(seq2));
    let gap = scoring.gap_penalty;
    let mut m = FullMatrix::new(s1.len(), s2.len());
    for j in 0..=s2.len() {
        m.set(0, j, 0);
    }
    let mut best = (0, 0, 0);
    for i in 1..=s1.len() {
        m.set(i, 0, 0);
        let a = s1.code(i - 1);
        for j in 1..=s2.len() {
            let v = (m.get(i - 1, j - 1) + scoring.score(a, s2.code(j - 1)))
                .max(m.get(i, j - 1) + gap)
                .max(m.get(i - 1, j) + gap)
                .max(0);
            m.set(i, j, v);
            if v > best.0 {
                best = (v, i, j);
            }
        }
    }
    let (score, end1, end2) = best;
    if score <= 0 {
        return Alignment::empty(seq1.clone());
    }

    let (mut i, mut j) = (end1, end2);
    let mut builder = s1.traceback_builder();
    loop {
        let v = m.get(i, j);
        let (a, b) = (s1.code(i - 1), s2.code(j - 1));
        if v == m.get(i - 1, j - 1) + scoring.score(a, b) {
            if a != b {
                builder.push(Mutation::substitution(s1.letter_position(i - 1), a, b));
            }
            i -= 1;
            j -= 1;
        } else if v == m.get(i, j - 1) + gap {
            builder.push(Mutation::insertion(s1.boundary_position(i), b));
            j -= 1;
        } else {
            builder.push(Mutation::deletion(s1.letter_position(i - 1), a));
            i -= 1;
        }
        if m.get(i, j) == 0 {
            break;
        }
    }
    Alignment::from_parts(
        seq1.clone(),
        builder.build(),
        s1.range(i, end1),
        s2.range(j, end2),
        score,
    )
}

pub(crate) fn align_affine<S: BioSequence>(
    scoring: &AffineGapAlignmentScoring<S>,
    seq1: &S,
    seq2: &S,
) -> Alignment<S> {
    let (s1, s2) = (Segment::whole(seq1), Segment::whole(seq2));
    let mut planes = Planes::new(FullMatrix::new(s1.len(), s2.len()));
    let mut best = (0, 0, 0);
    for i in 1..=s1.len() {
        planes.fill_row(scoring, &s1, &s2, i, true);
        for j in 1..=s2.len() {
            let v = planes.matched().get(i, j);
            if v > best.0 {
                best = (v, i, j);
            }
        }
    }
    let (score, end1, end2) = best;
    if score <= 0 {
        return Alignment::empty(seq1.clone());
    }
    let trace = planes.traceback_from(scoring, &s1, &s2, end1, end2, State::Match, true);
    Alignment::from_parts(
        seq1.clone(),
        trace.mutations,
        s1.range(trace.i, end1),
        s2.range(trace.j, end2),
        score,
    )
}
