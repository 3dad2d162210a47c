//! Dynamic-programming pairwise aligners.
//!
//! - [`align_global`] / [`align_local`]: full Needleman-Wunsch and
//!   Smith-Waterman, dispatching on the gap model of the scoring.
//! - [`banded`]: the same recurrences restricted to a diagonal corridor,
//!   plus prefix-anchored ("added") and semi-local extension variants.
//! - [`align_only_substitutions`]: ungapped alignment of equal-length windows.
//!
//! Every traceback resolves equal-scoring transitions in the same order:
//! diagonal first, then insertion, then deletion. In the affine planes the
//! match state wins over the insertion state, which wins over the deletion
//! state.

pub mod banded;
mod affine;
mod linear;
mod local;
pub mod matrix;

pub use banded::{
    align_banded, align_banded_affine, align_left_added, align_right_added, align_semi_local_left,
    align_semi_local_right, BandedSemiLocalResult,
};
pub use matrix::{BandedMatrix, DpMatrix, FullMatrix, NEG_INF};

use crate::alignment::Alignment;
use crate::error::{invalid, Result};
use crate::mutations::MutationsBuilder;
use crate::range::Range;
use crate::scoring::{AffineGapAlignmentScoring, AlignmentScoring, LinearGapAlignmentScoring};
use crate::traits::BioSequence;

/// Window of a sequence read either left to right or right to left.
///
/// DP index `i` refers to the `i`-th letter read. Reversed windows are read
/// without complementing, so codes are the ones stored in the sequence.
#[derive(Clone, Copy)]
pub(crate) struct Segment<'a, S: BioSequence> {
    seq: &'a S,
    offset: usize,
    len: usize,
    reversed: bool,
}

impl<'a, S: BioSequence> Segment<'a, S> {
    pub(crate) fn whole(seq: &'a S) -> Self {
        Self {
            seq,
            offset: 0,
            len: seq.size(),
            reversed: false,
        }
    }

    pub(crate) fn window(seq: &'a S, offset: usize, len: usize, reversed: bool) -> Result<Self> {
        if offset + len > seq.size() {
            return invalid(format!(
                "window {offset}+{len} outside sequence of length {}",
                seq.size()
            ));
        }
        Ok(Self {
            seq,
            offset,
            len,
            reversed,
        })
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub(crate) fn code(&self, i: usize) -> u8 {
        self.seq.code_at(self.letter_position(i) as usize)
    }

    /// Absolute position of the `i`-th letter read.
    #[inline]
    pub(crate) fn letter_position(&self, i: usize) -> i32 {
        if self.reversed {
            (self.offset + self.len - 1 - i) as i32
        } else {
            (self.offset + i) as i32
        }
    }

    /// Absolute position an insertion is recorded at once `i` letters have
    /// been read.
    #[inline]
    pub(crate) fn boundary_position(&self, i: usize) -> i32 {
        if self.reversed {
            (self.offset + self.len - i) as i32
        } else {
            (self.offset + i) as i32
        }
    }

    /// Last position reached after reading `i` letters, inclusive. With
    /// nothing read this is the position just before the anchor.
    #[inline]
    pub(crate) fn stop_position(&self, i: usize) -> i32 {
        if self.reversed {
            (self.offset + self.len - i) as i32
        } else {
            (self.offset + i) as i32 - 1
        }
    }

    /// Forward absolute range covering read indices `[from, to)`.
    pub(crate) fn range(&self, from: usize, to: usize) -> Range {
        if self.reversed {
            Range::new(
                (self.offset + self.len - to) as i32,
                (self.offset + self.len - from) as i32,
            )
        } else {
            Range::new((self.offset + from) as i32, (self.offset + to) as i32)
        }
    }

    /// Builder emitting mutations in the order a traceback walks this window.
    ///
    /// Tracebacks run from the last letter read back to the first, which is
    /// descending for forward windows and ascending for reversed ones.
    pub(crate) fn traceback_builder(&self) -> MutationsBuilder<S> {
        if self.reversed {
            MutationsBuilder::new()
        } else {
            MutationsBuilder::reversed()
        }
    }
}

/// Global alignment of the whole of both sequences.
pub fn align_global<S: BioSequence>(scoring: &AlignmentScoring<S>, seq1: &S, seq2: &S) -> Alignment<S> {
    match scoring {
        AlignmentScoring::Linear(linear) => align_global_linear(linear, seq1, seq2),
        AlignmentScoring::Affine(affine) => align_global_affine(affine, seq1, seq2),
    }
}

/// Best-scoring local alignment, or [`Alignment::empty`] when no
/// positive-scoring pair of regions exists.
pub fn align_local<S: BioSequence>(scoring: &AlignmentScoring<S>, seq1: &S, seq2: &S) -> Alignment<S> {
    match scoring {
        AlignmentScoring::Linear(linear) => align_local_linear(linear, seq1, seq2),
        AlignmentScoring::Affine(affine) => align_local_affine(affine, seq1, seq2),
    }
}

/// Needleman-Wunsch over the full matrix with a linear gap penalty.
///
/// Equal-scoring paths are resolved toward the diagonal, then insertions,
/// then deletions.
pub fn align_global_linear<S: BioSequence>(
    scoring: &LinearGapAlignmentScoring<S>,
    seq1: &S,
    seq2: &S,
) -> Alignment<S> {
    #[cfg(feature = "tracing")]
    let span = tracing::trace_span!("align_global_linear", len1 = seq1.size(), len2 = seq2.size());
    #[cfg(feature = "tracing")]
    let _enter = span.enter();

    let s1 = Segment::whole(seq1);
    let s2 = Segment::whole(seq2);
    let mut m = FullMatrix::new(s1.len(), s2.len());
    linear::fill_global(&mut m, scoring, &s1, &s2);
    let (mutations, score) = linear::traceback(&m, scoring, &s1, &s2, s1.len(), s2.len());
    Alignment::from_parts(
        seq1.clone(),
        mutations,
        s1.range(0, s1.len()),
        s2.range(0, s2.len()),
        score,
    )
}

/// Global alignment with affine gaps on three planes (match, insertion,
/// deletion). Ties prefer the match plane.
pub fn align_global_affine<S: BioSequence>(
    scoring: &AffineGapAlignmentScoring<S>,
    seq1: &S,
    seq2: &S,
) -> Alignment<S> {
    #[cfg(feature = "tracing")]
    let span = tracing::trace_span!("align_global_affine", len1 = seq1.size(), len2 = seq2.size());
    #[cfg(feature = "tracing")]
    let _enter = span.enter();

    let s1 = Segment::whole(seq1);
    let s2 = Segment::whole(seq2);
    let planes = affine::fill_global(FullMatrix::new(s1.len(), s2.len()), scoring, &s1, &s2);
    let (mutations, score) = planes.traceback(scoring, &s1, &s2);
    Alignment::from_parts(
        seq1.clone(),
        mutations,
        s1.range(0, s1.len()),
        s2.range(0, s2.len()),
        score,
    )
}

/// Smith-Waterman with a linear gap penalty.
pub fn align_local_linear<S: BioSequence>(
    scoring: &LinearGapAlignmentScoring<S>,
    seq1: &S,
    seq2: &S,
) -> Alignment<S> {
    #[cfg(feature = "tracing")]
    let span = tracing::trace_span!("align_local_linear", len1 = seq1.size(), len2 = seq2.size());
    #[cfg(feature = "tracing")]
    let _enter = span.enter();

    local::align_linear(scoring, seq1, seq2)
}

/// Smith-Waterman with affine gaps.
pub fn align_local_affine<S: BioSequence>(
    scoring: &AffineGapAlignmentScoring<S>,
    seq1: &S,
    seq2: &S,
) -> Alignment<S> {
    #[cfg(feature = "tracing")]
    let span = tracing::trace_span!("align_local_affine", len1 = seq1.size(), len2 = seq2.size());
    #[cfg(feature = "tracing")]
    let _enter = span.enter();

    local::align_affine(scoring, seq1, seq2)
}

/// Gap-free alignment of `seq1[offset1..offset1 + length]` against
/// `seq2[offset2..offset2 + length]`.
pub fn align_only_substitutions<S: BioSequence>(
    scoring: &AlignmentScoring<S>,
    seq1: &S,
    offset1: usize,
    seq2: &S,
    offset2: usize,
    length: usize,
) -> Result<Alignment<S>> {
    let s1 = Segment::window(seq1, offset1, length, false)?;
    let s2 = Segment::window(seq2, offset2, length, false)?;
    let mut builder = MutationsBuilder::new();
    let mut score = 0;
    for i in 0..length {
        let (a, b) = (s1.code(i), s2.code(i));
        score += scoring.score(a, b);
        if a != b {
            builder = builder.append_substitution(s1.letter_position(i), a, b)?;
        }
    }
    Ok(Alignment::from_parts(
        seq1.clone(),
        builder.build(),
        s1.range(0, length),
        s2.range(0, length),
        score,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alignment::calculate_score_for;
    use crate::sequence::NucleotideSequence;

    fn nt(s: &str) -> NucleotideSequence {
        s.parse().unwrap()
    }

    #[test]
    fn segment_positions() {
        let seq = nt("ACGTACGT");
        let fwd = Segment::window(&seq, 2, 4, false).unwrap();
        assert_eq!(fwd.letter_position(0), 2);
        assert_eq!(fwd.boundary_position(4), 6);
        assert_eq!(fwd.range(1, 3), Range::new(3, 5));
        let rev = Segment::window(&seq, 2, 4, true).unwrap();
        assert_eq!(rev.letter_position(0), 5);
        assert_eq!(rev.code(0), seq.code_at(5));
        assert_eq!(rev.boundary_position(1), 5);
        assert_eq!(rev.range(0, 2), Range::new(4, 6));
        assert!(Segment::window(&seq, 6, 3, false).is_err());
    }

    #[test]
    fn global_identical_sequences() {
        let scoring = LinearGapAlignmentScoring::nucleotide_blast();
        let a = nt("ATTAGACA");
        let al = align_global_linear(&scoring, &a, &a);
        assert!(al.absolute_mutations().is_empty());
        assert_eq!(al.score(), 40.0);
    }

    #[test]
    fn global_prefers_single_insertion() {
        let scoring = LinearGapAlignmentScoring::nucleotide_blast();
        let a = nt("ATTAGACA");
        let b = nt("ATTAGTACA");
        let al = align_global_linear(&scoring, &a, &b);
        assert_eq!(al.absolute_mutations().count_of_indels(), 1);
        assert_eq!(al.score(), 35.0);
        assert_eq!(al.absolute_mutations().mutate(&a).unwrap(), b);
    }

    #[test]
    fn only_substitutions() {
        let scoring: AlignmentScoring<_> = LinearGapAlignmentScoring::nucleotide_blast().into();
        let a = nt("GGATTAGACA");
        let b = nt("ATTTGACAT");
        let al = align_only_substitutions(&scoring, &a, 2, &b, 0, 8).unwrap();
        assert_eq!(al.absolute_mutations().encode(), "SA5T");
        assert_eq!(al.score(), 31.0);
        assert_eq!(al.sequence1_range(), Range::new(2, 10));
        let recomputed = calculate_score_for(&a, al.sequence1_range(), al.absolute_mutations(), &scoring);
        assert_eq!(recomputed.unwrap(), 31);
        assert!(align_only_substitutions(&scoring, &a, 4, &b, 0, 8).is_err());
    }
}
