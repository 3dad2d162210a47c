//! Banded aligners.
//!
//! The recurrences of the full aligners run inside a [`BandedMatrix`], so
//! time and memory are `O(len * width)`. Results equal the full-matrix ones
//! whenever the optimal path stays inside the band; otherwise the best
//! in-band path is returned.
//!
//! Windows are forward [`Range`]s of the inputs. Every entry point accepts
//! either gap model through [`BandedAlignerParameters`].
//!
//! - [`align_banded`]: global over both windows.
//! - [`align_right_added`] / [`align_left_added`]: anchored at one end of
//!   both windows, free to stop anywhere in the last `added` letters of the
//!   other end.
//! - [`align_semi_local_left`] / [`align_semi_local_right`]: anchored at one
//!   end, extended until the score falls `stop_penalty` behind a perfect
//!   match run.

use super::affine::Planes;
use super::linear;
use super::matrix::{BandedMatrix, DpMatrix};
use super::Segment;
use crate::alignment::Alignment;
use crate::builder::BandedAlignerParameters;
use crate::error::{invalid, Result};
use crate::mutations::Mutations;
use crate::range::Range;
use crate::scoring::{AffineGapAlignmentScoring, AlignmentScoring, LinearGapAlignmentScoring};
use crate::traits::BioSequence;

/// Outcome of a semi-local extension.
///
/// Stops are the last aligned positions (inclusive) in the direction of the
/// extension; with nothing aligned they sit one step before the anchor.
#[derive(Clone, Debug, PartialEq)]
pub struct BandedSemiLocalResult<S: BioSequence> {
    pub sequence1_stop: i32,
    pub sequence2_stop: i32,
    pub mutations: Mutations<S>,
    pub score: i32,
}

/// One gap model running over a banded matrix.
trait Kernel<S: BioSequence> {
    fn fill_row(&mut self, s1: &Segment<'_, S>, s2: &Segment<'_, S>, i: usize) -> (i32, usize);

    fn value(&self, i: usize, j: usize) -> i32;

    fn traceback(&self, s1: &Segment<'_, S>, s2: &Segment<'_, S>, i: usize, j: usize) -> (Mutations<S>, i32);
}

struct LinearKernel<'a, S: BioSequence> {
    scoring: &'a LinearGapAlignmentScoring<S>,
    matrix: BandedMatrix,
}

impl<S: BioSequence> Kernel<S> for LinearKernel<'_, S> {
    fn fill_row(&mut self, s1: &Segment<'_, S>, s2: &Segment<'_, S>, i: usize) -> (i32, usize) {
        linear::fill_row(&mut self.matrix, self.scoring, s1, s2, i)
    }

    fn value(&self, i: usize, j: usize) -> i32 {
        self.matrix.get(i, j)
    }

    fn traceback(&self, s1: &Segment<'_, S>, s2: &Segment<'_, S>, i: usize, j: usize) -> (Mutations<S>, i32) {
        linear::traceback(&self.matrix, self.scoring, s1, s2, i, j)
    }
}

struct AffineKernel<'a, S: BioSequence> {
    scoring: &'a AffineGapAlignmentScoring<S>,
    planes: Planes<BandedMatrix>,
}

impl<S: BioSequence> Kernel<S> for AffineKernel<'_, S> {
    fn fill_row(&mut self, s1: &Segment<'_, S>, s2: &Segment<'_, S>, i: usize) -> (i32, usize) {
        self.planes.fill_row(self.scoring, s1, s2, i, false)
    }

    fn value(&self, i: usize, j: usize) -> i32 {
        self.planes.best_at(i, j).0
    }

    fn traceback(&self, s1: &Segment<'_, S>, s2: &Segment<'_, S>, i: usize, j: usize) -> (Mutations<S>, i32) {
        let (_, state) = self.planes.best_at(i, j);
        let trace = self.planes.traceback_from(self.scoring, s1, s2, i, j, state, false);
        (trace.mutations, trace.score)
    }
}

/// Runs `body` with a kernel for the gap model of `scoring`, borders
/// already initialised.
fn with_kernel<S: BioSequence, T>(
    scoring: &AlignmentScoring<S>,
    width: usize,
    len1: usize,
    len2: usize,
    body: impl FnOnce(&mut dyn Kernel<S>) -> T,
) -> T {
    let matrix = BandedMatrix::new(len1, len2, width);
    match scoring {
        AlignmentScoring::Linear(scoring) => {
            let mut kernel = LinearKernel { scoring, matrix };
            linear::init_borders(&mut kernel.matrix, scoring.gap_penalty);
            body(&mut kernel)
        }
        AlignmentScoring::Affine(scoring) => {
            let mut planes = Planes::new(matrix);
            planes.init_borders(scoring.gap_open, scoring.gap_extend);
            body(&mut AffineKernel { scoring, planes })
        }
    }
}

fn window<'a, S: BioSequence>(seq: &'a S, range: Range, reversed: bool) -> Result<Segment<'a, S>> {
    if range.is_reverse() || range.lower() < 0 {
        return invalid(format!("alignment window {range} must be forward and non-negative"));
    }
    Segment::window(seq, range.lower() as usize, range.length() as usize, reversed)
}

/// Global alignment of `seq1[range1]` against `seq2[range2]` inside the band.
pub fn align_banded<S: BioSequence>(
    params: &BandedAlignerParameters<S>,
    seq1: &S,
    range1: Range,
    seq2: &S,
    range2: Range,
) -> Result<Alignment<S>> {
    let s1 = window(seq1, range1, false)?;
    let s2 = window(seq2, range2, false)?;

    #[cfg(feature = "tracing")]
    let span = tracing::trace_span!("align_banded", len1 = s1.len(), len2 = s2.len(), width = params.width());
    #[cfg(feature = "tracing")]
    let _enter = span.enter();

    let (mutations, score) = with_kernel(params.scoring(), params.width(), s1.len(), s2.len(), |k| {
        for i in 1..=s1.len() {
            k.fill_row(&s1, &s2, i);
        }
        k.traceback(&s1, &s2, s1.len(), s2.len())
    });
    Ok(Alignment::from_parts(seq1.clone(), mutations, range1, range2, score))
}

/// Finds the best end cell among the last `added1` rows of the last column
/// and the last `added2` columns of the last row. Both are scanned towards
/// the corner and the first maximum wins, so ties go to the shorter
/// alignment, column before row.
fn added_end<S: BioSequence>(k: &dyn Kernel<S>, len1: usize, added1: usize, len2: usize, added2: usize) -> (usize, usize) {
    let mut best = (i32::MIN, len1, len2);
    for i in len1 - added1.min(len1)..=len1 {
        let v = k.value(i, len2);
        if v > best.0 {
            best = (v, i, len2);
        }
    }
    for j in len2 - added2.min(len2)..=len2 {
        let v = k.value(len1, j);
        if v > best.0 {
            best = (v, len1, j);
        }
    }
    (best.1, best.2)
}

fn align_added<S: BioSequence>(
    params: &BandedAlignerParameters<S>,
    seq1: &S,
    s1: Segment<'_, S>,
    added1: usize,
    s2: Segment<'_, S>,
    added2: usize,
) -> Alignment<S> {
    let (mutations, score, end1, end2) = with_kernel(params.scoring(), params.width(), s1.len(), s2.len(), |k| {
        for i in 1..=s1.len() {
            k.fill_row(&s1, &s2, i);
        }
        let (i, j) = added_end(&*k, s1.len(), added1, s2.len(), added2);
        let (mutations, score) = k.traceback(&s1, &s2, i, j);
        (mutations, score, i, j)
    });
    Alignment::from_parts(seq1.clone(), mutations, s1.range(0, end1), s2.range(0, end2), score)
}

/// Alignment starting at the left edges of both windows whose right end may
/// fall within the last `added1` letters of `range1` or the last `added2`
/// letters of `range2`.
pub fn align_right_added<S: BioSequence>(
    params: &BandedAlignerParameters<S>,
    seq1: &S,
    range1: Range,
    added1: usize,
    seq2: &S,
    range2: Range,
    added2: usize,
) -> Result<Alignment<S>> {
    let s1 = window(seq1, range1, false)?;
    let s2 = window(seq2, range2, false)?;

    #[cfg(feature = "tracing")]
    let span = tracing::trace_span!("align_right_added", len1 = s1.len(), len2 = s2.len(), added1, added2);
    #[cfg(feature = "tracing")]
    let _enter = span.enter();

    Ok(align_added(params, seq1, s1, added1, s2, added2))
}

/// Mirror image of [`align_right_added`]: anchored at the right edges, free
/// start within the first `added1` / `added2` letters.
pub fn align_left_added<S: BioSequence>(
    params: &BandedAlignerParameters<S>,
    seq1: &S,
    range1: Range,
    added1: usize,
    seq2: &S,
    range2: Range,
    added2: usize,
) -> Result<Alignment<S>> {
    let s1 = window(seq1, range1, true)?;
    let s2 = window(seq2, range2, true)?;

    #[cfg(feature = "tracing")]
    let span = tracing::trace_span!("align_left_added", len1 = s1.len(), len2 = s2.len(), added1, added2);
    #[cfg(feature = "tracing")]
    let _enter = span.enter();

    Ok(align_added(params, seq1, s1, added1, s2, added2))
}

/// Score of one matching letter, used to judge whether an extension is
/// still worth following.
fn match_reward<S: BioSequence>(scoring: &AlignmentScoring<S>) -> i32 {
    let matrix = scoring.matrix();
    matrix.uniform_basic_match_score().unwrap_or_else(|| {
        (0..S::alphabet().basic_size() as u8)
            .map(|c| matrix.score(c, c))
            .max()
            .unwrap_or(0)
    })
}

fn semi_local<S: BioSequence>(
    params: &BandedAlignerParameters<S>,
    s1: Segment<'_, S>,
    s2: Segment<'_, S>,
) -> BandedSemiLocalResult<S> {
    let reward = match_reward(params.scoring());
    let stop_penalty = params.stop_penalty();
    let (mutations, score, end1, end2) = with_kernel(params.scoring(), params.width(), s1.len(), s2.len(), |k| {
        let mut best = (0, 0, 0);
        for i in 1..=s1.len() {
            let (row_max, j) = k.fill_row(&s1, &s2, i);
            if row_max > best.0 {
                best = (row_max, i, j);
            }
            // Row `i` is held against a perfect run over the rows before it.
            let shortfall = i64::from(row_max) - (i as i64 - 1) * i64::from(reward);
            if shortfall < i64::from(stop_penalty) {
                break;
            }
        }
        let (mutations, score) = k.traceback(&s1, &s2, best.1, best.2);
        (mutations, score, best.1, best.2)
    });
    BandedSemiLocalResult {
        sequence1_stop: s1.stop_position(end1),
        sequence2_stop: s2.stop_position(end2),
        mutations,
        score,
    }
}

/// Extends rightwards from the left edges of both windows.
pub fn align_semi_local_left<S: BioSequence>(
    params: &BandedAlignerParameters<S>,
    seq1: &S,
    range1: Range,
    seq2: &S,
    range2: Range,
) -> Result<BandedSemiLocalResult<S>> {
    let s1 = window(seq1, range1, false)?;
    let s2 = window(seq2, range2, false)?;

    #[cfg(feature = "tracing")]
    let span = tracing::trace_span!("align_semi_local_left", len1 = s1.len(), len2 = s2.len());
    #[cfg(feature = "tracing")]
    let _enter = span.enter();

    Ok(semi_local(params, s1, s2))
}

/// Extends leftwards from the right edges of both windows.
pub fn align_semi_local_right<S: BioSequence>(
    params: &BandedAlignerParameters<S>,
    seq1: &S,
    range1: Range,
    seq2: &S,
    range2: Range,
) -> Result<BandedSemiLocalResult<S>> {
    let s1 = window(seq1, range1, true)?;
    let s2 = window(seq2, range2, true)?;

    #[cfg(feature = "tracing")]
    let span = tracing::trace_span!("align_semi_local_right", len1 = s1.len(), len2 = s2.len());
    #[cfg(feature = "tracing")]
    let _enter = span.enter();

    Ok(semi_local(params, s1, s2))
}

/// Banded global alignment under an affine gap model.
pub fn align_banded_affine<S: BioSequence>(
    scoring: &AffineGapAlignmentScoring<S>,
    width: usize,
    seq1: &S,
    range1: Range,
    seq2: &S,
    range2: Range,
) -> Result<Alignment<S>> {
    let params = BandedAlignerParameters::builder(scoring.clone()).with_width(width).build();
    align_banded(&params, seq1, range1, seq2, range2)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aligner::{align_global_affine, align_global_linear};
    use crate::sequence::NucleotideSequence;

    fn nt(s: &str) -> NucleotideSequence {
        s.parse().unwrap()
    }

    fn linear(width: usize) -> BandedAlignerParameters<NucleotideSequence> {
        BandedAlignerParameters::builder(LinearGapAlignmentScoring::nucleotide_blast())
            .with_width(width)
            .build()
    }

    #[test]
    fn banded_window_matches_full_alignment() {
        let (a, b) = (nt("GGATTAGACAGG"), nt("CATTAGTACAC"));
        let al = align_banded(&linear(2), &a, Range::new(2, 10), &b, Range::new(1, 10)).unwrap();
        assert_eq!(al.absolute_mutations().encode(), "I7T");
        assert_eq!(al.score(), 35.0);
        let full = align_global_linear(&LinearGapAlignmentScoring::nucleotide_blast(), &nt("ATTAGACA"), &nt("ATTAGTACA"));
        assert_eq!(full.score(), al.score());
        assert_eq!(al.mutated_part().unwrap(), nt("ATTAGTACA"));
    }

    #[test]
    fn narrow_band_misses_shifted_optimum() {
        let (a, b) = (nt("ACGTACGTAC"), nt("TACGTACGTA"));
        let whole = Range::new(0, 10);
        let diagonal = align_banded(&linear(0), &a, whole, &b, whole).unwrap();
        assert_eq!(diagonal.score(), -40.0);
        assert_eq!(diagonal.absolute_mutations().size(), 10);
        let wider = align_banded(&linear(1), &a, whole, &b, whole).unwrap();
        assert_eq!(wider.score(), 35.0);
        assert_eq!(wider.absolute_mutations().encode(), "I0T DC9");
    }

    #[test]
    fn added_variants_trim_the_free_end() {
        let core = nt("ATTAGACA");
        let right = nt("ATTAGACATTTTTT");
        let al = align_right_added(&linear(3), &right, Range::new(0, 14), 6, &core, Range::new(0, 8), 0).unwrap();
        assert_eq!(al.sequence1_range(), Range::new(0, 8));
        assert_eq!(al.score(), 40.0);
        assert!(al.absolute_mutations().is_empty());

        let left = nt("GGGGGATTAGACA");
        let al = align_left_added(&linear(3), &left, Range::new(0, 13), 5, &core, Range::new(0, 8), 0).unwrap();
        assert_eq!(al.sequence1_range(), Range::new(5, 13));
        assert_eq!(al.sequence2_range(), Range::new(0, 8));
        assert_eq!(al.score(), 40.0);
    }

    #[test]
    fn semi_local_stops_where_similarity_ends() {
        let (a, b) = (nt("ATTAGACAGCGCGCGCGC"), nt("ATTAGACATATATATATA"));
        let r = align_semi_local_left(&linear(3), &a, Range::new(0, 18), &b, Range::new(0, 18)).unwrap();
        assert_eq!((r.sequence1_stop, r.sequence2_stop, r.score), (7, 7, 40));
        assert!(r.mutations.is_empty());

        let (a, b) = (nt("CGCGCGCGCATTAGACA"), nt("TATATATATATTAGACA"));
        let r = align_semi_local_right(&linear(3), &a, Range::new(0, 17), &b, Range::new(0, 17)).unwrap();
        assert_eq!((r.sequence1_stop, r.sequence2_stop, r.score), (9, 9, 40));
    }

    #[test]
    fn added_ties_keep_the_shorter_end() {
        // Ending after "ACGT" or after "ACGTT" (one deletion, one more match) both score 20.
        let (a, b) = (nt("ACGTT"), nt("ACGT"));
        let al = align_right_added(&linear(2), &a, Range::new(0, 5), 1, &b, Range::new(0, 4), 0).unwrap();
        assert_eq!(al.sequence1_range(), Range::new(0, 4));
        assert_eq!(al.score(), 20.0);
        assert!(al.absolute_mutations().is_empty());

        let (a, b) = (nt("TTGCA"), nt("TGCA"));
        let al = align_left_added(&linear(2), &a, Range::new(0, 5), 1, &b, Range::new(0, 4), 0).unwrap();
        assert_eq!(al.sequence1_range(), Range::new(1, 5));
        assert_eq!(al.score(), 20.0);
    }

    #[test]
    fn semi_local_extends_past_a_single_mismatch() {
        let params = BandedAlignerParameters::builder(LinearGapAlignmentScoring::nucleotide_blast())
            .with_width(2)
            .with_stop_penalty(-8)
            .build();
        let r = align_semi_local_left(&params, &nt("ACA"), Range::new(0, 3), &nt("AGA"), Range::new(0, 3)).unwrap();
        assert_eq!((r.sequence1_stop, r.sequence2_stop, r.score), (2, 2, 6));
        assert_eq!(r.mutations.encode(), "SC1G");

        let r = align_semi_local_right(&params, &nt("ACA"), Range::new(0, 3), &nt("AGA"), Range::new(0, 3)).unwrap();
        assert_eq!((r.sequence1_stop, r.sequence2_stop, r.score), (0, 0, 6));

        // After two mismatches the third row is 13 behind a perfect run, so
        // the walk ends before the matching tail.
        let r = align_semi_local_left(&params, &nt("ACCAAA"), Range::new(0, 6), &nt("AGGAAA"), Range::new(0, 6))
            .unwrap();
        assert_eq!((r.sequence1_stop, r.sequence2_stop, r.score), (0, 0, 5));
    }

    #[test]
    fn semi_local_with_nothing_in_common() {
        let r = align_semi_local_left(&linear(3), &nt("GGGG"), Range::new(0, 4), &nt("CCCC"), Range::new(0, 4)).unwrap();
        assert_eq!((r.sequence1_stop, r.sequence2_stop, r.score), (-1, -1, 0));
        assert!(r.mutations.is_empty());
    }

    #[test]
    fn affine_band_agrees_with_full() {
        let scoring = AffineGapAlignmentScoring::nucleotide_default();
        let (a, b) = (nt("ACGTTTTACGGA"), nt("ACGACGGA"));
        let full = align_global_affine(&scoring, &a, &b);
        for width in [0, 4] {
            let banded = align_banded_affine(&scoring, width, &a, Range::new(0, 12), &b, Range::new(0, 8)).unwrap();
            assert_eq!(banded.score(), 27.0);
            assert_eq!(banded.absolute_mutations(), full.absolute_mutations());
        }
    }

    #[test]
    fn rejects_windows_outside_sequences() {
        let a = nt("ACGT");
        assert!(align_banded(&linear(1), &a, Range::new(0, 5), &a, Range::new(0, 4)).is_err());
        assert!(align_banded(&linear(1), &a, Range::new(3, 1), &a, Range::new(0, 4)).is_err());
    }
}
