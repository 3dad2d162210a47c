use proptest::prelude::*;
use seqalign::aligner::{align_banded, align_global};
use seqalign::alignment::calculate_score;
use seqalign::{
    AffineGapAlignmentScoring, AlignmentScoring, BandedAlignerParameters, BioSequence,
    LinearGapAlignmentScoring, NucleotideSequence, Range,
};

const WIDTH: usize = 6;

fn nt(text: &str) -> NucleotideSequence {
    text.parse().unwrap()
}

/// Applies up to `WIDTH / 2` single-letter edits to `text`.
fn edit(text: &str, edits: &[(usize, u8, usize)]) -> String {
    let mut letters: Vec<char> = text.chars().collect();
    for &(pos, kind, letter) in edits {
        let letter = ['A', 'C', 'G', 'T'][letter];
        match kind {
            0 if !letters.is_empty() => {
                let p = pos % letters.len();
                letters[p] = letter;
            }
            1 if letters.len() > 1 => {
                let p = pos % letters.len();
                letters.remove(p);
            }
            _ => {
                let p = pos % (letters.len() + 1);
                letters.insert(p, letter);
            }
        }
    }
    letters.into_iter().collect()
}

fn check(scoring: AlignmentScoring<NucleotideSequence>, a: &str, b: &str) -> Result<(), TestCaseError> {
    let (s1, s2) = (nt(a), nt(b));
    let params = BandedAlignerParameters::builder(scoring.clone()).with_width(WIDTH).build();
    let banded = align_banded(&params, &s1, Range::of_length(s1.size()), &s2, Range::of_length(s2.size())).unwrap();
    let full = align_global(&scoring, &s1, &s2);
    prop_assert_eq!(banded.score(), full.score());
    prop_assert_eq!(banded.absolute_mutations().mutate(&s1).unwrap(), s2);
    prop_assert_eq!(
        calculate_score(&scoring, s1.size(), banded.absolute_mutations()).unwrap(),
        banded.score() as i32
    );
    Ok(())
}

proptest! {
    #[test]
    fn banded_linear_equals_full_for_few_edits(
        a in "[ACGT]{10,100}",
        edits in prop::collection::vec((0usize..200, 0u8..3, 0usize..4), 0..=WIDTH / 2)
    ) {
        let b = edit(&a, &edits);
        check(AlignmentScoring::Linear(LinearGapAlignmentScoring::nucleotide_blast()), &a, &b)?;
    }

    #[test]
    fn banded_affine_equals_full_for_few_edits(
        a in "[ACGT]{10,100}",
        edits in prop::collection::vec((0usize..200, 0u8..3, 0usize..4), 0..=WIDTH / 2)
    ) {
        let b = edit(&a, &edits);
        check(AlignmentScoring::Affine(AffineGapAlignmentScoring::nucleotide_default()), &a, &b)?;
    }
}

#[test]
fn narrow_band_is_not_optimal() {
    let scoring = AlignmentScoring::Linear(LinearGapAlignmentScoring::nucleotide_blast());
    let (s1, s2) = (nt("ACGTACGTAC"), nt("TACGTACGTAC"));
    let narrow = BandedAlignerParameters::builder(scoring.clone()).with_width(0).build();
    let banded = align_banded(&narrow, &s1, Range::of_length(10), &s2, Range::of_length(11)).unwrap();
    let full = align_global(&scoring, &s1, &s2);
    assert!(banded.score() <= full.score());
    assert_eq!(full.score(), 45.0);
    assert_eq!(banded.absolute_mutations().mutate(&s1).unwrap(), s2);
}
