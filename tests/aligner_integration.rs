use seqalign::aligner::{
    align_global, align_global_linear, align_local, align_only_substitutions, align_semi_local_left,
};
use seqalign::alignment::calculate_score_for;
use seqalign::{
    AlignmentScoring, BandedAlignerParameters, BioSequence, LinearGapAlignmentScoring, NucleotideSequence,
    Range,
};

fn nt(text: &str) -> NucleotideSequence {
    text.parse().unwrap()
}

fn scoring() -> AlignmentScoring<NucleotideSequence> {
    AlignmentScoring::Linear(LinearGapAlignmentScoring::nucleotide_blast())
}

#[test]
fn alignment_chain_composes() {
    let (s1, s2, s3) = (nt("ATTAGACA"), nt("CATTACCA"), nt("CATAGCCA"));
    let a12 = align_global(&scoring(), &s1, &s2);
    let a23 = align_global(&scoring(), &s2, &s3);
    assert_eq!(a12.absolute_mutations().encode(), "I0C DG4 SA5C");
    assert_eq!(a12.score(), 16.0);
    assert_eq!(a23.absolute_mutations().encode(), "DT2 I5G");
    assert_eq!(a23.score(), 25.0);

    let combined = a12.absolute_mutations().combine_with(a23.absolute_mutations()).unwrap();
    assert_eq!(combined.mutate(&s1).unwrap(), s3);
    let direct = align_global(&scoring(), &s1, &s3);
    assert_eq!(direct.absolute_mutations().mutate(&s1).unwrap(), s3);
    assert_eq!(direct.score(), 16.0);
    let rescored = calculate_score_for(&s1, Range::of_length(8), &combined, &scoring()).unwrap();
    assert!(rescored as f32 <= direct.score());
}

#[test]
fn rendering_and_position_mapping() {
    let al = align_global_linear(
        &LinearGapAlignmentScoring::nucleotide_blast(),
        &nt("ATTAGACA"),
        &nt("ATTAGTACA"),
    );
    assert_eq!(al.absolute_mutations().encode(), "I5T");
    let helper = al.helper().unwrap();
    assert_eq!(helper.seq1, "ATTAG-ACA");
    assert_eq!(helper.markup, "||||| |||");
    assert_eq!(helper.seq2, "ATTAGTACA");
    assert_eq!(al.to_simple_string().unwrap(), "ATTAG-ACA\nATTAGtACA\n");

    assert_eq!(al.convert_to_seq2_position(2), Some(2));
    assert_eq!(al.convert_to_seq2_position(6), Some(7));
    assert_eq!(al.convert_to_seq1_position(5), None);
    assert_eq!(al.convert_to_seq1_position(6), Some(5));
    assert!((al.similarity() - 8.0 / 9.0).abs() < 1e-6);
}

#[test]
fn local_alignment_finds_shared_core() {
    let (s1, s2) = (nt("GGGGATTAGACAGGGG"), nt("CCCATTAGACACCC"));
    let al = align_local(&scoring(), &s1, &s2);
    assert_eq!(al.score(), 40.0);
    assert_eq!(al.sequence1_range(), Range::new(4, 12));
    assert_eq!(al.sequence2_range(), Range::new(3, 11));
    assert_eq!(al.mutated_part().unwrap(), nt("ATTAGACA"));
}

#[test]
fn gap_free_window_and_semi_local_extension() {
    let (s1, s2) = (nt("ATTAGACAGCGCGCGCGC"), nt("ATTAGACATATATATATA"));
    let al = align_only_substitutions(&scoring(), &s1, 0, &s2, 0, 10).unwrap();
    assert_eq!(al.absolute_mutations().encode(), "SG8T SC9A");
    assert_eq!(al.score(), 32.0);

    let params = BandedAlignerParameters::builder(LinearGapAlignmentScoring::nucleotide_blast())
        .with_width(3)
        .build();
    let ext = align_semi_local_left(&params, &s1, Range::of_length(s1.size()), &s2, Range::of_length(s2.size()))
        .unwrap();
    assert_eq!((ext.sequence1_stop, ext.sequence2_stop, ext.score), (7, 7, 40));
}
