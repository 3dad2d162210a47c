//! Example: global, local and banded alignment of two reads.
//!
//! Run with:
//! `cargo run --example align -- ATTAGACA CATTACCA`

use seqalign::aligner::{align_banded, align_global, align_local};
use seqalign::{
    AffineGapAlignmentScoring, Alignment, AlignmentScoring, BandedAlignerParameters, BioSequence,
    LinearGapAlignmentScoring, NucleotideSequence, Range,
};

fn main() -> seqalign::Result<()> {
    let mut args = std::env::args().skip(1);
    let seq1: NucleotideSequence = args.next().as_deref().unwrap_or("GGATTAGACAGTACGG").parse()?;
    let seq2: NucleotideSequence = args.next().as_deref().unwrap_or("CATTAGTACAGTCCA").parse()?;

    let linear = AlignmentScoring::Linear(LinearGapAlignmentScoring::nucleotide_blast());
    let affine = AlignmentScoring::Affine(AffineGapAlignmentScoring::nucleotide_default());

    show("global, linear gaps", &align_global(&linear, &seq1, &seq2))?;
    show("global, affine gaps", &align_global(&affine, &seq1, &seq2))?;
    show("local, linear gaps", &align_local(&linear, &seq1, &seq2))?;

    let params = BandedAlignerParameters::builder(LinearGapAlignmentScoring::nucleotide_blast())
        .with_expected_edits(2)
        .build();
    println!("banding parameters:\n{}\n", params.to_json()?);
    let banded = align_banded(
        &params,
        &seq1,
        Range::of_length(seq1.size()),
        &seq2,
        Range::of_length(seq2.size()),
    )?;
    show("banded, linear gaps", &banded)?;
    Ok(())
}

fn show(title: &str, alignment: &Alignment<NucleotideSequence>) -> seqalign::Result<()> {
    println!("== {title}: score {}", alignment.score());
    if alignment.is_empty() {
        println!("(no positive-scoring region)\n");
        return Ok(());
    }
    println!("mutations: {}", alignment.absolute_mutations());
    println!("{}", alignment.helper()?);
    println!("similarity: {:.2}\n", alignment.similarity());
    Ok(())
}
