#![cfg(feature = "heavy")]
use rand::{rngs::StdRng, Rng, SeedableRng};
use seqalign::aligner::align_banded;
use seqalign::motif::BitapPattern;
use seqalign::mutations::generator::{generate_mutations, MutationModel};
use seqalign::{BandedAlignerParameters, BioSequence, LinearGapAlignmentScoring, NucleotideSequence, Range};

fn random_dna(rng: &mut StdRng, len: usize) -> NucleotideSequence {
    const ALPHABET: &[u8] = b"ACGT";
    let text: String = (0..len)
        .map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())] as char)
        .collect();
    text.parse().unwrap()
}

#[test]
fn heavy_banded_long_read() {
    let mut rng = StdRng::seed_from_u64(123);
    let reference = random_dna(&mut rng, 50_000);
    let model = MutationModel::uniform(4, 0.001, 0.0002, 0.0002).unwrap();
    let muts = generate_mutations(&reference, &model, &mut rng);
    let read = muts.mutate(&reference).unwrap();
    let params = BandedAlignerParameters::builder(LinearGapAlignmentScoring::nucleotide_blast())
        .with_width(64)
        .build();
    let al = align_banded(
        &params,
        &reference,
        Range::of_length(reference.size()),
        &read,
        Range::of_length(read.size()),
    )
    .unwrap();
    assert_eq!(al.absolute_mutations().mutate(&reference).unwrap(), read);
    // Optimal score is at least that of the generating edits.
    let planted = 5 * reference.size() as i32 - 9 * muts.size() as i32 - 5 * muts.size() as i32;
    assert!(al.score() as i32 >= planted);
}

#[test]
fn heavy_bitap_scan() {
    let mut rng = StdRng::seed_from_u64(7);
    let text = random_dna(&mut rng, 1_000_000);
    let pattern = text.get_range(654_321, 654_353).unwrap();
    let p = BitapPattern::from_sequence(&pattern).unwrap();
    let found = p.exact_search(&text).unwrap();
    assert!(found <= 654_321);
    assert_eq!(text.get_range(found, found + 32).unwrap(), pattern);
}
