//! Example: motif and approximate pattern search with bitap.
//!
//! Run with:
//! `cargo run --example motif_search`

use seqalign::motif::{two_sequence_motif, BitapMatcher, BitapMatcherFilter, BitapPattern};
use seqalign::{BioSequence, Motif, NucleotideSequence};

fn main() -> seqalign::Result<()> {
    let text: NucleotideSequence = "ACTGCGATAAATTAGACAGTACGTAATTATGACAGGCATTGGACAT".parse()?;
    let query: NucleotideSequence = "ATTAGACA".parse()?;

    let pattern = BitapPattern::from_sequence(&query)?;
    println!("exact {query}: {:?}", pattern.exact_search(&text));

    let substitutions: Vec<_> = pattern.mismatch_only_matcher(2, &text, 0, text.size())?.hits().collect();
    println!("up to 2 substitutions (start, errors): {substitutions:?}");

    let last = pattern.mismatch_and_indel_matcher_last(1, &text, 0, text.size())?;
    let ends: Vec<_> = BitapMatcherFilter::new(last).hits().collect();
    println!("one edit, filtered (end, errors): {ends:?}");

    let first = pattern.mismatch_and_indel_matcher_first(1, &text, 0, text.size())?;
    let starts: Vec<_> = BitapMatcherFilter::new(first).hits().collect();
    println!("one edit, right to left (start, errors): {starts:?}");

    let degenerate = Motif::<NucleotideSequence>::parse("ATTRGNCA")?;
    let hits: Vec<_> = (0..text.size()).filter(|&i| degenerate.matches(&text, i)).collect();
    println!("motif {degenerate} matches at {hits:?}");

    let other: NucleotideSequence = "ATTCGGCA".parse()?;
    let merged = two_sequence_motif(&query, 0, &other, 0, query.size())?;
    println!("union of {query} and {other}: {merged}");
    Ok(())
}
