use std::io::Cursor;

use seqalign::btop::{decode, parse_hits, HitBlocks, HitRecord};
use seqalign::{AlignError, BioSequence, NucleotideSequence};

const RECORD: &str = "5T-3\t3\t10\t1\t9\t35\t16.4\tsubj1\tATTAGTACA\tATTAG-ACA";
const SUBST: &str = "3AC4\t1\t8\t1\t8\t31\t14.2\tsubj2\tATTAGTAC\tATTCGTAC";

fn nt(text: &str) -> NucleotideSequence {
    text.parse().unwrap()
}

fn report() -> String {
    format!(
        "# BLASTN 2.12.0+\n# Query: q1\n# 2 hits found\n{RECORD}\n{SUBST}\n\
         # Query: q2\n# 0 hits found\n# BLAST processed 2 queries\n"
    )
}

#[test]
fn blocks_follow_query_order() {
    let blocks = parse_hits(Cursor::new(report())).unwrap();
    assert_eq!(blocks.len(), 2);
    assert_eq!(blocks[0].len(), 2);
    assert!(blocks[1].is_empty());
    assert_eq!(blocks[0][1].subject_id, "subj2");
}

#[test]
fn hits_become_alignments_onto_the_query() {
    let subjects = [("subj1", nt("GGATTAGACAGG")), ("subj2", nt("ATTCGTAC"))];
    let query = nt("ATTAGTACA");
    let blocks = parse_hits(Cursor::new(report())).unwrap();
    for hit in &blocks[0] {
        let (_, subject) = subjects.iter().find(|(id, _)| *id == hit.subject_id).unwrap();
        let al = hit.to_alignment(subject).unwrap();
        let query_part = query.get_range_of(&al.sequence2_range()).unwrap();
        assert_eq!(al.mutated_part().unwrap(), query_part, "{}", hit.subject_id);
        assert_eq!(al.score(), hit.score);
    }
}

#[test]
fn substitution_tokens_put_query_letter_first() {
    let muts = decode::<NucleotideSequence>("3AC4").unwrap();
    assert_eq!(muts.encode(), "SC3A");
    assert_eq!(muts.mutate(&nt("ATTCGTAC")).unwrap(), nt("ATTAGTAC"));
}

#[test]
fn streaming_stops_at_first_bad_block() {
    let text = format!("# 1 hits found\n{RECORD}\n# 2 hits found\n{RECORD}\n");
    let mut blocks = HitBlocks::new(Cursor::new(text));
    assert_eq!(blocks.next().unwrap().unwrap().len(), 1);
    assert!(matches!(blocks.next(), Some(Err(AlignError::Parse(_)))));
}

#[test]
fn record_round_trips_through_json() {
    let hit: HitRecord = RECORD.parse().unwrap();
    let json = serde_json::to_string(&hit).unwrap();
    assert_eq!(serde_json::from_str::<HitRecord>(&json).unwrap(), hit);
    assert_eq!(hit.subject_range().unwrap().length(), 8);
}
