//! BLAST tabular output: BTOP edit strings and hit records.
//!
//! BTOP interleaves match-run lengths with letter pairs, query letter
//! first: `AG` is query `A` against subject `G`, `A-` a query letter facing
//! a subject gap, `-G` the reverse. Decoded mutations turn the aligned
//! subject region into the aligned query region.
//!
//! Hit records carry the fields
//! `btop sstart send qstart qend score bitscore sseqid qseq sseq`, tab
//! separated, with 1-based inclusive coordinates. Each query's records follow
//! a `# N hits found` header line.

use serde::{Deserialize, Serialize};
use std::io::BufRead;
use std::str::FromStr;

use crate::alignment::Alignment;
use crate::error::{invalid, AlignError, Result};
use crate::mutations::{Mutations, MutationsBuilder};
use crate::range::Range;
use crate::traits::BioSequence;

fn parse_error<T>(msg: impl Into<String>) -> Result<T> {
    Err(AlignError::Parse(msg.into()))
}

/// Mutations turning the subject part of a BTOP alignment into the query
/// part; position 0 is the first aligned subject letter.
pub fn decode<S: BioSequence>(btop: &str) -> Result<Mutations<S>> {
    let alphabet = S::alphabet();
    let letter = |ch: char| {
        alphabet
            .exact_code_of(ch)
            .ok_or_else(|| AlignError::Parse(format!("{ch:?} in BTOP is not a {alphabet} letter")))
    };
    let mut builder = MutationsBuilder::<S>::new();
    let mut position = 0i32;
    let mut chars = btop.chars().peekable();
    while let Some(ch) = chars.next() {
        if let Some(digit) = ch.to_digit(10) {
            let mut run = digit as i32;
            while let Some(d) = chars.peek().and_then(|c| c.to_digit(10)) {
                run = run * 10 + d as i32;
                chars.next();
            }
            position += run;
            continue;
        }
        let Some(subject) = chars.next() else {
            return parse_error(format!("BTOP {btop:?} ends inside a letter pair"));
        };
        builder = match (ch, subject) {
            ('-', '-') => return parse_error(format!("BTOP {btop:?} pairs two gaps")),
            ('-', s) => {
                position += 1;
                builder.append_deletion(position - 1, letter(s)?)?
            }
            (q, '-') => builder.append_insertion(position, letter(q)?)?,
            (q, s) => {
                position += 1;
                builder.append_substitution(position - 1, letter(s)?, letter(q)?)?
            }
        };
    }
    Ok(builder.build())
}

/// One line of tabular BLAST output.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HitRecord {
    pub btop: String,
    pub subject_start: usize,
    pub subject_end: usize,
    pub query_start: usize,
    pub query_end: usize,
    pub score: f32,
    pub bit_score: f32,
    pub subject_id: String,
    pub query_aligned: String,
    pub subject_aligned: String,
}

fn field<T: FromStr>(fields: &[&str], index: usize, name: &str) -> Result<T> {
    fields[index]
        .trim()
        .parse()
        .map_err(|_| AlignError::Parse(format!("{name} field {:?} is malformed", fields[index])))
}

impl FromStr for HitRecord {
    type Err = AlignError;

    fn from_str(line: &str) -> Result<Self> {
        let fields: Vec<&str> = line.trim_end_matches(['\r', '\n']).split('\t').collect();
        if fields.len() != 10 {
            return parse_error(format!("hit record has {} fields, expected 10: {line:?}", fields.len()));
        }
        Ok(Self {
            btop: fields[0].to_string(),
            subject_start: field(&fields, 1, "sstart")?,
            subject_end: field(&fields, 2, "send")?,
            query_start: field(&fields, 3, "qstart")?,
            query_end: field(&fields, 4, "qend")?,
            score: field(&fields, 5, "score")?,
            bit_score: field(&fields, 6, "bitscore")?,
            subject_id: fields[7].to_string(),
            query_aligned: fields[8].to_string(),
            subject_aligned: fields[9].to_string(),
        })
    }
}

impl HitRecord {
    /// Aligned subject region as a forward 0-based range.
    pub fn subject_range(&self) -> Result<Range> {
        if self.subject_start == 0 || self.subject_start > self.subject_end {
            return invalid(format!(
                "subject coordinates {}..{} are not a plus-strand hit",
                self.subject_start, self.subject_end
            ));
        }
        Ok(Range::new(self.subject_start as i32 - 1, self.subject_end as i32))
    }

    pub fn query_range(&self) -> Result<Range> {
        if self.query_start == 0 || self.query_start > self.query_end {
            return invalid(format!(
                "query coordinates {}..{} are malformed",
                self.query_start, self.query_end
            ));
        }
        Ok(Range::new(self.query_start as i32 - 1, self.query_end as i32))
    }

    /// Alignment of `subject` (as sequence1) onto the query.
    pub fn to_alignment<S: BioSequence>(&self, subject: &S) -> Result<Alignment<S>> {
        let range1 = self.subject_range()?;
        let mutations = decode::<S>(&self.btop)?.move_by(range1.lower());
        Alignment::new(subject.clone(), mutations, range1, self.query_range()?, self.score)
    }
}

/// Streams hit blocks, one per query, out of tabular BLAST output.
///
/// Comment lines other than the `# N hits found` header are skipped.
pub struct HitBlocks<R: BufRead> {
    lines: std::io::Lines<R>,
    line_number: usize,
}

impl<R: BufRead> HitBlocks<R> {
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
            line_number: 0,
        }
    }

    /// Reads lines up to and including the next hits header.
    fn next_header(&mut self) -> Option<Result<usize>> {
        for line in self.lines.by_ref() {
            self.line_number += 1;
            let line = match line {
                Ok(line) => line,
                Err(e) => return Some(Err(e.into())),
            };
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            if let Some(comment) = trimmed.strip_prefix('#') {
                if let Some(count) = hits_header(comment) {
                    return Some(Ok(count));
                }
                continue;
            }
            return Some(parse_error(format!(
                "line {}: hit record outside a hits block",
                self.line_number
            )));
        }
        None
    }
}

fn hits_header(comment: &str) -> Option<usize> {
    let mut words = comment.split_whitespace();
    let count = words.next()?.parse().ok()?;
    match (words.next(), words.next(), words.next()) {
        (Some("hits" | "hit"), Some("found"), None) => Some(count),
        _ => None,
    }
}

impl<R: BufRead> Iterator for HitBlocks<R> {
    type Item = Result<Vec<HitRecord>>;

    fn next(&mut self) -> Option<Self::Item> {
        let expected = match self.next_header()? {
            Ok(count) => count,
            Err(e) => return Some(Err(e)),
        };
        let mut block = Vec::with_capacity(expected);
        while block.len() < expected {
            let Some(line) = self.lines.next() else {
                return Some(parse_error(format!(
                    "output ended after {} of {expected} hits",
                    block.len()
                )));
            };
            self.line_number += 1;
            let line = match line {
                Ok(line) => line,
                Err(e) => return Some(Err(e.into())),
            };
            if line.trim().is_empty() || line.starts_with('#') {
                return Some(parse_error(format!(
                    "line {}: block announced {expected} hits, found {}",
                    self.line_number,
                    block.len()
                )));
            }
            match line.parse() {
                Ok(record) => block.push(record),
                Err(e) => return Some(Err(e)),
            }
        }
        Some(Ok(block))
    }
}

/// All hit blocks of a finished BLAST run.
pub fn parse_hits<R: BufRead>(reader: R) -> Result<Vec<Vec<HitRecord>>> {
    HitBlocks::new(reader).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sequence::NucleotideSequence;

    fn nt(s: &str) -> NucleotideSequence {
        s.parse().unwrap()
    }

    #[test]
    fn decode_replays_subject_into_query() {
        let btop = "6ATCT38A-1AT3-G1AG1-G1GNCT6-C5G-2-G23";
        let query = nt("CTCAGAACGAACGCTGGCGGCATGCCTAACACATGCAAGTCGAACGAGAAACCAGAGCTTGCTCTGGCGGACAGTGGCGGACGGGTGAGTAACGC");
        let subject = nt("CTCAGATTGAACGCTGGCGGCATGCCTAACACATGCAAGTCGAACGGTAACGCGGGANTTTGCTCCTGGCGACGAGTGGCGGACGGGTGAGTAACGC");
        let muts: Mutations<NucleotideSequence> = decode(btop).unwrap();
        assert_eq!(
            muts.encode(),
            "ST6A ST7C I46A ST47A DG51 SG53A DG55 SN57G ST58C DC65 I71G DG73"
        );
        assert_eq!(muts.mutate(&subject).unwrap(), query);
    }

    #[test]
    fn decode_rejects_garbage() {
        assert!(decode::<NucleotideSequence>("3A").is_err());
        assert!(decode::<NucleotideSequence>("--").is_err());
        assert!(decode::<NucleotideSequence>("2QA").is_err());
        assert!(decode::<NucleotideSequence>("12").unwrap().is_empty());
    }

    const RECORD: &str = "5T-3\t3\t10\t1\t9\t35\t16.4\tsubj1\tATTAGTACA\tATTAG-ACA";

    #[test]
    fn record_to_alignment() {
        let hit: HitRecord = RECORD.parse().unwrap();
        assert_eq!(hit.subject_id, "subj1");
        assert_eq!(hit.bit_score, 16.4);
        let al = hit.to_alignment(&nt("GGATTAGACAGG")).unwrap();
        assert_eq!(al.sequence1_range(), Range::new(2, 10));
        assert_eq!(al.sequence2_range(), Range::new(0, 9));
        assert_eq!(al.absolute_mutations().encode(), "I7T");
        assert_eq!(al.mutated_part().unwrap(), nt("ATTAGTACA"));
        assert_eq!(al.score(), 35.0);
    }

    #[test]
    fn minus_strand_and_short_records_fail() {
        let minus = RECORD.replacen("\t3\t10\t", "\t10\t3\t", 1);
        let hit: HitRecord = minus.parse().unwrap();
        assert!(hit.to_alignment(&nt("GGATTAGACAGG")).is_err());
        assert!("5\t1\t2".parse::<HitRecord>().is_err());
        assert!(RECORD.replace("16.4", "x").parse::<HitRecord>().is_err());
    }

    #[test]
    fn blocks_follow_headers() {
        let text = format!(
            "# BLASTN 2.12.0+\n# Query: q1\n# 1 hits found\n{RECORD}\n# Query: q2\n# 0 hits found\n# Query: q3\n# 2 hits found\n{RECORD}\n{RECORD}\n# BLAST processed 3 queries\n"
        );
        let blocks = parse_hits(text.as_bytes()).unwrap();
        assert_eq!(blocks.iter().map(Vec::len).collect::<Vec<_>>(), vec![1, 0, 2]);
    }

    #[test]
    fn short_block_is_an_error() {
        let text = format!("# 2 hits found\n{RECORD}\n# 0 hits found\n");
        assert!(matches!(parse_hits(text.as_bytes()), Err(AlignError::Parse(_))));
        let text = format!("{RECORD}\n");
        assert!(parse_hits(text.as_bytes()).is_err());
        let text = format!("# 2 hits found\n{RECORD}\n");
        assert!(parse_hits(text.as_bytes()).is_err());
    }
}
