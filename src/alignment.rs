//! Alignment results and score recomputation.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

use crate::error::{invalid, Result};
use crate::mutations::{Mutation, MutationType, Mutations};
use crate::range::Range;
use crate::scoring::{AffineGapAlignmentScoring, AlignmentScoring, LinearGapAlignmentScoring};
use crate::traits::BioSequence;

/// `mutations` turn `sequence1[sequence1_range]` into
/// `sequence2[sequence2_range]`.
///
/// Mutation positions are absolute positions in `sequence1`. Field order is
/// the binary record layout: sequence1, mutations, range1, range2, score.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(bound = "")]
pub struct Alignment<S: BioSequence> {
    sequence1: S,
    mutations: Mutations<S>,
    sequence1_range: Range,
    sequence2_range: Range,
    score: f32,
}

impl<S: BioSequence> Alignment<S> {
    /// Rejects reversed ranges, and ranges or mutations reaching outside
    /// `sequence1`.
    pub fn new(
        sequence1: S,
        mutations: Mutations<S>,
        sequence1_range: Range,
        sequence2_range: Range,
        score: f32,
    ) -> Result<Self> {
        if sequence1_range.is_reverse() || sequence2_range.is_reverse() {
            return invalid("alignment ranges must be forward");
        }
        if sequence1_range.lower() < 0 || sequence1_range.upper() > sequence1.size() as i32 {
            return invalid(format!(
                "range {sequence1_range} outside sequence1 of length {}",
                sequence1.size()
            ));
        }
        if sequence2_range.lower() < 0 {
            return invalid(format!("range {sequence2_range} starts before sequence2"));
        }
        if let (Some(first), Some(last)) = (mutations.as_slice().first(), mutations.as_slice().last()) {
            let fits = |m: &Mutation| {
                if m.is_insertion() {
                    sequence1_range.contains_boundary(m.position())
                } else {
                    sequence1_range.contains(m.position())
                }
            };
            if !fits(first) || !fits(last) {
                return invalid(format!(
                    "mutations {mutations} do not fit inside {sequence1_range}"
                ));
            }
        }
        if sequence1_range.length() + mutations.length_delta() != sequence2_range.length() {
            return invalid(format!(
                "{sequence1_range} edited by {mutations} cannot produce {sequence2_range}"
            ));
        }
        Ok(Self {
            sequence1,
            mutations,
            sequence1_range,
            sequence2_range,
            score,
        })
    }

    /// Alignment covering nothing, used when no positive-scoring local
    /// alignment exists.
    pub fn empty(sequence1: S) -> Self {
        Self {
            sequence1,
            mutations: Mutations::empty(),
            sequence1_range: Range::new(0, 0),
            sequence2_range: Range::new(0, 0),
            score: 0.0,
        }
    }

    pub(crate) fn from_parts(
        sequence1: S,
        mutations: Mutations<S>,
        sequence1_range: Range,
        sequence2_range: Range,
        score: i32,
    ) -> Self {
        debug_assert_eq!(
            sequence1_range.length() + mutations.length_delta(),
            sequence2_range.length()
        );
        Self {
            sequence1,
            mutations,
            sequence1_range,
            sequence2_range,
            score: score as f32,
        }
    }

    /// True for an alignment covering nothing, e.g. a local search without hits.
    pub fn is_empty(&self) -> bool {
        self.sequence1_range.is_empty() && self.sequence2_range.is_empty()
    }

    pub fn sequence1(&self) -> &S {
        &self.sequence1
    }

    /// Edits in `sequence1` coordinates.
    pub fn absolute_mutations(&self) -> &Mutations<S> {
        &self.mutations
    }

    /// Mutations shifted so position 0 is the start of `sequence1_range`.
    pub fn relative_mutations(&self) -> Mutations<S> {
        self.mutations.move_by(-self.sequence1_range.lower())
    }

    /// Aligned region of `sequence1`.
    pub fn sequence1_range(&self) -> Range {
        self.sequence1_range
    }

    /// Aligned region of the second sequence.
    pub fn sequence2_range(&self) -> Range {
        self.sequence2_range
    }

    pub fn score(&self) -> f32 {
        self.score
    }

    /// The aligned part of sequence2, rebuilt from sequence1.
    pub fn mutated_part(&self) -> Result<S> {
        let part = self.sequence1.get_range_of(&self.sequence1_range)?;
        self.relative_mutations().mutate(&part)
    }

    /// Position in sequence2 aligned to `position` in sequence1; `None` when
    /// outside the alignment or deleted.
    pub fn convert_to_seq2_position(&self, position: i32) -> Option<i32> {
        if !self.sequence1_range.contains_boundary(position) {
            return None;
        }
        let converted = self.mutations.convert_position(position);
        (converted >= 0)
            .then(|| converted - self.sequence1_range.lower() + self.sequence2_range.lower())
    }

    /// Position in sequence1 aligned to `position` in sequence2; `None` when
    /// outside the alignment or inserted.
    pub fn convert_to_seq1_position(&self, position: i32) -> Option<i32> {
        if !self.sequence2_range.contains_boundary(position) {
            return None;
        }
        let inverted = self.relative_mutations().invert();
        let converted = inverted.convert_position(position - self.sequence2_range.lower());
        (converted >= 0).then(|| converted + self.sequence1_range.lower())
    }

    /// Identical aligned letters over the alignment length.
    pub fn similarity(&self) -> f32 {
        let mut substitutions = 0;
        let mut deletions = 0;
        let mut insertions = 0;
        for m in self.mutations.iter() {
            if m.is_substitution() {
                substitutions += 1;
            } else if m.is_deletion() {
                deletions += 1;
            } else {
                insertions += 1;
            }
        }
        let length = self.sequence1_range.length() + insertions;
        if length == 0 {
            return 0.0;
        }
        let matches = self.sequence1_range.length() - substitutions - deletions;
        matches as f32 / length as f32
    }

    /// Gapped text rendering of both aligned parts.
    pub fn helper(&self) -> Result<AlignmentHelper> {
        let alphabet = S::alphabet();
        let mut seq1 = String::new();
        let mut markup = String::new();
        let mut seq2 = String::new();
        let muts = self.mutations.as_slice();
        let mut next = 0;
        let lower = self.sequence1_range.lower();
        let upper = self.sequence1_range.upper();
        let mut pos = lower;
        while pos < upper || next < muts.len() {
            match muts.get(next) {
                Some(m) if m.position() <= pos => {
                    match m.kind() {
                        MutationType::Insertion => {
                            seq1.push('-');
                            markup.push(' ');
                            seq2.push(alphabet.symbol_of(m.to_letter()));
                        }
                        MutationType::Deletion => {
                            seq1.push(alphabet.symbol_of(m.from_letter()));
                            markup.push(' ');
                            seq2.push('-');
                            pos += 1;
                        }
                        MutationType::Substitution => {
                            seq1.push(alphabet.symbol_of(m.from_letter()));
                            markup.push(' ');
                            seq2.push(alphabet.symbol_of(m.to_letter()));
                            pos += 1;
                        }
                    }
                    next += 1;
                }
                _ => {
                    if pos >= upper {
                        return invalid(format!("mutations {} run past {}", self.mutations, self.sequence1_range));
                    }
                    let symbol = alphabet.symbol_of(self.sequence1.code_at(pos as usize));
                    seq1.push(symbol);
                    markup.push('|');
                    seq2.push(symbol);
                    pos += 1;
                }
            }
        }
        Ok(AlignmentHelper {
            seq1,
            markup,
            seq2,
            seq1_from: lower,
            seq2_from: self.sequence2_range.lower(),
        })
    }

    /// Two-line form: substituted letters in lowercase, gaps as `-`.
    pub fn to_simple_string(&self) -> Result<String> {
        let helper = self.helper()?;
        let mark = |line: &str| -> String {
            line.chars()
                .zip(helper.markup.chars())
                .map(|(c, m)| if m == '|' || c == '-' { c } else { c.to_ascii_lowercase() })
                .collect()
        };
        Ok(format!("{}\n{}\n", mark(&helper.seq1), mark(&helper.seq2)))
    }
}

#[derive(Deserialize)]
#[serde(bound = "")]
struct AlignmentRepr<S: BioSequence> {
    sequence1: S,
    mutations: Mutations<S>,
    sequence1_range: Range,
    sequence2_range: Range,
    score: f32,
}

impl<'de, S: BioSequence> Deserialize<'de> for Alignment<S> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let r = AlignmentRepr::<S>::deserialize(deserializer)?;
        Alignment::new(r.sequence1, r.mutations, r.sequence1_range, r.sequence2_range, r.score)
            .map_err(serde::de::Error::custom)
    }
}

/// Gapped rendering produced by [`Alignment::helper`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AlignmentHelper {
    pub seq1: String,
    pub markup: String,
    pub seq2: String,
    pub seq1_from: i32,
    pub seq2_from: i32,
}

impl AlignmentHelper {
    /// Identical columns over all columns.
    pub fn identity(&self) -> f32 {
        let total = self.markup.chars().count();
        if total == 0 {
            return 0.0;
        }
        self.markup.chars().filter(|&c| c == '|').count() as f32 / total as f32
    }
}

impl fmt::Display for AlignmentHelper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let letters = |line: &str| line.chars().filter(|&c| c != '-').count() as i32;
        let w = (self.seq1_from.max(self.seq2_from) + 1).to_string().len();
        writeln!(
            f,
            "{:>w$} {} {}",
            self.seq1_from,
            self.seq1,
            self.seq1_from + letters(&self.seq1) - 1
        )?;
        writeln!(f, "{:>w$} {}", "", self.markup)?;
        write!(
            f,
            "{:>w$} {} {}",
            self.seq2_from,
            self.seq2,
            self.seq2_from + letters(&self.seq2) - 1
        )
    }
}

/// Per-gap bookkeeping shared by the score recomputations.
struct GapTracker<'a, S: BioSequence> {
    scoring: &'a AlignmentScoring<S>,
    previous: Option<Mutation>,
}

impl<'a, S: BioSequence> GapTracker<'a, S> {
    fn gap(&mut self, m: Mutation) -> i32 {
        let extends = self.previous.is_some_and(|p| {
            (p.is_deletion() && m.is_deletion() && m.position() == p.position() + 1)
                || (p.is_insertion() && m.is_insertion() && m.position() == p.position())
        });
        self.previous = Some(m);
        match self.scoring {
            AlignmentScoring::Linear(s) => s.gap_penalty,
            AlignmentScoring::Affine(s) if extends => s.gap_extend,
            AlignmentScoring::Affine(s) => s.gap_open,
        }
    }

    fn letter(&mut self) {
        self.previous = None;
    }
}

/// Score of `mutations` applied to a sequence of `length` basic letters.
///
/// Needs a scoring whose basic letters share one match score; use
/// [`calculate_score_for`] otherwise.
pub fn calculate_score<S: BioSequence>(
    scoring: &AlignmentScoring<S>,
    length: usize,
    mutations: &Mutations<S>,
) -> Result<i32> {
    let matched = match scoring.matrix().uniform_basic_match_score() {
        Some(m) => m,
        None => return invalid("scoring has no uniform match score; score against the sequence"),
    };
    let mut gaps = GapTracker {
        scoring,
        previous: None,
    };
    let mut score = matched * length as i32;
    for m in mutations.iter() {
        if m.is_indel() {
            score += gaps.gap(m);
        } else {
            gaps.letter();
            score += scoring.score(m.from_letter(), m.to_letter());
        }
        if !m.is_insertion() {
            score -= matched;
        }
    }
    Ok(score)
}

/// Score of `mutations` applied to `sequence1[range]`, read letter by letter.
pub fn calculate_score_for<S: BioSequence>(
    sequence1: &S,
    range: Range,
    mutations: &Mutations<S>,
    scoring: &AlignmentScoring<S>,
) -> Result<i32> {
    if range.is_reverse() || range.lower() < 0 || range.upper() > sequence1.size() as i32 {
        return invalid(format!(
            "range {range} outside sequence of length {}",
            sequence1.size()
        ));
    }
    let mut gaps = GapTracker {
        scoring,
        previous: None,
    };
    let muts = mutations.as_slice();
    let mut next = 0;
    let mut pos = range.lower();
    let mut score = 0;
    while pos < range.upper() || next < muts.len() {
        match muts.get(next) {
            Some(&m) if m.position() <= pos => {
                if !m.is_insertion() && (pos >= range.upper() || m.position() < range.lower()) {
                    return invalid(format!("{} outside {range}", m.describe(S::alphabet())));
                }
                if m.is_indel() {
                    score += gaps.gap(m);
                } else {
                    gaps.letter();
                    score += scoring.score(m.from_letter(), m.to_letter());
                }
                if !m.is_insertion() {
                    pos += 1;
                }
                next += 1;
            }
            _ => {
                if pos >= range.upper() {
                    return invalid(format!("mutations run past {range}"));
                }
                gaps.letter();
                let c = sequence1.code_at(pos as usize);
                score += scoring.score(c, c);
                pos += 1;
            }
        }
    }
    Ok(score)
}

/// Linear-gap shortcut for [`calculate_score`].
pub fn calculate_linear_score<S: BioSequence>(
    scoring: &LinearGapAlignmentScoring<S>,
    length: usize,
    mutations: &Mutations<S>,
) -> Result<i32> {
    calculate_score(&AlignmentScoring::Linear(scoring.clone()), length, mutations)
}

/// Affine-gap shortcut for [`calculate_score`].
pub fn calculate_affine_score<S: BioSequence>(
    scoring: &AffineGapAlignmentScoring<S>,
    length: usize,
    mutations: &Mutations<S>,
) -> Result<i32> {
    calculate_score(&AlignmentScoring::Affine(scoring.clone()), length, mutations)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sequence::NucleotideSequence;

    fn nt(s: &str) -> NucleotideSequence {
        NucleotideSequence::new(s).unwrap()
    }

    fn muts(s: &str) -> Mutations<NucleotideSequence> {
        Mutations::decode(s).unwrap()
    }

    #[test]
    fn construction_checks_ranges() {
        let seq = nt("ACGTACGT");
        assert!(Alignment::new(seq.clone(), muts("SC1A"), Range::new(0, 8), Range::new(0, 8), 1.0).is_ok());
        assert!(Alignment::new(seq.clone(), muts("SC1A"), Range::new(2, 8), Range::new(0, 6), 1.0).is_err());
        assert!(Alignment::new(seq.clone(), muts("DC1"), Range::new(0, 8), Range::new(0, 8), 1.0).is_err());
        assert!(Alignment::new(seq.clone(), muts(""), Range::new(0, 9), Range::new(0, 9), 1.0).is_err());
        assert!(Alignment::new(seq, muts("I8A"), Range::new(0, 8), Range::new(3, 12), 1.0).is_ok());
    }

    #[test]
    fn position_conversion() {
        let seq = nt("ACGTACGT");
        let a = Alignment::new(seq, muts("DG2 I5T"), Range::new(1, 7), Range::new(10, 16), 0.0).unwrap();
        assert_eq!(a.convert_to_seq2_position(1), Some(10));
        assert_eq!(a.convert_to_seq2_position(2), None);
        assert_eq!(a.convert_to_seq2_position(3), Some(11));
        assert_eq!(a.convert_to_seq2_position(5), Some(14));
        assert_eq!(a.convert_to_seq2_position(0), None);
        assert_eq!(a.convert_to_seq1_position(11), Some(3));
        assert_eq!(a.convert_to_seq1_position(13), None);
        assert_eq!(a.mutated_part().unwrap().to_string(), "CTATCG");
    }

    #[test]
    fn helper_and_simple_string() {
        let seq = nt("ATTAGACA");
        let a = Alignment::new(seq, muts("DA0 I6C SA7G"), Range::new(0, 8), Range::new(0, 8), 0.0).unwrap();
        let h = a.helper().unwrap();
        assert_eq!(h.seq1, "ATTAGA-CA");
        assert_eq!(h.markup, " ||||| | ");
        assert_eq!(h.seq2, "-TTAGACCG");
        assert_eq!(a.to_simple_string().unwrap(), "aTTAGA-Ca\n-TTAGAcCg\n");
        assert!((a.similarity() - 6.0 / 9.0).abs() < 1e-6);
        assert!((h.identity() - 6.0 / 9.0).abs() < 1e-6);
    }

    #[test]
    fn linear_score_recomputation() {
        let scoring: AlignmentScoring<NucleotideSequence> =
            LinearGapAlignmentScoring::nucleotide_blast().into();
        assert_eq!(calculate_score(&scoring, 8, &muts("")).unwrap(), 40);
        assert_eq!(calculate_score(&scoring, 8, &muts("DA0 I6C SA7G")).unwrap(), 6 * 5 - 5 - 5 - 4);
        let seq = nt("ATTAGACA");
        assert_eq!(
            calculate_score_for(&seq, Range::new(0, 8), &muts("DA0 I6C SA7G"), &scoring).unwrap(),
            6 * 5 - 5 - 5 - 4
        );
    }

    #[test]
    fn affine_runs_open_once() {
        let scoring: AlignmentScoring<NucleotideSequence> =
            AffineGapAlignmentScoring::nucleotide_default().into();
        let m = muts("DA1 DC2 DG3");
        assert_eq!(calculate_score(&scoring, 8, &m).unwrap(), 5 * 5 - 10 - 1 - 1);
        let split = muts("DA1 DG3");
        assert_eq!(calculate_score(&scoring, 8, &split).unwrap(), 6 * 5 - 10 - 10);
        let ins = muts("I4A I4C I5G");
        assert_eq!(calculate_score(&scoring, 8, &ins).unwrap(), 8 * 5 - 10 - 1 - 10);
        let seq = nt("GACGTACC");
        assert_eq!(
            calculate_score_for(&seq, Range::new(0, 8), &m, &scoring).unwrap(),
            5 * 5 - 12
        );
    }

    #[test]
    fn uniform_match_required() {
        use crate::scoring::BlastMatrix;
        use crate::sequence::AminoAcidSequence;
        let scoring: AlignmentScoring<AminoAcidSequence> =
            LinearGapAlignmentScoring::from_blast(BlastMatrix::Blosum62, -4).unwrap().into();
        assert!(calculate_score(&scoring, 4, &Mutations::empty()).is_err());
        let seq = AminoAcidSequence::new("CASS").unwrap();
        assert_eq!(
            calculate_score_for(&seq, Range::new(0, 4), &Mutations::empty(), &scoring).unwrap(),
            9 + 4 + 4 + 4
        );
    }

    #[test]
    fn bincode_layout_order() {
        let seq = nt("ACGT");
        let a = Alignment::new(seq, muts("SC1A"), Range::new(0, 4), Range::new(2, 6), 17.0).unwrap();
        let bytes = bincode::serialize(&a).unwrap();
        let tail = &bytes[bytes.len() - 20..];
        assert_eq!(&tail[0..4], &0i32.to_le_bytes());
        assert_eq!(&tail[4..8], &4i32.to_le_bytes());
        assert_eq!(&tail[8..12], &2i32.to_le_bytes());
        assert_eq!(&tail[12..16], &6i32.to_le_bytes());
        assert_eq!(&tail[16..20], &17f32.to_le_bytes());
        let back: Alignment<NucleotideSequence> = bincode::deserialize(&bytes).unwrap();
        assert_eq!(back, a);
    }
}
