//! Scoring models for alignment.
//!
//! - [`SubstitutionMatrix`]: letter-by-letter scores over one alphabet,
//! - [`LinearGapAlignmentScoring`]: matrix plus a per-letter gap penalty,
//! - [`AffineGapAlignmentScoring`]: matrix plus gap-open and gap-extend,
//! - [`AlignmentScoring`]: either of the two.
//!
//! All models are typed by sequence kind, so a protein matrix cannot be
//! handed to a nucleotide aligner.

pub mod blast;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

pub use blast::BlastMatrix;

use crate::error::{invalid, Result};
use crate::sequence::{AminoAcidSequence, NucleotideSequence};
use crate::traits::BioSequence;

/// `score(from, to)` table over all codes of `S`'s alphabet, wildcards
/// included.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct SubstitutionMatrix<S: BioSequence> {
    scores: Arc<[i32]>,
    _kind: PhantomData<S>,
}

impl<S: BioSequence> SubstitutionMatrix<S> {
    fn size() -> usize {
        S::alphabet().size()
    }

    /// Full table, row-major by `from`.
    pub fn from_scores(scores: Vec<i32>) -> Result<Self> {
        let size = Self::size();
        if scores.len() != size * size {
            return invalid(format!(
                "{} scores do not fill a {size}x{size} matrix for the {} alphabet",
                scores.len(),
                S::alphabet()
            ));
        }
        Ok(Self {
            scores: scores.into(),
            _kind: PhantomData,
        })
    }

    /// `matched` on the diagonal, `mismatched` elsewhere; wildcard rows are
    /// averaged over the letters they stand for.
    pub fn symmetric(matched: i32, mismatched: i32) -> Self {
        let alphabet = S::alphabet();
        let size = alphabet.size();
        let basic = alphabet.basic_size();
        let mut scores = vec![0; size * size];
        let mut known = vec![false; size];
        for a in 0..basic {
            known[a] = true;
            for b in 0..basic {
                scores[a * size + b] = if a == b { matched } else { mismatched };
            }
        }
        Self::fill_wildcards(&mut scores, &known);
        Self {
            scores: scores.into(),
            _kind: PhantomData,
        }
    }

    /// Completes a table whose rows are set only for `known` codes.
    pub(crate) fn from_partial(mut scores: Vec<i32>, known: &[bool]) -> Result<Self> {
        Self::fill_wildcards(&mut scores, known);
        Self::from_scores(scores)
    }

    fn fill_wildcards(scores: &mut [i32], known: &[bool]) {
        let alphabet = S::alphabet();
        let size = alphabet.size();
        for a in 0..size {
            for b in 0..size {
                if known[a] && known[b] {
                    continue;
                }
                let wa = alphabet.wildcard(a as u8).matching_codes();
                let wb = alphabet.wildcard(b as u8).matching_codes();
                let mut sum = 0i32;
                for &x in wa {
                    for &y in wb {
                        sum += scores[x as usize * size + y as usize];
                    }
                }
                scores[a * size + b] = sum / (wa.len() * wb.len()) as i32;
            }
        }
    }

    pub fn from_blast_text(text: &str, placeholders: &[char]) -> Result<Self> {
        blast::parse(text, placeholders)
    }

    #[inline]
    pub fn score(&self, from: u8, to: u8) -> i32 {
        self.scores[from as usize * Self::size() + to as usize]
    }

    pub fn is_symmetric(&self) -> bool {
        let size = Self::size();
        (0..size).all(|a| (0..a).all(|b| self.scores[a * size + b] == self.scores[b * size + a]))
    }

    /// Shared diagonal score of the basic letters, if they all agree.
    pub fn uniform_basic_match_score(&self) -> Option<i32> {
        let basic = S::alphabet().basic_size() as u8;
        let first = self.score(0, 0);
        (1..basic).all(|c| self.score(c, c) == first).then_some(first)
    }

    pub fn as_slice(&self) -> &[i32] {
        &self.scores
    }
}

impl<S: BioSequence> fmt::Debug for SubstitutionMatrix<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SubstitutionMatrix<{}>({} cells)", S::alphabet(), self.scores.len())
    }
}

#[derive(Serialize, Deserialize)]
struct MatrixRepr {
    alphabet: String,
    scores: Vec<i32>,
}

impl<S: BioSequence> Serialize for SubstitutionMatrix<S> {
    fn serialize<Ser: Serializer>(&self, serializer: Ser) -> std::result::Result<Ser::Ok, Ser::Error> {
        MatrixRepr {
            alphabet: S::alphabet().name().to_string(),
            scores: self.scores.to_vec(),
        }
        .serialize(serializer)
    }
}

impl<'de, S: BioSequence> Deserialize<'de> for SubstitutionMatrix<S> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let repr = MatrixRepr::deserialize(deserializer)?;
        if repr.alphabet != S::alphabet().name() {
            return Err(serde::de::Error::custom(format!(
                "matrix for {} used with {} sequences",
                repr.alphabet,
                S::alphabet()
            )));
        }
        Self::from_scores(repr.scores).map_err(serde::de::Error::custom)
    }
}

/// Substitution scores plus one penalty per gapped letter.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct LinearGapAlignmentScoring<S: BioSequence> {
    pub matrix: SubstitutionMatrix<S>,
    pub gap_penalty: i32,
}

impl<S: BioSequence> LinearGapAlignmentScoring<S> {
    pub fn new(matrix: SubstitutionMatrix<S>, gap_penalty: i32) -> Result<Self> {
        if gap_penalty > 0 {
            return invalid(format!("gap penalty {gap_penalty} must not be positive"));
        }
        Ok(Self {
            matrix,
            gap_penalty,
        })
    }

    pub fn symmetric(matched: i32, mismatched: i32, gap_penalty: i32) -> Result<Self> {
        Self::new(SubstitutionMatrix::symmetric(matched, mismatched), gap_penalty)
    }

    #[inline]
    pub fn score(&self, from: u8, to: u8) -> i32 {
        self.matrix.score(from, to)
    }

    pub fn uniform_basic_match_score(&self) -> Option<i32> {
        self.matrix.uniform_basic_match_score()
    }
}

impl LinearGapAlignmentScoring<NucleotideSequence> {
    /// BLASTN defaults: match 5, mismatch -4, gap -5.
    pub fn nucleotide_blast() -> Self {
        Self {
            matrix: SubstitutionMatrix::symmetric(5, -4),
            gap_penalty: -5,
        }
    }
}

impl LinearGapAlignmentScoring<AminoAcidSequence> {
    pub fn from_blast(matrix: BlastMatrix, gap_penalty: i32) -> Result<Self> {
        Self::new(matrix.matrix()?, gap_penalty)
    }
}

/// Substitution scores plus affine gaps: a gap of `k` letters costs
/// `gap_open + (k - 1) * gap_extend`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct AffineGapAlignmentScoring<S: BioSequence> {
    pub matrix: SubstitutionMatrix<S>,
    pub gap_open: i32,
    pub gap_extend: i32,
}

impl<S: BioSequence> AffineGapAlignmentScoring<S> {
    pub fn new(matrix: SubstitutionMatrix<S>, gap_open: i32, gap_extend: i32) -> Result<Self> {
        if gap_open > 0 || gap_extend > 0 {
            return invalid(format!(
                "gap penalties ({gap_open}, {gap_extend}) must not be positive"
            ));
        }
        Ok(Self {
            matrix,
            gap_open,
            gap_extend,
        })
    }

    pub fn symmetric(matched: i32, mismatched: i32, gap_open: i32, gap_extend: i32) -> Result<Self> {
        Self::new(SubstitutionMatrix::symmetric(matched, mismatched), gap_open, gap_extend)
    }

    #[inline]
    pub fn score(&self, from: u8, to: u8) -> i32 {
        self.matrix.score(from, to)
    }

    /// Cost of one gap run of `length` letters.
    pub fn gap_cost(&self, length: usize) -> i32 {
        if length == 0 {
            0
        } else {
            self.gap_open + (length as i32 - 1) * self.gap_extend
        }
    }

    pub fn uniform_basic_match_score(&self) -> Option<i32> {
        self.matrix.uniform_basic_match_score()
    }
}

impl AffineGapAlignmentScoring<NucleotideSequence> {
    /// Match 5, mismatch -4, open -10, extend -1.
    pub fn nucleotide_default() -> Self {
        Self {
            matrix: SubstitutionMatrix::symmetric(5, -4),
            gap_open: -10,
            gap_extend: -1,
        }
    }
}

impl AffineGapAlignmentScoring<AminoAcidSequence> {
    /// Bundled matrix with its customary gap costs.
    pub fn from_blast(matrix: BlastMatrix) -> Result<Self> {
        let (open, extend) = matrix.default_gaps();
        Self::new(matrix.matrix()?, open, extend)
    }
}

/// Either gap model.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(bound = "", tag = "model", rename_all = "snake_case")]
pub enum AlignmentScoring<S: BioSequence> {
    Linear(LinearGapAlignmentScoring<S>),
    Affine(AffineGapAlignmentScoring<S>),
}

impl<S: BioSequence> AlignmentScoring<S> {
    pub fn matrix(&self) -> &SubstitutionMatrix<S> {
        match self {
            AlignmentScoring::Linear(s) => &s.matrix,
            AlignmentScoring::Affine(s) => &s.matrix,
        }
    }

    #[inline]
    pub fn score(&self, from: u8, to: u8) -> i32 {
        self.matrix().score(from, to)
    }

    pub fn is_affine(&self) -> bool {
        matches!(self, AlignmentScoring::Affine(_))
    }
}

impl<S: BioSequence> From<LinearGapAlignmentScoring<S>> for AlignmentScoring<S> {
    fn from(s: LinearGapAlignmentScoring<S>) -> Self {
        AlignmentScoring::Linear(s)
    }
}

impl<S: BioSequence> From<AffineGapAlignmentScoring<S>> for AlignmentScoring<S> {
    fn from(s: AffineGapAlignmentScoring<S>) -> Self {
        AlignmentScoring::Affine(s)
    }
}
