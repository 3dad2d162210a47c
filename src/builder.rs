use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::scoring::AlignmentScoring;
use crate::traits::BioSequence;
use crate::utils::default_band_width;

/// Indel count the band is sized for when neither a width nor an edit
/// estimate is given.
pub const DEFAULT_EXPECTED_EDITS: usize = 4;

/// Default for [`BandedAlignerParameters::stop_penalty`].
pub const DEFAULT_STOP_PENALTY: i32 = -30;

/// Settings shared by the banded aligners.
///
/// `stop_penalty` only matters for semi-local extension: a row whose best
/// score trails an all-match run by less than `stop_penalty` ends the
/// extension.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct BandedAlignerParameters<S: BioSequence> {
    scoring: AlignmentScoring<S>,
    width: usize,
    stop_penalty: i32,
}

impl<S: BioSequence> BandedAlignerParameters<S> {
    pub fn builder(scoring: impl Into<AlignmentScoring<S>>) -> BandedAlignerParametersBuilder<S> {
        BandedAlignerParametersBuilder::new(scoring)
    }

    pub fn scoring(&self) -> &AlignmentScoring<S> {
        &self.scoring
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn stop_penalty(&self) -> i32 {
        self.stop_penalty
    }

    pub fn with_width(mut self, width: usize) -> Self {
        self.width = width;
        self
    }

    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

pub struct BandedAlignerParametersBuilder<S: BioSequence> {
    scoring: AlignmentScoring<S>,
    width: Option<usize>,
    expected_edits: usize,
    stop_penalty: i32,
}

impl<S: BioSequence> BandedAlignerParametersBuilder<S> {
    pub fn new(scoring: impl Into<AlignmentScoring<S>>) -> Self {
        Self {
            scoring: scoring.into(),
            width: None,
            expected_edits: DEFAULT_EXPECTED_EDITS,
            stop_penalty: DEFAULT_STOP_PENALTY,
        }
    }
    pub fn with_width(mut self, width: usize) -> Self {
        self.width = Some(width);
        self
    }
    /// Sizes the band from an indel estimate; ignored when a width is set.
    pub fn with_expected_edits(mut self, edits: usize) -> Self {
        self.expected_edits = edits;
        self
    }
    pub fn with_stop_penalty(mut self, stop_penalty: i32) -> Self {
        self.stop_penalty = stop_penalty;
        self
    }
    pub fn build(self) -> BandedAlignerParameters<S> {
        let width = match self.width {
            Some(w) => w,
            None => default_band_width(self.expected_edits),
        };
        BandedAlignerParameters {
            scoring: self.scoring,
            width,
            stop_penalty: self.stop_penalty,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::{AffineGapAlignmentScoring, LinearGapAlignmentScoring};
    use crate::sequence::{AminoAcidSequence, NucleotideSequence};

    #[test]
    fn width_derived_from_expected_edits() {
        let p = BandedAlignerParameters::builder(LinearGapAlignmentScoring::nucleotide_blast()).build();
        assert_eq!(p.width(), 6);
        assert_eq!(p.stop_penalty(), DEFAULT_STOP_PENALTY);
        let p = BandedAlignerParameters::builder(LinearGapAlignmentScoring::nucleotide_blast())
            .with_expected_edits(10)
            .with_width(3)
            .build();
        assert_eq!(p.width(), 3);
    }

    #[test]
    fn json_round_trip() {
        let p: BandedAlignerParameters<NucleotideSequence> =
            BandedAlignerParameters::builder(AffineGapAlignmentScoring::nucleotide_default())
                .with_width(12)
                .with_stop_penalty(-50)
                .build();
        let json = p.to_json().unwrap();
        assert!(json.contains("\"width\": 12"));
        let back = BandedAlignerParameters::from_json(&json).unwrap();
        assert_eq!(p, back);
        assert_eq!(back.with_width(2).width(), 2);
    }

    #[test]
    fn json_for_wrong_alphabet_is_rejected() {
        let p = BandedAlignerParameters::builder(LinearGapAlignmentScoring::nucleotide_blast()).build();
        let json = p.to_json().unwrap();
        let err = BandedAlignerParameters::<AminoAcidSequence>::from_json(&json).unwrap_err();
        assert!(matches!(err, crate::error::AlignError::Config(_)));
    }
}
