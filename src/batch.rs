//! Fan-out of independent alignments against a shared reference set.
//!
//! Each query is aligned against every reference and the best-scoring
//! alignment is kept. With the `parallel` feature queries are spread over the
//! rayon pool; results are identical to the sequential path.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::aligner::{align_global, align_local};
use crate::alignment::Alignment;
use crate::scoring::AlignmentScoring;
use crate::traits::BioSequence;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlignmentMode {
    #[default]
    Global,
    Local,
}

/// Best alignment of one query; `reference` indexes the reference set.
#[derive(Clone, Debug, PartialEq)]
pub struct BatchHit<S: BioSequence> {
    pub reference: usize,
    pub alignment: Alignment<S>,
}

#[derive(Clone, Debug)]
pub struct BatchAligner<S: BioSequence> {
    references: Arc<[S]>,
    scoring: AlignmentScoring<S>,
    mode: AlignmentMode,
}

impl<S: BioSequence> BatchAligner<S> {
    pub fn new(references: impl Into<Arc<[S]>>, scoring: AlignmentScoring<S>) -> Self {
        Self {
            references: references.into(),
            scoring,
            mode: AlignmentMode::Global,
        }
    }

    pub fn with_mode(mut self, mode: AlignmentMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn references(&self) -> &[S] {
        &self.references
    }

    pub fn mode(&self) -> AlignmentMode {
        self.mode
    }

    /// Best hit of a single query. Ties keep the earliest reference; local
    /// mode reports `None` when no reference shares a positive-scoring core.
    pub fn align_one(&self, query: &S) -> Option<BatchHit<S>> {
        let mut best: Option<BatchHit<S>> = None;
        for (reference, seq) in self.references.iter().enumerate() {
            let alignment = match self.mode {
                AlignmentMode::Global => align_global(&self.scoring, seq, query),
                AlignmentMode::Local => align_local(&self.scoring, seq, query),
            };
            if self.mode == AlignmentMode::Local && alignment.is_empty() {
                continue;
            }
            if best.as_ref().map_or(true, |b| alignment.score() > b.alignment.score()) {
                best = Some(BatchHit { reference, alignment });
            }
        }
        best
    }

    /// One entry per query, in query order.
    pub fn align_all(&self, queries: &[S]) -> Vec<Option<BatchHit<S>>> {
        #[cfg(feature = "tracing")]
        let span = tracing::debug_span!(
            "batch_align",
            queries = queries.len(),
            references = self.references.len(),
            mode = ?self.mode
        );
        #[cfg(feature = "tracing")]
        let _enter = span.enter();

        #[cfg(feature = "parallel")]
        let hits = queries.par_iter().map(|q| self.align_one(q)).collect();
        #[cfg(not(feature = "parallel"))]
        let hits = queries.iter().map(|q| self.align_one(q)).collect();
        hits
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::LinearGapAlignmentScoring;
    use crate::sequence::NucleotideSequence;

    fn nt(text: &str) -> NucleotideSequence {
        text.parse().unwrap()
    }

    fn scoring() -> AlignmentScoring<NucleotideSequence> {
        AlignmentScoring::Linear(LinearGapAlignmentScoring::nucleotide_blast())
    }

    #[test]
    fn picks_best_reference() {
        let refs = vec![nt("GGGGGGGG"), nt("ATTAGACA"), nt("ATTAGTCA")];
        let batch = BatchAligner::new(refs, scoring());
        let hits = batch.align_all(&[nt("ATTAGACA"), nt("ATTAGTCA")]);
        assert_eq!(hits[0].as_ref().unwrap().reference, 1);
        assert_eq!(hits[0].as_ref().unwrap().alignment.score(), 40.0);
        assert_eq!(hits[1].as_ref().unwrap().reference, 2);
    }

    #[test]
    fn ties_keep_first_reference() {
        let refs = vec![nt("ACGT"), nt("ACGT")];
        let hit = BatchAligner::new(refs, scoring()).align_one(&nt("ACGT")).unwrap();
        assert_eq!(hit.reference, 0);
    }

    #[test]
    fn local_mode_skips_unrelated() {
        let refs = vec![nt("AAAAAAAA")];
        let batch = BatchAligner::new(refs, scoring()).with_mode(AlignmentMode::Local);
        let hits = batch.align_all(&[nt("CCCCCC"), nt("GGAAAAGG")]);
        assert!(hits[0].is_none());
        assert_eq!(hits[1].as_ref().unwrap().alignment.score(), 20.0);
    }

    #[test]
    fn empty_reference_set() {
        let batch = BatchAligner::new(Vec::<NucleotideSequence>::new(), scoring());
        assert_eq!(batch.align_all(&[nt("ACGT")]), vec![None]);
    }
}
