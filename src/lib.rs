//! Pairwise biological sequence alignment.
//!
//! This crate aligns nucleotide and amino-acid sequences with dynamic
//! programming and describes the result as a compact list of edits.
//!
//! ## Core idea
//! 1. Build typed sequences ([`NucleotideSequence`], [`AminoAcidSequence`]).
//! 2. Pick a scoring model ([`AlignmentScoring`]: linear or affine gaps).
//! 3. Run an aligner from [`aligner`] to obtain an [`Alignment`]: the
//!    [`Mutations`] turning one window of `seq1` into a window of `seq2`,
//!    both [`Range`]s and the score.
//!
//! Mutations form a small algebra (combine, invert, move, extract) and can be
//! replayed against a sequence to reconstruct the other one.
//!
//! ## Quick start
//! ```
//! use seqalign::aligner::align_global;
//! use seqalign::{AlignmentScoring, LinearGapAlignmentScoring, NucleotideSequence};
//!
//! let seq1: NucleotideSequence = "ATTAGACA".parse().unwrap();
//! let seq2: NucleotideSequence = "ATTAGTACA".parse().unwrap();
//! let scoring = AlignmentScoring::Linear(LinearGapAlignmentScoring::nucleotide_blast());
//!
//! let alignment = align_global(&scoring, &seq1, &seq2);
//! assert_eq!(alignment.score(), 35.0);
//! assert_eq!(alignment.absolute_mutations().mutate(&seq1).unwrap(), seq2);
//! ```
//!
//! ## Modules
//! - full and banded aligners in global, local and semi-local modes
//! - [`motif`]: positional patterns and bit-parallel (bitap) search
//! - [`btop`]: decoding of BLAST traceback strings and tabular hit blocks
//! - [`external`]: streaming wrapper around a command-line aligner
//! - [`batch`]: fan-out of many queries over a shared reference set
//! - [`io`]: binary alignment records

pub mod aligner;
pub mod alignment;
pub mod alphabet;
pub mod batch;
pub mod btop;
pub mod builder;
pub mod error;
pub mod external;
pub mod io;
pub mod motif;
pub mod mutations;
pub mod range;
pub mod scoring;
pub mod sequence;
pub mod traits;
pub mod utils;

pub use crate::alignment::{Alignment, AlignmentHelper};
pub use crate::alphabet::{Alphabet, AMINO_ACID, INCOMPLETE_NUCLEOTIDE, NUCLEOTIDE};
pub use crate::batch::{AlignmentMode, BatchAligner, BatchHit};
pub use crate::builder::{BandedAlignerParameters, BandedAlignerParametersBuilder};
pub use crate::error::{AlignError, Result};
pub use crate::motif::{Motif, MotifBuilder};
pub use crate::mutations::{Mutation, MutationType, Mutations, MutationsBuilder};
pub use crate::range::Range;
pub use crate::scoring::{
    AffineGapAlignmentScoring, AlignmentScoring, LinearGapAlignmentScoring, SubstitutionMatrix,
};
pub use crate::sequence::{AminoAcidSequence, IncompleteNucleotideSequence, NucleotideSequence, SequenceBuilder};
pub use crate::traits::BioSequence;
