//! Concrete sequence kinds and the consuming [`SequenceBuilder`].
//!
//! All kinds share their storage through `Arc<[u8]>`; cloning a sequence
//! never copies codes, so one reference set can be handed to many workers.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::marker::PhantomData;
use std::str::FromStr;
use std::sync::Arc;

use crate::alphabet::{Alphabet, AMINO_ACID, INCOMPLETE_NUCLEOTIDE, NUCLEOTIDE};
use crate::error::{invalid, AlignError, Result};
use crate::traits::{sealed, BioSequence};

macro_rules! sequence_kind {
    ($(#[$doc:meta])* $name:ident, $alphabet:ident) => {
        $(#[$doc])*
        #[derive(Clone, PartialEq, Eq, Hash)]
        pub struct $name {
            codes: Arc<[u8]>,
        }

        impl sealed::Sealed for $name {}

        impl BioSequence for $name {
            fn alphabet() -> &'static Alphabet {
                &$alphabet
            }

            fn from_codes(codes: Vec<u8>) -> Self {
                debug_assert!(codes.iter().all(|&c| (c as usize) < $alphabet.size()));
                Self {
                    codes: codes.into(),
                }
            }

            fn codes(&self) -> &[u8] {
                &self.codes
            }
        }

        impl $name {
            pub fn new(text: &str) -> Result<Self> {
                Self::parse_text(text)
            }

            pub fn empty() -> Self {
                Self::from_codes(Vec::new())
            }

            pub fn builder() -> SequenceBuilder<Self> {
                SequenceBuilder::new()
            }
        }

        impl FromStr for $name {
            type Err = AlignError;

            fn from_str(s: &str) -> Result<Self> {
                Self::parse_text(s)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                let alphabet = Self::alphabet();
                for &c in self.codes.iter() {
                    write!(f, "{}", alphabet.symbol_of(c))?;
                }
                Ok(())
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self)
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
                serializer.collect_str(self)
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
                let text = String::deserialize(deserializer)?;
                Self::parse_text(&text).map_err(serde::de::Error::custom)
            }
        }
    };
}

sequence_kind!(
    /// DNA over `A G C T` and the IUPAC wildcards.
    NucleotideSequence,
    NUCLEOTIDE
);

sequence_kind!(
    /// Protein sequence; `*` is a stop codon, `_` a frame-shift placeholder.
    AminoAcidSequence,
    AMINO_ACID
);

sequence_kind!(
    /// Nucleotides with `.` marking letters that are not known at all.
    IncompleteNucleotideSequence,
    INCOMPLETE_NUCLEOTIDE
);

impl IncompleteNucleotideSequence {
    pub fn is_complete(&self) -> bool {
        let unknown = INCOMPLETE_NUCLEOTIDE.size() as u8 - 1;
        !self.codes.iter().any(|&c| c == unknown)
    }

    /// Plain nucleotide view, when no letter is unknown.
    pub fn to_complete(&self) -> Option<NucleotideSequence> {
        self.is_complete()
            .then(|| NucleotideSequence::from_codes(self.codes.to_vec()))
    }
}

impl From<&NucleotideSequence> for IncompleteNucleotideSequence {
    fn from(seq: &NucleotideSequence) -> Self {
        Self::from_codes(seq.codes().to_vec())
    }
}

/// Accumulates codes, then freezes them into an immutable sequence.
///
/// `build` consumes the builder, so nothing can append after the freeze.
#[derive(Clone, Debug)]
pub struct SequenceBuilder<S: BioSequence> {
    codes: Vec<u8>,
    _kind: PhantomData<S>,
}

impl<S: BioSequence> Default for SequenceBuilder<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: BioSequence> SequenceBuilder<S> {
    pub fn new() -> Self {
        Self {
            codes: Vec::new(),
            _kind: PhantomData,
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            codes: Vec::with_capacity(capacity),
            _kind: PhantomData,
        }
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    pub fn append(mut self, code: u8) -> Result<Self> {
        if code as usize >= S::alphabet().size() {
            return invalid(format!("code {code} not in the {} alphabet", S::alphabet()));
        }
        self.codes.push(code);
        Ok(self)
    }

    pub fn append_symbol(self, symbol: char) -> Result<Self> {
        match S::alphabet().code_of(symbol) {
            Some(code) => self.append(code),
            None => invalid(format!("symbol {symbol:?} not in the {} alphabet", S::alphabet())),
        }
    }

    pub fn append_sequence(mut self, seq: &S) -> Self {
        self.codes.extend_from_slice(seq.codes());
        self
    }

    pub(crate) fn push(&mut self, code: u8) {
        self.codes.push(code);
    }

    pub fn build(self) -> S {
        S::from_codes(self.codes)
    }
}
