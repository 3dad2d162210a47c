//! Fixed symbol sets and their wildcard tables.
//!
//! Every alphabet is a process-wide singleton:
//! - [`NUCLEOTIDE`]: `A G C T` plus the IUPAC ambiguity letters,
//! - [`AMINO_ACID`]: stop `*`, the 20 standard residues, the `_` frame-shift
//!   placeholder and the `X`/`B`/`Z` wildcards,
//! - [`INCOMPLETE_NUCLEOTIDE`]: nucleotides plus `.` for an unknown letter.
//!
//! Codes are dense `u8` values. The first `basic_size()` codes are basic
//! letters; the rest are wildcards resolving to a set of basic codes.

use once_cell::sync::Lazy;
use std::fmt;

use crate::utils::jenkins_wang_64;

/// A letter that stands for a set of basic letters.
///
/// Basic letters are wildcards of themselves with a single matching code.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Wildcard {
    pub symbol: char,
    pub code: u8,
    matching: Vec<u8>,
    mask: u64,
}

impl Wildcard {
    pub fn new(symbol: char, code: u8, mut matching: Vec<u8>) -> Self {
        matching.sort_unstable();
        matching.dedup();
        let mask = matching.iter().fold(0u64, |m, &c| m | (1u64 << c));
        Self {
            symbol,
            code,
            matching,
            mask,
        }
    }

    /// Basic codes this wildcard stands for, ascending.
    pub fn matching_codes(&self) -> &[u8] {
        &self.matching
    }

    pub fn count(&self) -> usize {
        self.matching.len()
    }

    pub fn is_basic(&self) -> bool {
        self.matching.len() == 1 && self.matching[0] == self.code
    }

    pub fn matches(&self, code: u8) -> bool {
        code < 64 && self.mask & (1u64 << code) != 0
    }

    pub fn intersects_with(&self, other: &Wildcard) -> bool {
        self.mask & other.mask != 0
    }

    /// Bit set of the matching basic codes.
    pub fn mask(&self) -> u64 {
        self.mask
    }

    /// Deterministically picks one matching basic code for `seed`.
    ///
    /// The distribution over seeds is uniform across the matching codes.
    pub fn uniformly_distributed_basic_code(&self, seed: i64) -> u8 {
        if self.is_basic() {
            return self.code;
        }
        let h = jenkins_wang_64(seed).unsigned_abs();
        self.matching[(h % self.matching.len() as u64) as usize]
    }
}

#[derive(Debug)]
pub struct Alphabet {
    name: &'static str,
    symbols: Vec<char>,
    basic_size: usize,
    wildcards: Vec<Wildcard>,
    lookup: [Option<u8>; 128],
    unknown: Option<u8>,
    complement: Option<Vec<u8>>,
}

impl Alphabet {
    fn build(
        name: &'static str,
        basic: &str,
        wildcards: &[(char, &str)],
        aliases: &[(char, char)],
        unknown: Option<char>,
    ) -> Self {
        let mut symbols: Vec<char> = basic.chars().collect();
        let basic_size = symbols.len();
        symbols.extend(wildcards.iter().map(|(s, _)| *s));
        if let Some(u) = unknown {
            symbols.push(u);
        }

        let mut lookup = [None; 128];
        for (code, &s) in symbols.iter().enumerate() {
            lookup[s.to_ascii_uppercase() as usize] = Some(code as u8);
            lookup[s.to_ascii_lowercase() as usize] = Some(code as u8);
        }
        for &(alias, target) in aliases {
            lookup[alias as usize] = lookup[target as usize];
        }

        let mut table: Vec<Wildcard> = (0..basic_size)
            .map(|c| Wildcard::new(symbols[c], c as u8, vec![c as u8]))
            .collect();
        for (i, (s, letters)) in wildcards.iter().enumerate() {
            let codes = letters.chars().filter_map(|c| lookup[c as usize]).collect();
            table.push(Wildcard::new(*s, (basic_size + i) as u8, codes));
        }
        let unknown_code = unknown.map(|u| {
            let code = (symbols.len() - 1) as u8;
            table.push(Wildcard::new(u, code, (0..basic_size as u8).collect()));
            code
        });

        Self {
            name,
            symbols,
            basic_size,
            wildcards: table,
            lookup,
            unknown: unknown_code,
            complement: None,
        }
    }

    fn with_complement(mut self, pairs: &[(char, char)]) -> Self {
        let mut table: Vec<u8> = (0..self.size() as u8).collect();
        for &(a, b) in pairs {
            if let (Some(x), Some(y)) = (self.code_of(a), self.code_of(b)) {
                table[x as usize] = y;
                table[y as usize] = x;
            }
        }
        self.complement = Some(table);
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn size(&self) -> usize {
        self.symbols.len()
    }

    pub fn basic_size(&self) -> usize {
        self.basic_size
    }

    /// Code for `symbol`, case-insensitive.
    ///
    /// Alphabets with an unknown letter map every unrecognised symbol to it.
    pub fn code_of(&self, symbol: char) -> Option<u8> {
        self.exact_code_of(symbol).or(self.unknown)
    }

    /// Code for `symbol` without the unknown-letter fallback.
    pub fn exact_code_of(&self, symbol: char) -> Option<u8> {
        if symbol.is_ascii() {
            self.lookup[symbol as usize]
        } else {
            None
        }
    }

    pub fn symbol_of(&self, code: u8) -> char {
        self.symbols[code as usize]
    }

    pub fn symbols(&self) -> &[char] {
        &self.symbols
    }

    pub fn wildcard(&self, code: u8) -> &Wildcard {
        &self.wildcards[code as usize]
    }

    pub fn wildcard_for_symbol(&self, symbol: char) -> Option<&Wildcard> {
        self.code_of(symbol).map(|c| self.wildcard(c))
    }

    pub fn wildcards(&self) -> &[Wildcard] {
        &self.wildcards
    }

    /// Widest wildcard (`N`, `X`), if the alphabet has any. Ties go to the
    /// lower code.
    pub fn any_wildcard(&self) -> Option<&Wildcard> {
        self.wildcards[self.basic_size..]
            .iter()
            .fold(None, |best: Option<&Wildcard>, w| match best {
                Some(b) if b.count() >= w.count() => Some(b),
                _ => Some(w),
            })
    }

    pub fn is_wildcard(&self, code: u8) -> bool {
        (code as usize) >= self.basic_size
    }

    /// Watson-Crick complement of `code`, when the alphabet defines one.
    pub fn complement(&self, code: u8) -> Option<u8> {
        self.complement.as_ref().map(|t| t[code as usize])
    }

    pub fn has_complement(&self) -> bool {
        self.complement.is_some()
    }

    pub fn by_name(name: &str) -> Option<&'static Alphabet> {
        [&*NUCLEOTIDE, &*AMINO_ACID, &*INCOMPLETE_NUCLEOTIDE]
            .into_iter()
            .find(|a| a.name.eq_ignore_ascii_case(name))
    }
}

impl PartialEq for Alphabet {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for Alphabet {}

impl fmt::Display for Alphabet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

const NUCLEOTIDE_WILDCARDS: &[(char, &str)] = &[
    ('N', "ATGC"),
    ('R', "AG"),
    ('Y', "CT"),
    ('S', "GC"),
    ('W', "AT"),
    ('K', "GT"),
    ('M', "AC"),
    ('B', "CGT"),
    ('D', "AGT"),
    ('H', "ACT"),
    ('V', "ACG"),
];

const NUCLEOTIDE_COMPLEMENT: &[(char, char)] = &[
    ('A', 'T'),
    ('G', 'C'),
    ('R', 'Y'),
    ('K', 'M'),
    ('B', 'V'),
    ('D', 'H'),
];

pub static NUCLEOTIDE: Lazy<Alphabet> = Lazy::new(|| {
    Alphabet::build("nucleotide", "AGCT", NUCLEOTIDE_WILDCARDS, &[], None)
        .with_complement(NUCLEOTIDE_COMPLEMENT)
});

pub static AMINO_ACID: Lazy<Alphabet> = Lazy::new(|| {
    Alphabet::build(
        "aminoacid",
        "*ACDEFGHIKLMNPQRSTVWY_",
        &[('X', "ACDEFGHIKLMNPQRSTVWY"), ('B', "DN"), ('Z', "EQ")],
        &[('~', '_')],
        None,
    )
});

pub static INCOMPLETE_NUCLEOTIDE: Lazy<Alphabet> = Lazy::new(|| {
    Alphabet::build(
        "incomplete_nucleotide",
        "AGCT",
        NUCLEOTIDE_WILDCARDS,
        &[],
        Some('.'),
    )
    .with_complement(NUCLEOTIDE_COMPLEMENT)
});
