//! BLAST-format substitution matrices.
//!
//! The text format is a header row of single-letter symbols followed by one
//! row per symbol: the row symbol, then one integer per header column.
//! Lines starting with `#` are comments.

use std::collections::HashMap;

use super::SubstitutionMatrix;
use crate::error::{AlignError, Result};
use crate::sequence::AminoAcidSequence;
use crate::traits::BioSequence;

fn matrix_error<T>(msg: impl Into<String>) -> Result<T> {
    Err(AlignError::Matrix(msg.into()))
}

/// Parses `text` into a matrix over `S`'s alphabet.
///
/// Alphabet letters missing from the file are filled as follows:
/// - letters listed in `placeholders` take the scores of the file's
///   catch-all wildcard row (`X` for proteins, `N` for nucleotides),
/// - other wildcards get the average over the letters they stand for,
/// - anything else is an error.
///
/// File symbols unknown to the alphabet are ignored.
pub fn parse<S: BioSequence>(text: &str, placeholders: &[char]) -> Result<SubstitutionMatrix<S>> {
    let alphabet = S::alphabet();
    let mut lines = text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with('#'));

    let header: Vec<char> = match lines.next() {
        Some(line) => line
            .split_whitespace()
            .map(single_char)
            .collect::<Result<_>>()?,
        None => return matrix_error("no header row"),
    };

    let mut rows: HashMap<char, Vec<i32>> = HashMap::with_capacity(header.len());
    for (n, line) in lines.enumerate() {
        let mut fields = line.split_whitespace();
        let symbol = match fields.next() {
            Some(f) => single_char(f)?,
            None => continue,
        };
        if !header.contains(&symbol) {
            return matrix_error(format!("row {symbol:?} has no header column"));
        }
        let values = fields
            .map(|f| {
                f.parse::<i32>()
                    .map_err(|_| AlignError::Matrix(format!("row {symbol:?}: {f:?} is not an integer")))
            })
            .collect::<Result<Vec<_>>>()?;
        if values.len() != header.len() {
            return matrix_error(format!(
                "row {} ({symbol:?}) has {} values, header has {} symbols",
                n + 1,
                values.len(),
                header.len()
            ));
        }
        if rows.insert(symbol, values).is_some() {
            return matrix_error(format!("row {symbol:?} appears twice"));
        }
    }
    if rows.len() != header.len() {
        return matrix_error(format!(
            "matrix is not square: {} rows for {} columns",
            rows.len(),
            header.len()
        ));
    }

    let catch_all = alphabet.any_wildcard().map(|w| w.symbol);
    let mut sources: Vec<Option<usize>> = Vec::with_capacity(alphabet.size());
    for &symbol in alphabet.symbols() {
        let direct = header.iter().position(|&h| h.eq_ignore_ascii_case(&symbol));
        let source = match direct {
            Some(col) => Some(col),
            None if placeholders.contains(&symbol) => {
                match catch_all.and_then(|w| header.iter().position(|&h| h == w)) {
                    Some(col) => Some(col),
                    None => {
                        return matrix_error(format!(
                            "placeholder {symbol:?} needs a wildcard row in the matrix"
                        ))
                    }
                }
            }
            None => None,
        };
        sources.push(source);
    }

    let size = alphabet.size();
    let mut scores = vec![0i32; size * size];
    let mut known = vec![false; size];
    for (a, src_a) in sources.iter().enumerate() {
        let Some(ia) = *src_a else { continue };
        known[a] = true;
        let row = &rows[&header[ia]];
        for (b, src_b) in sources.iter().enumerate() {
            if let Some(ib) = *src_b {
                scores[a * size + b] = row[ib];
            }
        }
    }

    for code in 0..size {
        if !known[code] && !alphabet.is_wildcard(code as u8) {
            return matrix_error(format!(
                "no scores for symbol {:?}",
                alphabet.symbol_of(code as u8)
            ));
        }
    }
    SubstitutionMatrix::from_partial(scores, &known)
}

fn single_char(field: &str) -> Result<char> {
    let mut chars = field.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Ok(c),
        _ => matrix_error(format!("{field:?} is not a single symbol")),
    }
}

/// Protein matrices bundled with the crate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum BlastMatrix {
    Blosum45,
    Blosum62,
    Blosum80,
    Pam250,
}

impl BlastMatrix {
    pub const ALL: [BlastMatrix; 4] = [
        BlastMatrix::Blosum45,
        BlastMatrix::Blosum62,
        BlastMatrix::Blosum80,
        BlastMatrix::Pam250,
    ];

    pub fn name(self) -> &'static str {
        match self {
            BlastMatrix::Blosum45 => "BLOSUM45",
            BlastMatrix::Blosum62 => "BLOSUM62",
            BlastMatrix::Blosum80 => "BLOSUM80",
            BlastMatrix::Pam250 => "PAM250",
        }
    }

    pub fn text(self) -> &'static str {
        match self {
            BlastMatrix::Blosum45 => include_str!("matrices/BLOSUM45.txt"),
            BlastMatrix::Blosum62 => include_str!("matrices/BLOSUM62.txt"),
            BlastMatrix::Blosum80 => include_str!("matrices/BLOSUM80.txt"),
            BlastMatrix::Pam250 => include_str!("matrices/PAM250.txt"),
        }
    }

    /// Matrix over the amino-acid alphabet; `_` scores like `X`.
    pub fn matrix(self) -> Result<SubstitutionMatrix<AminoAcidSequence>> {
        parse(self.text(), &['_'])
    }

    /// Customary `(open, extend)` gap costs, where a gap of length `k`
    /// costs `open + (k - 1) * extend`.
    pub fn default_gaps(self) -> (i32, i32) {
        match self {
            BlastMatrix::Blosum45 => (-16, -3),
            BlastMatrix::Blosum62 => (-12, -1),
            BlastMatrix::Blosum80 => (-11, -1),
            BlastMatrix::Pam250 => (-12, -1),
        }
    }

    pub fn by_name(name: &str) -> Option<BlastMatrix> {
        Self::ALL.into_iter().find(|m| m.name().eq_ignore_ascii_case(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alphabet::{AMINO_ACID, NUCLEOTIDE};
    use crate::sequence::NucleotideSequence;

    #[test]
    fn blosum62_values() {
        let m = BlastMatrix::Blosum62.matrix().unwrap();
        let c = |s| AMINO_ACID.code_of(s).unwrap();
        assert_eq!(m.score(c('A'), c('A')), 4);
        assert_eq!(m.score(c('W'), c('W')), 11);
        assert_eq!(m.score(c('A'), c('R')), -1);
        assert_eq!(m.score(c('*'), c('A')), -4);
        assert_eq!(m.score(c('_'), c('A')), m.score(c('X'), c('A')));
        assert_eq!(m.score(c('B'), c('N')), 3);
        assert!(m.is_symmetric());
    }

    #[test]
    fn all_bundled_matrices_parse() {
        for bm in BlastMatrix::ALL {
            let m = bm.matrix().unwrap();
            assert!(m.is_symmetric(), "{}", bm.name());
            assert_eq!(BlastMatrix::by_name(bm.name()), Some(bm));
        }
    }

    #[test]
    fn nucleotide_matrix_fills_wildcards() {
        let text = "   A  C  G  T\nA  5 -4 -4 -4\nC -4  5 -4 -4\nG -4 -4  5 -4\nT -4 -4 -4  5\n";
        let m = parse::<NucleotideSequence>(text, &[]).unwrap();
        let c = |s| NUCLEOTIDE.code_of(s).unwrap();
        assert_eq!(m.score(c('A'), c('A')), 5);
        assert_eq!(m.score(c('R'), c('A')), 0);
        assert_eq!(m.score(c('N'), c('N')), (4 * 5 - 12 * 4) / 16);
    }

    #[test]
    fn malformed_matrices_fail() {
        let short_row = "   A  C  G  T\nA  5 -4 -4\nC -4  5 -4 -4\nG -4 -4  5 -4\nT -4 -4 -4  5\n";
        assert!(matches!(
            parse::<NucleotideSequence>(short_row, &[]),
            Err(AlignError::Matrix(_))
        ));
        let missing_row = "   A  C  G  T\nA  5 -4 -4 -4\nC -4  5 -4 -4\nG -4 -4  5 -4\n";
        assert!(parse::<NucleotideSequence>(missing_row, &[]).is_err());
        let missing_letter = "   A  C  G\nA  5 -4 -4\nC -4  5 -4\nG -4 -4  5\n";
        assert!(parse::<NucleotideSequence>(missing_letter, &[]).is_err());
        assert!(parse::<NucleotideSequence>("", &[]).is_err());
        let no_wildcard = "   A  C  G\nA  5 -4 -4\nC -4  5 -4\nG -4 -4  5\n";
        assert!(parse::<NucleotideSequence>(no_wildcard, &['T']).is_err());
    }
}
