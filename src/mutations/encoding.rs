//! Text notation for edit lists.
//!
//! `S<from><pos><to>` substitution, `D<from><pos>` deletion, `I<pos><to>`
//! insertion, space-separated. The decoder accepts any mix of whitespace and
//! commas between tokens, or none at all.

use super::list::Mutations;
use super::mutation::{Mutation, MAX_POSITION};
use crate::alphabet::Alphabet;
use crate::error::{AlignError, Result};
use crate::traits::BioSequence;

pub fn encode<S: BioSequence>(mutations: &Mutations<S>) -> String {
    let alphabet = S::alphabet();
    mutations
        .iter()
        .map(|m| m.encode(alphabet))
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn decode<S: BioSequence>(text: &str) -> Result<Mutations<S>> {
    let alphabet = S::alphabet();
    let chars: Vec<char> = text.chars().collect();
    let mut out = Vec::new();
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        if c.is_whitespace() || c == ',' {
            i += 1;
            continue;
        }
        let (m, next) = token(&chars, i, alphabet).ok_or_else(|| {
            AlignError::Parse(format!("unexpected {c:?} at offset {i} in {text:?}"))
        })??;
        out.push(m);
        i = next;
    }
    Mutations::new(out).map_err(|e| AlignError::Parse(format!("{text:?}: {e}")))
}

fn letter(chars: &[char], at: usize, alphabet: &Alphabet) -> Option<u8> {
    chars.get(at).and_then(|&c| alphabet.exact_code_of(c))
}

fn number(chars: &[char], at: usize) -> Option<(Result<i32>, usize)> {
    let end = chars[at.min(chars.len())..]
        .iter()
        .position(|c| !c.is_ascii_digit())
        .map_or(chars.len(), |p| at + p);
    if end == at {
        return None;
    }
    let digits: String = chars[at..end].iter().collect();
    let value = match digits.parse::<i32>() {
        Ok(v) if v <= MAX_POSITION => Ok(v),
        _ => Err(AlignError::Parse(format!("position {digits} out of range"))),
    };
    Some((value, end))
}

/// One token starting at `at`; `None` when nothing matches there.
fn token(chars: &[char], at: usize, alphabet: &Alphabet) -> Option<Result<(Mutation, usize)>> {
    match chars[at] {
        'S' => {
            let from = letter(chars, at + 1, alphabet)?;
            let (pos, end) = number(chars, at + 2)?;
            let to = letter(chars, end, alphabet)?;
            Some(pos.map(|p| (Mutation::substitution(p, from, to), end + 1)))
        }
        'D' => {
            let from = letter(chars, at + 1, alphabet)?;
            let (pos, end) = number(chars, at + 2)?;
            Some(pos.map(|p| (Mutation::deletion(p, from), end)))
        }
        'I' => {
            let (pos, end) = number(chars, at + 1)?;
            let to = letter(chars, end, alphabet)?;
            Some(pos.map(|p| (Mutation::insertion(p, to), end + 1)))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sequence::{AminoAcidSequence, NucleotideSequence};
    use crate::traits::BioSequence;

    #[test]
    fn decode_and_apply() {
        let m = Mutations::<NucleotideSequence>::decode("DA0 I6C SA7G").unwrap();
        assert_eq!(m.size(), 3);
        let seq = NucleotideSequence::new("ATTAGACA").unwrap();
        assert_eq!(m.mutate(&seq).unwrap().to_string(), "TTAGACCG");
        assert_eq!(m.encode(), "DA0 I6C SA7G");
    }

    #[test]
    fn decode_tolerates_separators() {
        let a = Mutations::<NucleotideSequence>::decode("SA1T,DC4  I9G").unwrap();
        let b = Mutations::<NucleotideSequence>::decode("SA1TDC4I9G").unwrap();
        assert_eq!(a, b);
        assert!(Mutations::<NucleotideSequence>::decode("").unwrap().is_empty());
    }

    #[test]
    fn decode_rejects_garbage() {
        assert!(Mutations::<NucleotideSequence>::decode("SA1").is_err());
        assert!(Mutations::<NucleotideSequence>::decode("Q12").is_err());
        assert!(Mutations::<NucleotideSequence>::decode("SA9T SA1T").is_err());
        assert!(Mutations::<NucleotideSequence>::decode("DA99999999999").is_err());
    }

    #[test]
    fn amino_acid_notation() {
        let m = Mutations::<AminoAcidSequence>::decode("SC0A I2* D_3").unwrap();
        let alphabet = AminoAcidSequence::alphabet();
        assert_eq!(m.get(0).from_letter(), alphabet.code_of('C').unwrap());
        assert_eq!(m.encode(), "SC0A I2* D_3");
    }
}
