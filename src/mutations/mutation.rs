//! Single edits packed into one `i32`.
//!
//! Layout (low to high bits):
//! - `0..5`: `to` letter code,
//! - `5..7`: raw type (`0x20` substitution, `0x40` deletion, `0x60` insertion),
//! - `7..12`: `from` letter code,
//! - `12..`: position in the source sequence.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::alphabet::Alphabet;
use crate::error::{invalid, Result};

pub(crate) const LETTER_MASK: i32 = 0x1F;
pub(crate) const TYPE_MASK: i32 = 0x60;
pub(crate) const FROM_OFFSET: i32 = 7;
pub(crate) const POSITION_OFFSET: i32 = 12;
pub const MAX_POSITION: i32 = 0xFFFFF;

const RAW_SUBSTITUTION: i32 = 0x20;
const RAW_DELETION: i32 = 0x40;
const RAW_INSERTION: i32 = 0x60;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MutationType {
    Substitution,
    Deletion,
    Insertion,
}

impl MutationType {
    fn raw(self) -> i32 {
        match self {
            MutationType::Substitution => RAW_SUBSTITUTION,
            MutationType::Deletion => RAW_DELETION,
            MutationType::Insertion => RAW_INSERTION,
        }
    }

    /// Leading letter of the text notation.
    pub fn letter(self) -> char {
        match self {
            MutationType::Substitution => 'S',
            MutationType::Deletion => 'D',
            MutationType::Insertion => 'I',
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Mutation(i32);

impl Mutation {
    pub(crate) fn create(kind: MutationType, position: i32, from: u8, to: u8) -> Self {
        debug_assert!(from as i32 <= LETTER_MASK && to as i32 <= LETTER_MASK);
        Mutation(
            position.wrapping_shl(POSITION_OFFSET as u32)
                | ((from as i32) << FROM_OFFSET)
                | kind.raw()
                | to as i32,
        )
    }

    pub fn substitution(position: i32, from: u8, to: u8) -> Self {
        Self::create(MutationType::Substitution, position, from, to)
    }

    pub fn deletion(position: i32, from: u8) -> Self {
        Self::create(MutationType::Deletion, position, from, 0)
    }

    pub fn insertion(position: i32, to: u8) -> Self {
        Self::create(MutationType::Insertion, position, 0, to)
    }

    /// Validates a packed code read from storage.
    pub fn from_code(code: i32) -> Result<Self> {
        if code & TYPE_MASK == 0 {
            return invalid(format!("0x{code:x} is not a mutation code"));
        }
        Ok(Mutation(code))
    }

    pub fn code(self) -> i32 {
        self.0
    }

    pub fn kind(self) -> MutationType {
        match self.0 & TYPE_MASK {
            RAW_SUBSTITUTION => MutationType::Substitution,
            RAW_DELETION => MutationType::Deletion,
            _ => MutationType::Insertion,
        }
    }

    pub fn position(self) -> i32 {
        self.0 >> POSITION_OFFSET
    }

    pub fn from_letter(self) -> u8 {
        ((self.0 >> FROM_OFFSET) & LETTER_MASK) as u8
    }

    pub fn to_letter(self) -> u8 {
        (self.0 & LETTER_MASK) as u8
    }

    pub fn is_substitution(self) -> bool {
        self.0 & TYPE_MASK == RAW_SUBSTITUTION
    }

    pub fn is_deletion(self) -> bool {
        self.0 & TYPE_MASK == RAW_DELETION
    }

    pub fn is_insertion(self) -> bool {
        self.0 & TYPE_MASK == RAW_INSERTION
    }

    pub fn is_indel(self) -> bool {
        !self.is_substitution()
    }

    pub fn move_by(self, offset: i32) -> Self {
        Mutation(self.0.wrapping_add(offset.wrapping_shl(POSITION_OFFSET as u32)))
    }

    /// Same edit with the `to` letter taken from `other`.
    pub(crate) fn with_to_of(self, other: Mutation) -> Self {
        Mutation((self.0 & !LETTER_MASK) | (other.0 & LETTER_MASK))
    }

    /// Compact notation: `SA12T`, `DA12`, `I12T`.
    pub fn encode(self, alphabet: &Alphabet) -> String {
        let pos = self.position();
        match self.kind() {
            MutationType::Substitution => format!(
                "S{}{}{}",
                alphabet.symbol_of(self.from_letter()),
                pos,
                alphabet.symbol_of(self.to_letter())
            ),
            MutationType::Deletion => {
                format!("D{}{}", alphabet.symbol_of(self.from_letter()), pos)
            }
            MutationType::Insertion => {
                format!("I{}{}", pos, alphabet.symbol_of(self.to_letter()))
            }
        }
    }

    /// Readable form: `S12:A->T`, `D12:A`, `I12:T`.
    pub fn describe(self, alphabet: &Alphabet) -> String {
        let pos = self.position();
        match self.kind() {
            MutationType::Substitution => format!(
                "S{}:{}->{}",
                pos,
                alphabet.symbol_of(self.from_letter()),
                alphabet.symbol_of(self.to_letter())
            ),
            MutationType::Deletion => format!("D{}:{}", pos, alphabet.symbol_of(self.from_letter())),
            MutationType::Insertion => format!("I{}:{}", pos, alphabet.symbol_of(self.to_letter())),
        }
    }
}

impl fmt::Debug for Mutation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}:{}->{}",
            self.kind().letter(),
            self.position(),
            self.from_letter(),
            self.to_letter()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alphabet::NUCLEOTIDE;

    #[test]
    fn packing_layout() {
        let m = Mutation::substitution(3, 1, 2);
        assert_eq!(m.code(), (3 << 12) | (1 << 7) | 0x20 | 2);
        assert_eq!(m.kind(), MutationType::Substitution);
        assert_eq!((m.position(), m.from_letter(), m.to_letter()), (3, 1, 2));

        let d = Mutation::deletion(MAX_POSITION, 3);
        assert_eq!(d.position(), MAX_POSITION);
        assert!(d.is_deletion() && d.is_indel());

        let i = Mutation::insertion(0, 4);
        assert!(i.is_insertion());
        assert_eq!(i.to_letter(), 4);
        assert!(Mutation::from_code(0).is_err());
        assert_eq!(Mutation::from_code(i.code()).unwrap(), i);
    }

    #[test]
    fn move_keeps_letters() {
        let m = Mutation::substitution(10, 0, 3).move_by(-4);
        assert_eq!(m.position(), 6);
        assert_eq!(m.to_letter(), 3);
        let neg = Mutation::insertion(1, 2).move_by(-3);
        assert_eq!(neg.position(), -2);
        assert_eq!(neg.move_by(3), Mutation::insertion(1, 2));
    }

    #[test]
    fn text_forms() {
        let a = &*NUCLEOTIDE;
        assert_eq!(Mutation::substitution(12, 0, 3).encode(a), "SA12T");
        assert_eq!(Mutation::deletion(3, 2).encode(a), "DC3");
        assert_eq!(Mutation::insertion(7, 1).encode(a), "I7G");
        assert_eq!(Mutation::substitution(12, 0, 3).describe(a), "S12:A->T");
        assert_eq!(Mutation::deletion(3, 2).describe(a), "D3:C");
    }
}
