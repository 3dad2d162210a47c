//! Ordered, immutable edit lists.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use super::mutation::{Mutation, MutationType};
use crate::error::{invalid, AlignError, Result};
use crate::range::Range;
use crate::sequence::SequenceBuilder;
use crate::traits::BioSequence;

/// Position-sorted list of [`Mutation`]s turning one `S` into another.
///
/// At a shared position insertions come before the substitution or
/// deletion of the letter sitting there.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Mutations<S: BioSequence> {
    data: Arc<[Mutation]>,
    _kind: PhantomData<S>,
}

impl<S: BioSequence> Default for Mutations<S> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<S: BioSequence> Mutations<S> {
    /// List with no edits; replays to the source unchanged.
    pub fn empty() -> Self {
        Self::from_sorted(Vec::new())
    }

    pub(crate) fn from_sorted(data: Vec<Mutation>) -> Self {
        debug_assert!(super::is_sorted(&data));
        Self {
            data: data.into(),
            _kind: PhantomData,
        }
    }

    /// Wraps externally produced mutations, checking order and letter codes.
    pub fn new(data: Vec<Mutation>) -> Result<Self> {
        if !super::is_sorted(&data) {
            return invalid("mutations are out of order");
        }
        let size = S::alphabet().size() as u8;
        for m in &data {
            let bad_from = !m.is_insertion() && m.from_letter() >= size;
            let bad_to = !m.is_deletion() && m.to_letter() >= size;
            if bad_from || bad_to || m.position() < 0 {
                return invalid(format!("mutation {m:?} does not fit the {} alphabet", S::alphabet()));
            }
        }
        Ok(Self::from_sorted(data))
    }

    /// Packed codes, as stored.
    pub fn from_codes(codes: &[i32]) -> Result<Self> {
        let data = codes
            .iter()
            .map(|&c| Mutation::from_code(c))
            .collect::<Result<Vec<_>>>()?;
        Self::new(data)
    }

    /// Number of mutations.
    pub fn size(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Mutation at `index`.
    ///
    /// # Panics
    /// Panics if `index >= self.size()`.
    pub fn get(&self, index: usize) -> Mutation {
        self.data[index]
    }

    /// Mutations in list order.
    pub fn as_slice(&self) -> &[Mutation] {
        &self.data
    }

    pub fn iter(&self) -> impl Iterator<Item = Mutation> + '_ {
        self.data.iter().copied()
    }

    /// Position of the mutation at `index`. Panics when out of bounds.
    pub fn position_at(&self, index: usize) -> i32 {
        self.data[index].position()
    }

    /// Kind of the mutation at `index`. Panics when out of bounds.
    pub fn kind_at(&self, index: usize) -> MutationType {
        self.data[index].kind()
    }

    /// Position of the first mutation, `None` for an empty list.
    pub fn first_mutation_position(&self) -> Option<i32> {
        self.data.first().map(|m| m.position())
    }

    /// Position of the last mutation, `None` for an empty list.
    pub fn last_mutation_position(&self) -> Option<i32> {
        self.data.last().map(|m| m.position())
    }

    /// Span between the first and the last mutated position.
    pub fn mutated_range(&self) -> Option<Range> {
        Some(Range::new(
            self.first_mutation_position()?,
            self.last_mutation_position()?,
        ))
    }

    /// Length of the mutated sequence minus the length of the source.
    pub fn length_delta(&self) -> i32 {
        self.iter()
            .map(|m| match m.kind() {
                MutationType::Deletion => -1,
                MutationType::Insertion => 1,
                MutationType::Substitution => 0,
            })
            .sum()
    }

    /// Number of insertions and deletions.
    pub fn count_of_indels(&self) -> usize {
        self.iter().filter(|m| m.is_indel()).count()
    }

    /// Number of mutations of the given kind.
    pub fn count_of(&self, kind: MutationType) -> usize {
        self.iter().filter(|m| m.kind() == kind).count()
    }

    /// Mutations with indices `[from, to)`.
    pub fn slice(&self, from: usize, to: usize) -> Self {
        Self::from_sorted(self.data[from..to].to_vec())
    }

    /// True when every substitution and deletion names the letter `seq` has.
    pub fn is_compatible_with(&self, seq: &S) -> bool {
        let size = seq.size() as i32;
        self.iter().all(|m| {
            let p = m.position();
            if m.is_insertion() {
                p <= size
            } else {
                p >= 0 && p < size && seq.code_at(p as usize) == m.from_letter()
            }
        })
    }

    /// Replays the edits against `seq`.
    pub fn mutate(&self, seq: &S) -> Result<S> {
        let len = (seq.size() as i64 + self.length_delta() as i64).max(0) as usize;
        let mut builder = SequenceBuilder::<S>::with_capacity(len);
        let mut pointer = 0usize;
        let mut next = 0usize;
        while pointer < seq.size() || next < self.data.len() {
            match self.data.get(next) {
                Some(&m) if m.position() as i64 <= pointer as i64 => {
                    if m.is_insertion() {
                        builder.push(m.to_letter());
                    } else {
                        if pointer >= seq.size() {
                            return invalid(format!(
                                "{} is past the end of a sequence of length {}",
                                m.describe(S::alphabet()),
                                seq.size()
                            ));
                        }
                        if m.from_letter() != seq.code_at(pointer) {
                            return Err(AlignError::InconsistentData(format!(
                                "mutation {} but seq[{pointer}]={}",
                                m.describe(S::alphabet()),
                                seq.symbol_at(pointer)
                            )));
                        }
                        if m.is_substitution() {
                            builder.push(m.to_letter());
                        }
                        pointer += 1;
                    }
                    next += 1;
                }
                _ => {
                    if pointer >= seq.size() {
                        return invalid(format!(
                            "mutation at {} is past the end of a sequence of length {}",
                            self.data[next].position(),
                            seq.size()
                        ));
                    }
                    builder.push(seq.code_at(pointer));
                    pointer += 1;
                }
            }
        }
        Ok(builder.build())
    }

    /// Maps a source position to the mutated sequence.
    ///
    /// A deleted letter maps to `-1 - p`, where `p` is the position right
    /// after the place it was removed from.
    pub fn convert_position(&self, position: i32) -> i32 {
        let mut result = position;
        for m in self.iter() {
            let p = m.position();
            if p > position {
                return result;
            }
            match m.kind() {
                MutationType::Deletion => {
                    if p == position {
                        return -result - 1;
                    }
                    result -= 1;
                }
                MutationType::Insertion => result += 1,
                MutationType::Substitution => {}
            }
        }
        result
    }

    /// Composes `self` then `other` into a single edit list.
    ///
    /// `other` must describe edits of the sequence `self` produces.
    pub fn combine_with(&self, other: &Mutations<S>) -> Result<Self> {
        let m2 = &other.data;
        let mut result: Vec<Mutation> = Vec::with_capacity(self.data.len() + m2.len());
        let mut p2 = 0usize;
        let mut delta = 0i32;

        for &m1 in self.data.iter() {
            let position0 = m1.position();
            while p2 < m2.len()
                && (m2[p2].position() < position0 + delta
                    || (m2[p2].position() == position0 + delta && m2[p2].is_insertion()))
            {
                append_in_combine(&mut result, m2[p2].move_by(-delta));
                p2 += 1;
            }

            let paired = m2.get(p2).copied().filter(|m| m.position() == position0 + delta);
            match m1.kind() {
                MutationType::Insertion => {
                    if let Some(second) = paired {
                        check_letters(m1, second)?;
                        if second.is_substitution() {
                            append_in_combine(&mut result, m1.with_to_of(second));
                        }
                        p2 += 1;
                    } else {
                        append_in_combine(&mut result, m1);
                    }
                    delta += 1;
                }
                MutationType::Substitution => {
                    if let Some(second) = paired {
                        check_letters(m1, second)?;
                        match second.kind() {
                            MutationType::Substitution => {
                                if m1.from_letter() != second.to_letter() {
                                    append_in_combine(&mut result, m1.with_to_of(second));
                                }
                            }
                            MutationType::Deletion => append_in_combine(
                                &mut result,
                                Mutation::deletion(position0, m1.from_letter()),
                            ),
                            MutationType::Insertion => {
                                return Err(AlignError::InconsistentData(
                                    "insertion paired with a substituted letter".into(),
                                ))
                            }
                        }
                        p2 += 1;
                    } else {
                        append_in_combine(&mut result, m1);
                    }
                }
                MutationType::Deletion => {
                    delta -= 1;
                    append_in_combine(&mut result, m1);
                }
            }
        }

        for &m in &m2[p2..] {
            append_in_combine(&mut result, m.move_by(-delta));
        }
        Ok(Self::from_sorted(result))
    }

    /// Edits that turn the mutated sequence back into the source.
    pub fn invert(&self) -> Self {
        let mut delta = 0i32;
        let data = self
            .iter()
            .map(|m| {
                let mut pos = m.position();
                let kind = match m.kind() {
                    MutationType::Deletion => {
                        delta -= 1;
                        pos += 1;
                        MutationType::Insertion
                    }
                    MutationType::Insertion => {
                        delta += 1;
                        pos -= 1;
                        MutationType::Deletion
                    }
                    MutationType::Substitution => MutationType::Substitution,
                };
                Mutation::create(kind, pos + delta, m.to_letter(), m.from_letter())
            })
            .collect();
        Self::from_sorted(data)
    }

    /// Shifts every position by `offset`, e.g. to rebase edits of a
    /// sub-sequence onto the whole sequence.
    pub fn move_by(&self, offset: i32) -> Self {
        if offset == 0 {
            return self.clone();
        }
        Self::from_sorted(self.iter().map(|m| m.move_by(offset)).collect())
    }

    /// Index of the first mutation at `position`, or `Err(insertion_point)`.
    pub fn first_mutation_with_position(&self, position: i32) -> std::result::Result<usize, usize> {
        self.first_with_position_in(0, self.data.len(), position)
    }

    fn first_with_position_in(
        &self,
        from: usize,
        to: usize,
        position: i32,
    ) -> std::result::Result<usize, usize> {
        let window = &self.data[from..to];
        let idx = from + window.partition_point(|m| m.position() < position);
        if idx < to && self.data[idx].position() == position {
            Ok(idx)
        } else {
            Err(idx)
        }
    }

    fn extract_indices(&self, from: i32, to: i32) -> (usize, usize) {
        let len = self.data.len();
        let mut from_index = self
            .first_mutation_with_position(from)
            .unwrap_or_else(|i| i);
        while from_index < len
            && self.data[from_index].position() == from
            && self.data[from_index].is_insertion()
        {
            from_index += 1;
        }
        let mut to_index = self
            .first_with_position_in(from_index, len, to)
            .unwrap_or_else(|i| i);
        while to_index < len
            && self.data[to_index].position() == to
            && self.data[to_index].is_insertion()
        {
            to_index += 1;
        }
        (from_index, to_index)
    }

    /// Mutations touching `[from, to)`, shifted so that `from` becomes 0.
    ///
    /// Insertions at `from` are dropped and insertions at `to` kept. Pass
    /// `from = -1` to keep insertions in front of position 0 as well.
    pub fn extract_for_range(&self, from: i32, to: i32) -> Result<Self> {
        if from > to {
            return invalid(format!("extraction range {from}..{to} is reversed"));
        }
        if from == to {
            return Ok(Self::empty());
        }
        let (from_index, to_index) = self.extract_indices(from, to);
        if (from == 0 || from == -1) && from_index == 0 && to_index == self.data.len() {
            return Ok(self.clone());
        }
        let offset = if from == -1 { 0 } else { -from };
        Ok(Self::from_sorted(
            self.data[from_index..to_index]
                .iter()
                .map(|m| m.move_by(offset))
                .collect(),
        ))
    }

    /// [`Mutations::extract_for_range`] over a forward range; positions come
    /// back relative to `range.from()`.
    pub fn extract_for(&self, range: &Range) -> Result<Self> {
        if range.is_reverse() {
            return invalid(format!("reversed range {range} cannot select mutations"));
        }
        self.extract_for_range(range.from(), range.to())
    }

    /// Like [`Mutations::extract_for`] but keeps absolute positions.
    pub fn extract_absolute_for(&self, range: &Range) -> Result<Self> {
        if range.is_reverse() {
            return invalid(format!("reversed range {range} cannot select mutations"));
        }
        if range.is_empty() {
            return Ok(Self::empty());
        }
        let (from_index, to_index) = self.extract_indices(range.from(), range.to());
        Ok(self.slice(from_index, to_index))
    }

    /// Drops mutations inside `range` (same selection rules as extraction).
    pub fn remove_in(&self, range: &Range) -> Result<Self> {
        if range.is_reverse() {
            return invalid(format!("reversed range {range} cannot select mutations"));
        }
        if range.is_empty() {
            return Ok(self.clone());
        }
        let (from_index, to_index) = self.extract_indices(range.from(), range.to());
        let mut data = self.data[..from_index].to_vec();
        data.extend_from_slice(&self.data[to_index..]);
        Ok(Self::from_sorted(data))
    }

    /// Appends `other`, whose positions must not precede this list's.
    pub fn concat(&self, other: &Self) -> Result<Self> {
        let mut data = self.data.to_vec();
        data.extend_from_slice(&other.data);
        if !super::is_sorted(&data) {
            return invalid("concatenated mutations overlap");
        }
        Ok(Self::from_sorted(data))
    }

    /// Space-separated text notation.
    pub fn encode(&self) -> String {
        super::encoding::encode(self)
    }

    /// Parses the text notation of [`Mutations::encode`].
    pub fn decode(text: &str) -> Result<Self> {
        super::encoding::decode(text)
    }
}

fn check_letters(first: Mutation, second: Mutation) -> Result<()> {
    if first.to_letter() != second.from_letter() {
        return Err(AlignError::InconsistentData(format!(
            "{first:?} produces a letter {second:?} does not expect"
        )));
    }
    Ok(())
}

fn append_in_combine(result: &mut Vec<Mutation>, m: Mutation) {
    let last = match result.last() {
        Some(&last) if !m.is_substitution() && !last.is_substitution() => last,
        _ => {
            result.push(m);
            return;
        }
    };
    let (lp, mp) = (last.position(), m.position());
    if lp == mp && last.is_insertion() && m.is_deletion() {
        collapse_to_substitution(result, lp, m.from_letter(), last.to_letter());
    } else if lp == mp - 1 && last.is_deletion() && m.is_insertion() {
        collapse_to_substitution(result, lp, last.from_letter(), m.to_letter());
    } else {
        result.push(m);
    }
}

fn collapse_to_substitution(result: &mut Vec<Mutation>, position: i32, from: u8, to: u8) {
    if from == to {
        result.pop();
    } else if let Some(top) = result.last_mut() {
        *top = Mutation::substitution(position, from, to);
    }
}

impl<S: BioSequence> fmt::Display for Mutations<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, m) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            f.write_str(&m.describe(S::alphabet()))?;
        }
        f.write_str("]")
    }
}

impl<S: BioSequence> fmt::Debug for Mutations<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Mutations{self}")
    }
}

impl<S: BioSequence> Serialize for Mutations<S> {
    fn serialize<Ser: Serializer>(&self, serializer: Ser) -> std::result::Result<Ser::Ok, Ser::Error> {
        serializer.collect_seq(self.data.iter().map(|m| m.code()))
    }
}

impl<'de, S: BioSequence> Deserialize<'de> for Mutations<S> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let codes = Vec::<i32>::deserialize(deserializer)?;
        Self::from_codes(&codes).map_err(serde::de::Error::custom)
    }
}
