//! Compact edit scripts.
//!
//! - [`Mutation`]: one substitution, deletion or insertion packed in an `i32`,
//! - [`Mutations`]: an immutable, position-ordered list with the edit algebra
//!   (replay, composition, inversion, shifting, range extraction),
//! - [`MutationsBuilder`]: consuming builder,
//! - text notation in [`encoding`], random edits in [`generator`].

pub mod builder;
pub mod encoding;
pub mod generator;
pub mod list;
pub mod mutation;

pub use builder::MutationsBuilder;
pub use list::Mutations;
pub use mutation::{Mutation, MutationType};

use crate::traits::BioSequence;

/// True when `next` may directly follow `prev` in a list: positions grow,
/// and at a shared position only insertions may come first.
pub(crate) fn in_order(prev: Mutation, next: Mutation) -> bool {
    prev.position() < next.position() || (prev.position() == next.position() && prev.is_insertion())
}

/// True when every neighbouring pair is in order. At most one
/// substitution or deletion touches a letter, after any insertions in
/// front of it.
pub fn is_sorted(mutations: &[Mutation]) -> bool {
    mutations.windows(2).all(|w| in_order(w[0], w[1]))
}

/// Structural sanity: no identity substitutions, and no deletion directly
/// followed by an insertion that together form a substitution.
pub fn check<S: BioSequence>(mutations: &Mutations<S>) -> bool {
    let data = mutations.as_slice();
    for (i, &m) in data.iter().enumerate() {
        if m.is_substitution() && m.from_letter() == m.to_letter() {
            return false;
        }
        if i > 0 {
            let prev = data[i - 1];
            if prev.is_deletion() && m.is_insertion() && prev.position() == m.position() - 1 {
                return false;
            }
            if prev.is_insertion() && m.is_deletion() && prev.position() == m.position() {
                return false;
            }
        }
    }
    is_sorted(data)
}

/// Moves every indel to the leftmost equivalent spot inside a homopolymer.
///
/// `seq` is the sequence the mutations apply to. The result replays to the
/// same mutated sequence.
pub fn shift_indels_at_homopolymers<S: BioSequence>(seq: &S, mutations: &Mutations<S>) -> Mutations<S> {
    let mut prev_pos = 0;
    let mut out = Vec::with_capacity(mutations.size());
    for m in mutations.iter() {
        if m.is_substitution() {
            prev_pos = m.position() + 1;
            out.push(m);
            continue;
        }
        let letter = if m.is_deletion() { m.from_letter() } else { m.to_letter() };
        let mut pos = m.position();
        while pos > prev_pos && seq.code_at(pos as usize - 1) == letter {
            pos -= 1;
        }
        let shifted = m.move_by(pos - m.position());
        prev_pos = shifted.position() + i32::from(shifted.is_deletion());
        out.push(shifted);
    }
    Mutations::from_sorted(out)
}
