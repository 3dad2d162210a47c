//! Random edit lists for simulation and testing.
//!
//! Every generator takes the random source explicitly, so a seeded
//! `StdRng` reproduces the same edits run after run.

use rand::Rng;

use super::builder::MutationsBuilder;
use super::list::Mutations;
use super::mutation::{Mutation, MutationType};
use crate::error::{invalid, Result};
use crate::traits::BioSequence;

/// One uniformly placed edit of the given kind (or a uniformly chosen kind).
///
/// Substitutions always change the letter. Only basic letters are produced.
pub fn uniform_mutation<S: BioSequence, R: Rng + ?Sized>(
    seq: &S,
    kind: Option<MutationType>,
    rng: &mut R,
) -> Result<Mutation> {
    let kind = kind.unwrap_or_else(|| match rng.gen_range(0..3) {
        0 => MutationType::Substitution,
        1 => MutationType::Deletion,
        _ => MutationType::Insertion,
    });
    let letters = S::alphabet().basic_size() as u8;
    if kind != MutationType::Insertion && seq.is_empty() {
        return invalid("cannot substitute or delete in an empty sequence");
    }
    Ok(match kind {
        MutationType::Substitution => {
            let position = rng.gen_range(0..seq.size());
            let from = seq.code_at(position);
            let to = (from % letters + 1 + rng.gen_range(0..letters - 1)) % letters;
            Mutation::substitution(position as i32, from, to)
        }
        MutationType::Deletion => {
            let position = rng.gen_range(0..seq.size());
            Mutation::deletion(position as i32, seq.code_at(position))
        }
        MutationType::Insertion => {
            let position = rng.gen_range(0..=seq.size());
            Mutation::insertion(position as i32, rng.gen_range(0..letters))
        }
    })
}

/// Per-letter substitution probabilities, stored as row-wise CDFs.
#[derive(Clone, Debug)]
pub struct SubstitutionModel {
    size: usize,
    probabilities: Vec<f64>,
    cdf: Vec<f64>,
}

impl SubstitutionModel {
    /// `probabilities[from * size + to]`; each diagonal is recomputed so
    /// rows sum to one.
    pub fn new(mut probabilities: Vec<f64>) -> Result<Self> {
        let size = (probabilities.len() as f64).sqrt().round() as usize;
        if size * size != probabilities.len() || size == 0 {
            return invalid(format!(
                "{} probabilities do not form a square matrix",
                probabilities.len()
            ));
        }
        for i in 0..size {
            let row: f64 = probabilities[i * size..(i + 1) * size].iter().sum();
            probabilities[i * size + i] -= row - 1.0;
            if probabilities[i * size + i] < 0.0 {
                return invalid(format!("substitution probabilities of letter {i} exceed one"));
            }
        }
        let mut cdf = vec![0.0; size * size];
        for i in 0..size {
            let mut sum = 0.0;
            for j in 0..size {
                sum += probabilities[i * size + j];
                cdf[i * size + j] = sum;
            }
        }
        Ok(Self {
            size,
            probabilities,
            cdf,
        })
    }

    /// Every letter changes with `rate`, spread evenly over the others.
    pub fn uniform(size: usize, rate: f64) -> Result<Self> {
        if size < 2 {
            return invalid("uniform substitution model needs at least two letters");
        }
        let off = rate / (size - 1) as f64;
        let mut p = vec![off; size * size];
        for i in 0..size {
            p[i * size + i] = 1.0 - rate;
        }
        Self::new(p)
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn probability(&self, from: u8, to: u8) -> f64 {
        self.probabilities[from as usize * self.size + to as usize]
    }

    pub fn total_substitution_probability(&self, letter: u8) -> f64 {
        1.0 - self.probability(letter, letter)
    }

    pub fn multiply(&self, factor: f64) -> Result<Self> {
        Self::new(self.probabilities.iter().map(|p| p * factor).collect())
    }

    pub fn random_letter<R: Rng + ?Sized>(&self, letter: u8, rng: &mut R) -> u8 {
        let row = &self.cdf[letter as usize * self.size..(letter as usize + 1) * self.size];
        let value: f64 = rng.gen();
        row.partition_point(|&c| c < value).min(self.size - 1) as u8
    }
}

/// Substitution, deletion and insertion rates for simulated reads.
#[derive(Clone, Debug)]
pub struct MutationModel {
    substitutions: SubstitutionModel,
    deletion_probability: f64,
    insertion_probability: f64,
}

impl MutationModel {
    pub fn new(
        substitutions: SubstitutionModel,
        deletion_probability: f64,
        insertion_probability: f64,
    ) -> Result<Self> {
        let valid = |p: f64| (0.0..1.0).contains(&p);
        if !valid(deletion_probability) || !valid(insertion_probability) {
            return invalid("indel probabilities must lie in [0, 1)");
        }
        Ok(Self {
            substitutions,
            deletion_probability,
            insertion_probability,
        })
    }

    /// Uniform model over `letters` basic letters.
    pub fn uniform(letters: usize, substitution: f64, deletion: f64, insertion: f64) -> Result<Self> {
        Self::new(SubstitutionModel::uniform(letters, substitution)?, deletion, insertion)
    }

    pub fn multiply(&self, factor: f64) -> Result<Self> {
        Self::new(
            self.substitutions.multiply(factor)?,
            self.deletion_probability * factor,
            self.insertion_probability * factor,
        )
    }

    /// Edit at `position`; `letter` is `None` past the end of the sequence,
    /// where only an insertion can happen.
    pub fn generate<R: Rng + ?Sized>(&self, position: i32, letter: Option<u8>, rng: &mut R) -> Option<Mutation> {
        let mut roll: f64 = rng.gen();
        if roll < self.insertion_probability {
            let to = rng.gen_range(0..self.substitutions.size()) as u8;
            return Some(Mutation::insertion(position, to));
        }
        let letter = letter?;
        roll -= self.insertion_probability;
        if roll < self.deletion_probability {
            return Some(Mutation::deletion(position, letter));
        }
        if letter as usize >= self.substitutions.size() {
            return None;
        }
        let to = self.substitutions.random_letter(letter, rng);
        (to != letter).then(|| Mutation::substitution(position, letter, to))
    }
}

/// Walks `seq` and rolls an edit at every position.
///
/// An insertion never directly follows a deletion and vice versa, so the
/// result is always well formed.
pub fn generate_mutations<S: BioSequence, R: Rng + ?Sized>(
    seq: &S,
    model: &MutationModel,
    rng: &mut R,
) -> Mutations<S> {
    let mut builder = MutationsBuilder::<S>::new();
    let mut previous: Option<Mutation> = None;
    let mut i = 0usize;
    while i < seq.size() {
        let mut current = model.generate(i as i32, Some(seq.code_at(i)), rng);
        let mut advance = true;
        if let Some(m) = current {
            match m.kind() {
                MutationType::Substitution => builder.push(m),
                MutationType::Deletion => {
                    if previous.is_some_and(|p| p.is_insertion()) {
                        current = None;
                    } else {
                        builder.push(m);
                    }
                }
                MutationType::Insertion => {
                    if previous.is_some_and(|p| p.is_deletion()) {
                        current = None;
                    } else {
                        builder.push(m);
                        advance = false;
                    }
                }
            }
        }
        previous = current;
        if advance {
            i += 1;
        }
    }
    if let Some(m) = model.generate(seq.size() as i32, None, rng) {
        if m.is_insertion() && !previous.is_some_and(|p| p.is_deletion()) {
            builder.push(m);
        }
    }
    builder.build()
}
