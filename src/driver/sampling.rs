// src/driver/sampling.rs

//! Parameter sampling for decision problems.
//!
//! Samples are drawn once before the sweep and reused for every solver and
//! repetition, so all solvers answer the same questions.

use std::collections::BTreeSet;

use rand::seq::IndexedRandom;
use rand::Rng;

use crate::solver::answer::{write_arguments, write_labeling, ArgumentSet, Labeling};

/// The `-a` value of one invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Parameter {
    Argument(String),
    Extension(ArgumentSet),
    Labeling(Labeling),
}

impl Parameter {
    pub fn render(&self) -> String {
        match self {
            Parameter::Argument(a) => a.clone(),
            Parameter::Extension(set) => write_arguments(set),
            Parameter::Labeling(l) => write_labeling(l),
        }
    }
}

/// `n` argument names drawn uniformly with replacement.
pub fn sample_arguments<R: Rng + ?Sized>(rng: &mut R, arguments: &[String], n: usize) -> Vec<String> {
    if arguments.is_empty() {
        return Vec::new();
    }
    (0..n)
        .filter_map(|_| arguments.choose(rng).cloned())
        .collect()
}

/// Largest number of distinct candidates worth testing on `arguments`.
pub fn candidate_cap(n: usize, arguments: usize) -> usize {
    if arguments >= usize::BITS as usize - 1 {
        n
    } else {
        n.min(1usize << arguments)
    }
}

/// Up to `n` distinct sets: half taken from the reference extensions, the
/// rest random subsets of `arguments`.
pub fn sample_extensions<R: Rng + ?Sized>(
    rng: &mut R,
    arguments: &[String],
    reference: &BTreeSet<ArgumentSet>,
    n: usize,
) -> Vec<ArgumentSet> {
    let cap = candidate_cap(n, arguments.len());
    let mut out = take_from_reference(rng, reference, n / 2);
    out.truncate(cap);

    while out.len() < cap {
        let candidate: ArgumentSet = arguments
            .iter()
            .filter(|_| rng.random_bool(0.5))
            .cloned()
            .collect();
        if !out.contains(&candidate) {
            out.push(candidate);
        }
    }
    out
}

/// Up to `n` distinct labelings: half taken from the reference labelings,
/// the rest assign each argument a random status.
pub fn sample_labelings<R: Rng + ?Sized>(
    rng: &mut R,
    arguments: &[String],
    reference: &BTreeSet<Labeling>,
    n: usize,
) -> Vec<Labeling> {
    let cap = candidate_cap(n, arguments.len());
    let mut out = take_from_reference(rng, reference, n / 2);
    out.truncate(cap);

    while out.len() < cap {
        let mut candidate = Labeling::default();
        for a in arguments {
            match rng.random_range(0..3) {
                0 => candidate.accepted.insert(a.clone()),
                1 => candidate.rejected.insert(a.clone()),
                _ => candidate.undecided.insert(a.clone()),
            };
        }
        if !out.contains(&candidate) {
            out.push(candidate);
        }
    }
    out
}

fn take_from_reference<T: Clone, R: Rng + ?Sized>(rng: &mut R, reference: &BTreeSet<T>, k: usize) -> Vec<T> {
    let pool: Vec<&T> = reference.iter().collect();
    let k = k.min(pool.len());
    pool.choose_multiple(rng, k).map(|t| (*t).clone()).collect()
}
