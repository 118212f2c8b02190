use std::collections::BTreeSet;

use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

use probo::driver::sampling::{
    candidate_cap, sample_arguments, sample_extensions, sample_labelings, Parameter,
};
use probo::solver::answer::{ArgumentSet, Labeling};

fn names(n: usize) -> Vec<String> {
    (0..n).map(|i| format!("a{i}")).collect()
}

fn set(items: &[&str]) -> ArgumentSet {
    items.iter().map(|s| s.to_string()).collect()
}

#[test]
fn empty_framework_yields_no_arguments() {
    let mut rng = StdRng::seed_from_u64(1);
    assert!(sample_arguments(&mut rng, &[], 5).is_empty());
}

#[test]
fn same_seed_same_samples() {
    let args = names(20);
    let a = sample_arguments(&mut StdRng::seed_from_u64(9), &args, 8);
    let b = sample_arguments(&mut StdRng::seed_from_u64(9), &args, 8);
    assert_eq!(a, b);
}

#[test]
fn cap_is_bounded_by_the_number_of_subsets() {
    assert_eq!(candidate_cap(10, 0), 1);
    assert_eq!(candidate_cap(10, 2), 4);
    assert_eq!(candidate_cap(10, 3), 8);
    assert_eq!(candidate_cap(10, 4), 10);
    assert_eq!(candidate_cap(10, 200), 10);
}

#[test]
fn small_framework_gets_every_subset() {
    let args = names(2);
    let mut rng = StdRng::seed_from_u64(3);
    let sampled = sample_extensions(&mut rng, &args, &BTreeSet::new(), 10);

    let all: BTreeSet<ArgumentSet> = [
        set(&[]),
        set(&["a0"]),
        set(&["a1"]),
        set(&["a0", "a1"]),
    ]
    .into_iter()
    .collect();
    assert_eq!(sampled.into_iter().collect::<BTreeSet<_>>(), all);
}

#[test]
fn parameters_render_in_answer_syntax() {
    assert_eq!(Parameter::Argument("a".into()).render(), "a");
    assert_eq!(Parameter::Extension(set(&["b", "a"])).render(), "[a,b]");
    let l = Labeling {
        accepted: set(&["a"]),
        rejected: ArgumentSet::new(),
        undecided: set(&["b"]),
    };
    assert_eq!(Parameter::Labeling(l).render(), "[[a],[],[b]]");
}

proptest! {
    #[test]
    fn arguments_come_from_the_framework(n_args in 1usize..30, n in 0usize..25, seed in any::<u64>()) {
        let args = names(n_args);
        let mut rng = StdRng::seed_from_u64(seed);
        let sampled = sample_arguments(&mut rng, &args, n);
        prop_assert_eq!(sampled.len(), n);
        prop_assert!(sampled.iter().all(|a| args.contains(a)));
    }

    #[test]
    fn extensions_are_distinct_and_half_from_reference(
        n_args in 0usize..8,
        n in 0usize..16,
        seed in any::<u64>(),
    ) {
        let args = names(n_args);
        // Reference extensions: every single-argument set.
        let reference: BTreeSet<ArgumentSet> =
            args.iter().map(|a| [a.clone()].into_iter().collect()).collect();

        let mut rng = StdRng::seed_from_u64(seed);
        let sampled = sample_extensions(&mut rng, &args, &reference, n);

        let cap = candidate_cap(n, n_args);
        prop_assert_eq!(sampled.len(), cap);
        let distinct: BTreeSet<_> = sampled.iter().cloned().collect();
        prop_assert_eq!(distinct.len(), sampled.len());
        prop_assert!(sampled.iter().all(|e| e.iter().all(|a| args.contains(a))));

        let from_reference = sampled.iter().filter(|e| reference.contains(*e)).count();
        prop_assert!(from_reference >= (n / 2).min(reference.len()).min(cap));
    }

    #[test]
    fn labelings_partition_the_arguments(n_args in 1usize..6, n in 1usize..12, seed in any::<u64>()) {
        let args = names(n_args);
        let mut rng = StdRng::seed_from_u64(seed);
        let sampled = sample_labelings(&mut rng, &args, &BTreeSet::new(), n);

        prop_assert_eq!(sampled.len(), candidate_cap(n, n_args));
        let distinct: BTreeSet<&Labeling> = sampled.iter().collect();
        prop_assert_eq!(distinct.len(), sampled.len());
        for l in &sampled {
            let covered = l.accepted.len() + l.rejected.len() + l.undecided.len();
            prop_assert_eq!(covered, n_args);
            let union: BTreeSet<&String> =
                l.accepted.iter().chain(&l.rejected).chain(&l.undecided).collect();
            prop_assert_eq!(union.len(), n_args);
        }
    }
}
