// src/driver/verdict.rs

//! Judging solver output against the reference answer.

use std::collections::BTreeSet;

use crate::solver::answer::{
    is_no_extension, parse_argument_list, parse_boolean, parse_extension_list, parse_labeling_list,
    ArgumentSet, Labeling,
};
use crate::types::{Outcome, QueryKind};

use super::sampling::Parameter;

/// Parsed reference answer, in the shape of the reference problem's kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReferenceAnswer {
    Arguments(ArgumentSet),
    Extensions(BTreeSet<ArgumentSet>),
    Labelings(BTreeSet<Labeling>),
}

impl ReferenceAnswer {
    /// Parse `text` as the answer to a problem of `reference_kind`.
    pub fn parse(reference_kind: QueryKind, text: &str) -> Option<Self> {
        match reference_kind {
            QueryKind::CredulousArguments | QueryKind::SkepticalArguments => {
                parse_argument_list(text).map(ReferenceAnswer::Arguments)
            }
            QueryKind::EnumerateExtensions => {
                parse_extension_list(text).map(ReferenceAnswer::Extensions)
            }
            QueryKind::EnumerateLabelings => {
                parse_labeling_list(text).map(ReferenceAnswer::Labelings)
            }
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Judgement {
    Correct,
    Incorrect,
    /// Output did not have the expected shape. Logged as incorrect.
    Malformed,
}

impl Judgement {
    pub fn outcome(self) -> Outcome {
        match self {
            Judgement::Correct => Outcome::Correct,
            Judgement::Incorrect | Judgement::Malformed => Outcome::Incorrect,
        }
    }

    fn from_bool(correct: bool) -> Self {
        if correct {
            Judgement::Correct
        } else {
            Judgement::Incorrect
        }
    }
}

/// Judge `output` for a problem of `kind`.
pub fn judge(
    kind: QueryKind,
    reference: &ReferenceAnswer,
    parameter: Option<&Parameter>,
    output: &str,
) -> Judgement {
    let output = output.trim();
    match (kind, reference) {
        (
            QueryKind::CredulousArguments | QueryKind::SkepticalArguments,
            ReferenceAnswer::Arguments(expected),
        ) => compare(parse_argument_list(output), expected),

        (QueryKind::EnumerateExtensions, ReferenceAnswer::Extensions(expected)) => {
            compare(parse_extension_list(output), expected)
        }

        (QueryKind::EnumerateLabelings, ReferenceAnswer::Labelings(expected)) => {
            compare(parse_labeling_list(output), expected)
        }

        (QueryKind::SomeExtension, ReferenceAnswer::Extensions(expected)) => {
            if is_no_extension(output) {
                return Judgement::from_bool(expected.is_empty());
            }
            match parse_argument_list(output) {
                Some(ext) => Judgement::from_bool(expected.contains(&ext)),
                None => Judgement::Malformed,
            }
        }

        (
            QueryKind::DecideCredulous | QueryKind::DecideSkeptical,
            ReferenceAnswer::Arguments(accepted),
        ) => match parameter {
            Some(Parameter::Argument(arg)) => decide(output, accepted.contains(arg)),
            _ => Judgement::Incorrect,
        },

        (QueryKind::DecideExtension, ReferenceAnswer::Extensions(extensions)) => match parameter {
            Some(Parameter::Extension(set)) => decide(output, extensions.contains(set)),
            _ => Judgement::Incorrect,
        },

        (QueryKind::DecideLabeling, ReferenceAnswer::Labelings(labelings)) => match parameter {
            Some(Parameter::Labeling(l)) => decide(output, labelings.contains(l)),
            _ => Judgement::Incorrect,
        },

        (QueryKind::ExtensionExists, ReferenceAnswer::Extensions(extensions)) => {
            decide(output, !extensions.is_empty())
        }

        (QueryKind::NonEmptyExtensionExists, ReferenceAnswer::Extensions(extensions)) => {
            decide(output, extensions.iter().any(|e| !e.is_empty()))
        }

        _ => Judgement::Incorrect,
    }
}

fn compare<T: PartialEq>(parsed: Option<T>, expected: &T) -> Judgement {
    match parsed {
        Some(answer) => Judgement::from_bool(&answer == expected),
        None => Judgement::Malformed,
    }
}

fn decide(output: &str, expected: bool) -> Judgement {
    match parse_boolean(output) {
        Some(answer) => Judgement::from_bool(answer == expected),
        None => Judgement::Malformed,
    }
}
