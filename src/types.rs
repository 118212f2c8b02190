use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

/// The question a solver is asked about an instance.
///
/// Each kind has a two-letter code used in problem identifiers
/// (`EE-PR`, `DC-ST`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum QueryKind {
    /// `EC`: the set of credulously accepted arguments.
    CredulousArguments,
    /// `EE`: enumerate all extensions.
    EnumerateExtensions,
    /// `SE`: return some extension, or `NO` if none exists.
    SomeExtension,
    /// `EL`: enumerate all labelings.
    EnumerateLabelings,
    /// `ES`: the set of skeptically accepted arguments.
    SkepticalArguments,
    /// `DC`: is the given argument credulously accepted?
    DecideCredulous,
    /// `DS`: is the given argument skeptically accepted?
    DecideSkeptical,
    /// `DE`: is the given set an extension?
    DecideExtension,
    /// `DL`: is the given labeling a labeling of the semantics?
    DecideLabeling,
    /// `DX`: does any extension exist?
    ExtensionExists,
    /// `DN`: does a non-empty extension exist?
    NonEmptyExtensionExists,
}

/// Shape of the extra `-a` argument a query kind needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParameterKind {
    None,
    Argument,
    Extension,
    Labeling,
}

impl QueryKind {
    pub const ALL: [QueryKind; 11] = [
        QueryKind::CredulousArguments,
        QueryKind::EnumerateExtensions,
        QueryKind::SomeExtension,
        QueryKind::EnumerateLabelings,
        QueryKind::SkepticalArguments,
        QueryKind::DecideCredulous,
        QueryKind::DecideSkeptical,
        QueryKind::DecideExtension,
        QueryKind::DecideLabeling,
        QueryKind::ExtensionExists,
        QueryKind::NonEmptyExtensionExists,
    ];

    pub fn code(self) -> &'static str {
        match self {
            QueryKind::CredulousArguments => "EC",
            QueryKind::EnumerateExtensions => "EE",
            QueryKind::SomeExtension => "SE",
            QueryKind::EnumerateLabelings => "EL",
            QueryKind::SkepticalArguments => "ES",
            QueryKind::DecideCredulous => "DC",
            QueryKind::DecideSkeptical => "DS",
            QueryKind::DecideExtension => "DE",
            QueryKind::DecideLabeling => "DL",
            QueryKind::ExtensionExists => "DX",
            QueryKind::NonEmptyExtensionExists => "DN",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.code() == code)
    }

    pub fn parameter(self) -> ParameterKind {
        match self {
            QueryKind::DecideCredulous | QueryKind::DecideSkeptical => ParameterKind::Argument,
            QueryKind::DecideExtension => ParameterKind::Extension,
            QueryKind::DecideLabeling => ParameterKind::Labeling,
            _ => ParameterKind::None,
        }
    }

    /// The kind whose reference answer decides correctness for this kind.
    pub fn reference_kind(self) -> QueryKind {
        match self {
            QueryKind::SomeExtension
            | QueryKind::DecideExtension
            | QueryKind::ExtensionExists
            | QueryKind::NonEmptyExtensionExists => QueryKind::EnumerateExtensions,
            QueryKind::DecideCredulous => QueryKind::CredulousArguments,
            QueryKind::DecideSkeptical => QueryKind::SkepticalArguments,
            QueryKind::DecideLabeling => QueryKind::EnumerateLabelings,
            other => other,
        }
    }
}

impl fmt::Display for QueryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// A `(query kind, semantics)` pair such as `DC-PR`.
///
/// The semantics tag is opaque; two problems are equal iff their identifiers
/// are equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(try_from = "String")]
pub struct Problem {
    pub kind: QueryKind,
    pub semantics: String,
}

impl Problem {
    pub fn new(kind: QueryKind, semantics: impl Into<String>) -> Self {
        Self {
            kind,
            semantics: semantics.into(),
        }
    }

    /// The problem whose reference answer judges this one.
    pub fn reference_problem(&self) -> Problem {
        Problem::new(self.kind.reference_kind(), self.semantics.clone())
    }
}

impl fmt::Display for Problem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.kind.code(), self.semantics)
    }
}

impl FromStr for Problem {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (code, semantics) = s
            .split_once('-')
            .ok_or_else(|| format!("invalid problem identifier: {s} (expected KIND-SEMANTICS)"))?;
        let kind = QueryKind::from_code(&code.to_uppercase())
            .ok_or_else(|| format!("invalid problem identifier: {s} (unknown kind {code})"))?;
        if semantics.is_empty() || semantics.contains(char::is_whitespace) {
            return Err(format!("invalid problem identifier: {s} (bad semantics)"));
        }
        Ok(Problem::new(kind, semantics))
    }
}

impl TryFrom<String> for Problem {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Serialization format of an instance file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Format {
    Tgf,
    Apx,
    /// Not an argumentation format; filtered out of capability probes.
    Cnf,
}

impl Format {
    pub fn is_argumentation(self) -> bool {
        !matches!(self, Format::Cnf)
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Format::Tgf => "tgf",
            Format::Apx => "apx",
            Format::Cnf => "cnf",
        })
    }
}

impl FromStr for Format {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "tgf" => Ok(Format::Tgf),
            "apx" => Ok(Format::Apx),
            "cnf" => Ok(Format::Cnf),
            other => Err(format!("invalid format: {other} (expected \"tgf\", \"apx\" or \"cnf\")")),
        }
    }
}

/// Verdict of comparing a solver answer with the reference answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    Correct,
    Incorrect,
}

impl Default for Outcome {
    fn default() -> Self {
        Outcome::Incorrect
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Outcome::Correct => "correct",
            Outcome::Incorrect => "incorrect",
        })
    }
}

impl FromStr for Outcome {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "correct" => Ok(Outcome::Correct),
            "incorrect" => Ok(Outcome::Incorrect),
            other => Err(format!("invalid outcome: {other} (expected \"correct\" or \"incorrect\")")),
        }
    }
}
