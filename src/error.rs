//! Error types for rule parsing, inference, cut-set enumeration and configuration.
//!
//! Every failure here is a deterministic function of its input, so none of
//! them are worth retrying.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::tree::Symbol;

/// A rule antecedent that does not follow the `<name> is <term>` grammar.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("antecedent is empty")]
    Empty,

    #[error("unbalanced parenthesis at token {position}")]
    UnbalancedParens { position: usize },

    #[error("unexpected token `{token}` at {position}")]
    UnexpectedToken { token: String, position: usize },

    #[error("antecedent ended in the middle of an expression")]
    UnexpectedEnd,

    #[error("operator `{operator}` at {position} is missing an operand")]
    MissingOperand { operator: &'static str, position: usize },

    #[error("expected `<name> is <term>` at token {position}")]
    MalformedLiteral { position: usize },
}

/// A linguistic variable whose universe or curves break the sampling invariants.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum VariableError {
    #[error("variable `{variable}` has an empty universe")]
    EmptyUniverse { variable: String },

    #[error("universe of `{variable}` is not strictly increasing at index {index}")]
    UnorderedUniverse { variable: String, index: usize },

    #[error("term `{term}` has {found} samples but the universe has {expected}")]
    CurveLength { term: String, expected: usize, found: usize },

    #[error("term `{term}` has membership {value} outside [0, 1] at index {index}")]
    MembershipOutOfRange { term: String, index: usize, value: f64 },

    #[error("term `{term}` is defined twice")]
    DuplicateTerm { term: String },

    #[error("aggregate has {found} samples, expected {expected}")]
    AggregateLength { expected: usize, found: usize },
}

/// Failure to evaluate a rule against a set of inputs.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum EvaluationError {
    #[error("no input value for variable `{variable}`")]
    MissingInput { variable: String },

    #[error("no antecedent named `{variable}`")]
    UnknownVariable { variable: String },

    #[error("variable `{variable}` has no term `{term}`")]
    UnknownTerm { variable: String, term: String },
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum InferenceError {
    #[error(transparent)]
    Evaluation(#[from] EvaluationError),

    /// Every Sugeno rule had weight zero, so the weighted average is undefined.
    #[error("none of the {rules} rules fired for the given inputs")]
    NoFiringRule { rules: usize },
}

/// Failure to assemble an inference system from its definition.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum BuildError {
    #[error(transparent)]
    Variable(#[from] VariableError),

    #[error("rule `{text}`: {source}")]
    Rule {
        text: String,
        #[source]
        source: ParseError,
    },
}

/// A string that does not name a requirement symbol or a setting.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum NameError {
    #[error("symbol is empty")]
    EmptySymbol,

    #[error("unknown symbol prefix `{prefix}`")]
    UnknownPrefix { prefix: char },

    #[error("invalid symbol index in `{symbol}`")]
    InvalidIndex { symbol: String },

    #[error("unknown {kind} `{value}`, expected {expected}")]
    UnknownVariant {
        kind: &'static str,
        value: String,
        expected: &'static str,
    },
}

/// A requirement tree the cut-set enumeration cannot handle.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum SolverError {
    #[error("refined requirement {symbol} (`{description}`) has children but no decomposition")]
    MissingDecomposition { symbol: Symbol, description: String },

    #[error("refined requirement {symbol} has neither a decomposition nor children")]
    EmptyRefinement { symbol: Symbol },

    #[error("negated requirement {symbol} must have exactly one child, found {children}")]
    NegationArity { symbol: Symbol, children: usize },

    #[error("requirement {symbol} uses a NOT decomposition, which has no cut-set semantics")]
    UnsupportedNegation { symbol: Symbol },
}

#[derive(Clone, Debug, Error, PartialEq)]
pub enum MonitorError {
    #[error("no fuzzy evidence for context assumption {symbol}")]
    MissingEvidence { symbol: Symbol },

    #[error("evidence for {symbol} has {found} samples but the consequent universe has {expected}")]
    EvidenceLength { symbol: Symbol, expected: usize, found: usize },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid TOML: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("invalid value for `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}
