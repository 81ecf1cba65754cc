//! Fuzzy inference over linguistic rules, and cut-set enumeration over safety
//! requirement trees.
//!
//! The fuzzy side evaluates rules such as
//! `Activity is Static and not Distance is Close` against crisp measurements,
//! either Mamdani style (clipped consequence terms, maximum aggregation,
//! centroid defuzzification) or Sugeno style (weighted average of crisp
//! consequence functions).
//!
//! The safety side enumerates the configurations of a requirement tree: sets
//! of leaf requirements which together discharge the root, split into the
//! context assumptions they rely on and the requirements the system must
//! provide. A [`ContextMonitor`] then checks each configuration's assumptions
//! against the fuzzy verdicts.

mod dsl;
mod inference;
mod inputs;
mod math;
mod outputs;
mod rules;
mod terms;
mod variable;

pub mod config;
pub mod constraints;
pub mod error;
pub mod linspace;
pub mod membership;
pub mod monitor;
pub mod ops;
pub mod parser;
pub mod solver;
pub mod tree;

pub use config::Settings;
pub use dsl::Expr;
pub use inference::{MamdaniFis, SugenoFis};
pub use inputs::Inputs;
pub use monitor::ContextMonitor;
pub use outputs::Aggregate;
pub use rules::{ConsequentFunction, Function, MamdaniRule, Polynomial, Rule, Rules, SugenoRule};
pub use solver::{Configuration, ConfigurationId, ConfigurationsSolver, CutSet, NegationPolicy};
pub use terms::Terms;
pub use tree::{Requirement, RequirementKind, Symbol, SymbolAllocator, TreeBuilder};
pub use variable::{Antecedent, Consequent, LinguisticVariable};
