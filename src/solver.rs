//! Enumeration of the cut sets of a requirement tree and their grouping into
//! configurations.

use std::collections::BTreeMap;
use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use crate::error::{NameError, SolverError};
use crate::tree::{Decomposition, RefinedRequirement, Requirement, Symbol};

/// How a NOT decomposition is treated during enumeration.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NegationPolicy {
    /// Fail with [`SolverError::UnsupportedNegation`].
    #[default]
    Reject,
    /// Use the cut sets of the single child as they are.
    PassThrough,
}

impl std::str::FromStr for NegationPolicy {
    type Err = NameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "reject" => Ok(NegationPolicy::Reject),
            "pass-through" => Ok(NegationPolicy::PassThrough),
            _ => Err(NameError::UnknownVariant {
                kind: "negation policy",
                value: s.to_owned(),
                expected: "`reject` or `pass-through`",
            }),
        }
    }
}

/// Leaf requirements that together discharge an ancestor, keyed and
/// deduplicated by symbol, in the order they were first reached.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CutSet<'t>(IndexMap<Symbol, &'t Requirement>);

impl<'t> CutSet<'t> {
    pub fn new() -> Self {
        Self::default()
    }

    fn single(requirement: &'t Requirement) -> Self {
        let mut set = Self::new();
        set.insert(requirement);
        set
    }

    /// Adds `requirement` unless a requirement with the same symbol is present.
    pub fn insert(&mut self, requirement: &'t Requirement) -> bool {
        let symbol = requirement.symbol();

        if self.0.contains_key(&symbol) {
            return false;
        }

        self.0.insert(symbol, requirement);
        true
    }

    pub fn union(&self, other: &CutSet<'t>) -> CutSet<'t> {
        let mut union = self.clone();

        for requirement in other.iter() {
            union.insert(requirement);
        }

        union
    }

    pub fn contains(&self, symbol: Symbol) -> bool {
        self.0.contains_key(&symbol)
    }

    pub fn is_subset(&self, other: &CutSet<'_>) -> bool {
        self.0.keys().all(|s| other.contains(*s))
    }

    pub fn symbols(&self) -> impl Iterator<Item = Symbol> + '_ {
        self.0.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = &'t Requirement> + '_ {
        self.0.values().copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for CutSet<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        write_symbols(f, self.symbols(), ", ")?;
        f.write_str("}")
    }
}

fn write_symbols(f: &mut fmt::Formatter<'_>, symbols: impl Iterator<Item = Symbol>, sep: &str) -> fmt::Result {
    for (i, symbol) in symbols.enumerate() {
        if i > 0 {
            f.write_str(sep)?;
        }
        write!(f, "{symbol}")?;
    }

    Ok(())
}

/// Drops every cut set that is a superset of another one. Of two equal sets
/// the first is kept.
pub fn minimize<'t>(cut_sets: Vec<CutSet<'t>>) -> Vec<CutSet<'t>> {
    let mut minimal: Vec<CutSet<'t>> = Vec::with_capacity(cut_sets.len());

    for (i, candidate) in cut_sets.iter().enumerate() {
        let dominated = cut_sets.iter().enumerate().any(|(j, other)| {
            j != i && other.is_subset(candidate) && (other.len() < candidate.len() || j < i)
        });

        if !dominated {
            minimal.push(candidate.clone());
        }
    }

    minimal
}

/// Position of a configuration in enumeration order, shown as `C1`, `C2`, ...
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConfigurationId(pub usize);

impl fmt::Display for ConfigurationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "C{}", self.0 + 1)
    }
}

/// A cut set split by the role of its leaves.
///
/// Empty requirements and parameter contexts reached as leaves discharge
/// nothing and are not listed.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Configuration<'t> {
    pub context_assumptions: Vec<&'t Requirement>,
    pub technical_requirements: Vec<&'t Requirement>,
    pub undeveloped_requirements: Vec<&'t Requirement>,
}

impl<'t> Configuration<'t> {
    pub fn from_cut_set(cut_set: &CutSet<'t>) -> Self {
        let mut configuration = Configuration::default();

        for requirement in cut_set.iter() {
            match requirement {
                Requirement::ContextAssumption(_) => configuration.context_assumptions.push(requirement),
                Requirement::Technical(_) => configuration.technical_requirements.push(requirement),
                Requirement::Undeveloped(_) => configuration.undeveloped_requirements.push(requirement),
                Requirement::Empty(_) | Requirement::ParameterContext(_) | Requirement::Refined(_) => {}
            }
        }

        configuration
    }

    /// Technical then undeveloped requirements.
    pub fn requirements(&self) -> impl Iterator<Item = &'t Requirement> + '_ {
        self.technical_requirements
            .iter()
            .chain(&self.undeveloped_requirements)
            .copied()
    }
}

impl fmt::Display for Configuration<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.context_assumptions.is_empty() {
            f.write_str("If context is ")?;
            write_symbols(f, self.context_assumptions.iter().map(|r| r.symbol()), ", ")?;
            f.write_str(", system")?;
        } else {
            f.write_str("System")?;
        }

        f.write_str(" is safe when ")?;

        if self.requirements().next().is_none() {
            return f.write_str("nothing else is provided");
        }

        write_symbols(f, self.requirements().map(|r| r.symbol()), " and ")?;
        f.write_str(" are provided")
    }
}

#[derive(Clone, Debug, Default)]
pub struct ConfigurationsSolver {
    negation: NegationPolicy,
}

impl ConfigurationsSolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_negation_policy(negation: NegationPolicy) -> Self {
        Self { negation }
    }

    pub fn negation_policy(&self) -> NegationPolicy {
        self.negation
    }

    /// All cut sets of `node`, in depth-first left-to-right order.
    ///
    /// AND children are combined by cartesian product starting from `{{}}`, OR
    /// children contribute their cut sets side by side. A childless AND is
    /// therefore `{{}}` and a childless OR has no cut sets. Supersets are not
    /// pruned, see [`minimize`].
    pub fn minimal_cut_sets<'t>(&self, node: &'t Requirement) -> Result<Vec<CutSet<'t>>, SolverError> {
        match node {
            Requirement::Refined(refined) => self.refined_cut_sets(refined),
            leaf => Ok(vec![CutSet::single(leaf)]),
        }
    }

    fn refined_cut_sets<'t>(&self, node: &'t RefinedRequirement) -> Result<Vec<CutSet<'t>>, SolverError> {
        let children = node.children();

        let Some(decomposition) = node.decomposition() else {
            if children.is_empty() {
                return Err(SolverError::EmptyRefinement { symbol: node.symbol() });
            }

            return Err(SolverError::MissingDecomposition {
                symbol: node.symbol(),
                description: node.description().to_owned(),
            });
        };

        let cut_sets = match decomposition {
            Decomposition::And => {
                let mut combined = vec![CutSet::new()];

                for child in children {
                    let child_sets = self.minimal_cut_sets(child)?;

                    combined = combined
                        .iter()
                        .flat_map(|left| child_sets.iter().map(move |right| left.union(right)))
                        .collect();
                }

                combined
            },
            Decomposition::Or => {
                let mut alternatives = Vec::new();

                for child in children {
                    alternatives.extend(self.minimal_cut_sets(child)?);
                }

                alternatives
            },
            Decomposition::Not => {
                let [child] = children else {
                    return Err(SolverError::NegationArity {
                        symbol: node.symbol(),
                        children: children.len(),
                    });
                };

                match self.negation {
                    NegationPolicy::Reject => {
                        return Err(SolverError::UnsupportedNegation { symbol: node.symbol() });
                    },
                    NegationPolicy::PassThrough => {
                        warn!(symbol = %node.symbol(), "NOT decomposition passed through unchanged");

                        self.minimal_cut_sets(child)?
                    },
                }
            },
        };

        trace!(symbol = %node.symbol(), ?decomposition, cut_sets = cut_sets.len(), "requirement refined");

        Ok(cut_sets)
    }

    /// The configurations discharging `root`, numbered in enumeration order.
    pub fn get_configurations<'t>(
        &self,
        root: &'t Requirement,
    ) -> Result<BTreeMap<ConfigurationId, Configuration<'t>>, SolverError> {
        let cut_sets = self.minimal_cut_sets(root)?;

        debug!(root = %root.symbol(), configurations = cut_sets.len(), "configurations enumerated");

        Ok(cut_sets
            .iter()
            .enumerate()
            .map(|(i, cut_set)| (ConfigurationId(i), Configuration::from_cut_set(cut_set)))
            .collect())
    }
}

#[cfg(test)]
fn symbols(cut_sets: &[CutSet<'_>]) -> Vec<Vec<String>> {
    cut_sets
        .iter()
        .map(|set| set.symbols().map(|s| s.to_string()).collect())
        .collect()
}

#[test]
fn test_and_of_or() {
    use crate::tree::TreeBuilder;

    let mut tree = TreeBuilder::new();
    let t1 = tree.technical("Stop before obstacles", None);
    let u1 = tree.undeveloped("Human detection", None);
    let u2 = tree.undeveloped("Restricted zone", None);
    let any = tree.refined("No human in the path", Decomposition::Or, vec![u1, u2]);
    let root = tree.refined("Safe motion", Decomposition::And, vec![t1, any]);

    let solver = ConfigurationsSolver::new();
    let cut_sets = solver.minimal_cut_sets(&root).unwrap();

    assert_eq!(symbols(&cut_sets), [["t1", "u1"], ["t1", "u2"]]);

    let configurations = solver.get_configurations(&root).unwrap();
    let ids: Vec<_> = configurations.keys().map(|id| id.to_string()).collect();

    assert_eq!(ids, ["C1", "C2"]);
    assert_eq!(
        configurations[&ConfigurationId(1)].to_string(),
        "System is safe when t1 and u2 are provided"
    );
}

#[test]
fn test_shared_symbols_deduplicate() {
    use crate::tree::TreeBuilder;

    let mut tree = TreeBuilder::new();
    let e1 = tree.context_assumption("Warehouse is empty", Some("NoHumans"));
    let t1 = tree.technical("Limit speed", None);
    let left = tree.refined("left", Decomposition::And, vec![e1.clone(), t1.clone()]);
    let right = tree.refined("right", Decomposition::And, vec![e1, t1]);
    let root = tree.refined("root", Decomposition::And, vec![left, right]);

    let cut_sets = ConfigurationsSolver::new().minimal_cut_sets(&root).unwrap();

    assert_eq!(symbols(&cut_sets), [["e1", "t1"]]);

    let configuration = Configuration::from_cut_set(&cut_sets[0]);
    assert_eq!(
        configuration.to_string(),
        "If context is e1, system is safe when t1 are provided"
    );
}

#[test]
fn test_minimize() {
    use crate::tree::TreeBuilder;

    let mut tree = TreeBuilder::new();
    let t1 = tree.technical("a", None);
    let t2 = tree.technical("b", None);
    let both = tree.refined("both", Decomposition::And, vec![t1.clone(), t2]);
    let root = tree.refined("root", Decomposition::Or, vec![both, t1.clone(), t1]);

    let cut_sets = ConfigurationsSolver::new().minimal_cut_sets(&root).unwrap();
    assert_eq!(cut_sets.len(), 3);

    let minimal = minimize(cut_sets);
    assert_eq!(symbols(&minimal), [["t1"]]);
}

#[test]
fn test_malformed_trees() {
    use crate::tree::TreeBuilder;

    let mut tree = TreeBuilder::new();
    let t1 = tree.technical("a", None);
    let t2 = tree.technical("b", None);
    let undecided = tree.refined_with("undecided", None, vec![t1.clone()]);
    let childless = tree.refined_with("childless", None, vec![]);
    let negated = tree.refined("negated", Decomposition::Not, vec![t1.clone()]);
    let double = tree.refined("double", Decomposition::Not, vec![t1, t2]);

    let solver = ConfigurationsSolver::new();

    assert!(matches!(
        solver.minimal_cut_sets(&undecided),
        Err(SolverError::MissingDecomposition { .. })
    ));
    assert!(matches!(
        solver.minimal_cut_sets(&childless),
        Err(SolverError::EmptyRefinement { .. })
    ));
    assert_eq!(
        solver.minimal_cut_sets(&negated),
        Err(SolverError::UnsupportedNegation { symbol: negated.symbol() })
    );
    assert_eq!(
        solver.minimal_cut_sets(&double),
        Err(SolverError::NegationArity {
            symbol: double.symbol(),
            children: 2
        })
    );

    let lenient = ConfigurationsSolver::with_negation_policy(NegationPolicy::PassThrough);
    assert_eq!(symbols(&lenient.minimal_cut_sets(&negated).unwrap()), [["t1"]]);
}

#[test]
fn test_childless_refinements() {
    use crate::tree::TreeBuilder;

    let mut tree = TreeBuilder::new();
    let t1 = tree.technical("Limit speed", None);
    let nothing_required = tree.refined("nothing required", Decomposition::And, vec![]);
    let no_alternative = tree.refined("no alternative", Decomposition::Or, vec![]);

    let solver = ConfigurationsSolver::new();

    assert_eq!(solver.minimal_cut_sets(&nothing_required).unwrap(), [CutSet::new()]);
    assert!(solver.minimal_cut_sets(&no_alternative).unwrap().is_empty());

    let and = tree.refined("and", Decomposition::And, vec![t1.clone(), nothing_required.clone()]);
    assert_eq!(symbols(&solver.minimal_cut_sets(&and).unwrap()), [["t1"]]);

    let blocked = tree.refined("blocked", Decomposition::And, vec![t1.clone(), no_alternative]);
    assert!(solver.minimal_cut_sets(&blocked).unwrap().is_empty());

    let or = tree.refined("or", Decomposition::Or, vec![t1, nothing_required]);
    assert_eq!(symbols(&solver.minimal_cut_sets(&or).unwrap()), [vec!["t1"], vec![]]);
}

#[test]
fn test_unlisted_leaves() {
    use crate::tree::TreeBuilder;

    let mut tree = TreeBuilder::new();
    let t1 = tree.technical("Limit speed", None);
    let n1 = tree.empty("Nothing further to show", None);
    let p1 = tree.parameter_context("Load is known", Some("Load"));
    let root = tree.refined("root", Decomposition::And, vec![t1, n1, p1]);

    let solver = ConfigurationsSolver::new();
    let cut_sets = solver.minimal_cut_sets(&root).unwrap();

    assert_eq!(symbols(&cut_sets), [["t1", "n1", "p1"]]);

    let configurations = solver.get_configurations(&root).unwrap();
    let configuration = &configurations[&ConfigurationId(0)];
    let listed: Vec<_> = configuration.requirements().map(|r| r.symbol().to_string()).collect();

    assert_eq!(listed, ["t1"]);
    assert!(configuration.context_assumptions.is_empty());
    assert_eq!(configuration.to_string(), "System is safe when t1 are provided");
}
