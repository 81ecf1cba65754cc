//! Runtime check of configurations against the fuzzy verdicts on their
//! context assumptions.

use std::collections::{BTreeMap, HashMap};

use tracing::debug;

use crate::error::MonitorError;
use crate::outputs::Aggregate;
use crate::solver::{Configuration, ConfigurationId};
use crate::tree::Symbol;
use crate::variable::Consequent;

/// Decides which configurations currently hold.
///
/// Each context assumption is backed by the aggregate of a Mamdani system over
/// the shared context consequent. A configuration holds when it assumes
/// nothing, or when the fuzzy AND of its assumptions' aggregates defuzzifies
/// to at least the threshold.
#[derive(Clone, Debug)]
pub struct ContextMonitor<'c> {
    consequent: &'c Consequent,
    threshold: f64,
    evidence: HashMap<Symbol, Aggregate>,
}

impl<'c> ContextMonitor<'c> {
    pub fn new(consequent: &'c Consequent, threshold: f64) -> Self {
        Self {
            consequent,
            threshold,
            evidence: HashMap::new(),
        }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Records the current aggregate for context assumption `symbol`.
    pub fn observe(&mut self, symbol: Symbol, aggregate: Aggregate) -> Result<(), MonitorError> {
        let expected = self.consequent.universe().len();

        if aggregate.len() != expected {
            return Err(MonitorError::EvidenceLength {
                symbol,
                expected,
                found: aggregate.len(),
            });
        }

        self.evidence.insert(symbol, aggregate);

        Ok(())
    }

    pub fn with_evidence(mut self, symbol: Symbol, aggregate: Aggregate) -> Result<Self, MonitorError> {
        self.observe(symbol, aggregate)?;
        Ok(self)
    }

    pub fn clear(&mut self) {
        self.evidence.clear();
    }

    /// The defuzzified joint activation of the configuration's context
    /// assumptions, or `None` when it has none.
    pub fn activation(&self, configuration: &Configuration<'_>) -> Result<Option<f64>, MonitorError> {
        let mut joint: Option<Aggregate> = None;

        for assumption in &configuration.context_assumptions {
            let symbol = assumption.symbol();
            let aggregate = self
                .evidence
                .get(&symbol)
                .ok_or(MonitorError::MissingEvidence { symbol })?;

            joint = Some(match joint {
                Some(joint) => joint.meet(aggregate),
                None => aggregate.clone(),
            });
        }

        Ok(joint.map(|joint| self.consequent.centroid_of(&joint)))
    }

    pub fn configuration_holds(&self, configuration: &Configuration<'_>) -> Result<bool, MonitorError> {
        Ok(self
            .activation(configuration)?
            .map_or(true, |activation| activation >= self.threshold))
    }

    /// Whether each configuration holds, keyed like the input.
    pub fn verdicts(
        &self,
        configurations: &BTreeMap<ConfigurationId, Configuration<'_>>,
    ) -> Result<BTreeMap<ConfigurationId, bool>, MonitorError> {
        let verdicts = configurations
            .iter()
            .map(|(id, configuration)| Ok((*id, self.configuration_holds(configuration)?)))
            .collect::<Result<BTreeMap<_, _>, MonitorError>>()?;

        debug!(
            held = verdicts.values().filter(|held| **held).count(),
            total = verdicts.len(),
            "configurations checked"
        );

        Ok(verdicts)
    }

    /// The configurations the system may currently operate under.
    ///
    /// If a configuration without any technical or undeveloped requirement
    /// holds, the system is unrestricted and only that one is returned.
    pub fn admissible(
        &self,
        configurations: &BTreeMap<ConfigurationId, Configuration<'_>>,
    ) -> Result<Vec<ConfigurationId>, MonitorError> {
        let mut admissible = Vec::new();

        for (id, configuration) in configurations {
            if !self.configuration_holds(configuration)? {
                continue;
            }

            if configuration.requirements().next().is_none() {
                return Ok(vec![*id]);
            }

            admissible.push(*id);
        }

        Ok(admissible)
    }
}

#[cfg(test)]
fn test_context() -> Consequent {
    use crate::linspace::linspace;
    use crate::membership::Shape;
    use crate::terms::Terms;

    let universe = linspace(0., 1., 101);

    Consequent::new(
        "Context",
        universe.clone(),
        Terms::partition(["Inactive", "Transient", "Active"], &universe, Shape::Triangle),
    )
    .unwrap()
}

#[test]
fn test_configuration_holds() {
    use crate::solver::ConfigurationsSolver;
    use crate::tree::{Decomposition, TreeBuilder};

    let context = test_context();
    let active = Aggregate::new(context.activation("Active", 1.).unwrap());
    let inactive = Aggregate::new(context.activation("Inactive", 1.).unwrap());

    let mut tree = TreeBuilder::new();
    let e1 = tree.context_assumption("Enough space", None);
    let e2 = tree.context_assumption("Sufficient QoS", None);
    let t1 = tree.technical("Remote stop", None);
    let t2 = tree.technical("Reduced speed", None);
    let c1 = tree.refined("guarded", Decomposition::And, vec![e1.clone(), e2.clone(), t1]);
    let root = tree.refined("safe", Decomposition::Or, vec![c1, t2]);

    let configurations = ConfigurationsSolver::new().get_configurations(&root).unwrap();
    let guarded = &configurations[&ConfigurationId(0)];
    let fallback = &configurations[&ConfigurationId(1)];

    let monitor = ContextMonitor::new(&context, 0.5)
        .with_evidence(e1.symbol(), active.clone())
        .unwrap()
        .with_evidence(e2.symbol(), inactive.clone())
        .unwrap();

    assert_eq!(monitor.configuration_holds(guarded), Ok(false));
    assert_eq!(monitor.activation(fallback), Ok(None));
    assert_eq!(monitor.configuration_holds(fallback), Ok(true));
    assert_eq!(monitor.admissible(&configurations), Ok(vec![ConfigurationId(1)]));

    let monitor = ContextMonitor::new(&context, 0.5)
        .with_evidence(e1.symbol(), active.clone())
        .unwrap()
        .with_evidence(e2.symbol(), active)
        .unwrap();

    let verdicts = monitor.verdicts(&configurations).unwrap();
    assert_eq!(verdicts.values().copied().collect::<Vec<_>>(), [true, true]);
}

#[test]
fn test_unconditional_configuration() {
    use crate::solver::ConfigurationsSolver;
    use crate::tree::{Decomposition, TreeBuilder};

    let context = test_context();

    let mut tree = TreeBuilder::new();
    let e1 = tree.context_assumption("No humans", None);
    let e2 = tree.context_assumption("Enough space", None);
    let t1 = tree.technical("Remote stop", None);
    let guarded = tree.refined("guarded", Decomposition::And, vec![e2.clone(), t1]);
    let root = tree.refined("safe", Decomposition::Or, vec![e1.clone(), guarded]);

    let configurations = ConfigurationsSolver::new().get_configurations(&root).unwrap();
    let monitor = ContextMonitor::new(&context, 0.5)
        .with_evidence(e1.symbol(), Aggregate::new(context.activation("Active", 1.).unwrap()))
        .unwrap()
        .with_evidence(e2.symbol(), Aggregate::new(context.activation("Active", 1.).unwrap()))
        .unwrap();

    assert_eq!(monitor.admissible(&configurations), Ok(vec![ConfigurationId(0)]));
}

#[test]
fn test_evidence_errors() {
    use crate::tree::{RequirementKind, Symbol};

    let context = test_context();
    let e1 = Symbol::new(RequirementKind::ContextAssumption, 1);
    let mut monitor = ContextMonitor::new(&context, 0.5);

    assert_eq!(
        monitor.observe(e1, Aggregate::new(vec![0.; 3])),
        Err(MonitorError::EvidenceLength {
            symbol: e1,
            expected: 101,
            found: 3
        })
    );

    let mut tree = crate::tree::TreeBuilder::new();
    let assumption = tree.context_assumption("No humans", None);
    let configuration = Configuration {
        context_assumptions: vec![&assumption],
        ..Configuration::default()
    };

    assert_eq!(
        monitor.configuration_holds(&configuration),
        Err(MonitorError::MissingEvidence { symbol: e1 })
    );
}
