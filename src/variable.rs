use std::ops::Deref;

use tracing::warn;

use crate::error::{EvaluationError, VariableError};
use crate::math::{interp, interp_point};
use crate::ops::{centroid, clip};
use crate::terms::Terms;

/// A named variable over a sampled universe, holding one membership curve per term.
///
/// Every curve is aligned index-for-index with the universe, which is strictly
/// increasing. Both are fixed after construction.
#[derive(Clone, Debug, PartialEq)]
pub struct LinguisticVariable {
    name: String,
    universe: Vec<f64>,
    terms: Terms,
}

impl LinguisticVariable {
    pub fn new(name: impl Into<String>, universe: Vec<f64>, terms: Terms) -> Result<Self, VariableError> {
        let name = name.into();

        if universe.is_empty() {
            return Err(VariableError::EmptyUniverse { variable: name });
        }

        if let Some(index) = universe.windows(2).position(|w| !(w[0] < w[1])) {
            return Err(VariableError::UnorderedUniverse {
                variable: name,
                index: index + 1,
            });
        }

        for (term, membership) in terms.iter() {
            if membership.len() != universe.len() {
                return Err(VariableError::CurveLength {
                    term: term.to_owned(),
                    expected: universe.len(),
                    found: membership.len(),
                });
            }

            if let Some((index, &value)) = membership
                .iter()
                .enumerate()
                .find(|(_, v)| !(0. ..=1.).contains(*v))
            {
                return Err(VariableError::MembershipOutOfRange {
                    term: term.to_owned(),
                    index,
                    value,
                });
            }
        }

        Ok(Self { name, universe, terms })
    }

    /// Builds each term from `(x, membership)` break points, linearly
    /// interpolated onto the universe. Break points must be sorted by `x`.
    pub fn from_points<'t, S: Into<String>>(
        name: impl Into<String>,
        universe: Vec<f64>,
        term_points: impl IntoIterator<Item = (S, &'t [(f64, f64)])>,
    ) -> Result<Self, VariableError> {
        let mut terms = Terms::new();

        for (term, points) in term_points {
            let term = term.into();
            let membership = interp(universe.iter().copied(), points);

            if terms.0.contains_key(&term) {
                return Err(VariableError::DuplicateTerm { term });
            }

            terms.insert(term, membership);
        }

        Self::new(name, universe, terms)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn universe(&self) -> &[f64] {
        &self.universe
    }

    pub fn terms(&self) -> &Terms {
        &self.terms
    }

    /// Lowest and highest universe value.
    pub fn range(&self) -> (f64, f64) {
        // The universe is never empty
        (self.universe[0], self.universe[self.universe.len() - 1])
    }

    fn membership(&self, term: &str) -> Result<&[f64], EvaluationError> {
        self.terms.get(term).ok_or_else(|| EvaluationError::UnknownTerm {
            variable: self.name.clone(),
            term: term.to_owned(),
        })
    }
}

/// An input variable of an inference system.
#[derive(Clone, Debug, PartialEq)]
pub struct Antecedent(LinguisticVariable);

impl Antecedent {
    pub fn new(name: impl Into<String>, universe: Vec<f64>, terms: Terms) -> Result<Self, VariableError> {
        LinguisticVariable::new(name, universe, terms).map(Self)
    }

    /// Degree to which `value` belongs to `term`. Values outside the
    /// universe take the membership of the nearest boundary.
    pub fn membership_degree(&self, term: &str, value: f64) -> Result<f64, EvaluationError> {
        let membership = self.0.membership(term)?;

        Ok(interp_point(value, &self.0.universe, membership))
    }

    /// Membership degree of `value` in every term, in definition order.
    pub fn memberships_at(&self, value: f64) -> Vec<(&str, f64)> {
        self.0
            .terms
            .iter()
            .map(|(term, membership)| (term, interp_point(value, &self.0.universe, membership)))
            .collect()
    }
}

impl From<LinguisticVariable> for Antecedent {
    fn from(var: LinguisticVariable) -> Self {
        Self(var)
    }
}

impl Deref for Antecedent {
    type Target = LinguisticVariable;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// The output variable of an inference system.
#[derive(Clone, Debug, PartialEq)]
pub struct Consequent(LinguisticVariable);

impl Consequent {
    pub fn new(name: impl Into<String>, universe: Vec<f64>, terms: Terms) -> Result<Self, VariableError> {
        LinguisticVariable::new(name, universe, terms).map(Self)
    }

    /// A consequent without terms, as used by Sugeno systems to carry the output range.
    pub fn without_terms(name: impl Into<String>, universe: Vec<f64>) -> Result<Self, VariableError> {
        Self::new(name, universe, Terms::new())
    }

    /// The curve of `term` cut off at `weight`.
    pub fn activation(&self, term: &str, weight: f64) -> Result<Vec<f64>, EvaluationError> {
        let membership = self.0.membership(term)?;

        Ok(clip(membership, weight))
    }

    /// Centroid of `aggregate` over the universe, or 0 if the aggregate
    /// encloses no area.
    pub fn defuzzify(&self, aggregate: &[f64]) -> Result<f64, VariableError> {
        let expected = self.0.universe.len();

        if aggregate.len() != expected {
            return Err(VariableError::AggregateLength {
                expected,
                found: aggregate.len(),
            });
        }

        Ok(self.centroid_of(aggregate))
    }

    /// [`Consequent::defuzzify`] for aggregates already sampled on this universe.
    pub(crate) fn centroid_of(&self, aggregate: &[f64]) -> f64 {
        match centroid(&self.0.universe, aggregate) {
            Some(value) => value,
            None => {
                warn!(variable = %self.0.name, "degenerate aggregate, defuzzifying to 0");
                0.
            },
        }
    }
}

impl From<LinguisticVariable> for Consequent {
    fn from(var: LinguisticVariable) -> Self {
        Self(var)
    }
}

impl Deref for Consequent {
    type Target = LinguisticVariable;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

#[test]
fn test_invariants() {
    let mut terms = Terms::new();
    terms.insert("Low", vec![1., 0.]);

    assert!(LinguisticVariable::new("X", vec![0., 1.], terms.clone()).is_ok());
    assert_eq!(
        LinguisticVariable::new("X", vec![], Terms::new()),
        Err(VariableError::EmptyUniverse { variable: "X".into() })
    );
    assert_eq!(
        LinguisticVariable::new("X", vec![0., 1., 1.], Terms::new()),
        Err(VariableError::UnorderedUniverse {
            variable: "X".into(),
            index: 2
        })
    );
    assert_eq!(
        LinguisticVariable::new("X", vec![0., 1., 2.], terms),
        Err(VariableError::CurveLength {
            term: "Low".into(),
            expected: 3,
            found: 2
        })
    );

    let mut terms = Terms::new();
    terms.insert("High", vec![0., 1.5]);
    assert_eq!(
        LinguisticVariable::new("X", vec![0., 1.], terms),
        Err(VariableError::MembershipOutOfRange {
            term: "High".into(),
            index: 1,
            value: 1.5
        })
    );
}

#[test]
fn test_membership_degree() {
    use crate::linspace::linspace;
    use crate::membership::Shape;

    let universe = linspace(0., 20., 21);
    let terms = Terms::partition(["Low", "Medium", "High"], &universe, Shape::Triangle);
    let x = Antecedent::new("X", universe, terms).unwrap();

    assert_eq!(x.membership_degree("Medium", 10.), Ok(1.));
    assert_eq!(x.membership_degree("Medium", 5.), Ok(0.5));
    assert_eq!(x.membership_degree("High", 14.), Ok(0.4));
    // Clamped to the boundary outside the universe
    assert_eq!(x.membership_degree("Low", -3.), Ok(1.));
    assert_eq!(x.membership_degree("High", 99.), Ok(1.));
    assert_eq!(
        x.membership_degree("Huge", 1.),
        Err(EvaluationError::UnknownTerm {
            variable: "X".into(),
            term: "Huge".into()
        })
    );

    let degrees = x.memberships_at(15.);
    assert_eq!(degrees, vec![("Low", 0.), ("Medium", 0.5), ("High", 0.5)]);
}

#[test]
fn test_from_points() {
    use crate::linspace::linspace;

    let score = LinguisticVariable::from_points(
        "Score",
        linspace(150., 200., 11),
        [
            ("High", &[(175., 0.), (180., 0.2), (185., 0.7), (190., 1.)][..]),
            ("Low", &[(155., 1.), (160., 0.8), (165., 0.5), (170., 0.2), (175., 0.)][..]),
        ],
    )
    .unwrap();

    assert_eq!(
        score.terms().get("High").unwrap(),
        &[0., 0., 0., 0., 0., 0., 0.2, 0.7, 1., 1., 1.]
    );
    assert_eq!(score.terms().get("Low").unwrap()[0], 1.);
    assert_eq!(score.range(), (150., 200.));
}

#[test]
fn test_activation_and_defuzzify() {
    let mut terms = Terms::new();
    terms.insert("Active", vec![0., 0.5, 1.]);
    let context = Consequent::new("Context", vec![0., 0.5, 1.], terms).unwrap();

    assert_eq!(context.activation("Active", 0.7), Ok(vec![0., 0.5, 0.7]));
    assert!(context.activation("Idle", 0.7).is_err());
    assert_eq!(context.defuzzify(&[0., 0., 0.]), Ok(0.));
    assert_eq!(context.defuzzify(&[1., 1., 1.]), Ok(0.5));
    assert_eq!(
        context.defuzzify(&[1., 1.]),
        Err(VariableError::AggregateLength { expected: 3, found: 2 })
    );
}
