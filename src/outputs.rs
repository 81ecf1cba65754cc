use std::ops::Deref;

use crate::error::VariableError;
use crate::ops::{fuzzy_and, fuzzy_or};

/// Fuzzy output of a Mamdani system: the aggregated rule activations,
/// sampled on the consequent universe.
///
/// Aggregates over the same consequent can be combined before
/// defuzzification, e.g. to require two operating conditions at once.
#[derive(Clone, Debug, PartialEq)]
pub struct Aggregate(pub(crate) Vec<f64>);

impl Aggregate {
    pub fn new(membership: Vec<f64>) -> Self {
        Self(membership)
    }

    pub(crate) fn zeros(len: usize) -> Self {
        Self(vec![0.; len])
    }

    /// Point-wise minimum with `other`.
    pub fn and(&self, other: &Aggregate) -> Result<Aggregate, VariableError> {
        self.check_len(other)?;
        Ok(self.meet(other))
    }

    /// Point-wise maximum with `other`.
    pub fn or(&self, other: &Aggregate) -> Result<Aggregate, VariableError> {
        self.check_len(other)?;
        Ok(Aggregate(fuzzy_or(&self.0, &other.0)))
    }

    /// [`Aggregate::and`] for aggregates known to share a universe.
    pub(crate) fn meet(&self, other: &Aggregate) -> Aggregate {
        Aggregate(fuzzy_and(&self.0, &other.0))
    }

    fn check_len(&self, other: &Aggregate) -> Result<(), VariableError> {
        if self.0.len() != other.0.len() {
            return Err(VariableError::AggregateLength {
                expected: self.0.len(),
                found: other.0.len(),
            });
        }

        Ok(())
    }

    /// True when no sample has positive membership, i.e. no rule fired.
    pub fn is_degenerate(&self) -> bool {
        !self.0.iter().any(|&m| m > 0.)
    }

    pub fn into_inner(self) -> Vec<f64> {
        self.0
    }
}

impl Deref for Aggregate {
    type Target = [f64];

    fn deref(&self) -> &[f64] {
        &self.0
    }
}

impl From<Vec<f64>> for Aggregate {
    fn from(membership: Vec<f64>) -> Self {
        Self(membership)
    }
}

#[test]
fn test_combine() {
    let e2 = Aggregate::new(vec![0., 0.6, 0.2]);
    let e3 = Aggregate::new(vec![0.1, 0.3, 0.9]);

    assert_eq!(e2.and(&e3).unwrap().into_inner(), vec![0., 0.3, 0.2]);
    assert_eq!(e2.or(&e3).unwrap().into_inner(), vec![0.1, 0.6, 0.9]);
    assert_eq!(
        e2.and(&Aggregate::zeros(2)),
        Err(VariableError::AggregateLength { expected: 3, found: 2 })
    );
    assert!(!e2.is_degenerate());
    assert!(Aggregate::zeros(3).is_degenerate());
}
