use std::collections::HashMap;
use std::fmt;

use crate::error::EvaluationError;
use crate::inputs::Inputs;
use crate::variable::Antecedent;

/// A rule premise over fuzzy propositions.
///
/// Built either by parsing antecedent text (see [`crate::parser`]) or with
/// the builder methods:
///
/// ```
/// use fuzzy_safety::Expr;
///
/// let premise = Expr::is("Activity", "Static").and(!Expr::is("Distance", "Close"));
///
/// assert_eq!(premise, "Activity is Static and not Distance is Close".parse().unwrap());
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Expr {
    /// `variable is term`
    Is { variable: String, term: String },
    Not(Box<Expr>),
    And(Box<Expr>, Box<Expr>),
    Or(Box<Expr>, Box<Expr>),
}

impl Expr {
    pub fn is(variable: impl Into<String>, term: impl Into<String>) -> Self {
        Expr::Is {
            variable: variable.into(),
            term: term.into(),
        }
    }

    pub fn or(self, rhs: Expr) -> Self {
        Expr::Or(Box::new(self), Box::new(rhs))
    }

    pub fn and(self, rhs: Expr) -> Self {
        Expr::And(Box::new(self), Box::new(rhs))
    }

    /// Every `(variable, term)` proposition, left to right.
    pub fn propositions(&self) -> Vec<(&str, &str)> {
        let mut props = Vec::new();

        fn collect<'p>(expr: &'p Expr, out: &mut Vec<(&'p str, &'p str)>) {
            match expr {
                Expr::Is { variable, term } => out.push((variable, term)),
                Expr::Not(expr) => collect(expr, out),
                Expr::And(lhs, rhs) | Expr::Or(lhs, rhs) => {
                    collect(lhs, out);
                    collect(rhs, out);
                },
            }
        }

        collect(self, &mut props);

        props
    }

    /// Fuzzy truth value of the premise: `not` is the complement, `and` the
    /// minimum and `or` the maximum of the operand degrees.
    pub fn evaluate(&self, inputs: &Inputs, antecedents: &HashMap<String, Antecedent>) -> Result<f64, EvaluationError> {
        match self {
            Expr::Is { variable, term } => {
                let antecedent = antecedents
                    .get(variable)
                    .ok_or_else(|| EvaluationError::UnknownVariable {
                        variable: variable.clone(),
                    })?;
                let value = inputs.get(variable).ok_or_else(|| EvaluationError::MissingInput {
                    variable: variable.clone(),
                })?;

                antecedent.membership_degree(term, value)
            },
            Expr::Not(expr) => Ok(1. - expr.evaluate(inputs, antecedents)?),
            Expr::And(lhs, rhs) => {
                let left = lhs.evaluate(inputs, antecedents)?;
                let right = rhs.evaluate(inputs, antecedents)?;

                Ok(f64::min(left, right))
            },
            Expr::Or(lhs, rhs) => {
                let left = lhs.evaluate(inputs, antecedents)?;
                let right = rhs.evaluate(inputs, antecedents)?;

                Ok(f64::max(left, right))
            },
        }
    }
}

impl std::ops::Not for Expr {
    type Output = Expr;

    fn not(self) -> Expr {
        Expr::Not(Box::new(self))
    }
}

/// Renders compound expressions fully parenthesised, so the output parses
/// back into the same tree.
impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Is { variable, term } => write!(f, "{variable} is {term}"),
            Expr::Not(expr) => write!(f, "not {expr}"),
            Expr::And(lhs, rhs) => write!(f, "({lhs} and {rhs})"),
            Expr::Or(lhs, rhs) => write!(f, "({lhs} or {rhs})"),
        }
    }
}

#[test]
fn test_propositions() {
    let expr = Expr::is("Latency", "High").or(!Expr::is("Throughput", "Low").and(Expr::is("Latency", "Low")));

    assert_eq!(
        expr.propositions(),
        vec![("Latency", "High"), ("Throughput", "Low"), ("Latency", "Low")]
    );
}

#[test]
fn test_display() {
    let expr = (!Expr::is("A", "x"))
        .and(Expr::is("B", "y"))
        .or(!Expr::is("C", "z").and(Expr::is("D", "w")));

    assert_eq!(expr.to_string(), "((not A is x and B is y) or not (C is z and D is w))");
}
