use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;

use crate::dsl::Expr;
use crate::error::{EvaluationError, ParseError};
use crate::inputs::Inputs;
use crate::variable::{Antecedent, Consequent};

/// A parsed rule premise, keeping the text it was written as.
#[derive(Clone, Debug, PartialEq)]
pub struct Rule {
    text: String,
    premise: Expr,
}

impl Rule {
    pub fn new(text: impl Into<String>) -> Result<Self, ParseError> {
        let text = text.into();
        let premise = text.parse()?;

        Ok(Self { text, premise })
    }

    pub fn premise(&self) -> &Expr {
        &self.premise
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Degree in [0, 1] to which the premise holds for `inputs`.
    pub fn weight(&self, inputs: &Inputs, antecedents: &HashMap<String, Antecedent>) -> Result<f64, EvaluationError> {
        self.premise.evaluate(inputs, antecedents)
    }
}

impl From<Expr> for Rule {
    fn from(premise: Expr) -> Self {
        Self {
            text: premise.to_string(),
            premise,
        }
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// A rule whose consequence is a term of the consequent variable.
#[derive(Clone, Debug, PartialEq)]
pub struct MamdaniRule {
    rule: Rule,
    consequence: String,
}

impl MamdaniRule {
    pub fn new(premise: &str, consequence: impl Into<String>) -> Result<Self, ParseError> {
        Ok(Self {
            rule: Rule::new(premise)?,
            consequence: consequence.into(),
        })
    }

    pub fn from_expr(premise: Expr, consequence: impl Into<String>) -> Self {
        Self {
            rule: premise.into(),
            consequence: consequence.into(),
        }
    }

    pub fn rule(&self) -> &Rule {
        &self.rule
    }

    pub fn consequence(&self) -> &str {
        &self.consequence
    }

    /// The consequence curve cut off at the premise weight.
    pub fn evaluate(
        &self,
        inputs: &Inputs,
        antecedents: &HashMap<String, Antecedent>,
        consequent: &Consequent,
    ) -> Result<Vec<f64>, EvaluationError> {
        let weight = self.rule.weight(inputs, antecedents)?;

        consequent.activation(&self.consequence, weight)
    }
}

/// Crisp consequence of a Sugeno rule, computed from the inputs.
pub trait ConsequentFunction: fmt::Debug + Send + Sync {
    fn evaluate(&self, inputs: &Inputs) -> Result<f64, EvaluationError>;
}

/// `constant + Σ factor · input`, over named inputs.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Polynomial {
    factors: IndexMap<String, f64>,
    constant: f64,
}

impl Polynomial {
    pub fn new(constant: f64) -> Self {
        Self {
            factors: IndexMap::new(),
            constant,
        }
    }

    pub fn with_factor(mut self, input: impl Into<String>, factor: f64) -> Self {
        self.factors.insert(input.into(), factor);
        self
    }

    pub fn factor(&self, input: &str) -> f64 {
        self.factors.get(input).copied().unwrap_or(0.)
    }

    pub fn constant(&self) -> f64 {
        self.constant
    }

    /// Shifts the whole polynomial by `delta`.
    pub fn offset(&mut self, delta: f64) {
        self.constant += delta;
    }
}

impl ConsequentFunction for Polynomial {
    fn evaluate(&self, inputs: &Inputs) -> Result<f64, EvaluationError> {
        self.factors.iter().try_fold(self.constant, |acc, (input, factor)| {
            let value = inputs.get(input).ok_or_else(|| EvaluationError::MissingInput {
                variable: input.clone(),
            })?;

            Ok(acc + factor * value)
        })
    }
}

/// An arbitrary function of named inputs, applied in argument order.
#[derive(Clone)]
pub struct Function {
    arguments: Vec<String>,
    f: Arc<dyn Fn(&[f64]) -> f64 + Send + Sync>,
}

impl Function {
    pub fn new<S, F>(arguments: impl IntoIterator<Item = S>, f: F) -> Self
    where
        S: Into<String>,
        F: Fn(&[f64]) -> f64 + Send + Sync + 'static,
    {
        Self {
            arguments: arguments.into_iter().map(Into::into).collect(),
            f: Arc::new(f),
        }
    }
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Function").field("arguments", &self.arguments).finish_non_exhaustive()
    }
}

impl ConsequentFunction for Function {
    fn evaluate(&self, inputs: &Inputs) -> Result<f64, EvaluationError> {
        let args = self
            .arguments
            .iter()
            .map(|arg| {
                inputs
                    .get(arg)
                    .ok_or_else(|| EvaluationError::MissingInput { variable: arg.clone() })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok((self.f)(&args))
    }
}

/// A rule whose consequence is a crisp function of the inputs.
#[derive(Debug)]
pub struct SugenoRule {
    rule: Rule,
    consequence: Box<dyn ConsequentFunction>,
}

impl SugenoRule {
    pub fn new(premise: &str, consequence: impl ConsequentFunction + 'static) -> Result<Self, ParseError> {
        Ok(Self {
            rule: Rule::new(premise)?,
            consequence: Box::new(consequence),
        })
    }

    pub fn from_expr(premise: Expr, consequence: impl ConsequentFunction + 'static) -> Self {
        Self {
            rule: premise.into(),
            consequence: Box::new(consequence),
        }
    }

    pub fn rule(&self) -> &Rule {
        &self.rule
    }

    pub fn consequence(&self) -> &dyn ConsequentFunction {
        &*self.consequence
    }

    /// The consequence value and the premise weight, in that order.
    pub fn evaluate(
        &self,
        inputs: &Inputs,
        antecedents: &HashMap<String, Antecedent>,
    ) -> Result<(f64, f64), EvaluationError> {
        let weight = self.rule.weight(inputs, antecedents)?;
        let value = self.consequence.evaluate(inputs)?;

        Ok((value, weight))
    }
}

/// An ordered rule base.
#[derive(Debug)]
pub struct Rules<R>(pub(crate) Vec<R>);

impl<R> Default for Rules<R> {
    fn default() -> Self {
        Rules(Vec::new())
    }
}

impl<R> Rules<R> {
    pub fn new() -> Self {
        Rules(Vec::new())
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Rules(Vec::with_capacity(capacity))
    }

    pub fn add(&mut self, rule: R) -> &mut Self {
        self.0.push(rule);
        self
    }

    pub fn iter(&self) -> std::slice::Iter<'_, R> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<R> FromIterator<R> for Rules<R> {
    fn from_iter<I: IntoIterator<Item = R>>(iter: I) -> Self {
        Rules(iter.into_iter().collect())
    }
}

impl<R> From<Vec<R>> for Rules<R> {
    fn from(rules: Vec<R>) -> Self {
        Rules(rules)
    }
}

impl<'r, R> IntoIterator for &'r Rules<R> {
    type Item = &'r R;
    type IntoIter = std::slice::Iter<'r, R>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[test]
fn test_rule_keeps_text() {
    let rule = Rule::new("(not Location is Warehouse) and Activity is Moderate").unwrap();

    assert_eq!(rule.to_string(), "(not Location is Warehouse) and Activity is Moderate");
    assert_eq!(
        rule.premise(),
        &(!Expr::is("Location", "Warehouse")).and(Expr::is("Activity", "Moderate"))
    );
    assert!(Rule::new("Location is").is_err());
}

#[test]
fn test_polynomial() {
    let mut p = Polynomial::new(1.5).with_factor("LoadWeight", -0.001).with_factor("SurfaceGradient", -10.);
    let inputs = Inputs::from([("LoadWeight", 500.), ("SurfaceGradient", 0.05), ("Unused", 3.)]);

    assert_eq!(p.evaluate(&inputs), Ok(1.5 - 0.5 - 0.5));

    p.offset(-0.25);
    assert_eq!(p.constant(), 1.25);
    assert_eq!(p.factor("Unused"), 0.);

    assert_eq!(
        p.evaluate(&Inputs::from([("LoadWeight", 1.)])),
        Err(EvaluationError::MissingInput {
            variable: "SurfaceGradient".into()
        })
    );
}

#[test]
fn test_function() {
    let f = Function::new(["A", "B"], |args| args[0] * args[1]);

    assert_eq!(f.evaluate(&Inputs::from([("A", 3.), ("B", 4.)])), Ok(12.));
    assert!(f.evaluate(&Inputs::from([("A", 3.)])).is_err());
}
