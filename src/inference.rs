use std::collections::HashMap;

use tracing::{debug, trace};

use crate::dsl::Expr;
use crate::error::{EvaluationError, InferenceError};
use crate::inputs::Inputs;
use crate::outputs::Aggregate;
use crate::rules::{MamdaniRule, Rules, SugenoRule};
use crate::variable::{Antecedent, Consequent};

fn by_name(antecedents: impl IntoIterator<Item = Antecedent>) -> HashMap<String, Antecedent> {
    antecedents.into_iter().map(|a| (a.name().to_owned(), a)).collect()
}

/// Checks that every proposition of every premise names a known antecedent term.
fn validate_premises<'r>(
    antecedents: &HashMap<String, Antecedent>,
    premises: impl IntoIterator<Item = &'r Expr>,
) -> Result<(), EvaluationError> {
    for premise in premises {
        for (variable, term) in premise.propositions() {
            let antecedent = antecedents
                .get(variable)
                .ok_or_else(|| EvaluationError::UnknownVariable {
                    variable: variable.to_owned(),
                })?;

            if antecedent.terms().get(term).is_none() {
                return Err(EvaluationError::UnknownTerm {
                    variable: variable.to_owned(),
                    term: term.to_owned(),
                });
            }
        }
    }

    Ok(())
}

/// Mamdani inference: every rule clips its consequence term at the premise
/// weight, the clipped curves are joined with a point-wise maximum and the
/// result is defuzzified by centroid.
///
/// Systems are immutable once built and can be shared across threads.
#[derive(Debug)]
pub struct MamdaniFis {
    antecedents: HashMap<String, Antecedent>,
    consequent: Consequent,
    rules: Rules<MamdaniRule>,
}

impl MamdaniFis {
    pub fn new(
        antecedents: impl IntoIterator<Item = Antecedent>,
        consequent: Consequent,
        rules: impl Into<Rules<MamdaniRule>>,
    ) -> Self {
        Self {
            antecedents: by_name(antecedents),
            consequent,
            rules: rules.into(),
        }
    }

    pub fn antecedents(&self) -> &HashMap<String, Antecedent> {
        &self.antecedents
    }

    pub fn consequent(&self) -> &Consequent {
        &self.consequent
    }

    pub fn rules(&self) -> &Rules<MamdaniRule> {
        &self.rules
    }

    /// Checks every rule against the variables of the system without needing inputs.
    pub fn validate(&self) -> Result<(), EvaluationError> {
        validate_premises(&self.antecedents, self.rules.iter().map(|r| r.rule().premise()))?;

        for rule in &self.rules {
            if self.consequent.terms().get(rule.consequence()).is_none() {
                return Err(EvaluationError::UnknownTerm {
                    variable: self.consequent.name().to_owned(),
                    term: rule.consequence().to_owned(),
                });
            }
        }

        Ok(())
    }

    /// The aggregated fuzzy output, for combining with other systems before
    /// defuzzification. Without rules the aggregate is all zeros.
    pub fn compute_aggregate(&self, inputs: &Inputs) -> Result<Aggregate, EvaluationError> {
        let mut aggregate = Aggregate::zeros(self.consequent.universe().len());

        for rule in &self.rules {
            let activation = rule.evaluate(inputs, &self.antecedents, &self.consequent)?;

            trace!(rule = %rule.rule(), consequence = rule.consequence(), "rule activated");

            for (agg, act) in aggregate.0.iter_mut().zip(activation) {
                *agg = f64::max(*agg, act);
            }
        }

        Ok(aggregate)
    }

    /// The defuzzified output; 0 when no rule fired.
    pub fn compute(&self, inputs: &Inputs) -> Result<f64, EvaluationError> {
        let aggregate = self.compute_aggregate(inputs)?;
        let output = self.consequent.centroid_of(&aggregate);

        debug!(consequent = self.consequent.name(), output, "mamdani inference");

        Ok(output)
    }
}

/// Sugeno inference: the output is the average of the rule consequence
/// values, weighted by premise weight.
#[derive(Debug)]
pub struct SugenoFis {
    antecedents: HashMap<String, Antecedent>,
    consequent: Consequent,
    rules: Rules<SugenoRule>,
}

impl SugenoFis {
    pub fn new(
        antecedents: impl IntoIterator<Item = Antecedent>,
        consequent: Consequent,
        rules: impl Into<Rules<SugenoRule>>,
    ) -> Self {
        Self {
            antecedents: by_name(antecedents),
            consequent,
            rules: rules.into(),
        }
    }

    pub fn antecedents(&self) -> &HashMap<String, Antecedent> {
        &self.antecedents
    }

    pub fn consequent(&self) -> &Consequent {
        &self.consequent
    }

    pub fn rules(&self) -> &Rules<SugenoRule> {
        &self.rules
    }

    /// Bounds of the consequent universe.
    pub fn output_range(&self) -> (f64, f64) {
        self.consequent.range()
    }

    pub fn validate(&self) -> Result<(), EvaluationError> {
        validate_premises(&self.antecedents, self.rules.iter().map(|r| r.rule().premise()))
    }

    /// Fails with [`InferenceError::NoFiringRule`] when every premise weight is zero.
    pub fn compute(&self, inputs: &Inputs) -> Result<f64, InferenceError> {
        let mut weighted_sum = 0.;
        let mut weights_sum = 0.;

        for rule in &self.rules {
            let (value, weight) = rule.evaluate(inputs, &self.antecedents)?;

            trace!(rule = %rule.rule(), value, weight, "rule evaluated");

            weighted_sum += value * weight;
            weights_sum += weight;
        }

        if weights_sum == 0. {
            return Err(InferenceError::NoFiringRule { rules: self.rules.len() });
        }

        let output = weighted_sum / weights_sum;

        debug!(consequent = self.consequent.name(), output, "sugeno inference");

        Ok(output)
    }
}

#[cfg(test)]
fn test_variables() -> (Antecedent, Consequent) {
    use crate::linspace::linspace;
    use crate::membership::Shape;
    use crate::terms::Terms;

    let x_universe = linspace(0., 20., 21);
    let x = Antecedent::new(
        "X",
        x_universe.clone(),
        Terms::partition(["Low", "Medium", "High"], &x_universe, Shape::Triangle),
    )
    .unwrap();

    let context_universe = linspace(0., 1., 101);
    let context = Consequent::new(
        "Context",
        context_universe.clone(),
        Terms::partition(["Inactive", "Transient", "Active"], &context_universe, Shape::Triangle),
    )
    .unwrap();

    (x, context)
}

#[test]
fn test_mamdani_single_rule() {
    let (x, context) = test_variables();
    let fis = MamdaniFis::new([x], context, vec![MamdaniRule::new("X is High", "Active").unwrap()]);

    fis.validate().unwrap();

    // High is 0.7 at 17, so Active is clipped at 0.7 from 0.85 onwards
    let output = fis.compute(&Inputs::from([("X", 17.)])).unwrap();

    let w: f64 = 0.7;
    let (tri_area, tri_center) = (0.25 * w * w, 0.5 + 2. / 3. * 0.5 * w);
    let (rect_area, rect_center) = (w * 0.5 * (1. - w), (0.5 + 0.5 * w + 1.) / 2.);
    let expected = (tri_area * tri_center + rect_area * rect_center) / (tri_area + rect_area);

    assert!((output - expected).abs() < 1e-9, "{output} != {expected}");
    assert!(output > 0.7 * (0.5 + 1. / 3.) && output < 0.5 + 1. / 3.);

    // Low does not fire at all
    let output = fis.compute(&Inputs::from([("X", 3.)])).unwrap();
    assert_eq!(output, 0.);
}

#[test]
fn test_mamdani_aggregate_and_errors() {
    let (x, context) = test_variables();
    let fis = MamdaniFis::new(
        [x],
        context,
        vec![
            MamdaniRule::new("X is Low", "Inactive").unwrap(),
            MamdaniRule::new("X is Medium or X is High", "Active").unwrap(),
        ],
    );

    let inputs = Inputs::from([("X", 5.)]);
    let aggregate = fis.compute_aggregate(&inputs).unwrap();

    assert_eq!(aggregate.len(), 101);
    assert_eq!(aggregate[0], 0.5);
    assert_eq!(aggregate[100], 0.5);
    assert_eq!(fis.compute(&inputs).unwrap(), fis.consequent().defuzzify(&aggregate).unwrap());

    assert_eq!(
        fis.compute(&Inputs::new()),
        Err(EvaluationError::MissingInput { variable: "X".into() })
    );

    let (x, context) = test_variables();
    let fis = MamdaniFis::new([x], context, vec![MamdaniRule::new("X is Huge", "Active").unwrap()]);

    assert!(fis.validate().is_err());
    assert_eq!(
        fis.compute(&inputs),
        Err(EvaluationError::UnknownTerm {
            variable: "X".into(),
            term: "Huge".into()
        })
    );

    let (x, context) = test_variables();
    let fis = MamdaniFis::new([x], context, vec![MamdaniRule::new("X is Low", "Unsafe").unwrap()]);

    assert!(fis.validate().is_err());
}

#[test]
fn test_mamdani_without_rules() {
    let (x, context) = test_variables();
    let fis = MamdaniFis::new([x], context, Rules::new());

    assert_eq!(fis.compute(&Inputs::from([("X", 5.)])), Ok(0.));
}

#[test]
fn test_sugeno() {
    use crate::rules::Polynomial;

    let (x, _) = test_variables();
    let speed = Consequent::without_terms("Speed", crate::linspace::linspace(0., 10., 11)).unwrap();
    let fis = SugenoFis::new(
        [x],
        speed,
        vec![
            SugenoRule::new("X is Low", Polynomial::new(8.)).unwrap(),
            SugenoRule::new("X is Medium", Polynomial::new(1.).with_factor("X", 0.25)).unwrap(),
            SugenoRule::new("X is High", Polynomial::new(2.)).unwrap(),
        ],
    );

    fis.validate().unwrap();
    assert_eq!(fis.output_range(), (0., 10.));

    // Only Medium fires at 10
    assert_eq!(fis.compute(&Inputs::from([("X", 10.)])), Ok(3.5));
    // Low and Medium fire equally at 5
    assert_eq!(fis.compute(&Inputs::from([("X", 5.)])), Ok((8. * 0.5 + 2.25 * 0.5) / 1.));
}

#[test]
fn test_sugeno_no_firing_rule() {
    use crate::rules::Polynomial;

    let (x, _) = test_variables();
    let speed = Consequent::without_terms("Speed", vec![0., 10.]).unwrap();
    let fis = SugenoFis::new([x], speed, vec![SugenoRule::new("X is High", Polynomial::new(2.)).unwrap()]);

    assert_eq!(
        fis.compute(&Inputs::from([("X", 4.)])),
        Err(InferenceError::NoFiringRule { rules: 1 })
    );
    assert_eq!(
        fis.compute(&Inputs::new()),
        Err(InferenceError::Evaluation(EvaluationError::MissingInput { variable: "X".into() }))
    );
}
