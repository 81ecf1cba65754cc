use std::collections::HashMap;

/// Crisp input values keyed by antecedent name.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Inputs(pub(crate) HashMap<String, f64>);

impl Inputs {
    pub fn new() -> Self {
        Inputs(HashMap::new())
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Inputs(HashMap::with_capacity(capacity))
    }

    // TODO: Accept fuzzy facts as well as crisp values, so the aggregate of one
    // system can feed another without defuzzifying first
    pub fn add(&mut self, variable: impl Into<String>, value: f64) -> &mut Self {
        self.0.insert(variable.into(), value);
        self
    }

    pub fn get(&self, variable: &str) -> Option<f64> {
        self.0.get(variable).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

impl<S: Into<String>> FromIterator<(S, f64)> for Inputs {
    fn from_iter<I: IntoIterator<Item = (S, f64)>>(iter: I) -> Self {
        Inputs(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

impl<S: Into<String>, const N: usize> From<[(S, f64); N]> for Inputs {
    fn from(values: [(S, f64); N]) -> Self {
        values.into_iter().collect()
    }
}
