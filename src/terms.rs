use indexmap::IndexMap;

use crate::membership::{membership_functions, Shape};

/// Named membership curves of a variable, kept in definition order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Terms(pub(crate) IndexMap<String, Vec<f64>>);

impl Terms {
    pub fn new() -> Self {
        Self(IndexMap::new())
    }

    /// Three terms named low to high, shaped as a [`Shape`] partition of `universe`.
    pub fn partition<S: Into<String>>(names: [S; 3], universe: &[f64], shape: Shape) -> Self {
        let curves = membership_functions(universe, shape);

        Self(names.into_iter().map(Into::into).zip(curves).collect())
    }

    /// Returns the curve previously stored under `term`, if any.
    pub fn insert(&mut self, term: impl Into<String>, membership: Vec<f64>) -> Option<Vec<f64>> {
        self.0.insert(term.into(), membership)
    }

    pub fn get(&self, term: &str) -> Option<&[f64]> {
        self.0.get(term).map(Vec::as_slice)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[f64])> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<S: Into<String>> FromIterator<(S, Vec<f64>)> for Terms {
    fn from_iter<I: IntoIterator<Item = (S, Vec<f64>)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

#[test]
fn test_partition_keeps_order() {
    let terms = Terms::partition(["Low", "Medium", "High"], &[0., 1., 2.], Shape::Triangle);

    assert_eq!(terms.names().collect::<Vec<_>>(), ["Low", "Medium", "High"]);
    assert_eq!(terms.get("Medium"), Some(&[0., 1., 0.][..]));
    assert_eq!(terms.get("Missing"), None);
}
