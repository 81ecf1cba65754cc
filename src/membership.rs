//! Triangular and trapezoidal membership curves and the three-term
//! partitions built from them.
//!
//! A partition splits a universe into three overlapping terms (e.g.
//! `Low`/`Medium`/`High`). Their break points are fixed fractions of the
//! universe span: `{0, 1/2, 1}` for triangles, `{0, 1/4, 1/2, 3/4, 1}` for
//! trapezoids.

use serde::{Deserialize, Serialize};

use crate::error::NameError;

/// Curve family used for a three-term partition.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Shape {
    #[default]
    Triangle,
    Trapezoid,
}

impl Shape {
    fn fractions(self) -> &'static [f64] {
        match self {
            Shape::Triangle => &[0., 0.5, 1.],
            Shape::Trapezoid => &[0., 0.25, 0.5, 0.75, 1.],
        }
    }
}

impl std::str::FromStr for Shape {
    type Err = NameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "triangle" => Ok(Shape::Triangle),
            "trapezoid" => Ok(Shape::Trapezoid),
            other => Err(NameError::UnknownVariant {
                kind: "membership shape",
                value: other.to_owned(),
                expected: "`triangle` or `trapezoid`",
            }),
        }
    }
}

/// Triangular membership with feet `a`, `c` and peak `b`.
///
/// `a == b` or `b == c` give a shoulder; the peak itself is always 1.
pub fn trimf(universe: &[f64], [a, b, c]: [f64; 3]) -> Vec<f64> {
    universe.iter().map(|&x| tri(x, a, b, c)).collect()
}

fn tri(x: f64, a: f64, b: f64, c: f64) -> f64 {
    if x == b {
        1.
    } else if a != b && a < x && x < b {
        (x - a) / (b - a)
    } else if b != c && b < x && x < c {
        (c - x) / (c - b)
    } else {
        0.
    }
}

/// Trapezoidal membership rising over `[a, b]`, flat on `[b, c]` and
/// falling over `[c, d]`.
pub fn trapmf(universe: &[f64], [a, b, c, d]: [f64; 4]) -> Vec<f64> {
    universe
        .iter()
        .map(|&x| {
            if x < a || x > d {
                0.
            } else if x <= b {
                tri(x, a, b, b)
            } else if x >= c {
                tri(x, c, c, d)
            } else {
                1.
            }
        })
        .collect()
}

/// Maps the fractions onto the universe span.
pub fn partitions(universe: &[f64], fractions: &[f64]) -> Vec<f64> {
    let (Some(&min), Some(&max)) = (universe.first(), universe.last()) else {
        return Vec::new();
    };

    fractions.iter().map(|f| min + (max - min) * f).collect()
}

fn points(universe: &[f64], shape: Shape) -> Vec<f64> {
    let p = partitions(universe, shape.fractions());

    // An empty universe still yields a usable (all-zero) partition
    if p.is_empty() {
        vec![0.; shape.fractions().len()]
    } else {
        p
    }
}

/// The three curves of a partition, ordered low to high.
pub fn membership_functions(universe: &[f64], shape: Shape) -> [Vec<f64>; 3] {
    let p = points(universe, shape);

    match shape {
        Shape::Triangle => [
            trimf(universe, [p[0], p[0], p[1]]),
            trimf(universe, [p[0], p[1], p[2]]),
            trimf(universe, [p[1], p[2], p[2]]),
        ],
        Shape::Trapezoid => [
            trapmf(universe, [p[0], p[0], p[1], p[2]]),
            trimf(universe, [p[1], p[2], p[3]]),
            trapmf(universe, [p[2], p[3], p[4], p[4]]),
        ],
    }
}

/// Support `[lo, hi]` of each of the three terms.
pub fn intervals(universe: &[f64], shape: Shape) -> [[f64; 2]; 3] {
    let p = points(universe, shape);

    match shape {
        Shape::Triangle => [[p[0], p[1]], [p[0], p[2]], [p[1], p[2]]],
        Shape::Trapezoid => [[p[0], p[2]], [p[1], p[3]], [p[2], p[4]]],
    }
}

/// Analytic centroid of term `index` (0, 1 or 2) of a partition.
///
/// Indices past the last term resolve to the last term.
pub fn centroid(index: usize, universe: &[f64], shape: Shape) -> f64 {
    let p = points(universe, shape);

    match (shape, index) {
        (Shape::Triangle, 0) => p[0] + (p[1] - p[0]) / 3.,
        (Shape::Triangle, 1) => p[1],
        (Shape::Triangle, _) => p[1] + (p[2] - p[1]) * 2. / 3.,
        (Shape::Trapezoid, 0) => p[0] + (p[1] - p[0]) / 2. + (p[2] - p[1]) / 3.,
        (Shape::Trapezoid, 1) => p[2],
        (Shape::Trapezoid, _) => p[2] + (p[3] - p[2]) * 2. / 3. + (p[4] - p[3]) / 2.,
    }
}

#[test]
fn test_trimf() {
    let universe = [0., 1., 2., 3., 4.];

    assert_eq!(trimf(&universe, [0., 2., 4.]), vec![0., 0.5, 1., 0.5, 0.]);
    // Left shoulder
    assert_eq!(trimf(&universe, [0., 0., 4.]), vec![1., 0.75, 0.5, 0.25, 0.]);
    // Right shoulder
    assert_eq!(trimf(&universe, [0., 4., 4.]), vec![0., 0.25, 0.5, 0.75, 1.]);
}

#[test]
fn test_trapmf() {
    let universe = [0., 1., 2., 3., 4., 5.];

    assert_eq!(trapmf(&universe, [1., 2., 3., 4.]), vec![0., 0., 1., 1., 0., 0.]);
    assert_eq!(trapmf(&universe, [0., 0., 1., 3.]), vec![1., 1., 0.5, 0., 0., 0.]);
}

#[test]
fn test_partition_is_complete() {
    use crate::linspace::linspace;

    // Every sample is covered with a total membership of exactly one
    for shape in [Shape::Triangle, Shape::Trapezoid] {
        let universe = linspace(0., 8., 17);
        let [low, medium, high] = membership_functions(&universe, shape);

        for i in 0..universe.len() {
            let total = low[i] + medium[i] + high[i];
            assert!((total - 1.).abs() < 1e-12, "{shape:?} at {}", universe[i]);
        }
    }
}

#[test]
fn test_intervals_and_centroids() {
    let universe = [0., 4., 8.];

    assert_eq!(intervals(&universe, Shape::Triangle), [[0., 4.], [0., 8.], [4., 8.]]);
    assert_eq!(intervals(&universe, Shape::Trapezoid), [[0., 4.], [2., 6.], [4., 8.]]);

    assert_eq!(centroid(1, &universe, Shape::Triangle), 4.);
    assert!((centroid(0, &universe, Shape::Triangle) - 4. / 3.).abs() < 1e-12);
    assert!((centroid(2, &universe, Shape::Triangle) - 20. / 3.).abs() < 1e-12);

    assert_eq!(centroid(1, &universe, Shape::Trapezoid), 4.);
    assert!((centroid(0, &universe, Shape::Trapezoid) - (1. + 2. / 3.)).abs() < 1e-12);
    assert!((centroid(2, &universe, Shape::Trapezoid) - (4. + 4. / 3. + 1.)).abs() < 1e-12);
}

#[test]
fn test_shape_from_str() {
    assert_eq!("Trapezoid".parse::<Shape>(), Ok(Shape::Trapezoid));
    assert_eq!(
        "bell".parse::<Shape>(),
        Err(NameError::UnknownVariant {
            kind: "membership shape",
            value: "bell".to_owned(),
            expected: "`triangle` or `trapezoid`",
        })
    );
}
