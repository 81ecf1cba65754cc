//! Inference systems and requirement trees are shared read-only across threads.

use fuzzy_safety::constraints::{amr_velocity, no_humans};
use fuzzy_safety::linspace::linspace;
use fuzzy_safety::tree::Decomposition;
use fuzzy_safety::{ConfigurationsSolver, Inputs, Settings, TreeBuilder};
use rayon::prelude::*;

fn grid() -> Vec<(f64, f64, f64)> {
    let mut points = Vec::new();

    for location in linspace(0., 2., 7) {
        for activity in linspace(0., 1., 7) {
            for distance in linspace(0., 100., 7) {
                points.push((location, activity, distance));
            }
        }
    }

    points
}

#[test]
fn test_parallel_sweep_matches_sequential() {
    let fis = no_humans(&Settings::default()).unwrap();
    let inputs = |&(location, activity, distance): &(f64, f64, f64)| {
        Inputs::from([("Location", location), ("Activity", activity), ("Distance", distance)])
    };

    let sequential: Vec<f64> = grid().iter().map(|p| fis.compute(&inputs(p)).unwrap()).collect();
    let parallel: Vec<f64> = grid().par_iter().map(|p| fis.compute(&inputs(p)).unwrap()).collect();

    assert_eq!(sequential, parallel);
    assert!(sequential.iter().all(|v| (0. ..=1.).contains(v)));
}

#[test]
fn test_parallel_sugeno() {
    let fis = amr_velocity(&Settings::default()).unwrap();
    let points: Vec<_> = linspace(0., 2000., 25)
        .into_iter()
        .flat_map(|load| linspace(0., 0.1, 25).into_iter().map(move |gradient| (load, gradient)))
        .collect();

    let compute = |&(load, gradient): &(f64, f64)| {
        fis.compute(&Inputs::from([("LoadWeight", load), ("SurfaceGradient", gradient)]))
            .unwrap()
    };

    let sequential: Vec<f64> = points.iter().map(compute).collect();
    let parallel: Vec<f64> = points.par_iter().map(compute).collect();

    assert_eq!(sequential, parallel);
}

#[test]
fn test_parallel_cut_sets() {
    let mut tree = TreeBuilder::new();
    let leaves: Vec<_> = (0..6).map(|i| tree.undeveloped(format!("u{i}"), None)).collect();
    let (left, right) = leaves.split_at(3);
    let left = tree.refined("left", Decomposition::Or, left.to_vec());
    let right = tree.refined("right", Decomposition::Or, right.to_vec());
    let root = tree.refined("root", Decomposition::And, vec![left, right]);

    let solver = ConfigurationsSolver::new();
    let expected = solver.minimal_cut_sets(&root).unwrap();

    (0..16).into_par_iter().for_each(|_| {
        assert_eq!(solver.minimal_cut_sets(&root).unwrap(), expected);
    });
}
