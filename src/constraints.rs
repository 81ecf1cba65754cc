//! Operating-condition systems of the autonomous mobile robot use case.
//!
//! The three Mamdani systems rate a context assumption on the shared
//! `Context` consequent (`Inactive`, `Transient`, `Active` over [0, 1]); the
//! Sugeno system gives a velocity bound from load and surface gradient.

use crate::config::Settings;
use crate::error::BuildError;
use crate::inference::{MamdaniFis, SugenoFis};
use crate::linspace::linspace;
use crate::membership::{self, trimf, Shape};
use crate::rules::{MamdaniRule, Polynomial, Rules, SugenoRule};
use crate::terms::Terms;
use crate::variable::{Antecedent, Consequent};

/// Braking distance in metres.
pub const BRAKING_DISTANCE: f64 = 7.;
/// Braking force in newtons.
pub const BRAKING_FORCE: f64 = 2500.;
pub const GRAVITY: f64 = 9.81;
/// Robot weight in kilograms, without load.
pub const AMR_WEIGHT: f64 = 400.;

const GRID: usize = 10;

fn antecedent(name: &str, terms: [&str; 3], universe: Vec<f64>, shape: Shape) -> Result<Antecedent, BuildError> {
    let terms = Terms::partition(terms, &universe, shape);

    Ok(Antecedent::new(name, universe, terms)?)
}

fn mamdani_rules(rules: &[(&str, &str)]) -> Result<Rules<MamdaniRule>, BuildError> {
    rules
        .iter()
        .map(|(premise, consequence)| {
            MamdaniRule::new(premise, *consequence).map_err(|source| BuildError::Rule {
                text: premise.to_string(),
                source,
            })
        })
        .collect()
}

/// The `Context` consequent shared by the Mamdani systems.
pub fn context(settings: &Settings) -> Result<Consequent, BuildError> {
    let universe = linspace(0., 1., settings.inference.samples);
    let terms = Terms::partition(["Inactive", "Transient", "Active"], &universe, settings.inference.mamdani_shape);

    Ok(Consequent::new("Context", universe, terms)?)
}

/// No humans around the robot, from `Location`, `Activity` and `Distance`.
pub fn no_humans(settings: &Settings) -> Result<MamdaniFis, BuildError> {
    let n = settings.inference.samples;
    let shape = settings.inference.mamdani_shape;

    // One extra sample puts a grid point on the Warehouse/Factory boundary
    let location = antecedent("Location", ["Warehouse", "Factory", "Other"], linspace(0., 2., n + 1), shape)?;
    let activity = antecedent("Activity", ["Static", "Moderate", "Dynamic"], linspace(0., 1., n), shape)?;
    let distance = antecedent("Distance", ["Close", "Medium", "Far"], linspace(0., 100., n), shape)?;

    let rules = mamdani_rules(&[
        ("Location is Warehouse", "Active"),
        ("Activity is Static and not Distance is Close", "Active"),
        ("(not Location is Warehouse) and Activity is Moderate", "Transient"),
        ("Activity is Dynamic or Distance is Close", "Inactive"),
    ])?;

    Ok(MamdaniFis::new([location, activity, distance], context(settings)?, rules))
}

/// Enough space to leave the lane, from `DepartLane`, `LateralSpace` and
/// `MachineDistance`.
pub fn enough_space(settings: &Settings) -> Result<MamdaniFis, BuildError> {
    let n = settings.inference.samples;
    let shape = settings.inference.mamdani_shape;

    let lane_universe = linspace(0., 1., n);
    let lane_terms = Terms::from_iter([
        ("Forbidden", trimf(&lane_universe, [0., 0., 1.])),
        ("Allowed", trimf(&lane_universe, [0., 1., 1.])),
    ]);
    let depart_lane = Antecedent::new("DepartLane", lane_universe, lane_terms)?;
    let lateral_space = antecedent("LateralSpace", ["Little", "Some", "Lots"], linspace(0., 10., n), shape)?;
    let machine_distance = antecedent("MachineDistance", ["Close", "Medium", "Far"], linspace(0., 10., n), shape)?;

    let rules = mamdani_rules(&[
        ("DepartLane is Forbidden", "Inactive"),
        ("DepartLane is Allowed", "Active"),
        ("LateralSpace is Little or MachineDistance is Close", "Inactive"),
        ("LateralSpace is Some and MachineDistance is Medium", "Transient"),
        ("LateralSpace is Lots and MachineDistance is Far", "Active"),
    ])?;

    Ok(MamdaniFis::new(
        [depart_lane, lateral_space, machine_distance],
        context(settings)?,
        rules,
    ))
}

/// Sufficient network quality of service, from `Latency` (ms) and
/// `Throughput` (kbit/s).
pub fn sufficient_qos(settings: &Settings) -> Result<MamdaniFis, BuildError> {
    let n = settings.inference.samples;
    let shape = settings.inference.mamdani_shape;

    let latency = antecedent("Latency", ["Low", "Medium", "High"], linspace(0., 500., n), shape)?;
    let throughput = antecedent("Throughput", ["Low", "Medium", "High"], linspace(0., 1000., n), shape)?;

    let rules = mamdani_rules(&[
        ("Latency is High or Throughput is Low", "Inactive"),
        ("Latency is Medium or Throughput is Medium", "Transient"),
        ("Latency is Low and Throughput is Medium", "Active"),
        ("Latency is Medium and Throughput is High", "Active"),
        ("Latency is Low and Throughput is High", "Active"),
    ])?;

    Ok(MamdaniFis::new([latency, throughput], context(settings)?, rules))
}

/// Highest velocity from which the robot still stops within the braking
/// distance, carrying `load` kg on a slope of `gradient` rad.
pub fn maximum_velocity(load: f64, gradient: f64) -> f64 {
    let (d, f) = (BRAKING_DISTANCE, BRAKING_FORCE);

    (2. * d * f / (load + AMR_WEIGHT) - 2. * d * GRAVITY * gradient.sin()).sqrt()
}

/// First-order Taylor expansion of [`maximum_velocity`] around `(load, gradient)`.
fn linearise(load: f64, gradient: f64) -> Polynomial {
    let (d, f) = (BRAKING_DISTANCE, BRAKING_FORCE);
    let v = maximum_velocity(load, gradient);
    let dv_dload = -d * f / ((load + AMR_WEIGHT).powi(2) * v);
    let dv_dgradient = -d * GRAVITY * gradient.cos() / v;

    Polynomial::new(v - load * dv_dload - gradient * dv_dgradient)
        .with_factor("LoadWeight", dv_dload)
        .with_factor("SurfaceGradient", dv_dgradient)
}

/// Lowers `polynomial` until it no longer overestimates [`maximum_velocity`]
/// on a grid over the given load and gradient intervals.
fn underestimate(polynomial: &mut Polynomial, [w0, w1]: [f64; 2], [g0, g1]: [f64; 2]) {
    let mut epsilon = -f64::EPSILON;

    for load in linspace(w0, w1, GRID) {
        for gradient in linspace(g0, g1, GRID) {
            let estimate = polynomial.constant()
                + polynomial.factor("LoadWeight") * load
                + polynomial.factor("SurfaceGradient") * gradient;
            let exact = maximum_velocity(load, gradient);

            if exact < estimate + epsilon {
                epsilon = exact - estimate;
            }
        }
    }

    polynomial.offset(epsilon);
}

/// Safe velocity bound from `LoadWeight` (kg) and `SurfaceGradient` (rad).
///
/// Each of the nine rules linearises [`maximum_velocity`] at the centroids of
/// its two terms, shifted down so it stays below the exact bound across the
/// support of those terms.
pub fn amr_velocity(settings: &Settings) -> Result<SugenoFis, BuildError> {
    const LOADS: [&str; 3] = ["Light", "Medium", "Heavy"];
    const GRADIENTS: [&str; 3] = ["Flat", "Gentle", "Steep"];

    let n = settings.inference.samples;
    let shape = settings.inference.sugeno_shape;

    let load_universe = linspace(0., 2000., n);
    let gradient_universe = linspace(0., 0.1, n);
    let load_intervals = membership::intervals(&load_universe, shape);
    let gradient_intervals = membership::intervals(&gradient_universe, shape);

    let mut rules = Rules::with_capacity(LOADS.len() * GRADIENTS.len());

    for (i, load) in LOADS.iter().enumerate() {
        for (j, gradient) in GRADIENTS.iter().enumerate() {
            let premise = format!("LoadWeight is {load} and SurfaceGradient is {gradient}");
            let mut polynomial = linearise(
                membership::centroid(i, &load_universe, shape),
                membership::centroid(j, &gradient_universe, shape),
            );

            underestimate(&mut polynomial, load_intervals[i], gradient_intervals[j]);

            let rule = SugenoRule::new(&premise, polynomial).map_err(|source| BuildError::Rule {
                text: premise.clone(),
                source,
            })?;

            rules.add(rule);
        }
    }

    let load_weight = antecedent("LoadWeight", LOADS, load_universe, shape)?;
    let surface_gradient = antecedent("SurfaceGradient", GRADIENTS, gradient_universe, shape)?;
    let velocity = Consequent::without_terms("Velocity", linspace(0., 10., n))?;

    Ok(SugenoFis::new([load_weight, surface_gradient], velocity, rules))
}

#[test]
fn test_no_humans() {
    use crate::inputs::Inputs;

    let settings = Settings::default();
    let fis = no_humans(&settings).unwrap();

    fis.validate().unwrap();

    // Only Active fires, at full strength
    let safe = fis
        .compute(&Inputs::from([("Location", 0.), ("Activity", 0.), ("Distance", 100.)]))
        .unwrap();
    assert!((safe - 5. / 6.).abs() < 1e-9, "{safe}");

    // Only Inactive fires, at full strength
    let unsafe_ = fis
        .compute(&Inputs::from([("Location", 2.), ("Activity", 1.), ("Distance", 0.)]))
        .unwrap();
    assert!((unsafe_ - 1. / 6.).abs() < 1e-9, "{unsafe_}");
}

#[test]
fn test_enough_space_and_qos() {
    use crate::inputs::Inputs;

    let settings = Settings::default();
    let space = enough_space(&settings).unwrap();
    let qos = sufficient_qos(&settings).unwrap();

    space.validate().unwrap();
    qos.validate().unwrap();

    let blocked = space
        .compute(&Inputs::from([("DepartLane", 0.), ("LateralSpace", 0.), ("MachineDistance", 0.)]))
        .unwrap();
    assert!((blocked - 1. / 6.).abs() < 1e-9, "{blocked}");

    let good = qos.compute(&Inputs::from([("Latency", 0.), ("Throughput", 1000.)])).unwrap();
    assert!((good - 5. / 6.).abs() < 1e-9, "{good}");

    assert!(qos.compute(&Inputs::from([("Latency", 0.)])).is_err());
}

#[test]
fn test_amr_velocity() {
    use crate::inputs::Inputs;

    let settings = Settings::default();
    let fis = amr_velocity(&settings).unwrap();

    fis.validate().unwrap();
    assert_eq!(fis.rules().len(), 9);
    assert_eq!(fis.output_range(), (0., 10.));

    // Only the Light/Flat rule fires at the origin
    let velocity = fis
        .compute(&Inputs::from([("LoadWeight", 0.), ("SurfaceGradient", 0.)]))
        .unwrap();
    assert!(velocity <= maximum_velocity(0., 0.) + 1e-9, "{velocity}");
    assert!(velocity > 7., "{velocity}");

    // Heavier loads on steeper slopes must go slower
    let loaded = fis
        .compute(&Inputs::from([("LoadWeight", 1500.), ("SurfaceGradient", 0.08)]))
        .unwrap();
    assert!(loaded < velocity, "{loaded}");
}

#[test]
fn test_trapezoid_settings() {
    let mut settings = Settings::default();
    settings.inference.mamdani_shape = Shape::Trapezoid;
    settings.inference.sugeno_shape = Shape::Trapezoid;

    no_humans(&settings).unwrap().validate().unwrap();
    amr_velocity(&settings).unwrap().validate().unwrap();
}
