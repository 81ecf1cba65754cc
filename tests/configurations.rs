//! Configurations of the mobile robot safety concept, checked against the
//! operating-condition systems.

use fuzzy_safety::constraints::{enough_space, no_humans, sufficient_qos};
use fuzzy_safety::tree::Decomposition;
use fuzzy_safety::{
    Aggregate, ConfigurationId, ConfigurationsSolver, ContextMonitor, Inputs, Requirement, RequirementKind, Settings,
    TreeBuilder,
};

struct Concept {
    root: Requirement,
    e1: Requirement,
    e2: Requirement,
    e3: Requirement,
}

fn safety_concept() -> Concept {
    let mut tree = TreeBuilder::new();

    let e1 = tree.context_assumption("No humans in the operating area", Some("NoHumans"));
    let e2 = tree.context_assumption("Enough space to depart the lane", Some("EnoughSpace"));
    let e3 = tree.context_assumption("Network quality suffices for remote stop", Some("SufficientQoS"));
    let t1 = tree.technical("Detect obstacles in the departure area", None);
    let t2 = tree.technical_with_parameter("Limit velocity", None, "Load and gradient known", Some("AMRVelocity"));
    let t3 = tree.technical("Stop on collision contact", None);
    let t4 = tree.technical("Remote emergency stop", None);
    let u1 = tree.undeveloped("Plan path around the lane", None);
    let u2 = tree.undeveloped("Warn nearby workers", None);

    let remote_stop = tree.refined("Remote stop available", Decomposition::And, vec![e3.clone(), t4]);
    let warning = tree.refined("Workers are warned", Decomposition::Or, vec![u2, remote_stop]);
    let evade = tree.refined(
        "Evade obstacles by departing the lane",
        Decomposition::And,
        vec![e2.clone(), t1, u1, warning.clone()],
    );
    let slow = tree.refined("Move slowly enough", Decomposition::And, vec![t2, t3, warning]);
    let root = tree.refined(
        "Robot does not harm humans",
        Decomposition::Or,
        vec![e1.clone(), evade, slow],
    );

    Concept { root, e1, e2, e3 }
}

#[test]
fn test_enumerated_configurations() {
    let concept = safety_concept();
    let configurations = ConfigurationsSolver::new().get_configurations(&concept.root).unwrap();

    let rendered: Vec<_> = configurations
        .iter()
        .map(|(id, configuration)| format!("{id}: {configuration}"))
        .collect();

    assert_eq!(
        rendered,
        [
            "C1: If context is e1, system is safe when nothing else is provided",
            "C2: If context is e2, system is safe when t1 and u1 and u2 are provided",
            "C3: If context is e2, e3, system is safe when t1 and t4 and u1 are provided",
            "C4: System is safe when t2 and t3 and u2 are provided",
            "C5: If context is e3, system is safe when t2 and t3 and t4 are provided",
        ]
    );

    let t2 = concept.root.find("t2".parse().unwrap()).unwrap();
    let Requirement::Technical(t2) = t2 else {
        panic!("t2 is not technical")
    };
    assert_eq!(t2.parameter_context().and_then(|p| p.name()), Some("AMRVelocity"));
    assert_eq!(concept.root.of_kind(RequirementKind::ContextAssumption).count(), 4);
}

fn monitor_for<'c>(
    context: &'c fuzzy_safety::Consequent,
    concept: &Concept,
    settings: &Settings,
    humans: Inputs,
    space: Inputs,
    qos: Inputs,
) -> ContextMonitor<'c> {
    let e1: Aggregate = no_humans(settings).unwrap().compute_aggregate(&humans).unwrap();
    let e2: Aggregate = enough_space(settings).unwrap().compute_aggregate(&space).unwrap();
    let e3: Aggregate = sufficient_qos(settings).unwrap().compute_aggregate(&qos).unwrap();

    ContextMonitor::new(context, settings.monitor.threshold)
        .with_evidence(concept.e1.symbol(), e1)
        .unwrap()
        .with_evidence(concept.e2.symbol(), e2)
        .unwrap()
        .with_evidence(concept.e3.symbol(), e3)
        .unwrap()
}

#[test]
fn test_admissible_configurations() {
    let settings = Settings::default();
    let context = fuzzy_safety::constraints::context(&settings).unwrap();
    let concept = safety_concept();
    let configurations = ConfigurationsSolver::new().get_configurations(&concept.root).unwrap();

    let space = || Inputs::from([("DepartLane", 1.), ("LateralSpace", 10.), ("MachineDistance", 10.)]);
    let qos = || Inputs::from([("Latency", 0.), ("Throughput", 1000.)]);

    // Workers close by and moving: every configuration but the first is open
    let crowded = Inputs::from([("Location", 2.), ("Activity", 1.), ("Distance", 0.)]);
    let monitor = monitor_for(&context, &concept, &settings, crowded, space(), qos());

    assert_eq!(
        monitor.admissible(&configurations).unwrap(),
        [1, 2, 3, 4].map(ConfigurationId)
    );

    // An empty warehouse needs no further restrictions
    let empty = Inputs::from([("Location", 0.), ("Activity", 0.), ("Distance", 100.)]);
    let monitor = monitor_for(&context, &concept, &settings, empty, space(), qos());

    assert_eq!(monitor.admissible(&configurations).unwrap(), [ConfigurationId(0)]);

    // Lane blocked and network down: only the configuration without context remains
    let crowded = Inputs::from([("Location", 2.), ("Activity", 1.), ("Distance", 0.)]);
    let blocked = Inputs::from([("DepartLane", 0.), ("LateralSpace", 0.), ("MachineDistance", 0.)]);
    let offline = Inputs::from([("Latency", 500.), ("Throughput", 0.)]);
    let monitor = monitor_for(&context, &concept, &settings, crowded, blocked, offline);

    let verdicts = monitor.verdicts(&configurations).unwrap();
    assert_eq!(verdicts.values().copied().collect::<Vec<_>>(), [false, false, false, true, false]);
}
