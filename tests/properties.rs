//! Property-based tests for rule evaluation, both inference styles and cut-set combination

use approx::abs_diff_eq;
use fuzzy_safety::linspace::linspace;
use fuzzy_safety::membership::Shape;
use fuzzy_safety::tree::Decomposition;
use fuzzy_safety::{
    Antecedent, ConfigurationsSolver, Consequent, Expr, Inputs, MamdaniFis, MamdaniRule, Polynomial,
    Requirement, SugenoFis, SugenoRule, Terms, TreeBuilder,
};
use proptest::prelude::*;
use std::collections::HashMap;

const TERMS: [&str; 3] = ["Low", "Medium", "High"];

fn variable(name: &str) -> Antecedent {
    let universe = linspace(0., 20., 21);
    let terms = Terms::partition(TERMS, &universe, Shape::Triangle);

    Antecedent::new(name, universe, terms).unwrap()
}

fn context() -> Consequent {
    let universe = linspace(0., 1., 101);
    let terms = Terms::partition(["Inactive", "Transient", "Active"], &universe, Shape::Triangle);

    Consequent::new("Context", universe, terms).unwrap()
}

fn antecedents() -> HashMap<String, Antecedent> {
    ["A", "B"].into_iter().map(|name| (name.to_owned(), variable(name))).collect()
}

fn term_strategy() -> impl Strategy<Value = &'static str> {
    prop::sample::select(TERMS.to_vec())
}

fn evaluate(text: &str, inputs: &Inputs, antecedents: &HashMap<String, Antecedent>) -> f64 {
    text.parse::<Expr>().unwrap().evaluate(inputs, antecedents).unwrap()
}

fn mamdani_rules() -> Vec<MamdaniRule> {
    vec![
        MamdaniRule::new("A is Low and B is Low", "Inactive").unwrap(),
        MamdaniRule::new("A is Medium or B is Medium", "Transient").unwrap(),
        MamdaniRule::new("A is High and not B is Low", "Active").unwrap(),
        MamdaniRule::new("not (A is Low or B is High)", "Transient").unwrap(),
    ]
}

fn technical_leaves(tree: &mut TreeBuilder, count: usize) -> Vec<Requirement> {
    (0..count).map(|i| tree.technical(format!("requirement {i}"), None)).collect()
}

proptest! {
    #[test]
    fn connectives_follow_min_max_complement(
        a in -5.0..25.0f64,
        b in -5.0..25.0f64,
        ta in term_strategy(),
        tb in term_strategy(),
    ) {
        let antecedents = antecedents();
        let inputs = Inputs::from([("A", a), ("B", b)]);
        let da = antecedents["A"].membership_degree(ta, a).unwrap();
        let db = antecedents["B"].membership_degree(tb, b).unwrap();

        let and = evaluate(&format!("A is {ta} and B is {tb}"), &inputs, &antecedents);
        let or = evaluate(&format!("A is {ta} or B is {tb}"), &inputs, &antecedents);
        let not = evaluate(&format!("not A is {ta}"), &inputs, &antecedents);
        let not_not = evaluate(&format!("not not A is {ta}"), &inputs, &antecedents);

        prop_assert_eq!(and, da.min(db));
        prop_assert_eq!(or, da.max(db));
        prop_assert_eq!(not, 1. - da);
        prop_assert!(abs_diff_eq!(not_not, da, epsilon = 1e-12));
        prop_assert!((0. ..=1.).contains(&and) && (0. ..=1.).contains(&or));
    }

    #[test]
    fn mamdani_ignores_rule_order(
        a in 0.0..20.0f64,
        b in 0.0..20.0f64,
        shuffled in Just(mamdani_rules()).prop_shuffle(),
    ) {
        let inputs = Inputs::from([("A", a), ("B", b)]);
        let ordered = MamdaniFis::new([variable("A"), variable("B")], context(), mamdani_rules());
        let shuffled = MamdaniFis::new([variable("A"), variable("B")], context(), shuffled);

        prop_assert_eq!(ordered.compute(&inputs).unwrap(), shuffled.compute(&inputs).unwrap());
    }

    #[test]
    fn sugeno_output_is_convex_combination(
        a in 0.0..20.0f64,
        constants in prop::array::uniform3(-50.0..50.0f64),
    ) {
        let rules: Vec<_> = TERMS
            .iter()
            .zip(constants)
            .map(|(term, c)| SugenoRule::new(&format!("A is {term}"), Polynomial::new(c)).unwrap())
            .collect();
        let speed = Consequent::without_terms("Speed", linspace(-50., 50., 11)).unwrap();
        let fis = SugenoFis::new([variable("A")], speed, rules);

        let output = fis.compute(&Inputs::from([("A", a)])).unwrap();
        let lo = constants.iter().copied().fold(f64::INFINITY, f64::min);
        let hi = constants.iter().copied().fold(f64::NEG_INFINITY, f64::max);

        prop_assert!(output >= lo - 1e-9 && output <= hi + 1e-9, "{} outside [{}, {}]", output, lo, hi);
    }

    #[test]
    fn sugeno_single_firing_rule_is_exact(
        low in -50.0..50.0f64,
        others in prop::array::uniform2(-50.0..50.0f64),
        factor in -2.0..2.0f64,
    ) {
        let speed = Consequent::without_terms("Speed", linspace(0., 1., 2)).unwrap();
        let fis = SugenoFis::new(
            [variable("A"), variable("B")],
            speed,
            vec![
                SugenoRule::new("A is Low", Polynomial::new(low).with_factor("B", factor)).unwrap(),
                SugenoRule::new("A is Medium", Polynomial::new(others[0])).unwrap(),
                SugenoRule::new("A is High", Polynomial::new(others[1])).unwrap(),
            ],
        );

        let output = fis.compute(&Inputs::from([("A", 0.), ("B", 3.)])).unwrap();

        prop_assert_eq!(output, low + factor * 3.);
    }

    #[test]
    fn cut_set_family_sizes(m in 1usize..6, n in 1usize..6) {
        let mut tree = TreeBuilder::new();
        let left_leaves = technical_leaves(&mut tree, m);
        let right_pairs = (0..n)
            .map(|_| {
                let pair = technical_leaves(&mut tree, 2);
                tree.refined("pair", Decomposition::And, pair)
            })
            .collect();
        let left = tree.refined("left", Decomposition::Or, left_leaves);
        let right = tree.refined("right", Decomposition::Or, right_pairs);

        let both = tree.refined("both", Decomposition::And, vec![left.clone(), right.clone()]);
        let either = tree.refined("either", Decomposition::Or, vec![left, right]);

        let solver = ConfigurationsSolver::new();
        let and = solver.minimal_cut_sets(&both).unwrap();
        let or = solver.minimal_cut_sets(&either).unwrap();

        prop_assert_eq!(and.len(), m * n);
        prop_assert!(and.iter().all(|set| set.len() == 3));
        prop_assert_eq!(or.len(), m + n);
    }
}

#[test]
fn collisions_shrink_sets_not_families() {
    let mut tree = TreeBuilder::new();
    let t1 = tree.technical("shared", None);
    let t2 = tree.technical("left only", None);
    let t3 = tree.technical("right only", None);
    let left = tree.refined("left", Decomposition::Or, vec![t1.clone(), t2]);
    let right = tree.refined("right", Decomposition::Or, vec![t1, t3]);
    let root = tree.refined("root", Decomposition::And, vec![left, right]);

    let cut_sets = ConfigurationsSolver::new().minimal_cut_sets(&root).unwrap();
    let rendered: Vec<_> = cut_sets.iter().map(ToString::to_string).collect();

    assert_eq!(rendered, ["{t1}", "{t1, t3}", "{t2, t1}", "{t2, t3}"]);
}
