//! Settings for the built-in constraint systems, the context monitor and the
//! configuration solver.
//!
//! Settings are read from TOML, every section and field being optional:
//!
//! ```toml
//! [inference]
//! mamdani_shape = "triangle"
//! sugeno_shape = "trapezoid"
//! samples = 101
//!
//! [monitor]
//! threshold = 0.5
//!
//! [solver]
//! negation = "reject"
//! ```
//!
//! and can then be overridden from the environment with `CSCT_MAMDANI_SHAPE`,
//! `CSCT_SUGENO_SHAPE`, `CSCT_SAMPLES`, `CSCT_THRESHOLD` and `CSCT_NEGATION`.

use std::env;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ConfigError;
use crate::membership::Shape;
use crate::solver::NegationPolicy;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub inference: InferenceSettings,
    pub monitor: MonitorSettings,
    pub solver: SolverSettings,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InferenceSettings {
    /// Term shape of the Mamdani constraint systems.
    pub mamdani_shape: Shape,
    /// Term shape of the Sugeno velocity system.
    pub sugeno_shape: Shape,
    /// Samples per variable universe.
    pub samples: usize,
}

impl Default for InferenceSettings {
    fn default() -> Self {
        Self {
            mamdani_shape: Shape::Triangle,
            sugeno_shape: Shape::Triangle,
            samples: 101,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorSettings {
    /// Defuzzified context activation from which an assumption counts as held.
    pub threshold: f64,
}

impl Default for MonitorSettings {
    fn default() -> Self {
        Self { threshold: 0.5 }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverSettings {
    pub negation: NegationPolicy,
}

fn parse_override<T: FromStr>(field: &'static str, value: &str) -> Result<T, ConfigError>
where
    T::Err: ToString,
{
    value.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
        field,
        reason: e.to_string(),
    })
}

impl Settings {
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let settings: Settings = toml::from_str(content)?;

        settings.validate()?;

        Ok(settings)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        debug!(path = %path.display(), "loading settings");

        Self::from_toml_str(&content)
    }

    /// Applies the `CSCT_*` variables present in the process environment.
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        self.apply_overrides(|key| env::var(key).ok())
    }

    /// Applies overrides looked up by environment variable name.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<(), ConfigError> {
        if let Some(value) = lookup("CSCT_MAMDANI_SHAPE") {
            self.inference.mamdani_shape = parse_override("mamdani_shape", &value)?;
        }

        if let Some(value) = lookup("CSCT_SUGENO_SHAPE") {
            self.inference.sugeno_shape = parse_override("sugeno_shape", &value)?;
        }

        if let Some(value) = lookup("CSCT_SAMPLES") {
            self.inference.samples = parse_override("samples", &value)?;
        }

        if let Some(value) = lookup("CSCT_THRESHOLD") {
            self.monitor.threshold = parse_override("threshold", &value)?;
        }

        if let Some(value) = lookup("CSCT_NEGATION") {
            self.solver.negation = parse_override("negation", &value)?;
        }

        debug!(settings = ?self, "environment overrides applied");

        self.validate()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.inference.samples < 2 {
            return Err(ConfigError::Invalid {
                field: "samples",
                reason: format!("need at least 2 samples, got {}", self.inference.samples),
            });
        }

        if !(0. ..=1.).contains(&self.monitor.threshold) {
            return Err(ConfigError::Invalid {
                field: "threshold",
                reason: format!("{} is outside [0, 1]", self.monitor.threshold),
            });
        }

        Ok(())
    }
}

#[test]
fn test_defaults() {
    let settings = Settings::from_toml_str("").unwrap();

    assert_eq!(settings, Settings::default());
    assert_eq!(settings.inference.samples, 101);
    assert_eq!(settings.monitor.threshold, 0.5);
    assert_eq!(settings.solver.negation, NegationPolicy::Reject);
}

#[test]
fn test_parse_sections() {
    let settings = Settings::from_toml_str(
        r#"
        [inference]
        sugeno_shape = "trapezoid"
        samples = 51

        [solver]
        negation = "pass-through"
        "#,
    )
    .unwrap();

    assert_eq!(settings.inference.mamdani_shape, Shape::Triangle);
    assert_eq!(settings.inference.sugeno_shape, Shape::Trapezoid);
    assert_eq!(settings.inference.samples, 51);
    assert_eq!(settings.solver.negation, NegationPolicy::PassThrough);

    assert!(matches!(
        Settings::from_toml_str("[inference]\nsamples = 1"),
        Err(ConfigError::Invalid { field: "samples", .. })
    ));
    assert!(matches!(
        Settings::from_toml_str("[monitor]\nthreshold = 1.5"),
        Err(ConfigError::Invalid { field: "threshold", .. })
    ));
    assert!(matches!(Settings::from_toml_str("[solver]\nnegation = \"invert\""), Err(ConfigError::Toml(_))));
}

#[test]
fn test_overrides() {
    let mut settings = Settings::default();

    settings
        .apply_overrides(|key| match key {
            "CSCT_MAMDANI_SHAPE" => Some("trapezoid".into()),
            "CSCT_THRESHOLD" => Some(" 0.8 ".into()),
            "CSCT_NEGATION" => Some("pass-through".into()),
            _ => None,
        })
        .unwrap();

    assert_eq!(settings.inference.mamdani_shape, Shape::Trapezoid);
    assert_eq!(settings.inference.sugeno_shape, Shape::Triangle);
    assert_eq!(settings.monitor.threshold, 0.8);
    assert_eq!(settings.solver.negation, NegationPolicy::PassThrough);

    let result = settings.apply_overrides(|key| (key == "CSCT_SAMPLES").then(|| "many".into()));
    assert!(matches!(result, Err(ConfigError::Invalid { field: "samples", .. })));

    let result = settings.apply_overrides(|key| (key == "CSCT_NEGATION").then(|| "invert".into()));
    let Err(ConfigError::Invalid { field, reason }) = result else {
        panic!("expected an invalid negation policy, got {result:?}");
    };
    assert_eq!(field, "negation");
    assert_eq!(reason, "unknown negation policy `invert`, expected `reject` or `pass-through`");
}

#[test]
fn test_missing_file() {
    let result = Settings::from_file("/nonexistent/csct.toml");

    assert!(matches!(result, Err(ConfigError::Io { .. })));
}
