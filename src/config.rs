//! Run configuration and `key=value` overrides.
//!
//! Precedence, lowest first: defaults, a JSON config file, explicit command
//! line flags, then `--classifier-param` / `--scaler-param` overrides.

use crate::classifiers::GradientBoostingParams;
use crate::core::split::{DEFAULT_TEST_SIZE, SplitOptions};
use crate::loaders::csv::{DEFAULT_SEPARATOR, DEFAULT_TARGET};
use crate::preprocessing::RobustScalerParams;
use crate::tasks::PredictionFormat;
use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

fn default_separator() -> String {
    DEFAULT_SEPARATOR.to_string()
}

fn default_target() -> String {
    DEFAULT_TARGET.to_string()
}

fn default_test_size() -> f64 {
    DEFAULT_TEST_SIZE
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskConfig {
    #[serde(default)]
    pub data: PathBuf,
    #[serde(default = "default_separator")]
    pub separator: String,
    #[serde(default = "default_target")]
    pub target: String,
    #[serde(default = "default_test_size")]
    pub test_size: f64,
    /// Seeds the split and cross-validation, and the classifier unless it has its own `random_state`.
    #[serde(default)]
    pub seed: Option<u64>,
    /// Stratified folds for cross-validating on the train subset; `None` skips it.
    #[serde(default)]
    pub cv_folds: Option<usize>,
    #[serde(default)]
    pub classifier: GradientBoostingParams,
    #[serde(default)]
    pub scaler: RobustScalerParams,
    #[serde(default)]
    pub dump_file: Option<PathBuf>,
    #[serde(default)]
    pub dump_format: PredictionFormat,
}

impl Default for TaskConfig {
    fn default() -> Self {
        Self {
            data: PathBuf::new(),
            separator: default_separator(),
            target: default_target(),
            test_size: default_test_size(),
            seed: None,
            cv_folds: None,
            classifier: GradientBoostingParams::default(),
            scaler: RobustScalerParams::default(),
            dump_file: None,
            dump_format: PredictionFormat::default(),
        }
    }
}

impl TaskConfig {
    pub fn new(data: impl Into<PathBuf>) -> Self {
        Self {
            data: data.into(),
            ..Self::default()
        }
    }

    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        serde_json::from_str(&text)
            .with_context(|| format!("invalid config file {}", path.display()))
    }

    /// Applies dotted-key overrides rooted at `section` (e.g. `classifier`).
    pub fn with_overrides(self, section: &str, overrides: &[KeyValue]) -> Result<Self> {
        if overrides.is_empty() {
            return Ok(self);
        }
        let mut value = serde_json::to_value(&self).context("failed to serialize config")?;
        let section_value = value
            .as_object_mut()
            .context("config is not an object")?
            .entry(section.to_string())
            .or_insert(Value::Null);
        apply_overrides(section_value, overrides)?;
        serde_json::from_value(value)
            .with_context(|| format!("invalid {section} parameters after overrides"))
    }

    pub fn split_options(&self) -> SplitOptions {
        SplitOptions {
            test_size: self.test_size,
            seed: self.seed,
        }
    }

    pub fn classifier_params(&self) -> GradientBoostingParams {
        GradientBoostingParams {
            random_state: self.classifier.random_state.or(self.seed),
            ..self.classifier.clone()
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct KeyValue {
    pub key: String,
    pub value: Value,
}

pub fn apply_overrides(target: &mut Value, overrides: &[KeyValue]) -> Result<()> {
    for kv in overrides {
        set_path(target, &kv.key, kv.value.clone())
            .with_context(|| format!("failed to set '{}'", kv.key))?;
    }
    Ok(())
}

fn set_path(target: &mut Value, path: &str, new_value: Value) -> Result<()> {
    let segments: Vec<&str> = path.split('.').filter(|s| !s.is_empty()).collect();
    let Some((last, parents)) = segments.split_last() else {
        bail!("empty key is not allowed");
    };

    let mut current = target;
    for seg in parents {
        current = ensure_object(current)?
            .entry((*seg).to_string())
            .or_insert(Value::Null);
    }
    ensure_object(current)?.insert((*last).to_string(), new_value);
    Ok(())
}

fn ensure_object(value: &mut Value) -> Result<&mut Map<String, Value>> {
    if value.is_null() {
        *value = Value::Object(Map::new());
    }
    match value {
        Value::Object(map) => Ok(map),
        other => bail!("cannot set nested field on non-object value: {other:?}"),
    }
}

/// Parses `KEY=VALUE`; the value is read as a JSON literal and falls back to a string.
pub fn parse_key_value(raw: &str) -> Result<KeyValue, String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| "expected KEY=VALUE".to_string())?;
    let key = key.trim();
    if key.is_empty() {
        return Err("key cannot be empty".to_string());
    }

    Ok(KeyValue {
        key: key.to_string(),
        value: parse_literal(value.trim()),
    })
}

fn parse_literal(raw: &str) -> Value {
    if raw.is_empty() {
        return Value::String(String::new());
    }
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifiers::gradient_boosting::{Criterion, MaxFeatures, MaxFeaturesRule};
    use serde_json::json;
    use std::io::Write;

    fn kv(raw: &str) -> KeyValue {
        parse_key_value(raw).unwrap()
    }

    #[test]
    fn parses_literals() {
        assert_eq!(kv("n_estimators=5").value, json!(5));
        assert_eq!(kv("subsample = 0.5").value, json!(0.5));
        assert_eq!(kv("criterion=squared_error").value, json!("squared_error"));
        assert_eq!(kv("flag=true").value, json!(true));
        assert_eq!(kv("name=").value, json!(""));
        assert!(parse_key_value("novalue").is_err());
        assert!(parse_key_value("=3").is_err());
    }

    #[test]
    fn set_path_creates_nested_objects() {
        let mut v = json!({});
        set_path(&mut v, "a.b.c", json!(1)).unwrap();
        assert_eq!(v, json!({"a": {"b": {"c": 1}}}));
        assert!(set_path(&mut v, "a.b.c.d", json!(2)).is_err());
        assert!(set_path(&mut v, "..", json!(2)).is_err());
    }

    #[test]
    fn classifier_overrides_are_applied() {
        let config = TaskConfig::new("data.csv")
            .with_overrides(
                "classifier",
                &[
                    kv("n_estimators=7"),
                    kv("max_features=sqrt"),
                    kv("criterion=squared_error"),
                ],
            )
            .unwrap();
        assert_eq!(config.classifier.n_estimators, 7);
        assert_eq!(
            config.classifier.max_features,
            MaxFeatures::Rule(MaxFeaturesRule::Sqrt)
        );
        assert_eq!(config.classifier.criterion, Criterion::SquaredError);
        assert_eq!(config.classifier.max_depth, 8);
    }

    #[test]
    fn bad_override_value_is_an_error() {
        let err = TaskConfig::default()
            .with_overrides("classifier", &[kv("n_estimators=many")])
            .unwrap_err();
        assert!(err.to_string().contains("classifier"));
    }

    #[test]
    fn seed_falls_back_to_classifier() {
        let mut config = TaskConfig::default();
        config.seed = Some(4);
        assert_eq!(config.classifier_params().random_state, Some(4));
        assert_eq!(config.split_options().seed, Some(4));

        config.classifier.random_state = Some(9);
        assert_eq!(config.classifier_params().random_state, Some(9));
    }

    #[test]
    fn reads_partial_json_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"data": "x.tsv", "separator": "\\t", "classifier": {{"n_estimators": 3}}}}"#
        )
        .unwrap();
        let config = TaskConfig::from_json_file(file.path()).unwrap();
        assert_eq!(config.data, PathBuf::from("x.tsv"));
        assert_eq!(config.separator, "\\t");
        assert_eq!(config.classifier.n_estimators, 3);
        assert_eq!(config.classifier.subsample, 0.05 * 7.0);
        assert_eq!(config.test_size, 0.25);
        assert_eq!(config.target, "target");
    }
}
