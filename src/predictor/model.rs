//! Pre-trained win classifier.
//!
//! The classifier is a one-hot encoder feeding a logistic regression, exported
//! from the training notebook as JSON. Callers only see [`WinModel`], so the
//! scoring backend can change without touching feature derivation.

use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use super::catalog::{City, Team};
use super::features::{FeatureRecord, FeatureValue, FEATURE_COLUMNS};

/// Artifact format this build understands.
pub const SUPPORTED_FORMAT_VERSION: u32 = 1;

const CATEGORICAL_COLUMNS: [&str; 3] = ["batting_team", "bowling_team", "city"];
const NUMERIC_COLUMNS: [&str; 6] = ["runs_left", "balls_left", "wickets", "total_runs_x", "crr", "rrr"];

/// A binary classifier over feature records.
///
/// Implementations are shared read-only across requests.
pub trait WinModel: Send + Sync {
    /// Class probabilities `[p(bowling side wins), p(batting side wins)]`.
    fn predict_proba(&self, record: &FeatureRecord) -> Result<[f64; 2], ModelInvocationError>;

    /// Human-readable description for logging and the info endpoint.
    fn describe(&self) -> ModelInfo;
}

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct ModelInfo {
    pub kind: &'static str,
    pub format_version: u32,
    pub trained_with: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum ModelLoadError {
    #[error("failed to read model artifact {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("model artifact is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error(
        "unsupported model format version {found} (expected {expected}, trained with {trained_with})"
    )]
    UnsupportedVersion {
        expected: u32,
        found: u32,
        trained_with: String,
    },
    #[error("model schema mismatch: {0}")]
    Schema(String),
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ModelInvocationError {
    #[error("expected {expected} feature columns, got {found}")]
    ColumnCount { expected: usize, found: usize },
    #[error("column {position} should be '{expected}' but is '{found}'")]
    ColumnMismatch {
        position: usize,
        expected: &'static str,
        found: &'static str,
    },
    #[error("column '{column}' has the wrong kind of value")]
    WrongKind { column: &'static str },
    #[error("category '{value}' was not seen for column '{column}' during training")]
    UnknownCategory { column: &'static str, value: String },
    #[error("column '{column}' is not a finite number")]
    NonFinite { column: &'static str },
    #[error("model produced an invalid probability pair {0:?}")]
    InvalidOutput([f64; 2]),
}

// ── Logistic pipeline ────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct Artifact {
    format_version: u32,
    #[serde(default)]
    trained_with: Option<String>,
    columns: Vec<String>,
    categorical: BTreeMap<String, BTreeMap<String, f64>>,
    numeric: BTreeMap<String, f64>,
    intercept: f64,
}

/// One-hot + logistic regression pipeline loaded from a JSON artifact.
#[derive(Debug, Clone)]
pub struct LogisticPipeline {
    trained_with: Option<String>,
    /// Per-category weights, indexed like `CATEGORICAL_COLUMNS`.
    categorical: [BTreeMap<String, f64>; 3],
    /// Indexed like `NUMERIC_COLUMNS`.
    numeric: [f64; 6],
    intercept: f64,
}

impl LogisticPipeline {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ModelLoadError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ModelLoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> Result<Self, ModelLoadError> {
        let artifact: Artifact = serde_json::from_str(raw)?;
        Self::from_artifact(artifact)
    }

    fn from_artifact(mut artifact: Artifact) -> Result<Self, ModelLoadError> {
        if artifact.format_version != SUPPORTED_FORMAT_VERSION {
            return Err(ModelLoadError::UnsupportedVersion {
                expected: SUPPORTED_FORMAT_VERSION,
                found: artifact.format_version,
                trained_with: artifact
                    .trained_with
                    .unwrap_or_else(|| "an unknown toolchain".to_string()),
            });
        }

        if !artifact.columns.iter().map(String::as_str).eq(FEATURE_COLUMNS) {
            return Err(ModelLoadError::Schema(format!(
                "columns {:?} do not match expected {:?}",
                artifact.columns, FEATURE_COLUMNS
            )));
        }

        let mut categorical: [BTreeMap<String, f64>; 3] = Default::default();
        for (slot, column) in categorical.iter_mut().zip(CATEGORICAL_COLUMNS) {
            let weights = artifact.categorical.remove(column).ok_or_else(|| {
                ModelLoadError::Schema(format!("no category weights for '{column}'"))
            })?;
            if weights.is_empty() {
                return Err(ModelLoadError::Schema(format!(
                    "empty category vocabulary for '{column}'"
                )));
            }
            if let Some((name, _)) = weights.iter().find(|(_, w)| !w.is_finite()) {
                return Err(ModelLoadError::Schema(format!(
                    "non-finite weight for '{column}' = '{name}'"
                )));
            }
            *slot = weights;
        }
        if let Some(extra) = artifact.categorical.keys().next() {
            return Err(ModelLoadError::Schema(format!(
                "unexpected categorical column '{extra}'"
            )));
        }

        let mut numeric = [0.0; 6];
        for (slot, column) in numeric.iter_mut().zip(NUMERIC_COLUMNS) {
            let weight = artifact.numeric.remove(column).ok_or_else(|| {
                ModelLoadError::Schema(format!("no weight for numeric column '{column}'"))
            })?;
            if !weight.is_finite() {
                return Err(ModelLoadError::Schema(format!(
                    "non-finite weight for '{column}'"
                )));
            }
            *slot = weight;
        }
        if let Some(extra) = artifact.numeric.keys().next() {
            return Err(ModelLoadError::Schema(format!(
                "unexpected numeric column '{extra}'"
            )));
        }

        if !artifact.intercept.is_finite() {
            return Err(ModelLoadError::Schema("non-finite intercept".to_string()));
        }

        let model = Self {
            trained_with: artifact.trained_with,
            categorical,
            numeric,
            intercept: artifact.intercept,
        };
        model.check_vocabulary()?;
        Ok(model)
    }

    /// Every selectable team and city must be encodable, otherwise the form
    /// would offer choices that can only fail.
    fn check_vocabulary(&self) -> Result<(), ModelLoadError> {
        let expected: [Vec<&str>; 3] = [
            Team::ALL.iter().map(|t| t.as_str()).collect(),
            Team::ALL.iter().map(|t| t.as_str()).collect(),
            City::ALL.iter().map(|c| c.as_str()).collect(),
        ];
        for ((column, weights), names) in CATEGORICAL_COLUMNS
            .iter()
            .zip(&self.categorical)
            .zip(expected)
        {
            if let Some(missing) = names.iter().find(|n| !weights.contains_key(**n)) {
                return Err(ModelLoadError::Schema(format!(
                    "'{missing}' is missing from the '{column}' vocabulary"
                )));
            }
        }
        Ok(())
    }

    fn logit(&self, record: &FeatureRecord) -> Result<f64, ModelInvocationError> {
        if record.len() != FEATURE_COLUMNS.len() {
            return Err(ModelInvocationError::ColumnCount {
                expected: FEATURE_COLUMNS.len(),
                found: record.len(),
            });
        }
        for (position, (found, expected)) in record.columns().zip(FEATURE_COLUMNS).enumerate() {
            if found != expected {
                return Err(ModelInvocationError::ColumnMismatch {
                    position,
                    expected,
                    found,
                });
            }
        }

        let mut z = self.intercept;
        let (categorical, numeric) = record.fields().split_at(CATEGORICAL_COLUMNS.len());

        for (&(column, value), weights) in categorical.iter().zip(&self.categorical) {
            let FeatureValue::Category(name) = value else {
                return Err(ModelInvocationError::WrongKind { column });
            };
            let weight = weights
                .get(name)
                .ok_or_else(|| ModelInvocationError::UnknownCategory {
                    column,
                    value: name.to_string(),
                })?;
            z += weight;
        }

        for (&(column, value), weight) in numeric.iter().zip(self.numeric) {
            let FeatureValue::Number(x) = value else {
                return Err(ModelInvocationError::WrongKind { column });
            };
            if !x.is_finite() {
                return Err(ModelInvocationError::NonFinite { column });
            }
            z += weight * x;
        }

        Ok(z)
    }
}

impl WinModel for LogisticPipeline {
    fn predict_proba(&self, record: &FeatureRecord) -> Result<[f64; 2], ModelInvocationError> {
        let p = sigmoid(self.logit(record)?);
        Ok([1.0 - p, p])
    }

    fn describe(&self) -> ModelInfo {
        ModelInfo {
            kind: "logistic_pipeline",
            format_version: SUPPORTED_FORMAT_VERSION,
            trained_with: self.trained_with.clone(),
        }
    }
}

fn sigmoid(x: f64) -> f64 {
    if x >= 0.0 {
        let z = (-x).exp();
        1.0 / (1.0 + z)
    } else {
        let z = x.exp();
        z / (1.0 + z)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::predictor::features::{derive, state};
    use approx::assert_relative_eq;
    use serde_json::json;

    /// Artifact with every category present and configurable weights.
    pub(crate) fn artifact_json(numeric: [f64; 6], intercept: f64) -> serde_json::Value {
        let teams: BTreeMap<&str, f64> = Team::ALL.iter().map(|t| (t.as_str(), 0.0)).collect();
        let cities: BTreeMap<&str, f64> = City::ALL.iter().map(|c| (c.as_str(), 0.0)).collect();
        json!({
            "format_version": 1,
            "trained_with": "scikit-learn 1.3.2",
            "columns": FEATURE_COLUMNS,
            "categorical": {
                "batting_team": teams,
                "bowling_team": teams,
                "city": cities,
            },
            "numeric": {
                "runs_left": numeric[0],
                "balls_left": numeric[1],
                "wickets": numeric[2],
                "total_runs_x": numeric[3],
                "crr": numeric[4],
                "rrr": numeric[5],
            },
            "intercept": intercept,
        })
    }

    fn load(value: serde_json::Value) -> Result<LogisticPipeline, ModelLoadError> {
        LogisticPipeline::from_json(&value.to_string())
    }

    #[test]
    fn zero_weights_give_even_odds() {
        let model = load(artifact_json([0.0; 6], 0.0)).unwrap();
        let record = derive(&state(180, 90, 3, 10)).to_record();
        let [p0, p1] = model.predict_proba(&record).unwrap();
        assert_relative_eq!(p0, 0.5, epsilon = 1e-12);
        assert_relative_eq!(p1, 0.5, epsilon = 1e-12);
    }

    #[test]
    fn logit_sums_weights_and_intercept() {
        // z = 0.5 + 2.0 * wickets_left(7) - 0.1 * rrr(9.0) = 13.6
        let model = load(artifact_json([0.0, 0.0, 2.0, 0.0, 0.0, -0.1], 0.5)).unwrap();
        let record = derive(&state(180, 90, 3, 10)).to_record();
        assert_relative_eq!(model.logit(&record).unwrap(), 13.6, epsilon = 1e-9);
        let [p0, p1] = model.predict_proba(&record).unwrap();
        assert_relative_eq!(p1, 1.0 / (1.0 + (-13.6f64).exp()), epsilon = 1e-12);
        assert_relative_eq!(p0 + p1, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn category_weights_apply_to_their_column() {
        let mut value = artifact_json([0.0; 6], 0.0);
        value["categorical"]["city"]["Mumbai"] = json!(1.25);
        value["categorical"]["bowling_team"]["Mumbai Indians"] = json!(-3.0);
        let model = load(value).unwrap();
        // batting side is Mumbai Indians, which carries no weight in batting_team
        let record = derive(&state(180, 90, 3, 10)).to_record();
        assert_relative_eq!(model.logit(&record).unwrap(), 1.25, epsilon = 1e-12);
    }

    #[test]
    fn sigmoid_is_stable_at_extremes() {
        assert_relative_eq!(sigmoid(0.0), 0.5);
        assert!(sigmoid(-800.0) >= 0.0 && sigmoid(-800.0).is_finite());
        assert_relative_eq!(sigmoid(800.0), 1.0);
    }

    #[test]
    fn rejects_unsupported_format_version() {
        let mut value = artifact_json([0.0; 6], 0.0);
        value["format_version"] = json!(2);
        let err = load(value).unwrap_err();
        assert!(matches!(
            err,
            ModelLoadError::UnsupportedVersion { expected: 1, found: 2, .. }
        ));
        assert!(err.to_string().contains("scikit-learn 1.3.2"));
    }

    #[test]
    fn rejects_reordered_columns() {
        let mut value = artifact_json([0.0; 6], 0.0);
        value["columns"] = json!([
            "bowling_team", "batting_team", "city", "runs_left", "balls_left",
            "wickets", "total_runs_x", "crr", "rrr"
        ]);
        assert!(matches!(load(value), Err(ModelLoadError::Schema(_))));
    }

    #[test]
    fn rejects_missing_numeric_weight() {
        let mut value = artifact_json([0.0; 6], 0.0);
        value["numeric"].as_object_mut().unwrap().remove("crr");
        let err = load(value).unwrap_err();
        assert_eq!(
            err.to_string(),
            "model schema mismatch: no weight for numeric column 'crr'"
        );
    }

    #[test]
    fn rejects_incomplete_vocabulary() {
        let mut value = artifact_json([0.0; 6], 0.0);
        value["categorical"]["city"].as_object_mut().unwrap().remove("Ranchi");
        let err = load(value).unwrap_err();
        assert!(err.to_string().contains("Ranchi"), "{err}");
    }

    #[test]
    fn rejects_malformed_json() {
        assert!(matches!(
            LogisticPipeline::from_json("not a model"),
            Err(ModelLoadError::Parse(_))
        ));
    }

    #[test]
    fn missing_file_reports_path() {
        let err = LogisticPipeline::load("/nonexistent/pipe.json").unwrap_err();
        assert!(err.to_string().contains("/nonexistent/pipe.json"));
    }

    #[test]
    fn query_rejects_reordered_record() {
        let model = load(artifact_json([0.0; 6], 0.0)).unwrap();
        let mut fields = derive(&state(180, 90, 3, 10)).to_record().fields().to_vec();
        fields.swap(3, 4);
        let err = model.predict_proba(&FeatureRecord::new(fields)).unwrap_err();
        assert_eq!(
            err,
            ModelInvocationError::ColumnMismatch {
                position: 3,
                expected: "runs_left",
                found: "balls_left"
            }
        );
    }

    #[test]
    fn query_rejects_short_record() {
        let model = load(artifact_json([0.0; 6], 0.0)).unwrap();
        let mut fields = derive(&state(180, 90, 3, 10)).to_record().fields().to_vec();
        fields.pop();
        let err = model.predict_proba(&FeatureRecord::new(fields)).unwrap_err();
        assert_eq!(err, ModelInvocationError::ColumnCount { expected: 9, found: 8 });
    }

    #[test]
    fn query_rejects_unknown_category_and_bad_numbers() {
        let model = load(artifact_json([0.0; 6], 0.0)).unwrap();
        let mut fields = derive(&state(180, 90, 3, 10)).to_record().fields().to_vec();
        fields[2].1 = FeatureValue::Category("Lahore");
        let err = model.predict_proba(&FeatureRecord::new(fields.clone())).unwrap_err();
        assert!(matches!(err, ModelInvocationError::UnknownCategory { column: "city", .. }));

        fields[2].1 = FeatureValue::Category("Mumbai");
        fields[7].1 = FeatureValue::Number(f64::NAN);
        let err = model.predict_proba(&FeatureRecord::new(fields.clone())).unwrap_err();
        assert_eq!(err, ModelInvocationError::NonFinite { column: "crr" });

        fields[7].1 = FeatureValue::Category("9.0");
        let err = model.predict_proba(&FeatureRecord::new(fields)).unwrap_err();
        assert_eq!(err, ModelInvocationError::WrongKind { column: "crr" });
    }

    #[test]
    fn shipped_artifact_loads_and_favours_easy_chases() {
        let path = concat!(env!("CARGO_MANIFEST_DIR"), "/models/pipe.json");
        let model = LogisticPipeline::load(path).unwrap();
        assert_eq!(model.describe().trained_with.as_deref(), Some("scikit-learn 1.3.2"));

        let easy = derive(&state(120, 110, 1, 16)).to_record();
        let hard = derive(&state(220, 60, 7, 12)).to_record();
        let [_, p_easy] = model.predict_proba(&easy).unwrap();
        let [_, p_hard] = model.predict_proba(&hard).unwrap();
        assert!(p_easy > 0.8, "easy chase: {p_easy:.3}");
        assert!(p_hard < 0.2, "hard chase: {p_hard:.3}");
    }
}
