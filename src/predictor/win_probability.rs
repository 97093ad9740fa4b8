//! Win probability for both sides of a chase.
//!
//! Class 1 of the trained model is "batting side wins", class 0 is "bowling
//! side wins". Percentages are rounded half-to-even, matching the notebook the
//! model was validated in.

use serde::Serialize;

use super::features::DerivedFeatures;
use super::model::{ModelInvocationError, WinModel};

const BOWLING_WINS: usize = 0;
const BATTING_WINS: usize = 1;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WinProbability {
    /// Probability the chasing side wins, in [0, 1].
    pub batting: f64,
    /// Probability the defending side wins, in [0, 1].
    pub bowling: f64,
}

impl WinProbability {
    pub fn batting_pct(&self) -> u32 {
        to_percent(self.batting)
    }

    pub fn bowling_pct(&self) -> u32 {
        to_percent(self.bowling)
    }

    /// Fill level for a progress indicator, taken from the rounded
    /// percentage so the bar agrees with the displayed number.
    pub fn batting_fraction(&self) -> f64 {
        self.batting_pct() as f64 / 100.0
    }
}

fn to_percent(p: f64) -> u32 {
    (p * 100.0).round_ties_even() as u32
}

/// Query the model for both sides' chances.
pub fn estimate_win_probability(
    model: &dyn WinModel,
    features: &DerivedFeatures,
) -> Result<WinProbability, ModelInvocationError> {
    let probs = model.predict_proba(&features.to_record())?;

    if probs.iter().any(|p| !p.is_finite() || !(0.0..=1.0).contains(p)) {
        return Err(ModelInvocationError::InvalidOutput(probs));
    }

    Ok(WinProbability {
        batting: probs[BATTING_WINS],
        bowling: probs[BOWLING_WINS],
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::predictor::features::{derive, state, FeatureRecord};
    use crate::predictor::model::tests::artifact_json;
    use crate::predictor::model::{LogisticPipeline, ModelInfo};
    use approx::assert_relative_eq;

    struct FixedModel([f64; 2]);

    impl WinModel for FixedModel {
        fn predict_proba(&self, _: &FeatureRecord) -> Result<[f64; 2], ModelInvocationError> {
            Ok(self.0)
        }

        fn describe(&self) -> ModelInfo {
            ModelInfo {
                kind: "fixed",
                format_version: 0,
                trained_with: None,
            }
        }
    }

    fn features() -> DerivedFeatures {
        derive(&state(180, 90, 3, 10))
    }

    #[test]
    fn maps_class_indices_to_sides() {
        let p = estimate_win_probability(&FixedModel([0.27, 0.73]), &features()).unwrap();
        assert_relative_eq!(p.batting, 0.73);
        assert_relative_eq!(p.bowling, 0.27);
        assert_eq!(p.batting_pct(), 73);
        assert_eq!(p.bowling_pct(), 27);
        assert_relative_eq!(p.batting_fraction(), 0.73);
    }

    #[test]
    fn rounds_half_to_even() {
        let p = WinProbability {
            batting: 0.125,
            bowling: 0.875,
        };
        assert_eq!(p.batting_pct(), 12);
        assert_eq!(p.bowling_pct(), 88);

        let p = WinProbability {
            batting: 0.6251,
            bowling: 0.3749,
        };
        assert_eq!(p.batting_pct(), 63);
        assert_eq!(p.bowling_pct(), 37);
    }

    #[test]
    fn percentages_sum_to_about_one_hundred() {
        let model = LogisticPipeline::from_json(
            &artifact_json([-0.04, 0.02, 0.3, 0.001, 0.1, -0.2], 0.1).to_string(),
        )
        .unwrap();
        for target in [80, 150, 230] {
            for overs in [0, 5, 13, 20] {
                for wickets in [0, 4, 9] {
                    let f = derive(&state(target, target / 2, wickets, overs));
                    let p = estimate_win_probability(&model, &f).unwrap();
                    assert!((0.0..=1.0).contains(&p.batting));
                    assert!((0.0..=1.0).contains(&p.bowling));
                    let total = p.batting_pct() + p.bowling_pct();
                    assert!((99..=101).contains(&total), "total = {total}");
                }
            }
        }
    }

    #[test]
    fn rejects_out_of_range_output() {
        for probs in [[1.2, -0.2], [f64::NAN, 0.5]] {
            let err = estimate_win_probability(&FixedModel(probs), &features()).unwrap_err();
            assert!(matches!(err, ModelInvocationError::InvalidOutput(_)));
        }
    }

    #[test]
    fn propagates_model_errors() {
        let model = LogisticPipeline::from_json(&artifact_json([0.0; 6], 0.0).to_string()).unwrap();

        let mut f = features();
        f.crr = f64::INFINITY;
        let err = estimate_win_probability(&model, &f).unwrap_err();
        assert_eq!(err, ModelInvocationError::NonFinite { column: "crr" });
    }
}
