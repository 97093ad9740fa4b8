//! Second-innings match state and the feature vector derived from it.
//!
//! `derive` is the only place where run rates and resources remaining are
//! computed. Its clamps and zero branches reproduce the transformations the
//! model saw at training time, so they must not be "fixed" here.

use serde::{Deserialize, Serialize};

use super::catalog::{City, Team};

/// Balls in a full Twenty20 innings.
pub const BALLS_PER_INNINGS: u32 = 120;
pub const BALLS_PER_OVER: u32 = 6;
pub const MAX_OVERS: u32 = BALLS_PER_INNINGS / BALLS_PER_OVER;
pub const WICKETS_PER_INNINGS: u32 = 10;

/// Column layout of the trained pipeline. Order matters.
pub const FEATURE_COLUMNS: [&str; 9] = [
    "batting_team",
    "bowling_team",
    "city",
    "runs_left",
    "balls_left",
    "wickets",
    "total_runs_x",
    "crr",
    "rrr",
];

/// Raw state of a chase as entered by the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchState {
    pub batting_team: Team,
    pub bowling_team: Team,
    pub city: City,
    /// Score the batting side must reach.
    pub target_runs: u32,
    pub current_score: u32,
    pub wickets_fallen: u32,
    pub overs_completed: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidMatchState {
    #[error("target runs must be at least 1")]
    ZeroTarget,
    #[error("current score {score} must be below the target of {target}")]
    ScoreNotBelowTarget { score: u32, target: u32 },
    #[error("wickets fallen must be between 0 and 9, got {0}")]
    TooManyWickets(u32),
    #[error("overs completed must be between 0 and {max}, got {overs}", max = MAX_OVERS)]
    TooManyOvers { overs: u32 },
}

impl MatchState {
    /// Input bounds enforced by the form before anything is derived.
    ///
    /// `derive` does not call this: it tolerates out-of-range scores by
    /// clamping, while callers are expected to reject them up front.
    pub fn validate(&self) -> Result<(), InvalidMatchState> {
        if self.target_runs == 0 {
            return Err(InvalidMatchState::ZeroTarget);
        }
        if self.current_score >= self.target_runs {
            return Err(InvalidMatchState::ScoreNotBelowTarget {
                score: self.current_score,
                target: self.target_runs,
            });
        }
        if self.wickets_fallen >= WICKETS_PER_INNINGS {
            return Err(InvalidMatchState::TooManyWickets(self.wickets_fallen));
        }
        if self.overs_completed > MAX_OVERS {
            return Err(InvalidMatchState::TooManyOvers {
                overs: self.overs_completed,
            });
        }
        Ok(())
    }
}

/// Model inputs, declared in training-schema order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DerivedFeatures {
    pub batting_team: Team,
    pub bowling_team: Team,
    pub city: City,
    pub runs_left: u32,
    pub balls_left: u32,
    pub wickets_left: u32,
    pub target_runs: u32,
    /// Current run rate, runs per over.
    pub crr: f64,
    /// Required run rate, runs per over.
    pub rrr: f64,
}

/// Compute the model's feature vector from a match state.
pub fn derive(state: &MatchState) -> DerivedFeatures {
    let runs_left = state.target_runs.saturating_sub(state.current_score);

    // Floored at one ball so the required rate stays defined after 20 overs.
    let balls_left = BALLS_PER_INNINGS
        .saturating_sub(state.overs_completed.saturating_mul(BALLS_PER_OVER))
        .max(1);

    let wickets_left = WICKETS_PER_INNINGS.saturating_sub(state.wickets_fallen);

    let crr = if state.overs_completed > 0 {
        state.current_score as f64 / state.overs_completed as f64
    } else {
        0.0
    };

    let rrr = if runs_left > 0 {
        runs_left as f64 * BALLS_PER_OVER as f64 / balls_left as f64
    } else {
        0.0
    };

    DerivedFeatures {
        batting_team: state.batting_team,
        bowling_team: state.bowling_team,
        city: state.city,
        runs_left,
        balls_left,
        wickets_left,
        target_runs: state.target_runs,
        crr,
        rrr,
    }
}

// ── Feature record ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FeatureValue {
    Category(&'static str),
    Number(f64),
}

/// Named, ordered cells handed to a model.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureRecord {
    fields: Vec<(&'static str, FeatureValue)>,
}

impl FeatureRecord {
    pub fn new(fields: Vec<(&'static str, FeatureValue)>) -> Self {
        Self { fields }
    }

    pub fn fields(&self) -> &[(&'static str, FeatureValue)] {
        &self.fields
    }

    pub fn columns(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields.iter().map(|(name, _)| *name)
    }

    pub(crate) fn len(&self) -> usize {
        self.fields.len()
    }
}

impl DerivedFeatures {
    /// Lay the features out under the model's column names.
    pub fn to_record(&self) -> FeatureRecord {
        let values = [
            FeatureValue::Category(self.batting_team.as_str()),
            FeatureValue::Category(self.bowling_team.as_str()),
            FeatureValue::Category(self.city.as_str()),
            FeatureValue::Number(self.runs_left as f64),
            FeatureValue::Number(self.balls_left as f64),
            FeatureValue::Number(self.wickets_left as f64),
            FeatureValue::Number(self.target_runs as f64),
            FeatureValue::Number(self.crr),
            FeatureValue::Number(self.rrr),
        ];
        FeatureRecord::new(FEATURE_COLUMNS.into_iter().zip(values).collect())
    }
}

#[cfg(test)]
pub(crate) fn state(target: u32, score: u32, wickets: u32, overs: u32) -> MatchState {
    MatchState {
        batting_team: Team::MumbaiIndians,
        bowling_team: Team::ChennaiSuperKings,
        city: City::Mumbai,
        target_runs: target,
        current_score: score,
        wickets_fallen: wickets,
        overs_completed: overs,
    }
}
