use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::{debug, error, info, warn};

use crate::predictor::model::ModelInfo;
use crate::predictor::{
    derive, estimate_win_probability, City, DerivedFeatures, MatchState, Team, WinModel,
};

#[derive(Clone)]
pub struct AppState {
    /// Loaded once at startup and only ever read.
    pub model: Arc<dyn WinModel>,
}

/// Build the Axum router for the prediction form.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/api/options", get(options_handler))
        .route("/api/model", get(model_handler))
        .route("/api/predict", post(predict_handler))
        .layer(CorsLayer::permissive())
        .with_state(Arc::new(state))
}

/// Error body returned by every API endpoint.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

#[derive(Debug, Serialize)]
pub struct Options {
    pub teams: Vec<&'static str>,
    pub cities: Vec<&'static str>,
}

#[derive(Debug, Serialize)]
pub struct PredictionResponse {
    pub batting_team: Team,
    pub bowling_team: Team,
    pub batting_pct: u32,
    pub bowling_pct: u32,
    /// Batting side's chance as a fraction, for the progress bar.
    pub batting_fraction: f64,
    pub features: DerivedFeatures,
}

async fn index_handler() -> impl IntoResponse {
    Html(FORM_HTML)
}

/// GET /api/options
async fn options_handler() -> Json<Options> {
    Json(Options {
        teams: Team::ALL.iter().map(|t| t.as_str()).collect(),
        cities: City::ALL.iter().map(|c| c.as_str()).collect(),
    })
}

/// GET /api/model
async fn model_handler(State(state): State<Arc<AppState>>) -> Json<ModelInfo> {
    Json(state.model.describe())
}

/// POST /api/predict
async fn predict_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<MatchState>, JsonRejection>,
) -> Result<Json<PredictionResponse>, ApiError> {
    let Json(match_state) = payload.map_err(|rejection| {
        warn!("Rejected prediction request: {}", rejection.body_text());
        ApiError::new(rejection.status(), rejection.body_text())
    })?;

    match_state.validate().map_err(|e| {
        warn!("Invalid match state: {}", e);
        ApiError::new(StatusCode::UNPROCESSABLE_ENTITY, e.to_string())
    })?;

    let features = derive(&match_state);
    debug!(?features, "Derived model features");

    let probability = estimate_win_probability(state.model.as_ref(), &features).map_err(|e| {
        error!("Prediction failed: {}", e);
        ApiError::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Prediction failed: {e}"),
        )
    })?;

    info!(
        "🏏 {} need {} off {} with {} wickets in hand: {} {}% / {} {}%",
        match_state.batting_team,
        features.runs_left,
        features.balls_left,
        features.wickets_left,
        match_state.batting_team,
        probability.batting_pct(),
        match_state.bowling_team,
        probability.bowling_pct(),
    );

    Ok(Json(PredictionResponse {
        batting_team: match_state.batting_team,
        bowling_team: match_state.bowling_team,
        batting_pct: probability.batting_pct(),
        bowling_pct: probability.bowling_pct(),
        batting_fraction: probability.batting_fraction(),
        features,
    }))
}

/// Embedded single-file prediction form (HTML + CSS + JS)
const FORM_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<title>IPL Win Predictor</title>
<style>
  :root {
    --bg: #0f1117;
    --card: #1a1d27;
    --border: #2a2d3a;
    --accent: #6c63ff;
    --green: #00c896;
    --red: #ff4f6a;
    --text: #e0e0e0;
    --muted: #8888aa;
  }
  * { box-sizing: border-box; margin: 0; padding: 0; }
  body { background: var(--bg); color: var(--text); font-family: 'Segoe UI', system-ui, sans-serif; }
  header { display: flex; align-items: center; gap: 1rem; padding: 1rem 2rem; border-bottom: 1px solid var(--border); }
  header h1 { font-size: 1.4rem; font-weight: 700; }
  main { padding: 1.5rem 2rem; display: grid; gap: 1.5rem; max-width: 760px; }
  .panel { background: var(--card); border: 1px solid var(--border); border-radius: 10px; padding: 1.2rem; display: grid; gap: 1rem; }
  .row { display: grid; gap: 1rem; grid-template-columns: repeat(auto-fit, minmax(160px, 1fr)); }
  label { display: grid; gap: .35rem; color: var(--muted); font-size: .8rem; text-transform: uppercase; letter-spacing: .06em; }
  select, input { background: var(--bg); color: var(--text); border: 1px solid var(--border); border-radius: 6px; padding: .5rem; font-size: .95rem; }
  button { background: var(--accent); border: none; color: #fff; padding: .7rem 1rem; border-radius: 6px; font-weight: 600; cursor: pointer; }
  .metric .label { color: var(--muted); font-size: .8rem; margin-bottom: .3rem; }
  .metric .value { font-size: 1.9rem; font-weight: 700; }
  .bar { height: 10px; background: var(--border); border-radius: 5px; overflow: hidden; }
  .bar > div { height: 100%; background: var(--green); width: 0; transition: width .3s; }
  .error { color: var(--red); }
  .muted { color: var(--muted); font-size: .8rem; margin-left: auto; }
  .hidden { display: none; }
</style>
</head>
<body>
<header>
  <h1>🏏 IPL Win Predictor</h1>
  <span class="muted" id="model-info"></span>
</header>

<main>
  <form class="panel" id="form">
    <div class="row">
      <label>Batting Team<select id="batting_team"></select></label>
      <label>Bowling Team<select id="bowling_team"></select></label>
    </div>
    <label>Match Location<select id="city"></select></label>
    <label>Target Runs<input id="target_runs" type="number" min="1" value="150"></label>
    <div class="row">
      <label>Current Score<input id="current_score" type="number" min="0" value="0"></label>
      <label>Wickets Fallen<input id="wickets_fallen" type="number" min="0" max="9" value="0"></label>
      <label>Overs Completed<input id="overs_completed" type="number" min="0" max="20" value="0"></label>
    </div>
    <button type="submit">Predict Winning Probability</button>
  </form>

  <div class="panel hidden" id="result">
    <div class="row">
      <div class="metric"><div class="label" id="r-bat-name"></div><div class="value" id="r-bat"></div></div>
      <div class="metric"><div class="label" id="r-bowl-name"></div><div class="value" id="r-bowl"></div></div>
    </div>
    <div class="bar"><div id="r-bar"></div></div>
  </div>

  <div class="panel hidden error" id="error"></div>
</main>

<script>
const $ = id => document.getElementById(id);

function fill(select, values) {
  select.innerHTML = values.map(v => `<option>${v}</option>`).join('');
}

async function init() {
  const opts = await (await fetch('/api/options')).json();
  fill($('batting_team'), opts.teams);
  fill($('bowling_team'), opts.teams);
  fill($('city'), opts.cities);
  const info = await (await fetch('/api/model')).json();
  $('model-info').textContent = `model: ${info.kind} v${info.format_version}` +
    (info.trained_with ? ` (${info.trained_with})` : '');
}

$('target_runs').addEventListener('input', () => {
  $('current_score').max = Math.max(0, Number($('target_runs').value) - 1);
});

$('form').addEventListener('submit', async ev => {
  ev.preventDefault();
  const body = {
    batting_team: $('batting_team').value,
    bowling_team: $('bowling_team').value,
    city: $('city').value,
    target_runs: Number($('target_runs').value),
    current_score: Number($('current_score').value),
    wickets_fallen: Number($('wickets_fallen').value),
    overs_completed: Number($('overs_completed').value),
  };
  const resp = await fetch('/api/predict', {
    method: 'POST',
    headers: { 'Content-Type': 'application/json' },
    body: JSON.stringify(body),
  });
  const data = await resp.json();
  if (!resp.ok) {
    $('result').classList.add('hidden');
    $('error').textContent = data.error;
    $('error').classList.remove('hidden');
    return;
  }
  $('error').classList.add('hidden');
  $('r-bat-name').textContent = data.batting_team;
  $('r-bowl-name').textContent = data.bowling_team;
  $('r-bat').textContent = `${data.batting_pct}%`;
  $('r-bowl').textContent = `${data.bowling_pct}%`;
  $('r-bar').style.width = `${data.batting_fraction * 100}%`;
  $('result').classList.remove('hidden');
});

init();
</script>
</body>
</html>
"#;
