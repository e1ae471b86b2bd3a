//! HTTP endpoint handlers. These are thin wrappers that forward to core logic.
//! Each handler is instrumented and logs its parameters and basic result info.

use std::sync::Arc;
use axum::{extract::{State, Query}, http::StatusCode, Json, response::IntoResponse};
use tracing::{info, warn, instrument};

use crate::error::GenerateError;
use crate::protocol::*;
use crate::state::AppState;
use crate::submit::ScoreSubmission;
use crate::logic::*;

type ApiError = (StatusCode, Json<ErrorOut>);

fn bad_request(e: GenerateError) -> ApiError {
  (StatusCode::BAD_REQUEST, Json(ErrorOut { error: e.to_string() }))
}

#[instrument(level = "info")]
pub async fn http_health() -> impl IntoResponse { Json(HealthOut { ok: true }) }

#[instrument(level = "info", fields(topic = ?q.topic))]
pub async fn http_get_categories(Query(q): Query<TopicQuery>) -> impl IntoResponse {
  Json(categories_out(q.topic.unwrap_or_default()))
}

#[instrument(level = "info", fields(topic = ?q.topic))]
pub async fn http_get_formulas(Query(q): Query<TopicQuery>) -> impl IntoResponse {
  Json(formulas_out(q.topic.unwrap_or_default()))
}

#[instrument(level = "info", skip(state), fields(topic = ?q.topic, problem_type = ?q.problem_type))]
pub async fn http_get_problem(
  State(state): State<Arc<AppState>>,
  Query(q): Query<ProblemQuery>,
) -> Result<Json<ProblemOut>, ApiError> {
  match generate_problem_out(&state, &q) {
    Ok(out) => {
      info!(target: "problem", problem_type = %out.problem_type, answer = out.answer, "HTTP problem served");
      Ok(Json(out))
    }
    Err(e) => {
      warn!(target: "problem", error = %e, "HTTP problem request rejected");
      Err(bad_request(e))
    }
  }
}

#[instrument(level = "info", skip(state, body), fields(mode = %body.mode, correct = body.correct, total = body.total))]
pub async fn http_post_score(
  State(state): State<Arc<AppState>>,
  Json(body): Json<ScoreSubmission>,
) -> impl IntoResponse {
  let outcome = relay_score(&state, body).await;
  let status = match (outcome.success, state.sink.is_enabled()) {
    (true, _) => StatusCode::OK,
    (false, false) => StatusCode::SERVICE_UNAVAILABLE,
    (false, true) => StatusCode::BAD_GATEWAY,
  };
  (status, Json(outcome))
}
