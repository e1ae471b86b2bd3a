//! Core behaviors shared by both HTTP and WebSocket handlers.
//!
//! This includes:
//!   - Resolving a requested category and generating a checked problem
//!   - Catalog and formula sheet lookups
//!   - Relaying finished challenges to the score sink

use rand::seq::SliceRandom;
use rand::Rng;
use tracing::{debug, info, instrument, warn};

use crate::domain::{formulas, Category, GeneratedProblem, Topic};
use crate::error::GenerateError;
use crate::protocol::{to_out, CategoriesOut, FormulasOut, ProblemOut, ProblemQuery, ScoreOut};
use crate::render::{render_text, Markup};
use crate::session::Session;
use crate::state::AppState;
use crate::submit::{ScoreSubmission, SubmitOutcome};

/// Pick the category for a request. An explicit id must exist (within the
/// topic, if one is given); without an id a random category of the topic is
/// used.
pub fn resolve_category<R: Rng + ?Sized>(
  topic: Option<Topic>,
  id: Option<&str>,
  rng: &mut R,
) -> Result<Category, GenerateError> {
  match (topic, id.map(str::trim).filter(|s| !s.is_empty())) {
    (Some(t), Some(id)) => t.category(id),
    (None, Some(id)) => Topic::Angles
      .category(id)
      .or_else(|_| Topic::Diagonals.category(id)),
    (t, None) => {
      let categories = t.unwrap_or_default().categories();
      categories
        .choose(rng)
        .copied()
        .ok_or_else(|| GenerateError::Precondition("topic has no categories".into()))
    }
  }
}

/// A solution that does not re-evaluate is still served, but logged.
pub fn warn_if_unverified(problem: &GeneratedProblem) {
  if let Err(e) = problem.verify() {
    warn!(
      target: "problem",
      category = %problem.category,
      question = %render_text(&problem.question, Markup::Plain),
      error = %e,
      "Generated solution failed verification"
    );
  }
}

#[instrument(level = "debug", skip(rng), fields(%category))]
pub fn generate_checked<R: Rng + ?Sized>(category: Category, rng: &mut R) -> Result<GeneratedProblem, GenerateError> {
  let problem = crate::generate(category, rng)?;
  warn_if_unverified(&problem);
  Ok(problem)
}

#[instrument(level = "info", skip(state), fields(topic = ?q.topic, problem_type = ?q.problem_type))]
pub fn generate_problem_out(state: &AppState, q: &ProblemQuery) -> Result<ProblemOut, GenerateError> {
  let problem = state.with_rng(|rng| {
    let category = resolve_category(q.topic, q.problem_type.as_deref(), rng)?;
    generate_checked(category, rng)
  })?;
  debug!(target: "problem", id = problem.category.id(), answer = problem.answer, "Problem generated");
  Ok(to_out(&problem))
}

pub fn categories_out(topic: Topic) -> CategoriesOut {
  CategoriesOut { topic, categories: topic.descriptors() }
}

pub fn formulas_out(topic: Topic) -> FormulasOut {
  FormulasOut { topic, formulas: formulas(topic) }
}

pub fn score_out(session: &Session) -> ScoreOut {
  let board = session.scoreboard();
  let score = session
    .is_complete()
    .then(|| format!("{} / {}", board.correct, session.challenge_length()));
  ScoreOut { correct: board.correct, incorrect: board.incorrect, score }
}

#[instrument(level = "info", skip(state, submission), fields(mode = %submission.mode))]
pub async fn relay_score(state: &AppState, submission: ScoreSubmission) -> SubmitOutcome {
  let outcome = state.sink.submit(submission).await;
  info!(target: "polygon_practice", success = outcome.success, "Score relay finished");
  outcome
}
