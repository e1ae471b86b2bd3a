//! WebSocket upgrade + message loop. Each client message is parsed as JSON and
//! applied to the connection's quiz session. We reply with a single JSON
//! message per request.

use std::sync::Arc;
use axum::{
  extract::{
    ws::{Message, WebSocket},
    State, WebSocketUpgrade,
  },
  response::IntoResponse,
};
use rand::{rngs::StdRng, Rng, SeedableRng};
use tracing::{info, error, instrument, debug};

use crate::error::SessionError;
use crate::protocol::{ClientWsMessage, ServerWsMessage};
use crate::protocol::to_out;
use crate::logic::*;
use crate::render::{render_solution, Markup};
use crate::session::{Mode, Session};
use crate::state::AppState;

/// Per-connection quiz state.
pub struct Connection {
  session: Option<Session>,
  rng: StdRng,
  score_submitted: bool,
}

impl Connection {
  /// Seeded from the shared generator, so a fixed `rng_seed` makes whole
  /// sessions reproducible.
  pub fn new(state: &AppState) -> Self {
    let seed: u64 = state.with_rng(|r| r.gen());
    Self { session: None, rng: StdRng::seed_from_u64(seed), score_submitted: false }
  }
}

#[instrument(level = "info", skip(state))]
pub async fn ws_upgrade(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> impl IntoResponse {
  info!(target: "polygon_practice", "WebSocket upgrade requested");
  ws.on_upgrade(move |socket| handle_ws(socket, state))
}

#[instrument(level = "info", skip(socket, state))]
async fn handle_ws(mut socket: WebSocket, state: Arc<AppState>) {
  info!(target: "polygon_practice", "WebSocket connected");
  let mut conn = Connection::new(&state);
  while let Some(Ok(msg)) = socket.recv().await {
    match msg {
      Message::Text(txt) => {
        // Parse, dispatch, serialize response.
        let reply_msg = match serde_json::from_str::<ClientWsMessage>(&txt) {
          Ok(incoming) => {
            debug!(target: "polygon_practice", "WS received: {:?}", &incoming);
            handle_client_ws(incoming, &mut conn, &state).await
          }
          Err(e) => ServerWsMessage::Error { message: format!("Invalid JSON: {}", e) },
        };

        let out = serde_json::to_string(&reply_msg).unwrap_or_else(|e| {
          serde_json::json!({ "type": "error", "message": format!("Serialization error: {}", e) }).to_string()
        });

        if let Err(e) = socket.send(Message::Text(out)).await {
          error!(target: "polygon_practice", error = %e, "WS send error");
          break;
        }
      }
      Message::Ping(payload) => { let _ = socket.send(Message::Pong(payload)).await; }
      Message::Close(_) => break,
      _ => {}
    }
  }
  info!(target: "polygon_practice", "WebSocket disconnected");
}

fn error_reply(e: SessionError) -> ServerWsMessage {
  ServerWsMessage::Error { message: e.to_string() }
}

#[instrument(level = "info", skip(conn, state))]
pub async fn handle_client_ws(msg: ClientWsMessage, conn: &mut Connection, state: &AppState) -> ServerWsMessage {
  match msg {
    ClientWsMessage::Ping => ServerWsMessage::Pong,

    ClientWsMessage::StartSession(settings) => {
      match Session::start(settings, state.config.challenge_length) {
        Ok(session) => {
          let reply = ServerWsMessage::SessionStarted {
            session_id: session.id.clone(),
            topic: session.topic,
            mode: session.mode,
            problem_types: session_types(&session),
            challenge_length: (session.mode == Mode::Challenge).then(|| session.challenge_length()),
          };
          conn.session = Some(session);
          conn.score_submitted = false;
          reply
        }
        Err(e) => error_reply(e),
      }
    }

    ClientWsMessage::NextProblem => {
      let Some(session) = conn.session.as_mut() else { return error_reply(SessionError::NotStarted) };
      match session.next_problem(&mut conn.rng) {
        Ok(problem) => {
          warn_if_unverified(problem);
          let problem = to_out(problem);
          info!(target: "problem", session = %session.id, problem_type = %problem.problem_type, "WS problem served");
          let question_number = (session.mode == Mode::Challenge).then(|| session.question_number());
          ServerWsMessage::Problem { problem, question_number }
        }
        Err(e) => error_reply(e),
      }
    }

    ClientWsMessage::SubmitAnswer { answer } => {
      let Some(session) = conn.session.as_mut() else { return error_reply(SessionError::NotStarted) };
      match session.submit(&answer) {
        Ok(outcome) => {
          info!(target: "problem", session = %session.id, correct = outcome.correct, "WS submit_answer graded");
          ServerWsMessage::AnswerResult {
            correct: outcome.correct,
            expected: outcome.expected,
            solution: outcome.solution.map(|steps| render_solution(&steps, Markup::Html)),
            score: score_out(session),
            finished: outcome.finished,
          }
        }
        Err(e) => error_reply(e),
      }
    }

    ClientWsMessage::ShowAnswer => {
      let Some(session) = conn.session.as_mut() else { return error_reply(SessionError::NotStarted) };
      match session.reveal() {
        Ok(shown) => ServerWsMessage::AnswerRevealed {
          answer: shown.answer,
          solution: render_solution(&shown.solution, Markup::Html),
        },
        Err(e) => error_reply(e),
      }
    }

    ClientWsMessage::EndSession => match conn.session.take() {
      Some(mut session) => {
        session.finish();
        info!(target: "problem", session = %session.id, "Session ended by client");
        ServerWsMessage::SessionFinished { score: score_out(&session) }
      }
      None => error_reply(SessionError::NotStarted),
    },

    ClientWsMessage::SubmitScore => {
      let Some(session) = conn.session.as_ref() else { return error_reply(SessionError::NotStarted) };
      if conn.score_submitted {
        return ServerWsMessage::Error { message: "Score already submitted.".into() };
      }
      let submission = match session.summary() {
        Ok(s) => s,
        Err(e) => return error_reply(e),
      };
      let outcome = relay_score(state, submission).await;
      conn.score_submitted = outcome.success;
      ServerWsMessage::ScoreSubmitted { success: outcome.success, message: outcome.message }
    }
  }
}

fn session_types(session: &Session) -> Vec<crate::domain::ProblemTypeDescriptor> {
  session.selected().iter().map(|c| c.descriptor()).collect()
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::config::AppConfig;

  fn state(challenge_length: u32) -> AppState {
    AppState::from_config(AppConfig { challenge_length, rng_seed: Some(5), ..AppConfig::default() })
  }

  fn parse(json: &str) -> ClientWsMessage {
    serde_json::from_str(json).unwrap()
  }

  const START_CHALLENGE: &str = r#"{"type":"start_session","topic":"angles","mode":"challenge",
    "problemTypes":["SUM_INTERIOR","EACH_EXTERIOR"],
    "student":{"firstName":"Ada","lastName":"Lovelace","classPeriod":"2"}}"#;

  #[tokio::test]
  async fn challenge_round_trip() {
    let state = state(2);
    let mut conn = Connection::new(&state);

    let started = handle_client_ws(parse(START_CHALLENGE), &mut conn, &state).await;
    assert!(matches!(started, ServerWsMessage::SessionStarted { challenge_length: Some(2), .. }));

    for i in 0..2u32 {
      let answer = match handle_client_ws(parse(r#"{"type":"next_problem"}"#), &mut conn, &state).await {
        ServerWsMessage::Problem { problem, question_number } => {
          assert_eq!(question_number, Some(i + 1));
          problem.answer
        }
        other => panic!("expected a problem, got {other:?}"),
      };
      let guess = if i == 0 { answer } else { answer + 10.0 };
      let submit = ClientWsMessage::SubmitAnswer { answer: guess.to_string() };
      match handle_client_ws(submit, &mut conn, &state).await {
        ServerWsMessage::AnswerResult { correct, solution, finished, score, .. } => {
          assert_eq!(correct, i == 0);
          assert_eq!(solution.is_some(), i == 1);
          assert_eq!(finished, i == 1);
          if finished {
            assert_eq!(score.score.as_deref(), Some("1 / 2"));
          }
        }
        other => panic!("expected an answer result, got {other:?}"),
      }
    }

    match handle_client_ws(ClientWsMessage::SubmitScore, &mut conn, &state).await {
      ServerWsMessage::ScoreSubmitted { success, message } => {
        assert!(!success);
        assert_eq!(message, "Score submission is disabled");
      }
      other => panic!("expected score_submitted, got {other:?}"),
    }
  }

  #[tokio::test]
  async fn requests_without_a_session_are_errors() {
    let state = state(10);
    let mut conn = Connection::new(&state);
    let needs_session = [
      ClientWsMessage::NextProblem,
      ClientWsMessage::ShowAnswer,
      ClientWsMessage::EndSession,
      ClientWsMessage::SubmitScore,
    ];
    for msg in needs_session {
      match handle_client_ws(msg, &mut conn, &state).await {
        ServerWsMessage::Error { message } => assert!(message.starts_with("No active session")),
        other => panic!("expected an error, got {other:?}"),
      }
    }
    assert!(matches!(handle_client_ws(parse(r#"{"type":"ping"}"#), &mut conn, &state).await, ServerWsMessage::Pong));
  }

  #[tokio::test]
  async fn practice_session_ends_with_a_tally() {
    let state = state(10);
    let mut conn = Connection::new(&state);
    let start = r#"{"type":"start_session","topic":"diagonals","mode":"practice","problemTypes":["n_to_d"]}"#;
    assert!(matches!(
      handle_client_ws(parse(start), &mut conn, &state).await,
      ServerWsMessage::SessionStarted { challenge_length: None, .. }
    ));
    handle_client_ws(ClientWsMessage::NextProblem, &mut conn, &state).await;
    let bad = ClientWsMessage::SubmitAnswer { answer: "twelve".into() };
    assert!(matches!(handle_client_ws(bad, &mut conn, &state).await, ServerWsMessage::Error { .. }));
    match handle_client_ws(ClientWsMessage::EndSession, &mut conn, &state).await {
      ServerWsMessage::SessionFinished { score } => {
        assert_eq!((score.correct, score.incorrect, score.score), (0, 0, None));
      }
      other => panic!("expected session_finished, got {other:?}"),
    }
  }

  #[tokio::test]
  async fn show_answer_reveals_then_repeats_the_type() {
    let state = state(10);
    let mut conn = Connection::new(&state);
    let start = r#"{"type":"start_session","topic":"diagonals","mode":"practice",
      "problemTypes":["n_to_d","d_to_n","int_to_d"]}"#;
    handle_client_ws(parse(start), &mut conn, &state).await;
    let show = || parse(r#"{"type":"show_answer"}"#);

    match handle_client_ws(show(), &mut conn, &state).await {
      ServerWsMessage::Error { message } => assert_eq!(message, "No problem is waiting for an answer."),
      other => panic!("expected an error, got {other:?}"),
    }
    let first = match handle_client_ws(ClientWsMessage::NextProblem, &mut conn, &state).await {
      ServerWsMessage::Problem { problem, .. } => problem,
      other => panic!("expected a problem, got {other:?}"),
    };
    match handle_client_ws(show(), &mut conn, &state).await {
      ServerWsMessage::AnswerRevealed { answer, solution } => {
        assert_eq!(answer, first.answer);
        assert_eq!(solution, first.solution);
      }
      other => panic!("expected answer_revealed, got {other:?}"),
    }
    match handle_client_ws(ClientWsMessage::NextProblem, &mut conn, &state).await {
      ServerWsMessage::Problem { problem, .. } => assert_eq!(problem.problem_type, first.problem_type),
      other => panic!("expected a problem, got {other:?}"),
    }
  }
}
