//! Score submission to an external spreadsheet webhook.
//!
//! The sink is optional: without a configured URL every submission reports
//! that submission is disabled. Failures are reported back to the caller and
//! logged, never retried.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use reqwest::header::{CONTENT_TYPE, USER_AGENT};
use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument, warn};

use crate::domain::Topic;
use crate::score::Scoreboard;
use crate::session::Student;

/// Payload the spreadsheet script expects.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreSubmission {
  pub first_name: String,
  pub last_name: String,
  pub class_period: String,
  pub correct: u32,
  pub incorrect: u32,
  pub total: u32,
  /// "correct / total"
  pub score: String,
  /// JSON-encoded history rows.
  pub problem_history: String,
  pub mode: String,
  #[serde(default)]
  pub timestamp: String,
}

impl ScoreSubmission {
  pub fn new(student: &Student, topic: Topic, board: &Scoreboard, total: u32) -> Self {
    Self {
      first_name: student.first_name.clone(),
      last_name: student.last_name.clone(),
      class_period: student.class_period.clone(),
      correct: board.correct,
      incorrect: board.incorrect,
      total,
      score: format!("{} / {}", board.correct, total),
      problem_history: serde_json::to_string(&board.history).unwrap_or_else(|_| "[]".into()),
      mode: topic.challenge_label(),
      timestamp: utc_timestamp(SystemTime::now()),
    }
  }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SubmitOutcome {
  pub success: bool,
  pub message: String,
}

#[derive(Clone)]
pub struct ScoreSink {
  client: reqwest::Client,
  url: Option<String>,
}

impl ScoreSink {
  pub fn new(url: Option<String>) -> Self {
    let client = reqwest::Client::builder()
      .timeout(Duration::from_secs(20))
      .build()
      .unwrap_or_default();
    let url = url.filter(|u| !u.trim().is_empty());
    Self { client, url }
  }

  pub fn is_enabled(&self) -> bool {
    self.url.is_some()
  }

  /// POST the submission as JSON. A missing timestamp is filled in.
  #[instrument(level = "info", skip(self, submission), fields(mode = %submission.mode, correct = submission.correct, total = submission.total))]
  pub async fn submit(&self, mut submission: ScoreSubmission) -> SubmitOutcome {
    let Some(url) = &self.url else {
      warn!(target: "polygon_practice", "SCORE_WEBHOOK_URL is not set. Skipping score submission.");
      return SubmitOutcome { success: false, message: "Score submission is disabled".into() };
    };
    if submission.timestamp.is_empty() {
      submission.timestamp = utc_timestamp(SystemTime::now());
    }

    let start = std::time::Instant::now();
    let res = self
      .client
      .post(url)
      .header(USER_AGENT, "polygon-practice/0.1")
      .header(CONTENT_TYPE, "application/json")
      .json(&submission)
      .send()
      .await;
    let elapsed = start.elapsed();

    match res {
      Ok(r) if r.status().is_success() || r.status().is_redirection() => {
        info!(target: "polygon_practice", ?elapsed, status = %r.status(), "Score submitted");
        SubmitOutcome { success: true, message: "Score submitted successfully!".into() }
      }
      Ok(r) => {
        let status = r.status();
        error!(target: "polygon_practice", ?elapsed, %status, "Score webhook rejected the submission");
        SubmitOutcome { success: false, message: format!("Score submission failed (HTTP {status}).") }
      }
      Err(e) => {
        error!(target: "polygon_practice", ?elapsed, error = %e, "Error submitting score");
        SubmitOutcome {
          success: false,
          message: "Error submitting score. Please check your internet connection.".into(),
        }
      }
    }
  }
}

/// "YYYY-MM-DD HH:MM:SS UTC" for a point in time.
pub fn utc_timestamp(at: SystemTime) -> String {
  let secs = at.duration_since(UNIX_EPOCH).map(|d| d.as_secs()).unwrap_or(0);
  let days = (secs / 86_400) as i64;
  let rem = secs % 86_400;
  let (y, m, d) = civil_from_days(days);
  format!(
    "{y:04}-{m:02}-{d:02} {:02}:{:02}:{:02} UTC",
    rem / 3600,
    (rem % 3600) / 60,
    rem % 60
  )
}

/// Days since 1970-01-01 to a proleptic Gregorian date.
fn civil_from_days(days: i64) -> (i64, u32, u32) {
  let z = days + 719_468;
  let era = z.div_euclid(146_097);
  let doe = z.rem_euclid(146_097);
  let yoe = (doe - doe / 1460 + doe / 36_524 - doe / 146_096) / 365;
  let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
  let mp = (5 * doy + 2) / 153;
  let d = (doy - (153 * mp + 2) / 5 + 1) as u32;
  let m = (if mp < 10 { mp + 3 } else { mp - 9 }) as u32;
  let y = yoe + era * 400 + if m <= 2 { 1 } else { 0 };
  (y, m, d)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn timestamps_are_civil_utc() {
    assert_eq!(utc_timestamp(UNIX_EPOCH), "1970-01-01 00:00:00 UTC");
    let t = UNIX_EPOCH + Duration::from_secs(951_782_400 + 3_661);
    assert_eq!(utc_timestamp(t), "2000-02-29 01:01:01 UTC");
  }

  #[test]
  fn submission_uses_spreadsheet_field_names() {
    let student = Student { first_name: "Ada".into(), last_name: "L".into(), class_period: "3".into() };
    let mut board = Scoreboard::new();
    board.correct = 7;
    board.incorrect = 3;
    let s = ScoreSubmission::new(&student, Topic::Angles, &board, 10);
    let json = serde_json::to_value(&s).unwrap();
    assert_eq!(json["firstName"], "Ada");
    assert_eq!(json["classPeriod"], "3");
    assert_eq!(json["score"], "7 / 10");
    assert_eq!(json["mode"], "Angles Challenge");
    assert_eq!(json["problemHistory"], "[]");
  }

  #[tokio::test]
  async fn disabled_sink_reports_without_sending() {
    let sink = ScoreSink::new(None);
    assert!(!sink.is_enabled());
    let student = Student::default();
    let out = sink.submit(ScoreSubmission::new(&student, Topic::Diagonals, &Scoreboard::new(), 10)).await;
    assert_eq!(out, SubmitOutcome { success: false, message: "Score submission is disabled".into() });
  }
}
