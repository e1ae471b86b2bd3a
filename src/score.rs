//! Score bookkeeping for a practice or challenge run.
//!
//! History rows are copies of the generated problem's public fields plus the
//! student's answer; the generated problem itself is never mutated.

use rand::Rng;
use serde::Serialize;

use crate::domain::{Category, GeneratedProblem, Topic};
use crate::polygon;
use crate::render::{render_text, Markup};

/// Answers within this distance of the expected value count as correct.
pub const ANSWER_TOLERANCE: f64 = 0.01;

pub fn is_correct(given: f64, expected: f64) -> bool {
  (given - expected).abs() < ANSWER_TOLERANCE
}

/// Parse what the student typed. Blank or non-numeric input is `None`.
pub fn parse_answer(text: &str) -> Option<f64> {
  text.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
  #[serde(rename = "type")]
  pub problem_type: String,
  pub question: String,
  pub answer: f64,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub user_answer: Option<f64>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub is_correct: Option<bool>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Scoreboard {
  pub correct: u32,
  pub incorrect: u32,
  pub history: Vec<HistoryEntry>,
}

impl Scoreboard {
  pub fn new() -> Self {
    Self::default()
  }

  /// Add a freshly served problem to the history, still ungraded.
  pub fn record(&mut self, problem: &GeneratedProblem) {
    self.history.push(HistoryEntry {
      problem_type: problem.category.id().to_string(),
      question: render_text(&problem.question, Markup::Plain),
      answer: problem.answer,
      user_answer: None,
      is_correct: None,
    });
  }

  /// Grade the last recorded problem and bump the matching counter.
  /// Returns `None` if nothing was recorded.
  pub fn grade(&mut self, user_answer: f64) -> Option<bool> {
    let last = self.history.last_mut()?;
    let ok = is_correct(user_answer, last.answer);
    last.user_answer = Some(user_answer);
    last.is_correct = Some(ok);
    if ok {
      self.correct += 1;
    } else {
      self.incorrect += 1;
    }
    Some(ok)
  }

  pub fn answered(&self) -> u32 {
    self.correct + self.incorrect
  }

  pub fn reset(&mut self) {
    *self = Self::default();
  }
}

/// Draws categories so that every selected type comes up once per round,
/// in shuffled order.
#[derive(Clone, Debug)]
pub struct ProblemDeck {
  selected: Vec<Category>,
  queue: Vec<Category>,
}

impl ProblemDeck {
  /// An empty selection falls back to the topic's first category.
  pub fn new(topic: Topic, selected: Vec<Category>) -> Self {
    let selected = if selected.is_empty() {
      topic.categories().into_iter().take(1).collect()
    } else {
      selected
    };
    Self { selected, queue: Vec::new() }
  }

  pub fn draw<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Category {
    if self.queue.is_empty() {
      self.queue = self.selected.clone();
      polygon::shuffle(&mut self.queue, rng);
    }
    // `selected` is never empty, so the refill above always leaves something.
    self.queue.pop().unwrap_or(self.selected[0])
  }

  pub fn selected(&self) -> &[Category] {
    &self.selected
  }
}
