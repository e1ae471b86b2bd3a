//! A quiz session: practice or a fixed-length challenge over a selection of
//! problem types, with score bookkeeping and the data for a score card.

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::domain::{Category, GeneratedProblem, Step, Topic};
use crate::error::SessionError;
use crate::score::{parse_answer, ProblemDeck, Scoreboard};
use crate::submit::ScoreSubmission;

/// Questions in a challenge unless configured otherwise.
pub const DEFAULT_CHALLENGE_LENGTH: u32 = 10;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
  /// Free practice: a wrong answer shows the solution, a right one moves on.
  /// After a miss the next problem repeats the missed type.
  Practice,
  /// A fixed number of questions, then a score card.
  Challenge,
}

/// Who is taking a challenge.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
  #[serde(default)] pub first_name: String,
  #[serde(default)] pub last_name: String,
  #[serde(default)] pub class_period: String,
}

impl Student {
  pub fn is_complete(&self) -> bool {
    [&self.first_name, &self.last_name, &self.class_period]
      .iter()
      .all(|s| !s.trim().is_empty())
  }
}

/// What the client picks before starting.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSettings {
  pub topic: Topic,
  pub mode: Mode,
  /// Category ids; must belong to `topic`.
  pub problem_types: Vec<String>,
  #[serde(default)]
  pub student: Student,
}

/// Result of grading one answer.
#[derive(Clone, Debug, PartialEq)]
pub struct AnswerOutcome {
  pub correct: bool,
  pub expected: f64,
  /// Worked solution, shown only after a wrong answer.
  pub solution: Option<Vec<Step>>,
  /// Set once the last challenge question has been graded.
  pub finished: bool,
}

/// What Show Answer hands back.
#[derive(Clone, Debug, PartialEq)]
pub struct RevealOutcome {
  pub answer: f64,
  pub solution: Vec<Step>,
}

#[derive(Debug)]
pub struct Session {
  pub id: String,
  pub topic: Topic,
  pub mode: Mode,
  pub student: Student,
  challenge_length: u32,
  deck: ProblemDeck,
  board: Scoreboard,
  current: Option<GeneratedProblem>,
  awaiting_answer: bool,
  /// Practice only: the type to serve again after a miss.
  retry: Option<Category>,
  finished: bool,
}

impl Session {
  pub fn start(settings: SessionSettings, challenge_length: u32) -> Result<Self, SessionError> {
    if settings.problem_types.is_empty() {
      return Err(SessionError::NoProblemTypes);
    }
    if settings.mode == Mode::Challenge && !settings.student.is_complete() {
      return Err(SessionError::MissingIdentity);
    }
    let selected = settings
      .problem_types
      .iter()
      .map(|id| settings.topic.category(id))
      .collect::<Result<Vec<Category>, _>>()?;

    let session = Self {
      id: Uuid::new_v4().to_string(),
      topic: settings.topic,
      mode: settings.mode,
      student: settings.student,
      challenge_length: challenge_length.max(1),
      deck: ProblemDeck::new(settings.topic, selected),
      board: Scoreboard::new(),
      current: None,
      awaiting_answer: false,
      retry: None,
      finished: false,
    };
    info!(
      target: "problem",
      session = %session.id,
      topic = session.topic.label(),
      mode = ?session.mode,
      types = session.deck.selected().len(),
      "Session started"
    );
    Ok(session)
  }

  /// Serve the next problem and add it to the history. Practice repeats a
  /// missed type once; otherwise the type comes from the deck.
  pub fn next_problem<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<&GeneratedProblem, SessionError> {
    if self.finished {
      return Err(SessionError::Finished);
    }
    if self.mode == Mode::Challenge && self.awaiting_answer {
      return Err(SessionError::AnswerPending);
    }
    let category = match self.retry.take() {
      Some(c) => c,
      None => self.deck.draw(rng),
    };
    let problem = crate::generate(category, rng)?;
    self.board.record(&problem);
    self.awaiting_answer = true;
    Ok(self.current.insert(problem))
  }

  /// Grade what the student typed against the open problem.
  pub fn submit(&mut self, text: &str) -> Result<AnswerOutcome, SessionError> {
    let given = parse_answer(text).ok_or(SessionError::InvalidAnswer)?;
    let problem = match (&self.current, self.awaiting_answer) {
      (Some(p), true) => p,
      _ => return Err(SessionError::NoOpenProblem),
    };
    let correct = self.board.grade(given).ok_or(SessionError::NoOpenProblem)?;
    let expected = problem.answer;
    let solution = (!correct).then(|| problem.solution.clone());
    self.awaiting_answer = false;
    if self.mode == Mode::Practice {
      self.retry = (!correct).then_some(problem.category);
    }

    if self.mode == Mode::Challenge && self.board.answered() >= self.challenge_length {
      self.finished = true;
      info!(
        target: "problem",
        session = %self.id,
        correct = self.board.correct,
        total = self.challenge_length,
        "Challenge completed"
      );
    }
    Ok(AnswerOutcome { correct, expected, solution, finished: self.finished })
  }

  /// Show Answer: give up on the open practice problem. It stays ungraded,
  /// and the next problem repeats its type as after a wrong answer.
  pub fn reveal(&mut self) -> Result<RevealOutcome, SessionError> {
    if self.mode != Mode::Practice {
      return Err(SessionError::RevealUnavailable);
    }
    let problem = match (&self.current, self.awaiting_answer) {
      (Some(p), true) => p,
      _ => return Err(SessionError::NoOpenProblem),
    };
    self.awaiting_answer = false;
    self.retry = Some(problem.category);
    info!(target: "problem", session = %self.id, problem_type = problem.category.id(), "Answer revealed");
    Ok(RevealOutcome { answer: problem.answer, solution: problem.solution.clone() })
  }

  pub fn scoreboard(&self) -> &Scoreboard {
    &self.board
  }

  /// The problem types this session draws from.
  pub fn selected(&self) -> &[Category] {
    self.deck.selected()
  }

  pub fn current(&self) -> Option<&GeneratedProblem> {
    self.current.as_ref()
  }

  pub fn challenge_length(&self) -> u32 {
    self.challenge_length
  }

  /// 1-based position of the open question within a challenge.
  pub fn question_number(&self) -> u32 {
    self.board.history.len() as u32
  }

  pub fn is_finished(&self) -> bool {
    self.finished
  }

  /// A challenge whose every question has been graded.
  pub fn is_complete(&self) -> bool {
    self.mode == Mode::Challenge && self.board.answered() >= self.challenge_length
  }

  /// End the session early. The tally stays readable, but a challenge ended
  /// before its last question cannot be submitted.
  pub fn finish(&mut self) {
    self.finished = true;
    self.awaiting_answer = false;
    self.retry = None;
  }

  /// Score card data for a completed challenge.
  pub fn summary(&self) -> Result<ScoreSubmission, SessionError> {
    if !self.is_complete() {
      return Err(SessionError::NotFinished);
    }
    Ok(ScoreSubmission::new(&self.student, self.topic, &self.board, self.challenge_length))
  }
}
