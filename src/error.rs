//! Error types for problem generation, solution checking and quiz sessions.

use thiserror::Error;

/// Failures of the problem generators.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerateError {
  /// The requested category id is not in the catalog.
  #[error("Unknown problem type: {0}")]
  UnknownCategory(String),

  /// An internal argument was out of its documented range.
  #[error("Precondition violated: {0}")]
  Precondition(String),
}

/// A worked solution whose arithmetic does not reproduce itself.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum VerifyError {
  #[error("step {step}: term {term} cannot be evaluated")]
  Unevaluable { step: usize, term: usize },

  #[error("step {step}: term {term} evaluates to {found}, expected {expected}")]
  Mismatch { step: usize, term: usize, expected: f64, found: f64 },

  #[error("solution ends at {found}, but the answer is {answer}")]
  WrongAnswer { answer: f64, found: f64 },

  #[error("solution has no equation steps")]
  Empty,
}

/// Misuse of a quiz session by the connected client.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
  #[error("No active session. Start a session first.")]
  NotStarted,

  #[error("Please select at least one problem type to start.")]
  NoProblemTypes,

  #[error("Please enter your name and class period for Challenge Mode.")]
  MissingIdentity,

  #[error("No problem is waiting for an answer.")]
  NoOpenProblem,

  #[error("Answer the current problem first.")]
  AnswerPending,

  #[error("This challenge is complete. Submit your score or start a new session.")]
  Finished,

  #[error("Please enter a valid number.")]
  InvalidAnswer,

  #[error("Show Answer is only available in practice mode.")]
  RevealUnavailable,

  #[error("Only a finished challenge can be submitted.")]
  NotFinished,

  #[error(transparent)]
  Generate(#[from] GenerateError),
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn unknown_category_names_the_id() {
    let err = GenerateError::UnknownCategory("NOT_A_REAL_ID".into());
    assert_eq!(err.to_string(), "Unknown problem type: NOT_A_REAL_ID");
  }

  #[test]
  fn session_error_wraps_generation_error() {
    let err: SessionError = GenerateError::UnknownCategory("x".into()).into();
    assert!(err.to_string().contains("Unknown problem type"));
  }
}
