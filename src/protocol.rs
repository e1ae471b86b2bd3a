//! Public protocol structs for WebSocket and HTTP endpoints (serde ready).
//! Keep this small and stable to evolve backend and frontend independently.

use serde::{Deserialize, Serialize};

use crate::domain::{Formula, GeneratedProblem, ProblemTypeDescriptor, Topic};
use crate::render::{render, Markup};
use crate::session::{Mode, SessionSettings};

/// Messages the client can send over WebSocket.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientWsMessage {
    Ping,
    /// `{"type":"start_session","topic":"angles","mode":"challenge","problemTypes":[...],"student":{...}}`
    StartSession(SessionSettings),
    NextProblem,
    SubmitAnswer {
        answer: String,
    },
    /// Give up on the open practice problem.
    ShowAnswer,
    EndSession,
    SubmitScore,
}

/// Messages the server sends back over WebSocket.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerWsMessage {
    Pong,
    SessionStarted {
        #[serde(rename = "sessionId")]
        session_id: String,
        topic: Topic,
        mode: Mode,
        #[serde(rename = "problemTypes")]
        problem_types: Vec<ProblemTypeDescriptor>,
        /// Only for challenges.
        #[serde(rename = "challengeLength", skip_serializing_if = "Option::is_none")]
        challenge_length: Option<u32>,
    },
    Problem {
        problem: ProblemOut,
        /// 1-based, only for challenges.
        #[serde(rename = "questionNumber", skip_serializing_if = "Option::is_none")]
        question_number: Option<u32>,
    },
    AnswerResult {
        correct: bool,
        expected: f64,
        /// Worked solution markup, sent only after a wrong answer.
        #[serde(skip_serializing_if = "Option::is_none")]
        solution: Option<String>,
        score: ScoreOut,
        finished: bool,
    },
    AnswerRevealed {
        answer: f64,
        solution: String,
    },
    SessionFinished {
        score: ScoreOut,
    },
    ScoreSubmitted {
        success: bool,
        message: String,
    },
    Error {
        message: String,
    },
}

/// DTO used by both WS and HTTP for problem delivery.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProblemOut {
    #[serde(rename = "type")]
    pub problem_type: String,
    pub topic: Topic,
    /// Inline HTML (`<strong>` emphasis).
    pub question: String,
    pub answer: f64,
    /// Inline HTML, lines separated by `<br>`.
    pub solution: String,
}

/// Convert a generated problem (internal) to the public DTO.
pub fn to_out(p: &GeneratedProblem) -> ProblemOut {
    let rendered = render(p, Markup::Html);
    ProblemOut {
        problem_type: p.category.id().to_string(),
        topic: p.category.topic(),
        question: rendered.question,
        answer: p.answer,
        solution: rendered.solution,
    }
}

/// Running tally shown in the header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScoreOut {
    pub correct: u32,
    pub incorrect: u32,
    /// "correct / total" once a challenge is complete.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<String>,
}

//
// HTTP request/response DTOs
//

#[derive(Debug, Default, Deserialize)]
pub struct TopicQuery {
    pub topic: Option<Topic>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ProblemQuery {
    pub topic: Option<Topic>,
    /// Category id; a random category of the topic when absent.
    #[serde(rename = "type")]
    pub problem_type: Option<String>,
}

#[derive(Serialize)]
pub struct CategoriesOut {
    pub topic: Topic,
    pub categories: Vec<ProblemTypeDescriptor>,
}

#[derive(Serialize)]
pub struct FormulasOut {
    pub topic: Topic,
    pub formulas: Vec<Formula>,
}

#[derive(Serialize)]
pub struct HealthOut {
    pub ok: bool,
}

#[derive(Debug, Serialize)]
pub struct ErrorOut {
    pub error: String,
}
