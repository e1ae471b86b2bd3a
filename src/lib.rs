//! Polygon Practice · problem generation and quiz backend
//!
//! The library half generates randomized polygon geometry problems (interior
//! and exterior angles, diagonal counts) with worked solutions that can be
//! re-checked mechanically, and keeps score for practice and challenge runs.
//! The server half (`routes`, `logic`, `state`) exposes it over HTTP and
//! WebSocket for the browser front end.

pub mod angles;
pub mod config;
pub mod diagonals;
pub mod domain;
pub mod error;
pub mod expr;
pub mod logic;
pub mod polygon;
pub mod protocol;
pub mod render;
pub mod routes;
pub mod score;
pub mod session;
pub mod state;
pub mod submit;
pub mod telemetry;

use rand::Rng;

use crate::domain::{Category, GeneratedProblem};
use crate::error::GenerateError;

/// Generate one problem of any category.
pub fn generate<R: Rng + ?Sized>(category: Category, rng: &mut R) -> Result<GeneratedProblem, GenerateError> {
  match category {
    Category::Angle(cat) => Ok(angles::generate_category(cat, rng)),
    Category::Diagonal(cat) => diagonals::generate_category(cat, rng),
  }
}
