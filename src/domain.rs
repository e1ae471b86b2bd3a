//! Domain models: topics and problem categories, the generated problem record
//! with its structured worked solution, and the formula reference sheet.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize, Serializer};

use crate::error::{GenerateError, VerifyError};
use crate::expr::Expr;

/// Which practice page a problem belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Topic {
  Angles,
  Diagonals,
}

impl Topic {
  pub fn label(self) -> &'static str {
    match self {
      Topic::Angles => "Angles",
      Topic::Diagonals => "Diagonals",
    }
  }

  /// Mode label reported with a finished challenge.
  pub fn challenge_label(self) -> String {
    format!("{} Challenge", self.label())
  }

  pub fn categories(self) -> Vec<Category> {
    match self {
      Topic::Angles => AngleCategory::ALL.iter().copied().map(Category::Angle).collect(),
      Topic::Diagonals => DiagonalCategory::ALL.iter().copied().map(Category::Diagonal).collect(),
    }
  }

  pub fn descriptors(self) -> Vec<ProblemTypeDescriptor> {
    self.categories().into_iter().map(|c| c.descriptor()).collect()
  }

  /// Resolve a category id within this topic.
  pub fn category(self, id: &str) -> Result<Category, GenerateError> {
    match self {
      Topic::Angles => id.parse().map(Category::Angle),
      Topic::Diagonals => id.parse().map(Category::Diagonal),
    }
  }
}

impl Default for Topic {
  fn default() -> Self { Topic::Angles }
}

/// Catalog entry for a selection UI.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct ProblemTypeDescriptor {
  pub id: &'static str,
  pub label: &'static str,
}

pub fn angle_categories() -> Vec<ProblemTypeDescriptor> {
  Topic::Angles.descriptors()
}

pub fn diagonal_categories() -> Vec<ProblemTypeDescriptor> {
  Topic::Diagonals.descriptors()
}

/// Angle practice categories.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AngleCategory {
  SumInterior,
  EachInterior,
  FindNFromInterior,
  FindNFromSum,
  SumExterior,
  EachExterior,
  FindNFromExterior,
  FindMissingAngle,
  FindXFromExpressions,
}

impl AngleCategory {
  pub const ALL: [AngleCategory; 9] = [
    AngleCategory::SumInterior,
    AngleCategory::EachInterior,
    AngleCategory::FindNFromInterior,
    AngleCategory::FindNFromSum,
    AngleCategory::SumExterior,
    AngleCategory::EachExterior,
    AngleCategory::FindNFromExterior,
    AngleCategory::FindMissingAngle,
    AngleCategory::FindXFromExpressions,
  ];

  pub fn id(self) -> &'static str {
    match self {
      AngleCategory::SumInterior => "SUM_INTERIOR",
      AngleCategory::EachInterior => "EACH_INTERIOR",
      AngleCategory::FindNFromInterior => "FIND_N_FROM_INTERIOR",
      AngleCategory::FindNFromSum => "FIND_N_FROM_SUM",
      AngleCategory::SumExterior => "SUM_EXTERIOR",
      AngleCategory::EachExterior => "EACH_EXTERIOR",
      AngleCategory::FindNFromExterior => "FIND_N_FROM_EXTERIOR",
      AngleCategory::FindMissingAngle => "FIND_MISSING_ANGLE",
      AngleCategory::FindXFromExpressions => "FIND_X_FROM_EXPRESSIONS",
    }
  }

  pub fn label(self) -> &'static str {
    match self {
      AngleCategory::SumInterior => "Sum of Interior Angles",
      AngleCategory::EachInterior => "Each Interior Angle (Regular)",
      AngleCategory::FindNFromInterior => "Find Sides from Interior Angle",
      AngleCategory::FindNFromSum => "Find Sides from Sum",
      AngleCategory::SumExterior => "Sum of Exterior Angles",
      AngleCategory::EachExterior => "Each Exterior Angle (Regular)",
      AngleCategory::FindNFromExterior => "Find Sides from Exterior Angle",
      AngleCategory::FindMissingAngle => "Find Missing Angle (Algebra)",
      AngleCategory::FindXFromExpressions => "Find X from Expressions (Algebra)",
    }
  }

  /// Algebra categories draw their polygon from 3..=5 sides.
  pub fn is_algebra(self) -> bool {
    matches!(self, AngleCategory::FindMissingAngle | AngleCategory::FindXFromExpressions)
  }
}

impl FromStr for AngleCategory {
  type Err = GenerateError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    AngleCategory::ALL
      .iter()
      .copied()
      .find(|c| c.id() == s)
      .ok_or_else(|| GenerateError::UnknownCategory(s.to_string()))
  }
}

/// Diagonal practice categories.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagonalCategory {
  NToD,
  SumToD,
  IntToD,
  ExtToD,
  DToN,
  DVertexToN,
  DVertexToD,
}

impl DiagonalCategory {
  pub const ALL: [DiagonalCategory; 7] = [
    DiagonalCategory::NToD,
    DiagonalCategory::SumToD,
    DiagonalCategory::IntToD,
    DiagonalCategory::ExtToD,
    DiagonalCategory::DToN,
    DiagonalCategory::DVertexToN,
    DiagonalCategory::DVertexToD,
  ];

  pub fn id(self) -> &'static str {
    match self {
      DiagonalCategory::NToD => "n_to_d",
      DiagonalCategory::SumToD => "sum_to_d",
      DiagonalCategory::IntToD => "int_to_d",
      DiagonalCategory::ExtToD => "ext_to_d",
      DiagonalCategory::DToN => "d_to_n",
      DiagonalCategory::DVertexToN => "d_vertex_to_n",
      DiagonalCategory::DVertexToD => "d_vertex_to_d",
    }
  }

  pub fn label(self) -> &'static str {
    match self {
      DiagonalCategory::NToD => "Diagonals from # of sides",
      DiagonalCategory::SumToD => "Diagonals from sum of angles",
      DiagonalCategory::IntToD => "Diagonals from interior angle",
      DiagonalCategory::ExtToD => "Diagonals from exterior angle",
      DiagonalCategory::DToN => "Sides from total diagonals",
      DiagonalCategory::DVertexToN => "Sides from vertex diagonals",
      DiagonalCategory::DVertexToD => "Total diagonals from vertex diagonals",
    }
  }
}

impl FromStr for DiagonalCategory {
  type Err = GenerateError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    DiagonalCategory::ALL
      .iter()
      .copied()
      .find(|c| c.id() == s)
      .ok_or_else(|| GenerateError::UnknownCategory(s.to_string()))
  }
}

/// Any category from either topic. Serializes as its id.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Category {
  Angle(AngleCategory),
  Diagonal(DiagonalCategory),
}

impl Category {
  pub fn id(self) -> &'static str {
    match self {
      Category::Angle(c) => c.id(),
      Category::Diagonal(c) => c.id(),
    }
  }

  pub fn label(self) -> &'static str {
    match self {
      Category::Angle(c) => c.label(),
      Category::Diagonal(c) => c.label(),
    }
  }

  pub fn topic(self) -> Topic {
    match self {
      Category::Angle(_) => Topic::Angles,
      Category::Diagonal(_) => Topic::Diagonals,
    }
  }

  pub fn descriptor(self) -> ProblemTypeDescriptor {
    ProblemTypeDescriptor { id: self.id(), label: self.label() }
  }
}

impl fmt::Display for Category {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.id())
  }
}

impl Serialize for Category {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(self.id())
  }
}

/// One run of question or prose text.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "text", rename_all = "snake_case")]
pub enum Span {
  Plain(String),
  /// Emphasised text (bold in the browser).
  Strong(String),
}

/// Text with inline emphasis, kept free of any markup syntax.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct RichText(pub Vec<Span>);

impl RichText {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn plain(mut self, text: impl Into<String>) -> Self {
    self.0.push(Span::Plain(text.into()));
    self
  }

  pub fn strong(mut self, text: impl Into<String>) -> Self {
    self.0.push(Span::Strong(text.into()));
    self
  }

  pub fn spans(&self) -> &[Span] {
    &self.0
  }
}

impl fmt::Display for RichText {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    for span in &self.0 {
      match span {
        Span::Plain(t) | Span::Strong(t) => f.write_str(t)?,
      }
    }
    Ok(())
  }
}

/// Unit printed after the final value of an equation chain.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Unit {
  #[default]
  None,
  Degrees,
  Sides,
}

impl Unit {
  pub fn suffix(self) -> &'static str {
    match self {
      Unit::None => "",
      Unit::Degrees => "°",
      Unit::Sides => " sides",
    }
  }
}

/// One line of a worked solution.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum Step {
  Heading { text: String },
  Note { text: RichText },
  /// `lead t0 = t1 = ... = tk`; the last term is the result of the line.
  /// With `approx` the last link reads `≈`.
  Chain {
    lead: Option<String>,
    terms: Vec<Expr>,
    unit: Unit,
    approx: bool,
  },
}

impl Step {
  pub fn heading(text: impl Into<String>) -> Self {
    Step::Heading { text: text.into() }
  }

  pub fn note(text: RichText) -> Self {
    Step::Note { text }
  }

  pub fn say(text: impl Into<String>) -> Self {
    Step::Note { text: RichText::new().plain(text) }
  }

  pub fn chain(terms: Vec<Expr>, unit: Unit) -> Self {
    Step::Chain { lead: None, terms, unit, approx: false }
  }

  pub fn led(lead: impl Into<String>, terms: Vec<Expr>, unit: Unit) -> Self {
    Step::Chain { lead: Some(lead.into()), terms, unit, approx: false }
  }

  pub fn approx(terms: Vec<Expr>, unit: Unit) -> Self {
    Step::Chain { lead: None, terms, unit, approx: true }
  }
}

/// Tolerance for an `=` link; displayed values carry two decimals.
pub const EXACT_TOLERANCE: f64 = 0.01;
/// Tolerance for an `≈` link, which only has to round to the right integer.
pub const APPROX_TOLERANCE: f64 = 0.5;

/// A freshly generated problem. Immutable once returned; UI state such as the
/// student's answer lives in copies kept by the session layer.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct GeneratedProblem {
  #[serde(rename = "type")]
  pub category: Category,
  pub question: RichText,
  pub answer: f64,
  pub solution: Vec<Step>,
  /// Values of the named unknowns (`n`, `x`, `D`, `d`) the derivation uses.
  #[serde(skip)]
  pub bindings: Vec<(&'static str, f64)>,
}

impl GeneratedProblem {
  pub fn binding(&self, name: &str) -> Option<f64> {
    self.bindings.iter().find(|(k, _)| *k == name).map(|(_, v)| *v)
  }

  /// Re-evaluate every equation chain of the solution. Each link must hold
  /// and the final line must land on `answer`.
  pub fn verify(&self) -> Result<(), VerifyError> {
    let lookup = |name: &str| self.binding(name);
    let mut last = None;

    for (step_idx, step) in self.solution.iter().enumerate() {
      let Step::Chain { terms, approx, .. } = step else { continue };
      let mut prev: Option<f64> = None;
      for (term_idx, term) in terms.iter().enumerate() {
        let value = term
          .eval(&lookup)
          .ok_or(VerifyError::Unevaluable { step: step_idx, term: term_idx })?;
        if let Some(p) = prev {
          let tol = if *approx && term_idx + 1 == terms.len() { APPROX_TOLERANCE } else { EXACT_TOLERANCE };
          if (value - p).abs() > tol {
            return Err(VerifyError::Mismatch { step: step_idx, term: term_idx, expected: p, found: value });
          }
        }
        prev = Some(value);
      }
      if prev.is_some() {
        last = prev;
      }
    }

    let found = last.ok_or(VerifyError::Empty)?;
    if (found - self.answer).abs() > EXACT_TOLERANCE {
      return Err(VerifyError::WrongAnswer { answer: self.answer, found });
    }
    Ok(())
  }
}

/// Entry of the quick-reference formula sheet.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Formula {
  pub name: &'static str,
  pub formula: &'static str,
}

pub fn formulas(topic: Topic) -> Vec<Formula> {
  match topic {
    Topic::Angles => vec![
      Formula { name: "Sum of Interior Angles", formula: "S = (n - 2) × 180°" },
      Formula { name: "Each Interior Angle (regular)", formula: "I = (n - 2) × 180° ÷ n" },
      Formula { name: "Sum of Exterior Angles", formula: "S = 360°" },
      Formula { name: "Each Exterior Angle (regular)", formula: "E = 360° ÷ n" },
      Formula { name: "Finding Sides from Exterior Angle", formula: "n = 360° ÷ E" },
      Formula { name: "Interior + Exterior Angle", formula: "I + E = 180°" },
    ],
    Topic::Diagonals => vec![
      Formula { name: "Total Number of Diagonals", formula: "D = n(n - 3) ÷ 2" },
      Formula { name: "Diagonals from One Vertex", formula: "d = n - 3" },
    ],
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::expr::{num, var};

  #[test]
  fn catalogs_have_unique_ids() {
    for topic in [Topic::Angles, Topic::Diagonals] {
      let ids: Vec<_> = topic.descriptors().iter().map(|d| d.id).collect();
      let mut dedup = ids.clone();
      dedup.sort();
      dedup.dedup();
      assert_eq!(ids.len(), dedup.len());
    }
    assert_eq!(Topic::Angles.descriptors().len(), 9);
    assert_eq!(Topic::Diagonals.descriptors().len(), 7);
  }

  #[test]
  fn ids_round_trip_through_from_str_and_serde() {
    for c in AngleCategory::ALL {
      assert_eq!(c.id().parse::<AngleCategory>(), Ok(c));
      assert_eq!(serde_json::to_string(&c).unwrap(), format!("\"{}\"", c.id()));
    }
    for c in DiagonalCategory::ALL {
      assert_eq!(c.id().parse::<DiagonalCategory>(), Ok(c));
      assert_eq!(serde_json::to_string(&c).unwrap(), format!("\"{}\"", c.id()));
    }
  }

  #[test]
  fn ids_do_not_cross_topics() {
    assert_eq!(
      Topic::Angles.category("n_to_d"),
      Err(GenerateError::UnknownCategory("n_to_d".into()))
    );
    assert_eq!(
      Topic::Diagonals.category("SUM_INTERIOR"),
      Err(GenerateError::UnknownCategory("SUM_INTERIOR".into()))
    );
  }

  fn problem(solution: Vec<Step>, answer: f64) -> GeneratedProblem {
    GeneratedProblem {
      category: Category::Angle(AngleCategory::SumInterior),
      question: RichText::new().plain("q"),
      answer,
      solution,
      bindings: vec![("n", 6.0)],
    }
  }

  #[test]
  fn verify_accepts_consistent_chains() {
    let p = problem(
      vec![
        Step::say("intro"),
        Step::chain(vec![var("n").minus(num(2.0)).group().times(num(180.0)), num(720.0)], Unit::Degrees),
      ],
      720.0,
    );
    assert_eq!(p.verify(), Ok(()));
    assert_eq!(serde_json::to_value(&p).unwrap()["type"], "SUM_INTERIOR");
  }

  #[test]
  fn verify_reports_broken_links_and_answers() {
    let broken = problem(vec![Step::chain(vec![num(4.0).times(num(180.0)), num(700.0)], Unit::None)], 700.0);
    assert!(matches!(broken.verify(), Err(VerifyError::Mismatch { step: 0, term: 1, .. })));

    let wrong = problem(vec![Step::chain(vec![num(720.0)], Unit::None)], 360.0);
    assert!(matches!(wrong.verify(), Err(VerifyError::WrongAnswer { .. })));

    let unbound = problem(vec![Step::chain(vec![var("x")], Unit::None)], 1.0);
    assert!(matches!(unbound.verify(), Err(VerifyError::Unevaluable { .. })));

    assert_eq!(problem(vec![Step::say("only prose")], 1.0).verify(), Err(VerifyError::Empty));
  }

  #[test]
  fn approx_link_allows_rounding_slack() {
    let p = problem(vec![Step::approx(vec![num(360.0).over(num(6.1)), num(59.0)], Unit::Sides)], 59.0);
    assert_eq!(p.verify(), Ok(()));
  }

  #[test]
  fn formula_sheets_cover_both_topics() {
    assert_eq!(formulas(Topic::Angles).len(), 6);
    assert!(formulas(Topic::Diagonals).iter().any(|f| f.formula == "d = n - 3"));
  }
}
