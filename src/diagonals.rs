//! Diagonal problems: forward counts, recovering `n` from angle data first,
//! and inverse problems solved through the quadratic formula.

use std::ops::RangeInclusive;

use rand::Rng;
use tracing::debug;

use crate::angles::solve_sum_for_sides;
use crate::domain::{Category, DiagonalCategory, GeneratedProblem, RichText, Step, Unit};
use crate::error::GenerateError;
use crate::expr::{num, sqrt, var, Expr};
use crate::polygon::{self, diagonal_count, good_regular_side_count, interior_sum, isqrt, random_int, round};

const FORWARD_SIDES: RangeInclusive<u32> = 4..=20;
const VERTEX_SIDES: RangeInclusive<u32> = 5..=20;

/// Generate a problem for a category id such as `"d_to_n"`.
pub fn generate<R: Rng + ?Sized>(id: &str, rng: &mut R) -> Result<GeneratedProblem, GenerateError> {
  let category: DiagonalCategory = id.parse()?;
  generate_category(category, rng)
}

pub fn generate_category<R: Rng + ?Sized>(
  category: DiagonalCategory,
  rng: &mut R,
) -> Result<GeneratedProblem, GenerateError> {
  let n = match category {
    DiagonalCategory::IntToD | DiagonalCategory::ExtToD => good_regular_side_count(rng),
    DiagonalCategory::DVertexToN | DiagonalCategory::DVertexToD => {
      random_int(rng, *VERTEX_SIDES.start() as i64, *VERTEX_SIDES.end() as i64) as u32
    }
    _ => random_int(rng, *FORWARD_SIDES.start() as i64, *FORWARD_SIDES.end() as i64) as u32,
  };
  build(category, n)
}

/// Generate with a fixed side count, which the category must accept.
///
/// Diagonal problems are fully determined by `n`, so `_rng` goes unused. It is
/// taken to match [`crate::angles::generate_with_sides`], whose algebra
/// categories do draw from it.
pub fn generate_with_sides<R: Rng + ?Sized>(
  category: DiagonalCategory,
  n: u32,
  _rng: &mut R,
) -> Result<GeneratedProblem, GenerateError> {
  if !accepts_sides(category, n) {
    return Err(GenerateError::Precondition(format!(
      "{} cannot be built from {n} sides",
      category.id()
    )));
  }
  build(category, n)
}

pub fn accepts_sides(category: DiagonalCategory, n: u32) -> bool {
  match category {
    DiagonalCategory::IntToD | DiagonalCategory::ExtToD => polygon::GOOD_REGULAR_SIDES.contains(&n),
    DiagonalCategory::DVertexToN | DiagonalCategory::DVertexToD => VERTEX_SIDES.contains(&n),
    _ => FORWARD_SIDES.contains(&n),
  }
}

fn build(category: DiagonalCategory, n: u32) -> Result<GeneratedProblem, GenerateError> {
  let total = diagonal_count(n);
  let (question, answer, solution) = match category {
    DiagonalCategory::NToD => n_to_d(n),
    DiagonalCategory::SumToD => sum_to_d(n),
    DiagonalCategory::IntToD => int_to_d(n),
    DiagonalCategory::ExtToD => ext_to_d(n),
    DiagonalCategory::DToN => d_to_n(n)?,
    DiagonalCategory::DVertexToN => d_vertex_to_n(n),
    DiagonalCategory::DVertexToD => d_vertex_to_d(n),
  };

  debug!(target: "problem", category = category.id(), n, answer, "diagonal problem generated");

  Ok(GeneratedProblem {
    category: Category::Diagonal(category),
    question,
    answer,
    solution,
    bindings: vec![
      ("n", n as f64),
      ("D", total as f64),
      ("d", n as f64 - 3.0),
      ("Sum", interior_sum(n) as f64),
    ],
  })
}

type Parts = (RichText, f64, Vec<Step>);

/// n(n - 3) / 2 over the variable `n`.
fn diagonal_formula() -> Expr {
  var("n").beside(var("n").minus(num(3.0)).group()).over(num(2.0))
}

/// "Formula: D = n(n - 3) / 2" then the substitution down to D.
fn count_diagonals(n: u32) -> Vec<Step> {
  let total = diagonal_count(n);
  let product = n as i64 * (n as i64 - 3);
  vec![
    Step::led("Formula:", vec![var("D"), diagonal_formula()], Unit::None),
    Step::chain(
      vec![
        var("D"),
        num(n).beside(num(n).minus(num(3.0)).group()).over(num(2.0)),
        num(n).beside(num(n as f64 - 3.0).group()).over(num(2.0)),
        num(product as f64).over(num(2.0)),
        num(total as f64),
      ],
      Unit::None,
    ),
  ]
}

fn n_to_d(n: u32) -> Parts {
  let total = diagonal_count(n);
  let question = RichText::new().plain(format!("A polygon has {n} sides. How many diagonals does it have?"));
  (question, total as f64, count_diagonals(n))
}

fn sum_to_d(n: u32) -> Parts {
  let total = diagonal_count(n);
  let sum = interior_sum(n);
  let question = RichText::new().plain(format!(
    "The sum of the interior angles of a polygon is {sum}°. How many diagonals does it have?"
  ));
  let mut solution = vec![
    Step::heading("Step 1: Find the number of sides (n)."),
    Step::led("Formula:", vec![var("Sum"), var("n").minus(num(2.0)).group().times(num(180.0))], Unit::None),
  ];
  solution.extend(solve_sum_for_sides(n));
  solution.push(Step::heading("Step 2: Find the number of diagonals (D)."));
  solution.extend(count_diagonals(n));
  (question, total as f64, solution)
}

fn int_to_d(n: u32) -> Parts {
  let total = diagonal_count(n);
  let interior = round(interior_sum(n) as f64 / n as f64, 2);
  let exterior = round(180.0 - interior, 2);
  let question = RichText::new().plain(format!(
    "Each interior angle of a regular polygon is {}°. How many diagonals does it have?",
    num(interior)
  ));
  let interior_n = || num(interior).beside(var("n"));
  let mut solution = vec![
    Step::heading("Step 1: Find the number of sides (n)."),
    Step::say("Method A: Using Interior Angle Formula"),
    Step::led(
      "Int. Angle =",
      vec![var("n").minus(num(2.0)).group().times(num(180.0)).over(var("n"))],
      Unit::None,
    ),
    Step::chain(
      vec![num(interior).times(var("n")), var("n").minus(num(2.0)).group().times(num(180.0))],
      Unit::None,
    ),
    Step::chain(vec![interior_n(), num(180.0).beside(var("n")).minus(num(360.0))], Unit::None),
    Step::chain(vec![num(360.0), num(180.0).beside(var("n")).minus(interior_n())], Unit::None),
    Step::chain(
      vec![num(360.0), var("n").beside(num(180.0).minus(num(interior)).group())],
      Unit::None,
    ),
    Step::chain(vec![num(360.0), var("n").beside(num(exterior).group())], Unit::None),
    Step::chain(vec![var("n"), num(360.0).over(num(exterior)), num(n)], Unit::None),
    Step::say("Method B: Using Exterior Angle"),
    Step::led(
      "Ext. Angle = 180 - Int. Angle =",
      vec![num(180.0).minus(num(interior)), num(exterior)],
      Unit::Degrees,
    ),
    Step::led("n = 360 / Ext. Angle =", vec![num(360.0).over(num(exterior)), num(n)], Unit::None),
    Step::heading("Step 2: Find the number of diagonals (D)."),
  ];
  solution.extend(count_diagonals(n));
  (question, total as f64, solution)
}

fn ext_to_d(n: u32) -> Parts {
  let total = diagonal_count(n);
  let exterior = round(360.0 / n as f64, 2);
  let question = RichText::new().plain(format!(
    "Each exterior angle of a regular polygon is {}°. How many diagonals does it have?",
    num(exterior)
  ));
  let mut solution = vec![
    Step::heading("Step 1: Find the number of sides (n)."),
    Step::say("Formula: n = 360 / Ext. Angle"),
    Step::chain(vec![var("n"), num(360.0).over(num(exterior)), num(n)], Unit::None),
    Step::heading("Step 2: Find the number of diagonals (D)."),
  ];
  solution.extend(count_diagonals(n));
  (question, total as f64, solution)
}

fn d_to_n(n: u32) -> Result<Parts, GenerateError> {
  let total = diagonal_count(n);
  let twice = 2 * total;
  let disc = 9 + 8 * total;
  let root = isqrt(disc as u64);
  // The root must be exact and recover the sampled n; never display a drifted value.
  let recovered = polygon::sides_from_diagonals(total as u64);
  if recovered != Some(n) || root * root != disc as u64 {
    return Err(GenerateError::Precondition(format!(
      "{total} diagonals do not recover {n} sides"
    )));
  }

  let question = RichText::new().plain(format!("A polygon has {total} diagonals. How many sides does it have?"));
  let n_sq_minus_3n = || var("n").squared().minus(num(3.0).beside(var("n")));
  let quadratic = |inner: Expr| num(3.0).plus_minus(inner).group().over(num(2.0));
  let solution = vec![
    Step::heading("Step 1: Set up the formula."),
    Step::led("Formula:", vec![var("D"), diagonal_formula()], Unit::None),
    Step::chain(vec![num(total as f64), diagonal_formula()], Unit::None),
    Step::chain(
      vec![num(twice as f64), var("n").beside(var("n").minus(num(3.0)).group())],
      Unit::None,
    ),
    Step::chain(vec![num(twice as f64), n_sq_minus_3n()], Unit::None),
    Step::heading("Step 2: Solve the quadratic equation."),
    Step::chain(vec![n_sq_minus_3n().minus(num(twice as f64)), num(0.0)], Unit::None),
    Step::say("You can solve this by factoring or using the quadratic formula:"),
    Step::say("n = (-b ± sqrt(b² - 4ac)) / 2a"),
    Step::chain(
      vec![
        var("n"),
        quadratic(sqrt(
          num(-3.0)
            .group()
            .squared()
            .minus(num(4.0).beside(num(1.0).group()).beside(num(-twice as f64).group())),
        )),
        quadratic(sqrt(num(9.0).plus(num((8 * total) as f64)))),
        quadratic(sqrt(num(disc as f64))),
        quadratic(num(root as f64)),
      ],
      Unit::None,
    ),
    Step::say("Since sides (n) must be positive, we take the '+' root:"),
    Step::chain(
      vec![
        var("n"),
        num(3.0).plus(num(root as f64)).group().over(num(2.0)),
        num(n),
      ],
      Unit::Sides,
    ),
  ];
  Ok((question, n as f64, solution))
}

/// "d = n - 3" solved for n.
fn sides_from_vertex(n: u32) -> Vec<Step> {
  let per_vertex = n as f64 - 3.0;
  vec![
    Step::say("Formula: Diagonals from one vertex (d) = n - 3"),
    Step::chain(vec![num(per_vertex), var("n").minus(num(3.0))], Unit::None),
    Step::chain(vec![var("n"), num(per_vertex).plus(num(3.0)), num(n)], Unit::Sides),
  ]
}

fn vertex_question(n: u32, ask: &str) -> RichText {
  RichText::new().plain(format!(
    "A polygon has {} diagonals coming from a single vertex. {ask}",
    n - 3
  ))
}

fn d_vertex_to_n(n: u32) -> Parts {
  let mut solution = vec![Step::heading("Step 1: Set up the formula.")];
  let mut inverse = sides_from_vertex(n);
  let last = inverse.pop();
  solution.extend(inverse);
  solution.push(Step::heading("Step 2: Solve for n."));
  solution.extend(last);
  (vertex_question(n, "How many sides does it have?"), n as f64, solution)
}

fn d_vertex_to_d(n: u32) -> Parts {
  let total = diagonal_count(n);
  let mut solution = vec![Step::heading("Step 1: Find the number of sides (n).")];
  solution.extend(sides_from_vertex(n));
  solution.push(Step::heading("Step 2: Find the total number of diagonals (D)."));
  solution.extend(count_diagonals(n));
  (vertex_question(n, "How many total diagonals does it have?"), total as f64, solution)
}

#[cfg(test)]
mod tests {
  use super::*;
  use rand::rngs::StdRng;
  use rand::SeedableRng;

  #[test]
  fn vertex_diagonals_of_a_decagon() {
    let mut rng = StdRng::seed_from_u64(3);
    let p = generate_with_sides(DiagonalCategory::DVertexToN, 10, &mut rng).unwrap();
    assert!(p.question.to_string().starts_with("A polygon has 7 diagonals"));
    assert_eq!(p.answer, 10.0);
    assert_eq!(p.binding("d"), Some(7.0));
    assert_eq!(p.verify(), Ok(()));
  }

  #[test]
  fn fixed_sides_ignore_the_generator() {
    for category in DiagonalCategory::ALL {
      let a = generate_with_sides(category, 8, &mut StdRng::seed_from_u64(1)).unwrap();
      let b = generate_with_sides(category, 8, &mut StdRng::seed_from_u64(2)).unwrap();
      assert_eq!(a, b, "{}", category.id());
    }
  }

  #[test]
  fn hexagon_has_nine_diagonals() {
    let mut rng = StdRng::seed_from_u64(3);
    let p = generate_with_sides(DiagonalCategory::NToD, 6, &mut rng).unwrap();
    assert_eq!(p.answer, 9.0);
    assert_eq!(p.verify(), Ok(()));
  }

  #[test]
  fn quadratic_solution_shows_exact_root() {
    let mut rng = StdRng::seed_from_u64(3);
    let p = generate_with_sides(DiagonalCategory::DToN, 6, &mut rng).unwrap();
    assert_eq!(p.answer, 6.0);
    let rendered: Vec<String> = p
      .solution
      .iter()
      .filter_map(|s| match s {
        Step::Chain { terms, .. } => Some(terms.iter().map(|t| t.to_string()).collect::<Vec<_>>().join(" = ")),
        _ => None,
      })
      .collect();
    assert!(rendered.iter().any(|l| l.contains("(3 ± sqrt(81)) / 2")), "{rendered:?}");
    assert!(rendered.iter().any(|l| l.contains("(3 ± 9) / 2")), "{rendered:?}");
    assert_eq!(p.verify(), Ok(()));
  }

  #[test]
  fn unknown_and_out_of_range_requests_fail() {
    let mut rng = StdRng::seed_from_u64(3);
    assert_eq!(
      generate("NOT_A_REAL_ID", &mut rng),
      Err(GenerateError::UnknownCategory("NOT_A_REAL_ID".into()))
    );
    assert!(matches!(
      generate_with_sides(DiagonalCategory::IntToD, 7, &mut rng),
      Err(GenerateError::Precondition(_))
    ));
    assert!(matches!(
      generate_with_sides(DiagonalCategory::DVertexToD, 4, &mut rng),
      Err(GenerateError::Precondition(_))
    ));
  }

  #[test]
  fn every_category_verifies() {
    let mut rng = StdRng::seed_from_u64(17);
    for category in DiagonalCategory::ALL {
      for _ in 0..200 {
        let p = generate_category(category, &mut rng).unwrap();
        assert_eq!(p.category, Category::Diagonal(category));
        assert_eq!(p.verify(), Ok(()), "{} failed: {:?}", category.id(), p);
      }
    }
  }
}
