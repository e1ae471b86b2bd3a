//! Interior/exterior angle problems (nine categories, two of them algebra).
//!
//! Each category samples a side count, derives everything else from it, and
//! writes the worked solution as equation chains that `GeneratedProblem::verify`
//! can re-evaluate.

use std::ops::RangeInclusive;

use rand::Rng;
use tracing::debug;

use crate::domain::{AngleCategory, Category, GeneratedProblem, RichText, Step, Unit, EXACT_TOLERANCE};
use crate::error::GenerateError;
use crate::expr::{num, signed_sum, var, Expr};
use crate::polygon::{self, article, interior_sum, polygon_name, random_int, round};

const DECIMALS: u32 = 2;

/// Bounds for every synthesized angle in FIND_MISSING_ANGLE and
/// FIND_X_FROM_EXPRESSIONS.
const MIN_ANGLE: i64 = 30;
const MAX_ANGLE: i64 = 175;

/// Range of the unknown in FIND_X_FROM_EXPRESSIONS.
const X_RANGE: RangeInclusive<i64> = 10..=29;
const MAX_COEFF: i64 = 5;

/// Generate a problem for a category id such as `"SUM_INTERIOR"`.
pub fn generate<R: Rng + ?Sized>(id: &str, rng: &mut R) -> Result<GeneratedProblem, GenerateError> {
  let category: AngleCategory = id.parse()?;
  Ok(generate_category(category, rng))
}

pub fn generate_category<R: Rng + ?Sized>(category: AngleCategory, rng: &mut R) -> GeneratedProblem {
  let n = polygon::default_sides(rng, category.is_algebra());
  build(category, n, rng)
}

/// Generate with a fixed side count, which must lie in [`side_range`].
pub fn generate_with_sides<R: Rng + ?Sized>(
  category: AngleCategory,
  n: u32,
  rng: &mut R,
) -> Result<GeneratedProblem, GenerateError> {
  let range = side_range(category);
  if !range.contains(&n) {
    return Err(GenerateError::Precondition(format!(
      "{} needs {}..={} sides, got {n}",
      category.id(),
      range.start(),
      range.end()
    )));
  }
  Ok(build(category, n, rng))
}

pub fn side_range(category: AngleCategory) -> RangeInclusive<u32> {
  if category.is_algebra() {
    polygon::ALGEBRA_SIDES[0]..=polygon::ALGEBRA_SIDES[polygon::ALGEBRA_SIDES.len() - 1]
  } else {
    polygon::MIN_SIDES..=polygon::MAX_SIDES
  }
}

fn build<R: Rng + ?Sized>(category: AngleCategory, n: u32, rng: &mut R) -> GeneratedProblem {
  let (question, answer, solution, extra) = match category {
    AngleCategory::SumInterior => sum_interior(n),
    AngleCategory::EachInterior => each_interior(n),
    AngleCategory::FindNFromInterior => find_n_from_interior(n),
    AngleCategory::FindNFromSum => find_n_from_sum(n),
    AngleCategory::SumExterior => sum_exterior(n),
    AngleCategory::EachExterior => each_exterior(n),
    AngleCategory::FindNFromExterior => find_n_from_exterior(n),
    AngleCategory::FindMissingAngle => find_missing_angle(n, rng),
    AngleCategory::FindXFromExpressions => find_x_from_expressions(n, rng),
  };

  debug!(target: "problem", category = category.id(), n, answer, "angle problem generated");

  let mut bindings = vec![("n", n as f64)];
  bindings.extend(extra);
  GeneratedProblem {
    category: Category::Angle(category),
    question,
    answer,
    solution,
    bindings,
  }
}

type Parts = (RichText, f64, Vec<Step>, Option<(&'static str, f64)>);

/// `(n - 2) * 180` with the side count written out.
fn sum_formula(n: u32) -> Expr {
  num(n).minus(num(2.0)).group().times(num(180.0))
}

/// Chain ending in the side count, with `≈` when the shown angle was rounded.
fn sides_from_quotient(quotient: Expr, n: u32) -> Step {
  let exact = quotient
    .eval(&|_: &str| None)
    .map_or(false, |v| (v - n as f64).abs() <= EXACT_TOLERANCE);
  let terms = vec![quotient, num(n)];
  if exact { Step::chain(terms, Unit::Sides) } else { Step::approx(terms, Unit::Sides) }
}

fn sum_interior(n: u32) -> Parts {
  let name = polygon_name(n);
  let sum = interior_sum(n);
  let question = RichText::new().plain(format!(
    "What is the sum of the interior angles of {} {name} (a polygon with {n} sides)?",
    article(n)
  ));
  let solution = vec![
    Step::note(
      RichText::new()
        .plain("The formula for the sum of interior angles is ")
        .strong("(n - 2) * 180")
        .plain(", where 'n' is the number of sides."),
    ),
    Step::say(format!("For {} {name} (n = {n}):", article(n))),
    Step::chain(
      vec![sum_formula(n), num((n - 2) as f64).times(num(180.0)), num(sum as f64)],
      Unit::Degrees,
    ),
  ];
  (question, sum as f64, solution, None)
}

fn each_interior(n: u32) -> Parts {
  let name = polygon_name(n);
  let sum = interior_sum(n);
  let angle = round(sum as f64 / n as f64, DECIMALS);
  let question = RichText::new()
    .plain("What is the measure of each interior angle of a ")
    .strong("regular")
    .plain(format!(" {name} (a regular polygon with {n} sides)?"));
  let solution = vec![
    Step::say("First, find the sum of interior angles: (n - 2) * 180."),
    Step::chain(vec![sum_formula(n), num(sum as f64)], Unit::Degrees),
    Step::say("For a regular polygon, divide the sum by the number of sides, 'n'."),
    Step::chain(vec![num(sum as f64).over(num(n)), num(angle)], Unit::Degrees),
  ];
  (question, angle, solution, None)
}

fn find_n_from_interior(n: u32) -> Parts {
  let interior = round(interior_sum(n) as f64 / n as f64, DECIMALS);
  let exterior = round(180.0 - interior, DECIMALS);
  let question = RichText::new().plain(format!(
    "A regular polygon has an interior angle of {}°. How many sides does it have?",
    num(interior)
  ));
  let solution = vec![
    Step::say(format!(
      "Each interior angle is {}°. Each exterior angle is 180° - Interior Angle.",
      num(interior)
    )),
    Step::chain(vec![num(180.0).minus(num(interior)), num(exterior)], Unit::Degrees),
    Step::say("The sum of exterior angles is always 360°. The number of sides 'n' is 360° / Exterior Angle."),
    sides_from_quotient(num(360.0).over(num(exterior)), n),
  ];
  (question, n as f64, solution, None)
}

fn find_n_from_sum(n: u32) -> Parts {
  let sum = interior_sum(n);
  let question = RichText::new().plain(format!(
    "The sum of the interior angles of a polygon is {sum}°. How many sides does it have?"
  ));
  let mut solution = vec![Step::say("The formula is Sum = (n - 2) * 180.")];
  solution.extend(solve_sum_for_sides(n));
  (question, n as f64, solution, None)
}

/// Invert Sum = (n - 2) * 180 step by step, ending at `n` sides.
pub(crate) fn solve_sum_for_sides(n: u32) -> Vec<Step> {
  let sum = interior_sum(n);
  let quotient = sum / 180;
  let n_minus_two = var("n").minus(num(2.0));
  vec![
    Step::chain(vec![num(sum as f64), n_minus_two.clone().group().times(num(180.0))], Unit::None),
    Step::chain(vec![num(sum as f64).over(num(180.0)), n_minus_two.clone()], Unit::None),
    Step::chain(vec![num(quotient as f64), n_minus_two], Unit::None),
    Step::chain(vec![var("n"), num(quotient as f64).plus(num(2.0)), num(n)], Unit::Sides),
  ]
}

fn sum_exterior(n: u32) -> Parts {
  let name = polygon_name(n);
  let question = RichText::new().plain(format!(
    "What is the sum of the exterior angles of {} {name} (a polygon with {n} sides)?",
    article(n)
  ));
  let solution = vec![
    Step::note(
      RichText::new()
        .plain("The sum of the exterior angles of ")
        .strong("any")
        .plain(" convex polygon is 360°, regardless of the number of sides."),
    ),
    Step::led(format!("Sum of exterior angles of the {name} ="), vec![num(360.0)], Unit::Degrees),
  ];
  (question, 360.0, solution, None)
}

fn each_exterior(n: u32) -> Parts {
  let name = polygon_name(n);
  let angle = round(360.0 / n as f64, DECIMALS);
  let question = RichText::new()
    .plain("What is the measure of each exterior angle of a ")
    .strong("regular")
    .plain(format!(" {name} (a regular polygon with {n} sides)?"));
  let solution = vec![
    Step::say("The sum of exterior angles is 360°. For a regular polygon with 'n' sides, divide 360 by 'n'."),
    Step::chain(vec![num(360.0).over(num(n)), num(angle)], Unit::Degrees),
  ];
  (question, angle, solution, None)
}

fn find_n_from_exterior(n: u32) -> Parts {
  let exterior = round(360.0 / n as f64, DECIMALS);
  let question = RichText::new().plain(format!(
    "A regular polygon has an exterior angle of {}°. How many sides does it have?",
    num(exterior)
  ));
  let solution = vec![
    Step::say("The sum of exterior angles is 360°. The number of sides 'n' is 360° / Exterior Angle."),
    sides_from_quotient(num(360.0).over(num(exterior)), n),
  ];
  (question, n as f64, solution, None)
}

/// Sample `n - 1` known angles so that every angle, the unknown included,
/// stays within [30°, 175°] and all `n` add up to (n - 2) * 180.
fn sample_known_angles<R: Rng + ?Sized>(n: u32, rng: &mut R) -> Vec<i64> {
  let mut remaining = interior_sum(n);
  let mut known = Vec::with_capacity(n as usize - 1);
  for i in 0..n - 1 {
    // angles still to place after this one, the unknown included
    let later = (n - 1 - i) as i64;
    let lo = MIN_ANGLE.max(remaining - later * MAX_ANGLE);
    let hi = MAX_ANGLE.min(remaining - later * MIN_ANGLE);
    let angle = random_int(rng, lo, hi);
    known.push(angle);
    remaining -= angle;
  }
  known
}

fn find_missing_angle<R: Rng + ?Sized>(n: u32, rng: &mut R) -> Parts {
  let name = polygon_name(n);
  let sum = interior_sum(n);
  let known = sample_known_angles(n, rng);
  let known_sum: i64 = known.iter().sum();
  let missing = sum - known_sum;

  let mut slots: Vec<Option<i64>> = known.iter().copied().map(Some).collect();
  slots.push(None);
  polygon::shuffle(&mut slots, rng);

  let listed = slots
    .iter()
    .map(|s| match s {
      Some(a) => format!("{a}°"),
      None => "x°".to_string(),
    })
    .collect::<Vec<_>>()
    .join(", ");
  let shown_known: Vec<i64> = slots.iter().flatten().copied().collect();

  let question = RichText::new()
    .plain(format!("{} {name} ({n} sides) has interior angles measuring: ", capitalize(article(n))))
    .strong(listed)
    .plain(". Find the value of x.");
  let solution = vec![
    Step::say(format!("The sum of interior angles for a {n}-sided polygon is (n - 2) * 180.")),
    Step::chain(vec![sum_formula(n), num(sum as f64)], Unit::Degrees),
    Step::led(
      "Sum of the known angles:",
      vec![signed_sum(&shown_known), num(known_sum as f64)],
      Unit::Degrees,
    ),
    Step::led(
      "Set up the equation:",
      vec![num(known_sum as f64).plus(var("x")), num(sum as f64)],
      Unit::None,
    ),
    Step::chain(
      vec![var("x"), num(sum as f64).minus(num(known_sum as f64)), num(missing as f64)],
      Unit::Degrees,
    ),
  ];
  (question, missing as f64, solution, Some(("x", missing as f64)))
}

/// `cx + k` written the classroom way: `x` for c = 1, `- 7` for negative k, no `+ 0`.
fn linear(coeff: i64, constant: i64) -> Expr {
  let term = if coeff == 1 { var("x") } else { num(coeff as f64).beside(var("x")) };
  match constant {
    0 => term,
    k if k < 0 => term.minus(num(-k as f64)),
    k => term.plus(num(k as f64)),
  }
}

fn find_x_from_expressions<R: Rng + ?Sized>(n: u32, rng: &mut R) -> Parts {
  let sum = interior_sum(n);
  let x = random_int(rng, *X_RANGE.start(), *X_RANGE.end());

  // Each expression evaluates to a plausible angle at the chosen x.
  let mut angles = sample_known_angles(n, rng);
  angles.push(sum - angles.iter().sum::<i64>());
  let mut pairs: Vec<(i64, i64)> = angles
    .iter()
    .map(|&angle| {
      let near = (angle / x).clamp(1, MAX_COEFF);
      let coeff = random_int(rng, (near - 1).max(1), near);
      (coeff, angle - coeff * x)
    })
    .collect();
  polygon::shuffle(&mut pairs, rng);

  let coeffs: Vec<i64> = pairs.iter().map(|(c, _)| *c).collect();
  let consts: Vec<i64> = pairs.iter().map(|(_, k)| *k).collect();
  let total_coeff: i64 = coeffs.iter().sum();
  let total_const: i64 = consts.iter().sum();
  let rhs = sum - total_const;

  let expressions: Vec<Expr> = pairs.iter().map(|&(c, k)| linear(c, k).group()).collect();
  let listed = expressions.iter().map(|e| e.to_string()).collect::<Vec<_>>().join(", ");
  let added = expressions
    .iter()
    .cloned()
    .reduce(|acc, e| acc.plus(e))
    .unwrap_or_else(|| num(0.0));
  let moved = if total_const < 0 {
    num(sum as f64).plus(num(-total_const as f64))
  } else {
    num(sum as f64).minus(num(total_const as f64))
  };

  let question = RichText::new()
    .plain(format!("The interior angles of a {n}-sided polygon are given by the expressions: "))
    .strong(listed)
    .plain(". Find the value of x.");
  let solution = vec![
    Step::led(
      format!("The sum of interior angles for a {n}-sided polygon is"),
      vec![sum_formula(n), num(sum as f64)],
      Unit::Degrees,
    ),
    Step::led("Add all the expressions:", vec![added, num(sum as f64)], Unit::None),
    Step::led(
      "Combine like terms:",
      vec![
        signed_sum(&coeffs).group().beside(var("x")).plus(signed_sum(&consts).group()),
        num(sum as f64),
      ],
      Unit::None,
    ),
    Step::chain(vec![linear_total(total_coeff, total_const), num(sum as f64)], Unit::None),
    Step::chain(
      vec![num(total_coeff as f64).beside(var("x")), moved, num(rhs as f64)],
      Unit::None,
    ),
    Step::chain(
      vec![var("x"), num(rhs as f64).over(num(total_coeff as f64)), num(x as f64)],
      Unit::None,
    ),
  ];
  (question, x as f64, solution, Some(("x", x as f64)))
}

/// `Cx + K` for the combined equation; unlike [`linear`] the coefficient is always shown.
fn linear_total(coeff: i64, constant: i64) -> Expr {
  let term = num(coeff as f64).beside(var("x"));
  if constant < 0 { term.minus(num(-constant as f64)) } else { term.plus(num(constant as f64)) }
}

fn capitalize(word: &str) -> String {
  let mut chars = word.chars();
  match chars.next() {
    Some(first) => first.to_uppercase().chain(chars).collect(),
    None => String::new(),
  }
}
