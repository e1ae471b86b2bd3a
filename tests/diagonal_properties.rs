//! Seeded property checks over the diagonal generators, including the
//! forward/inverse round trip between side and diagonal counts.

use polygon_practice::diagonals;
use polygon_practice::domain::{DiagonalCategory, GeneratedProblem};
use polygon_practice::error::GenerateError;
use polygon_practice::polygon::{sides_from_diagonals, GOOD_REGULAR_SIDES};
use polygon_practice::render::{render_solution, Markup};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn each_problem(category: DiagonalCategory, mut check: impl FnMut(&GeneratedProblem)) {
  for seed in 0..1000 {
    let mut rng = StdRng::seed_from_u64(seed);
    let p = diagonals::generate_category(category, &mut rng).unwrap();
    assert_eq!(p.verify(), Ok(()), "seed {seed}: {}", p.question);
    check(&p);
  }
}

fn sides(p: &GeneratedProblem) -> i64 {
  p.binding("n").expect("n is always bound") as i64
}

/// First integer following `prefix` in `text`.
fn number_after(text: &str, prefix: &str) -> f64 {
  let start = text.find(prefix).expect("prefix present") + prefix.len();
  let digits: String = text[start..].chars().take_while(|c| c.is_ascii_digit() || *c == '.').collect();
  digits.parse().expect("numeric")
}

#[test]
fn forward_counts_follow_the_formula() {
  for cat in [DiagonalCategory::NToD, DiagonalCategory::SumToD, DiagonalCategory::DVertexToD] {
    each_problem(cat, |p| {
      let n = sides(p);
      assert!((4..=20).contains(&n));
      assert_eq!(p.answer, (n * (n - 3) / 2) as f64);
    });
  }
  for cat in [DiagonalCategory::IntToD, DiagonalCategory::ExtToD] {
    each_problem(cat, |p| {
      let n = sides(p);
      assert!(GOOD_REGULAR_SIDES.contains(&(n as u32)));
      assert_eq!(p.answer, (n * (n - 3) / 2) as f64);
    });
  }
}

#[test]
fn inverse_problems_recover_the_sides() {
  each_problem(DiagonalCategory::DToN, |p| {
    let q = p.question.to_string();
    let total = number_after(&q, "A polygon has ") as u64;
    assert_eq!(sides_from_diagonals(total).map(f64::from), Some(p.answer));
  });
  each_problem(DiagonalCategory::DVertexToN, |p| {
    let q = p.question.to_string();
    let per_vertex = number_after(&q, "A polygon has ");
    assert!(per_vertex >= 2.0);
    assert_eq!(per_vertex + 3.0, p.answer);
  });
}

#[test]
fn n_to_d_then_d_to_n_round_trips() {
  let mut rng = StdRng::seed_from_u64(0);
  for n in 4..=20 {
    let forward = diagonals::generate_with_sides(DiagonalCategory::NToD, n, &mut rng).unwrap();
    let back = diagonals::generate_with_sides(DiagonalCategory::DToN, n, &mut rng).unwrap();
    assert!(back.question.to_string().contains(&format!("has {} diagonals", forward.answer)));
    assert_eq!(back.answer, n as f64);
    assert_eq!(back.verify(), Ok(()));
  }
}

#[test]
fn nonagon_worked_example() {
  let mut rng = StdRng::seed_from_u64(9);
  let p = diagonals::generate_with_sides(DiagonalCategory::DToN, 9, &mut rng).unwrap();
  assert_eq!(p.question.to_string(), "A polygon has 27 diagonals. How many sides does it have?");
  let text = render_solution(&p.solution, Markup::Plain);
  assert!(text.contains("54 = n² - 3n"), "{text}");
  assert!(text.contains("(3 ± sqrt(225)) / 2"), "{text}");
  assert!(text.contains("(3 + 15) / 2 = 9 sides"), "{text}");
}

#[test]
fn unknown_and_unbuildable_requests_fail() {
  let mut rng = StdRng::seed_from_u64(1);
  assert_eq!(
    diagonals::generate("SUM_INTERIOR", &mut rng),
    Err(GenerateError::UnknownCategory("SUM_INTERIOR".into()))
  );
  assert!(matches!(
    diagonals::generate_with_sides(DiagonalCategory::IntToD, 7, &mut rng),
    Err(GenerateError::Precondition(_))
  ));
  assert!(matches!(
    diagonals::generate_with_sides(DiagonalCategory::DVertexToN, 4, &mut rng),
    Err(GenerateError::Precondition(_))
  ));
}
