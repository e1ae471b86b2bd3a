//! Seeded property checks over the angle generators: answers recomputed from
//! the question text alone, ranges honoured, worked solutions self-consistent.

use polygon_practice::angles;
use polygon_practice::domain::{AngleCategory, GeneratedProblem};
use polygon_practice::polygon::round;
use rand::rngs::StdRng;
use rand::SeedableRng;

const SEEDS: u64 = 1000;

fn each_problem(category: AngleCategory, mut check: impl FnMut(u64, &GeneratedProblem)) {
  for seed in 0..SEEDS {
    let mut rng = StdRng::seed_from_u64(seed);
    let p = angles::generate_category(category, &mut rng);
    assert_eq!(p.verify(), Ok(()), "seed {seed}: {}", p.question);
    check(seed, &p);
  }
}

fn sides(p: &GeneratedProblem) -> u32 {
  p.binding("n").expect("n is always bound") as u32
}

/// The number immediately before the first `°` in `text`.
fn degrees_in(text: &str) -> f64 {
  let end = text.find('°').expect("question shows an angle");
  let start = text[..end]
    .rfind(|c: char| !(c.is_ascii_digit() || c == '.'))
    .map_or(0, |i| i + 1);
  text[start..end].parse().expect("angle is numeric")
}

/// The `{n}` of "... a {n}-sided polygon ...".
fn sided_count(text: &str) -> i64 {
  let end = text.find("-sided").expect("question names the side count");
  let start = text[..end].rfind(' ').map_or(0, |i| i + 1);
  text[start..end].parse().expect("side count is numeric")
}

/// The list between "...: " and ". Find the value of x.".
fn listed_items(text: &str) -> Vec<String> {
  let start = text.find(": ").expect("question lists items") + 2;
  let end = text.rfind(". Find the value of x.").expect("question asks for x");
  text[start..end].split(", ").map(str::to_string).collect()
}

#[test]
fn sums_and_single_angles_match_the_formulas() {
  each_problem(AngleCategory::SumInterior, |_, p| {
    let n = sides(p);
    assert!((3..=60).contains(&n));
    assert_eq!(p.answer, ((n - 2) * 180) as f64);
    assert!(p.question.to_string().contains(&format!("{n} sides")));
  });
  each_problem(AngleCategory::EachInterior, |_, p| {
    let n = sides(p) as f64;
    assert_eq!(p.answer, round((n - 2.0) * 180.0 / n, 2));
  });
  each_problem(AngleCategory::SumExterior, |_, p| assert_eq!(p.answer, 360.0));
  each_problem(AngleCategory::EachExterior, |_, p| {
    assert_eq!(p.answer, round(360.0 / sides(p) as f64, 2));
  });
}

#[test]
fn side_counts_are_recoverable_from_the_question() {
  each_problem(AngleCategory::FindNFromSum, |_, p| {
    let q = p.question.to_string();
    assert_eq!(degrees_in(&q) / 180.0 + 2.0, p.answer);
  });
  each_problem(AngleCategory::FindNFromInterior, |_, p| {
    let q = p.question.to_string();
    assert_eq!((360.0 / (180.0 - degrees_in(&q))).round(), p.answer, "{q}");
  });
  each_problem(AngleCategory::FindNFromExterior, |_, p| {
    let q = p.question.to_string();
    assert_eq!((360.0 / degrees_in(&q)).round(), p.answer, "{q}");
  });
}

#[test]
fn missing_angle_lists_plausible_angles() {
  each_problem(AngleCategory::FindMissingAngle, |seed, p| {
    let n = sides(p) as i64;
    assert!((3..=5).contains(&n));
    let items = listed_items(&p.question.to_string());
    assert_eq!(items.len() as i64, n, "seed {seed}");
    assert_eq!(items.iter().filter(|s| s.as_str() == "x°").count(), 1);

    let known: Vec<i64> = items
      .iter()
      .filter(|s| s.as_str() != "x°")
      .map(|s| s.trim_end_matches('°').parse().unwrap())
      .collect();
    let x = p.answer as i64;
    assert_eq!(p.answer, x as f64);
    for angle in known.iter().copied().chain([x]) {
      assert!((30..=175).contains(&angle), "seed {seed}: angle {angle} out of range");
    }
    assert_eq!(known.iter().sum::<i64>() + x, (n - 2) * 180);
  });
}

/// `(cx + k)`, `(x - k)`, `(cx)` into `(c, k)`.
fn parse_linear(item: &str) -> (i64, i64) {
  let inner = item.trim_start_matches('(').trim_end_matches(')');
  let mut parts = inner.split(' ');
  let term = parts.next().unwrap();
  let coeff = match term.trim_end_matches('x') {
    "" => 1,
    c => c.parse().unwrap(),
  };
  let constant = match (parts.next(), parts.next()) {
    (Some("+"), Some(k)) => k.parse().unwrap(),
    (Some("-"), Some(k)) => -k.parse::<i64>().unwrap(),
    (None, None) => 0,
    other => panic!("unexpected expression tail {other:?} in {item}"),
  };
  (coeff, constant)
}

#[test]
fn expressions_solve_to_the_stated_x() {
  each_problem(AngleCategory::FindXFromExpressions, |seed, p| {
    let q = p.question.to_string();
    let n = sided_count(&q);
    let items = listed_items(&q);
    assert_eq!(items.len() as i64, n, "seed {seed}");

    let pairs: Vec<(i64, i64)> = items.iter().map(|s| parse_linear(s)).collect();
    let total_coeff: i64 = pairs.iter().map(|(c, _)| c).sum();
    let total_const: i64 = pairs.iter().map(|(_, k)| k).sum();
    let rhs = (n - 2) * 180 - total_const;
    assert_eq!(rhs % total_coeff, 0, "seed {seed}: {q}");
    let x = rhs / total_coeff;
    assert!((10..=29).contains(&x));
    assert_eq!(p.answer, x as f64);
    assert_eq!(p.binding("x"), Some(x as f64));
    assert!(pairs.iter().all(|(c, _)| (1..=5).contains(c)));
  });
}

#[test]
fn expressions_evaluate_to_plausible_angles() {
  each_problem(AngleCategory::FindXFromExpressions, |seed, p| {
    let q = p.question.to_string();
    let n = sided_count(&q);
    let x = p.answer as i64;
    let angles: Vec<i64> = listed_items(&q)
      .iter()
      .map(|s| {
        let (c, k) = parse_linear(s);
        c * x + k
      })
      .collect();
    for (item, angle) in listed_items(&q).iter().zip(&angles) {
      assert!((30..=175).contains(angle), "seed {seed}: {item} is {angle}° at x = {x}");
    }
    assert_eq!(angles.iter().sum::<i64>(), (n - 2) * 180, "seed {seed}");
  });
}

#[test]
fn same_seed_same_problem() {
  for cat in AngleCategory::ALL {
    let a = angles::generate_category(cat, &mut StdRng::seed_from_u64(77));
    let b = angles::generate_category(cat, &mut StdRng::seed_from_u64(77));
    assert_eq!(a, b);
  }
}

#[test]
fn ids_round_trip_through_the_catalog() {
  let mut rng = StdRng::seed_from_u64(2);
  for d in polygon_practice::domain::angle_categories() {
    let p = angles::generate(d.id, &mut rng).unwrap();
    assert_eq!(p.category.id(), d.id);
  }
  assert!(angles::generate("n_to_d", &mut rng).is_err());
}
