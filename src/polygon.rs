//! Polygon helpers shared by both problem generators: naming, rounding,
//! shuffling and side-count sampling.
//!
//! Every sampling helper takes the random source explicitly so callers (and
//! tests) decide between `thread_rng()` and a seeded `StdRng`.

use rand::seq::SliceRandom;
use rand::Rng;

/// Canonical names for 3..=12 sides.
const POLYGON_NAMES: [(u32, &str); 10] = [
  (3, "triangle"),
  (4, "quadrilateral"),
  (5, "pentagon"),
  (6, "hexagon"),
  (7, "heptagon"),
  (8, "octagon"),
  (9, "nonagon"),
  (10, "decagon"),
  (11, "undecagon"),
  (12, "dodecagon"),
];

/// Side counts whose interior and exterior angles come out clean
/// (at most two decimals, in practice whole degrees).
pub const GOOD_REGULAR_SIDES: [u32; 9] = [5, 6, 8, 9, 10, 12, 15, 18, 20];

/// Side counts used by the algebra categories.
pub const ALGEBRA_SIDES: [u32; 3] = [3, 4, 5];

pub const MIN_SIDES: u32 = 3;
pub const MAX_SIDES: u32 = 60;

/// Name for a polygon with `n` sides, e.g. "hexagon", or "{n}-gon" outside the table.
pub fn polygon_name(n: u32) -> String {
  POLYGON_NAMES
    .iter()
    .find(|(sides, _)| *sides == n)
    .map(|(_, name)| name.to_string())
    .unwrap_or_else(|| format!("{n}-gon"))
}

/// Indefinite article for a polygon name: "an octagon", "an 11-gon", "a hexagon".
pub fn article(n: u32) -> &'static str {
  let name = polygon_name(n);
  let vowel = name.starts_with(['a', 'e', 'i', 'o', 'u']);
  // "eight...", "eleven", "eighteen"
  let spoken_vowel = name.starts_with('8') || n == 11 || n == 18;
  if vowel || spoken_vowel { "an" } else { "a" }
}

/// Round half-up to `decimals` fractional digits.
///
/// The shift by `10^decimals` happens on the shortest decimal representation
/// of `value` (the same digits `Display` would print), so inputs such as
/// `2.005`, whose binary value sits just below the tie, still round up.
///
/// # Panics
/// Panics if `value` is NaN or infinite.
pub fn round(value: f64, decimals: u32) -> f64 {
  assert!(value.is_finite(), "round: value must be finite, got {value}");

  let shifted = shift_decimal(value, decimals as i32);
  // Values this large carry no fractional digits.
  if !shifted.is_finite() {
    return value;
  }
  let floor = shifted.floor();
  let rounded = if shifted - floor >= 0.5 { floor + 1.0 } else { floor };
  let out = shift_decimal(rounded, -(decimals as i32));
  // Avoid handing out -0.0 for small negatives.
  if out == 0.0 { 0.0 } else { out }
}

/// Multiply by `10^exp` by rewriting the decimal exponent of the shortest
/// round-trip representation, then parsing back.
fn shift_decimal(value: f64, exp: i32) -> f64 {
  let repr = format!("{value:e}");
  let (mantissa, current) = match repr.split_once('e') {
    Some((m, e)) => (m, e.parse::<i32>().unwrap_or(0)),
    None => (repr.as_str(), 0),
  };
  format!("{mantissa}e{}", current + exp)
    .parse::<f64>()
    .unwrap_or(value * 10f64.powi(exp))
}

/// Shuffle `items` in place (Fisher-Yates) and hand the same slice back.
pub fn shuffle<'a, T, R: Rng + ?Sized>(items: &'a mut [T], rng: &mut R) -> &'a mut [T] {
  items.shuffle(rng);
  items
}

/// Uniform integer in `[min, max]`.
///
/// # Panics
/// Panics if `min > max`.
pub fn random_int<R: Rng + ?Sized>(rng: &mut R, min: i64, max: i64) -> i64 {
  assert!(min <= max, "random_int: empty range [{min}, {max}]");
  rng.gen_range(min..=max)
}

/// Side count for a problem: one of 3, 4, 5 in algebra mode, else uniform in `[min, max]`.
pub fn random_sides<R: Rng + ?Sized>(rng: &mut R, algebra: bool, min: u32, max: u32) -> u32 {
  if algebra {
    return ALGEBRA_SIDES[rng.gen_range(0..ALGEBRA_SIDES.len())];
  }
  random_int(rng, min as i64, max as i64) as u32
}

/// Side count in the default range 3..=60 (or 3..=5 in algebra mode).
pub fn default_sides<R: Rng + ?Sized>(rng: &mut R, algebra: bool) -> u32 {
  random_sides(rng, algebra, MIN_SIDES, MAX_SIDES)
}

/// A side count from [`GOOD_REGULAR_SIDES`].
pub fn good_regular_side_count<R: Rng + ?Sized>(rng: &mut R) -> u32 {
  let idx = random_int(rng, 0, GOOD_REGULAR_SIDES.len() as i64 - 1) as usize;
  GOOD_REGULAR_SIDES[idx]
}

/// (n - 2) * 180
pub fn interior_sum(n: u32) -> i64 {
  (n as i64 - 2) * 180
}

/// n(n - 3) / 2
pub fn diagonal_count(n: u32) -> i64 {
  let n = n as i64;
  n * (n - 3) / 2
}

/// Integer square root (floor), exact for every `u64`.
pub fn isqrt(value: u64) -> u64 {
  let mut r = (value as f64).sqrt() as u64;
  while r > 0 && r.checked_mul(r).map_or(true, |sq| sq > value) {
    r -= 1;
  }
  while (r + 1).checked_mul(r + 1).map_or(false, |sq| sq <= value) {
    r += 1;
  }
  r
}

/// Invert D = n(n - 3) / 2 through the positive root n = (3 + sqrt(9 + 8D)) / 2.
///
/// Returns `None` when D does not belong to a polygon with an integer side count.
pub fn sides_from_diagonals(diagonals: u64) -> Option<u32> {
  let disc = 9 + 8 * diagonals;
  let root = isqrt(disc);
  if root * root != disc || (3 + root) % 2 != 0 {
    return None;
  }
  let n = (3 + root) / 2;
  u32::try_from(n).ok().filter(|n| *n >= MIN_SIDES)
}
