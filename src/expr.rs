//! Arithmetic expression trees used by worked solutions.
//!
//! An `Expr` renders exactly the way a line of classroom working is written
//! ("(6 - 2) * 180", "n(n - 3) / 2", "(3 ± sqrt(81)) / 2") and can be
//! evaluated again, which is how generated solutions are checked.

use std::fmt;

use serde::Serialize;

use crate::polygon::round;

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Expr {
  Num { value: f64 },
  Var { name: &'static str },
  Add { lhs: Box<Expr>, rhs: Box<Expr> },
  Sub { lhs: Box<Expr>, rhs: Box<Expr> },
  /// Written with an explicit `*`.
  Mul { lhs: Box<Expr>, rhs: Box<Expr> },
  /// Implicit product written by juxtaposition: `3x`, `n(n - 3)`.
  Juxt { lhs: Box<Expr>, rhs: Box<Expr> },
  Div { lhs: Box<Expr>, rhs: Box<Expr> },
  /// `a ± b`; evaluates as `a + b` (the positive root).
  PlusMinus { lhs: Box<Expr>, rhs: Box<Expr> },
  Group { inner: Box<Expr> },
  Square { base: Box<Expr> },
  Sqrt { inner: Box<Expr> },
}

pub fn num(value: impl Into<f64>) -> Expr {
  Expr::Num { value: value.into() }
}

pub fn var(name: &'static str) -> Expr {
  Expr::Var { name }
}

pub fn sqrt(inner: Expr) -> Expr {
  Expr::Sqrt { inner: Box::new(inner) }
}

/// `a + b + c ...`, writing negative terms as subtraction.
/// An empty slice yields `0`.
pub fn signed_sum(terms: &[i64]) -> Expr {
  let mut iter = terms.iter();
  let first = match iter.next() {
    Some(t) => num(*t as f64),
    None => return num(0.0),
  };
  iter.fold(first, |acc, &t| {
    if t < 0 { acc.minus(num(-t as f64)) } else { acc.plus(num(t as f64)) }
  })
}

impl Expr {
  pub fn plus(self, rhs: Expr) -> Expr {
    Expr::Add { lhs: Box::new(self), rhs: Box::new(rhs) }
  }

  pub fn minus(self, rhs: Expr) -> Expr {
    Expr::Sub { lhs: Box::new(self), rhs: Box::new(rhs) }
  }

  pub fn times(self, rhs: Expr) -> Expr {
    Expr::Mul { lhs: Box::new(self), rhs: Box::new(rhs) }
  }

  pub fn beside(self, rhs: Expr) -> Expr {
    Expr::Juxt { lhs: Box::new(self), rhs: Box::new(rhs) }
  }

  pub fn over(self, rhs: Expr) -> Expr {
    Expr::Div { lhs: Box::new(self), rhs: Box::new(rhs) }
  }

  pub fn plus_minus(self, rhs: Expr) -> Expr {
    Expr::PlusMinus { lhs: Box::new(self), rhs: Box::new(rhs) }
  }

  pub fn group(self) -> Expr {
    Expr::Group { inner: Box::new(self) }
  }

  pub fn squared(self) -> Expr {
    Expr::Square { base: Box::new(self) }
  }

  /// True if the expression mentions no variables.
  pub fn is_closed(&self) -> bool {
    match self {
      Expr::Num { .. } => true,
      Expr::Var { .. } => false,
      Expr::Add { lhs, rhs }
      | Expr::Sub { lhs, rhs }
      | Expr::Mul { lhs, rhs }
      | Expr::Juxt { lhs, rhs }
      | Expr::Div { lhs, rhs }
      | Expr::PlusMinus { lhs, rhs } => lhs.is_closed() && rhs.is_closed(),
      Expr::Group { inner } | Expr::Sqrt { inner } => inner.is_closed(),
      Expr::Square { base } => base.is_closed(),
    }
  }

  /// Evaluate with `lookup` resolving variables. `None` on an unbound
  /// variable, a division by zero or the root of a negative number.
  pub fn eval(&self, lookup: &dyn Fn(&str) -> Option<f64>) -> Option<f64> {
    let v = match self {
      Expr::Num { value } => *value,
      Expr::Var { name } => lookup(name)?,
      Expr::Add { lhs, rhs } | Expr::PlusMinus { lhs, rhs } => lhs.eval(lookup)? + rhs.eval(lookup)?,
      Expr::Sub { lhs, rhs } => lhs.eval(lookup)? - rhs.eval(lookup)?,
      Expr::Mul { lhs, rhs } | Expr::Juxt { lhs, rhs } => lhs.eval(lookup)? * rhs.eval(lookup)?,
      Expr::Div { lhs, rhs } => {
        let den = rhs.eval(lookup)?;
        if den == 0.0 {
          return None;
        }
        lhs.eval(lookup)? / den
      }
      Expr::Group { inner } => inner.eval(lookup)?,
      Expr::Square { base } => base.eval(lookup)?.powi(2),
      Expr::Sqrt { inner } => {
        let v = inner.eval(lookup)?;
        if v < 0.0 {
          return None;
        }
        v.sqrt()
      }
    };
    Some(v)
  }
}

/// Display a number the way the worked solutions print it: at most two
/// decimals, no trailing zeros, no ".0" on whole numbers.
pub fn fmt_number(value: f64) -> String {
  if !value.is_finite() {
    return value.to_string();
  }
  format!("{}", round(value, 2))
}

impl fmt::Display for Expr {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Expr::Num { value } => f.write_str(&fmt_number(*value)),
      Expr::Var { name } => f.write_str(name),
      Expr::Add { lhs, rhs } => write!(f, "{lhs} + {rhs}"),
      Expr::Sub { lhs, rhs } => write!(f, "{lhs} - {rhs}"),
      Expr::Mul { lhs, rhs } => write!(f, "{lhs} * {rhs}"),
      Expr::Juxt { lhs, rhs } => write!(f, "{lhs}{rhs}"),
      Expr::Div { lhs, rhs } => write!(f, "{lhs} / {rhs}"),
      Expr::PlusMinus { lhs, rhs } => write!(f, "{lhs} ± {rhs}"),
      Expr::Group { inner } => write!(f, "({inner})"),
      Expr::Square { base } => write!(f, "{base}²"),
      Expr::Sqrt { inner } => write!(f, "sqrt({inner})"),
    }
  }
}
