//! Turning structured questions and solutions into display text.
//!
//! `Html` produces the inline markup the browser drops into the page
//! (`<strong>` for emphasis, `<br>` between solution lines); `Plain` is used
//! for logs, history rows and tests.

use crate::domain::{GeneratedProblem, RichText, Span, Step};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Markup {
  Html,
  Plain,
}

impl Markup {
  fn strong(self, text: &str) -> String {
    match self {
      Markup::Html => format!("<strong>{}</strong>", escape(text)),
      Markup::Plain => text.to_string(),
    }
  }

  fn text(self, text: &str) -> String {
    match self {
      Markup::Html => escape(text),
      Markup::Plain => text.to_string(),
    }
  }

  fn line_break(self) -> &'static str {
    match self {
      Markup::Html => "<br>",
      Markup::Plain => "\n",
    }
  }
}

fn escape(text: &str) -> String {
  let mut out = String::with_capacity(text.len());
  for ch in text.chars() {
    match ch {
      '<' => out.push_str("&lt;"),
      '>' => out.push_str("&gt;"),
      '&' => out.push_str("&amp;"),
      '"' => out.push_str("&quot;"),
      _ => out.push(ch),
    }
  }
  out
}

pub fn render_text(text: &RichText, markup: Markup) -> String {
  text
    .spans()
    .iter()
    .map(|span| match span {
      Span::Plain(t) => markup.text(t),
      Span::Strong(t) => markup.strong(t),
    })
    .collect()
}

pub fn render_step(step: &Step, markup: Markup) -> String {
  match step {
    Step::Heading { text } => markup.strong(text),
    Step::Note { text } => render_text(text, markup),
    Step::Chain { lead, terms, unit, approx } => {
      let mut line = String::new();
      if let Some(lead) = lead {
        line.push_str(&markup.text(lead));
        line.push(' ');
      }
      let last = terms.len().saturating_sub(1);
      for (i, term) in terms.iter().enumerate() {
        if i > 0 {
          line.push_str(if *approx && i == last { " ≈ " } else { " = " });
        }
        if i == last {
          line.push_str(&markup.strong(&format!("{term}{}", unit.suffix())));
        } else {
          line.push_str(&markup.text(&term.to_string()));
        }
      }
      line
    }
  }
}

pub fn render_solution(steps: &[Step], markup: Markup) -> String {
  steps
    .iter()
    .map(|s| render_step(s, markup))
    .collect::<Vec<_>>()
    .join(markup.line_break())
}

/// Question and solution of a problem, rendered together.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Rendered {
  pub question: String,
  pub solution: String,
}

pub fn render(problem: &GeneratedProblem, markup: Markup) -> Rendered {
  Rendered {
    question: render_text(&problem.question, markup),
    solution: render_solution(&problem.solution, markup),
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::Unit;
  use crate::expr::num;

  #[test]
  fn emphasis_and_escaping_in_html() {
    let text = RichText::new().plain("a < b, ").strong("x & y");
    assert_eq!(render_text(&text, Markup::Html), "a &lt; b, <strong>x &amp; y</strong>");
    assert_eq!(render_text(&text, Markup::Plain), "a < b, x & y");
  }

  #[test]
  fn chains_emphasise_the_result_with_its_unit() {
    let step = Step::chain(
      vec![num(6.0).minus(num(2.0)).group().times(num(180.0)), num(4.0).times(num(180.0)), num(720.0)],
      Unit::Degrees,
    );
    assert_eq!(render_step(&step, Markup::Html), "(6 - 2) * 180 = 4 * 180 = <strong>720°</strong>");
    assert_eq!(render_step(&step, Markup::Plain), "(6 - 2) * 180 = 4 * 180 = 720°");
  }

  #[test]
  fn leads_and_approximate_links() {
    let step = Step::approx(vec![num(360.0).over(num(6.1)), num(59.0)], Unit::Sides);
    assert_eq!(render_step(&step, Markup::Plain), "360 / 6.1 ≈ 59 sides");

    let led = Step::led("Formula:", vec![num(1.0)], Unit::None);
    assert_eq!(render_step(&led, Markup::Plain), "Formula: 1");
  }

  #[test]
  fn solution_lines_are_joined() {
    let steps = vec![Step::heading("Step 1"), Step::say("go")];
    assert_eq!(render_solution(&steps, Markup::Html), "<strong>Step 1</strong><br>go");
    assert_eq!(render_solution(&steps, Markup::Plain), "Step 1\ngo");
  }
}
