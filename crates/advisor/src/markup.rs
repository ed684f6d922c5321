//! The two inline conventions advice text uses: `**emphasis**` and `- ` list
//! items. Everything else is plain text.

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Span {
  Plain(String),
  Emphasis(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdviceLine {
  Paragraph(Vec<Span>),
  ListItem(Vec<Span>),
}

pub fn parse_advice(advice: &str) -> Vec<AdviceLine> {
  advice
    .split('\n')
    .map(|line| match line.trim().strip_prefix("- ") {
      Some(item) => AdviceLine::ListItem(parse_spans(item)),
      None => AdviceLine::Paragraph(parse_spans(line)),
    })
    .collect()
}

/// Odd segments between `**` markers are emphasized. An unclosed marker
/// emphasizes the rest of the line.
pub fn parse_spans(line: &str) -> Vec<Span> {
  line
    .split("**")
    .enumerate()
    .filter(|(_, part)| !part.is_empty())
    .map(|(i, part)| {
      if i % 2 == 1 {
        Span::Emphasis(part.to_string())
      } else {
        Span::Plain(part.to_string())
      }
    })
    .collect()
}

impl AdviceLine {
  pub fn spans(&self) -> &[Span] {
    match self {
      AdviceLine::Paragraph(spans) | AdviceLine::ListItem(spans) => spans,
    }
  }

  /// Text with the markers stripped
  pub fn plain_text(&self) -> String {
    self
      .spans()
      .iter()
      .map(|span| match span {
        Span::Plain(text) | Span::Emphasis(text) => text.as_str(),
      })
      .collect()
  }
}
