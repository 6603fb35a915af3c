use serde::Serialize;

/// A run of text inside a block
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "text", rename_all = "snake_case")]
pub enum InlineSpan {
    Plain(String),
    Bold(String),
}

impl InlineSpan {
    pub fn text(&self) -> &str {
        match self {
            InlineSpan::Plain(text) | InlineSpan::Bold(text) => text,
        }
    }

    pub fn is_bold(&self) -> bool {
        matches!(self, InlineSpan::Bold(_))
    }
}

/// Block-level elements produced by the renderer
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Block {
    Heading {
        /// Always 1, 2 or 3
        level: u8,
        content: Vec<InlineSpan>,
    },
    List {
        items: Vec<Vec<InlineSpan>>,
    },
    /// Cells are kept raw; view layers inline-format them.
    Table {
        headers: Vec<String>,
        rows: Vec<Vec<String>>,
    },
    Rule,
    Paragraph {
        content: Vec<InlineSpan>,
    },
}

/// Concatenate the text of a span sequence, dropping formatting.
pub fn plain_text(spans: &[InlineSpan]) -> String {
    spans.iter().map(InlineSpan::text).collect()
}
