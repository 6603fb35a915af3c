use std::sync::LazyLock;

use regex::Regex;

use crate::block::{Block, InlineSpan};
use crate::inline::format_inline;

static SEPARATOR_CELL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*:?-+:?\s*$").expect("separator pattern is valid"));

/// Parse generated text into a list of blocks.
///
/// Single forward pass with one line of lookahead. Never fails: every line
/// ends up in some block or, when blank, in none.
pub fn parse(text: &str) -> Vec<Block> {
    let lines: Vec<&str> = text.split('\n').collect();
    let mut state = ParseState::default();

    let mut i = 0;
    while i < lines.len() {
        let line = lines[i].trim();
        let next = lines.get(i + 1).map(|l| l.trim());

        if is_table_line(line) && next.is_some_and(is_table_separator) {
            state.flush_list();
            // Header and separator
            i += 2;
            let start = i;
            while i < lines.len() && is_table_line(lines[i].trim()) {
                i += 1;
            }
            let table = build_table(line, &lines[start..i]);
            state.blocks.push(table);
            continue;
        }

        if let Some(item) = line.strip_prefix("- ") {
            state.list_items.push(format_inline(item));
        } else {
            state.flush_list();
            if let Some(block) = classify(line) {
                state.blocks.push(block);
            }
        }
        i += 1;
    }

    state.flush_list();
    state.blocks
}

#[derive(Default)]
struct ParseState {
    blocks: Vec<Block>,
    // Consecutive "- " lines waiting to become one list
    list_items: Vec<Vec<InlineSpan>>,
}

impl ParseState {
    fn flush_list(&mut self) {
        if !self.list_items.is_empty() {
            let items = std::mem::take(&mut self.list_items);
            self.blocks.push(Block::List { items });
        }
    }
}

/// Classify a trimmed non-list, non-table line.
fn classify(line: &str) -> Option<Block> {
    // Longest heading marker first: "### x" also starts with "# ".
    if let Some(rest) = line.strip_prefix("### ") {
        Some(heading(3, rest))
    } else if let Some(rest) = line.strip_prefix("## ") {
        Some(heading(2, rest))
    } else if let Some(rest) = line.strip_prefix("# ") {
        Some(heading(1, rest))
    } else if line == "---" {
        Some(Block::Rule)
    } else if line.is_empty() {
        None
    } else {
        Some(Block::Paragraph {
            content: format_inline(line),
        })
    }
}

fn heading(level: u8, rest: &str) -> Block {
    Block::Heading {
        level,
        content: format_inline(rest),
    }
}

fn is_table_line(line: &str) -> bool {
    line.starts_with('|') && line.ends_with('|')
}

fn is_table_separator(line: &str) -> bool {
    if !is_table_line(line) {
        return false;
    }
    let cells = split_cells(line);
    !cells.is_empty() && cells.iter().all(|cell| SEPARATOR_CELL.is_match(cell))
}

/// Split a table line on `|`, dropping the segments outside the outer pipes.
fn split_cells(line: &str) -> Vec<&str> {
    let parts: Vec<&str> = line.split('|').collect();
    if parts.len() < 2 {
        return Vec::new();
    }
    parts[1..parts.len() - 1].to_vec()
}

fn trimmed_cells(line: &str) -> Vec<String> {
    split_cells(line)
        .into_iter()
        .map(|cell| cell.trim().to_string())
        .collect()
}

fn build_table(header: &str, body: &[&str]) -> Block {
    let headers = trimmed_cells(header);
    let mut rows = Vec::with_capacity(body.len());

    for line in body {
        let row = trimmed_cells(line.trim());
        // Ragged rows are dropped rather than padded
        if row.len() == headers.len() {
            rows.push(row);
        } else {
            tracing::trace!(
                expected = headers.len(),
                found = row.len(),
                "dropping ragged table row"
            );
        }
    }

    Block::Table { headers, rows }
}
