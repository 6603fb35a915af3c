use std::sync::LazyLock;

use regex::Regex;

use crate::block::InlineSpan;

static BOLD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*\*(.*?)\*\*").expect("bold pattern is valid"));

/// Split a line into alternating plain and bold spans.
///
/// The result always has odd length: plain parts sit at even indices and bold
/// captures at odd ones. Empty plain parts (from leading, trailing or adjacent
/// bold markers) are kept so that the split can be reversed. An unmatched
/// `**` stays literal inside whichever plain part it falls into.
pub fn format_inline(line: &str) -> Vec<InlineSpan> {
    let mut spans = Vec::new();
    let mut last = 0;

    for caps in BOLD.captures_iter(line) {
        let (Some(whole), Some(inner)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        spans.push(InlineSpan::Plain(line[last..whole.start()].to_string()));
        spans.push(InlineSpan::Bold(inner.as_str().to_string()));
        last = whole.end();
    }

    spans.push(InlineSpan::Plain(line[last..].to_string()));
    spans
}
