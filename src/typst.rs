use typst_as_lib::TypstEngine;
use typst_as_lib::typst_kit_options::TypstKitFontOptions;
use typst_library::layout::PagedDocument;
use typst_pdf::PdfOptions;

use crate::block::{Block, InlineSpan};
use crate::config::Config;
use crate::error::ExportError;
use crate::inline::format_inline;

/// Lists up to this size are kept on one page
const UNBREAKABLE_LIST_ITEMS: usize = 5;

/// Convert blocks to Typst markup
pub fn blocks_to_typst(blocks: &[Block], config: &Config) -> String {
    let mut out = String::new();
    emit_preamble(config, &mut out);

    let mut i = 0;
    while i < blocks.len() {
        let block = &blocks[i];

        match block {
            Block::Heading { .. } => {
                // Keep heading with following content using a block that prevents breaks
                out.push_str("#block(breakable: false)[\n");
                emit_block(block, &mut out);

                if i + 1 < blocks.len() {
                    i += 1;
                    emit_block(&blocks[i], &mut out);
                }
                out.push_str("]\n\n");
            }
            _ => {
                emit_block(block, &mut out);
            }
        }

        i += 1;
    }

    out
}

/// Compile blocks to PDF bytes.
pub fn blocks_to_pdf(blocks: &[Block], config: &Config) -> Result<Vec<u8>, ExportError> {
    let typst_content = blocks_to_typst(blocks, config);
    tracing::debug!(bytes = typst_content.len(), "compiling typst document");

    let font_options = TypstKitFontOptions::new()
        .include_embedded_fonts(true)
        .include_system_fonts(false);

    let engine = TypstEngine::builder()
        .main_file(typst_content)
        .search_fonts_with(font_options)
        .build();

    let doc: PagedDocument = engine
        .compile()
        .output
        .map_err(|e| ExportError::Compile(format!("{:?}", e)))?;

    tracing::debug!(pages = doc.pages.len(), "typst document compiled");

    typst_pdf::pdf(&doc, &PdfOptions::default()).map_err(|e| ExportError::Pdf(format!("{:?}", e)))
}

fn emit_preamble(config: &Config, out: &mut String) {
    out.push_str(&format!(
        "#set page(paper: \"a4\", margin: {}",
        config.page.margin
    ));
    if config.page.numbers {
        out.push_str(", numbering: \"1\"");
    }
    out.push_str(")\n");

    out.push_str("#set text(font: \"");
    out.push_str(&escape_string(&config.font.family));
    out.push_str(&format!("\", size: {})\n", config.font.size));

    // Prevent widows/orphans
    out.push_str("#set par(linebreaks: \"optimized\", justify: true)\n\n");
}

fn emit_block(block: &Block, out: &mut String) {
    match block {
        Block::Heading { level, content } => {
            for _ in 0..*level {
                out.push('=');
            }
            out.push(' ');
            line_to_typst(content, out);
            out.push_str("\n\n");
        }
        Block::Paragraph { content } => {
            line_to_typst(content, out);
            out.push_str("\n\n");
        }
        Block::List { items } => {
            // Keep small lists together, allow large ones to break
            if items.len() <= UNBREAKABLE_LIST_ITEMS {
                out.push_str("#block(breakable: false)[\n");
                list_to_typst(items, out);
                out.push_str("]\n\n");
            } else {
                list_to_typst(items, out);
                out.push('\n');
            }
        }
        Block::Table { headers, rows } => {
            out.push_str("#block(breakable: false)[\n");
            table_to_typst(headers, rows, out);
            out.push_str("]\n\n");
        }
        Block::Rule => {
            out.push_str("#line(length: 100%)\n\n");
        }
    }
}

/// Write spans that open a line or a `[...]` content block.
fn line_to_typst(spans: &[InlineSpan], out: &mut String) {
    let start = out.len();
    spans_to_typst(spans, out);
    escape_enum_marker(out, start);
}

/// A leading `1.` starts a Typst enum item, so escape its dot.
fn escape_enum_marker(out: &mut String, start: usize) {
    let indent = out[start..]
        .bytes()
        .take_while(|b| *b == b' ' || *b == b'\t')
        .count();
    let digits_start = start + indent;
    let digits = out[digits_start..]
        .bytes()
        .take_while(u8::is_ascii_digit)
        .count();
    if digits > 0 && out[digits_start + digits..].starts_with('.') {
        out.insert(digits_start + digits, '\\');
    }
}

fn spans_to_typst(spans: &[InlineSpan], out: &mut String) {
    for span in spans {
        match span {
            InlineSpan::Plain(text) => escape_markup(text, out),
            InlineSpan::Bold(text) if text.is_empty() => {}
            InlineSpan::Bold(text) => {
                out.push_str("#strong[");
                let start = out.len();
                escape_markup(text, out);
                escape_enum_marker(out, start);
                // `;` ends the embedded expression so a following `(` or `.x`
                // stays text
                out.push_str("];");
            }
        }
    }
}

/// Escape characters that carry meaning in Typst markup
fn escape_markup(text: &str, out: &mut String) {
    for ch in text.chars() {
        match ch {
            '#' | '*' | '_' | '@' | '$' | '\\' | '`' | '<' | '>' | '[' | ']' | '=' | '+' | '-'
            | '/' | '~' => {
                out.push('\\');
                out.push(ch);
            }
            _ => out.push(ch),
        }
    }
}

/// Escape a value placed inside a Typst string literal
fn escape_string(text: &str) -> String {
    text.replace('\\', "\\\\").replace('"', "\\\"")
}

fn list_to_typst(items: &[Vec<InlineSpan>], out: &mut String) {
    for item in items {
        out.push_str("- ");
        line_to_typst(item, out);
        out.push('\n');
    }
}

fn table_to_typst(headers: &[String], rows: &[Vec<String>], out: &mut String) {
    let col_count = headers.len();
    if col_count == 0 {
        return;
    }

    out.push_str("#table(\n");
    out.push_str(&format!("  columns: {},\n", col_count));

    // Header cells (bold)
    for cell in headers {
        out.push_str("  [#strong[");
        line_to_typst(&format_inline(cell), out);
        out.push_str("]],\n");
    }

    for row in rows {
        for cell in row {
            out.push_str("  [");
            line_to_typst(&format_inline(cell), out);
            out.push_str("],\n");
        }
    }

    out.push_str(")\n");
}

#[cfg(test)]
mod tests {
    use crate::config::Config;
    use crate::text_to_typst;

    fn preamble() -> String {
        "#set page(paper: \"a4\", margin: 20mm, numbering: \"1\")\n\
         #set text(font: \"Libertinus Serif\", size: 11pt)\n\
         #set par(linebreaks: \"optimized\", justify: true)\n\n"
            .to_string()
    }

    fn typst(text: &str) -> String {
        text_to_typst(text, &Config::default())
    }

    #[test]
    fn heading() {
        assert_eq!(
            typst("# Hello"),
            format!("{}#block(breakable: false)[\n= Hello\n\n]\n\n", preamble())
        );
    }

    #[test]
    fn heading_with_following_content() {
        // Heading should be grouped with following paragraph
        let result = typst("## Title\n\nSome text.");
        assert!(result.contains("#block(breakable: false)[\n== Title\n\nSome text.\n\n]\n\n"));
    }

    #[test]
    fn paragraph() {
        assert_eq!(typst("Hello world"), format!("{}Hello world\n\n", preamble()));
    }

    #[test]
    fn bold() {
        assert_eq!(
            typst("**Penulis:** Budi"),
            format!("{}#strong[Penulis:]; Budi\n\n", preamble())
        );
    }

    #[test]
    fn bold_ends_before_parenthesis_and_dot() {
        assert_eq!(
            typst("**Alokasi Waktu**(2 JP)"),
            format!("{}#strong[Alokasi Waktu];(2 JP)\n\n", preamble())
        );
        assert_eq!(
            typst("**Catatan**.penting"),
            format!("{}#strong[Catatan];.penting\n\n", preamble())
        );
    }

    #[test]
    fn small_list_is_unbreakable() {
        assert_eq!(
            typst("- one\n- two"),
            format!("{}#block(breakable: false)[\n- one\n- two\n]\n\n", preamble())
        );
    }

    #[test]
    fn large_list_may_break() {
        let md = (1..=6).map(|n| format!("- {n}")).collect::<Vec<_>>().join("\n");
        assert_eq!(
            typst(&md),
            format!("{}- 1\n- 2\n- 3\n- 4\n- 5\n- 6\n\n", preamble())
        );
    }

    #[test]
    fn escapes_special_chars() {
        assert_eq!(typst("a * b"), format!("{}a \\* b\n\n", preamble()));
        assert_eq!(typst("a # b"), format!("{}a \\# b\n\n", preamble()));
        assert_eq!(typst("1-2 / 3"), format!("{}1\\-2 \\/ 3\n\n", preamble()));
        assert_eq!(typst("**odd"), format!("{}\\*\\*odd\n\n", preamble()));
    }

    #[test]
    fn leading_number_is_not_an_enum() {
        assert_eq!(typst("1. first"), format!("{}1\\. first\n\n", preamble()));
        assert_eq!(typst("2024 was 1. ok"), format!("{}2024 was 1. ok\n\n", preamble()));
        assert!(typst("## 1. Informasi Umum").contains("== 1\\. Informasi Umum\n"));
    }

    #[test]
    fn leading_number_in_content_blocks() {
        assert_eq!(
            typst("**1. Informasi**"),
            format!("{}#strong[1\\. Informasi];\n\n", preamble())
        );

        let out = typst("| 1. x |\n|---|\n| 2. Pemanasan |\n| **3. y** |");
        assert!(out.contains("  [#strong[1\\. x]],\n"));
        assert!(out.contains("  [2\\. Pemanasan],\n"));
        assert!(out.contains("  [#strong[3\\. y];],\n"));
    }

    #[test]
    fn table() {
        let md = "| A | **B** |\n|---|---|\n| 1 | 2 |";
        let expected = format!(
            "{}#block(breakable: false)[\n#table(\n  columns: 2,\n  [#strong[A]],\n  [#strong[#strong[B];]],\n  [1],\n  [2],\n)\n]\n\n",
            preamble()
        );
        assert_eq!(typst(md), expected);
    }

    #[test]
    fn horizontal_rule() {
        assert_eq!(typst("---"), format!("{}#line(length: 100%)\n\n", preamble()));
    }

    #[test]
    fn preamble_follows_config() {
        let mut config = Config::default();
        config.page.numbers = false;
        config.page.margin = "2cm".to_string();
        config.font.family = "Say \"Hi\"".to_string();
        let out = text_to_typst("", &config);
        assert_eq!(
            out,
            "#set page(paper: \"a4\", margin: 2cm)\n\
             #set text(font: \"Say \\\"Hi\\\"\", size: 11pt)\n\
             #set par(linebreaks: \"optimized\", justify: true)\n\n"
        );
    }
}
