use crate::block::{Block, InlineSpan, plain_text};
use crate::config::Config;
use crate::inline::format_inline;

/// Convert blocks to an HTML fragment
pub fn blocks_to_html(blocks: &[Block]) -> String {
    let mut out = String::new();
    for block in blocks {
        emit_block(block, &mut out);
    }
    out
}

/// Wrap the rendered blocks in a standalone, printable A4 page.
pub fn render_html_document(blocks: &[Block], config: &Config) -> String {
    let title = blocks
        .iter()
        .find_map(|block| match block {
            Block::Heading { content, .. } => Some(plain_text(content)),
            _ => None,
        })
        .unwrap_or_else(|| "Modul Ajar".to_string());

    let mut out = String::new();
    out.push_str("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>");
    escape_into(&title, &mut out);
    out.push_str("</title>\n<style>\n");
    out.push_str(&format!(
        "@page {{ size: A4; margin: {margin}; }}\n\
         body {{ max-width: 210mm; margin: 0 auto; padding: {margin}; box-sizing: border-box; \
         font-family: '{family}', serif; font-size: {size}; text-align: justify; }}\n",
        margin = config.page.margin,
        family = config.font.family,
        size = config.font.size,
    ));
    out.push_str(
        "h1 { text-align: center; }\n\
         table { border-collapse: collapse; width: 100%; }\n\
         th, td { border: 1px solid #ddd; padding: 0.4em 0.8em; text-align: left; vertical-align: top; }\n\
         tr { page-break-inside: avoid; }\n",
    );
    out.push_str("</style>\n</head>\n<body>\n");
    out.push_str(&blocks_to_html(blocks));
    out.push_str("</body>\n</html>\n");
    out
}

fn emit_block(block: &Block, out: &mut String) {
    match block {
        Block::Heading { level, content } => {
            out.push_str(&format!("<h{level}>"));
            spans_to_html(content, out);
            out.push_str(&format!("</h{level}>\n"));
        }
        Block::List { items } => {
            out.push_str("<ul>\n");
            for item in items {
                out.push_str("<li>");
                spans_to_html(item, out);
                out.push_str("</li>\n");
            }
            out.push_str("</ul>\n");
        }
        Block::Table { headers, rows } => table_to_html(headers, rows, out),
        Block::Rule => out.push_str("<hr>\n"),
        Block::Paragraph { content } => {
            out.push_str("<p>");
            spans_to_html(content, out);
            out.push_str("</p>\n");
        }
    }
}

fn table_to_html(headers: &[String], rows: &[Vec<String>], out: &mut String) {
    out.push_str("<table>\n<thead>\n<tr>");
    for cell in headers {
        out.push_str("<th scope=\"col\">");
        spans_to_html(&format_inline(cell), out);
        out.push_str("</th>");
    }
    out.push_str("</tr>\n</thead>\n<tbody>\n");
    for row in rows {
        out.push_str("<tr>");
        for cell in row {
            out.push_str("<td>");
            spans_to_html(&format_inline(cell), out);
            out.push_str("</td>");
        }
        out.push_str("</tr>\n");
    }
    out.push_str("</tbody>\n</table>\n");
}

fn spans_to_html(spans: &[InlineSpan], out: &mut String) {
    for span in spans {
        match span {
            // Empty plain parts come from leading/adjacent bold markers
            InlineSpan::Plain(text) if text.is_empty() => {}
            InlineSpan::Plain(text) => escape_into(text, out),
            InlineSpan::Bold(text) => {
                out.push_str("<strong>");
                escape_into(text, out);
                out.push_str("</strong>");
            }
        }
    }
}

fn escape_into(text: &str, out: &mut String) {
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;
    use pretty_assertions::assert_eq;

    fn html(text: &str) -> String {
        blocks_to_html(&parse(text))
    }

    #[test]
    fn headings() {
        assert_eq!(
            html("# A\n## B\n### C"),
            "<h1>A</h1>\n<h2>B</h2>\n<h3>C</h3>\n"
        );
    }

    #[test]
    fn paragraph_with_bold() {
        assert_eq!(
            html("**Penulis:** Budi"),
            "<p><strong>Penulis:</strong> Budi</p>\n"
        );
    }

    #[test]
    fn list() {
        assert_eq!(html("- a\n- b"), "<ul>\n<li>a</li>\n<li>b</li>\n</ul>\n");
    }

    #[test]
    fn rule() {
        assert_eq!(html("---"), "<hr>\n");
    }

    #[test]
    fn table_cells_are_inline_formatted() {
        assert_eq!(
            html("|**K**|S|\n|---|---|\n|a|1|"),
            "<table>\n<thead>\n<tr><th scope=\"col\"><strong>K</strong></th><th scope=\"col\">S</th></tr>\n</thead>\n\
             <tbody>\n<tr><td>a</td><td>1</td></tr>\n</tbody>\n</table>\n"
        );
    }

    #[test]
    fn escapes_markup() {
        assert_eq!(
            html("a < b & \"c\""),
            "<p>a &lt; b &amp; &quot;c&quot;</p>\n"
        );
        assert_eq!(
            html("**<script>**"),
            "<p><strong>&lt;script&gt;</strong></p>\n"
        );
    }

    #[test]
    fn document_uses_first_heading_as_title() {
        let config = Config::default();
        let doc = render_html_document(&parse("intro\n# MODUL AJAR: PJOK\n## Info"), &config);
        assert!(doc.starts_with("<!DOCTYPE html>"));
        assert!(doc.contains("<title>MODUL AJAR: PJOK</title>"));
        assert!(doc.contains("margin: 20mm"));
        assert!(doc.contains("<p>intro</p>\n<h1>MODUL AJAR: PJOK</h1>\n<h2>Info</h2>\n"));
    }

    #[test]
    fn document_default_title() {
        let doc = render_html_document(&[], &Config::default());
        assert!(doc.contains("<title>Modul Ajar</title>"));
    }
}
