mod block;
mod config;
mod error;
mod generate;
mod html;
mod inline;
mod lesson;
mod parser;
mod typst;

pub use block::{Block, InlineSpan, plain_text};
pub use config::{Config, FontConfig, GenerationConfig, OutputConfig, PageConfig};
pub use error::{ConfigError, Error, ExportError, GenerateError, Result};
pub use generate::{GeminiClient, TextGenerator, generate_lesson};
pub use html::{blocks_to_html, render_html_document};
pub use inline::format_inline;
pub use lesson::{LessonInput, build_prompt};
pub use typst::{blocks_to_pdf, blocks_to_typst};

/// Parse generated text into a vector of blocks.
pub fn parse(text: &str) -> Vec<Block> {
    parser::parse(text)
}

/// Convert text to an HTML fragment.
pub fn text_to_html(text: &str) -> String {
    blocks_to_html(&parse(text))
}

/// Convert text to Typst markup.
pub fn text_to_typst(text: &str, config: &Config) -> String {
    blocks_to_typst(&parse(text), config)
}

/// Convert text to PDF bytes.
pub fn text_to_pdf(text: &str, config: &Config) -> std::result::Result<Vec<u8>, ExportError> {
    blocks_to_pdf(&parse(text), config)
}
