//! Typed errors for the collaborators around the renderer.
//!
//! Parsing itself is total and has no error type; only configuration,
//! text generation and export can fail.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config '{path}': {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Failure of the text-generation collaborator.
#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("generation failed: environment variable {0} is not set")]
    MissingApiKey(String),

    #[error("generation failed: {0} is required")]
    MissingField(&'static str),

    #[error("generation failed: request error: {0}")]
    Request(#[from] ureq::Error),

    #[error("generation failed: malformed response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("generation failed: the model returned no text")]
    EmptyResponse,
}

/// Failure of the PDF export collaborator.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("export failed: typst compilation failed: {0}")]
    Compile(String),

    #[error("export failed: PDF generation failed: {0}")]
    Pdf(String),
}

/// Top-level error used by the command-line front end.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Generate(#[from] GenerateError),

    #[error(transparent)]
    Export(#[from] ExportError),

    #[error("failed to read lesson input '{path}': {source}")]
    LessonInput {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("I/O error on '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize blocks: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
