//! Top-level error types for relaybot.

/// Crate-wide result type alias.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error enum wrapping domain-specific errors.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Transcript(#[from] TranscriptError),

    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    #[error(transparent)]
    Generation(#[from] GenerationError),

    #[error("discord API error: {0}")]
    Discord(#[from] serenity::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Configuration loading errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingVar(&'static str),

    #[error("invalid configuration: {0}")]
    Invalid(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Transcript file operation errors.
#[derive(Debug, thiserror::Error)]
pub enum TranscriptError {
    #[error("failed to read transcript {path}: {source}")]
    Read {
        path: std::path::PathBuf,
        source: std::io::Error,
    },

    #[error("failed to append to transcript {path}: {source}")]
    Append {
        path: std::path::PathBuf,
        source: std::io::Error,
    },

    #[error("failed to rewrite transcript {path}: {source}")]
    Rewrite {
        path: std::path::PathBuf,
        source: std::io::Error,
    },
}

/// Attachment download and OCR errors.
#[derive(Debug, thiserror::Error)]
pub enum ExtractionError {
    #[error("failed to download attachment {filename}: {source}")]
    Download {
        filename: String,
        source: reqwest::Error,
    },

    #[error("failed to write attachment to {path}: {source}")]
    Write {
        path: std::path::PathBuf,
        source: std::io::Error,
    },

    #[error("failed to create transient directory: {0}")]
    Tempdir(std::io::Error),

    #[error("failed to run tesseract: {0}")]
    Spawn(std::io::Error),

    #[error("tesseract exited with {status}: {stderr}")]
    Ocr {
        status: std::process::ExitStatus,
        stderr: String,
    },
}

/// Generation API errors.
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error("request to generation API failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("generation API returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("generation API returned no candidates")]
    EmptyResponse,
}
