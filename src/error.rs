use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SeedError {
    #[error("input is empty")]
    Empty,

    #[error("invalid JSON seed: {0}")]
    Json(#[from] json5::Error),

    #[error("line {line}: a chart has a single root, found a second top-level entry {label:?}")]
    MultipleRoots { line: usize, label: String },

    #[error("line {line}: list item has no label")]
    MissingLabel { line: usize },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unknown theme {0:?} (expected \"classic\" or \"modern\")")]
    UnknownTheme(String),

    #[error("{field} must be a positive finite number, got {value}")]
    NonPositive { field: &'static str, value: f32 },

    #[error("{field} must not be negative, got {value}")]
    Negative { field: &'static str, value: f32 },

    #[error("{field} must not exceed {max}, got {value}")]
    TooLarge { field: &'static str, value: f32, max: f32 },

    #[error("{field} must be a finite number")]
    NotFinite { field: &'static str },
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Seed(#[from] SeedError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

pub type Result<T> = std::result::Result<T, Error>;
