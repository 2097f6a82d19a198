//! Error types for Kart Dash
//!
//! Gameplay outcomes (crashes, boss kills) are never errors. These cover the
//! two places where something can actually fail: acquiring a GPU surface at
//! startup, and fetching/parsing a generated level.

use thiserror::Error;

/// Fatal construction-time failures. Not retried.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Could not create drawing surface: {0}")]
    Surface(String),

    #[error("No compatible GPU adapter: {0}")]
    Adapter(String),

    #[error("Could not create GPU device: {0}")]
    Device(String),
}

/// Level generation failures. Absorbed by `level::generate_level`.
#[derive(Debug, Error)]
pub enum LevelError {
    #[error("Level generator has no credential configured")]
    MissingCredential,

    #[error("Level request failed: {0}")]
    Transport(String),

    #[error("Malformed level response: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("Level has no obstacles")]
    EmptyObstacles,

    #[error("Unknown level theme: {0}")]
    UnknownTheme(String),
}
