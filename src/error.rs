//! Engine error types.
//!
//! Most setup code returns `anyhow::Result`; the variants here are the failures
//! callers are expected to tell apart.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("texture registry is full ({capacity} textures already loaded)")]
    TextureRegistryFull { capacity: usize },

    #[error("failed to compile {stage} shader {path:?}: {message}")]
    ShaderCompile {
        stage: &'static str,
        path: PathBuf,
        message: String,
    },

    #[error("failed to link shader program {path:?}: {message}")]
    ShaderLink { path: PathBuf, message: String },

    #[error("no suitable GPU adapter found")]
    NoAdapter,

    #[error("window error: {0}")]
    Window(String),
}
