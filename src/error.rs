use std::path::PathBuf;

use thiserror::Error;

use crate::config::ConfigError;
use crate::patch::PatchError;
use crate::plugin::PipelineError;

/// Errors that end a run.
#[derive(Debug, Error)]
pub enum Error {
    #[error("traversal failed: {0}")]
    Traversal(#[from] walkdir::Error),

    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {}: {rendered}", path.display())]
    Parse { path: PathBuf, rendered: String },

    #[error("failed to serialize the IR: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Patch(#[from] PatchError),

    #[error(transparent)]
    Plugins(#[from] PipelineError),
}
