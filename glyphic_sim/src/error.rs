// Simulation errors.
//
// Everything here aborts the run: grammar misconfiguration, unreadable
// inputs, unwritable output, or a config that fails validation. Recoverable
// per-morpheme anomalies (zero-length alignments, empty pronunciations,
// rounds with no accepted candidate) are handled in place and never surface
// as errors.

use glyphic_grammar::GrammarError;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("grammar error: {0}")]
    Grammar(#[from] GrammarError),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON in {path}: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl SimError {
    pub fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.display().to_string(),
            source,
        }
    }

    pub fn json(path: &Path, source: serde_json::Error) -> Self {
        Self::Json {
            path: path.display().to_string(),
            source,
        }
    }
}
