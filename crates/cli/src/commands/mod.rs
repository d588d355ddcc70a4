//! Command implementations.

pub mod decode;
pub mod preview;

use std::path::PathBuf;

use matgar_core::{LinkError, ValidationErrors};

/// Errors a command can fail with.
#[derive(thiserror::Error, Debug)]
pub enum CliError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("customer details are invalid: {0}")]
    Invalid(ValidationErrors),

    #[error("the order has no items")]
    EmptyOrder,

    #[error("either --cart or --product is required")]
    MissingOrder,

    #[error(transparent)]
    Link(#[from] LinkError),

    #[error("failed to write output: {0}")]
    Output(#[from] std::io::Error),
}
