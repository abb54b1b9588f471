//! Error types for the proxy bootstrap lifecycle.
//!
//! Every failure carries what the operator needs to act on it: the offending
//! token, path, or image tag. Errors propagate up to `main`, which logs them
//! and exits with the matching code from [`crate::exit_codes`] — the builder
//! and runner themselves never terminate the process.

use std::path::PathBuf;

use thiserror::Error;

use crate::exit_codes;

/// Main error type for proxyboot operations.
#[derive(Error, Debug)]
pub enum Error {
    /// A location token could not be split into `path@backend`.
    #[error(
        "invalid location '{token}': entries must be formatted like path@backend \
         (e.g. /api@http://127.0.0.1:4000)"
    )]
    InvalidLocation { token: String },

    /// A file named on the command line does not exist.
    #[error("the file {} does not exist", path.display())]
    MissingFile { path: PathBuf },

    /// An unrecognized flag was given without a value to forward.
    #[error("the argument {flag} expects a value to forward to the template")]
    MissingValue { flag: String },

    /// The template could not be loaded or rendered.
    #[error("failed to render template {name}: {source}")]
    Template {
        name: String,
        #[source]
        source: minijinja::Error,
    },

    /// The build collaborator exited with a non-zero status.
    #[error("attempt to build {tag} returned non-zero exit code{}", fmt_code(*code))]
    BuildFailed { tag: String, code: Option<i32> },

    /// The run collaborator exited with a non-zero status.
    #[error("attempt to start image {tag} returned non-zero exit code{}", fmt_code(*code))]
    RunFailed { tag: String, code: Option<i32> },

    /// A filesystem operation failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

fn fmt_code(code: Option<i32>) -> String {
    match code {
        Some(code) => format!(" ({code})"),
        None => String::new(),
    }
}

impl Error {
    /// Returns the process exit code for this error kind.
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::InvalidLocation { .. } => exit_codes::INPUT_ERROR,
            Error::MissingFile { .. } => exit_codes::INPUT_ERROR,
            Error::MissingValue { .. } => exit_codes::INPUT_ERROR,
            Error::Template { .. } => exit_codes::TEMPLATE_FAILURE,
            Error::BuildFailed { .. } => exit_codes::BUILD_FAILURE,
            Error::RunFailed { .. } => exit_codes::RUN_FAILURE,
            Error::Io(_) => exit_codes::IO_FAILURE,
        }
    }
}

/// Result type alias for proxyboot operations.
pub type Result<T> = std::result::Result<T, Error>;
