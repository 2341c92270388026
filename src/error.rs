// src/error.rs

use std::process::ExitStatus;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("{program} is not installed or not on PATH ({hint})")]
    MissingDependency { program: String, hint: String },

    #[error("git: failed to {action}: {source}")]
    Vcs {
        action: String,
        #[source]
        source: git2::Error,
    },

    #[error("could not check out '{reference}': {source}")]
    Checkout {
        reference: String,
        #[source]
        source: git2::Error,
    },

    #[error("error when running `{command}` ({status}):\n{output}")]
    ExternalTool {
        command: String,
        status: ExitStatus,
        output: String,
    },

    #[error("unexpected line counter report: {reason}\n{report}")]
    MalformedReport { reason: String, report: String },

    #[error("failed to write chart: {0}")]
    Render(#[from] image::ImageError),

    #[error("failed to run `{command}`: {source}")]
    Io {
        command: String,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    pub(crate) fn vcs(action: impl Into<String>) -> impl FnOnce(git2::Error) -> Self {
        let action = action.into();
        move |source| Error::Vcs { action, source }
    }

    pub(crate) fn checkout(reference: impl Into<String>) -> impl FnOnce(git2::Error) -> Self {
        let reference = reference.into();
        move |source| Error::Checkout { reference, source }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
