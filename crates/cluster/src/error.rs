//! Error types for cluster provisioning.

// Rust 1.92 compiler bug: false positives for thiserror/miette derive macro fields
// https://github.com/rust-lang/rust/issues/147648
#![allow(unused_assignments)]

use miette::Diagnostic;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for cluster operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while resolving or provisioning a cluster.
#[derive(Error, Debug, Diagnostic)]
pub enum Error {
    /// Cache store failure.
    #[error(transparent)]
    #[diagnostic(transparent)]
    Cache(#[from] d2_cache::Error),

    /// The deployment template could not be made available.
    #[error("Failed to initialize the docker-compose template for cluster '{name}': {message}")]
    #[diagnostic(
        code(d2::cluster::template_unavailable),
        help("Re-run with --update to download the template again")
    )]
    TemplateUnavailable {
        /// Cluster name
        name: String,
        /// What went wrong
        message: String,
        /// Underlying cache failure, if any
        #[source]
        source: Option<d2_cache::Error>,
    },

    /// Reading or writing a template file failed.
    #[error("Failed to {operation} {}", path.display())]
    #[diagnostic(
        code(d2::cluster::file_io),
        help("Check file permissions, or re-run with --update to restore the template")
    )]
    FileIo {
        /// Operation that failed (e.g., "read", "write")
        operation: String,
        /// The file involved
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The orchestration subprocess failed.
    #[error("{program} {}", code.map_or_else(|| format!("could not be run: {message}"), |c| format!("exited with status {c}")))]
    #[diagnostic(
        code(d2::cluster::subprocess),
        help("Check the output above; set D2_COMPOSE_COMMAND if docker-compose lives elsewhere")
    )]
    Subprocess {
        /// Program that was invoked
        program: String,
        /// Exit code, if the process ran
        code: Option<i32>,
        /// Additional detail
        message: String,
    },

    /// Database seeding failed.
    #[error("Database seeding failed: {message}")]
    #[diagnostic(code(d2::cluster::seed))]
    Seed {
        /// The error message
        message: String,
    },

    /// Configuration error.
    #[error("Cluster configuration error: {message}")]
    #[diagnostic(code(d2::cluster::config))]
    Configuration {
        /// The error message
        message: String,
        /// Help text for the user
        #[help]
        help: Option<String>,
    },
}

impl Error {
    /// Create a template-unavailable error without an underlying cause.
    #[must_use]
    pub fn template_unavailable(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::TemplateUnavailable {
            name: name.into(),
            message: message.into(),
            source: None,
        }
    }

    /// Create a file I/O error.
    #[must_use]
    pub fn file_io(
        operation: impl Into<String>,
        path: impl Into<PathBuf>,
        source: std::io::Error,
    ) -> Self {
        Self::FileIo {
            operation: operation.into(),
            path: path.into(),
            source,
        }
    }

    /// Create a subprocess error for a process that exited unsuccessfully.
    #[must_use]
    pub fn subprocess(program: impl Into<String>, code: Option<i32>, message: impl Into<String>) -> Self {
        Self::Subprocess {
            program: program.into(),
            code,
            message: message.into(),
        }
    }

    /// Create a seeding error.
    #[must_use]
    pub fn seed(message: impl Into<String>) -> Self {
        Self::Seed {
            message: message.into(),
        }
    }

    /// Create a configuration error.
    #[must_use]
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
            help: None,
        }
    }

    /// Create a configuration error with help text.
    #[must_use]
    pub fn configuration_with_help(message: impl Into<String>, help: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
            help: Some(help.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subprocess_message_with_code() {
        let err = Error::subprocess("docker-compose", Some(2), "");
        assert_eq!(err.to_string(), "docker-compose exited with status 2");
    }

    #[test]
    fn test_subprocess_message_without_code() {
        let err = Error::subprocess("docker-compose", None, "No such file or directory");
        assert_eq!(
            err.to_string(),
            "docker-compose could not be run: No such file or directory"
        );
    }

    #[test]
    fn test_cache_error_is_transparent() {
        let err: Error = d2_cache::Error::not_found("clusters/x/config.json").into();
        assert!(err.to_string().contains("clusters/x/config.json"));
    }
}
