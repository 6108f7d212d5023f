//! Error types for App Hub publishing.

// Rust 1.92 compiler bug: false positives for thiserror/miette derive macro fields
// https://github.com/rust-lang/rust/issues/147648
#![allow(unused_assignments)]

use miette::Diagnostic;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for App Hub operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Codes reported by failed release preconditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationCode {
    /// `d2.config.json` is missing
    MissingD2Config,
    /// `package.json` is missing
    MissingPackage,
    /// `package.json` version is behind the next release
    PackageVersion,
    /// The app type cannot be published
    AppHubSupport,
    /// No App Hub id in the descriptor
    MissingAppHubId,
    /// No minimum DHIS2 version in the descriptor
    MissingMinDhis2Version,
    /// `APP_HUB_TOKEN` is not set
    MissingAppHubToken,
}

impl ValidationCode {
    /// The code as reported to release tooling.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::MissingD2Config => "EMISSINGD2CONFIG",
            Self::MissingPackage => "EMISSINGPACKAGE",
            Self::PackageVersion => "EPACKAGEVERSION",
            Self::AppHubSupport => "EAPPHUBSUPPORT",
            Self::MissingAppHubId => "EMISSINGAPPHUBID",
            Self::MissingMinDhis2Version => "EMISSINGMINDHIS2VERSION",
            Self::MissingAppHubToken => "EMISSINGAPPHUBTOKEN",
        }
    }
}

impl fmt::Display for ValidationCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors that can occur while verifying or publishing an app.
#[derive(Error, Debug, Diagnostic)]
pub enum Error {
    /// A release precondition does not hold.
    #[error("{code}: {message}")]
    #[diagnostic(code(d2::app_hub::validation), help("{details}"))]
    Validation {
        /// Which precondition failed
        code: ValidationCode,
        /// The error message
        message: String,
        /// How to fix it
        details: String,
    },

    /// Upload to the App Hub failed.
    #[error("Publishing to the App Hub failed: {message}")]
    #[diagnostic(
        code(d2::app_hub::publish),
        help("Check APP_HUB_TOKEN and that the bundle was built")
    )]
    Publish {
        /// The error message
        message: String,
        /// HTTP status, if the server answered
        status: Option<u16>,
    },

    /// Reading a package file failed.
    #[error("Failed to read {}", path.display())]
    #[diagnostic(code(d2::app_hub::io))]
    Io {
        /// The file involved
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// A package file is not valid JSON.
    #[error("Invalid JSON in {}", path.display())]
    #[diagnostic(code(d2::app_hub::json))]
    Json {
        /// The file involved
        path: PathBuf,
        /// The underlying parse error
        #[source]
        source: serde_json::Error,
    },
}

impl Error {
    /// Create a validation error.
    #[must_use]
    pub fn validation(
        code: ValidationCode,
        message: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        Self::Validation {
            code,
            message: message.into(),
            details: details.into(),
        }
    }

    /// Create a publish error.
    #[must_use]
    pub fn publish(message: impl Into<String>, status: Option<u16>) -> Self {
        Self::Publish {
            message: message.into(),
            status,
        }
    }

    /// Create an I/O error.
    #[must_use]
    pub fn io(source: std::io::Error, path: impl Into<PathBuf>) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// The validation code, if this is a validation error.
    #[must_use]
    pub const fn validation_code(&self) -> Option<ValidationCode> {
        match self {
            Self::Validation { code, .. } => Some(*code),
            _ => None,
        }
    }
}
