//! Common types and utilities shared across Morecart crates.
//!
//! This crate defines the shared error type and observability helpers used
//! throughout the Morecart workspace. It stays dependency‑light so every crate
//! can depend on it.
//!
//! # Overview
//!
//! - [`observability`]: Centralised tracing/logging initialisation
//! - [`ScrapeError`] and [`Result`]: Shared error handling
//!
//! # Examples
//!
//! Telling listing faults apart from session failures:
//!
//! ```rust
//! use morecart_common::ScrapeError;
//!
//! let err = ScrapeError::Parse {
//!     field: "price",
//!     text: "free".to_string(),
//!     reason: "not a number".to_string(),
//! };
//! assert!(err.is_listing_fault());
//! assert!(!ScrapeError::Config("no categories".into()).is_listing_fault());
//! ```
use std::path::PathBuf;

pub mod observability;

/// Error types used across the Morecart system.
///
/// A "load more" control that never becomes clickable is not represented
/// here: pagination treats it as the normal end of content.
#[derive(thiserror::Error, Debug)]
pub enum ScrapeError {
    /// A category page could not be loaded.
    #[error("Navigation to {url} failed: {source}")]
    Navigation {
        url: String,
        #[source]
        source: anyhow::Error,
    },

    /// A listing is missing an expected sub-element.
    #[error("Listing has no `{field}` element (selector `{selector}`)")]
    Extraction {
        field: &'static str,
        selector: String,
    },

    /// A listing sub-element is present but lacks the attribute carrying its value.
    #[error("Listing `{field}` element has no `{attribute}` attribute")]
    MissingAttribute {
        field: &'static str,
        attribute: String,
    },

    /// A field's text does not match its expected numeric format.
    #[error("Cannot parse {field} from {text:?}: {reason}")]
    Parse {
        field: &'static str,
        text: String,
        reason: String,
    },

    /// A driver (browser session, WebDriver transport) reported an error.
    #[error("Driver error: {0}")]
    Driver(#[from] anyhow::Error),

    /// Writing a CSV file failed.
    #[error("Failed to write {}: {source}", path.display())]
    Output {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// Filesystem error outside of CSV serialization.
    #[error("I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Configuration was incomplete or invalid.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl ScrapeError {
    /// Whether the error is confined to a single listing (as opposed to the
    /// page, the session or the output).
    pub fn is_listing_fault(&self) -> bool {
        matches!(
            self,
            Self::Extraction { .. } | Self::MissingAttribute { .. } | Self::Parse { .. }
        )
    }
}

/// Convenient alias for results that use [`ScrapeError`].
pub type Result<T> = std::result::Result<T, ScrapeError>;
