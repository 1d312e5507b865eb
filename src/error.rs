//! Error types for the mhb2svg library.
//!
//! Two distinct types reflect two distinct failure modes:
//!
//! * [`Mhb2SvgError`] — **Fatal**: the run cannot continue (missing session
//!   id, unreachable API, corrupt archive, unparseable point data). Returned
//!   as `Err(Mhb2SvgError)` from the top-level `convert*` functions, after
//!   the scratch directory has already been dropped.
//!
//! * [`ConversionWarning`] — **Non-fatal**: the archive is missing an
//!   expected piece (no `Slides/` directory, no slide files, no metadata
//!   document). Collected into [`crate::output::ConversionOutput`] so the
//!   run completes with partial or empty output.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the mhb2svg library.
#[derive(Debug, Error)]
pub enum Mhb2SvgError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// The share link has no usable `s_id` query parameter.
    #[error("Share link '{url}' does not contain the \"s_id\" parameter")]
    MissingSessionId { url: String },

    /// The share link could not be parsed as a URL at all.
    #[error("Invalid share link '{url}': {reason}")]
    InvalidLink { url: String, reason: String },

    /// Local archive was not found at the given path.
    #[error("Archive not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the archive.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    // ── Remote errors ─────────────────────────────────────────────────────
    /// The resource lookup request could not be completed.
    #[error("Resource lookup failed for '{url}': {reason}\nCheck your internet connection.")]
    ApiRequestFailed { url: String, reason: String },

    /// The resource lookup answered with something that is not the expected JSON array.
    #[error("Unexpected response from '{url}': {detail}")]
    InvalidApiResponse { url: String, detail: String },

    /// The lookup succeeded but carried no download URL.
    #[error("API response for session '{sid}' did not contain the expected file URL")]
    FileUrlMissing { sid: String },

    /// Downloading the archive failed.
    #[error("Failed to download '{url}': {reason}")]
    DownloadFailed { url: String, reason: String },

    /// Lookup or download exceeded the configured timeout.
    #[error("Request timed out after {secs}s for '{url}'\nIncrease --download-timeout.")]
    DownloadTimeout { url: String, secs: u64 },

    // ── Archive errors ────────────────────────────────────────────────────
    /// The file is not a zip archive, or it is corrupt.
    #[error("'{path}' is not a valid archive: {detail}")]
    InvalidArchive { path: PathBuf, detail: String },

    /// The scratch directory could not be created or written.
    #[error("Scratch directory error: {source}")]
    ScratchDir {
        #[source]
        source: std::io::Error,
    },

    // ── Document errors ───────────────────────────────────────────────────
    /// An XML document could not be read or is not well-formed.
    #[error("Failed to parse XML '{path}': {detail}")]
    XmlParse { path: PathBuf, detail: String },

    /// A `StylusPoint` did not hold a parseable `x,y,pressure` triple.
    #[error("Malformed stylus point {text:?} in '{path}': {detail}")]
    MalformedPoint {
        path: PathBuf,
        text: String,
        detail: String,
    },

    /// Paging a slide would produce an unreasonable number of pages.
    #[error("Slide needs {steps} page steps, more than the limit of {limit}\nRerun without --paging.")]
    TooManyPages { steps: usize, limit: usize },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create or write an output SVG file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A non-fatal problem with the archive layout.
///
/// The run still completes; the affected part simply produces no output.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum ConversionWarning {
    /// The archive has no slide directory.
    #[error("{path} does not exist. Skipping conversion.")]
    SlidesDirMissing { path: PathBuf },

    /// The slide directory exists but holds no `.xml` files.
    #[error("No XML files found in {path}")]
    NoSlideFiles { path: PathBuf },

    /// The archive has no metadata document.
    #[error("Metadata document {path} not found")]
    MetadataMissing { path: PathBuf },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_session_id_display() {
        let e = Mhb2SvgError::MissingSessionId {
            url: "https://example.com/share?x=1".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("s_id"), "got: {msg}");
        assert!(msg.contains("example.com"), "got: {msg}");
    }

    #[test]
    fn malformed_point_display() {
        let e = Mhb2SvgError::MalformedPoint {
            path: PathBuf::from("Slides/1.xml"),
            text: "abc,1,0".into(),
            detail: "invalid float literal".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("abc,1,0"), "got: {msg}");
        assert!(msg.contains("Slides/1.xml"), "got: {msg}");
    }

    #[test]
    fn timeout_display() {
        let e = Mhb2SvgError::DownloadTimeout {
            url: "https://example.com/a.mhb".into(),
            secs: 30,
        };
        assert!(e.to_string().contains("30s"));
    }

    #[test]
    fn warning_display() {
        let w = ConversionWarning::SlidesDirMissing {
            path: PathBuf::from("/tmp/x/Slides"),
        };
        assert!(w.to_string().contains("Skipping conversion"));
    }
}
