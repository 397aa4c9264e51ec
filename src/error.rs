//! Error types for the flow2nsd library.
//!
//! Three outcomes are kept apart because the pipeline treats them differently:
//!
//! * [`PipelineError`]: **Fatal** for the operation that raised it: the file
//!   could not be read, a converter endpoint failed, or an export could not
//!   be written. Nothing is committed to the controller when a submission
//!   fails this way.
//!
//! * [`RenderError`]: **Non-fatal**: the diagram text was rejected by the
//!   render engine. The controller still advances to
//!   [`crate::PipelineStage::RenderFailed`] and keeps the offending text so
//!   it can be shown, exported, or sent to the structogram converter.
//!
//! * [`ExportGuard`]: not an error at all: an export or structogram request
//!   arrived while the artifact it needs was absent. Reported as a skipped
//!   outcome so the caller can tell "nothing to do" from "it broke".

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the flow2nsd library.
#[derive(Debug, Error)]
pub enum PipelineError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("Input file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The file exists but reading it failed part-way.
    #[error("Failed to read '{path}': {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Converter errors ──────────────────────────────────────────────────
    /// A remote converter endpoint could not produce a result.
    #[error(transparent)]
    Conversion(#[from] ConversionError),

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create or write an exported file.
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

/// A remote conversion call failed.
///
/// One attempt is made per user action; there is no retry, so every variant
/// is surfaced to the caller verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum ConversionError {
    /// The endpoint could not be reached (DNS, refused connection, TLS, …).
    #[error("Converter at '{endpoint}' is unreachable: {reason}")]
    Unreachable { endpoint: String, reason: String },

    /// The endpoint did not answer within the configured bound.
    #[error("Converter at '{endpoint}' timed out after {secs}s")]
    Timeout { endpoint: String, secs: u64 },

    /// The endpoint answered with a non-success status.
    #[error("Converter at '{endpoint}' returned HTTP {status}: {body}")]
    HttpStatus {
        endpoint: String,
        status: u16,
        body: String,
    },

    /// The endpoint answered 2xx but with nothing usable in the body.
    #[error("Converter at '{endpoint}' returned an empty body")]
    EmptyBody { endpoint: String },
}

impl ConversionError {
    /// The endpoint URL the failed request was sent to.
    pub fn endpoint(&self) -> &str {
        match self {
            ConversionError::Unreachable { endpoint, .. }
            | ConversionError::Timeout { endpoint, .. }
            | ConversionError::HttpStatus { endpoint, .. }
            | ConversionError::EmptyBody { endpoint } => endpoint,
        }
    }
}

/// The render engine rejected a diagram description.
///
/// Keeps the original text next to the engine message so the caller can
/// display what failed, not just why.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("Error rendering diagram: {message}")]
pub struct RenderError {
    /// Message produced by the render engine.
    pub message: String,
    /// The diagram text that was handed to the engine.
    pub source_text: String,
}

/// Why an export or structogram request was skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExportGuard {
    /// No diagram text has been loaded yet.
    NoDiagramSource,
    /// No rendered flowchart is cached (nothing loaded, or the render failed).
    NoFlowchart,
    /// No structogram is cached.
    NoStructogram,
    /// The structogram only exists as vector markup.
    NoTextForm,
}

impl std::fmt::Display for ExportGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let msg = match self {
            ExportGuard::NoDiagramSource => "no diagram loaded",
            ExportGuard::NoFlowchart => "no rendered flowchart",
            ExportGuard::NoStructogram => "no structogram",
            ExportGuard::NoTextForm => "structogram has no text form",
        };
        f.write_str(msg)
    }
}
