//! Results returned by [`crate::PipelineController`] operations.

use crate::artifact::{DiagramSource, PipelineStage, RenderedArtifact, SourceKind};
use crate::error::{ExportGuard, RenderError};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Result of a file submission that reached the controller.
///
/// A failed translation or read is an `Err(PipelineError)` instead; by the
/// time one of these is returned the diagram text exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The flowchart rendered and is now cached.
    Rendered {
        kind: SourceKind,
        flowchart: RenderedArtifact,
    },
    /// The diagram text is cached but the engine rejected it.
    RenderFailed { kind: SourceKind, error: RenderError },
    /// A newer submission or a reset was issued while this one was in
    /// flight; its result was discarded.
    Superseded,
}

/// Result of a structogram request that did not fail.
///
/// Converter failures are returned as `Err(PipelineError::Conversion)` after
/// the stage has moved to [`PipelineStage::SecondaryFailed`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StructogramOutcome {
    /// The structogram is now cached.
    Rendered(RenderedArtifact),
    /// No diagram text was loaded; nothing was sent.
    NothingToConvert(ExportGuard),
    /// The diagram text changed, a newer request was issued, or the pipeline
    /// was reset while this request was in flight.
    Superseded,
}

/// Result of an export request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportOutcome {
    /// The artifact was written.
    Saved(ExportedFile),
    /// The requested artifact is not cached.
    Skipped(ExportGuard),
}

/// An in-memory downloadable blob.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Download {
    pub filename: String,
    pub mime_type: &'static str,
    pub bytes: Vec<u8>,
}

/// A blob that has been saved to disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportedFile {
    pub path: PathBuf,
    pub mime_type: String,
    pub bytes_written: usize,
}

/// Point-in-time copy of the controller state.
///
/// Two snapshots compare equal iff every cached field is identical, which is
/// what makes "reset returns to an observably identical idle state" testable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineSnapshot {
    pub stage: PipelineStage,
    pub file_name: Option<String>,
    pub source_kind: Option<SourceKind>,
    pub diagram_source: Option<DiagramSource>,
    pub flowchart: Option<RenderedArtifact>,
    pub structogram: Option<RenderedArtifact>,
    /// Engine message if the cached diagram text failed to render.
    pub render_error: Option<String>,
    /// Converter message if the last structogram request failed.
    pub structogram_error: Option<String>,
}
