//! Data model shared by every pipeline stage.
//!
//! ```text
//! UploadedFile ──classify──▶ SourceKind
//!      │
//!      ├─(translate | read)─▶ DiagramSource ──render──▶ RenderedArtifact (flowchart)
//!      │                            │
//!      │                            └──structogram──▶ RenderedArtifact (structogram)
//! ```
//!
//! All of these are plain owned values. The controller owns the live copies;
//! callers only ever see clones.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A file handed to the pipeline: its name (for classification) and raw bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    name: String,
    bytes: Vec<u8>,
}

impl UploadedFile {
    /// Build an upload from an in-memory name and content.
    pub fn new(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
        }
    }

    /// Read a local file. See [`crate::pipeline::input::read_upload`].
    pub async fn open(path: impl AsRef<std::path::Path>) -> Result<Self, crate::PipelineError> {
        crate::pipeline::input::read_upload(path).await
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Decode the content as text. Invalid UTF-8 sequences become U+FFFD,
    /// the same way a browser `FileReader.readAsText` behaves.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.bytes).into_owned()
    }
}

/// Which ingestion route an upload takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SourceKind {
    /// `.py`: translated remotely by the Python converter.
    PythonSource,
    /// `.ino`: translated remotely by the Arduino converter.
    ArduinoSource,
    /// Anything else: read verbatim as diagram text.
    DiagramText,
}

impl SourceKind {
    pub fn as_str(self) -> &'static str {
        match self {
            SourceKind::PythonSource => "python",
            SourceKind::ArduinoSource => "arduino",
            SourceKind::DiagramText => "diagram",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Diagram-description text in the render engine's language.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DiagramSource(String);

impl DiagramSource {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DiagramSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Rendered vector markup (an SVG document).
///
/// Replaced wholesale on every conversion; never patched in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RenderedArtifact(String);

impl RenderedArtifact {
    pub fn new(markup: impl Into<String>) -> Self {
        Self(markup.into())
    }

    pub fn markup(&self) -> &str {
        &self.0
    }
}

/// Where the pipeline currently stands.
///
/// The stage alone decides which exports are valid; UI layers should react
/// to stage changes rather than track their own flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PipelineStage {
    /// Nothing loaded.
    #[default]
    Idle,
    /// Diagram text loaded and rendered into a flowchart.
    Rendered,
    /// Diagram text loaded but the render engine rejected it.
    RenderFailed,
    /// A structogram was produced from the loaded diagram text.
    SecondaryRendered,
    /// The structogram converter failed for the loaded diagram text.
    SecondaryFailed,
}

impl PipelineStage {
    /// Whether a diagram text is cached in this stage.
    pub fn has_source(self) -> bool {
        !matches!(self, PipelineStage::Idle)
    }
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PipelineStage::Idle => "idle",
            PipelineStage::Rendered => "rendered",
            PipelineStage::RenderFailed => "render-failed",
            PipelineStage::SecondaryRendered => "structogram-rendered",
            PipelineStage::SecondaryFailed => "structogram-failed",
        };
        f.write_str(s)
    }
}

/// Which cached rendering an export refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExportTarget {
    /// The flowchart (and its diagram text).
    Primary,
    /// The structogram.
    Secondary,
}

/// Export representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExportFormat {
    /// Diagram-description text (`text/plain`).
    DiagramText,
    /// Vector markup (`image/svg+xml`).
    Vector,
}
