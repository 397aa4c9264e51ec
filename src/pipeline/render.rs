//! Diagram rendering: diagram text → SVG via a [`RenderEngine`].
//!
//! ## Why spawn_blocking?
//!
//! Layout is CPU-bound and engines are free to be synchronous.
//! `tokio::task::spawn_blocking` moves the work off the async workers so a
//! large diagram never stalls in-flight converter requests; from the
//! caller's view `render` is just another suspension point.
//!
//! ## Render ids
//!
//! Every call gets a fresh id (`"{prefix}-{n}"`) that the engine stamps onto
//! the root `<svg>`. A rendering that is still mounted somewhere never
//! shares an id with the next one.

use crate::artifact::{DiagramSource, RenderedArtifact};
use crate::error::{PipelineError, RenderError};
use crate::pipeline::mermaid::MermaidEngine;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, warn};

/// An in-process diagram renderer.
pub trait RenderEngine: Send + Sync {
    /// Render `source` into SVG markup whose root element carries `id`.
    ///
    /// On failure return the engine's human-readable message.
    fn render(&self, id: &str, source: &str) -> Result<String, String>;
}

/// Drives a [`RenderEngine`] and assigns render ids.
pub struct DiagramRenderer {
    engine: Arc<dyn RenderEngine>,
    prefix: String,
    counter: AtomicU64,
}

impl DiagramRenderer {
    /// Renderer backed by [`MermaidEngine`].
    pub fn new(prefix: impl Into<String>) -> Self {
        Self::with_engine(Arc::new(MermaidEngine), prefix)
    }

    pub fn with_engine(engine: Arc<dyn RenderEngine>, prefix: impl Into<String>) -> Self {
        Self {
            engine,
            prefix: prefix.into(),
            counter: AtomicU64::new(0),
        }
    }

    /// Next unique render id.
    fn next_id(&self) -> String {
        let n = self.counter.fetch_add(1, Ordering::Relaxed) + 1;
        format!("{}-{}", self.prefix, n)
    }

    /// Render `source`.
    ///
    /// The outer `Result` is for the blocking task itself (a panicking
    /// engine); the inner one is the engine's verdict on the diagram.
    pub async fn render(
        &self,
        source: &DiagramSource,
    ) -> Result<Result<RenderedArtifact, RenderError>, PipelineError> {
        let id = self.next_id();
        let engine = Arc::clone(&self.engine);
        let text = source.as_str().to_string();
        debug!("Rendering {} ({} bytes)", id, text.len());

        let verdict = tokio::task::spawn_blocking(move || engine.render(&id, &text))
            .await
            .map_err(|e| PipelineError::Internal(format!("Render task panicked: {}", e)))?;

        Ok(match verdict {
            Ok(svg) => Ok(RenderedArtifact::new(svg)),
            Err(message) => {
                warn!("Diagram rejected by render engine: {}", message);
                Err(RenderError {
                    message,
                    source_text: source.as_str().to_string(),
                })
            }
        })
    }
}

impl std::fmt::Debug for DiagramRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiagramRenderer")
            .field("engine", &"<dyn RenderEngine>")
            .field("prefix", &self.prefix)
            .field("counter", &self.counter)
            .finish()
    }
}
