//! Observer trait for pipeline events.
//!
//! Inject an [`Arc<dyn PipelineObserver>`] via
//! [`crate::PipelineController::with_observer`] to hear about stage changes
//! and failures as they are committed. A UI layer hides and shows its panels
//! from `on_stage_change` instead of tracking its own visibility flags.
//!
//! # Example
//!
//! ```rust
//! use flow2nsd::{PipelineObserver, PipelineStage};
//! use std::sync::Mutex;
//!
//! #[derive(Default)]
//! struct StageLog(Mutex<Vec<PipelineStage>>);
//!
//! impl PipelineObserver for StageLog {
//!     fn on_stage_change(&self, _from: PipelineStage, to: PipelineStage) {
//!         self.0.lock().unwrap().push(to);
//!     }
//! }
//! ```

use crate::artifact::PipelineStage;
use crate::error::{ConversionError, RenderError};
use std::sync::Arc;

/// Which controller operation a discarded result belonged to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Submit,
    Structogram,
}

/// Called by the controller after each committed transition.
///
/// Implementations must be `Send + Sync`: the controller can be shared
/// across tasks. All methods default to no-ops so callers only override what
/// they care about. Callbacks run while no controller lock is held, so they
/// may call back into the controller.
pub trait PipelineObserver: Send + Sync {
    /// The stage moved from `from` to `to`. Not called when they are equal.
    fn on_stage_change(&self, from: PipelineStage, to: PipelineStage) {
        let _ = (from, to);
    }

    /// A converter call failed. For submissions nothing was committed; for
    /// structograms the stage is now `SecondaryFailed`.
    fn on_conversion_error(&self, error: &ConversionError) {
        let _ = error;
    }

    /// The render engine rejected the diagram; the stage is `RenderFailed`.
    fn on_render_error(&self, error: &RenderError) {
        let _ = error;
    }

    /// A result arrived after a newer request or a reset and was dropped.
    fn on_stale_result(&self, operation: Operation) {
        let _ = operation;
    }
}

/// A no-op implementation; the default when no observer is configured.
pub struct NoopObserver;

impl PipelineObserver for NoopObserver {}

/// Convenience alias for the type stored in the controller.
pub type SharedObserver = Arc<dyn PipelineObserver>;
