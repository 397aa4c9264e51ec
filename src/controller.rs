//! The pipeline state machine.
//!
//! [`PipelineController`] owns everything the pipeline caches (the current
//! upload, its diagram text, the flowchart and the structogram) together
//! with the [`PipelineStage`]. Callers drive it through async methods and
//! read it back through [`PipelineController::stage`] and
//! [`PipelineController::snapshot`].
//!
//! ```text
//!            submit ok                 nsd ok
//!   Idle ───────────────▶ Rendered ───────────────▶ SecondaryRendered
//!    │                       │  ▲                        │
//!    │ submit, bad diagram   │  └──── submit ok ◀────────┤
//!    ▼                       ▼ nsd failed                 ▼
//!   RenderFailed ──nsd──▶ SecondaryFailed ◀──nsd failed───┘
//!
//!   reset: any stage ──▶ Idle
//! ```
//!
//! ## Last-committed-wins
//!
//! Methods take `&self` and may be called concurrently. The state sits behind
//! a mutex that is only held for bookkeeping, never across a network call or
//! a render. Each request takes a ticket when it is issued; when its result
//! arrives it is committed only if no newer request of the same kind (and no
//! reset) was issued in between. A structogram result is also dropped if
//! the diagram text it was computed from has since been replaced.
//! Dropped results come back as `Superseded`.

use crate::artifact::{
    DiagramSource, ExportFormat, ExportTarget, PipelineStage, RenderedArtifact, SourceKind,
    UploadedFile,
};
use crate::config::PipelineConfig;
use crate::error::{ConversionError, ExportGuard, PipelineError};
use crate::observer::{NoopObserver, Operation, PipelineObserver};
use crate::output::{ExportOutcome, PipelineSnapshot, StructogramOutcome, SubmitOutcome};
use crate::pipeline::export::{ExportService, MIME_TEXT};
use crate::pipeline::gateway::{ConverterGateway, HttpGateway};
use crate::pipeline::render::{DiagramRenderer, RenderEngine};
use crate::pipeline::{classify, input, normalize};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, info, warn};

/// Everything the controller caches, plus the ticket counters.
#[derive(Debug, Default)]
struct State {
    stage: PipelineStage,
    upload: Option<UploadedFile>,
    kind: Option<SourceKind>,
    source: Option<DiagramSource>,
    flowchart: Option<RenderedArtifact>,
    structogram: Option<RenderedArtifact>,
    render_error: Option<String>,
    structogram_error: Option<String>,

    /// Last submission ticket issued.
    submit_gen: u64,
    /// Last structogram ticket issued.
    structogram_gen: u64,
    /// Bumped whenever `source` is replaced or cleared.
    source_gen: u64,
}

impl State {
    /// Drop every cached artifact and return to `Idle`.
    ///
    /// Counters only move forward so tickets issued before the reset can
    /// never match again.
    fn clear(&mut self) {
        self.stage = PipelineStage::Idle;
        self.upload = None;
        self.kind = None;
        self.source = None;
        self.flowchart = None;
        self.structogram = None;
        self.render_error = None;
        self.structogram_error = None;
        self.submit_gen += 1;
        self.structogram_gen += 1;
        self.source_gen += 1;
    }

    fn snapshot(&self) -> PipelineSnapshot {
        PipelineSnapshot {
            stage: self.stage,
            file_name: self.upload.as_ref().map(|u| u.name().to_string()),
            source_kind: self.kind,
            diagram_source: self.source.clone(),
            flowchart: self.flowchart.clone(),
            structogram: self.structogram.clone(),
            render_error: self.render_error.clone(),
            structogram_error: self.structogram_error.clone(),
        }
    }
}

/// Drives files through classify → translate → render → structogram → export.
///
/// Construct one per session and share it (`Arc<PipelineController>`)
/// wherever the UI needs it.
pub struct PipelineController {
    config: PipelineConfig,
    gateway: Arc<dyn ConverterGateway>,
    renderer: DiagramRenderer,
    exporter: ExportService,
    observer: Arc<dyn PipelineObserver>,
    state: Mutex<State>,
}

impl PipelineController {
    /// Controller talking HTTP to `config.base_url`, rendering with
    /// [`MermaidEngine`](crate::MermaidEngine) and exporting into
    /// `config.output_dir`.
    pub fn new(config: PipelineConfig) -> Result<Self, PipelineError> {
        let gateway = Arc::new(HttpGateway::new(&config)?);
        Ok(Self::with_gateway(config, gateway))
    }

    /// Controller using a caller-supplied gateway.
    pub fn with_gateway(config: PipelineConfig, gateway: Arc<dyn ConverterGateway>) -> Self {
        let renderer = DiagramRenderer::new(config.render_id_prefix.clone());
        let exporter = ExportService::new(config.output_dir.clone());
        Self {
            config,
            gateway,
            renderer,
            exporter,
            observer: Arc::new(NoopObserver),
            state: Mutex::new(State::default()),
        }
    }

    /// Replace the render engine.
    pub fn with_engine(mut self, engine: Arc<dyn RenderEngine>) -> Self {
        self.renderer = DiagramRenderer::with_engine(engine, self.config.render_id_prefix.clone());
        self
    }

    /// Attach an observer for stage changes and failures.
    pub fn with_observer(mut self, observer: Arc<dyn PipelineObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Current stage.
    pub fn stage(&self) -> PipelineStage {
        self.lock().stage
    }

    /// Copy of everything currently cached.
    pub fn snapshot(&self) -> PipelineSnapshot {
        self.lock().snapshot()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        // Every critical section leaves State consistent, so a panic in
        // another holder does not invalidate it.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn notify_stage(&self, from: PipelineStage, to: PipelineStage) {
        if from != to {
            info!("Stage: {} → {}", from, to);
            self.observer.on_stage_change(from, to);
        }
    }

    fn notify_stale(&self, operation: Operation) {
        warn!("Discarding stale {:?} result", operation);
        self.observer.on_stale_result(operation);
    }

    // ── Submission ───────────────────────────────────────────────────────

    /// Read a local file and submit it.
    pub async fn submit_path(&self, path: impl AsRef<Path>) -> Result<SubmitOutcome, PipelineError> {
        let file = input::read_upload(path).await?;
        self.submit_file(file).await
    }

    /// Classify `file`, obtain its diagram text and render it.
    ///
    /// # Errors
    /// A failed translation is returned as [`PipelineError::Conversion`] and
    /// nothing is committed: the stage and every cached artifact stay as
    /// they were. A diagram the engine rejects is *not* an error; it commits
    /// [`PipelineStage::RenderFailed`] and returns
    /// [`SubmitOutcome::RenderFailed`].
    pub async fn submit_file(&self, file: UploadedFile) -> Result<SubmitOutcome, PipelineError> {
        let ticket = {
            let mut state = self.lock();
            state.submit_gen += 1;
            state.submit_gen
        };

        let kind = classify::classify(file.name());
        info!("Submitting {} as {}", file.name(), kind);

        let raw = match kind {
            SourceKind::PythonSource => self.gateway.translate_python(&file).await,
            SourceKind::ArduinoSource => self.gateway.translate_arduino(&file).await,
            SourceKind::DiagramText => Ok(DiagramSource::new(file.text())),
        };

        let raw = match raw {
            Ok(raw) => raw,
            Err(e) => return self.translation_failed(ticket, e),
        };

        let source = DiagramSource::new(normalize::normalize_source(raw.as_str()));
        debug!("Diagram text for {}: {} bytes", file.name(), source.as_str().len());

        // Skip the render entirely if we are already stale.
        if self.lock().submit_gen != ticket {
            self.notify_stale(Operation::Submit);
            return Ok(SubmitOutcome::Superseded);
        }

        let rendered = self.renderer.render(&source).await?;

        let (from, to) = {
            let mut state = self.lock();
            if state.submit_gen != ticket {
                drop(state);
                self.notify_stale(Operation::Submit);
                return Ok(SubmitOutcome::Superseded);
            }

            let from = state.stage;
            state.upload = Some(file);
            state.kind = Some(kind);
            state.source = Some(source);
            state.source_gen += 1;
            state.structogram = None;
            state.structogram_error = None;
            match &rendered {
                Ok(svg) => {
                    state.flowchart = Some(svg.clone());
                    state.render_error = None;
                    state.stage = PipelineStage::Rendered;
                }
                Err(e) => {
                    state.flowchart = None;
                    state.render_error = Some(e.message.clone());
                    state.stage = PipelineStage::RenderFailed;
                }
            }
            (from, state.stage)
        };

        self.notify_stage(from, to);
        Ok(match rendered {
            Ok(flowchart) => SubmitOutcome::Rendered { kind, flowchart },
            Err(error) => {
                self.observer.on_render_error(&error);
                SubmitOutcome::RenderFailed { kind, error }
            }
        })
    }

    fn translation_failed(
        &self,
        ticket: u64,
        error: ConversionError,
    ) -> Result<SubmitOutcome, PipelineError> {
        if self.lock().submit_gen != ticket {
            self.notify_stale(Operation::Submit);
            return Ok(SubmitOutcome::Superseded);
        }
        warn!("Translation failed: {}", error);
        self.observer.on_conversion_error(&error);
        Err(error.into())
    }

    // ── Structogram ──────────────────────────────────────────────────────

    /// Convert the cached diagram text into a structogram.
    ///
    /// With no diagram text loaded this is a no-op that returns
    /// [`StructogramOutcome::NothingToConvert`].
    ///
    /// # Errors
    /// A converter failure first commits [`PipelineStage::SecondaryFailed`]
    /// (discarding any previous structogram, keeping the flowchart) and is
    /// then returned as [`PipelineError::Conversion`].
    pub async fn convert_to_structogram(&self) -> Result<StructogramOutcome, PipelineError> {
        let (ticket, source_gen, source) = {
            let mut state = self.lock();
            let Some(source) = state.source.clone() else {
                debug!("Structogram requested with no diagram loaded");
                return Ok(StructogramOutcome::NothingToConvert(ExportGuard::NoDiagramSource));
            };
            state.structogram_gen += 1;
            (state.structogram_gen, state.source_gen, source)
        };

        info!("Requesting structogram ({} bytes)", source.as_str().len());
        let result = self.gateway.to_structogram(&source).await;

        let (from, to) = {
            let mut state = self.lock();
            if state.structogram_gen != ticket || state.source_gen != source_gen {
                drop(state);
                self.notify_stale(Operation::Structogram);
                return Ok(StructogramOutcome::Superseded);
            }

            let from = state.stage;
            match &result {
                Ok(svg) => {
                    state.structogram = Some(svg.clone());
                    state.structogram_error = None;
                    state.stage = PipelineStage::SecondaryRendered;
                }
                Err(e) => {
                    state.structogram = None;
                    state.structogram_error = Some(e.to_string());
                    state.stage = PipelineStage::SecondaryFailed;
                }
            }
            (from, state.stage)
        };

        self.notify_stage(from, to);
        match result {
            Ok(svg) => {
                info!("Structogram ready ({} bytes)", svg.markup().len());
                Ok(StructogramOutcome::Rendered(svg))
            }
            Err(e) => {
                warn!("Structogram conversion failed: {}", e);
                self.observer.on_conversion_error(&e);
                Err(e.into())
            }
        }
    }

    // ── Reset ────────────────────────────────────────────────────────────

    /// Drop everything and return to [`PipelineStage::Idle`].
    ///
    /// Idempotent. Requests still in flight will come back `Superseded`.
    pub fn reset(&self) {
        let from = {
            let mut state = self.lock();
            let from = state.stage;
            state.clear();
            from
        };
        debug!("Pipeline reset");
        self.notify_stage(from, PipelineStage::Idle);
    }

    // ── Export ───────────────────────────────────────────────────────────

    /// Save a cached artifact into the configured output directory.
    ///
    /// Never changes the stage. A missing artifact returns
    /// [`ExportOutcome::Skipped`].
    pub async fn export(
        &self,
        target: ExportTarget,
        format: ExportFormat,
    ) -> Result<ExportOutcome, PipelineError> {
        let picked = {
            let state = self.lock();
            pick_export(&state, &self.config, target, format)
        };

        let (content, filename, form) = match picked {
            Ok(p) => p,
            Err(guard) => {
                debug!("Export {:?}/{:?} skipped: {}", target, format, guard);
                return Ok(ExportOutcome::Skipped(guard));
            }
        };

        let saved = match form {
            ExportFormat::DiagramText => {
                self.exporter
                    .export_text(&content, &filename, MIME_TEXT)
                    .await?
            }
            ExportFormat::Vector => self.exporter.export_vector(&content, &filename).await?,
        };
        info!("Exported {}", saved.path.display());
        Ok(ExportOutcome::Saved(saved))
    }
}

/// Resolve an export request to `(content, filename, format)` from the cache.
fn pick_export(
    state: &State,
    config: &PipelineConfig,
    target: ExportTarget,
    format: ExportFormat,
) -> Result<(String, String, ExportFormat), ExportGuard> {
    match (target, format) {
        (ExportTarget::Primary, ExportFormat::Vector) => state
            .flowchart
            .as_ref()
            .map(|svg| (svg.markup().to_string(), config.flowchart_svg_name.clone(), format))
            .ok_or(ExportGuard::NoFlowchart),
        (ExportTarget::Primary, ExportFormat::DiagramText) => state
            .source
            .as_ref()
            .map(|src| (src.as_str().to_string(), config.flowchart_source_name.clone(), format))
            .ok_or(ExportGuard::NoDiagramSource),
        (ExportTarget::Secondary, ExportFormat::Vector) => state
            .structogram
            .as_ref()
            .map(|svg| (svg.markup().to_string(), config.structogram_svg_name.clone(), format))
            .ok_or(ExportGuard::NoStructogram),
        (ExportTarget::Secondary, ExportFormat::DiagramText) => Err(ExportGuard::NoTextForm),
    }
}

impl std::fmt::Debug for PipelineController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PipelineController")
            .field("config", &self.config)
            .field("renderer", &self.renderer)
            .field("exporter", &self.exporter)
            .field("stage", &self.stage())
            .finish()
    }
}
