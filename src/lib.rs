//! # flow2nsd
//!
//! Turn source code or diagram text into a flowchart, then into a
//! Nassi–Shneiderman structogram.
//!
//! Python and Arduino files are translated into Mermaid-style diagram text by
//! a remote converter; diagram text files are used as-is. The text is
//! rendered locally into an SVG flowchart, and can be sent back to the
//! converter to obtain a structogram. Every artifact can be exported.
//!
//! ## Pipeline Overview
//!
//! ```text
//! file
//!  │
//!  ├─ 1. Classify   .py / .ino / anything else
//!  ├─ 2. Translate  POST /convert_python or /convert_arduino (skipped for text)
//!  ├─ 3. Normalise  BOM, CRLF, outer ``` fences
//!  ├─ 4. Render     mermaid-rs-renderer (CPU-bound, spawn_blocking)
//!  ├─ 5. Structogram POST /convert with the cached diagram text
//!  └─ 6. Export     flowchart.svg / flowchart.mmd / structogram.svg
//! ```
//!
//! All state lives in a [`PipelineController`]; see [`controller`] for the
//! stage machine and how overlapping requests are resolved.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use flow2nsd::{ExportFormat, ExportTarget, PipelineConfig, PipelineController};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = PipelineConfig::builder()
//!         .base_url("http://127.0.0.1:5000")
//!         .output_dir("out")
//!         .build()?;
//!     let pipeline = PipelineController::new(config)?;
//!
//!     pipeline.submit_path("script.py").await?;
//!     pipeline.convert_to_structogram().await?;
//!     pipeline.export(ExportTarget::Secondary, ExportFormat::Vector).await?;
//!     println!("{}", pipeline.stage());
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `flow2nsd` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! flow2nsd = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod artifact;
pub mod config;
pub mod controller;
pub mod error;
pub mod observer;
pub mod output;
pub mod pipeline;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use artifact::{
    DiagramSource, ExportFormat, ExportTarget, PipelineStage, RenderedArtifact, SourceKind,
    UploadedFile,
};
pub use config::{PipelineConfig, PipelineConfigBuilder};
pub use controller::PipelineController;
pub use error::{ConversionError, ExportGuard, PipelineError, RenderError};
pub use observer::{NoopObserver, Operation, PipelineObserver, SharedObserver};
pub use output::{
    Download, ExportOutcome, ExportedFile, PipelineSnapshot, StructogramOutcome, SubmitOutcome,
};
pub use pipeline::classify::classify;
pub use pipeline::export::ExportService;
pub use pipeline::gateway::{ConverterGateway, HttpGateway};
pub use pipeline::mermaid::MermaidEngine;
pub use pipeline::render::{DiagramRenderer, RenderEngine};
