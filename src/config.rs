//! Configuration for the conversion pipeline.
//!
//! Every knob lives in [`PipelineConfig`], built via its
//! [`PipelineConfigBuilder`]. The builder lets callers override only the
//! converter address or one export name and rely on documented defaults for
//! the rest.

use crate::error::PipelineError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for a conversion session.
///
/// # Example
/// ```rust
/// use flow2nsd::PipelineConfig;
///
/// let config = PipelineConfig::builder()
///     .base_url("http://localhost:8080")
///     .request_timeout_secs(10)
///     .output_dir("out")
///     .build()
///     .unwrap();
/// assert_eq!(config.endpoint_url(&config.python_endpoint), "http://localhost:8080/convert_python");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Scheme + authority of the converter server. Default: `http://127.0.0.1:5000`.
    pub base_url: String,

    /// Path of the Python → diagram text endpoint. Default: `/convert_python`.
    pub python_endpoint: String,

    /// Path of the Arduino → diagram text endpoint. Default: `/convert_arduino`.
    pub arduino_endpoint: String,

    /// Path of the diagram text → structogram SVG endpoint. Default: `/convert`.
    pub structogram_endpoint: String,

    /// Upper bound on a single converter round-trip, in seconds. Default: 30.
    ///
    /// Applies to the whole request including upload and body download. A
    /// request that exceeds it fails with
    /// [`crate::error::ConversionError::Timeout`]; it is never retried.
    pub request_timeout_secs: u64,

    /// Directory exported files are written to. Default: current directory.
    pub output_dir: PathBuf,

    /// File name for the exported flowchart SVG. Default: `flowchart.svg`.
    pub flowchart_svg_name: String,

    /// File name for the exported diagram text. Default: `flowchart.mmd`.
    pub flowchart_source_name: String,

    /// File name for the exported structogram SVG. Default: `structogram.svg`.
    pub structogram_svg_name: String,

    /// File name given to the in-memory diagram text uploaded to the
    /// structogram endpoint. Default: `diagram.mmd`.
    pub structogram_upload_name: String,

    /// Prefix for render ids; each render gets `"{prefix}-{n}"`. Default: `flowchart-graph`.
    pub render_id_prefix: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:5000".to_string(),
            python_endpoint: "/convert_python".to_string(),
            arduino_endpoint: "/convert_arduino".to_string(),
            structogram_endpoint: "/convert".to_string(),
            request_timeout_secs: 30,
            output_dir: PathBuf::from("."),
            flowchart_svg_name: "flowchart.svg".to_string(),
            flowchart_source_name: "flowchart.mmd".to_string(),
            structogram_svg_name: "structogram.svg".to_string(),
            structogram_upload_name: "diagram.mmd".to_string(),
            render_id_prefix: "flowchart-graph".to_string(),
        }
    }
}

impl PipelineConfig {
    /// Create a new builder for `PipelineConfig`.
    pub fn builder() -> PipelineConfigBuilder {
        PipelineConfigBuilder {
            config: Self::default(),
        }
    }

    /// Join `base_url` and an endpoint path without doubling the slash.
    pub fn endpoint_url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

/// Builder for [`PipelineConfig`].
#[derive(Debug)]
pub struct PipelineConfigBuilder {
    config: PipelineConfig,
}

impl PipelineConfigBuilder {
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = url.into();
        self
    }

    pub fn python_endpoint(mut self, path: impl Into<String>) -> Self {
        self.config.python_endpoint = path.into();
        self
    }

    pub fn arduino_endpoint(mut self, path: impl Into<String>) -> Self {
        self.config.arduino_endpoint = path.into();
        self
    }

    pub fn structogram_endpoint(mut self, path: impl Into<String>) -> Self {
        self.config.structogram_endpoint = path.into();
        self
    }

    pub fn request_timeout_secs(mut self, secs: u64) -> Self {
        self.config.request_timeout_secs = secs;
        self
    }

    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.output_dir = dir.into();
        self
    }

    pub fn flowchart_svg_name(mut self, name: impl Into<String>) -> Self {
        self.config.flowchart_svg_name = name.into();
        self
    }

    pub fn flowchart_source_name(mut self, name: impl Into<String>) -> Self {
        self.config.flowchart_source_name = name.into();
        self
    }

    pub fn structogram_svg_name(mut self, name: impl Into<String>) -> Self {
        self.config.structogram_svg_name = name.into();
        self
    }

    pub fn render_id_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.config.render_id_prefix = prefix.into();
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<PipelineConfig, PipelineError> {
        let c = &self.config;
        if !(c.base_url.starts_with("http://") || c.base_url.starts_with("https://")) {
            return Err(PipelineError::InvalidConfig(format!(
                "base URL must start with http:// or https://, got '{}'",
                c.base_url
            )));
        }
        if c.request_timeout_secs == 0 {
            return Err(PipelineError::InvalidConfig(
                "Request timeout must be ≥ 1 second".into(),
            ));
        }
        for name in [
            &c.flowchart_svg_name,
            &c.flowchart_source_name,
            &c.structogram_svg_name,
        ] {
            if name.is_empty() || name.contains('/') || name.contains('\\') {
                return Err(PipelineError::InvalidConfig(format!(
                    "export file name must be a bare file name, got '{name}'"
                )));
            }
        }
        if c.render_id_prefix.is_empty()
            || !c
                .render_id_prefix
                .chars()
                .all(|ch| ch.is_ascii_alphanumeric() || ch == '-' || ch == '_')
        {
            return Err(PipelineError::InvalidConfig(format!(
                "render id prefix must be non-empty ASCII letters, digits, '-' or '_', got '{}'",
                c.render_id_prefix
            )));
        }
        Ok(self.config)
    }
}
