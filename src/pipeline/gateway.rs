//! Remote converters: Python/Arduino → diagram text, diagram text → structogram.
//!
//! All three endpoints share one contract: a `POST` with a single multipart
//! field named `file`, answered by a raw text body. A non-success status or
//! a blank body is a failure just like a refused connection.
//!
//! ## Why no retry?
//!
//! Each call is the direct result of a user action. If it fails the user sees
//! the error and decides whether to try again; a silent retry would only
//! delay that and could land after a newer request (see
//! [`crate::controller`] for how stale results are discarded).

use crate::artifact::{DiagramSource, RenderedArtifact, UploadedFile};
use crate::config::PipelineConfig;
use crate::error::{ConversionError, PipelineError};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// The three remote conversions the pipeline depends on.
///
/// [`HttpGateway`] is the production implementation; tests and embedders can
/// substitute their own.
#[async_trait]
pub trait ConverterGateway: Send + Sync {
    /// Translate a Python source file into diagram text.
    async fn translate_python(&self, file: &UploadedFile) -> Result<DiagramSource, ConversionError>;

    /// Translate an Arduino sketch into diagram text.
    async fn translate_arduino(&self, file: &UploadedFile)
        -> Result<DiagramSource, ConversionError>;

    /// Convert diagram text into a structogram SVG.
    async fn to_structogram(
        &self,
        source: &DiagramSource,
    ) -> Result<RenderedArtifact, ConversionError>;
}

/// [`ConverterGateway`] backed by an HTTP converter server.
#[derive(Debug, Clone)]
pub struct HttpGateway {
    client: reqwest::Client,
    python_url: String,
    arduino_url: String,
    structogram_url: String,
    upload_name: String,
    timeout_secs: u64,
}

impl HttpGateway {
    /// Build a gateway for the endpoints named in `config`.
    pub fn new(config: &PipelineConfig) -> Result<Self, PipelineError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .user_agent(concat!("flow2nsd/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| PipelineError::Internal(format!("HTTP client: {e}")))?;

        Ok(Self {
            client,
            python_url: config.endpoint_url(&config.python_endpoint),
            arduino_url: config.endpoint_url(&config.arduino_endpoint),
            structogram_url: config.endpoint_url(&config.structogram_endpoint),
            upload_name: config.structogram_upload_name.clone(),
            timeout_secs: config.request_timeout_secs,
        })
    }

    /// Upload `part` as field `file` and return the non-empty response text.
    async fn post_file(&self, url: &str, part: Part) -> Result<String, ConversionError> {
        let start = Instant::now();
        let form = Form::new().part("file", part);

        let response = self
            .client
            .post(url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| self.transport_error(url, e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| self.transport_error(url, e))?;

        if !status.is_success() {
            warn!("{} answered HTTP {}", url, status);
            return Err(ConversionError::HttpStatus {
                endpoint: url.to_string(),
                status: status.as_u16(),
                body: truncate(&body, 200),
            });
        }

        if body.trim().is_empty() {
            warn!("{} answered with an empty body", url);
            return Err(ConversionError::EmptyBody {
                endpoint: url.to_string(),
            });
        }

        debug!(
            "{} → {} bytes in {:?}",
            url,
            body.len(),
            start.elapsed()
        );
        Ok(body)
    }

    fn transport_error(&self, url: &str, e: reqwest::Error) -> ConversionError {
        if e.is_timeout() {
            ConversionError::Timeout {
                endpoint: url.to_string(),
                secs: self.timeout_secs,
            }
        } else {
            ConversionError::Unreachable {
                endpoint: url.to_string(),
                reason: e.to_string(),
            }
        }
    }

    async fn translate(
        &self,
        url: &str,
        file: &UploadedFile,
    ) -> Result<DiagramSource, ConversionError> {
        let part = Part::bytes(file.bytes().to_vec()).file_name(file.name().to_string());
        let text = self.post_file(url, part).await?;
        Ok(DiagramSource::new(text))
    }
}

#[async_trait]
impl ConverterGateway for HttpGateway {
    async fn translate_python(&self, file: &UploadedFile) -> Result<DiagramSource, ConversionError> {
        self.translate(&self.python_url, file).await
    }

    async fn translate_arduino(
        &self,
        file: &UploadedFile,
    ) -> Result<DiagramSource, ConversionError> {
        self.translate(&self.arduino_url, file).await
    }

    async fn to_structogram(
        &self,
        source: &DiagramSource,
    ) -> Result<RenderedArtifact, ConversionError> {
        // The structogram endpoint expects a file upload; wrap the text as one.
        let part = Part::text(source.as_str().to_string())
            .file_name(self.upload_name.clone())
            .mime_str("text/plain")
            .map_err(|e| ConversionError::Unreachable {
                endpoint: self.structogram_url.clone(),
                reason: e.to_string(),
            })?;
        let markup = self.post_file(&self.structogram_url, part).await?;
        Ok(RenderedArtifact::new(markup))
    }
}

/// Cap error bodies so an HTML error page does not flood the terminal.
fn truncate(s: &str, max_chars: usize) -> String {
    let trimmed = s.trim();
    if trimmed.chars().count() <= max_chars {
        trimmed.to_string()
    } else {
        let cut: String = trimmed.chars().take(max_chars).collect();
        format!("{cut}\u{2026}")
    }
}
