//! Export: turn a cached artifact into a downloadable file.
//!
//! Exports always work from the strings the controller cached at conversion
//! time, never from a re-render or a re-fetch, so the bytes saved are exactly
//! the bytes the converter or engine produced.
//!
//! Files are written atomically: the blob goes to a temp file in the target
//! directory first and is then renamed over the final name, so a crash
//! never leaves a half-written SVG behind.

use crate::error::PipelineError;
use crate::output::{Download, ExportedFile};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

pub const MIME_TEXT: &str = "text/plain";
pub const MIME_SVG: &str = "image/svg+xml";

/// Saves downloads into a fixed directory.
#[derive(Debug, Clone)]
pub struct ExportService {
    output_dir: PathBuf,
}

impl ExportService {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    /// Save `content` as a text file.
    pub async fn export_text(
        &self,
        content: &str,
        filename: &str,
        mime_type: &'static str,
    ) -> Result<ExportedFile, PipelineError> {
        self.save(Download {
            filename: filename.to_string(),
            mime_type,
            bytes: content.as_bytes().to_vec(),
        })
        .await
    }

    /// Save SVG markup.
    pub async fn export_vector(
        &self,
        markup: &str,
        filename: &str,
    ) -> Result<ExportedFile, PipelineError> {
        self.export_text(markup, filename, MIME_SVG).await
    }

    /// Write a blob to `output_dir/filename` atomically.
    pub async fn save(&self, download: Download) -> Result<ExportedFile, PipelineError> {
        let dir = self.output_dir.clone();
        let path = dir.join(&download.filename);

        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| PipelineError::OutputWriteFailed {
                path: path.clone(),
                source: e,
            })?;

        let target = path.clone();
        let bytes = download.bytes;
        let len = bytes.len();
        tokio::task::spawn_blocking(move || write_atomic(&dir, &target, &bytes))
            .await
            .map_err(|e| PipelineError::Internal(format!("Export task panicked: {}", e)))?
            .map_err(|e| PipelineError::OutputWriteFailed {
                path: path.clone(),
                source: e,
            })?;

        info!("Exported {} ({} bytes, {})", path.display(), len, download.mime_type);
        Ok(ExportedFile {
            path,
            mime_type: download.mime_type.to_string(),
            bytes_written: len,
        })
    }
}

fn write_atomic(dir: &Path, target: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    tmp.write_all(bytes)?;
    tmp.flush()?;
    tmp.persist(target).map_err(|e| e.error)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn export_vector_writes_exact_markup() {
        let dir = tempfile::tempdir().unwrap();
        let svc = ExportService::new(dir.path());
        let markup = "<svg xmlns=\"http://www.w3.org/2000/svg\"><rect/></svg>";

        let saved = svc.export_vector(markup, "flowchart.svg").await.unwrap();
        assert_eq!(saved.path, dir.path().join("flowchart.svg"));
        assert_eq!(saved.mime_type, MIME_SVG);
        assert_eq!(saved.bytes_written, markup.len());
        assert_eq!(std::fs::read_to_string(&saved.path).unwrap(), markup);
    }

    #[tokio::test]
    async fn export_text_overwrites_previous_file() {
        let dir = tempfile::tempdir().unwrap();
        let svc = ExportService::new(dir.path());
        svc.export_text("first", "flowchart.mmd", MIME_TEXT).await.unwrap();
        let saved = svc
            .export_text("graph TD; A-->B;", "flowchart.mmd", MIME_TEXT)
            .await
            .unwrap();
        assert_eq!(saved.mime_type, "text/plain");
        assert_eq!(
            std::fs::read_to_string(saved.path).unwrap(),
            "graph TD; A-->B;"
        );
    }

    #[tokio::test]
    async fn creates_missing_output_dir() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("exports/today");
        let svc = ExportService::new(&nested);
        let saved = svc.export_vector("<svg/>", "structogram.svg").await.unwrap();
        assert!(saved.path.starts_with(&nested));
        assert!(saved.path.exists());
    }
}
