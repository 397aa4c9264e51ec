//! Input resolution: read a local file into an [`UploadedFile`].
//!
//! The upload keeps only the final path component as its name, since the
//! name is used for nothing but suffix classification and as the multipart
//! file name sent to the converters.

use crate::artifact::UploadedFile;
use crate::error::PipelineError;
use std::io::ErrorKind;
use std::path::Path;
use tracing::debug;

/// Read `path` into memory.
pub async fn read_upload(path: impl AsRef<Path>) -> Result<UploadedFile, PipelineError> {
    let path = path.as_ref();

    let bytes = tokio::fs::read(path).await.map_err(|e| match e.kind() {
        ErrorKind::NotFound => PipelineError::FileNotFound {
            path: path.to_path_buf(),
        },
        ErrorKind::PermissionDenied => PipelineError::PermissionDenied {
            path: path.to_path_buf(),
        },
        _ => PipelineError::ReadFailed {
            path: path.to_path_buf(),
            source: e,
        },
    })?;

    let name = upload_name(path);
    debug!("Read {} ({} bytes)", name, bytes.len());
    Ok(UploadedFile::new(name, bytes))
}

/// The name an upload carries: the file name, or the whole path if it has none.
fn upload_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn reads_file_and_keeps_basename() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Script.PY");
        std::fs::write(&path, "print('hi')\n").unwrap();

        let upload = read_upload(&path).await.unwrap();
        assert_eq!(upload.name(), "Script.PY");
        assert_eq!(upload.bytes(), b"print('hi')\n");
    }

    #[tokio::test]
    async fn missing_file_is_file_not_found() {
        let err = read_upload("/definitely/not/a/real/file.mmd")
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::FileNotFound { .. }), "got {err:?}");
    }

    #[test]
    fn upload_name_falls_back_to_path() {
        assert_eq!(upload_name(Path::new("a/b/flow.mmd")), "flow.mmd");
        assert_eq!(upload_name(Path::new("..")), "..");
    }
}
