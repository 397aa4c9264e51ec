//! Route selection from the uploaded file name.

use crate::artifact::SourceKind;

/// Classify an upload by its file-name suffix, case-insensitively.
///
/// `.py` → Python, `.ino` → Arduino, everything else (including no
/// extension at all) → diagram text.
pub fn classify(name: &str) -> SourceKind {
    let lower = name.to_lowercase();
    if lower.ends_with(".py") {
        SourceKind::PythonSource
    } else if lower.ends_with(".ino") {
        SourceKind::ArduinoSource
    } else {
        SourceKind::DiagramText
    }
}
