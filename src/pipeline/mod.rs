//! Pipeline stages for file → flowchart → structogram conversion.
//!
//! Each submodule implements exactly one step so it can be tested alone and
//! swapped (a different render engine, a mock converter) without touching
//! the others. [`crate::controller`] composes them.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ classify ──▶ gateway (py/ino) ──┐
//!                   └──▶ read text ─────────┴─▶ normalize ──▶ render ──▶ gateway (nsd)
//!                                                                 └─────────▶ export
//! ```
//!
//! 1. [`input`]: read a local file into an upload
//! 2. [`classify`]: pick the route from the file-name suffix
//! 3. [`gateway`]: the remote converters; the only stage with network I/O
//! 4. [`normalize`]: strip BOMs, CRLF, and outer code fences from diagram text
//! 5. [`render`]: diagram text → SVG on a blocking thread, with
//!    [`mermaid`] as the default engine
//! 6. [`export`]: atomic save of cached artifacts

pub mod classify;
pub mod export;
pub mod gateway;
pub mod input;
pub mod mermaid;
pub mod normalize;
pub mod render;
