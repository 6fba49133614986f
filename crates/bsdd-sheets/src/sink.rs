//! JSON output
//!
//! Documents are written pretty-printed (two-space indent) with a trailing
//! newline. Writing goes through a temporary file next to the destination
//! that is renamed into place once complete; a failed run leaves no file.

use std::io::Write;
use std::path::Path;

use serde_json::Value;
use tempfile::NamedTempFile;

use crate::error::{ConvertError, ConvertResult};

/// Render a document as pretty JSON with a trailing newline
pub fn render_json(document: &Value) -> ConvertResult<String> {
    let mut text = serde_json::to_string_pretty(document)?;
    text.push('\n');
    Ok(text)
}

/// Write a document to `path`, replacing any existing file
pub fn write_json<P: AsRef<Path>>(document: &Value, path: P) -> ConvertResult<()> {
    let path = path.as_ref();
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let text = render_json(document)?;
    let mut temp = NamedTempFile::new_in(dir)?;
    temp.write_all(text.as_bytes())?;
    temp.as_file().sync_all()?;

    temp.persist(path).map_err(|e| ConvertError::Persist {
        path: path.to_path_buf(),
        source: e.error,
    })?;

    tracing::debug!(path = %path.display(), "document written");
    Ok(())
}
