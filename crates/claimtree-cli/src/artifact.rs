//! # Artifact I/O
//!
//! JSON artifacts are rendered with 4-space indentation and a trailing
//! newline. Writes land in a temporary file beside the destination and are
//! renamed into place, so a destination either holds a complete artifact or
//! is left as it was. [`write_artifacts`] stages a whole batch before the
//! first rename, so a failure while rendering or staging leaves every
//! destination untouched.

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tempfile::NamedTempFile;

/// Render `value` as an artifact string.
pub fn to_json_string<T: Serialize>(value: &T) -> Result<String> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value
        .serialize(&mut ser)
        .context("failed to serialize artifact")?;
    buf.push(b'\n');
    String::from_utf8(buf).context("serialized artifact is not UTF-8")
}

/// Read and parse a JSON artifact.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("failed to parse {}", path.display()))
}

/// Write `value` to `path` atomically, creating parent directories.
pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    write_artifacts(&[(path, to_json_string(value)?)])
}

/// Write pre-rendered artifacts, staging all of them before renaming any.
pub fn write_artifacts(artifacts: &[(&Path, String)]) -> Result<()> {
    let staged = artifacts
        .iter()
        .map(|(path, rendered)| stage(path, rendered))
        .collect::<Result<Vec<_>>>()?;
    for ((path, rendered), tmp) in artifacts.iter().zip(staged) {
        tmp.persist(path)
            .map_err(|e| e.error)
            .with_context(|| format!("failed to move artifact into place: {}", path.display()))?;
        tracing::debug!(path = %path.display(), bytes = rendered.len(), "wrote artifact");
    }
    Ok(())
}

fn stage(path: &Path, rendered: &str) -> Result<NamedTempFile> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create directory: {}", dir.display()))?;

    let mut tmp = NamedTempFile::new_in(dir)
        .with_context(|| format!("failed to create temporary file in {}", dir.display()))?;
    tmp.write_all(rendered.as_bytes())
        .with_context(|| format!("failed to write temporary file for {}", path.display()))?;
    tmp.as_file()
        .sync_all()
        .with_context(|| format!("failed to flush {}", path.display()))?;
    Ok(tmp)
}
