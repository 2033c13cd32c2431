//! Persistencia de trazas de auditoría.

use std::fs;
use std::path::Path;

use serde::Serialize;
use thiserror::Error;

use super::trace::AuditTrace;
use crate::errors::ModelRunError;

#[derive(Debug, Error)]
pub enum AuditError {
    #[error(transparent)]
    Run(#[from] ModelRunError),
    #[error("could not write audit file {path}: {reason}")]
    Write { path: String, reason: String },
    #[error("audit output format '{0}' is not supported (supported: json)")]
    UnsupportedFormat(String),
    #[error("audit trace could not be serialized: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Destino de una traza de auditoría.
pub trait AuditWriter {
    fn format(&self) -> &'static str;

    fn write<M: Serialize>(&self, trace: &AuditTrace<M>, path: &Path) -> Result<(), AuditError>;
}

/// JSON legible (pretty) vía serde_json.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonAuditWriter;

impl AuditWriter for JsonAuditWriter {
    fn format(&self) -> &'static str {
        "json"
    }

    fn write<M: Serialize>(&self, trace: &AuditTrace<M>, path: &Path) -> Result<(), AuditError> {
        let body = serde_json::to_string_pretty(trace)?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| AuditError::Write { path: path.display().to_string(),
                                                                      reason: e.to_string() })?;
        }
        fs::write(path, body).map_err(|e| AuditError::Write { path: path.display().to_string(),
                                                             reason: e.to_string() })?;
        log::info!("audit trace of model {} written to {}", trace.model, path.display());
        Ok(())
    }
}

/// Writer correspondiente a la extensión de `path`.
pub fn writer_for_path(path: &Path) -> Result<JsonAuditWriter, AuditError> {
    let ext = path.extension()
                  .and_then(|e| e.to_str())
                  .map(str::to_ascii_lowercase)
                  .unwrap_or_default();
    match ext.as_str() {
        "json" => Ok(JsonAuditWriter),
        other => Err(AuditError::UnsupportedFormat(other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writer_is_chosen_by_extension() {
        assert_eq!(writer_for_path(Path::new("out/run.JSON")).unwrap().format(), "json");
        assert!(matches!(writer_for_path(Path::new("run.xlsx")), Err(AuditError::UnsupportedFormat(ext)) if ext == "xlsx"));
        assert!(matches!(writer_for_path(Path::new("run")), Err(AuditError::UnsupportedFormat(ext)) if ext.is_empty()));
    }
}
