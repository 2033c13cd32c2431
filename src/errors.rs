use thiserror::Error;

use footings_core::{AuditError, FootingsError, RunError};

/// Errores del binario.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Footings(#[from] FootingsError),
    #[error(transparent)]
    Run(#[from] RunError),
    #[error(transparent)]
    Audit(#[from] AuditError),
    #[error("could not render output: {0}")]
    Output(#[from] serde_json::Error),
    #[error("{failed} of {total} records failed")]
    Foreach { failed: usize, total: usize },
}
