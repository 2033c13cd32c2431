//! Grabación de la traza: misma ejecución que `run`, con un snapshot por step.

use std::fmt;
use std::path::Path;

use chrono::Utc;
use serde_json::{Map, Value};
use thiserror::Error;
use uuid::Uuid;

use super::trace::{AuditEntry, AuditTrace};
use super::writer::{writer_for_path, AuditError, AuditWriter};
use crate::constants::{AUDIT_FORMAT_VERSION, ENGINE_VERSION};
use crate::engine::executor::Executor;
use crate::engine::Footing;
use crate::errors::{ModelRunError, StepError};
use crate::hashing::hash_value;
use crate::model::Model;

/// Auditoría interrumpida por el fallo de un step. `trace` contiene las
/// entradas de los steps que completaron antes del fallo.
#[derive(Error)]
#[error("{error}")]
pub struct AuditFailure<M> {
    pub trace: AuditTrace<M>,
    #[source]
    pub error: ModelRunError,
}

impl<M> fmt::Debug for AuditFailure<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuditFailure")
         .field("completed_steps", &self.trace.step_names())
         .field("error", &self.error)
         .finish()
    }
}

fn changed_fields(previous: &Map<String, Value>, current: &Map<String, Value>) -> Vec<String> {
    current.iter()
           .filter(|(name, value)| previous.get(*name) != Some(*value))
           .map(|(name, _)| name.clone())
           .collect()
}

impl<M: Model> Footing<M> {
    /// Ejecuta todos los steps sobre una copia del estado y devuelve la traza.
    /// La instancia no se modifica.
    pub fn audit(&self) -> Result<AuditTrace<M>, AuditFailure<M>> {
        let schema = self.schema();
        let mut trace = AuditTrace { format_version: AUDIT_FORMAT_VERSION,
                                     engine_version: ENGINE_VERSION.to_string(),
                                     model: schema.name().to_string(),
                                     definition_hash: schema.definition_hash().to_string(),
                                     run_id: Uuid::new_v4(),
                                     started_at: Utc::now(),
                                     finished_at: None,
                                     initial: self.state().clone(),
                                     entries: Vec::with_capacity(schema.steps().len()) };
        log::debug!("audit {} of model {} started", trace.run_id, trace.model);

        let mut state = self.state().clone();
        let mut previous = schema.snapshot_fields(&state).unwrap_or_default();
        let entries = &mut trace.entries;
        let result = Executor::new(schema, self.config()).run_steps(&mut state, schema.steps(), |index, step, current| {
            let fields = schema.snapshot_fields(current)
                               .map_err(|e| StepError::new("SerializationError", e.to_string()))?;
            let changed = changed_fields(&previous, &fields);
            let fingerprint = hash_value(&Value::Object(fields.clone()));
            previous = fields;
            entries.push(AuditEntry { index,
                                      step: step.name().to_string(),
                                      method: step.method_name().to_string(),
                                      docstring: step.docstring().map(str::to_string),
                                      uses: step.uses().to_vec(),
                                      impacts: step.impacts().to_vec(),
                                      metadata: step.metadata().clone(),
                                      changed,
                                      fingerprint,
                                      state: current.clone() });
            Ok(())
        });

        match result {
            Ok(()) => {
                trace.finished_at = Some(Utc::now());
                log::info!("audit {} of model {} recorded {} step(s)", trace.run_id, trace.model, trace.len());
                Ok(trace)
            }
            Err(error) => {
                log::warn!("audit {} of model {} stopped after {} step(s)", trace.run_id, trace.model, trace.len());
                Err(AuditFailure { trace, error })
            }
        }
    }

    /// Audita y escribe la traza en `path`. El writer se elige por la
    /// extensión; si la auditoría falla no se escribe nada.
    pub fn audit_to(&self, path: impl AsRef<Path>) -> Result<AuditTrace<M>, AuditError> {
        let path = path.as_ref();
        let writer = writer_for_path(path)?;
        let trace = self.audit().map_err(|failure| AuditError::Run(failure.error))?;
        writer.write(&trace, path)?;
        Ok(trace)
    }
}
