use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// Registro de un step auditado. `state` es una copia propia del estado tras
/// el step; steps posteriores no la alteran.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry<M> {
    pub index: usize,
    pub step: String,
    pub method: String,
    pub docstring: Option<String>,
    pub uses: Vec<String>,
    pub impacts: Vec<String>,
    #[serde(default)]
    pub metadata: Map<String, Value>,
    /// Campos cuyo valor serializado cambió respecto del snapshot anterior.
    pub changed: Vec<String>,
    /// blake3 del snapshot serializado.
    pub fingerprint: String,
    pub state: M,
}

/// Traza ordenada de una auditoría.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditTrace<M> {
    pub format_version: u32,
    pub engine_version: String,
    pub model: String,
    pub definition_hash: String,
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub initial: M,
    pub entries: Vec<AuditEntry<M>>,
}

impl<M> AuditTrace<M> {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn step_names(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.step.as_str()).collect()
    }

    pub fn entry(&self, step: &str) -> Option<&AuditEntry<M>> {
        self.entries.iter().find(|e| e.step == step)
    }

    /// Estado tras el último step registrado (o el inicial si no hay ninguno).
    pub fn final_state(&self) -> &M {
        self.entries.last().map(|e| &e.state).unwrap_or(&self.initial)
    }

    /// Pares `(step, snapshot)` en orden de ejecución.
    pub fn snapshots(&self) -> impl Iterator<Item = (&str, &M)> {
        self.entries.iter().map(|e| (e.step.as_str(), &e.state))
    }

    /// Hash agregado de los fingerprints de cada entrada, en orden.
    pub fn fingerprint(&self) -> String {
        let joined = self.entries
                         .iter()
                         .map(|e| e.fingerprint.as_str())
                         .collect::<Vec<_>>()
                         .join("|");
        crate::hashing::hash_str(&joined)
    }
}
