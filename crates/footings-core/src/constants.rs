//! Constantes del motor core.
//!
//! `ENGINE_VERSION` forma parte del input del `definition_hash` de cada
//! `ModelSchema`: cambiarla invalida los hashes de definición aunque el
//! modelo no cambie.

/// Versión lógica del motor de ejecución de modelos.
pub const ENGINE_VERSION: &str = "F1.0";

/// Versión del formato JSON producido por `JsonAuditWriter`.
pub const AUDIT_FORMAT_VERSION: u32 = 1;
