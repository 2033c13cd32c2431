//! Auditoría de ejecuciones.
//!
//! `Footing::audit` re-ejecuta la secuencia completa de steps sobre una copia
//! del estado y guarda un snapshot independiente tras cada step. Los writers
//! persisten la traza; el formato se elige por extensión de archivo.

pub mod recorder;
pub mod trace;
pub mod writer;

pub use recorder::AuditFailure;
pub use trace::{AuditEntry, AuditTrace};
pub use writer::{writer_for_path, AuditError, AuditWriter, JsonAuditWriter};
