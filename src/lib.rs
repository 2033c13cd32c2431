//! Footings
//!
//! Este crate agrupa los dos componentes de la librería y la capa de
//! aplicación:
//! - `footings_core`: declaración, validación, ejecución y auditoría de
//!   modelos.
//! - `footings_dispatch`: tabla de despacho por claves.
//! - `config`, `logging`, `foreach` y el modelo `demo` usados por el binario.

pub mod config;
pub mod demo;
pub mod errors;
pub mod foreach;
pub mod logging;

pub use footings_core;
pub use footings_dispatch;

pub use footings_core::{schema, step, Attribute, Footing, FootingsError, Model, ModelDecl, Role, RunOutput};
pub use footings_dispatch::Dispatcher;

#[cfg(test)]
mod tests {
    use super::config::AppConfig;

    #[test]
    fn app_config_has_defaults() {
        let cfg = AppConfig::from_env();
        assert!(!cfg.log_filter.is_empty());
        assert!(!cfg.audit_dir.as_os_str().is_empty());
    }
}
