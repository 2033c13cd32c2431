//! Configuración central de la aplicación.
//! Carga variables de entorno (.env) una sola vez y expone una estructura
//! inmutable (`CONFIG`) para el binario.
use std::env;
use std::path::PathBuf;

use once_cell::sync::Lazy;

/// Configuración global de la aplicación.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Directorio por defecto para las trazas de auditoría.
    pub audit_dir: PathBuf,
    /// Filtro de logging (sintaxis de `EnvFilter`).
    pub log_filter: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        footings_core::config::init_dotenv();
        let audit_dir = env::var("FOOTINGS_AUDIT_DIR").ok()
                                                      .filter(|v| !v.trim().is_empty())
                                                      .unwrap_or_else(|| "audit".to_string());
        let log_filter = env::var("FOOTINGS_LOG").ok()
                                                 .filter(|v| !v.trim().is_empty())
                                                 .unwrap_or_else(|| "info".to_string());
        Self { audit_dir: PathBuf::from(audit_dir),
               log_filter }
    }
}

/// Instancia global perezosa de configuración, evaluada una sola vez.
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);
