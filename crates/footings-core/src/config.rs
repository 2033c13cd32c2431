//! Configuración de ejecución desde variables de entorno.
//!
//! - `FOOTINGS_ENFORCE_FROZEN` (default `true`): verifica tras cada step que
//!   los atributos Input/Constant no cambiaron.
//! - `FOOTINGS_CATCH_PANICS` (default `true`): un `panic!` dentro de un step se
//!   reporta como `ModelRunError` en lugar de propagarse.
//! - `FOOTINGS_CAPTURE_BACKTRACE` (default `false`): fuerza la captura de
//!   backtrace al envolver un fallo (si no, decide `RUST_BACKTRACE`).

use std::env;

use dotenvy::dotenv;
use once_cell::sync::Lazy;

// Carga perezosa del archivo .env una sola vez.
static DOTENV_LOADED: Lazy<()> = Lazy::new(|| {
    let _ = dotenv(); // ignora error si no existe .env
});

static RUN_CONFIG: Lazy<RunConfig> = Lazy::new(RunConfig::from_env);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    pub enforce_frozen: bool,
    pub catch_panics: bool,
    pub capture_backtrace: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self { enforce_frozen: true,
               catch_panics: true,
               capture_backtrace: false }
    }
}

fn flag(name: &str, default: bool) -> bool {
    match env::var(name) {
        Ok(v) => match v.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => true,
            "0" | "false" | "no" | "off" => false,
            other => {
                log::warn!("{name}={other} is not a boolean, using default {default}");
                default
            }
        },
        Err(_) => default,
    }
}

impl RunConfig {
    pub fn from_env() -> Self {
        // asegura que .env se haya cargado
        Lazy::force(&DOTENV_LOADED);
        let d = Self::default();
        Self { enforce_frozen: flag("FOOTINGS_ENFORCE_FROZEN", d.enforce_frozen),
               catch_panics: flag("FOOTINGS_CATCH_PANICS", d.catch_panics),
               capture_backtrace: flag("FOOTINGS_CAPTURE_BACKTRACE", d.capture_backtrace) }
    }

    /// Configuración del proceso, leída una sola vez.
    pub fn global() -> &'static RunConfig {
        &RUN_CONFIG
    }
}

/// Forzar carga temprana de .env desde aplicaciones externas si se desea.
pub fn init_dotenv() {
    Lazy::force(&DOTENV_LOADED);
}
