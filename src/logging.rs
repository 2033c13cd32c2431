//! Logging del binario.
//!
//! Las librerías emiten por la fachada `log`; aquí se instala un subscriber de
//! `tracing` que también recoge esos registros. Salida a stderr para no
//! mezclarse con los resultados impresos en stdout.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// `RUST_LOG` tiene prioridad; si no está definida se usa `default_filter`.
pub fn init(default_filter: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let _ = tracing_subscriber::registry().with(filter)
                                          .with(fmt::layer().with_writer(std::io::stderr).compact())
                                          .try_init();
}
