//! Motor de ejecución de modelos.
//!
//! `Footing` es una instancia validada (schema + estado). `run` ejecuta la
//! secuencia congelada de steps en orden, `run_to` un prefijo, y cualquier
//! fallo de un step llega al llamador como `ModelRunError` con el nombre del
//! step que falló.

pub mod core;
pub(crate) mod executor;
pub mod output;

pub use self::core::Footing;
pub use output::{RunOutcome, RunOutput};
