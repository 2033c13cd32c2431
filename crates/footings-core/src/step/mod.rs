//! Steps de un modelo.
//!
//! Un step es un método nombrado con conjuntos declarados de lectura (`uses`)
//! y escritura (`impacts`). Este módulo define:
//! - `StepDecl` / `step`: fábrica de declaraciones (equivalente a decorar un
//!   método).
//! - `Step`: step congelado dentro de un `ModelSchema`.
//! - `resolve_steps`: registro que valida la lista ordenada de nombres.

pub mod definition;
pub mod registry;

pub use definition::{step, Step, StepDecl, StepFn, StepOutcome};
pub use registry::resolve_steps;
