//! Errores del core.
//!
//! Dos familias:
//! - Declaración (`ClassificationError`, `StepResolutionError`,
//!   `StepMetadataError`, `ModelCreationError`): se producen una sola vez al
//!   validar un `ModelDecl`; el modelo queda inutilizable hasta corregirlo. Las
//!   comprobaciones sobre listas de nombres reportan todos los nombres juntos.
//! - Ejecución (`UnknownStepError`, `ModelRunError`): por cada llamada a
//!   `run`. El error original de un step nunca se descarta, viaja dentro de
//!   `ModelRunError::cause`.

use std::any::Any;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::attribute::ArgumentError;
use crate::audit::AuditError;

fn list(names: &[String]) -> String {
    format!("[{}]", names.join(", "))
}

/// Atributos públicos sin rol, roles declarados sobre campos inexistentes y
/// atributos declarados más de una vez.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassificationError {
    pub model: String,
    pub unclassified: Vec<String>,
    pub unknown: Vec<String>,
    pub duplicated: Vec<String>,
}

impl ClassificationError {
    pub fn is_empty(&self) -> bool {
        self.unclassified.is_empty() && self.unknown.is_empty() && self.duplicated.is_empty()
    }
}

impl fmt::Display for ClassificationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut lines = Vec::new();
        if !self.unclassified.is_empty() {
            lines.push(format!("The attributes {} of model {} are not registered to a known role. Use one of input, \
                                mutable, constant, intermediate or output when declaring the model.",
                               list(&self.unclassified),
                               self.model));
        }
        if !self.unknown.is_empty() {
            lines.push(format!("The attributes {} are declared with a role but are not fields of model {}.",
                               list(&self.unknown),
                               self.model));
        }
        if !self.duplicated.is_empty() {
            lines.push(format!("The attributes {} are declared more than once in model {}.",
                               list(&self.duplicated),
                               self.model));
        }
        write!(f, "{}", lines.join("\n"))
    }
}

impl std::error::Error for ClassificationError {}

/// Nombres de step listados en el orden del modelo que no existen en su tabla
/// de steps.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("The following steps listed are missing - {} from model {model}.", list(.missing))]
pub struct StepResolutionError {
    pub model: String,
    pub missing: Vec<String>,
}

/// Steps que existen pero nunca declararon `uses`/`impacts`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("The following steps listed do not appear to be decorated steps (missing uses/impacts) - {} in model {model}.", list(.undecorated))]
pub struct StepMetadataError {
    pub model: String,
    pub undecorated: Vec<String>,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ModelCreationError {
    #[error("The object {model} does not implement the model contract: {reason}")]
    NotAModel { model: String, reason: String },
    #[error("No outputs registered to model {model}. At least one output needs to be registered.")]
    NoOutputs { model: String },
    #[error("Model {model} needs to have at least one step.")]
    NoSteps { model: String },
    #[error("The following step names are declared more than once in model {model} - {}.", list(.names))]
    DuplicateStep { model: String, names: Vec<String> },
    #[error(transparent)]
    Classification(#[from] ClassificationError),
    #[error(transparent)]
    StepResolution(#[from] StepResolutionError),
    #[error(transparent)]
    StepMetadata(#[from] StepMetadataError),
}

/// `to_step` no coincide con ningún step declarado.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("The step passed to to_step '{requested}' does not exist as a step of model {model}. Declared steps: {}.", list(.declared))]
pub struct UnknownStepError {
    pub model: String,
    pub requested: String,
    pub declared: Vec<String>,
}

/// Error original producido dentro del cuerpo de un step.
///
/// `kind` es el nombre corto del tipo de error (o `panic`), `chain` la cadena
/// de `source()` y `backtrace` la traza capturada al envolver el fallo, si la
/// captura estaba activa.
#[derive(Debug, Error, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[error("{kind}: {message}")]
pub struct StepError {
    pub kind: String,
    pub message: String,
    pub chain: Vec<String>,
    pub backtrace: Option<String>,
}

impl StepError {
    pub fn new(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self { kind: kind.into(),
               message: message.into(),
               chain: Vec::new(),
               backtrace: None }
    }

    /// Atajo para fallos sin tipo propio.
    pub fn msg(message: impl Into<String>) -> Self {
        Self::new("StepError", message)
    }

    /// Convierte cualquier error en `StepError`, conservando su tipo y su
    /// cadena de causas. Un `StepError` se devuelve tal cual.
    pub fn from_error<E>(error: E) -> Self
        where E: std::error::Error + 'static
    {
        if let Some(step_error) = (&error as &dyn Any).downcast_ref::<StepError>() {
            return step_error.clone();
        }
        let mut chain = Vec::new();
        let mut source = error.source();
        while let Some(inner) = source {
            chain.push(inner.to_string());
            source = inner.source();
        }
        Self { kind: short_type_name(std::any::type_name::<E>()).to_string(),
               message: error.to_string(),
               chain,
               backtrace: None }
    }

    /// Como `from_error` para errores ya en caja, donde el tipo concreto no
    /// se conoce; `kind` lo nombra.
    pub fn from_boxed(kind: impl Into<String>, error: Box<dyn std::error::Error + Send + Sync>) -> Self {
        let error = match error.downcast::<StepError>() {
            Ok(step_error) => return *step_error,
            Err(error) => error,
        };
        let mut chain = Vec::new();
        let mut source = error.source();
        while let Some(inner) = source {
            chain.push(inner.to_string());
            source = inner.source();
        }
        Self { kind: kind.into(),
               message: error.to_string(),
               chain,
               backtrace: None }
    }

    /// Construye el error a partir del payload de un `panic!` capturado.
    pub fn from_panic(payload: Box<dyn Any + Send>) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "non-string panic payload".to_string()
        };
        Self::new("panic", message)
    }

    pub fn with_backtrace(mut self, backtrace: Option<String>) -> Self {
        if self.backtrace.is_none() {
            self.backtrace = backtrace;
        }
        self
    }

    /// Texto de traza: cadena de causas seguida del backtrace (si existe).
    pub fn trace(&self) -> String {
        let mut parts: Vec<String> = self.chain.iter().map(|c| format!("caused by: {c}")).collect();
        if let Some(bt) = &self.backtrace {
            parts.push(bt.clone());
        }
        if parts.is_empty() {
            "<no trace captured>".to_string()
        } else {
            parts.join("\n")
        }
    }
}

/// `a::b::Error<c::D>` -> `Error`
pub(crate) fn short_type_name(full: &str) -> &str {
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}

/// Fallo de un step durante `run`/`audit`, con la atribución del step.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("At step [{step}], an error occurred.\n  Error Type = {}\n  Error Message = {}\n  Error Trace = {}", .cause.kind, .cause.message, .cause.trace())]
pub struct ModelRunError {
    pub model: String,
    pub step: String,
    #[source]
    pub cause: StepError,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RunError {
    #[error(transparent)]
    UnknownStep(#[from] UnknownStepError),
    #[error(transparent)]
    Step(#[from] ModelRunError),
    #[error("outputs of model {model} could not be serialized: {reason}")]
    Serialization { model: String, reason: String },
}

/// Error paraguas para aplicaciones que no necesitan distinguir la etapa.
#[derive(Debug, Error)]
pub enum FootingsError {
    #[error(transparent)]
    Creation(#[from] ModelCreationError),
    #[error(transparent)]
    Argument(#[from] ArgumentError),
    #[error(transparent)]
    Run(#[from] RunError),
    #[error(transparent)]
    Audit(#[from] AuditError),
}
