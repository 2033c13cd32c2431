//! footings-core: modelos declarativos con roles de atributo y steps ordenados
pub mod attribute;
pub mod audit;
pub mod config;
pub mod constants;
pub mod docs;
pub mod engine;
pub mod errors;
pub mod hashing;
pub mod introspect;
pub mod model;
pub mod step;

pub use attribute::{Argument, ArgumentError, Attribute, Role, RoleSets, ValueKind};
pub use audit::{AuditEntry, AuditError, AuditFailure, AuditTrace, AuditWriter, JsonAuditWriter};
pub use config::RunConfig;
pub use engine::{Footing, RunOutcome, RunOutput};
pub use errors::{ClassificationError, FootingsError, ModelCreationError, ModelRunError, RunError, StepError,
                 StepMetadataError, StepResolutionError, UnknownStepError};
pub use model::{schema, Model, ModelDecl, ModelSchema};
pub use step::{step, Step, StepDecl};
