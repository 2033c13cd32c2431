//! Atributos de un modelo: rol semántico, validadores de argumento y la
//! clasificación que verifica que cada campo público tenga exactamente un rol.

pub mod argument;
pub mod classifier;
mod role;

pub use argument::{Argument, ArgumentError, ValueKind};
pub use classifier::{classify, Classification};
pub use role::{Attribute, Role, RoleSets};
