use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::Argument;

/// Rol semántico de un atributo.
///
/// - `Input`: se fija al construir; de sólo lectura después.
/// - `Mutable`: se fija al construir; los steps pueden reasignarlo.
/// - `Constant`: metadato fijo; se trata igual que `Input`.
/// - `Intermediate`: escrito sólo por steps (estado de trabajo).
/// - `Output`: escrito por steps; forma parte del valor devuelto por `run`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Input,
    Mutable,
    Constant,
    Intermediate,
    Output,
}

impl Role {
    pub const ALL: [Role; 5] = [Role::Input, Role::Mutable, Role::Constant, Role::Intermediate, Role::Output];

    pub fn label(self) -> &'static str {
        match self {
            Role::Input => "input",
            Role::Mutable => "mutable",
            Role::Constant => "constant",
            Role::Intermediate => "intermediate",
            Role::Output => "output",
        }
    }

    /// Título de sección usado por `ModelSchema::describe`.
    pub fn section(self) -> &'static str {
        match self {
            Role::Input => "Inputs",
            Role::Mutable => "Mutables",
            Role::Constant => "Constants",
            Role::Intermediate => "Intermediates",
            Role::Output => "Outputs",
        }
    }

    pub fn is_constructor_settable(self) -> bool {
        matches!(self, Role::Input | Role::Mutable | Role::Constant)
    }

    /// Roles cuyo valor no puede cambiar durante la ejecución de steps.
    pub fn is_frozen(self) -> bool {
        matches!(self, Role::Input | Role::Constant)
    }
}

/// Declaración de un atributo: nombre del campo, rol y validadores.
#[derive(Debug, Clone)]
pub struct Attribute {
    pub name: String,
    pub role: Role,
    pub argument: Argument,
    /// Valor con el que arranca un Intermediate u Output. Sin él se usa el
    /// valor vacío del tipo del campo.
    pub initial: Option<Value>,
}

impl Attribute {
    pub fn new(name: impl Into<String>, role: Role) -> Self {
        Self { name: name.into(),
               role,
               argument: Argument::default(),
               initial: None }
    }

    pub fn input(name: impl Into<String>) -> Self {
        Self::new(name, Role::Input)
    }

    pub fn mutable(name: impl Into<String>) -> Self {
        Self::new(name, Role::Mutable)
    }

    pub fn constant(name: impl Into<String>) -> Self {
        Self::new(name, Role::Constant)
    }

    pub fn intermediate(name: impl Into<String>) -> Self {
        Self::new(name, Role::Intermediate)
    }

    pub fn output(name: impl Into<String>) -> Self {
        Self::new(name, Role::Output)
    }

    pub fn argument(mut self, argument: Argument) -> Self {
        self.argument = argument;
        self
    }

    pub fn initial(mut self, value: Value) -> Self {
        self.initial = Some(value);
        self
    }

    pub fn description(mut self, text: impl Into<String>) -> Self {
        self.argument.description = Some(text.into());
        self
    }

    /// Nombre calificado por rol, p.ej. `input.rate`.
    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.role.label(), self.name)
    }
}

/// Nombres de atributo agrupados por rol, en orden de declaración.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleSets {
    pub inputs: Vec<String>,
    pub mutables: Vec<String>,
    pub constants: Vec<String>,
    pub intermediates: Vec<String>,
    pub outputs: Vec<String>,
}

impl RoleSets {
    pub fn get(&self, role: Role) -> &[String] {
        match role {
            Role::Input => &self.inputs,
            Role::Mutable => &self.mutables,
            Role::Constant => &self.constants,
            Role::Intermediate => &self.intermediates,
            Role::Output => &self.outputs,
        }
    }

    pub(crate) fn push(&mut self, role: Role, name: String) {
        match role {
            Role::Input => self.inputs.push(name),
            Role::Mutable => self.mutables.push(name),
            Role::Constant => self.constants.push(name),
            Role::Intermediate => self.intermediates.push(name),
            Role::Output => self.outputs.push(name),
        }
    }

    /// Rol de `name`, si pertenece a algún grupo.
    pub fn role_of(&self, name: &str) -> Option<Role> {
        Role::ALL.into_iter().find(|r| self.get(*r).iter().any(|n| n == name))
    }

    /// Nombres de Input y Constant (los congelados durante la ejecución).
    pub fn frozen(&self) -> impl Iterator<Item = &String> {
        self.inputs.iter().chain(self.constants.iter())
    }
}
