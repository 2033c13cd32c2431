//! Builder de declaración de un modelo.
//!
//! ```ignore
//! impl Model for Adder {
//!     fn declare() -> ModelDecl<Self> {
//!         ModelDecl::new("Adder").input("a")
//!                                .input("b")
//!                                .output("total")
//!                                .step(step(Adder::add).uses(["a", "b"]).impacts(["total"]))
//!                                .steps(["add"])
//!     }
//! }
//! ```

use indexmap::IndexMap;

use super::{Model, ModelSchema};
use crate::attribute::{Attribute, Role};
use crate::errors::ModelCreationError;
use crate::step::StepDecl;

/// Declaración sin validar: atributos con rol, tabla de steps y orden de
/// ejecución. Se consume en `build`.
pub struct ModelDecl<M> {
    pub(crate) name: String,
    pub(crate) doc: Option<String>,
    pub(crate) attributes: Vec<Attribute>,
    pub(crate) table: IndexMap<String, StepDecl<M>>,
    pub(crate) duplicate_steps: Vec<String>,
    pub(crate) order: Vec<String>,
}

impl<M> ModelDecl<M> {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(),
               doc: None,
               attributes: Vec::new(),
               table: IndexMap::new(),
               duplicate_steps: Vec::new(),
               order: Vec::new() }
    }

    pub fn doc(mut self, text: impl Into<String>) -> Self {
        self.doc = Some(text.into());
        self
    }

    pub fn attribute(mut self, attribute: Attribute) -> Self {
        self.attributes.push(attribute);
        self
    }

    pub fn role(self, name: impl Into<String>, role: Role) -> Self {
        self.attribute(Attribute::new(name, role))
    }

    pub fn input(self, name: impl Into<String>) -> Self {
        self.role(name, Role::Input)
    }

    pub fn mutable(self, name: impl Into<String>) -> Self {
        self.role(name, Role::Mutable)
    }

    pub fn constant(self, name: impl Into<String>) -> Self {
        self.role(name, Role::Constant)
    }

    pub fn intermediate(self, name: impl Into<String>) -> Self {
        self.role(name, Role::Intermediate)
    }

    pub fn output(self, name: impl Into<String>) -> Self {
        self.role(name, Role::Output)
    }

    /// Agrega un step a la tabla del modelo. No lo incluye en el orden de
    /// ejecución; eso lo fija `steps`.
    pub fn step(mut self, decl: StepDecl<M>) -> Self {
        let name = decl.step_name().to_string();
        if self.table.insert(name.clone(), decl).is_some() && !self.duplicate_steps.contains(&name) {
            self.duplicate_steps.push(name);
        }
        self
    }

    /// Orden de ejecución de los steps. Reemplaza cualquier orden previo.
    pub fn steps<I, S>(mut self, names: I) -> Self
        where I: IntoIterator<Item = S>,
              S: Into<String>
    {
        self.order = names.into_iter().map(Into::into).collect();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl<M: Model> ModelDecl<M> {
    /// Ejecuta el validador y congela el resultado.
    pub fn build(self) -> Result<ModelSchema<M>, ModelCreationError> {
        super::validate(self)
    }
}
