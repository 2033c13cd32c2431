//! `ModelSchema`: resultado congelado de validar un `ModelDecl`.
//!
//! Inmutable tras su construcción; se comparte entre instancias vía `Arc`.

use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::attribute::{ArgumentError, Attribute, Role, RoleSets};
use crate::errors::UnknownStepError;
use crate::step::Step;

pub struct ModelSchema<M> {
    pub(crate) name: String,
    pub(crate) doc: Option<String>,
    pub(crate) attributes: IndexMap<String, Attribute>,
    pub(crate) roles: RoleSets,
    pub(crate) steps: Vec<Step<M>>,
    pub(crate) initial_values: Map<String, Value>,
    pub(crate) definition_hash: String,
}

impl<M> ModelSchema<M> {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn doc(&self) -> Option<&str> {
        self.doc.as_deref()
    }

    /// Atributos en el orden de los campos del struct.
    pub fn attributes(&self) -> impl Iterator<Item = &Attribute> {
        self.attributes.values()
    }

    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.get(name)
    }

    pub fn roles(&self) -> &RoleSets {
        &self.roles
    }

    pub fn names_of(&self, role: Role) -> &[String] {
        self.roles.get(role)
    }

    pub fn steps(&self) -> &[Step<M>] {
        &self.steps
    }

    pub fn step_names(&self) -> Vec<&str> {
        self.steps.iter().map(|s| s.name()).collect()
    }

    pub fn step(&self, name: &str) -> Option<&Step<M>> {
        self.steps.iter().find(|s| s.name() == name)
    }

    pub fn definition_hash(&self) -> &str {
        &self.definition_hash
    }

    /// Prefijo de steps a ejecutar. `None` planifica la secuencia completa;
    /// `Some(name)` hasta `name` inclusive.
    pub fn plan(&self, to_step: Option<&str>) -> Result<&[Step<M>], UnknownStepError> {
        let Some(target) = to_step else {
            return Ok(&self.steps);
        };
        match self.steps.iter().position(|s| s.name() == target) {
            Some(position) => Ok(&self.steps[..=position]),
            None => Err(UnknownStepError { model: self.name.clone(),
                                           requested: target.to_string(),
                                           declared: self.steps.iter().map(|s| s.name().to_string()).collect() }),
        }
    }
}

impl<M: Serialize> ModelSchema<M> {
    /// Forma serializada del estado como objeto JSON.
    pub fn snapshot_fields(&self, state: &M) -> Result<Map<String, Value>, serde_json::Error> {
        match serde_json::to_value(state)? {
            Value::Object(map) => Ok(map),
            other => Err(serde::ser::Error::custom(format!("model {} serialized to a non-object value: {other}",
                                                           self.name))),
        }
    }

    /// Valida los atributos asignables en construcción (Input, Mutable,
    /// Constant) contra sus `Argument`.
    pub fn validate_arguments(&self, state: &M) -> Result<(), ArgumentError> {
        let needs_checks = self.attributes
                               .values()
                               .any(|a| a.role.is_constructor_settable() && a.argument.has_checks());
        if !needs_checks {
            return Ok(());
        }
        let fields = self.snapshot_fields(state)
                         .map_err(|e| ArgumentError::Serialization { attribute: self.name.clone(),
                                                                     reason: e.to_string() })?;
        for attr in self.attributes.values().filter(|a| a.role.is_constructor_settable()) {
            let value = fields.get(&attr.name).unwrap_or(&Value::Null);
            attr.argument.validate(&attr.name, value)?;
        }
        Ok(())
    }
}

impl<M: Serialize + DeserializeOwned> ModelSchema<M> {
    /// Devuelve `state` con cada Intermediate y Output en su valor inicial.
    ///
    /// Si hay que reemplazar algún valor el estado se reconstruye desde su
    /// forma serializada, de modo que los campos `#[serde(skip)]` vuelven a
    /// su `Default`.
    pub fn initialize(&self, state: M) -> Result<M, ArgumentError> {
        let serialization = |e: serde_json::Error| ArgumentError::Serialization { attribute: self.name.clone(),
                                                                                   reason: e.to_string() };
        let mut fields = self.snapshot_fields(&state).map_err(serialization)?;
        let mut reset = Vec::new();
        for attr in self.attributes.values().filter(|a| !a.role.is_constructor_settable()) {
            let Some(current) = fields.get_mut(&attr.name) else {
                continue;
            };
            let initial = match self.initial_values.get(&attr.name) {
                Some(value) => value.clone(),
                None => empty_like(current),
            };
            if *current != initial {
                *current = initial;
                reset.push(attr.name.as_str());
            }
        }
        if reset.is_empty() {
            return Ok(state);
        }
        log::debug!("model {}: resetting {reset:?} to their initial values", self.name);
        serde_json::from_value(Value::Object(fields)).map_err(serialization)
    }
}

/// Valor vacío con la misma forma JSON que `value`.
fn empty_like(value: &Value) -> Value {
    match value {
        Value::Null => Value::Null,
        Value::Bool(_) => Value::Bool(false),
        Value::Number(n) if n.is_f64() => Value::from(0.0),
        Value::Number(_) => Value::from(0),
        Value::String(_) => Value::String(String::new()),
        Value::Array(_) => Value::Array(Vec::new()),
        Value::Object(_) => Value::Object(Map::new()),
    }
}

impl<M> std::fmt::Debug for ModelSchema<M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelSchema")
         .field("name", &self.name)
         .field("roles", &self.roles)
         .field("steps", &self.steps)
         .field("definition_hash", &self.definition_hash)
         .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_like_keeps_the_json_shape() {
        assert_eq!(empty_like(&json!(2.5)), json!(0.0));
        assert_eq!(empty_like(&json!(-4)), json!(0));
        assert_eq!(empty_like(&json!("x")), json!(""));
        assert_eq!(empty_like(&json!([1, 2])), json!([]));
        assert_eq!(empty_like(&json!({"a": 1})), json!({}));
        assert_eq!(empty_like(&json!(true)), json!(false));
    }
}
