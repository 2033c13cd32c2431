//! Validador de modelos. Se ejecuta una vez por declaración.
//!
//! Orden de comprobaciones:
//! 1. contrato: el tipo se introspecciona como struct serde con campos
//!    nombrados;
//! 2. al menos un atributo Output;
//! 3. al menos un step en el orden de ejecución;
//! 4. nombres de step únicos (tabla y orden);
//! 5. clasificación de atributos (errores acumulados);
//! 6. registro de steps (faltantes y luego no decorados, acumulados);
//! 7. congelado de roles, steps y `definition_hash`.

use indexmap::IndexMap;
use serde_json::{json, Map, Value};

use super::{Model, ModelDecl, ModelSchema};
use crate::attribute::{classify, Attribute, Role};
use crate::constants::ENGINE_VERSION;
use crate::errors::ModelCreationError;
use crate::hashing::hash_value;
use crate::introspect::{empty_instance, struct_fields};
use crate::step::resolve_steps;

pub fn validate<M: Model>(decl: ModelDecl<M>) -> Result<ModelSchema<M>, ModelCreationError> {
    let ModelDecl { name,
                    doc,
                    attributes,
                    table,
                    duplicate_steps,
                    order, } = decl;

    let fields = struct_fields::<M>().map_err(|reason| ModelCreationError::NotAModel { model: name.clone(),
                                                                                         reason })?;

    if !attributes.iter().any(|a| a.role == Role::Output) {
        return Err(ModelCreationError::NoOutputs { model: name });
    }

    if order.is_empty() {
        return Err(ModelCreationError::NoSteps { model: name });
    }

    let mut duplicates = duplicate_steps;
    for (idx, step_name) in order.iter().enumerate() {
        if order[..idx].contains(step_name) && !duplicates.contains(step_name) {
            duplicates.push(step_name.clone());
        }
    }
    if !duplicates.is_empty() {
        return Err(ModelCreationError::DuplicateStep { model: name,
                                                       names: duplicates });
    }

    let classification = classify(&name, &fields, &attributes)?;
    let steps = resolve_steps(&name, &order, table)?;
    let initial_values = initial_values::<M>(&classification.attributes);

    let definition_hash = hash_value(&json!({
        "engine_version": ENGINE_VERSION,
        "model": name,
        "roles": classification.roles,
        "steps": order,
    }));

    log::debug!("model {name} validated: {} attributes, {} steps, definition_hash={definition_hash}",
                classification.attributes.len(),
                steps.len());

    Ok(ModelSchema { name,
                     doc,
                     attributes: classification.attributes,
                     roles: classification.roles,
                     steps,
                     initial_values,
                     definition_hash })
}

/// Valor inicial de cada Intermediate y Output: el declarado, o el del campo
/// en una instancia vacía del modelo. Los campos sin ninguno de los dos se
/// resuelven al construir, a partir del valor recibido.
fn initial_values<M: Model>(attributes: &IndexMap<String, Attribute>) -> Map<String, Value> {
    let empty = empty_instance::<M>().and_then(|state| serde_json::to_value(&state).ok());
    let mut values = Map::new();
    for attr in attributes.values().filter(|a| !a.role.is_constructor_settable()) {
        let value = attr.initial
                        .clone()
                        .or_else(|| empty.as_ref().and_then(|e| e.get(&attr.name)).cloned());
        if let Some(value) = value {
            values.insert(attr.name.clone(), value);
        }
    }
    values
}
