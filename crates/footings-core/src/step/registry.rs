//! Registro de steps: resuelve la lista ordenada de nombres contra la tabla
//! de declaraciones del modelo.
//!
//! Reporta en bloque: primero todos los nombres inexistentes
//! (`StepResolutionError`), después todos los steps sin `uses`/`impacts`
//! (`StepMetadataError`).

use indexmap::IndexMap;

use super::{Step, StepDecl};
use crate::errors::{ModelCreationError, StepMetadataError, StepResolutionError};

pub fn resolve_steps<M>(model: &str,
                        order: &[String],
                        mut table: IndexMap<String, StepDecl<M>>)
                        -> Result<Vec<Step<M>>, ModelCreationError> {
    let missing: Vec<String> = order.iter().filter(|name| !table.contains_key(*name)).cloned().collect();
    if !missing.is_empty() {
        return Err(StepResolutionError { model: model.to_string(),
                                         missing }.into());
    }

    let undecorated: Vec<String> = order.iter()
                                        .filter(|name| table.get(*name).map(|d| !d.is_decorated()).unwrap_or(false))
                                        .cloned()
                                        .collect();
    if !undecorated.is_empty() {
        return Err(StepMetadataError { model: model.to_string(),
                                       undecorated }.into());
    }

    let mut steps = Vec::with_capacity(order.len());
    for name in order {
        // Los nombres repetidos en `order` se rechazan antes de llegar aquí.
        if let Some(mut decl) = table.shift_remove(name) {
            let uses = decl.uses.take().unwrap_or_default();
            let impacts = decl.impacts.take().unwrap_or_default();
            steps.push(Step::freeze(decl, uses, impacts));
        }
    }
    for unused in table.keys() {
        log::debug!("model {model}: step '{unused}' is declared but not listed in the step order");
    }
    Ok(steps)
}
