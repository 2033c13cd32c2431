//! Clasificación de atributos por rol.
//!
//! Entrada: los nombres de campo públicos del struct (obtenidos por
//! introspección serde) y las declaraciones de atributo del modelo. Salida:
//! cinco grupos disjuntos que cubren cada campo exactamente una vez.

use indexmap::IndexMap;

use super::{Attribute, RoleSets};
use crate::errors::ClassificationError;

/// Resultado de una clasificación válida.
#[derive(Debug, Clone)]
pub struct Classification {
    /// Atributos en el orden de los campos del struct.
    pub attributes: IndexMap<String, Attribute>,
    /// Nombres por rol en el orden de declaración.
    pub roles: RoleSets,
}

/// Clasifica `fields` según `declared`, acumulando todos los problemas en un
/// único `ClassificationError`.
pub fn classify(model: &str, fields: &[&str], declared: &[Attribute]) -> Result<Classification, ClassificationError> {
    let mut by_name: IndexMap<&str, &Attribute> = IndexMap::new();
    let mut duplicated: Vec<String> = Vec::new();
    for attr in declared {
        if by_name.insert(attr.name.as_str(), attr).is_some() && !duplicated.contains(&attr.name) {
            duplicated.push(attr.name.clone());
        }
    }

    let unclassified: Vec<String> = fields.iter()
                                          .filter(|f| !by_name.contains_key(**f))
                                          .map(|f| f.to_string())
                                          .collect();
    let unknown: Vec<String> = by_name.keys()
                                      .filter(|name| !fields.contains(*name))
                                      .map(|name| name.to_string())
                                      .collect();

    let error = ClassificationError { model: model.to_string(),
                                      unclassified,
                                      unknown,
                                      duplicated };
    if !error.is_empty() {
        return Err(error);
    }

    let mut roles = RoleSets::default();
    for attr in declared {
        roles.push(attr.role, attr.name.clone());
    }
    let attributes = fields.iter()
                           .filter_map(|f| by_name.get(f).map(|a| (f.to_string(), (*a).clone())))
                           .collect();
    Ok(Classification { attributes, roles })
}
