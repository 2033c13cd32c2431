//! Declaración y validación de modelos.
//!
//! Un modelo es un struct serde cuyos campos están clasificados por rol y
//! cuyos steps se ejecutan en un orden fijo. El autor implementa `Model`
//! devolviendo un `ModelDecl`; `schema::<M>()` lo valida una única vez por
//! tipo y cachea el `ModelSchema` congelado.

pub mod decl;
pub mod schema;
mod validate;

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use once_cell::sync::Lazy;
use serde::de::DeserializeOwned;
use serde::Serialize;

pub use decl::ModelDecl;
pub use schema::ModelSchema;
pub use validate::validate;

use crate::errors::ModelCreationError;

/// Contrato base de ejecución: un struct serializable, clonable (para los
/// snapshots de auditoría) y con una declaración de roles y steps.
pub trait Model: Serialize + DeserializeOwned + Clone + 'static {
    fn declare() -> ModelDecl<Self>;
}

type SchemaCache = RwLock<HashMap<TypeId, Arc<dyn Any + Send + Sync>>>;

static SCHEMAS: Lazy<SchemaCache> = Lazy::new(|| RwLock::new(HashMap::new()));

/// Schema validado de `M`. La primera llamada valida `M::declare()`; las
/// siguientes devuelven el mismo `Arc`. Un modelo inválido no se cachea y
/// vuelve a reportar su error en cada llamada.
pub fn schema<M: Model>() -> Result<Arc<ModelSchema<M>>, ModelCreationError> {
    let id = TypeId::of::<M>();
    let cached = SCHEMAS.read()
                        .unwrap_or_else(|poisoned| poisoned.into_inner())
                        .get(&id)
                        .cloned();
    if let Some(entry) = cached {
        if let Ok(schema) = entry.downcast::<ModelSchema<M>>() {
            return Ok(schema);
        }
    }

    // Validamos fuera del lock: `declare` puede pedir el schema de otro modelo.
    let built: Arc<ModelSchema<M>> = Arc::new(M::declare().build()?);
    let mut guard = SCHEMAS.write().unwrap_or_else(|poisoned| poisoned.into_inner());
    let entry = guard.entry(id).or_insert_with(|| built.clone() as Arc<dyn Any + Send + Sync>).clone();
    drop(guard);
    Ok(entry.downcast::<ModelSchema<M>>().unwrap_or(built))
}
