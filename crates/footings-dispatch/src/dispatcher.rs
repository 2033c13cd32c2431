use std::fmt;
use std::sync::Arc;

use dashmap::DashMap;
use indexmap::IndexSet;
use serde_json::Value;

use crate::args::DispatchArgs;
use crate::errors::{DispatcherKeyError, DispatcherRegisterError};

/// Callable registrado. Recibe los argumentos sin los parámetros de despacho.
pub type Handler<A, R> = Arc<dyn Fn(A) -> R + Send + Sync>;

/// Registro de callables indexado por tuplas de claves string, una por
/// parámetro declarado y en el orden declarado.
///
/// Registrar dos veces la misma tupla reemplaza el callable anterior (gana el
/// último registro).
pub struct Dispatcher<A, R> {
    name: String,
    parameters: Vec<String>,
    default: Option<Handler<A, R>>,
    registry: DashMap<Vec<String>, Handler<A, R>>,
}

impl<A, R> Dispatcher<A, R> {
    pub fn new<I, S>(name: impl Into<String>, parameters: I) -> Self
        where I: IntoIterator<Item = S>,
              S: Into<String>
    {
        Self { name: name.into(),
               parameters: parameters.into_iter().map(Into::into).collect(),
               default: None,
               registry: DashMap::new() }
    }

    /// Callable usado cuando ninguna tupla coincide.
    pub fn with_default<F>(mut self, default: F) -> Self
        where F: Fn(A) -> R + Send + Sync + 'static
    {
        self.default = Some(Arc::new(default));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parameters(&self) -> &[String] {
        &self.parameters
    }

    pub fn has_default(&self) -> bool {
        self.default.is_some()
    }

    pub fn len(&self) -> usize {
        self.registry.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }

    pub fn contains<K: AsRef<str>>(&self, key: &[K]) -> bool {
        self.registry.contains_key(&owned_key(key))
    }

    /// Tuplas registradas, ordenadas.
    pub fn keys(&self) -> Vec<Vec<String>> {
        let mut keys: Vec<Vec<String>> = self.registry.iter().map(|e| e.key().clone()).collect();
        keys.sort();
        keys
    }

    /// Expande los valores por parámetro (`{"k1": ["a", "b"], "k2": "x"}`)
    /// en el producto cartesiano de tuplas de claves.
    pub fn key_tuples(&self, keys: &Value) -> Result<Vec<Vec<String>>, DispatcherRegisterError> {
        let Value::Object(given) = keys else {
            return Err(DispatcherRegisterError::NotAnObject { dispatcher: self.name.clone(),
                                                              found: keys.to_string() });
        };
        if let Some(unknown) = given.keys().find(|k| !self.parameters.contains(k)) {
            return Err(DispatcherRegisterError::UnknownParameter { dispatcher: self.name.clone(),
                                                                   param: unknown.clone(),
                                                                   declared: self.parameters.clone() });
        }

        let mut tuples: Vec<Vec<String>> = vec![Vec::new()];
        for param in &self.parameters {
            let values = self.values_for(param, given.get(param))?;
            tuples = tuples.iter()
                           .flat_map(|prefix| {
                               values.iter().map(move |value| {
                                                let mut key = prefix.clone();
                                                key.push(value.clone());
                                                key
                                            })
                           })
                           .collect();
        }
        Ok(tuples)
    }

    fn values_for(&self, param: &str, value: Option<&Value>) -> Result<IndexSet<String>, DispatcherRegisterError> {
        let invalid = |found: &Value| DispatcherRegisterError::InvalidValue { dispatcher: self.name.clone(),
                                                                              param: param.to_string(),
                                                                              found: found.to_string() };
        match value {
            None | Some(Value::Null) => Err(DispatcherRegisterError::MissingParameter { dispatcher: self.name.clone(),
                                                                                        param: param.to_string() }),
            Some(Value::String(s)) => Ok(IndexSet::from([s.clone()])),
            Some(Value::Array(items)) => items.iter()
                                              .map(|item| item.as_str().map(str::to_string).ok_or_else(|| invalid(item)))
                                              .collect(),
            Some(other) => Err(invalid(other)),
        }
    }

    /// Forma decorador: valida las claves y devuelve un `Registrar` que liga
    /// un callable a todas ellas.
    pub fn registrar(&self, keys: Value) -> Result<Registrar<'_, A, R>, DispatcherRegisterError> {
        let keys = self.key_tuples(&keys)?;
        Ok(Registrar { dispatcher: self, keys })
    }

    /// Forma directa: registra `handler` bajo cada tupla de `keys` y devuelve
    /// cuántas tuplas quedaron ligadas.
    pub fn register<F>(&self, handler: F, keys: Value) -> Result<usize, DispatcherRegisterError>
        where F: Fn(A) -> R + Send + Sync + 'static
    {
        Ok(self.registrar(keys)?.bind(handler))
    }

    /// Callable registrado para `key`, sin considerar el default.
    pub fn resolve<K: AsRef<str>>(&self, key: &[K]) -> Option<Handler<A, R>> {
        self.registry.get(&owned_key(key)).map(|entry| Arc::clone(entry.value()))
    }

    /// Despacha con una tupla de claves ya separada de los argumentos.
    pub fn call_key<K: AsRef<str>>(&self, key: &[K], args: A) -> Result<R, DispatcherKeyError> {
        if key.len() != self.parameters.len() {
            return Err(DispatcherKeyError::KeyLength { dispatcher: self.name.clone(),
                                                       expected: self.parameters.len(),
                                                       found: key.len() });
        }
        // El handler se clona fuera del mapa: no retenemos el shard durante la
        // llamada.
        if let Some(handler) = self.resolve(key) {
            return Ok(handler(args));
        }
        match &self.default {
            Some(default) => {
                log::debug!("dispatcher {}: no handler for {:?}, using default", self.name, owned_key(key));
                Ok(default(args))
            }
            None => Err(DispatcherKeyError::Unmatched { dispatcher: self.name.clone(),
                                                        key: owned_key(key) }),
        }
    }
}

impl<A: DispatchArgs, R> Dispatcher<A, R> {
    /// Extrae los parámetros declarados de `args` (quitándolos) y despacha
    /// con el resto.
    pub fn call(&self, mut args: A) -> Result<R, DispatcherKeyError> {
        let mut key = Vec::with_capacity(self.parameters.len());
        for param in &self.parameters {
            match args.take_key(param) {
                Some(value) => key.push(value),
                None => {
                    return Err(DispatcherKeyError::MissingParameter { dispatcher: self.name.clone(),
                                                                      param: param.clone() })
                }
            }
        }
        self.call_key(&key, args)
    }
}

fn owned_key<K: AsRef<str>>(key: &[K]) -> Vec<String> {
    key.iter().map(|k| k.as_ref().to_string()).collect()
}

impl<A, R> fmt::Debug for Dispatcher<A, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
         .field("name", &self.name)
         .field("parameters", &self.parameters)
         .field("registered", &self.registry.len())
         .field("has_default", &self.default.is_some())
         .finish()
    }
}

/// Registro pendiente: tuplas ya validadas a la espera de un callable.
pub struct Registrar<'d, A, R> {
    dispatcher: &'d Dispatcher<A, R>,
    keys: Vec<Vec<String>>,
}

impl<'d, A, R> Registrar<'d, A, R> {
    pub fn keys(&self) -> &[Vec<String>] {
        &self.keys
    }

    pub fn bind<F>(self, handler: F) -> usize
        where F: Fn(A) -> R + Send + Sync + 'static
    {
        let d = self.dispatcher;
        if self.keys.is_empty() {
            log::warn!("dispatcher {}: registration expanded to no keys, nothing bound", d.name);
            return 0;
        }
        let handler: Handler<A, R> = Arc::new(handler);
        for key in &self.keys {
            if d.registry.insert(key.clone(), Arc::clone(&handler)).is_some() {
                log::debug!("dispatcher {}: key {:?} re-registered, previous handler replaced", d.name, key);
            }
        }
        self.keys.len()
    }
}
