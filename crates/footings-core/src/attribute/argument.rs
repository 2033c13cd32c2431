//! Validadores de argumento para atributos asignables en construcción.
//!
//! Los valores se validan sobre su forma serializada (`serde_json::Value`),
//! así el mismo `Argument` sirve para cualquier tipo de campo.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Tipo JSON esperado para un atributo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    Null,
    Bool,
    Integer,
    Number,
    String,
    Array,
    Object,
}

impl ValueKind {
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Null => ValueKind::Null,
            Value::Bool(_) => ValueKind::Bool,
            Value::Number(n) if n.is_i64() || n.is_u64() => ValueKind::Integer,
            Value::Number(_) => ValueKind::Number,
            Value::String(_) => ValueKind::String,
            Value::Array(_) => ValueKind::Array,
            Value::Object(_) => ValueKind::Object,
        }
    }

    /// `Number` acepta también enteros.
    pub fn accepts(self, value: &Value) -> bool {
        let found = ValueKind::of(value);
        found == self || (self == ValueKind::Number && found == ValueKind::Integer)
    }

    pub fn label(self) -> &'static str {
        match self {
            ValueKind::Null => "null",
            ValueKind::Bool => "bool",
            ValueKind::Integer => "integer",
            ValueKind::Number => "number",
            ValueKind::String => "string",
            ValueKind::Array => "array",
            ValueKind::Object => "object",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ArgumentError {
    #[error("attribute {attribute}: expected type {expected} but received {found}")]
    Type { attribute: String, expected: String, found: String },
    #[error("attribute {attribute}: {value} is not in {allowed}")]
    Allowed { attribute: String, value: Value, allowed: Value },
    #[error("attribute {attribute}: {value} is less than {min}")]
    MinValue { attribute: String, value: f64, min: f64 },
    #[error("attribute {attribute}: {value} is greater than {max}")]
    MaxValue { attribute: String, value: f64, max: f64 },
    #[error("attribute {attribute}: len {len} is less than {min}")]
    MinLen { attribute: String, len: usize, min: usize },
    #[error("attribute {attribute}: len {len} is greater than {max}")]
    MaxLen { attribute: String, len: usize, max: usize },
    #[error("attribute {attribute}: the custom test failed with {value}")]
    Custom { attribute: String, value: Value },
    #[error("attribute {attribute}: value could not be serialized: {reason}")]
    Serialization { attribute: String, reason: String },
}

pub type CustomCheck = Arc<dyn Fn(&Value) -> bool + Send + Sync>;

/// Descripción y validadores de un atributo.
#[derive(Clone, Default)]
pub struct Argument {
    pub description: Option<String>,
    pub dtype: Option<ValueKind>,
    pub allowed: Option<Vec<Value>>,
    pub min_val: Option<f64>,
    pub max_val: Option<f64>,
    pub min_len: Option<usize>,
    pub max_len: Option<usize>,
    pub custom: Option<CustomCheck>,
}

impl fmt::Debug for Argument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Argument")
         .field("description", &self.description)
         .field("dtype", &self.dtype)
         .field("allowed", &self.allowed)
         .field("min_val", &self.min_val)
         .field("max_val", &self.max_val)
         .field("min_len", &self.min_len)
         .field("max_len", &self.max_len)
         .field("custom", &self.custom.as_ref().map(|_| "<fn>"))
         .finish()
    }
}

impl Argument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn description(mut self, text: impl Into<String>) -> Self {
        self.description = Some(text.into());
        self
    }

    pub fn dtype(mut self, kind: ValueKind) -> Self {
        self.dtype = Some(kind);
        self
    }

    pub fn allowed<I, V>(mut self, values: I) -> Self
        where I: IntoIterator<Item = V>,
              V: Into<Value>
    {
        self.allowed = Some(values.into_iter().map(Into::into).collect());
        self
    }

    pub fn min_val(mut self, min: f64) -> Self {
        self.min_val = Some(min);
        self
    }

    pub fn max_val(mut self, max: f64) -> Self {
        self.max_val = Some(max);
        self
    }

    pub fn min_len(mut self, min: usize) -> Self {
        self.min_len = Some(min);
        self
    }

    pub fn max_len(mut self, max: usize) -> Self {
        self.max_len = Some(max);
        self
    }

    pub fn custom<F>(mut self, check: F) -> Self
        where F: Fn(&Value) -> bool + Send + Sync + 'static
    {
        self.custom = Some(Arc::new(check));
        self
    }

    pub fn has_checks(&self) -> bool {
        self.dtype.is_some()
        || self.allowed.is_some()
        || self.min_val.is_some()
        || self.max_val.is_some()
        || self.min_len.is_some()
        || self.max_len.is_some()
        || self.custom.is_some()
    }

    /// Aplica los validadores en orden fijo: tipo, permitidos, mínimo,
    /// máximo, longitud mínima, longitud máxima y custom.
    pub fn validate(&self, attribute: &str, value: &Value) -> Result<(), ArgumentError> {
        if let Some(kind) = self.dtype {
            if !kind.accepts(value) {
                return Err(type_error(attribute, kind.label(), value));
            }
        }
        if let Some(allowed) = &self.allowed {
            if !allowed.contains(value) {
                return Err(ArgumentError::Allowed { attribute: attribute.to_string(),
                                                    value: value.clone(),
                                                    allowed: Value::Array(allowed.clone()) });
            }
        }
        if self.min_val.is_some() || self.max_val.is_some() {
            let number = value.as_f64().ok_or_else(|| type_error(attribute, "number", value))?;
            if let Some(min) = self.min_val {
                if number < min {
                    return Err(ArgumentError::MinValue { attribute: attribute.to_string(),
                                                         value: number,
                                                         min });
                }
            }
            if let Some(max) = self.max_val {
                if number > max {
                    return Err(ArgumentError::MaxValue { attribute: attribute.to_string(),
                                                         value: number,
                                                         max });
                }
            }
        }
        if self.min_len.is_some() || self.max_len.is_some() {
            let len = length_of(value).ok_or_else(|| type_error(attribute, "string, array or object", value))?;
            if let Some(min) = self.min_len {
                if len < min {
                    return Err(ArgumentError::MinLen { attribute: attribute.to_string(),
                                                       len,
                                                       min });
                }
            }
            if let Some(max) = self.max_len {
                if len > max {
                    return Err(ArgumentError::MaxLen { attribute: attribute.to_string(),
                                                       len,
                                                       max });
                }
            }
        }
        if let Some(check) = &self.custom {
            if !check(value) {
                return Err(ArgumentError::Custom { attribute: attribute.to_string(),
                                                   value: value.clone() });
            }
        }
        Ok(())
    }
}

fn type_error(attribute: &str, expected: &str, value: &Value) -> ArgumentError {
    ArgumentError::Type { attribute: attribute.to_string(),
                          expected: expected.to_string(),
                          found: ValueKind::of(value).label().to_string() }
}

fn length_of(value: &Value) -> Option<usize> {
    match value {
        Value::String(s) => Some(s.chars().count()),
        Value::Array(items) => Some(items.len()),
        Value::Object(map) => Some(map.len()),
        _ => None,
    }
}
