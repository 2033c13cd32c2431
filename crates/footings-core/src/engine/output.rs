use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use super::Footing;
use crate::model::Model;

/// Resultado de una ejecución completa.
///
/// Con un único output se devuelve el valor tal cual; con varios, una tupla
/// en el orden de declaración de los outputs.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum RunOutput {
    Single(Value),
    Tuple(Vec<Value>),
}

impl RunOutput {
    pub(crate) fn from_values(mut values: Vec<Value>) -> Self {
        if values.len() == 1 {
            RunOutput::Single(values.remove(0))
        } else {
            RunOutput::Tuple(values)
        }
    }

    pub fn len(&self) -> usize {
        match self {
            RunOutput::Single(_) => 1,
            RunOutput::Tuple(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, index: usize) -> Option<&Value> {
        match self {
            RunOutput::Single(value) if index == 0 => Some(value),
            RunOutput::Single(_) => None,
            RunOutput::Tuple(values) => values.get(index),
        }
    }

    pub fn into_values(self) -> Vec<Value> {
        match self {
            RunOutput::Single(value) => vec![value],
            RunOutput::Tuple(values) => values,
        }
    }

    /// Deserializa el resultado: un output como `T`, varios como tupla `T`.
    pub fn parse<T: DeserializeOwned>(self) -> Result<T, serde_json::Error> {
        match self {
            RunOutput::Single(value) => serde_json::from_value(value),
            RunOutput::Tuple(values) => serde_json::from_value(Value::Array(values)),
        }
    }
}

/// Lo que devuelve `Footing::run_with`: la instancia tras un `to_step`, o los
/// outputs tras una ejecución completa.
#[derive(Debug)]
pub enum RunOutcome<'a, M: Model> {
    Partial(&'a Footing<M>),
    Complete(RunOutput),
}

impl<'a, M: Model> RunOutcome<'a, M> {
    pub fn is_partial(&self) -> bool {
        matches!(self, RunOutcome::Partial(_))
    }

    pub fn output(self) -> Option<RunOutput> {
        match self {
            RunOutcome::Complete(output) => Some(output),
            RunOutcome::Partial(_) => None,
        }
    }

    pub fn instance(self) -> Option<&'a Footing<M>> {
        match self {
            RunOutcome::Partial(footing) => Some(footing),
            RunOutcome::Complete(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn single_output_is_not_wrapped() {
        let out = RunOutput::from_values(vec![json!(3)]);
        assert_eq!(out, RunOutput::Single(json!(3)));
        assert_eq!(out.get(0), Some(&json!(3)));
        assert_eq!(out.parse::<i64>().unwrap(), 3);
    }

    #[test]
    fn several_outputs_keep_declaration_order() {
        let out = RunOutput::from_values(vec![json!("a"), json!(2.5)]);
        assert_eq!(out.len(), 2);
        let (name, value): (String, f64) = out.clone().parse().unwrap();
        assert_eq!((name.as_str(), value), ("a", 2.5));
        assert_eq!(serde_json::to_value(&out).unwrap(), json!(["a", 2.5]));
    }
}
