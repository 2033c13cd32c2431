//! Extracción de claves de despacho desde los argumentos de una llamada.

use std::collections::{BTreeMap, HashMap};
use std::hash::BuildHasher;

use indexmap::IndexMap;
use serde_json::{Map, Value};

/// Argumentos de los que se pueden quitar parámetros de despacho por nombre.
///
/// `take_key` elimina `param` y devuelve su valor como texto; lo que queda
/// se reenvía al callable resuelto.
pub trait DispatchArgs {
    fn take_key(&mut self, param: &str) -> Option<String>;
}

fn key_text(value: Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s),
        Value::Null => None,
        other => Some(other.to_string()),
    }
}

impl DispatchArgs for Map<String, Value> {
    fn take_key(&mut self, param: &str) -> Option<String> {
        self.remove(param).and_then(key_text)
    }
}

impl DispatchArgs for Value {
    fn take_key(&mut self, param: &str) -> Option<String> {
        self.as_object_mut()?.take_key(param)
    }
}

impl<S: BuildHasher> DispatchArgs for HashMap<String, String, S> {
    fn take_key(&mut self, param: &str) -> Option<String> {
        self.remove(param)
    }
}

impl DispatchArgs for BTreeMap<String, String> {
    fn take_key(&mut self, param: &str) -> Option<String> {
        self.remove(param)
    }
}

impl<S: BuildHasher> DispatchArgs for IndexMap<String, String, S> {
    fn take_key(&mut self, param: &str) -> Option<String> {
        self.shift_remove(param)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn json_keys_are_removed_and_stringified() {
        let mut args = json!({"table": "2017", "year": 2020, "gone": null, "age": 45});
        assert_eq!(args.take_key("table").as_deref(), Some("2017"));
        assert_eq!(args.take_key("year").as_deref(), Some("2020"));
        assert_eq!(args.take_key("gone"), None);
        assert_eq!(args.take_key("missing"), None);
        assert_eq!(args, json!({"age": 45}));
    }

    #[test]
    fn index_map_keeps_remaining_order() {
        let mut args: IndexMap<String, String> =
            [("a", "1"), ("k", "x"), ("b", "2")].into_iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        assert_eq!(args.take_key("k").as_deref(), Some("x"));
        assert_eq!(args.keys().collect::<Vec<_>>(), vec!["a", "b"]);
    }
}
