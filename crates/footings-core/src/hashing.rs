//! Hash helpers para `definition_hash` y fingerprints de snapshots.
//!
//! `serde_json::Map` (sin `preserve_order`) ya ordena las claves, así que la
//! serialización compacta de un `Value` es canónica para nuestros fines.

use blake3::Hasher;
use serde_json::Value;

/// Hashea un string y devuelve hex.
pub fn hash_str(input: &str) -> String {
    let mut h = Hasher::new();
    h.update(input.as_bytes());
    h.finalize().to_hex().to_string()
}

/// Hashea un `Value` JSON en su forma compacta.
pub fn hash_value(value: &Value) -> String {
    hash_str(&value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn hash_value_ignores_key_insertion_order() {
        let mut a = serde_json::Map::new();
        a.insert("b".into(), json!(2));
        a.insert("a".into(), json!(1));
        let b = json!({"a": 1, "b": 2});
        assert_eq!(hash_value(&Value::Object(a)), hash_value(&b));
    }

    #[test]
    fn different_values_hash_differently() {
        assert_ne!(hash_value(&json!({"a": 1})), hash_value(&json!({"a": 2})));
    }
}
