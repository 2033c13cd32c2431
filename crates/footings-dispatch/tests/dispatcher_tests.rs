use std::collections::HashMap;

use footings_dispatch::{Dispatcher, DispatcherKeyError};
use once_cell::sync::Lazy;
use serde_json::{json, Map, Value};

type Args = Map<String, Value>;

fn args(value: Value) -> Args {
    value.as_object().cloned().expect("object")
}

static RATES: Lazy<Dispatcher<Args, f64>> = Lazy::new(|| {
    let d = Dispatcher::new("rates", ["basis"]);
    d.register(|a: Args| a["base"].as_f64().unwrap_or(0.0) * 1.1, json!({"basis": "stat"}))
     .unwrap();
    d.register(|a: Args| a["base"].as_f64().unwrap_or(0.0), json!({"basis": ["gaap", "ifrs"]}))
     .unwrap();
    d
});

#[test]
fn single_key_hits_and_misses() {
    let d: Dispatcher<Args, &'static str> = Dispatcher::new("single", ["key"]);
    d.register(|_| "x-result", json!({"key": "x"})).unwrap();

    assert_eq!(d.call(args(json!({"key": "x"}))).unwrap(), "x-result");
    let err = d.call(args(json!({"key": "z"}))).unwrap_err();
    assert_eq!(err,
               DispatcherKeyError::Unmatched { dispatcher: "single".into(),
                                               key: vec!["z".into()] });
    assert!(err.to_string().contains("('z')"));
}

#[test]
fn list_values_register_every_combination() {
    let d: Dispatcher<Args, String> = Dispatcher::new("multi", ["key1", "key2"]);
    let bound = d.register(|_| "shared".to_string(), json!({"key1": ["a", "b"], "key2": "c"}))
                 .unwrap();
    assert_eq!(bound, 2);
    assert_eq!(d.keys(), vec![vec!["a", "c"], vec!["b", "c"]]);
    assert_eq!(d.call(args(json!({"key1": "a", "key2": "c"}))).unwrap(), "shared");
    assert_eq!(d.call(args(json!({"key1": "b", "key2": "c"}))).unwrap(), "shared");
    assert!(!d.contains(&["c", "a"]));
}

#[test]
fn default_receives_the_non_key_arguments() {
    let d: Dispatcher<Args, Args> = Dispatcher::new("fallback", ["key"]).with_default(|rest| rest);
    d.register(|_| Args::new(), json!({"key": "known"})).unwrap();

    let rest = d.call(args(json!({"key": "other", "age": 45, "gender": "F"}))).unwrap();
    assert_eq!(Value::Object(rest), json!({"age": 45, "gender": "F"}));
}

#[test]
fn handlers_only_see_the_remaining_arguments() {
    let d: Dispatcher<HashMap<String, String>, Vec<String>> = Dispatcher::new("strings", ["table"]);
    d.register(|rest: HashMap<String, String>| {
                   let mut keys: Vec<String> = rest.into_keys().collect();
                   keys.sort();
                   keys
               },
               json!({"table": "2017"}))
     .unwrap();

    let call: HashMap<String, String> = [("table", "2017"), ("age", "45"), ("gender", "M")].into_iter()
                                                                                           .map(|(k, v)| (k.to_string(), v.to_string()))
                                                                                           .collect();
    assert_eq!(d.call(call).unwrap(), vec!["age", "gender"]);
}

#[test]
fn last_registration_wins() {
    let d: Dispatcher<Args, i32> = Dispatcher::new("overwrite", ["key"]);
    d.register(|_| 1, json!({"key": "x"})).unwrap();
    d.register(|_| 2, json!({"key": ["x", "y"]})).unwrap();
    assert_eq!(d.len(), 2);
    assert_eq!(d.call(args(json!({"key": "x"}))).unwrap(), 2);
}

#[test]
fn decorator_and_direct_forms_behave_the_same() {
    let direct: Dispatcher<Args, i32> = Dispatcher::new("direct", ["k1", "k2"]);
    let decorated: Dispatcher<Args, i32> = Dispatcher::new("decorated", ["k1", "k2"]);
    let keys = json!({"k1": ["a", "b"], "k2": ["x", "y"]});

    let n_direct = direct.register(|_| 7, keys.clone()).unwrap();
    let registrar = decorated.registrar(keys).unwrap();
    assert_eq!(registrar.keys().len(), 4);
    let n_decorated = registrar.bind(|_| 7);

    assert_eq!(n_direct, n_decorated);
    assert_eq!(direct.keys(), decorated.keys());
    assert_eq!(decorated.call(args(json!({"k1": "b", "k2": "y"}))).unwrap(), 7);
}

#[test]
fn missing_dispatch_parameter_at_call_time() {
    let err = RATES.call(args(json!({"base": 1.0}))).unwrap_err();
    assert!(matches!(err, DispatcherKeyError::MissingParameter { param, .. } if param == "basis"));
}

#[test]
fn shared_dispatcher_serves_concurrent_reads() {
    let handles: Vec<_> = (0..4).map(|i| {
                                    std::thread::spawn(move || {
                                        let basis = if i % 2 == 0 { "stat" } else { "ifrs" };
                                        RATES.call(args(json!({"basis": basis, "base": 100.0}))).unwrap()
                                    })
                                })
                                .collect();
    let results: Vec<f64> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert!((results[0] - 110.0).abs() < 1e-9);
    assert_eq!(results[1], 100.0);
    assert_eq!(RATES.len(), 3);
}
