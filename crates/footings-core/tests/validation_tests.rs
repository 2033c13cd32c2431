use footings_core::{schema, step, Footing, FootingsError, Model, ModelCreationError, ModelDecl, Role};
use serde::{Deserialize, Serialize};

mod common;
use common::Three;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Unclassified {
    a: i64,
    b: i64,
    out: i64,
}

impl Unclassified {
    fn go(&mut self) {
        self.out = self.a + self.b;
    }
}

impl Model for Unclassified {
    fn declare() -> ModelDecl<Self> {
        ModelDecl::new("Unclassified").input("a")
                                      .output("out")
                                      .step(step(Unclassified::go).uses(["a", "b"]).impacts(["out"]))
                                      .steps(["go"])
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct NoOutput {
    a: i64,
}

impl NoOutput {
    fn go(&mut self) {}
}

impl Model for NoOutput {
    fn declare() -> ModelDecl<Self> {
        ModelDecl::new("NoOutput").input("a")
                                  .step(step(NoOutput::go).uses(["a"]).impacts(Vec::<String>::new()))
                                  .steps(["go"])
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct NoSteps {
    out: i64,
}

impl Model for NoSteps {
    fn declare() -> ModelDecl<Self> {
        ModelDecl::new("NoSteps").output("out")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct BadSteps {
    out: i64,
}

impl BadSteps {
    fn bare(&mut self) {}

    fn good(&mut self) {
        self.out = 1;
    }
}

impl Model for BadSteps {
    fn declare() -> ModelDecl<Self> {
        ModelDecl::new("BadSteps").output("out")
                                  .step(step(BadSteps::good).uses(Vec::<String>::new()).impacts(["out"]))
                                  .step(step(BadSteps::bare))
                                  .steps(["good", "ghost", "bare", "phantom"])
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Undecorated {
    out: i64,
}

impl Undecorated {
    fn bare(&mut self) {}
}

impl Model for Undecorated {
    fn declare() -> ModelDecl<Self> {
        ModelDecl::new("Undecorated").output("out").step(step(Undecorated::bare).uses(["out"])).steps(["bare"])
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Repeated {
    out: i64,
}

impl Repeated {
    fn go(&mut self) {}
}

impl Model for Repeated {
    fn declare() -> ModelDecl<Self> {
        ModelDecl::new("Repeated").output("out")
                                  .step(step(Repeated::go).uses(["out"]).impacts(["out"]))
                                  .steps(["go", "go"])
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct WithPrivate {
    x: f64,
    y: f64,
    #[serde(skip)]
    cache: Vec<f64>,
}

impl WithPrivate {
    fn go(&mut self) {
        self.cache.push(self.x);
        self.y = self.x * 2.0;
    }
}

impl Model for WithPrivate {
    fn declare() -> ModelDecl<Self> {
        ModelDecl::new("WithPrivate").input("x")
                                     .output("y")
                                     .step(step(WithPrivate::go).uses(["x"]).impacts(["y"]))
                                     .steps(["go"])
    }
}

#[test]
fn unclassified_attribute_is_named_in_the_error() {
    let err = schema::<Unclassified>().unwrap_err();
    match &err {
        ModelCreationError::Classification(c) => assert_eq!(c.unclassified, vec!["b"]),
        other => panic!("unexpected error: {other}"),
    }
    assert!(err.to_string().contains("[b]"));
    assert!(err.to_string().contains("Unclassified"));
}

#[test]
fn model_without_outputs_is_rejected() {
    assert!(matches!(schema::<NoOutput>(), Err(ModelCreationError::NoOutputs { model }) if model == "NoOutput"));
}

#[test]
fn model_without_steps_is_rejected() {
    assert!(matches!(schema::<NoSteps>(), Err(ModelCreationError::NoSteps { .. })));
}

#[test]
fn missing_steps_are_reported_together_before_metadata() {
    match schema::<BadSteps>() {
        Err(ModelCreationError::StepResolution(e)) => assert_eq!(e.missing, vec!["ghost", "phantom"]),
        other => panic!("unexpected result: {other:?}"),
    }
}

#[test]
fn steps_without_uses_and_impacts_are_rejected() {
    match schema::<Undecorated>() {
        Err(ModelCreationError::StepMetadata(e)) => {
            assert_eq!(e.undecorated, vec!["bare"]);
            assert!(e.to_string().contains("bare"));
        }
        other => panic!("unexpected result: {other:?}"),
    }
}

#[test]
fn repeated_step_names_are_rejected() {
    assert!(matches!(schema::<Repeated>(), Err(ModelCreationError::DuplicateStep { names, .. }) if names == vec!["go"]));
}

#[test]
fn private_fields_need_no_role() {
    let s = schema::<WithPrivate>().expect("valid model");
    assert_eq!(s.names_of(Role::Input), ["x"]);
    assert!(s.attribute("cache").is_none());
    let mut f = Footing::new(WithPrivate { x: 1.5, y: 0.0, cache: vec![] }).unwrap();
    assert_eq!(f.run().unwrap().parse::<f64>().unwrap(), 3.0);
    assert_eq!(f.state().cache, vec![1.5]);
}

#[test]
fn schema_is_frozen_and_shared() {
    let first = schema::<Three>().unwrap();
    let second = schema::<Three>().unwrap();
    assert!(std::sync::Arc::ptr_eq(&first, &second));
    assert_eq!(first.step_names(), vec!["s1", "s2", "s3"]);
    assert_eq!(first.roles().intermediates, vec!["a", "b"]);
    assert_eq!(first.definition_hash().len(), 64);
}

#[test]
fn constructor_arguments_are_validated() {
    let err = Footing::new(Three::new(-3)).unwrap_err();
    assert!(matches!(err, FootingsError::Argument(_)));
    assert!(err.to_string().contains("start"));
}

#[test]
fn describe_lists_roles_and_steps() {
    let text = schema::<Three>().unwrap().describe();
    assert!(text.starts_with("Three\n"));
    assert!(text.contains("Inputs\n------\nstart : integer\n    Starting value.\nfail\n"));
    assert!(text.contains("1. s1 - Add one."));
    assert!(text.contains("3. s3 - Add the offset."));
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Aliased {
    #[serde(alias = "rate_old")]
    rate: f64,
    out: f64,
}

impl Aliased {
    fn go(&mut self) {
        self.out = self.rate * 2.0;
    }
}

impl Model for Aliased {
    fn declare() -> ModelDecl<Self> {
        ModelDecl::new("Aliased").input("rate")
                                 .output("out")
                                 .step(step(Aliased::go).uses(["rate"]).impacts(["out"]))
                                 .steps(["go"])
    }
}

#[test]
fn serde_aliases_are_not_attributes() {
    let s = schema::<Aliased>().expect("valid model");
    assert_eq!(s.names_of(Role::Input), ["rate"]);
    assert!(s.attribute("rate_old").is_none());

    let state: Aliased = serde_json::from_str(r#"{"rate_old": 0.25, "out": 0.0}"#).unwrap();
    let mut f = Footing::new(state).unwrap();
    assert_eq!(f.run().unwrap().parse::<f64>().unwrap(), 0.5);
}
