use std::fmt;
use std::sync::Arc;

use serde_json::{Map, Value};

use crate::errors::{short_type_name, StepError};

/// Callable de un step: opera únicamente sobre el estado de la instancia.
pub type StepFn<M> = Arc<dyn Fn(&mut M) -> Result<(), StepError> + Send + Sync>;

/// Tipos de retorno admitidos para el método de un step.
pub trait StepOutcome {
    fn into_step_result(self) -> Result<(), StepError>;
}

impl StepOutcome for () {
    fn into_step_result(self) -> Result<(), StepError> {
        Ok(())
    }
}

/// Cubre cualquier `E: Error`, `Box<dyn Error + Send + Sync>` y mensajes
/// `String`/`&str`.
impl<E> StepOutcome for Result<(), E> where E: Into<Box<dyn std::error::Error + Send + Sync>>
{
    fn into_step_result(self) -> Result<(), StepError> {
        self.map_err(|error| StepError::from_boxed(error_kind::<E>(), error.into()))
    }
}

fn error_kind<E>() -> &'static str {
    match short_type_name(std::any::type_name::<E>()) {
        "Box" => "Error",
        "String" | "&str" => "StepError",
        kind => kind,
    }
}

/// Declaración de un step antes de validar el modelo.
///
/// `uses` e `impacts` quedan en `None` hasta que se declaran; un step sin
/// alguno de los dos no se considera decorado y el validador lo rechaza.
pub struct StepDecl<M> {
    pub(crate) name: String,
    pub(crate) method_name: String,
    pub(crate) method: StepFn<M>,
    pub(crate) uses: Option<Vec<String>>,
    pub(crate) impacts: Option<Vec<String>>,
    pub(crate) docstring: Option<String>,
    pub(crate) metadata: Map<String, Value>,
}

/// Convierte un método en un step. El nombre por defecto es el del método
/// (último segmento de su path); para closures conviene fijarlo con `name`.
pub fn step<M, F, O>(method: F) -> StepDecl<M>
    where M: 'static,
          F: Fn(&mut M) -> O + Send + Sync + 'static,
          O: StepOutcome
{
    let method_name = short_type_name(std::any::type_name::<F>()).to_string();
    StepDecl { name: method_name.clone(),
               method_name,
               method: Arc::new(move |state: &mut M| method(state).into_step_result()),
               uses: None,
               impacts: None,
               docstring: None,
               metadata: Map::new() }
}

impl<M> StepDecl<M> {
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn uses<I, S>(mut self, names: I) -> Self
        where I: IntoIterator<Item = S>,
              S: Into<String>
    {
        self.uses = Some(names.into_iter().map(Into::into).collect());
        self
    }

    pub fn impacts<I, S>(mut self, names: I) -> Self
        where I: IntoIterator<Item = S>,
              S: Into<String>
    {
        self.impacts = Some(names.into_iter().map(Into::into).collect());
        self
    }

    pub fn doc(mut self, text: impl Into<String>) -> Self {
        self.docstring = Some(text.into());
        self
    }

    pub fn metadata(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    pub fn step_name(&self) -> &str {
        &self.name
    }

    pub fn is_decorated(&self) -> bool {
        self.uses.is_some() && self.impacts.is_some()
    }
}

impl<M> fmt::Debug for StepDecl<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StepDecl")
         .field("name", &self.name)
         .field("method_name", &self.method_name)
         .field("uses", &self.uses)
         .field("impacts", &self.impacts)
         .finish_non_exhaustive()
    }
}

/// Step resuelto y congelado dentro de un `ModelSchema`.
pub struct Step<M> {
    name: String,
    method_name: String,
    method: StepFn<M>,
    uses: Vec<String>,
    impacts: Vec<String>,
    docstring: Option<String>,
    metadata: Map<String, Value>,
}

impl<M> Step<M> {
    /// Sólo el registro de steps construye steps congelados, a partir de
    /// declaraciones ya decoradas.
    pub(crate) fn freeze(decl: StepDecl<M>, uses: Vec<String>, impacts: Vec<String>) -> Self {
        Self { name: decl.name,
               method_name: decl.method_name,
               method: decl.method,
               uses,
               impacts,
               docstring: decl.docstring,
               metadata: decl.metadata }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn method_name(&self) -> &str {
        &self.method_name
    }

    pub fn uses(&self) -> &[String] {
        &self.uses
    }

    pub fn impacts(&self) -> &[String] {
        &self.impacts
    }

    pub fn docstring(&self) -> Option<&str> {
        self.docstring.as_deref()
    }

    pub fn metadata(&self) -> &Map<String, Value> {
        &self.metadata
    }

    /// Ejecuta el cuerpo del step sobre `state`.
    pub fn call(&self, state: &mut M) -> Result<(), StepError> {
        (self.method)(state)
    }
}

impl<M> Clone for Step<M> {
    fn clone(&self) -> Self {
        Self { name: self.name.clone(),
               method_name: self.method_name.clone(),
               method: Arc::clone(&self.method),
               uses: self.uses.clone(),
               impacts: self.impacts.clone(),
               docstring: self.docstring.clone(),
               metadata: self.metadata.clone() }
    }
}

impl<M> fmt::Debug for Step<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Step")
         .field("name", &self.name)
         .field("method_name", &self.method_name)
         .field("uses", &self.uses)
         .field("impacts", &self.impacts)
         .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Counter {
        n: i32,
    }

    impl Counter {
        fn bump(&mut self) {
            self.n += 1;
        }

        fn parse(&mut self) -> Result<(), std::num::ParseIntError> {
            self.n = "nope".parse()?;
            Ok(())
        }

        fn parse_positive(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
            let n: i32 = if self.n == 0 { "x1".parse()? } else { self.n };
            if n < 0 {
                return Err(format!("negative count {n}").into());
            }
            self.n = n * 2;
            Ok(())
        }

        fn reject(&mut self) -> Result<(), String> {
            Err(format!("cannot reject {}", self.n))
        }
    }

    fn frozen<O: StepOutcome + 'static>(method: fn(&mut Counter) -> O) -> Step<Counter> {
        Step::freeze(step(method).uses(["n"]).impacts(["n"]), vec!["n".into()], vec!["n".into()])
    }

    #[test]
    fn name_defaults_to_method_name() {
        let decl = step(Counter::bump);
        assert_eq!(decl.step_name(), "bump");
        assert!(!decl.is_decorated());
        let decl = decl.name("_bump").uses(["n"]).impacts(["n"]);
        assert_eq!(decl.step_name(), "_bump");
        assert!(decl.is_decorated());
    }

    #[test]
    fn fallible_methods_surface_their_error_type() {
        let decl = step(Counter::parse).uses(Vec::<String>::new()).impacts(["n"]);
        let frozen = Step::freeze(decl, vec![], vec!["n".into()]);
        let mut c = Counter::default();
        let err = frozen.call(&mut c).unwrap_err();
        assert_eq!(err.kind, "ParseIntError");
    }

    #[test]
    fn boxed_errors_keep_their_message() {
        let step = frozen(Counter::parse_positive);

        let mut c = Counter { n: 4 };
        step.call(&mut c).unwrap();
        assert_eq!(c.n, 8);

        let err = step.call(&mut Counter { n: -3 }).unwrap_err();
        assert_eq!(err.kind, "Error");
        assert_eq!(err.message, "negative count -3");

        let err = step.call(&mut Counter { n: 0 }).unwrap_err();
        assert_eq!(err.message, "invalid digit found in string");
    }

    #[test]
    fn string_errors_become_step_errors() {
        let err = frozen(Counter::reject).call(&mut Counter { n: 7 }).unwrap_err();
        assert_eq!(err.kind, "StepError");
        assert_eq!(err.message, "cannot reject 7");
    }

    #[test]
    fn infallible_methods_mutate_state() {
        let decl = step(Counter::bump).uses(["n"]).impacts(["n"]);
        let frozen = Step::freeze(decl, vec!["n".into()], vec!["n".into()]);
        let mut c = Counter::default();
        frozen.call(&mut c).unwrap();
        frozen.call(&mut c).unwrap();
        assert_eq!(c.n, 2);
    }
}
