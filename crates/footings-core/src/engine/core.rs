//! Instancia ejecutable de un modelo.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use super::executor::Executor;
use super::output::{RunOutcome, RunOutput};
use crate::attribute::ArgumentError;
use crate::config::RunConfig;
use crate::errors::{FootingsError, RunError};
use crate::model::{schema, Model, ModelSchema};

/// Instancia de un modelo lista para ejecutarse.
///
/// Cada llamada a `run`/`run_to` ejecuta el plan desde el primer step; no hay
/// cursor de reanudación. El estado resultante queda en la instancia.
pub struct Footing<M: Model> {
    schema: Arc<ModelSchema<M>>,
    state: M,
    config: RunConfig,
}

impl<M: Model> Footing<M> {
    /// Crea la instancia validando el modelo (una vez por tipo) y los
    /// argumentos del estado inicial. Intermediate y Output arrancan en su
    /// valor inicial, sea cual sea el que traiga `state`.
    pub fn new(state: M) -> Result<Self, FootingsError> {
        let schema = schema::<M>()?;
        Ok(Self::with_schema(schema, state)?)
    }

    /// Igual que `new` pero con un schema ya validado.
    pub fn with_schema(schema: Arc<ModelSchema<M>>, state: M) -> Result<Self, ArgumentError> {
        schema.validate_arguments(&state)?;
        let state = schema.initialize(state)?;
        Ok(Self { schema,
                  state,
                  config: RunConfig::global().clone() })
    }

    pub fn with_config(mut self, config: RunConfig) -> Self {
        self.config = config;
        self
    }

    pub fn schema(&self) -> &ModelSchema<M> {
        &self.schema
    }

    pub fn schema_arc(&self) -> Arc<ModelSchema<M>> {
        Arc::clone(&self.schema)
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    pub fn state(&self) -> &M {
        &self.state
    }

    pub fn into_state(self) -> M {
        self.state
    }

    /// Valor serializado de un atributo público.
    pub fn value(&self, attribute: &str) -> Option<Value> {
        self.schema.snapshot_fields(&self.state).ok()?.remove(attribute)
    }

    /// Ejecuta todos los steps y devuelve los outputs.
    pub fn run(&mut self) -> Result<RunOutput, RunError> {
        self.execute(None)?;
        self.outputs()
    }

    /// Ejecuta hasta `step` inclusive y devuelve la instancia para inspección.
    pub fn run_to(&mut self, step: &str) -> Result<&Self, RunError> {
        self.execute(Some(step))?;
        Ok(self)
    }

    /// `run` y `run_to` en una sola entrada, con `to_step` opcional.
    pub fn run_with(&mut self, to_step: Option<&str>) -> Result<RunOutcome<'_, M>, RunError> {
        self.execute(to_step)?;
        match to_step {
            Some(_) => Ok(RunOutcome::Partial(&*self)),
            None => Ok(RunOutcome::Complete(self.outputs()?)),
        }
    }

    /// Valores actuales de los outputs, en orden de declaración.
    pub fn outputs(&self) -> Result<RunOutput, RunError> {
        let mut fields = self.schema
                             .snapshot_fields(&self.state)
                             .map_err(|e| RunError::Serialization { model: self.schema.name().to_string(),
                                                                    reason: e.to_string() })?;
        let values = self.schema
                         .roles()
                         .outputs
                         .iter()
                         .map(|name| fields.remove(name).unwrap_or(Value::Null))
                         .collect();
        Ok(RunOutput::from_values(values))
    }

    fn execute(&mut self, to_step: Option<&str>) -> Result<(), RunError> {
        let steps = self.schema.plan(to_step)?;
        log::debug!("model {} running {} step(s)", self.schema.name(), steps.len());
        Executor::new(&self.schema, &self.config).run_steps(&mut self.state, steps, |_, _, _| Ok(()))?;
        if to_step.is_none() {
            log::info!("model {} completed {} step(s)", self.schema.name(), steps.len());
        }
        Ok(())
    }
}

impl<M: Model> Clone for Footing<M> {
    fn clone(&self) -> Self {
        Self { schema: Arc::clone(&self.schema),
               state: self.state.clone(),
               config: self.config.clone() }
    }
}

impl<M: Model + fmt::Debug> fmt::Debug for Footing<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Footing")
         .field("model", &self.schema.name())
         .field("state", &self.state)
         .finish_non_exhaustive()
    }
}
