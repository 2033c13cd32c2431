//! Ejecución de un prefijo de steps sobre un estado, con captura de fallos.

use std::backtrace::{Backtrace, BacktraceStatus};
use std::cell::{Cell, RefCell};
use std::panic::{self, AssertUnwindSafe};

use once_cell::sync::Lazy;
use serde_json::{Map, Value};

use crate::config::RunConfig;
use crate::errors::{ModelRunError, StepError};
use crate::model::{Model, ModelSchema};
use crate::step::Step;

thread_local! {
    /// `Some(force)` mientras un step corre bajo `catch_unwind` en este hilo.
    static PANIC_CAPTURE: Cell<Option<bool>> = const { Cell::new(None) };
    static PANIC_BACKTRACE: RefCell<Option<String>> = const { RefCell::new(None) };
}

/// Hook de pánico que guarda el backtrace en el punto del `panic!` y luego
/// delega en el hook previo. Se instala una vez por proceso.
static PANIC_HOOK: Lazy<()> = Lazy::new(|| {
    let previous = panic::take_hook();
    panic::set_hook(Box::new(move |info| {
        if let Some(force) = PANIC_CAPTURE.with(Cell::get) {
            let backtrace = if force { Backtrace::force_capture() } else { Backtrace::capture() };
            PANIC_BACKTRACE.with(|slot| *slot.borrow_mut() = rendered(&backtrace));
        }
        previous(info);
    }));
});

fn rendered(backtrace: &Backtrace) -> Option<String> {
    match backtrace.status() {
        BacktraceStatus::Captured => Some(backtrace.to_string()),
        _ => None,
    }
}

/// Ejecuta `f` capturando pánicos; el error lleva el backtrace del `panic!`.
fn catch_step_panic<F>(force_backtrace: bool, f: F) -> Result<(), StepError>
    where F: FnOnce() -> Result<(), StepError>
{
    Lazy::force(&PANIC_HOOK);
    PANIC_BACKTRACE.with(|slot| slot.borrow_mut().take());
    let previous = PANIC_CAPTURE.with(|flag| flag.replace(Some(force_backtrace)));
    let result = panic::catch_unwind(AssertUnwindSafe(f));
    PANIC_CAPTURE.with(|flag| flag.set(previous));
    match result {
        Ok(result) => result,
        Err(payload) => {
            let backtrace = PANIC_BACKTRACE.with(|slot| slot.borrow_mut().take());
            Err(StepError::from_panic(payload).with_backtrace(backtrace))
        }
    }
}

pub(crate) struct Executor<'a, M> {
    schema: &'a ModelSchema<M>,
    config: &'a RunConfig,
}

impl<'a, M: Model> Executor<'a, M> {
    pub(crate) fn new(schema: &'a ModelSchema<M>, config: &'a RunConfig) -> Self {
        Self { schema, config }
    }

    /// Ejecuta `steps` en orden. `after_step` recibe el índice, el step y el
    /// estado justo después de cada step exitoso; si devuelve error se
    /// atribuye a ese step. El primer fallo detiene la ejecución: el step N+1
    /// nunca empieza si el N falló.
    pub(crate) fn run_steps<F>(&self, state: &mut M, steps: &[Step<M>], mut after_step: F) -> Result<(), ModelRunError>
        where F: FnMut(usize, &Step<M>, &M) -> Result<(), StepError>
    {
        for (idx, step) in steps.iter().enumerate() {
            self.execute(state, step)?;
            after_step(idx, step, state).map_err(|cause| self.wrap(step, cause))?;
        }
        Ok(())
    }

    fn execute(&self, state: &mut M, step: &Step<M>) -> Result<(), ModelRunError> {
        log::debug!("model {} step [{}] started", self.schema.name(), step.name());

        let frozen_before = if self.config.enforce_frozen {
            Some(self.frozen_values(state).map_err(|cause| self.wrap(step, cause))?)
        } else {
            None
        };

        let result = if self.config.catch_panics {
            catch_step_panic(self.config.capture_backtrace, || step.call(state))
        } else {
            step.call(state)
        };
        if let Err(cause) = result {
            return Err(self.wrap(step, cause));
        }

        if let Some(before) = frozen_before {
            let after = self.frozen_values(state).map_err(|cause| self.wrap(step, cause))?;
            let changed: Vec<&str> = before.iter()
                                           .filter(|(name, value)| after.get(*name) != Some(*value))
                                           .map(|(name, _)| name.as_str())
                                           .collect();
            if !changed.is_empty() {
                let cause = StepError::new("FrozenAttributeError",
                                           format!("step modified frozen attributes [{}]", changed.join(", ")));
                return Err(self.wrap(step, cause));
            }
        }

        log::debug!("model {} step [{}] finished", self.schema.name(), step.name());
        Ok(())
    }

    fn frozen_values(&self, state: &M) -> Result<Map<String, Value>, StepError> {
        let roles = self.schema.roles();
        if roles.inputs.is_empty() && roles.constants.is_empty() {
            return Ok(Map::new());
        }
        let fields = self.schema
                         .snapshot_fields(state)
                         .map_err(|e| StepError::new("SerializationError", e.to_string()))?;
        Ok(roles.frozen()
                .filter_map(|name| fields.get(name).map(|v| (name.clone(), v.clone())))
                .collect())
    }

    fn wrap(&self, step: &Step<M>, cause: StepError) -> ModelRunError {
        let backtrace = if self.config.capture_backtrace {
            Backtrace::force_capture()
        } else {
            Backtrace::capture()
        };
        let backtrace = rendered(&backtrace);
        log::warn!("model {} failed at step [{}]: {}", self.schema.name(), step.name(), cause);
        ModelRunError { model: self.schema.name().to_string(),
                        step: step.name().to_string(),
                        cause: cause.with_backtrace(backtrace) }
    }
}
