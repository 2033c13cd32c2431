//! Una instancia de modelo por registro.
//!
//! Cada registro se valida y ejecuta por separado; un fallo no detiene a los
//! demás. El índice del registro acompaña a cada resultado y a cada error.

use rayon::prelude::*;

use footings_core::{Footing, FootingsError, Model, RunOutput};

#[derive(Debug, Default)]
pub struct ForeachOutcome {
    pub outputs: Vec<(usize, RunOutput)>,
    pub errors: Vec<(usize, FootingsError)>,
}

impl ForeachOutcome {
    pub fn total(&self) -> usize {
        self.outputs.len() + self.errors.len()
    }

    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

fn run_one<M: Model>(record: M) -> Result<RunOutput, FootingsError> {
    let mut footing = Footing::new(record)?;
    Ok(footing.run()?)
}

/// Ejecuta `records` con rayon (`parallel`) o en secuencia. Los resultados
/// quedan ordenados por índice en ambos casos.
pub fn run_foreach<M>(records: Vec<M>, parallel: bool) -> ForeachOutcome
    where M: Model + Send
{
    let results: Vec<(usize, Result<RunOutput, FootingsError>)> = if parallel {
        records.into_par_iter().enumerate().map(|(idx, r)| (idx, run_one(r))).collect()
    } else {
        records.into_iter().enumerate().map(|(idx, r)| (idx, run_one(r))).collect()
    };

    let mut outcome = ForeachOutcome::default();
    for (idx, result) in results {
        match result {
            Ok(output) => outcome.outputs.push((idx, output)),
            Err(e) => {
                log::warn!("record {idx} failed: {e}");
                outcome.errors.push((idx, e));
            }
        }
    }
    log::info!("foreach finished: {} ok, {} failed", outcome.outputs.len(), outcome.errors.len());
    outcome
}
