use std::path::PathBuf;

use clap::{Parser, Subcommand};

use footings::config::CONFIG;
use footings::demo::TermReserve;
use footings::errors::AppError;
use footings::foreach::run_foreach;
use footings::{logging, schema, Footing};

#[derive(Parser)]
#[command(name = "footings")]
#[command(about = "Declarative model runner (demo: term life reserve)")]
struct Cli {
    #[command(flatten)]
    policy: PolicyArgs,
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Args, Clone)]
struct PolicyArgs {
    #[arg(long, default_value_t = 45, global = true)]
    issue_age: u32,
    #[arg(long, default_value = "M", global = true)]
    gender: String,
    #[arg(long, default_value = "2017-CSO", global = true)]
    table: String,
    #[arg(long, default_value_t = 100_000.0, global = true)]
    benefit: f64,
    #[arg(long, default_value_t = 0.03, global = true)]
    interest_rate: f64,
    #[arg(long, default_value_t = 10, global = true)]
    term: u32,
}

impl PolicyArgs {
    fn model(&self) -> TermReserve {
        TermReserve::new(self.issue_age, &self.gender, &self.table, self.benefit, self.interest_rate, self.term)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Print the model documentation
    Describe,
    /// Run the model, optionally stopping after a step
    Run {
        #[arg(long)]
        to_step: Option<String>,
    },
    /// Run every step and write the audit trace
    Audit {
        /// Output file (.json); defaults to FOOTINGS_AUDIT_DIR/term_reserve.json
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Run one instance per issue age, starting at --issue-age
    Foreach {
        #[arg(long, default_value_t = 10)]
        count: u32,
        #[arg(long)]
        sequential: bool,
    },
}

fn main() -> Result<(), AppError> {
    logging::init(&CONFIG.log_filter);
    let cli = Cli::parse();

    match cli.command {
        Commands::Describe => {
            let schema = schema::<TermReserve>().map_err(footings::FootingsError::from)?;
            println!("{}", schema.describe());
        }
        Commands::Run { to_step } => {
            let mut footing = Footing::new(cli.policy.model())?;
            match to_step {
                Some(step) => {
                    let partial = footing.run_to(&step)?;
                    println!("{}", serde_json::to_string_pretty(partial.state())?);
                }
                None => {
                    let output = footing.run()?;
                    println!("{}", serde_json::to_string_pretty(&output)?);
                }
            }
        }
        Commands::Audit { out } => {
            let path = out.unwrap_or_else(|| CONFIG.audit_dir.join("term_reserve.json"));
            let trace = Footing::new(cli.policy.model())?.audit_to(&path)?;
            tracing::info!(run_id = %trace.run_id, steps = trace.len(), path = %path.display(), "audit written");
            println!("{}", path.display());
        }
        Commands::Foreach { count, sequential } => {
            let records: Vec<TermReserve> = (0..count).map(|i| {
                                                          let mut p = cli.policy.clone();
                                                          p.issue_age += i;
                                                          p.model()
                                                      })
                                                      .collect();
            let outcome = run_foreach(records, !sequential);
            for (idx, output) in &outcome.outputs {
                println!("{}\t{}", cli.policy.issue_age + *idx as u32, serde_json::to_string(output)?);
            }
            for (idx, err) in &outcome.errors {
                eprintln!("record {idx}: {err}");
            }
            if !outcome.is_clean() {
                return Err(AppError::Foreach { failed: outcome.errors.len(),
                                               total: outcome.total() });
            }
        }
    }
    Ok(())
}
