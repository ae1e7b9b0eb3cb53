use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use common::{JobResult, JobSpec};
use dispatcher::{Dispatcher, DispatcherConfig, HttpExecutor};
use tracing::info;

use crate::batch::load_batch;

#[derive(Parser)]
#[command(name = "client")]
#[command(about = "Dispara batches de notebooks remotos con paralelismo acotado")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Ejecuta un batch de jobs (archivo JSON) contra el runner remoto
    Run {
        #[arg(value_name = "BATCH_JSON")]
        batch: String,

        /// Jobs en paralelo (default: DISPATCH_PARALLELISM o 2)
        #[arg(long, short)]
        parallelism: Option<usize>,

        /// URL base del runner (default: RUNNER_URL o http://localhost:8080)
        #[arg(long)]
        runner_url: Option<String>,

        /// Imprime los resultados como JSON
        #[arg(long)]
        json: bool,
    },
    /// Sólo valida el batch, sin ejecutar nada
    Check {
        #[arg(value_name = "BATCH_JSON")]
        batch: String,
    },
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    let cfg = DispatcherConfig::from_env();

    match cli.command {
        Commands::Run {
            batch,
            parallelism,
            runner_url,
            json,
        } => {
            let jobs = load_batch(&batch)?;
            let parallelism = parallelism.unwrap_or(cfg.parallelism);
            let runner_url = runner_url.unwrap_or(cfg.runner_url);

            info!(
                "batch {}: {} jobs contra {} (parallelism={})",
                batch,
                jobs.len(),
                runner_url,
                parallelism
            );

            let dispatcher = Dispatcher::new(HttpExecutor::new(runner_url));
            let results = dispatcher.submit_batch_blocking(jobs, parallelism)?;

            if json {
                println!("{}", serde_json::to_string_pretty(&results)?);
            } else {
                print_results(&results);
            }

            let failed = results.iter().filter(|r| !r.is_success()).count();
            if failed > 0 {
                bail!("{} de {} jobs fallaron", failed, results.len());
            }
        }

        Commands::Check { batch } => {
            let jobs = load_batch(&batch)?;
            println!("Batch válido: {} jobs", jobs.len());
            for (i, job) in jobs.iter().enumerate() {
                print_spec(i, job);
            }
        }
    }

    Ok(())
}

fn print_spec(i: usize, job: &JobSpec) {
    let params = match job.parameters() {
        Some(p) => format!("{} parámetros", p.len()),
        None => "sin parámetros".to_string(),
    };
    println!(
        "  #{} {} (timeout={}s, reintentos={}, {})",
        i,
        job.target(),
        job.timeout().as_secs(),
        job.retry_budget(),
        params
    );
}

fn print_results(results: &[JobResult]) {
    for r in results {
        let took = (r.finished_at - r.started_at).num_milliseconds();
        match (r.payload(), r.failure()) {
            (Some(payload), _) => println!(
                "#{} {} OK  intentos={} ({} ms) -> {}",
                r.index, r.target, r.attempts, took, payload
            ),
            (None, Some(f)) => println!(
                "#{} {} ERR intentos={} ({} ms) -> {:?}: {}",
                r.index, r.target, r.attempts, took, f.kind, f.message
            ),
            (None, None) => {}
        }
    }

    let ok = results.iter().filter(|r| r.is_success()).count();
    println!("Resumen: {} ok, {} fallidos", ok, results.len() - ok);
}
