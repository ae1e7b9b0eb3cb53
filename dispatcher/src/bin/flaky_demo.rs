//! Demo sin runner remoto: un ejecutor en memoria que falla las primeras N
//! veces por notebook, para ver reintentos y orden de resultados.
//!
//! DEMO_FAILURES=2 DISPATCH_PARALLELISM=2 cargo run -p dispatcher --bin flaky-demo

use anyhow::Result;
use common::{JobParameters, JobSpec, RemoteExecutionError};
use dispatcher::{Dispatcher, DispatcherConfig, RemoteExecutor};
use std::{collections::HashMap, env, sync::Mutex, thread, time::Duration};
use tracing::info;

struct FlakyExecutor {
    failures_per_target: u32,
    seen: Mutex<HashMap<String, u32>>,
}

impl RemoteExecutor for FlakyExecutor {
    fn execute(
        &self,
        target: &str,
        _timeout: Duration,
        parameters: Option<&JobParameters>,
    ) -> Result<String, RemoteExecutionError> {
        let n = {
            let mut seen = self
                .seen
                .lock()
                .map_err(|_| RemoteExecutionError::new(target, "lock seen"))?;
            let n = seen.entry(target.to_string()).or_insert(0);
            *n += 1;
            *n
        };

        // simula algo de trabajo, más largo para los primeros notebooks
        thread::sleep(Duration::from_millis(300 / n as u64));

        if n <= self.failures_per_target {
            return Err(RemoteExecutionError::new(
                target,
                format!("fallo simulado #{}", n),
            ));
        }

        let n_params = parameters.map(|p| p.len()).unwrap_or(0);
        Ok(format!("{} ok ({} params)", target, n_params))
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter("dispatcher=debug,flaky_demo=info")
        .init();

    let failures: u32 = env::var("DEMO_FAILURES")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(1);
    let cfg = DispatcherConfig::from_env();

    let mut params = JobParameters::new();
    params.insert("fecha".to_string(), "2024-01-01".to_string());

    let jobs = vec![
        JobSpec::new("/demo/extract", Duration::from_secs(10), 2)?.with_parameters(params),
        JobSpec::new("/demo/transform", Duration::from_secs(10), 0)?,
        JobSpec::new("/demo/load", Duration::from_secs(10), 3)?,
    ];

    let dispatcher = Dispatcher::new(FlakyExecutor {
        failures_per_target: failures,
        seen: Mutex::new(HashMap::new()),
    });

    info!(
        "corriendo {} jobs con parallelism={} (fallos por notebook={})",
        jobs.len(),
        cfg.parallelism,
        failures
    );
    let results = dispatcher.submit_batch_blocking(jobs, cfg.parallelism)?;

    for r in &results {
        match r.payload() {
            Some(payload) => println!("#{} {} -> OK en {} intentos: {}", r.index, r.target, r.attempts, payload),
            None => println!(
                "#{} {} -> FALLÓ en {} intentos: {}",
                r.index,
                r.target,
                r.attempts,
                r.failure().map(|f| f.message.as_str()).unwrap_or("")
            ),
        }
    }

    Ok(())
}
