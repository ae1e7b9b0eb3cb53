use chrono::Utc;
use common::{JobResult, JobSpec, RemoteExecutionError};
use std::panic::{self, AssertUnwindSafe};
use tracing::{debug, info, warn};

use crate::executor::RemoteExecutor;

/// Corre la secuencia completa de intentos de un job (primer intento + reintentos).
///
/// Bucle explícito: se reintenta ante cualquier error, sin clasificar, hasta
/// agotar `retry_budget`. Cada intento recibe el timeout completo del job.
/// El contador de intentos vive sólo acá, en el hilo que procesa el job.
pub(crate) fn run_attempts(executor: &dyn RemoteExecutor, index: usize, job: &JobSpec) -> JobResult {
    let started_at = Utc::now();
    let mut attempt: u32 = 0;

    loop {
        debug!(job_id = job.id(), notebook = job.target(), attempt, "lanzando intento");

        let attempts = attempts_made(attempt);

        match call_once(executor, job) {
            Ok(payload) => {
                info!(
                    job_id = job.id(),
                    notebook = job.target(),
                    attempts,
                    "job terminado correctamente"
                );
                return JobResult::succeeded(index, job, payload, attempts, started_at);
            }
            Err(err) => {
                if attempt >= job.retry_budget() {
                    warn!(
                        job_id = job.id(),
                        notebook = job.target(),
                        attempts,
                        error = %err,
                        "job falló, sin reintentos disponibles"
                    );
                    return JobResult::failed(index, job, err.into(), attempts, started_at);
                }

                attempt += 1;
                warn!(
                    job_id = job.id(),
                    notebook = job.target(),
                    error = %err,
                    "intento falló, reintentando ({}/{})",
                    attempt,
                    job.retry_budget()
                );
            }
        }
    }
}

/// Intentos hechos hasta ahora. Con `retry_budget = u32::MAX` el último
/// intento no entra en u32, así que satura.
fn attempts_made(attempt: u32) -> u32 {
    attempt.saturating_add(1)
}

/// Un intento. Un panic del ejecutor cuenta como un intento fallido más.
fn call_once(executor: &dyn RemoteExecutor, job: &JobSpec) -> Result<String, RemoteExecutionError> {
    let call = panic::catch_unwind(AssertUnwindSafe(|| {
        executor.execute(job.target(), job.timeout(), job.parameters())
    }));

    match call {
        Ok(res) => res,
        Err(cause) => {
            let message = cause
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| cause.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "panic sin mensaje".to_string());
            Err(RemoteExecutionError::new(
                job.target(),
                format!("panic en el ejecutor: {}", message),
            ))
        }
    }
}
