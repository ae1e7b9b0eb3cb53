use chrono::Utc;
use common::{DispatchError, ErrorKind, JobFailure, JobOutcome, JobResult, JobSpec};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};

use crate::executor::RemoteExecutor;
use crate::retry::run_attempts;

/// Reparte un batch de jobs sobre un pool acotado y junta los resultados.
///
/// Cada job ocupa un "slot" del pool durante toda su secuencia de intentos
/// (reintentos incluidos). Los resultados vuelven en el orden del batch, no en
/// el orden en que terminan.
#[derive(Clone)]
pub struct Dispatcher {
    executor: Arc<dyn RemoteExecutor>,
}

impl Dispatcher {
    pub fn new<E: RemoteExecutor + 'static>(executor: E) -> Self {
        Self {
            executor: Arc::new(executor),
        }
    }

    /// Para compartir el mismo ejecutor entre varios dispatchers.
    pub fn from_shared(executor: Arc<dyn RemoteExecutor>) -> Self {
        Self { executor }
    }

    pub async fn submit_batch(
        &self,
        jobs: Vec<JobSpec>,
        parallelism: usize,
    ) -> Result<Vec<JobResult>, DispatchError> {
        if parallelism < 1 {
            return Err(DispatchError::InvalidArgument(format!(
                "parallelism debe ser >= 1 (vino {})",
                parallelism
            )));
        }
        if jobs.is_empty() {
            return Ok(Vec::new());
        }

        let total = jobs.len();
        info!("despachando batch de {} jobs con parallelism={}", total, parallelism);

        let sem = Arc::new(Semaphore::new(parallelism));
        let mut handles = Vec::with_capacity(total);

        for (index, job) in jobs.into_iter().enumerate() {
            // Espera un slot libre: los jobs entran en el orden del batch
            let permit = sem
                .clone()
                .acquire_owned()
                .await
                .map_err(|_| DispatchError::PoolClosed)?;

            debug!(index, job_id = job.id(), notebook = job.target(), "job admitido en el pool");

            let job_id = job.id().to_string();
            let target = job.target().to_string();
            let executor = self.executor.clone();
            let handle = tokio::task::spawn_blocking(move || {
                let result = run_attempts(executor.as_ref(), index, &job);
                // Liberar el slot recién al terminar todos los intentos
                drop(permit);
                result
            });
            handles.push((index, job_id, target, handle));
        }

        // Se espera cada handle en el orden original: así el orden de
        // finalización nunca se filtra a la salida.
        let mut results = Vec::with_capacity(total);
        for (index, job_id, target, handle) in handles {
            match handle.await {
                Ok(result) => results.push(result),
                Err(e) => {
                    warn!("join error en job {} (#{}): {:?}", job_id, index, e);
                    results.push(join_failure(index, job_id, target, &e));
                }
            }
        }

        let failed = results.iter().filter(|r| !r.is_success()).count();
        info!(
            "batch terminado: {} ok, {} fallidos de {}",
            total - failed,
            failed,
            total
        );

        Ok(results)
    }

    /// Igual que `submit_batch`, para llamar desde código sin runtime de tokio.
    ///
    /// Arma un runtime propio. Desde dentro de otro runtime devuelve
    /// `InvalidArgument` (ahí hay que usar `submit_batch`).
    pub fn submit_batch_blocking(
        &self,
        jobs: Vec<JobSpec>,
        parallelism: usize,
    ) -> Result<Vec<JobResult>, DispatchError> {
        if tokio::runtime::Handle::try_current().is_ok() {
            return Err(DispatchError::InvalidArgument(
                "submit_batch_blocking no se puede llamar dentro de un runtime de tokio".to_string(),
            ));
        }

        let rt = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .max_blocking_threads(parallelism.max(1))
            .build()?;

        rt.block_on(self.submit_batch(jobs, parallelism))
    }
}

/// El hilo bloqueante no devolvió nada (panic fuera del ejecutor o runtime
/// apagándose). No se sabe cuántos intentos hubo.
fn join_failure(
    index: usize,
    job_id: String,
    target: String,
    err: &tokio::task::JoinError,
) -> JobResult {
    let now = Utc::now();
    JobResult {
        index,
        job_id,
        target,
        outcome: JobOutcome::Failed(JobFailure {
            kind: ErrorKind::RemoteExecution,
            message: format!("el worker no terminó: {}", err),
        }),
        attempts: 0,
        started_at: now,
        finished_at: now,
    }
}
