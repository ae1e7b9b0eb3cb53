use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{ErrorKind, RemoteExecutionError};
use crate::job::{JobId, JobSpec};

/// Fallo terminal de un job (ya sin reintentos disponibles).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobFailure {
    pub kind: ErrorKind,
    pub message: String,
}

impl From<RemoteExecutionError> for JobFailure {
    fn from(err: RemoteExecutionError) -> Self {
        Self {
            kind: ErrorKind::RemoteExecution,
            message: err.message,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobOutcome {
    Succeeded { payload: String },
    Failed(JobFailure),
}

/// Resultado de la secuencia de intentos de un job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobResult {
    /// Posición del job en el batch original
    pub index: usize,
    pub job_id: JobId,
    pub target: String,

    pub outcome: JobOutcome,

    /// -------- Métricas --------
    pub attempts: u32,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl JobResult {
    pub fn succeeded(
        index: usize,
        job: &JobSpec,
        payload: String,
        attempts: u32,
        started_at: DateTime<Utc>,
    ) -> Self {
        Self::finish(index, job, JobOutcome::Succeeded { payload }, attempts, started_at)
    }

    pub fn failed(
        index: usize,
        job: &JobSpec,
        failure: JobFailure,
        attempts: u32,
        started_at: DateTime<Utc>,
    ) -> Self {
        Self::finish(index, job, JobOutcome::Failed(failure), attempts, started_at)
    }

    fn finish(
        index: usize,
        job: &JobSpec,
        outcome: JobOutcome,
        attempts: u32,
        started_at: DateTime<Utc>,
    ) -> Self {
        Self {
            index,
            job_id: job.id().to_string(),
            target: job.target().to_string(),
            outcome,
            attempts,
            started_at,
            finished_at: Utc::now(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self.outcome, JobOutcome::Succeeded { .. })
    }

    pub fn payload(&self) -> Option<&str> {
        match &self.outcome {
            JobOutcome::Succeeded { payload } => Some(payload),
            JobOutcome::Failed(_) => None,
        }
    }

    pub fn failure(&self) -> Option<&JobFailure> {
        match &self.outcome {
            JobOutcome::Succeeded { .. } => None,
            JobOutcome::Failed(f) => Some(f),
        }
    }
}
