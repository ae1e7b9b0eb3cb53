use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

use crate::error::DispatchError;

pub type JobId = String;

/// Parámetros que se pasan al job remoto (clave → valor).
pub type JobParameters = HashMap<String, String>;

/// Forma "cruda" de un job, tal como llega en un archivo de batch (JSON).
///
/// Los enteros son con signo a propósito: así un `-1` se puede leer y se
/// rechaza en la validación en vez de fallar como error de parseo.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobRequest {
    /// Identificador del job remoto, ej: "/Repos/etl/daily_load"
    pub target: String,

    /// Tiempo máximo por llamada, en segundos
    pub timeout_secs: i64,

    /// None = no se manda el argumento de parámetros al ejecutor
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<JobParameters>,

    /// Intentos extra permitidos después del primer fallo
    #[serde(default)]
    pub retry_budget: i64,
}

/// Una unidad de trabajo remoto ya validada. Inmutable una vez construida.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobSpec {
    id: JobId,
    target: String,
    timeout: Duration,
    parameters: Option<JobParameters>,
    retry_budget: u32,
}

impl JobSpec {
    pub fn new(
        target: impl Into<String>,
        timeout: Duration,
        retry_budget: u32,
    ) -> Result<Self, DispatchError> {
        let target = target.into();

        if target.trim().is_empty() {
            return Err(DispatchError::InvalidSpec(
                "target no puede estar vacío".to_string(),
            ));
        }
        if timeout.is_zero() {
            return Err(DispatchError::InvalidSpec(format!(
                "timeout de {} debe ser mayor a cero",
                target
            )));
        }

        Ok(Self {
            id: uuid::Uuid::new_v4().to_string(),
            target,
            timeout,
            parameters: None,
            retry_budget,
        })
    }

    /// Adjunta un mapa de parámetros. Un mapa vacío NO es lo mismo que no
    /// tener parámetros: se le pasa igual al ejecutor.
    pub fn with_parameters(mut self, parameters: JobParameters) -> Self {
        self.parameters = Some(parameters);
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn parameters(&self) -> Option<&JobParameters> {
        self.parameters.as_ref()
    }

    pub fn retry_budget(&self) -> u32 {
        self.retry_budget
    }
}

impl TryFrom<JobRequest> for JobSpec {
    type Error = DispatchError;

    fn try_from(req: JobRequest) -> Result<Self, Self::Error> {
        if req.timeout_secs <= 0 {
            return Err(DispatchError::InvalidSpec(format!(
                "timeout_secs de {} debe ser positivo (vino {})",
                req.target, req.timeout_secs
            )));
        }

        let retry_budget = u32::try_from(req.retry_budget).map_err(|_| {
            DispatchError::InvalidSpec(format!(
                "retry_budget de {} fuera de rango (vino {})",
                req.target, req.retry_budget
            ))
        })?;

        let spec = JobSpec::new(
            req.target,
            Duration::from_secs(req.timeout_secs as u64),
            retry_budget,
        )?;

        Ok(match req.parameters {
            Some(params) => spec.with_parameters(params),
            None => spec,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn request(timeout_secs: i64, retry_budget: i64) -> JobRequest {
        JobRequest {
            target: "/Repos/etl/daily".to_string(),
            timeout_secs,
            parameters: None,
            retry_budget,
        }
    }

    #[test]
    fn new_rejects_zero_timeout() {
        let err = JobSpec::new("nb", Duration::ZERO, 0).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidSpec);
    }

    #[test]
    fn new_rejects_blank_target() {
        let err = JobSpec::new("   ", Duration::from_secs(1), 0).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidSpec);
    }

    #[test]
    fn request_with_zero_or_negative_timeout_is_invalid() {
        for t in [0, -5] {
            let err = JobSpec::try_from(request(t, 1)).unwrap_err();
            assert!(matches!(err, DispatchError::InvalidSpec(_)));
        }
    }

    #[test]
    fn request_with_negative_retry_budget_is_invalid() {
        let err = JobSpec::try_from(request(10, -1)).unwrap_err();
        assert!(matches!(err, DispatchError::InvalidSpec(_)));
    }

    #[test]
    fn valid_request_keeps_its_values() {
        let spec = JobSpec::try_from(request(30, 2)).unwrap();

        assert_eq!(spec.target(), "/Repos/etl/daily");
        assert_eq!(spec.timeout(), Duration::from_secs(30));
        assert_eq!(spec.retry_budget(), 2);
        assert!(spec.parameters().is_none());
        assert!(!spec.id().is_empty());
    }

    /// Ausente y vacío son dos cosas distintas.
    #[test]
    fn absent_and_empty_parameters_are_distinguished() {
        let json_absent = r#"{"target":"nb","timeout_secs":5}"#;
        let json_empty = r#"{"target":"nb","timeout_secs":5,"parameters":{}}"#;

        let absent: JobSpec = serde_json::from_str::<JobRequest>(json_absent)
            .unwrap()
            .try_into()
            .unwrap();
        let empty: JobSpec = serde_json::from_str::<JobRequest>(json_empty)
            .unwrap()
            .try_into()
            .unwrap();

        assert!(absent.parameters().is_none());
        assert_eq!(empty.parameters(), Some(&JobParameters::new()));
        // retry_budget por defecto
        assert_eq!(absent.retry_budget(), 0);
    }

    #[test]
    fn each_spec_gets_its_own_id() {
        let a = JobSpec::new("nb", Duration::from_secs(1), 0).unwrap();
        let b = JobSpec::new("nb", Duration::from_secs(1), 0).unwrap();
        assert_ne!(a.id(), b.id());
    }
}
