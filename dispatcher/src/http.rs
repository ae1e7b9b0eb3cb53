use common::{JobParameters, RemoteExecutionError};
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use crate::executor::RemoteExecutor;

#[derive(Debug, Serialize)]
pub(crate) struct RunRequest<'a> {
    pub target: &'a str,
    pub timeout_seconds: u64,
    /// Si no hay parámetros el campo no se manda (no es lo mismo que `{}`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameters: Option<&'a JobParameters>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RunResponse {
    pub result: String,
}

/// Ejecutor que dispara el job en un runner remoto vía HTTP y espera el resultado.
///
/// POST {base_url}/api/v1/runs; el timeout de la request es el del job.
pub struct HttpExecutor {
    client: Client,
    base_url: String,
}

impl HttpExecutor {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn runs_url(&self) -> String {
        format!("{}/api/v1/runs", self.base_url)
    }
}

impl RemoteExecutor for HttpExecutor {
    fn execute(
        &self,
        target: &str,
        timeout: Duration,
        parameters: Option<&JobParameters>,
    ) -> Result<String, RemoteExecutionError> {
        let body = RunRequest {
            target,
            // redondeo hacia arriba para no acortar el timeout
            timeout_seconds: timeout.as_secs() + u64::from(timeout.subsec_nanos() > 0),
            parameters,
        };

        debug!(notebook = target, url = %self.runs_url(), "POST run remoto");

        let resp = self
            .client
            .post(self.runs_url())
            .timeout(timeout)
            .json(&body)
            .send()
            .map_err(|e| {
                let why = if e.is_timeout() {
                    format!("timeout tras {:?}", timeout)
                } else {
                    format!("error HTTP: {}", e)
                };
                RemoteExecutionError::new(target, why)
            })?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().unwrap_or_default();
            return Err(RemoteExecutionError::new(
                target,
                format!("el runner devolvió status {}: {}", status, text.trim()),
            ));
        }

        let run: RunResponse = resp.json().map_err(|e| {
            RemoteExecutionError::new(target, format!("respuesta inválida del runner: {}", e))
        })?;

        Ok(run.result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_body_omits_absent_parameters() {
        let body = RunRequest {
            target: "/nb/a",
            timeout_seconds: 10,
            parameters: None,
        };
        let v = serde_json::to_value(&body).unwrap();

        assert_eq!(v["target"], "/nb/a");
        assert_eq!(v["timeout_seconds"], 10);
        assert!(v.get("parameters").is_none());
    }

    #[test]
    fn request_body_keeps_empty_parameters() {
        let params = JobParameters::new();
        let body = RunRequest {
            target: "/nb/a",
            timeout_seconds: 10,
            parameters: Some(&params),
        };
        let v = serde_json::to_value(&body).unwrap();

        assert_eq!(v["parameters"], serde_json::json!({}));
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let exec = HttpExecutor::new("http://runner:9000/");
        assert_eq!(exec.runs_url(), "http://runner:9000/api/v1/runs");
    }

    /// Nadie escucha en el puerto 1: la llamada tiene que fallar como error remoto.
    #[test]
    fn unreachable_runner_is_a_remote_execution_error() {
        let exec = HttpExecutor::new("http://127.0.0.1:1");

        let err = exec
            .execute("/nb/a", Duration::from_secs(2), None)
            .unwrap_err();

        assert_eq!(err.target, "/nb/a");
        assert!(!err.message.is_empty());
    }
}
