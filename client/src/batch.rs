use anyhow::{Context, Result};
use common::{JobRequest, JobSpec};
use std::fs;

/// Lee un archivo JSON con un array de jobs y los valida todos.
///
/// Falla apenas un job es inválido: no se despacha nada de un batch roto.
pub fn load_batch(path: &str) -> Result<Vec<JobSpec>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("no se pudo leer el batch {}", path))?;
    parse_batch(&raw).with_context(|| format!("batch inválido en {}", path))
}

pub fn parse_batch(raw: &str) -> Result<Vec<JobSpec>> {
    let requests: Vec<JobRequest> =
        serde_json::from_str(raw).context("el batch debe ser un array JSON de jobs")?;

    requests
        .into_iter()
        .enumerate()
        .map(|(i, req)| JobSpec::try_from(req).with_context(|| format!("job #{}", i)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::DispatchError;
    use std::path::PathBuf;
    use std::time::Duration;

    fn temp_dir(sub: &str) -> PathBuf {
        let base = std::env::temp_dir().join("client_batch_tests").join(sub);
        let _ = fs::remove_dir_all(&base);
        fs::create_dir_all(&base).unwrap();
        base
    }

    #[test]
    fn parses_a_valid_batch_in_order() {
        let raw = r#"[
            {"target": "/etl/a", "timeout_secs": 60, "retry_budget": 2,
             "parameters": {"fecha": "2024-01-01"}},
            {"target": "/etl/b", "timeout_secs": 30}
        ]"#;

        let jobs = parse_batch(raw).unwrap();

        assert_eq!(jobs.len(), 2);
        assert_eq!(jobs[0].target(), "/etl/a");
        assert_eq!(jobs[0].timeout(), Duration::from_secs(60));
        assert_eq!(jobs[0].retry_budget(), 2);
        assert_eq!(jobs[0].parameters().unwrap()["fecha"], "2024-01-01");
        assert_eq!(jobs[1].target(), "/etl/b");
        assert!(jobs[1].parameters().is_none());
    }

    /// Un solo job inválido tira abajo todo el batch, con el error tipado adentro.
    #[test]
    fn one_invalid_job_rejects_the_batch() {
        let raw = r#"[
            {"target": "/etl/a", "timeout_secs": 60},
            {"target": "/etl/b", "timeout_secs": 30, "retry_budget": -1}
        ]"#;

        let err = parse_batch(raw).unwrap_err();

        assert!(err.to_string().contains("job #1"));
        let cause = err.downcast_ref::<DispatchError>().unwrap();
        assert!(matches!(cause, DispatchError::InvalidSpec(_)));
    }

    #[test]
    fn non_array_json_is_rejected() {
        assert!(parse_batch(r#"{"target": "/etl/a"}"#).is_err());
    }

    #[test]
    fn load_batch_reads_from_disk() {
        let tmp = temp_dir("load");
        let path = tmp.join("batch.json");
        fs::write(&path, r#"[{"target": "/etl/a", "timeout_secs": 5}]"#).unwrap();

        let jobs = load_batch(path.to_str().unwrap()).unwrap();
        assert_eq!(jobs.len(), 1);
    }

    #[test]
    fn load_batch_fails_when_file_is_missing() {
        let tmp = temp_dir("missing");
        let path = tmp.join("no_existe.json");

        assert!(load_batch(path.to_str().unwrap()).is_err());
    }
}
