use std::env;

pub const DEFAULT_PARALLELISM: usize = 2;
pub const DEFAULT_RUNNER_URL: &str = "http://localhost:8080";

/// Configuración del dispatcher, leída de variables de entorno.
/// - DISPATCH_PARALLELISM: cantidad de jobs en paralelo (default 2)
/// - RUNNER_URL: URL base del runner remoto (default http://localhost:8080)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatcherConfig {
    pub parallelism: usize,
    pub runner_url: String,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            parallelism: DEFAULT_PARALLELISM,
            runner_url: DEFAULT_RUNNER_URL.to_string(),
        }
    }
}

impl DispatcherConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        // valores no parseables o 0 caen al default
        let parallelism = lookup("DISPATCH_PARALLELISM")
            .and_then(|s| s.trim().parse::<usize>().ok())
            .filter(|p| *p >= 1)
            .unwrap_or(DEFAULT_PARALLELISM);

        let runner_url = lookup("RUNNER_URL")
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_RUNNER_URL.to_string());

        Self {
            parallelism,
            runner_url,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> DispatcherConfig {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        DispatcherConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn defaults_when_nothing_is_set() {
        assert_eq!(config_from(&[]), DispatcherConfig::default());
    }

    #[test]
    fn reads_values_from_environment() {
        let cfg = config_from(&[
            ("DISPATCH_PARALLELISM", "8"),
            ("RUNNER_URL", "http://runner:9000"),
        ]);

        assert_eq!(cfg.parallelism, 8);
        assert_eq!(cfg.runner_url, "http://runner:9000");
    }

    #[test]
    fn invalid_parallelism_falls_back_to_default() {
        for bad in ["0", "-3", "muchos", ""] {
            let cfg = config_from(&[("DISPATCH_PARALLELISM", bad)]);
            assert_eq!(cfg.parallelism, DEFAULT_PARALLELISM, "valor {:?}", bad);
        }
    }
}
