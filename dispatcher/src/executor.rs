use common::{JobParameters, RemoteExecutionError};
use std::time::Duration;

/// Capacidad de ejecutar un job remoto y devolver su payload.
///
/// La llamada es bloqueante: ocupa el hilo del worker hasta que el job remoto
/// termina o vence `timeout`. El timeout lo hace cumplir la implementación.
/// `parameters = None` significa "no mandar parámetros", distinto de un mapa vacío.
pub trait RemoteExecutor: Send + Sync {
    fn execute(
        &self,
        target: &str,
        timeout: Duration,
        parameters: Option<&JobParameters>,
    ) -> Result<String, RemoteExecutionError>;
}

/// Cualquier closure con la misma firma sirve como ejecutor (útil en tests).
impl<F> RemoteExecutor for F
where
    F: Fn(&str, Duration, Option<&JobParameters>) -> Result<String, RemoteExecutionError>
        + Send
        + Sync,
{
    fn execute(
        &self,
        target: &str,
        timeout: Duration,
        parameters: Option<&JobParameters>,
    ) -> Result<String, RemoteExecutionError> {
        self(target, timeout, parameters)
    }
}
