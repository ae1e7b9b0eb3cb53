use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Categoría de un error, para quien necesite ramificar sin mirar el mensaje.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    InvalidSpec,
    InvalidArgument,
    RemoteExecution,
    PoolClosed,
    Runtime,
}

/// Fallo de una llamada al ejecutor remoto.
///
/// No se distingue entre fallos transitorios y permanentes: cualquier fallo
/// (incluido un timeout) se reintenta igual mientras quede presupuesto.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("fallo ejecutando {target}: {message}")]
pub struct RemoteExecutionError {
    pub target: String,
    pub message: String,
}

impl RemoteExecutionError {
    pub fn new(target: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum DispatchError {
    /// JobSpec mal formado (timeout o reintentos inválidos).
    #[error("job inválido: {0}")]
    InvalidSpec(String),

    /// Llamada mal formada a submit_batch (ej: parallelism = 0).
    #[error("argumento inválido: {0}")]
    InvalidArgument(String),

    /// El pool de concurrencia se cerró antes de entregar un slot.
    #[error("el pool de workers está cerrado")]
    PoolClosed,

    /// No se pudo construir el runtime de tokio para la variante bloqueante.
    #[error("no se pudo crear el runtime: {0}")]
    Runtime(#[from] std::io::Error),
}

impl DispatchError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            DispatchError::InvalidSpec(_) => ErrorKind::InvalidSpec,
            DispatchError::InvalidArgument(_) => ErrorKind::InvalidArgument,
            DispatchError::PoolClosed => ErrorKind::PoolClosed,
            DispatchError::Runtime(_) => ErrorKind::Runtime,
        }
    }
}
