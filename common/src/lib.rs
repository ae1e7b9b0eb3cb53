pub mod error;
pub mod job;
pub mod results;

pub use error::{DispatchError, ErrorKind, RemoteExecutionError};
pub use job::{JobId, JobParameters, JobRequest, JobSpec};
pub use results::{JobFailure, JobOutcome, JobResult};
