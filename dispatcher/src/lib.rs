pub mod config;
pub mod dispatcher;
pub mod executor;
pub mod http;
mod retry;

pub use config::DispatcherConfig;
pub use dispatcher::Dispatcher;
pub use executor::RemoteExecutor;
pub use http::HttpExecutor;
