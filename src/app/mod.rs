//! Application contract.
//!
//! The server calls exactly one [`Application`] per completed request. Any
//! `Fn(Environment) -> anyhow::Result<Response>` closure qualifies.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use tube::app::Application;
//! use tube::http::environment::Environment;
//! use tube::http::response::Response;
//!
//! let app: Arc<dyn Application> = Arc::new(|env: Environment| -> anyhow::Result<Response> {
//!     Ok(Response::ok(format!("you asked for {}\n", env.path_info())))
//! });
//! ```

pub mod loader;
pub mod static_app;

use crate::http::environment::Environment;
use crate::http::response::Response;

pub use loader::{LoadError, load_file, load_str};
pub use static_app::{Route, StaticApp};

/// Request handler supplied from outside the core.
///
/// Shared across every live connection, so implementations must tolerate
/// concurrent calls.
pub trait Application: Send + Sync + 'static {
    fn call(&self, env: Environment) -> anyhow::Result<Response>;
}

impl<F> Application for F
where
    F: Fn(Environment) -> anyhow::Result<Response> + Send + Sync + 'static,
{
    fn call(&self, env: Environment) -> anyhow::Result<Response> {
        self(env)
    }
}
