//! Concurrency strategies.
//!
//! Every strategy accepts from the same listening socket and hands each
//! accepted socket to a [`Connection`](crate::http::connection::Connection)
//! (or its reactor twin). They differ only in scheduling:
//!
//! - **`sequential`**: one connection at a time on the calling thread
//! - **`threaded`**: one OS thread per connection
//! - **`prefork`**: N forked worker processes, each running `sequential`
//! - **`reactor`**: a single-threaded tokio event loop

pub mod listener;
pub mod prefork;
pub mod reactor;
pub mod sequential;
pub mod threaded;

use std::fmt;
use std::net::{SocketAddr, TcpListener};
use std::sync::Arc;

use crate::app::Application;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    Sequential,
    Threaded,
    Prefork { workers: usize },
    Reactor,
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strategy::Sequential => write!(f, "sequential"),
            Strategy::Threaded => write!(f, "threaded"),
            Strategy::Prefork { workers } => write!(f, "prefork ({workers} workers)"),
            Strategy::Reactor => write!(f, "reactor"),
        }
    }
}

/// A bound listening socket plus the application it serves.
pub struct Server {
    listener: TcpListener,
    app: Arc<dyn Application>,
}

impl Server {
    pub fn bind(addr: &str, app: Arc<dyn Application>) -> anyhow::Result<Self> {
        let listener = listener::bind(addr)?;
        Ok(Self::from_listener(listener, app))
    }

    pub fn from_listener(listener: TcpListener, app: Arc<dyn Application>) -> Self {
        Self { listener, app }
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Serves connections until the strategy stops.
    ///
    /// Sequential and threaded never return: accept errors are logged and
    /// retried. Prefork returns once every worker has exited. Reactor
    /// returns on Ctrl-C.
    pub fn run(self, strategy: Strategy) -> anyhow::Result<()> {
        tracing::info!(%strategy, "starting accept loop");

        match strategy {
            Strategy::Sequential => sequential::run(&self.listener, &self.app),
            Strategy::Threaded => threaded::run(&self.listener, &self.app),
            Strategy::Prefork { workers } => prefork::run(&self.listener, &self.app, workers),
            Strategy::Reactor => reactor::run(self.listener, self.app),
        }
    }
}
