use std::net::TcpListener;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use tracing::error;

use crate::app::Application;
use crate::http::connection::Connection;
use crate::server::listener::accept_loop;

/// Serves one connection at a time on the calling thread.
pub fn run(listener: &TcpListener, app: &Arc<dyn Application>) -> anyhow::Result<()> {
    accept_loop(listener, |socket, peer| {
        let conn = Connection::new(socket, Arc::clone(app));

        // A panicking application only loses its own connection.
        match panic::catch_unwind(AssertUnwindSafe(|| conn.run())) {
            Ok(Ok(())) => {}
            Ok(Err(e)) => error!("Connection error from {}: {:#}", peer, e),
            Err(_) => error!("Connection from {} panicked", peer),
        }
    })
}
