use std::net::TcpListener;
use std::sync::Arc;
use std::thread;

use tracing::error;

use crate::app::Application;
use crate::http::connection::Connection;
use crate::server::listener::accept_loop;

/// Spawns one OS thread per accepted connection.
///
/// There is no pool and no limit; the accept loop never waits for a
/// connection to finish.
pub fn run(listener: &TcpListener, app: &Arc<dyn Application>) -> anyhow::Result<()> {
    accept_loop(listener, |socket, peer| {
        let app = Arc::clone(app);
        let spawned = thread::Builder::new()
            .name(format!("tube-conn-{peer}"))
            .spawn(move || {
                let conn = Connection::new(socket, app);
                if let Err(e) = conn.run() {
                    error!("Connection error from {}: {:#}", peer, e);
                }
            });

        if let Err(e) = spawned {
            error!("failed to spawn connection thread for {}: {}", peer, e);
        }
    })
}
