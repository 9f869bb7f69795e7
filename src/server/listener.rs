use std::io;
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::thread;
use std::time::Duration;

use anyhow::Context;
use tracing::{debug, info, warn};

/// Pause after an accept error that will not clear by itself (EMFILE, ENOBUFS).
pub const ACCEPT_BACKOFF: Duration = Duration::from_millis(50);

pub fn bind(addr: &str) -> anyhow::Result<TcpListener> {
    let listener =
        TcpListener::bind(addr).with_context(|| format!("failed to bind {addr}"))?;
    info!("Listening on {}", listener.local_addr()?);
    Ok(listener)
}

/// Accept errors that concern one aborted peer and can be retried at once.
pub fn is_transient(e: &io::Error) -> bool {
    matches!(
        e.kind(),
        io::ErrorKind::ConnectionAborted | io::ErrorKind::Interrupted
    )
}

/// Blocking accept loop shared by the sequential and threaded strategies.
///
/// Accept errors are logged and skipped so that one failed accept never
/// stops the server. Persistent errors back off for [`ACCEPT_BACKOFF`].
pub fn accept_loop<F>(listener: &TcpListener, mut serve: F) -> !
where
    F: FnMut(TcpStream, SocketAddr),
{
    loop {
        match listener.accept() {
            Ok((socket, peer)) => {
                debug!(%peer, "accepted connection");
                serve(socket, peer);
            }
            Err(e) if is_transient(&e) => debug!("accept interrupted: {}", e),
            Err(e) => {
                warn!("accept failed: {}", e);
                thread::sleep(ACCEPT_BACKOFF);
            }
        }
    }
}
