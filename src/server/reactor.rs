use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use bytes::BytesMut;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::LocalSet;
use tracing::{debug, error, info, warn};

use crate::app::Application;
use crate::http::connection::{READ_CHUNK, dispatch};
use crate::http::parser::{ParseError, RequestParser};
use crate::http::request::ParsedRequest;
use crate::http::writer::ResponseWriter;
use crate::server::listener::{ACCEPT_BACKOFF, is_transient};

/// Runs every connection on one thread with a tokio event loop.
///
/// Returns when Ctrl-C is received.
pub fn run(listener: std::net::TcpListener, app: Arc<dyn Application>) -> anyhow::Result<()> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to build reactor runtime")?;

    let local = LocalSet::new();
    local.block_on(&runtime, async move {
        listener
            .set_nonblocking(true)
            .context("failed to make listener non-blocking")?;
        let listener = TcpListener::from_std(listener)?;

        tokio::select! {
            _ = accept_loop(listener, app) => {}

            _ = tokio::signal::ctrl_c() => {
                info!("Shutdown signal received");
            }
        }

        Ok::<(), anyhow::Error>(())
    })
}

async fn accept_loop(listener: TcpListener, app: Arc<dyn Application>) {
    loop {
        match listener.accept().await {
            Ok((socket, peer)) => {
                debug!(%peer, "accepted connection");
                let conn = ReactorConnection::new(socket, peer, Arc::clone(&app));
                tokio::task::spawn_local(conn.serve());
            }
            Err(e) if is_transient(&e) => debug!("accept interrupted: {}", e),
            Err(e) => {
                warn!("accept failed: {}", e);
                tokio::time::sleep(ACCEPT_BACKOFF).await;
            }
        }
    }
}

/// Reactor-side connection state, kept alive between readiness events.
pub struct ReactorConnection {
    stream: TcpStream,
    peer: SocketAddr,
    parser: RequestParser,
    app: Arc<dyn Application>,
}

impl ReactorConnection {
    pub fn new(stream: TcpStream, peer: SocketAddr, app: Arc<dyn Application>) -> Self {
        Self {
            stream,
            peer,
            parser: RequestParser::new(),
            app,
        }
    }

    async fn serve(mut self) {
        if let Err(e) = self.process().await {
            error!("Connection error from {}: {:#}", self.peer, e);
        }
    }

    async fn process(&mut self) -> anyhow::Result<()> {
        let mut buf = BytesMut::with_capacity(READ_CHUNK);

        loop {
            buf.clear();
            let n = self
                .stream
                .read_buf(&mut buf)
                .await
                .context("failed to read request")?;

            if n == 0 {
                debug!(peer = %self.peer, "peer closed before completing a request");
                return Ok(());
            }

            if let Some(request) = self.on_data(&buf).context("HTTP parse error")? {
                return self.respond(request).await;
            }
        }
    }

    /// Feeds newly arrived bytes to the parser.
    pub fn on_data(&mut self, data: &[u8]) -> Result<Option<ParsedRequest>, ParseError> {
        self.parser.feed(data)
    }

    async fn respond(&mut self, request: ParsedRequest) -> anyhow::Result<()> {
        let response = dispatch(self.app.as_ref(), request)?;

        ResponseWriter::new(response)
            .write_to_stream(&mut self.stream)
            .await
            .context("failed to write response")?;

        // Close once the outgoing buffer is flushed
        self.stream.shutdown().await.context("failed to close connection")?;
        Ok(())
    }
}
