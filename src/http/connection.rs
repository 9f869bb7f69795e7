use std::io::{Read, Write};
use std::sync::Arc;

use anyhow::Context;
use tracing::{debug, info};

use crate::app::Application;
use crate::http::environment::Environment;
use crate::http::parser::RequestParser;
use crate::http::request::ParsedRequest;
use crate::http::response::Response;
use crate::http::writer::ResponseWriter;

/// Size of each socket read.
pub const READ_CHUNK: usize = 1024;

/// One accepted socket serving at most one request.
///
/// The socket is owned by the connection and closed when [`run`](Self::run)
/// returns, whatever the outcome.
pub struct Connection<S> {
    stream: S,
    parser: RequestParser,
    app: Arc<dyn Application>,
    state: ConnectionState,
}

pub enum ConnectionState {
    Reading,
    Dispatching(ParsedRequest),
    Writing(ResponseWriter),
    Closed,
}

impl<S: Read + Write> Connection<S> {
    pub fn new(stream: S, app: Arc<dyn Application>) -> Self {
        Self {
            stream,
            parser: RequestParser::new(),
            app,
            state: ConnectionState::Reading,
        }
    }

    pub fn run(mut self) -> anyhow::Result<()> {
        loop {
            match std::mem::replace(&mut self.state, ConnectionState::Closed) {
                ConnectionState::Reading => {
                    self.state = match self.read_request()? {
                        Some(req) => ConnectionState::Dispatching(req),
                        None => {
                            debug!("peer closed before completing a request");
                            ConnectionState::Closed
                        }
                    };
                }

                ConnectionState::Dispatching(req) => {
                    let response = dispatch(self.app.as_ref(), req)?;
                    self.state = ConnectionState::Writing(ResponseWriter::new(response));
                }

                ConnectionState::Writing(writer) => {
                    writer
                        .write_to(&mut self.stream)
                        .context("failed to write response")?;
                    // One request per connection, never back to Reading
                    self.state = ConnectionState::Closed;
                }

                ConnectionState::Closed => break,
            }
        }

        Ok(())
    }

    fn read_request(&mut self) -> anyhow::Result<Option<ParsedRequest>> {
        let mut temp = [0u8; READ_CHUNK];

        loop {
            let n = match self.stream.read(&mut temp) {
                Ok(n) => n,
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e).context("failed to read request"),
            };

            if n == 0 {
                // Client closed connection
                return Ok(None);
            }

            if let Some(request) = self
                .parser
                .feed(&temp[..n])
                .context("HTTP parse error")?
            {
                return Ok(Some(request));
            }
        }
    }
}

/// Builds the environment for `request` and runs the application on it.
pub fn dispatch(app: &dyn Application, request: ParsedRequest) -> anyhow::Result<Response> {
    info!(method = %request.method, target = %request.target, "{}", request.request_line());
    debug!(headers = ?request.headers, "request headers");

    let env = Environment::from_request(&request);
    let response = app.call(env).context("application failed")?;

    info!(status = response.status, "response");
    Ok(response)
}
