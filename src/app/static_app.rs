use bytes::Bytes;
use tracing::debug;

use crate::app::Application;
use crate::http::environment::Environment;
use crate::http::response::{Response, ResponseBuilder};

/// One canned response, served when `PATH_INFO` equals `path`.
#[derive(Debug, Clone)]
pub struct Route {
    pub path: String,
    /// Restricts the route to one method when set
    pub method: Option<String>,
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<Bytes>,
}

impl Route {
    fn matches(&self, env: &Environment) -> bool {
        self.path == env.path_info()
            && self
                .method
                .as_deref()
                .is_none_or(|m| m.eq_ignore_ascii_case(env.request_method()))
    }

    fn respond(&self) -> Response {
        let builder = self
            .headers
            .iter()
            .fold(ResponseBuilder::new(self.status), |b, (k, v)| {
                b.header(k.as_str(), v.as_str())
            });

        self.body
            .iter()
            .fold(builder, |b, chunk| b.chunk(chunk.clone()))
            .build()
    }
}

/// Application serving fixed responses from a route table.
///
/// Routes are tried in order; the first match wins. Anything else gets a
/// 404.
#[derive(Debug, Clone, Default)]
pub struct StaticApp {
    routes: Vec<Route>,
    fallback: Option<Route>,
}

impl StaticApp {
    pub fn new(routes: Vec<Route>) -> Self {
        Self {
            routes,
            fallback: None,
        }
    }

    /// Answers every request with `Hello from the tube.`
    pub fn hello() -> Self {
        let route = Route {
            path: "/".to_string(),
            method: None,
            status: 200,
            headers: vec![("Content-Type".to_string(), "text/plain".to_string())],
            body: vec![Bytes::from_static(b"Hello from the tube.\n")],
        };

        Self {
            routes: Vec::new(),
            fallback: Some(route),
        }
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }
}

impl Application for StaticApp {
    fn call(&self, env: Environment) -> anyhow::Result<Response> {
        let route = self
            .routes
            .iter()
            .find(|r| r.matches(&env))
            .or(self.fallback.as_ref());

        match route {
            Some(route) => Ok(route.respond()),
            None => {
                debug!(path = env.path_info(), "no route matched");
                Ok(Response::not_found())
            }
        }
    }
}
