//! Builds a [`StaticApp`] from a YAML application file.
//!
//! ```yaml
//! routes:
//!   - path: /
//!     status: 200
//!     headers:
//!       Content-Type: text/plain
//!     body:
//!       - "Hello from the tube.\n"
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use bytes::Bytes;
use serde::Deserialize;
use serde_yaml::{Mapping, Value};
use thiserror::Error;
use tracing::info;

use crate::app::static_app::{Route, StaticApp};

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read application file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid application file: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("route {index}: {message}")]
    InvalidRoute { index: usize, message: String },
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct AppFile {
    #[serde(default)]
    routes: Vec<RouteFile>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RouteFile {
    path: String,
    #[serde(default)]
    method: Option<String>,
    #[serde(default = "default_status")]
    status: u16,
    // Mapping keeps the key order of the file
    #[serde(default)]
    headers: Mapping,
    #[serde(default)]
    body: Vec<String>,
}

fn default_status() -> u16 {
    200
}

pub fn load_file(path: impl AsRef<Path>) -> Result<StaticApp, LoadError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let app = load_str(&content)?;
    info!(path = %path.display(), routes = app.routes().len(), "application loaded");
    Ok(app)
}

pub fn load_str(content: &str) -> Result<StaticApp, LoadError> {
    let file: AppFile = serde_yaml::from_str(content)?;

    let routes = file
        .routes
        .into_iter()
        .enumerate()
        .map(|(index, route)| convert_route(index, route))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(StaticApp::new(routes))
}

fn convert_route(index: usize, route: RouteFile) -> Result<Route, LoadError> {
    let invalid = |message: String| LoadError::InvalidRoute { index, message };

    if route.path.is_empty() {
        return Err(invalid("path must not be empty".to_string()));
    }
    if !(100..=999).contains(&route.status) {
        return Err(invalid(format!("status {} out of range", route.status)));
    }

    let headers = route
        .headers
        .into_iter()
        .map(|(name, value)| match (name, value) {
            (Value::String(name), Value::String(value)) => Ok((name, value)),
            (Value::String(name), Value::Number(n)) => Ok((name, n.to_string())),
            (name, _) => Err(invalid(format!("header {name:?} must have a string value"))),
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Route {
        path: route.path,
        method: route.method,
        status: route.status,
        headers,
        body: route.body.into_iter().map(Bytes::from).collect(),
    })
}
