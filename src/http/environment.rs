//! Request environment handed to the application.
//!
//! Every request header `X-Foo` becomes the key `HTTP_X_FOO`. `PATH_INFO`
//! and `REQUEST_METHOD` carry the request target and method. The request
//! body is never read, so the input stream is always empty.

use std::collections::HashMap;
use std::io::Cursor;

use bytes::Bytes;

use crate::http::request::ParsedRequest;

pub const PATH_INFO: &str = "PATH_INFO";
pub const REQUEST_METHOD: &str = "REQUEST_METHOD";

const HEADER_PREFIX: &str = "HTTP_";

#[derive(Debug, Clone)]
pub struct Environment {
    vars: HashMap<String, String>,
    input: Cursor<Bytes>,
}

impl Environment {
    /// Builds the environment for one parsed request.
    ///
    /// Two header names that normalize to the same key (`X-Foo` and `X_Foo`)
    /// keep the value of the one received last.
    pub fn from_request(request: &ParsedRequest) -> Self {
        let mut vars = HashMap::with_capacity(request.headers.len() + 2);

        for (name, value) in &request.headers {
            vars.insert(header_key(name), value.clone());
        }

        vars.insert(PATH_INFO.to_string(), request.target.clone());
        vars.insert(REQUEST_METHOD.to_string(), request.method.clone());

        Self {
            vars,
            input: Cursor::new(Bytes::new()),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.vars.contains_key(key)
    }

    pub fn path_info(&self) -> &str {
        self.get(PATH_INFO).unwrap_or_default()
    }

    pub fn request_method(&self) -> &str {
        self.get(REQUEST_METHOD).unwrap_or_default()
    }

    /// Number of string entries, not counting the input stream.
    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.vars.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// The request body stream. Implements `std::io::Read`.
    pub fn input(&mut self) -> &mut Cursor<Bytes> {
        &mut self.input
    }
}

/// `User-Agent` => `HTTP_USER_AGENT`
pub fn header_key(name: &str) -> String {
    let mut key = String::with_capacity(HEADER_PREFIX.len() + name.len());
    key.push_str(HEADER_PREFIX);
    key.extend(name.chars().map(|c| match c {
        '-' => '_',
        c => c.to_ascii_uppercase(),
    }));
    key
}
