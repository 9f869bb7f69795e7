//! Tube - minimal HTTP server core
//!
//! Parses raw socket bytes into requests, hands a normalized environment
//! to an [`app::Application`], and writes its response back before closing
//! the socket. Connections are scheduled by one of four
//! [`server::Strategy`] variants.

pub mod app;
pub mod config;
pub mod http;
pub mod server;
