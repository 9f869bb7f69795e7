//! HTTP protocol adaptation.
//!
//! Turns the bytes of one accepted socket into one application call and
//! the application's result back into bytes.
//!
//! # Architecture
//!
//! - **`parser`**: incremental request-line and header parsing
//! - **`request`**: the parsed request line and headers
//! - **`environment`**: the normalized mapping handed to the application
//! - **`response`**: status, headers and body returned by the application
//! - **`writer`**: serializes a response onto the socket
//! - **`connection`**: the per-socket state machine
//!
//! # Connection State Machine
//!
//! ```text
//!        ┌─────────────┐
//!        │   Reading   │ ← Feed socket bytes to the parser
//!        └──────┬──────┘
//!               │ Header block complete       (EOF first → Closed)
//!               ▼
//!        ┌──────────────────┐
//!        │   Dispatching    │ ← Build environment, call application
//!        └──────┬───────────┘
//!               │ Response ready
//!               ▼
//!        ┌──────────────────┐
//!        │    Writing       │ ← Send response, release body
//!        └──────┬───────────┘
//!               │ Response sent
//!               ▼
//!        ┌──────────────────┐
//!        │     Closed       │ ← Socket dropped
//!        └──────────────────┘
//! ```
//!
//! There is no keep-alive: a connection never returns to `Reading`.

pub mod connection;
pub mod environment;
pub mod parser;
pub mod request;
pub mod response;
pub mod writer;
