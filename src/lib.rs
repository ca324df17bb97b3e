//! fastbeast — a memory-mapped static file server built around a
//! thread-per-core reactor fan-out and a nearly allocation-free request
//! path. This crate re-exports the workspace members.

pub use fastbeast_core::{ServerConfig, ServerError};
pub use fastbeast_http as http;
pub use fastbeast_mem as mem;
pub use fastbeast_transport as transport;

pub use fastbeast_transport::HttpServer;
