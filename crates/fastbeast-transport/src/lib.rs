//! Connection plane: the `SO_REUSEPORT` acceptor fan-out, the per-connection
//! session loop, request dispatch, and the thread-local mmap file cache.

pub mod cache;
pub mod dispatcher;
pub mod server;
pub mod session;

pub use cache::{FileCache, MappedFile};
pub use dispatcher::{dispatch, Response, ResponseBody};
pub use server::{bind_reuseport, HttpServer};
pub use session::{pool_stats, serve_connection, PoolStats};
