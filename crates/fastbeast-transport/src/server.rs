//! Acceptor fan-out: one worker thread per reactor, every worker binding its
//! own listener to the shared endpoint with `SO_REUSEPORT` so the kernel
//! load-balances connections without any cross-thread coordination.

use crate::cache::FileCache;
use crate::session::serve_connection;
use fastbeast_core::{ServerConfig, ServerError};
use socket2::{Domain, Protocol, Socket, Type};
use std::cell::RefCell;
use std::net::SocketAddr;
use std::rc::Rc;
use tokio::net::TcpListener;

/// Builds one listener for the shared endpoint. `SO_REUSEPORT` must be set
/// before `bind` so the kernel enrolls the socket in the balancing group.
pub fn bind_reuseport(addr: SocketAddr, backlog: i32) -> std::io::Result<std::net::TcpListener> {
    let socket = Socket::new(Domain::for_address(addr), Type::STREAM, Some(Protocol::TCP))?;
    socket.set_reuse_port(true)?;
    socket.set_nonblocking(true)?;
    socket.bind(&addr.into())?;
    socket.listen(backlog)?;
    Ok(socket.into())
}

pub struct HttpServer {
    config: ServerConfig,
}

impl HttpServer {
    pub fn new(config: ServerConfig) -> Self {
        Self { config }
    }

    /// Starts the worker fan-out and serves until every accept loop has
    /// terminated. The calling thread serves as worker 0.
    pub fn run(self) -> Result<(), ServerError> {
        let addr: SocketAddr = format!("{}:{}", self.config.host, self.config.port).parse()?;
        let workers = self.config.workers.max(1);

        let mut handles = Vec::with_capacity(workers - 1);
        for id in 1..workers {
            let config = self.config.clone();
            handles.push(
                std::thread::Builder::new()
                    .name(format!("fastbeast-worker-{id}"))
                    .spawn(move || worker_loop(id, addr, &config))?,
            );
        }
        worker_loop(0, addr, &self.config);

        for handle in handles {
            let _ = handle.join();
        }
        Ok(())
    }
}

fn worker_loop(id: usize, addr: SocketAddr, config: &ServerConfig) {
    let rt = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(err) => {
            tracing::error!(worker = id, %err, "failed to build reactor");
            return;
        }
    };

    let doc_root = config.doc_root.clone();
    let backlog = config.backlog;
    let local = tokio::task::LocalSet::new();
    local.block_on(&rt, async move {
        let listener = match bind_reuseport(addr, backlog).and_then(TcpListener::from_std) {
            Ok(listener) => listener,
            Err(err) => {
                tracing::error!(worker = id, %addr, %err, "bind failed");
                return;
            }
        };
        tracing::info!(worker = id, %addr, "listening");

        let cache = Rc::new(RefCell::new(FileCache::new(doc_root)));
        loop {
            match listener.accept().await {
                Ok((stream, _peer)) => {
                    let _ = stream.set_nodelay(true);
                    let cache = cache.clone();
                    tokio::task::spawn_local(serve_connection(stream, cache));
                }
                Err(err) => {
                    // This worker stops accepting; the others serve on.
                    tracing::error!(worker = id, %err, "accept error");
                    break;
                }
            }
        }
    });
}
