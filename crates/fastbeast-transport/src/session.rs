//! Per-connection session loop: parse one request from the flat buffer,
//! dispatch it, emit the response with gathered writes, then either recycle
//! the arena for the next request on the connection or close.
//!
//! Session control blocks and read buffers are recycled through per-thread
//! free lists; the pools never cross threads and releasing never suspends.

use crate::cache::FileCache;
use crate::dispatcher::dispatch;
use fastbeast_http::serializer::{GatherSerializer, SerializedHead};
use fastbeast_http::{ParseStatus, RequestParser};
use fastbeast_mem::{BlockPool, BumpArena};
use std::cell::RefCell;
use std::io::IoSlice;
use std::ops::{Deref, DerefMut};
use std::rc::Rc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

/// Flat per-connection buffer; request bytes accumulate here across read
/// suspensions and pipelined leftovers are compacted to its front.
pub const READ_BUFFER_SIZE: usize = 16 * 1024;

/// Per-connection control block: request arena plus parser state.
pub struct SessionBlock {
    arena: BumpArena,
    parser: RequestParser,
}

impl SessionBlock {
    fn new() -> Self {
        Self {
            arena: BumpArena::new(),
            parser: RequestParser::new(),
        }
    }
}

pub struct ReadBuffer(Box<[u8]>);

impl ReadBuffer {
    fn new() -> Self {
        Self(vec![0u8; READ_BUFFER_SIZE].into_boxed_slice())
    }
}

impl Deref for ReadBuffer {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.0
    }
}

impl DerefMut for ReadBuffer {
    fn deref_mut(&mut self) -> &mut [u8] {
        &mut self.0
    }
}

thread_local! {
    static SESSION_POOL: RefCell<BlockPool<SessionBlock>> =
        RefCell::new(BlockPool::new(SessionBlock::new));
    static BUFFER_POOL: RefCell<BlockPool<ReadBuffer>> =
        RefCell::new(BlockPool::new(ReadBuffer::new));
}

trait PoolItem: Sized + 'static {
    fn pool() -> &'static std::thread::LocalKey<RefCell<BlockPool<Self>>>;
    fn recycle(&mut self);
}

impl PoolItem for SessionBlock {
    fn pool() -> &'static std::thread::LocalKey<RefCell<BlockPool<Self>>> {
        &SESSION_POOL
    }

    fn recycle(&mut self) {
        self.arena.reset();
        self.parser.reset();
    }
}

impl PoolItem for ReadBuffer {
    fn pool() -> &'static std::thread::LocalKey<RefCell<BlockPool<Self>>> {
        &BUFFER_POOL
    }

    fn recycle(&mut self) {}
}

/// Guard returning its block to the owning thread's pool on drop, so every
/// exit path of the session task recycles.
struct Pooled<T: PoolItem>(Option<T>);

impl<T: PoolItem> Pooled<T> {
    fn acquire() -> Self {
        Self(Some(T::pool().with(|p| p.borrow_mut().acquire())))
    }
}

impl<T: PoolItem> Deref for Pooled<T> {
    type Target = T;

    fn deref(&self) -> &T {
        self.0.as_ref().expect("pooled block taken")
    }
}

impl<T: PoolItem> DerefMut for Pooled<T> {
    fn deref_mut(&mut self) -> &mut T {
        self.0.as_mut().expect("pooled block taken")
    }
}

impl<T: PoolItem> Drop for Pooled<T> {
    fn drop(&mut self) {
        if let Some(mut block) = self.0.take() {
            block.recycle();
            T::pool().with(|p| p.borrow_mut().release(block));
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolStats {
    pub sessions_in_use: usize,
    pub sessions_idle: usize,
    pub buffers_in_use: usize,
    pub buffers_idle: usize,
}

/// Snapshot of this thread's session and buffer pools.
pub fn pool_stats() -> PoolStats {
    let (sessions_in_use, sessions_idle) =
        SESSION_POOL.with(|p| (p.borrow().in_use(), p.borrow().idle()));
    let (buffers_in_use, buffers_idle) =
        BUFFER_POOL.with(|p| (p.borrow().in_use(), p.borrow().idle()));
    PoolStats {
        sessions_in_use,
        sessions_idle,
        buffers_in_use,
        buffers_idle,
    }
}

/// Drives one connection to completion. All failures are terminal for the
/// connection and none escape this task.
pub async fn serve_connection(mut stream: TcpStream, cache: Rc<RefCell<FileCache>>) {
    let mut session = Pooled::<SessionBlock>::acquire();
    let mut buffer = Pooled::<ReadBuffer>::acquire();
    let mut filled = 0usize;

    loop {
        // READ: poll the parser over buffered bytes first so pipelined
        // requests are served before touching the socket again.
        let (request, consumed) = loop {
            let block = &mut *session;
            match block.parser.poll(&buffer[..filled], &mut block.arena) {
                Ok(ParseStatus::Complete { request, consumed }) => break (request, consumed),
                Ok(ParseStatus::Incomplete) => {}
                // Parse failures close without a response and without a log
                // line, as do read errors below.
                Err(_) => return,
            }
            if filled == buffer.len() {
                return;
            }
            match stream.read(&mut buffer[filled..]).await {
                Ok(0) => return,
                Ok(n) => filled += n,
                Err(_) => return,
            }
        };

        buffer.copy_within(consumed..filled, 0);
        filled -= consumed;

        // DISPATCH
        let response = dispatch(&request, &mut cache.borrow_mut());

        // WRITE: one gathered write per attempt, resumed on short writes.
        let head = SerializedHead::format(&response.head);
        let mut serializer = GatherSerializer::new(&head, response.body.as_slice());
        while !serializer.is_done() {
            let mut slices = [IoSlice::new(&[]); 8];
            let iov = serializer.slices(&mut slices);
            match stream.write_vectored(iov).await {
                Ok(0) => {
                    tracing::error!("write error: connection closed mid-response");
                    return;
                }
                Ok(n) => serializer.consume(n),
                Err(err) => {
                    tracing::error!(%err, "write error");
                    return;
                }
            }
        }

        // LOOP: recycle all per-request memory before the next request on
        // this connection.
        if !request.keep_alive {
            return;
        }
        let block = &mut *session;
        block.arena.reset();
        block.parser.reset();
    }
}
