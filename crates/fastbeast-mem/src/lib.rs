//! Allocation substrate for the request hot path: a fixed-capacity bump
//! arena reset between requests, and per-thread free-list pools for
//! fixed-size blocks.

pub mod arena;
pub mod pool;

pub use arena::{ArenaFull, BumpArena, Span, ARENA_CAPACITY};
pub use pool::BlockPool;
