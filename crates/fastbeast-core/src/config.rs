use serde::Deserialize;
use std::path::PathBuf;

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Worker threads, each with its own reactor and listener.
    pub workers: usize,
    pub backlog: i32,
    /// Directory request targets resolve against.
    pub doc_root: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        let workers = std::thread::available_parallelism()
            .map(|n| n.get() / 2)
            .unwrap_or(1)
            .max(1);
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            workers,
            backlog: 1024,
            doc_root: PathBuf::from("."),
        }
    }
}
