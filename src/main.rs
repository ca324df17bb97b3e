use fastbeast::{HttpServer, ServerConfig};
use tracing_subscriber::fmt::writer::MakeWriterExt;

fn main() -> anyhow::Result<()> {
    // Two line-buffered sinks: warnings and errors to stderr, the rest to
    // stdout. Each event is a single write.
    let writer = std::io::stderr
        .with_max_level(tracing::Level::WARN)
        .or_else(std::io::stdout);
    tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .with_writer(writer)
        .init();

    let config = ServerConfig::default();
    tracing::info!(
        host = %config.host,
        port = config.port,
        workers = config.workers,
        "starting fastbeast"
    );
    HttpServer::new(config).run()?;
    Ok(())
}
