use anyhow::Result;
use simple_logger::SimpleLogger;

/// Info by default; RUST_LOG overrides.
pub fn init() -> Result<()> {
    SimpleLogger::new()
        .with_level(log::LevelFilter::Info)
        .env()
        .init()?;

    Ok(())
}
