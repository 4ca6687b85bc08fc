use tracing_subscriber::EnvFilter;

/// Installs the stderr subscriber. stdout carries protocol lines only.
///
/// `RUST_LOG` wins over the configured level.
pub fn init(level: Option<&str>) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.unwrap_or("info")));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .try_init();
}
