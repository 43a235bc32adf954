//! Logger setup shared by both binaries

/// Initialize `env_logger`
///
/// With `debug` the workspace crates log at debug level with millisecond
/// timestamps; otherwise `RUST_LOG` applies, defaulting to `warn`.
pub fn init(debug: bool) {
    if debug {
        env_logger::Builder::from_env(env_logger::Env::default())
            .filter_level(log::LevelFilter::Warn)
            .filter_module("iflow_tools_core", log::LevelFilter::Debug)
            .filter_module("iflow_tools_cli", log::LevelFilter::Debug)
            .format_timestamp_millis()
            .init();
        log::debug!("Debug logging enabled");
    } else {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    }
}
