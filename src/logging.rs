use env_logger::Env;

/// Log to stderr at `info` unless `RUST_LOG` says otherwise.
pub fn init() {
    let _ = env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .try_init();
}
