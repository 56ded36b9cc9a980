use std::sync::Once;

static INIT: Once = Once::new();

/// Initializes the global logger once; later calls are no-ops.
///
/// `filter` uses `env_logger` syntax (e.g. "info",
/// "whirl_engine=debug,wgpu=warn"). When `None`, `RUST_LOG` applies,
/// falling back to info level.
pub fn init_logging(filter: Option<&str>) {
    let filter = filter.map(str::to_owned);

    INIT.call_once(|| {
        let mut builder = env_logger::Builder::new();

        match filter.or_else(|| std::env::var("RUST_LOG").ok()) {
            Some(filter) => {
                builder.parse_filters(&filter);
            }
            None => {
                builder.filter_level(log::LevelFilter::Info);
            }
        }

        builder.init();
    });
}
