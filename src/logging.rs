use log::LevelFilter;

/// Initialize the logger. `RUST_LOG`, when set, overrides the level chosen
/// from `verbose`.
pub fn init_logger(verbose: bool) {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format_timestamp(None)
        .format_target(false)
        .init();

    log::debug!("Logger initialized with level: {level:?}");
}
