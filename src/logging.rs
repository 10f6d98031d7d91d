//! Logging initialization utilities.

use env_logger::Env;

/// Initialize logging. `RUST_LOG` still wins over the default filter.
pub fn init(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let env = Env::default().default_filter_or(default);
    let _ = env_logger::Builder::from_env(env)
        .format_timestamp(None)
        .try_init();
}
