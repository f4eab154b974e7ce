//! Logger bootstrap for artifactkit binaries.
//!
//! Library crates only talk to the `log` facade; hosts call [`init_logging`]
//! once at startup.

use env_logger::{Builder, Env};
use log::LevelFilter;

/// Environment variable overriding the verbosity-derived filter.
pub const C_ENV_LOG: &str = "ARTIFACTKIT_LOG";

/// Map a `-v` count to a level filter. Quiet runs still show `info`.
pub fn derive_level_filter(verbosity: u8) -> LevelFilter {
    match verbosity {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

/// Install the global logger.
///
/// Returns `false` when a logger was already installed.
pub fn init_logging(verbosity: u8) -> bool {
    Builder::new()
        .filter_level(derive_level_filter(verbosity))
        .parse_env(Env::new().filter(C_ENV_LOG))
        .format_target(false)
        .try_init()
        .is_ok()
}
