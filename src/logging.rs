//! Logger installation for the binary and tests.
use env_logger::{Builder, Env};
use log::{debug, LevelFilter};

/// Modules whose chatter is capped at `warn` unless `RUST_LOG` says otherwise.
const QUIET_MODULES: [&str; 2] = ["bevy_app", "bevy_ecs"];

fn default_filter(verbose: bool) -> String {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    QUIET_MODULES
        .iter()
        .fold(level.to_string(), |filter, module| format!("{filter},{module}=warn"))
}

/// Initializes the global logger.
///
/// When `verbose` is `true`, debug messages (entity lifecycle, spawner waves,
/// portal travel) are printed. Otherwise only info level and above are shown.
/// `RUST_LOG` overrides both defaults.
pub fn init(verbose: bool) {
    let env = Env::default().default_filter_or(default_filter(verbose));
    let mut builder = Builder::from_env(env);
    builder.format_timestamp_millis();

    // A second call finds the first logger installed and keeps it.
    if builder.try_init().is_err() {
        debug!("logger already installed");
    }
}
