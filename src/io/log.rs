use std::fs::File;
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter (`tracing` directive syntax)
pub const LOG_ENV: &str = "CALCHECK_LOG";

fn filter() -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"))
}

/// Install the global subscriber. Logs go to `log_file` when given (the
/// terminal demo owns the screen), stderr otherwise. A second call is a
/// no-op.
pub fn init_logging(log_file: Option<&Path>) -> std::io::Result<()> {
    let builder = tracing_subscriber::fmt().with_env_filter(filter()).with_target(false);
    let installed = match log_file {
        Some(path) => {
            let file = File::create(path)?;
            builder
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init()
        }
        None => builder.with_writer(std::io::stderr).try_init(),
    };
    if installed.is_err() {
        tracing::debug!("log subscriber already installed");
    }
    Ok(())
}
