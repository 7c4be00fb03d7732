use color_eyre::Result;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_error::ErrorLayer;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::{self, LOG_ENV, LOG_FILE};

/// Route `tracing` output into `<data_dir>/composer.log`; the terminal belongs
/// to the TUI. `RUST_LOG` takes precedence over `SEGMENT_COMPOSER_LOGLEVEL`.
///
/// The returned guard flushes the writer on drop and must outlive the app.
pub fn init(data_dir: &std::path::Path) -> Result<WorkerGuard> {
    config::ensure_data_dir_exists(data_dir)?;

    let file_appender = tracing_appender::rolling::never(data_dir, LOG_FILE.as_str());
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = EnvFilter::builder().with_default_directive(tracing::Level::INFO.into());
    // If the `RUST_LOG` environment variable is set, use that as the default,
    // otherwise use the value of the `LOG_ENV` environment variable.
    let env_filter = env_filter
        .try_from_env()
        .or_else(|_| env_filter.with_env_var(LOG_ENV.clone()).from_env())?;

    let file_subscriber = fmt::layer()
        .with_file(true)
        .with_line_number(true)
        .with_writer(non_blocking)
        .with_target(false)
        .with_ansi(false)
        .with_filter(env_filter);

    tracing_subscriber::registry()
        .with(file_subscriber)
        .with(ErrorLayer::default())
        .try_init()?;
    Ok(guard)
}
