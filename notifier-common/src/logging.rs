use std::str::FromStr;

use tracing::metadata::LevelFilter;
use tracing_subscriber::{
    Layer, filter::FilterFn, prelude::__tracing_subscriber_SubscriberExt, util::SubscriberInitExt,
};

/// Environment variable consulted by [`init`] for the log level.
pub const LOG_LEVEL_ENV: &str = "LOG_LEVEL";

#[macro_export]
macro_rules! log {
    ($level:expr, $span:expr, $($msg:expr),*) => {{
        let span = $crate::tracing::span!($level, $span);
        let _enter = span.enter();

        $crate::tracing::event!($level, $($msg),*)
    }};
}

#[macro_export]
macro_rules! internal {
    (level = $level:ident, $($msg:expr),*) => {
        $crate::log!($crate::tracing::Level::$level, "internal", $($msg),*)
    };

    ($($msg:expr),*) => {
        $crate::internal!(level = TRACE, $($msg),*)
    };
}

const fn default_level() -> LevelFilter {
    if cfg!(debug_assertions) {
        LevelFilter::TRACE
    } else {
        LevelFilter::INFO
    }
}

/// Resolve the level filter from the raw `LOG_LEVEL` value, falling back to
/// the build's default when the value is missing or unparsable.
fn level_from(value: Option<&str>) -> Result<LevelFilter, String> {
    let default = default_level();

    value.map_or(Ok(default), |level| {
        LevelFilter::from_str(level.trim()).map_err(|_| level.to_string())
    })
}

pub fn init() {
    let default = default_level();
    let level = match level_from(std::env::var(LOG_LEVEL_ENV).ok().as_deref()) {
        Ok(level) => level,
        Err(invalid) => {
            eprintln!("Invalid log level specified {invalid}, defaulting to {default}");
            default
        }
    };

    tracing_subscriber::Registry::default()
        .with(
            tracing_subscriber::fmt::layer()
                .with_file(false)
                .with_line_number(false)
                .compact()
                .with_ansi(true)
                .with_timer(tracing_subscriber::fmt::time::ChronoUtc::rfc_3339())
                .with_filter(level)
                .with_filter(FilterFn::new(|metadata| {
                    metadata.target().starts_with("notifier")
                })),
        )
        .init();
}
