//! Level-prefixed logging.
//!
//! # Responsibilities
//! - Initialize the `tracing` subscriber from the configured log level
//! - Render every event as `<level> <message> <fields>` on stdout
//!
//! # Design Decisions
//! - The parent process classifies lines by prefix, so no ANSI and no timestamps
//! - TRACE folds into `debug`, the lowest level the parent understands
//! - `RUST_LOG` overrides the configured level when set

use std::fmt;

use tracing::{Event, Level, Subscriber};
use tracing_subscriber::fmt::{format::Writer, FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::LogLevel;

/// Event formatter writing the level name, a space, then the event fields.
#[derive(Debug, Clone, Copy, Default)]
pub struct LevelPrefixFormat;

impl<S, N> FormatEvent<S, N> for LevelPrefixFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        write!(writer, "{} ", level_name(event.metadata().level()))?;
        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

/// The prefix used for a `tracing` level.
pub fn level_name(level: &Level) -> &'static str {
    match *level {
        Level::ERROR => "error",
        Level::WARN => "warn",
        Level::INFO => "info",
        _ => "debug",
    }
}

/// Install the global subscriber. Call once, after startup output is written.
pub fn init(level: LogLevel) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("protocol_adapter={}", level.as_str())));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(std::io::stdout)
                .event_format(LevelPrefixFormat),
        )
        .init();
}
