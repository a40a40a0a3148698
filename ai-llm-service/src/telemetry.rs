//! Library-scoped log rendering.
//!
//! Binaries compose [`layer`] into their own subscriber to get compact,
//! timestamped lines for provider traffic without changing how the rest of
//! the application logs.

use std::io::{self, IsTerminal};
use std::str::FromStr;

use tracing::Level;
use tracing_subscriber::filter::{Directive, ParseError};
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::time::FormatTime;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{EnvFilter, Layer, filter, fmt};

/// Target prefix of every event emitted by this crate.
pub const TARGET_PREFIX: &str = "ai_llm_service";

/// RFC3339 UTC timestamps without fractional seconds, e.g. `2025-09-12T10:20:30Z`.
#[derive(Clone, Debug, Default)]
struct ChronoRfc3339Utc;

impl FormatTime for ChronoRfc3339Utc {
    fn format_time(&self, w: &mut Writer<'_>) -> std::fmt::Result {
        let now = chrono::Utc::now();
        w.write_str(&now.to_rfc3339_opts(chrono::SecondsFormat::Secs, true))
    }
}

/// Formatting layer that renders ONLY events emitted by this crate.
///
/// Compact single-line output with source location, span-close timings for
/// `#[instrument]`ed calls, and ANSI colors only when stdout is a terminal.
pub fn layer<S>() -> impl Layer<S> + Send + Sync
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
{
    let only_this_crate = filter::filter_fn(|meta| meta.target().starts_with(TARGET_PREFIX));

    fmt::layer()
        .with_timer(ChronoRfc3339Utc)
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .with_ansi(io::stdout().is_terminal())
        .with_span_events(fmt::format::FmtSpan::CLOSE)
        .event_format(fmt::format().compact().with_source_location(true))
        .with_filter(only_this_crate)
}

/// Directive such as `ai_llm_service=debug`.
pub fn level_directive(level: Level) -> Result<Directive, ParseError> {
    Directive::from_str(&format!(
        "{TARGET_PREFIX}={}",
        level.as_str().to_lowercase()
    ))
}

/// Filter for the whole process.
///
/// A non-empty `RUST_LOG` is used as is. Otherwise `default` applies with
/// this crate at `level`.
pub fn env_filter_with_level(default: &str, level: Level) -> EnvFilter {
    filter_from(std::env::var(EnvFilter::DEFAULT_ENV).ok().as_deref(), default, level)
}

fn filter_from(rust_log: Option<&str>, default: &str, level: Level) -> EnvFilter {
    if let Some(spec) = rust_log.map(str::trim).filter(|s| !s.is_empty()) {
        match EnvFilter::try_new(spec) {
            Ok(f) => return f,
            Err(e) => eprintln!("ignoring invalid {}={spec:?}: {e}", EnvFilter::DEFAULT_ENV),
        }
    }
    let base = EnvFilter::new(default);
    match level_directive(level) {
        Ok(d) => base.add_directive(d),
        Err(_) => base,
    }
}
