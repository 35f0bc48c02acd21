//! Minimal logger.
//!
//! Prints `[elapsed LEVEL target] message` to stderr. Install it once at
//! startup with [`init_with_level`]; library crates only talk to the `log`
//! facade and never print on their own.

use std::io::Write;
use std::sync::OnceLock;
use std::time::Instant;

use log::{LevelFilter, Log, Metadata, Record};

#[cfg(feature = "tracing")]
use tracing_subscriber::fmt::format::FmtSpan;
#[cfg(feature = "tracing")]
use tracing_subscriber::util::SubscriberInitExt;
#[cfg(feature = "tracing")]
use tracing_subscriber::{fmt, EnvFilter};

struct StderrLogger {
    level: LevelFilter,
    started: Instant,
}

impl Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let elapsed = self.started.elapsed().as_secs_f64();
        let target = short_target(record.target());
        let mut stderr = std::io::stderr().lock();
        let _ = writeln!(
            stderr,
            "[{:7.3}s {:>5} {}] {}",
            elapsed,
            record.level(),
            target,
            record.args()
        );
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

/// `anthro_measure::wrist::scanline` -> `wrist::scanline`.
fn short_target(target: &str) -> &str {
    target.split_once("::").map(|(_, rest)| rest).unwrap_or(target)
}

static LOGGER: OnceLock<StderrLogger> = OnceLock::new();

/// Install the stderr logger with the provided level filter.
///
/// Calling this more than once is a no-op after the first successful
/// initialization.
pub fn init_with_level(level: LevelFilter) -> Result<(), log::SetLoggerError> {
    if LOGGER.get().is_none() {
        let logger = LOGGER.get_or_init(|| StderrLogger {
            level,
            started: Instant::now(),
        });
        log::set_logger(logger)?;
        log::set_max_level(level);
    }
    Ok(())
}

/// `EnvFilter` directive for a `log` level filter (`Info` -> `info`).
#[cfg(feature = "tracing")]
fn level_directive(level: LevelFilter) -> String {
    level.to_string().to_ascii_lowercase()
}

/// Install a `tracing` subscriber filtered by `RUST_LOG`, or by
/// `default_level` when `RUST_LOG` is unset.
#[cfg(feature = "tracing")]
pub fn init_tracing(json: bool, default_level: LevelFilter) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level_directive(default_level)));
    if json {
        let _ = fmt()
            .with_env_filter(filter)
            .with_span_events(FmtSpan::CLOSE)
            .json()
            .flatten_event(true)
            .finish()
            .try_init();
    } else {
        let _ = fmt()
            .with_env_filter(filter)
            .with_span_events(FmtSpan::CLOSE)
            .with_timer(fmt::time::Uptime::default())
            .with_writer(std::io::stderr)
            .finish()
            .try_init();
    }
}

#[cfg(test)]
mod tests {
    use super::short_target;

    #[test]
    fn short_target_drops_crate_prefix() {
        assert_eq!(short_target("anthro_measure::wrist::scanline"), "wrist::scanline");
        assert_eq!(short_target("anthro_scale"), "anthro_scale");
    }

    #[cfg(feature = "tracing")]
    #[test]
    fn default_level_becomes_filter_directive() {
        use super::level_directive;
        use log::LevelFilter;
        use tracing_subscriber::filter::LevelFilter as TraceLevel;
        use tracing_subscriber::EnvFilter;

        assert_eq!(level_directive(LevelFilter::Info), "info");
        let hint = EnvFilter::new(level_directive(LevelFilter::Warn)).max_level_hint();
        assert_eq!(hint, Some(TraceLevel::WARN));
    }
}
