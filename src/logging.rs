use std::env;
use std::io::Write;
use std::sync::OnceLock;
use std::time::Instant;

use log::{LevelFilter, Metadata, Record};

/// Environment variable holding the log level (`error` .. `trace`).
const LEVEL_VAR: &str = "BATTLESHIP_LOG";

/// Writes to stderr so game summaries on stdout stay machine-readable.
struct ArenaLogger {
    started: OnceLock<Instant>,
}

impl log::Log for ArenaLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let elapsed = self.started.get_or_init(Instant::now).elapsed();
        let mut err = std::io::stderr().lock();
        let _ = writeln!(
            err,
            "{:>8.3}s {:<5} [{}] {}",
            elapsed.as_secs_f64(),
            record.level(),
            record.target(),
            record.args()
        );
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

static LOGGER: ArenaLogger = ArenaLogger {
    started: OnceLock::new(),
};

/// Install the logger with the level from `BATTLESHIP_LOG`, defaulting to
/// `info`. Later calls are no-ops.
pub fn init_logging() {
    let level = env::var(LEVEL_VAR)
        .ok()
        .and_then(|lvl| lvl.parse().ok())
        .unwrap_or(LevelFilter::Info);
    if log::set_logger(&LOGGER).is_ok() {
        LOGGER.started.get_or_init(Instant::now);
        log::set_max_level(level);
    }
}
