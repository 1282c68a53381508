//! Minimal stdout backend for the `log` facade.

use log::{Level, Log, Metadata, Record};

struct ConsoleLogger {
    level: Level,
}

impl Log for ConsoleLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            println!("    [{:<5}] {}", record.level(), record.args());
        }
    }

    fn flush(&self) {}
}

/// Install the console logger: debug output with `--verbose`, warnings otherwise.
pub fn init(verbose: bool) {
    let level = if verbose { Level::Debug } else { Level::Warn };
    let logger = Box::new(ConsoleLogger { level });
    if log::set_boxed_logger(logger).is_ok() {
        log::set_max_level(level.to_level_filter());
    }
}
