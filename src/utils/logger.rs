/*
 * Driver Logging
 *
 * log::Log implementation that prefixes every line with the driver name and
 * hands it to a host-provided sink (serial console, kernel ring buffer, ...).
 *
 * Output format:
 * ```
 * [INFO] gpiogate: loaded with major 240, minor 0
 * ```
 */

use core::fmt;

use log::{LevelFilter, Log, Metadata, Record, SetLoggerError};

/// Destination for formatted log lines
pub trait LogSink: Send + Sync {
    /// Write one complete line (without trailing newline)
    fn write_line(&self, line: fmt::Arguments<'_>);
}

/// Prefixing logger over a LogSink
pub struct GateLogger<S> {
    sink: S,
    prefix: &'static str,
    level: LevelFilter,
}

impl<S: LogSink> GateLogger<S> {
    pub const fn new(sink: S, prefix: &'static str, level: LevelFilter) -> Self {
        Self { sink, prefix, level }
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }
}

impl<S: LogSink> Log for GateLogger<S> {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            self.sink
                .write_line(format_args!("[{}] {}: {}", record.level(), self.prefix, record.args()));
        }
    }

    fn flush(&self) {}
}

/// Install `logger` as the global logger
///
/// Fails if a logger was already installed.
pub fn init(logger: &'static dyn Log, level: LevelFilter) -> Result<(), SetLoggerError> {
    log::set_logger(logger).map(|()| log::set_max_level(level))
}
