#![no_std]

use core::fmt;

use log::{LevelFilter, Log, Metadata, Record, SetLoggerError};

/// Kernel logger: forwards every enabled record to a fixed set of sinks.
///
/// Sinks are plain functions so the logger can live in a `static` before
/// the heap exists.
pub struct Logger<const N: usize> {
    pub sinks: [fn(&Record); N],
    pub max_level: LevelFilter,
}

impl<const N: usize> Logger<N> {
    pub const fn new(sinks: [fn(&Record); N], max_level: LevelFilter) -> Self {
        Self { sinks, max_level }
    }

    /// Registers `self` as the global `log` backend.
    pub fn install(&'static self) -> Result<(), SetLoggerError> {
        log::set_logger(self)?;
        log::set_max_level(self.max_level);
        Ok(())
    }
}

impl<const N: usize> Log for Logger<N> {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.max_level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            for sink in &self.sinks {
                (sink)(record)
            }
        }
    }

    fn flush(&self) {}
}

/// Formats a record the way the console sinks print it.
pub fn write_record<W: fmt::Write + ?Sized>(out: &mut W, record: &Record) -> fmt::Result {
    writeln!(out, "[{}][{}] {}", record.target(), record.level(), record.args())
}
