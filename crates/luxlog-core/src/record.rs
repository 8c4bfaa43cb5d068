//! Per-cycle sample record and its on-disk line format
//!
//! One [`SampleRecord`] is assembled per acquisition cycle and handed to
//! the record writer, which appends a single newline-terminated text line
//! to the log file:
//!
//! ```text
//! [2024-01-01 12:00:00 Mon], 123 lux, 72.500000 F, 45.250000%
//! ```

use core::fmt::Write;

use crate::clock::Timestamp;

/// Capacity of the formatted record line buffer, terminator included.
pub const LINE_CAPACITY: usize = 256;

/// Bounded buffer holding one formatted record line.
pub type RecordLine = heapless::String<LINE_CAPACITY>;

/// One environmental sample, immutable once built.
///
/// Constructed fresh each cycle and discarded after being written. The
/// timestamp is already formatted; the numeric fields are in their logged
/// units (sensor-native lux, Fahrenheit, percent relative humidity).
#[derive(Debug, Clone, PartialEq)]
pub struct SampleRecord {
    pub lux: i32,
    pub temperature_f: f32,
    pub humidity_pct: f32,
    pub timestamp: Timestamp,
}

impl SampleRecord {
    /// Formats the record as one log line, newline included.
    ///
    /// Fixed-size buffer discipline: output that would overflow
    /// [`LINE_CAPACITY`] is truncated, never written past the buffer end.
    /// Floats are rendered with six fractional digits to match the
    /// established file format.
    pub fn format_line(&self) -> RecordLine {
        let mut line = RecordLine::new();
        let _ = write!(
            line,
            "[{}], {} lux, {:.6} F, {:.6}%\n",
            self.timestamp, self.lux, self.temperature_f, self.humidity_pct
        );
        line
    }
}
