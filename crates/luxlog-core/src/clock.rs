//! Real-time-clock register decoding and timestamp formatting
//!
//! The battery-backed RTC exposes its calendar as seven packed-BCD
//! registers (seconds, minutes, hours, weekday, day-of-month, month, year,
//! in that order). [`CalendarTime::from_registers`] normalizes those raw
//! bytes; [`CalendarTime::format_timestamp`] renders the fixed
//! `YYYY-MM-DD HH:MM:SS DOW` string stamped onto every log record.

use core::fmt::Write;

use thiserror_no_std::Error;

/// Number of raw calendar registers read from the RTC per cycle.
pub const RTC_REGISTER_COUNT: usize = 7;

/// Capacity of the formatted timestamp buffer, terminator included.
pub const TIMESTAMP_CAPACITY: usize = 64;

/// Owned, bounded timestamp string. One is produced per cycle; formatting
/// never reuses a shared buffer, so callers on different tasks cannot
/// clobber each other.
pub type Timestamp = heapless::String<TIMESTAMP_CAPACITY>;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockError {
    /// The bus transaction against the RTC failed.
    #[error("RTC register read failed: {details}")]
    ReadFailed { details: &'static str },
}

/// Collaborator interface to the hardware clock.
///
/// Implementations return the seven raw calendar registers exactly as the
/// device presents them; all interpretation happens in
/// [`CalendarTime::from_registers`].
pub trait RtcClock {
    async fn read_registers(&mut self) -> Result<[u8; RTC_REGISTER_COUNT], ClockError>;
}

/// Normalized calendar time decoded from the RTC registers.
///
/// Lifetime is one acquisition cycle: decoded, formatted into a
/// [`Timestamp`], discarded. Fields decoded from malformed registers may be
/// out of range; the decoder never faults and the formatter renders
/// whatever it is given.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CalendarTime {
    /// Seconds [0, 59]
    pub seconds: u8,
    /// Minutes [0, 59]
    pub minutes: u8,
    /// Hours [0, 23]
    pub hours: u8,
    /// Day of week [1, 7], device convention, not remapped
    pub weekday: u8,
    /// Day of month [1, 31]
    pub day: u8,
    /// Month [1, 12]
    pub month: u8,
    /// Two-digit year [0, 99], rendered as 20xx
    pub year: u8,
}

/// Decodes one packed-BCD byte: high nibble (masked) is the decade digit,
/// low nibble the units digit.
const fn bcd(byte: u8, decade_mask: u8) -> u8 {
    ((byte & decade_mask) >> 4) * 10 + (byte & 0x0F)
}

impl CalendarTime {
    /// Decodes the seven raw calendar registers.
    ///
    /// The hours register is the only register with mode bits: bit 6 set
    /// selects 12-hour mode, in which bit 5 is the PM flag and bits 4:0
    /// hold 1-12 in BCD. Noon maps to 12 and midnight (12 AM) to 0; every
    /// other 12-hour value is returned exactly as decoded, WITHOUT adding
    /// 12 for PM. That omission looks like a latent defect, but it
    /// determines the literal timestamps written to storage, so it is kept
    /// as-is until validated against real hardware; see DESIGN.md before
    /// changing it. In 24-hour mode the hour is BCD(bits 4:0) plus 20 when
    /// bit 5 is set.
    pub fn from_registers(raw: &[u8; RTC_REGISTER_COUNT]) -> Self {
        let hours = decode_hours(raw[2]);

        Self {
            seconds: bcd(raw[0], 0x70),
            minutes: bcd(raw[1], 0x70),
            hours,
            // 1-7 convention is device-specific; passed through unmodified.
            weekday: raw[3],
            day: bcd(raw[4], 0x30),
            // Bit 7 is the century flag, ignored.
            month: bcd(raw[5], 0x10),
            year: bcd(raw[6], 0xF0),
        }
    }

    /// Formats `YYYY-MM-DD HH:MM:SS DOW` into an owned bounded buffer.
    ///
    /// Pure and deterministic. If the formatted text would exceed the
    /// buffer it is silently truncated, never written past the end; with
    /// in-range fields the output is 23 bytes and truncation cannot occur.
    pub fn format_timestamp(&self) -> Timestamp {
        let mut buf = Timestamp::new();
        let _ = write!(
            buf,
            "{:04}-{:02}-{:02} {:02}:{:02}:{:02} {}",
            2000 + self.year as u16,
            self.month,
            self.day,
            self.hours,
            self.minutes,
            self.seconds,
            weekday_label(self.weekday),
        );
        buf
    }
}

fn decode_hours(byte: u8) -> u8 {
    let value = bcd(byte, 0x10);
    let twelve_hour_mode = byte & 0x40 != 0;
    let flag = (byte & 0x20) >> 5;

    if twelve_hour_mode {
        let pm = flag == 1;
        match (value, pm) {
            (12, true) => 12, // noon
            (12, false) => 0, // midnight
            _ => value,       // no +12 applied; see from_registers docs
        }
    } else {
        value + flag * 20
    }
}

fn weekday_label(weekday: u8) -> &'static str {
    match weekday {
        1 => "Mon",
        2 => "Tue",
        3 => "Wed",
        4 => "Thu",
        5 => "Fri",
        6 => "Sat",
        7 => "Sun",
        _ => "???",
    }
}
