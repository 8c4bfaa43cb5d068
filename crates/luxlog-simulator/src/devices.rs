//! Simulated clock and sensor collaborators
//!
//! The clock keeps a real calendar and re-encodes it into the same seven
//! packed-BCD registers the hardware RTC presents, so the core's decoder
//! runs against register bytes here exactly as it does on the device. The
//! sensors produce deterministic ramps, good enough to watch records
//! accumulate in the log file.

use luxlog_core::clock::{ClockError, RTC_REGISTER_COUNT, RtcClock};
use luxlog_core::sensors::{ClimateSensor, LightSensor, SensorError, SensorValue};

const DAYS_PER_MONTH: [u8; 12] = [31, 28, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];

fn to_bcd(value: u8) -> u8 {
    ((value / 10) << 4) | (value % 10)
}

/// Calendar clock advanced by a fixed step on every register read.
pub struct SimulatedRtc {
    seconds: u8,
    minutes: u8,
    hours: u8,
    weekday: u8, // 1 = Monday .. 7 = Sunday
    day: u8,
    month: u8,
    year: u8,
    step_seconds: u32,
}

impl SimulatedRtc {
    /// Starts at 2024-01-01 12:00:00, a Monday.
    pub fn new(step_seconds: u32) -> Self {
        Self {
            seconds: 0,
            minutes: 0,
            hours: 12,
            weekday: 1,
            day: 1,
            month: 1,
            year: 24,
            step_seconds,
        }
    }

    fn advance(&mut self) {
        let mut total = u32::from(self.seconds) + self.step_seconds;
        self.seconds = (total % 60) as u8;
        total = u32::from(self.minutes) + total / 60;
        self.minutes = (total % 60) as u8;
        total = u32::from(self.hours) + total / 60;
        self.hours = (total % 24) as u8;

        for _ in 0..total / 24 {
            self.weekday = self.weekday % 7 + 1;
            self.day += 1;
            // Leap years are more precision than a simulated bench needs.
            if self.day > DAYS_PER_MONTH[usize::from(self.month - 1)] {
                self.day = 1;
                self.month += 1;
                if self.month > 12 {
                    self.month = 1;
                    self.year = (self.year + 1) % 100;
                }
            }
        }
    }
}

impl RtcClock for SimulatedRtc {
    async fn read_registers(&mut self) -> Result<[u8; RTC_REGISTER_COUNT], ClockError> {
        let raw = [
            to_bcd(self.seconds),
            to_bcd(self.minutes),
            to_bcd(self.hours), // 24-hour mode: bit 6 clear
            self.weekday,
            to_bcd(self.day),
            to_bcd(self.month),
            to_bcd(self.year),
        ];
        self.advance();
        Ok(raw)
    }
}

/// Triangle-wave light level sweeping 0..=1200 lux.
pub struct SimulatedLight {
    step: i32,
}

impl SimulatedLight {
    pub fn new() -> Self {
        Self { step: 0 }
    }
}

impl LightSensor for SimulatedLight {
    async fn read_light(&mut self) -> Result<i32, SensorError> {
        let phase = self.step % 240;
        self.step += 1;
        let lux = if phase < 120 { phase * 10 } else { (240 - phase) * 10 };
        Ok(lux)
    }
}

/// Slowly drifting temperature and humidity around room conditions.
pub struct SimulatedClimate {
    step: i32,
}

impl SimulatedClimate {
    pub fn new() -> Self {
        Self { step: 0 }
    }
}

impl ClimateSensor for SimulatedClimate {
    async fn read_temperature(&mut self) -> Result<SensorValue, SensorError> {
        self.step += 1;
        let drift = (self.step % 40 - 20) as f32 * 0.05;
        Ok(SensorValue::from_f32(22.5 + drift))
    }

    async fn read_humidity(&mut self) -> Result<SensorValue, SensorError> {
        let drift = (self.step % 60 - 30) as f32 * 0.1;
        Ok(SensorValue::from_f32(45.0 + drift))
    }
}
