//! DS3231 real-time clock adapter
//!
//! Reads the seven calendar registers (seconds through year, 0x00..0x06)
//! in one burst write-read at device address 0x68 and hands the raw bytes
//! to the core decoder untouched.

use embedded_hal_async::i2c::I2c;
use log::error;

use luxlog_core::clock::{ClockError, RTC_REGISTER_COUNT, RtcClock};

const DS3231_ADDRESS: u8 = 0x68;
const SECONDS_REGISTER: u8 = 0x00;

pub struct Ds3231<I> {
    i2c: I,
}

impl<I: I2c> Ds3231<I> {
    pub fn new(i2c: I) -> Self {
        Self { i2c }
    }
}

impl<I: I2c> RtcClock for Ds3231<I> {
    async fn read_registers(&mut self) -> Result<[u8; RTC_REGISTER_COUNT], ClockError> {
        let mut raw = [0u8; RTC_REGISTER_COUNT];
        self.i2c
            .write_read(DS3231_ADDRESS, &[SECONDS_REGISTER], &mut raw)
            .await
            .map_err(|e| {
                error!("DS3231 register burst read failed: {e:?}");
                ClockError::ReadFailed {
                    details: "I2C communication error or clock not responding",
                }
            })?;
        Ok(raw)
    }
}
