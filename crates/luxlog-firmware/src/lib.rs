//! ESP32-S3 hardware adapters for luxlog
//!
//! This crate implements the collaborator traits of `luxlog-core` against
//! real hardware: the DS3231 clock and the BH1750/SHT4x sensors on a
//! shared async I2C bus, and an SPI SD card behind `embedded-sdmmc` for
//! block storage.

#![no_std]

extern crate alloc;

pub mod i2c_bus;
pub mod rtc;
pub mod sd;
pub mod sensors;
