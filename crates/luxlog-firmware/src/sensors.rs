//! BH1750 and SHT4x sensor adapters
//!
//! Thin glue between the driver crates and the core collaborator traits.
//! Each read performs a fresh one-shot measurement of its channel.

use bh1750_embedded::{Address, Resolution, r#async::Bh1750Async};
use embedded_hal_async::i2c::I2c;
use log::error;
use sht4x::Sht4xAsync;

use luxlog_core::sensors::{ClimateSensor, LightSensor, SensorError, SensorValue};

/// Ambient light over the BH1750.
pub struct Bh1750Light<I> {
    sensor: Bh1750Async<I, embassy_time::Delay>,
}

impl<I: I2c> Bh1750Light<I> {
    pub fn new(i2c: I) -> Self {
        Self {
            sensor: Bh1750Async::<I, embassy_time::Delay>::new(
                i2c,
                embassy_time::Delay,
                Address::Low,
            ),
        }
    }
}

impl<I: I2c> LightSensor for Bh1750Light<I> {
    async fn read_light(&mut self) -> Result<i32, SensorError> {
        self.sensor
            .one_time_measurement(Resolution::High)
            .await
            // The log line carries whole lux, the sensor's native unit.
            .map(|lux| lux as i32)
            .map_err(|e| {
                error!("BH1750 one_time_measurement failed: {e:?}");
                SensorError::ReadFailed {
                    sensor: "BH1750",
                    operation: "one_time_measurement",
                    details: "failed to read lux during a single one-time measurement",
                }
            })
    }
}

/// Temperature and humidity over the SHT4x.
pub struct Sht4xClimate<I> {
    sensor: Sht4xAsync<I, embassy_time::Delay>,
}

impl<I: I2c> Sht4xClimate<I> {
    pub fn new(i2c: I) -> Self {
        Self {
            sensor: Sht4xAsync::<I, embassy_time::Delay>::new(i2c),
        }
    }

    async fn measure(&mut self, operation: &'static str) -> Result<sht4x::Measurement, SensorError> {
        self.sensor
            .measure(sht4x::Precision::High, &mut embassy_time::Delay)
            .await
            .map_err(|e| {
                error!("SHT4x measurement failed: {e:?}");
                SensorError::ReadFailed {
                    sensor: "SHT4x",
                    operation,
                    details: "I2C communication error or sensor not responding",
                }
            })
    }
}

impl<I: I2c> ClimateSensor for Sht4xClimate<I> {
    async fn read_temperature(&mut self) -> Result<SensorValue, SensorError> {
        let measurement = self.measure("measure temperature").await?;
        Ok(SensorValue::from_f32(
            measurement.temperature_celsius().to_num::<f32>(),
        ))
    }

    async fn read_humidity(&mut self) -> Result<SensorValue, SensorError> {
        let measurement = self.measure("measure humidity").await?;
        Ok(SensorValue::from_f32(
            measurement.humidity_percent().to_num::<f32>(),
        ))
    }
}
