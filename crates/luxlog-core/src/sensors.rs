//! Sensor collaborator interfaces
//!
//! The cycle pulls one reading per sensor per cycle through these traits;
//! bus initialization and channel configuration are the implementer's
//! concern. Every read signals failure explicitly so a dead sensor is
//! distinguishable from a valid-but-extreme reading.

use thiserror_no_std::Error;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorError {
    /// A sensor read did not produce a usable value.
    #[error("{sensor}: {operation} failed: {details}")]
    ReadFailed {
        sensor: &'static str,
        operation: &'static str,
        details: &'static str,
    },
}

/// Split fixed-point reading: an integer part plus a signed fractional
/// part in microunits, the native resolution the sensor channels report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SensorValue {
    pub integer: i32,
    pub micro: i32,
}

impl SensorValue {
    pub const fn new(integer: i32, micro: i32) -> Self {
        Self { integer, micro }
    }

    /// Splits a float into integer and microunit parts, both truncated
    /// toward zero so the parts carry the same sign.
    pub fn from_f32(value: f32) -> Self {
        let integer = value as i32;
        let micro = ((value - integer as f32) * 1_000_000.0) as i32;
        Self { integer, micro }
    }

    /// Collapses the split reading back into a float.
    pub fn to_f32(self) -> f32 {
        self.integer as f32 + self.micro as f32 * 0.000_001
    }
}

/// Ambient light collaborator. Returns intensity in the sensor's native
/// integer lux unit.
pub trait LightSensor {
    async fn read_light(&mut self) -> Result<i32, SensorError>;
}

/// Temperature and relative-humidity collaborator. Each call performs a
/// fresh measurement of its channel; readings are in degrees Celsius and
/// percent respectively, in split fixed-point form.
pub trait ClimateSensor {
    async fn read_temperature(&mut self) -> Result<SensorValue, SensorError>;
    async fn read_humidity(&mut self) -> Result<SensorValue, SensorError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_and_recombines_value() {
        let v = SensorValue::from_f32(23.5);
        assert_eq!(v.integer, 23);
        assert_eq!(v.micro, 500_000);
        assert!((v.to_f32() - 23.5).abs() < 1e-5);
    }

    #[test]
    fn negative_values_keep_sign_in_both_parts() {
        let v = SensorValue::from_f32(-2.25);
        assert_eq!(v.integer, -2);
        assert_eq!(v.micro, -250_000);
        assert!((v.to_f32() + 2.25).abs() < 1e-5);
    }
}
