//! The periodic acquisition cycle
//!
//! One cycle is mount -> bootstrap (first cycle only) -> sample -> write ->
//! unmount -> sleep. Acquisition and persistence are decoupled failure
//! domains: when the mount fails the cycle still reads the sensors and
//! emits the diagnostic line, it just has nowhere to persist the record.
//! Nothing here is fatal; every failure is contained to the current cycle
//! and the next attempt is the next scheduled cycle.
//!
//! Control flow is a single sequential task. All steps block (or await)
//! in a fixed order and cycles never overlap, so the session flag and all
//! buffers have exactly one mutator.

use core::fmt::Display;

use embassy_time::{Duration, Timer, with_timeout};
use log::{debug, error, info};

use crate::clock::{CalendarTime, RtcClock};
use crate::config::LoggerConfig;
use crate::record::SampleRecord;
use crate::sensors::{ClimateSensor, LightSensor};
use crate::storage::{self, BlockStorage};

/// Bound on every sensor and clock read. A wedged bus must not hang the
/// logger; a read that blows this budget is treated like any other failed
/// read and costs at most the current cycle.
const READ_TIMEOUT: Duration = Duration::from_secs(2);

/// Awaits one collaborator read with the bounded-wait policy applied,
/// logging either failure mode.
async fn read_step<T, E: Display>(
    label: &'static str,
    read: impl Future<Output = Result<T, E>>,
) -> Option<T> {
    match with_timeout(READ_TIMEOUT, read).await {
        Ok(Ok(value)) => Some(value),
        Ok(Err(e)) => {
            error!("{label} read failed: {e}");
            None
        }
        Err(_) => {
            error!("{label} read timed out");
            None
        }
    }
}

/// Top-level acquisition loop. Owns the collaborators, the configuration,
/// and the bootstrap session flag (explicit state, not a process-wide
/// static).
pub struct AcquisitionCycle<'a, S, L, C, R>
where
    S: BlockStorage,
    L: LightSensor,
    C: ClimateSensor,
    R: RtcClock,
{
    storage: S,
    light: L,
    climate: C,
    clock: R,
    config: LoggerConfig<'a>,
    /// Set after the first bootstrap attempt of the process lifetime,
    /// never reset. Keeps the bootstrap from re-touching the filesystem
    /// every iteration.
    bootstrapped: bool,
}

impl<'a, S, L, C, R> AcquisitionCycle<'a, S, L, C, R>
where
    S: BlockStorage,
    L: LightSensor,
    C: ClimateSensor,
    R: RtcClock,
{
    pub fn new(storage: S, light: L, climate: C, clock: R, config: LoggerConfig<'a>) -> Self {
        Self {
            storage,
            light,
            climate,
            clock,
            config,
            bootstrapped: false,
        }
    }

    /// Runs the acquisition loop forever. The only way out is device
    /// reset or power loss.
    pub async fn run(mut self) -> ! {
        loop {
            self.run_once().await;
            Timer::after_millis(self.config.cycle_interval_ms).await;
        }
    }

    /// Executes exactly one cycle, without the trailing sleep.
    pub async fn run_once(&mut self) {
        let mount_point = self.config.mount_point;

        let mounted = match self.storage.mount(mount_point) {
            Ok(()) => {
                info!("disk mounted");
                true
            }
            Err(e) => {
                error!("error mounting disk: {e}");
                false
            }
        };

        if mounted && !self.bootstrapped {
            if let Err(e) = storage::bootstrap(&mut self.storage, mount_point) {
                error!("storage bootstrap failed: {e}");
            }
            // One attempt per process lifetime, successful or not.
            self.bootstrapped = true;
        }

        if let Some(record) = self.sample().await {
            info!(
                "datetime: {}, lux: {}, temp_f: {:.6}, rh: {:.6}%",
                record.timestamp, record.lux, record.temperature_f, record.humidity_pct
            );

            if mounted {
                match storage::append_record(&mut self.storage, mount_point, &record) {
                    Ok(()) => info!("record written to log file"),
                    // Logged, not retried, not fatal; this record is lost.
                    Err(e) => error!("record write failed: {e}"),
                }
            }
        }

        // Storage is not left mounted across the sleep interval; power
        // loss between cycles must not catch a mounted filesystem.
        if let Err(e) = self.storage.unmount() {
            debug!("unmount failed: {e}");
        }
    }

    /// Pulls one reading from each collaborator and assembles the record.
    ///
    /// A failed or timed-out read is logged and yields `None`: with no
    /// trustworthy value there is nothing worth persisting this cycle.
    async fn sample(&mut self) -> Option<SampleRecord> {
        let lux = read_step("light", self.light.read_light()).await?;
        let temperature = read_step("temperature", self.climate.read_temperature()).await?;
        let humidity = read_step("humidity", self.climate.read_humidity()).await?;
        let raw = read_step("clock", self.clock.read_registers()).await?;

        let time = CalendarTime::from_registers(&raw);
        Some(SampleRecord {
            lux,
            temperature_f: temperature.to_f32() * 9.0 / 5.0 + 32.0,
            humidity_pct: humidity.to_f32(),
            timestamp: time.format_timestamp(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::{ClockError, RTC_REGISTER_COUNT};
    use crate::sensors::{SensorError, SensorValue};
    use crate::storage::StorageError;
    use alloc::string::String;
    use alloc::vec::Vec;
    use embassy_futures::block_on;

    /// Storage collaborator scripted per cycle: `append_failures[n]` makes
    /// `append` fail on the n-th mounted cycle.
    #[derive(Default)]
    struct ScriptedStorage {
        mount_calls: usize,
        unmount_calls: usize,
        create_dir_calls: usize,
        create_file_calls: usize,
        mount_failures: Vec<usize>,
        append_failures: Vec<usize>,
        written: Vec<String>,
    }

    impl BlockStorage for ScriptedStorage {
        fn mount(&mut self, _mount_point: &str) -> Result<(), StorageError> {
            self.mount_calls += 1;
            if self.mount_failures.contains(&self.mount_calls) {
                return Err(StorageError::Io { details: "no card" });
            }
            Ok(())
        }

        fn unmount(&mut self) -> Result<(), StorageError> {
            self.unmount_calls += 1;
            Ok(())
        }

        fn create_dir(&mut self, _dir_path: &str) -> Result<(), StorageError> {
            self.create_dir_calls += 1;
            Ok(())
        }

        fn create_file(&mut self, _file_path: &str) -> Result<(), StorageError> {
            self.create_file_calls += 1;
            Ok(())
        }

        fn append(&mut self, _file_path: &str, data: &[u8]) -> Result<(), StorageError> {
            if self.append_failures.contains(&self.mount_calls) {
                return Err(StorageError::OpenFailed);
            }
            self.written
                .push(String::from_utf8(data.to_vec()).unwrap());
            Ok(())
        }
    }

    struct FixedLight(i32);

    impl LightSensor for FixedLight {
        async fn read_light(&mut self) -> Result<i32, SensorError> {
            Ok(self.0)
        }
    }

    struct FailingLight;

    impl LightSensor for FailingLight {
        async fn read_light(&mut self) -> Result<i32, SensorError> {
            Err(SensorError::ReadFailed {
                sensor: "light",
                operation: "read",
                details: "bus",
            })
        }
    }

    struct FixedClimate {
        temperature_c: SensorValue,
        humidity_pct: SensorValue,
    }

    impl ClimateSensor for FixedClimate {
        async fn read_temperature(&mut self) -> Result<SensorValue, SensorError> {
            Ok(self.temperature_c)
        }

        async fn read_humidity(&mut self) -> Result<SensorValue, SensorError> {
            Ok(self.humidity_pct)
        }
    }

    /// 2024-01-01 12:00:00, weekday 1, in raw register form.
    struct FixedClock;

    impl RtcClock for FixedClock {
        async fn read_registers(&mut self) -> Result<[u8; RTC_REGISTER_COUNT], ClockError> {
            Ok([0x00, 0x00, 0x12, 0x01, 0x01, 0x01, 0x24])
        }
    }

    fn cycle_with_storage(
        storage: ScriptedStorage,
    ) -> AcquisitionCycle<'static, ScriptedStorage, FixedLight, FixedClimate, FixedClock> {
        AcquisitionCycle::new(
            storage,
            FixedLight(123),
            FixedClimate {
                // 22.5 C -> 72.5 F
                temperature_c: SensorValue::new(22, 500_000),
                humidity_pct: SensorValue::new(45, 250_000),
            },
            FixedClock,
            LoggerConfig::default(),
        )
    }

    #[test]
    fn one_cycle_writes_one_exact_line() {
        let mut cycle = cycle_with_storage(ScriptedStorage::default());
        block_on(cycle.run_once());

        assert_eq!(
            cycle.storage.written,
            ["[2024-01-01 12:00:00 Mon], 123 lux, 72.500000 F, 45.250000%\n"]
        );
        assert_eq!(cycle.storage.unmount_calls, 1);
    }

    #[test]
    fn bootstrap_runs_exactly_once_across_cycles() {
        let mut cycle = cycle_with_storage(ScriptedStorage::default());
        for _ in 0..3 {
            block_on(cycle.run_once());
        }

        assert_eq!(cycle.storage.create_dir_calls, 1);
        assert_eq!(cycle.storage.create_file_calls, 1);
        assert_eq!(cycle.storage.written.len(), 3);
    }

    #[test]
    fn append_failure_loses_one_record_and_the_loop_continues() {
        // Cycle 2's open-for-append fails; cycles 1 and 3 each land one
        // line and the process keeps going.
        let mut cycle = cycle_with_storage(ScriptedStorage {
            append_failures: alloc::vec![2],
            ..ScriptedStorage::default()
        });
        for _ in 0..3 {
            block_on(cycle.run_once());
        }

        assert_eq!(cycle.storage.written.len(), 2);
        assert_eq!(cycle.storage.unmount_calls, 3);
    }

    #[test]
    fn mount_failure_defers_bootstrap_and_skips_the_write() {
        let mut cycle = cycle_with_storage(ScriptedStorage {
            mount_failures: alloc::vec![1],
            ..ScriptedStorage::default()
        });
        block_on(cycle.run_once());

        assert_eq!(cycle.storage.create_dir_calls, 0);
        assert!(cycle.storage.written.is_empty());
        // Unmount is unconditional, even after a failed mount.
        assert_eq!(cycle.storage.unmount_calls, 1);

        // The next cycle mounts and bootstraps normally.
        block_on(cycle.run_once());
        assert_eq!(cycle.storage.create_dir_calls, 1);
        assert_eq!(cycle.storage.written.len(), 1);
    }

    #[test]
    fn sensor_failure_skips_persistence_for_the_cycle() {
        let mut cycle = AcquisitionCycle::new(
            ScriptedStorage::default(),
            FailingLight,
            FixedClimate {
                temperature_c: SensorValue::new(22, 500_000),
                humidity_pct: SensorValue::new(45, 250_000),
            },
            FixedClock,
            LoggerConfig::default(),
        );
        block_on(cycle.run_once());

        assert!(cycle.storage.written.is_empty());
        assert_eq!(cycle.storage.unmount_calls, 1);
    }
}
