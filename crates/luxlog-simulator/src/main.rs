//! Desktop simulator for the luxlog pipeline
//!
//! Runs the real acquisition cycle against simulated collaborators:
//! records land in `./sim-sd/data/data.txt` with the exact line format
//! the device writes. The cycle itself is driven synchronously here
//! (`run_once` plus a host sleep), so no embedded executor is needed.
//!
//! ```text
//! cargo run -p luxlog-simulator -- [cycles]
//! ```
//!
//! With no argument it runs until interrupted. `RUST_LOG=debug` shows the
//! per-step diagnostics.

mod devices;
mod storage;

use std::time::Duration;

use embassy_futures::block_on;
use log::info;

use luxlog_core::config::LoggerConfig;
use luxlog_core::cycle::AcquisitionCycle;

use crate::devices::{SimulatedClimate, SimulatedLight, SimulatedRtc};
use crate::storage::FsStorage;

const SIM_STORAGE_ROOT: &str = "./sim-sd";

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cycles: Option<u64> = std::env::args().nth(1).and_then(|arg| arg.parse().ok());

    let config = LoggerConfig {
        cycle_interval_ms: 1000,
        ..LoggerConfig::default()
    };

    let mut cycle = AcquisitionCycle::new(
        FsStorage::new(SIM_STORAGE_ROOT, config.mount_point),
        SimulatedLight::new(),
        SimulatedClimate::new(),
        // The simulated clock advances by one interval per read, matching
        // real time closely enough for the log to look continuous.
        SimulatedRtc::new((config.cycle_interval_ms / 1000).max(1) as u32),
        config,
    );

    info!(
        "simulating {} cycles into {SIM_STORAGE_ROOT}",
        cycles.map_or("unlimited".to_string(), |n| n.to_string())
    );

    let mut completed = 0u64;
    loop {
        block_on(cycle.run_once());
        completed += 1;
        if cycles.is_some_and(|n| completed >= n) {
            break;
        }
        std::thread::sleep(Duration::from_millis(config.cycle_interval_ms));
    }

    info!("simulation finished after {completed} cycles");
}
