//! Hardware-independent core library for luxlog
//!
//! This crate contains the platform-agnostic acquisition-and-logging
//! pipeline of the luxlog environmental logger: real-time-clock register
//! decoding, bounded path construction, the one-time storage bootstrap,
//! record formatting and appending, and the periodic acquisition cycle
//! that ties them together.
//!
//! Everything that touches real hardware lives behind the collaborator
//! traits defined here ([`sensors`], [`clock::RtcClock`],
//! [`storage::BlockStorage`]) and is implemented by the firmware and
//! simulator crates. It is `#![no_std]` so it compiles on both embedded
//! targets (ESP32-S3) and desktop hosts (for the simulator and tests).

#![no_std]

extern crate alloc;

pub mod clock;
pub mod config;
pub mod cycle;
pub mod path;
pub mod record;
pub mod sensors;
pub mod storage;
