// src/lib.rs

#![no_std] // Specify no_std at the crate root

pub mod adc;
pub mod apnea;
pub mod clock;
pub mod common;
pub mod monitor;
pub mod oximeter;

// Re-export key types for convenience
pub use adc::Mcp3008;
pub use apnea::{ApneaDetector, BreathPhase};
pub use clock::{MonotonicClock, TickCounter, SYSTEM_TICKS};
pub use common::{MonitorConfig, MonitorError, Tick};
pub use monitor::{TelemetryRecord, VitalMonitor};
pub use oximeter::{Max30102, PlaceholderReduction, SampleReduction};
