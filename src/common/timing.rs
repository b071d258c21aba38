// src/common/timing.rs

// Nominal values. The tick source is expected to fire once per TICK_PERIOD_MS;
// everything else in the crate counts in ticks.

// === Timing Base ===

/// Period of the tick interrupt in milliseconds. One tick equals one millisecond.
pub const TICK_PERIOD_MS: u32 = 1;
/// Ticks in one second.
pub const TICKS_PER_SECOND: u32 = 1000 / TICK_PERIOD_MS;

// === Monitor Cadence ===

/// Default length of one sensor-loop cycle (one telemetry line per second).
pub const DEFAULT_CYCLE_PERIOD_MS: u32 = 1000;
/// Default apnea window: no qualifying breath for longer than this raises the alarm.
pub const DEFAULT_APNEA_WINDOW_SECS: u32 = 20;

// === Bus Hardening ===

/// Default number of polls of a bus-ready flag before giving up with `BusTimeout`.
///
/// At a few MHz core clock this is in the order of tens of milliseconds, far beyond
/// one byte at 100 kHz on the register bus or 1.5 MHz on the ADC bus.
pub const DEFAULT_BUS_POLL_LIMIT: u32 = 10_000;
/// Default number of consecutive failed acquisitions before a device is declared absent.
pub const DEFAULT_DEVICE_FAILURE_THRESHOLD: u8 = 3;
/// Polls allowed per telemetry byte on the serial sink.
pub const SINK_POLL_LIMIT: u32 = 10_000;
