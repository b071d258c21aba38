// src/common/mod.rs

// --- Declare all public modules within common ---
pub mod config;
pub mod error;
pub mod hal_traits;
pub mod poll;
pub mod timing;
pub mod types;

#[cfg(feature = "impl-hal")]
pub mod hal_adapters;

// --- Re-export key types/traits/functions for easier access ---

// From config.rs
pub use config::{MonitorConfig, OximeterConfig};

// From error.rs
pub use error::{Device, MonitorError};

// From hal_traits.rs
pub use hal_traits::{
    AdcTransport, AlarmIndicator, BusEvent, Direction, OximeterBus, TelemetrySink,
    TickInterruptSource,
};

// From poll.rs
pub use poll::poll_bounded;

// From types.rs
pub use types::{AdcChannel, OximeterSample, RawAdcSample, Tick, VitalSigns};

// Native HAL adapters (from hal_adapters.rs)
#[cfg(feature = "impl-hal")]
pub use hal_adapters::{PinAlarmIndicator, SpiAdcTransport, SpiTransportError};
