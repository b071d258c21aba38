// src/common/error.rs

/// Peripheral an error or health record refers to.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Device {
    /// Successive-approximation ADC carrying the pressure and temperature channels.
    Adc,
    /// Pulse oximeter on the register-addressed bus.
    Oximeter,
    /// Serial output carrying the telemetry lines.
    Sink,
    /// Alarm indicator output.
    Indicator,
}

#[derive(Debug, thiserror::Error)]
pub enum MonitorError<E = ()>
where
    E: core::fmt::Debug, // Need Debug for the generic Io error
{
    /// Underlying error reported by the bus transport.
    #[error("I/O error: {0:?}")]
    Io(E),

    /// A bus-ready condition did not occur within the configured number of polls.
    #[error("Bus ready condition not reached within poll limit")]
    BusTimeout,

    /// The device failed enough consecutive acquisitions to be considered absent.
    #[error("Device not responding: {device:?}")]
    DeviceNotResponding { device: Device },

    /// Requested ADC channel index is not one of the wired channels.
    #[error("Invalid ADC channel: {0}")]
    InvalidChannel(u8),

    /// Telemetry line did not fit the output buffer.
    #[error("Telemetry formatting failed")]
    Format,
}

impl<E: core::fmt::Debug> MonitorError<E> {
    /// True for failures that abort a single acquisition but leave the device usable.
    pub fn is_transient(&self) -> bool {
        matches!(self, MonitorError::BusTimeout | MonitorError::Io(_))
    }
}

impl<E: core::fmt::Debug> From<core::fmt::Error> for MonitorError<E> {
    fn from(_: core::fmt::Error) -> Self {
        MonitorError::Format
    }
}
