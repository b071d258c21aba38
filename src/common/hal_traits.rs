// src/common/hal_traits.rs

use core::fmt::Debug;

/// Synchronous full-duplex byte exchange used by the ADC protocol.
///
/// The transport is assumed to be configured already (mode 0, MSB first,
/// software chip-select). The driver never touches pins or clocks.
pub trait AdcTransport {
    /// Associated error type for communication errors.
    type Error: Debug;

    /// Drives chip-select active (low), opening a transaction.
    fn select(&mut self) -> Result<(), Self::Error>;

    /// Drives chip-select inactive (high), closing a transaction.
    fn deselect(&mut self) -> Result<(), Self::Error>;

    /// Attempts to load one byte into the transmit buffer.
    ///
    /// Returns `Err(nb::Error::WouldBlock)` while the transmit buffer is not yet empty.
    fn write_byte(&mut self, byte: u8) -> nb::Result<(), Self::Error>;

    /// Attempts to take the byte clocked in during the last transmission.
    ///
    /// Returns `Err(nb::Error::WouldBlock)` until the receive buffer holds a byte.
    fn read_byte(&mut self) -> nb::Result<u8, Self::Error>;
}

/// Transfer direction encoded in the address byte of a register-bus transaction.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Direction {
    /// Master transmits (R/W bit clear).
    Write,
    /// Master receives (R/W bit set).
    Read,
}

/// Bus state changes the oximeter protocol waits for between steps.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum BusEvent {
    /// Start (or repeated start) condition is on the bus; master mode selected.
    StartSent,
    /// Address acknowledged in transmitter mode.
    TransmitterSelected,
    /// Address acknowledged in receiver mode.
    ReceiverSelected,
    /// Data byte shifted out and acknowledged.
    ByteTransmitted,
    /// Data byte shifted in and available.
    ByteReceived,
}

/// Start/address/data/stop primitives for the oximeter's register bus.
///
/// Each primitive only *issues* the action; completion is observed by polling
/// [`OximeterBus::poll_event`], which the driver bounds.
pub trait OximeterBus {
    /// Associated error type for communication errors.
    type Error: Debug;

    /// Issues a start (or repeated start) condition.
    fn generate_start(&mut self) -> Result<(), Self::Error>;

    /// Issues a stop condition.
    fn generate_stop(&mut self) -> Result<(), Self::Error>;

    /// Sends the 7-bit `address` with the R/W bit for `direction`.
    fn send_address(&mut self, address: u8, direction: Direction) -> Result<(), Self::Error>;

    /// Loads one data byte for transmission.
    fn send_byte(&mut self, byte: u8) -> Result<(), Self::Error>;

    /// Takes the last received data byte.
    fn receive_byte(&mut self) -> Result<u8, Self::Error>;

    /// Enables or disables acknowledging received bytes.
    fn set_acknowledge(&mut self, enable: bool) -> Result<(), Self::Error>;

    /// Checks whether `event` has occurred.
    ///
    /// Returns `Err(nb::Error::WouldBlock)` while it has not.
    fn poll_event(&mut self, event: BusEvent) -> nb::Result<(), Self::Error>;
}

/// Byte-at-a-time serial output for telemetry lines.
pub trait TelemetrySink {
    /// Associated error type for communication errors.
    type Error: Debug;

    /// Attempts to hand one byte to the transmitter.
    ///
    /// Returns `Err(nb::Error::WouldBlock)` while the transmit buffer is full.
    fn write_byte(&mut self, byte: u8) -> nb::Result<(), Self::Error>;
}

/// Two-state alarm output (LED, buzzer, relay...).
pub trait AlarmIndicator {
    /// Associated error type for output errors.
    type Error: Debug;

    /// Turns the alarm on.
    fn assert_alarm(&mut self) -> Result<(), Self::Error>;

    /// Turns the alarm off.
    fn clear_alarm(&mut self) -> Result<(), Self::Error>;

    /// Drives the output to match `asserted`.
    fn set_alarm(&mut self, asserted: bool) -> Result<(), Self::Error> {
        if asserted {
            self.assert_alarm()
        } else {
            self.clear_alarm()
        }
    }
}

/// Hardware source of the periodic tick interrupt.
pub trait TickInterruptSource {
    /// Clears the pending interrupt flag so the handler is not re-entered.
    fn acknowledge(&mut self);
}
