// src/oximeter/bus_helpers.rs

use super::Max30102;
use crate::common::{
    error::MonitorError,
    hal_traits::{BusEvent, Direction, OximeterBus},
    poll::poll_bounded,
};

// Implementation block for register-level bus helpers
impl<B> Max30102<B>
where
    B: OximeterBus,
{
    /// Waits (bounded) for `event` on the bus.
    fn wait_event(&mut self, event: BusEvent) -> Result<(), MonitorError<B::Error>> {
        poll_bounded(&mut self.bus, self.poll_limit, |bus| bus.poll_event(event))
    }

    /// Start condition, device address with `direction`, each step confirmed.
    fn begin(&mut self, direction: Direction) -> Result<(), MonitorError<B::Error>> {
        self.bus.generate_start().map_err(MonitorError::Io)?;
        self.wait_event(BusEvent::StartSent)?;
        self.bus
            .send_address(self.config.address, direction)
            .map_err(MonitorError::Io)?;
        let selected = match direction {
            Direction::Write => BusEvent::TransmitterSelected,
            Direction::Read => BusEvent::ReceiverSelected,
        };
        self.wait_event(selected)
    }

    /// Sends one byte and waits for it to be acknowledged.
    fn transmit(&mut self, byte: u8) -> Result<(), MonitorError<B::Error>> {
        self.bus.send_byte(byte).map_err(MonitorError::Io)?;
        self.wait_event(BusEvent::ByteTransmitted)
    }

    /// Waits for a received byte and takes it.
    fn receive(&mut self) -> Result<u8, MonitorError<B::Error>> {
        self.wait_event(BusEvent::ByteReceived)?;
        self.bus.receive_byte().map_err(MonitorError::Io)
    }

    /// Best-effort return to idle after a failed transaction: stop, ACK back on.
    fn abort_transaction(&mut self) {
        if let Err(e) = self.bus.generate_stop() {
            log::warn!("oximeter: stop after failed transaction rejected: {:?}", e);
        }
        if let Err(e) = self.bus.set_acknowledge(true) {
            log::warn!("oximeter: re-enabling ACK failed: {:?}", e);
        }
    }

    /// Runs `f`, cleaning the bus up if it fails part way.
    fn transaction<T, FN>(&mut self, f: FN) -> Result<T, MonitorError<B::Error>>
    where
        FN: FnOnce(&mut Self) -> Result<T, MonitorError<B::Error>>,
    {
        let result = f(self);
        if result.is_err() {
            self.abort_transaction();
        }
        result
    }

    /// Writes `value` into register `reg`.
    pub(super) fn write_register(&mut self, reg: u8, value: u8) -> Result<(), MonitorError<B::Error>> {
        self.transaction(|dev| {
            dev.begin(Direction::Write)?;
            dev.transmit(reg)?;
            dev.transmit(value)?;
            dev.bus.generate_stop().map_err(MonitorError::Io)
        })
    }

    /// Reads the single register `reg`.
    ///
    /// The only byte is NACKed: acknowledge is turned off and the stop queued
    /// before the byte arrives.
    pub(super) fn read_register(&mut self, reg: u8) -> Result<u8, MonitorError<B::Error>> {
        self.transaction(|dev| {
            dev.begin(Direction::Write)?;
            dev.transmit(reg)?;
            dev.begin(Direction::Read)?;
            dev.bus.set_acknowledge(false).map_err(MonitorError::Io)?;
            dev.bus.generate_stop().map_err(MonitorError::Io)?;
            let byte = dev.receive()?;
            dev.bus.set_acknowledge(true).map_err(MonitorError::Io)?;
            Ok(byte)
        })
    }

    /// Reads `buf.len()` consecutive bytes starting at register `reg`.
    ///
    /// Every byte but the last is ACKed; the last is NACKed and followed by stop.
    pub(super) fn read_burst(&mut self, reg: u8, buf: &mut [u8]) -> Result<(), MonitorError<B::Error>> {
        let Some((last, head)) = buf.split_last_mut() else {
            return Ok(());
        };
        self.transaction(|dev| {
            dev.begin(Direction::Write)?;
            dev.transmit(reg)?;
            dev.begin(Direction::Read)?;
            for slot in head.iter_mut() {
                *slot = dev.receive()?;
            }
            dev.bus.set_acknowledge(false).map_err(MonitorError::Io)?;
            dev.bus.generate_stop().map_err(MonitorError::Io)?;
            *last = dev.receive()?;
            dev.bus.set_acknowledge(true).map_err(MonitorError::Io)
        })
    }
}
