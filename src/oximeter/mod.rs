// src/oximeter/mod.rs

//! MAX30102 pulse-oximeter driver.
//!
//! Only what the monitor needs: write the two configuration registers, read the
//! part id for diagnostics, and pull one sample out of the FIFO when the write
//! and read pointers say one is waiting.

mod bus_helpers;
pub mod reduction;

pub use reduction::{PlaceholderReduction, SampleReduction};

use crate::common::{
    config::OximeterConfig,
    error::MonitorError,
    hal_traits::OximeterBus,
    timing,
    types::OximeterSample,
};

// Register map (subset)
pub const REG_FIFO_WR_PTR: u8 = 0x04;
pub const REG_FIFO_RD_PTR: u8 = 0x06;
pub const REG_FIFO_DATA: u8 = 0x07;
pub const REG_MODE_CONFIG: u8 = 0x09;
pub const REG_SPO2_CONFIG: u8 = 0x0A;
pub const REG_PART_ID: u8 = 0x00;

/// Bytes in one FIFO slot in SpO2 mode: 3 for infrared, 3 for red.
pub const FIFO_SAMPLE_LEN: usize = 6;

/// Decodes one FIFO slot: bytes 0..3 big-endian infrared, bytes 3..6 big-endian red.
#[inline]
pub const fn decode_fifo_sample(raw: [u8; FIFO_SAMPLE_LEN]) -> OximeterSample {
    OximeterSample {
        infrared: u32::from_be_bytes([0, raw[0], raw[1], raw[2]]),
        red: u32::from_be_bytes([0, raw[3], raw[4], raw[5]]),
    }
}

/// Represents a MAX30102 on a register-addressed bus.
#[derive(Debug)]
pub struct Max30102<B>
where
    B: OximeterBus,
{
    bus: B,
    config: OximeterConfig,
    poll_limit: u32,
}

impl<B> Max30102<B>
where
    B: OximeterBus,
{
    pub fn new(bus: B, config: OximeterConfig) -> Self {
        Self::with_poll_limit(bus, config, timing::DEFAULT_BUS_POLL_LIMIT)
    }

    pub fn with_poll_limit(bus: B, config: OximeterConfig, poll_limit: u32) -> Self {
        Max30102 {
            bus,
            config,
            poll_limit,
        }
    }

    pub fn config(&self) -> &OximeterConfig {
        &self.config
    }

    pub fn bus_mut(&mut self) -> &mut B {
        &mut self.bus
    }

    /// Gives the bus back.
    pub fn release(self) -> B {
        self.bus
    }

    /// Writes the operating mode and sample configuration, then reads the
    /// part id and logs it.
    ///
    /// The part id is returned for diagnostics only.
    pub fn setup(&mut self) -> Result<u8, MonitorError<B::Error>> {
        self.write_register(REG_MODE_CONFIG, self.config.mode)?;
        self.write_register(REG_SPO2_CONFIG, self.config.spo2_config)?;
        let part_id = self.read_register(REG_PART_ID)?;
        log::info!("MAX30102 ID: {:#04x}", part_id);
        Ok(part_id)
    }

    /// Reads the oldest unread FIFO slot.
    ///
    /// Returns `Ok(None)` when the write and read pointers coincide.
    pub fn read_sample(&mut self) -> Result<Option<OximeterSample>, MonitorError<B::Error>> {
        let write_ptr = self.read_register(REG_FIFO_WR_PTR)?;
        let read_ptr = self.read_register(REG_FIFO_RD_PTR)?;
        if write_ptr == read_ptr {
            return Ok(None);
        }

        let mut raw = [0u8; FIFO_SAMPLE_LEN];
        self.read_burst(REG_FIFO_DATA, &mut raw)?;
        Ok(Some(decode_fifo_sample(raw)))
    }
}

// --- Unit Tests ---
#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::common::hal_traits::{BusEvent, Direction};
    use heapless::{Deque, Vec};
    use nb::Result as NbResult;

    #[derive(Debug, Copy, Clone, PartialEq, Eq)]
    pub(crate) struct MockI2cError;

    #[derive(Debug, Copy, Clone, PartialEq, Eq)]
    pub(crate) enum I2cOp {
        Start,
        Stop,
        Address(u8, Direction),
        Send(u8),
        Receive(u8),
        Ack(bool),
    }

    // --- Mock Bus ---
    // A register file behind start/address/data/stop primitives. The first byte
    // written after an address-for-write selects the register; further bytes are
    // stored there. Reads of REG_FIFO_DATA drain `fifo`.
    pub(crate) struct MockI2c {
        pub registers: [u8; 256],
        pub fifo: Deque<u8, 64>,
        pub log: Vec<I2cOp, 256>,
        pointer: u8,
        pointer_set: bool,
        pub stuck_event: Option<BusEvent>,
        pub stuck: bool,
        pub polls: u32,
    }

    impl MockI2c {
        pub(crate) fn new() -> Self {
            MockI2c {
                registers: [0; 256],
                fifo: Deque::new(),
                log: Vec::new(),
                pointer: 0,
                pointer_set: false,
                stuck_event: None,
                stuck: false,
                polls: 0,
            }
        }
        pub(crate) fn with_part_id(part_id: u8) -> Self {
            let mut bus = Self::new();
            bus.registers[REG_PART_ID as usize] = part_id;
            bus
        }
        pub(crate) fn stage_sample(&mut self, raw: [u8; FIFO_SAMPLE_LEN]) {
            for b in raw {
                self.fifo.push_back(b).unwrap();
            }
            self.registers[REG_FIFO_WR_PTR as usize] = self.registers[REG_FIFO_WR_PTR as usize].wrapping_add(1) & 0x1F;
        }
        fn record(&mut self, op: I2cOp) {
            // Keep the most recent operations when the log fills up.
            if self.log.is_full() {
                self.log.remove(0);
            }
            self.log.push(op).unwrap();
        }
        pub(crate) fn count(&self, op: I2cOp) -> usize {
            self.log.iter().filter(|o| **o == op).count()
        }
    }

    impl OximeterBus for MockI2c {
        type Error = MockI2cError;
        fn generate_start(&mut self) -> Result<(), Self::Error> {
            self.record(I2cOp::Start);
            Ok(())
        }
        fn generate_stop(&mut self) -> Result<(), Self::Error> {
            self.record(I2cOp::Stop);
            Ok(())
        }
        fn send_address(&mut self, address: u8, direction: Direction) -> Result<(), Self::Error> {
            self.record(I2cOp::Address(address, direction));
            if direction == Direction::Write {
                self.pointer_set = false;
            }
            Ok(())
        }
        fn send_byte(&mut self, byte: u8) -> Result<(), Self::Error> {
            self.record(I2cOp::Send(byte));
            if !self.pointer_set {
                self.pointer = byte;
                self.pointer_set = true;
            } else {
                self.registers[self.pointer as usize] = byte;
                self.pointer = self.pointer.wrapping_add(1);
            }
            Ok(())
        }
        fn receive_byte(&mut self) -> Result<u8, Self::Error> {
            let byte = if self.pointer == REG_FIFO_DATA {
                self.fifo.pop_front().unwrap_or(0)
            } else {
                let b = self.registers[self.pointer as usize];
                self.pointer = self.pointer.wrapping_add(1);
                b
            };
            self.record(I2cOp::Receive(byte));
            Ok(byte)
        }
        fn set_acknowledge(&mut self, enable: bool) -> Result<(), Self::Error> {
            self.record(I2cOp::Ack(enable));
            Ok(())
        }
        fn poll_event(&mut self, event: BusEvent) -> NbResult<(), Self::Error> {
            self.polls += 1;
            if self.stuck || self.stuck_event == Some(event) {
                Err(nb::Error::WouldBlock)
            } else {
                Ok(())
            }
        }
    }

    const ADDR: u8 = 0x57;

    #[test]
    fn test_decode_fifo_sample() {
        let sample = decode_fifo_sample([0x01, 0x02, 0x03, 0xFF, 0xFE, 0xFD]);
        assert_eq!(sample.infrared, 0x010203);
        assert_eq!(sample.red, 0xFFFEFD);
        assert_eq!(decode_fifo_sample([0; 6]), OximeterSample { infrared: 0, red: 0 });
    }

    #[test]
    fn test_setup_writes_config_and_reads_part_id() {
        let mut ox = Max30102::new(MockI2c::with_part_id(0x15), OximeterConfig::default());
        assert_eq!(ox.setup().unwrap(), 0x15);

        let bus = ox.release();
        assert_eq!(bus.registers[REG_MODE_CONFIG as usize], 0x03);
        assert_eq!(bus.registers[REG_SPO2_CONFIG as usize], 0x27);
        // Write transaction framing for MODE_CONFIG
        assert_eq!(
            &bus.log[..5],
            &[
                I2cOp::Start,
                I2cOp::Address(ADDR, Direction::Write),
                I2cOp::Send(REG_MODE_CONFIG),
                I2cOp::Send(0x03),
                I2cOp::Stop,
            ]
        );
    }

    #[test]
    fn test_single_register_read_framing() {
        let mut bus = MockI2c::new();
        bus.registers[REG_FIFO_WR_PTR as usize] = 4;
        bus.registers[REG_FIFO_RD_PTR as usize] = 4;
        let mut ox = Max30102::new(bus, OximeterConfig::default());
        assert_eq!(ox.read_sample().unwrap(), None);

        let bus = ox.release();
        assert_eq!(
            &bus.log[..10],
            &[
                I2cOp::Start,
                I2cOp::Address(ADDR, Direction::Write),
                I2cOp::Send(REG_FIFO_WR_PTR),
                I2cOp::Start,
                I2cOp::Address(ADDR, Direction::Read),
                I2cOp::Ack(false),
                I2cOp::Stop,
                I2cOp::Receive(4),
                I2cOp::Ack(true),
                I2cOp::Start,
            ]
        );
    }

    #[test]
    fn test_empty_fifo_skips_burst() {
        let mut ox = Max30102::new(MockI2c::new(), OximeterConfig::default());
        assert_eq!(ox.read_sample().unwrap(), None);
        let bus = ox.release();
        assert_eq!(bus.count(I2cOp::Send(REG_FIFO_DATA)), 0);
        assert_eq!(bus.count(I2cOp::Start), 4);
    }

    #[test]
    fn test_burst_read_acks_all_but_last() {
        let mut bus = MockI2c::new();
        bus.stage_sample([0x00, 0x12, 0x34, 0x00, 0x56, 0x78]);
        let mut ox = Max30102::new(bus, OximeterConfig::default());
        let sample = ox.read_sample().unwrap().unwrap();
        assert_eq!(sample, OximeterSample { infrared: 0x1234, red: 0x5678 });

        let bus = ox.release();
        let n = bus.log.len();
        assert_eq!(
            &bus.log[n - 12..],
            &[
                I2cOp::Send(REG_FIFO_DATA),
                I2cOp::Start,
                I2cOp::Address(ADDR, Direction::Read),
                I2cOp::Receive(0x00),
                I2cOp::Receive(0x12),
                I2cOp::Receive(0x34),
                I2cOp::Receive(0x00),
                I2cOp::Receive(0x56),
                I2cOp::Ack(false),
                I2cOp::Stop,
                I2cOp::Receive(0x78),
                I2cOp::Ack(true),
            ]
        );
    }

    #[test]
    fn test_stuck_bus_times_out_and_releases_bus() {
        let mut bus = MockI2c::new();
        bus.stuck_event = Some(BusEvent::ReceiverSelected);
        let mut ox = Max30102::with_poll_limit(bus, OximeterConfig::default(), 20);
        assert!(matches!(ox.read_sample(), Err(MonitorError::BusTimeout)));

        let bus = ox.release();
        // Recovery: stop and acknowledge re-enabled after the aborted read.
        let n = bus.log.len();
        assert_eq!(&bus.log[n - 2..], &[I2cOp::Stop, I2cOp::Ack(true)]);
    }

    #[test]
    fn test_setup_on_dead_bus_is_bounded() {
        let mut bus = MockI2c::new();
        bus.stuck = true;
        let mut ox = Max30102::with_poll_limit(bus, OximeterConfig::default(), 10);
        assert!(matches!(ox.setup(), Err(MonitorError::BusTimeout)));
        assert_eq!(ox.release().polls, 10);
    }
}
