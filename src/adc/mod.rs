// src/adc/mod.rs

//! Driver for the MCP3008 successive-approximation ADC.
//!
//! One conversion is one chip-select framed, 3-byte full-duplex exchange:
//!
//! ```text
//! MOSI: 0000_0001  SGL D2 D1 D0 xxxx  xxxx_xxxx
//! MISO: xxxx_xxxx  xxxx x 0 B9 B8      B7 .. B0
//! ```

use crate::common::{
    error::MonitorError,
    hal_traits::AdcTransport,
    poll::poll_bounded,
    timing,
    types::{AdcChannel, RawAdcSample},
};

/// First frame byte: the start bit.
pub const START_BIT: u8 = 0x01;
/// Single-ended mode flag, sits above the channel number in the high nibble.
pub const SINGLE_ENDED: u8 = 0x08;
/// Largest code a 10-bit conversion can produce.
pub const MAX_CODE: u16 = 0x03FF;

/// Builds the 3-byte command frame for a single-ended conversion on `channel`.
#[inline]
pub const fn command_frame(channel: AdcChannel) -> [u8; 3] {
    [START_BIT, (SINGLE_ENDED | channel.index()) << 4, 0x00]
}

/// Extracts the 10-bit result from the three bytes clocked in during a frame.
///
/// Bits 9..8 are the low two bits of the second byte, bits 7..0 the third byte.
/// The first byte is don't-care.
#[inline]
pub const fn decode_conversion(rx: [u8; 3]) -> u16 {
    (((rx[1] & 0x03) as u16) << 8) | rx[2] as u16
}

#[derive(Debug)]
pub struct Mcp3008<T>
where
    T: AdcTransport,
{
    transport: T,
    poll_limit: u32,
}

impl<T> Mcp3008<T>
where
    T: AdcTransport,
{
    pub fn new(transport: T) -> Self {
        Self::with_poll_limit(transport, timing::DEFAULT_BUS_POLL_LIMIT)
    }

    pub fn with_poll_limit(transport: T, poll_limit: u32) -> Self {
        Mcp3008 { transport, poll_limit }
    }

    /// Mutable access to the transport, e.g. to reconfigure it between conversions.
    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Gives the transport back.
    pub fn release(self) -> T {
        self.transport
    }

    /// Performs one conversion on `channel`.
    ///
    /// Chip-select is released on every exit path. If a ready flag never rises,
    /// the result is `BusTimeout`.
    pub fn read_channel(&mut self, channel: AdcChannel) -> Result<RawAdcSample, MonitorError<T::Error>> {
        let frame = command_frame(channel);

        self.transport.select().map_err(MonitorError::Io)?;
        let exchanged = self.exchange_frame(&frame);
        let released = self.transport.deselect().map_err(MonitorError::Io);

        // Report the exchange failure first; it is the more specific error.
        let rx = exchanged?;
        released?;

        Ok(RawAdcSample {
            channel,
            code: decode_conversion(rx),
        })
    }

    /// Same as [`Mcp3008::read_channel`], for a raw converter input number (0 or 1).
    pub fn read_channel_index(&mut self, index: u8) -> Result<RawAdcSample, MonitorError<T::Error>> {
        let channel = AdcChannel::from_index(index).ok_or(MonitorError::InvalidChannel(index))?;
        self.read_channel(channel)
    }

    // Transmit-then-receive for each byte position.
    fn exchange_frame(&mut self, frame: &[u8; 3]) -> Result<[u8; 3], MonitorError<T::Error>> {
        let mut rx = [0u8; 3];
        for (slot, byte) in rx.iter_mut().zip(frame.iter()) {
            poll_bounded(&mut self.transport, self.poll_limit, |t| t.write_byte(*byte))?;
            *slot = poll_bounded(&mut self.transport, self.poll_limit, |t| t.read_byte())?;
        }
        Ok(rx)
    }
}
