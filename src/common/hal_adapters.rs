// src/common/hal_adapters.rs

//! Adapters from `embedded-hal` 1.0 peripherals to the monitor's transport traits.

use super::hal_traits::{AdcTransport, AlarmIndicator};
use embedded_hal::digital::OutputPin;
use embedded_hal::spi::SpiBus;

/// Failure of either half of a software chip-select SPI transport.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum SpiTransportError<S, P> {
    Spi(S),
    ChipSelect(P),
}

/// [`AdcTransport`] over an `embedded-hal` SPI bus and a GPIO chip-select.
///
/// Each `write_byte` clocks one full-duplex byte; the byte shifted in is kept
/// until `read_byte` collects it.
#[derive(Debug)]
pub struct SpiAdcTransport<SPI, CS> {
    spi: SPI,
    cs: CS,
    received: Option<u8>,
}

impl<SPI, CS> SpiAdcTransport<SPI, CS>
where
    SPI: SpiBus<u8>,
    CS: OutputPin,
{
    pub fn new(spi: SPI, cs: CS) -> Self {
        SpiAdcTransport { spi, cs, received: None }
    }

    /// Gives the bus and pin back.
    pub fn release(self) -> (SPI, CS) {
        (self.spi, self.cs)
    }
}

impl<SPI, CS> AdcTransport for SpiAdcTransport<SPI, CS>
where
    SPI: SpiBus<u8>,
    CS: OutputPin,
{
    type Error = SpiTransportError<SPI::Error, CS::Error>;

    fn select(&mut self) -> Result<(), Self::Error> {
        self.received = None;
        self.cs.set_low().map_err(SpiTransportError::ChipSelect)
    }

    fn deselect(&mut self) -> Result<(), Self::Error> {
        let flushed = self.spi.flush().map_err(SpiTransportError::Spi);
        self.cs.set_high().map_err(SpiTransportError::ChipSelect)?;
        flushed
    }

    fn write_byte(&mut self, byte: u8) -> nb::Result<(), Self::Error> {
        if self.received.is_some() {
            return Err(nb::Error::WouldBlock);
        }
        let mut buf = [byte];
        self.spi
            .transfer_in_place(&mut buf)
            .map_err(|e| nb::Error::Other(SpiTransportError::Spi(e)))?;
        self.received = Some(buf[0]);
        Ok(())
    }

    fn read_byte(&mut self) -> nb::Result<u8, Self::Error> {
        self.received.take().ok_or(nb::Error::WouldBlock)
    }
}

/// [`AlarmIndicator`] on a push-pull output; high means alarm.
#[derive(Debug)]
pub struct PinAlarmIndicator<P> {
    pin: P,
}

impl<P: OutputPin> PinAlarmIndicator<P> {
    pub fn new(pin: P) -> Self {
        PinAlarmIndicator { pin }
    }

    pub fn release(self) -> P {
        self.pin
    }
}

impl<P: OutputPin> AlarmIndicator for PinAlarmIndicator<P> {
    type Error = P::Error;

    fn assert_alarm(&mut self) -> Result<(), Self::Error> {
        self.pin.set_high()
    }

    fn clear_alarm(&mut self) -> Result<(), Self::Error> {
        self.pin.set_low()
    }
}

// --- Unit Tests ---
#[cfg(test)]
mod tests {
    use super::*;
    use crate::adc::Mcp3008;
    use crate::common::types::AdcChannel;
    use core::convert::Infallible;
    use embedded_hal::digital::ErrorType as PinErrorType;
    use embedded_hal::spi::{ErrorKind, ErrorType as SpiErrorType};
    use heapless::Vec;

    // Replies with `miso` byte by byte and records what it was sent.
    struct MockBus {
        miso: [u8; 3],
        pos: usize,
        mosi: Vec<u8, 8>,
        flushes: u32,
        fail: bool,
    }
    impl MockBus {
        fn new(miso: [u8; 3]) -> Self {
            MockBus { miso, pos: 0, mosi: Vec::new(), flushes: 0, fail: false }
        }
        fn next(&mut self, sent: u8) -> u8 {
            self.mosi.push(sent).unwrap();
            let b = self.miso[self.pos % 3];
            self.pos += 1;
            b
        }
    }
    impl SpiErrorType for MockBus {
        type Error = ErrorKind;
    }
    impl SpiBus<u8> for MockBus {
        fn read(&mut self, words: &mut [u8]) -> Result<(), Self::Error> {
            for w in words.iter_mut() {
                *w = self.next(0);
            }
            Ok(())
        }
        fn write(&mut self, words: &[u8]) -> Result<(), Self::Error> {
            for w in words {
                self.next(*w);
            }
            Ok(())
        }
        fn transfer(&mut self, read: &mut [u8], write: &[u8]) -> Result<(), Self::Error> {
            for (r, w) in read.iter_mut().zip(write.iter()) {
                *r = self.next(*w);
            }
            Ok(())
        }
        fn transfer_in_place(&mut self, words: &mut [u8]) -> Result<(), Self::Error> {
            if self.fail {
                return Err(ErrorKind::Overrun);
            }
            for w in words.iter_mut() {
                *w = self.next(*w);
            }
            Ok(())
        }
        fn flush(&mut self) -> Result<(), Self::Error> {
            self.flushes += 1;
            Ok(())
        }
    }

    #[derive(Default)]
    struct MockPin {
        high: bool,
        edges: u32,
    }
    impl PinErrorType for MockPin {
        type Error = Infallible;
    }
    impl OutputPin for MockPin {
        fn set_low(&mut self) -> Result<(), Self::Error> {
            self.high = false;
            self.edges += 1;
            Ok(())
        }
        fn set_high(&mut self) -> Result<(), Self::Error> {
            self.high = true;
            self.edges += 1;
            Ok(())
        }
    }

    #[test]
    fn test_conversion_over_spi_bus() {
        let transport = SpiAdcTransport::new(MockBus::new([0x00, 0x01, 0x2C]), MockPin { high: true, edges: 0 });
        let mut adc = Mcp3008::new(transport);
        let sample = adc.read_channel(AdcChannel::Temperature).unwrap();
        assert_eq!(sample.code, 300);

        let (bus, cs) = adc.release().release();
        assert_eq!(bus.mosi.as_slice(), &[0x01, 0x90, 0x00]);
        assert_eq!(bus.flushes, 1);
        assert!(cs.high);
        assert_eq!(cs.edges, 2);
    }

    #[test]
    fn test_bus_error_surfaces_and_releases_chip_select() {
        let mut bus = MockBus::new([0; 3]);
        bus.fail = true;
        let mut adc = Mcp3008::new(SpiAdcTransport::new(bus, MockPin::default()));
        assert!(matches!(
            adc.read_channel(AdcChannel::Pressure),
            Err(crate::common::MonitorError::Io(SpiTransportError::Spi(ErrorKind::Overrun)))
        ));
        let (_, cs) = adc.release().release();
        assert!(cs.high);
    }

    #[test]
    fn test_read_before_write_would_block() {
        let mut t = SpiAdcTransport::new(MockBus::new([0; 3]), MockPin::default());
        assert!(matches!(t.read_byte(), Err(nb::Error::WouldBlock)));
    }

    #[test]
    fn test_pin_indicator_levels() {
        let mut led = PinAlarmIndicator::new(MockPin::default());
        led.set_alarm(true).unwrap();
        assert!(led.pin.high);
        led.clear_alarm().unwrap();
        assert!(!led.release().high);
    }
}
