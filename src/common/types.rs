// src/common/types.rs

use super::error::MonitorError;
use core::fmt;

// --- Timing Base ---

/// Milliseconds since boot, as counted by the tick interrupt.
///
/// Wraps at `u32::MAX` (about 49.7 days). Elapsed-time arithmetic goes through
/// [`Tick::elapsed_since`], which stays correct across a single wrap.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub struct Tick(pub u32);

impl Tick {
    /// Milliseconds from `earlier` to `self`, modulo 2^32.
    #[inline]
    pub const fn elapsed_since(&self, earlier: Tick) -> u32 {
        self.0.wrapping_sub(earlier.0)
    }

    /// The tick `ms` milliseconds after `self`, wrapping.
    #[inline]
    pub const fn wrapping_add_ms(&self, ms: u32) -> Tick {
        Tick(self.0.wrapping_add(ms))
    }
}

impl fmt::Display for Tick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}ms", self.0)
    }
}

// --- ADC Types ---

/// Logical ADC channels wired on the board.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
#[repr(u8)]
pub enum AdcChannel {
    /// Chest-movement force sensor (input 0).
    Pressure = 0,
    /// Skin temperature sensor, 10 mV/°C (input 1).
    Temperature = 1,
}

impl AdcChannel {
    /// Converter input number for this channel.
    #[inline]
    pub const fn index(&self) -> u8 {
        *self as u8
    }

    /// Tries to convert a converter input number into a wired channel.
    pub fn from_index(index: u8) -> Option<Self> {
        match index {
            0 => Some(AdcChannel::Pressure),
            1 => Some(AdcChannel::Temperature),
            _ => None,
        }
    }
}

impl TryFrom<u8> for AdcChannel {
    type Error = MonitorError<()>;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::from_index(value).ok_or(MonitorError::InvalidChannel(value))
    }
}

/// One 10-bit conversion result and the channel it came from.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct RawAdcSample {
    pub channel: AdcChannel,
    /// Conversion code, 0..=1023.
    pub code: u16,
}

// --- Oximeter Types ---

/// One FIFO slot from the pulse oximeter: two 24-bit optical intensities.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct OximeterSample {
    pub infrared: u32,
    pub red: u32,
}

/// Output of a sample reduction.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct VitalSigns {
    pub spo2_percent: u8,
    pub heart_rate_bpm: u16,
}

impl VitalSigns {
    /// Both values zero; reported when the FIFO holds no sample.
    pub const ABSENT: VitalSigns = VitalSigns {
        spo2_percent: 0,
        heart_rate_bpm: 0,
    };
}
