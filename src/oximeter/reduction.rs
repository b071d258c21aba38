// src/oximeter/reduction.rs

use crate::common::types::{OximeterSample, VitalSigns};

/// Turns one raw optical sample into SpO2 and heart rate.
///
/// Kept separate from the bus protocol so the estimation can be replaced
/// without touching the driver.
pub trait SampleReduction {
    fn reduce(&self, sample: &OximeterSample) -> VitalSigns;

    /// Reduction of a poll result; an empty FIFO gives [`VitalSigns::ABSENT`].
    fn reduce_poll(&self, sample: Option<&OximeterSample>) -> VitalSigns {
        match sample {
            Some(s) => self.reduce(s),
            None => VitalSigns::ABSENT,
        }
    }
}

/// Presence check standing in for a real SpO2/heart-rate estimate.
///
/// Reports a fixed 98 % whenever the infrared channel is non-zero and a fixed
/// 70 bpm whenever the red channel is non-zero. Not a physiological measurement.
#[derive(Debug, Copy, Clone, Default)]
pub struct PlaceholderReduction;

impl PlaceholderReduction {
    pub const SPO2_PERCENT: u8 = 98;
    pub const HEART_RATE_BPM: u16 = 70;
}

impl SampleReduction for PlaceholderReduction {
    fn reduce(&self, sample: &OximeterSample) -> VitalSigns {
        VitalSigns {
            spo2_percent: if sample.infrared > 0 { Self::SPO2_PERCENT } else { 0 },
            heart_rate_bpm: if sample.red > 0 { Self::HEART_RATE_BPM } else { 0 },
        }
    }
}
