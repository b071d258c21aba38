// src/monitor/telemetry.rs

use arrayvec::ArrayString;
use core::fmt::{self, Write};

/// Fits the longest line, including `--` placeholders and CRLF.
pub const TELEMETRY_LINE_CAPACITY: usize = 96;
/// Printed in place of a value for a device that is not responding.
pub const UNAVAILABLE_MARK: &str = "--";

pub type TelemetryLine = ArrayString<TELEMETRY_LINE_CAPACITY>;

/// Outcome of one field's acquisition.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Reading<T> {
    /// Acquired this cycle.
    Fresh(T),
    /// Acquisition aborted; the previous record's value is repeated.
    Held(T),
    /// No value: the device is not responding, or there was nothing to repeat.
    Unavailable,
}

impl<T: Copy> Reading<T> {
    pub fn value(&self) -> Option<T> {
        match self {
            Reading::Fresh(v) | Reading::Held(v) => Some(*v),
            Reading::Unavailable => None,
        }
    }

    /// What to report when this cycle's acquisition was aborted.
    pub fn hold(&self) -> Reading<T> {
        match self.value() {
            Some(v) => Reading::Held(v),
            None => Reading::Unavailable,
        }
    }
}

// Wrapper so the formatter can print a value or the placeholder.
struct Field<'a, T>(&'a Reading<T>);

impl<T: fmt::Display + Copy> fmt::Display for Field<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.value() {
            Some(v) => write!(f, "{}", v),
            None => f.write_str(UNAVAILABLE_MARK),
        }
    }
}

#[derive(Copy, Clone)]
struct DeciCelsius(u16);

impl fmt::Display for DeciCelsius {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.0 / 10, self.0 % 10)
    }
}

/// One cycle's results.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct TelemetryRecord {
    /// Raw pressure code
    pub pressure: Reading<u16>,
    /// Temperature in tenths of a degree Celsius
    pub temperature_deci_c: Reading<u16>,
    pub spo2_percent: Reading<u8>,
    pub heart_rate_bpm: Reading<u16>,
    pub apnea: bool,
}

impl TelemetryRecord {
    /// Record with every field unavailable, used before the first cycle.
    pub const EMPTY: TelemetryRecord = TelemetryRecord {
        pressure: Reading::Unavailable,
        temperature_deci_c: Reading::Unavailable,
        spo2_percent: Reading::Unavailable,
        heart_rate_bpm: Reading::Unavailable,
        apnea: false,
    };

    /// Writes the serial line for this record, CRLF included.
    pub fn write_line<W: Write>(&self, out: &mut W) -> fmt::Result {
        let temperature = match self.temperature_deci_c.value() {
            Some(t) => Reading::Fresh(DeciCelsius(t)),
            None => Reading::<DeciCelsius>::Unavailable,
        };
        write!(
            out,
            "FSR: {}, Temp: {} C, SpO2: {}%, HR: {} bpm, Apnea: {}\r\n",
            Field(&self.pressure),
            Field(&temperature),
            Field(&self.spo2_percent),
            Field(&self.heart_rate_bpm),
            if self.apnea { "Yes" } else { "No" },
        )
    }

    /// Formats the serial line into a fixed-capacity buffer.
    pub fn format_line(&self) -> Result<TelemetryLine, fmt::Error> {
        let mut line = TelemetryLine::new();
        self.write_line(&mut line)?;
        Ok(line)
    }
}

/// Diagnostic line announcing the oximeter part id, sent once at start-up.
pub fn part_id_line(part_id: u8) -> Result<TelemetryLine, fmt::Error> {
    let mut line = TelemetryLine::new();
    write!(line, "MAX30102 ID: 0x{:02X}\r\n", part_id)?;
    Ok(line)
}
