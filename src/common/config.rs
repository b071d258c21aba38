// src/common/config.rs

use super::timing;

/// Register values and bus address for the pulse oximeter.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct OximeterConfig {
    /// 7-bit bus address
    pub address: u8,
    /// Value written to MODE_CONFIG
    pub mode: u8,
    /// Value written to SPO2_CONFIG (sample rate, pulse width, resolution)
    pub spo2_config: u8,
}

impl OximeterConfig {
    /// MAX30102 in SpO2 mode, 100 samples/s, 411 µs pulses.
    pub const fn max30102() -> Self {
        Self {
            address: 0x57,
            mode: 0x03,
            spo2_config: 0x27,
        }
    }
}

impl Default for OximeterConfig {
    fn default() -> Self {
        Self::max30102()
    }
}

/// Everything the sensor loop needs to know that is not a register address.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct MonitorConfig {
    /// Pressure code above which a sample counts as a breath (ADC code units)
    pub breath_threshold: u16,
    /// Longest tolerated gap between breaths, in seconds
    pub apnea_window_secs: u32,
    /// Length of one loop iteration (milliseconds)
    pub cycle_period_ms: u32,
    /// ADC reference voltage in millivolts
    pub adc_reference_mv: u32,
    /// Number of ADC codes across the reference (1024 for 10 bits)
    pub adc_full_scale: u32,
    /// Oximeter register configuration
    pub oximeter: OximeterConfig,
    /// Polls of a bus-ready flag before `BusTimeout`
    pub bus_poll_limit: u32,
    /// Consecutive failed acquisitions before `DeviceNotResponding`
    pub device_failure_threshold: u8,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self::bedside()
    }
}

impl MonitorConfig {
    /// Board defaults: FSR402 on a 3.3 V MCP3008, LM35 temperature, MAX30102.
    pub const fn bedside() -> Self {
        Self {
            breath_threshold: 100,
            apnea_window_secs: timing::DEFAULT_APNEA_WINDOW_SECS,
            cycle_period_ms: timing::DEFAULT_CYCLE_PERIOD_MS,
            adc_reference_mv: 3300,
            adc_full_scale: 1024,
            oximeter: OximeterConfig::max30102(),
            bus_poll_limit: timing::DEFAULT_BUS_POLL_LIMIT,
            device_failure_threshold: timing::DEFAULT_DEVICE_FAILURE_THRESHOLD,
        }
    }

    /// Apnea window expressed in ticks.
    pub const fn apnea_window_ms(&self) -> u32 {
        self.apnea_window_secs.saturating_mul(timing::TICKS_PER_SECOND)
    }

    /// Converts a temperature-channel code to tenths of a degree Celsius.
    ///
    /// The sensor outputs 10 mV/°C, so tenths of a degree equal millivolts.
    /// The result is what `printf("%.1f")` prints for the float value
    /// `code * (reference_mv / 1000) / full_scale * 100`. Away from a tie the
    /// exact integer quotient decides. On an exact tie the float value decides,
    /// since it may land just below or above it; a float that is exactly on the
    /// tie goes to the even tenth.
    pub fn code_to_deci_celsius(&self, code: u16) -> u16 {
        if self.adc_full_scale == 0 {
            return 0;
        }
        let full_scale = self.adc_full_scale as u64;
        let scaled = code as u64 * self.adc_reference_mv as u64;
        let quotient = scaled / full_scale;
        let twice_remainder = (scaled % full_scale) * 2;

        let round_up = if twice_remainder != full_scale {
            twice_remainder > full_scale
        } else {
            let reference_volts = self.adc_reference_mv as f64 / 1000.0;
            let celsius = (code as f64 * reference_volts / self.adc_full_scale as f64) * 100.0;
            let tie = (2 * quotient + 1) as f64 / 20.0;
            celsius > tie || (celsius == tie && quotient % 2 == 1)
        };
        let rounded = if round_up { quotient + 1 } else { quotient };
        if rounded > u16::MAX as u64 {
            u16::MAX
        } else {
            rounded as u16
        }
    }
}

// --- Unit Tests ---
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = MonitorConfig::default();
        assert_eq!(cfg.breath_threshold, 100);
        assert_eq!(cfg.apnea_window_ms(), 20_000);
        assert_eq!(cfg.cycle_period_ms, 1000);
        assert_eq!(cfg.oximeter, OximeterConfig { address: 0x57, mode: 0x03, spo2_config: 0x27 });
    }

    #[test]
    fn test_code_to_deci_celsius() {
        let cfg = MonitorConfig::default();
        assert_eq!(cfg.code_to_deci_celsius(0), 0);
        // 73 * 3300 / 1024 = 235.25
        assert_eq!(cfg.code_to_deci_celsius(73), 235);
        // 112 * 3300 / 1024 = 360.93
        assert_eq!(cfg.code_to_deci_celsius(112), 361);
        // Exact tie, float exactly 41.25: even tenth
        assert_eq!(cfg.code_to_deci_celsius(128), 412);
        // 1023 * 3300 / 1024 = 3296.78
        assert_eq!(cfg.code_to_deci_celsius(1023), 3297);
    }

    #[test]
    fn test_ties_follow_float_print() {
        let cfg = MonitorConfig::default();
        // 896 * 3.3 / 1024 * 100 is exactly 288.75, printed as 288.8
        assert_eq!(cfg.code_to_deci_celsius(896), 2888);
        // 640: exactly 206.25, printed as 206.2
        assert_eq!(cfg.code_to_deci_celsius(640), 2062);
        // 384: the float lands at 123.7499.., printed as 123.7
        assert_eq!(cfg.code_to_deci_celsius(384), 1237);
    }

    #[test]
    fn test_non_tie_codes_round_to_nearest() {
        let cfg = MonitorConfig::default();
        // 897 * 3300 / 1024 = 2890.72
        assert_eq!(cfg.code_to_deci_celsius(897), 2891);
        // 895 * 3300 / 1024 = 2884.27
        assert_eq!(cfg.code_to_deci_celsius(895), 2884);
    }

    #[test]
    fn test_zero_full_scale_does_not_divide() {
        let cfg = MonitorConfig { adc_full_scale: 0, ..MonitorConfig::default() };
        assert_eq!(cfg.code_to_deci_celsius(500), 0);
    }
}
