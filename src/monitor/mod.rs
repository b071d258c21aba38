// src/monitor/mod.rs

//! The sensor loop.
//!
//! One cycle reads the pressure channel, decides apnea and drives the alarm
//! output, then reads temperature and the oximeter, and finally emits one
//! telemetry line. The alarm decision never waits on the oximeter.

mod health;
mod telemetry;

pub use health::DeviceHealth;
pub use telemetry::{
    part_id_line, Reading, TelemetryLine, TelemetryRecord, TELEMETRY_LINE_CAPACITY,
    UNAVAILABLE_MARK,
};

use crate::adc::Mcp3008;
use crate::apnea::{ApneaDetector, BreathPhase};
use crate::clock::MonotonicClock;
use crate::common::{
    config::MonitorConfig,
    error::{Device, MonitorError},
    hal_traits::{AdcTransport, AlarmIndicator, OximeterBus, TelemetrySink},
    poll::poll_bounded,
    timing,
    types::{AdcChannel, Tick},
};
use crate::oximeter::{Max30102, PlaceholderReduction, SampleReduction};
use core::fmt::Debug;

/// Field value for this cycle given the acquisition outcome.
fn resolve<T: Copy, E: Debug>(result: Result<T, &MonitorError<E>>, previous: Reading<T>) -> Reading<T> {
    match result {
        Ok(value) => Reading::Fresh(value),
        Err(MonitorError::DeviceNotResponding { .. }) => Reading::Unavailable,
        Err(_) => previous.hold(),
    }
}

/// Owns every peripheral of the monitor and runs the acquisition cycle.
pub struct VitalMonitor<A, B, C, S, L, R = PlaceholderReduction>
where
    A: AdcTransport,
    B: OximeterBus,
    C: MonotonicClock,
    S: TelemetrySink,
    L: AlarmIndicator,
    R: SampleReduction,
{
    config: MonitorConfig,
    adc: Mcp3008<A>,
    oximeter: Max30102<B>,
    clock: C,
    sink: S,
    indicator: L,
    reduction: R,
    detector: ApneaDetector,
    adc_health: DeviceHealth,
    oximeter_health: DeviceHealth,
    sink_health: DeviceHealth,
    indicator_health: DeviceHealth,
    previous: TelemetryRecord,
}

impl<A, B, C, S, L> VitalMonitor<A, B, C, S, L, PlaceholderReduction>
where
    A: AdcTransport,
    B: OximeterBus,
    C: MonotonicClock,
    S: TelemetrySink,
    L: AlarmIndicator,
{
    /// Wraps the transports in their drivers using `config`.
    ///
    /// The apnea window starts counting now; [`VitalMonitor::start`] restarts it.
    pub fn new(config: MonitorConfig, adc: A, oximeter: B, clock: C, sink: S, indicator: L) -> Self {
        let detector = ApneaDetector::new(config.breath_threshold, config.apnea_window_ms(), clock.now());
        VitalMonitor {
            adc: Mcp3008::with_poll_limit(adc, config.bus_poll_limit),
            oximeter: Max30102::with_poll_limit(oximeter, config.oximeter, config.bus_poll_limit),
            clock,
            sink,
            indicator,
            reduction: PlaceholderReduction,
            detector,
            adc_health: DeviceHealth::new(Device::Adc, config.device_failure_threshold),
            oximeter_health: DeviceHealth::new(Device::Oximeter, config.device_failure_threshold),
            sink_health: DeviceHealth::new(Device::Sink, config.device_failure_threshold),
            indicator_health: DeviceHealth::new(Device::Indicator, config.device_failure_threshold),
            previous: TelemetryRecord::EMPTY,
            config,
        }
    }
}

impl<A, B, C, S, L, R> VitalMonitor<A, B, C, S, L, R>
where
    A: AdcTransport,
    B: OximeterBus,
    C: MonotonicClock,
    S: TelemetrySink,
    L: AlarmIndicator,
    R: SampleReduction,
{
    /// Replaces the SpO2/heart-rate estimation.
    pub fn with_reduction<R2: SampleReduction>(self, reduction: R2) -> VitalMonitor<A, B, C, S, L, R2> {
        VitalMonitor {
            config: self.config,
            adc: self.adc,
            oximeter: self.oximeter,
            clock: self.clock,
            sink: self.sink,
            indicator: self.indicator,
            reduction,
            detector: self.detector,
            adc_health: self.adc_health,
            oximeter_health: self.oximeter_health,
            sink_health: self.sink_health,
            indicator_health: self.indicator_health,
            previous: self.previous,
        }
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    pub fn detector(&self) -> &ApneaDetector {
        &self.detector
    }

    /// Record produced by the most recent cycle.
    pub fn last_record(&self) -> &TelemetryRecord {
        &self.previous
    }

    pub fn adc_health(&self) -> &DeviceHealth {
        &self.adc_health
    }

    pub fn oximeter_health(&self) -> &DeviceHealth {
        &self.oximeter_health
    }

    pub fn sink_health(&self) -> &DeviceHealth {
        &self.sink_health
    }

    pub fn indicator_health(&self) -> &DeviceHealth {
        &self.indicator_health
    }

    /// Configures the oximeter, reports its part id and restarts the apnea window.
    ///
    /// Failures are logged; monitoring starts regardless.
    pub fn start(&mut self) {
        match self.oximeter_health.observe(self.oximeter.setup()) {
            Ok(part_id) => {
                let sent = self.announce_part_id(part_id);
                self.observe_sink(sent);
            }
            Err(e) => log::warn!("oximeter setup failed: {:?}", e),
        }

        let now = self.clock.now();
        self.detector.rearm(now);
        log::info!(
            "monitoring started at {}: breath threshold {}, apnea window {} s",
            now,
            self.config.breath_threshold,
            self.config.apnea_window_secs
        );
    }

    /// Runs one acquisition cycle and waits out the rest of the period.
    pub fn run_cycle(&mut self) -> TelemetryRecord {
        let cycle_start = self.clock.now();
        let previous = self.previous;

        // Pressure and the alarm decision come first.
        let pressure = self.read_code(AdcChannel::Pressure);
        let phase = self.detector.evaluate(pressure.as_ref().ok().copied(), self.clock.now());
        let apnea = phase == BreathPhase::Apnea;
        let driven = self.indicator.set_alarm(apnea).map_err(MonitorError::Io);
        // Failures are logged by the health record.
        self.indicator_health.observe(driven).ok();

        let config = self.config;
        let temperature = self
            .read_code(AdcChannel::Temperature)
            .map(|code| config.code_to_deci_celsius(code));

        let polled = self.oximeter_health.observe(self.oximeter.read_sample());
        let reduction = &self.reduction;
        let vitals = polled.map(|sample| reduction.reduce_poll(sample.as_ref()));

        let record = TelemetryRecord {
            pressure: resolve(pressure.as_ref().copied(), previous.pressure),
            temperature_deci_c: resolve(temperature.as_ref().copied(), previous.temperature_deci_c),
            spo2_percent: resolve(vitals.as_ref().map(|v| v.spo2_percent), previous.spo2_percent),
            heart_rate_bpm: resolve(vitals.as_ref().map(|v| v.heart_rate_bpm), previous.heart_rate_bpm),
            apnea,
        };
        log::debug!("{:?}", record);

        let sent = self.send_record(&record);
        self.observe_sink(sent);
        self.previous = record;

        self.wait_for_next_cycle(cycle_start);
        record
    }

    /// Cycles forever.
    pub fn run(mut self) -> ! {
        loop {
            self.run_cycle();
        }
    }

    fn read_code(&mut self, channel: AdcChannel) -> Result<u16, MonitorError<A::Error>> {
        let result = self.adc.read_channel(channel).map(|sample| sample.code);
        self.adc_health.observe(result)
    }

    fn wait_for_next_cycle(&mut self, cycle_start: Tick) {
        let elapsed = self.clock.now().elapsed_since(cycle_start);
        match self.config.cycle_period_ms.checked_sub(elapsed) {
            Some(remaining) if remaining > 0 => self.clock.delay_ms(remaining),
            _ => log::debug!("cycle took {} ms, no wait", elapsed),
        }
    }

    fn observe_sink(&mut self, sent: Result<(), MonitorError<S::Error>>) {
        if let Err(MonitorError::Format) = self.sink_health.observe(sent) {
            log::warn!("{:?}: line did not fit {} bytes", Device::Sink, TELEMETRY_LINE_CAPACITY);
        }
    }

    fn send_record(&mut self, record: &TelemetryRecord) -> Result<(), MonitorError<S::Error>> {
        let line = record.format_line()?;
        self.write_line(&line)
    }

    fn announce_part_id(&mut self, part_id: u8) -> Result<(), MonitorError<S::Error>> {
        let line = part_id_line(part_id)?;
        self.write_line(&line)
    }

    // A byte the sink will not take aborts the rest of the line.
    fn write_line(&mut self, line: &str) -> Result<(), MonitorError<S::Error>> {
        for byte in line.bytes() {
            poll_bounded(&mut self.sink, timing::SINK_POLL_LIMIT, |sink| sink.write_byte(byte))?;
        }
        Ok(())
    }
}
