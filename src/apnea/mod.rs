// src/apnea/mod.rs

use crate::common::Tick;

/// Externally visible state of the breath monitor.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum BreathPhase {
    Breathing,
    Apnea,
}

/// Last qualifying breath and whether the alarm is raised.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct BreathState {
    pub last_breath_tick: Tick,
    pub alarm_asserted: bool,
}

/// Breath/apnea state machine.
///
/// No hysteresis: one sample above the threshold clears the alarm, and the
/// alarm is raised on the first evaluation where the gap strictly exceeds the window.
#[derive(Debug, Clone)]
pub struct ApneaDetector {
    threshold: u16,
    window_ms: u32,
    state: BreathState,
}

impl ApneaDetector {
    /// Starts in `Breathing`, counting the window from `now`.
    pub fn new(threshold: u16, window_ms: u32, now: Tick) -> Self {
        ApneaDetector {
            threshold,
            window_ms,
            state: BreathState {
                last_breath_tick: now,
                alarm_asserted: false,
            },
        }
    }

    /// Restarts the window from `now` with the alarm cleared.
    pub fn rearm(&mut self, now: Tick) {
        self.state = BreathState {
            last_breath_tick: now,
            alarm_asserted: false,
        };
    }

    pub fn state(&self) -> &BreathState {
        &self.state
    }

    pub fn phase(&self) -> BreathPhase {
        if self.state.alarm_asserted {
            BreathPhase::Apnea
        } else {
            BreathPhase::Breathing
        }
    }

    pub fn alarm_asserted(&self) -> bool {
        self.state.alarm_asserted
    }

    /// Milliseconds since the last qualifying breath, as seen at `now`.
    pub fn elapsed_since_breath(&self, now: Tick) -> u32 {
        now.elapsed_since(self.state.last_breath_tick)
    }

    /// Runs one evaluation.
    ///
    /// `pressure` is `None` when the reading could not be acquired; that never
    /// counts as a breath, so a failed sensor still ends in the alarm.
    pub fn evaluate(&mut self, pressure: Option<u16>, now: Tick) -> BreathPhase {
        let previous = self.phase();

        if pressure.is_some_and(|p| p > self.threshold) {
            self.state.last_breath_tick = now;
            self.state.alarm_asserted = false;
        } else if self.elapsed_since_breath(now) > self.window_ms {
            self.state.alarm_asserted = true;
        }

        let phase = self.phase();
        match (previous, phase) {
            (BreathPhase::Breathing, BreathPhase::Apnea) => {
                log::warn!("apnea: no breath for {} ms", self.elapsed_since_breath(now));
            }
            (BreathPhase::Apnea, BreathPhase::Breathing) => {
                log::info!("apnea: breathing resumed at {}", now);
            }
            _ => {}
        }
        phase
    }
}
