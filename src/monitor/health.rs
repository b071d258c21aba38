// src/monitor/health.rs

use crate::common::error::{Device, MonitorError};
use core::fmt::Debug;

/// Consecutive-failure tracking for one device.
///
/// Every failed operation (timeout or transport error) counts; one success
/// resets the count. At `threshold` failures the device is reported as not
/// responding until it answers again.
#[derive(Debug, Clone)]
pub struct DeviceHealth {
    device: Device,
    threshold: u8,
    consecutive_failures: u8,
}

impl DeviceHealth {
    pub const fn new(device: Device, threshold: u8) -> Self {
        DeviceHealth {
            device,
            threshold,
            consecutive_failures: 0,
        }
    }

    pub fn device(&self) -> Device {
        self.device
    }

    pub fn consecutive_failures(&self) -> u8 {
        self.consecutive_failures
    }

    /// False once the failure threshold has been reached.
    pub fn is_responding(&self) -> bool {
        self.consecutive_failures < self.threshold.max(1)
    }

    /// Folds one operation result into the health record.
    ///
    /// Transient failures turn into `DeviceNotResponding` once the threshold is
    /// reached; other errors pass through unchanged.
    pub fn observe<T, E: Debug>(&mut self, result: Result<T, MonitorError<E>>) -> Result<T, MonitorError<E>> {
        match result {
            Ok(value) => {
                if !self.is_responding() {
                    log::info!("{:?} responding again", self.device);
                }
                self.consecutive_failures = 0;
                Ok(value)
            }
            Err(e) if e.is_transient() => {
                let was_responding = self.is_responding();
                self.consecutive_failures = self.consecutive_failures.saturating_add(1);
                if self.is_responding() {
                    log::warn!("{:?} failed: {:?}", self.device, e);
                    Err(e)
                } else {
                    if was_responding {
                        log::error!(
                            "{:?} not responding after {} consecutive failures",
                            self.device,
                            self.consecutive_failures
                        );
                    }
                    Err(MonitorError::DeviceNotResponding { device: self.device })
                }
            }
            Err(e) => Err(e),
        }
    }
}
