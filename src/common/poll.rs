// src/common/poll.rs

use super::error::MonitorError;
use core::fmt::Debug;
use nb::Result as NbResult;

/// Executes a non-blocking bus operation (`f`) repeatedly until it stops
/// returning `WouldBlock`, giving up after `limit` attempts.
///
/// This replaces the unbounded ready-flag spins of a bare-metal driver: a
/// device that never raises its flag produces `BusTimeout` instead of a hang.
/// A `limit` of zero is treated as one attempt.
pub fn poll_bounded<IF, T, E, FN>(
    iface: &mut IF,
    limit: u32,
    mut f: FN,
) -> Result<T, MonitorError<E>>
where
    E: Debug,
    FN: FnMut(&mut IF) -> NbResult<T, E>,
{
    let attempts = limit.max(1);
    for _ in 0..attempts {
        match f(iface) {
            Ok(result) => return Ok(result),
            Err(nb::Error::WouldBlock) => core::hint::spin_loop(),
            Err(nb::Error::Other(e)) => return Err(MonitorError::Io(e)),
        }
    }
    Err(MonitorError::BusTimeout)
}

// --- Unit Tests ---
#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Copy, Clone, PartialEq, Eq)]
    struct MockBusError;

    struct MockFlag {
        polls: u32,
        ready_after: Option<u32>,
        fail_at: Option<u32>,
    }

    impl MockFlag {
        fn new(ready_after: Option<u32>) -> Self {
            MockFlag { polls: 0, ready_after, fail_at: None }
        }

        fn poll(&mut self) -> NbResult<u8, MockBusError> {
            self.polls += 1;
            if self.fail_at == Some(self.polls) {
                return Err(nb::Error::Other(MockBusError));
            }
            match self.ready_after {
                Some(n) if self.polls > n => Ok(0xA5),
                _ => Err(nb::Error::WouldBlock),
            }
        }
    }

    #[test]
    fn test_ready_within_limit() {
        let mut flag = MockFlag::new(Some(3));
        let result = poll_bounded(&mut flag, 10, |f| f.poll());
        assert_eq!(result.unwrap(), 0xA5);
        assert_eq!(flag.polls, 4);
    }

    #[test]
    fn test_stuck_flag_times_out() {
        let mut flag = MockFlag::new(None);
        let result = poll_bounded(&mut flag, 25, |f| f.poll());
        assert!(matches!(result, Err(MonitorError::BusTimeout)));
        assert_eq!(flag.polls, 25);
    }

    #[test]
    fn test_ready_on_last_attempt() {
        let mut flag = MockFlag::new(Some(4));
        assert!(poll_bounded(&mut flag, 5, |f| f.poll()).is_ok());
    }

    #[test]
    fn test_io_error_propagates_immediately() {
        let mut flag = MockFlag::new(None);
        flag.fail_at = Some(2);
        let result = poll_bounded(&mut flag, 100, |f| f.poll());
        assert!(matches!(result, Err(MonitorError::Io(MockBusError))));
        assert_eq!(flag.polls, 2);
    }

    #[test]
    fn test_zero_limit_still_polls_once() {
        let mut flag = MockFlag::new(Some(0));
        assert!(poll_bounded(&mut flag, 0, |f| f.poll()).is_ok());
        assert_eq!(flag.polls, 1);
    }
}
