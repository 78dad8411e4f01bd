//! Hardware alarm timer abstraction
//!
//! A timer counts up from 0 at `source_hz / divider` and raises its
//! interrupt when the counter reaches the compare value. The `*_in_isr`
//! methods are only called from that timer's own interrupt handler, which
//! is the sole writer of the compare register.

use crate::error::HalError;

/// Counter value of a timer whose count restarted at `base`
///
/// An auto-reload can move `base` past a `now` read just before it; that
/// reads as 0, not as a wrapped value.
pub const fn ticks_since(now: u64, base: u64) -> u64 {
    now.saturating_sub(base)
}

/// Timer group and index, as named by the chip
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TimerId {
    pub group: u8,
    pub index: u8,
}

impl TimerId {
    pub const fn new(group: u8, index: u8) -> Self {
        Self { group, index }
    }
}

/// One-time timer setup request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TimerSetup {
    pub id: TimerId,
    pub divider: u32,
    /// Reset the counter to 0 whenever the alarm fires
    pub auto_reload: bool,
    /// First compare value, in ticks
    pub alarm_ticks: u64,
}

/// Alarm-capable hardware timer
pub trait AlarmTimer {
    fn id(&self) -> TimerId;

    /// Base clock before the divider
    fn source_hz(&self) -> u32;

    /// Program divider, reload mode and first alarm; counter starts at 0
    fn start(&mut self, setup: &TimerSetup) -> Result<(), HalError>;

    /// Clear the pending alarm interrupt
    ///
    /// With auto-reload this is also where the counter restarts from 0.
    fn acknowledge_in_isr(&mut self);

    /// Current counter value
    fn counter_in_isr(&self) -> u64;

    /// Compare value of the alarm that is programmed (or just fired)
    fn alarm_in_isr(&self) -> u64;

    /// Program the next compare value
    fn set_alarm_in_isr(&mut self, ticks: u64);
}

/// Task-side read of a timer's live counter
pub trait CounterReader {
    fn counter(&self, id: TimerId) -> u64;
}

impl<T: CounterReader + ?Sized> CounterReader for &T {
    fn counter(&self, id: TimerId) -> u64 {
        (**self).counter(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ticks_since() {
        assert_eq!(ticks_since(1_500, 1_000), 500);
        assert_eq!(ticks_since(1_000, 1_000), 0);
    }

    #[test]
    fn test_ticks_since_base_moved_ahead() {
        // Counter read at 9_990, then a reload rebased the timer to 10_000
        assert_eq!(ticks_since(9_990, 10_000), 0);
    }
}
