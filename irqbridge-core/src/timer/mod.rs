//! Timer alarm engine
//!
//! Each hardware timer gets an [`AlarmSource`] wrapped in an `IrqBridge`.
//! On every alarm the handler captures the counter, rearms according to
//! the reload mode and forwards a [`TimerEvent`]. A single consumer serves
//! all timers from one shared queue.
//!
//! Rearm policy:
//!
//! - auto-reload: the hardware restarts the counter at the alarm, the
//!   compare register is left alone
//! - one-shot-chained: the next compare value is the compare value that
//!   just fired plus one period, so handler latency never accumulates

mod alarm;
#[cfg(test)]
pub(crate) mod sim;

pub use alarm::AlarmSource;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use irqbridge_hal::{CounterReader, HalError, TimerId};

use crate::irq::IrqBridge;
use crate::queue::{IsrQueue, EVENT_QUEUE_DEPTH};

/// Immutable description of one alarm timer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TimerDescriptor {
    pub id: TimerId,
    /// Alarm interval in microseconds
    pub interval_us: u32,
    pub auto_reload: bool,
    pub divider: u32,
}

impl TimerDescriptor {
    /// Alarm period in timer ticks for a base clock of `source_hz`
    pub fn period_ticks(&self, source_hz: u32) -> Result<u64, HalError> {
        if self.divider == 0 {
            return Err(HalError::UnsupportedDivider(0));
        }
        let ticks_per_sec = u64::from(source_hz / self.divider);
        Ok(u64::from(self.interval_us) * ticks_per_sec / 1_000_000)
    }
}

/// One alarm, as captured in interrupt context
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TimerEvent {
    pub timer: TimerDescriptor,
    /// Counter value read by the handler
    pub counter: u64,
    /// Nominal alarm time in ticks since the timer started
    pub alarm: u64,
}

/// Queue shared by every timer handler
pub type TimerQueue = IsrQueue<TimerEvent, EVENT_QUEUE_DEPTH>;

/// Interrupt handler state for one timer
pub type TimerBridge<'q, H> = IrqBridge<'q, AlarmSource<H>, CriticalSectionRawMutex, EVENT_QUEUE_DEPTH>;

/// What the timer consumer reports per event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TimerReport {
    pub event: TimerEvent,
    /// Second, independent counter read at report time
    pub live_counter: u64,
}

/// Task-side reader for the shared timer queue
pub struct TimerConsumer<'q, C> {
    queue: &'q TimerQueue,
    counters: C,
}

impl<'q, C: CounterReader> TimerConsumer<'q, C> {
    pub fn new(queue: &'q TimerQueue, counters: C) -> Self {
        Self { queue, counters }
    }

    pub async fn next_report(&self) -> TimerReport {
        let event = self.queue.receive().await;
        self.report(event)
    }

    pub fn try_report(&self) -> Option<TimerReport> {
        self.queue.try_receive().map(|event| self.report(event))
    }

    fn report(&self, event: TimerEvent) -> TimerReport {
        TimerReport {
            event,
            live_counter: self.counters.counter(event.timer.id),
        }
    }
}
