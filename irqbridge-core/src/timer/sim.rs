//! Simulated alarm timer for host tests
//!
//! Models an up-counter with a compare register, optional auto-reload at
//! the alarm instant, and a configurable delay between the alarm and the
//! handler running.

use core::cell::Cell;

use irqbridge_hal::{AlarmTimer, CounterReader, HalError, TimerId, TimerSetup};

pub(crate) struct SimHardware {
    source_hz: u32,
    id: Cell<TimerId>,
    divider: Cell<u32>,
    auto_reload: Cell<bool>,
    /// Absolute ticks since start
    now: Cell<u64>,
    /// Absolute tick at which the counter last read 0
    base: Cell<u64>,
    /// Compare value, in counter ticks
    compare: Cell<u64>,
    pending: Cell<bool>,
    set_alarm_calls: Cell<u32>,
}

impl SimHardware {
    pub(crate) fn new(source_hz: u32) -> Self {
        Self {
            source_hz,
            id: Cell::new(TimerId::new(0, 0)),
            divider: Cell::new(1),
            auto_reload: Cell::new(false),
            now: Cell::new(0),
            base: Cell::new(0),
            compare: Cell::new(0),
            pending: Cell::new(false),
            set_alarm_calls: Cell::new(0),
        }
    }

    pub(crate) fn timer(&self) -> SimTimer<'_> {
        SimTimer { hw: self }
    }

    /// Run time forward to the next alarm, then `latency` more ticks
    ///
    /// Returns the absolute tick the alarm fired at.
    pub(crate) fn fire_next(&self, latency: u64) -> u64 {
        assert!(!self.pending.get(), "previous alarm was never acknowledged");
        let fired_at = (self.base.get() + self.compare.get()).max(self.now.get());
        if self.auto_reload.get() {
            self.base.set(fired_at);
        }
        self.now.set(fired_at + latency);
        self.pending.set(true);
        fired_at
    }

    pub(crate) fn advance(&self, ticks: u64) {
        self.now.set(self.now.get() + ticks);
    }

    pub(crate) fn counter_now(&self) -> u64 {
        self.now.get() - self.base.get()
    }

    pub(crate) fn compare(&self) -> u64 {
        self.compare.get()
    }

    pub(crate) fn divider(&self) -> u32 {
        self.divider.get()
    }

    pub(crate) fn set_alarm_calls(&self) -> u32 {
        self.set_alarm_calls.get()
    }
}

impl CounterReader for SimHardware {
    fn counter(&self, _id: TimerId) -> u64 {
        self.counter_now()
    }
}

pub(crate) struct SimTimer<'a> {
    hw: &'a SimHardware,
}

impl AlarmTimer for SimTimer<'_> {
    fn id(&self) -> TimerId {
        self.hw.id.get()
    }

    fn source_hz(&self) -> u32 {
        self.hw.source_hz
    }

    fn start(&mut self, setup: &TimerSetup) -> Result<(), HalError> {
        if setup.divider == 0 {
            return Err(HalError::UnsupportedDivider(0));
        }
        self.hw.id.set(setup.id);
        self.hw.divider.set(setup.divider);
        self.hw.auto_reload.set(setup.auto_reload);
        self.hw.base.set(self.hw.now.get());
        self.hw.compare.set(setup.alarm_ticks);
        Ok(())
    }

    fn acknowledge_in_isr(&mut self) {
        self.hw.pending.set(false);
    }

    fn counter_in_isr(&self) -> u64 {
        self.hw.counter_now()
    }

    fn alarm_in_isr(&self) -> u64 {
        self.hw.compare.get()
    }

    fn set_alarm_in_isr(&mut self, ticks: u64) {
        self.hw.set_alarm_calls.set(self.hw.set_alarm_calls.get() + 1);
        self.hw.compare.set(ticks);
    }
}
