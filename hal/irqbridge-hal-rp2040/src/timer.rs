//! Alarm timers on the RP2040 TIMER peripheral
//!
//! The TIMER is a single free-running 64-bit microsecond counter with four
//! 32-bit compare alarms. It cannot be reset or divided, so each alarm
//! keeps a base timestamp and reports counts relative to it:
//!
//! - counter starts at 0: the base is taken in `start`
//! - auto-reload: on acknowledge the base moves to the alarm that fired
//!   and the same period is armed again
//!
//! The base is published to `RpCounters` so tasks see the same counter the
//! interrupt handler does.

use core::cell::Cell;

use critical_section::Mutex;
use embassy_rp::pac;
use irqbridge_hal::{ticks_since, AlarmTimer, CounterReader, HalError, TimerId, TimerSetup};

use crate::RP2040_LIMITS;

const ALARM_COUNT: usize = 4;

/// Counter base of each alarm, in raw TIMER microseconds
static BASES: [Mutex<Cell<u64>>; ALARM_COUNT] = [
    Mutex::new(Cell::new(0)),
    Mutex::new(Cell::new(0)),
    Mutex::new(Cell::new(0)),
    Mutex::new(Cell::new(0)),
];

/// Raw 64-bit TIMER value
fn now() -> u64 {
    let timer = pac::TIMER;
    loop {
        let hi = timer.timerawh().read();
        let lo = timer.timerawl().read();
        if timer.timerawh().read() == hi {
            return (u64::from(hi) << 32) | u64::from(lo);
        }
    }
}

fn publish_base(index: usize, base: u64) {
    critical_section::with(|cs| BASES[index].borrow(cs).set(base));
}

/// One hardware alarm (TIMER alarm 1, 2 or 3)
pub struct RpAlarm {
    index: usize,
    auto_reload: bool,
    period: u64,
    base: u64,
    target: u64,
}

impl RpAlarm {
    pub fn new(id: TimerId) -> Result<Self, HalError> {
        RP2040_LIMITS.check_timer(id)?;
        Ok(Self {
            index: id.index as usize,
            auto_reload: false,
            period: 0,
            base: 0,
            target: 0,
        })
    }

    /// Program the compare register for the absolute time `target`
    fn arm(&mut self, target: u64) {
        let timer = pac::TIMER;
        self.target = target;
        timer.alarm(self.index).write_value(target as u32);

        // Compare only matches on equality; force the interrupt if the
        // target is already behind us
        if now() >= target {
            timer.intf().modify(|w| w.set_alarm(self.index, true));
        }
    }
}

impl AlarmTimer for RpAlarm {
    fn id(&self) -> TimerId {
        TimerId::new(0, self.index as u8)
    }

    fn source_hz(&self) -> u32 {
        RP2040_LIMITS.timer_source_hz
    }

    fn start(&mut self, setup: &TimerSetup) -> Result<(), HalError> {
        RP2040_LIMITS.check_timer(setup.id)?;
        RP2040_LIMITS.check_divider(setup.divider)?;

        self.index = setup.id.index as usize;
        self.auto_reload = setup.auto_reload;
        self.period = setup.alarm_ticks;
        self.base = now();
        publish_base(self.index, self.base);

        pac::TIMER.inte().modify(|w| w.set_alarm(self.index, true));
        self.arm(self.base + setup.alarm_ticks);
        Ok(())
    }

    fn acknowledge_in_isr(&mut self) {
        let timer = pac::TIMER;
        timer.intf().modify(|w| w.set_alarm(self.index, false));
        timer.intr().write(|w| w.set_alarm(self.index, true));

        if self.auto_reload {
            self.base = self.target;
            publish_base(self.index, self.base);
            self.arm(self.base + self.period);
        }
    }

    fn counter_in_isr(&self) -> u64 {
        ticks_since(now(), self.base)
    }

    fn alarm_in_isr(&self) -> u64 {
        self.target - self.base
    }

    fn set_alarm_in_isr(&mut self, ticks: u64) {
        self.arm(self.base + ticks);
    }
}

/// Task-side counter reads for every alarm
#[derive(Debug, Clone, Copy, Default)]
pub struct RpCounters;

impl CounterReader for RpCounters {
    fn counter(&self, id: TimerId) -> u64 {
        let index = id.index as usize;
        if index >= ALARM_COUNT {
            return 0;
        }
        // Counter and base must come from one critical section
        critical_section::with(|cs| ticks_since(now(), BASES[index].borrow(cs).get()))
    }
}
