use irqbridge_hal::{AlarmTimer, HalError, TimerSetup};

use super::{TimerDescriptor, TimerEvent};
use crate::irq::IrqSource;

/// Interrupt-side state of one alarm timer
///
/// Owns the hardware handle, so the handler bound to this source is the
/// only code that ever writes the compare register.
pub struct AlarmSource<H> {
    hw: H,
    timer: TimerDescriptor,
    period: u64,
    fires: u64,
}

impl<H: AlarmTimer> AlarmSource<H> {
    /// Configure the hardware and arm the first alarm one period out
    pub fn start(mut hw: H, timer: TimerDescriptor) -> Result<Self, HalError> {
        let period = timer.period_ticks(hw.source_hz())?.max(1);
        hw.start(&TimerSetup {
            id: timer.id,
            divider: timer.divider,
            auto_reload: timer.auto_reload,
            alarm_ticks: period,
        })?;
        Ok(Self {
            hw,
            timer,
            period,
            fires: 0,
        })
    }

    pub fn descriptor(&self) -> &TimerDescriptor {
        &self.timer
    }

    /// Alarm period in ticks
    pub fn period(&self) -> u64 {
        self.period
    }
}

impl<H: AlarmTimer> IrqSource for AlarmSource<H> {
    type Event = TimerEvent;

    fn capture(&mut self) -> TimerEvent {
        self.hw.acknowledge_in_isr();
        let counter = self.hw.counter_in_isr();
        self.fires += 1;

        let alarm = if self.timer.auto_reload {
            self.fires * self.period
        } else {
            // Anchor on the compare value that fired, not on the counter
            let fired_at = self.hw.alarm_in_isr();
            self.hw.set_alarm_in_isr(fired_at + self.period);
            fired_at
        };

        TimerEvent {
            timer: self.timer,
            counter,
            alarm,
        }
    }
}
