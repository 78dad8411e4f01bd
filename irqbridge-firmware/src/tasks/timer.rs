//! Timer consumer task
//!
//! Serves every alarm timer from the shared queue. Each report shows the
//! counter captured by the interrupt handler and a second read of the
//! live counter taken here.

use defmt::*;
use irqbridge_core::timer::{TimerConsumer, TimerQueue};
use irqbridge_hal_rp2040::{RpCounters, RP2040_LIMITS};

fn ticks_to_us(ticks: u64, divider: u32) -> u64 {
    RP2040_LIMITS.ticks_to_us(ticks, divider)
}

#[embassy_executor::task]
pub async fn timer_task(queue: &'static TimerQueue) {
    info!("Timer task started");

    let consumer = TimerConsumer::new(queue, RpCounters);
    loop {
        let report = consumer.next_report().await;
        let timer = report.event.timer;

        let mode = if timer.auto_reload { "auto-reload" } else { "one-shot" };
        info!(
            "Timer {}.{} alarm ({}): event counter {} ({} us), alarm {}",
            timer.id.group,
            timer.id.index,
            mode,
            report.event.counter,
            ticks_to_us(report.event.counter, timer.divider),
            report.event.alarm
        );
        info!(
            "Timer {}.{} task counter {} ({} us)",
            timer.id.group,
            timer.id.index,
            report.live_counter,
            ticks_to_us(report.live_counter, timer.divider)
        );
    }
}
