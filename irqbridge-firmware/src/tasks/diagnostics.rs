//! Queue diagnostics task
//!
//! Interrupt-side overflow never logs; this task reads and resets the
//! drop counters periodically and reports them.

use defmt::*;
use embassy_time::{Duration, Ticker};
use irqbridge_core::AppContext;

/// Reporting period
const DIAGNOSTICS_INTERVAL_S: u64 = 5;

#[embassy_executor::task]
pub async fn diagnostics_task(ctx: &'static AppContext) {
    info!("Diagnostics task started");

    let mut ticker = Ticker::every(Duration::from_secs(DIAGNOSTICS_INTERVAL_S));
    loop {
        ticker.next().await;

        let drops = ctx.take_drop_counts();
        if drops.total() > 0 {
            warn!(
                "Dropped events: gpio {} timers {} counter {}",
                drops.gpio, drops.timers, drops.counter
            );
        }

        for (i, queue) in ctx.gpio_queues().iter().enumerate() {
            debug!("gpio queue {}: {}/{}", i, queue.len(), queue.capacity());
        }
        debug!(
            "timer queue: {}/{}, counter queue: {}/{}",
            ctx.timer_queue().len(),
            ctx.timer_queue().capacity(),
            ctx.counter_queue().len(),
            ctx.counter_queue().capacity()
        );
    }
}
