//! Edge watcher
//!
//! Runs on the interrupt executor. Each wake-up from the GPIO interrupt is
//! one edge: the bridge records the pin and enqueues it without waiting.
//! Nothing is logged here; overflow shows up in the drop counters.

use defmt::*;
use irqbridge_core::gpio::EdgeBridge;
use irqbridge_hal_rp2040::EdgeInput;

#[embassy_executor::task(pool_size = 2)]
pub async fn edge_watch_task(mut input: EdgeInput, mut bridge: EdgeBridge<'static>) {
    info!("Edge watcher started on pin {} ({})", input.pin(), input.edge());

    loop {
        input.wait().await;
        bridge.fire();
    }
}
