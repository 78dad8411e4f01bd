//! Heartbeat task
//!
//! Logs a running count and drives every output to `count % 2`. Looping
//! the outputs back to the inputs exercises the edge pipeline.

use defmt::*;
use embassy_time::{Duration, Ticker};
use irqbridge_core::demo::Heartbeat;
use irqbridge_hal_rp2040::gpio::{RpOutput, MAX_OUTPUTS};

#[embassy_executor::task]
pub async fn heartbeat_task(mut outputs: heapless::Vec<RpOutput, MAX_OUTPUTS>, period_ms: u32) {
    info!("Heartbeat task started");

    let mut heartbeat = Heartbeat::new();
    let mut ticker = Ticker::every(Duration::from_millis(u64::from(period_ms)));

    loop {
        let count = heartbeat.tick(&mut outputs);
        info!("cnt: {}", count);
        ticker.next().await;
    }
}
