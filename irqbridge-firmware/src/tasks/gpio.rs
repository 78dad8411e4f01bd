//! GPIO consumer task
//!
//! Blocks on its source's queue and reports the pin together with the
//! level read at report time.

use defmt::*;
use irqbridge_core::gpio::{GpioQueue, PinConsumer};
use irqbridge_hal_rp2040::SioLevels;

#[embassy_executor::task(pool_size = 2)]
pub async fn gpio_task(name: &'static str, queue: &'static GpioQueue) {
    info!("{} task started", name);

    let consumer = PinConsumer::new(queue, SioLevels);
    loop {
        let report = consumer.next_report().await;
        info!("GPIO {} interrupt, value: {}", report.pin, report.level.as_u8());
    }
}
