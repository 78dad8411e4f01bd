//! Counter producer and peek consumer

use defmt::*;
use embassy_futures::yield_now;
use embassy_time::{Duration, Timer};
use irqbridge_core::demo::{CounterProducer, CounterQueue, PeekConsumer};

/// Push 1, 2, 3... into the queue, parking whenever it is full
#[embassy_executor::task]
pub async fn counter_task(queue: &'static CounterQueue) {
    info!("Counter task started");

    let mut producer = CounterProducer::new(queue);
    loop {
        producer.step().await;
        // One value per scheduler pass
        yield_now().await;
    }
}

/// Report the front of the queue without removing it
#[embassy_executor::task]
pub async fn peek_task(queue: &'static CounterQueue, timeout_ms: u32, interval_ms: u32) {
    info!("Peek task started");

    let consumer = PeekConsumer::new(queue);
    let timeout = Duration::from_millis(u64::from(timeout_ms));
    let interval = Duration::from_millis(u64::from(interval_ms));

    loop {
        if let Some(value) = consumer.peek(Timer::after(timeout)).await {
            info!("peek: {}", value);
            Timer::after(interval).await;
        }
    }
}
