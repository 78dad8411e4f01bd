//! Producer/peek demo and heartbeat
//!
//! The producer pushes successive integers into a queue, waiting whenever
//! it is full. The peek consumer looks at the front element on a cadence
//! and never removes it, so once the queue fills the producer stays parked
//! and the peeked value stays the same.

use core::future::Future;

use irqbridge_hal::{Level, OutputPin};

use crate::queue::{IsrQueue, EVENT_QUEUE_DEPTH};

/// Queue between the counter producer and the peek consumer
pub type CounterQueue = IsrQueue<u32, EVENT_QUEUE_DEPTH>;

/// Free-running counter, first value 1, wraps on overflow
#[derive(Debug, Default)]
pub struct Counter {
    value: u32,
}

impl Counter {
    pub const fn new() -> Self {
        Self { value: 0 }
    }

    pub fn next(&mut self) -> u32 {
        self.value = self.value.wrapping_add(1);
        self.value
    }
}

/// Counter task state
pub struct CounterProducer<'q> {
    queue: &'q CounterQueue,
    counter: Counter,
}

impl<'q> CounterProducer<'q> {
    pub fn new(queue: &'q CounterQueue) -> Self {
        Self {
            queue,
            counter: Counter::new(),
        }
    }

    /// Produce one value, waiting for room
    pub async fn step(&mut self) -> u32 {
        let value = self.counter.next();
        self.queue.send(value).await;
        value
    }
}

/// Peek task state
pub struct PeekConsumer<'q> {
    queue: &'q CounterQueue,
}

impl<'q> PeekConsumer<'q> {
    pub fn new(queue: &'q CounterQueue) -> Self {
        Self { queue }
    }

    /// Front value, or `None` if the queue stayed empty until `timeout`
    pub async fn peek<F: Future>(&self, timeout: F) -> Option<u32> {
        self.queue.peek_timeout(timeout).await
    }
}

/// Heartbeat counter driving the output pin group
///
/// Every tick reports `n` and drives all outputs to `n % 2`, which produces
/// edges on any input looped back to an output.
#[derive(Debug, Default)]
pub struct Heartbeat {
    count: u32,
}

impl Heartbeat {
    pub const fn new() -> Self {
        Self { count: 0 }
    }

    pub fn tick<P: OutputPin>(&mut self, outputs: &mut [P]) -> u32 {
        let n = self.count;
        let level = Level::from_parity(n);
        for pin in outputs.iter_mut() {
            pin.set_level(level);
        }
        self.count = n.wrapping_add(1);
        n
    }
}
