//! Application context
//!
//! Built once at startup from the validated configuration and then shared
//! by reference with every handler and task. It owns all pipeline queues.

use heapless::Vec;

use crate::config::{BridgeConfig, MAX_GPIO_SOURCES};
use crate::demo::CounterQueue;
use crate::gpio::GpioQueue;
use crate::queue::OverflowPolicy;
use crate::timer::TimerQueue;

/// Drop counters collected from every queue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DropCounts {
    pub gpio: [u32; MAX_GPIO_SOURCES],
    pub timers: u32,
    pub counter: u32,
}

impl DropCounts {
    /// Sum of every counter, saturating at `u32::MAX`
    pub fn total(&self) -> u32 {
        self.gpio
            .iter()
            .chain([&self.timers, &self.counter])
            .fold(0u32, |total, &n| total.saturating_add(n))
    }
}

pub struct AppContext {
    gpio: Vec<GpioQueue, MAX_GPIO_SOURCES>,
    timers: TimerQueue,
    counter: CounterQueue,
}

impl AppContext {
    /// One queue per GPIO source, one shared timer queue, one demo queue
    pub fn new(config: &BridgeConfig) -> Self {
        let mut gpio = Vec::new();
        for src in &config.gpio {
            // Config holds at most MAX_GPIO_SOURCES entries
            let _ = gpio.push(GpioQueue::new(src.overflow));
        }
        Self {
            gpio,
            timers: TimerQueue::new(config.timers.overflow),
            // Task-side producer blocks instead; policy only matters for ISR sends
            counter: CounterQueue::new(OverflowPolicy::DropNewest),
        }
    }

    /// Queue of the `index`-th GPIO source, in config order
    pub fn gpio_queue(&self, index: usize) -> Option<&GpioQueue> {
        self.gpio.get(index)
    }

    pub fn gpio_queues(&self) -> &[GpioQueue] {
        &self.gpio
    }

    pub fn timer_queue(&self) -> &TimerQueue {
        &self.timers
    }

    pub fn counter_queue(&self) -> &CounterQueue {
        &self.counter
    }

    /// Read and reset every drop counter
    pub fn take_drop_counts(&self) -> DropCounts {
        let mut counts = DropCounts::default();
        for (slot, queue) in counts.gpio.iter_mut().zip(self.gpio.iter()) {
            *slot = queue.take_dropped();
        }
        counts.timers = self.timers.take_dropped();
        counts.counter = self.counter.take_dropped();
        counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gpio::{EdgeBridge, EdgeSource};

    #[test]
    fn test_queues_follow_config() {
        let mut config = BridgeConfig::default();
        config.gpio[1].overflow = OverflowPolicy::DropOldest;
        let ctx = AppContext::new(&config);

        assert_eq!(ctx.gpio_queues().len(), 2);
        assert_eq!(ctx.gpio_queue(0).map(|q| q.policy()), Some(OverflowPolicy::DropNewest));
        assert_eq!(ctx.gpio_queue(1).map(|q| q.policy()), Some(OverflowPolicy::DropOldest));
        assert!(ctx.gpio_queue(2).is_none());
        assert_eq!(ctx.timer_queue().capacity(), 10);
    }

    #[test]
    fn test_drop_counts() {
        let ctx = AppContext::new(&BridgeConfig::default());
        let mut bridge = EdgeBridge::new(EdgeSource::new(5), ctx.gpio_queue(1).unwrap());
        for _ in 0..13 {
            bridge.fire();
        }

        let counts = ctx.take_drop_counts();
        assert_eq!(counts.gpio, [0, 3]);
        assert_eq!(counts.total(), 3);
        assert_eq!(ctx.take_drop_counts().total(), 0);
    }

    #[test]
    fn test_drop_total_saturates() {
        let counts = DropCounts {
            gpio: [u32::MAX, 1],
            timers: 2,
            counter: 0,
        };
        assert_eq!(counts.total(), u32::MAX);
    }
}
