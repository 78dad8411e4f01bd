//! Generic interrupt-to-queue bridge
//!
//! One `IrqBridge` is bound per interrupt source at registration time. It
//! owns whatever the handler needs to capture (pin number, timer state) and
//! a reference to the queue its consumer task reads. `fire()` is the whole
//! interrupt body: capture, enqueue without blocking, report the wake hint.

use embassy_sync::blocking_mutex::raw::RawMutex;

use crate::queue::{EventQueue, SendOutcome};

/// Something that produces one event per interrupt
///
/// `capture` runs in interrupt context. It must not block, allocate or
/// take a lock a task could hold.
pub trait IrqSource {
    type Event;

    fn capture(&mut self) -> Self::Event;
}

/// Interrupt handler state bound to one source and one queue
pub struct IrqBridge<'q, S, M, const N: usize>
where
    S: IrqSource,
    M: RawMutex,
{
    source: S,
    queue: &'q EventQueue<M, S::Event, N>,
    fired: u32,
}

impl<'q, S, M, const N: usize> IrqBridge<'q, S, M, N>
where
    S: IrqSource,
    M: RawMutex,
{
    pub fn new(source: S, queue: &'q EventQueue<M, S::Event, N>) -> Self {
        Self {
            source,
            queue,
            fired: 0,
        }
    }

    /// Handle one interrupt
    #[inline]
    pub fn fire(&mut self) -> SendOutcome {
        self.fired = self.fired.wrapping_add(1);
        let event = self.source.capture();
        self.queue.send_from_isr(event)
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn queue(&self) -> &'q EventQueue<M, S::Event, N> {
        self.queue
    }

    /// Interrupts handled so far
    pub fn fired(&self) -> u32 {
        self.fired
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queue::{IsrQueue, OverflowPolicy, SendStatus};

    struct Sequence(u16);

    impl IrqSource for Sequence {
        type Event = u16;

        fn capture(&mut self) -> u16 {
            self.0 += 1;
            self.0
        }
    }

    #[test]
    fn test_fire_captures_and_enqueues() {
        let queue: IsrQueue<u16, 4> = IsrQueue::new(OverflowPolicy::DropNewest);
        let mut bridge = IrqBridge::new(Sequence(0), &queue);

        assert_eq!(bridge.fire().status, SendStatus::Queued);
        assert_eq!(bridge.fire().status, SendStatus::Queued);
        assert_eq!(bridge.fired(), 2);
        assert_eq!(queue.try_receive(), Some(1));
        assert_eq!(queue.try_receive(), Some(2));
    }

    #[test]
    fn test_fired_counts_dropped_interrupts() {
        let queue: IsrQueue<u16, 2> = IsrQueue::new(OverflowPolicy::DropNewest);
        let mut bridge = IrqBridge::new(Sequence(0), &queue);

        for _ in 0..5 {
            bridge.fire();
        }
        assert_eq!(bridge.fired(), 5);
        assert_eq!(bridge.queue().len(), 2);
        assert_eq!(queue.dropped(), 3);
        assert_eq!(bridge.source().0, 5);
    }
}
