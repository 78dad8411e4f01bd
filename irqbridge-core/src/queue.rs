//! Bounded interrupt-safe event queue
//!
//! A fixed-capacity FIFO written from interrupt context and read from task
//! context. The interrupt-side send holds the lock for a bounded number of
//! instructions and never waits: when the queue is full the configured
//! [`OverflowPolicy`] decides which event is lost, and the loss is counted.
//!
//! Task-side producers can instead wait for room ([`EventQueue::send`]),
//! optionally bounded by any timeout future.

use core::cell::RefCell;
use core::future::{poll_fn, Future};
use core::task::{Context, Poll};

use embassy_futures::select::{select, Either};
use embassy_sync::blocking_mutex::raw::{CriticalSectionRawMutex, RawMutex};
use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::waitqueue::WakerRegistration;
use heapless::Deque;

/// Capacity of every pipeline queue
pub const EVENT_QUEUE_DEPTH: usize = 10;

/// Queue shared between interrupt handlers and tasks
pub type IsrQueue<T, const N: usize> = EventQueue<CriticalSectionRawMutex, T, N>;

/// What an interrupt-side send does when the queue is full
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum OverflowPolicy {
    /// Keep the queued events, discard the new one
    #[default]
    DropNewest,
    /// Discard the oldest queued event to make room
    DropOldest,
}

/// Result of an interrupt-side send
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SendStatus {
    /// Stored, nothing lost
    Queued,
    /// Stored after evicting the oldest event
    Overwrote,
    /// Queue full, event discarded
    Dropped,
}

/// Outcome of [`EventQueue::send_from_isr`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SendOutcome {
    pub status: SendStatus,
    /// A task was waiting on this queue and has been made runnable
    pub task_woken: bool,
}

impl SendOutcome {
    /// The new event is in the queue
    pub fn is_delivered(&self) -> bool {
        self.status != SendStatus::Dropped
    }
}

struct State<T, const N: usize> {
    items: Deque<T, N>,
    dropped: u32,
    receiver: WakerRegistration,
    peeker: WakerRegistration,
    senders: WakerRegistration,
}

#[derive(Clone, Copy)]
enum Reader {
    Receive,
    Peek,
}

impl<T, const N: usize> State<T, N> {
    fn wake_readers(&mut self) {
        self.receiver.wake();
        self.peeker.wake();
    }

    /// Drop a reader's waker without waking it
    fn forget(&mut self, reader: Reader) {
        match reader {
            Reader::Receive => self.receiver = WakerRegistration::new(),
            Reader::Peek => self.peeker = WakerRegistration::new(),
        }
    }
}

/// Unregisters a waiting reader when its future completes or is dropped
///
/// Keeps `SendOutcome::task_woken` false once nobody is waiting.
struct ReaderGuard<'a, M: RawMutex, T, const N: usize> {
    queue: &'a EventQueue<M, T, N>,
    reader: Reader,
}

impl<M: RawMutex, T, const N: usize> Drop for ReaderGuard<'_, M, T, N> {
    fn drop(&mut self) {
        let reader = self.reader;
        self.queue.lock(|s| s.forget(reader));
    }
}

/// Fixed-capacity FIFO of `T`, writable from interrupt context
pub struct EventQueue<M, T, const N: usize>
where
    M: RawMutex,
{
    policy: OverflowPolicy,
    state: Mutex<M, RefCell<State<T, N>>>,
}

impl<M, T, const N: usize> EventQueue<M, T, N>
where
    M: RawMutex,
{
    /// Create an empty queue
    pub const fn new(policy: OverflowPolicy) -> Self {
        Self {
            policy,
            state: Mutex::new(RefCell::new(State {
                items: Deque::new(),
                dropped: 0,
                receiver: WakerRegistration::new(),
                peeker: WakerRegistration::new(),
                senders: WakerRegistration::new(),
            })),
        }
    }

    fn lock<R>(&self, f: impl FnOnce(&mut State<T, N>) -> R) -> R {
        self.state.lock(|cell| f(&mut cell.borrow_mut()))
    }

    /// Enqueue from interrupt context
    ///
    /// Never blocks. On a full queue the overflow policy applies and the
    /// drop counter is incremented.
    pub fn send_from_isr(&self, value: T) -> SendOutcome {
        self.lock(|s| {
            let status = match s.items.push_back(value) {
                Ok(()) => SendStatus::Queued,
                Err(value) => {
                    s.dropped = s.dropped.saturating_add(1);
                    match self.policy {
                        OverflowPolicy::DropNewest => SendStatus::Dropped,
                        OverflowPolicy::DropOldest => {
                            s.items.pop_front();
                            match s.items.push_back(value) {
                                Ok(()) => SendStatus::Overwrote,
                                Err(_) => SendStatus::Dropped,
                            }
                        }
                    }
                }
            };

            let task_woken =
                status != SendStatus::Dropped && (s.receiver.occupied() || s.peeker.occupied());
            if status != SendStatus::Dropped {
                s.wake_readers();
            }
            SendOutcome { status, task_woken }
        })
    }

    /// Enqueue from a task without waiting; hands the value back when full
    pub fn try_send(&self, value: T) -> Result<(), T> {
        self.lock(|s| {
            s.items.push_back(value)?;
            s.wake_readers();
            Ok(())
        })
    }

    /// Enqueue from a task, waiting for room as long as it takes
    pub async fn send(&self, value: T) {
        let mut slot = Some(value);
        self.push_when_ready(&mut slot).await
    }

    /// Enqueue from a task, giving up when `timeout` completes first
    ///
    /// The value is returned on timeout.
    pub async fn send_timeout<F: Future>(&self, value: T, timeout: F) -> Result<(), T> {
        let mut slot = Some(value);
        let sent = select(self.push_when_ready(&mut slot), timeout).await;
        match sent {
            Either::First(()) => Ok(()),
            Either::Second(_) => match slot.take() {
                Some(value) => Err(value),
                None => Ok(()),
            },
        }
    }

    fn push_when_ready<'a>(&'a self, slot: &'a mut Option<T>) -> impl Future<Output = ()> + 'a {
        poll_fn(move |cx| {
            self.lock(|s| {
                let Some(value) = slot.take() else {
                    return Poll::Ready(());
                };
                match s.items.push_back(value) {
                    Ok(()) => {
                        s.wake_readers();
                        Poll::Ready(())
                    }
                    Err(value) => {
                        *slot = Some(value);
                        s.senders.register(cx.waker());
                        Poll::Pending
                    }
                }
            })
        })
    }

    /// Dequeue without waiting
    pub fn try_receive(&self) -> Option<T> {
        self.lock(|s| {
            let value = s.items.pop_front()?;
            s.senders.wake();
            Some(value)
        })
    }

    fn poll_receive(&self, cx: &mut Context<'_>) -> Poll<T> {
        self.lock(|s| match s.items.pop_front() {
            Some(value) => {
                s.senders.wake();
                Poll::Ready(value)
            }
            None => {
                s.receiver.register(cx.waker());
                Poll::Pending
            }
        })
    }

    /// Dequeue, waiting as long as it takes
    pub async fn receive(&self) -> T {
        let _guard = ReaderGuard {
            queue: self,
            reader: Reader::Receive,
        };
        poll_fn(|cx| self.poll_receive(cx)).await
    }

    /// Dequeue, or `None` if `timeout` completes first
    pub async fn receive_timeout<F: Future>(&self, timeout: F) -> Option<T> {
        match select(self.receive(), timeout).await {
            Either::First(value) => Some(value),
            Either::Second(_) => None,
        }
    }

    /// Number of queued events
    pub fn len(&self) -> usize {
        self.lock(|s| s.items.len())
    }

    pub fn is_empty(&self) -> bool {
        self.lock(|s| s.items.is_empty())
    }

    pub fn is_full(&self) -> bool {
        self.lock(|s| s.items.is_full())
    }

    pub const fn capacity(&self) -> usize {
        N
    }

    pub const fn policy(&self) -> OverflowPolicy {
        self.policy
    }

    /// Events lost to overflow since creation or the last `take_dropped`
    pub fn dropped(&self) -> u32 {
        self.lock(|s| s.dropped)
    }

    /// Read and reset the drop counter
    pub fn take_dropped(&self) -> u32 {
        self.lock(|s| core::mem::take(&mut s.dropped))
    }
}

impl<M, T, const N: usize> EventQueue<M, T, N>
where
    M: RawMutex,
    T: Clone,
{
    /// Copy of the front event without removing it
    pub fn try_peek(&self) -> Option<T> {
        self.lock(|s| s.items.front().cloned())
    }

    fn poll_peek(&self, cx: &mut Context<'_>) -> Poll<T> {
        self.lock(|s| match s.items.front() {
            Some(value) => Poll::Ready(value.clone()),
            None => {
                s.peeker.register(cx.waker());
                Poll::Pending
            }
        })
    }

    /// Copy of the front event, waiting until there is one
    pub async fn peek(&self) -> T {
        let _guard = ReaderGuard {
            queue: self,
            reader: Reader::Peek,
        };
        poll_fn(|cx| self.poll_peek(cx)).await
    }

    /// Copy of the front event, or `None` if `timeout` completes first
    pub async fn peek_timeout<F: Future>(&self, timeout: F) -> Option<T> {
        match select(self.peek(), timeout).await {
            Either::First(value) => Some(value),
            Either::Second(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::future::{pending, ready};
    use embassy_futures::{block_on, poll_once, yield_now};
    use proptest::prelude::*;

    type TestQueue<const N: usize> = IsrQueue<u32, N>;

    #[test]
    fn test_fifo_order() {
        let queue: TestQueue<4> = EventQueue::new(OverflowPolicy::DropNewest);
        for v in 1..=3 {
            assert!(queue.send_from_isr(v).is_delivered());
        }
        assert_eq!(queue.try_receive(), Some(1));
        assert_eq!(queue.try_receive(), Some(2));
        assert_eq!(queue.try_receive(), Some(3));
        assert_eq!(queue.try_receive(), None);
    }

    #[test]
    fn test_drop_newest_keeps_old_events() {
        let queue: TestQueue<2> = EventQueue::new(OverflowPolicy::DropNewest);
        queue.send_from_isr(1);
        queue.send_from_isr(2);
        let outcome = queue.send_from_isr(3);

        assert_eq!(outcome.status, SendStatus::Dropped);
        assert!(!outcome.is_delivered());
        assert_eq!(queue.dropped(), 1);
        assert_eq!(queue.try_receive(), Some(1));
        assert_eq!(queue.try_receive(), Some(2));
    }

    #[test]
    fn test_drop_oldest_overwrites() {
        let queue: TestQueue<2> = EventQueue::new(OverflowPolicy::DropOldest);
        queue.send_from_isr(1);
        queue.send_from_isr(2);
        let outcome = queue.send_from_isr(3);

        assert_eq!(outcome.status, SendStatus::Overwrote);
        assert_eq!(queue.dropped(), 1);
        assert_eq!(queue.len(), 2);
        assert_eq!(queue.try_receive(), Some(2));
        assert_eq!(queue.try_receive(), Some(3));
    }

    #[test]
    fn test_take_dropped_resets() {
        let queue: TestQueue<1> = EventQueue::new(OverflowPolicy::DropNewest);
        queue.send_from_isr(1);
        queue.send_from_isr(2);
        queue.send_from_isr(3);
        assert_eq!(queue.take_dropped(), 2);
        assert_eq!(queue.dropped(), 0);
    }

    #[test]
    fn test_task_woken_hint() {
        let queue: TestQueue<4> = EventQueue::new(OverflowPolicy::DropNewest);

        // Nobody waiting yet
        assert!(!queue.send_from_isr(1).task_woken);
        assert_eq!(queue.try_receive(), Some(1));

        // Park a receiver, then fire while it is still waiting
        {
            let mut rx = core::pin::pin!(queue.receive());
            assert!(poll_once(rx.as_mut()).is_pending());
            assert!(queue.send_from_isr(2).task_woken);
            assert_eq!(poll_once(rx.as_mut()), Poll::Ready(2));
        }

        // Receiver finished, nobody left to wake
        assert!(!queue.send_from_isr(3).task_woken);
    }

    #[test]
    fn test_no_task_woken_after_receive_timeout() {
        let queue: TestQueue<4> = EventQueue::new(OverflowPolicy::DropNewest);
        assert_eq!(block_on(queue.receive_timeout(yield_now())), None);
        assert!(!queue.send_from_isr(1).task_woken);
    }

    #[test]
    fn test_no_task_woken_after_dropped_peek() {
        let queue: TestQueue<4> = EventQueue::new(OverflowPolicy::DropNewest);
        {
            let mut peek = core::pin::pin!(queue.peek());
            assert!(poll_once(peek.as_mut()).is_pending());
        }
        assert!(!queue.send_from_isr(1).task_woken);

        // A completed peek leaves nothing registered either
        assert_eq!(block_on(queue.peek()), 1);
        assert!(!queue.send_from_isr(2).task_woken);
    }

    #[test]
    fn test_peek_waiter_is_woken() {
        let queue: TestQueue<4> = EventQueue::new(OverflowPolicy::DropNewest);
        let mut peek = core::pin::pin!(queue.peek());
        assert!(poll_once(peek.as_mut()).is_pending());

        assert!(queue.send_from_isr(4).task_woken);
        assert_eq!(poll_once(peek.as_mut()), Poll::Ready(4));
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn test_receive_waits_for_event() {
        let queue: TestQueue<4> = EventQueue::new(OverflowPolicy::DropNewest);
        let mut rx = core::pin::pin!(queue.receive());
        assert!(poll_once(rx.as_mut()).is_pending());

        queue.send_from_isr(7);
        assert_eq!(poll_once(rx.as_mut()), Poll::Ready(7));
    }

    #[test]
    fn test_receive_timeout_on_empty() {
        let queue: TestQueue<4> = EventQueue::new(OverflowPolicy::DropNewest);
        assert_eq!(block_on(queue.receive_timeout(ready(()))), None);

        queue.send_from_isr(5);
        assert_eq!(block_on(queue.receive_timeout(ready(()))), Some(5));
    }

    #[test]
    fn test_peek_on_empty_times_out() {
        let queue: TestQueue<4> = EventQueue::new(OverflowPolicy::DropNewest);
        assert_eq!(block_on(queue.peek_timeout(ready(()))), None);
        assert_eq!(queue.try_peek(), None);
    }

    #[test]
    fn test_peek_is_idempotent() {
        let queue: TestQueue<4> = EventQueue::new(OverflowPolicy::DropNewest);
        queue.send_from_isr(10);
        queue.send_from_isr(11);

        for _ in 0..3 {
            assert_eq!(block_on(queue.peek_timeout(ready(()))), Some(10));
            assert_eq!(queue.len(), 2);
        }
        assert_eq!(queue.try_receive(), Some(10));
        assert_eq!(queue.try_peek(), Some(11));
    }

    #[test]
    fn test_blocking_send_waits_for_room() {
        let queue: TestQueue<1> = EventQueue::new(OverflowPolicy::DropNewest);
        assert_eq!(queue.try_send(1), Ok(()));
        assert_eq!(queue.try_send(2), Err(2));

        let mut tx = core::pin::pin!(queue.send(2));
        assert!(poll_once(tx.as_mut()).is_pending());

        assert_eq!(queue.try_receive(), Some(1));
        assert_eq!(poll_once(tx.as_mut()), Poll::Ready(()));
        assert_eq!(queue.try_receive(), Some(2));
        // Task-side sends never count as drops
        assert_eq!(queue.dropped(), 0);
    }

    #[test]
    fn test_send_timeout_returns_value() {
        let queue: TestQueue<1> = EventQueue::new(OverflowPolicy::DropNewest);
        queue.try_send(1).unwrap();

        assert_eq!(block_on(queue.send_timeout(9, ready(()))), Err(9));
        assert_eq!(queue.len(), 1);

        queue.try_receive();
        assert_eq!(block_on(queue.send_timeout(9, pending::<()>())), Ok(()));
        assert_eq!(queue.try_peek(), Some(9));
    }

    #[test]
    fn test_diagnostics() {
        let queue: TestQueue<3> = EventQueue::new(OverflowPolicy::DropOldest);
        assert_eq!(queue.capacity(), 3);
        assert_eq!(queue.policy(), OverflowPolicy::DropOldest);
        assert!(queue.is_empty());
        for v in 0..3 {
            queue.send_from_isr(v);
        }
        assert!(queue.is_full());
    }

    proptest! {
        #[test]
        fn prop_burst_never_exceeds_capacity(burst in 0usize..64, drop_oldest in any::<bool>()) {
            let policy = if drop_oldest { OverflowPolicy::DropOldest } else { OverflowPolicy::DropNewest };
            let queue: TestQueue<EVENT_QUEUE_DEPTH> = EventQueue::new(policy);

            for v in 0..burst as u32 {
                queue.send_from_isr(v);
            }

            let kept = burst.min(EVENT_QUEUE_DEPTH);
            prop_assert_eq!(queue.len(), kept);
            prop_assert_eq!(queue.dropped() as usize, burst - kept);

            // Survivors are contiguous and in order
            let first = if drop_oldest { (burst - kept) as u32 } else { 0 };
            for expected in first..first + kept as u32 {
                prop_assert_eq!(queue.try_receive(), Some(expected));
            }
            prop_assert_eq!(queue.try_receive(), None);
        }

        #[test]
        fn prop_interleaved_fifo(ops in proptest::collection::vec(any::<bool>(), 0..200)) {
            let queue: TestQueue<EVENT_QUEUE_DEPTH> = EventQueue::new(OverflowPolicy::DropNewest);
            let mut next = 0u32;
            let mut expected = std::collections::VecDeque::new();

            for send in ops {
                if send {
                    if queue.send_from_isr(next).is_delivered() {
                        expected.push_back(next);
                    }
                    next += 1;
                } else {
                    prop_assert_eq!(queue.try_receive(), expected.pop_front());
                }
            }
        }
    }
}
