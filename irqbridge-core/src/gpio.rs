//! GPIO edge dispatch
//!
//! The interrupt side only records which pin fired. The level is sampled
//! by the consumer when it gets around to reporting, so under fast toggling
//! the reported level can differ from the level that caused the edge.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use irqbridge_hal::{Level, LevelReader};

use crate::irq::{IrqBridge, IrqSource};
use crate::queue::{IsrQueue, EVENT_QUEUE_DEPTH};

/// One edge on one pin
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct GpioEvent {
    pub pin: u8,
}

/// Queue carrying edges of one GPIO source
pub type GpioQueue = IsrQueue<GpioEvent, EVENT_QUEUE_DEPTH>;

/// Edge-interrupt source for a single pin
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EdgeSource {
    pin: u8,
}

impl EdgeSource {
    pub const fn new(pin: u8) -> Self {
        Self { pin }
    }

    pub const fn pin(&self) -> u8 {
        self.pin
    }
}

impl IrqSource for EdgeSource {
    type Event = GpioEvent;

    fn capture(&mut self) -> GpioEvent {
        GpioEvent { pin: self.pin }
    }
}

/// Interrupt handler state for one pin
pub type EdgeBridge<'q> = IrqBridge<'q, EdgeSource, CriticalSectionRawMutex, EVENT_QUEUE_DEPTH>;

/// What a pin consumer reports per event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct GpioReport {
    pub pin: u8,
    /// Level sampled at report time
    pub level: Level,
}

/// Task-side reader for one GPIO queue
pub struct PinConsumer<'q, L> {
    queue: &'q GpioQueue,
    levels: L,
}

impl<'q, L: LevelReader> PinConsumer<'q, L> {
    pub fn new(queue: &'q GpioQueue, levels: L) -> Self {
        Self { queue, levels }
    }

    /// Wait for the next edge and sample the pin's live level
    pub async fn next_report(&self) -> GpioReport {
        let event = self.queue.receive().await;
        self.report(event)
    }

    /// Report a queued edge if there is one
    pub fn try_report(&self) -> Option<GpioReport> {
        self.queue.try_receive().map(|event| self.report(event))
    }

    fn report(&self, event: GpioEvent) -> GpioReport {
        GpioReport {
            pin: event.pin,
            level: self.levels.level(event.pin),
        }
    }
}
