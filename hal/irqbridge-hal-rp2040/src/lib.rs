//! RP2040-specific HAL for irqbridge
//!
//! This crate provides RP2040 implementations of the `irqbridge-hal`
//! traits:
//!
//! - Pin bank for taking GPIOs by number from config
//! - Pin-group configuration and edge-waiting inputs
//! - Live level sampling straight from the SIO input register
//! - Alarm timers on the shared 1 MHz TIMER peripheral

#![no_std]

pub mod gpio;
pub mod pins;
pub mod timer;

use irqbridge_hal::{ChipLimits, PinMask};

/// RP2040 capabilities
///
/// TIMER is one group of four alarms clocked at 1 MHz from the watchdog
/// tick. Alarm 0 is used by the embassy time driver.
pub const RP2040_LIMITS: ChipLimits = ChipLimits {
    gpio_count: 30,
    reserved_pins: PinMask::EMPTY,
    timer_groups: 1,
    timer_index_min: 1,
    timer_index_max: 3,
    timer_source_hz: 1_000_000,
    min_divider: 1,
    max_divider: 1,
};

pub use gpio::{BoardPins, EdgeInput, RpOutput, SioLevels};
pub use pins::{PinBank, PinError};
pub use timer::{RpAlarm, RpCounters};
