//! Chip capability limits
//!
//! Each chip HAL publishes one `ChipLimits` constant. Configuration is
//! validated against it before any hardware is touched.

use crate::error::HalError;
use crate::gpio::PinMask;
use crate::timer::TimerId;

/// What a chip can physically offer to the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ChipLimits {
    /// Number of user GPIOs (valid pins are `0..gpio_count`)
    pub gpio_count: u8,
    /// Pins that exist but must not be claimed (flash, debug, ...)
    pub reserved_pins: PinMask,
    /// Number of timer groups
    pub timer_groups: u8,
    /// Lowest usable timer index within a group
    pub timer_index_min: u8,
    /// Highest usable timer index within a group
    pub timer_index_max: u8,
    /// Timer base clock before the divider
    pub timer_source_hz: u32,
    pub min_divider: u32,
    pub max_divider: u32,
}

impl ChipLimits {
    pub fn check_pin(&self, pin: u8) -> Result<(), HalError> {
        if pin >= self.gpio_count {
            return Err(HalError::InvalidPin(pin));
        }
        if self.reserved_pins.contains(pin) {
            return Err(HalError::PinUnavailable(pin));
        }
        Ok(())
    }

    pub fn check_mask(&self, mask: PinMask) -> Result<(), HalError> {
        mask.pins().try_for_each(|pin| self.check_pin(pin))
    }

    pub fn check_timer(&self, id: TimerId) -> Result<(), HalError> {
        if id.group >= self.timer_groups
            || id.index < self.timer_index_min
            || id.index > self.timer_index_max
        {
            return Err(HalError::InvalidTimer {
                group: id.group,
                index: id.index,
            });
        }
        Ok(())
    }

    pub fn check_divider(&self, divider: u32) -> Result<(), HalError> {
        if divider < self.min_divider || divider > self.max_divider {
            return Err(HalError::UnsupportedDivider(divider));
        }
        Ok(())
    }

    /// Timer ticks per second after dividing the base clock
    pub const fn ticks_per_sec(&self, divider: u32) -> u32 {
        self.timer_source_hz / divider
    }

    /// Timer ticks to microseconds, saturating at `u64::MAX`
    pub fn ticks_to_us(&self, ticks: u64, divider: u32) -> u64 {
        let per_sec = u128::from(self.ticks_per_sec(divider.max(1)).max(1));
        let us = u128::from(ticks) * 1_000_000 / per_sec;
        u64::try_from(us).unwrap_or(u64::MAX)
    }
}
