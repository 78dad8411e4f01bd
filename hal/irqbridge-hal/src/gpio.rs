//! GPIO pin abstractions
//!
//! Pins are configured in groups selected by a bit-mask, once at startup.
//! After that the pipeline only samples live levels and drives outputs.

use crate::error::HalError;
use crate::limits::ChipLimits;

/// Logic level of a pin
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Level {
    Low,
    High,
}

impl Level {
    /// Numeric form used in reports (0 or 1)
    pub const fn as_u8(self) -> u8 {
        match self {
            Level::Low => 0,
            Level::High => 1,
        }
    }

    /// Level for an even/odd count (`n % 2`)
    pub const fn from_parity(n: u32) -> Self {
        if n % 2 == 0 {
            Level::Low
        } else {
            Level::High
        }
    }
}

impl From<bool> for Level {
    fn from(high: bool) -> Self {
        if high {
            Level::High
        } else {
            Level::Low
        }
    }
}

/// Edge that triggers a pin interrupt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Edge {
    Rising,
    Falling,
    /// Both rising and falling edges
    Any,
}

/// Pin direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    Input,
    Output,
}

/// Set of pins selected by bit position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PinMask(pub u64);

impl PinMask {
    pub const EMPTY: Self = Self(0);

    /// Build a mask from a list of pin numbers
    ///
    /// Pins above 63 cannot be represented and are reported as an error.
    pub fn from_pins(pins: &[u8]) -> Result<Self, HalError> {
        let mut mask = 0u64;
        for &pin in pins {
            if pin >= 64 {
                return Err(HalError::InvalidPin(pin));
            }
            mask |= 1 << pin;
        }
        Ok(Self(mask))
    }

    pub const fn single(pin: u8) -> Self {
        Self(1 << pin)
    }

    pub const fn contains(&self, pin: u8) -> bool {
        pin < 64 && self.0 & (1 << pin) != 0
    }

    pub const fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub const fn count(&self) -> u32 {
        self.0.count_ones()
    }

    /// Iterate over the selected pin numbers, lowest first
    pub fn pins(&self) -> impl Iterator<Item = u8> {
        let mask = self.0;
        (0..64u8).filter(move |pin| mask & (1 << pin) != 0)
    }
}

/// One pin-group configuration request
///
/// Mirrors what the pin configuration service applies in one call:
/// direction, pulls and edge interrupt for every pin in `mask`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PinGroupConfig {
    pub mask: PinMask,
    pub direction: Direction,
    pub pull_up: bool,
    pub pull_down: bool,
    /// `None` disables the edge interrupt
    pub edge: Option<Edge>,
}

impl PinGroupConfig {
    /// Push-pull outputs, no pulls, no interrupts
    pub const fn outputs(mask: PinMask) -> Self {
        Self {
            mask,
            direction: Direction::Output,
            pull_up: false,
            pull_down: false,
            edge: None,
        }
    }

    /// Inputs with the given pulls and interrupt edge
    pub const fn inputs(mask: PinMask, pull_up: bool, pull_down: bool, edge: Option<Edge>) -> Self {
        Self {
            mask,
            direction: Direction::Input,
            pull_up,
            pull_down,
            edge,
        }
    }

    /// Check the request against what the chip can do
    pub fn check(&self, limits: &ChipLimits) -> Result<(), HalError> {
        limits.check_mask(self.mask)?;
        if self.pull_up && self.pull_down {
            return Err(HalError::ConflictingPulls);
        }
        if self.direction == Direction::Output && self.edge.is_some() {
            // Report the lowest offending pin
            if let Some(pin) = self.mask.pins().next() {
                return Err(HalError::NotAnInput(pin));
            }
        }
        Ok(())
    }
}

/// Digital output pin
pub trait OutputPin {
    /// Set the pin high (logic 1)
    fn set_high(&mut self);

    /// Set the pin low (logic 0)
    fn set_low(&mut self);

    /// Drive the pin to a specific level
    fn set_level(&mut self, level: Level) {
        match level {
            Level::High => self.set_high(),
            Level::Low => self.set_low(),
        }
    }
}

/// Samples the live level of any pin by number
///
/// Consumers use this at report time; interrupt handlers never call it.
pub trait LevelReader {
    fn level(&self, pin: u8) -> Level;
}

impl<T: LevelReader + ?Sized> LevelReader for &T {
    fn level(&self, pin: u8) -> Level {
        (**self).level(pin)
    }
}

/// Pin configuration service
///
/// Applied once per pin group at startup, then per-pin edge overrides.
pub trait PinConfigurator {
    /// Apply direction, pulls and interrupt edge to every pin in the group
    fn configure_group(&mut self, group: &PinGroupConfig) -> Result<(), HalError>;

    /// Change the interrupt edge of one already configured input pin
    fn set_edge(&mut self, pin: u8, edge: Edge) -> Result<(), HalError>;
}
