//! HAL error type

/// Errors reported by chip HALs while configuring hardware
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HalError {
    /// Pin number outside the chip's GPIO range
    InvalidPin(u8),
    /// Pin exists but is reserved or already claimed
    PinUnavailable(u8),
    /// Pull-up and pull-down requested on the same group
    ConflictingPulls,
    /// Edge detection requested on a pin that is not an input
    NotAnInput(u8),
    /// Timer group/index does not exist or is reserved
    InvalidTimer { group: u8, index: u8 },
    /// Divider the timer block cannot produce
    UnsupportedDivider(u32),
}
