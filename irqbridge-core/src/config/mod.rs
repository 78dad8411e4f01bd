//! Board configuration
//!
//! Types, the embedded-file parser and startup validation. Validation runs
//! against the chip's [`ChipLimits`] before any hardware is touched, so a
//! bad pin or timer aborts startup with a precise cause.

pub mod toml;
pub mod types;

pub use toml::{parse_config, ParseError};
pub use types::*;

use irqbridge_hal::{ChipLimits, HalError, TimerId};

/// Current config format version
pub const CONFIG_VERSION: u8 = 1;

/// Configuration errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Text could not be parsed
    Parse(ParseError),
    /// Pin, timer or divider the chip cannot provide
    Hal(HalError),
    /// Config file written for another format version
    UnsupportedVersion(u8),
    /// No GPIO source configured
    NoGpioSources,
    /// Pin used twice (two sources, or a source and an output)
    DuplicatePin(u8),
    /// Timer group/index used twice
    DuplicateTimer(TimerId),
    /// Timer interval shorter than one tick
    ZeroInterval(TimerId),
    /// Heartbeat or peek cadence of zero
    ZeroPeriod,
}

impl From<ParseError> for ConfigError {
    fn from(e: ParseError) -> Self {
        ConfigError::Parse(e)
    }
}

impl From<HalError> for ConfigError {
    fn from(e: HalError) -> Self {
        ConfigError::Hal(e)
    }
}

/// Parse and validate a configuration file
pub fn load_config(input: &str, limits: &ChipLimits) -> Result<BridgeConfig, ConfigError> {
    let config = parse_config(input)?;
    config.validate(limits)?;
    Ok(config)
}

impl BridgeConfig {
    /// Check every pin, timer and cadence against the chip limits
    pub fn validate(&self, limits: &ChipLimits) -> Result<(), ConfigError> {
        if self.version != CONFIG_VERSION {
            return Err(ConfigError::UnsupportedVersion(self.version));
        }
        if self.gpio.is_empty() {
            return Err(ConfigError::NoGpioSources);
        }

        let mut used = self.heartbeat.outputs;
        limits.check_mask(used)?;
        for src in &self.gpio {
            limits.check_pin(src.pin)?;
            if used.contains(src.pin) {
                return Err(ConfigError::DuplicatePin(src.pin));
            }
            used.0 |= 1 << src.pin;
        }

        self.output_group().check(limits)?;
        for group in self.input_groups()? {
            group.check(limits)?;
        }

        for (i, timer) in self.timers.timers.iter().enumerate() {
            let id = timer.id();
            limits.check_timer(id)?;
            limits.check_divider(timer.divider)?;
            if self.timers.timers[..i].iter().any(|t| t.id() == id) {
                return Err(ConfigError::DuplicateTimer(id));
            }
            if timer.descriptor().period_ticks(limits.timer_source_hz)? == 0 {
                return Err(ConfigError::ZeroInterval(id));
            }
        }

        if self.heartbeat.period_ms == 0 || self.demo.peek_interval_ms == 0 {
            return Err(ConfigError::ZeroPeriod);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use irqbridge_hal::PinMask;

    /// Limits matching the stock defaults (80 MHz source, divider 16)
    const STOCK: ChipLimits = ChipLimits {
        gpio_count: 40,
        reserved_pins: PinMask::EMPTY,
        timer_groups: 2,
        timer_index_min: 0,
        timer_index_max: 1,
        timer_source_hz: 80_000_000,
        min_divider: 2,
        max_divider: 65536,
    };

    /// Limits of a 1 MHz fixed-clock chip with alarm 0 reserved
    const FIXED: ChipLimits = ChipLimits {
        gpio_count: 30,
        reserved_pins: PinMask::EMPTY,
        timer_groups: 1,
        timer_index_min: 1,
        timer_index_max: 3,
        timer_source_hz: 1_000_000,
        min_divider: 1,
        max_divider: 1,
    };

    #[test]
    fn test_default_is_valid() {
        assert_eq!(BridgeConfig::default().validate(&STOCK), Ok(()));
    }

    #[test]
    fn test_default_needs_fixed_clock_remap() {
        let mut config = BridgeConfig::default();
        assert_eq!(
            config.validate(&FIXED),
            Err(ConfigError::Hal(HalError::InvalidTimer { group: 0, index: 0 }))
        );

        for (i, timer) in config.timers.timers.iter_mut().enumerate() {
            timer.index = i as u8 + 1;
            timer.divider = 1;
        }
        assert_eq!(config.validate(&FIXED), Ok(()));
    }

    #[test]
    fn test_invalid_pin() {
        let mut config = BridgeConfig::default();
        config.gpio[0].pin = 45;
        assert_eq!(config.validate(&STOCK), Err(ConfigError::Hal(HalError::InvalidPin(45))));
    }

    #[test]
    fn test_duplicate_pin() {
        let mut config = BridgeConfig::default();
        config.gpio[1].pin = 4;
        assert_eq!(config.validate(&STOCK), Err(ConfigError::DuplicatePin(4)));

        let mut config = BridgeConfig::default();
        config.gpio[0].pin = 18;
        assert_eq!(config.validate(&STOCK), Err(ConfigError::DuplicatePin(18)));
    }

    #[test]
    fn test_conflicting_pulls() {
        let mut config = BridgeConfig::default();
        config.gpio[0].pull_down = true;
        assert_eq!(config.validate(&STOCK), Err(ConfigError::Hal(HalError::ConflictingPulls)));
    }

    #[test]
    fn test_invalid_timer() {
        let mut config = BridgeConfig::default();
        config.timers.timers[1].group = 2;
        assert_eq!(
            config.validate(&STOCK),
            Err(ConfigError::Hal(HalError::InvalidTimer { group: 2, index: 1 }))
        );
    }

    #[test]
    fn test_duplicate_timer() {
        let mut config = BridgeConfig::default();
        config.timers.timers[1].index = 0;
        assert_eq!(
            config.validate(&STOCK),
            Err(ConfigError::DuplicateTimer(TimerId::new(0, 0)))
        );
    }

    #[test]
    fn test_zero_interval() {
        let mut config = BridgeConfig::default();
        config.timers.timers[0].interval_us = 0;
        assert_eq!(
            config.validate(&STOCK),
            Err(ConfigError::ZeroInterval(TimerId::new(0, 0)))
        );
    }

    #[test]
    fn test_no_sources() {
        let mut config = BridgeConfig::default();
        config.gpio.clear();
        assert_eq!(config.validate(&STOCK), Err(ConfigError::NoGpioSources));
    }

    #[test]
    fn test_zero_period() {
        let mut config = BridgeConfig::default();
        config.heartbeat.period_ms = 0;
        assert_eq!(config.validate(&STOCK), Err(ConfigError::ZeroPeriod));
    }

    #[test]
    fn test_load_reports_parse_errors() {
        assert_eq!(
            load_config("[bogus]", &STOCK),
            Err(ConfigError::Parse(ParseError::InvalidSection))
        );
        assert_eq!(load_config("version = 1", &STOCK), Err(ConfigError::NoGpioSources));
    }
}
