//! Startup pin configuration
//!
//! Applies the configured pin groups through the pin configuration
//! service: the output group first, then each input group, then the
//! per-pin edge overrides.

use irqbridge_hal::{HalError, PinConfigurator};

use crate::config::BridgeConfig;

pub fn configure_pins<P: PinConfigurator>(config: &BridgeConfig, pins: &mut P) -> Result<(), HalError> {
    if !config.heartbeat.outputs.is_empty() {
        pins.configure_group(&config.output_group())?;
    }
    for group in config.input_groups()? {
        pins.configure_group(&group)?;
    }
    for (pin, edge) in config.edge_overrides()? {
        pins.set_edge(pin, edge)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use irqbridge_hal::{Direction, Edge, PinGroupConfig, PinMask};
    use std::vec::Vec;

    #[derive(Debug, PartialEq)]
    enum Call {
        Group(PinGroupConfig),
        Edge(u8, Edge),
    }

    #[derive(Default)]
    struct Recorder {
        calls: Vec<Call>,
        fail_on_edge: bool,
    }

    impl PinConfigurator for Recorder {
        fn configure_group(&mut self, group: &PinGroupConfig) -> Result<(), HalError> {
            self.calls.push(Call::Group(*group));
            Ok(())
        }

        fn set_edge(&mut self, pin: u8, edge: Edge) -> Result<(), HalError> {
            if self.fail_on_edge {
                return Err(HalError::NotAnInput(pin));
            }
            self.calls.push(Call::Edge(pin, edge));
            Ok(())
        }
    }

    #[test]
    fn test_stock_sequence() {
        let config = BridgeConfig::default();
        let mut pins = Recorder::default();
        configure_pins(&config, &mut pins).unwrap();

        assert_eq!(pins.calls.len(), 3);
        match &pins.calls[0] {
            Call::Group(g) => {
                assert_eq!(g.direction, Direction::Output);
                assert_eq!(g.mask, PinMask((1 << 18) | (1 << 19)));
            }
            other => panic!("unexpected call {:?}", other),
        }
        match &pins.calls[1] {
            Call::Group(g) => {
                assert_eq!(g.direction, Direction::Input);
                assert_eq!(g.mask, PinMask((1 << 4) | (1 << 5)));
                assert!(g.pull_up);
            }
            other => panic!("unexpected call {:?}", other),
        }
        assert_eq!(pins.calls[2], Call::Edge(5, Edge::Rising));
    }

    #[test]
    fn test_no_outputs_skips_group() {
        let mut config = BridgeConfig::default();
        config.heartbeat.outputs = PinMask::EMPTY;
        let mut pins = Recorder::default();
        configure_pins(&config, &mut pins).unwrap();
        assert!(matches!(pins.calls[0], Call::Group(g) if g.direction == Direction::Input));
    }

    #[test]
    fn test_error_propagates() {
        let config = BridgeConfig::default();
        let mut pins = Recorder {
            fail_on_edge: true,
            ..Default::default()
        };
        assert_eq!(configure_pins(&config, &mut pins), Err(HalError::NotAnInput(5)));
    }
}
