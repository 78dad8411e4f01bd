//! GPIO configuration, edge inputs and level sampling

use embassy_rp::gpio::{Input, Level as RpLevel, Output, Pull};
use embassy_rp::pac;
use heapless::Vec;
use irqbridge_hal::{Direction, Edge, HalError, Level, LevelReader, OutputPin, PinConfigurator, PinGroupConfig};

use crate::pins::PinBank;
use crate::RP2040_LIMITS;

/// Maximum pins held as outputs
pub const MAX_OUTPUTS: usize = 8;

/// Maximum pins held as edge inputs
pub const MAX_INPUTS: usize = 4;

/// Output pin driven by the heartbeat
pub struct RpOutput {
    pin: u8,
    output: Output<'static>,
}

impl RpOutput {
    pub fn pin(&self) -> u8 {
        self.pin
    }
}

impl OutputPin for RpOutput {
    fn set_high(&mut self) {
        self.output.set_high();
    }

    fn set_low(&mut self) {
        self.output.set_low();
    }
}

/// Input pin armed for one edge kind
pub struct EdgeInput {
    pin: u8,
    input: Input<'static>,
    edge: Edge,
}

impl EdgeInput {
    pub fn pin(&self) -> u8 {
        self.pin
    }

    pub fn edge(&self) -> Edge {
        self.edge
    }

    /// Wait for the next configured edge
    ///
    /// Runs on the interrupt executor; resolves from the IO_IRQ_BANK0
    /// handler, so the caller is effectively the pin's interrupt handler.
    pub async fn wait(&mut self) {
        match self.edge {
            Edge::Rising => self.input.wait_for_rising_edge().await,
            Edge::Falling => self.input.wait_for_falling_edge().await,
            Edge::Any => self.input.wait_for_any_edge().await,
        }
    }
}

struct InputSlot {
    pin: u8,
    input: Input<'static>,
    edge: Option<Edge>,
}

/// Pin configuration service backed by the pin bank
///
/// Claims pins per group, builds the embassy drivers, and hands them out
/// once configuration is finished.
pub struct BoardPins {
    bank: PinBank,
    outputs: Vec<RpOutput, MAX_OUTPUTS>,
    inputs: Vec<InputSlot, MAX_INPUTS>,
}

impl BoardPins {
    pub fn new(bank: PinBank) -> Self {
        Self {
            bank,
            outputs: Vec::new(),
            inputs: Vec::new(),
        }
    }

    /// Take the configured input for `pin`; it must have an edge
    pub fn take_edge_input(&mut self, pin: u8) -> Result<EdgeInput, HalError> {
        let pos = self
            .inputs
            .iter()
            .position(|slot| slot.pin == pin)
            .ok_or(HalError::NotAnInput(pin))?;
        let Some(edge) = self.inputs[pos].edge else {
            return Err(HalError::NotAnInput(pin));
        };
        let slot = self.inputs.swap_remove(pos);
        Ok(EdgeInput {
            pin,
            input: slot.input,
            edge,
        })
    }

    /// Take every configured output
    pub fn take_outputs(&mut self) -> Vec<RpOutput, MAX_OUTPUTS> {
        core::mem::take(&mut self.outputs)
    }
}

impl PinConfigurator for BoardPins {
    fn configure_group(&mut self, group: &PinGroupConfig) -> Result<(), HalError> {
        group.check(&RP2040_LIMITS)?;

        let pull = match (group.pull_up, group.pull_down) {
            (true, _) => Pull::Up,
            (false, true) => Pull::Down,
            (false, false) => Pull::None,
        };

        for pin in group.mask.pins() {
            let peri = self.bank.take(pin)?;
            match group.direction {
                Direction::Output => {
                    let output = Output::new(peri, RpLevel::Low);
                    self.outputs
                        .push(RpOutput { pin, output })
                        .map_err(|_| HalError::PinUnavailable(pin))?;
                }
                Direction::Input => {
                    let input = Input::new(peri, pull);
                    self.inputs
                        .push(InputSlot {
                            pin,
                            input,
                            edge: group.edge,
                        })
                        .map_err(|_| HalError::PinUnavailable(pin))?;
                }
            }
        }
        Ok(())
    }

    fn set_edge(&mut self, pin: u8, edge: Edge) -> Result<(), HalError> {
        let slot = self
            .inputs
            .iter_mut()
            .find(|slot| slot.pin == pin)
            .ok_or(HalError::NotAnInput(pin))?;
        slot.edge = Some(edge);
        Ok(())
    }
}

/// Reads live pin levels from the SIO input register
///
/// Does not need to own the pins, so consumers can sample a pin whose
/// driver lives in the edge watcher.
#[derive(Debug, Clone, Copy, Default)]
pub struct SioLevels;

impl LevelReader for SioLevels {
    fn level(&self, pin: u8) -> Level {
        if pin as usize >= crate::pins::GPIO_COUNT {
            return Level::Low;
        }
        Level::from(pac::SIO.gpio_in(0).read() & (1 << pin) != 0)
    }
}
