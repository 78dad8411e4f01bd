//! Configuration type definitions
//!
//! `BridgeConfig::default()` is the stock board setup: two edge sources on
//! pins 4 and 5, a heartbeat on pins 18 and 19, two alarm timers and the
//! counter/peek demo.

use heapless::{String, Vec};
use irqbridge_hal::{Edge, HalError, PinGroupConfig, PinMask, TimerId};

use crate::queue::OverflowPolicy;
use crate::timer::TimerDescriptor;

/// Maximum task/source name length
pub const MAX_NAME_LEN: usize = 16;

/// Maximum GPIO sources (one queue and one consumer each)
pub const MAX_GPIO_SOURCES: usize = 2;

/// Maximum alarm timers sharing the timer queue
pub const MAX_TIMERS: usize = 3;

/// Lowest priority that runs on the interrupt executor tier
pub const INTERRUPT_TIER_PRIORITY: u8 = 8;

/// Executor tier a task is spawned on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TaskTier {
    /// Thread-mode executor
    Thread,
    /// Software-interrupt executor, preempts thread-mode tasks
    Interrupt,
}

/// Task name and priority
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TaskSpec {
    pub name: String<MAX_NAME_LEN>,
    pub priority: u8,
}

impl TaskSpec {
    /// Build a spec; names longer than `MAX_NAME_LEN` are truncated
    pub fn new(name: &str, priority: u8) -> Self {
        Self {
            name: truncated(name),
            priority,
        }
    }

    pub fn tier(&self) -> TaskTier {
        if self.priority >= INTERRUPT_TIER_PRIORITY {
            TaskTier::Interrupt
        } else {
            TaskTier::Thread
        }
    }
}

pub(crate) fn truncated(s: &str) -> String<MAX_NAME_LEN> {
    let mut out = String::new();
    for c in s.chars() {
        if out.push(c).is_err() {
            break;
        }
    }
    out
}

/// One edge-interrupt source with its own queue and consumer
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct GpioSourceConfig {
    pub name: String<MAX_NAME_LEN>,
    pub pin: u8,
    pub edge: Edge,
    pub pull_up: bool,
    pub pull_down: bool,
    pub overflow: OverflowPolicy,
    /// Consumer task
    pub task: TaskSpec,
}

impl Default for GpioSourceConfig {
    fn default() -> Self {
        Self {
            name: String::new(),
            pin: 0,
            edge: Edge::Rising,
            pull_up: true,
            pull_down: false,
            overflow: OverflowPolicy::DropNewest,
            task: TaskSpec::new("gpio", 9),
        }
    }
}

/// Output pins toggled by the heartbeat
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct HeartbeatConfig {
    pub period_ms: u32,
    pub outputs: PinMask,
}

impl Default for HeartbeatConfig {
    fn default() -> Self {
        Self {
            period_ms: 1000,
            outputs: PinMask((1 << 18) | (1 << 19)),
        }
    }
}

/// One alarm timer
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TimerConfig {
    pub name: String<MAX_NAME_LEN>,
    pub group: u8,
    pub index: u8,
    pub divider: u32,
    pub interval_us: u32,
    pub auto_reload: bool,
}

impl TimerConfig {
    pub fn id(&self) -> TimerId {
        TimerId::new(self.group, self.index)
    }

    pub fn descriptor(&self) -> TimerDescriptor {
        TimerDescriptor {
            id: self.id(),
            interval_us: self.interval_us,
            auto_reload: self.auto_reload,
            divider: self.divider,
        }
    }
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            name: String::new(),
            group: 0,
            index: 0,
            divider: 16,
            interval_us: 1_000_000,
            auto_reload: false,
        }
    }
}

/// Timers sharing one queue and one consumer
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TimersConfig {
    pub timers: Vec<TimerConfig, MAX_TIMERS>,
    pub overflow: OverflowPolicy,
    pub task: TaskSpec,
}

impl Default for TimersConfig {
    fn default() -> Self {
        let mut timers = Vec::new();
        let _ = timers.push(TimerConfig {
            name: truncated("a"),
            group: 0,
            index: 0,
            divider: 16,
            interval_us: 3_417_900,
            auto_reload: false,
        });
        let _ = timers.push(TimerConfig {
            name: truncated("b"),
            group: 0,
            index: 1,
            divider: 16,
            interval_us: 5_780_000,
            auto_reload: true,
        });
        Self {
            timers,
            overflow: OverflowPolicy::DropNewest,
            task: TaskSpec::new("timer", 5),
        }
    }
}

/// Counter/peek demo
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DemoConfig {
    /// How long one peek waits for a value
    pub peek_timeout_ms: u32,
    /// Pause after each successful peek
    pub peek_interval_ms: u32,
    pub counter_task: TaskSpec,
    pub peek_task: TaskSpec,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            peek_timeout_ms: 100,
            peek_interval_ms: 5000,
            counter_task: TaskSpec::new("counter", 2),
            peek_task: TaskSpec::new("peek", 4),
        }
    }
}

/// Complete board configuration
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BridgeConfig {
    /// Config format version
    pub version: u8,
    pub gpio: Vec<GpioSourceConfig, MAX_GPIO_SOURCES>,
    pub heartbeat: HeartbeatConfig,
    pub timers: TimersConfig,
    pub demo: DemoConfig,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        let mut gpio = Vec::new();
        let _ = gpio.push(GpioSourceConfig {
            name: truncated("a"),
            pin: 4,
            edge: Edge::Any,
            task: TaskSpec::new("gpio_a", 10),
            ..Default::default()
        });
        let _ = gpio.push(GpioSourceConfig {
            name: truncated("b"),
            pin: 5,
            edge: Edge::Rising,
            task: TaskSpec::new("gpio_b", 9),
            ..Default::default()
        });
        Self {
            version: 1,
            gpio,
            heartbeat: HeartbeatConfig::default(),
            timers: TimersConfig::default(),
            demo: DemoConfig::default(),
        }
    }
}

impl BridgeConfig {
    /// Configuration with no sources or timers, everything else default
    ///
    /// Starting point for the parser, which appends what the file lists.
    pub fn empty() -> Self {
        Self {
            version: 1,
            gpio: Vec::new(),
            heartbeat: HeartbeatConfig::default(),
            timers: TimersConfig {
                timers: Vec::new(),
                ..TimersConfig::default()
            },
            demo: DemoConfig::default(),
        }
    }

    pub fn output_group(&self) -> PinGroupConfig {
        PinGroupConfig::outputs(self.heartbeat.outputs)
    }

    /// Input pin groups, one per distinct pull setting
    ///
    /// A group takes the edge of its first source; sources wanting a
    /// different edge are listed by [`BridgeConfig::edge_overrides`].
    pub fn input_groups(&self) -> Result<Vec<PinGroupConfig, MAX_GPIO_SOURCES>, HalError> {
        let mut groups: Vec<PinGroupConfig, MAX_GPIO_SOURCES> = Vec::new();
        for src in &self.gpio {
            let pin = PinMask::from_pins(&[src.pin])?;
            match groups
                .iter_mut()
                .find(|g| g.pull_up == src.pull_up && g.pull_down == src.pull_down)
            {
                Some(group) => group.mask = PinMask(group.mask.0 | pin.0),
                None => {
                    // At most one group per source, so this cannot overflow
                    let _ = groups.push(PinGroupConfig::inputs(
                        pin,
                        src.pull_up,
                        src.pull_down,
                        Some(src.edge),
                    ));
                }
            }
        }
        Ok(groups)
    }

    /// Per-pin edges that differ from their group's edge
    pub fn edge_overrides(&self) -> Result<Vec<(u8, Edge), MAX_GPIO_SOURCES>, HalError> {
        let groups = self.input_groups()?;
        let mut overrides = Vec::new();
        for src in &self.gpio {
            let group_edge = groups
                .iter()
                .find(|g| g.mask.contains(src.pin))
                .and_then(|g| g.edge);
            if group_edge != Some(src.edge) {
                let _ = overrides.push((src.pin, src.edge));
            }
        }
        Ok(overrides)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use irqbridge_hal::Direction;

    #[test]
    fn test_task_tiers() {
        let config = BridgeConfig::default();
        assert_eq!(config.gpio[0].task.tier(), TaskTier::Interrupt);
        assert_eq!(config.gpio[1].task.tier(), TaskTier::Interrupt);
        assert_eq!(config.demo.counter_task.tier(), TaskTier::Thread);
        assert_eq!(config.demo.peek_task.tier(), TaskTier::Thread);
        assert_eq!(config.timers.task.tier(), TaskTier::Thread);
    }

    #[test]
    fn test_name_truncated() {
        let spec = TaskSpec::new("a_very_long_task_name_indeed", 1);
        assert_eq!(spec.name.as_str(), "a_very_long_task");
    }

    #[test]
    fn test_default_groups() {
        let config = BridgeConfig::default();

        let out = config.output_group();
        assert_eq!(out.direction, Direction::Output);
        assert!(out.mask.contains(18) && out.mask.contains(19));
        assert!(!out.pull_up && !out.pull_down && out.edge.is_none());

        let inputs = config.input_groups().unwrap();
        assert_eq!(inputs.len(), 1);
        assert_eq!(inputs[0].mask, PinMask((1 << 4) | (1 << 5)));
        assert!(inputs[0].pull_up);
        assert_eq!(inputs[0].edge, Some(Edge::Any));

        let overrides = config.edge_overrides().unwrap();
        assert_eq!(overrides.as_slice(), &[(5, Edge::Rising)]);
    }

    #[test]
    fn test_out_of_range_pin_is_not_aliased() {
        let mut config = BridgeConfig::default();
        config.gpio[0].pin = 68;
        assert_eq!(config.input_groups(), Err(HalError::InvalidPin(68)));
        assert_eq!(config.edge_overrides(), Err(HalError::InvalidPin(68)));
    }

    #[test]
    fn test_split_groups_by_pulls() {
        let mut config = BridgeConfig::default();
        config.gpio[1].pull_up = false;
        config.gpio[1].pull_down = true;

        let inputs = config.input_groups().unwrap();
        assert_eq!(inputs.len(), 2);
        assert_eq!(inputs[1].mask, PinMask::single(5));
        assert_eq!(inputs[1].edge, Some(Edge::Rising));
        assert!(config.edge_overrides().unwrap().is_empty());
    }

    #[test]
    fn test_default_timers() {
        let timers = BridgeConfig::default().timers.timers;
        assert_eq!(timers.len(), 2);
        assert_eq!(timers[0].interval_us, 3_417_900);
        assert!(!timers[0].auto_reload);
        assert_eq!(timers[1].interval_us, 5_780_000);
        assert!(timers[1].auto_reload);
        assert!(timers.iter().all(|t| t.divider == 16));
    }
}
