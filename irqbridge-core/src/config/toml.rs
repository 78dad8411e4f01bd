//! Minimal TOML parser for the board configuration
//!
//! Handles only the subset `bridge.toml` uses. It does NOT support the
//! full TOML spec.
//!
//! Supported features:
//! - Key = value pairs (string, integer, decimal, boolean)
//! - Integer arrays: `outputs = [18, 19]`
//! - [section] and [section.name] headers
//! - Comments (# ...)
//!
//! Unknown keys are ignored. Sources and timers are appended in file order.

use heapless::Vec;
use irqbridge_hal::{Edge, PinMask};

use super::types::{truncated, BridgeConfig, GpioSourceConfig, TaskSpec, TimerConfig, MAX_NAME_LEN};
use crate::queue::OverflowPolicy;

/// Parse error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParseError {
    /// Invalid or unknown section header
    InvalidSection,
    /// Invalid value type or out of range
    InvalidValue,
    /// Too many sources, timers or array items
    TooManyItems,
}

/// Current parsing context
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Root,
    Gpio,
    Heartbeat,
    Timers,
    Timer,
    Demo,
}

/// Parse TOML configuration into a `BridgeConfig`
///
/// The result is not validated; see [`BridgeConfig::validate`].
pub fn parse_config(input: &str) -> Result<BridgeConfig, ParseError> {
    let mut config = BridgeConfig::empty();
    let mut section = Section::Root;

    for line in input.lines() {
        let line = line.trim();

        // Skip empty lines and comments
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if line.starts_with('[') && line.ends_with(']') {
            section = open_section(&line[1..line.len() - 1], &mut config)?;
            continue;
        }

        if let Some((key, value)) = parse_key_value(line) {
            apply_value(section, key, value, &mut config)?;
        }
    }

    Ok(config)
}

/// Parse a header and create the entry it introduces
fn open_section(header: &str, config: &mut BridgeConfig) -> Result<Section, ParseError> {
    let header = header.trim();
    let (kind, name) = match header.split_once('.') {
        Some((kind, name)) => (kind.trim(), Some(name.trim())),
        None => (header, None),
    };

    match (kind, name) {
        ("gpio", Some(name)) if !name.is_empty() => {
            let source = GpioSourceConfig {
                name: truncated(name),
                task: TaskSpec::new(name, 9),
                ..Default::default()
            };
            config.gpio.push(source).map_err(|_| ParseError::TooManyItems)?;
            Ok(Section::Gpio)
        }
        ("timer", Some(name)) if !name.is_empty() => {
            let timer = TimerConfig {
                name: truncated(name),
                ..Default::default()
            };
            config.timers.timers.push(timer).map_err(|_| ParseError::TooManyItems)?;
            Ok(Section::Timer)
        }
        ("heartbeat", None) => Ok(Section::Heartbeat),
        ("timers", None) => Ok(Section::Timers),
        ("demo", None) => Ok(Section::Demo),
        _ => Err(ParseError::InvalidSection),
    }
}

fn parse_key_value(line: &str) -> Option<(&str, &str)> {
    let eq_pos = line.find('=')?;
    let key = line[..eq_pos].trim();
    let value = line[eq_pos + 1..].trim();

    // Remove inline comments, unless the # is inside a string
    let value = match value.find('#') {
        Some(hash_pos) if value[..hash_pos].matches('"').count() % 2 == 0 => value[..hash_pos].trim(),
        _ => value,
    };

    if key.is_empty() || value.is_empty() {
        return None;
    }

    Some((key, value))
}

fn parse_string(value: &str) -> &str {
    if value.len() >= 2 && value.starts_with('"') && value.ends_with('"') {
        &value[1..value.len() - 1]
    } else {
        // Allow unquoted strings for simple values
        value
    }
}

fn parse_int<T: core::str::FromStr>(value: &str) -> Result<T, ParseError> {
    value.parse().map_err(|_| ParseError::InvalidValue)
}

fn parse_bool(value: &str) -> Result<bool, ParseError> {
    match value {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(ParseError::InvalidValue),
    }
}

fn parse_edge(value: &str) -> Result<Edge, ParseError> {
    match parse_string(value) {
        "rising" => Ok(Edge::Rising),
        "falling" => Ok(Edge::Falling),
        "any" => Ok(Edge::Any),
        _ => Err(ParseError::InvalidValue),
    }
}

fn parse_policy(value: &str) -> Result<OverflowPolicy, ParseError> {
    match parse_string(value) {
        "drop_newest" => Ok(OverflowPolicy::DropNewest),
        "drop_oldest" => Ok(OverflowPolicy::DropOldest),
        _ => Err(ParseError::InvalidValue),
    }
}

/// Parse seconds with up to six decimals into microseconds ("3.4179")
fn parse_seconds_us(value: &str) -> Result<u32, ParseError> {
    let (whole, frac) = value.split_once('.').unwrap_or((value, ""));
    if whole.is_empty() || frac.len() > 6 || !frac.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ParseError::InvalidValue);
    }

    let whole: u32 = parse_int(whole)?;
    let mut frac_us = 0u32;
    for i in 0..6 {
        let digit = frac.as_bytes().get(i).map_or(0, |b| u32::from(b - b'0'));
        frac_us = frac_us * 10 + digit;
    }

    whole
        .checked_mul(1_000_000)
        .and_then(|us| us.checked_add(frac_us))
        .ok_or(ParseError::InvalidValue)
}

/// Parse an integer array of pin numbers ("[18, 19]")
fn parse_pin_list(value: &str) -> Result<PinMask, ParseError> {
    let inner = value
        .strip_prefix('[')
        .and_then(|v| v.strip_suffix(']'))
        .ok_or(ParseError::InvalidValue)?;

    let mut pins: Vec<u8, 64> = Vec::new();
    for item in inner.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        pins.push(parse_int(item)?).map_err(|_| ParseError::TooManyItems)?;
    }
    PinMask::from_pins(&pins).map_err(|_| ParseError::InvalidValue)
}

fn parse_task_name(value: &str) -> heapless::String<MAX_NAME_LEN> {
    truncated(parse_string(value))
}

fn apply_value(
    section: Section,
    key: &str,
    value: &str,
    config: &mut BridgeConfig,
) -> Result<(), ParseError> {
    match section {
        Section::Root => {
            if key == "version" {
                config.version = parse_int(value)?;
            }
        }
        Section::Gpio => {
            let Some(src) = config.gpio.last_mut() else {
                return Err(ParseError::InvalidSection);
            };
            match key {
                "pin" => src.pin = parse_int(value)?,
                "edge" => src.edge = parse_edge(value)?,
                "pull_up" => src.pull_up = parse_bool(value)?,
                "pull_down" => src.pull_down = parse_bool(value)?,
                "overflow" => src.overflow = parse_policy(value)?,
                "task" => src.task.name = parse_task_name(value),
                "priority" => src.task.priority = parse_int(value)?,
                _ => {}
            }
        }
        Section::Heartbeat => match key {
            "period_ms" => config.heartbeat.period_ms = parse_int(value)?,
            "outputs" => config.heartbeat.outputs = parse_pin_list(value)?,
            _ => {}
        },
        Section::Timers => match key {
            "overflow" => config.timers.overflow = parse_policy(value)?,
            "task" => config.timers.task.name = parse_task_name(value),
            "priority" => config.timers.task.priority = parse_int(value)?,
            _ => {}
        },
        Section::Timer => {
            let Some(timer) = config.timers.timers.last_mut() else {
                return Err(ParseError::InvalidSection);
            };
            match key {
                "group" => timer.group = parse_int(value)?,
                "index" => timer.index = parse_int(value)?,
                "divider" => timer.divider = parse_int(value)?,
                "interval_s" => timer.interval_us = parse_seconds_us(value)?,
                "interval_us" => timer.interval_us = parse_int(value)?,
                "auto_reload" => timer.auto_reload = parse_bool(value)?,
                _ => {}
            }
        }
        Section::Demo => match key {
            "peek_timeout_ms" => config.demo.peek_timeout_ms = parse_int(value)?,
            "peek_interval_ms" => config.demo.peek_interval_ms = parse_int(value)?,
            "counter_task" => config.demo.counter_task.name = parse_task_name(value),
            "counter_priority" => config.demo.counter_task.priority = parse_int(value)?,
            "peek_task" => config.demo.peek_task.name = parse_task_name(value),
            "peek_priority" => config.demo.peek_task.priority = parse_int(value)?,
            _ => {}
        },
    }
    Ok(())
}
