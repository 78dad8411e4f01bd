//! Build script for irqbridge-firmware
//!
//! - Sets up linker search paths for memory.x
//! - Validates bridge.toml at compile time

use std::collections::BTreeSet;
use std::env;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

/// RP2040 user GPIOs
const GPIO_COUNT: i64 = 30;

/// Usable TIMER alarms (alarm 0 drives embassy-time)
const ALARM_INDICES: std::ops::RangeInclusive<i64> = 1..=3;

const EDGES: [&str; 3] = ["rising", "falling", "any"];
const POLICIES: [&str; 2] = ["drop_newest", "drop_oldest"];

fn main() {
    setup_linker();
    validate_config();
}

/// Set up linker search paths for memory.x
fn setup_linker() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());

    // Copy memory.x to the output directory
    let memory_x = include_bytes!("memory.x");
    let mut f = File::create(out_dir.join("memory.x")).unwrap();
    f.write_all(memory_x).unwrap();

    // Tell rustc where to find memory.x
    println!("cargo:rustc-link-search={}", out_dir.display());

    // Re-run if memory.x changes
    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
}

/// Validate bridge.toml configuration at compile time
fn validate_config() {
    println!("cargo:rerun-if-changed=bridge.toml");

    let config_path = Path::new("bridge.toml");

    let config_content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => fail("Failed to read bridge.toml", &[e.to_string()]),
    };

    let config: toml::Value = match toml::from_str(&config_content) {
        Ok(value) => value,
        Err(e) => fail(
            "Invalid TOML syntax in bridge.toml",
            &e.to_string().lines().map(str::to_string).collect::<Vec<_>>(),
        ),
    };

    let mut errors = Vec::new();

    match config.get("version").and_then(toml::Value::as_integer) {
        Some(1) => {}
        Some(v) => errors.push(format!("version {} is not supported (expected 1)", v)),
        None => errors.push("missing top-level 'version'".to_string()),
    }

    let inputs = validate_gpio(&config, &mut errors);
    validate_heartbeat(&config, &inputs, &mut errors);
    validate_timers(&config, &mut errors);
    validate_demo(&config, &mut errors);

    if !errors.is_empty() {
        fail("Invalid configuration in bridge.toml", &errors);
    }

    println!("cargo:warning=bridge.toml validated successfully");
}

/// Check [gpio.*] sources, returning the input pins
fn validate_gpio(config: &toml::Value, errors: &mut Vec<String>) -> BTreeSet<i64> {
    let mut pins = BTreeSet::new();

    let sources = match config.get("gpio") {
        Some(toml::Value::Table(t)) if !t.is_empty() => t,
        _ => {
            errors.push("missing [gpio.*] section - at least one source is required".to_string());
            return pins;
        }
    };

    if sources.len() > 2 {
        errors.push(format!("{} [gpio.*] sources, at most 2 are supported", sources.len()));
    }

    for (name, source) in sources {
        let Some(source) = source.as_table() else {
            errors.push(format!("[gpio.{}] must be a table", name));
            continue;
        };

        match source.get("pin").and_then(toml::Value::as_integer) {
            Some(pin) if (0..GPIO_COUNT).contains(&pin) => {
                if !pins.insert(pin) {
                    errors.push(format!("[gpio.{}] pin {} is used by another source", name, pin));
                }
            }
            Some(pin) => errors.push(format!("[gpio.{}] pin {} out of range 0-{}", name, pin, GPIO_COUNT - 1)),
            None => errors.push(format!("[gpio.{}] missing 'pin'", name)),
        }

        check_choice(source.get("edge"), &EDGES, &format!("[gpio.{}] edge", name), errors);
        check_choice(source.get("overflow"), &POLICIES, &format!("[gpio.{}] overflow", name), errors);

        let pull_up = source.get("pull_up").and_then(toml::Value::as_bool).unwrap_or(true);
        let pull_down = source.get("pull_down").and_then(toml::Value::as_bool).unwrap_or(false);
        if pull_up && pull_down {
            errors.push(format!("[gpio.{}] cannot enable both pull_up and pull_down", name));
        }
    }

    pins
}

fn validate_heartbeat(config: &toml::Value, inputs: &BTreeSet<i64>, errors: &mut Vec<String>) {
    let Some(heartbeat) = config.get("heartbeat") else {
        return;
    };

    if let Some(period) = heartbeat.get("period_ms").and_then(toml::Value::as_integer) {
        if period <= 0 {
            errors.push("[heartbeat] period_ms must be positive".to_string());
        }
    }

    if let Some(outputs) = heartbeat.get("outputs") {
        let Some(outputs) = outputs.as_array() else {
            errors.push("[heartbeat] outputs must be an array of pin numbers".to_string());
            return;
        };
        for pin in outputs {
            match pin.as_integer() {
                Some(pin) if !(0..GPIO_COUNT).contains(&pin) => {
                    errors.push(format!("[heartbeat] output pin {} out of range", pin));
                }
                Some(pin) if inputs.contains(&pin) => {
                    errors.push(format!("[heartbeat] output pin {} is also a gpio source", pin));
                }
                Some(_) => {}
                None => errors.push("[heartbeat] outputs must be integers".to_string()),
            }
        }
    }
}

fn validate_timers(config: &toml::Value, errors: &mut Vec<String>) {
    if let Some(timers) = config.get("timers") {
        check_choice(timers.get("overflow"), &POLICIES, "[timers] overflow", errors);
    }

    let Some(toml::Value::Table(timers)) = config.get("timer") else {
        return;
    };

    let mut used = BTreeSet::new();
    for (name, timer) in timers {
        let Some(timer) = timer.as_table() else {
            errors.push(format!("[timer.{}] must be a table", name));
            continue;
        };

        let group = timer.get("group").and_then(toml::Value::as_integer).unwrap_or(0);
        if group != 0 {
            errors.push(format!("[timer.{}] group {} does not exist (RP2040 has group 0)", name, group));
        }

        match timer.get("index").and_then(toml::Value::as_integer) {
            Some(index) if ALARM_INDICES.contains(&index) => {
                if !used.insert(index) {
                    errors.push(format!("[timer.{}] index {} is used by another timer", name, index));
                }
            }
            Some(index) => errors.push(format!("[timer.{}] index {} not in 1-3", name, index)),
            None => errors.push(format!("[timer.{}] missing 'index'", name)),
        }

        if let Some(divider) = timer.get("divider").and_then(toml::Value::as_integer) {
            if divider != 1 {
                errors.push(format!("[timer.{}] divider must be 1 on RP2040", name));
            }
        }

        let interval_s = match timer.get("interval_s") {
            Some(toml::Value::Float(s)) => Some(*s),
            Some(toml::Value::Integer(s)) => Some(*s as f64),
            _ => None,
        };
        let interval_us = timer.get("interval_us").and_then(toml::Value::as_integer);
        match (interval_s, interval_us) {
            (Some(s), _) if s <= 0.0 || s > 4294.0 => {
                errors.push(format!("[timer.{}] interval_s must be in (0, 4294]", name));
            }
            (_, Some(us)) if us <= 0 || us > u32::MAX as i64 => {
                errors.push(format!("[timer.{}] interval_us out of range", name));
            }
            (None, None) => errors.push(format!("[timer.{}] missing 'interval_s'", name)),
            _ => {}
        }
    }
}

fn validate_demo(config: &toml::Value, errors: &mut Vec<String>) {
    let Some(demo) = config.get("demo") else {
        return;
    };
    for key in ["peek_timeout_ms", "peek_interval_ms"] {
        if let Some(v) = demo.get(key).and_then(toml::Value::as_integer) {
            if v < 0 || (key == "peek_interval_ms" && v == 0) {
                errors.push(format!("[demo] {} out of range", key));
            }
        }
    }
}

fn check_choice(value: Option<&toml::Value>, allowed: &[&str], what: &str, errors: &mut Vec<String>) {
    match value {
        None => {}
        Some(toml::Value::String(s)) if allowed.contains(&s.as_str()) => {}
        Some(_) => errors.push(format!("{} must be one of: {}", what, allowed.join(", "))),
    }
}

/// Abort the build with a boxed error report
fn fail(title: &str, lines: &[String]) -> ! {
    panic!(
        "\n\
        ╔══════════════════════════════════════════════════════════════════╗\n\
        ║  ERROR: {:<57}║\n\
        ╠══════════════════════════════════════════════════════════════════╣\n\
        {}\n\
        ╚══════════════════════════════════════════════════════════════════╝\n",
        title,
        lines
            .iter()
            .map(|line| {
                let line = if line.len() > 62 {
                    format!("{}...", &line[..59])
                } else {
                    line.clone()
                };
                format!("║  • {:<62} ║", line)
            })
            .collect::<Vec<_>>()
            .join("\n")
    );
}
