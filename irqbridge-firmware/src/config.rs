//! Configuration loading
//!
//! `bridge.toml` is embedded at build time (and validated there by
//! build.rs); at boot it is parsed and checked against the RP2040 limits.

use defmt::*;

use irqbridge_core::config::{load_config, BridgeConfig};
use irqbridge_hal_rp2040::RP2040_LIMITS;

/// Embedded board configuration
/// Edit bridge.toml and rebuild to customize
const EMBEDDED_CONFIG: &str = include_str!("../bridge.toml");

/// Load the embedded configuration or halt with the reason
pub fn load() -> BridgeConfig {
    match load_config(EMBEDDED_CONFIG, &RP2040_LIMITS) {
        Ok(config) => {
            log_summary(&config);
            config
        }
        Err(e) => {
            error!("bridge.toml rejected: {}", e);
            defmt::panic!("invalid configuration");
        }
    }
}

fn log_summary(config: &BridgeConfig) {
    for src in &config.gpio {
        info!(
            "GPIO source {}: pin {} edge {} pull_up={} -> task {} (prio {})",
            src.name.as_str(),
            src.pin,
            src.edge,
            src.pull_up,
            src.task.name.as_str(),
            src.task.priority
        );
    }
    for timer in &config.timers.timers {
        info!(
            "Timer {}: group {} index {} interval {} us auto_reload={}",
            timer.name.as_str(),
            timer.group,
            timer.index,
            timer.interval_us,
            timer.auto_reload
        );
    }
    info!(
        "Heartbeat every {} ms on {} output(s)",
        config.heartbeat.period_ms,
        config.heartbeat.outputs.count()
    );
}
