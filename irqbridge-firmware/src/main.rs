//! irqbridge - interrupt-to-task event pipeline
//!
//! Main firmware binary for RP2040 boards. Pin edges and TIMER alarms are
//! captured at interrupt priority, queued, and reported by ordinary tasks:
//!
//! - two edge sources, each with its own queue and consumer
//! - alarm timers sharing one queue, auto-reload or drift-free one-shot
//! - a counter producer and a peeking consumer on a third queue
//! - a heartbeat toggling output pins that can be looped back to inputs

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::{SendSpawner, SpawnError, SpawnToken, Spawner};
use {defmt_rtt as _, panic_probe as _};

use irqbridge_core::config::{BridgeConfig, TaskSpec, TaskTier};
use irqbridge_core::gpio::{EdgeBridge, EdgeSource};
use irqbridge_core::setup::configure_pins;
use irqbridge_core::AppContext;
use irqbridge_hal_rp2040::{BoardPins, PinBank};

use crate::channels::{CONFIG, CONTEXT};

mod channels;
mod config;
mod interrupts;
mod tasks;

/// Spawn on the executor tier the task's priority selects
fn spawn_on<S: Send>(
    spec: &TaskSpec,
    thread: &Spawner,
    high: &SendSpawner,
    token: SpawnToken<S>,
) -> Result<(), SpawnError> {
    match spec.tier() {
        TaskTier::Interrupt => high.spawn(token),
        TaskTier::Thread => thread.spawn(token),
    }
}

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("irqbridge firmware starting...");

    // Initialize RP2040 peripherals
    let p = embassy_rp::init(Default::default());
    info!("Peripherals initialized");

    let config: &'static BridgeConfig = CONFIG.init(config::load());

    // Pin groups: outputs, inputs, then per-pin edge overrides
    let mut pins = BoardPins::new(PinBank::from_peripherals(p));
    if let Err(e) = configure_pins(config, &mut pins) {
        error!("Pin configuration failed: {}", e);
        defmt::panic!("pin configuration failed");
    }

    let ctx: &'static AppContext = CONTEXT.init(AppContext::new(config));

    if let Err(e) = interrupts::start_alarms(config, ctx) {
        error!("Timer configuration failed: {}", e);
        defmt::panic!("timer configuration failed");
    }
    info!("{} alarm timer(s) armed", config.timers.timers.len());

    let edge_spawner = interrupts::start_edge_executor();
    let high_spawner = interrupts::start_high_executor();

    // Edge sources: watcher at interrupt priority, consumer per its task spec
    for (i, src) in config.gpio.iter().enumerate() {
        let input = match pins.take_edge_input(src.pin) {
            Ok(input) => input,
            Err(e) => {
                error!("GPIO {} not available as edge input: {}", src.pin, e);
                defmt::panic!("gpio source setup failed");
            }
        };
        let Some(queue) = ctx.gpio_queue(i) else {
            defmt::panic!("no queue for gpio source {}", i);
        };

        let bridge = EdgeBridge::new(EdgeSource::new(src.pin), queue);
        unwrap!(edge_spawner.spawn(tasks::edge_watch_task(input, bridge)));
        unwrap!(spawn_on(
            &src.task,
            &spawner,
            &high_spawner,
            tasks::gpio_task(src.task.name.as_str(), queue),
        ));
    }

    unwrap!(spawn_on(
        &config.timers.task,
        &spawner,
        &high_spawner,
        tasks::timer_task(ctx.timer_queue()),
    ));

    let demo = &config.demo;
    unwrap!(spawn_on(
        &demo.counter_task,
        &spawner,
        &high_spawner,
        tasks::counter_task(ctx.counter_queue()),
    ));
    unwrap!(spawn_on(
        &demo.peek_task,
        &spawner,
        &high_spawner,
        tasks::peek_task(ctx.counter_queue(), demo.peek_timeout_ms, demo.peek_interval_ms),
    ));

    unwrap!(spawner.spawn(tasks::diagnostics_task(ctx)));
    unwrap!(spawner.spawn(tasks::heartbeat_task(
        pins.take_outputs(),
        config.heartbeat.period_ms
    )));

    info!("All tasks spawned, firmware running");
}
