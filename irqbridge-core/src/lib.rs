//! Board-agnostic core of the interrupt-to-task event pipeline
//!
//! Everything here runs the same on the target and on the host:
//!
//! - Bounded interrupt-safe event queue with an explicit overflow policy
//! - Generic interrupt bridge (capture, enqueue, report wake hint)
//! - GPIO edge dispatch and the pin consumer
//! - Timer alarm engine with auto-reload and drift-free one-shot rearm
//! - Producer/peek demo logic and the heartbeat counter
//! - Configuration types, parser and startup validation
//! - Application context shared by tasks and handlers

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod config;
pub mod context;
pub mod demo;
pub mod gpio;
pub mod irq;
pub mod queue;
pub mod setup;
pub mod timer;

pub use context::AppContext;
pub use irq::{IrqBridge, IrqSource};
pub use queue::{EventQueue, OverflowPolicy, SendOutcome, SendStatus};
