//! irqbridge Hardware Abstraction Layer
//!
//! This crate defines the hardware seams the event pipeline needs: pin
//! configuration, level sampling, output driving and alarm timers. Chip
//! crates implement them; `irqbridge-core` only talks to these traits, so
//! the whole pipeline can be exercised on the host against simulated
//! hardware.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  irqbridge-firmware                     │
//! └─────────────────────────────────────────┘
//!          │                       │
//!          ▼                       ▼
//! ┌──────────────────┐   ┌──────────────────┐
//! │  irqbridge-core  │──▶│  irqbridge-hal   │
//! └──────────────────┘   └──────────────────┘
//!                                  ▲
//!                        ┌─────────┴─────────┐
//!                        │ irqbridge-hal-    │
//!                        │     rp2040        │
//!                        └───────────────────┘
//! ```
//!
//! # Traits
//!
//! - [`gpio::OutputPin`], [`gpio::LevelReader`] - Digital I/O
//! - [`gpio::PinConfigurator`] - Grouped pin setup and edge selection
//! - [`timer::AlarmTimer`], [`timer::CounterReader`] - Hardware alarm timers

#![no_std]
#![deny(unsafe_code)]

pub mod error;
pub mod gpio;
pub mod limits;
pub mod timer;

// Re-export key traits at crate root for convenience
pub use error::HalError;
pub use gpio::{Direction, Edge, Level, LevelReader, OutputPin, PinConfigurator, PinGroupConfig, PinMask};
pub use limits::ChipLimits;
pub use timer::{ticks_since, AlarmTimer, CounterReader, TimerId, TimerSetup};
