//! Shared pipeline state
//!
//! The application context is built once in `main` and then handed to
//! every task and interrupt handler as a `&'static` reference.

use irqbridge_core::config::BridgeConfig;
use irqbridge_core::AppContext;
use static_cell::StaticCell;

/// Validated board configuration
pub static CONFIG: StaticCell<BridgeConfig> = StaticCell::new();

/// All pipeline queues: one per GPIO source, the timer queue, the demo queue
pub static CONTEXT: StaticCell<AppContext> = StaticCell::new();
