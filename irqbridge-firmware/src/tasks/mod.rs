//! Embassy async tasks
//!
//! Edge watchers feed the GPIO queues; every other task consumes a queue
//! or drives the heartbeat outputs.

pub mod demo;
pub mod diagnostics;
pub mod edge;
pub mod gpio;
pub mod heartbeat;
pub mod timer;

pub use demo::{counter_task, peek_task};
pub use diagnostics::diagnostics_task;
pub use edge::edge_watch_task;
pub use gpio::gpio_task;
pub use heartbeat::heartbeat_task;
pub use timer::timer_task;
