//! Interrupt handlers and interrupt-priority executors
//!
//! Priority layout (lower number preempts higher):
//!
//! | Level | Runs |
//! |-------|------|
//! | P1 | TIMER_IRQ_1..3 alarm handlers, edge watchers (SWI_IRQ_1) |
//! | P2 | consumer tasks with priority >= 8 (SWI_IRQ_0) |
//! | thread | everything else |

use core::cell::RefCell;

use embassy_executor::{InterruptExecutor, SendSpawner};
use embassy_rp::interrupt;
use embassy_rp::interrupt::{Interrupt, InterruptExt, Priority};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;

use irqbridge_core::config::BridgeConfig;
use irqbridge_core::timer::{AlarmSource, TimerBridge};
use irqbridge_core::AppContext;
use irqbridge_hal::HalError;
use irqbridge_hal_rp2040::RpAlarm;

/// Executor for the edge watchers
static EXECUTOR_EDGE: InterruptExecutor = InterruptExecutor::new();

/// Executor for interrupt-tier consumer tasks
static EXECUTOR_HIGH: InterruptExecutor = InterruptExecutor::new();

type AlarmBridge = TimerBridge<'static, RpAlarm>;

/// Alarm handler state, indexed by TIMER alarm number
static ALARMS: Mutex<CriticalSectionRawMutex, RefCell<[Option<AlarmBridge>; 4]>> =
    Mutex::new(RefCell::new([None, None, None, None]));

#[interrupt]
unsafe fn SWI_IRQ_1() {
    EXECUTOR_EDGE.on_interrupt()
}

#[interrupt]
unsafe fn SWI_IRQ_0() {
    EXECUTOR_HIGH.on_interrupt()
}

#[interrupt]
fn TIMER_IRQ_1() {
    on_alarm(1);
}

#[interrupt]
fn TIMER_IRQ_2() {
    on_alarm(2);
}

#[interrupt]
fn TIMER_IRQ_3() {
    on_alarm(3);
}

fn on_alarm(index: usize) {
    ALARMS.lock(|alarms| {
        if let Some(bridge) = alarms.borrow_mut()[index].as_mut() {
            bridge.fire();
        }
    });
}

fn alarm_interrupt(index: u8) -> Result<Interrupt, HalError> {
    match index {
        1 => Ok(interrupt::TIMER_IRQ_1),
        2 => Ok(interrupt::TIMER_IRQ_2),
        3 => Ok(interrupt::TIMER_IRQ_3),
        _ => Err(HalError::InvalidTimer { group: 0, index }),
    }
}

/// Start the executor the edge watchers run on
pub fn start_edge_executor() -> SendSpawner {
    interrupt::SWI_IRQ_1.set_priority(Priority::P1);
    EXECUTOR_EDGE.start(interrupt::SWI_IRQ_1)
}

/// Start the executor for interrupt-tier consumer tasks
pub fn start_high_executor() -> SendSpawner {
    interrupt::SWI_IRQ_0.set_priority(Priority::P2);
    EXECUTOR_HIGH.start(interrupt::SWI_IRQ_0)
}

/// Configure every timer, bind its handler, then unmask its interrupt
pub fn start_alarms(config: &BridgeConfig, ctx: &'static AppContext) -> Result<(), HalError> {
    for timer in &config.timers.timers {
        let irq = alarm_interrupt(timer.index)?;
        let source = AlarmSource::start(RpAlarm::new(timer.id())?, timer.descriptor())?;
        let bridge = TimerBridge::new(source, ctx.timer_queue());

        ALARMS.lock(|alarms| alarms.borrow_mut()[timer.index as usize] = Some(bridge));

        irq.unpend();
        irq.set_priority(Priority::P1);
        // SAFETY: the handler only touches ALARMS, which is populated above
        unsafe { irq.enable() };
    }
    Ok(())
}
