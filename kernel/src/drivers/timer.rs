//! Timer driver, backing the timer driver-op table.
//!
//! `qemu-virt-riscv` has no separately addressed timer-compare register on
//! this path: the `sstc` extension lets supervisor mode reprogram
//! `stimecmp` directly, without trapping through the CLINT's machine-mode
//! MMIO window the way the boot sequence's first-ever timer interrupt (see
//! `start.rs`) does. So `base` here is accepted for driver-op-table
//! uniformity but unused; the real state is the `stimecmp`/`time` CSR pair.

use core::{arch::asm, sync::atomic::{AtomicU64, Ordering}};

use crate::sync::SpinLock;

struct TimerState {
    period: u64,
    event: Option<(fn(usize), usize)>,
}

static STATE: SpinLock<TimerState> = SpinLock::new(TimerState {
    period: 0,
    event: None,
});

/// Ticks elapsed, for diagnostics (`CLOCK` syscall grounds its answer in
/// this alongside the raw `time` CSR).
static TICKS: AtomicU64 = AtomicU64::new(0);

pub struct TimerOps {
    pub init: fn(base: usize, tick: u64),
    pub set_tick: fn(cycles: u64),
    pub set_event: fn(f: fn(usize), arg: usize),
}

pub static CLINT_OPS: TimerOps = TimerOps {
    init,
    set_tick,
    set_event,
};

fn init(_base: usize, tick: u64) {
    set_tick(tick);
}

/// `cycles == 0` disables timer interrupts; otherwise arms `stimecmp` to
/// fire `cycles` ticks from now and remembers the period for reload.
fn set_tick(cycles: u64) {
    STATE.lock().period = cycles;
    if cycles == 0 {
        unsafe {
            asm!("csrw stimecmp, {}", in(reg) u64::MAX);
        }
        return;
    }
    let now: u64;
    unsafe {
        asm!("csrr {}, time", out(reg) now);
        asm!("csrw stimecmp, {}", in(reg) now + cycles);
    }
}

fn set_event(f: fn(usize), arg: usize) {
    STATE.lock().event = Some((f, arg));
}

/// Called from the trap handler on every supervisor timer interrupt:
/// reloads the period and invokes the bound event, typically
/// `thread::yield_now`.
pub fn on_tick() {
    TICKS.fetch_add(1, Ordering::Relaxed);
    let (period, event) = {
        let state = STATE.lock();
        (state.period, state.event)
    };
    if period != 0 {
        let now: u64;
        unsafe {
            asm!("csrr {}, time", out(reg) now);
            asm!("csrw stimecmp, {}", in(reg) now + period);
        }
    }
    if let Some((f, arg)) = event {
        f(arg);
    }
}

pub fn ticks() -> u64 {
    TICKS.load(Ordering::Relaxed)
}
