//! Thread scheduling: wraps [`sched_core::scheduler::Scheduler`] with the
//! real RISC-V context switch, per-thread user stacks, and the single-CPU
//! dispatch loop.
//!
//! Two context switches only ever happen: idle-to-thread (in [`run`], the
//! dispatch loop) and thread-to-idle (everywhere a thread suspends). A
//! thread never switches directly into another thread — it always hands
//! control back to [`run`], which then picks the next one. Same shape as
//! the teacher's own scheduler/idle split, just without a per-process
//! address space to juggle on the way.

mod context;
mod switch;

use core::{
    cell::UnsafeCell,
    sync::atomic::{AtomicU32, Ordering},
};

use once_init::OnceInit;
use sched_core::scheduler::{JoinOutcome, SchedError, Scheduler, Table};

pub use sched_core::scheduler::Tid;

pub use self::context::Context;
use self::switch::switch;
use crate::{irq, param::NTHREAD, println, sync::SpinLock, ustack};

type Ko6Scheduler = Scheduler<NTHREAD, Context, SpinLock<Table<NTHREAD, Context>>>;

static SCHED: OnceInit<Ko6Scheduler> = OnceInit::new();

/// The running thread on this CPU, or 0 (never a valid [`Tid`]) while the
/// dispatch loop itself is running.
static CURRENT: AtomicU32 = AtomicU32::new(0);

/// The process's main thread — ko6 runs a single process, so this is set
/// once, by [`main`](crate::main) right after it spawns `init_thread`, and
/// never changes again. 0 (never a valid [`Tid`]) until then.
static MAIN_TID: AtomicU32 = AtomicU32::new(0);

struct IdleCell(UnsafeCell<Context>);

// Only `run()` and the thread currently switching back to it ever touch
// this, and the two never run concurrently on ko6's single CPU.
unsafe impl Sync for IdleCell {}

static IDLE: IdleCell = IdleCell(UnsafeCell::new(Context::zeroed()));

/// # Safety
///
/// Must be called exactly once, before any thread is created, and before
/// interrupts are enabled.
pub unsafe fn init() {
    SCHED.init(Ko6Scheduler::new());
}

fn sched() -> &'static Ko6Scheduler {
    SCHED.get()
}

/// The calling thread's tid, or `None` from the boot/dispatch-loop context.
pub fn current() -> Option<Tid> {
    match CURRENT.load(Ordering::Relaxed) {
        0 => None,
        tid => Some(tid),
    }
}

/// Records `tid` as the process's main thread. Called exactly once, from
/// `main`, right after the first thread is created.
pub fn set_main(tid: Tid) {
    MAIN_TID.store(tid, Ordering::Relaxed);
}

/// Creates a thread that will run `f(arg)`, with its own stack, and
/// enqueues it `Ready`.
pub fn create(f: extern "C" fn(usize), arg: usize) -> Result<Tid, ko6_abi::Error> {
    let tid = sched()
        .create(|ctx| {
            *ctx = Context::zeroed();
            ctx.entry_fn = f as usize;
            ctx.entry_arg = arg;
            ctx.ra = bootstrap as usize;
        })
        .map_err(|e| match e {
            SchedError::OutOfMemory => ko6_abi::Error::OutOfMemory,
            SchedError::NoSuchThread => unreachable!("create never fails with NoSuchThread"),
        })?;
    let sp = ustack::init(tid);
    sched().context_mut(tid, |ctx| ctx.sp = sp);
    Ok(tid)
}

/// Moves the calling thread to the tail of the ready queue and dispatches
/// another.
pub fn yield_now() {
    let Some(tid) = current() else { return };
    ustack::check(tid);
    sched().yield_now(tid);
    yield_to_scheduler();
}

/// Ends the calling thread, stashing `retval` for a joiner. Never returns.
///
/// If `tid` is the process's main thread, the process itself is exiting:
/// every mutex and barrier it created is force-destroyed and its waiters
/// woken before the thread table is touched, per the scheduler's process
/// cleanup contract.
pub fn exit(retval: i64) -> ! {
    let tid = current().expect("exit() called outside a thread");
    ustack::check(tid);
    if tid == MAIN_TID.load(Ordering::Relaxed) {
        crate::sync::ipc::cleanup();
    }
    sched().exit(tid, retval);
    yield_to_scheduler();
    unreachable!("a Dead thread was dispatched");
}

/// Blocks until `target` has exited, reaping it. `target` must not be
/// joined twice.
pub fn join(target: Tid) -> Result<i64, ko6_abi::Error> {
    let me = current().expect("join() called outside a thread");
    loop {
        match sched().join(me, target) {
            Ok(JoinOutcome::Reaped(retval)) => return Ok(retval),
            Ok(JoinOutcome::WouldBlock) => yield_to_scheduler(),
            Err(SchedError::NoSuchThread) => return Err(ko6_abi::Error::NoSuchThread),
            Err(SchedError::OutOfMemory) => unreachable!("join never allocates"),
        }
    }
}

/// Blocks the calling thread on wait channel `chan` — used by
/// [`crate::sync`]'s mutex/barrier wrappers, not called directly by
/// syscalls.
pub fn park(chan: Tid) {
    let tid = current().expect("park() called outside a thread");
    sched().park(tid, chan);
    yield_to_scheduler();
}

/// Wakes every thread parked on `chan`.
pub fn unpark_all(chan: Tid) {
    sched().unpark_all(chan);
}

/// Wakes exactly `tid`, which must be `Waiting`.
pub fn unpark_one(tid: Tid) {
    sched().unpark_one(tid);
}

/// The address of the calling thread's private `errno` slot. User-space
/// syscall wrappers write to it directly on failure; the kernel itself
/// never touches it after a syscall returns (see [`crate::syscall`]).
pub fn errno_addr() -> usize {
    let tid = current().expect("errno_addr() called outside a thread");
    sched().context_mut(tid, |ctx| core::ptr::addr_of_mut!(ctx.errno) as usize)
}

/// Prints every non-`Unused` thread and its state.
pub fn sched_dump() {
    sched().for_each(|tid, state| println!("  tid {tid:>3}: {state:?}"));
}

/// Hands control back to [`run`]'s dispatch loop. The calling thread's
/// scheduler-visible state (ready/waiting/zombie) must already be set by
/// the caller before this returns control away.
fn yield_to_scheduler() {
    let tid = current().expect("yield_to_scheduler() called outside a thread");
    // Safety: the lock is released before `switch` runs, but nothing else
    // touches this slot's context while this thread isn't `Running` —
    // exactly the same hand-off the teacher's own scheduler/swtch split
    // relies on.
    let my_ctx: *mut Context = sched().context_mut(tid, |ctx| core::ptr::from_mut(ctx));
    unsafe {
        switch(my_ctx, IDLE.0.get());
    }
}

/// The dispatch loop: never returns. Call once, from the boot stack, after
/// every other subsystem has been brought up.
pub fn run() -> ! {
    loop {
        if let Some(tid) = sched().dispatch() {
            CURRENT.store(tid, Ordering::Relaxed);
            let thread_ctx: *const Context = sched().context_mut(tid, |ctx| core::ptr::from_ref(ctx));
            unsafe {
                switch(IDLE.0.get(), thread_ctx);
            }
            CURRENT.store(0, Ordering::Relaxed);
        } else {
            irq::enable();
            unsafe {
                core::arch::asm!("wfi");
            }
            irq::disable();
        }
    }
}

/// First code a freshly created thread runs, reached via `ret` out of
/// [`switch`] the first time it's dispatched.
extern "C" fn bootstrap() -> ! {
    let tid = current().expect("bootstrap running without a current tid");
    let (entry_fn, entry_arg) = sched().context_mut(tid, |ctx| (ctx.entry_fn, ctx.entry_arg));
    irq::enable();
    let entry: extern "C" fn(usize) = unsafe { core::mem::transmute(entry_fn) };
    entry(entry_arg);
    exit(0);
}
