//! Thread creation, scheduling, and the mutex/barrier primitives the
//! scheduler parks threads on.

use core::{num::NonZero, time::Duration};

use ko6_types::ThreadId;

use crate::{error::Error, os::ko6::syscall, time::Instant};

/// Spawns `entry` as a new thread sharing this one's address space, passing
/// `arg` through unchanged.
pub fn create(entry: extern "C" fn(usize), arg: usize) -> Result<ThreadId, Error> {
    let tid = syscall::thread_create(entry as usize, arg)?;
    let tid = NonZero::new(tid).ok_or(ko6_abi::Error::InvalidArgument)?;
    Ok(ThreadId::new(tid))
}

/// Gives up the remainder of this thread's time slice.
pub fn yield_now() {
    syscall::thread_yield();
}

/// Terminates the calling thread with the given exit code. Does not return.
pub fn exit(status: i64) -> ! {
    syscall::thread_exit(status)
}

/// Blocks until `tid` exits, returning the code it exited with.
#[must_use]
pub fn join(tid: ThreadId) -> i64 {
    syscall::thread_join(tid.get())
}

/// Prints the scheduler's run queue to the console, for debugging.
pub fn sched_dump() {
    syscall::sched_dump();
}

/// There is no dedicated sleep syscall: a thread blocks by yielding
/// repeatedly until [`Instant::now`] clears the deadline. Coarse (the clock
/// ticks at whatever rate `drivers::timer` is configured for) but needs no
/// kernel-side timer-queue support.
pub fn sleep(dur: Duration) {
    let Some(deadline) = Instant::now().checked_add(dur) else {
        return;
    };
    while Instant::now() < deadline {
        yield_now();
    }
}
