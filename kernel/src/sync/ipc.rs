//! Mutex and barrier syscalls: thin glue between [`sched_core`]'s
//! FIFO wait-queue bookkeeping and [`crate::thread`]'s park/unpark.
//!
//! `sched_core::{MutexTable, BarrierTable}` only decide *who* should park or
//! be woken — they never touch the scheduler themselves (see their own doc
//! comments) — so this module is where that decision turns into an actual
//! context switch. Both tables index straight into fixed arrays with no
//! bounds check, so every entry point here validates `id` first.

use once_init::OnceInit;
use sched_core::{
    BarrierError, BarrierOutcome, BarrierTable, LockOutcome, MutexError, MutexTable, UnlockOutcome,
    barrier::Table as BarrierInner, mutex::Table as MutexInner,
};

use crate::{
    param::{NBARRIER, NMUTEX},
    sync::SpinLock,
    thread::{self, Tid},
};

type Ko6MutexTable = MutexTable<NMUTEX, SpinLock<MutexInner<NMUTEX>>>;
type Ko6BarrierTable = BarrierTable<NBARRIER, SpinLock<BarrierInner<NBARRIER>>>;

static MUTEXES: OnceInit<Ko6MutexTable> = OnceInit::new();
static BARRIERS: OnceInit<Ko6BarrierTable> = OnceInit::new();

/// # Safety
///
/// Must be called exactly once during bring-up, before any thread can reach
/// a mutex or barrier syscall.
pub unsafe fn init() {
    MUTEXES.init(Ko6MutexTable::new());
    BARRIERS.init(Ko6BarrierTable::new());
}

fn mutexes() -> &'static Ko6MutexTable {
    MUTEXES.get()
}

fn barriers() -> &'static Ko6BarrierTable {
    BARRIERS.get()
}

fn check_id(id: usize, count: usize) -> Result<(), ko6_abi::Error> {
    if id < count {
        Ok(())
    } else {
        Err(ko6_abi::Error::InvalidArgument)
    }
}

fn mutex_err(e: MutexError) -> ko6_abi::Error {
    match e {
        MutexError::NotInitialized => ko6_abi::Error::InvalidArgument,
        MutexError::NotPermitted => ko6_abi::Error::NotPermitted,
        MutexError::NotOwner => ko6_abi::Error::PermissionDenied,
        MutexError::Busy => ko6_abi::Error::Busy,
    }
}

fn barrier_err(e: BarrierError) -> ko6_abi::Error {
    match e {
        BarrierError::NotInitialized => ko6_abi::Error::InvalidArgument,
        BarrierError::Busy => ko6_abi::Error::Busy,
    }
}

/// Force-destroys every mutex and barrier and wakes every thread parked on
/// one of their wait queues, regardless of owner or arrival count. Called
/// once, when the process's main thread exits: synchronization objects
/// have no owning process beyond the one ko6 runs, so they can't simply be
/// left behind, and their waiters can't be left parked forever on an
/// object nobody will ever signal again.
pub fn cleanup() {
    mutexes().force_destroy_all(thread::unpark_one);
    barriers().force_destroy_all(thread::unpark_one);
}

pub fn mutex_init(id: usize) -> Result<(), ko6_abi::Error> {
    check_id(id, NMUTEX)?;
    mutexes().init(id);
    Ok(())
}

pub fn mutex_destroy(id: usize) -> Result<(), ko6_abi::Error> {
    check_id(id, NMUTEX)?;
    mutexes().destroy(id).map_err(mutex_err)
}

/// Locks `id` on behalf of `tid`, parking the calling thread if another
/// thread already holds it. Returns once `tid` owns the mutex.
pub fn mutex_lock(id: usize, tid: Tid) -> Result<(), ko6_abi::Error> {
    check_id(id, NMUTEX)?;
    match mutexes().lock(id, tid).map_err(mutex_err)? {
        LockOutcome::Acquired => Ok(()),
        LockOutcome::WouldBlock => {
            // `tid` is its own wait channel: `unpark_one` wakes it by tid
            // directly, so there's no separate channel value to invent.
            thread::park(tid);
            Ok(())
        }
    }
}

pub fn mutex_unlock(id: usize, tid: Tid) -> Result<(), ko6_abi::Error> {
    check_id(id, NMUTEX)?;
    match mutexes().unlock(id, tid).map_err(mutex_err)? {
        UnlockOutcome::Idle => {}
        UnlockOutcome::HandedTo(next) => thread::unpark_one(next),
    }
    Ok(())
}

pub fn barrier_init(id: usize, count: u32) -> Result<(), ko6_abi::Error> {
    check_id(id, NBARRIER)?;
    barriers().init(id, count).map_err(barrier_err)
}

pub fn barrier_destroy(id: usize) -> Result<(), ko6_abi::Error> {
    check_id(id, NBARRIER)?;
    barriers().destroy(id).map_err(barrier_err)
}

/// Records `tid`'s arrival at `id`. Parks the calling thread unless it is
/// the arrival that completes the phase, in which case every other waiter
/// is unparked before returning.
pub fn barrier_wait(id: usize, tid: Tid) -> Result<(), ko6_abi::Error> {
    check_id(id, NBARRIER)?;
    match barriers().wait(id, tid).map_err(barrier_err)? {
        BarrierOutcome::WouldBlock => {
            thread::park(tid);
            Ok(())
        }
        BarrierOutcome::Released(waiters) => {
            for waiter in waiters {
                thread::unpark_one(waiter);
            }
            Ok(())
        }
    }
}
