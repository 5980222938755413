//! Fixed-size per-thread stack slots.
//!
//! A slot's address is a pure function of [`Tid`] — `memlayout::ustack_region()`
//! split into `NTHREAD` equal, [`ko6_params::USTACK_PAGES`]-page slots — so
//! there is nothing to allocate or free, only to initialize and check. The
//! guard word sits at a slot's low end (its floor): the stack inside a slot
//! grows down from the slot's high end, so the floor is the first word a
//! runaway stack would smash, not the one at the top.

use sched_core::scheduler::Tid;

use crate::memlayout;

const SLOT_BYTES: usize = ko6_params::USTACK_PAGES * memlayout::PAGE_SIZE;
const GUARD: u64 = 0xdead_c0de_f00d_cafe;

fn slot_base(tid: Tid) -> usize {
    let region = memlayout::ustack_region();
    let index = tid as usize - 1;
    let base = region.start + index * SLOT_BYTES;
    debug_assert!(base + SLOT_BYTES <= region.end);
    base
}

/// Plants `tid`'s guard word and returns the initial stack pointer — the
/// address just above the slot, where a freshly created thread's stack
/// starts growing down from.
pub fn init(tid: Tid) -> usize {
    let base = slot_base(tid);
    unsafe {
        (base as *mut u64).write_volatile(GUARD);
    }
    base + SLOT_BYTES
}

/// Checks that `tid`'s guard word is intact.
///
/// # Panics
///
/// Panics if the guard has been overwritten — the thread's stack overflowed
/// its slot.
pub fn check(tid: Tid) {
    let base = slot_base(tid);
    let guard = unsafe { (base as *const u64).read_volatile() };
    assert_eq!(guard, GUARD, "thread {tid} stack overflow");
}
