//! The user heap: a single high-water mark inside
//! [`memlayout::user_heap_region`], grown by the `Sbrk` syscall.
//!
//! ko6 has no address-space isolation, so "user heap" is just a region of
//! physical RAM the kernel promises not to use for anything else; growing
//! it is nothing more than bumping the mark and handing back the old value,
//! with no page tables to update.

use crate::{memlayout, sync::SpinLock};

static BRK: SpinLock<usize> = SpinLock::new(0);

/// Resets the break to the bottom of the heap region. Must run once during
/// bring-up, before any thread can call `sbrk`.
pub fn init() {
    *BRK.lock() = memlayout::user_heap_region().start;
}

/// Grows (or shrinks, for negative `increment`) the break by `increment`
/// bytes and returns the break's value *before* the change — the classic
/// `sbrk` contract. Fails without changing anything if the new break would
/// fall outside the heap region.
pub fn sbrk(increment: isize) -> Result<usize, ko6_abi::Error> {
    let region = memlayout::user_heap_region();
    let mut brk = BRK.lock();
    #[expect(clippy::cast_possible_wrap, clippy::cast_sign_loss)]
    let new_brk = (*brk as isize)
        .checked_add(increment)
        .ok_or(ko6_abi::Error::Overflow)? as usize;
    if new_brk < region.start || new_brk > region.end {
        return Err(ko6_abi::Error::OutOfMemory);
    }
    let old_brk = *brk;
    *brk = new_brk;
    Ok(old_brk)
}
