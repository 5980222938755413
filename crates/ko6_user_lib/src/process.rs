//! Operations that act on the single running image as a whole, rather than
//! on one thread within it: the heap break, the wall clock, and the
//! soft-DMA/cache-maintenance calls.
//!
//! ko6 has no process concept distinct from "the threads currently
//! scheduled" — there is one address space, and [`exit`] (unlike
//! [`crate::thread::exit`]) tears the whole thing down rather than just the
//! calling thread.

use crate::{error::Error, os::ko6::syscall};

/// Terminates the running image. Does not return.
pub fn exit(status: i64) -> ! {
    syscall::exit(status)
}

/// Returns the current break without moving it.
pub fn current_break() -> Result<*mut u8, Error> {
    unsafe { syscall::sbrk(0) }.map_err(Error::from)
}

/// Raises the break by `size` bytes, returning the break's previous value.
pub fn grow_break(size: usize) -> Result<*mut u8, Error> {
    let increment = isize::try_from(size).map_err(|_| ko6_abi::Error::Overflow)?;
    unsafe { syscall::sbrk(increment) }.map_err(Error::from)
}

/// Lowers the break by `size` bytes, returning the break's previous value.
///
/// # Safety
///
/// Invalidates any outstanding reference into the memory the break no
/// longer covers.
pub unsafe fn shrink_break(size: usize) -> Result<*mut u8, Error> {
    let decrement = isize::try_from(size).map_err(|_| ko6_abi::Error::Overflow)?;
    unsafe { syscall::sbrk(-decrement) }.map_err(Error::from)
}

/// Ticks elapsed on the system clock since boot, per the `CLOCK` syscall.
pub fn clock_ticks() -> Result<usize, Error> {
    syscall::clock().map_err(Error::from)
}

/// The cache line size the kernel's soft-DMA engine was configured with.
pub fn cache_line_size() -> Result<usize, Error> {
    syscall::cache_line_size().map_err(Error::from)
}

/// Copies `len` bytes from `src` to `dst` through the kernel's DMA engine
/// rather than an ordinary load/store loop.
///
/// # Safety
///
/// `dst` and `src` must each point to `len` valid, non-overlapping bytes.
pub unsafe fn dma_memcpy(dst: *mut u8, src: *const u8, len: usize) -> Result<usize, Error> {
    unsafe { syscall::dma_memcpy(dst, src, len) }.map_err(Error::from)
}

/// Flushes `len` bytes at `addr` out of the data cache. A no-op on ko6's
/// target, kept so code written for a cache-coherent-by-hardware platform
/// still links.
pub fn dcache_buf_inval(addr: usize, len: usize) -> Result<(), Error> {
    syscall::dcache_buf_inval(addr, len).map_err(Error::from)
}

/// Invalidates the whole data cache. Same no-op rationale as
/// [`dcache_buf_inval`].
pub fn dcache_inval() -> Result<(), Error> {
    syscall::dcache_inval().map_err(Error::from)
}
