//! Typed wrappers over the raw `ecall` trampolines in [`ffi`].
//!
//! On failure these write the negated error code into the calling thread's
//! errno cell before returning `Err` — the kernel exposes that cell only as
//! an address (see `ERRNO` syscall), it never writes to it itself.

use ko6_abi::Error as SysError;

pub mod ffi;

fn set_errno(code: isize) {
    let addr = ffi::errno(0, 0, 0, 0);
    if addr < 0 {
        return;
    }
    #[expect(clippy::cast_sign_loss)]
    let ptr = addr as usize as *mut i32;
    #[expect(clippy::cast_possible_truncation)]
    unsafe {
        ptr.write(code as i32);
    }
}

fn to_result(ret: isize) -> Result<usize, SysError> {
    if ret < 0 {
        set_errno(ret);
        Err(SysError::from_negated_code(ret).unwrap_or(SysError::GenericFailure))
    } else {
        #[expect(clippy::cast_sign_loss)]
        Ok(ret as usize)
    }
}

fn to_result_unit(ret: isize) -> Result<(), SysError> {
    to_result(ret).map(drop)
}

pub fn exit(status: i64) -> ! {
    #[expect(clippy::cast_sign_loss)]
    ffi::exit(status as usize, 0, 0, 0);
    unreachable!("Exit does not return")
}

pub fn read(buf: &mut [u8]) -> Result<usize, SysError> {
    to_result(ffi::read(0, buf.as_mut_ptr() as usize, buf.len(), 0))
}

pub fn write(fd: usize, buf: &[u8]) -> Result<usize, SysError> {
    to_result(ffi::write(fd, buf.as_ptr() as usize, buf.len(), 0))
}

pub fn clock() -> Result<usize, SysError> {
    to_result(ffi::clock(0, 0, 0, 0))
}

/// # Safety
///
/// `dst` and `src` must each point to at least `len` bytes of valid,
/// non-overlapping memory.
pub unsafe fn dma_memcpy(dst: *mut u8, src: *const u8, len: usize) -> Result<usize, SysError> {
    to_result(ffi::dma_memcpy(dst as usize, src as usize, len, 0))
}

pub fn cache_line_size() -> Result<usize, SysError> {
    to_result(ffi::cache_line_size(0, 0, 0, 0))
}

pub fn dcache_buf_inval(addr: usize, len: usize) -> Result<(), SysError> {
    to_result_unit(ffi::dcache_buf_inval(addr, len, 0, 0))
}

pub fn dcache_inval() -> Result<(), SysError> {
    to_result_unit(ffi::dcache_inval(0, 0, 0, 0))
}

/// # Safety
///
/// Shrinking the break invalidates memory beyond the new break that the
/// caller may still hold references into.
pub unsafe fn sbrk(increment: isize) -> Result<*mut u8, SysError> {
    #[expect(clippy::cast_sign_loss)]
    let raw = ffi::sbrk(increment as usize, 0, 0, 0);
    to_result(raw).map(|addr| core::ptr::with_exposed_provenance_mut(addr))
}

pub fn errno_addr() -> *mut i32 {
    let raw = ffi::errno(0, 0, 0, 0);
    debug_assert!(raw >= 0, "ERRNO syscall failed");
    #[expect(clippy::cast_sign_loss)]
    core::ptr::with_exposed_provenance_mut(raw as usize)
}

pub fn thread_create(entry: usize, arg: usize) -> Result<u32, SysError> {
    #[expect(clippy::cast_possible_truncation)]
    to_result(ffi::thread_create(entry, arg, 0, 0)).map(|tid| tid as u32)
}

pub fn thread_yield() {
    ffi::thread_yield(0, 0, 0, 0);
}

pub fn thread_exit(status: i64) -> ! {
    #[expect(clippy::cast_sign_loss)]
    ffi::thread_exit(status as usize, 0, 0, 0);
    unreachable!("ThreadExit does not return")
}

pub fn sched_dump() {
    ffi::sched_dump(0, 0, 0, 0);
}

/// Returns the raw `a0` the joined thread exited with. The kernel encodes
/// this straight from the thread's exit code without the usual
/// negative-means-error convention, so a small negative exit code and a
/// join-time error are not distinguishable from this return value alone.
pub fn thread_join(tid: u32) -> i64 {
    ffi::thread_join(tid as usize, 0, 0, 0) as i64
}

pub fn mutex_init(id: usize) -> Result<(), SysError> {
    to_result_unit(ffi::mutex_init(id, 0, 0, 0))
}

pub fn mutex_lock(id: usize) -> Result<(), SysError> {
    to_result_unit(ffi::mutex_lock(id, 0, 0, 0))
}

pub fn mutex_unlock(id: usize) -> Result<(), SysError> {
    to_result_unit(ffi::mutex_unlock(id, 0, 0, 0))
}

pub fn mutex_destroy(id: usize) -> Result<(), SysError> {
    to_result_unit(ffi::mutex_destroy(id, 0, 0, 0))
}

pub fn barrier_init(id: usize, count: u32) -> Result<(), SysError> {
    to_result_unit(ffi::barrier_init(id, count as usize, 0, 0))
}

pub fn barrier_wait(id: usize) -> Result<(), SysError> {
    to_result_unit(ffi::barrier_wait(id, 0, 0, 0))
}

pub fn barrier_destroy(id: usize) -> Result<(), SysError> {
    to_result_unit(ffi::barrier_destroy(id, 0, 0, 0))
}

pub fn kshell() {
    ffi::kshell(0, 0, 0, 0);
}
