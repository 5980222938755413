//! Shared ABI surface between the kernel and user-space runtime: syscall
//! numbers, the raw register convention, and the error taxonomy.

#![no_std]

mod error;

pub use error::Error;

/// Syscall numbers, as indexed into the kernel's fixed dispatch vector.
///
/// The vector has `ko6_params::NSYSCALL` entries; numbers are assigned
/// densely from zero so the enum's discriminant doubles as the vector index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::FromRepr)]
#[repr(usize)]
pub enum SyscallNumber {
    Exit = 0,
    Read = 1,
    Write = 2,
    Clock = 3,
    DmaMemcpy = 4,
    CacheLineSize = 5,
    DCacheBufInval = 6,
    DCacheInval = 7,
    Sbrk = 8,
    Errno = 9,
    ThreadCreate = 10,
    ThreadYield = 11,
    ThreadExit = 12,
    SchedDump = 13,
    ThreadJoin = 14,
    MutexInit = 15,
    MutexLock = 16,
    MutexUnlock = 17,
    MutexDestroy = 18,
    BarrierInit = 19,
    BarrierWait = 20,
    BarrierDestroy = 21,
    Kshell = 22,
}

/// Raw argument registers carried across a syscall trap: `a0..a3` plus the
/// syscall number itself, matching the CPU-agnostic five-integer ABI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RawArgs {
    pub a0: usize,
    pub a1: usize,
    pub a2: usize,
    pub a3: usize,
}

/// Encodes a syscall return value onto the single-register convention:
/// non-negative on success, the negated error code on failure.
#[must_use]
pub fn encode_return(result: Result<usize, Error>) -> isize {
    match result {
        #[expect(clippy::cast_possible_wrap)]
        Ok(value) => value as isize,
        Err(e) => -e.code(),
    }
}
