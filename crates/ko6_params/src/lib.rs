//! Compile-time constants shared between the kernel and user-space runtime.

#![no_std]

/// Maximum number of threads, system-wide (including the main thread).
pub const NTHREAD: usize = 64;

/// Number of CPUs the scheduler is aware of. ko6 schedules a single CPU in
/// practice; `cpuid` exists for future SMP extension only.
pub const NCPU: usize = 1;

/// Maximum number of device records, across all kinds combined.
pub const NDEV: usize = 32;

/// Maximum number of live mutexes.
pub const NMUTEX: usize = 64;

/// Maximum number of live barriers.
pub const NBARRIER: usize = 32;

/// Capacity of the interrupt routing vector, indexed by hardware IRQ number.
pub const IRQ_VECTOR_CAPACITY: usize = 1024;

/// Depth of a character device's software receive FIFO.
pub const CHARDEV_FIFO_DEPTH: usize = 20;

/// Logical block size in bytes, used by every block device and the block
/// I/O cache.
pub const BLOCK_SIZE: usize = 4096;

/// Number of directory entries in block 0 of an `mkdx` disk image.
pub const DIR_ENTRIES: usize = 128;

/// Length, in bytes, of a directory entry's name field (NUL-padded).
pub const DIR_NAME_LEN: usize = 24;

/// Size, in pages, of a single user thread's stack slot.
pub const USTACK_PAGES: usize = 16;

/// Number of syscall numbers the dispatch vector reserves. Must be a power
/// of two.
pub const NSYSCALL: usize = 32;

/// Maximum number of open files per process. Reserved for the `fs`
/// collaborator; not exercised by the kernel core.
pub const NOFILE: usize = 16;

const _: () = assert!(NSYSCALL.is_power_of_two());
