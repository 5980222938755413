//! Compile-time kernel configuration.
//!
//! Geometry shared with user-space (thread/device/mutex counts, buffer
//! sizes) lives in [`ko6_params`]; re-exported here so kernel code has one
//! place to pull constants from. Anything below is kernel-only.

pub use ko6_params::{
    BLOCK_SIZE, CHARDEV_FIFO_DEPTH, DIR_ENTRIES, DIR_NAME_LEN, IRQ_VECTOR_CAPACITY, NBARRIER,
    NCPU, NDEV, NMUTEX, NOFILE, NSYSCALL, NTHREAD, USTACK_PAGES,
};

/// Number of block-cache buffers kept resident.
///
/// Sized generously relative to the single ramdisk this kernel drives; a
/// real block device count would derive this from platform bring-up.
pub const NBUF: usize = 64;

/// Cache line size reported to user space via the `CacheLineSize` syscall.
/// The soft DMA device moves data with an ordinary `memcpy` (see
/// [`crate::drivers::dma`]), so ko6 has no real cache-maintenance work to
/// do; this constant and the `DCacheInval`/`DCacheBufInval` syscalls exist
/// so user code written against a cache-coherent-by-hardware target still
/// links and runs unmodified.
pub const CACHE_LINE_SIZE: usize = 64;
