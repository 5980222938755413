//! Physical memory layout for the `qemu-virt-riscv` platform.
//!
//! Based on qemu's `hw/riscv/virt.c`:
//!
//! ```text
//! 0x0000_1000 -- boot ROM, provided by qemu
//! 0x0200_0000 -- CLINT (timer)
//! 0x0c00_0000 -- PLIC (interrupt controller)
//! 0x1000_0000 -- UART0 (console 0, primary stdin/stdout)
//! 0x1000_0100 -- UART1 (console 1)
//! 0x8000_0000 -- boot ROM jumps here in machine mode; kernel loads here
//! unused RAM after 0x8000_0000.
//! ```
//!
//! Physical memory past the kernel image is split, low to high, into: the
//! user-stack region (fixed-size 16-page slots, see [`crate::ustack`]), the
//! kernel page/slab arena (see [`crate::mem`]), and the ramdisk backing the
//! block device (see [`crate::drivers::block`]). `end` and `PHYS_TOP` are
//! linker-provided; everything else here is a platform constant, not a
//! linker symbol.

use core::{arch::global_asm, ops::Range};

use crate::param::{NTHREAD, USTACK_PAGES};

pub const KERN_BASE: usize = 0x8000_0000;
pub const PHYS_TOP: usize = KERN_BASE + 128 * 1024 * 1024;

/// Allocation granularity everything below is carved in. Not a hardware
/// page size — ko6 never installs a page table — just the chunk size
/// [`crate::mem`]'s arena and [`crate::ustack`]'s slots use.
pub const PAGE_SIZE: usize = 8192;

const fn align_up(addr: usize, align: usize) -> usize {
    (addr + align - 1) & !(align - 1)
}

const fn align_down(addr: usize, align: usize) -> usize {
    addr & !(align - 1)
}

/// First free physical address, rounded up to [`PAGE_SIZE`].
fn free_ram_start() -> usize {
    align_up(unsafe { KERNEL_END }, PAGE_SIZE)
}

/// Fixed-size per-thread stack slots, lowest in free RAM. `NTHREAD` slots
/// whether or not that many threads ever exist: a slot's address is derived
/// from its [`sched_core::Tid`] alone, so the region can't grow later.
pub fn ustack_region() -> Range<usize> {
    let start = free_ram_start();
    let end = start + NTHREAD * USTACK_PAGES * PAGE_SIZE;
    start..end
}

/// The user-space heap `sbrk` grows, directly above the stack region so a
/// high-water mark that reaches [`USER_HEAP_BYTES`] fails cleanly instead of
/// silently colliding with the stacks below it (see [`crate::brk`]).
pub fn user_heap_region() -> Range<usize> {
    let start = ustack_region().end;
    let end = start + USER_HEAP_BYTES;
    start..end
}

/// Size in bytes of the region [`user_heap_region`] carves out.
pub const USER_HEAP_BYTES: usize = 8 * 1024 * 1024;

/// The general-purpose kernel heap arena, between the user heap and the
/// ramdisk.
pub fn kmem_region() -> Range<usize> {
    let start = user_heap_region().end;
    let end = ramdisk_region().start;
    start..end
}

/// Ramdisk backing the single block device, highest in free RAM.
pub fn ramdisk_region() -> Range<usize> {
    let end = PHYS_TOP;
    let start = align_down(end - RAMDISK_BYTES, PAGE_SIZE);
    start..end
}

pub const CLINT_BASE: usize = 0x0200_0000;

pub const PLIC_BASE: usize = 0x0c00_0000;

pub const UART0_BASE: usize = 0x1000_0000;
pub const UART0_IRQ: u32 = 10;

pub const UART1_BASE: usize = 0x1000_0100;
pub const UART1_IRQ: u32 = 11;

/// Size in bytes of the ramdisk backing the single block device. Large
/// enough to hold a `mkdx` image with a handful of small demo binaries.
pub const RAMDISK_BYTES: usize = 4 * 1024 * 1024;

global_asm!(
    "
        .global _ko6_end_addr
        _ko6_end_addr: .dword _ko6_end
    "
);

unsafe extern "C" {
    /// First address after the kernel image, provided by `kernel.ld`.
    /// Everything from here to [`PHYS_TOP`] is free RAM.
    #[link_name = "_ko6_end_addr"]
    pub(crate) static KERNEL_END: usize;
}
