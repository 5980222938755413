//! The kernel heap.
//!
//! [`kmem::Allocator`] carves [`memlayout::kmem_region`] into slabs on
//! demand; wiring it up as `#[global_allocator]` means `alloc::{Box, Vec,
//! Arc}` work the same way everywhere in this binary — `device_registry`'s
//! records, `block_io`'s cached buffers, and `sched_core`'s internal tables
//! all draw from this one arena, same as they would on the host in tests.
//!
//! Must be initialized by [`init()`] before any allocation; `start.rs`
//! does this first thing in [`crate::main`], before anything that might
//! allocate runs.

use core::alloc::{GlobalAlloc, Layout};

use kmem::Allocator as SlabAllocator;
use once_init::OnceInit;

use crate::{memlayout, sync::SpinLock};

const PAGE_SIZE: usize = memlayout::PAGE_SIZE;

/// `8 << (NUM_CLASSES - 1) == PAGE_SIZE`.
const NUM_CLASSES: usize = 11;

/// Pages given to the arena. `NPAGES * PAGE_SIZE` must fit inside
/// [`memlayout::kmem_region`]; checked at [`init()`] time since the region's
/// actual size depends on the linker-provided kernel image end.
const NPAGES: usize = 2048;

type Kmem =
    SlabAllocator<NPAGES, PAGE_SIZE, NUM_CLASSES, SpinLock<kmem::State<NPAGES, PAGE_SIZE, NUM_CLASSES>>>;

static KMEM: OnceInit<Kmem> = OnceInit::new();

/// Carves [`memlayout::kmem_region`] into the kernel heap arena.
///
/// # Safety
///
/// Must be called exactly once, before any code allocates, and before
/// interrupts are enabled.
pub unsafe fn init() {
    let region = memlayout::kmem_region();
    let bytes = region.end - region.start;
    assert!(
        bytes >= NPAGES * PAGE_SIZE,
        "kmem region too small: {bytes} bytes, need {}",
        NPAGES * PAGE_SIZE
    );
    let start = region.start as *mut u8;
    let end = unsafe { start.add(NPAGES * PAGE_SIZE) };
    let arena = unsafe { Kmem::new(start..end) };
    KMEM.init(arena);
}

fn arena() -> &'static Kmem {
    KMEM.get()
}

/// Number of pages in the arena still unclaimed by any slab.
pub fn free_pages() -> usize {
    arena().free_pages()
}

struct KernelGlobalAlloc;

#[global_allocator]
static GLOBAL_ALLOC: KernelGlobalAlloc = KernelGlobalAlloc;

unsafe impl GlobalAlloc for KernelGlobalAlloc {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        // kmem's size classes are page-aligned power-of-two runs, so a
        // class covering `max(size, align)` is also aligned to it.
        let want = layout.size().max(layout.align());
        match arena().kmalloc(want) {
            Some(ptr) => ptr.as_ptr(),
            None => core::ptr::null_mut(),
        }
    }

    unsafe fn dealloc(&self, ptr: *mut u8, _layout: Layout) {
        let Some(ptr) = core::ptr::NonNull::new(ptr) else {
            return;
        };
        unsafe {
            arena().kfree(ptr);
        }
    }
}
