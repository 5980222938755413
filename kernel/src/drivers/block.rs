//! RAM-disk block device, backing the block driver-op table.
//!
//! No virtio-blk (or other MMIO block) driver exists in the retrieved
//! toolchain to ground a protocol implementation against, so the concrete
//! device here is a RAM-disk carved out of `memlayout::ramdisk_region()`
//! and populated from an `mkdx`-produced image at link time. The driver-op
//! shape is identical to what a real MMIO block driver would implement, so
//! one could be swapped in later without touching `block_io` or any
//! caller.

use core::{
    ptr,
    sync::atomic::{AtomicUsize, Ordering},
};

use crate::{memlayout, sync::SpinLock};

/// The `mkdx`-produced disk image, embedded at build time. `build.rs`
/// resolves `KO6_DISK_IMAGE_PATH` to whatever `KO6_DISK_IMAGE` names (a
/// real image built by the `mkdx` binary against a demo directory), or to
/// an empty placeholder block if the caller didn't set one.
static DISK_IMAGE: &[u8] = include_bytes!(env!("KO6_DISK_IMAGE_PATH"));

struct BlockState {
    event: Option<(fn(usize), usize)>,
}

static STATE: SpinLock<BlockState> = SpinLock::new(BlockState { event: None });

/// Logical block size this instance was initialized with, read back by
/// `block_io` to size its buffers.
static BLOCK_SIZE: AtomicUsize = AtomicUsize::new(0);

pub struct BlockOps {
    pub init: fn(minor: u32, base: usize, block_size: usize),
    pub read: fn(lba: u32, buf: &mut [u8]) -> isize,
    pub write: fn(lba: u32, buf: &[u8]) -> isize,
    pub set_event: fn(f: fn(usize), arg: usize),
}

pub static RAMDISK_OPS: BlockOps = BlockOps {
    init,
    read,
    write,
    set_event,
};

fn init(_minor: u32, _base: usize, block_size: usize) {
    BLOCK_SIZE.store(block_size, Ordering::Relaxed);
    let region = memlayout::ramdisk_region();
    let len = DISK_IMAGE.len().min(region.end - region.start);
    // Safety: `region` is reserved RAM nothing else has touched yet at
    // this point in bring-up (`devices::init` runs before any thread or
    // the block cache exists).
    unsafe {
        ptr::copy_nonoverlapping(DISK_IMAGE.as_ptr(), region.start as *mut u8, len);
    }
}

fn bounds_check(lba: u32, len: usize) -> Result<usize, isize> {
    let block_size = BLOCK_SIZE.load(Ordering::Relaxed);
    let region = memlayout::ramdisk_region();
    let offset = lba as usize * block_size;
    if len != block_size || offset + len > region.end - region.start {
        return Err(-ko6_abi::Error::NoSuchAddress.code());
    }
    Ok(region.start + offset)
}

fn read(lba: u32, buf: &mut [u8]) -> isize {
    let addr = match bounds_check(lba, buf.len()) {
        Ok(addr) => addr,
        Err(err) => return err,
    };
    unsafe {
        ptr::copy_nonoverlapping(addr as *const u8, buf.as_mut_ptr(), buf.len());
    }
    notify();
    0
}

fn write(lba: u32, buf: &[u8]) -> isize {
    let addr = match bounds_check(lba, buf.len()) {
        Ok(addr) => addr,
        Err(err) => return err,
    };
    unsafe {
        ptr::copy_nonoverlapping(buf.as_ptr(), addr as *mut u8, buf.len());
    }
    notify();
    0
}

fn set_event(f: fn(usize), arg: usize) {
    STATE.lock().event = Some((f, arg));
}

/// The ramdisk completes synchronously, so the completion event — which a
/// real, IRQ-driven block device would fire from its ISR — just runs
/// inline right after the copy.
fn notify() {
    if let Some((f, arg)) = STATE.lock().event {
        f(arg);
    }
}
