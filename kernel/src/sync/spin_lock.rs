//! A uniprocessor-safe spinlock: disables interrupts for its duration and
//! records the owning CPU so double-acquire (even via IRQ reentry) trips
//! an assertion instead of silently deadlocking.
//!
//! This is the concrete [`mutex_api::Mutex`] every generic table in this
//! workspace (`device_registry::Registry`, `irq_route::IrqVector`,
//! `sched_core::{Scheduler,MutexTable,BarrierTable}`, `kmem::Allocator`,
//! `block_io::BlockIoCache`) is instantiated with inside the kernel binary.

use core::{
    cell::UnsafeCell,
    ops::{Deref, DerefMut},
    sync::atomic::{AtomicBool, Ordering},
};

use mutex_api::Mutex;

use crate::{cpu, irq};

struct RawSpinLock {
    locked: AtomicBool,
    cpuid: UnsafeCell<usize>,
}

unsafe impl Sync for RawSpinLock {}

impl RawSpinLock {
    const fn new() -> Self {
        Self {
            locked: AtomicBool::new(false),
            cpuid: UnsafeCell::new(cpu::INVALID_CPUID),
        }
    }

    /// Loops (spins) until the lock is acquired.
    fn acquire(&self) {
        // disable interrupts to avoid deadlock against our own ISR.
        let int_guard = irq::push_disabled();

        assert!(!self.holding());

        // `Ordering::Acquire` keeps loads/stores from moving above this
        // point, so the critical section's memory references happen
        // strictly after the lock is acquired. On RISC-V this emits a
        // fence instruction.
        while self.locked.swap(true, Ordering::Acquire) {}

        unsafe {
            *self.cpuid.get() = cpu::id();
        }

        int_guard.forget(); // drop would re-enable interrupts; release() does that instead.
    }

    fn release(&self) {
        assert!(self.holding());

        unsafe {
            *self.cpuid.get() = cpu::INVALID_CPUID;
        }

        self.locked.store(false, Ordering::Release);

        unsafe {
            irq::pop_disabled();
        }
    }

    /// Checks whether this CPU is holding the lock. Interrupts must be off.
    fn holding(&self) -> bool {
        assert!(!irq::is_enabled());
        self.locked.load(Ordering::Relaxed) && unsafe { *self.cpuid.get() } == cpu::id()
    }
}

pub struct SpinLock<T> {
    lock: RawSpinLock,
    value: UnsafeCell<T>,
}

unsafe impl<T> Sync for SpinLock<T> where T: Send {}

impl<T> SpinLock<T> {
    pub const fn new(value: T) -> Self {
        Self {
            lock: RawSpinLock::new(),
            value: UnsafeCell::new(value),
        }
    }

    pub fn lock(&self) -> SpinLockGuard<'_, T> {
        self.lock.acquire();
        SpinLockGuard { lock: self }
    }
}

impl<T> Mutex for SpinLock<T> {
    type Data = T;
    type Guard<'a>
        = SpinLockGuard<'a, T>
    where
        T: 'a;

    fn new(data: Self::Data) -> Self {
        Self::new(data)
    }

    fn lock(&self) -> Self::Guard<'_> {
        Self::lock(self)
    }
}

pub struct SpinLockGuard<'a, T> {
    lock: &'a SpinLock<T>,
}

unsafe impl<T> Send for SpinLockGuard<'_, T> where T: Send {}
unsafe impl<T> Sync for SpinLockGuard<'_, T> where T: Sync {}

impl<T> Drop for SpinLockGuard<'_, T> {
    fn drop(&mut self) {
        self.lock.lock.release();
    }
}

impl<T> Deref for SpinLockGuard<'_, T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        unsafe { &*self.lock.value.get() }
    }
}

impl<T> DerefMut for SpinLockGuard<'_, T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        unsafe { &mut *self.lock.value.get() }
    }
}
