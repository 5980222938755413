//! Raw `ecall` trampolines, one per [`SyscallNumber`] variant.
//!
//! Each wrapper loads the syscall number into `a7` and traps; the kernel's
//! dispatcher decodes `a7`/`a0..a3` and leaves the signed result in `a0`,
//! which `ret` hands straight back to the caller. Callers that don't need
//! all four argument registers just pass zeros in the rest.

use core::arch::naked_asm;

use ko6_abi::SyscallNumber;

macro_rules! syscall_fn {
    ($name:ident => $ty:ident) => {
        #[unsafe(naked)]
        pub extern "C" fn $name(_a0: usize, _a1: usize, _a2: usize, _a3: usize) -> isize {
            naked_asm!(
                "li a7, {ty}",
                "ecall",
                "ret",
                ty = const SyscallNumber::$ty as usize,
            )
        }
    };
}

syscall_fn!(exit => Exit);
syscall_fn!(read => Read);
syscall_fn!(write => Write);
syscall_fn!(clock => Clock);
syscall_fn!(dma_memcpy => DmaMemcpy);
syscall_fn!(cache_line_size => CacheLineSize);
syscall_fn!(dcache_buf_inval => DCacheBufInval);
syscall_fn!(dcache_inval => DCacheInval);
syscall_fn!(sbrk => Sbrk);
syscall_fn!(errno => Errno);
syscall_fn!(thread_create => ThreadCreate);
syscall_fn!(thread_yield => ThreadYield);
syscall_fn!(thread_exit => ThreadExit);
syscall_fn!(sched_dump => SchedDump);
syscall_fn!(thread_join => ThreadJoin);
syscall_fn!(mutex_init => MutexInit);
syscall_fn!(mutex_lock => MutexLock);
syscall_fn!(mutex_unlock => MutexUnlock);
syscall_fn!(mutex_destroy => MutexDestroy);
syscall_fn!(barrier_init => BarrierInit);
syscall_fn!(barrier_wait => BarrierWait);
syscall_fn!(barrier_destroy => BarrierDestroy);
syscall_fn!(kshell => Kshell);
