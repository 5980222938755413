//! The syscall dispatch vector [`crate::trap::kernel_trap`] calls into on
//! every `ecall`.
//!
//! ko6 threads run in supervisor mode already, so a syscall is not a
//! privilege transition the way the teacher's `usertrap` handles one — it's
//! an ordinary trap that happens to carry a request in `a7`/`a0..a3`. There
//! is also no address-space isolation, so "user buffers" are just ordinary
//! pointers into the one address space everything shares; [`user_slice`]
//! and [`user_slice_mut`] exist only to reject obviously-wild pointers, not
//! to enforce any real boundary.

use core::slice;

use ko6_abi::{Error, RawArgs, SyscallNumber, encode_return};

use crate::{
    devices, memlayout,
    param::CACHE_LINE_SIZE,
    sync::ipc,
    thread::{self, Tid},
};

/// Standard descriptors. ko6 has no file system layer beneath the console,
/// so these are the only valid targets for `Read`/`Write`.
const STDIN: usize = 0;
const STDOUT: usize = 1;
const STDERR: usize = 2;

/// Dispatches one trapped syscall and returns the encoded result destined
/// for the trapping thread's `a0`.
pub fn dispatch(syscall: usize, args: RawArgs) -> isize {
    let Some(number) = SyscallNumber::from_repr(syscall) else {
        crate::println!(
            "unknown syscall {syscall} args=({:#x}, {:#x}, {:#x}, {:#x})",
            args.a0,
            args.a1,
            args.a2,
            args.a3
        );
        return -Error::NotImplemented.code();
    };

    match number {
        SyscallNumber::Exit => thread::exit(args.a0 as i64),
        SyscallNumber::Read => encode_return(sys_read(args.a0, args.a1, args.a2)),
        SyscallNumber::Write => encode_return(sys_write(args.a0, args.a1, args.a2)),
        SyscallNumber::Clock => encode_return(Ok(crate::drivers::timer::ticks() as usize)),
        SyscallNumber::DmaMemcpy => encode_return(sys_dma_memcpy(args.a0, args.a1, args.a2)),
        SyscallNumber::CacheLineSize => encode_return(Ok(CACHE_LINE_SIZE)),
        // The soft DMA engine moves data with a plain `memcpy` (see
        // `drivers::dma`): there is no real cache to maintain, so these
        // just validate their argument and report success.
        SyscallNumber::DCacheBufInval => encode_return(sys_check_range(args.a0, args.a1)),
        SyscallNumber::DCacheInval => encode_return(Ok(0)),
        SyscallNumber::Sbrk => {
            #[expect(clippy::cast_possible_wrap)]
            let increment = args.a0 as isize;
            encode_return(crate::brk::sbrk(increment).map_err(|_| Error::OutOfMemory))
        }
        SyscallNumber::Errno => encode_return(Ok(thread::errno_addr())),
        SyscallNumber::ThreadCreate => encode_return(sys_thread_create(args.a0, args.a1)),
        SyscallNumber::ThreadYield => {
            thread::yield_now();
            0
        }
        SyscallNumber::ThreadExit => thread::exit(args.a0 as i64),
        SyscallNumber::SchedDump => {
            thread::sched_dump();
            0
        }
        SyscallNumber::ThreadJoin => sys_thread_join(args.a0),
        SyscallNumber::MutexInit => encode_return(ipc::mutex_init(args.a0).map(|()| 0)),
        SyscallNumber::MutexLock => encode_return(with_current_tid(|tid| ipc::mutex_lock(args.a0, tid)).map(|()| 0)),
        SyscallNumber::MutexUnlock => {
            encode_return(with_current_tid(|tid| ipc::mutex_unlock(args.a0, tid)).map(|()| 0))
        }
        SyscallNumber::MutexDestroy => encode_return(ipc::mutex_destroy(args.a0).map(|()| 0)),
        SyscallNumber::BarrierInit => {
            #[expect(clippy::cast_possible_truncation)]
            let count = args.a1 as u32;
            encode_return(ipc::barrier_init(args.a0, count).map(|()| 0))
        }
        SyscallNumber::BarrierWait => {
            encode_return(with_current_tid(|tid| ipc::barrier_wait(args.a0, tid)).map(|()| 0))
        }
        SyscallNumber::BarrierDestroy => encode_return(ipc::barrier_destroy(args.a0).map(|()| 0)),
        SyscallNumber::Kshell => {
            crate::println!("kshell not implemented");
            -Error::NotImplemented.code()
        }
    }
}

fn with_current_tid<T>(f: impl FnOnce(Tid) -> Result<T, Error>) -> Result<T, Error> {
    f(thread::current().ok_or(Error::NoSuchThread)?)
}

fn sys_read(fd: usize, buf: usize, len: usize) -> Result<usize, Error> {
    if fd != STDIN {
        return Err(Error::BadDescriptor);
    }
    let out = user_slice_mut(buf, len)?;
    Ok(devices::console_read(out))
}

fn sys_write(fd: usize, buf: usize, len: usize) -> Result<usize, Error> {
    if fd != STDOUT && fd != STDERR {
        return Err(Error::BadDescriptor);
    }
    let input = user_slice(buf, len)?;
    Ok(devices::console_write(input))
}

fn sys_dma_memcpy(dst: usize, src: usize, len: usize) -> Result<usize, Error> {
    check_user_range(dst, len)?;
    check_user_range(src, len)?;
    if len > 0 && dst < src + len && src < dst + len {
        return Err(Error::InvalidArgument);
    }
    unsafe {
        devices::dma_memcpy(dst as *mut u8, src as *const u8, len);
    }
    Ok(len)
}

fn sys_check_range(addr: usize, len: usize) -> Result<usize, Error> {
    check_user_range(addr, len)?;
    Ok(0)
}

fn sys_thread_create(entry: usize, arg: usize) -> Result<usize, Error> {
    if entry == 0 {
        return Err(Error::InvalidArgument);
    }
    // Safety: ko6 has no address-space isolation to make this unsound
    // beyond what an ordinary wild function pointer already risks; `entry`
    // having come from user space via a syscall is no different from any
    // other thread's own `ra`.
    let entry: extern "C" fn(usize) = unsafe { core::mem::transmute::<usize, extern "C" fn(usize)>(entry) };
    thread::create(entry, arg).map(|tid| tid as usize)
}

fn sys_thread_join(tid: usize) -> isize {
    #[expect(clippy::cast_possible_truncation)]
    let target = tid as Tid;
    match thread::join(target) {
        #[expect(clippy::cast_possible_truncation)]
        Ok(retval) => retval as isize,
        Err(e) => -e.code(),
    }
}

fn check_user_range(addr: usize, len: usize) -> Result<(), Error> {
    if len == 0 {
        return Ok(());
    }
    let end = addr.checked_add(len).ok_or(Error::BadAddress)?;
    if addr < memlayout::KERN_BASE || end > memlayout::PHYS_TOP {
        return Err(Error::BadAddress);
    }
    Ok(())
}

fn user_slice(addr: usize, len: usize) -> Result<&'static [u8], Error> {
    check_user_range(addr, len)?;
    Ok(unsafe { slice::from_raw_parts(addr as *const u8, len) })
}

fn user_slice_mut(addr: usize, len: usize) -> Result<&'static mut [u8], Error> {
    check_user_range(addr, len)?;
    Ok(unsafe { slice::from_raw_parts_mut(addr as *mut u8, len) })
}
