#![no_std]
#![no_main]

use core::{
    hint,
    sync::atomic::{AtomicBool, Ordering},
};

extern crate alloc;

mod brk;
mod console;
mod cpu;
mod devices;
mod drivers;
mod entry;
mod irq;
mod mem;
mod memlayout;
mod param;
mod start;
mod sync;
mod syscall;
mod thread;
mod trap;
mod ustack;

static STARTED: AtomicBool = AtomicBool::new(false);

/// The very first thread. Unlike every other thread it is spawned straight
/// from [`main`] rather than via the `THREAD_CREATE` syscall, but it runs
/// exactly the demo program any other thread could: `demos::hello` reaches
/// the console purely through `ecall`s into [`syscall::dispatch`], the same
/// path `ko6_user_lib` gives every thread.
extern "C" fn init_thread(arg: usize) {
    demos::hello::main(arg);
}

// start() jumps here in supervisor mode on every hart.
extern "C" fn main() -> ! {
    if cpu::id() == 0 {
        println!();
        println!("ko6 kernel is booting");
        println!();

        // Safety: each of these runs exactly once, in this order, before
        // interrupts are enabled and before any thread exists.
        unsafe {
            mem::init(); // kernel heap arena
            devices::init(); // device registry, drivers, IRQ routing
            thread::init(); // scheduler
            sync::ipc::init(); // mutex/barrier tables
        }
        brk::init(); // user heap break
        trap::init_hart(); // install the trap vector

        let main_tid = thread::create(init_thread, 0).expect("init thread");
        thread::set_main(main_tid);

        STARTED.store(true, Ordering::Release);
    } else {
        while !STARTED.load(Ordering::Acquire) {
            hint::spin_loop();
        }
        println!("hart {} starting", cpu::id());
        trap::init_hart();
    }

    thread::run();
}
