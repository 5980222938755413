//! `barrier` — three threads rendezvousing at a shared barrier each phase.
//!
//! Grounded on `examples/original_source/src/soft/uapp/barrier/main.c`: two
//! worker threads and the calling thread each print a line, spin for a
//! message-specific delay, then wait on a 3-party barrier. The original
//! loops forever; this demo runs a bounded number of phases so the thread
//! it spawns on boot actually returns (see `kernel::main::init_thread`).

use ko6_user_lib::{println, sync::ipc::Barrier, thread};

const BARRIER_ID: usize = 0;
const PHASES: u32 = 5;

struct Worker {
    message: &'static str,
    delay: u32,
}

static BONJOUR: Worker = Worker {
    message: "bonjour",
    delay: 100_000,
};
static SALUT: Worker = Worker {
    message: "salut",
    delay: 500_000,
};

fn spin(cycles: u32) {
    for _ in 0..cycles {
        core::hint::spin_loop();
    }
}

extern "C" fn worker_main(arg: usize) {
    // Safety: `arg` is always one of `&BONJOUR`/`&SALUT` below, both
    // `'static`, cast to `usize` across the same `thread::create` call
    // that hands it back here unchanged.
    let worker = unsafe { &*core::ptr::with_exposed_provenance::<Worker>(arg) };
    let barrier = Barrier::new(BARRIER_ID);
    for phase in 0..PHASES {
        println!("[{phase}] {}", worker.message);
        spin(worker.delay);
        barrier.wait().expect("barrier wait");
    }
}

pub extern "C" fn main(_arg: usize) {
    let barrier = Barrier::new(BARRIER_ID);
    barrier.init(3).expect("barrier init");

    let t0 = thread::create(worker_main, core::ptr::addr_of!(BONJOUR).expose_provenance())
        .expect("spawn bonjour worker");
    let t1 = thread::create(worker_main, core::ptr::addr_of!(SALUT).expose_provenance())
        .expect("spawn salut worker");

    for phase in 0..PHASES {
        println!("[{phase}] app is alive");
        spin(50_000);
        barrier.wait().expect("barrier wait");
    }

    thread::join(t0);
    thread::join(t1);
    barrier.destroy().expect("barrier destroy");
}
