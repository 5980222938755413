//! `kshell` — dispatch-only stub.
//!
//! The original's word-list/variable-environment machinery
//! (`examples/original_source/src/soft/uapp/kshell/`) is a full
//! command-line shell; only the `KSHELL` syscall's dispatch shape is
//! reproduced here. This just proves the syscall reaches the kernel and
//! returns.

use ko6_user_lib::{os::ko6::syscall, println};

pub extern "C" fn main(_arg: usize) {
    println!("kshell: stub — dispatching KSHELL once, then exiting");
    syscall::kshell();
}
