//! User-space demo programs: `hello`, `barrier`, `dejavu`, and a `kshell`
//! dispatch stub, ported from `examples/original_source/src/soft/uapp/`.
//!
//! Each module exposes a `main` with the `extern "C" fn(usize)` shape
//! `kernel`'s thread scheduler expects of a thread entry point. ko6 has no
//! per-process address space, so these link directly into the kernel image
//! and are spawned with an ordinary `thread::create` rather than loaded
//! from a disk image as separate ELF processes — the same single-address-
//! space simplification `ko6_user_lib` already documents for its `ecall`
//! trampolines.

#![no_std]

extern crate alloc as alloc_crate;

pub mod barrier;
pub mod dejavu;
pub mod hello;
pub mod kshell;
