use core::{arch::naked_asm, mem::offset_of};

use super::context::Context;

/// Saves the departing thread's callee-saved registers into `*old`, loads
/// the arriving thread's from `*new`, and returns into the arriving
/// thread's saved `ra` — which, for a never-yet-run thread, is
/// [`super::bootstrap`].
#[unsafe(naked)]
pub extern "C" fn switch(old: *mut Context, new: *const Context) {
    naked_asm!(
        "sd ra,  {ra}(a0)",
        "sd sp,  {sp}(a0)",
        "sd s0,  {s0}(a0)",
        "sd s1,  {s1}(a0)",
        "sd s2,  {s2}(a0)",
        "sd s3,  {s3}(a0)",
        "sd s4,  {s4}(a0)",
        "sd s5,  {s5}(a0)",
        "sd s6,  {s6}(a0)",
        "sd s7,  {s7}(a0)",
        "sd s8,  {s8}(a0)",
        "sd s9,  {s9}(a0)",
        "sd s10, {s10}(a0)",
        "sd s11, {s11}(a0)",
        "ld ra,  {ra}(a1)",
        "ld sp,  {sp}(a1)",
        "ld s0,  {s0}(a1)",
        "ld s1,  {s1}(a1)",
        "ld s2,  {s2}(a1)",
        "ld s3,  {s3}(a1)",
        "ld s4,  {s4}(a1)",
        "ld s5,  {s5}(a1)",
        "ld s6,  {s6}(a1)",
        "ld s7,  {s7}(a1)",
        "ld s8,  {s8}(a1)",
        "ld s9,  {s9}(a1)",
        "ld s10, {s10}(a1)",
        "ld s11, {s11}(a1)",
        "ret",
        ra = const offset_of!(Context, ra),
        sp = const offset_of!(Context, sp),
        s0 = const offset_of!(Context, s0),
        s1 = const offset_of!(Context, s1),
        s2 = const offset_of!(Context, s2),
        s3 = const offset_of!(Context, s3),
        s4 = const offset_of!(Context, s4),
        s5 = const offset_of!(Context, s5),
        s6 = const offset_of!(Context, s6),
        s7 = const offset_of!(Context, s7),
        s8 = const offset_of!(Context, s8),
        s9 = const offset_of!(Context, s9),
        s10 = const offset_of!(Context, s10),
        s11 = const offset_of!(Context, s11),
    );
}
