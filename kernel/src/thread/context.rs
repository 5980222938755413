/// Callee-saved registers [`super::switch`] swaps across a context switch,
/// plus the freshly created thread's entry point — not switched by the
/// asm, just read once by [`super::bootstrap`] the first time it runs.
#[derive(Debug, Default)]
#[repr(C)]
pub struct Context {
    pub(super) ra: usize,
    pub(super) sp: usize,
    pub(super) s0: usize,
    pub(super) s1: usize,
    pub(super) s2: usize,
    pub(super) s3: usize,
    pub(super) s4: usize,
    pub(super) s5: usize,
    pub(super) s6: usize,
    pub(super) s7: usize,
    pub(super) s8: usize,
    pub(super) s9: usize,
    pub(super) s10: usize,
    pub(super) s11: usize,
    pub(super) entry_fn: usize,
    pub(super) entry_arg: usize,
    /// This thread's private errno slot. Never touched by [`super::switch`];
    /// exposed to user space as a plain address (see [`super::errno_addr`])
    /// since ko6 threads share one address space and there is no per-process
    /// page to map it into.
    pub(super) errno: usize,
}

impl Context {
    pub(super) const fn zeroed() -> Self {
        Self {
            ra: 0,
            sp: 0,
            s0: 0,
            s1: 0,
            s2: 0,
            s3: 0,
            s4: 0,
            s5: 0,
            s6: 0,
            s7: 0,
            s8: 0,
            s9: 0,
            s10: 0,
            s11: 0,
            entry_fn: 0,
            entry_arg: 0,
            errno: 0,
        }
    }
}
