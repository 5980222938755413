//! The single supervisor trap vector.
//!
//! ko6 threads never drop to user mode (see the comment in [`crate::start`]),
//! so there is only one trap path, not the teacher's user/kernel split: a
//! thread's own `ecall` lands here exactly like a timer or external
//! interrupt would. [`kernel_vec`] saves every caller-saved register a
//! trapped thread could have been using — including `a0..a7`, which a plain
//! function call would not otherwise preserve — so [`kernel_trap`] can both
//! read a syscall's arguments out of them and write its return value back
//! before `sret` resumes the thread.

use core::{arch::naked_asm, mem::offset_of};

use riscv::{
    interrupt::{
        Trap,
        supervisor::{Exception, Interrupt},
    },
    register::{
        scause, sepc,
        sstatus::{self, SPP},
        stval,
        stvec::{self, TrapMode},
    },
};

use crate::{drivers::icu, memlayout, println, syscall};

/// Caller-saved registers, in the order [`kernel_vec`] spills them. Exactly
/// what a trapped thread could have been holding live — callee-saved
/// registers need no help here, since the ordinary call from [`kernel_vec`]
/// into [`kernel_trap`] already preserves those per the calling convention.
#[derive(Debug, Default)]
#[repr(C)]
pub struct TrapFrame {
    pub ra: usize,
    pub sp: usize,
    pub gp: usize,
    pub tp: usize,
    pub t0: usize,
    pub t1: usize,
    pub t2: usize,
    pub a0: usize,
    pub a1: usize,
    pub a2: usize,
    pub a3: usize,
    pub a4: usize,
    pub a5: usize,
    pub a6: usize,
    pub a7: usize,
    pub t3: usize,
    pub t4: usize,
    pub t5: usize,
    pub t6: usize,
}

const FRAME_SIZE: usize = size_of::<TrapFrame>();
const _: () = assert!(FRAME_SIZE % 16 == 0);

/// Installs [`kernel_vec`] as this hart's trap vector. Must run before
/// interrupts are ever enabled — [`crate::main`] does this during bring-up.
pub fn init_hart() {
    let mut stvec = stvec::Stvec::from_bits(0);
    stvec.set_address(kernel_vec as usize);
    stvec.set_trap_mode(TrapMode::Direct);
    unsafe {
        stvec::write(stvec);
    }
}

/// Interrupts, exceptions, and `ecall`s all land here.
///
/// Pushes the caller-saved registers onto the current stack (whichever
/// thread's, or the dispatch loop's, was running), calls [`kernel_trap`],
/// pops them back, and `sret`s to exactly where the trap came from.
#[unsafe(naked)]
pub extern "C" fn kernel_vec() {
    naked_asm!(
        "addi sp, sp, -{frame_size}",
        "sd ra,  {ra}(sp)",
        "sd sp,  {sp}(sp)",
        "sd gp,  {gp}(sp)",
        "sd tp,  {tp}(sp)",
        "sd t0,  {t0}(sp)",
        "sd t1,  {t1}(sp)",
        "sd t2,  {t2}(sp)",
        "sd a0,  {a0}(sp)",
        "sd a1,  {a1}(sp)",
        "sd a2,  {a2}(sp)",
        "sd a3,  {a3}(sp)",
        "sd a4,  {a4}(sp)",
        "sd a5,  {a5}(sp)",
        "sd a6,  {a6}(sp)",
        "sd a7,  {a7}(sp)",
        "sd t3,  {t3}(sp)",
        "sd t4,  {t4}(sp)",
        "sd t5,  {t5}(sp)",
        "sd t6,  {t6}(sp)",
        "mv a0, sp",
        "call {kernel_trap}",
        "ld ra,  {ra}(sp)",
        "ld gp,  {gp}(sp)",
        // not tp: holds the hart id, in case we moved CPUs.
        "ld t0,  {t0}(sp)",
        "ld t1,  {t1}(sp)",
        "ld t2,  {t2}(sp)",
        "ld a0,  {a0}(sp)",
        "ld a1,  {a1}(sp)",
        "ld a2,  {a2}(sp)",
        "ld a3,  {a3}(sp)",
        "ld a4,  {a4}(sp)",
        "ld a5,  {a5}(sp)",
        "ld a6,  {a6}(sp)",
        "ld a7,  {a7}(sp)",
        "ld t3,  {t3}(sp)",
        "ld t4,  {t4}(sp)",
        "ld t5,  {t5}(sp)",
        "ld t6,  {t6}(sp)",
        "addi sp, sp, {frame_size}",
        "sret",
        frame_size = const FRAME_SIZE,
        ra = const offset_of!(TrapFrame, ra),
        sp = const offset_of!(TrapFrame, sp),
        gp = const offset_of!(TrapFrame, gp),
        tp = const offset_of!(TrapFrame, tp),
        t0 = const offset_of!(TrapFrame, t0),
        t1 = const offset_of!(TrapFrame, t1),
        t2 = const offset_of!(TrapFrame, t2),
        a0 = const offset_of!(TrapFrame, a0),
        a1 = const offset_of!(TrapFrame, a1),
        a2 = const offset_of!(TrapFrame, a2),
        a3 = const offset_of!(TrapFrame, a3),
        a4 = const offset_of!(TrapFrame, a4),
        a5 = const offset_of!(TrapFrame, a5),
        a6 = const offset_of!(TrapFrame, a6),
        a7 = const offset_of!(TrapFrame, a7),
        t3 = const offset_of!(TrapFrame, t3),
        t4 = const offset_of!(TrapFrame, t4),
        t5 = const offset_of!(TrapFrame, t5),
        t6 = const offset_of!(TrapFrame, t6),
        kernel_trap = sym kernel_trap,
    );
}

extern "C" fn kernel_trap(frame: *mut TrapFrame) {
    let sepc = sepc::read();
    let sstatus = sstatus::read();
    assert_eq!(sstatus.spp(), SPP::Supervisor, "kernel_trap: not from supervisor mode");
    assert!(!sstatus.sie(), "kernel_trap: interrupts were enabled");

    let cause: Trap<Interrupt, Exception> = scause::read().cause().try_into().unwrap();
    let mut next_sepc = sepc;

    match cause {
        Trap::Interrupt(Interrupt::SupervisorTimer) => {
            crate::drivers::timer::on_tick();
        }
        Trap::Interrupt(Interrupt::SupervisorExternal) => {
            handle_external_interrupt();
        }
        Trap::Interrupt(Interrupt::SupervisorSoft) => {
            panic!("unexpected supervisor software interrupt: sepc={sepc:#x}");
        }
        Trap::Exception(Exception::SupervisorEnvCall) => {
            // sepc points at the `ecall` itself; resume past it.
            next_sepc = sepc + 4;
            let f = unsafe { &mut *frame };
            let args = ko6_abi::RawArgs {
                a0: f.a0,
                a1: f.a1,
                a2: f.a2,
                a3: f.a3,
            };
            f.a0 = syscall::dispatch(f.a7, args) as usize;
        }
        Trap::Exception(e) => {
            let stval = stval::read();
            println!("kernel trap: exception {e:?}");
            println!("             sepc={sepc:#x} stval={stval:#x}");
            panic!("unrecoverable trap");
        }
    }

    // a nested trap (a timer tick serviced mid-syscall, say) may have
    // clobbered these CSRs before we get back here; restore what this
    // trap needs `sret` to see.
    unsafe {
        sepc::write(next_sepc);
        sstatus::write(sstatus);
    }
}

/// Claims, routes, and completes the highest-priority pending external
/// interrupt, if any.
fn handle_external_interrupt() {
    let Some(irq) = (icu::PLIC_OPS.get_highest)(memlayout::PLIC_BASE) else {
        return;
    };
    crate::devices::irq_route().route(irq as usize);
    (icu::PLIC_OPS.acknowledge)(memlayout::PLIC_BASE, irq);
}
