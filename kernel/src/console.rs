//! Formatted console output, over UART0.
//!
//! `print!`/`println!` serialize through [`drivers::chardev::CharOps::write`]
//! so ordinary output shares the same synchronous, busy-waiting path the
//! `WRITE` syscall uses; the panic handler bypasses that entirely (see
//! [`drivers::chardev::panic_write`]) since a panic must not assume any lock
//! in this module is safe to take.

use core::{
    fmt::{self, Write as _},
    sync::atomic::{AtomicBool, Ordering},
};

use crate::{drivers::chardev, memlayout, sync::SpinLock};

static PANICKED: AtomicBool = AtomicBool::new(false);
static LOCK: SpinLock<()> = SpinLock::new(());

struct Writer;

impl fmt::Write for Writer {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        (chardev::UART_OPS.write)(memlayout::UART0_BASE, s.as_bytes());
        Ok(())
    }
}

struct PanicWriter;

impl fmt::Write for PanicWriter {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        chardev::panic_write(memlayout::UART0_BASE, s);
        Ok(())
    }
}

#[doc(hidden)]
pub fn _print(args: fmt::Arguments<'_>) {
    if PANICKED.load(Ordering::Relaxed) {
        let _ = PanicWriter.write_fmt(args);
        return;
    }
    let _guard = LOCK.lock();
    let _ = Writer.write_fmt(args);
}

#[macro_export]
macro_rules! print {
    ($($arg:tt)*) => {
        $crate::console::_print(format_args!($($arg)*))
    };
}

#[macro_export]
macro_rules! println {
    () => {
        $crate::print!("\n")
    };
    ($($arg:tt)*) => {
        $crate::print!("{}\n", format_args!($($arg)*))
    };
}

#[panic_handler]
fn panic(info: &core::panic::PanicInfo<'_>) -> ! {
    // Don't try to take `LOCK` again: a panic mid-print must still get its
    // message out, even if it interrupted another thread holding it.
    PANICKED.store(true, Ordering::Relaxed);
    println!("kernel panic: {info}");
    loop {
        unsafe {
            core::arch::asm!("wfi");
        }
    }
}
