//! Device registry and platform bring-up.
//!
//! Wires the five driver-operation tables from [`crate::drivers`] into one
//! [`device_registry::Registry`], then performs the ordering `kinit.c`
//! follows: register every device first, initialize each one, bind the
//! timer tick and the console IRQ to their handlers, then unmask interrupts
//! at the controller. Nothing here runs with interrupts enabled — that
//! happens later, the first time a thread is dispatched.

use device_registry::{Kind, Registry};
use once_init::OnceInit;

use crate::{
    drivers::{
        block::{self, BlockOps},
        chardev::{self, ChardevState, CharOps},
        dma::{self, DmaOps},
        icu::{self, IcuOps},
        timer::{self, TimerOps},
    },
    memlayout,
    param::BLOCK_SIZE,
    sync::SpinLock,
};

/// Cycles between timer ticks. Matches the original platform's boot tick
/// period, which the `sstc`-based `stimecmp` path reprograms on every
/// interrupt (see `drivers::timer`).
const TICK_CYCLES: u64 = 200_000;

const UART_BAUDRATE: u32 = 115_200;

pub enum DriverOps {
    Char(&'static CharOps),
    Icu(&'static IcuOps),
    Timer(&'static TimerOps),
    Dma(&'static DmaOps),
    Block(&'static BlockOps),
}

pub enum DriverData {
    Char(SpinLock<ChardevState>),
    Unit,
}

impl Default for DriverData {
    fn default() -> Self {
        Self::Unit
    }
}

type ListsMutex = SpinLock<device_registry::Lists<DriverOps, DriverData>>;
type Ko6Registry = Registry<DriverOps, DriverData, ListsMutex>;

static DEVICES: OnceInit<Ko6Registry> = OnceInit::new();
static IRQ_ROUTE: OnceInit<irq_route::IrqVector<{ crate::param::IRQ_VECTOR_CAPACITY }, SpinLock<irq_route::Table<{ crate::param::IRQ_VECTOR_CAPACITY }>>>> =
    OnceInit::new();

fn registry() -> &'static Ko6Registry {
    DEVICES.get()
}

pub fn irq_route() -> &'static irq_route::IrqVector<
    { crate::param::IRQ_VECTOR_CAPACITY },
    SpinLock<irq_route::Table<{ crate::param::IRQ_VECTOR_CAPACITY }>>,
> {
    IRQ_ROUTE.get()
}

/// # Safety
///
/// Must be called exactly once, after [`crate::mem::init`] (every driver
/// record is heap-allocated) and before interrupts are ever enabled.
pub unsafe fn init() {
    DEVICES.init(Ko6Registry::new());
    IRQ_ROUTE.init(irq_route::IrqVector::new());

    let console0 = registry().allocate(
        Kind::Char,
        memlayout::UART0_BASE,
        &chardev::UART_OPS,
        DriverData::Char(SpinLock::new(ChardevState::default())),
    );
    registry().allocate(
        Kind::Char,
        memlayout::UART1_BASE,
        &chardev::UART_OPS,
        DriverData::Char(SpinLock::new(ChardevState::default())),
    );
    let plic = registry().allocate(Kind::Icu, memlayout::PLIC_BASE, &icu::PLIC_OPS, DriverData::Unit);
    registry().allocate(Kind::Timer, memlayout::CLINT_BASE, &timer::CLINT_OPS, DriverData::Unit);
    registry().allocate(Kind::Dma, 0, &dma::SOFT_DMA_OPS, DriverData::Unit);
    let ramdisk_base = memlayout::ramdisk_region().start;
    registry().allocate(Kind::Block, ramdisk_base, &block::RAMDISK_OPS, DriverData::Unit);

    registry()
        .with(Kind::Icu, plic.minor, |r| (icu::PLIC_OPS.init)(r.base()))
        .expect("icu record");
    registry()
        .with_mut(Kind::Char, console0.minor, |r| {
            (chardev::UART_OPS.init)(r.base(), UART_BAUDRATE);
            let DriverData::Char(state) = r.data_mut() else {
                unreachable!("char record always carries Char data")
            };
            state.lock().bind_yield(crate::thread::yield_now);
        })
        .expect("console0 record");
    registry()
        .with(Kind::Timer, 0, |r| (timer::CLINT_OPS.init)(r.base(), TICK_CYCLES))
        .expect("timer record");
    (timer::CLINT_OPS.set_event)(on_timer_tick, 0);
    registry().with(Kind::Dma, 0, |r| (dma::SOFT_DMA_OPS.init)(r.base())).expect("dma record");
    registry()
        .with(Kind::Block, 0, |r| (block::RAMDISK_OPS.init)(0, r.base(), BLOCK_SIZE))
        .expect("block record");

    irq_route()
        .register(memlayout::UART0_IRQ as usize, console_isr, 0)
        .expect("UART0_IRQ within capacity");
    (icu::PLIC_OPS.set_priority)(memlayout::PLIC_BASE, memlayout::UART0_IRQ, 1);
    (icu::PLIC_OPS.unmask)(memlayout::PLIC_BASE, memlayout::UART0_IRQ);
}

fn on_timer_tick(_arg: usize) {
    crate::thread::yield_now();
}

fn console_isr(_arg: usize) {
    registry()
        .with_mut(Kind::Char, 0, |r| {
            let base = r.base();
            let DriverData::Char(state) = r.data_mut() else {
                unreachable!("char record always carries Char data")
            };
            (chardev::UART_OPS.isr)(base, state);
        })
        .expect("console0 record");
}

/// Blocking read from the primary console (UART0, minor 0). Returns 0
/// immediately if `buf` is empty, per the probe convention.
pub fn console_read(buf: &mut [u8]) -> usize {
    registry()
        .with(Kind::Char, 0, |r| {
            let DriverData::Char(state) = r.data() else {
                unreachable!("char record always carries Char data")
            };
            (chardev::UART_OPS.read)(state, buf)
        })
        .expect("console0 record")
}

/// Synchronous write to the primary console.
pub fn console_write(buf: &[u8]) -> usize {
    registry()
        .with(Kind::Char, 0, |r| (chardev::UART_OPS.write)(r.base(), buf))
        .expect("console0 record")
}

/// Synchronous DMA-engine memcpy (there being no real engine to complete
/// asynchronously on this platform, see `drivers::dma`).
///
/// # Safety
///
/// `dst` and `src` must each be valid for `n_bytes` and must not overlap.
pub unsafe fn dma_memcpy(dst: *mut u8, src: *const u8, n_bytes: usize) {
    registry()
        .with(Kind::Dma, 0, |r| unsafe { (dma::SOFT_DMA_OPS.memcpy)(dst, src, n_bytes) })
        .expect("dma record");
}
