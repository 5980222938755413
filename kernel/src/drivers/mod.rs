//! The five driver-operation tables: character, interrupt-controller,
//! timer, DMA, block. Each submodule owns one concrete driver and exposes
//! its capability table as a `'static` value; [`crate::devices`] is the
//! only place that wires them into device records.

pub mod block;
pub mod chardev;
pub mod dma;
pub mod icu;
pub mod timer;
