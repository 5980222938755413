//! Fixed-size IRQ number to handler routing, shared by every interrupt
//! controller driver.
//!
//! The table is a flat array indexed by hardware IRQ number. A slot with no
//! handler means "unassigned, drop the IRQ" — [`IrqVector::route`] treats a
//! miss as a no-op rather than an error, since a shared line firing for a
//! device nobody registered is routine, not exceptional.

#![cfg_attr(not(test), no_std)]

use mutex_api::Mutex;

/// An interrupt handler: called with the opaque argument it was registered
/// with. Runs with IRQs disabled and must not block.
pub type Handler = fn(arg: usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IrqRouteError {
    /// `irq` is outside the table's capacity.
    OutOfRange,
}

#[derive(Clone, Copy)]
struct Entry {
    handler: Option<Handler>,
    arg: usize,
}

const EMPTY: Entry = Entry {
    handler: None,
    arg: 0,
};

/// `CAPACITY` fixed, one slot per possible hardware IRQ number.
pub struct Table<const CAPACITY: usize>([Entry; CAPACITY]);

impl<const CAPACITY: usize> Default for Table<CAPACITY> {
    fn default() -> Self {
        Self([EMPTY; CAPACITY])
    }
}

/// The IRQ routing vector, generic over the mutex guarding the table.
pub struct IrqVector<const CAPACITY: usize, TableMutex> {
    table: TableMutex,
    _marker: core::marker::PhantomData<[(); CAPACITY]>,
}

impl<const CAPACITY: usize, TableMutex> IrqVector<CAPACITY, TableMutex>
where
    TableMutex: Mutex<Data = Table<CAPACITY>>,
{
    pub fn new() -> Self {
        Self {
            table: TableMutex::new(Table::default()),
            _marker: core::marker::PhantomData,
        }
    }

    /// Binds `irq` to `handler`, overwriting any previous binding.
    pub fn register(&self, irq: usize, handler: Handler, arg: usize) -> Result<(), IrqRouteError> {
        let mut table = self.table.lock();
        let slot = table.0.get_mut(irq).ok_or(IrqRouteError::OutOfRange)?;
        *slot = Entry {
            handler: Some(handler),
            arg,
        };
        Ok(())
    }

    /// Clears any binding for `irq`.
    pub fn unregister(&self, irq: usize) -> Result<(), IrqRouteError> {
        let mut table = self.table.lock();
        let slot = table.0.get_mut(irq).ok_or(IrqRouteError::OutOfRange)?;
        *slot = EMPTY;
        Ok(())
    }

    /// Invokes the handler bound to `irq`, if any. An unbound or
    /// out-of-range IRQ is silently dropped.
    pub fn route(&self, irq: usize) {
        let entry = {
            let table = self.table.lock();
            table.0.get(irq).copied()
        };
        if let Some(Entry {
            handler: Some(handler),
            arg,
        }) = entry
        {
            handler(arg);
        }
    }

    /// Whether `irq` currently has a handler bound.
    pub fn is_bound(&self, irq: usize) -> bool {
        let table = self.table.lock();
        table
            .0
            .get(irq)
            .is_some_and(|e| e.handler.is_some())
    }
}

impl<const CAPACITY: usize, TableMutex> Default for IrqVector<CAPACITY, TableMutex>
where
    TableMutex: Mutex<Data = Table<CAPACITY>>,
{
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use core::ops::{Deref, DerefMut};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct StdMutex<T>(std::sync::Mutex<T>);
    struct StdMutexGuard<'a, T>(std::sync::MutexGuard<'a, T>);

    impl<T> mutex_api::Mutex for StdMutex<T> {
        type Data = T;
        type Guard<'a>
            = StdMutexGuard<'a, T>
        where
            Self: 'a;

        fn new(data: Self::Data) -> Self {
            Self(std::sync::Mutex::new(data))
        }

        fn lock(&self) -> Self::Guard<'_> {
            StdMutexGuard(self.0.lock().unwrap())
        }
    }

    impl<T> Deref for StdMutexGuard<'_, T> {
        type Target = T;
        fn deref(&self) -> &Self::Target {
            &self.0
        }
    }

    impl<T> DerefMut for StdMutexGuard<'_, T> {
        fn deref_mut(&mut self) -> &mut Self::Target {
            &mut self.0
        }
    }

    type TestVector = IrqVector<1024, StdMutex<Table<1024>>>;

    static HITS: AtomicUsize = AtomicUsize::new(0);
    static LAST_ARG: AtomicUsize = AtomicUsize::new(0);

    fn record(arg: usize) {
        HITS.fetch_add(1, Ordering::SeqCst);
        LAST_ARG.store(arg, Ordering::SeqCst);
    }

    #[test]
    fn unbound_irq_is_ignored() {
        let vec = TestVector::new();
        vec.route(17);
    }

    #[test]
    fn register_then_route_invokes_handler() {
        HITS.store(0, Ordering::SeqCst);
        let vec = TestVector::new();
        vec.register(3, record, 99).unwrap();
        assert!(vec.is_bound(3));
        vec.route(3);
        assert_eq!(HITS.load(Ordering::SeqCst), 1);
        assert_eq!(LAST_ARG.load(Ordering::SeqCst), 99);
    }

    #[test]
    fn unregister_drops_future_routes() {
        HITS.store(0, Ordering::SeqCst);
        let vec = TestVector::new();
        vec.register(5, record, 1).unwrap();
        vec.unregister(5).unwrap();
        assert!(!vec.is_bound(5));
        vec.route(5);
        assert_eq!(HITS.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn out_of_range_is_rejected() {
        let vec = TestVector::new();
        assert_eq!(
            vec.register(1024, record, 0).unwrap_err(),
            IrqRouteError::OutOfRange
        );
    }
}
