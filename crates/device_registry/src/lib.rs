//! Device registry: kind-tagged records backing the driver-operation tables.
//!
//! Every hardware instance the kernel knows about — character device,
//! interrupt controller, timer, DMA engine, block device — is registered
//! here under a `(kind, minor)` identity. `minor` is a monotonically
//! increasing counter per kind, assigned at [`Registry::allocate`] and never
//! reused, so a [`DeviceId`] handed out to a caller stays meaningful even
//! after a later [`Registry::free`] of some other record.

#![cfg_attr(not(test), no_std)]

extern crate alloc;

use alloc::{boxed::Box, vec::Vec};
use core::fmt;

use mutex_api::Mutex;

/// The five device kinds known to the kernel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum Kind {
    Char = 0,
    Icu = 1,
    Timer = 2,
    Dma = 3,
    Block = 4,
}

impl Kind {
    pub const ALL: [Kind; 5] = [Kind::Char, Kind::Icu, Kind::Timer, Kind::Dma, Kind::Block];
    const COUNT: usize = Self::ALL.len();

    const fn index(self) -> usize {
        self as usize
    }
}

/// Stable identity of a registered device: its kind and dense-per-kind minor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DeviceId {
    pub kind: Kind,
    pub minor: u32,
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}{}", self.kind, self.minor)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistryError {
    /// The backing allocator is exhausted.
    OutOfMemory,
    /// No record for the requested `(kind, minor)`.
    NotFound,
}

/// A registered device: its id, MMIO base, a pointer to its kind's
/// driver-operation table, and opaque per-instance driver data.
pub struct Record<Ops, Data> {
    id: DeviceId,
    base: usize,
    ops: &'static Ops,
    data: Data,
}

impl<Ops, Data> Record<Ops, Data> {
    pub fn id(&self) -> DeviceId {
        self.id
    }

    pub fn base(&self) -> usize {
        self.base
    }

    pub fn ops(&self) -> &'static Ops {
        self.ops
    }

    pub fn data(&self) -> &Data {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut Data {
        &mut self.data
    }
}

// `pub` so callers outside this crate can name it in their own
// `ListsMutex: Mutex<Data = Lists<..>>` instantiations; the field stays
// private, there's nothing to construct or read from outside.
pub struct Lists<Ops, Data>([Vec<Option<Box<Record<Ops, Data>>>>; Kind::COUNT]);

impl<Ops, Data> Default for Lists<Ops, Data> {
    fn default() -> Self {
        Self(core::array::from_fn(|_| Vec::new()))
    }
}

/// The device registry, generic over the mutex implementation protecting its
/// insertion-ordered per-kind lists.
pub struct Registry<Ops, Data, ListsMutex> {
    lists: ListsMutex,
    _marker: core::marker::PhantomData<(Ops, Data)>,
}

impl<Ops, Data, ListsMutex> Registry<Ops, Data, ListsMutex>
where
    ListsMutex: Mutex<Data = Lists<Ops, Data>>,
{
    pub fn new() -> Self {
        Self {
            lists: ListsMutex::new(Lists::default()),
            _marker: core::marker::PhantomData,
        }
    }

    /// Registers a new device of `kind`, assigning it the next minor.
    pub fn allocate(&self, kind: Kind, base: usize, ops: &'static Ops, data: Data) -> DeviceId
    where
        Data: Sized,
    {
        let mut lists = self.lists.lock();
        let list = &mut lists.0[kind.index()];
        let minor = u32::try_from(list.len()).expect("minor overflow");
        let id = DeviceId { kind, minor };
        list.push(Some(Box::new(Record {
            id,
            base,
            ops,
            data,
        })));
        id
    }

    /// The minor the next [`allocate`](Self::allocate) for `kind` would use.
    pub fn next_minor(&self, kind: Kind) -> u32 {
        let lists = self.lists.lock();
        u32::try_from(lists.0[kind.index()].len()).expect("minor overflow")
    }

    /// Unlinks and releases the record identified by `id`.
    pub fn free(&self, id: DeviceId) -> Result<(), RegistryError> {
        let mut lists = self.lists.lock();
        let list = &mut lists.0[id.kind.index()];
        let slot = list
            .get_mut(id.minor as usize)
            .ok_or(RegistryError::NotFound)?;
        if slot.take().is_none() {
            return Err(RegistryError::NotFound);
        }
        Ok(())
    }

    /// Runs `f` with a reference to the record for `(kind, minor)`.
    pub fn with<R>(
        &self,
        kind: Kind,
        minor: u32,
        f: impl FnOnce(&Record<Ops, Data>) -> R,
    ) -> Result<R, RegistryError> {
        let lists = self.lists.lock();
        let record = lists.0[kind.index()]
            .get(minor as usize)
            .and_then(Option::as_deref)
            .ok_or(RegistryError::NotFound)?;
        Ok(f(record))
    }

    /// Runs `f` with a mutable reference to the record for `(kind, minor)`.
    pub fn with_mut<R>(
        &self,
        kind: Kind,
        minor: u32,
        f: impl FnOnce(&mut Record<Ops, Data>) -> R,
    ) -> Result<R, RegistryError> {
        let mut lists = self.lists.lock();
        let record = lists.0[kind.index()]
            .get_mut(minor as usize)
            .and_then(Option::as_deref_mut)
            .ok_or(RegistryError::NotFound)?;
        Ok(f(record))
    }

    /// Number of live (non-freed) records of `kind`.
    pub fn count(&self, kind: Kind) -> usize {
        let lists = self.lists.lock();
        lists.0[kind.index()].iter().filter(|s| s.is_some()).count()
    }
}

impl<Ops, Data, ListsMutex> Default for Registry<Ops, Data, ListsMutex>
where
    ListsMutex: Mutex<Data = Lists<Ops, Data>>,
{
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use core::ops::{Deref, DerefMut};

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

    struct NullOps;
    static OPS: NullOps = NullOps;

    type TestRegistry = Registry<NullOps, u32, StdMutex<Lists<NullOps, u32>>>;

    #[test]
    fn minors_are_dense_per_kind() {
        let reg = TestRegistry::new();
        let a = reg.allocate(Kind::Char, 0x1000, &OPS, 1);
        let b = reg.allocate(Kind::Char, 0x2000, &OPS, 2);
        let c = reg.allocate(Kind::Block, 0x3000, &OPS, 3);
        assert_eq!(a, DeviceId { kind: Kind::Char, minor: 0 });
        assert_eq!(b, DeviceId { kind: Kind::Char, minor: 1 });
        assert_eq!(c, DeviceId { kind: Kind::Block, minor: 0 });
        assert_eq!(reg.next_minor(Kind::Char), 2);
    }

    #[test]
    fn get_missing_is_not_found() {
        let reg = TestRegistry::new();
        reg.allocate(Kind::Timer, 0, &OPS, 0);
        assert_eq!(
            reg.with(Kind::Timer, 5, |_| ()).unwrap_err(),
            RegistryError::NotFound
        );
    }

    #[test]
    fn free_then_get_not_found_but_minor_not_reused() {
        let reg = TestRegistry::new();
        let id = reg.allocate(Kind::Dma, 0, &OPS, 7);
        reg.free(id).unwrap();
        assert_eq!(reg.with(Kind::Dma, 0, |_| ()).unwrap_err(), RegistryError::NotFound);
        let next = reg.allocate(Kind::Dma, 0, &OPS, 8);
        assert_eq!(next.minor, 1);
    }

    #[test]
    fn data_mut_is_visible() {
        let reg = TestRegistry::new();
        let id = reg.allocate(Kind::Icu, 0, &OPS, 0);
        reg.with_mut(id.kind, id.minor, |r| *r.data_mut() = 42).unwrap();
        let value = reg.with(id.kind, id.minor, |r| *r.data()).unwrap();
        assert_eq!(value, 42);
    }
}
