//! Thread barriers: the N-th arriver releases the other N-1 atomically and
//! the next phase begins with the arrival count reset to zero.

use arrayvec::ArrayVec;
use mutex_api::Mutex;

use crate::scheduler::Tid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BarrierError {
    NotInitialized,
    /// `init`/`destroy` with threads already parked at the barrier.
    Busy,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BarrierOutcome {
    /// Not the last arriver; caller must park.
    WouldBlock,
    /// The last arriver: every other waiter (in FIFO order) is released and
    /// should be unparked by the caller. The arriver itself proceeds
    /// without blocking.
    Released(ArrayVec<Tid, MAX_WAITERS>),
}

const MAX_WAITERS: usize = 64;

struct Slot {
    initialized: bool,
    required: u32,
    arrived: u32,
    waiters: ArrayVec<Tid, MAX_WAITERS>,
}

impl Default for Slot {
    fn default() -> Self {
        Self {
            initialized: false,
            required: 0,
            arrived: 0,
            waiters: ArrayVec::new(),
        }
    }
}

pub struct Table<const N: usize>([Slot; N]);

impl<const N: usize> Default for Table<N> {
    fn default() -> Self {
        Self(core::array::from_fn(|_| Slot::default()))
    }
}

pub struct BarrierTable<const N: usize, TableMutex> {
    table: TableMutex,
    _marker: core::marker::PhantomData<[(); N]>,
}

impl<const N: usize, TableMutex> BarrierTable<N, TableMutex>
where
    TableMutex: Mutex<Data = Table<N>>,
{
    pub fn new() -> Self {
        Self {
            table: TableMutex::new(Table::default()),
            _marker: core::marker::PhantomData,
        }
    }

    /// Initializes `id` to require `count` arrivals per phase.
    pub fn init(&self, id: usize, count: u32) -> Result<(), BarrierError> {
        let mut table = self.table.lock();
        let slot = &mut table.0[id];
        if slot.initialized && !slot.waiters.is_empty() {
            return Err(BarrierError::Busy);
        }
        *slot = Slot {
            initialized: true,
            required: count,
            arrived: 0,
            waiters: ArrayVec::new(),
        };
        Ok(())
    }

    pub fn destroy(&self, id: usize) -> Result<(), BarrierError> {
        let mut table = self.table.lock();
        let slot = &mut table.0[id];
        if !slot.initialized {
            return Err(BarrierError::NotInitialized);
        }
        if !slot.waiters.is_empty() {
            return Err(BarrierError::Busy);
        }
        *slot = Slot::default();
        Ok(())
    }

    /// Force-destroys every initialized barrier, regardless of waiters,
    /// invoking `wake` once for every thread parked on it. Used for
    /// process-wide cleanup: the barrier is going away either way, so its
    /// waiters are released rather than left parked on a phase that will
    /// never complete.
    pub fn force_destroy_all(&self, mut wake: impl FnMut(Tid)) {
        let mut table = self.table.lock();
        for slot in &mut table.0 {
            if !slot.initialized {
                continue;
            }
            for tid in slot.waiters.drain(..) {
                wake(tid);
            }
            *slot = Slot::default();
        }
    }

    /// Records an arrival of `tid` at `id`.
    pub fn wait(&self, id: usize, tid: Tid) -> Result<BarrierOutcome, BarrierError> {
        let mut table = self.table.lock();
        let slot = &mut table.0[id];
        if !slot.initialized {
            return Err(BarrierError::NotInitialized);
        }
        slot.arrived += 1;
        if slot.arrived == slot.required {
            slot.arrived = 0;
            let released = core::mem::take(&mut slot.waiters);
            Ok(BarrierOutcome::Released(released))
        } else {
            slot.waiters.try_push(tid).expect("barrier waiter overflow");
            Ok(BarrierOutcome::WouldBlock)
        }
    }
}

impl<const N: usize, TableMutex> Default for BarrierTable<N, TableMutex>
where
    TableMutex: Mutex<Data = Table<N>>,
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

    type TestTable = BarrierTable<2, StdMutex<Table<2>>>;

    #[test]
    fn third_of_three_releases_other_two() {
        let t = TestTable::new();
        t.init(0, 3).unwrap();
        assert_eq!(t.wait(0, 1).unwrap(), BarrierOutcome::WouldBlock);
        assert_eq!(t.wait(0, 2).unwrap(), BarrierOutcome::WouldBlock);
        let outcome = t.wait(0, 3).unwrap();
        let BarrierOutcome::Released(released) = outcome else {
            panic!("expected release")
        };
        assert_eq!(released.as_slice(), &[1, 2]);
    }

    #[test]
    fn phase_resets_after_release() {
        let t = TestTable::new();
        t.init(0, 2).unwrap();
        t.wait(0, 1).unwrap();
        t.wait(0, 2).unwrap();
        // next phase behaves the same as the first.
        assert_eq!(t.wait(0, 3).unwrap(), BarrierOutcome::WouldBlock);
    }

    #[test]
    fn reinit_with_waiters_is_busy() {
        let t = TestTable::new();
        t.init(0, 5).unwrap();
        t.wait(0, 1).unwrap();
        assert_eq!(t.init(0, 3).unwrap_err(), BarrierError::Busy);
    }

    #[test]
    fn destroy_with_waiters_is_busy() {
        let t = TestTable::new();
        t.init(0, 5).unwrap();
        t.wait(0, 1).unwrap();
        assert_eq!(t.destroy(0).unwrap_err(), BarrierError::Busy);
    }

    #[test]
    fn force_destroy_all_wakes_every_waiter_and_resets_slots() {
        let t = TestTable::new();
        t.init(0, 5).unwrap();
        t.wait(0, 1).unwrap();
        t.wait(0, 2).unwrap();

        let mut woken = std::vec::Vec::new();
        t.force_destroy_all(|tid| woken.push(tid));
        assert_eq!(woken, std::vec![1, 2]);

        // the slot is uninitialized again, as if never touched.
        assert_eq!(t.wait(0, 9).unwrap_err(), BarrierError::NotInitialized);
        t.init(0, 1).unwrap();
        assert_eq!(t.wait(0, 9).unwrap(), BarrierOutcome::Released(ArrayVec::new()));
    }
}
