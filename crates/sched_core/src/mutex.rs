//! Thread mutexes: error-checking, strict FIFO waiters.
//!
//! This module only tracks ownership and the wait queue; parking and
//! waking the actual threads is the caller's job (see [`crate::scheduler`]),
//! which is why [`LockOutcome::WouldBlock`] and [`UnlockOutcome`] hand back
//! the tid to park or wake rather than doing it themselves.

use arrayvec::ArrayVec;
use mutex_api::Mutex;

use crate::scheduler::Tid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutexError {
    /// `id` does not name an initialized mutex.
    NotInitialized,
    /// The calling thread already owns this mutex.
    NotPermitted,
    /// `unlock` by a thread that is not the owner.
    NotOwner,
    /// `destroy` on a mutex with an owner or waiters.
    Busy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockOutcome {
    /// The mutex was free; `tid` now owns it.
    Acquired,
    /// The mutex was held; `tid` has been enqueued and must park.
    WouldBlock,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnlockOutcome {
    /// No waiter; the mutex is now free.
    Idle,
    /// `tid` was dequeued and now owns the mutex; caller must unpark it.
    HandedTo(Tid),
}

struct Slot {
    initialized: bool,
    owner: Option<Tid>,
    waiters: ArrayVec<Tid, MAX_WAITERS>,
}

const MAX_WAITERS: usize = 64;

impl Default for Slot {
    fn default() -> Self {
        Self {
            initialized: false,
            owner: None,
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

/// A fixed-size table of `N` mutexes, generic over the mutex implementation
/// guarding the table itself.
pub struct MutexTable<const N: usize, TableMutex> {
    table: TableMutex,
    _marker: core::marker::PhantomData<[(); N]>,
}

impl<const N: usize, TableMutex> MutexTable<N, TableMutex>
where
    TableMutex: Mutex<Data = Table<N>>,
{
    pub fn new() -> Self {
        Self {
            table: TableMutex::new(Table::default()),
            _marker: core::marker::PhantomData,
        }
    }

    pub fn init(&self, id: usize) {
        let mut table = self.table.lock();
        table.0[id] = Slot {
            initialized: true,
            owner: None,
            waiters: ArrayVec::new(),
        };
    }

    /// Destroys `id`. Fails if it has an owner or waiters.
    pub fn destroy(&self, id: usize) -> Result<(), MutexError> {
        let mut table = self.table.lock();
        let slot = &mut table.0[id];
        if !slot.initialized {
            return Err(MutexError::NotInitialized);
        }
        if slot.owner.is_some() || !slot.waiters.is_empty() {
            return Err(MutexError::Busy);
        }
        *slot = Slot::default();
        Ok(())
    }

    /// Force-destroys every initialized mutex, regardless of owner or
    /// waiters, invoking `wake` once for every waiter it drains. Used for
    /// process-wide cleanup, where `destroy`'s "busy" rejection would be
    /// wrong: the objects must go away and their waiters must be released,
    /// not left parked forever on a mutex nobody will ever unlock again.
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

    /// Attempts to lock `id` on behalf of `tid`.
    pub fn lock(&self, id: usize, tid: Tid) -> Result<LockOutcome, MutexError> {
        let mut table = self.table.lock();
        let slot = &mut table.0[id];
        if !slot.initialized {
            return Err(MutexError::NotInitialized);
        }
        match slot.owner {
            None => {
                slot.owner = Some(tid);
                Ok(LockOutcome::Acquired)
            }
            Some(owner) if owner == tid => Err(MutexError::NotPermitted),
            Some(_) => {
                slot.waiters.try_push(tid).expect("mutex waiter overflow");
                Ok(LockOutcome::WouldBlock)
            }
        }
    }

    /// Unlocks `id` on behalf of `tid`, handing ownership to the head of
    /// the FIFO wait queue if any.
    pub fn unlock(&self, id: usize, tid: Tid) -> Result<UnlockOutcome, MutexError> {
        let mut table = self.table.lock();
        let slot = &mut table.0[id];
        if !slot.initialized {
            return Err(MutexError::NotInitialized);
        }
        if slot.owner != Some(tid) {
            return Err(MutexError::NotOwner);
        }
        if slot.waiters.is_empty() {
            slot.owner = None;
            Ok(UnlockOutcome::Idle)
        } else {
            let next = slot.waiters.remove(0);
            slot.owner = Some(next);
            Ok(UnlockOutcome::HandedTo(next))
        }
    }
}

impl<const N: usize, TableMutex> Default for MutexTable<N, TableMutex>
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

    type TestTable = MutexTable<4, StdMutex<Table<4>>>;

    #[test]
    fn first_locker_acquires() {
        let t = TestTable::new();
        t.init(0);
        assert_eq!(t.lock(0, 1).unwrap(), LockOutcome::Acquired);
    }

    #[test]
    fn recursive_lock_is_not_permitted() {
        let t = TestTable::new();
        t.init(0);
        t.lock(0, 1).unwrap();
        assert_eq!(t.lock(0, 1).unwrap_err(), MutexError::NotPermitted);
    }

    #[test]
    fn unlock_by_non_owner_fails() {
        let t = TestTable::new();
        t.init(0);
        t.lock(0, 1).unwrap();
        assert_eq!(t.unlock(0, 2).unwrap_err(), MutexError::NotOwner);
    }

    #[test]
    fn waiters_are_fifo() {
        let t = TestTable::new();
        t.init(0);
        t.lock(0, 1).unwrap();
        assert_eq!(t.lock(0, 2).unwrap(), LockOutcome::WouldBlock);
        assert_eq!(t.lock(0, 3).unwrap(), LockOutcome::WouldBlock);
        assert_eq!(t.unlock(0, 1).unwrap(), UnlockOutcome::HandedTo(2));
        assert_eq!(t.unlock(0, 2).unwrap(), UnlockOutcome::HandedTo(3));
        assert_eq!(t.unlock(0, 3).unwrap(), UnlockOutcome::Idle);
    }

    #[test]
    fn destroy_while_locked_is_busy() {
        let t = TestTable::new();
        t.init(0);
        t.lock(0, 1).unwrap();
        assert_eq!(t.destroy(0).unwrap_err(), MutexError::Busy);
        t.unlock(0, 1).unwrap();
        t.destroy(0).unwrap();
    }

    #[test]
    fn force_destroy_all_wakes_every_waiter_and_resets_slots() {
        let t = TestTable::new();
        t.init(0);
        t.init(1);
        t.lock(1, 1).unwrap();
        assert_eq!(t.lock(1, 2).unwrap(), LockOutcome::WouldBlock);
        assert_eq!(t.lock(1, 3).unwrap(), LockOutcome::WouldBlock);

        let mut woken = std::vec::Vec::new();
        t.force_destroy_all(|tid| woken.push(tid));
        assert_eq!(woken, std::vec![2, 3]);

        // every slot is uninitialized again, as if never touched.
        assert_eq!(t.lock(0, 9).unwrap_err(), MutexError::NotInitialized);
        assert_eq!(t.lock(1, 9).unwrap_err(), MutexError::NotInitialized);
        t.init(1);
        assert_eq!(t.lock(1, 9).unwrap(), LockOutcome::Acquired);
    }
}
