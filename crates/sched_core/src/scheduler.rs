//! Ready queue and thread state machine.
//!
//! ```text
//! CREATED --start--> READY --dispatch--> RUNNING --yield/preempt--> READY
//!                                           |--exit--> ZOMBIE --join--> DEAD
//!                                           |--park--> WAITING --unpark--> READY
//! ```
//!
//! `Tid` 0 is never assigned (table index + 1), so it is free to use as a
//! sentinel for "no thread" in caller code.

use arrayvec::ArrayVec;
use mutex_api::Mutex;

pub type Tid = u32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThreadState {
    Unused,
    Created,
    Ready,
    Running,
    Zombie,
    Dead,
    Waiting,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedError {
    /// No free thread-table slot.
    OutOfMemory,
    /// `tid` does not (or no longer) name a thread.
    NoSuchThread,
}

struct Slot<Context> {
    state: ThreadState,
    context: Context,
    /// Wait channel while `Waiting`; for `join`, the target's own tid.
    chan: Tid,
    exit_value: i64,
}

impl<Context> Slot<Context>
where
    Context: Default,
{
    fn unused() -> Self {
        Self {
            state: ThreadState::Unused,
            context: Context::default(),
            chan: 0,
            exit_value: 0,
        }
    }
}

pub struct Table<const N: usize, Context> {
    slots: [Slot<Context>; N],
    ready: ArrayVec<Tid, N>,
}

impl<const N: usize, Context> Default for Table<N, Context>
where
    Context: Default,
{
    fn default() -> Self {
        Self {
            slots: core::array::from_fn(|_| Slot::unused()),
            ready: ArrayVec::new(),
        }
    }
}

/// What a caller should do after a blocking operation returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParkOutcome {
    /// The calling thread is now `Waiting`; the caller must dispatch another
    /// thread and switch to it.
    Parked,
}

/// The outcome of [`Scheduler::join`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinOutcome {
    /// `target` was `Zombie`; it is now `Dead` and its slot is free.
    Reaped(i64),
    /// `target` is not finished yet; the caller has been parked on it and
    /// must retry `join` after being woken.
    WouldBlock,
}

/// The thread scheduler, generic over the mutex guarding its table and over
/// the arch-specific saved-register `Context` type.
pub struct Scheduler<const N: usize, Context, TableMutex> {
    table: TableMutex,
    _marker: core::marker::PhantomData<[Context; N]>,
}

impl<const N: usize, Context, TableMutex> Scheduler<N, Context, TableMutex>
where
    Context: Default,
    TableMutex: Mutex<Data = Table<N, Context>>,
{
    pub fn new() -> Self {
        Self {
            table: TableMutex::new(Table::default()),
            _marker: core::marker::PhantomData,
        }
    }

    /// Allocates a thread, seeds its context via `init`, and enqueues it
    /// `Ready`. Returns [`SchedError::OutOfMemory`] if every slot is in use.
    pub fn create(&self, init: impl FnOnce(&mut Context)) -> Result<Tid, SchedError> {
        let mut table = self.table.lock();
        let index = table
            .slots
            .iter()
            .position(|s| matches!(s.state, ThreadState::Unused | ThreadState::Dead))
            .ok_or(SchedError::OutOfMemory)?;
        let tid = tid_of(index);
        table.slots[index] = Slot {
            state: ThreadState::Created,
            context: Context::default(),
            chan: 0,
            exit_value: 0,
        };
        init(&mut table.slots[index].context);
        table.slots[index].state = ThreadState::Ready;
        table.ready.try_push(tid).expect("ready queue overflow");
        Ok(tid)
    }

    /// Pops the head of the ready queue and marks it `Running`. The caller
    /// is responsible for the actual context switch.
    pub fn dispatch(&self) -> Option<Tid> {
        let mut table = self.table.lock();
        if table.ready.is_empty() {
            return None;
        }
        let tid = table.ready.remove(0);
        table.slots[index_of(tid)].state = ThreadState::Running;
        Some(tid)
    }

    /// Borrows the saved context of `tid` for the arch switch code.
    ///
    /// # Panics
    ///
    /// Panics if `tid` is out of range.
    pub fn context_mut<R>(&self, tid: Tid, f: impl FnOnce(&mut Context) -> R) -> R {
        let mut table = self.table.lock();
        f(&mut table.slots[index_of(tid)].context)
    }

    /// Moves the currently running `tid` to the tail of the ready queue.
    pub fn yield_now(&self, tid: Tid) {
        let mut table = self.table.lock();
        table.slots[index_of(tid)].state = ThreadState::Ready;
        table.ready.try_push(tid).expect("ready queue overflow");
    }

    /// Blocks `tid` on wait channel `chan`. Caller must dispatch and switch
    /// away afterward.
    pub fn park(&self, tid: Tid, chan: Tid) -> ParkOutcome {
        let mut table = self.table.lock();
        table.slots[index_of(tid)].state = ThreadState::Waiting;
        table.slots[index_of(tid)].chan = chan;
        ParkOutcome::Parked
    }

    /// Wakes every thread waiting on `chan`, moving it to the tail of the
    /// ready queue in ascending tid order.
    pub fn unpark_all(&self, chan: Tid) {
        let mut table = self.table.lock();
        for index in 0..N {
            if table.slots[index].state == ThreadState::Waiting && table.slots[index].chan == chan
            {
                table.slots[index].state = ThreadState::Ready;
                let tid = tid_of(index);
                table.ready.try_push(tid).expect("ready queue overflow");
            }
        }
    }

    /// Wakes a single thread directly (used by mutex/barrier hand-off,
    /// which already knows exactly which tid to wake).
    pub fn unpark_one(&self, tid: Tid) {
        let mut table = self.table.lock();
        debug_assert_eq!(table.slots[index_of(tid)].state, ThreadState::Waiting);
        table.slots[index_of(tid)].state = ThreadState::Ready;
        table.ready.try_push(tid).expect("ready queue overflow");
    }

    /// Transitions `tid` to `Zombie`, stashing `retval`, and wakes any
    /// joiner parked on it.
    pub fn exit(&self, tid: Tid, retval: i64) {
        {
            let mut table = self.table.lock();
            table.slots[index_of(tid)].state = ThreadState::Zombie;
            table.slots[index_of(tid)].exit_value = retval;
        }
        self.unpark_all(tid);
    }

    /// If `target` is `Zombie`, reaps it (transitions to `Dead`, frees the
    /// slot) and returns its exit value. Otherwise parks `caller` on
    /// `target` and tells the caller to retry after being woken.
    pub fn join(&self, caller: Tid, target: Tid) -> Result<JoinOutcome, SchedError> {
        let mut table = self.table.lock();
        if index_of(target) >= N {
            return Err(SchedError::NoSuchThread);
        }
        match table.slots[index_of(target)].state {
            ThreadState::Unused | ThreadState::Dead => Err(SchedError::NoSuchThread),
            ThreadState::Zombie => {
                let retval = table.slots[index_of(target)].exit_value;
                table.slots[index_of(target)].state = ThreadState::Dead;
                Ok(JoinOutcome::Reaped(retval))
            }
            ThreadState::Created | ThreadState::Ready | ThreadState::Running | ThreadState::Waiting => {
                table.slots[index_of(caller)].state = ThreadState::Waiting;
                table.slots[index_of(caller)].chan = target;
                Ok(JoinOutcome::WouldBlock)
            }
        }
    }

    /// Current state of `tid`, or `None` if out of range.
    pub fn state(&self, tid: Tid) -> Option<ThreadState> {
        let table = self.table.lock();
        table.slots.get(index_of(tid)).map(|s| s.state)
    }

    /// Enumerates every non-`Unused` thread as `(tid, state)`.
    pub fn for_each(&self, mut f: impl FnMut(Tid, ThreadState)) {
        let table = self.table.lock();
        for (index, slot) in table.slots.iter().enumerate() {
            if slot.state != ThreadState::Unused {
                f(tid_of(index), slot.state);
            }
        }
    }
}

impl<const N: usize, Context, TableMutex> Default for Scheduler<N, Context, TableMutex>
where
    Context: Default,
    TableMutex: Mutex<Data = Table<N, Context>>,
{
    fn default() -> Self {
        Self::new()
    }
}

const fn tid_of(index: usize) -> Tid {
    index as Tid + 1
}

const fn index_of(tid: Tid) -> usize {
    tid as usize - 1
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

    #[derive(Default)]
    struct Ctx(u64);

    type TestScheduler = Scheduler<4, Ctx, StdMutex<Table<4, Ctx>>>;

    #[test]
    fn create_enqueues_ready_fifo() {
        let sched = TestScheduler::new();
        let a = sched.create(|c| c.0 = 1).unwrap();
        let b = sched.create(|c| c.0 = 2).unwrap();
        assert_eq!(sched.dispatch(), Some(a));
        assert_eq!(sched.dispatch(), Some(b));
        assert_eq!(sched.dispatch(), None);
    }

    #[test]
    fn out_of_slots_is_out_of_memory() {
        let sched = TestScheduler::new();
        for _ in 0..4 {
            sched.create(|_| {}).unwrap();
        }
        assert_eq!(sched.create(|_| {}).unwrap_err(), SchedError::OutOfMemory);
    }

    #[test]
    fn yield_goes_to_tail() {
        let sched = TestScheduler::new();
        let a = sched.create(|_| {}).unwrap();
        let b = sched.create(|_| {}).unwrap();
        assert_eq!(sched.dispatch(), Some(a));
        sched.yield_now(a);
        assert_eq!(sched.dispatch(), Some(b));
        assert_eq!(sched.dispatch(), Some(a));
    }

    #[test]
    fn exit_then_join_reaps_and_frees_slot() {
        let sched = TestScheduler::new();
        let a = sched.create(|_| {}).unwrap();
        let main = sched.create(|_| {}).unwrap();
        sched.dispatch();
        sched.exit(a, 42);
        assert_eq!(sched.join(main, a).unwrap(), JoinOutcome::Reaped(42));
        assert_eq!(sched.state(a), Some(ThreadState::Dead));
    }

    #[test]
    fn join_on_running_thread_parks_caller() {
        let sched = TestScheduler::new();
        let a = sched.create(|_| {}).unwrap();
        let main = sched.create(|_| {}).unwrap();
        sched.dispatch(); // a
        sched.dispatch(); // main
        assert_eq!(
            sched.join(main, a).unwrap(),
            JoinOutcome::WouldBlock
        );
        assert_eq!(sched.state(main), Some(ThreadState::Waiting));
        sched.exit(a, 7);
        assert_eq!(sched.state(main), Some(ThreadState::Ready));
        assert_eq!(sched.join(main, a).unwrap(), JoinOutcome::Reaped(7));
    }

    #[test]
    fn join_unknown_tid_errors() {
        let sched = TestScheduler::new();
        let main = sched.create(|_| {}).unwrap();
        assert_eq!(
            sched.join(main, 99).unwrap_err(),
            SchedError::NoSuchThread
        );
    }
}
