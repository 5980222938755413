//! Mutex and barrier handles backed by the kernel's fixed-capacity
//! `MutexTable`/`BarrierTable`.
//!
//! Ids are caller-assigned, not allocated: the kernel tables are plain
//! arrays (`NMUTEX`/`NBARRIER` slots, see `ko6_params`), so a `Mutex`/
//! `Barrier` here is just a handle onto one slot, picked the same way a
//! C program would pick a fixed-size array index.

use crate::{error::Error, os::ko6::syscall};

/// A handle onto kernel mutex table slot `id`. Must be [`init`](Self::init)
/// before use and [`destroy`](Self::destroy)ed when no longer needed — the
/// slot is shared, caller-numbered state, not owned memory.
pub struct Mutex {
    id: usize,
}

impl Mutex {
    #[must_use]
    pub const fn new(id: usize) -> Self {
        Self { id }
    }

    pub fn init(&self) -> Result<(), Error> {
        syscall::mutex_init(self.id).map_err(Error::from)
    }

    pub fn lock(&self) -> Result<(), Error> {
        syscall::mutex_lock(self.id).map_err(Error::from)
    }

    pub fn unlock(&self) -> Result<(), Error> {
        syscall::mutex_unlock(self.id).map_err(Error::from)
    }

    pub fn destroy(&self) -> Result<(), Error> {
        syscall::mutex_destroy(self.id).map_err(Error::from)
    }
}

/// A handle onto kernel barrier table slot `id`, analogous to [`Mutex`].
pub struct Barrier {
    id: usize,
}

impl Barrier {
    #[must_use]
    pub const fn new(id: usize) -> Self {
        Self { id }
    }

    pub fn init(&self, count: u32) -> Result<(), Error> {
        syscall::barrier_init(self.id, count).map_err(Error::from)
    }

    pub fn wait(&self) -> Result<(), Error> {
        syscall::barrier_wait(self.id).map_err(Error::from)
    }

    pub fn destroy(&self) -> Result<(), Error> {
        syscall::barrier_destroy(self.id).map_err(Error::from)
    }
}
