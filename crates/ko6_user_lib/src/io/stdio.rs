use core::fmt::{self, Write as _};

use once_init::OnceInit;

use super::{BufRead, BufReader, Read, Write};
use crate::{
    alloc_crate::string::String,
    error::Error,
    io::DEFAULT_BUF_SIZE,
    os::ko6::syscall,
    sync::spin::{Mutex, MutexGuard},
};

#[doc(hidden)]
pub fn _print(args: fmt::Arguments<'_>) {
    let _ = stdout().write_fmt(args);
}

#[doc(hidden)]
pub fn _eprint(args: fmt::Arguments<'_>) {
    let _ = stderr().write_fmt(args);
}

pub const STDIN_FD: usize = 0;
pub const STDOUT_FD: usize = 1;
pub const STDERR_FD: usize = 2;

struct StdinRaw;

impl Read for StdinRaw {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Error> {
        syscall::read(buf).map_err(Error::from)
    }
}

#[must_use]
pub fn stdout() -> Stdout {
    Stdout
}

#[must_use]
pub fn stderr() -> Stderr {
    Stderr
}

pub fn stdin() -> Stdin {
    static INSTANCE: OnceInit<Mutex<BufReader<StdinRaw>>> = OnceInit::new();
    let _ = INSTANCE.try_init_with(|| Mutex::new(BufReader::with_capacity(DEFAULT_BUF_SIZE, StdinRaw)));
    let instance = loop {
        if let Ok(instance) = INSTANCE.try_get() {
            break instance;
        }
    };
    Stdin { inner: instance }
}

pub struct Stdout;

impl Write for Stdout {
    fn write(&mut self, buf: &[u8]) -> Result<usize, Error> {
        syscall::write(STDOUT_FD, buf).map_err(Error::from)
    }
}

impl Write for &'_ Stdout {
    fn write(&mut self, buf: &[u8]) -> Result<usize, Error> {
        syscall::write(STDOUT_FD, buf).map_err(Error::from)
    }
}

impl fmt::Write for Stdout {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        Write::write(self, s.as_bytes()).map(drop).map_err(|_| fmt::Error)
    }
}

pub struct Stderr;

impl Write for Stderr {
    fn write(&mut self, buf: &[u8]) -> Result<usize, Error> {
        syscall::write(STDERR_FD, buf).map_err(Error::from)
    }
}

impl Write for &'_ Stderr {
    fn write(&mut self, buf: &[u8]) -> Result<usize, Error> {
        syscall::write(STDERR_FD, buf).map_err(Error::from)
    }
}

impl fmt::Write for Stderr {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        Write::write(self, s.as_bytes()).map(drop).map_err(|_| fmt::Error)
    }
}

pub struct Stdin {
    inner: &'static Mutex<BufReader<StdinRaw>>,
}

pub struct StdinLock<'lock> {
    inner: MutexGuard<'lock, BufReader<StdinRaw>>,
}

impl Stdin {
    #[must_use]
    pub fn lock(&self) -> StdinLock<'_> {
        StdinLock {
            inner: self.inner.lock(),
        }
    }

    pub fn read_line(&mut self, buf: &mut String) -> Result<usize, Error> {
        self.lock().read_line(buf)
    }
}

impl Read for Stdin {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Error> {
        self.inner.lock().read(buf)
    }
}

impl Read for StdinLock<'_> {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Error> {
        self.inner.read(buf)
    }
}

impl BufRead for StdinLock<'_> {
    fn fill_buf(&mut self) -> Result<&[u8], Error> {
        self.inner.fill_buf()
    }

    fn consume(&mut self, amt: usize) {
        self.inner.consume(amt)
    }
}
