//! `Read`/`Write`/`BufRead` traits over the `READ`/`WRITE` syscalls, plus
//! the `print!`/`println!` family built on them.
//!
//! ko6 has no filesystem layer beneath the console, so the only valid
//! descriptors are stdin/stdout/stderr (0/1/2); there is nothing here
//! analogous to `open`.

use crate::error::Error;

pub mod buffered;
pub mod stdio;

pub use self::buffered::BufReader;
pub use self::stdio::{STDERR_FD, STDIN_FD, STDOUT_FD, stderr, stdin, stdout};

pub const DEFAULT_BUF_SIZE: usize = 512;

pub trait Read {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Error>;

    fn read_exact(&mut self, mut buf: &mut [u8]) -> Result<(), Error> {
        while !buf.is_empty() {
            match self.read(buf) {
                Ok(0) => return Err(Error::ReadExactEof),
                Ok(n) => buf = &mut buf[n..],
                Err(e) if e.is_interrupted() => {}
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }
}

pub trait Write {
    fn write(&mut self, buf: &[u8]) -> Result<usize, Error>;

    fn write_all(&mut self, mut buf: &[u8]) -> Result<(), Error> {
        while !buf.is_empty() {
            match self.write(buf) {
                Ok(0) => return Err(Error::WriteAllEof),
                Ok(n) => buf = &buf[n..],
                Err(e) if e.is_interrupted() => {}
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<(), Error> {
        Ok(())
    }
}

pub trait BufRead: Read {
    fn fill_buf(&mut self) -> Result<&[u8], Error>;
    fn consume(&mut self, amt: usize);

    fn read_line(&mut self, buf: &mut crate::alloc_crate::string::String) -> Result<usize, Error> {
        let start_len = buf.len();
        loop {
            let available = self.fill_buf()?;
            if available.is_empty() {
                break;
            }
            let (consumed, done) = match available.iter().position(|&b| b == b'\n') {
                Some(pos) => (pos + 1, true),
                None => (available.len(), false),
            };
            let chunk = core::str::from_utf8(&available[..consumed]).map_err(|_| Error::InvalidUtf8)?;
            buf.push_str(chunk);
            self.consume(consumed);
            if done {
                break;
            }
        }
        Ok(buf.len() - start_len)
    }
}

impl Read for &[u8] {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Error> {
        let n = self.len().min(buf.len());
        buf[..n].copy_from_slice(&self[..n]);
        *self = &self[n..];
        Ok(n)
    }
}

#[macro_export]
macro_rules! print {
    ($($arg:tt)*) => {
        $crate::io::stdio::_print(format_args!($($arg)*))
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

#[macro_export]
macro_rules! eprint {
    ($($arg:tt)*) => {
        $crate::io::stdio::_eprint(format_args!($($arg)*))
    };
}

#[macro_export]
macro_rules! eprintln {
    () => {
        $crate::eprint!("\n")
    };
    ($($arg:tt)*) => {
        $crate::eprint!("{}\n", format_args!($($arg)*))
    };
}
