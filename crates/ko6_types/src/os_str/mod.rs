//! A byte-string wrapper, used for directory-entry names and device names.
//!
//! Unlike a plain `&[u8]`, `OsStr` carries a [`Display`] impl that degrades
//! gracefully on non-UTF-8 content, matching how device/file names are
//! printed by `kshell` and `sched_dump`.

use core::{
    fmt::{self, Write as _},
    ptr, str,
};

#[cfg(feature = "alloc")]
pub use self::os_string::OsString;

#[cfg(feature = "alloc")]
mod os_string;

#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct OsStr {
    inner: [u8],
}

impl OsStr {
    #[must_use]
    pub fn new<S>(s: &S) -> &Self
    where
        S: AsRef<Self> + ?Sized,
    {
        s.as_ref()
    }

    #[must_use]
    pub fn to_str(&self) -> Option<&str> {
        str::from_utf8(&self.inner).ok()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    #[must_use]
    pub fn from_bytes(slice: &[u8]) -> &Self {
        Self::from_inner(slice)
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.inner
    }

    #[must_use]
    pub fn display(&self) -> Display<'_> {
        Display { os_str: self }
    }

    fn from_inner(inner: &[u8]) -> &Self {
        unsafe { &*(ptr::from_ref(inner) as *const Self) }
    }
}

impl AsRef<Self> for OsStr {
    fn as_ref(&self) -> &Self {
        self
    }
}

impl AsRef<OsStr> for str {
    fn as_ref(&self) -> &OsStr {
        OsStr::from_inner(self.as_bytes())
    }
}

impl Default for &OsStr {
    fn default() -> Self {
        OsStr::new("")
    }
}

impl PartialEq<str> for OsStr {
    fn eq(&self, other: &str) -> bool {
        *self == *Self::new(other)
    }
}

impl PartialEq<OsStr> for str {
    fn eq(&self, other: &OsStr) -> bool {
        *other == *OsStr::new(self)
    }
}

pub struct Display<'a> {
    os_str: &'a OsStr,
}

impl fmt::Display for Display<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.os_str.is_empty() {
            return "".fmt(f);
        }

        for chunk in self.os_str.inner.utf8_chunks() {
            let valid = chunk.valid();
            if chunk.invalid().is_empty() {
                return valid.fmt(f);
            }
            f.write_str(valid)?;
            f.write_char(char::REPLACEMENT_CHARACTER)?;
        }
        Ok(())
    }
}
