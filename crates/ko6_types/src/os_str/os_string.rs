use alloc::{borrow::ToOwned, vec::Vec};
use core::ops::Deref;

use super::OsStr;

#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct OsString {
    inner: Vec<u8>,
}

impl OsString {
    #[must_use]
    pub fn new() -> Self {
        Self { inner: Vec::new() }
    }

    #[must_use]
    pub fn as_os_str(&self) -> &OsStr {
        OsStr::from_bytes(&self.inner)
    }
}

impl Deref for OsString {
    type Target = OsStr;

    fn deref(&self) -> &Self::Target {
        self.as_os_str()
    }
}

impl From<&OsStr> for OsString {
    fn from(s: &OsStr) -> Self {
        Self {
            inner: s.as_bytes().to_owned(),
        }
    }
}
