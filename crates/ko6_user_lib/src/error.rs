//! Error type returned by the typed wrappers in [`crate::os::ko6::syscall`]
//! and everything built on top of them.

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("stream did not contain valid UTF-8")]
    InvalidUtf8,
    #[error("failed to fill whole buffer")]
    ReadExactEof,
    #[error("failed to write whole buffer")]
    WriteAllEof,
    #[error(transparent)]
    Syscall(#[from] ko6_abi::Error),
}

impl Error {
    #[must_use]
    pub fn is_interrupted(&self) -> bool {
        matches!(self, Self::Syscall(ko6_abi::Error::Interrupted))
    }
}
