use strum::FromRepr;

/// The kernel's error taxonomy.
///
/// Every kernel-visible operation returns an integer: zero or a positive
/// length is success, a negated member of this set is failure. Each variant
/// carries a stable, human-readable message and a stable numeric code
/// matching its discriminant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromRepr, thiserror::Error)]
#[repr(isize)]
pub enum Error {
    #[error("operation not permitted")]
    NotPermitted = 1,
    #[error("no such file or directory")]
    NotFound = 2,
    #[error("no such thread")]
    NoSuchThread = 3,
    #[error("interrupted system call")]
    Interrupted = 4,
    #[error("I/O error")]
    Io = 5,
    #[error("no such device or address")]
    NoSuchAddress = 6,
    #[error("argument list too long")]
    ArgumentTooLong = 7,
    #[error("exec format error")]
    NotExecutable = 8,
    #[error("bad file descriptor")]
    BadDescriptor = 9,
    #[error("cannot allocate memory")]
    OutOfMemory = 12,
    #[error("permission denied")]
    PermissionDenied = 13,
    #[error("bad address")]
    BadAddress = 14,
    #[error("device or resource busy")]
    Busy = 16,
    #[error("file exists")]
    Exists = 17,
    #[error("no such device")]
    NoSuchDevice = 19,
    #[error("not a directory")]
    NotADirectory = 20,
    #[error("is a directory")]
    IsADirectory = 21,
    #[error("invalid argument")]
    InvalidArgument = 22,
    #[error("file table overflow")]
    NoBufferSpace = 23,
    #[error("file too large")]
    FileTooLarge = 27,
    #[error("no space left on device")]
    NoSpace = 28,
    #[error("read-only file system")]
    ReadOnlyFs = 30,
    #[error("resource deadlock avoided")]
    DeadlockAvoided = 35,
    #[error("function not implemented")]
    NotImplemented = 38,
    #[error("inappropriate ioctl for device")]
    BadIoctl = 25,
    #[error("numerical result out of range")]
    Overflow = 34,
    #[error("resource temporarily unavailable")]
    TemporarilyUnavailable = 11,
    #[error("success")]
    Success = 0,
    #[error("operation failed")]
    GenericFailure = 255,
}

impl Error {
    /// The stable numeric code, matching the discriminant.
    #[must_use]
    pub fn code(self) -> isize {
        self as isize
    }

    /// Recovers an [`Error`] from a negative return value, if it names a
    /// recognized kind.
    #[must_use]
    pub fn from_negated_code(code: isize) -> Option<Self> {
        Self::from_repr(-code)
    }
}
