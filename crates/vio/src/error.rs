//! Error representation.

use std::{io, os::fd::RawFd};
use thiserror::Error;

/// A helper type wrapping [`std::result::Result`] for the operations of
/// this crate.
pub type Result<T> = std::result::Result<T, Error>;

/// The error type returned by the vectored I/O operations.
///
/// [`BadDescriptor`] and [`TooManySegments`] are usage errors: they are
/// raised before any syscall is attempted, no data is transferred, and
/// retrying the call unchanged cannot succeed. [`Io`] carries the platform
/// error of a syscall that was actually issued; whether to retry is caller
/// policy (e.g. `EAGAIN` on a non-blocking descriptor).
///
/// [`BadDescriptor`]: Error::BadDescriptor
/// [`TooManySegments`]: Error::TooManySegments
/// [`Io`]: Error::Io
#[derive(Debug, Error)]
pub enum Error {
    /// The descriptor is negative or does not refer to an open file.
    #[error("bad file descriptor: {0}")]
    BadDescriptor(RawFd),

    /// The buffer vector has more segments than the platform accepts in
    /// one call.
    #[error("vector of {count} segments exceeds the platform limit of {max}")]
    TooManySegments { count: usize, max: usize },

    /// The underlying syscall failed.
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl Error {
    /// Return whether this error is a usage error, i.e. it was raised
    /// before any syscall was attempted.
    pub fn is_usage(&self) -> bool {
        !matches!(self, Error::Io(_))
    }

    /// Return the OS error code associated with this error, if any.
    pub fn raw_os_error(&self) -> Option<i32> {
        match self {
            Error::BadDescriptor(_) => Some(libc::EBADF),
            Error::TooManySegments { .. } => Some(libc::EINVAL),
            Error::Io(err) => err.raw_os_error(),
        }
    }
}

impl From<Error> for io::Error {
    fn from(err: Error) -> Self {
        match err {
            Error::Io(err) => err,
            err => {
                let code = err.raw_os_error().unwrap_or(libc::EINVAL);
                io::Error::from_raw_os_error(code)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn usage_errors_carry_codes() {
        let err = Error::BadDescriptor(-1);
        assert!(err.is_usage());
        assert_eq!(err.raw_os_error(), Some(libc::EBADF));

        let err = Error::TooManySegments { count: 2048, max: 1024 };
        assert!(err.is_usage());
        assert_eq!(err.raw_os_error(), Some(libc::EINVAL));
    }

    #[test]
    fn io_errors_pass_through() {
        let err = Error::from(io::Error::from_raw_os_error(libc::EPIPE));
        assert!(!err.is_usage());
        assert_eq!(err.raw_os_error(), Some(libc::EPIPE));

        let err: io::Error = Error::from(io::Error::from_raw_os_error(libc::EPIPE)).into();
        assert_eq!(err.raw_os_error(), Some(libc::EPIPE));
    }
}
