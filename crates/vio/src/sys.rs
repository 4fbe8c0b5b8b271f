//! Raw syscall wrappers.
//!
//! Each function issues its syscall exactly once and maps `-1` to
//! [`std::io::Error::last_os_error`]. Validation and retry policy live in
//! the layers above.

use libc::{c_int, iovec, off_t};
use std::{
    cmp,
    io::{self, IoSlice, IoSliceMut},
    os::fd::{AsRawFd, FromRawFd, OwnedFd, RawFd},
};

macro_rules! syscall {
    ($fn:ident ( $($arg:expr),* $(,)* ) ) => {{
        #[allow(unused_unsafe)]
        let res = unsafe { libc::$fn($($arg),*) };
        if res == -1 {
            return Err(std::io::Error::last_os_error());
        }
        res
    }};
}

pub fn readv(fd: &impl AsRawFd, bufs: &mut [IoSliceMut<'_>]) -> io::Result<usize> {
    let len = syscall! {
        readv(
            fd.as_raw_fd(), //
            bufs.as_mut_ptr() as *mut iovec,
            cmp::min(bufs.len(), c_int::MAX as usize) as c_int,
        )
    };
    Ok(len as usize)
}

pub fn writev(fd: &impl AsRawFd, bufs: &[IoSlice<'_>]) -> io::Result<usize> {
    let len = syscall! {
        writev(
            fd.as_raw_fd(), //
            bufs.as_ptr() as *const iovec,
            cmp::min(bufs.len(), c_int::MAX as usize) as c_int,
        )
    };
    Ok(len as usize)
}

pub fn preadv(fd: &impl AsRawFd, bufs: &mut [IoSliceMut<'_>], offset: u64) -> io::Result<usize> {
    let offset = to_off_t(offset)?;
    let len = syscall! {
        preadv(
            fd.as_raw_fd(), //
            bufs.as_mut_ptr() as *mut iovec,
            cmp::min(bufs.len(), c_int::MAX as usize) as c_int,
            offset,
        )
    };
    Ok(len as usize)
}

pub fn pwritev(fd: &impl AsRawFd, bufs: &[IoSlice<'_>], offset: u64) -> io::Result<usize> {
    let offset = to_off_t(offset)?;
    let len = syscall! {
        pwritev(
            fd.as_raw_fd(), //
            bufs.as_ptr() as *const iovec,
            cmp::min(bufs.len(), c_int::MAX as usize) as c_int,
            offset,
        )
    };
    Ok(len as usize)
}

#[inline]
fn to_off_t(offset: u64) -> io::Result<off_t> {
    offset
        .try_into()
        .map_err(|_| io::Error::from_raw_os_error(libc::EOVERFLOW))
}

/// Return whether `fd` currently refers to an open file description.
pub fn is_open(fd: RawFd) -> bool {
    unsafe { libc::fcntl(fd, libc::F_GETFD) != -1 }
}

/// Query the maximum segment count accepted by one vectored I/O call.
///
/// `None` means the platform reports no determinate limit.
pub fn iov_max() -> Option<usize> {
    let res = unsafe { libc::sysconf(libc::_SC_IOV_MAX) };
    if res < 0 {
        None
    } else {
        Some(res as usize)
    }
}

pub fn dup_cloexec(fd: &impl AsRawFd) -> io::Result<OwnedFd> {
    let newfd = syscall! { fcntl(fd.as_raw_fd(), libc::F_DUPFD_CLOEXEC, 0) };
    Ok(unsafe { OwnedFd::from_raw_fd(newfd) })
}

pub fn set_nonblocking(fd: &impl AsRawFd, nonblocking: bool) -> io::Result<()> {
    let flags = syscall! { fcntl(fd.as_raw_fd(), libc::F_GETFL) };
    let flags = if nonblocking {
        flags | libc::O_NONBLOCK
    } else {
        flags & !libc::O_NONBLOCK
    };
    syscall! { fcntl(fd.as_raw_fd(), libc::F_SETFL, flags) };
    Ok(())
}
