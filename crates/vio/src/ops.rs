//! The vectored I/O boundary: argument validation, syscall dispatch and
//! error translation.

use crate::{
    error::{Error, Result},
    limit, sys,
};
use std::{
    io::{self, IoSlice, IoSliceMut},
    os::fd::AsRawFd,
};

fn validate(fd: &impl AsRawFd, count: usize) -> Result<()> {
    let raw = fd.as_raw_fd();
    if raw < 0 || !sys::is_open(raw) {
        return Err(Error::BadDescriptor(raw));
    }

    let max = limit::max_segments();
    if count > max {
        return Err(Error::TooManySegments { count, max });
    }

    Ok(())
}

fn retry(mut f: impl FnMut() -> io::Result<usize>) -> Result<usize> {
    loop {
        match f() {
            Err(err) if err.raw_os_error() == Some(libc::EINTR) => {
                tracing::trace!("EINTR");
                continue;
            }
            res => return res.map_err(Error::from),
        }
    }
}

/// Read from `fd` into multiple buffers with a single syscall.
///
/// The buffers are filled strictly in order: a buffer receives no bytes
/// until every buffer before it has been filled to capacity. The returned
/// count is the total number of bytes transferred and may be smaller than
/// the summed capacity of `bufs`; a short read is an ordinary result, not
/// an error. Bytes past the returned count are left untouched.
///
/// Interruption by a signal (`EINTR`) is retried transparently. Every
/// other syscall failure is surfaced as [`Error::Io`] with the platform
/// error code preserved.
///
/// An invalid descriptor or a vector longer than [`max_segments`] fails
/// with a usage error before any syscall is attempted.
///
/// [`max_segments`]: crate::max_segments
pub fn read_vectored(fd: &impl AsRawFd, bufs: &mut [IoSliceMut<'_>]) -> Result<usize> {
    validate(fd, bufs.len())?;
    if bufs.is_empty() {
        return Ok(0);
    }
    retry(|| sys::readv(fd, bufs))
}

/// Write multiple buffers to `fd` with a single syscall.
///
/// The buffers are transmitted as one concatenated payload without copying
/// them into a contiguous region. The returned count may be smaller than
/// the summed length of `bufs` (e.g. on a non-blocking descriptor); the
/// caller is responsible for re-issuing the remainder. Validation and
/// retry behavior match [`read_vectored`].
pub fn write_vectored(fd: &impl AsRawFd, bufs: &[IoSlice<'_>]) -> Result<usize> {
    validate(fd, bufs.len())?;
    if bufs.is_empty() {
        return Ok(0);
    }
    retry(|| sys::writev(fd, bufs))
}

/// Positional form of [`read_vectored`], reading at `offset` without
/// moving the descriptor's file position.
pub fn read_vectored_at(
    fd: &impl AsRawFd,
    bufs: &mut [IoSliceMut<'_>],
    offset: u64,
) -> Result<usize> {
    validate(fd, bufs.len())?;
    if bufs.is_empty() {
        return Ok(0);
    }
    retry(|| sys::preadv(fd, bufs, offset))
}

/// Positional form of [`write_vectored`], writing at `offset` without
/// moving the descriptor's file position.
pub fn write_vectored_at(fd: &impl AsRawFd, bufs: &[IoSlice<'_>], offset: u64) -> Result<usize> {
    validate(fd, bufs.len())?;
    if bufs.is_empty() {
        return Ok(0);
    }
    retry(|| sys::pwritev(fd, bufs, offset))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::max_segments;
    use std::os::fd::{FromRawFd, OwnedFd, RawFd};

    fn pipe() -> (OwnedFd, OwnedFd) {
        let mut fds = [0 as RawFd; 2];
        let res = unsafe { libc::pipe2(fds.as_mut_ptr(), libc::O_CLOEXEC) };
        assert_eq!(res, 0, "pipe2: {}", io::Error::last_os_error());
        unsafe { (OwnedFd::from_raw_fd(fds[0]), OwnedFd::from_raw_fd(fds[1])) }
    }

    fn temp_file(name: &str) -> std::fs::File {
        let path = std::env::temp_dir().join(format!("vio-ops-{}-{}", std::process::id(), name));
        let file = std::fs::OpenOptions::new()
            .create(true)
            .truncate(true)
            .read(true)
            .write(true)
            .open(&path)
            .unwrap();
        std::fs::remove_file(&path).unwrap();
        file
    }

    #[test]
    fn round_trip_two_segments() {
        let (r, w) = pipe();

        let n = write_vectored(&w, &[IoSlice::new(b"hello"), IoSlice::new(b"world")]).unwrap();
        assert_eq!(n, 10);

        let (mut a, mut b) = ([0u8; 5], [0u8; 5]);
        let n = read_vectored(&r, &mut [IoSliceMut::new(&mut a), IoSliceMut::new(&mut b)])
            .unwrap();
        assert_eq!(n, 10);
        assert_eq!(&a, b"hello");
        assert_eq!(&b, b"world");
    }

    #[test]
    fn short_read_fills_in_order() {
        let (r, w) = pipe();

        let n = write_vectored(&w, &[IoSlice::new(b"abcdef")]).unwrap();
        assert_eq!(n, 6);

        let mut a = [0u8; 5];
        let mut b = [0x77u8; 5];
        let n = read_vectored(&r, &mut [IoSliceMut::new(&mut a), IoSliceMut::new(&mut b)])
            .unwrap();
        assert_eq!(n, 6);
        assert_eq!(&a, b"abcde");
        assert_eq!(b[0], b'f');
    }

    #[test]
    fn full_write_to_regular_file() {
        let file = temp_file("full-write");

        let bufs = [
            IoSlice::new(b"hello"),
            IoSlice::new(b" "),
            IoSlice::new(b"world"),
        ];
        let n = write_vectored(&file, &bufs).unwrap();
        assert_eq!(n, 11);

        let (mut a, mut b) = ([0u8; 5], [0u8; 6]);
        let n = read_vectored_at(&file, &mut [IoSliceMut::new(&mut a), IoSliceMut::new(&mut b)], 0)
            .unwrap();
        assert_eq!(n, 11);
        assert_eq!(&a, b"hello");
        assert_eq!(&b, b" world");
    }

    #[test]
    fn positional_ops_leave_file_position_untouched() {
        let file = temp_file("positional");

        let n = write_vectored_at(&file, &[IoSlice::new(b"xyz")], 3).unwrap();
        assert_eq!(n, 3);

        // The cursor is still at zero, so a plain gather read starts in the
        // hole preceding the payload.
        let mut buf = [0xffu8; 6];
        let n = read_vectored(&file, &mut [IoSliceMut::new(&mut buf)]).unwrap();
        assert_eq!(n, 6);
        assert_eq!(&buf[..3], &[0, 0, 0]);
        assert_eq!(&buf[3..], b"xyz");

        let mut buf = [0u8; 3];
        let n = read_vectored_at(&file, &mut [IoSliceMut::new(&mut buf)], 3).unwrap();
        assert_eq!(n, 3);
        assert_eq!(&buf, b"xyz");
    }

    #[test]
    fn too_many_segments_issues_no_syscall() {
        let (r, w) = pipe();
        let max = max_segments();

        let bufs: Vec<IoSlice<'_>> = (0..max + 1).map(|_| IoSlice::new(b"x")).collect();
        let err = write_vectored(&w, &bufs).unwrap_err();
        assert!(matches!(err, Error::TooManySegments { .. }), "{err}");
        assert!(err.is_usage());

        // The pipe must not have received a single byte.
        sys::set_nonblocking(&r, true).unwrap();
        let mut probe = [0u8; 8];
        let res = unsafe {
            libc::read(
                r.as_raw_fd(),
                probe.as_mut_ptr() as *mut libc::c_void,
                probe.len(),
            )
        };
        assert_eq!(res, -1);
        assert_eq!(
            io::Error::last_os_error().raw_os_error(),
            Some(libc::EAGAIN)
        );

        let mut storage = vec![0u8; max + 1];
        let mut bufs: Vec<IoSliceMut<'_>> =
            storage.chunks_mut(1).map(IoSliceMut::new).collect();
        let err = read_vectored(&r, &mut bufs).unwrap_err();
        assert!(matches!(err, Error::TooManySegments { .. }), "{err}");
    }

    #[test]
    fn bad_descriptor_fails_before_any_transfer() {
        let mut buf = [0u8; 4];

        let err = read_vectored(&-1, &mut [IoSliceMut::new(&mut buf)]).unwrap_err();
        assert!(matches!(err, Error::BadDescriptor(-1)), "{err}");
        assert!(err.is_usage());
        assert_eq!(buf, [0u8; 4]);

        // In valid range, but never allocated by this process.
        let stale: RawFd = RawFd::MAX;
        let err = write_vectored(&stale, &[IoSlice::new(b"data")]).unwrap_err();
        assert!(matches!(err, Error::BadDescriptor(fd) if fd == stale), "{err}");

        // Usage errors win over the empty-vector fast path.
        let err = write_vectored(&-1, &[]).unwrap_err();
        assert!(err.is_usage());
    }

    #[test]
    fn empty_vector_is_a_no_op() {
        let (r, w) = pipe();
        assert_eq!(write_vectored(&w, &[]).unwrap(), 0);
        assert_eq!(read_vectored(&r, &mut []).unwrap(), 0);
    }

    #[test]
    fn nonblocking_write_returns_short_count() {
        let (r, w) = pipe();
        sys::set_nonblocking(&w, true).unwrap();

        // Much larger than any default pipe capacity.
        let chunk = vec![0xa5u8; 256 * 1024];
        let bufs = [IoSlice::new(&chunk), IoSlice::new(&chunk)];
        let n = write_vectored(&w, &bufs).unwrap();
        assert!(n > 0);
        assert!(n < chunk.len() * 2);

        drop(r);
    }

    #[test]
    fn max_segments_query() {
        assert!(max_segments() > 0);
        assert_eq!(max_segments(), max_segments());
    }
}
