use crate::{
    bytes::{Bytes, FillBytes},
    error::Result,
    ops, sys,
};
use std::{
    io::{self, IoSlice, IoSliceMut},
    mem::MaybeUninit,
    os::fd::{AsFd, AsRawFd, BorrowedFd, OwnedFd, RawFd},
};

/// An owned file descriptor with a vectored I/O surface.
///
/// `Channel` wraps any descriptor-backed object (a file, a pipe end, a
/// socket) and exposes the validated scatter/gather operations of this
/// crate as methods. Dropping the channel closes the descriptor.
#[derive(Debug)]
pub struct Channel {
    fd: OwnedFd,
}

impl From<OwnedFd> for Channel {
    fn from(fd: OwnedFd) -> Self {
        Self { fd }
    }
}

impl From<std::fs::File> for Channel {
    fn from(file: std::fs::File) -> Self {
        Self { fd: file.into() }
    }
}

impl From<std::net::TcpStream> for Channel {
    fn from(stream: std::net::TcpStream) -> Self {
        Self { fd: stream.into() }
    }
}

impl From<std::os::unix::net::UnixStream> for Channel {
    fn from(stream: std::os::unix::net::UnixStream) -> Self {
        Self { fd: stream.into() }
    }
}

impl From<Channel> for OwnedFd {
    fn from(channel: Channel) -> Self {
        channel.fd
    }
}

impl AsFd for Channel {
    #[inline]
    fn as_fd(&self) -> BorrowedFd<'_> {
        self.fd.as_fd()
    }
}

impl AsRawFd for Channel {
    fn as_raw_fd(&self) -> RawFd {
        self.fd.as_raw_fd()
    }
}

impl Channel {
    /// Duplicate the underlying descriptor into a new independent channel.
    ///
    /// The duplicate shares the file description (and thus the file
    /// position) with the original, and has `FD_CLOEXEC` set.
    pub fn try_clone(&self) -> Result<Self> {
        let fd = sys::dup_cloexec(&self.fd)?;
        Ok(Self { fd })
    }

    /// Enable or disable `O_NONBLOCK` on the underlying descriptor.
    pub fn set_nonblocking(&self, nonblocking: bool) -> Result<()> {
        sys::set_nonblocking(&self.fd, nonblocking)?;
        Ok(())
    }

    /// See [`read_vectored`](crate::read_vectored).
    pub fn read_vectored(&self, bufs: &mut [IoSliceMut<'_>]) -> Result<usize> {
        ops::read_vectored(&self.fd, bufs)
    }

    /// See [`write_vectored`](crate::write_vectored).
    pub fn write_vectored(&self, bufs: &[IoSlice<'_>]) -> Result<usize> {
        ops::write_vectored(&self.fd, bufs)
    }

    /// See [`read_vectored_at`](crate::read_vectored_at).
    pub fn read_vectored_at(&self, bufs: &mut [IoSliceMut<'_>], offset: u64) -> Result<usize> {
        ops::read_vectored_at(&self.fd, bufs, offset)
    }

    /// See [`write_vectored_at`](crate::write_vectored_at).
    pub fn write_vectored_at(&self, bufs: &[IoSlice<'_>], offset: u64) -> Result<usize> {
        ops::write_vectored_at(&self.fd, bufs, offset)
    }

    /// Gather-write an entire [`Bytes`] payload with a single syscall.
    ///
    /// The payload's chunks are collected into a segment vector (on the
    /// stack for small segment counts) and transmitted with one `writev`.
    /// A transfer shorter than the payload is reported as an error; use
    /// [`write_vectored`](Channel::write_vectored) when partial progress
    /// is an acceptable outcome. A payload with more than
    /// [`max_segments`](crate::max_segments) chunks is a usage error.
    pub fn write_bytes<B>(&self, bytes: B) -> Result<()>
    where
        B: Bytes,
    {
        let size = bytes.size();
        let count = bytes.count();

        let written;

        macro_rules! small_write {
            ($n:expr) => {{
                let mut vec: [MaybeUninit<IoSlice<'_>>; $n] =
                    unsafe { MaybeUninit::uninit().assume_init() };
                bytes.fill_bytes(&mut FillSegments {
                    vec: &mut vec[..],
                    offset: 0,
                });
                let vec = unsafe { slice_assume_init_ref(&vec[..]) };

                written = ops::write_vectored(&self.fd, vec)?;
            }};
        }

        match count {
            // Skip writing.
            0 => return Ok(()),

            // Avoid heap allocation if count is small.
            1 => small_write!(1),
            2 => small_write!(2),
            3 => small_write!(3),
            4 => small_write!(4),

            count => {
                let mut vec: Vec<IoSlice<'_>> = Vec::with_capacity(count);
                unsafe {
                    let dst = std::slice::from_raw_parts_mut(
                        vec.as_mut_ptr().cast(), //
                        count,
                    );
                    bytes.fill_bytes(&mut FillSegments {
                        vec: dst,
                        offset: 0,
                    });
                    vec.set_len(count);
                }

                written = ops::write_vectored(&self.fd, &vec)?;
            }
        }

        if written < size {
            return Err(io::Error::new(io::ErrorKind::WriteZero, "short write").into());
        }

        Ok(())
    }
}

impl io::Read for Channel {
    #[inline]
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        (&*self).read(buf)
    }

    #[inline]
    fn read_vectored(&mut self, bufs: &mut [IoSliceMut<'_>]) -> io::Result<usize> {
        (&*self).read_vectored(bufs).map_err(Into::into)
    }
}

impl io::Read for &Channel {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        ops::read_vectored(&self.fd, &mut [IoSliceMut::new(buf)]).map_err(Into::into)
    }

    fn read_vectored(&mut self, bufs: &mut [IoSliceMut<'_>]) -> io::Result<usize> {
        ops::read_vectored(&self.fd, bufs).map_err(Into::into)
    }
}

impl io::Write for Channel {
    #[inline]
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        (&*self).write(buf)
    }

    #[inline]
    fn write_vectored(&mut self, bufs: &[IoSlice<'_>]) -> io::Result<usize> {
        (&*self).write_vectored(bufs).map_err(Into::into)
    }

    #[inline]
    fn flush(&mut self) -> io::Result<()> {
        (&*self).flush()
    }
}

impl io::Write for &Channel {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        ops::write_vectored(&self.fd, &[IoSlice::new(buf)]).map_err(Into::into)
    }

    fn write_vectored(&mut self, bufs: &[IoSlice<'_>]) -> io::Result<usize> {
        ops::write_vectored(&self.fd, bufs).map_err(Into::into)
    }

    fn flush(&mut self) -> io::Result<()> {
        // Writes go straight to the descriptor.
        Ok(())
    }
}

struct FillSegments<'a, 'vec> {
    vec: &'vec mut [MaybeUninit<IoSlice<'a>>],
    offset: usize,
}

impl<'a, 'vec> FillBytes<'a> for FillSegments<'a, 'vec> {
    fn put(&mut self, chunk: &'a [u8]) {
        self.vec[self.offset] = MaybeUninit::new(IoSlice::new(chunk));
        self.offset += 1;
    }
}

// FIXME: replace with stabilized MaybeUninit::slice_assume_init_ref.
#[inline(always)]
unsafe fn slice_assume_init_ref<T>(slice: &[MaybeUninit<T>]) -> &[T] {
    #[allow(unused_unsafe)]
    unsafe {
        &*(slice as *const [MaybeUninit<T>] as *const [T])
    }
}
