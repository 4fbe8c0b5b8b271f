//! Scatter/gather I/O for Unix file descriptors.
//!
//! This crate exposes the POSIX vectored I/O syscalls (`readv(2)`,
//! `writev(2)` and their positional siblings `preadv(2)`/`pwritev(2)`)
//! behind a validated boundary: multiple discontiguous buffers are read
//! from or written to a descriptor with a *single* syscall, without
//! copying them into one contiguous region.
//!
//! The operations borrow the caller's buffers for the duration of the
//! call, verify the descriptor and the segment count before touching the
//! kernel, retry transparently when interrupted by a signal, and report
//! short transfers as ordinary results. See [`Error`] for how usage
//! errors are kept apart from I/O failures.
//!
//! ```
//! use std::io::{IoSlice, IoSliceMut};
//! use std::os::unix::net::UnixStream;
//!
//! # fn main() -> vio::Result<()> {
//! let (a, b) = UnixStream::pair()?;
//!
//! let sent = vio::write_vectored(&a, &[IoSlice::new(b"hello"), IoSlice::new(b"world")])?;
//! assert_eq!(sent, 10);
//!
//! let (mut head, mut tail) = ([0u8; 5], [0u8; 5]);
//! let received = vio::read_vectored(
//!     &b,
//!     &mut [IoSliceMut::new(&mut head), IoSliceMut::new(&mut tail)],
//! )?;
//! assert_eq!(received, 10);
//! assert_eq!(&head, b"hello");
//! assert_eq!(&tail, b"world");
//! # Ok(())
//! # }
//! ```

#![forbid(clippy::todo, clippy::unimplemented)]

mod channel;
mod error;
mod limit;
mod ops;
mod sys;

pub mod bytes;
pub mod chunked;

pub use crate::{
    channel::Channel,
    error::{Error, Result},
    limit::max_segments,
    ops::{read_vectored, read_vectored_at, write_vectored, write_vectored_at},
};
