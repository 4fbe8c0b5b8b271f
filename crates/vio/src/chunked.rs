//! Multi-syscall fallback for vectors longer than the platform limit.
//!
//! The default operations reject vectors with more than
//! [`max_segments`](crate::max_segments) entries, preserving the guarantee
//! that one call is one syscall. The functions here opt out of that
//! guarantee: they accept vectors of any length and issue as many syscalls
//! as required, at most `max_segments()` segments per call. Other threads
//! or processes sharing the descriptor may observe I/O interleaved between
//! chunks.
//!
//! A failure after partial progress is reported as a short transfer; the
//! next call on the descriptor surfaces the error.

use crate::{
    error::Result,
    limit, ops,
};
use std::{
    io::{IoSlice, IoSliceMut},
    os::fd::AsRawFd,
};

/// [`read_vectored`](crate::read_vectored) over an unbounded vector.
///
/// Stops at the first short read, end of input, or error after progress.
pub fn read_vectored(fd: &impl AsRawFd, bufs: &mut [IoSliceMut<'_>]) -> Result<usize> {
    if bufs.is_empty() {
        return ops::read_vectored(fd, bufs);
    }

    let max = limit::max_segments();
    let mut total = 0;

    for chunk in bufs.chunks_mut(max) {
        let capacity: usize = chunk.iter().map(|b| b.len()).sum();
        let n = match ops::read_vectored(fd, chunk) {
            Ok(n) => n,
            Err(err) if total > 0 => {
                tracing::trace!(%err, total, "stopping after partial gather read");
                break;
            }
            Err(err) => return Err(err),
        };
        total += n;
        if n < capacity {
            break;
        }
    }

    Ok(total)
}

/// [`write_vectored`](crate::write_vectored) over an unbounded vector.
///
/// Stops at the first short write or error after progress.
pub fn write_vectored(fd: &impl AsRawFd, bufs: &[IoSlice<'_>]) -> Result<usize> {
    if bufs.is_empty() {
        return ops::write_vectored(fd, bufs);
    }

    let max = limit::max_segments();
    let mut total = 0;

    for chunk in bufs.chunks(max) {
        let len: usize = chunk.iter().map(|b| b.len()).sum();
        let n = match ops::write_vectored(fd, chunk) {
            Ok(n) => n,
            Err(err) if total > 0 => {
                tracing::trace!(%err, total, "stopping after partial scatter write");
                break;
            }
            Err(err) => return Err(err),
        };
        total += n;
        if n < len {
            break;
        }
    }

    Ok(total)
}
