use crate::sys;
use lazy_static::lazy_static;

// POSIX guarantees that at least this many segments are accepted
// (`_XOPEN_IOV_MAX`), even when `sysconf` reports no determinate limit.
const MIN_SEGMENTS: usize = 16;

lazy_static! {
    static ref MAX_SEGMENTS: usize = {
        let max = sys::iov_max().unwrap_or(MIN_SEGMENTS);
        tracing::debug!(max_segments = max);
        max
    };
}

/// Return the maximum number of buffer segments accepted by a single
/// vectored I/O call on this platform.
///
/// The value reflects static platform metadata (`IOV_MAX`). It is queried
/// once on first use and memoized for the lifetime of the process.
pub fn max_segments() -> usize {
    *MAX_SEGMENTS
}
