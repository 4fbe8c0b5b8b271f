//! Copy stdin to stdout through a bank of fixed-size segment buffers,
//! gather-reading and scatter-writing with one syscall per batch.

use anyhow::{ensure, Context as _, Result};
use std::io::{IoSlice, IoSliceMut};

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let mut args = pico_args::Arguments::from_env();
    let segments: usize = args.opt_value_from_str("--segments")?.unwrap_or(4);
    let segment_size: usize = args.opt_value_from_str("--segment-size")?.unwrap_or(8192);

    ensure!(segments > 0, "--segments must be positive");
    ensure!(segment_size > 0, "--segment-size must be positive");
    ensure!(
        segments <= vio::max_segments(),
        "--segments exceeds the platform limit of {}",
        vio::max_segments()
    );

    let stdin = std::io::stdin();
    let stdout = std::io::stdout();

    let mut storage = vec![0u8; segments * segment_size];

    loop {
        let mut bufs: Vec<IoSliceMut<'_>> = storage
            .chunks_mut(segment_size)
            .map(IoSliceMut::new)
            .collect();
        let n = vio::read_vectored(&stdin, &mut bufs).context("gather read from stdin")?;
        if n == 0 {
            break;
        }
        tracing::debug!(bytes = n, segments, "gathered");

        let mut written = 0;
        while written < n {
            let bufs: Vec<IoSlice<'_>> = storage[written..n]
                .chunks(segment_size)
                .map(IoSlice::new)
                .collect();
            written += vio::write_vectored(&stdout, &bufs).context("scatter write to stdout")?;
        }
    }

    Ok(())
}
