//! Runtime construction and bounded teardown for the server process.

use std::future::Future;
use std::time::Duration;

use tokio::runtime::{Builder, Runtime};

pub fn build_runtime() -> std::io::Result<Runtime> {
    Builder::new_multi_thread().enable_all().build()
}

/// Drive `main` to completion on `runtime`, then tear the runtime down
/// within `grace`.
///
/// Blocking-pool threads still stuck in file I/O at that point are abandoned
/// instead of joined, so a hung disk cannot keep the process alive after a
/// forced shutdown.
pub fn run_bounded<F>(runtime: Runtime, grace: Duration, main: F) -> F::Output
where
    F: Future,
{
    let output = runtime.block_on(main);
    runtime.shutdown_timeout(grace);
    output
}
