use std::io;
use tokio::runtime::Runtime;
use tracing::info;

/// Build the tokio runtime for a tool binary.
///
/// Without an explicit thread count the runtime is current-thread: every
/// handler of the tool runs to completion on one thread. A thread count
/// switches to the multi-thread scheduler with that many workers.
pub fn build(threads: Option<usize>) -> io::Result<Runtime> {
    let Some(threads) = threads else {
        return tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build();
    };

    info!("custom runtime threads: {}", threads);
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .worker_threads(threads.max(1))
        .build()
}
