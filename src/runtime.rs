//! Running async block operations from synchronous code.

use std::future::Future;
use tokio::runtime::{Builder, Handle, RuntimeFlavor};

use crate::error::BlockError;

/// Drive `future` to completion from a synchronous caller.
///
/// - inside a multi-thread runtime the current worker is handed over with
///   `block_in_place`;
/// - inside a current-thread runtime the future runs on a scoped helper
///   thread with its own runtime, since that runtime cannot be re-entered;
/// - outside any runtime a current-thread runtime is built for the call.
pub fn block_on<F, T>(future: F) -> Result<T, BlockError>
where
    F: Future<Output = Result<T, BlockError>> + Send,
    T: Send,
{
    match Handle::try_current() {
        Ok(handle) if handle.runtime_flavor() == RuntimeFlavor::MultiThread => {
            tokio::task::block_in_place(|| handle.block_on(future))
        }
        Ok(_) => std::thread::scope(|scope| {
            let worker = scope.spawn(|| run_on_fresh_runtime(future));
            match worker.join() {
                Ok(result) => result,
                Err(panic) => std::panic::resume_unwind(panic),
            }
        }),
        Err(_) => run_on_fresh_runtime(future),
    }
}

fn run_on_fresh_runtime<F, T>(future: F) -> Result<T, BlockError>
where
    F: Future<Output = Result<T, BlockError>>,
{
    let runtime = Builder::new_current_thread().enable_all().build()?;
    runtime.block_on(future)
}
