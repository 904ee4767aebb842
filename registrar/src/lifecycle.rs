//! Registration scope.
//!
//! Registers on entry and deregisters on every way out of the serving
//! future: normal return, error, or panic.

use crate::manager::RegistrationManager;
use futures::FutureExt;
use std::future::Future;
use std::panic::{resume_unwind, AssertUnwindSafe};
use tracing::error;

/// Run `serve` between `manager.start()` and `manager.stop()`.
///
/// A panic inside `serve` is caught long enough to deregister, then resumed.
pub async fn run_registered<F, T>(manager: &RegistrationManager, serve: F) -> T
where
    F: Future<Output = T>,
{
    manager.start().await;

    let outcome = AssertUnwindSafe(serve).catch_unwind().await;

    manager.stop().await;

    match outcome {
        Ok(value) => value,
        Err(panic) => {
            error!("Server task panicked; services were deregistered");
            resume_unwind(panic)
        }
    }
}
