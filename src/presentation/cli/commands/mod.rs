pub mod checkout;
pub mod install;
pub mod resolve;

pub use checkout::CheckoutCommand;
pub use install::InstallCommand;
pub use resolve::ResolveCommand;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::warn;

/// Cancels a token on Ctrl-C for as long as it is alive
pub(crate) struct InterruptGuard {
    listener: JoinHandle<()>,
}

impl InterruptGuard {
    pub(crate) fn install(token: CancellationToken) -> Self {
        let listener = tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("Interrupted, cancelling checkout");
                token.cancel();
            }
        });
        Self { listener }
    }
}

impl Drop for InterruptGuard {
    fn drop(&mut self) {
        self.listener.abort();
    }
}
