use std::sync::Arc;
use tokio::sync::Notify;
use tracing::{error, info};

/// Spawn a task that turns the first termination signal into a shutdown
/// notification.
///
/// The notifier receives a single permit, so a waiter that starts listening
/// after the signal arrived still observes it.
pub fn run(notifier: Arc<Notify>) {
    tokio::spawn(handle_signals(notifier));
}

#[cfg(unix)]
async fn handle_signals(notifier: Arc<Notify>) {
    use tokio::signal::unix::{signal, SignalKind};

    let mut terminate = match signal(SignalKind::terminate()) {
        Ok(stream) => stream,
        Err(e) => {
            error!("install terminate handler: {}", e);
            return wait_ctrl_c(notifier).await;
        }
    };

    tokio::select! {
        result = tokio::signal::ctrl_c() => {
            if let Err(e) = result {
                error!("listen for interrupt: {}", e);
                return;
            }
            info!("received interrupt signal");
        },
        _ = terminate.recv() => {
            info!("received terminate signal");
        },
    }

    notifier.notify_one();
}

#[cfg(not(unix))]
async fn handle_signals(notifier: Arc<Notify>) {
    wait_ctrl_c(notifier).await
}

async fn wait_ctrl_c(notifier: Arc<Notify>) {
    match tokio::signal::ctrl_c().await {
        Ok(()) => {
            info!("received interrupt signal");
            notifier.notify_one();
        }
        Err(e) => error!("listen for interrupt: {}", e),
    }
}
