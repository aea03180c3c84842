//! Cooperative shutdown
//!
//! A `ShutdownHandle` flips a watch channel once; every `CancelSignal`
//! observes it. The scheduler races its inter-cycle sleep against
//! `CancelSignal::cancelled`, so a request wakes it immediately without
//! polling. A dropped handle counts as a shutdown request.

use std::sync::Arc;
use tokio::sync::watch;
use tracing::{error, info, warn};

/// Shutdown signal types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownSignal {
    /// SIGINT / Ctrl+C
    Interrupt,
    /// SIGTERM
    Terminate,
    /// Requested by the application itself
    Requested,
}

impl std::fmt::Display for ShutdownSignal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ShutdownSignal::Interrupt => write!(f, "interrupt"),
            ShutdownSignal::Terminate => write!(f, "terminate"),
            ShutdownSignal::Requested => write!(f, "requested"),
        }
    }
}

/// Create a connected handle/signal pair
pub fn shutdown_channel() -> (ShutdownHandle, CancelSignal) {
    let (tx, rx) = watch::channel(false);
    (ShutdownHandle { tx: Arc::new(tx) }, CancelSignal { rx })
}

/// Requests shutdown
#[derive(Debug, Clone)]
pub struct ShutdownHandle {
    tx: Arc<watch::Sender<bool>>,
}

impl ShutdownHandle {
    /// Request shutdown; duplicate requests are logged and ignored
    pub fn request_shutdown(&self, signal: ShutdownSignal) {
        if self.tx.send_replace(true) {
            warn!("Shutdown already requested, ignoring duplicate signal: {}", signal);
            return;
        }
        warn!("Shutdown requested ({}); stopping gracefully...", signal);
    }

    pub fn is_shutdown_requested(&self) -> bool {
        *self.tx.borrow()
    }

    /// New signal observing this handle
    pub fn subscribe(&self) -> CancelSignal {
        CancelSignal {
            rx: self.tx.subscribe(),
        }
    }
}

/// Observes a shutdown request
#[derive(Debug, Clone)]
pub struct CancelSignal {
    rx: watch::Receiver<bool>,
}

impl CancelSignal {
    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow() || self.rx.has_changed().is_err()
    }

    /// Resolve once shutdown is requested (or the handle is gone)
    pub async fn cancelled(&mut self) {
        let _ = self.rx.wait_for(|cancelled| *cancelled).await;
    }
}

/// Install OS signal handlers that request shutdown
pub fn install_signal_handlers(handle: ShutdownHandle) {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let on_term = handle.clone();
        tokio::spawn(async move {
            match signal(SignalKind::terminate()) {
                Ok(mut stream) => loop {
                    if stream.recv().await.is_none() {
                        break;
                    }
                    info!("Received SIGTERM");
                    on_term.request_shutdown(ShutdownSignal::Terminate);
                },
                Err(e) => error!("Failed to install SIGTERM handler: {}", e),
            }
        });
    }

    tokio::spawn(async move {
        loop {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!("Failed to install Ctrl+C handler: {}", e);
                break;
            }
            info!("Received Ctrl+C");
            handle.request_shutdown(ShutdownSignal::Interrupt);
        }
    });
}
