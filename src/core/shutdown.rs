//! # Termination signal wait.
//!
//! [`wait_for_shutdown_signal`] completes when the process is asked to stop and
//! reports which signal did it, so the hub can log it before draining.
//!
//! **Unix:** `SIGINT`, `SIGTERM`, `SIGQUIT` and Ctrl-C.
//! **Elsewhere:** Ctrl-C only.

use std::fmt;

/// Signal that ended [`wait_for_shutdown_signal`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownSignal {
    CtrlC,
    Interrupt,
    Terminate,
    Quit,
}

impl fmt::Display for ShutdownSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ShutdownSignal::CtrlC => "ctrl-c",
            ShutdownSignal::Interrupt => "SIGINT",
            ShutdownSignal::Terminate => "SIGTERM",
            ShutdownSignal::Quit => "SIGQUIT",
        })
    }
}

/// Waits for a termination signal. Fails only if a handler cannot be installed.
#[cfg(unix)]
pub async fn wait_for_shutdown_signal() -> std::io::Result<ShutdownSignal> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigquit = signal(SignalKind::quit())?;

    let which = tokio::select! {
        res = tokio::signal::ctrl_c() => { res?; ShutdownSignal::CtrlC }
        _ = sigint.recv()  => ShutdownSignal::Interrupt,
        _ = sigterm.recv() => ShutdownSignal::Terminate,
        _ = sigquit.recv() => ShutdownSignal::Quit,
    };
    Ok(which)
}

/// Waits for a termination signal. Fails only if a handler cannot be installed.
#[cfg(not(unix))]
pub async fn wait_for_shutdown_signal() -> std::io::Result<ShutdownSignal> {
    tokio::signal::ctrl_c().await?;
    Ok(ShutdownSignal::CtrlC)
}
