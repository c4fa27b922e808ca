// /////////////////////////////////////////////////////////////////////////////
// Class Recording Processing Pipeline
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

//! OS signal handling, wired to a [`crate::shutdown::ShutdownCoordinator`].

use crate::shutdown::ShutdownCoordinator;

#[cfg(unix)]
pub async fn wait_for_shutdown_signal(coordinator: ShutdownCoordinator) {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigterm = signal(SignalKind::terminate()).expect("failed to register SIGTERM handler");
    let mut sighup = signal(SignalKind::hangup()).expect("failed to register SIGHUP handler");

    tokio::select! {
        _ = sigterm.recv() => tracing::info!("received SIGTERM"),
        _ = sighup.recv() => tracing::info!("received SIGHUP"),
        _ = tokio::signal::ctrl_c() => tracing::info!("received SIGINT"),
    }
    coordinator.initiate_shutdown();
}

#[cfg(not(unix))]
pub async fn wait_for_shutdown_signal(coordinator: ShutdownCoordinator) {
    let _ = tokio::signal::ctrl_c().await;
    tracing::info!("received Ctrl+C");
    coordinator.initiate_shutdown();
}
