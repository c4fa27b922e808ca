// /////////////////////////////////////////////////////////////////////////////
// Class Recording Processing Pipeline
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

//! Structured logging setup. Uses `tracing` for instrumentation throughout
//! the application/infrastructure layers and `tracing-subscriber` to render
//! it, honoring `RUST_LOG` for per-module level overrides.

use tracing_subscriber::{fmt, EnvFilter};

/// Installs the global tracing subscriber. Call once, at process startup.
pub fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let subscriber = fmt().with_env_filter(filter).with_target(true);
    if json {
        subscriber.json().init();
    } else {
        subscriber.init();
    }
}
