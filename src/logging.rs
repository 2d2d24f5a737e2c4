// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

use std::sync::Once;
use tracing_log::LogTracer;
use tracing_subscriber::{fmt, layer::SubscriberExt, EnvFilter};

static INIT: Once = Once::new();

/// Installs the global subscriber. `RUST_LOG` overrides `default_filter`.
///
/// Safe to call more than once; only the first call has an effect. If the
/// host process already installed a subscriber, that one is kept.
pub fn init(default_filter: &str) {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(default_filter))
            .unwrap_or_else(|_| EnvFilter::new("info"));

        let subscriber = tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(true).with_thread_ids(true));

        if tracing::subscriber::set_global_default(subscriber).is_ok() {
            // log records from vendor-side crates
            let _ = LogTracer::init();
        }
    });
}
