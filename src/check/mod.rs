// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Cluster compliance checks run before installing Kotal.

pub mod cleanup;
pub mod probe;
pub mod probes;
pub mod sequencer;
pub mod version;

pub use cleanup::{CleanupAction, CleanupHandle, CleanupStack, CleanupTiming, CleanupWorker};
pub use probe::{plan, Probe, ProbeContext, STANDARD_PLAN};
pub use sequencer::{ProbeResult, SequenceState, Sequencer};

use crate::config::Config;
use crate::constants::cleanup::EXIT_GRACE_SECS;
use crate::error::Result;
use crate::kubernetes::ClientSource;
use std::io::Write;
use std::time::Duration;
use tracing::{info, warn};

/// Run the `check` command against the cluster described by `config`
pub async fn run_check<W: Write>(config: &Config, out: &mut W) -> Result<SequenceState> {
    writeln!(out, "Check underlying cluster compliance")?;
    writeln!(out)?;

    let (worker, background) = CleanupWorker::spawn();
    let sequencer = Sequencer::new(
        plan(config.verify_version),
        ClientSource::Kubeconfig(config.kubeconfig.clone()),
        background,
    );
    let state = sequencer.run(out).await;

    // The sequencer dropped its handle, so the worker stops once its queue is empty
    match tokio::time::timeout(Duration::from_secs(EXIT_GRACE_SECS), worker).await {
        Ok(_) => info!("Background cleanups finished"),
        Err(_) => warn!(
            "Background cleanups still running after {} seconds, exiting anyway",
            EXIT_GRACE_SECS
        ),
    }

    state
}
