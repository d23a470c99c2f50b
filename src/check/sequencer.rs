// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Runs a probe plan in order and stops at the first failure.

use crate::check::cleanup::{CleanupAction, CleanupHandle, CleanupStack, CleanupTiming};
use crate::check::probe::{Probe, ProbeContext};
use crate::error::{KotalError, Result};
use crate::kubernetes::ClientSource;
use std::io::Write;
use tracing::{debug, info, instrument};

pub const PASS_MARK: &str = "✔";
pub const FAIL_MARK: &str = "✘";

/// Progress of a sequencer run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequenceState {
    NotStarted,
    Running(usize),
    Passed,
    FailedAt(usize),
}

impl SequenceState {
    pub fn is_success(&self) -> bool {
        matches!(self, SequenceState::Passed)
    }
}

/// Outcome of a single probe, printed and then dropped
#[derive(Debug)]
pub struct ProbeResult {
    pub name: &'static str,
    pub passed: bool,
    pub error: Option<KotalError>,
}

impl ProbeResult {
    pub fn render(&self) -> String {
        match &self.error {
            None => format!("{} {}", PASS_MARK, self.name),
            Some(e) => format!("{} {}: {}", FAIL_MARK, self.name, e),
        }
    }
}

pub struct Sequencer {
    plan: Vec<Probe>,
    ctx: ProbeContext,
    cleanups: CleanupStack,
    background: CleanupHandle,
    state: SequenceState,
}

impl Sequencer {
    pub fn new(plan: Vec<Probe>, source: ClientSource, background: CleanupHandle) -> Self {
        Self {
            plan,
            ctx: ProbeContext::new(source),
            cleanups: CleanupStack::new(),
            background,
            state: SequenceState::NotStarted,
        }
    }

    /// Run every probe, writing one line per probe to `out`.
    ///
    /// Cleanups registered for end of run are drained before returning, also
    /// when a probe fails or writing the report fails.
    #[instrument(skip_all, fields(probes = self.plan.len()))]
    pub async fn run<W: Write>(mut self, out: &mut W) -> Result<SequenceState> {
        let outcome = self.run_probes(out).await;

        if let Some(handle) = self.ctx.cluster_handle() {
            debug!("Draining {} pending cleanups", self.cleanups.len());
            self.cleanups.drain(handle.client()).await;
        }

        outcome.map(|_| self.state)
    }

    async fn run_probes<W: Write>(&mut self, out: &mut W) -> Result<()> {
        for (i, probe) in self.plan.clone().into_iter().enumerate() {
            self.transition(SequenceState::Running(i));
            debug!("Running probe {}: {}", i, probe.label());

            let result = match probe.run(&mut self.ctx).await {
                Ok(cleanup) => {
                    if let Some(action) = cleanup {
                        self.dispatch(action).await;
                    }
                    ProbeResult {
                        name: probe.label(),
                        passed: true,
                        error: None,
                    }
                }
                Err(e) => ProbeResult {
                    name: probe.label(),
                    passed: false,
                    error: Some(e),
                },
            };

            writeln!(out, "{}", result.render())?;

            if !result.passed {
                info!("Probe '{}' failed, stopping", probe.label());
                self.transition(SequenceState::FailedAt(i));
                return Ok(());
            }
        }

        info!("All {} probes passed", self.plan.len());
        self.transition(SequenceState::Passed);
        Ok(())
    }

    fn transition(&mut self, next: SequenceState) {
        debug!("Sequence {:?} -> {:?}", self.state, next);
        self.state = next;
    }

    async fn dispatch(&mut self, action: CleanupAction) {
        let Some(handle) = self.ctx.cluster_handle() else {
            return;
        };

        match action.timing {
            CleanupTiming::AfterProbe => action.execute(handle.client()).await,
            CleanupTiming::EndOfRun => self.cleanups.push(action),
            CleanupTiming::Detached => self.background.enqueue(handle.client().clone(), action),
        }
    }
}
