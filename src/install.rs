// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Operator installation through kubectl.

use crate::constants::{install, KOTAL_NAMESPACE};
use crate::error::{KotalError, Result};
use std::future::Future;
use std::io::Write;
use std::path::PathBuf;
use tracing::{debug, info, instrument};
use url::Url;

/// Captured result of an external command
#[derive(Debug, Clone, Default)]
pub struct CommandOutput {
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
}

/// Runs external programs for the installer
pub trait CommandRunner {
    fn run(&self, program: &str, args: &[String]) -> impl Future<Output = Result<CommandOutput>>;
}

/// Spawns real processes
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessRunner;

impl CommandRunner for ProcessRunner {
    async fn run(&self, program: &str, args: &[String]) -> Result<CommandOutput> {
        debug!("Running {} {}", program, args.join(" "));
        let output = tokio::process::Command::new(program)
            .args(args)
            .output()
            .await
            .map_err(|source| KotalError::CommandError {
                program: program.to_string(),
                source,
            })?;

        Ok(CommandOutput {
            success: output.status.success(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct InstallOptions {
    /// Release to install, the pinned default when unset
    pub version: Option<String>,
    pub verbose: bool,
    /// Passed to kubectl as `--kubeconfig` when set
    pub kubeconfig: Option<PathBuf>,
}

impl InstallOptions {
    pub fn version(&self) -> &str {
        self.version
            .as_deref()
            .filter(|v| !v.is_empty())
            .unwrap_or(install::DEFAULT_VERSION)
    }
}

/// Release manifest URL; the version is escaped as a single path segment
pub fn manifest_url(version: &str) -> Result<Url> {
    let mut url = Url::parse(install::RELEASES_URL)
        .map_err(|_| KotalError::InvalidVersion(version.to_string()))?;
    url.path_segments_mut()
        .map_err(|_| KotalError::InvalidVersion(version.to_string()))?
        .push(&format!("v{}", version))
        .push(install::MANIFEST_FILE);
    Ok(url)
}

pub struct Installer<R> {
    runner: R,
    options: InstallOptions,
}

impl<R: CommandRunner> Installer<R> {
    pub fn new(runner: R, options: InstallOptions) -> Self {
        Self { runner, options }
    }

    /// Apply the operator manifest, then wait for the controller to become available
    #[instrument(skip_all, fields(version = %self.options.version()))]
    pub async fn run<W: Write>(&self, out: &mut W) -> Result<()> {
        writeln!(out, "🚀 Installing Kotal operator")?;

        let url = manifest_url(self.options.version())?;
        info!("Applying {}", url);
        let apply = vec!["apply".to_string(), "-f".to_string(), url.to_string()];
        self.step("apply", &apply, out).await?;

        writeln!(out, "👍 Kotal operator has been installed")?;
        writeln!(out, "⏰ Waiting for the operator to start successfully")?;

        let wait = vec![
            "wait".to_string(),
            "-n".to_string(),
            KOTAL_NAMESPACE.to_string(),
            "--for=condition=available".to_string(),
            install::CONTROLLER_DEPLOYMENT.to_string(),
            format!("--timeout={}", install::WAIT_TIMEOUT),
        ];
        self.step("wait", &wait, out).await?;

        writeln!(out, "🙌 Operator is up and running")?;
        Ok(())
    }

    async fn step<W: Write>(&self, step: &'static str, args: &[String], out: &mut W) -> Result<()> {
        let mut args = args.to_vec();
        if let Some(path) = &self.options.kubeconfig {
            args.push(format!("--kubeconfig={}", path.display()));
        }
        let output = self.runner.run(install::KUBECTL, &args).await?;

        if !output.success {
            writeln!(out, "🥵 {}", output.stderr)?;
            return Err(KotalError::InstallError {
                step,
                stderr: output.stderr,
            });
        }

        if self.options.verbose {
            writeln!(out, "{}", output.stdout)?;
        }
        Ok(())
    }
}
