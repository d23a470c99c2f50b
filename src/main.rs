// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use anyhow::Result;
use clap::Parser;
use std::process::ExitCode;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use kotal::check::run_check;
use kotal::cli::{Cli, Commands};
use kotal::config::Config;
use kotal::error::KotalError;
use kotal::install::{InstallOptions, Installer, ProcessRunner};

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // Diagnostics go to stderr so the report on stdout stays readable
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    debug!("Parsed arguments: {:?}", cli);
    let mut stdout = std::io::stdout();

    match cli.command {
        Commands::Check { verify_version } => {
            let config = Config::resolve(cli.kubeconfig, verify_version)?;
            info!("Checking cluster using {}", config.kubeconfig.display());

            let state = run_check(&config, &mut stdout).await?;
            Ok(if state.is_success() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
        Commands::Install { version, verbose } => {
            let options = InstallOptions {
                version,
                verbose,
                kubeconfig: cli.kubeconfig,
            };
            let installer = Installer::new(ProcessRunner, options);
            match installer.run(&mut stdout).await {
                Ok(()) => Ok(ExitCode::SUCCESS),
                // The installer already printed kubectl's stderr
                Err(KotalError::InstallError { step, .. }) => {
                    debug!("Install step {} failed", step);
                    Ok(ExitCode::FAILURE)
                }
                Err(e) => {
                    eprintln!("🥵 {}", e);
                    Ok(ExitCode::FAILURE)
                }
            }
        }
    }
}
