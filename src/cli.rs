// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Command-line argument parsing

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Install Kotal and check its dependencies on your Kubernetes cluster
#[derive(Parser, Debug)]
#[command(name = "kotal", version, long_about = None)]
pub struct Cli {
    /// Path to the kubeconfig file (defaults to ~/.kube/config)
    #[arg(long, global = true)]
    pub kubeconfig: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Checks the underlying cluster is suitable for installing Kotal components
    Check {
        /// Also require the minimum supported Kubernetes version
        #[arg(long)]
        verify_version: bool,
    },

    /// Install kotal operator
    Install {
        /// Kotal version
        #[arg(long)]
        version: Option<String>,

        /// Verbose output
        #[arg(long)]
        verbose: bool,
    },
}
