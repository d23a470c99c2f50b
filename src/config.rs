// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use crate::error::{KotalError, Result};
use std::path::PathBuf;

/// CLI configuration resolved from flags and the user's environment
#[derive(Debug, Clone)]
pub struct Config {
    /// Kubeconfig used to reach the cluster
    pub kubeconfig: PathBuf,
    /// Include the minimum Kubernetes version probe in `check`
    pub verify_version: bool,
}

impl Config {
    /// Resolve the configuration, defaulting the kubeconfig to `~/.kube/config`
    pub fn resolve(kubeconfig: Option<PathBuf>, verify_version: bool) -> Result<Self> {
        let kubeconfig = match kubeconfig {
            Some(path) => path,
            None => default_kubeconfig_path()?,
        };

        Ok(Config {
            kubeconfig,
            verify_version,
        })
    }
}

/// `$HOME/.kube/config`
pub fn default_kubeconfig_path() -> Result<PathBuf> {
    dirs::home_dir()
        .map(|home| home.join(".kube").join("config"))
        .ok_or_else(|| KotalError::ConfigError("could not determine home directory".to_string()))
}
