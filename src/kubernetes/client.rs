// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Cluster client creation from a kubeconfig file

use crate::error::{KotalError, Result};
use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::{Client, Config as KConfig};
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument};

/// API client plus the client used for version discovery.
///
/// Both are built from the same kubeconfig and are cheap to clone.
#[derive(Clone)]
pub struct ClusterHandle {
    client: Client,
    discovery: Client,
}

impl ClusterHandle {
    pub fn new(client: Client, discovery: Client) -> Self {
        Self { client, discovery }
    }

    /// Typed client for creating, reading and deleting resources
    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Client used to query the server version
    pub fn discovery(&self) -> &Client {
        &self.discovery
    }
}

/// Where the check sequence obtains its cluster handle
#[derive(Clone)]
pub enum ClientSource {
    Kubeconfig(PathBuf),
    Handle(ClusterHandle),
}

impl ClientSource {
    pub async fn connect(&self) -> Result<ClusterHandle> {
        match self {
            ClientSource::Kubeconfig(path) => create_cluster_handle(path).await,
            ClientSource::Handle(handle) => Ok(handle.clone()),
        }
    }
}

/// Build the API and discovery clients from the kubeconfig at `path`
#[instrument]
pub async fn create_cluster_handle(path: &Path) -> Result<ClusterHandle> {
    let config = load_client_config(path).await?;
    info!("Using cluster {}", config.cluster_url);

    let client = Client::try_from(config.clone()).map_err(|e| {
        KotalError::ClientConstructionError(format!("Failed to create API client: {}", e))
    })?;
    let discovery = Client::try_from(config).map_err(|e| {
        KotalError::ClientConstructionError(format!("Failed to create discovery client: {}", e))
    })?;

    Ok(ClusterHandle::new(client, discovery))
}

async fn load_client_config(path: &Path) -> Result<KConfig> {
    debug!("Reading kubeconfig from {}", path.display());

    let raw = tokio::fs::read_to_string(path).await.map_err(|e| {
        KotalError::ConfigError(format!("Failed to read {}: {}", path.display(), e))
    })?;

    let kubeconfig: Kubeconfig = serde_yaml::from_str(&raw)
        .map_err(|e| KotalError::ConfigError(format!("Failed to parse kubeconfig: {}", e)))?;

    KConfig::from_custom_kubeconfig(kubeconfig, &KubeConfigOptions::default())
        .await
        .map_err(|e| KotalError::ConfigError(format!("Failed to create config: {}", e)))
}
