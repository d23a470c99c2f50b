// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Best-effort deletion of the objects created by the probes.
//!
//! Deletions never fail the run: lookups that return 404 mean the object is
//! already gone, and delete errors are only logged.

use crate::error::{is_not_found, KotalError};
use crate::types::certmanager::Issuer;
use crate::types::ResourceKind;
use k8s_openapi::api::admissionregistration::v1::{
    MutatingWebhookConfiguration, ValidatingWebhookConfiguration,
};
use k8s_openapi::api::apps::v1::Deployment;
use k8s_openapi::api::core::v1::{Namespace, Secret, Service, ServiceAccount};
use k8s_openapi::api::rbac::v1::{ClusterRole, ClusterRoleBinding};
use k8s_openapi::apiextensions_apiserver::pkg::apis::apiextensions::v1::CustomResourceDefinition;
use kube::{api::DeleteParams, Api, Client, Resource};
use serde::de::DeserializeOwned;
use std::fmt::Debug;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, instrument, warn};

/// When a registered cleanup runs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CleanupTiming {
    /// Right after the probe that created the object
    AfterProbe,
    /// When the sequence ends, in reverse registration order
    EndOfRun,
    /// Handed to the background worker and never awaited
    Detached,
}

/// A deferred delete for one object created by a probe
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanupAction {
    pub kind: ResourceKind,
    pub name: String,
    pub namespace: Option<String>,
    pub timing: CleanupTiming,
}

impl CleanupAction {
    pub fn cluster_scoped(kind: ResourceKind, name: &str, timing: CleanupTiming) -> Self {
        Self {
            kind,
            name: name.to_string(),
            namespace: None,
            timing,
        }
    }

    pub fn namespaced(
        kind: ResourceKind,
        name: &str,
        namespace: &str,
        timing: CleanupTiming,
    ) -> Self {
        Self {
            kind,
            name: name.to_string(),
            namespace: Some(namespace.to_string()),
            timing,
        }
    }

    /// Look the object up and delete it, swallowing every failure
    #[instrument(skip(self, client), fields(kind = %self.kind, name = %self.name))]
    pub async fn execute(&self, client: &Client) {
        let client = client.clone();
        match (self.kind, self.namespace.as_deref()) {
            (ResourceKind::Namespace, _) => self.remove(Api::<Namespace>::all(client)).await,
            (ResourceKind::ClusterRole, _) => self.remove(Api::<ClusterRole>::all(client)).await,
            (ResourceKind::ClusterRoleBinding, _) => {
                self.remove(Api::<ClusterRoleBinding>::all(client)).await
            }
            (ResourceKind::CustomResourceDefinition, _) => {
                self.remove(Api::<CustomResourceDefinition>::all(client))
                    .await
            }
            (ResourceKind::MutatingWebhookConfiguration, _) => {
                self.remove(Api::<MutatingWebhookConfiguration>::all(client))
                    .await
            }
            (ResourceKind::ValidatingWebhookConfiguration, _) => {
                self.remove(Api::<ValidatingWebhookConfiguration>::all(client))
                    .await
            }
            (ResourceKind::ServiceAccount, Some(ns)) => {
                self.remove(Api::<ServiceAccount>::namespaced(client, ns))
                    .await
            }
            (ResourceKind::Service, Some(ns)) => {
                self.remove(Api::<Service>::namespaced(client, ns)).await
            }
            (ResourceKind::Deployment, Some(ns)) => {
                self.remove(Api::<Deployment>::namespaced(client, ns)).await
            }
            (ResourceKind::Secret, Some(ns)) => {
                self.remove(Api::<Secret>::namespaced(client, ns)).await
            }
            (ResourceKind::Issuer, Some(ns)) => {
                self.remove(Api::<Issuer>::namespaced(client, ns)).await
            }
            (kind, None) => warn!("{} {} has no namespace, not deleting", kind, self.name),
        }
    }

    async fn remove<K>(&self, api: Api<K>)
    where
        K: Resource + Clone + DeserializeOwned + Debug,
    {
        match api.get(&self.name).await {
            Ok(_) => {}
            Err(e) if is_not_found(&e) => {
                debug!("{} {} already gone", self.kind, self.name);
                return;
            }
            Err(e) => debug!(
                "Lookup of {} {} failed, deleting anyway: {}",
                self.kind, self.name, e
            ),
        }

        match api.delete(&self.name, &DeleteParams::default()).await {
            Ok(_) => debug!("Deleted {} {}", self.kind, self.name),
            Err(source) => debug!(
                "{}",
                KotalError::DeleteError {
                    kind: self.kind,
                    name: self.name.clone(),
                    source,
                }
            ),
        }
    }
}

/// Cleanups waiting for the end of the run
#[derive(Debug, Default)]
pub struct CleanupStack {
    pending: Vec<CleanupAction>,
}

impl CleanupStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, action: CleanupAction) {
        debug!("Registered cleanup of {} {}", action.kind, action.name);
        self.pending.push(action);
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Run every pending cleanup, most recently registered first
    pub async fn drain(&mut self, client: &Client) {
        while let Some(action) = self.pending.pop() {
            action.execute(client).await;
        }
    }
}

/// Background task executing detached cleanups.
///
/// Callers enqueue through a [`CleanupHandle`] and never observe the outcome.
pub struct CleanupWorker {
    rx: mpsc::UnboundedReceiver<(Client, CleanupAction)>,
}

/// Sending side of the cleanup worker; enqueueing never blocks
#[derive(Clone)]
pub struct CleanupHandle {
    tx: mpsc::UnboundedSender<(Client, CleanupAction)>,
}

impl CleanupHandle {
    pub fn enqueue(&self, client: Client, action: CleanupAction) {
        if let Err(e) = self.tx.send((client, action)) {
            warn!("Cleanup worker is gone, dropping cleanup: {}", e);
        }
    }
}

impl CleanupWorker {
    pub fn new() -> (Self, CleanupHandle) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { rx }, CleanupHandle { tx })
    }

    /// Spawn the worker; it exits once every handle is dropped and the queue is empty
    pub fn spawn() -> (JoinHandle<()>, CleanupHandle) {
        let (worker, handle) = Self::new();
        (tokio::spawn(worker.run()), handle)
    }

    pub async fn run(mut self) {
        while let Some((client, action)) = self.rx.recv().await {
            action.execute(&client).await;
        }
        debug!("Cleanup worker finished");
    }
}
