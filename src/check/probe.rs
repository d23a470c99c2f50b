// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Probe descriptors and the state they share during a run.

use crate::check::cleanup::{CleanupAction, CleanupTiming};
use crate::check::probes;
use crate::check::version::minimum_kubernetes_version;
use crate::error::{KotalError, Result};
use crate::kubernetes::{ClientSource, ClusterHandle};
use crate::types::ResourceKind;

/// One capability check, in the order it appears in a plan
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Probe {
    ClientConstruction,
    ApiReachability,
    MinimumVersion,
    NamespaceAbsence,
    NamespaceCreation,
    ClusterRoleCreation,
    ServiceAccountCreation,
    ClusterRoleBindingCreation,
    CustomResourceDefinitionCreation,
    ServiceCreation,
    DeploymentCreation,
    SecretCreation,
    MutatingWebhookCreation,
    ValidatingWebhookCreation,
    CertManagerPresence,
    IssuerCreation,
}

/// The standard check sequence
pub const STANDARD_PLAN: &[Probe] = &[
    Probe::ClientConstruction,
    Probe::ApiReachability,
    Probe::NamespaceAbsence,
    Probe::NamespaceCreation,
    Probe::ClusterRoleCreation,
    Probe::ServiceAccountCreation,
    Probe::ClusterRoleBindingCreation,
    Probe::CustomResourceDefinitionCreation,
    Probe::ServiceCreation,
    Probe::DeploymentCreation,
    Probe::SecretCreation,
    Probe::MutatingWebhookCreation,
    Probe::ValidatingWebhookCreation,
    Probe::CertManagerPresence,
    Probe::IssuerCreation,
];

/// The standard plan, with the version gate right after API reachability when requested
pub fn plan(verify_version: bool) -> Vec<Probe> {
    let mut plan = STANDARD_PLAN.to_vec();
    if verify_version {
        let at = plan
            .iter()
            .position(|p| *p == Probe::ApiReachability)
            .map_or(0, |i| i + 1);
        plan.insert(at, Probe::MinimumVersion);
    }
    plan
}

impl Probe {
    /// Human label printed next to the pass/fail mark
    pub fn label(&self) -> &'static str {
        match self {
            Probe::ClientConstruction => "can create Kubernetes client",
            Probe::ApiReachability => "can query Kubernetes API",
            Probe::MinimumVersion => "is running minimum Kubernetes version",
            Probe::NamespaceAbsence => "kotal namespace doesn't exist",
            Probe::NamespaceCreation => "can create Namespaces",
            Probe::ClusterRoleCreation => "can create ClusterRoles",
            Probe::ServiceAccountCreation => "can create ServiceAccounts",
            Probe::ClusterRoleBindingCreation => "can create ClusterRoleBindings",
            Probe::CustomResourceDefinitionCreation => "can create CustomResourceDefinitions",
            Probe::ServiceCreation => "can create Services",
            Probe::DeploymentCreation => "can create Deployments",
            Probe::SecretCreation => "can create Secrets",
            Probe::MutatingWebhookCreation => "can create MutatingWebhookConfiguration",
            Probe::ValidatingWebhookCreation => "can create ValidatingWebhookConfiguration",
            Probe::CertManagerPresence => "cert-manager is installed",
            Probe::IssuerCreation => "can create cert-manager Issuer",
        }
    }

    /// Execute the probe, returning the cleanup for anything it created
    pub async fn run(&self, ctx: &mut ProbeContext) -> Result<Option<CleanupAction>> {
        use CleanupTiming::*;

        match self {
            Probe::ClientConstruction => {
                ctx.handle = Some(ctx.source.connect().await?);
                Ok(None)
            }
            Probe::ApiReachability => {
                probes::can_query_kubernetes_api(ctx.handle()?.client()).await?;
                Ok(None)
            }
            Probe::MinimumVersion => {
                minimum_kubernetes_version(ctx.handle()?.discovery()).await?;
                Ok(None)
            }
            Probe::NamespaceAbsence => {
                probes::kotal_namespace_absent(ctx.handle()?.client()).await?;
                Ok(None)
            }
            Probe::NamespaceCreation => {
                let name = probes::can_create_namespace(ctx.handle()?.client()).await?;
                ctx.namespace = Some(name.clone());
                Ok(Some(CleanupAction::cluster_scoped(
                    ResourceKind::Namespace,
                    &name,
                    EndOfRun,
                )))
            }
            Probe::ClusterRoleCreation => {
                let name = probes::can_create_cluster_role(ctx.handle()?.client()).await?;
                ctx.cluster_role = Some(name.clone());
                Ok(Some(CleanupAction::cluster_scoped(
                    ResourceKind::ClusterRole,
                    &name,
                    EndOfRun,
                )))
            }
            Probe::ServiceAccountCreation => {
                let ns = ctx.namespace()?;
                let name = probes::can_create_service_account(ctx.handle()?.client(), &ns).await?;
                ctx.service_account = Some(name.clone());
                Ok(Some(CleanupAction::namespaced(
                    ResourceKind::ServiceAccount,
                    &name,
                    &ns,
                    EndOfRun,
                )))
            }
            Probe::ClusterRoleBindingCreation => {
                let ns = ctx.namespace()?;
                let role = ctx
                    .cluster_role
                    .clone()
                    .ok_or(KotalError::MissingPrerequisite("ClusterRole"))?;
                let account = ctx
                    .service_account
                    .clone()
                    .ok_or(KotalError::MissingPrerequisite("ServiceAccount"))?;
                let name = probes::can_create_cluster_role_binding(
                    ctx.handle()?.client(),
                    &role,
                    &account,
                    &ns,
                )
                .await?;
                Ok(Some(CleanupAction::cluster_scoped(
                    ResourceKind::ClusterRoleBinding,
                    &name,
                    AfterProbe,
                )))
            }
            Probe::CustomResourceDefinitionCreation => {
                let name =
                    probes::can_create_custom_resource_definition(ctx.handle()?.client()).await?;
                Ok(Some(CleanupAction::cluster_scoped(
                    ResourceKind::CustomResourceDefinition,
                    &name,
                    Detached,
                )))
            }
            Probe::ServiceCreation => {
                let ns = ctx.namespace()?;
                let name = probes::can_create_service(ctx.handle()?.client(), &ns).await?;
                Ok(Some(CleanupAction::namespaced(
                    ResourceKind::Service,
                    &name,
                    &ns,
                    EndOfRun,
                )))
            }
            Probe::DeploymentCreation => {
                let ns = ctx.namespace()?;
                let name = probes::can_create_deployment(ctx.handle()?.client(), &ns).await?;
                Ok(Some(CleanupAction::namespaced(
                    ResourceKind::Deployment,
                    &name,
                    &ns,
                    EndOfRun,
                )))
            }
            Probe::SecretCreation => {
                let ns = ctx.namespace()?;
                let name = probes::can_create_secret(ctx.handle()?.client(), &ns).await?;
                Ok(Some(CleanupAction::namespaced(
                    ResourceKind::Secret,
                    &name,
                    &ns,
                    EndOfRun,
                )))
            }
            Probe::MutatingWebhookCreation => {
                let name =
                    probes::can_create_mutating_webhook_configuration(ctx.handle()?.client())
                        .await?;
                Ok(Some(CleanupAction::cluster_scoped(
                    ResourceKind::MutatingWebhookConfiguration,
                    &name,
                    AfterProbe,
                )))
            }
            Probe::ValidatingWebhookCreation => {
                let name =
                    probes::can_create_validating_webhook_configuration(ctx.handle()?.client())
                        .await?;
                Ok(Some(CleanupAction::cluster_scoped(
                    ResourceKind::ValidatingWebhookConfiguration,
                    &name,
                    AfterProbe,
                )))
            }
            Probe::CertManagerPresence => {
                probes::cert_manager_installed(ctx.handle()?.client()).await?;
                Ok(None)
            }
            Probe::IssuerCreation => {
                let ns = ctx.namespace()?;
                let name =
                    probes::can_create_cert_manager_issuer(ctx.handle()?.client(), &ns).await?;
                Ok(Some(CleanupAction::namespaced(
                    ResourceKind::Issuer,
                    &name,
                    &ns,
                    EndOfRun,
                )))
            }
        }
    }
}

/// Identifiers produced by earlier probes and consumed by later ones
pub struct ProbeContext {
    source: ClientSource,
    handle: Option<ClusterHandle>,
    namespace: Option<String>,
    cluster_role: Option<String>,
    service_account: Option<String>,
}

impl ProbeContext {
    pub fn new(source: ClientSource) -> Self {
        Self {
            source,
            handle: None,
            namespace: None,
            cluster_role: None,
            service_account: None,
        }
    }

    pub fn cluster_handle(&self) -> Option<&ClusterHandle> {
        self.handle.as_ref()
    }

    fn handle(&self) -> Result<&ClusterHandle> {
        self.handle
            .as_ref()
            .ok_or(KotalError::MissingPrerequisite("Kubernetes client"))
    }

    /// The working namespace created by the namespace probe
    fn namespace(&self) -> Result<String> {
        self.namespace
            .clone()
            .ok_or(KotalError::MissingPrerequisite("working namespace"))
    }
}
