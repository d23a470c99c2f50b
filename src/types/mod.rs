// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Resource types touched by the compliance checks.

pub mod certmanager;
pub mod check;

use std::fmt;

/// The kinds of objects a check may create and later clean up
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Namespace,
    ClusterRole,
    ServiceAccount,
    ClusterRoleBinding,
    CustomResourceDefinition,
    Service,
    Deployment,
    Secret,
    MutatingWebhookConfiguration,
    ValidatingWebhookConfiguration,
    Issuer,
}

impl ResourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Namespace => "Namespace",
            ResourceKind::ClusterRole => "ClusterRole",
            ResourceKind::ServiceAccount => "ServiceAccount",
            ResourceKind::ClusterRoleBinding => "ClusterRoleBinding",
            ResourceKind::CustomResourceDefinition => "CustomResourceDefinition",
            ResourceKind::Service => "Service",
            ResourceKind::Deployment => "Deployment",
            ResourceKind::Secret => "Secret",
            ResourceKind::MutatingWebhookConfiguration => "MutatingWebhookConfiguration",
            ResourceKind::ValidatingWebhookConfiguration => "ValidatingWebhookConfiguration",
            ResourceKind::Issuer => "Issuer",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
