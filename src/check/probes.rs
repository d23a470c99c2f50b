// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! The cluster operations behind each capability probe.
//!
//! Creating probes return the name of the object they created so the caller
//! can register its cleanup.

use crate::constants::{probe, KOTAL_NAMESPACE};
use crate::error::{is_not_found, KotalError, Result};
use crate::types::certmanager::{Certificate, Issuer};
use crate::types::check::check_crd;
use crate::types::ResourceKind;
use k8s_openapi::api::admissionregistration::v1::{
    MutatingWebhookConfiguration, ValidatingWebhookConfiguration,
};
use k8s_openapi::api::apps::v1::{Deployment, DeploymentSpec};
use k8s_openapi::api::core::v1::{
    Container, Namespace, Pod, PodSpec, PodTemplateSpec, Secret, Service, ServiceAccount,
    ServicePort, ServiceSpec,
};
use k8s_openapi::api::rbac::v1::{ClusterRole, ClusterRoleBinding, RoleRef, Subject};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::LabelSelector;
use k8s_openapi::apimachinery::pkg::util::intstr::IntOrString;
use kube::{
    api::{ListParams, ObjectMeta, PostParams},
    Api, Client, Resource, ResourceExt,
};
use serde::{de::DeserializeOwned, Serialize};
use std::collections::BTreeMap;
use std::fmt::Debug;
use tracing::{debug, info, instrument};
use uuid::Uuid;

fn fresh_name() -> String {
    Uuid::new_v4().to_string()
}

fn meta(name: &str, namespace: Option<&str>) -> ObjectMeta {
    ObjectMeta {
        name: Some(name.to_string()),
        namespace: namespace.map(str::to_string),
        ..Default::default()
    }
}

async fn create<K>(api: Api<K>, kind: ResourceKind, obj: &K) -> Result<String>
where
    K: Resource + Clone + Serialize + DeserializeOwned + Debug,
{
    let created = api
        .create(&PostParams::default(), obj)
        .await
        .map_err(|source| KotalError::CreateError { kind, source })?;
    info!("Created {} {}", kind, created.name_any());
    Ok(created.name_any())
}

/// List pods cluster-wide
#[instrument(skip(client))]
pub async fn can_query_kubernetes_api(client: &Client) -> Result<()> {
    let pods: Api<Pod> = Api::all(client.clone());
    pods.list(&ListParams::default().limit(1))
        .await
        .map_err(|source| KotalError::UnreachableError {
            api: "Kubernetes API",
            source,
        })?;
    Ok(())
}

/// Succeeds only when the Kotal namespace is confirmed absent
pub async fn kotal_namespace_absent(client: &Client) -> Result<()> {
    namespace_absent(client, KOTAL_NAMESPACE).await
}

#[instrument(skip(client))]
pub async fn namespace_absent(client: &Client, name: &str) -> Result<()> {
    let namespaces: Api<Namespace> = Api::all(client.clone());

    match namespaces.get(name).await {
        Err(e) if is_not_found(&e) => {
            debug!("Namespace {} not found", name);
            Ok(())
        }
        Err(e) => Err(KotalError::LookupError {
            name: name.to_string(),
            reason: e.to_string(),
        }),
        Ok(ns) if ns.metadata.creation_timestamp.is_some() => {
            Err(KotalError::AlreadyExistsError(name.to_string()))
        }
        Ok(_) => Err(KotalError::LookupError {
            name: name.to_string(),
            reason: "namespace returned without a creation timestamp".to_string(),
        }),
    }
}

#[instrument(skip(client))]
pub async fn can_create_namespace(client: &Client) -> Result<String> {
    let ns = Namespace {
        metadata: meta(&fresh_name(), None),
        ..Default::default()
    };
    create(Api::all(client.clone()), ResourceKind::Namespace, &ns).await
}

#[instrument(skip(client))]
pub async fn can_create_cluster_role(client: &Client) -> Result<String> {
    let role = ClusterRole {
        metadata: meta(&fresh_name(), None),
        ..Default::default()
    };
    create(Api::all(client.clone()), ResourceKind::ClusterRole, &role).await
}

#[instrument(skip(client))]
pub async fn can_create_service_account(client: &Client, namespace: &str) -> Result<String> {
    let sa = ServiceAccount {
        metadata: meta(&fresh_name(), Some(namespace)),
        ..Default::default()
    };
    create(
        Api::namespaced(client.clone(), namespace),
        ResourceKind::ServiceAccount,
        &sa,
    )
    .await
}

/// Bind `role` to the service account `account` living in `namespace`
#[instrument(skip(client))]
pub async fn can_create_cluster_role_binding(
    client: &Client,
    role: &str,
    account: &str,
    namespace: &str,
) -> Result<String> {
    let binding = ClusterRoleBinding {
        metadata: meta(&fresh_name(), None),
        role_ref: RoleRef {
            api_group: "rbac.authorization.k8s.io".to_string(),
            kind: "ClusterRole".to_string(),
            name: role.to_string(),
        },
        subjects: Some(vec![Subject {
            kind: "ServiceAccount".to_string(),
            name: account.to_string(),
            namespace: Some(namespace.to_string()),
            ..Default::default()
        }]),
    };
    create(
        Api::all(client.clone()),
        ResourceKind::ClusterRoleBinding,
        &binding,
    )
    .await
}

#[instrument(skip(client))]
pub async fn can_create_custom_resource_definition(client: &Client) -> Result<String> {
    create(
        Api::all(client.clone()),
        ResourceKind::CustomResourceDefinition,
        &check_crd(),
    )
    .await
}

#[instrument(skip(client))]
pub async fn can_create_service(client: &Client, namespace: &str) -> Result<String> {
    let svc = Service {
        metadata: meta(probe::SERVICE_NAME, Some(namespace)),
        spec: Some(ServiceSpec {
            ports: Some(vec![ServicePort {
                name: Some(probe::SERVICE_NAME.to_string()),
                protocol: Some("TCP".to_string()),
                port: probe::SERVICE_PORT,
                target_port: Some(IntOrString::Int(probe::SERVICE_PORT)),
                ..Default::default()
            }]),
            ..Default::default()
        }),
        ..Default::default()
    };
    create(
        Api::namespaced(client.clone(), namespace),
        ResourceKind::Service,
        &svc,
    )
    .await
}

#[instrument(skip(client))]
pub async fn can_create_deployment(client: &Client, namespace: &str) -> Result<String> {
    let labels = BTreeMap::from([("app".to_string(), probe::DEPLOYMENT_APP_LABEL.to_string())]);
    let deployment = Deployment {
        metadata: meta(&fresh_name(), Some(namespace)),
        spec: Some(DeploymentSpec {
            selector: LabelSelector {
                match_labels: Some(labels.clone()),
                ..Default::default()
            },
            template: PodTemplateSpec {
                metadata: Some(ObjectMeta {
                    labels: Some(labels),
                    ..Default::default()
                }),
                spec: Some(PodSpec {
                    containers: vec![Container {
                        name: probe::DEPLOYMENT_APP_LABEL.to_string(),
                        image: Some(probe::DEPLOYMENT_IMAGE.to_string()),
                        ..Default::default()
                    }],
                    ..Default::default()
                }),
            },
            ..Default::default()
        }),
        ..Default::default()
    };
    create(
        Api::namespaced(client.clone(), namespace),
        ResourceKind::Deployment,
        &deployment,
    )
    .await
}

#[instrument(skip(client))]
pub async fn can_create_secret(client: &Client, namespace: &str) -> Result<String> {
    let secret = Secret {
        metadata: meta(&fresh_name(), Some(namespace)),
        string_data: Some(BTreeMap::from([(
            probe::SECRET_KEY.to_string(),
            probe::SECRET_VALUE.to_string(),
        )])),
        ..Default::default()
    };
    create(
        Api::namespaced(client.clone(), namespace),
        ResourceKind::Secret,
        &secret,
    )
    .await
}

#[instrument(skip(client))]
pub async fn can_create_mutating_webhook_configuration(client: &Client) -> Result<String> {
    let hook = MutatingWebhookConfiguration {
        metadata: meta(&fresh_name(), None),
        webhooks: Some(vec![]),
    };
    create(
        Api::all(client.clone()),
        ResourceKind::MutatingWebhookConfiguration,
        &hook,
    )
    .await
}

#[instrument(skip(client))]
pub async fn can_create_validating_webhook_configuration(client: &Client) -> Result<String> {
    let hook = ValidatingWebhookConfiguration {
        metadata: meta(&fresh_name(), None),
        webhooks: Some(vec![]),
    };
    create(
        Api::all(client.clone()),
        ResourceKind::ValidatingWebhookConfiguration,
        &hook,
    )
    .await
}

/// List cert-manager certificates cluster-wide
#[instrument(skip(client))]
pub async fn cert_manager_installed(client: &Client) -> Result<()> {
    let certs: Api<Certificate> = Api::all(client.clone());
    certs
        .list(&ListParams::default().limit(1))
        .await
        .map_err(|source| KotalError::UnreachableError {
            api: "cert-manager API",
            source,
        })?;
    Ok(())
}

#[instrument(skip(client))]
pub async fn can_create_cert_manager_issuer(client: &Client, namespace: &str) -> Result<String> {
    let issuer = Issuer::self_signed(probe::ISSUER_NAME, namespace);
    create(
        Api::namespaced(client.clone(), namespace),
        ResourceKind::Issuer,
        &issuer,
    )
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{namespace_json, FakeApiServer};

    #[tokio::test]
    async fn test_namespace_absent_when_not_found() {
        let server = FakeApiServer::new();

        assert!(kotal_namespace_absent(&server.client()).await.is_ok());
    }

    #[tokio::test]
    async fn test_namespace_present_with_timestamp() {
        let server = FakeApiServer::new().on_get(
            "/api/v1/namespaces/kotal",
            200,
            &namespace_json("kotal", Some("2024-05-01T10:00:00Z")),
        );

        assert!(matches!(
            kotal_namespace_absent(&server.client()).await,
            Err(KotalError::AlreadyExistsError(name)) if name == "kotal"
        ));
    }

    #[tokio::test]
    async fn test_namespace_lookup_error_never_passes() {
        let server = FakeApiServer::new().deny("GET", "/namespaces/kotal");

        assert!(matches!(
            kotal_namespace_absent(&server.client()).await,
            Err(KotalError::LookupError { .. })
        ));
    }

    #[tokio::test]
    async fn test_namespace_without_timestamp_is_lookup_error() {
        let server = FakeApiServer::new().on_get(
            "/api/v1/namespaces/kotal",
            200,
            &namespace_json("kotal", None),
        );

        assert!(matches!(
            kotal_namespace_absent(&server.client()).await,
            Err(KotalError::LookupError { .. })
        ));
    }

    #[tokio::test]
    async fn test_query_api_unreachable() {
        let server = FakeApiServer::new().deny("GET", "/api/v1/pods");

        assert!(matches!(
            can_query_kubernetes_api(&server.client()).await,
            Err(KotalError::UnreachableError {
                api: "Kubernetes API",
                ..
            })
        ));
    }

    #[tokio::test]
    async fn test_cert_manager_missing() {
        let server = FakeApiServer::new();

        assert!(matches!(
            cert_manager_installed(&server.client()).await,
            Err(KotalError::UnreachableError {
                api: "cert-manager API",
                ..
            })
        ));
    }

    #[tokio::test]
    async fn test_create_namespace_uses_fresh_uuid() {
        let server = FakeApiServer::new();
        let client = server.client();

        let first = can_create_namespace(&client).await.unwrap();
        let second = can_create_namespace(&client).await.unwrap();

        assert_ne!(first, second);
        assert!(Uuid::parse_str(&first).is_ok());
        assert!(server.contains(&format!("/api/v1/namespaces/{}", first)));
    }

    #[tokio::test]
    async fn test_create_namespaced_objects_land_in_namespace() {
        let server = FakeApiServer::new();
        let client = server.client();

        let svc = can_create_service(&client, "work").await.unwrap();
        let deploy = can_create_deployment(&client, "work").await.unwrap();
        let secret = can_create_secret(&client, "work").await.unwrap();
        let issuer = can_create_cert_manager_issuer(&client, "work").await.unwrap();

        assert_eq!(svc, "dummy");
        assert_eq!(issuer, "self-signer-issuer");
        assert!(server.contains("/api/v1/namespaces/work/services/dummy"));
        assert!(server.contains(&format!(
            "/apis/apps/v1/namespaces/work/deployments/{}",
            deploy
        )));
        assert!(server.contains(&format!("/api/v1/namespaces/work/secrets/{}", secret)));
        assert!(server.contains(
            "/apis/cert-manager.io/v1/namespaces/work/issuers/self-signer-issuer"
        ));
    }

    #[tokio::test]
    async fn test_create_cluster_role_binding_references_role_and_account() {
        let server = FakeApiServer::new();
        let client = server.client();

        let name = can_create_cluster_role_binding(&client, "role-1", "sa-1", "work")
            .await
            .unwrap();

        let bindings: Api<ClusterRoleBinding> = Api::all(client);
        let binding = bindings.get(&name).await.unwrap();
        assert_eq!(binding.role_ref.name, "role-1");
        let subject = &binding.subjects.unwrap()[0];
        assert_eq!(subject.name, "sa-1");
        assert_eq!(subject.namespace.as_deref(), Some("work"));
    }

    #[tokio::test]
    async fn test_create_failure_names_kind() {
        let server = FakeApiServer::new().deny("POST", "/customresourcedefinitions");

        let err = can_create_custom_resource_definition(&server.client())
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            KotalError::CreateError {
                kind: ResourceKind::CustomResourceDefinition,
                ..
            }
        ));
        assert!(err
            .to_string()
            .starts_with("error creating CustomResourceDefinition"));
    }
}
