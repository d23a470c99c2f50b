// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use k8s_openapi::apiextensions_apiserver::pkg::apis::apiextensions::v1::CustomResourceDefinition;
use kube::{CustomResource, CustomResourceExt};
use serde::{Deserialize, Serialize};

/// Throwaway kind registered to prove the caller may install CRDs
#[derive(CustomResource, Serialize, Deserialize, Clone, Debug, Default, schemars::JsonSchema)]
#[kube(group = "cli.kotal.io", version = "v1", kind = "Check")]
#[kube(namespaced)]
pub struct CheckSpec {}

/// Definition for `checks.cli.kotal.io` with no version served
pub fn check_crd() -> CustomResourceDefinition {
    let mut crd = Check::crd();
    for version in crd.spec.versions.iter_mut() {
        version.served = false;
        version.storage = true;
    }
    crd
}

#[cfg(test)]
mod tests {
    use super::*;
    use kube::ResourceExt;

    #[test]
    fn test_check_crd_name_and_scope() {
        let crd = check_crd();

        assert_eq!(crd.name_any(), "checks.cli.kotal.io");
        assert_eq!(crd.spec.group, "cli.kotal.io");
        assert_eq!(crd.spec.scope, "Namespaced");
        assert_eq!(crd.spec.names.kind, "Check");
        assert_eq!(crd.spec.names.plural, "checks");
    }

    #[test]
    fn test_check_crd_is_stored_but_not_served() {
        let crd = check_crd();

        assert_eq!(crd.spec.versions.len(), 1);
        assert!(!crd.spec.versions[0].served);
        assert!(crd.spec.versions[0].storage);
    }
}
