// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

/// Namespace the Kotal operator installs into
pub const KOTAL_NAMESPACE: &str = "kotal";

/// Names and values used by the capability probes
pub mod probe {
    pub const SERVICE_NAME: &str = "dummy";
    pub const SERVICE_PORT: i32 = 3000;
    pub const DEPLOYMENT_IMAGE: &str = "busybox";
    pub const DEPLOYMENT_APP_LABEL: &str = "box";
    pub const ISSUER_NAME: &str = "self-signer-issuer";
    pub const SECRET_KEY: &str = "secret";
    pub const SECRET_VALUE: &str = "I am Satoshi";
}

/// Minimum supported Kubernetes version
pub mod version {
    pub const MIN_MAJOR: u32 = 1;
    pub const MIN_MINOR: u32 = 19;
}

/// Cleanup worker configuration
pub mod cleanup {
    /// Seconds the CLI waits for detached cleanups before exiting
    pub const EXIT_GRACE_SECS: u64 = 10;
}

/// Operator installation via kubectl
pub mod install {
    pub const KUBECTL: &str = "kubectl";
    pub const DEFAULT_VERSION: &str = "0.1-alpha.6";
    pub const RELEASES_URL: &str = "https://github.com/kotalco/kotal/releases/download";
    pub const MANIFEST_FILE: &str = "kotal.yaml";
    pub const CONTROLLER_DEPLOYMENT: &str = "deployments/controller-manager";
    pub const WAIT_TIMEOUT: &str = "600s";
}
