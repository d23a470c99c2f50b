// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Minimum Kubernetes version probe

use crate::constants::version::{MIN_MAJOR, MIN_MINOR};
use crate::error::{KotalError, Result};
use kube::Client;
use tracing::{debug, instrument};

/// Query the server version and compare it with the supported minimum
#[instrument(skip(discovery))]
pub async fn minimum_kubernetes_version(discovery: &Client) -> Result<()> {
    let info = discovery
        .apiserver_version()
        .await
        .map_err(|source| KotalError::UnreachableError {
            api: "server version",
            source,
        })?;
    debug!("Server reports version {}.{}", info.major, info.minor);

    let major = parse_version_component(&info.major);
    let minor = parse_version_component(&info.minor);

    if !meets_minimum(major, minor) {
        return Err(KotalError::VersionTooLowError {
            major: info.major,
            minor: info.minor,
            required_major: MIN_MAJOR,
            required_minor: MIN_MINOR,
        });
    }

    Ok(())
}

/// Leading decimal digits of a version component, zero when there are none.
///
/// Managed clusters report minors such as `"27+"`. Values too large for a
/// `u32` saturate instead of wrapping to zero.
pub fn parse_version_component(raw: &str) -> u32 {
    let digits: String = raw
        .trim()
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    if digits.is_empty() {
        return 0;
    }
    digits.parse().unwrap_or(u32::MAX)
}

pub fn meets_minimum(major: u32, minor: u32) -> bool {
    major >= MIN_MAJOR && minor >= MIN_MINOR
}
