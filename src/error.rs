// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use crate::types::ResourceKind;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum KotalError {
    #[error("error configuring Kubernetes API client: {0}")]
    ConfigError(String),

    #[error("error creating Kubernetes client: {0}")]
    ClientConstructionError(String),

    #[error("error querying {api}: {source}")]
    UnreachableError {
        api: &'static str,
        #[source]
        source: kube::Error,
    },

    #[error("error getting namespace {name}: {reason}")]
    LookupError { name: String, reason: String },

    #[error("namespace {0} does exist")]
    AlreadyExistsError(String),

    #[error("cluster version is v{major}.{minor}, minimum required version is v{required_major}.{required_minor}")]
    VersionTooLowError {
        major: String,
        minor: String,
        required_major: u32,
        required_minor: u32,
    },

    #[error("error creating {kind}: {source}")]
    CreateError {
        kind: ResourceKind,
        #[source]
        source: kube::Error,
    },

    #[error("error deleting {kind} {name}: {source}")]
    DeleteError {
        kind: ResourceKind,
        name: String,
        #[source]
        source: kube::Error,
    },

    #[error("{0} is required but no earlier check produced it")]
    MissingPrerequisite(&'static str),

    #[error("{step} failed: {stderr}")]
    InstallError { step: &'static str, stderr: String },

    #[error("failed to run {program}: {source}")]
    CommandError {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid version {0:?}")]
    InvalidVersion(String),

    #[error("failed to write report: {0}")]
    OutputError(#[from] std::io::Error),
}

/// True when the API server answered with 404
pub fn is_not_found(err: &kube::Error) -> bool {
    matches!(err, kube::Error::Api(resp) if resp.code == 404)
}

pub type Result<T> = std::result::Result<T, KotalError>;
