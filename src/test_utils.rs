// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! An in-memory Kubernetes API server for exercising the checks.

use crate::kubernetes::ClusterHandle;
use http::{Request, Response};
use http_body_util::BodyExt;
use kube::client::Body;
use kube::Client;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};
use tower::Service;

/// A fake API server that stores created objects by path.
///
/// POST to a collection stores the object under `<collection>/<name>`, GET and
/// DELETE address the stored object by that path. Canned GET responses cover
/// lists and `/version`. Deny rules answer 403 for a method and path suffix.
#[derive(Clone, Default)]
pub struct FakeApiServer {
    state: Arc<Mutex<State>>,
}

#[derive(Default)]
struct State {
    canned: HashMap<String, (u16, String)>,
    objects: BTreeMap<String, serde_json::Value>,
    denied: Vec<(String, String)>,
    calls: Vec<(String, String)>,
}

impl FakeApiServer {
    pub fn new() -> Self {
        Self::default()
    }

    /// A server on which every probe succeeds
    pub fn permissive() -> Self {
        Self::new()
            .on_get("/api/v1/pods", 200, &list_json("v1", "PodList"))
            .on_get(
                "/apis/cert-manager.io/v1/certificates",
                200,
                &list_json("cert-manager.io/v1", "CertificateList"),
            )
            .on_get("/version", 200, &version_json("1", "30"))
    }

    /// Answer GET requests for the exact path
    pub fn on_get(self, path: &str, status: u16, body: &str) -> Self {
        self.state
            .lock()
            .unwrap()
            .canned
            .insert(path.to_string(), (status, body.to_string()));
        self
    }

    /// Reject requests with this method whose path ends with `suffix`
    pub fn deny(self, method: &str, suffix: &str) -> Self {
        self.state
            .lock()
            .unwrap()
            .denied
            .push((method.to_string(), suffix.to_string()));
        self
    }

    pub fn client(&self) -> Client {
        Client::new(self.clone(), "default")
    }

    pub fn handle(&self) -> ClusterHandle {
        ClusterHandle::new(self.client(), self.client())
    }

    /// Paths of every object currently stored
    pub fn inventory(&self) -> Vec<String> {
        self.state.lock().unwrap().objects.keys().cloned().collect()
    }

    pub fn contains(&self, path: &str) -> bool {
        self.state.lock().unwrap().objects.contains_key(path)
    }

    /// Every request received, as (method, path)
    pub fn calls(&self) -> Vec<(String, String)> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn paths(&self, method: &str) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|(m, _)| m == method)
            .map(|(_, p)| p)
            .collect()
    }

    fn respond(&self, method: &str, path: &str, body: &[u8]) -> (u16, String) {
        let mut state = self.state.lock().unwrap();
        state.calls.push((method.to_string(), path.to_string()));

        if state
            .denied
            .iter()
            .any(|(m, suffix)| m == method && path.ends_with(suffix.as_str()))
        {
            return (403, forbidden_json(path));
        }

        match method {
            "GET" => {
                if let Some(resp) = state.canned.get(path) {
                    return resp.clone();
                }
                match state.objects.get(path) {
                    Some(obj) => (200, obj.to_string()),
                    None => (404, not_found_json("object", path)),
                }
            }
            "POST" => {
                let mut obj: serde_json::Value = match serde_json::from_slice(body) {
                    Ok(v) => v,
                    Err(e) => return (400, bad_request_json(&e.to_string())),
                };
                let Some(name) = obj["metadata"]["name"].as_str().map(str::to_string) else {
                    return (400, bad_request_json("metadata.name is required"));
                };
                let key = format!("{}/{}", path, name);
                if state.objects.contains_key(&key) {
                    return (409, already_exists_json(&name));
                }
                obj["metadata"]["creationTimestamp"] = "2026-01-01T00:00:00Z".into();
                obj["metadata"]["uid"] = format!("uid-{}", name).into();
                state.objects.insert(key, obj.clone());
                (201, obj.to_string())
            }
            "DELETE" => match state.objects.remove(path) {
                Some(obj) => (200, obj.to_string()),
                None => (404, not_found_json("object", path)),
            },
            _ => (405, bad_request_json("method not allowed")),
        }
    }
}

impl Service<Request<Body>> for FakeApiServer {
    type Response = Response<Body>;
    type Error = tower::BoxError;
    type Future = std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>> + Send>,
    >;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let server = self.clone();

        Box::pin(async move {
            let method = req.method().to_string();
            let path = req.uri().path().to_string();
            let body = req.into_body().collect().await?.to_bytes();

            let (status, body) = server.respond(&method, &path, &body);

            Ok(Response::builder()
                .status(status)
                .header("content-type", "application/json")
                .body(Body::from(body.into_bytes()))
                .unwrap())
        })
    }
}

pub fn list_json(api_version: &str, kind: &str) -> String {
    serde_json::json!({
        "apiVersion": api_version,
        "kind": kind,
        "metadata": {},
        "items": []
    })
    .to_string()
}

pub fn version_json(major: &str, minor: &str) -> String {
    serde_json::json!({
        "major": major,
        "minor": minor,
        "gitVersion": format!("v{}.{}.0", major, minor),
        "gitCommit": "0000000",
        "gitTreeState": "clean",
        "buildDate": "2026-01-01T00:00:00Z",
        "goVersion": "go1.22.0",
        "compiler": "gc",
        "platform": "linux/amd64"
    })
    .to_string()
}

/// Create a namespace JSON response
pub fn namespace_json(name: &str, created: Option<&str>) -> String {
    let mut metadata = serde_json::json!({ "name": name, "uid": "test-uid" });
    if let Some(ts) = created {
        metadata["creationTimestamp"] = ts.into();
    }
    serde_json::json!({
        "apiVersion": "v1",
        "kind": "Namespace",
        "metadata": metadata
    })
    .to_string()
}

/// Create a 404 not found response
pub fn not_found_json(resource: &str, name: &str) -> String {
    status_json(
        404,
        "NotFound",
        &format!("{} \"{}\" not found", resource, name),
    )
}

pub fn forbidden_json(path: &str) -> String {
    status_json(
        403,
        "Forbidden",
        &format!("access to {} is forbidden", path),
    )
}

fn already_exists_json(name: &str) -> String {
    status_json(
        409,
        "AlreadyExists",
        &format!("\"{}\" already exists", name),
    )
}

fn bad_request_json(message: &str) -> String {
    status_json(400, "BadRequest", message)
}

fn status_json(code: u16, reason: &str, message: &str) -> String {
    serde_json::json!({
        "kind": "Status",
        "apiVersion": "v1",
        "status": "Failure",
        "message": message,
        "reason": reason,
        "code": code
    })
    .to_string()
}
