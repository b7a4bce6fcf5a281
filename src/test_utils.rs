// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Test utilities for faking the Kubernetes API.
//!
//! `MockService` keeps created objects in memory keyed by their API path, so
//! get/create/delete sequences behave like a tiny API server. Scripted
//! responses registered for an exact method and path take precedence; the last
//! scripted response for a path repeats once earlier ones are consumed.

use http::{Request, Response};
use http_body_util::BodyExt;
use kube::client::Body;
use kube::Client;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};
use tower::Service;

/// Collection segments the fake answers list requests for
const COLLECTIONS: &[&str] = &[
    "namespaces",
    "serviceaccounts",
    "rolebindings",
    "clusterrolebindings",
    "clusterroles",
    "certificatesigningrequests",
];

pub const NAMESPACES: &str = "/api/v1/namespaces";
pub const CLUSTER_ROLE_BINDINGS: &str = "/apis/rbac.authorization.k8s.io/v1/clusterrolebindings";
pub const CLUSTER_ROLES: &str = "/apis/rbac.authorization.k8s.io/v1/clusterroles";
pub const CSRS: &str = "/apis/certificates.k8s.io/v1/certificatesigningrequests";

pub fn role_bindings(namespace: &str) -> String {
    format!(
        "/apis/rbac.authorization.k8s.io/v1/namespaces/{}/rolebindings",
        namespace
    )
}

pub fn service_accounts(namespace: &str) -> String {
    format!("{}/{}/serviceaccounts", NAMESPACES, namespace)
}

/// A request observed by the mock
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub body: Option<Value>,
}

#[derive(Default)]
struct State {
    objects: BTreeMap<String, Value>,
    scripted: HashMap<(String, String), VecDeque<(u16, String)>>,
    requests: Vec<RecordedRequest>,
}

/// A mock HTTP service that behaves like an in-memory API server.
#[derive(Clone, Default)]
pub struct MockService {
    state: Arc<Mutex<State>>,
}

impl MockService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store an object at `collection/name`
    pub fn with_object(self, collection: &str, object: Value) -> Self {
        let name = object["metadata"]["name"].as_str().unwrap_or_default().to_string();
        self.state
            .lock()
            .unwrap()
            .objects
            .insert(format!("{}/{}", collection, name), object);
        self
    }

    /// Queue a response for requests matching the exact method and path
    pub fn on(self, method: &str, path: &str, status: u16, body: &str) -> Self {
        self.state
            .lock()
            .unwrap()
            .scripted
            .entry((method.to_string(), path.to_string()))
            .or_default()
            .push_back((status, body.to_string()));
        self
    }

    pub fn on_get(self, path: &str, status: u16, body: &str) -> Self {
        self.on("GET", path, status, body)
    }

    /// Build a kube Client from this mock service; the mock stays inspectable through clones
    pub fn into_client(self) -> Client {
        Client::new(self, "default")
    }

    /// All requests seen so far
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.lock().unwrap().requests.clone()
    }

    /// Requests seen for a method and exact path
    pub fn count(&self, method: &str, path: &str) -> usize {
        self.requests()
            .iter()
            .filter(|r| r.method == method && r.path == path)
            .count()
    }

    /// Current stored object at `collection/name`
    pub fn object(&self, collection: &str, name: &str) -> Option<Value> {
        self.state
            .lock()
            .unwrap()
            .objects
            .get(&format!("{}/{}", collection, name))
            .cloned()
    }

    /// Names of stored objects directly under a collection
    pub fn names(&self, collection: &str) -> Vec<String> {
        let prefix = format!("{}/", collection);
        self.state
            .lock()
            .unwrap()
            .objects
            .keys()
            .filter_map(|k| k.strip_prefix(&prefix))
            .filter(|rest| !rest.contains('/'))
            .map(str::to_string)
            .collect()
    }

    fn handle(&self, method: &str, path: &str, body: Option<Value>) -> (u16, String) {
        let mut state = self.state.lock().unwrap();
        state.requests.push(RecordedRequest {
            method: method.to_string(),
            path: path.to_string(),
            body: body.clone(),
        });

        let key = (method.to_string(), path.to_string());
        if let Some(queue) = state.scripted.get_mut(&key) {
            let response = if queue.len() > 1 {
                queue.pop_front()
            } else {
                queue.front().cloned()
            };
            if let Some(response) = response {
                return response;
            }
        }

        let objects = &mut state.objects;
        match method {
            "GET" if is_collection(path) => {
                let prefix = format!("{}/", path);
                let items: Vec<Value> = objects
                    .iter()
                    .filter(|(k, _)| {
                        k.strip_prefix(&prefix)
                            .is_some_and(|rest| !rest.contains('/'))
                    })
                    .map(|(_, v)| v.clone())
                    .collect();
                let list = serde_json::json!({
                    "apiVersion": "v1",
                    "kind": "List",
                    "metadata": {},
                    "items": items,
                });
                (200, list.to_string())
            }
            "GET" => match objects.get(path) {
                Some(obj) => (200, obj.to_string()),
                None => (404, not_found_json(path)),
            },
            "POST" => {
                let Some(obj) = body else {
                    return (400, status_json(400, "BadRequest", "missing body"));
                };
                let name = obj["metadata"]["name"].as_str().unwrap_or_default();
                let key = format!("{}/{}", path, name);
                if objects.contains_key(&key) {
                    let message = format!("{} already exists", key);
                    return (409, status_json(409, "AlreadyExists", &message));
                }
                objects.insert(key, obj.clone());
                (201, obj.to_string())
            }
            "DELETE" => match objects.remove(path) {
                Some(obj) => (200, obj.to_string()),
                None => (404, not_found_json(path)),
            },
            "PUT" => {
                let Some(obj) = body else {
                    return (400, status_json(400, "BadRequest", "missing body"));
                };
                let target = path.strip_suffix("/approval").unwrap_or(path);
                match objects.get_mut(target) {
                    Some(stored) => {
                        if path.ends_with("/approval") {
                            stored["status"]["conditions"] = obj["status"]["conditions"].clone();
                        } else {
                            *stored = obj;
                        }
                        (200, stored.to_string())
                    }
                    None => (404, not_found_json(target)),
                }
            }
            _ => (405, status_json(405, "MethodNotAllowed", method)),
        }
    }
}

fn is_collection(path: &str) -> bool {
    path.rsplit('/')
        .next()
        .is_some_and(|last| COLLECTIONS.contains(&last))
}

impl Service<Request<Body>> for MockService {
    type Response = Response<Body>;
    type Error = tower::BoxError;
    type Future = std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>> + Send>,
    >;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let this = self.clone();

        Box::pin(async move {
            let method = req.method().to_string();
            let path = req.uri().path().to_string();
            let bytes = req
                .into_body()
                .collect()
                .await
                .map_err(tower::BoxError::from)?
                .to_bytes();
            let body = serde_json::from_slice::<Value>(&bytes).ok();

            let (status, body) = this.handle(&method, &path, body);
            Ok(Response::builder()
                .status(status)
                .header("content-type", "application/json")
                .body(Body::from(body.into_bytes()))
                .unwrap())
        })
    }
}

fn status_json(code: u16, reason: &str, message: &str) -> String {
    serde_json::json!({
        "kind": "Status",
        "apiVersion": "v1",
        "metadata": {},
        "status": "Failure",
        "message": message,
        "reason": reason,
        "code": code
    })
    .to_string()
}

/// Create a 404 not found response
pub fn not_found_json(name: &str) -> String {
    status_json(404, "NotFound", &format!("\"{}\" not found", name))
}

/// Create a 403 forbidden response
pub fn forbidden_json(name: &str) -> String {
    status_json(403, "Forbidden", &format!("access to \"{}\" is forbidden", name))
}

/// Create a mock namespace JSON object
pub fn namespace_json(name: &str) -> Value {
    serde_json::json!({
        "apiVersion": "v1",
        "kind": "Namespace",
        "metadata": {
            "name": name,
            "uid": "test-uid"
        }
    })
}

pub fn service_account_json(namespace: &str, name: &str) -> Value {
    serde_json::json!({
        "apiVersion": "v1",
        "kind": "ServiceAccount",
        "metadata": { "name": name, "namespace": namespace }
    })
}

pub fn cluster_role_json(name: &str) -> Value {
    serde_json::json!({
        "apiVersion": "rbac.authorization.k8s.io/v1",
        "kind": "ClusterRole",
        "metadata": { "name": name },
        "rules": []
    })
}

/// A CSR as the API would return it; `certificate` is raw bytes, encoded as base64 here
pub fn csr_json(name: &str, certificate: Option<&[u8]>, conditions: &[&str]) -> Value {
    let mut status = serde_json::Map::new();
    if let Some(cert) = certificate {
        status.insert("certificate".to_string(), Value::String(base64(cert)));
    }
    if !conditions.is_empty() {
        let conditions: Vec<Value> = conditions
            .iter()
            .map(|t| serde_json::json!({ "type": t, "status": "True" }))
            .collect();
        status.insert("conditions".to_string(), Value::Array(conditions));
    }
    serde_json::json!({
        "apiVersion": "certificates.k8s.io/v1",
        "kind": "CertificateSigningRequest",
        "metadata": { "name": name },
        "spec": {
            "request": base64(b"-----BEGIN CERTIFICATE REQUEST-----"),
            "signerName": "kubernetes.io/kube-apiserver-client",
            "usages": ["client auth"]
        },
        "status": Value::Object(status)
    })
}

/// Round-trip bytes through k8s-openapi's own ByteString encoding
fn base64(data: &[u8]) -> String {
    let encoded = serde_json::to_value(k8s_openapi::ByteString(data.to_vec())).unwrap();
    encoded.as_str().unwrap_or_default().to_string()
}
