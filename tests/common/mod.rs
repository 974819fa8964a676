//! Shared test utilities for integration and E2E tests.
//!
//! The centerpiece is [`FakeGitHub`], a scripted stand-in for the GitHub REST
//! API served by `axum` on a background runtime. Routes map a request path
//! (query string ignored) to a canned response; every request URI is
//! recorded so tests can assert on what the client asked for. JSON bodies may
//! contain `{base_url}`, replaced with the server's own address when served.
//!
//! ```rust,ignore
//! mod common;
//! use common::FakeGitHub;
//!
//! let server = FakeGitHub::builder()
//!     .json("/repos/deis/charts/contents/chart", "[]")
//!     .spawn();
//! ```

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::Router;
use base64::Engine;
use std::collections::HashMap;
use std::sync::{mpsc, Arc, Mutex};
use std::thread;

#[derive(Clone)]
struct Canned {
    status: StatusCode,
    content_type: &'static str,
    body: Bytes,
}

#[derive(Clone, Default)]
struct ServerState {
    routes: Arc<HashMap<String, Canned>>,
    requests: Arc<Mutex<Vec<String>>>,
}

/// Builder for a [`FakeGitHub`] server
#[derive(Default)]
pub struct FakeGitHubBuilder {
    routes: HashMap<String, Canned>,
}

#[allow(dead_code)]
impl FakeGitHubBuilder {
    /// Answer `path` with a JSON body
    pub fn json(mut self, path: &str, body: &str) -> Self {
        self.routes.insert(
            path.to_string(),
            Canned {
                status: StatusCode::OK,
                content_type: "application/json",
                body: Bytes::from(body.to_string()),
            },
        );
        self
    }

    /// Answer `path` with raw bytes
    pub fn raw(mut self, path: &str, body: &[u8]) -> Self {
        self.routes.insert(
            path.to_string(),
            Canned {
                status: StatusCode::OK,
                content_type: "application/octet-stream",
                body: Bytes::from(body.to_vec()),
            },
        );
        self
    }

    /// Answer `path` with an error status and a GitHub-style message
    pub fn error(mut self, path: &str, status: u16, message: &str) -> Self {
        self.routes.insert(
            path.to_string(),
            Canned {
                status: StatusCode::from_u16(status).unwrap(),
                content_type: "application/json",
                body: Bytes::from(format!(r#"{{"message": "{}"}}"#, message)),
            },
        );
        self
    }

    /// Serve a file through the contents API with base64 inline content
    pub fn file(self, org: &str, repo: &str, path: &str, content: &[u8]) -> Self {
        let encoded = base64::engine::general_purpose::STANDARD.encode(content);
        let body = format!(
            r#"{{"type": "file", "name": "{}", "path": "{}", "size": {}, "encoding": "base64", "content": "{}\n"}}"#,
            path.rsplit('/').next().unwrap(),
            path,
            content.len(),
            encoded
        );
        self.json(&format!("/repos/{}/{}/contents/{}", org, repo, path), &body)
    }

    /// Start the server on an ephemeral port
    pub fn spawn(self) -> FakeGitHub {
        let state = ServerState {
            routes: Arc::new(self.routes),
            requests: Arc::new(Mutex::new(Vec::new())),
        };
        let requests = state.requests.clone();
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            let runtime = tokio::runtime::Builder::new_multi_thread()
                .worker_threads(1)
                .enable_all()
                .build()
                .expect("build test runtime");
            runtime.block_on(async move {
                let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
                    .await
                    .expect("bind fake GitHub listener");
                tx.send(listener.local_addr().expect("local addr"))
                    .expect("report address");
                let app = Router::new().fallback(respond).with_state(state);
                axum::serve(listener, app).await.expect("serve fake GitHub");
            });
        });

        let addr = rx.recv().expect("fake GitHub did not start");
        FakeGitHub {
            base_url: format!("http://{}", addr),
            requests,
        }
    }
}

async fn respond(State(state): State<ServerState>, headers: HeaderMap, uri: Uri) -> Response {
    state.requests.lock().unwrap().push(uri.to_string());
    match state.routes.get(uri.path()) {
        Some(canned) => {
            let body = if canned.content_type == "application/json" {
                let host = headers
                    .get(header::HOST)
                    .and_then(|h| h.to_str().ok())
                    .unwrap_or("localhost");
                let text = String::from_utf8_lossy(&canned.body)
                    .replace("{base_url}", &format!("http://{}", host));
                Bytes::from(text)
            } else {
                canned.body.clone()
            };
            (canned.status, [(header::CONTENT_TYPE, canned.content_type)], body).into_response()
        }
        None => (
            StatusCode::NOT_FOUND,
            [(header::CONTENT_TYPE, "application/json")],
            r#"{"message": "Not Found"}"#,
        )
            .into_response(),
    }
}

/// A running fake GitHub API
pub struct FakeGitHub {
    pub base_url: String,
    requests: Arc<Mutex<Vec<String>>>,
}

#[allow(dead_code)]
impl FakeGitHub {
    pub fn builder() -> FakeGitHubBuilder {
        FakeGitHubBuilder::default()
    }

    /// Request URIs received so far, path and query
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

/// Listing JSON for a directory of the chart repository
#[allow(dead_code)]
pub fn listing(entries: &[(&str, &str)]) -> String {
    let items: Vec<String> = entries
        .iter()
        .map(|(kind, path)| {
            format!(
                r#"{{"type": "{}", "size": 0, "name": "{}", "path": "{}", "sha": "", "download_url": null}}"#,
                kind,
                path.rsplit('/').next().unwrap(),
                path
            )
        })
        .collect();
    format!("[{}]", items.join(","))
}

/// A fake GitHub serving a small `deis/charts` tree and `deis/workflow-e2e` commits
#[allow(dead_code)]
pub fn chart_server() -> FakeGitHub {
    FakeGitHub::builder()
        .json(
            "/repos/deis/charts/contents/workflow-dev-e2e",
            &listing(&[
                ("file", "workflow-dev-e2e/README.md"),
                ("dir", "workflow-dev-e2e"),
                ("dir", "workflow-dev-e2e/tpl"),
            ]),
        )
        .json(
            "/repos/deis/charts/contents/workflow-dev-e2e/tpl",
            &listing(&[("file", "workflow-dev-e2e/tpl/version")]),
        )
        .file("deis", "charts", "workflow-dev-e2e/README.md", b"contents")
        .file("deis", "charts", "workflow-dev-e2e/tpl/version", b"dev")
        .json(
            "/repos/deis/workflow-e2e/commits",
            r#"[{"sha": "abc1234def5678abc1234def5678abc1234def56"}]"#,
        )
        .spawn()
}
