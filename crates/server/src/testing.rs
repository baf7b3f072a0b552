//! Helpers for driving the router against stub upstreams.

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode};
use rumahsubsidi_core::AppConfig;
use serde_json::Value;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tower::ServiceExt;

use crate::handler::{AppState, router};

/// An axum router served on an ephemeral local port for the lifetime of the value.
pub struct StubUpstream {
    addr: SocketAddr,
    handle: JoinHandle<()>,
}

impl StubUpstream {
    pub async fn start(router: Router) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        Self { addr, handle }
    }

    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }
}

impl Drop for StubUpstream {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// URL of a local port nothing listens on.
pub async fn unused_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}

/// Proxy router whose upstreams point at the given base URLs.
pub fn app(pkp_url: &str, sikumbang_url: &str) -> Router {
    let mut config = AppConfig::default();
    config.pkp.url = pkp_url.to_string();
    config.pkp.timeout_ms = 2_000;
    config.sikumbang.base_url = sikumbang_url.to_string();
    config.sikumbang.timeout_ms = 2_000;
    router(AppState::new(config).unwrap())
}

/// Send `request` through `app` and return the status and body text.
pub async fn send(app: Router, request: Request<Body>) -> (StatusCode, String) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, String::from_utf8(bytes.to_vec()).unwrap())
}

pub fn json(body: &str) -> Value {
    serde_json::from_str(body).unwrap()
}
