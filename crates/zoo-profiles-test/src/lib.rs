//! Helpers for testing the profile cache service.
//!
//! When writing tests, keep the following points in mind:
//!
//!  - In every test, call [`setup`]. This will set up the logger so that all console output
//!    is captured by the test runner.
//!
//!  - When using [`ZooServer`], make sure that the server is held until all requests to
//!    the server have been made. If the server is dropped, the ports remain open and all
//!    connections to it will time out. To avoid this, assign it to a variable:
//!    `let server = ZooServer::new();`.

use std::collections::{BTreeMap, HashMap};
use std::net::{Ipv4Addr, SocketAddr};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::Router;
use axum::extract::State;
use axum::http::{StatusCode, Uri, header};
use axum::response::{IntoResponse, Response};
use tracing_subscriber::filter::EnvFilter;
use tracing_subscriber::fmt::fmt;
use url::Url;

/// Setup the test environment.
///
///  - Initializes logs: The logger only captures logs from the `zoo_profiles` crate and mutes
///    all other logs (such as axum or hyper).
pub fn setup() {
    fmt()
        .with_env_filter(EnvFilter::new("zoo_profiles=trace"))
        .with_target(false)
        .pretty()
        .with_test_writer()
        .try_init()
        .ok();
}

/// A test server that binds to a random port and serves a web app.
///
/// This server requires a `tokio` runtime and is supposed to be run in a `tokio::test`. It
/// automatically stops serving when dropped.
#[derive(Debug)]
pub struct Server {
    pub handle: tokio::task::JoinHandle<()>,
    pub socket: SocketAddr,
}

impl Server {
    fn with_router(router: Router) -> Self {
        let listener = std::net::TcpListener::bind((Ipv4Addr::LOCALHOST, 0)).unwrap();
        listener.set_nonblocking(true).unwrap();
        let socket = listener.local_addr().unwrap();

        let handle = tokio::spawn(async move {
            let listener = tokio::net::TcpListener::from_std(listener).unwrap();
            axum::serve(listener, router).await.unwrap();
        });

        Self { handle, socket }
    }

    /// Returns the socket address that this server listens on.
    pub fn addr(&self) -> SocketAddr {
        self.socket
    }

    /// Returns the port that this server listens on.
    pub fn port(&self) -> u16 {
        self.addr().port()
    }

    /// Returns a full URL pointing to the given path.
    ///
    /// This URL uses `localhost` as hostname.
    pub fn url(&self, path: &str) -> Url {
        let path = path.trim_start_matches('/');
        format!("http://localhost:{}/{}", self.port(), path)
            .parse()
            .unwrap()
    }
}

impl Drop for Server {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// A server that accepts connections and immediately drops them.
///
/// Every request against it fails with a transport error before any HTTP
/// response is received.
pub async fn reset_server() -> Server {
    let listener = tokio::net::TcpListener::bind((Ipv4Addr::LOCALHOST, 0))
        .await
        .unwrap();
    let socket = listener.local_addr().unwrap();

    let handle = tokio::spawn(async move {
        while let Ok((stream, _)) = listener.accept().await {
            drop(stream);
        }
    });

    Server { handle, socket }
}

#[derive(Clone)]
struct CannedResponse {
    status: StatusCode,
    body: String,
    delay: Option<Duration>,
}

#[derive(Clone, Default)]
struct ZooState {
    hits: Arc<Mutex<BTreeMap<String, usize>>>,
    responses: Arc<Mutex<HashMap<String, CannedResponse>>>,
}

async fn respond(State(state): State<ZooState>, uri: Uri) -> Response {
    let path = uri.path().to_string();

    {
        let mut hits = state.hits.lock().unwrap();
        *hits.entry(path.clone()).or_default() += 1;
    }

    let canned = state.responses.lock().unwrap().get(&path).cloned();
    match canned {
        Some(response) => {
            if let Some(delay) = response.delay {
                tokio::time::sleep(delay).await;
            }
            (
                response.status,
                [(header::CONTENT_TYPE, "application/json")],
                response.body,
            )
                .into_response()
        }
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

/// A canned rendition of the remote Zoo profile API.
///
/// Serves the list endpoint (`/api/profiles/{user}`) and the detail endpoint
/// (`/api/profile/{id}`) from responses registered by the test, counts hits
/// per path, and can delay individual responses. Paths without a registered
/// response return 404.
pub struct ZooServer {
    server: Server,
    state: ZooState,
}

impl ZooServer {
    pub fn new() -> Self {
        let state = ZooState::default();
        let router = Router::new().fallback(respond).with_state(state.clone());
        let server = Server::with_router(router);

        Self { server, state }
    }

    /// The URL to use as the service's `base_url`.
    pub fn base_url(&self) -> Url {
        self.server.url("")
    }

    /// Serves the given JSON document on the list endpoint for `user_id`.
    pub fn serve_profiles(&self, user_id: &str, body: serde_json::Value) {
        self.insert(list_path(user_id), StatusCode::OK, body.to_string(), None);
    }

    /// Serves the given JSON document on the list endpoint, delayed.
    pub fn serve_profiles_delayed(&self, user_id: &str, body: serde_json::Value, delay: Duration) {
        self.insert(
            list_path(user_id),
            StatusCode::OK,
            body.to_string(),
            Some(delay),
        );
    }

    /// Answers the list endpoint for `user_id` with a bare status code.
    pub fn serve_profiles_status(&self, user_id: &str, status: StatusCode) {
        self.insert(list_path(user_id), status, String::new(), None);
    }

    /// Serves a raw, possibly non-JSON body on the list endpoint.
    pub fn serve_profiles_body(&self, user_id: &str, body: &str) {
        self.insert(list_path(user_id), StatusCode::OK, body.to_string(), None);
    }

    /// Serves the given JSON document on the detail endpoint for `profile_id`.
    pub fn serve_profile(&self, profile_id: &str, body: serde_json::Value) {
        self.insert(
            detail_path(profile_id),
            StatusCode::OK,
            body.to_string(),
            None,
        );
    }

    /// Serves the given JSON document on the detail endpoint, delayed.
    pub fn serve_profile_delayed(&self, profile_id: &str, body: serde_json::Value, delay: Duration) {
        self.insert(
            detail_path(profile_id),
            StatusCode::OK,
            body.to_string(),
            Some(delay),
        );
    }

    /// Answers the detail endpoint for `profile_id` with a bare status code.
    pub fn serve_profile_status(&self, profile_id: &str, status: StatusCode) {
        self.insert(detail_path(profile_id), status, String::new(), None);
    }

    /// Serves a raw, possibly non-JSON body on the detail endpoint.
    pub fn serve_profile_body(&self, profile_id: &str, body: &str) {
        self.insert(detail_path(profile_id), StatusCode::OK, body.to_string(), None);
    }

    /// The number of requests the list endpoint for `user_id` received.
    pub fn list_hits(&self, user_id: &str) -> usize {
        self.hits(&list_path(user_id))
    }

    /// The number of requests the detail endpoint for `profile_id` received.
    pub fn detail_hits(&self, profile_id: &str) -> usize {
        self.hits(&detail_path(profile_id))
    }

    /// The total number of requests received, draining all counters.
    pub fn accesses(&self) -> usize {
        let map = std::mem::take(&mut *self.state.hits.lock().unwrap());
        map.into_values().sum()
    }

    fn hits(&self, path: &str) -> usize {
        self.state
            .hits
            .lock()
            .unwrap()
            .get(path)
            .copied()
            .unwrap_or_default()
    }

    fn insert(&self, path: String, status: StatusCode, body: String, delay: Option<Duration>) {
        let canned = CannedResponse {
            status,
            body,
            delay,
        };
        self.state.responses.lock().unwrap().insert(path, canned);
    }
}

impl Default for ZooServer {
    fn default() -> Self {
        Self::new()
    }
}

fn list_path(user_id: &str) -> String {
    format!("/api/profiles/{user_id}")
}

fn detail_path(profile_id: &str) -> String {
    format!("/api/profile/{profile_id}")
}
