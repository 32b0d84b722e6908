use crate::settings::RelaySettings;
use crate::upstream::{self, ForwardError, Service, Upstream};
use axum::Json;
use axum::Router;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use serde_json::{Value, json};
use std::future::Future;
use std::sync::Arc;
use thiserror::Error;
use tokio::net::TcpListener;

#[derive(Debug, Error)]
pub enum RelayError {
    #[error("invalid request body: {0}")]
    Body(#[from] serde_json::Error),
    #[error(transparent)]
    Forward(#[from] ForwardError),
}

#[derive(Debug, Error)]
pub enum ServeError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("Failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Shared handler state: one HTTP client and the two upstreams.
#[derive(Debug, Clone)]
pub struct Relay {
    client: reqwest::Client,
    leetcode: Arc<Upstream>,
    github: Arc<Upstream>,
}

impl Relay {
    pub fn new(settings: &RelaySettings) -> Result<Self, ServeError> {
        Ok(Self {
            client: upstream::build_client()?,
            leetcode: Arc::new(settings.upstream(Service::LeetCode)),
            github: Arc::new(settings.upstream(Service::GitHub)),
        })
    }

    pub fn upstream(&self, service: Service) -> &Upstream {
        match service {
            Service::LeetCode => &self.leetcode,
            Service::GitHub => &self.github,
        }
    }

    pub async fn relay(&self, service: Service, body: &[u8]) -> Result<Value, RelayError> {
        let body: Value = serde_json::from_slice(body)?;
        Ok(self.upstream(service).forward(&self.client, &body).await?)
    }

    async fn respond(&self, service: Service, body: &[u8]) -> Response {
        match self.relay(service, body).await {
            Ok(data) => Json(data).into_response(),
            Err(e) => {
                log::error!("{} relay error: {}", service, e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": service.failure_message() })),
                )
                    .into_response()
            }
        }
    }
}

async fn leetcode(State(relay): State<Relay>, body: Bytes) -> Response {
    relay.respond(Service::LeetCode, &body).await
}

async fn github(State(relay): State<Relay>, body: Bytes) -> Response {
    relay.respond(Service::GitHub, &body).await
}

pub fn router(relay: Relay) -> Router {
    Router::new()
        .route(Service::LeetCode.route(), post(leetcode))
        .route(Service::GitHub.route(), post(github))
        .with_state(relay)
}

/// Serves the relay on `settings.bind` until `shutdown` resolves.
pub async fn serve<F>(settings: &RelaySettings, shutdown: F) -> Result<(), ServeError>
where
    F: Future<Output = ()> + Send + 'static,
{
    let relay = Relay::new(settings)?;
    let listener = TcpListener::bind(settings.bind).await?;
    log::info!("Relay listening on {}", listener.local_addr()?);

    axum::serve(listener, router(relay))
        .with_graceful_shutdown(shutdown)
        .await?;

    log::info!("Relay stopped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::{AuthToken, Endpoint};
    use axum::body::{Body, to_bytes};
    use axum::http::{HeaderMap, Request, header};
    use std::net::SocketAddr;
    use tower::ServiceExt;

    async fn spawn_upstream() -> SocketAddr {
        let app = Router::new()
            .route(
                "/graphql",
                post(|headers: HeaderMap, Json(body): Json<Value>| async move {
                    let auth = headers
                        .get(header::AUTHORIZATION)
                        .and_then(|v| v.to_str().ok())
                        .map(str::to_string);
                    Json(json!({ "data": { "echo": body, "authorization": auth } }))
                }),
            )
            .route("/html", post(|| async { "<html>maintenance</html>" }));

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        addr
    }

    async fn closed_port() -> SocketAddr {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        listener.local_addr().unwrap()
    }

    fn relay_to(leetcode: String, github: String, token: Option<&str>) -> Router {
        let settings = RelaySettings {
            leetcode_endpoint: Some(Endpoint::new(leetcode)),
            github_endpoint: Some(Endpoint::new(github)),
            github_token: token.map(AuthToken::new),
            ..Default::default()
        };
        router(Relay::new(&settings).unwrap())
    }

    async fn post_json(app: Router, uri: &str, body: &str) -> (StatusCode, Value) {
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(uri)
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_leetcode_body_is_relayed_verbatim() {
        let addr = spawn_upstream().await;
        let app = relay_to(
            format!("http://{addr}/graphql"),
            format!("http://{addr}/graphql"),
            Some("ghp_secret"),
        );

        let query = r#"{"query":"query { matchedUser(username: \"x\") { username } }","variables":{"username":"x"}}"#;
        let (status, body) = post_json(app, "/api/leetcode", query).await;

        assert_eq!(status, StatusCode::OK);
        let sent: Value = serde_json::from_str(query).unwrap();
        assert_eq!(body["data"]["echo"], sent);
        assert_eq!(body["data"]["authorization"], Value::Null);
    }

    #[tokio::test]
    async fn test_github_attaches_token() {
        let addr = spawn_upstream().await;
        let app = relay_to(
            format!("http://{addr}/graphql"),
            format!("http://{addr}/graphql"),
            Some("ghp_secret"),
        );

        let (status, body) = post_json(app, "/api/github", r#"{"query":"{ viewer { login } }"}"#).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["authorization"], "Bearer ghp_secret");
    }

    #[tokio::test]
    async fn test_unreachable_upstream_is_500() {
        let addr = closed_port().await;
        let app = relay_to(
            format!("http://{addr}/graphql"),
            format!("http://{addr}/graphql"),
            None,
        );

        let (status, body) = post_json(app.clone(), "/api/leetcode", r#"{"query":"{}"}"#).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({ "error": "Failed to fetch LeetCode data" }));

        let (status, body) = post_json(app, "/api/github", r#"{"query":"{}"}"#).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({ "error": "Failed to fetch GitHub data" }));
    }

    #[tokio::test]
    async fn test_malformed_body_collapses_to_same_error() {
        let addr = spawn_upstream().await;
        let app = relay_to(
            format!("http://{addr}/graphql"),
            format!("http://{addr}/graphql"),
            None,
        );

        let (status, body) = post_json(app, "/api/leetcode", "{not json").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({ "error": "Failed to fetch LeetCode data" }));
    }

    #[tokio::test]
    async fn test_non_json_upstream_is_500() {
        let addr = spawn_upstream().await;
        let app = relay_to(
            format!("http://{addr}/html"),
            format!("http://{addr}/html"),
            None,
        );

        let (status, body) = post_json(app, "/api/github", r#"{"query":"{}"}"#).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Failed to fetch GitHub data");
    }
}
