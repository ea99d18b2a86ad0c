use std::{path::PathBuf, sync::Arc};

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use chrono::{SecondsFormat, Utc};
use derive_new::new;
use serde_json::json;
use tokio::task::JoinHandle;
use tower_http::{
    cors::CorsLayer,
    services::{ServeDir, ServeFile},
};
use tracing::{error, info};

use crate::CoreMetrics;

/// HTTP surface of a vetapp process.
///
/// routes:
///  - `/api/health` - liveness probe returning `{"status":"ok","timestamp":...}`
///  - `/metrics` - Prometheus text report of [`CoreMetrics`]
///  - anything else - static assets from `assets_dir`, with GET/HEAD misses
///    answered by `index.html` so client-side routes resolve
#[derive(new, Debug)]
pub struct Server {
    listen_port: u16,
    core_metrics: Arc<CoreMetrics>,
    assets_dir: Option<PathBuf>,
}

impl Server {
    /// Run an HTTP server
    pub fn run(self: Arc<Self>) -> JoinHandle<()> {
        self.run_with_custom_router(Router::new())
    }

    /// Run an HTTP server with additional process-specific routes.
    pub fn run_with_custom_router(self: Arc<Self>, router: Router) -> JoinHandle<()> {
        let port = self.listen_port;
        let app = self.router(router);
        info!(port, "starting server on 0.0.0.0");

        tokio::spawn(async move {
            let listener = match tokio::net::TcpListener::bind(("0.0.0.0", port)).await {
                Ok(listener) => listener,
                Err(err) => {
                    error!(port, ?err, "failed to bind server port");
                    return;
                }
            };
            if let Err(err) = axum::serve(listener, app).await {
                error!(?err, "server stopped");
            }
        })
    }

    /// The full router, without binding a socket.
    pub fn router(&self, custom_routes: Router) -> Router {
        let core_metrics = self.core_metrics.clone();
        let app = Router::new()
            .route("/api/health", get(health))
            .route(
                "/metrics",
                get(move || Self::gather_metrics(core_metrics)),
            )
            .merge(custom_routes);

        let app = match &self.assets_dir {
            Some(dir) => app.fallback_service(
                ServeDir::new(dir).fallback(ServeFile::new(dir.join("index.html"))),
            ),
            None => app,
        };
        app.layer(CorsLayer::permissive())
    }

    async fn gather_metrics(core_metrics: Arc<CoreMetrics>) -> impl IntoResponse {
        tracing::debug!("Traversing route for /metrics endpoint for serving Prometheus metrics");
        match core_metrics.gather().map(String::from_utf8) {
            Ok(Ok(metrics)) => (StatusCode::OK, metrics),
            Ok(Err(_)) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal Server Error".into(),
            ),
            Err(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to gather metrics".into(),
            ),
        }
    }
}

async fn health() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "timestamp": Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
    }))
}

#[cfg(test)]
mod tests {
    use axum::{
        body::Body,
        http::{header, Method, Request},
    };
    use http_body_util::BodyExt;
    use prometheus::{Counter, Registry};
    use tower::ServiceExt;

    use super::*;

    fn server(assets_dir: Option<PathBuf>) -> Server {
        let registry = Registry::new();
        let counter = Counter::new("expected_metric_content", "test123").unwrap();
        registry.register(Box::new(counter.clone())).unwrap();
        counter.inc();
        Server::new(
            8080,
            Arc::new(CoreMetrics::new("test", 8080, registry).unwrap()),
            assets_dir,
        )
    }

    async fn body_string(response: axum::response::Response) -> String {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    fn request(method: Method, uri: &str) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::ORIGIN, "https://app.example")
            .body(Body::empty())
            .unwrap()
    }

    #[tokio::test]
    async fn health_reports_ok_with_iso_timestamp() {
        let app = server(None).router(Router::new());
        let response = app.oneshot(request(Method::GET, "/api/health")).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
            "*"
        );
        let body: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(body["status"], "ok");
        let timestamp = body["timestamp"].as_str().unwrap();
        assert!(chrono::DateTime::parse_from_rfc3339(timestamp).is_ok());
        assert!(timestamp.ends_with('Z'));
    }

    #[tokio::test]
    async fn metrics_endpoint_serves_registry() {
        let app = server(None).router(Router::new());
        let response = app.oneshot(request(Method::GET, "/metrics")).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_string(response).await;
        assert!(body.contains("expected_metric_content"));
        assert!(body.contains("vetapp_build_info"));
    }

    #[tokio::test]
    async fn client_routes_fall_back_to_index() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("index.html"), "<html>app</html>").unwrap();
        std::fs::write(dir.path().join("app.js"), "console.log(1)").unwrap();
        let app = server(Some(dir.path().to_path_buf())).router(Router::new());

        let asset = app
            .clone()
            .oneshot(request(Method::GET, "/app.js"))
            .await
            .unwrap();
        assert_eq!(asset.status(), StatusCode::OK);
        assert_eq!(body_string(asset).await, "console.log(1)");

        let spa = app
            .clone()
            .oneshot(request(Method::GET, "/vote/0x1"))
            .await
            .unwrap();
        assert_eq!(spa.status(), StatusCode::OK);
        assert_eq!(body_string(spa).await, "<html>app</html>");

        let post = app
            .oneshot(request(Method::POST, "/vote/0x1"))
            .await
            .unwrap();
        assert_ne!(post.status(), StatusCode::OK);
    }
}
