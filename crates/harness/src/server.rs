//! Local site server: serves a built site directory for offline runs.
//!
//! The production pages live at extensionless paths (`/compress-pdf` is
//! `compress-pdf.html` on disk), so the handler resolves slugs itself
//! instead of leaning on a plain directory service. Listens on a free
//! loopback port and exposes `/health` for the pre-suite check.

use std::net::SocketAddr;
use std::path::{Component, Path, PathBuf};
use std::time::Duration;

use axum::extract::State;
use axum::http::{header, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use tokio::sync::oneshot;
use tokio::time::sleep;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::error::{HarnessError, HarnessResult};

/// Handle to the running server task.
pub struct SiteServer {
    addr: SocketAddr,
    shutdown: Option<oneshot::Sender<()>>,
    task: tokio::task::JoinHandle<()>,
}

impl SiteServer {
    /// Bind a free loopback port and serve `site_dir`.
    pub async fn serve(site_dir: impl Into<PathBuf>) -> HarnessResult<Self> {
        let site_dir = site_dir.into();
        if !site_dir.is_dir() {
            return Err(HarnessError::ServerStartup(format!(
                "site directory not found: {}",
                site_dir.display()
            )));
        }

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .map_err(|e| HarnessError::ServerStartup(e.to_string()))?;
        let addr = listener
            .local_addr()
            .map_err(|e| HarnessError::ServerStartup(e.to_string()))?;

        let router = Router::new()
            .route("/health", get(|| async { "ok" }))
            .fallback(get(serve_page))
            .layer(TraceLayer::new_for_http())
            .with_state(site_dir);

        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let task = tokio::spawn(async move {
            let serve = axum::serve(listener, router).with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
            });
            if let Err(e) = serve.await {
                warn!("site server exited with error: {e}");
            }
        });

        info!("serving site at http://{addr}");
        Ok(Self {
            addr,
            shutdown: Some(shutdown_tx),
            task,
        })
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Poll `/health` until the server answers or the timeout elapses.
    pub async fn wait_healthy(&self, timeout: Duration) -> HarnessResult<()> {
        let url = format!("{}/health", self.base_url());
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(2))
            .build()?;

        let start = std::time::Instant::now();
        let mut attempts = 0;
        while start.elapsed() < timeout {
            attempts += 1;
            if let Ok(resp) = client.get(&url).send().await {
                if resp.status().is_success() {
                    return Ok(());
                }
            }
            sleep(Duration::from_millis(100)).await;
        }
        Err(HarnessError::ServerHealthCheck(attempts))
    }

    /// Stop the server task.
    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        let _ = (&mut self.task).await;
    }
}

impl Drop for SiteServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
    }
}

async fn serve_page(State(site_dir): State<PathBuf>, uri: Uri) -> Response {
    let request_path = uri.path().trim_start_matches('/');
    let Some(relative) = sanitize(request_path) else {
        return (StatusCode::BAD_REQUEST, "invalid path").into_response();
    };

    // "/" → index.html, "/x.css" → x.css, "/compress-pdf" → compress-pdf.html
    let candidates = if relative.as_os_str().is_empty() {
        vec![PathBuf::from("index.html")]
    } else if relative.extension().is_some() {
        vec![relative.clone()]
    } else {
        vec![relative.with_extension("html"), relative.join("index.html")]
    };

    for candidate in candidates {
        let full = site_dir.join(&candidate);
        if let Ok(content) = tokio::fs::read(&full).await {
            let content_type = guess_content_type(&candidate);
            return (
                StatusCode::OK,
                [(header::CONTENT_TYPE, content_type)],
                content,
            )
                .into_response();
        }
    }

    (StatusCode::NOT_FOUND, "not found").into_response()
}

// Reject traversal and absolute components.
fn sanitize(request_path: &str) -> Option<PathBuf> {
    let path = Path::new(request_path);
    let mut clean = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Normal(part) => clean.push(part),
            Component::CurDir => {}
            _ => return None,
        }
    }
    Some(clean)
}

fn guess_content_type(path: &Path) -> &'static str {
    match path.extension().and_then(|e| e.to_str()) {
        Some("html") => "text/html; charset=utf-8",
        Some("js") => "application/javascript",
        Some("css") => "text/css",
        Some("json") => "application/json",
        Some("xml") => "application/xml",
        Some("txt") => "text/plain; charset=utf-8",
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("webp") => "image/webp",
        Some("svg") => "image/svg+xml",
        Some("ico") => "image/x-icon",
        Some("woff2") => "font/woff2",
        Some("wasm") => "application/wasm",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_rejects_traversal() {
        assert!(sanitize("../etc/passwd").is_none());
        assert!(sanitize("blog/../../etc").is_none());
        assert_eq!(
            sanitize("blog/how-to-compress-pdf"),
            Some(PathBuf::from("blog/how-to-compress-pdf"))
        );
        assert_eq!(sanitize(""), Some(PathBuf::new()));
    }

    #[test]
    fn content_types_cover_site_assets() {
        assert_eq!(
            guess_content_type(Path::new("compress-pdf.html")),
            "text/html; charset=utf-8"
        );
        assert_eq!(
            guess_content_type(Path::new("schema-inject.js")),
            "application/javascript"
        );
        assert_eq!(
            guess_content_type(Path::new("ffmpeg-core.wasm")),
            "application/wasm"
        );
    }

    #[tokio::test]
    async fn serves_slug_pages_and_health() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("index.html"), "<html>home</html>").unwrap();
        std::fs::write(
            dir.path().join("compress-pdf.html"),
            "<html>compress</html>",
        )
        .unwrap();

        let server = SiteServer::serve(dir.path()).await.unwrap();
        server.wait_healthy(Duration::from_secs(5)).await.unwrap();

        let base = server.base_url();
        let body = reqwest::get(format!("{base}/compress-pdf"))
            .await
            .unwrap()
            .text()
            .await
            .unwrap();
        assert!(body.contains("compress"));

        let home = reqwest::get(format!("{base}/")).await.unwrap();
        assert_eq!(home.status(), 200);

        let missing = reqwest::get(format!("{base}/nope")).await.unwrap();
        assert_eq!(missing.status(), 404);

        server.shutdown().await;
    }
}
