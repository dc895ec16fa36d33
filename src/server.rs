use axum::{routing::get, Router};
use tower_http::trace::TraceLayer;

pub const DEFAULT_PORT: u16 = 33507;

async fn hello() -> &'static str {
    "Hello World!"
}

pub fn router() -> Router {
    Router::new()
        .route("/", get(hello))
        .layer(TraceLayer::new_for_http())
}

/// Serve the greeting route until the process is stopped.
pub async fn run_server(host: &str, port: u16) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(format!("{host}:{port}")).await?;
    tracing::info!("Server listening on http://{}:{}", host, port);
    axum::serve(listener, router()).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    #[tokio::test]
    async fn root_says_hello() {
        let response = router()
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"Hello World!");
    }

    #[tokio::test]
    async fn other_paths_are_not_found() {
        let response = router()
            .oneshot(Request::builder().uri("/plot").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
