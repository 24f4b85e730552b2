use {
    axum::{Router, routing::get},
    tokio_util::sync::CancellationToken,
    tracing::info,
};

/// Build the probe router (shared between production startup and tests).
pub fn build_app() -> Router {
    Router::new().route("/health", get(health_handler))
}

async fn health_handler() -> &'static str {
    "ok"
}

/// Bind and serve the probe until `cancel` fires.
pub async fn serve(bind: &str, port: u16, cancel: CancellationToken) -> anyhow::Result<()> {
    let addr = format!("{bind}:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(%addr, "health server listening");

    axum::serve(listener, build_app())
        .with_graceful_shutdown(async move { cancel.cancelled().await })
        .await?;

    info!("health server stopped");
    Ok(())
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {
        super::*,
        axum::{
            body::Body,
            http::{Request, StatusCode},
        },
        tower::ServiceExt,
    };

    #[tokio::test]
    async fn health_route_answers_ok() {
        let app = build_app();
        let response = app
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn unknown_route_is_not_found() {
        let app = build_app();
        let response = app
            .oneshot(Request::get("/nope").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn serve_shuts_down_on_cancel() {
        let cancel = CancellationToken::new();
        let cancel_clone = cancel.clone();
        let server = tokio::spawn(async move { serve("127.0.0.1", 0, cancel_clone).await });

        // Give the listener a moment to bind, then request shutdown.
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        cancel.cancel();

        let result = tokio::time::timeout(std::time::Duration::from_secs(5), server)
            .await
            .unwrap()
            .unwrap();
        assert!(result.is_ok());
    }
}
