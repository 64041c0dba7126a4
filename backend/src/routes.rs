use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};

use crate::{auth, handlers, request_context, state::AppState};

/// Whole-request ceiling for the upload route: 20 files of 10 MiB plus
/// multipart framing.
const UPLOAD_BODY_LIMIT: usize = 220 * 1024 * 1024;

pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Health and the auth endpoints stay reachable without a token.
    let public = Router::new()
        .route("/api/health", get(handlers::health))
        .route("/api/auth/login", post(handlers::login))
        .route("/api/auth/check", get(handlers::auth_check));

    let protected = Router::new()
        .route("/api/activity", get(handlers::activity))
        .route("/api/stats", get(handlers::stats))
        .route("/api/trigger-stat", post(handlers::trigger_stat))
        .route("/api/recent-files", get(handlers::recent_files))
        .route("/api/workflow-status", post(handlers::workflow_status_update))
        .route("/api/workflow-status/:id", get(handlers::workflow_status_get))
        .route("/api/generate", post(handlers::generate))
        .route(
            "/api/upload",
            post(handlers::upload).layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT)),
        )
        .route("/api/sheet-preview", get(handlers::sheet_preview))
        .route("/api/sheet-data", get(handlers::sheet_data))
        .route("/api/storage-quota", get(handlers::storage_quota))
        .route("/api/products/list", get(handlers::products_list))
        .route("/api/product/:sku", get(handlers::product_detail))
        .route("/api/drive-image/:file_id", get(handlers::drive_image))
        .route("/api/comments/summary/:product_id", get(handlers::comments_summary))
        .route("/api/comments/invalidate/:product_id", post(handlers::comments_invalidate))
        .route("/api/comments/:product_id", get(handlers::comments_for_section))
        .route("/api/comments", post(handlers::comments_submit))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_bearer,
        ));

    public
        .merge(protected)
        .with_state(state)
        .layer(middleware::from_fn(request_context::request_context_middleware))
        .layer(cors)
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
    };
    use review_flow_shared::{CommentSummary, LoginResponse, SectionComments};
    use serde_json::json;
    use tower::ServiceExt;
    use wiremock::{
        matchers::{method, path_regex},
        Mock, MockServer, ResponseTemplate,
    };

    use super::*;
    use crate::config::{AppConfig, DriveConfig, SheetConfig};

    fn test_config(sheet_base: String, auth: bool) -> AppConfig {
        AppConfig {
            bind_addr: "127.0.0.1".to_string(),
            port: "0".to_string(),
            admin_password: auth.then(|| "admin-pw".to_string()),
            limited_password: None,
            jwt_secret: "test-secret".to_string(),
            sheet: SheetConfig {
                api_base: sheet_base,
                sheet_id: Some("sheet-1".to_string()),
                product_tab: "Output".to_string(),
                comments_tab: "Comments".to_string(),
                api_key: None,
            },
            drive: DriveConfig {
                api_base: "http://127.0.0.1:1".to_string(),
                upload_base: "http://127.0.0.1:1".to_string(),
                access_token: None,
                folder_id: None,
            },
            comments_webhook_url: None,
            generate_webhook_url: None,
            public_base_url: String::new(),
            http_timeout: Duration::from_secs(5),
        }
    }

    async fn mount_comment_rows(server: &MockServer, expected_calls: u64) {
        Mock::given(method("GET"))
            .and(path_regex(r"^/sheet-1/values/.*Comments.*"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "values": [
                    ["id", "product_id", "section", "current_text", "comment", "page_url", "time_stamp"],
                    ["1", "P1", "name", "Old", "hi", "http://x", "2024-01-01T00:00:00Z"],
                ]
            })))
            .expect(expected_calls)
            .mount(server)
            .await;
    }

    fn router(sheet_base: String, auth: bool) -> Router {
        let state = crate::state::AppState::new(test_config(sheet_base, auth)).expect("state");
        create_router(state)
    }

    async fn body_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        serde_json::from_slice(&bytes).expect("json body")
    }

    #[tokio::test]
    async fn summary_endpoint_serves_the_concrete_scenario() {
        let server = MockServer::start().await;
        mount_comment_rows(&server, 1).await;
        let app = router(server.uri(), false);

        let response = app
            .oneshot(
                Request::get("/api/comments/summary/P1")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);
        let summary: CommentSummary = body_json(response).await;
        assert_eq!(summary.product_id, "P1");
        assert_eq!(summary.counts.get("name"), Some(&1));
    }

    #[tokio::test]
    async fn section_listing_requires_the_section_parameter() {
        let server = MockServer::start().await;
        mount_comment_rows(&server, 1).await;
        let app = router(server.uri(), false);

        let response = app
            .clone()
            .oneshot(Request::get("/api/comments/P1").body(Body::empty()).expect("request"))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = app
            .oneshot(
                Request::get("/api/comments/P1?section=name")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);
        let items: SectionComments = body_json(response).await;
        assert_eq!(items.items.len(), 1);
        assert_eq!(items.items[0].comment, "hi");
    }

    #[tokio::test]
    async fn invalidation_forces_the_next_summary_upstream() {
        let server = MockServer::start().await;
        mount_comment_rows(&server, 2).await;
        let app = router(server.uri(), false);

        for _ in 0..2 {
            let response = app
                .clone()
                .oneshot(
                    Request::get("/api/comments/summary/P1")
                        .body(Body::empty())
                        .expect("request"),
                )
                .await
                .expect("response");
            assert_eq!(response.status(), StatusCode::OK);
        }

        // Two summary reads, one upstream fetch so far; invalidate and read
        // again: the mock expects exactly two fetches in total.
        let response = app
            .clone()
            .oneshot(
                Request::post("/api/comments/invalidate/P1")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .oneshot(
                Request::get("/api/comments/summary/P1")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn protected_routes_reject_missing_and_bad_tokens() {
        let server = MockServer::start().await;
        let app = router(server.uri(), true);

        let response = app
            .clone()
            .oneshot(Request::get("/api/activity").body(Body::empty()).expect("request"))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response = app
            .clone()
            .oneshot(
                Request::get("/api/activity")
                    .header(header::AUTHORIZATION, "Bearer not-a-token")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        // Health stays public even with auth enabled.
        let response = app
            .oneshot(Request::get("/api/health").body(Body::empty()).expect("request"))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn login_issues_a_token_that_unlocks_protected_routes() {
        let server = MockServer::start().await;
        let app = router(server.uri(), true);

        let response = app
            .clone()
            .oneshot(
                Request::post("/api/auth/login")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(r#"{"password":"admin-pw"}"#))
                    .expect("request"),
            )
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);
        let login: LoginResponse = body_json(response).await;
        assert_eq!(login.role, "admin");

        let response = app
            .oneshot(
                Request::get("/api/activity")
                    .header(header::AUTHORIZATION, format!("Bearer {}", login.token))
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);
    }
}
