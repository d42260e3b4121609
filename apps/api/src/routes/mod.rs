pub mod health;

use axum::{
    routing::{delete, get, patch, post, put},
    Router,
};

use crate::optimizer::handlers as optimizer_handlers;
use crate::session::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Sessions
        .route("/api/v1/sessions", post(handlers::handle_create_session))
        .route(
            "/api/v1/sessions/:id",
            get(handlers::handle_get_session).delete(handlers::handle_delete_session),
        )
        // Blocks
        .route(
            "/api/v1/sessions/:id/blocks",
            put(handlers::handle_replace_blocks).post(handlers::handle_insert_block),
        )
        .route(
            "/api/v1/sessions/:id/blocks/:block_id",
            delete(handlers::handle_delete_block),
        )
        .route(
            "/api/v1/sessions/:id/blocks/:block_id/content",
            put(handlers::handle_update_content),
        )
        .route(
            "/api/v1/sessions/:id/blocks/:block_id/promote",
            post(handlers::handle_promote_block),
        )
        .route(
            "/api/v1/sessions/:id/blocks/:block_id/optimize",
            post(handlers::handle_optimize_block),
        )
        .route("/api/v1/sessions/:id/reorder", post(handlers::handle_reorder))
        // Rendering and record
        .route("/api/v1/sessions/:id/preview", get(handlers::handle_preview))
        .route(
            "/api/v1/sessions/:id/resume",
            patch(handlers::handle_update_field),
        )
        .route(
            "/api/v1/sessions/:id/notifications",
            get(handlers::handle_drain_notifications),
        )
        // Standalone optimizer proxy
        .route("/api/v1/optimize", post(optimizer_handlers::handle_optimize))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::{to_bytes, Body},
        http::{Method, Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::config::Config;
    use crate::optimizer::test_support::StubOptimizer;
    use crate::session::SessionStore;

    fn app() -> Router {
        build_router(AppState {
            sessions: SessionStore::new(),
            optimizer: Arc::new(StubOptimizer),
            config: Config::default(),
        })
    }

    async fn call(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    async fn create_session(app: &Router) -> String {
        let (status, body) = call(app, Method::POST, "/api/v1/sessions", None).await;
        assert_eq!(status, StatusCode::CREATED);
        body["id"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn test_health() {
        let (status, body) = call(&app(), Method::GET, "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["service"], "resume-editor-api");
        assert_eq!(body["optimizerConfigured"], json!(false));
    }

    #[tokio::test]
    async fn test_session_snapshot_shape() {
        let app = app();
        let id = create_session(&app).await;
        let (status, body) = call(&app, Method::GET, &format!("/api/v1/sessions/{id}"), None).await;
        assert_eq!(status, StatusCode::OK);

        let first = &body["blocks"][0];
        assert_eq!(first["id"], "heading-personal");
        assert_eq!(first["type"], "heading");
        assert_eq!(first["parentId"], Value::Null);
        assert_eq!(first["pending"], json!(false));
        assert_eq!(body["groups"][0]["children"][0]["parentId"], "heading-personal");
        assert_eq!(body["resume"]["userInfo"]["firstName"], "Alex");
    }

    #[tokio::test]
    async fn test_unknown_session_is_404() {
        let uri = format!("/api/v1/sessions/{}", uuid::Uuid::new_v4());
        let (status, body) = call(&app(), Method::GET, &uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_delete_session() {
        let app = app();
        let id = create_session(&app).await;
        let uri = format!("/api/v1/sessions/{id}");

        let (status, _) = call(&app, Method::DELETE, &uri, None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        let (status, _) = call(&app, Method::GET, &uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (status, _) = call(&app, Method::DELETE, &uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_insert_and_update_content() {
        let app = app();
        let id = create_session(&app).await;

        let (status, body) = call(
            &app,
            Method::POST,
            &format!("/api/v1/sessions/{id}/blocks"),
            Some(json!({ "anchorId": "heading-skills", "type": "two-column" })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let block_id = body["blockId"].as_str().unwrap().to_string();

        let (status, _) = call(
            &app,
            Method::PUT,
            &format!("/api/v1/sessions/{id}/blocks/{block_id}/content"),
            Some(json!({ "content": ["<p>a</p>", "<p>b</p>", "<p>c</p>"] })),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

        let (status, body) = call(
            &app,
            Method::PUT,
            &format!("/api/v1/sessions/{id}/blocks/{block_id}/content"),
            Some(json!({ "content": ["<p>a</p>", "<p>b</p>"] })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let inserted = body["blocks"]
            .as_array()
            .unwrap()
            .iter()
            .find(|b| b["id"] == block_id.as_str())
            .unwrap();
        assert_eq!(inserted["parentId"], "heading-skills");
        assert_eq!(inserted["content"], json!(["<p>a</p>", "<p>b</p>"]));
    }

    #[tokio::test]
    async fn test_delete_heading_requires_cascade() {
        let app = app();
        let id = create_session(&app).await;
        let uri = format!("/api/v1/sessions/{id}/blocks/heading-work");

        let (status, body) = call(&app, Method::DELETE, &uri, None).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"]["code"], "HAS_CHILDREN");
        assert_eq!(body["error"]["children"], json!(2));

        let (status, body) = call(&app, Method::DELETE, &format!("{uri}?cascade=true"), None).await;
        assert_eq!(status, StatusCode::OK);
        let ids: Vec<&str> = body["blocks"]
            .as_array()
            .unwrap()
            .iter()
            .filter_map(|b| b["id"].as_str())
            .collect();
        assert!(!ids.contains(&"heading-work"));
        assert!(!ids.contains(&"work-0"));
    }

    #[tokio::test]
    async fn test_reorder_out_of_scope_is_422() {
        let app = app();
        let id = create_session(&app).await;
        let (status, _) = call(
            &app,
            Method::POST,
            &format!("/api/v1/sessions/{id}/reorder"),
            Some(json!({
                "sourceId": "work-0",
                "targetId": "skills",
                "scope": { "kind": "children", "headingId": "heading-work" }
            })),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

        let (status, body) = call(
            &app,
            Method::POST,
            &format!("/api/v1/sessions/{id}/reorder"),
            Some(json!({
                "sourceId": "work-0",
                "targetId": "work-0-detail",
                "scope": { "kind": "children", "headingId": "heading-work" }
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let work = body["groups"]
            .as_array()
            .unwrap()
            .iter()
            .find(|g| g["heading"]["id"] == "heading-work")
            .unwrap();
        assert_eq!(work["children"][0]["id"], "work-0-detail");
        assert_eq!(work["children"][1]["id"], "work-0");
    }

    #[tokio::test]
    async fn test_update_field_reflected_in_preview() {
        let app = app();
        let id = create_session(&app).await;

        let (status, body) = call(
            &app,
            Method::PATCH,
            &format!("/api/v1/sessions/{id}/resume"),
            Some(json!({ "path": "userInfo.lastName", "value": "Park" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["userInfo"]["lastName"], "Park");

        let (_, preview) = call(&app, Method::GET, &format!("/api/v1/sessions/{id}/preview"), None).await;
        assert_eq!(preview["groups"][0]["heading"]["content"], "<h1>Alex Park</h1>");

        let (status, _) = call(
            &app,
            Method::PATCH,
            &format!("/api/v1/sessions/{id}/resume"),
            Some(json!({ "path": "userInfo.nickname", "value": "AP" })),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_optimize_block_accepted() {
        let app = app();
        let id = create_session(&app).await;

        let (status, body) = call(
            &app,
            Method::POST,
            &format!("/api/v1/sessions/{id}/blocks/user-headline/optimize"),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::ACCEPTED);
        assert_eq!(body["pending"], json!(true));

        let (status, _) = call(
            &app,
            Method::POST,
            &format!("/api/v1/sessions/{id}/blocks/work-0/optimize"),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_standalone_optimize() {
        let (status, body) = call(
            &app(),
            Method::POST,
            "/api/v1/optimize",
            Some(json!({ "text": "led a team" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["optimizedText"], "LED A TEAM");

        let (status, _) = call(
            &app(),
            Method::POST,
            "/api/v1/optimize",
            Some(json!({ "text": "fail" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
    }
}
