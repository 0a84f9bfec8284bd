//! HTTP-level tests: routing, the actor conveyance, and the
//! error-to-status mapping the routers promise.

mod common {
    use std::sync::Arc;

    use placement_cell::board::{board_router, BoardService};
    use placement_cell::config::AcademicsConfig;
    use placement_cell::identity::{IdentityStore, Role, UserId};
    use placement_cell::settings::{MemorySettings, SettingsStore};
    use placement_cell::store::MemoryStore;

    pub(super) fn settings() -> Arc<dyn SettingsStore> {
        Arc::new(MemorySettings::seeded(&AcademicsConfig {
            academic_half: "odd".to_string(),
        }))
    }

    pub(super) fn superuser(store: &MemoryStore) -> UserId {
        let mut user = store.create_user("Priya".to_string(), "Nair".to_string(), Role::Staff);
        user.is_superuser = true;
        user.is_approved = true;
        store.save_user(user).expect("save admin").id
    }

    pub(super) fn plain_user(store: &MemoryStore) -> UserId {
        store
            .create_user("Asha".to_string(), "Verma".to_string(), Role::Student)
            .id
    }

    pub(super) fn board() -> (axum::Router, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        let service = Arc::new(BoardService::new(store.clone(), settings()));
        (board_router(service), store)
    }
}

mod board_endpoints {
    use super::common::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    #[tokio::test]
    async fn landing_page_serves_the_seeded_messages() {
        let (router, _store) = board();

        let response = router
            .oneshot(
                Request::builder()
                    .uri("/api/v1/landing")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("router dispatch");

        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("body");
        let payload: Value = serde_json::from_slice(&body).expect("json");
        assert!(payload.get("message_from_hod").is_some());
        assert!(payload.get("message_from_tpc_head").is_some());
        assert_eq!(payload.get("notices"), Some(&json!([])));
    }

    #[tokio::test]
    async fn unauthorized_notice_posting_maps_to_forbidden() {
        let (router, store) = board();
        let nobody = plain_user(&store);

        let response = router
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/v1/announcements")
                    .header("content-type", "application/json")
                    .body(Body::from(
                        json!({
                            "actor": nobody.0,
                            "title": "Unauthorized",
                            "body": "should bounce"
                        })
                        .to_string(),
                    ))
                    .expect("request"),
            )
            .await
            .expect("router dispatch");

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn blank_notices_map_to_unprocessable() {
        let (router, store) = board();
        let admin = superuser(&store);

        let response = router
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/v1/announcements")
                    .header("content-type", "application/json")
                    .body(Body::from(
                        json!({ "actor": admin.0, "title": "", "body": "" }).to_string(),
                    ))
                    .expect("request"),
            )
            .await
            .expect("router dispatch");

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body = to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("body");
        let payload: Value = serde_json::from_slice(&body).expect("json");
        let fields = payload
            .get("fields")
            .and_then(|fields| fields.as_array())
            .expect("field list");
        // Both blanks are reported in one round trip.
        assert_eq!(fields.len(), 2);
    }

    #[tokio::test]
    async fn missing_announcements_map_to_not_found() {
        let (router, store) = board();
        let admin = superuser(&store);

        let response = router
            .oneshot(
                Request::builder()
                    .method("DELETE")
                    .uri(format!("/api/v1/announcements/999?actor={}", admin.0))
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("router dispatch");

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn the_contact_form_is_open_to_the_public() {
        let (router, store) = board();
        let admin = superuser(&store);

        let submit = router
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/v1/contact")
                    .header("content-type", "application/json")
                    .body(Body::from(
                        json!({
                            "name": "Recruiting Lead",
                            "designation": "HR",
                            "company": "Nimbus Labs",
                            "phone": "9876543210",
                            "email": "hr@nimbus.example",
                            "message": "We would like to visit campus."
                        })
                        .to_string(),
                    ))
                    .expect("request"),
            )
            .await
            .expect("router dispatch");
        assert_eq!(submit.status(), StatusCode::CREATED);

        let inbox = router
            .oneshot(
                Request::builder()
                    .uri(format!("/api/v1/contact?actor={}", admin.0))
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("router dispatch");
        assert_eq!(inbox.status(), StatusCode::OK);
        let body = to_bytes(inbox.into_body(), 1024 * 1024)
            .await
            .expect("body");
        let payload: Value = serde_json::from_slice(&body).expect("json");
        assert_eq!(payload.as_array().map(|rows| rows.len()), Some(1));
    }
}
