//! HTTP transport integration tests.
//!
//! Starts an axum server and drives containers through `HttpRemote`.

#![cfg(feature = "http")]

use std::sync::Arc;

use axum::extract::Path;
use axum::http::StatusCode;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde_json::{json, Value};

use optimistic_rust::domain::Company;
use optimistic_rust::forms::ProfileForm;
use optimistic_rust::view::CompanyHeader;
use optimistic_rust::{
    submit, AppContext, ClientConfig, HttpRemote, InMemoryResourceCache, Method, Reconciliation,
    Remote, RemoteRequest, ResourceCache, Session, ToastBuffer,
};

fn app() -> Router {
    Router::new()
        .route(
            "/company/:id",
            get(|Path(id): Path<String>| async move {
                Json(json!({ "id": id, "name": "Acme", "numFollowers": 5, "isFollowed": false }))
            }),
        )
        .route(
            "/company/:id/follow",
            post(|| async { Json(json!({ "ok": true })) }).delete(|| async {
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    Json(json!({ "error": "unfollow is unavailable" })),
                )
            }),
        )
        .route(
            "/profile",
            put(|Json(body): Json<Value>| async move { Json(body) }),
        )
}

/// Bind to port 0 and return the actual address.
async fn start_server() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app()).await.unwrap();
    });
    format!("http://{addr}")
}

fn context(base: &str, toasts: &ToastBuffer) -> AppContext<InMemoryResourceCache, HttpRemote> {
    let _ = env_logger::builder().is_test(true).try_init();
    let config = ClientConfig {
        base_url: base.to_string(),
        timeout_ms: 5_000,
    };
    AppContext::new(
        Session::for_viewer("u1"),
        InMemoryResourceCache::new(),
        HttpRemote::from_config(&config).unwrap(),
        Arc::new(toasts.clone()),
    )
}

#[tokio::test]
async fn follow_then_failed_unfollow() {
    let base = start_server().await;
    let toasts = ToastBuffer::new();
    let ctx = context(&base, &toasts);

    let header = CompanyHeader::load(&ctx, "acme").await.unwrap().unwrap();
    assert_eq!(header.props().unwrap().num_followers, 5);

    let followed = header.follow().await.unwrap();
    assert!(matches!(followed, Reconciliation::Confirmed { .. }));
    assert!(ctx.cache().get::<Company>("acme").unwrap().is_stale());
    assert_eq!(header.props().unwrap().num_followers, 6);

    let unfollowed = header.unfollow().await.unwrap();
    let Reconciliation::Reverted { message, .. } = &unfollowed else {
        panic!("expected revert, got {:?}", unfollowed);
    };
    assert_eq!(message, "unfollow is unavailable");

    let props = header.props().unwrap();
    assert!(props.is_followed);
    assert_eq!(props.num_followers, 6);
    assert_eq!(toasts.errors().len(), 1);
}

#[tokio::test]
async fn unknown_route_reports_status() {
    let base = start_server().await;
    let remote = HttpRemote::new(base);

    let err = remote
        .call(&RemoteRequest::new(Method::Get, "/missing"))
        .await
        .unwrap_err();
    assert_eq!(err.status, Some(404));
}

#[tokio::test]
async fn form_body_is_sent_as_json() {
    let base = start_server().await;
    let toasts = ToastBuffer::new();
    let ctx = context(&base, &toasts);

    let form = ProfileForm {
        user_id: "u1".into(),
        first_name: "Ada".into(),
        last_name: "Lovelace".into(),
        headline: "Analyst".into(),
        ..Default::default()
    };
    let echoed = submit(&form, ctx.remote(), ctx.cache()).await.unwrap();
    assert_eq!(echoed["firstName"], "Ada");
    assert_eq!(echoed["headline"], "Analyst");
}
