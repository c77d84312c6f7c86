//! Container loading, props and viewer-dependent fields.

use optimistic_rust::domain::{Company, Job, Post};
use optimistic_rust::view::{CompanyHeader, JobCard, PostCard};
use optimistic_rust::{
    AppContext, AppError, ErrorKind, InMemoryRemote, InMemoryResourceCache, Method, RemoteError,
    ResourceCache, Session, ToastBuffer,
};
use serde_json::json;
use std::sync::Arc;

use crate::support::{context, init_logger, post};

#[tokio::test]
async fn load_fetches_once_then_serves_cache() {
    let remote = InMemoryRemote::new().route(Method::Get, "/posts/p1", |_| {
        Ok(json!({ "id": "p1", "authorId": "viewer", "numReacts": 3 }))
    });
    let toasts = ToastBuffer::new();
    let ctx = context(remote.clone(), &toasts);

    let card = PostCard::load(&ctx, "p1").await.unwrap().unwrap();
    let props = card.props().unwrap();
    assert_eq!(props.num_reacts, 3);
    assert!(props.viewer_is_author);

    let again = PostCard::load(&ctx, "p1").await.unwrap().unwrap();
    assert_eq!(again.props().unwrap().post.id, "p1");
    assert_eq!(remote.call_count(Method::Get, "/posts/p1"), 1);
}

#[tokio::test]
async fn failed_load_is_a_fetch_error_until_retried() {
    let remote = InMemoryRemote::new().route(Method::Get, "/jobs/j1", |_| {
        Err(RemoteError::with_status(500, "jobs service down"))
    });
    let toasts = ToastBuffer::new();
    let ctx = context(remote.clone(), &toasts);

    let err = JobCard::load(&ctx, "j1").await.err().unwrap();
    assert_eq!(err.kind(), ErrorKind::Fetch);
    assert_eq!(err.status_code(), 500);

    // Recorded failure: no automatic refetch.
    let err = JobCard::load(&ctx, "j1").await.err().unwrap();
    assert_eq!(err.kind(), ErrorKind::Fetch);
    assert_eq!(remote.call_count(Method::Get, "/jobs/j1"), 1);

    let retried = ctx.query().retry::<Job>("j1").await;
    assert!(retried.is_failed());
    assert_eq!(remote.call_count(Method::Get, "/jobs/j1"), 2);
}

#[tokio::test]
async fn job_apply_and_withdraw() {
    let remote = InMemoryRemote::new()
        .route(Method::Post, "/jobs/apply", |_| Ok(json!({ "ok": true })))
        .route(Method::Delete, "/jobs/j1/apply", |_| {
            Err(RemoteError::with_status(409, "application already reviewed"))
        });
    let toasts = ToastBuffer::new();
    let ctx = context(remote.clone(), &toasts);
    let card = JobCard::new(&ctx, Job::new("j1", "acme"));

    card.apply().await.unwrap();
    let props = card.props().unwrap();
    assert!(props.is_applied);
    assert_eq!(props.num_applicants, 1);
    assert!(!props.viewer_is_poster);

    card.withdraw().await.unwrap();
    let props = card.props().unwrap();
    assert!(props.is_applied);
    assert_eq!(props.num_applicants, 1);
    assert_eq!(props.error.as_deref(), Some("application already reviewed"));
    assert_eq!(toasts.errors().len(), 1);
}

#[tokio::test]
async fn reporting_reverts_on_error_too() {
    let remote = InMemoryRemote::new().route(Method::Post, "/jobs/j1/report", |_| {
        Err(RemoteError::with_status(500, "report failed"))
    });
    let toasts = ToastBuffer::new();
    let ctx = context(remote, &toasts);
    let card = JobCard::new(&ctx, Job::new("j1", "acme"));

    card.toggle_report().await.unwrap();
    assert!(!card.props().unwrap().is_reported);
}

#[tokio::test]
async fn owner_sees_owner_props() {
    init_logger();
    let toasts = ToastBuffer::new();
    let ctx = AppContext::new(
        Session::for_viewer("u7"),
        InMemoryResourceCache::new(),
        InMemoryRemote::new(),
        Arc::new(toasts),
    );

    let company = Company {
        owner_id: Some("u7".into()),
        ..Company::new("acme", "Acme")
    };
    assert!(CompanyHeader::new(&ctx, company).props().unwrap().viewer_is_owner);

    let job = Job {
        poster_id: Some("someone-else".into()),
        ..Job::new("j1", "acme")
    };
    assert!(!JobCard::new(&ctx, job).props().unwrap().viewer_is_poster);
}

#[tokio::test]
async fn only_author_deletes_post() {
    let remote = InMemoryRemote::new().route(Method::Delete, "/posts/p1", |_| Ok(json!({})));
    let toasts = ToastBuffer::new();
    let ctx = context(remote.clone(), &toasts);

    let foreign = PostCard::new(&ctx, post());
    let err = foreign.delete().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert_eq!(remote.calls().len(), 0);

    let own = Post::new("p1", "viewer");
    ctx.cache().put(&own).unwrap();
    let card = PostCard::new(&ctx, own);
    card.delete().await.unwrap();
    assert!(ctx.cache().get::<Post>("p1").unwrap().snapshot().is_none());
    assert!(matches!(card.toggle_save().await, Err(AppError::Store(_))));
}

#[tokio::test]
async fn following_author_invalidates_their_other_posts() {
    let remote = InMemoryRemote::new().route(Method::Post, "/users/author/follow", |_| {
        Ok(json!({ "ok": true }))
    });
    let toasts = ToastBuffer::new();
    let ctx = context(remote.clone(), &toasts);
    let other = Post::new("p2", "author");
    ctx.cache().put(&post()).unwrap();
    ctx.cache().put(&other).unwrap();
    ctx.cache().put(&Company::new("c1", "Acme")).unwrap();

    let card = PostCard::new(&ctx, post());
    card.toggle_follow_author().await.unwrap();

    assert!(card.props().unwrap().post.is_author_followed);
    assert!(ctx.cache().get::<Post>("p1").unwrap().is_stale());
    assert!(ctx.cache().get::<Post>("p2").unwrap().is_stale());
    assert!(ctx.cache().get::<Company>("c1").unwrap().is_fresh());
    assert_eq!(remote.call_count(Method::Post, "/users/author/follow"), 1);
}
