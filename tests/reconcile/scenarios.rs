//! End-to-end walkthroughs of a reaction and a company follow.

use std::sync::{mpsc, Mutex};
use std::time::Duration;

use optimistic_rust::domain::{Company, CompanyFollowed, PostReaction, Reaction};
use optimistic_rust::view::{CompanyHeader, PostCard};
use optimistic_rust::{
    CacheEventKind, InMemoryRemote, Method, Reconciliation, RemoteError, Resource,
    ResourceCache, ResourceKey, ToastBuffer,
};
use serde_json::json;

use crate::support::{context, post};

#[tokio::test]
async fn like_then_network_rejects() {
    let remote = InMemoryRemote::new().route(Method::Post, "/posts/p1/reactions", |_| {
        Err(RemoteError::with_status(503, "reactions are unavailable"))
    });
    let toasts = ToastBuffer::new();
    let ctx = context(remote.clone(), &toasts);
    let card = PostCard::new(&ctx, post());

    let in_flight = ctx
        .reconciler()
        .begin::<PostReaction>(card.store(), Some(Reaction::Like))
        .unwrap();
    let immediate = card.props().unwrap();
    assert_eq!(immediate.reaction, Some(Reaction::Like));
    assert_eq!(immediate.num_reacts, 11);

    let result = in_flight.settle().await.unwrap();
    assert!(matches!(result, Reconciliation::Reverted { .. }));

    let settled = card.props().unwrap();
    assert_eq!(settled.reaction, None);
    assert_eq!(settled.num_reacts, 10);

    let errors = toasts.drain();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].message, "reactions are unavailable");
    assert_eq!(
        remote.calls()[0].payload,
        Some(json!({ "reaction": "Like" }))
    );
}

#[tokio::test]
async fn follow_company_invalidates_its_key() {
    let remote = InMemoryRemote::new().route(Method::Post, "/company/acme/follow", |_| {
        Ok(json!({ "ok": true }))
    });
    let toasts = ToastBuffer::new();
    let ctx = context(remote.clone(), &toasts);

    let company = Company {
        num_followers: 5,
        ..Company::new("acme", "Acme")
    };
    ctx.cache().put(&company).unwrap();

    let (tx, rx) = mpsc::channel();
    let tx = Mutex::new(tx);
    ctx.cache()
        .subscribe(&company.key(), move |event| {
            if let Ok(tx) = tx.lock() {
                let _ = tx.send(event);
            }
        })
        .unwrap();

    let header = CompanyHeader::new(&ctx, company);
    let in_flight = ctx
        .reconciler()
        .begin::<CompanyFollowed>(header.store(), true)
        .unwrap();

    let immediate = header.props().unwrap();
    assert!(immediate.is_followed);
    assert_eq!(immediate.num_followers, 6);
    assert!(immediate.is_follow_pending);

    let result = in_flight.settle().await.unwrap();
    assert_eq!(
        result,
        Reconciliation::Confirmed {
            key: ResourceKey::new("company", "acme")
        }
    );

    let event = rx.recv_timeout(Duration::from_secs(1)).unwrap();
    assert_eq!(event.key, ResourceKey::new("company", "acme"));
    assert_eq!(event.kind, CacheEventKind::Invalidated);
    assert!(ctx.cache().get::<Company>("acme").unwrap().is_stale());

    let settled = header.props().unwrap();
    assert!(settled.is_followed);
    assert_eq!(settled.num_followers, 6);
    assert!(!settled.is_follow_pending);
    assert!(toasts.snapshot().is_empty());
}

#[tokio::test]
async fn refetch_after_confirmed_follow_takes_server_values() {
    let remote = InMemoryRemote::new()
        .route(Method::Post, "/company/acme/follow", |_| Ok(json!({})))
        .route(Method::Get, "/company/acme", |_| {
            Ok(json!({
                "id": "acme",
                "name": "Acme",
                "numFollowers": 120,
                "isFollowed": true
            }))
        });
    let toasts = ToastBuffer::new();
    let ctx = context(remote.clone(), &toasts);
    let company = Company {
        num_followers: 5,
        ..Company::new("acme", "Acme")
    };
    ctx.cache().put(&company).unwrap();

    let header = CompanyHeader::new(&ctx, company);
    header.follow().await.unwrap();
    header.refresh().await.unwrap();

    let props = header.props().unwrap();
    assert!(props.is_followed);
    assert_eq!(props.num_followers, 120);
    assert!(ctx.cache().get::<Company>("acme").unwrap().is_fresh());
    assert_eq!(remote.call_count(Method::Get, "/company/acme"), 1);
}
