//! Behavior every flag shares: visibility, revert, single submit, ordering,
//! unmount safety.

use std::time::Duration;

use optimistic_rust::domain::{Post, PostReaction, PostSaved, Reaction};
use optimistic_rust::view::PostCard;
use optimistic_rust::{
    AppConfig, AppError, OptimisticStore, PendingPolicy, Phase, ReconcileConfig, Reconciliation,
    ResourceCache, StoreError, ToastBuffer,
};

use crate::support::{context, context_with, post, GatedRemote};

#[test]
fn initialize_is_deterministic() {
    let session = optimistic_rust::Session::for_viewer("viewer");
    let a = OptimisticStore::initialize(post(), PendingPolicy::Ignore);
    let b = OptimisticStore::initialize(post(), PendingPolicy::Ignore);

    let props_a = optimistic_rust::view::PostProps::from_store(&a, &session);
    let props_b = optimistic_rust::view::PostProps::from_store(&b, &session);
    assert_eq!(props_a, props_b);
    assert_eq!(props_a.reaction, None);
    assert_eq!(props_a.num_reacts, 10);
}

#[tokio::test]
async fn optimistic_value_visible_while_call_never_resolves() {
    let remote = GatedRemote::new();
    let toasts = ToastBuffer::new();
    let ctx = context(remote.clone(), &toasts);
    let card = PostCard::new(&ctx, post());

    let in_flight = ctx
        .reconciler()
        .begin::<PostReaction>(card.store(), Some(Reaction::Like))
        .unwrap();

    let props = card.props().unwrap();
    assert_eq!(props.reaction, Some(Reaction::Like));
    assert_eq!(props.num_reacts, 11);
    assert!(props.pending.reaction);

    tokio::select! {
        _ = in_flight.settle() => panic!("call should still be pending"),
        _ = async {
            remote.wait_for(1).await;
            tokio::time::sleep(Duration::from_millis(50)).await;
        } => {
            assert_eq!(remote.request(0).to_string(), "POST /posts/p1/reactions");
            assert_eq!(card.props().unwrap().reaction, Some(Reaction::Like));
            assert_eq!(
                card.store().phase::<PostReaction>().unwrap(),
                Phase::Confirming
            );
        }
    }
}

#[tokio::test]
async fn cancelled_settle_restores_flag_and_accepts_new_action() {
    let remote = GatedRemote::new();
    let toasts = ToastBuffer::new();
    let ctx = context(remote.clone(), &toasts);
    ctx.cache().put(&post()).unwrap();
    let card = PostCard::new(&ctx, post());

    let in_flight = ctx
        .reconciler()
        .begin::<PostSaved>(card.store(), true)
        .unwrap();
    let pending = tokio::time::timeout(Duration::from_millis(50), in_flight.settle()).await;
    assert!(pending.is_err(), "call should still be pending");
    assert_eq!(remote.received(), 1);

    let props = card.props().unwrap();
    assert!(!props.is_saved);
    assert!(!props.pending.saved);
    assert_eq!(props.error, None);
    assert_eq!(card.store().phase::<PostSaved>().unwrap(), Phase::Idle);
    assert!(toasts.snapshot().is_empty());
    // The write may have landed, so the next read refetches.
    assert!(ctx.cache().get::<Post>("p1").unwrap().is_stale());

    let (result, _) = tokio::join!(card.toggle_save(), async {
        remote.wait_for(2).await;
        remote.succeed(1);
    });
    assert!(matches!(result.unwrap(), Reconciliation::Confirmed { .. }));
    assert!(card.props().unwrap().is_saved);
}

#[tokio::test]
async fn unsent_action_dropped_restores_without_invalidating() {
    let remote = GatedRemote::new();
    let toasts = ToastBuffer::new();
    let ctx = context(remote.clone(), &toasts);
    ctx.cache().put(&post()).unwrap();
    let card = PostCard::new(&ctx, post());

    let in_flight = ctx
        .reconciler()
        .begin::<PostReaction>(card.store(), Some(Reaction::Love))
        .unwrap();
    assert_eq!(card.props().unwrap().num_reacts, 11);
    drop(in_flight);

    let props = card.props().unwrap();
    assert_eq!(props.reaction, None);
    assert_eq!(props.num_reacts, 10);
    assert_eq!(remote.received(), 0);
    assert!(ctx.cache().get::<Post>("p1").unwrap().is_fresh());
}

#[tokio::test]
async fn failed_write_reverts_and_records_error() {
    let remote = GatedRemote::new();
    let toasts = ToastBuffer::new();
    let ctx = context(remote.clone(), &toasts);
    let card = PostCard::new(&ctx, post());

    let (result, _) = tokio::join!(card.toggle_save(), async {
        remote.wait_for(1).await;
        assert!(card.props().unwrap().is_saved);
        remote.fail(0, "could not save post");
    });

    match result.unwrap() {
        Reconciliation::Reverted { flag, message, .. } => {
            assert_eq!(flag, "saved");
            assert_eq!(message, "could not save post");
        }
        other => panic!("expected revert, got {:?}", other),
    }

    let props = card.props().unwrap();
    assert!(!props.is_saved);
    assert!(!props.pending.saved);
    assert_eq!(props.error.as_deref(), Some("could not save post"));
    assert_eq!(toasts.errors().len(), 1);

    assert_eq!(
        card.dismiss_error().unwrap().as_deref(),
        Some("could not save post")
    );
    assert_eq!(card.props().unwrap().error, None);
}

#[tokio::test]
async fn second_trigger_while_pending_sends_nothing() {
    let remote = GatedRemote::new();
    let toasts = ToastBuffer::new();
    let ctx = context(remote.clone(), &toasts);
    let card = PostCard::new(&ctx, post());

    let (first, second) = tokio::join!(card.toggle_save(), async {
        remote.wait_for(1).await;
        let second = card.toggle_save().await;
        remote.succeed(0);
        second
    });

    assert!(matches!(first.unwrap(), Reconciliation::Confirmed { .. }));
    assert!(matches!(
        second,
        Err(AppError::Store(StoreError::MutationPending { flag: "saved", .. }))
    ));
    assert_eq!(remote.received(), 1);
    assert!(card.props().unwrap().is_saved);
}

#[tokio::test]
async fn setting_current_value_is_rejected() {
    let remote = GatedRemote::new();
    let toasts = ToastBuffer::new();
    let ctx = context(remote.clone(), &toasts);
    let card = PostCard::new(&ctx, post());

    let err = card.react(None).await.unwrap_err();
    assert!(matches!(err, AppError::Store(StoreError::Unchanged { .. })));
    assert_eq!(remote.received(), 0);
}

#[tokio::test]
async fn superseded_response_cannot_overwrite_newer_action() {
    let remote = GatedRemote::new();
    let toasts = ToastBuffer::new();
    let config = AppConfig {
        reconcile: ReconcileConfig::superseding(),
        ..AppConfig::default()
    };
    let ctx = context_with(remote.clone(), &toasts, config);
    ctx.cache().put(&post()).unwrap();
    let card = PostCard::new(&ctx, post());

    let reconciler = ctx.reconciler();
    let older = reconciler
        .begin::<PostReaction>(card.store(), Some(Reaction::Like))
        .unwrap();
    let newer = reconciler
        .begin::<PostReaction>(card.store(), Some(Reaction::Celebrate))
        .unwrap();
    assert_eq!(card.props().unwrap().reaction, Some(Reaction::Celebrate));
    assert_eq!(card.props().unwrap().num_reacts, 11);

    let (older, newer, _) = tokio::join!(older.settle(), newer.settle(), async {
        remote.wait_for(2).await;
        // Newer answers first, then the stale one fails.
        remote.succeed(1);
        remote.fail(0, "like failed");
    });

    assert!(matches!(newer.unwrap(), Reconciliation::Confirmed { .. }));
    assert!(matches!(
        older.unwrap(),
        Reconciliation::Superseded { flag: "reaction", generation: 1 }
    ));

    let props = card.props().unwrap();
    assert_eq!(props.reaction, Some(Reaction::Celebrate));
    assert_eq!(props.num_reacts, 11);
    assert_eq!(props.error, None);
    assert!(toasts.errors().is_empty());
    assert_eq!(remote.received(), 2);
}

#[tokio::test]
async fn late_older_success_does_not_change_display() {
    let remote = GatedRemote::new();
    let toasts = ToastBuffer::new();
    let config = AppConfig {
        reconcile: ReconcileConfig::superseding(),
        ..AppConfig::default()
    };
    let ctx = context_with(remote.clone(), &toasts, config);
    let card = PostCard::new(&ctx, post());

    let reconciler = ctx.reconciler();
    let save = reconciler.begin::<PostSaved>(card.store(), true).unwrap();
    let unsave = reconciler.begin::<PostSaved>(card.store(), false).unwrap();

    let (save, unsave, _) = tokio::join!(save.settle(), unsave.settle(), async {
        remote.wait_for(2).await;
        remote.succeed(1);
        remote.succeed(0);
    });

    assert!(matches!(unsave.unwrap(), Reconciliation::Confirmed { .. }));
    assert!(matches!(save.unwrap(), Reconciliation::Superseded { .. }));
    assert!(!card.props().unwrap().is_saved);
}

#[tokio::test]
async fn result_after_unmount_is_discarded() {
    let remote = GatedRemote::new();
    let toasts = ToastBuffer::new();
    let ctx = context(remote.clone(), &toasts);
    ctx.cache().put(&post()).unwrap();
    let card = PostCard::new(&ctx, post());

    let in_flight = ctx
        .reconciler()
        .begin::<PostSaved>(card.store(), true)
        .unwrap();
    card.unmount().unwrap();

    let (result, _) = tokio::join!(in_flight.settle(), async {
        remote.wait_for(1).await;
        remote.succeed(0);
    });

    assert_eq!(result.unwrap(), Reconciliation::Discarded);
    // The cache outlives the component, so the confirmed write still invalidates it.
    assert!(ctx.cache().get::<Post>("p1").unwrap().is_stale());
}

#[tokio::test]
async fn failure_after_unmount_shows_nothing() {
    let remote = GatedRemote::new();
    let toasts = ToastBuffer::new();
    let ctx = context(remote.clone(), &toasts);
    let card = PostCard::new(&ctx, post());

    let in_flight = ctx
        .reconciler()
        .begin::<PostSaved>(card.store(), true)
        .unwrap();
    drop(card);

    let (result, _) = tokio::join!(in_flight.settle(), async {
        remote.wait_for(1).await;
        remote.fail(0, "gone");
    });

    assert_eq!(result.unwrap(), Reconciliation::Discarded);
    assert!(toasts.snapshot().is_empty());
}

#[tokio::test]
async fn superseded_success_still_invalidates_cache() {
    let remote = GatedRemote::new();
    let toasts = ToastBuffer::new();
    let config = AppConfig {
        reconcile: ReconcileConfig::superseding(),
        ..AppConfig::default()
    };
    let ctx = context_with(remote.clone(), &toasts, config);
    ctx.cache().put(&post()).unwrap();
    let card = PostCard::new(&ctx, post());

    let reconciler = ctx.reconciler();
    let save = reconciler.begin::<PostSaved>(card.store(), true).unwrap();
    let unsave = reconciler.begin::<PostSaved>(card.store(), false).unwrap();

    let (save, unsave, _) = tokio::join!(save.settle(), unsave.settle(), async {
        remote.wait_for(2).await;
        remote.succeed(0);
        remote.fail(1, "could not unsave post");
    });

    assert!(matches!(save.unwrap(), Reconciliation::Superseded { .. }));
    assert!(matches!(unsave.unwrap(), Reconciliation::Reverted { .. }));
    assert_eq!(toasts.errors().len(), 1);
    assert!(ctx.cache().get::<Post>("p1").unwrap().is_stale());

    // The refetch reflects the write the server accepted.
    let server = Post {
        is_saved: true,
        ..post()
    };
    let (refreshed, _) = tokio::join!(card.refresh(), async {
        remote.wait_for(3).await;
        assert_eq!(remote.request(2).to_string(), "GET /posts/p1");
        remote.answer(2, Ok(serde_json::to_value(&server).unwrap()));
    });
    refreshed.unwrap();
    assert!(card.props().unwrap().is_saved);
}
