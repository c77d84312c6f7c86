//! Integration tests for form validation and submission.

use std::sync::Once;

use optimistic_rust::domain::{Company, Job, Profile};
use optimistic_rust::forms::{CompanyForm, JobApplicationForm, ProfileForm};
use optimistic_rust::{
    submit, AppError, ErrorKind, FormError, InMemoryRemote, InMemoryResourceCache, Method,
    RemoteError, ResourceCache,
};
use serde_json::json;

static INIT: Once = Once::new();

fn init_logger() {
    INIT.call_once(|| {
        let _ = env_logger::builder().is_test(true).try_init();
    });
}

fn application() -> JobApplicationForm {
    JobApplicationForm {
        job_id: "j1".into(),
        full_name: "Ada Lovelace".into(),
        email: "ada@example.com".into(),
        phone: "+44 20 7946 0958".into(),
        ..Default::default()
    }
}

#[tokio::test]
async fn invalid_form_is_never_sent() {
    init_logger();
    let remote = InMemoryRemote::new().fallback(|_| Ok(json!({})));
    let cache = InMemoryResourceCache::new();

    let form = JobApplicationForm {
        email: "ada@".into(),
        ..application()
    };
    let err = submit(&form, &remote, &cache).await.unwrap_err();

    let FormError::Invalid(errors) = &err else {
        panic!("expected validation error, got {:?}", err);
    };
    assert_eq!(errors.for_field("email"), vec!["must be a valid email address"]);
    assert!(remote.calls().is_empty());
    assert_eq!(AppError::from(err).kind(), ErrorKind::Validation);
}

#[tokio::test]
async fn application_submits_and_invalidates_job() {
    init_logger();
    let remote =
        InMemoryRemote::new().route(Method::Post, "/jobs/apply", |_| Ok(json!({ "id": "a1" })));
    let cache = InMemoryResourceCache::new();
    cache.put(&Job::new("j1", "acme")).unwrap();

    let body = submit(&application(), &remote, &cache).await.unwrap();
    assert_eq!(body["id"], "a1");

    let sent = &remote.calls()[0];
    let payload = sent.payload.as_ref().unwrap();
    assert_eq!(payload["jobId"], "j1");
    assert_eq!(payload["email"], "ada@example.com");
    assert!(cache.get::<Job>("j1").unwrap().is_stale());
}

#[tokio::test]
async fn server_rejection_keeps_cache_fresh() {
    init_logger();
    let remote = InMemoryRemote::new().route(Method::Put, "/company/acme", |_| {
        Err(RemoteError::with_status(422, "name already taken"))
    });
    let cache = InMemoryResourceCache::new();
    cache.put(&Company::new("acme", "Acme")).unwrap();

    let form = CompanyForm {
        id: Some("acme".into()),
        name: "Acme Corp".into(),
        industry: "Manufacturing".into(),
        ..Default::default()
    };
    let err = submit(&form, &remote, &cache).await.unwrap_err();

    let FormError::Mutation(mutation) = &err else {
        panic!("expected mutation error, got {:?}", err);
    };
    assert_eq!(mutation.status(), Some(422));
    assert_eq!(mutation.user_message(), "name already taken");
    assert!(cache.get::<Company>("acme").unwrap().is_fresh());

    let app_err = AppError::from(err);
    assert_eq!(app_err.kind(), ErrorKind::Mutation);
    assert_eq!(app_err.status_code(), 422);
}

#[tokio::test]
async fn profile_edit_puts_and_invalidates_profile() {
    init_logger();
    let remote = InMemoryRemote::new().route(Method::Put, "/profile", |_| Ok(json!({})));
    let cache = InMemoryResourceCache::new();
    let profile = Profile {
        id: "u1".into(),
        first_name: "Ada".into(),
        last_name: "Lovelace".into(),
        ..Default::default()
    };
    cache.put(&profile).unwrap();

    let form = ProfileForm {
        headline: "Analyst".into(),
        ..ProfileForm::from_profile(&profile)
    };
    submit(&form, &remote, &cache).await.unwrap();

    assert_eq!(remote.call_count(Method::Put, "/profile"), 1);
    assert_eq!(remote.calls()[0].payload.as_ref().unwrap()["headline"], "Analyst");
    assert!(cache.get::<Profile>("u1").unwrap().is_stale());
}
