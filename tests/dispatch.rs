//! Dispatch pipeline behavior: policy ordering, short-circuits, fallback and
//! the route-matching race.

use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use axum::http::StatusCode;
use tokio::time::Instant;

use policy_gateway::{
    apply_request_policies, apply_response_policies, FixedOrigin, Gateway, Matcher, Origin,
    PolicyResult, RequestPolicy, ResponsePolicy, Response, Route,
};

mod common;
use common::{get, CountingOrigin, DelayedMatcher, Deny, Journal, TrailRequest, TrailResponse};

fn trail_req(name: &str, journal: &Journal) -> Arc<dyn RequestPolicy> {
    Arc::new(TrailRequest {
        name: name.to_string(),
        journal: journal.clone(),
    })
}

fn trail_resp(name: &str, journal: &Journal) -> Arc<dyn ResponsePolicy> {
    Arc::new(TrailResponse {
        name: name.to_string(),
        journal: journal.clone(),
    })
}

fn fixed(status: StatusCode, body: &'static str) -> Arc<dyn Origin> {
    Arc::new(FixedOrigin::with_status(status, body))
}

#[tokio::test]
async fn test_end_to_end_prefix_route_and_default() {
    let gateway: Gateway = Gateway::builder()
        .route(Route::new("/api", fixed(StatusCode::OK, "api")).named("api"))
        .default_origin(fixed(StatusCode::NOT_FOUND, "not found"))
        .build()
        .unwrap();

    let resp = gateway.handle(&get("/api/x"), &()).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.text(), "api");

    let resp = gateway.handle(&get("/other"), &()).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(resp.text(), "not found");
}

#[tokio::test]
async fn test_caller_request_is_untouched() {
    let journal = Journal::default();
    let gateway: Gateway = Gateway::builder()
        .route(Route::new("/", fixed(StatusCode::OK, "ok")).with_request_policy(trail_req("local", &journal)))
        .request_policy(trail_req("global", &journal))
        .default_origin(fixed(StatusCode::NOT_FOUND, "not found"))
        .build()
        .unwrap();

    let mut request = get("/orders").with_body("payload");
    request.properties_mut().insert("tenant", String::from("acme"));
    let before = format!("{:?}", request);

    gateway.handle(&request, &()).await.unwrap();

    assert_eq!(format!("{:?}", request), before);
    assert!(request.headers().get("x-trail").is_none());
    assert_eq!(request.body().as_ref(), b"payload");
    assert_eq!(journal.entries(), vec!["req:global", "req:local"]);
}

#[tokio::test]
async fn test_short_circuit_skips_rest_of_chain() {
    let journal = Journal::default();
    let chain: Vec<Arc<dyn RequestPolicy>> = vec![
        trail_req("first", &journal),
        Arc::new(Deny {
            status: StatusCode::FORBIDDEN,
            body: "denied",
        }),
        trail_req("third", &journal),
    ];

    let result = apply_request_policies(get("/"), &(), &chain).await.unwrap();
    let response = result.into_response().expect("short-circuit response");
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(journal.entries(), vec!["req:first"]);
}

#[tokio::test]
async fn test_global_short_circuit_skips_routing_but_runs_response_chain() {
    let journal = Journal::default();
    let matcher = Arc::new(DelayedMatcher::new(Duration::ZERO, true));
    let origin = Arc::new(CountingOrigin::new("route"));
    let default = Arc::new(CountingOrigin::new("default"));

    let gateway: Gateway = Gateway::builder()
        .route(Route::new(matcher.clone() as Arc<dyn Matcher>, origin.clone() as Arc<dyn Origin>))
        .request_policy(Arc::new(Deny {
            status: StatusCode::UNAUTHORIZED,
            body: "no",
        }))
        .response_policy(trail_resp("global", &journal))
        .default_origin(default.clone() as Arc<dyn Origin>)
        .build()
        .unwrap();

    let resp = gateway.handle(&get("/"), &()).await.unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(resp.headers()["x-trail"], "global");
    assert_eq!(matcher.calls.load(Ordering::SeqCst), 0);
    assert_eq!(origin.calls.load(Ordering::SeqCst), 0);
    assert_eq!(default.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_empty_chains_are_identity() {
    let request = get("/same").with_body("body");
    let result = apply_request_policies(request.clone(), &(), &[]).await.unwrap();
    let out = result.into_request().expect("request variant");
    assert_eq!(format!("{:?}", out), format!("{:?}", request));

    let response = Response::new(StatusCode::ACCEPTED, "done");
    let out = apply_response_policies(response.clone(), &(), &[]).await.unwrap();
    assert_eq!(out.status(), StatusCode::ACCEPTED);
    assert_eq!(out.text(), "done");
    assert_eq!(out.headers(), response.headers());
}

#[tokio::test]
async fn test_no_match_uses_default_exactly_once() {
    let route_origin = Arc::new(CountingOrigin::new("route"));
    let default = Arc::new(CountingOrigin::new("default"));
    let never: Arc<dyn Matcher> = Arc::new(DelayedMatcher::new(Duration::from_millis(1), false));

    let gateway: Gateway = Gateway::builder()
        .route(Route::new("/api", route_origin.clone() as Arc<dyn Origin>))
        .route(Route::new(never, route_origin.clone() as Arc<dyn Origin>))
        .default_origin(default.clone() as Arc<dyn Origin>)
        .build()
        .unwrap();

    let resp = gateway.handle(&get("/elsewhere"), &()).await.unwrap();
    assert_eq!(resp.text(), "default");
    assert_eq!(default.calls.load(Ordering::SeqCst), 1);
    assert_eq!(route_origin.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test(start_paused = true)]
async fn test_fastest_matching_route_wins_regardless_of_order() {
    let slow = Arc::new(CountingOrigin::new("A"));
    let fast = Arc::new(CountingOrigin::new("B"));
    let a: Arc<dyn Matcher> = Arc::new(DelayedMatcher::new(Duration::from_millis(50), true));
    let b: Arc<dyn Matcher> = Arc::new(DelayedMatcher::new(Duration::from_millis(10), true));

    let gateway: Gateway = Gateway::builder()
        .route(Route::new(a, slow.clone() as Arc<dyn Origin>).named("A"))
        .route(Route::new(b, fast.clone() as Arc<dyn Origin>).named("B"))
        .default_origin(fixed(StatusCode::NOT_FOUND, "not found"))
        .build()
        .unwrap();

    let start = Instant::now();
    let resp = gateway.handle(&get("/"), &()).await.unwrap();

    assert_eq!(resp.text(), "B");
    assert_eq!(fast.calls.load(Ordering::SeqCst), 1);
    assert_eq!(slow.calls.load(Ordering::SeqCst), 0);
    // The slower matcher is abandoned, not awaited.
    assert!(start.elapsed() < Duration::from_millis(50));
}

#[tokio::test(start_paused = true)]
async fn test_slow_rejection_does_not_delay_fast_match() {
    let origin = Arc::new(CountingOrigin::new("fast"));
    let slow_no: Arc<dyn Matcher> = Arc::new(DelayedMatcher::new(Duration::from_secs(5), false));
    let fast_yes: Arc<dyn Matcher> = Arc::new(DelayedMatcher::new(Duration::from_millis(5), true));

    let gateway: Gateway = Gateway::builder()
        .route(Route::new(slow_no, fixed(StatusCode::OK, "slow")))
        .route(Route::new(fast_yes, origin.clone() as Arc<dyn Origin>))
        .default_origin(fixed(StatusCode::NOT_FOUND, "not found"))
        .build()
        .unwrap();

    let start = Instant::now();
    let resp = gateway.handle(&get("/"), &()).await.unwrap();
    assert_eq!(resp.text(), "fast");
    assert!(start.elapsed() < Duration::from_secs(1));
}

#[tokio::test]
async fn test_global_policies_wrap_route_policies() {
    let journal = Journal::default();
    let origin = Arc::new(CountingOrigin::new("ok"));

    let route = Route::new("/", origin.clone() as Arc<dyn Origin>)
        .with_request_policy(trail_req("local", &journal))
        .with_response_policy(trail_resp("local", &journal));

    let gateway: Gateway = Gateway::builder()
        .route(route)
        .global_policies(vec![trail_req("global", &journal)], vec![trail_resp("global", &journal)])
        .default_origin(fixed(StatusCode::NOT_FOUND, "not found"))
        .build()
        .unwrap();

    let resp = gateway.handle(&get("/x"), &()).await.unwrap();

    assert_eq!(
        journal.entries(),
        vec!["req:global", "req:local", "resp:local", "resp:global"]
    );
    let seen: Vec<_> = resp.headers().get_all("x-origin-saw").iter().collect();
    assert_eq!(seen, vec!["global", "local"]);
    let trail: Vec<_> = resp.headers().get_all("x-trail").iter().collect();
    assert_eq!(trail, vec!["local", "global"]);
}

#[tokio::test]
async fn test_route_short_circuit_skips_origin() {
    let journal = Journal::default();
    let origin = Arc::new(CountingOrigin::new("ok"));

    let route = Route::new("/", origin.clone() as Arc<dyn Origin>)
        .with_request_policy(Arc::new(Deny {
            status: StatusCode::TOO_MANY_REQUESTS,
            body: "slow down",
        }))
        .with_response_policy(trail_resp("local", &journal));

    let gateway: Gateway = Gateway::builder()
        .route(route)
        .response_policy(trail_resp("global", &journal))
        .default_origin(fixed(StatusCode::NOT_FOUND, "not found"))
        .build()
        .unwrap();

    let resp = gateway.handle(&get("/"), &()).await.unwrap();
    assert_eq!(resp.status(), StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(origin.calls.load(Ordering::SeqCst), 0);
    assert_eq!(journal.entries(), vec!["resp:local", "resp:global"]);
}

#[tokio::test]
async fn test_policy_result_accessors() {
    let result = PolicyResult::from(get("/"));
    assert!(result.is_request());
    assert!(result.as_response().is_none());

    let result = PolicyResult::from(Response::new(StatusCode::OK, ""));
    assert!(result.is_response());
    assert!(result.into_request().is_none());
}
