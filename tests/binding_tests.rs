mod test_helpers;

use godesk_cli::api::models::ListResponse;
use godesk_cli::binding::{poll_every, BackoffPolicy, BindingOptions, Phase, RequestBinding};
use godesk_cli::error::Error;
use godesk_cli::request::{Json, RequestDescriptor};
use godesk_cli::transform::ErrorReason;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use test_helpers::transport_for;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, Respond, ResponseTemplate};

const SETTLE: Duration = Duration::from_secs(5);

fn appeal_list() -> RequestDescriptor {
    RequestDescriptor::get("/api/v2/appeal/")
        .with_query("atype", 1)
        .with_query("limit", 10)
}

#[tokio::test]
async fn test_successful_list_settles_with_response() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v2/appeal/"))
        .and(query_param("atype", "1"))
        .and(query_param("limit", "10"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "count": 3,
            "next": null,
            "previous": null,
            "results": [{"id": 1}, {"id": 2}, {"id": 3}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let binding = RequestBinding::<Json<ListResponse<Value>>>::new(
        transport_for(&server.uri()),
        appeal_list(),
    );
    let state = binding.settled_within(SETTLE).await.unwrap();

    assert!(!state.pending);
    assert!(state.error.is_none());
    assert_eq!(state.phase, Phase::Success);
    assert_eq!(state.response.unwrap().count, 3);
}

#[tokio::test]
async fn test_empty_500_reports_internal_server_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v2/appeal/"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let binding = RequestBinding::<Value>::new(transport_for(&server.uri()), appeal_list());
    let state = binding.settled_within(SETTLE).await.unwrap();

    assert!(state.response.is_none());
    let error = state.error.unwrap();
    assert_eq!(error.reason, ErrorReason::Server);
    assert_eq!(error.status, Some(500));
    assert_eq!(error.value.message_for_notification, "Internal server error!");
}

#[tokio::test]
async fn test_field_errors_are_exposed_per_field() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v2/appeal/"))
        .respond_with(
            ResponseTemplate::new(400)
                .set_body_json(json!({"errors": {"atype": ["Invalid type"]}})),
        )
        .mount(&server)
        .await;

    let binding = RequestBinding::<Value>::new(transport_for(&server.uri()), appeal_list());
    let error = binding.settled_within(SETTLE).await.unwrap().error.unwrap();

    assert_eq!(error.field_errors("atype"), ["Invalid type".to_string()]);
    assert_eq!(error.value.form_errors["atype"][0], "Invalid type");
    assert!(!error.value.message_for_notification.is_empty());
}

#[tokio::test]
async fn test_login_redirect_rejects() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v2/dref/1/"))
        .respond_with(
            ResponseTemplate::new(302).insert_header("Location", "/login/?next=/api/v2/dref/1/"),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/login/"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("Content-Type", "text/html")
                .set_body_string("<form>sign in</form>"),
        )
        .mount(&server)
        .await;

    let binding = RequestBinding::<Value>::new(
        transport_for(&server.uri()),
        RequestDescriptor::get("/api/v2/dref/{id}/").with_path_variable("id", 1),
    );
    let err = binding.settled_within(SETTLE).await.unwrap_err();

    assert!(err.is_login_redirect());
    let state = binding.state();
    assert!(state.response.is_none());
    assert!(matches!(state.phase, Phase::LoginRequired { .. }));
}

#[tokio::test]
async fn test_stale_response_is_discarded() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v2/event/"))
        .and(query_param("offset", "0"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"count": 1, "results": []}))
                .set_delay(Duration::from_millis(300)),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v2/event/"))
        .and(query_param("offset", "10"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"count": 2, "results": []})))
        .mount(&server)
        .await;

    let base = RequestDescriptor::get("/api/v2/event/").with_query("limit", 10);
    let mut binding = RequestBinding::<Value>::new(
        transport_for(&server.uri()),
        base.clone().with_query("offset", 0),
    );
    assert!(binding.update(base.with_query("offset", 10)));

    let state = binding.settled_within(SETTLE).await.unwrap();
    assert_eq!(state.response.as_ref().unwrap()["count"], 2);

    // Let the slow first response arrive; it must not overwrite the second.
    tokio::time::sleep(Duration::from_millis(500)).await;
    let state = binding.state();
    assert!(!state.pending);
    assert_eq!(state.response.unwrap()["count"], 2);
}

#[tokio::test]
async fn test_stale_failure_is_discarded() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v2/event/"))
        .and(query_param("offset", "0"))
        .respond_with(ResponseTemplate::new(500).set_delay(Duration::from_millis(300)))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v2/event/"))
        .and(query_param("offset", "10"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"count": 2, "results": []})))
        .mount(&server)
        .await;

    let base = RequestDescriptor::get("/api/v2/event/").with_query("limit", 10);
    let mut binding = RequestBinding::<Value>::new(
        transport_for(&server.uri()),
        base.clone().with_query("offset", 0),
    );
    assert!(binding.update(base.with_query("offset", 10)));
    binding.settled_within(SETTLE).await.unwrap();

    // The slow 500 for the first page lands after the second page succeeded.
    tokio::time::sleep(Duration::from_millis(500)).await;
    let state = binding.state();
    assert_eq!(state.phase, Phase::Success);
    assert!(state.error.is_none());
    assert_eq!(state.response.unwrap()["count"], 2);
}

#[tokio::test]
async fn test_update_during_retry_delay_abandons_old_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v2/event/"))
        .and(query_param("offset", "0"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v2/event/"))
        .and(query_param("offset", "10"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"count": 2, "results": []})))
        .mount(&server)
        .await;

    let slow_retry = BackoffPolicy {
        initial_delay_ms: 300,
        max_delay_ms: 300,
        ..BackoffPolicy::default()
    }
    .with_max_attempts(3)
    .with_jitter(false);
    let base = RequestDescriptor::get("/api/v2/event/").with_query("limit", 10);
    let mut binding = RequestBinding::with_options(
        transport_for(&server.uri()),
        base.clone().with_query("offset", 0),
        BindingOptions::<Value>::default().with_retry(slow_retry.into_strategy()),
    );

    // First attempt has failed; the binding is waiting to retry.
    tokio::time::sleep(Duration::from_millis(150)).await;
    assert!(binding.update(base.with_query("offset", 10)));
    let state = binding.settled_within(SETTLE).await.unwrap();
    assert_eq!(state.response.unwrap()["count"], 2);

    // Past the retry delay: the old request must not resend or publish.
    tokio::time::sleep(Duration::from_millis(500)).await;
    let state = binding.state();
    assert!(state.error.is_none());
    assert_eq!(state.phase, Phase::Success);
    assert_eq!(state.response.unwrap()["count"], 2);
}

#[tokio::test]
async fn test_skip_sends_nothing_until_released() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v2/dref/4/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 4})))
        .expect(1)
        .mount(&server)
        .await;

    let held = RequestDescriptor::get("/api/v2/dref/{id}/").skip(true);
    let mut binding = RequestBinding::<Value>::new(transport_for(&server.uri()), held);

    let state = binding.state();
    assert_eq!(state.phase, Phase::Idle);
    assert!(!state.pending);
    assert!(state.response.is_none() && state.error.is_none());

    binding.update(RequestDescriptor::get("/api/v2/dref/{id}/").with_path_variable("id", 4));
    let state = binding.settled_within(SETTLE).await.unwrap();
    assert_eq!(state.response.unwrap()["id"], 4);
}

#[tokio::test]
async fn test_equal_descriptor_does_not_reissue() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v2/appeal/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"count": 0, "results": []})))
        .expect(1)
        .mount(&server)
        .await;

    let mut binding = RequestBinding::<Value>::new(transport_for(&server.uri()), appeal_list());
    binding.settled_within(SETTLE).await.unwrap();

    // Same pairs, different insertion order.
    let reordered = RequestDescriptor::get("/api/v2/appeal/")
        .with_query("limit", 10)
        .with_query("atype", 1);
    assert!(!binding.update(reordered));
}

#[tokio::test]
async fn test_retrigger_reissues_and_preserves_response() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v2/appeal/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"count": 1, "results": []}))
                .set_delay(Duration::from_millis(100)),
        )
        .expect(2)
        .mount(&server)
        .await;

    let mut binding = RequestBinding::<Value>::new(
        transport_for(&server.uri()),
        appeal_list().preserve_response(true),
    );
    binding.settled_within(SETTLE).await.unwrap();

    binding.retrigger();
    let during = binding.state();
    assert!(during.pending);
    assert!(during.response.is_some());

    let after = binding.settled_within(SETTLE).await.unwrap();
    assert!(!after.pending);
    assert_eq!(after.generation, during.generation);
}

#[tokio::test]
async fn test_new_request_clears_response_without_preserve() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v2/appeal/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"count": 1, "results": []}))
                .set_delay(Duration::from_millis(100)),
        )
        .mount(&server)
        .await;

    let mut binding = RequestBinding::<Value>::new(transport_for(&server.uri()), appeal_list());
    binding.settled_within(SETTLE).await.unwrap();

    binding.retrigger();
    let during = binding.state();
    assert!(during.pending);
    assert!(during.response.is_none());
    binding.settled_within(SETTLE).await.unwrap();
}

/// Fails with 503 a fixed number of times, then succeeds.
struct FlakyResponder {
    calls: Arc<AtomicUsize>,
    failures: usize,
}

impl Respond for FlakyResponder {
    fn respond(&self, _request: &wiremock::Request) -> ResponseTemplate {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if call < self.failures {
            ResponseTemplate::new(503)
        } else {
            ResponseTemplate::new(200).set_body_json(json!({"count": 5, "results": []}))
        }
    }
}

fn fast_backoff(max_attempts: u32) -> BackoffPolicy {
    BackoffPolicy {
        initial_delay_ms: 10,
        max_delay_ms: 50,
        ..BackoffPolicy::default()
    }
    .with_max_attempts(max_attempts)
    .with_jitter(false)
}

#[tokio::test]
async fn test_retry_recovers_from_transient_failures() {
    let server = MockServer::start().await;
    let calls = Arc::new(AtomicUsize::new(0));
    Mock::given(method("GET"))
        .and(path("/api/v2/appeal/"))
        .respond_with(FlakyResponder {
            calls: Arc::clone(&calls),
            failures: 2,
        })
        .mount(&server)
        .await;

    let binding = RequestBinding::with_options(
        transport_for(&server.uri()),
        appeal_list(),
        BindingOptions::<Value>::default().with_retry(fast_backoff(3).into_strategy()),
    );
    let state = binding.settled_within(SETTLE).await.unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), 3);
    assert_eq!(state.response.unwrap()["count"], 5);
    assert!(state.error.is_none());
}

#[tokio::test]
async fn test_retry_gives_up_after_max_attempts() {
    let server = MockServer::start().await;
    let calls = Arc::new(AtomicUsize::new(0));
    Mock::given(method("GET"))
        .and(path("/api/v2/appeal/"))
        .respond_with(FlakyResponder {
            calls: Arc::clone(&calls),
            failures: 10,
        })
        .mount(&server)
        .await;

    let binding = RequestBinding::with_options(
        transport_for(&server.uri()),
        appeal_list(),
        BindingOptions::<Value>::default().with_retry(fast_backoff(2).into_strategy()),
    );
    let state = binding.settled_within(SETTLE).await.unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert_eq!(state.error.unwrap().status, Some(503));
}

#[tokio::test]
async fn test_client_errors_are_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v2/appeal/"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let binding = RequestBinding::with_options(
        transport_for(&server.uri()),
        appeal_list(),
        BindingOptions::<Value>::default().with_retry(fast_backoff(5).into_strategy()),
    );
    let error = binding.settled_within(SETTLE).await.unwrap().error.unwrap();
    assert_eq!(error.value.message_for_notification, "Failed to load data");
}

#[tokio::test]
async fn test_poll_reissues_after_success() {
    let server = MockServer::start().await;
    let calls = Arc::new(AtomicUsize::new(0));
    Mock::given(method("GET"))
        .and(path("/api/v2/appeal/"))
        .respond_with(FlakyResponder {
            calls: Arc::clone(&calls),
            failures: 0,
        })
        .mount(&server)
        .await;

    let binding = RequestBinding::with_options(
        transport_for(&server.uri()),
        appeal_list(),
        BindingOptions::<Value>::default().with_poll(poll_every(Duration::from_millis(20))),
    );
    binding.settled_within(SETTLE).await.unwrap();
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert!(calls.load(Ordering::SeqCst) >= 3);

    // Dropping the binding stops the polling.
    drop(binding);
    tokio::time::sleep(Duration::from_millis(50)).await;
    let after_drop = calls.load(Ordering::SeqCst);
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(calls.load(Ordering::SeqCst), after_drop);
}

#[tokio::test]
async fn test_callbacks_fire_once_per_outcome() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v2/appeal/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"count": 1, "results": []})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v2/event/"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let successes = Arc::new(AtomicUsize::new(0));
    let failures = Arc::new(AtomicUsize::new(0));
    let options = {
        let successes = Arc::clone(&successes);
        let failures = Arc::clone(&failures);
        BindingOptions::<Value>::default()
            .on_success(move |_| {
                successes.fetch_add(1, Ordering::SeqCst);
            })
            .on_failure(move |_| {
                failures.fetch_add(1, Ordering::SeqCst);
            })
    };

    let mut binding =
        RequestBinding::with_options(transport_for(&server.uri()), appeal_list(), options);
    binding.settled_within(SETTLE).await.unwrap();
    binding.update(RequestDescriptor::get("/api/v2/event/"));
    binding.settled_within(SETTLE).await.unwrap();

    assert_eq!(successes.load(Ordering::SeqCst), 1);
    assert_eq!(failures.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_connection_failure_is_a_network_error() {
    // Nothing listens on port 1.
    let binding = RequestBinding::<Value>::new(transport_for("http://127.0.0.1:1"), appeal_list());
    let error = binding.settled_within(SETTLE).await.unwrap().error.unwrap();
    assert_eq!(error.reason, ErrorReason::Network);
    assert_eq!(error.status, None);
}

#[tokio::test]
async fn test_connection_failure_settles_into_request_error() {
    let binding = RequestBinding::<Value>::new(transport_for("http://127.0.0.1:1"), appeal_list());
    let error = Error::from(binding.settled_within(SETTLE).await.unwrap().error.unwrap());
    let json = error.to_json();
    assert!(matches!(error, Error::Request(_)));
    assert_eq!(json.error_type, "Request");
    assert_eq!(
        json.message,
        "No internet connection. Please check your connection and try again."
    );
}

#[tokio::test]
async fn test_unexpected_shape_is_a_parse_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v2/appeal/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"unexpected": true})))
        .mount(&server)
        .await;

    let binding = RequestBinding::<Json<ListResponse<Value>>>::new(
        transport_for(&server.uri()),
        appeal_list(),
    );
    let state = binding.settled_within(SETTLE).await.unwrap();
    assert_eq!(state.error.unwrap().reason, ErrorReason::Parse);
    assert!(!matches!(binding.settled().await, Err(Error::LoginRedirect { .. })));
}
