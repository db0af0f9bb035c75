//! End-to-end runs against a mock `PagerDuty` REST API.

use mass_update::{mass_update, Action, FilterCriteria, PagerDutySession, SessionConfig};
use serde_json::{json, Value};
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const REQUESTER: &str = "oncall@example.com";

fn session(server: &MockServer) -> PagerDutySession {
    let config = SessionConfig::new("test-key", REQUESTER)
        .with_base_url(server.uri())
        .with_page_size(2);
    PagerDutySession::new(config).unwrap()
}

fn incident(server: &MockServer, id: &str, status: &str) -> Value {
    json!({
        "id": id,
        "type": "incident",
        "self": format!("{}/incidents/{id}", server.uri()),
        "status": status,
        "summary": format!("Incident {id}"),
    })
}

fn listing(incidents: Vec<Value>, offset: usize, more: bool) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "incidents": incidents,
        "offset": offset,
        "limit": 2,
        "more": more,
    }))
}

fn update_body(id: &str, status: &str) -> Value {
    json!({
        "incident": {
            "type": "incident_reference",
            "id": id,
            "status": status,
        }
    })
}

async fn run(
    session: &PagerDutySession,
    criteria: &FilterCriteria,
) -> (Result<usize, mass_update::ApiError>, String) {
    let mut out = Vec::new();
    let result = mass_update(session, criteria, &mut out)
        .await
        .map(|r| r.total);
    (result, String::from_utf8(out).unwrap())
}

#[tokio::test]
async fn test_resolve_sends_updates_with_session_headers() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/incidents"))
        .and(header("Authorization", "Token token=test-key"))
        .and(header("From", REQUESTER))
        .and(header("Accept", "application/vnd.pagerduty+json;version=2"))
        .and(query_param("is_overview", "true"))
        .and(query_param("date_range", "all"))
        .and(query_param("statuses[]", "triggered"))
        .and(query_param("statuses[]", "acknowledged"))
        .and(query_param("offset", "0"))
        .and(query_param("limit", "2"))
        .respond_with(listing(
            vec![
                incident(&server, "I1", "triggered"),
                incident(&server, "I2", "acknowledged"),
            ],
            0,
            false,
        ))
        .expect(1)
        .mount(&server)
        .await;

    for id in ["I1", "I2"] {
        Mock::given(method("PUT"))
            .and(path(format!("/incidents/{id}")))
            .and(header("From", REQUESTER))
            .and(body_json(update_body(id, "resolved")))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"incident": {}})))
            .expect(1)
            .mount(&server)
            .await;
    }

    let (result, output) = run(&session(&server), &FilterCriteria::new(Action::Resolve)).await;

    assert_eq!(result.unwrap(), 2);
    assert_eq!(
        output,
        "resolved incident I1\nresolved incident I2\nTotal of 2 incidents updated.\n"
    );
}

#[tokio::test]
async fn test_dry_run_acknowledge_sends_no_updates() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/incidents"))
        .and(query_param("statuses[]", "triggered"))
        .respond_with(listing(vec![incident(&server, "I1", "triggered")], 0, false))
        .mount(&server)
        .await;

    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let criteria = FilterCriteria::new(Action::Acknowledge).with_dry_run(true);
    let (result, output) = run(&session(&server), &criteria).await;

    assert_eq!(result.unwrap(), 1);
    assert_eq!(
        output,
        "Not acting on incident I1 because -n/--dry-run specified.\n\
         Total of 1 incidents updated.\n"
    );

    let requests = server.received_requests().await.unwrap();
    let listed = &requests[0];
    let statuses: Vec<_> = listed
        .url
        .query_pairs()
        .filter(|(k, _)| k == "statuses[]")
        .map(|(_, v)| v.into_owned())
        .collect();
    assert_eq!(statuses, vec!["triggered"]);
}

#[tokio::test]
async fn test_rate_limited_update_aborts_run() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/incidents"))
        .respond_with(listing(
            vec![
                incident(&server, "I1", "triggered"),
                incident(&server, "I2", "triggered"),
            ],
            0,
            true,
        ))
        .mount(&server)
        .await;

    Mock::given(method("PUT"))
        .and(path("/incidents/I1"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("PUT"))
        .and(path("/incidents/I2"))
        .respond_with(ResponseTemplate::new(429).set_body_string("rate limited"))
        .expect(1)
        .mount(&server)
        .await;

    let (result, output) = run(&session(&server), &FilterCriteria::new(Action::Resolve)).await;

    let err = result.unwrap_err();
    assert_eq!(err.status(), Some(429));
    assert_eq!(
        output,
        "resolved incident I1\nrate limited\nTotal of 2 incidents updated.\n"
    );

    // The next page is never requested after the abort.
    let listings = server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .filter(|r| r.method.as_str() == "GET")
        .count();
    assert_eq!(listings, 1);
}

#[tokio::test]
async fn test_walks_pages_with_filters() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/incidents"))
        .and(query_param("service_ids[]", "PSVC1"))
        .and(query_param("service_ids[]", "PSVC2"))
        .and(query_param("user_ids[]", "PUSR1"))
        .and(query_param("offset", "0"))
        .respond_with(listing(
            vec![
                incident(&server, "I1", "triggered"),
                incident(&server, "I2", "triggered"),
            ],
            0,
            true,
        ))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/incidents"))
        .and(query_param("service_ids[]", "PSVC1"))
        .and(query_param("offset", "2"))
        .respond_with(listing(vec![incident(&server, "I3", "triggered")], 2, false))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(200))
        .expect(3)
        .mount(&server)
        .await;

    let criteria = FilterCriteria::new(Action::Acknowledge)
        .with_service_ids("PSVC1,PSVC2")
        .with_user_ids("PUSR1");
    let (result, output) = run(&session(&server), &criteria).await;

    assert_eq!(result.unwrap(), 3);
    assert_eq!(
        output,
        "acknowledged incident I1\nacknowledged incident I2\nacknowledged incident I3\n\
         Total of 3 incidents updated.\n"
    );
}

#[tokio::test]
async fn test_listing_failure_prints_body_and_zero_total() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/incidents"))
        .respond_with(
            ResponseTemplate::new(401)
                .set_body_string(r#"{"error":{"message":"Unauthorized","code":2006}}"#),
        )
        .mount(&server)
        .await;

    let (result, output) = run(&session(&server), &FilterCriteria::new(Action::Resolve)).await;

    assert_eq!(result.unwrap_err().status(), Some(401));
    assert_eq!(
        output,
        "{\"error\":{\"message\":\"Unauthorized\",\"code\":2006}}\nTotal of 0 incidents updated.\n"
    );
}

#[tokio::test]
async fn test_malformed_listing_is_an_api_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/incidents"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&server)
        .await;

    let (result, output) = run(&session(&server), &FilterCriteria::new(Action::Resolve)).await;

    let err = result.unwrap_err();
    assert!(err.status().is_none());
    assert_eq!(err.response_body(), Some("<html>maintenance</html>"));
    assert!(output.ends_with("Total of 0 incidents updated.\n"));
}
