//! Replays the built-in reqres suite against a local mock of the service.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};
use reqcheck_application::{
    Clock, REQRES_BASE_URL, RunSuite, RunTestCase, RunnerConfig, reqres_suite,
};
use reqcheck_domain::{Expectation, SuiteReport, TestCase, TestOutcome};
use reqcheck_infrastructure::{ExpectationEvaluator, ReqwestHttpClient, SystemClock};
use serde_json::{Value, json};
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const STAMP: &str = "2026-10-19T08:15:42.123Z";
const TOKEN: &str = "QpwL5tke4Pnpja7X4";

struct FixedClock;

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 19, 8, 15, 0).unwrap()
    }
}

fn user(id: u32, email: &str, first_name: &str, last_name: &str) -> Value {
    json!({
        "id": id,
        "email": email,
        "first_name": first_name,
        "last_name": last_name,
        "avatar": format!("https://reqres.in/img/faces/{id}-image.jpg")
    })
}

fn users_page() -> Value {
    json!({
        "page": 1,
        "per_page": 6,
        "total": 12,
        "total_pages": 2,
        "data": [
            user(1, "george.bluth@reqres.in", "George", "Bluth"),
            user(2, "janet.weaver@reqres.in", "Janet", "Weaver"),
            user(3, "emma.wong@reqres.in", "Emma", "Wong"),
            user(4, "eve.holt@reqres.in", "Eve", "Holt"),
            user(5, "charles.morris@reqres.in", "Charles", "Morris"),
            user(6, "tracey.ramos@reqres.in", "Tracey", "Ramos"),
        ],
        "support": {"url": "https://reqres.in/#support-heading", "text": "support"}
    })
}

fn color(id: u32, name: &str, year: u32, hex: &str, pantone: &str) -> Value {
    json!({"id": id, "name": name, "year": year, "color": hex, "pantone_value": pantone})
}

async fn mount(mock_server: &MockServer, mock: Mock) {
    mock.mount(mock_server).await;
}

async fn mount_post(mock_server: &MockServer, endpoint: &str, body: Value, status: u16, reply: Value) {
    mount(
        mock_server,
        Mock::given(method("POST"))
            .and(path(endpoint))
            .and(body_json(body))
            .respond_with(ResponseTemplate::new(status).set_body_json(reply)),
    )
    .await;
}

/// Mounts every endpoint the suite exercises with the fixture data the
/// hosted service serves.
async fn reqres_mock() -> MockServer {
    let server = MockServer::start().await;
    let not_found = || ResponseTemplate::new(404).set_body_json(json!({}));

    mount(
        &server,
        Mock::given(method("GET")).and(path("/api/users/3")).respond_with(
            ResponseTemplate::new(200).set_body_json(json!({
                "data": user(3, "emma.wong@reqres.in", "Emma", "Wong"),
                "support": {"url": "https://reqres.in/#support-heading", "text": "support"}
            })),
        ),
    )
    .await;
    mount(
        &server,
        Mock::given(method("GET")).and(path("/api/users/23")).respond_with(not_found()),
    )
    .await;
    mount(
        &server,
        Mock::given(method("GET"))
            .and(path("/api/users"))
            .and(query_param("page", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(users_page())),
    )
    .await;
    mount(
        &server,
        Mock::given(method("GET"))
            .and(path("/api/users"))
            .and(query_param("delay", "5"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(users_page())
                    .set_delay(Duration::from_millis(200)),
            ),
    )
    .await;
    mount_post(
        &server,
        "/api/users",
        json!({"name": "kiki", "job": "qa"}),
        201,
        json!({"name": "kiki", "job": "qa", "id": "483", "createdAt": STAMP}),
    )
    .await;
    mount(
        &server,
        Mock::given(method("PUT")).and(path("/api/users/5")).respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"name": "sumantri", "job": "sdet", "updatedAt": STAMP})),
        ),
    )
    .await;
    mount(
        &server,
        Mock::given(method("PATCH")).and(path("/api/users/9")).respond_with(
            ResponseTemplate::new(200).set_body_json(
                json!({"name": "kiki sumantri", "job": "it sqa", "updatedAt": STAMP}),
            ),
        ),
    )
    .await;
    mount(
        &server,
        Mock::given(method("DELETE"))
            .and(path("/api/users/11"))
            .respond_with(ResponseTemplate::new(204)),
    )
    .await;

    mount(
        &server,
        Mock::given(method("GET"))
            .and(path("/api/color"))
            .and(query_param("page", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "page": 2,
                "per_page": 6,
                "total": 12,
                "total_pages": 2,
                "data": [color(7, "sand dollar", 2006, "#DECDBE", "13-1106")],
                "support": {"url": "https://reqres.in/#support-heading", "text": "support"}
            }))),
    )
    .await;
    mount(
        &server,
        Mock::given(method("GET")).and(path("/api/color/6")).respond_with(
            ResponseTemplate::new(200).set_body_json(json!({
                "data": color(6, "blue turquoise", 2005, "#53B0AE", "15-5217"),
                "support": {"url": "https://reqres.in/#support-heading", "text": "support"}
            })),
        ),
    )
    .await;
    mount(
        &server,
        Mock::given(method("GET")).and(path("/api/color/23")).respond_with(not_found()),
    )
    .await;

    mount_post(
        &server,
        "/api/register",
        json!({"email": "rachel.howell@reqres.in", "password": "somepassword123"}),
        200,
        json!({"id": 12, "token": TOKEN}),
    )
    .await;
    mount_post(
        &server,
        "/api/register",
        json!({"email": "rachel.howell@reqres.in"}),
        400,
        json!({"error": "Missing password"}),
    )
    .await;
    mount_post(
        &server,
        "/api/register",
        json!({"password": "somepassword123"}),
        400,
        json!({"error": "Missing email or username"}),
    )
    .await;
    mount_post(
        &server,
        "/api/register",
        json!({"email": "kiki.sumantri@gmail.com", "password": "somepassword123"}),
        400,
        json!({"error": "Note: Only defined users succeed registration"}),
    )
    .await;

    mount_post(
        &server,
        "/api/login",
        json!({"email": "tobias.funke@reqres.in", "password": "somepassword666"}),
        200,
        json!({"token": TOKEN}),
    )
    .await;
    mount_post(
        &server,
        "/api/login",
        json!({"email": "tobias.funke@reqres.in"}),
        400,
        json!({"error": "Missing password"}),
    )
    .await;
    mount_post(
        &server,
        "/api/login",
        json!({"password": "somepassword666"}),
        400,
        json!({"error": "Missing email or username"}),
    )
    .await;
    mount_post(
        &server,
        "/api/login",
        json!({"email": "kiki.sumantri@reqres.in", "password": "somepassword666"}),
        400,
        json!({"error": "user not found"}),
    )
    .await;

    server
}

fn suite(config: RunnerConfig) -> RunSuite<ReqwestHttpClient, ExpectationEvaluator> {
    let runner = RunTestCase::new(
        Arc::new(ReqwestHttpClient::new().unwrap()),
        Arc::new(ExpectationEvaluator::new()),
        config,
    );
    RunSuite::new(Arc::new(runner))
}

fn failures(report: &SuiteReport) -> Vec<String> {
    report
        .reports
        .iter()
        .filter(|r| !r.passed())
        .map(ToString::to_string)
        .collect()
}

#[tokio::test]
async fn test_reqres_suite_passes_against_mock() {
    let server = reqres_mock().await;
    let cases = reqres_suite(&FixedClock).unwrap();

    let report = suite(RunnerConfig::new(server.uri()).unwrap())
        .run(&cases)
        .await;

    assert_eq!(report.total, 19);
    assert!(report.all_passed(), "failures: {:#?}", failures(&report));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_reqres_suite_concurrently() {
    let server = reqres_mock().await;
    let cases = reqres_suite(&FixedClock).unwrap();
    let names: Vec<_> = cases.iter().map(|c| c.name.clone()).collect();

    let report = suite(RunnerConfig::new(server.uri()).unwrap())
        .run_concurrent(cases, 4)
        .await;

    assert!(report.all_passed(), "failures: {:#?}", failures(&report));
    let reported: Vec<_> = report.reports.iter().map(|r| r.name.clone()).collect();
    assert_eq!(reported, names);
}

#[tokio::test]
async fn test_stale_date_fails_timestamp_cases() {
    struct Tomorrow;

    impl Clock for Tomorrow {
        fn now(&self) -> DateTime<Utc> {
            Utc.with_ymd_and_hms(2026, 10, 20, 0, 0, 1).unwrap()
        }
    }

    let server = reqres_mock().await;
    let cases = reqres_suite(&Tomorrow).unwrap();

    let report = suite(RunnerConfig::new(server.uri()).unwrap())
        .run(&cases)
        .await;

    // create, PUT and PATCH all check the timestamp.
    assert_eq!(report.failed, 3);
    assert_eq!(report.passed, 16);
    assert!(report.reports.iter().all(|r| !matches!(r.outcome, TestOutcome::Errored { .. })));
}

#[tokio::test]
async fn test_short_default_timeout_only_errors_uncovered_cases() {
    let server = MockServer::start().await;
    mount(
        &server,
        Mock::given(method("GET")).and(path("/api/users/3")).respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({}))
                .set_delay(Duration::from_millis(500)),
        ),
    )
    .await;

    let config = RunnerConfig::new(server.uri())
        .unwrap()
        .with_timeout(Duration::from_millis(50));
    let cases: Vec<_> = reqres_suite(&FixedClock)
        .unwrap()
        .into_iter()
        .filter(|c| c.path == "/api/users/3")
        .collect();

    let report = suite(config).run(&cases).await;

    assert_eq!(report.errored, 1);
}

#[tokio::test]
async fn test_repeated_get_gives_the_same_verdict() {
    let server = MockServer::start().await;
    mount(
        &server,
        Mock::given(method("GET"))
            .and(path("/api/users/3"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": user(3, "emma.wong@reqres.in", "Emma", "Wong")
            })))
            .expect(2),
    )
    .await;

    let runner = RunTestCase::new(
        Arc::new(ReqwestHttpClient::new().unwrap()),
        Arc::new(ExpectationEvaluator::new()),
        RunnerConfig::new(server.uri()).unwrap(),
    );
    let case = TestCase::get("get single user twice", "/api/users/3")
        .expect(Expectation::status(200))
        .expect(Expectation::property_eq("data.email".parse().unwrap(), "emma.wong@reqres.in"))
        .expect(Expectation::property_eq("data.id".parse().unwrap(), 4));

    let first = runner.execute(&case).await;
    let second = runner.execute(&case).await;

    assert!(matches!(first.outcome, TestOutcome::Failed { .. }));
    assert_eq!(first.outcome, second.outcome);
    assert_eq!(first.status, second.status);
    assert_eq!(first.results, second.results);
    server.verify().await;
}

#[tokio::test]
#[ignore = "hits the public reqres.in service"]
async fn test_reqres_suite_live() {
    let config = RunnerConfig::new(REQRES_BASE_URL)
        .unwrap()
        .with_header("x-api-key", "reqres-free-v1");
    let cases = reqres_suite(&SystemClock::new()).unwrap();

    let report = suite(config).run(&cases).await;

    assert!(report.all_passed(), "failures: {:#?}", failures(&report));
}
