//! Run Test Case Use Case
//!
//! Executes one test case: build the request, send it once, wait for the
//! response under the effective timeout, then evaluate every expectation.

use std::sync::Arc;
use std::time::Instant;

use reqcheck_domain::{
    ExpectationResult, RequestSpec, ResponseSpec, TestCase, TestReport, TransportErrorKind,
};
use tracing::{Instrument, debug, info, info_span, warn};

use crate::config::RunnerConfig;
use crate::ports::{HttpClient, ResponseEvaluator, TransportError};

/// Use case for running a single test case.
///
/// # Example
///
/// ```ignore
/// let runner = RunTestCase::new(
///     Arc::new(ReqwestHttpClient::new()?),
///     Arc::new(ExpectationEvaluator::new()),
///     RunnerConfig::new("https://reqres.in")?,
/// );
/// let report = runner
///     .execute(&TestCase::get("user 3", "/api/users/3").expect(Expectation::status(200)))
///     .await;
/// ```
pub struct RunTestCase<C: HttpClient, E: ResponseEvaluator> {
    client: Arc<C>,
    evaluator: Arc<E>,
    config: RunnerConfig,
}

impl<C: HttpClient, E: ResponseEvaluator> RunTestCase<C, E> {
    /// Creates a new `RunTestCase` use case.
    pub const fn new(client: Arc<C>, evaluator: Arc<E>, config: RunnerConfig) -> Self {
        Self {
            client,
            evaluator,
            config,
        }
    }

    /// Returns the runner configuration.
    pub const fn config(&self) -> &RunnerConfig {
        &self.config
    }

    /// Resolves a test case into the request that will be sent.
    ///
    /// The JSON body is only attached for POST/PUT/PATCH.
    pub fn build_request(&self, case: &TestCase) -> RequestSpec {
        let url = self.config.resolve(&case.path_and_query());
        let timeout = case.timeout.unwrap_or_else(|| self.config.default_timeout());

        let mut request = RequestSpec::new(case.method, url, timeout);
        request.headers = self.config.default_headers().clone();
        if let Some(body) = case.payload() {
            request.headers.set("Content-Type", "application/json");
            request.body = Some(body);
        }
        request
    }

    /// Runs the test case and returns its report.
    ///
    /// Produces exactly one report per call: either the evaluated response
    /// or the transport error that prevented one.
    pub async fn execute(&self, case: &TestCase) -> TestReport {
        let span = info_span!("test_case", name = %case.name, method = %case.method);
        self.execute_inner(case).instrument(span).await
    }

    async fn execute_inner(&self, case: &TestCase) -> TestReport {
        let start = Instant::now();
        let request = self.build_request(case);

        if let Err(e) = request.parse_url() {
            warn!(url = %request.url, error = %e, "refusing to send request");
            return TestReport::errored(
                &case.name,
                case.method,
                &request.url,
                TransportErrorKind::InvalidUrl,
                e.to_string(),
                start.elapsed(),
            );
        }

        debug!(url = %request.url, timeout_ms = request.timeout_ms(), "sending request");
        let result = tokio::time::timeout(request.timeout, self.client.execute(&request))
            .await
            .unwrap_or(Err(TransportError::Timeout {
                timeout_ms: request.timeout_ms(),
            }));

        let report = match result {
            Ok(response) => {
                debug!(
                    status = %response.status_line(),
                    duration = %response.duration_display(),
                    "response received"
                );
                let results = self.evaluate(case, &response);
                TestReport::evaluated(
                    &case.name,
                    case.method,
                    &request.url,
                    response.status,
                    results,
                    start.elapsed(),
                )
            }
            Err(e) => {
                warn!(url = %request.url, error = %e, "transport error");
                TestReport::errored(
                    &case.name,
                    case.method,
                    &request.url,
                    e.to_error_kind(),
                    e.to_string(),
                    start.elapsed(),
                )
            }
        };

        info!(passed = report.passed(), "{report}");
        report
    }

    /// Evaluates the case's expectations against a received response.
    pub fn evaluate(&self, case: &TestCase, response: &ResponseSpec) -> Vec<ExpectationResult> {
        let mut results = Vec::with_capacity(case.expectations.len());

        for expectation in &case.expectations {
            let result = self.evaluator.evaluate(expectation, response);
            let failed = !result.passed;
            results.push(result);

            if failed && self.config.stop_on_failure() {
                break;
            }
        }

        results
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;
    use reqcheck_domain::{Expectation, HttpMethod, TestOutcome};
    use serde_json::json;
    use std::sync::Mutex;
    use std::time::Duration;

    /// Mock HTTP client recording every request it receives.
    struct MockHttpClient {
        response: Result<ResponseSpec, TransportError>,
        delay: Duration,
        seen: Mutex<Vec<RequestSpec>>,
    }

    impl MockHttpClient {
        fn status(status: u16) -> Self {
            Self {
                response: Ok(ResponseSpec::new(
                    status,
                    Vec::new(),
                    b"{}",
                    Duration::from_millis(5),
                )),
                delay: Duration::ZERO,
                seen: Mutex::new(Vec::new()),
            }
        }

        fn error(err: TransportError) -> Self {
            Self {
                response: Err(err),
                ..Self::status(200)
            }
        }

        fn slow(delay: Duration) -> Self {
            Self {
                delay,
                ..Self::status(200)
            }
        }

        fn requests(&self) -> Vec<RequestSpec> {
            self.seen.lock().expect("lock").clone()
        }
    }

    #[async_trait]
    impl HttpClient for MockHttpClient {
        async fn execute(&self, request: &RequestSpec) -> Result<ResponseSpec, TransportError> {
            self.seen.lock().expect("lock").push(request.clone());
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            self.response.clone()
        }
    }

    /// Evaluator that only understands status expectations.
    struct StatusOnly;

    impl ResponseEvaluator for StatusOnly {
        fn evaluate(
            &self,
            expectation: &Expectation,
            response: &ResponseSpec,
        ) -> ExpectationResult {
            match expectation {
                Expectation::StatusEquals { code } if *code == response.status => {
                    ExpectationResult::pass(expectation.clone())
                }
                Expectation::StatusEquals { code } => ExpectationResult::mismatch(
                    expectation.clone(),
                    code.to_string(),
                    response.status.to_string(),
                ),
                _ => ExpectationResult::fail(expectation.clone(), "unsupported"),
            }
        }
    }

    fn runner(client: MockHttpClient) -> (Arc<MockHttpClient>, RunTestCase<MockHttpClient, StatusOnly>) {
        let client = Arc::new(client);
        let config = RunnerConfig::new("https://reqres.in")
            .unwrap()
            .with_header("x-api-key", "reqres-free-v1");
        (
            Arc::clone(&client),
            RunTestCase::new(client, Arc::new(StatusOnly), config),
        )
    }

    #[tokio::test]
    async fn test_passing_case_sends_exactly_once() {
        let (client, runner) = runner(MockHttpClient::status(200));
        let case = TestCase::get("user 3", "/api/users/3").expect(Expectation::status(200));

        let report = runner.execute(&case).await;

        assert_eq!(report.outcome, TestOutcome::Passed);
        assert_eq!(report.status, Some(200));
        assert_eq!(report.url, "https://reqres.in/api/users/3");
        assert_eq!(client.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_failing_case_reports_expected_and_actual() {
        let (_, runner) = runner(MockHttpClient::status(404));
        let case = TestCase::get("user 23", "/api/users/23").expect(Expectation::status(200));

        let report = runner.execute(&case).await;

        assert_eq!(
            report.outcome,
            TestOutcome::Failed {
                diagnostic: "Status code = 200: expected 200, got 404".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_transport_error_fails_fast() {
        let (_, runner) = runner(MockHttpClient::error(TransportError::ConnectionFailed(
            "reset".to_string(),
        )));
        let case = TestCase::get("down", "/api/users").expect(Expectation::status(200));

        let report = runner.execute(&case).await;

        assert!(report.results.is_empty());
        assert_eq!(
            report.outcome,
            TestOutcome::Errored {
                kind: TransportErrorKind::ConnectionFailed,
                message: "connection failed: reset".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn test_timeout_abandons_request() {
        let (client, runner) = runner(MockHttpClient::slow(Duration::from_millis(500)));
        let case = TestCase::get("slow", "/api/users")
            .with_query("delay", 5)
            .with_timeout(Duration::from_millis(50))
            .expect(Expectation::status(200));

        let report = runner.execute(&case).await;

        assert_eq!(
            report.outcome,
            TestOutcome::Errored {
                kind: TransportErrorKind::Timeout,
                message: "request timed out after 50 ms".to_string(),
            }
        );
        assert_eq!(client.requests().len(), 1);
        assert!(report.duration < Duration::from_millis(500));
    }

    #[tokio::test]
    async fn test_invalid_url_is_not_sent() {
        let client = Arc::new(MockHttpClient::status(200));
        let config = RunnerConfig::new("http://exa mple.com").unwrap();
        let runner = RunTestCase::new(Arc::clone(&client), Arc::new(StatusOnly), config);

        let report = runner.execute(&TestCase::get("bad", "/api")).await;

        assert!(matches!(
            report.outcome,
            TestOutcome::Errored {
                kind: TransportErrorKind::InvalidUrl,
                ..
            }
        ));
        assert!(client.requests().is_empty());
    }

    #[test]
    fn test_build_request_attaches_body_for_post() {
        let (_, runner) = runner(MockHttpClient::status(201));
        let case = TestCase::post("create", "/api/users")
            .with_body(json!({"name": "kiki", "job": "qa"}));

        let request = runner.build_request(&case);

        assert_eq!(request.method, HttpMethod::Post);
        assert_eq!(request.body, Some(json!({"name": "kiki", "job": "qa"})));
        assert_eq!(request.headers.get("content-type"), Some("application/json"));
        assert_eq!(request.headers.get("x-api-key"), Some("reqres-free-v1"));
        assert_eq!(request.timeout, RunnerConfig::DEFAULT_TIMEOUT);
    }

    #[test]
    fn test_build_request_drops_body_for_delete() {
        let (_, runner) = runner(MockHttpClient::status(204));
        let case = TestCase::delete("delete", "/api/users/11").with_body(json!({"x": 1}));

        let request = runner.build_request(&case);

        assert_eq!(request.body, None);
        assert_eq!(request.headers.get("content-type"), None);
    }

    #[tokio::test]
    async fn test_stop_on_failure() {
        let client = Arc::new(MockHttpClient::status(404));
        let config = RunnerConfig::new("https://reqres.in")
            .unwrap()
            .with_stop_on_failure(true);
        let runner = RunTestCase::new(client, Arc::new(StatusOnly), config);
        let case = TestCase::get("user", "/api/users/23")
            .expect(Expectation::status(200))
            .expect(Expectation::status(404));

        let report = runner.execute(&case).await;

        assert_eq!(report.results.len(), 1); // Stopped after first failure
        assert!(!report.passed());
    }

    #[tokio::test]
    async fn test_all_results_reported_without_stop_on_failure() {
        let (_, runner) = runner(MockHttpClient::status(404));
        let case = TestCase::get("user", "/api/users/23")
            .expect(Expectation::status(200))
            .expect(Expectation::status(404));

        let report = runner.execute(&case).await;

        assert_eq!(report.results.len(), 2);
        assert!(report.results[1].passed);
        assert!(!report.passed());
    }
}
