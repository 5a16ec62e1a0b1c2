//! Run Suite Use Case
//!
//! Runs a list of independent test cases, sequentially or with bounded
//! concurrency, and aggregates their reports.

use std::sync::Arc;
use std::time::Instant;

use reqcheck_domain::{SuiteReport, TestCase, TestReport, TransportErrorKind, generate_run_id};
use tokio::sync::Semaphore;
use tracing::{Instrument, info, info_span, warn};

use super::RunTestCase;
use crate::ports::{HttpClient, ResponseEvaluator};

/// Use case for running many test cases.
pub struct RunSuite<C: HttpClient, E: ResponseEvaluator> {
    runner: Arc<RunTestCase<C, E>>,
}

impl<C, E> RunSuite<C, E>
where
    C: HttpClient + 'static,
    E: ResponseEvaluator + 'static,
{
    /// Creates a new `RunSuite` use case around a single-case runner.
    pub const fn new(runner: Arc<RunTestCase<C, E>>) -> Self {
        Self { runner }
    }

    /// Runs the cases one after another in declaration order.
    pub async fn run(&self, cases: &[TestCase]) -> SuiteReport {
        let run_id = generate_run_id();
        let span = info_span!("suite", %run_id, cases = cases.len());

        async {
            let start = Instant::now();
            let mut reports = Vec::with_capacity(cases.len());
            for case in cases {
                reports.push(self.runner.execute(case).await);
            }
            let suite = SuiteReport::new(run_id, reports, start.elapsed());
            info!("{}", suite.summary());
            suite
        }
        .instrument(span)
        .await
    }

    /// Runs the cases on spawned tasks with at most `max_in_flight` requests
    /// outstanding. Reports keep declaration order.
    ///
    /// A task that panics is reported as an errored case; the other cases
    /// are unaffected.
    pub async fn run_concurrent(&self, cases: Vec<TestCase>, max_in_flight: usize) -> SuiteReport {
        let run_id = generate_run_id();
        let max_in_flight = max_in_flight.max(1);
        let span = info_span!("suite", %run_id, cases = cases.len(), max_in_flight);

        async {
            let start = Instant::now();
            let semaphore = Arc::new(Semaphore::new(max_in_flight));

            let handles: Vec<_> = cases
                .into_iter()
                .map(|case| {
                    let runner = Arc::clone(&self.runner);
                    let semaphore = Arc::clone(&semaphore);
                    let name = case.name.clone();
                    let method = case.method;
                    let url = runner.config().resolve(&case.path_and_query());
                    let handle = tokio::spawn(
                        async move {
                            let Ok(_permit) = semaphore.acquire_owned().await else {
                                return TestReport::errored(
                                    &case.name,
                                    case.method,
                                    runner.config().resolve(&case.path_and_query()),
                                    TransportErrorKind::Unknown,
                                    "runner shut down before the request was sent",
                                    std::time::Duration::ZERO,
                                );
                            };
                            runner.execute(&case).await
                        }
                        .in_current_span(),
                    );
                    (name, method, url, handle)
                })
                .collect();

            let mut reports = Vec::with_capacity(handles.len());
            for (name, method, url, handle) in handles {
                let report = match handle.await {
                    Ok(report) => report,
                    Err(e) => {
                        warn!(test = %name, error = %e, "test task did not complete");
                        TestReport::errored(
                            name,
                            method,
                            url,
                            TransportErrorKind::Unknown,
                            format!("test task did not complete: {e}"),
                            std::time::Duration::ZERO,
                        )
                    }
                };
                reports.push(report);
            }

            let suite = SuiteReport::new(run_id, reports, start.elapsed());
            info!("{}", suite.summary());
            suite
        }
        .instrument(span)
        .await
    }
}
