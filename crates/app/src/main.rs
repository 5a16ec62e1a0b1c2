//! reqcheck - runs the reqres API assertion suite.
//!
//! Prints one line per test case and a summary. Exits with status 1 when
//! any case fails or errors.

use std::process::ExitCode;
use std::sync::Arc;

use reqcheck_application::{RunSuite, RunTestCase, reqres_suite};
use reqcheck_domain::SuiteReport;
use reqcheck_infrastructure::{ExpectationEvaluator, ReqwestHttpClient, Settings, SystemClock};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> ExitCode {
    // Logs go to stderr so stdout only carries the report lines.
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    tracing::info!("Starting reqcheck v{}", env!("CARGO_PKG_VERSION"));

    match run().await {
        Ok(report) if report.all_passed() => ExitCode::SUCCESS,
        Ok(_) => ExitCode::FAILURE,
        Err(e) => {
            tracing::error!(error = %e, "reqcheck could not run");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<SuiteReport, Box<dyn std::error::Error>> {
    let settings = Settings::load(None)?;

    let runner = RunTestCase::new(
        Arc::new(ReqwestHttpClient::new()?),
        Arc::new(ExpectationEvaluator::new()),
        settings.runner_config()?,
    );
    let suite = RunSuite::new(Arc::new(runner));
    let cases = reqres_suite(&SystemClock::new())?;

    let report = if settings.is_sequential() {
        suite.run(&cases).await
    } else {
        suite.run_concurrent(cases, settings.concurrency).await
    };

    for test in &report.reports {
        println!("{test}");
    }
    println!("{}", report.summary());

    Ok(report)
}
