//! Test runner - resets the mock and the mounted key, runs each case,
//! then reports per category

use colored::Colorize;
use std::future::Future;
use std::pin::Pin;
use std::time::{Duration, Instant};

use crate::backend;
use crate::harness::{Harness, SecretFile};
use crate::types::SharedBackendState;

/// API key mounted before every test; tests that need it absent remove it
pub const TEST_API_KEY: &str = "e2e-test-key";

/// Upper bound for one case, well above the proxy's provider timeout
const CASE_TIMEOUT: Duration = Duration::from_secs(15);

pub type TestFuture = Pin<Box<dyn Future<Output = anyhow::Result<()>> + Send>>;

/// A single test case, named `category/case`
pub struct TestCase {
    pub name: &'static str,
    pub description: &'static str,
    pub run: fn(TestContext) -> TestFuture,
}

impl TestCase {
    fn category(&self) -> &'static str {
        self.name.split_once('/').map(|(c, _)| c).unwrap_or(self.name)
    }
}

/// What a test gets to work with
#[derive(Clone)]
pub struct TestContext {
    pub proxy_addr: String,
    pub backend_state: SharedBackendState,
    pub http_client: reqwest::Client,
    secret: SecretFile,
}

impl TestContext {
    pub fn new(harness: &Harness, http_client: reqwest::Client) -> Self {
        Self {
            proxy_addr: harness.proxy_addr.to_string(),
            backend_state: harness.mock.state.clone(),
            http_client,
            secret: harness.secret.clone(),
        }
    }

    /// Replace the mounted key; the proxy sees it on its next request
    pub fn write_api_key(&self, key: &str) -> anyhow::Result<()> {
        self.secret.write(key)
    }

    pub fn remove_api_key(&self) -> anyhow::Result<()> {
        self.secret.remove()
    }
}

struct Failure {
    name: &'static str,
    error: anyhow::Error,
}

/// Outcome of a run
pub struct Report {
    passed: usize,
    failures: Vec<Failure>,
}

impl Report {
    pub fn all_passed(&self) -> bool {
        self.failures.is_empty()
    }

    fn print_summary(&self) {
        println!();
        if self.failures.is_empty() {
            println!("{}", format!("All {} test(s) passed", self.passed).bright_green().bold());
            return;
        }

        println!("{}", "Failures:".bright_red().bold());
        for failure in &self.failures {
            println!("  {} {}", "✗".bright_red(), failure.name.bright_white());
            for (depth, cause) in failure.error.chain().enumerate() {
                let label = if depth == 0 { "error" } else { "caused by" };
                println!("      {}: {}", label.yellow(), cause);
            }
        }
        println!(
            "\n{}",
            format!("{} passed, {} failed", self.passed, self.failures.len())
                .bright_red()
                .bold()
        );
    }
}

/// Run the cases matching `filter` in order, one at a time
pub async fn run_tests(
    cases: &[TestCase],
    ctx: &TestContext,
    filter: Option<&str>,
) -> Report {
    let selected: Vec<&TestCase> = cases
        .iter()
        .filter(|c| filter.map_or(true, |f| c.name.contains(f)))
        .collect();

    println!(
        "\n{} {} against {}\n",
        "Running".bright_white().bold(),
        format!("{} test(s)", selected.len()).bright_cyan(),
        ctx.proxy_addr.bright_cyan()
    );

    let mut report = Report {
        passed: 0,
        failures: Vec::new(),
    };
    let mut current_category = "";

    for case in selected {
        if case.category() != current_category {
            current_category = case.category();
            println!("{}", current_category.bright_blue().bold());
        }

        backend::reset(&ctx.backend_state);
        let start = Instant::now();
        let result = match ctx.write_api_key(TEST_API_KEY) {
            Ok(()) => match tokio::time::timeout(CASE_TIMEOUT, (case.run)(ctx.clone())).await {
                Ok(result) => result,
                Err(_) => Err(anyhow::anyhow!("timed out after {:?}", CASE_TIMEOUT)),
            },
            Err(e) => Err(e.context("could not mount the test API key")),
        };
        let elapsed = start.elapsed().as_millis();

        match result {
            Ok(()) => {
                println!("  {} {} ({elapsed}ms)", "✓".bright_green(), case.name);
                report.passed += 1;
            }
            Err(error) => {
                println!("  {} {} ({elapsed}ms)", "✗".bright_red(), case.name);
                report.failures.push(Failure {
                    name: case.name,
                    error,
                });
            }
        }
    }

    report.print_summary();
    report
}

/// Print every registered case grouped by category
pub fn list_tests(cases: &[TestCase]) {
    let mut current_category = "";
    for case in cases {
        if case.category() != current_category {
            current_category = case.category();
            println!("{}", current_category.bright_blue().bold());
        }
        println!("  {:40} {}", case.name.bright_cyan(), case.description);
    }
}
