//! Capability readiness checks
//!
//! Verifies every classification capability before the pipeline accepts a
//! single record. A failed check is fatal: the caller gets
//! `AppError::CapabilityUnavailable` instead of a `ReadyCapabilities`.

use crate::capabilities::{call_with_timeout, Capabilities, ReadyCapabilities};
use crate::error::{AppError, CapabilityError};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::{error, info, warn};

/// Result of a single check
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckResult {
    pub name: String,
    pub passed: bool,
    pub message: String,
    pub details: Option<String>,
}

impl CheckResult {
    fn pass(name: &str, message: &str) -> Self {
        Self {
            name: name.to_string(),
            passed: true,
            message: message.to_string(),
            details: None,
        }
    }

    fn fail(name: &str, message: &str, details: Option<String>) -> Self {
        Self {
            name: name.to_string(),
            passed: false,
            message: message.to_string(),
            details,
        }
    }

    fn from_probe(name: &str, started: Instant, outcome: Result<(), CapabilityError>) -> Self {
        match outcome {
            Ok(()) => Self::pass(name, &format!("Ready in {:?}", started.elapsed())),
            Err(e) => Self::fail(name, "Not ready", Some(e.to_string())),
        }
    }
}

/// Complete preflight check report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreflightReport {
    pub all_passed: bool,
    pub checks: Vec<CheckResult>,
    pub summary: String,
}

impl PreflightReport {
    fn failed_names(&self) -> Vec<&str> {
        self.checks
            .iter()
            .filter(|c| !c.passed)
            .map(|c| c.name.as_str())
            .collect()
    }
}

/// Probes each capability's readiness, each under `probe_timeout`.
pub async fn run_preflight_checks(
    capabilities: &Capabilities,
    probe_timeout: Duration,
) -> PreflightReport {
    info!("Running capability preflight checks");

    let mut checks = Vec::new();

    let started = Instant::now();
    let outcome = call_with_timeout(probe_timeout, capabilities.detector.ready()).await;
    checks.push(CheckResult::from_probe("language_detector", started, outcome));

    let started = Instant::now();
    let outcome = call_with_timeout(probe_timeout, capabilities.english.ready()).await;
    checks.push(CheckResult::from_probe("english_sentiment", started, outcome));

    let started = Instant::now();
    let outcome = call_with_timeout(probe_timeout, capabilities.multilingual.ready()).await;
    checks.push(CheckResult::from_probe("multilingual_sentiment", started, outcome));

    let all_passed = checks.iter().all(|c| c.passed);
    let summary = if all_passed {
        "All capabilities ready.".to_string()
    } else {
        "Capabilities missing. Pipeline cannot start.".to_string()
    };

    for check in &checks {
        if check.passed {
            info!("  ✅ {}: {}", check.name, check.message);
        } else {
            warn!("  ❌ {}: {}", check.name, check.message);
            if let Some(details) = &check.details {
                warn!("      Details: {}", details);
            }
        }
    }

    info!("Summary: {}", summary);

    PreflightReport {
        all_passed,
        checks,
        summary,
    }
}

/// Runs the preflight checks and releases the capabilities only if all pass.
pub async fn prepare(
    capabilities: Capabilities,
    probe_timeout: Duration,
) -> Result<ReadyCapabilities, AppError> {
    let report = run_preflight_checks(&capabilities, probe_timeout).await;
    if report.all_passed {
        Ok(ReadyCapabilities::verified(capabilities))
    } else {
        let failed = report.failed_names().join(", ");
        error!("Refusing to start pipeline, unavailable: {}", failed);
        Err(AppError::CapabilityUnavailable(failed))
    }
}
