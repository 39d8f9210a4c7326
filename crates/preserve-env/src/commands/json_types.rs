use std::collections::BTreeMap;

use serde::Serialize;

use preserve_env_core::{CaptureSummary, RestoreSummary};

/// JSON report for `preserve-env capture --json`.
#[derive(Serialize)]
pub struct CaptureReport {
    pub enabled: bool,
    pub debug: bool,
    pub summary: Option<CaptureSummary>,
    pub environment: BTreeMap<String, String>,
}

/// JSON report for `preserve-env restore --json`.
#[derive(Serialize)]
pub struct RestoreReport {
    pub enabled: bool,
    pub debug: bool,
    pub summary: RestoreSummary,
    pub environment: BTreeMap<String, String>,
}
