//! Capture phase: stash namespace variables in the local environment.
//!
//! Runs in the invoking process as soon as the trigger option is seen, before
//! the host starts rewriting its own `SLURM_*` variables (`SLURM_NNODES` is
//! redefined very early). Capture only adds `save_*` entries; the live
//! variables are left alone so the host can carry on with them.

mod types;

pub use types::{CaptureSummary, SkippedVar};

use tracing::{error, info};

use crate::env::{LocalEnvironment, entry_name, split_entry};
use crate::namespace::Namespace;
use crate::pending::PendingList;

/// Stash every variable selected by `namespace` as `save_<name>`.
///
/// Best-effort: an entry that cannot be copied, whose stash name is too long,
/// or whose stash cannot be set is reported and skipped, and the remaining
/// entries are still processed.
pub fn capture<E>(env: &mut E, namespace: &Namespace, verbose: bool) -> CaptureSummary
where
    E: LocalEnvironment + ?Sized,
{
    info!(event = "core.capture.started", prefix = namespace.prefix());

    let mut summary = CaptureSummary::default();

    // Collect everything first: setting variables while walking the
    // environment would invalidate the walk.
    let mut pending = PendingList::new();
    for raw in env.entries() {
        if !namespace.matches(entry_name(&raw)) {
            continue;
        }
        if let Err(e) = pending.push(&raw) {
            error!(
                event = "core.capture.copy_failed",
                name = entry_name(&raw),
                error = %e,
            );
            summary.skip(entry_name(&raw), &e);
        }
    }

    for raw in pending.drain() {
        let entry = match split_entry(&raw) {
            Ok(entry) => entry,
            Err(e) => {
                error!(event = "core.capture.copy_failed", name = entry_name(&raw), error = %e);
                summary.skip(entry_name(&raw), &e);
                continue;
            }
        };

        let stashed = match namespace.stash(&entry.name) {
            Ok(stashed) => stashed,
            Err(e) => {
                error!(
                    event = "core.capture.name_too_long",
                    name = %entry.name,
                    error = %e,
                );
                summary.skip(&entry.name, &e);
                continue;
            }
        };

        if let Err(e) = env.define(&stashed, &entry.value, true) {
            error!(
                event = "core.capture.set_failed",
                name = %stashed,
                value = %entry.value,
                error = %e,
            );
            summary.skip(&entry.name, &e);
            continue;
        }

        if verbose {
            info!(event = "core.capture.var_preserved", entry = %raw);
        }
        summary.preserved.push(entry.name);
    }

    info!(
        event = "core.capture.completed",
        preserved = summary.preserved.len(),
        skipped = summary.skipped.len(),
    );

    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::{EnvError, MemoryEnv};

    fn scenario_a() -> MemoryEnv {
        MemoryEnv::from_entries([
            "SLURM_JOBID=42",
            "SLURM_NNODES=4",
            "SLURM_RLIMIT_CPU=unlimited",
            "PATH=/bin",
        ])
        .unwrap()
    }

    #[test]
    fn test_capture_stashes_selected_vars() {
        let mut env = scenario_a();
        let summary = capture(&mut env, &Namespace::default(), false);

        assert_eq!(env.get("save_SLURM_JOBID"), Some("42"));
        assert_eq!(env.get("save_SLURM_NNODES"), Some("4"));
        assert!(!env.contains("save_SLURM_RLIMIT_CPU"));
        assert!(!env.contains("save_PATH"));
        assert_eq!(summary.preserved, vec!["SLURM_JOBID", "SLURM_NNODES"]);
        assert!(summary.is_complete());
    }

    #[test]
    fn test_capture_only_adds() {
        let mut env = scenario_a();
        capture(&mut env, &Namespace::default(), true);

        assert_eq!(env.get("SLURM_JOBID"), Some("42"));
        assert_eq!(env.get("SLURM_NNODES"), Some("4"));
        assert_eq!(env.get("SLURM_RLIMIT_CPU"), Some("unlimited"));
        assert_eq!(env.get("PATH"), Some("/bin"));
        assert_eq!(env.len(), 6);
    }

    #[test]
    fn test_capture_overwrites_existing_stash() {
        let mut env = MemoryEnv::from_entries(["SLURM_JOBID=42", "save_SLURM_JOBID=7"]).unwrap();
        capture(&mut env, &Namespace::default(), false);
        assert_eq!(env.get("save_SLURM_JOBID"), Some("42"));
    }

    #[test]
    fn test_capture_skips_name_too_long_and_continues() {
        let long_name = format!("SLURM_{}", "L".repeat(1100));
        let mut env = MemoryEnv::from_pairs([
            ("SLURM_A", "1"),
            (long_name.as_str(), "big"),
            ("SLURM_B", "2"),
        ]);

        let summary = capture(&mut env, &Namespace::default(), false);

        assert_eq!(env.get("save_SLURM_A"), Some("1"));
        assert_eq!(env.get("save_SLURM_B"), Some("2"));
        assert!(!env.contains(&format!("save_{}", long_name)));
        assert_eq!(summary.skipped.len(), 1);
        assert_eq!(summary.skipped[0].name, long_name);
        assert_eq!(summary.skipped[0].code, "ENV_NAME_TOO_LONG");
        assert!(!summary.is_complete());
    }

    #[test]
    fn test_capture_summary_serializes() {
        let mut env = MemoryEnv::from_entries(["SLURM_JOBID=42"]).unwrap();
        let summary = capture(&mut env, &Namespace::default(), false);

        let value = serde_json::to_value(&summary).unwrap();
        assert_eq!(value["preserved"][0], "SLURM_JOBID");
        assert_eq!(value["skipped"].as_array().map(Vec::len), Some(0));
    }

    #[test]
    fn test_capture_empty_value() {
        let mut env = MemoryEnv::from_entries(["SLURM_EMPTY="]).unwrap();
        capture(&mut env, &Namespace::default(), false);
        assert_eq!(env.get("save_SLURM_EMPTY"), Some(""));
    }

    /// Local environment that rewrites `SLURM_NNODES` as soon as anything is
    /// defined, the way the host does once it starts launching.
    struct RewritingEnv {
        inner: MemoryEnv,
    }

    impl LocalEnvironment for RewritingEnv {
        fn entries(&self) -> Vec<String> {
            self.inner.entries()
        }

        fn define(&mut self, name: &str, value: &str, overwrite: bool) -> Result<(), EnvError> {
            self.inner.define("SLURM_NNODES", "1", true)?;
            self.inner.define(name, value, overwrite)
        }
    }

    #[test]
    fn test_capture_uses_pre_mutation_values() {
        let mut env = RewritingEnv {
            inner: MemoryEnv::from_entries(["SLURM_JOBID=42", "SLURM_NNODES=4"]).unwrap(),
        };

        capture(&mut env, &Namespace::default(), false);

        assert_eq!(env.inner.get("SLURM_NNODES"), Some("1"));
        assert_eq!(env.inner.get("save_SLURM_NNODES"), Some("4"));
        assert_eq!(env.inner.get("save_SLURM_JOBID"), Some("42"));
    }

    /// Local environment that refuses one particular stash.
    struct FailingEnv {
        inner: MemoryEnv,
        reject: &'static str,
    }

    impl LocalEnvironment for FailingEnv {
        fn entries(&self) -> Vec<String> {
            self.inner.entries()
        }

        fn define(&mut self, name: &str, value: &str, overwrite: bool) -> Result<(), EnvError> {
            if name == self.reject {
                return Err(EnvError::SetFailed {
                    name: name.to_string(),
                    message: "Cannot allocate memory".to_string(),
                });
            }
            self.inner.define(name, value, overwrite)
        }
    }

    #[test]
    fn test_capture_set_failure_is_per_entry() {
        let mut env = FailingEnv {
            inner: MemoryEnv::from_entries(["SLURM_A=1", "SLURM_B=2", "SLURM_C=3"]).unwrap(),
            reject: "save_SLURM_B",
        };

        let summary = capture(&mut env, &Namespace::default(), false);

        assert_eq!(summary.preserved, vec!["SLURM_A", "SLURM_C"]);
        assert_eq!(summary.skipped.len(), 1);
        assert_eq!(summary.skipped[0].name, "SLURM_B");
        assert_eq!(summary.skipped[0].code, "ENV_SET_FAILED");
        assert!(!env.inner.contains("save_SLURM_B"));
    }
}
