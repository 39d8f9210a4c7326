//! Restore phase: rebuild the namespace in a remote task's job environment.
//!
//! Two strictly ordered passes, each scanning a fresh snapshot into a
//! [`PendingList`] before mutating anything:
//!
//! 1. **Unset** every `SLURM_*` and `MPIRUN_*` variable, so nothing the remote
//!    side set on its own survives.
//! 2. **Restore** every `save_SLURM_*` stash under its original name and drop
//!    the stash.

mod errors;

pub use errors::{RestoreError, RestorePass};

use serde::Serialize;
use tracing::{debug, error, info};

use crate::capture::SkippedVar;
use crate::env::{JobEnvironment, entry_name, split_entry};
use crate::namespace::Namespace;
use crate::pending::PendingList;
use crate::trigger::TriggerState;

/// Outcome of restoring one task's environment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RestoreSummary {
    /// False when the trigger was never enabled and nothing was touched.
    pub performed: bool,
    /// Names removed by the unset pass.
    pub unset: Vec<String>,
    /// Original names set from their stash.
    pub restored: Vec<String>,
    pub failed: Vec<SkippedVar>,
}

/// Restore stashed variables into `job_env`.
///
/// A no-op returning an empty summary unless `state` is enabled. Failing to
/// obtain the job environment at the start of either pass aborts; failing to
/// set an individual variable is reported and the loop continues.
pub fn restore<J>(
    state: &TriggerState,
    job_env: &mut J,
    namespace: &Namespace,
) -> Result<RestoreSummary, RestoreError>
where
    J: JobEnvironment + ?Sized,
{
    if !state.is_enabled() {
        debug!(event = "core.restore.skipped", reason = "not enabled");
        return Ok(RestoreSummary::default());
    }

    let verbose = state.is_debug();
    let mut summary = RestoreSummary {
        performed: true,
        ..Default::default()
    };

    info!(event = "core.restore.started");

    unset_namespace(job_env, namespace, verbose, &mut summary)?;
    restore_stashes(job_env, namespace, verbose, &mut summary)?;

    info!(
        event = "core.restore.completed",
        unset = summary.unset.len(),
        restored = summary.restored.len(),
        failed = summary.failed.len(),
    );

    Ok(summary)
}

fn snapshot<J>(job_env: &J, pass: RestorePass) -> Result<Vec<String>, RestoreError>
where
    J: JobEnvironment + ?Sized,
{
    job_env.get().map_err(|source| {
        error!(
            event = "core.restore.job_env_unavailable",
            pass = %pass,
            error = %source,
        );
        RestoreError::JobEnvUnavailable { pass, source }
    })
}

fn collect<F>(entries: &[String], select: F, summary: &mut RestoreSummary) -> PendingList
where
    F: Fn(&str) -> bool,
{
    let mut pending = PendingList::new();
    for raw in entries {
        let name = entry_name(raw);
        if !select(name) {
            continue;
        }
        if let Err(e) = pending.push(raw) {
            error!(event = "core.restore.copy_failed", name = name, error = %e);
            summary.failed.push(SkippedVar::new(name, &e));
        }
    }
    pending
}

fn unset_namespace<J>(
    job_env: &mut J,
    namespace: &Namespace,
    verbose: bool,
    summary: &mut RestoreSummary,
) -> Result<(), RestoreError>
where
    J: JobEnvironment + ?Sized,
{
    let entries = snapshot(job_env, RestorePass::Unset)?;
    let pending = collect(&entries, |name| namespace.should_clear(name), summary);

    for raw in pending.drain() {
        let entry = match split_entry(&raw) {
            Ok(entry) => entry,
            Err(e) => {
                error!(event = "core.restore.copy_failed", name = entry_name(&raw), error = %e);
                summary.failed.push(SkippedVar::new(entry_name(&raw), &e));
                continue;
            }
        };

        job_env.unset(&entry.name);
        if verbose {
            info!(event = "core.restore.var_unset", name = %entry.name);
        }
        summary.unset.push(entry.name);
    }

    Ok(())
}

fn restore_stashes<J>(
    job_env: &mut J,
    namespace: &Namespace,
    verbose: bool,
    summary: &mut RestoreSummary,
) -> Result<(), RestoreError>
where
    J: JobEnvironment + ?Sized,
{
    let entries = snapshot(job_env, RestorePass::Restore)?;
    let pending = collect(&entries, |name| namespace.is_stashed(name), summary);

    for raw in pending.drain() {
        let entry = match split_entry(&raw) {
            Ok(entry) => entry,
            Err(e) => {
                error!(event = "core.restore.copy_failed", name = entry_name(&raw), error = %e);
                summary.failed.push(SkippedVar::new(entry_name(&raw), &e));
                continue;
            }
        };

        // Selected by the restore prefix, so the stash prefix is always present.
        let Some(original) = namespace.unstash(&entry.name) else {
            continue;
        };

        if verbose {
            info!(event = "core.restore.var_set", name = original);
        }

        match job_env.set(original, &entry.value, true) {
            Ok(()) => summary.restored.push(original.to_string()),
            Err(e) => {
                error!(
                    event = "core.restore.set_failed",
                    name = original,
                    error = %e,
                );
                summary.failed.push(SkippedVar::new(original, &e));
            }
        }

        // The stash goes either way; it must not leak into the task.
        job_env.unset(&entry.name);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::{EnvError, MemoryEnv};

    fn enabled() -> TriggerState {
        TriggerState::Enabled { debug: false }
    }

    #[test]
    fn test_restore_disabled_is_noop() {
        let original = MemoryEnv::from_entries(["SLURM_JOBID=99", "save_SLURM_JOBID=42"]).unwrap();
        let mut env = original.clone();

        let summary = restore(&TriggerState::Disabled, &mut env, &Namespace::default()).unwrap();

        assert_eq!(env, original);
        assert_eq!(summary, RestoreSummary::default());
        assert!(!summary.performed);
    }

    #[test]
    fn test_restore_scenario_b() {
        let mut env = MemoryEnv::from_entries([
            "SLURM_JOBID=99",
            "save_SLURM_JOBID=42",
            "MPIRUN_RANK=3",
        ])
        .unwrap();

        let summary = restore(&enabled(), &mut env, &Namespace::default()).unwrap();

        assert_eq!(env.get("SLURM_JOBID"), Some("42"));
        assert!(!env.contains("save_SLURM_JOBID"));
        assert!(!env.contains("MPIRUN_RANK"));
        assert_eq!(env.len(), 1);
        assert_eq!(summary.unset, vec!["SLURM_JOBID", "MPIRUN_RANK"]);
        assert_eq!(summary.restored, vec!["SLURM_JOBID"]);
        assert!(summary.failed.is_empty());
    }

    #[test]
    fn test_restore_clears_unstashed_namespace_vars() {
        let mut env = MemoryEnv::from_entries([
            "SLURM_STEP_ID=0",
            "SLURM_RLIMIT_CPU=10",
            "HOME=/home/u",
        ])
        .unwrap();

        restore(&enabled(), &mut env, &Namespace::default()).unwrap();

        assert_eq!(env.iter().collect::<Vec<_>>(), vec![("HOME", "/home/u")]);
    }

    #[test]
    fn test_restore_ignores_capture_exclusions() {
        // A stash named like an excluded variable is still restored
        let mut env = MemoryEnv::from_entries(["save_SLURM_RLIMIT_CPU=unlimited"]).unwrap();

        let summary = restore(&enabled(), &mut env, &Namespace::default()).unwrap();

        assert_eq!(env.get("SLURM_RLIMIT_CPU"), Some("unlimited"));
        assert!(!env.contains("save_SLURM_RLIMIT_CPU"));
        assert_eq!(summary.restored, vec!["SLURM_RLIMIT_CPU"]);
    }

    #[test]
    fn test_restore_leaves_other_stashes() {
        let mut env = MemoryEnv::from_entries(["save_PATH=/opt/bin", "PATH=/bin"]).unwrap();
        restore(&enabled(), &mut env, &Namespace::default()).unwrap();
        assert_eq!(env.get("save_PATH"), Some("/opt/bin"));
        assert_eq!(env.get("PATH"), Some("/bin"));
    }

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum Op {
        Get,
        Set(String),
        Unset(String),
    }

    /// Job environment that records every call and can refuse some of them.
    struct RecordingJobEnv {
        inner: MemoryEnv,
        ops: std::cell::RefCell<Vec<Op>>,
        fail_get_at: Option<usize>,
        reject_set: Option<&'static str>,
    }

    impl RecordingJobEnv {
        fn new(entries: &[&str]) -> Self {
            Self {
                inner: MemoryEnv::from_entries(entries).unwrap(),
                ops: std::cell::RefCell::new(Vec::new()),
                fail_get_at: None,
                reject_set: None,
            }
        }

        fn ops(&self) -> Vec<Op> {
            self.ops.borrow().clone()
        }
    }

    impl JobEnvironment for RecordingJobEnv {
        fn get(&self) -> Result<Vec<String>, EnvError> {
            let mut ops = self.ops.borrow_mut();
            let gets = ops.iter().filter(|op| **op == Op::Get).count();
            ops.push(Op::Get);
            if self.fail_get_at == Some(gets) {
                return Err(EnvError::GetFailed {
                    message: "job environment unavailable".to_string(),
                });
            }
            JobEnvironment::get(&self.inner)
        }

        fn set(&mut self, name: &str, value: &str, overwrite: bool) -> Result<(), EnvError> {
            self.ops.borrow_mut().push(Op::Set(name.to_string()));
            if self.reject_set == Some(name) {
                return Err(EnvError::SetFailed {
                    name: name.to_string(),
                    message: "rejected".to_string(),
                });
            }
            JobEnvironment::set(&mut self.inner, name, value, overwrite)
        }

        fn unset(&mut self, name: &str) {
            self.ops.borrow_mut().push(Op::Unset(name.to_string()));
            self.inner.unset(name);
        }
    }

    #[test]
    fn test_restore_passes_are_scan_then_drain() {
        let mut env = RecordingJobEnv::new(&[
            "SLURM_A=stale",
            "MPIRUN_RANK=3",
            "save_SLURM_A=fresh",
        ]);

        restore(&enabled(), &mut env, &Namespace::default()).unwrap();

        assert_eq!(
            env.ops(),
            vec![
                Op::Get,
                Op::Unset("SLURM_A".to_string()),
                Op::Unset("MPIRUN_RANK".to_string()),
                Op::Get,
                Op::Set("SLURM_A".to_string()),
                Op::Unset("save_SLURM_A".to_string()),
            ]
        );
        assert_eq!(env.inner.get("SLURM_A"), Some("fresh"));
    }

    #[test]
    fn test_restore_first_get_failure_is_fatal() {
        let mut env = RecordingJobEnv::new(&["SLURM_A=1"]);
        env.fail_get_at = Some(0);

        let err = restore(&enabled(), &mut env, &Namespace::default()).unwrap_err();

        assert!(matches!(
            err,
            RestoreError::JobEnvUnavailable {
                pass: RestorePass::Unset,
                ..
            }
        ));
        assert_eq!(env.ops(), vec![Op::Get]);
        assert_eq!(env.inner.get("SLURM_A"), Some("1"));
    }

    #[test]
    fn test_restore_second_get_failure_is_fatal() {
        let mut env = RecordingJobEnv::new(&["SLURM_A=1", "save_SLURM_A=2"]);
        env.fail_get_at = Some(1);

        let err = restore(&enabled(), &mut env, &Namespace::default()).unwrap_err();

        assert!(matches!(
            err,
            RestoreError::JobEnvUnavailable {
                pass: RestorePass::Restore,
                ..
            }
        ));
        // The unset pass already ran
        assert!(!env.inner.contains("SLURM_A"));
        assert_eq!(env.inner.get("save_SLURM_A"), Some("2"));
    }

    #[test]
    fn test_restore_set_failure_is_per_entry() {
        let mut env = RecordingJobEnv::new(&[
            "save_SLURM_A=1",
            "save_SLURM_B=2",
            "save_SLURM_C=3",
        ]);
        env.reject_set = Some("SLURM_B");

        let summary = restore(&enabled(), &mut env, &Namespace::default()).unwrap();

        assert_eq!(summary.restored, vec!["SLURM_A", "SLURM_C"]);
        assert_eq!(summary.failed.len(), 1);
        assert_eq!(summary.failed[0].name, "SLURM_B");
        assert_eq!(summary.failed[0].code, "ENV_SET_FAILED");
        assert_eq!(env.inner.get("SLURM_A"), Some("1"));
        assert_eq!(env.inner.get("SLURM_C"), Some("3"));
        assert!(!env.inner.contains("SLURM_B"));
        // Stashes are dropped even when their restore failed
        assert_eq!(env.inner.names_with_prefix("save_").count(), 0);
    }
}
