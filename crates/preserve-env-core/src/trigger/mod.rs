//! The `--preserve-slurm-env` switch and the state it drives.
//!
//! The state starts [`TriggerState::Disabled`]; the first occurrence of the
//! option enables it for the rest of the job, and a verbose argument adds
//! debug output. There is no way back to disabled. Hosts hold the state and
//! hand it to [`crate::restore::restore`] when a remote task starts.

use tracing::{debug, info};

use crate::capture::{CaptureSummary, capture};
use crate::env::LocalEnvironment;
use crate::namespace::Namespace;

/// Whether a registered option takes an argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgPolicy {
    None,
    Required,
    Optional,
}

/// One entry of the option table a host registers on the plugin's behalf.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OptionSpec {
    pub name: &'static str,
    pub arginfo: Option<&'static str>,
    pub usage: &'static str,
    pub has_arg: ArgPolicy,
    pub val: i32,
}

pub const PRESERVE_OPTION: OptionSpec = OptionSpec {
    name: "preserve-slurm-env",
    arginfo: Some("verbose"),
    usage: "Preserve all current SLURM env vars in remote task(s). \
            Useful with \"salloc [opts] srun --pty -n1 -N1 $SHELL\" \
            so that remote environment mirrors salloc's environment",
    has_arg: ArgPolicy::Optional,
    val: 0,
};

/// Where the option handler is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionContext {
    /// The submitting process (e.g. `srun`).
    Local,
    /// A task on a compute node.
    Remote,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TriggerState {
    #[default]
    Disabled,
    Enabled {
        debug: bool,
    },
}

impl TriggerState {
    pub fn is_enabled(&self) -> bool {
        matches!(self, TriggerState::Enabled { .. })
    }

    pub fn is_debug(&self) -> bool {
        matches!(self, TriggerState::Enabled { debug: true })
    }

    /// Record one occurrence of the option.
    ///
    /// On the transition into enabled in the local context, capture runs
    /// immediately against `env` and its summary is returned. Later
    /// occurrences only ever add debug.
    pub fn handle_option<E>(
        &mut self,
        optarg: Option<&str>,
        context: ExecutionContext,
        env: &mut E,
        namespace: &Namespace,
    ) -> Option<CaptureSummary>
    where
        E: LocalEnvironment + ?Sized,
    {
        let verbose = arg_requests_debug(optarg);

        match *self {
            TriggerState::Disabled => {
                *self = TriggerState::Enabled { debug: verbose };
                info!(
                    event = "core.trigger.enabled",
                    option = PRESERVE_OPTION.name,
                    debug = verbose,
                    context = ?context,
                );

                match context {
                    ExecutionContext::Local => Some(capture(env, namespace, verbose)),
                    ExecutionContext::Remote => None,
                }
            }
            TriggerState::Enabled { debug: was_debug } => {
                let debug_now = was_debug || verbose;
                *self = TriggerState::Enabled { debug: debug_now };
                debug!(event = "core.trigger.repeated", debug = debug_now);
                None
            }
        }
    }
}

/// `verbose` or `v` turns on per-variable diagnostics.
pub fn arg_requests_debug(optarg: Option<&str>) -> bool {
    matches!(optarg, Some("verbose") | Some("v"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::MemoryEnv;

    fn local_env() -> MemoryEnv {
        MemoryEnv::from_entries(["SLURM_JOBID=42", "PATH=/bin"]).unwrap()
    }

    #[test]
    fn test_default_is_disabled() {
        let state = TriggerState::default();
        assert!(!state.is_enabled());
        assert!(!state.is_debug());
    }

    #[test]
    fn test_local_option_enables_and_captures() {
        let mut state = TriggerState::default();
        let mut env = local_env();

        let summary = state
            .handle_option(None, ExecutionContext::Local, &mut env, &Namespace::default())
            .expect("capture should run locally");

        assert_eq!(state, TriggerState::Enabled { debug: false });
        assert_eq!(summary.preserved, vec!["SLURM_JOBID"]);
        assert_eq!(env.get("save_SLURM_JOBID"), Some("42"));
    }

    #[test]
    fn test_remote_option_enables_without_capture() {
        let mut state = TriggerState::default();
        let mut env = local_env();
        let before = env.clone();

        let summary =
            state.handle_option(None, ExecutionContext::Remote, &mut env, &Namespace::default());

        assert!(summary.is_none());
        assert!(state.is_enabled());
        assert_eq!(env, before);
    }

    #[test]
    fn test_verbose_argument_sets_debug() {
        for arg in ["verbose", "v"] {
            let mut state = TriggerState::default();
            let mut env = MemoryEnv::new();
            state.handle_option(
                Some(arg),
                ExecutionContext::Remote,
                &mut env,
                &Namespace::default(),
            );
            assert!(state.is_debug(), "{} should enable debug", arg);
        }
    }

    #[test]
    fn test_other_argument_does_not_set_debug() {
        let mut state = TriggerState::default();
        let mut env = MemoryEnv::new();
        state.handle_option(
            Some("quiet"),
            ExecutionContext::Remote,
            &mut env,
            &Namespace::default(),
        );
        assert!(state.is_enabled());
        assert!(!state.is_debug());
    }

    #[test]
    fn test_repeated_option_never_recaptures_or_disables() {
        let mut state = TriggerState::default();
        let mut env = local_env();
        let ns = Namespace::default();

        state.handle_option(None, ExecutionContext::Local, &mut env, &ns);
        env.define("SLURM_JOBID", "7", true).unwrap();

        let second = state.handle_option(Some("v"), ExecutionContext::Local, &mut env, &ns);
        assert!(second.is_none());
        assert_eq!(env.get("save_SLURM_JOBID"), Some("42"));
        assert_eq!(state, TriggerState::Enabled { debug: true });

        state.handle_option(None, ExecutionContext::Local, &mut env, &ns);
        assert_eq!(state, TriggerState::Enabled { debug: true });
    }

    #[test]
    fn test_option_spec() {
        assert_eq!(PRESERVE_OPTION.name, "preserve-slurm-env");
        assert_eq!(PRESERVE_OPTION.has_arg, ArgPolicy::Optional);
        assert!(PRESERVE_OPTION.usage.contains("salloc"));
    }
}
