use std::path::Path;

use clap::ArgMatches;
use tracing::{error, info};

use preserve_env_core::{
    ExecutionContext, LocalEnvironment, MemoryEnv, PreserveEnvError, ProcessEnv, RestoreSummary,
    TriggerState, restore,
};

use super::env_changes::EnvChanges;
use super::json_types::RestoreReport;
use super::output;

pub(crate) fn handle_restore_command(
    sub_matches: &ArgMatches,
    config_path: Option<&Path>,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    info!(event = "cli.restore_started");

    let mut state = TriggerState::default();
    let (summary, changes) = match super::trigger_arg(sub_matches) {
        Some(optarg) => {
            let namespace = super::load_namespace(config_path)?;

            // The inherited environment plays the job environment of a remote task.
            let before = MemoryEnv::from_entries(ProcessEnv::new().entries())?;
            let mut job_env = before.clone();
            state.handle_option(optarg, ExecutionContext::Remote, &mut job_env, &namespace);

            let summary = match restore(&state, &mut job_env, &namespace) {
                Ok(summary) => summary,
                Err(e) => {
                    eprintln!("{}", crate::color::error(&format!("preserve-env: {}", e)));
                    error!(
                        event = "cli.restore_failed",
                        error = %e,
                        code = e.error_code(),
                    );
                    return Err(e.into());
                }
            };

            output::report_skipped("restore", &summary.failed);
            let changes = EnvChanges::between(&before, &job_env);
            (summary, changes)
        }
        None => {
            info!(event = "cli.restore_inert", reason = "option not given");
            (RestoreSummary::default(), EnvChanges::default())
        }
    };

    info!(
        event = "cli.restore_completed",
        performed = summary.performed,
        restored = summary.restored.len(),
    );

    if let Some(argv) = output::trailing_command(sub_matches) {
        return output::exec_with_changes(&argv, &changes);
    }

    if json {
        output::print_json(&RestoreReport {
            enabled: state.is_enabled(),
            debug: state.is_debug(),
            summary,
            environment: output::env_map(&changes),
        })
    } else {
        output::print_env(&changes)?;
        Ok(())
    }
}
