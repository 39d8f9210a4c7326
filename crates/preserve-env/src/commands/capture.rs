use std::path::Path;

use clap::ArgMatches;
use tracing::info;

use preserve_env_core::{ExecutionContext, ProcessEnv, TriggerState};

use super::env_changes::EnvChanges;
use super::json_types::CaptureReport;
use super::output;

pub(crate) fn handle_capture_command(
    sub_matches: &ArgMatches,
    config_path: Option<&Path>,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    info!(event = "cli.capture_started");

    let mut state = TriggerState::default();
    let summary = match super::trigger_arg(sub_matches) {
        Some(optarg) => {
            let namespace = super::load_namespace(config_path)?;
            let mut process_env = ProcessEnv::new();
            state.handle_option(optarg, ExecutionContext::Local, &mut process_env, &namespace)
        }
        None => {
            info!(event = "cli.capture_inert", reason = "option not given");
            None
        }
    };

    if let Some(summary) = &summary {
        output::report_skipped("capture", &summary.skipped);
    }

    info!(
        event = "cli.capture_completed",
        enabled = state.is_enabled(),
        preserved = summary.as_ref().map_or(0, |s| s.preserved.len()),
    );

    // Capture writes into this process's environment, so children simply inherit it.
    let changes = EnvChanges::default();

    if let Some(argv) = output::trailing_command(sub_matches) {
        return output::exec_with_changes(&argv, &changes);
    }

    if json {
        output::print_json(&CaptureReport {
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
