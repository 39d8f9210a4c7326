use std::path::{Path, PathBuf};

use clap::ArgMatches;
use tracing::error;

use preserve_env_core::{Namespace, PRESERVE_OPTION, PreserveEnvError, load_config, trigger};

mod capture;
mod env_changes;
mod json_types;
mod output;
mod restore;

pub(crate) fn run_command(matches: &ArgMatches) -> Result<(), Box<dyn std::error::Error>> {
    let config_path = matches.get_one::<PathBuf>("config").map(PathBuf::as_path);
    let json = matches.get_flag("json");

    match matches.subcommand() {
        Some(("capture", sub_matches)) => {
            capture::handle_capture_command(sub_matches, config_path, json)
        }
        Some(("restore", sub_matches)) => {
            restore::handle_restore_command(sub_matches, config_path, json)
        }
        _ => {
            error!(event = "cli.command_unknown");
            Err("Unknown command".into())
        }
    }
}

/// Load the naming rules. Only called once the trigger option is present,
/// so a broken config never affects an inert run.
pub(crate) fn load_namespace(
    config_path: Option<&Path>,
) -> Result<Namespace, Box<dyn std::error::Error>> {
    match load_config(config_path) {
        Ok(config) => Ok(Namespace::from_config(&config)),
        Err(e) => {
            eprintln!("{}", crate::color::error(&e.to_string()));
            error!(
                event = "cli.config_load_failed",
                error = %e,
                code = e.error_code(),
            );
            Err(e.into())
        }
    }
}

/// The trigger option as the host saw it: `None` when absent, otherwise its
/// optional argument.
pub(crate) fn trigger_arg(sub_matches: &ArgMatches) -> Option<Option<&str>> {
    sub_matches
        .get_one::<String>(PRESERVE_OPTION.name)
        .map(|arg| Some(arg.as_str()).filter(|a| !a.is_empty()))
}

/// Whether the trigger option asks for per-variable diagnostics.
pub(crate) fn wants_debug(matches: &ArgMatches) -> bool {
    matches
        .subcommand()
        .and_then(|(_, sub)| trigger_arg(sub))
        .is_some_and(trigger::arg_requests_debug)
}
