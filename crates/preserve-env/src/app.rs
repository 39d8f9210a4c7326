use std::path::PathBuf;

use clap::{Arg, ArgAction, Command, value_parser};
use preserve_env_core::PRESERVE_OPTION;

pub fn build_cli() -> Command {
    Command::new("preserve-env")
        .about("Carry SLURM_* variables from the submitting shell into remote tasks")
        .version(env!("CARGO_PKG_VERSION"))
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Enable verbose logging output")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .arg(
            Arg::new("no-color")
                .long("no-color")
                .help("Disable colored output")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .value_name("PATH")
                .help("Config file (default: $PRESERVE_ENV_CONFIG or ~/.preserve-env/config.toml)")
                .value_parser(value_parser!(PathBuf))
                .global(true),
        )
        .arg(
            Arg::new("json")
                .long("json")
                .help("Print a JSON report instead of the environment")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .subcommand(phase_command(
            "capture",
            "Stash namespace variables as save_* in the submitting context",
        ))
        .subcommand(phase_command(
            "restore",
            "Unset SLURM_*/MPIRUN_* and restore save_SLURM_* stashes in a remote task",
        ))
}

fn phase_command(name: &'static str, about: &'static str) -> Command {
    Command::new(name)
        .about(about)
        .arg(
            Arg::new(PRESERVE_OPTION.name)
                .long(PRESERVE_OPTION.name)
                .value_name("verbose")
                .help(PRESERVE_OPTION.usage)
                .num_args(0..=1)
                .require_equals(true)
                .default_missing_value(""),
        )
        .arg(
            Arg::new("command")
                .help("Command to run under the resulting environment")
                .num_args(1..)
                .last(true),
        )
}
