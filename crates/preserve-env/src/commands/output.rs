use std::collections::BTreeMap;
use std::ffi::OsStr;
use std::io::{self, Write};
use std::process::Command;

use clap::ArgMatches;
use serde::Serialize;
use tracing::{error, info};

use preserve_env_core::SkippedVar;

use super::env_changes::EnvChanges;

/// Inherited environment with `changes` applied, as a sorted map for JSON reports.
pub(crate) fn env_map(changes: &EnvChanges) -> BTreeMap<String, String> {
    let mut map: BTreeMap<String, String> = std::env::vars_os()
        .filter(|(name, _)| !changes.touches(name))
        .map(|(name, value)| {
            (
                name.to_string_lossy().into_owned(),
                value.to_string_lossy().into_owned(),
            )
        })
        .collect();
    map.extend(changes.set.iter().cloned());
    map
}

pub(crate) fn print_json<T: Serialize>(report: &T) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(report)?);
    Ok(())
}

/// Print the inherited environment with `changes` applied as `name=value`
/// lines, like `env`. Bytes are written as-is.
pub(crate) fn print_env(changes: &EnvChanges) -> io::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();

    for (name, value) in std::env::vars_os() {
        if changes.touches(&name) {
            continue;
        }
        write_os(&mut out, &name)?;
        out.write_all(b"=")?;
        write_os(&mut out, &value)?;
        out.write_all(b"\n")?;
    }
    for (name, value) in &changes.set {
        writeln!(out, "{}={}", name, value)?;
    }
    out.flush()
}

#[cfg(unix)]
fn write_os(out: &mut impl Write, s: &OsStr) -> io::Result<()> {
    use std::os::unix::ffi::OsStrExt;
    out.write_all(s.as_bytes())
}

#[cfg(not(unix))]
fn write_os(out: &mut impl Write, s: &OsStr) -> io::Result<()> {
    out.write_all(s.to_string_lossy().as_bytes())
}

pub(crate) fn report_skipped(phase: &str, skipped: &[SkippedVar]) {
    for var in skipped {
        eprintln!(
            "{}",
            crate::color::warning(&format!("preserve-env: {}: {}", phase, var.reason))
        );
    }
}

/// Trailing command after `--`, if any.
pub(crate) fn trailing_command(sub_matches: &ArgMatches) -> Option<Vec<String>> {
    sub_matches
        .get_many::<String>("command")
        .map(|args| args.cloned().collect())
}

/// Run `argv` under the inherited environment plus `changes` and exit with its status.
pub(crate) fn exec_with_changes(
    argv: &[String],
    changes: &EnvChanges,
) -> Result<(), Box<dyn std::error::Error>> {
    let Some((program, args)) = argv.split_first() else {
        return Err("No command given".into());
    };

    info!(
        event = "cli.exec_started",
        program = %program,
        removed = changes.removed.len(),
        set = changes.set.len(),
    );

    let mut command = Command::new(program);
    command.args(args);
    changes.apply_to(&mut command);

    let status = command.status().map_err(|e| {
        eprintln!(
            "{}",
            crate::color::error(&format!("Failed to run '{}': {}", program, e))
        );
        error!(event = "cli.exec_failed", program = %program, error = %e);
        e
    })?;

    info!(event = "cli.exec_completed", program = %program, status = %status);

    if !status.success() {
        std::process::exit(status.code().unwrap_or(1));
    }
    Ok(())
}
