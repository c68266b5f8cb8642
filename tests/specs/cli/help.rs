//! CLI help output specs
//!
//! Verify help text displays for every subcommand.

use crate::prelude::*;

#[test]
fn outpost_cli_help_shows_usage() {
    cli().args(&["--help"]).passes().stdout_has("Usage:");
}

#[test]
fn outpost_cli_no_args_shows_usage_and_exits_nonzero() {
    cli().fails_with(2).stderr_has("Usage:");
}

#[test]
fn apply_help_shows_flags() {
    cli().args(&["apply", "--help"]).passes().stdout_has("--dry-run").stdout_has("--include-deletions");
}

#[test]
fn trigger_help_shows_usage() {
    cli().args(&["trigger", "--help"]).passes().stdout_has("Usage:");
}

#[test]
fn agents_help_shows_subcommands() {
    cli().args(&["agents", "--help"]).passes().stdout_has("list").stdout_has("locations");
}
