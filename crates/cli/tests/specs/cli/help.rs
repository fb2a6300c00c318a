//! Help output specs

use crate::prelude::*;

#[test]
fn help_lists_every_command() {
    let temp = Project::empty();

    temp.mdag()
        .args(&["--help"])
        .passes()
        .stdout_has("verify")
        .stdout_has("stats")
        .stdout_has("compact")
        .stdout_has("export")
        .stdout_has("import")
        .stdout_has("lineage");
}

#[test]
fn version_flag_prints_version() {
    let temp = Project::empty();

    temp.mdag()
        .args(&["--version"])
        .passes()
        .stdout_has(env!("CARGO_PKG_VERSION"));
}

#[test]
fn subcommand_help_describes_arguments() {
    let temp = Project::empty();

    temp.mdag()
        .args(&["import", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--force").and(predicate::str::contains("<INPUT>")));
}
