//! `prime` — emit a snapshot of ready documents and recent executions.

use crate::prelude::Home;

#[test]
fn prime_lists_ready_documents_across_every_non_terminal_stage() {
    let home = Home::with_agent_output("x");

    home.ckb().args(&["cascade", "add", "idea one"]).passes();
    home.ckb().args(&["cascade", "add", "already planned", "--stage", "planned"]).passes();

    home.ckb()
        .args(&["prime", "--format", "json"])
        .passes()
        .stdout_has("idea one")
        .stdout_has("already planned");
}

#[test]
fn prime_reports_nothing_ready_on_an_empty_store() {
    let home = Home::with_agent_output("x");

    home.ckb().args(&["prime"]).passes().stdout_has("no documents ready");
}
