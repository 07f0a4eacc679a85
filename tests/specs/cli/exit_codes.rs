//! Exit code contract: 0 success, 1 operational failure, 2 usage error.

use crate::prelude::Home;

#[test]
fn unknown_stage_name_is_a_usage_error() {
    let home = Home::with_agent_output("x");

    home.ckb()
        .args(&["cascade", "add", "x", "--stage", "nonsense"])
        .fails()
        .exit_code(2)
        .stderr_has("unknown stage");
}

#[test]
fn unknown_subcommand_is_rejected_by_clap_before_reaching_the_store() {
    let home = Home::with_agent_output("x");

    home.ckb().args(&["not-a-command"]).fails();
}

#[test]
fn advance_past_done_is_refused() {
    let home = Home::with_agent_output("x");

    let added = home.ckb().args(&["-o", "json", "cascade", "add", "x", "--stage", "done"]).passes();
    let doc_id: serde_json::Value = serde_json::from_str(&added.stdout()).unwrap();
    let doc_id = doc_id["doc_id"].as_u64().unwrap();

    home.ckb().args(&["cascade", "advance", &doc_id.to_string()]).fails();
}
