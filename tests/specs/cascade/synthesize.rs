//! S6 — synthesize then process: merge three `analyzed` documents into
//! one, then drive the merged document normally.

use crate::prelude::Home;

#[test]
fn synthesize_merges_sources_then_the_merge_processes_normally() {
    let home = Home::with_agent_output("planned output");

    for content in ["A", "B", "C"] {
        home.ckb().args(&["cascade", "add", content, "--stage", "analyzed"]).passes();
    }

    let synthesized =
        home.ckb().args(&["-o", "json", "cascade", "synthesize", "analyzed"]).passes();
    let result: serde_json::Value = serde_json::from_str(&synthesized.stdout()).unwrap();
    let synth_id = result["doc_id"].as_u64().unwrap();

    let merged = home
        .ckb()
        .args(&["-o", "json", "cascade", "show", "analyzed"])
        .passes();
    let merged_stdout = merged.stdout();
    assert!(merged_stdout.contains('A') && merged_stdout.contains('B') && merged_stdout.contains('C'));

    home.ckb()
        .args(&["-o", "json", "cascade", "show", "done"])
        .passes()
        .stdout_has("\"id\"");

    home.ckb()
        .args(&["-o", "json", "cascade", "process", "analyzed", "--doc", &synth_id.to_string(), "--sync"])
        .passes()
        .stdout_has("\"status\": \"completed\"");
}

#[test]
fn synthesize_refuses_fewer_than_two_sources() {
    let home = Home::with_agent_output("x");
    home.ckb().args(&["cascade", "add", "lonely", "--stage", "analyzed"]).passes();

    home.ckb()
        .args(&["cascade", "synthesize", "analyzed"])
        .fails()
        .stderr_has("at least 2");
}
