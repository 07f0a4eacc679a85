//! S4 — PR extraction: a PR URL mentioned in the agent's output lands on
//! both the parent and child documents.

use crate::prelude::Home;

#[test]
fn process_planned_extracts_the_pr_url_onto_parent_and_child() {
    let home = Home::with_agent_output("Done. PR_URL: https://github.com/acme/x/pull/17");

    let added = home
        .ckb()
        .args(&["-o", "json", "cascade", "add", "ship it", "--stage", "planned"])
        .passes();
    let doc_id: serde_json::Value = serde_json::from_str(&added.stdout()).unwrap();
    let doc_id = doc_id["doc_id"].as_u64().unwrap();

    let processed = home
        .ckb()
        .args(&["-o", "json", "cascade", "process", "planned", "--doc", &doc_id.to_string(), "--sync"])
        .passes();
    let result: serde_json::Value = serde_json::from_str(&processed.stdout()).unwrap();
    assert_eq!(result["status"], "completed");
    assert_eq!(result["pr_url"], "https://github.com/acme/x/pull/17");

    home.ckb()
        .args(&["-o", "json", "cascade", "show", "done"])
        .passes()
        .stdout_has("https://github.com/acme/x/pull/17");
}
