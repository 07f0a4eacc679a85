//! S2 — stage timeout: a stalled agent fails the execution and leaves
//! the parent document in place.

use crate::prelude::Home;

#[test]
fn process_sync_timeout_leaves_parent_in_place() {
    let home = Home::with_slow_agent(10);

    let added = home.ckb().args(&["-o", "json", "cascade", "add", "slow idea"]).passes();
    let doc_id: serde_json::Value = serde_json::from_str(&added.stdout()).unwrap();
    let doc_id = doc_id["doc_id"].as_u64().unwrap();

    let processed = home
        .ckb()
        .env("CKB_DEFAULT_TIMEOUT_SECS", "1")
        .args(&["-o", "json", "cascade", "process", "idea", "--doc", &doc_id.to_string(), "--sync"])
        .fails();
    processed.exit_code(1);

    home.ckb()
        .args(&["-o", "json", "cascade", "show", "idea"])
        .passes()
        .stdout_has(&format!("\"id\": {doc_id}"));
}
