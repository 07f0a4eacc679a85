//! S1 — happy sync cascade: `idea` -> `prompt`, parent retired to `done`.

use crate::prelude::Home;

#[test]
fn process_idea_creates_a_child_document_and_retires_the_parent() {
    let home = Home::with_agent_output("Refined prompt text");

    let added = home
        .ckb()
        .args(&["-o", "json", "cascade", "add", "Add dark mode", "--title", "X"])
        .passes();
    let doc_id: serde_json::Value = serde_json::from_str(&added.stdout()).unwrap();
    let doc_id = doc_id["doc_id"].as_u64().unwrap();

    let processed = home
        .ckb()
        .args(&["-o", "json", "cascade", "process", "idea", "--doc", &doc_id.to_string(), "--sync"])
        .passes();
    let result: serde_json::Value = serde_json::from_str(&processed.stdout()).unwrap();
    assert_eq!(result["status"], "completed");
    let child_id = result["child_doc_id"].as_u64().expect("a non-empty run must create a child document");

    home.ckb()
        .args(&["-o", "json", "cascade", "show", "prompt"])
        .passes()
        .stdout_has(&format!("\"id\": {child_id}"))
        .stdout_has("Refined prompt text")
        .stdout_has("X [idea\u{2192}prompt]");

    home.ckb()
        .args(&["-o", "json", "cascade", "show", "done"])
        .passes()
        .stdout_has(&format!("\"id\": {doc_id}"));
}
