//! `agent <prompt>` — ad hoc agent run with no stored definition behind it.

use crate::prelude::Home;

#[test]
fn ask_runs_a_free_form_prompt_and_reports_completion() {
    let home = Home::with_agent_output("investigated the flaky test");

    home.ckb()
        .args(&["-o", "json", "agent", "ask", "investigate the flaky test", "--tags", "triage"])
        .passes()
        .stdout_has("\"status\": \"completed\"");
}

#[test]
fn run_rejects_an_unknown_agent_name() {
    let home = Home::with_agent_output("n/a");

    home.ckb()
        .args(&["agent", "run", "does-not-exist"])
        .fails()
        .stderr_has("no agent definition");
}
