use std::os::unix::fs::PermissionsExt;

use ckb_core::{DocumentStore, Stage};
use serial_test::serial;
use tempfile::tempdir;

use super::*;
use crate::context::Context;

fn write_script(dir: &std::path::Path, body: &str) -> std::path::PathBuf {
    let path = dir.join("agent.sh");
    std::fs::write(&path, body).unwrap();
    let mut perms = std::fs::metadata(&path).unwrap().permissions();
    perms.set_mode(0o755);
    std::fs::set_permissions(&path, perms).unwrap();
    path
}

fn open_ctx(home: &std::path::Path, script: &std::path::Path) -> Context {
    std::env::set_var("CKB_HOME", home);
    std::env::set_var("CKB_AGENT_BINARY", script);
    Context::open(&home.join("db")).unwrap()
}

#[tokio::test]
#[serial]
async fn handle_reports_no_ready_documents_when_the_store_is_empty() {
    let home = tempdir().unwrap();
    let script = write_script(home.path(), "#!/bin/sh\necho '{\"type\":\"content\",\"content\":\"x\"}'\n");
    let ctx = open_ctx(home.path(), &script);

    let args = PrimeArgs { format: OutputFormat::Text, quiet: false, verbose: false };
    handle(args, &ctx).await.unwrap();
}

#[tokio::test]
#[serial]
async fn handle_lists_documents_ready_at_every_non_terminal_stage() {
    let home = tempdir().unwrap();
    let script = write_script(home.path(), "#!/bin/sh\necho '{\"type\":\"content\",\"content\":\"x\"}'\n");
    let ctx = open_ctx(home.path(), &script);

    DocumentStore::create(&*ctx.store, "a".into(), "c".into(), None, None, Some(Stage::Idea))
        .await
        .unwrap();
    DocumentStore::create(&*ctx.store, "b".into(), "c".into(), None, None, Some(Stage::Planned))
        .await
        .unwrap();
    DocumentStore::create(&*ctx.store, "done".into(), "c".into(), None, None, Some(Stage::Done))
        .await
        .unwrap();

    let args = PrimeArgs { format: OutputFormat::Json, quiet: false, verbose: false };
    handle(args, &ctx).await.unwrap();
}

#[tokio::test]
#[serial]
async fn handle_with_verbose_includes_completed_executions_not_only_running_ones() {
    let home = tempdir().unwrap();
    let script = write_script(home.path(), "#!/bin/sh\necho '{\"type\":\"content\",\"content\":\"x\"}'\n");
    let ctx = open_ctx(home.path(), &script);

    let doc_id =
        DocumentStore::create(&*ctx.store, "a".into(), "c".into(), None, None, Some(Stage::Idea))
            .await
            .unwrap();
    ctx.engine.process(Stage::Idea, Some(doc_id), true).await.unwrap();

    let args = PrimeArgs { format: OutputFormat::Json, quiet: true, verbose: true };
    handle(args, &ctx).await.unwrap();
}
