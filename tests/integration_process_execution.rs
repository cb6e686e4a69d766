//! Process execution tests driven through a stub spawner

mod common;

use common::mock_services::{RecordingReporter, StubSpawner};
use common::test_helpers::{fake_git, fake_svn};
use pretty_assertions::assert_eq;
use scm_checkout::domain::value_objects::platform::Platform;
use scm_checkout::infrastructure::process::{
    ExecOptions, ProcessExecutor, ProgressParser, ScmExecutor,
};
use scm_checkout::infrastructure::scm::ScmErrorCode;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;

fn args(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| value.to_string()).collect()
}

#[tokio::test]
async fn test_cancelling_a_running_child_kills_it_once() {
    let spawner = Arc::new(StubSpawner::hanging());
    let executor = Arc::new(ProcessExecutor::with_spawner(spawner.clone()));
    let token = CancellationToken::new();
    let (spawned_tx, spawned_rx) = oneshot::channel();

    let task = {
        let executor = executor.clone();
        let token = token.clone();
        tokio::spawn(async move {
            let options = ExecOptions::new()
                .with_cancellation_token(token)
                .with_on_spawn(move |pid| {
                    let _ = spawned_tx.send(pid);
                });
            executor
                .exec(&fake_git(), Path::new("/tmp"), &args(&["clone", "x", "y"]), options)
                .await
        })
    };

    let pid = spawned_rx.await.unwrap();
    assert_eq!(pid, Some(4242));
    token.cancel();

    let error = tokio::time::timeout(Duration::from_secs(5), task)
        .await
        .expect("exec settles after cancellation")
        .unwrap()
        .unwrap_err();

    assert!(error.is_cancelled());
    assert_eq!(error.message, "Cancelled");
    assert_eq!(error.command.as_deref(), Some("clone"));
    assert_eq!(spawner.spawned(), 1);
    assert_eq!(spawner.kills(), 1);
}

#[tokio::test]
async fn test_pre_cancelled_token_never_spawns() {
    let spawner = Arc::new(StubSpawner::finishing(0, b"", b""));
    let executor = ProcessExecutor::with_spawner(spawner.clone());
    let token = CancellationToken::new();
    token.cancel();

    let error = executor
        .exec(
            &fake_git(),
            Path::new("/tmp"),
            &args(&["clone"]),
            ExecOptions::new().with_cancellation_token(token),
        )
        .await
        .unwrap_err();

    assert!(error.is_cancelled());
    assert_eq!(spawner.spawned(), 0);
    assert_eq!(spawner.kills(), 0);
}

#[tokio::test]
async fn test_progress_lines_reach_the_parser() {
    let stderr = b"Cloning into 'y'...\r\nCounting objects: 100% (4/4)\rReceiving objects:  50% (2/4)\rReceiving objects: 100% (4/4), done.\nResolving deltas: 100% (1/1), done.\n";
    let spawner = Arc::new(StubSpawner::finishing(0, b"", stderr));
    let executor = ProcessExecutor::with_spawner(spawner.clone());
    let reporter = Arc::new(RecordingReporter::default());

    let result = executor
        .exec(
            &fake_git(),
            Path::new("/tmp/.y.clone"),
            &args(&["clone", "--progress", "x", "y"]),
            ExecOptions::new().with_line_consumer(ProgressParser::new(reporter.clone())),
        )
        .await
        .unwrap();

    assert_eq!(result.exit_code, 0);
    assert_eq!(reporter.increments(), vec![10, 30, 20, 40]);
    assert_eq!(reporter.total(), 100);
    assert!(result.stderr.contains("Resolving deltas"));
}

#[tokio::test]
async fn test_child_environment_and_working_directory() {
    let spawner = Arc::new(StubSpawner::finishing(0, b"", b""));
    let executor = ProcessExecutor::with_spawner(spawner.clone()).with_locale("C.UTF-8");

    executor
        .exec(
            &fake_svn(),
            Path::new("/srv/addons/.x.clone"),
            &args(&["checkout", "u", "d"]),
            ExecOptions::new(),
        )
        .await
        .unwrap();

    let request = spawner.last_request().unwrap();
    assert_eq!(request.program, Path::new("/usr/bin/svn"));
    assert_eq!(request.args, args(&["checkout", "u", "d"]));
    assert_eq!(
        request.working_directory.as_deref(),
        Some(Path::new("/srv/addons/.x.clone"))
    );
    assert!(request
        .environment_overrides
        .contains(&("LC_ALL".to_string(), "C.UTF-8".to_string())));
    assert!(request
        .environment_overrides
        .contains(&("LANG".to_string(), "C.UTF-8".to_string())));
    assert!(!request.pipe_stdin);
}

#[tokio::test]
async fn test_windows_working_directory_gets_upper_case_drive() {
    let spawner = Arc::new(StubSpawner::finishing(0, b"", b""));
    let executor = ProcessExecutor::with_spawner(spawner.clone()).with_platform(Platform::Windows);

    executor
        .exec(&fake_git(), Path::new(r"c:\x"), &args(&["clone"]), ExecOptions::new())
        .await
        .unwrap();

    let request = spawner.last_request().unwrap();
    assert_eq!(request.working_directory.as_deref(), Some(Path::new(r"C:\x")));
}

#[tokio::test]
async fn test_svn_authorization_failure_is_classified() {
    let stderr = b"svn: E170001: Authorization failed\n";
    let spawner = Arc::new(StubSpawner::finishing(1, b"partial", stderr));
    let executor = ProcessExecutor::with_spawner(spawner);

    let error = executor
        .exec(
            &fake_svn(),
            Path::new("/tmp"),
            &args(&["checkout", "https://svn.example.com/private", "d"]),
            ExecOptions::new(),
        )
        .await
        .unwrap_err();

    assert_eq!(error.code, ScmErrorCode::AuthorizationFailed);
    assert_eq!(error.exit_code, Some(1));
    assert_eq!(error.stdout.as_deref(), Some("partial"));
    assert_eq!(error.stderr.as_deref(), Some("svn: E170001: Authorization failed\n"));
    assert_eq!(error.message, "Failed to execute /usr/bin/svn");
    assert_eq!(error.command.as_deref(), Some("checkout"));
}

#[tokio::test]
async fn test_unrecognized_failure_is_unclassified() {
    let spawner = Arc::new(StubSpawner::finishing(3, b"", b"something odd happened\n"));
    let executor = ProcessExecutor::with_spawner(spawner);

    let error = executor
        .exec(&fake_git(), Path::new("/tmp"), &args(&["clone"]), ExecOptions::new())
        .await
        .unwrap_err();

    assert_eq!(error.code, ScmErrorCode::Unclassified);
    assert_eq!(error.exit_code, Some(3));
    assert!(error.render().contains("something odd happened"));
}

#[tokio::test]
async fn test_stdout_is_decoded_with_requested_encoding() {
    // "café" in windows-1252
    let spawner = Arc::new(StubSpawner::finishing(0, &[0x63, 0x61, 0x66, 0xE9], b""));
    let executor = ProcessExecutor::with_spawner(spawner);

    let result = executor
        .exec(
            &fake_svn(),
            Path::new("/tmp"),
            &args(&["info"]),
            ExecOptions::new().with_encoding("latin1"),
        )
        .await
        .unwrap();

    assert_eq!(result.stdout, "café");
}
