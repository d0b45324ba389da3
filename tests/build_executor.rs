#![cfg(unix)]

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use gowatch::config::BuildConfig;
use gowatch::exec::{output_path, BuildCommand, BuildExecutor};
use gowatch_test_utils::init_tracing;
use gowatch_test_utils::scripts::FakeBuildTool;

fn os_args(cmd: &BuildCommand) -> Vec<String> {
    cmd.args()
        .iter()
        .map(|a: &OsString| a.to_string_lossy().into_owned())
        .collect()
}

#[test]
fn test_build_command_minimal() {
    let cfg = BuildConfig::default();
    let cmd = BuildCommand::new(&cfg, Path::new("/work/app"), Path::new("/work"));

    assert_eq!(cmd.program(), "go");
    assert_eq!(os_args(&cmd), vec!["build", "-o", "/work/app"]);
    assert_eq!(cmd.display(), "go build -o /work/app");
}

#[test]
fn test_build_command_full() {
    let cfg = BuildConfig {
        args: vec!["-race".to_string(), "-trimpath".to_string()],
        tags: "dev integration".to_string(),
        pkg: "./cmd/api, ./cmd/worker".to_string(),
        ..BuildConfig::default()
    };
    let cmd = BuildCommand::new(&cfg, Path::new("/work/bin/api"), Path::new("/work"));

    assert_eq!(
        os_args(&cmd),
        vec![
            "build",
            "-o",
            "/work/bin/api",
            "-race",
            "-trimpath",
            "-tags",
            "dev integration",
            "./cmd/api",
            "./cmd/worker",
        ]
    );
}

#[test]
fn test_output_path_joins_and_normalizes() {
    let out = output_path(Path::new("/work"), Path::new("./bin/../out"), "api");
    let expected = format!("/work/out/api{}", std::env::consts::EXE_SUFFIX);
    assert_eq!(out, PathBuf::from(expected));

    let abs = output_path(Path::new("/work"), Path::new("/opt/bin"), "api");
    assert!(abs.starts_with("/opt/bin"));
}

#[tokio::test]
async fn test_successful_build_produces_binary() {
    init_tracing();
    let tools = tempfile::tempdir().unwrap();
    let work = tempfile::tempdir().unwrap();
    let tool = FakeBuildTool::install(tools.path()).unwrap();

    let cfg = BuildConfig {
        tool: tool.tool(),
        pkg: "./cmd/api".to_string(),
        ..BuildConfig::default()
    };
    let binary = work.path().join("app");
    let executor = BuildExecutor::new(work.path());

    let result = executor.run(&cfg, &binary).await;

    assert!(result.success, "build failed: {:?}", result.error);
    assert!(result.error.is_none());
    assert!(binary.is_file());
    let log = tool.build_log();
    assert!(log[0].ends_with(&format!("build -o {} ./cmd/api", binary.display())), "{log:?}");
}

#[tokio::test]
async fn test_failing_build_reports_error() {
    init_tracing();
    let tools = tempfile::tempdir().unwrap();
    let work = tempfile::tempdir().unwrap();
    let tool = FakeBuildTool::install(tools.path()).unwrap();
    tool.set_failing(true).unwrap();

    let cfg = BuildConfig {
        tool: tool.tool(),
        ..BuildConfig::default()
    };
    let binary = work.path().join("app");
    let result = BuildExecutor::new(work.path()).run(&cfg, &binary).await;

    assert!(!result.success);
    let error = result.error.expect("failure carries an error");
    assert!(error.contains("status 2"), "{error}");
    assert!(!binary.exists());
}

#[tokio::test]
async fn test_missing_build_tool_is_a_failed_build() {
    init_tracing();
    let work = tempfile::tempdir().unwrap();
    let cfg = BuildConfig {
        tool: "/definitely/not/a/build-tool".to_string(),
        ..BuildConfig::default()
    };

    let result = BuildExecutor::new(work.path())
        .run(&cfg, &work.path().join("app"))
        .await;

    assert!(!result.success);
    assert!(result.error.unwrap().contains("failed to launch"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_builds_are_serialized() {
    init_tracing();
    let tools = tempfile::tempdir().unwrap();
    let work = tempfile::tempdir().unwrap();
    let tool = FakeBuildTool::install(tools.path()).unwrap();
    tool.set_build_time("0.3").unwrap();

    let cfg = Arc::new(BuildConfig {
        tool: tool.tool(),
        ..BuildConfig::default()
    });
    let binary = Arc::new(work.path().join("app"));
    let executor = Arc::new(BuildExecutor::new(work.path()));

    let mut handles = Vec::new();
    for _ in 0..3 {
        let (cfg, binary, executor) = (Arc::clone(&cfg), Arc::clone(&binary), Arc::clone(&executor));
        handles.push(tokio::spawn(async move { executor.run(&cfg, &binary).await }));
    }
    for h in handles {
        assert!(h.await.unwrap().success);
    }

    // Every start is immediately followed by its own end.
    let log = tool.build_log();
    assert_eq!(log.len(), 6, "{log:?}");
    for pair in log.chunks(2) {
        let start_pid = pair[0].split_whitespace().nth(1).unwrap();
        let end_pid = pair[1].split_whitespace().nth(1).unwrap();
        assert!(pair[0].starts_with("start "), "{log:?}");
        assert!(pair[1].starts_with("end "), "{log:?}");
        assert_eq!(start_pid, end_pid, "{log:?}");
    }
}
