#![cfg(target_os = "linux")]

use std::sync::Arc;
use std::time::Duration;

use gowatch::fs::{FileSystem, RealFileSystem};
use gowatch::watch::{spawn_watcher, Watcher};
use gowatch_test_utils::builders::ConfigBuilder;
use gowatch_test_utils::scripts::FakeBuildTool;
use gowatch_test_utils::{init_tracing, wait_until};

fn real_fs() -> Arc<dyn FileSystem> {
    Arc::new(RealFileSystem)
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_watch_set_respects_skip_rules() {
    init_tracing();
    let work = tempfile::tempdir().unwrap();
    let root = work.path();
    std::fs::create_dir_all(root.join("internal/api")).unwrap();
    std::fs::create_dir_all(root.join(".git/objects")).unwrap();
    std::fs::create_dir_all(root.join("vendor/dep")).unwrap();
    std::fs::create_dir_all(root.join("testdata")).unwrap();

    let cfg = ConfigBuilder::new()
        .exclude("testdata")
        .build_tool("/definitely/not/a/build-tool")
        .auto_run(false)
        .build();
    let watcher = Watcher::new(root, cfg, real_fs()).unwrap();
    assert_eq!(watcher.watch_roots(), vec![root.to_path_buf()]);

    let handle = watcher.start_watch().unwrap();
    let set = handle.watch_set();

    assert!(set.contains(root));
    assert!(set.contains(&root.join("internal")));
    assert!(set.contains(&root.join("internal/api")));
    assert!(!set.contains(&root.join(".git")));
    assert!(!set.contains(&root.join("vendor")));
    assert!(!set.contains(&root.join("testdata")));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_missing_extra_watch_path_is_skipped() {
    init_tracing();
    let work = tempfile::tempdir().unwrap();
    let cfg = ConfigBuilder::new()
        .watch_path("../does-not-exist")
        .build_tool("/definitely/not/a/build-tool")
        .build();

    let handle = spawn_watcher(work.path(), cfg, real_fs()).unwrap();
    assert_eq!(handle.watch_set().len(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_saving_source_rebuilds_and_restarts() {
    init_tracing();
    let tools = tempfile::tempdir().unwrap();
    let work = tempfile::tempdir().unwrap();
    let root = work.path();
    std::fs::write(root.join("main.go"), "package main\n").unwrap();
    std::fs::create_dir_all(root.join("vendor/dep")).unwrap();
    let tool = FakeBuildTool::install(tools.path()).unwrap();

    let cfg = ConfigBuilder::new()
        .build_tool(tool.tool())
        .delay_ms(100)
        .build();
    let handle = spawn_watcher(root, cfg, real_fs()).unwrap();
    let pipeline = Arc::clone(handle.pipeline());

    // Initial build at startup.
    assert!(wait_until(Duration::from_secs(10), || tool.run_log().len() == 1).await);
    let first_pid = pipeline.supervisor().pid().await;
    assert!(first_pid.is_some());

    // Files that must not trigger.
    std::fs::write(root.join("notes.md"), "hi").unwrap();
    std::fs::write(root.join("main.go~"), "backup").unwrap();
    std::fs::write(root.join("vendor/dep/dep.go"), "package dep").unwrap();
    tokio::time::sleep(Duration::from_millis(500)).await;
    assert_eq!(tool.starts(), 1, "{:?}", tool.build_log());

    // A real save.
    std::fs::write(root.join("main.go"), "package main\n\nfunc main() {}\n").unwrap();
    assert!(wait_until(Duration::from_secs(10), || tool.run_log().len() == 2).await);
    tokio::time::sleep(Duration::from_millis(500)).await;
    assert_eq!(tool.starts(), 2, "{:?}", tool.build_log());

    let second_pid = pipeline.supervisor().pid().await;
    assert!(second_pid.is_some());
    assert_ne!(first_pid, second_pid);

    pipeline.supervisor().kill().await;
}
