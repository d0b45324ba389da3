#![cfg(unix)]

use std::sync::Arc;
use std::time::Duration;

use gowatch::engine::{CycleOutcome, Debouncer, Pipeline, PipelineState};
use gowatch::exec::KillOutcome;
use gowatch::watch::{Dispatcher, EventFilter, IgnorePatterns};
use notify::event::{DataChange, ModifyKind};
use notify::{Event, EventKind};
use gowatch_test_utils::builders::ConfigBuilder;
use gowatch_test_utils::scripts::FakeBuildTool;
use gowatch_test_utils::{init_tracing, wait_until};

#[tokio::test]
async fn test_successful_cycle_restarts_program() {
    init_tracing();
    let tools = tempfile::tempdir().unwrap();
    let work = tempfile::tempdir().unwrap();
    let tool = FakeBuildTool::install(tools.path()).unwrap();
    let cfg = ConfigBuilder::new()
        .app_name("api")
        .build_tool(tool.tool())
        .run_arg("-port=8080")
        .env("APP_ENV=test")
        .build();

    let pipeline = Pipeline::new(work.path(), &cfg);
    assert_eq!(pipeline.binary(), work.path().join("api"));

    let outcome = pipeline.run_cycle().await;

    let (build, restart) = match outcome {
        CycleOutcome::Restarted { build, restart } => (build, restart),
        other => panic!("expected a restart, got {other:?}"),
    };
    assert!(build.success);
    assert_eq!(restart.kill, KillOutcome::NotRunning);
    assert!(restart.pid.is_some());
    assert_eq!(pipeline.state(), PipelineState::Watching);

    assert!(wait_until(Duration::from_secs(5), || !tool.run_log().is_empty()).await);
    let line = &tool.run_log()[0];
    assert!(line.ends_with(" test -port=8080"), "{line}");

    pipeline.supervisor().kill().await;
}

#[tokio::test]
async fn test_failed_build_keeps_old_program() {
    init_tracing();
    let tools = tempfile::tempdir().unwrap();
    let work = tempfile::tempdir().unwrap();
    let tool = FakeBuildTool::install(tools.path()).unwrap();
    let cfg = ConfigBuilder::new().build_tool(tool.tool()).build();
    let pipeline = Pipeline::new(work.path(), &cfg);

    assert!(matches!(pipeline.run_cycle().await, CycleOutcome::Restarted { .. }));
    let running = pipeline.supervisor().pid().await;
    assert!(running.is_some());

    tool.set_failing(true).unwrap();
    let outcome = pipeline.run_cycle().await;

    assert!(matches!(outcome, CycleOutcome::BuildFailed(ref r) if !r.success));
    assert_eq!(pipeline.supervisor().pid().await, running);
    assert!(pipeline.supervisor().is_running().await);
    assert_eq!(pipeline.state(), PipelineState::Watching);

    // Recovery: the next good build replaces the program.
    tool.set_failing(false).unwrap();
    let CycleOutcome::Restarted { restart, .. } = pipeline.run_cycle().await else {
        panic!("expected a restart after recovery");
    };
    assert_eq!(restart.kill, KillOutcome::Killed);
    assert_ne!(restart.pid, running);

    pipeline.supervisor().kill().await;
}

#[tokio::test]
async fn test_auto_run_disabled_only_builds() {
    init_tracing();
    let tools = tempfile::tempdir().unwrap();
    let work = tempfile::tempdir().unwrap();
    let tool = FakeBuildTool::install(tools.path()).unwrap();
    let cfg = ConfigBuilder::new()
        .build_tool(tool.tool())
        .auto_run(false)
        .build();
    let pipeline = Pipeline::new(work.path(), &cfg);

    let outcome = pipeline.run_cycle().await;

    assert!(matches!(outcome, CycleOutcome::Built(ref r) if r.success));
    assert!(pipeline.binary().is_file());
    assert_eq!(pipeline.supervisor().pid().await, None);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_state_is_published_during_cycle() {
    init_tracing();
    let tools = tempfile::tempdir().unwrap();
    let work = tempfile::tempdir().unwrap();
    let tool = FakeBuildTool::install(tools.path()).unwrap();
    tool.set_build_time("0.5").unwrap();
    let cfg = ConfigBuilder::new()
        .build_tool(tool.tool())
        .auto_run(false)
        .build();
    let pipeline = Arc::new(Pipeline::new(work.path(), &cfg));
    assert_eq!(pipeline.state(), PipelineState::Idle);

    let mut states = pipeline.subscribe();
    let cycle = {
        let pipeline = Arc::clone(&pipeline);
        tokio::spawn(async move { pipeline.run_cycle().await })
    };

    states.changed().await.unwrap();
    assert_eq!(*states.borrow_and_update(), PipelineState::Building);

    cycle.await.unwrap();
    assert_eq!(pipeline.state(), PipelineState::Watching);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_change_during_build_leaves_pipeline_debouncing() {
    init_tracing();
    let tools = tempfile::tempdir().unwrap();
    let work = tempfile::tempdir().unwrap();
    let tool = FakeBuildTool::install(tools.path()).unwrap();
    tool.set_build_time("0.4").unwrap();
    let cfg = ConfigBuilder::new()
        .build_tool(tool.tool())
        .delay_ms(60_000)
        .auto_run(false)
        .build();

    let pipeline = Arc::new(Pipeline::new(work.path(), &cfg));
    let debouncer = Arc::new(Debouncer::new(cfg.build.delay));
    let filter = Arc::new(EventFilter::from_config(
        work.path(),
        &cfg.watch,
        Arc::new(IgnorePatterns::builtin().unwrap()),
    ));
    let dispatcher = Dispatcher::new(filter, Arc::clone(&debouncer), Arc::clone(&pipeline));

    let cycle = {
        let pipeline = Arc::clone(&pipeline);
        tokio::spawn(async move { pipeline.run_cycle().await })
    };
    tokio::time::sleep(Duration::from_millis(100)).await;

    let save = Event::new(EventKind::Modify(ModifyKind::Data(DataChange::Content)))
        .add_path(work.path().join("main.go"));
    assert_eq!(dispatcher.dispatch(&save), 1);

    assert!(matches!(cycle.await.unwrap(), CycleOutcome::Built(_)));
    assert!(debouncer.is_pending());
    assert_eq!(pipeline.state(), PipelineState::Debouncing);
}

#[tokio::test]
async fn test_latest_scheduled_cycle_ends_watching() {
    init_tracing();
    let tools = tempfile::tempdir().unwrap();
    let work = tempfile::tempdir().unwrap();
    let tool = FakeBuildTool::install(tools.path()).unwrap();
    let cfg = ConfigBuilder::new()
        .build_tool(tool.tool())
        .auto_run(false)
        .build();
    let pipeline = Pipeline::new(work.path(), &cfg);

    let stale = pipeline.schedule();
    let latest = pipeline.schedule();
    assert_eq!(pipeline.state(), PipelineState::Debouncing);

    pipeline.run_scheduled(stale).await;
    assert_eq!(pipeline.state(), PipelineState::Debouncing);

    pipeline.run_scheduled(latest).await;
    assert_eq!(pipeline.state(), PipelineState::Watching);
}
