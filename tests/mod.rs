mod common;

use std::sync::Arc;
use chrono::{Duration, Utc};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use deploy_watch::enums::scan_mode::ScanMode;
use deploy_watch::services::monitor::Monitor;
use common::{fast_config, repository, run, FakeGithub};

fn organization() -> FakeGithub {
    let now = Utc::now();
    FakeGithub::new(vec![
        repository(1, "api", false),
        repository(2, "web", false),
        repository(3, "worker", false),
        repository(4, "legacy", true),
        repository(5, "old-site", true),
    ])
    .with_runs(
        "api",
        vec![
            run(10, "Deploy to prod", "waiting", now - Duration::minutes(5)),
            run(11, "CI", "completed", now - Duration::minutes(50)),
        ],
    )
    .with_runs(
        "worker",
        vec![
            run(30, "Deploy to prod", "waiting", now - Duration::minutes(20)),
            run(31, "Deploy to prod", "waiting", now - Duration::minutes(1)),
        ],
    )
}

#[tokio::test]
async fn pending_scan_reports_waiting_runs_oldest_first() {
    let api = Arc::new(organization());
    let monitor = Monitor::new(api.clone(), &fast_config()).unwrap();
    let token = CancellationToken::new();

    let jobs = monitor.get_pending_jobs(&token).await.unwrap();

    let ids: Vec<u64> = jobs.iter().map(|job| job.run_id).collect();
    assert_eq!(ids, vec![30, 10, 31]);
    assert!(jobs.iter().all(|job| job.status == "waiting"));
    assert!(jobs.iter().all(|job| job.environment == "prod"));

    assert_eq!(api.calls_for("legacy"), 0);
    assert_eq!(api.calls_for("old-site"), 0);
    assert!(api.calls_for("web") > 0);

    let progress = monitor.get_scan_progress();
    assert_eq!(progress.scan_mode, ScanMode::Idle);
    assert_eq!(progress.total_repos, 5);
    assert_eq!(progress.archived_repos, 2);
    assert_eq!(progress.completed_repos, 3);
}

#[tokio::test]
async fn environment_filter_drops_other_targets() {
    let now = Utc::now();
    let api = Arc::new(
        FakeGithub::new(vec![repository(1, "api", false)])
            .with_runs("api", vec![run(10, "Deploy to staging", "waiting", now)]),
    );
    let monitor = Monitor::new(api, &fast_config()).unwrap();

    let jobs = monitor.get_pending_jobs(&CancellationToken::new()).await.unwrap();
    assert!(jobs.is_empty());
}

#[tokio::test]
async fn recent_scan_is_newest_first_and_capped() {
    let api = Arc::new(organization());
    let mut config = fast_config();
    config.monitor.recent_job_limit = 3;
    let monitor = Monitor::new(api.clone(), &config).unwrap();

    let jobs = monitor.get_recent_jobs(&CancellationToken::new()).await.unwrap();

    let ids: Vec<u64> = jobs.iter().map(|job| job.run_id).collect();
    assert_eq!(ids, vec![31, 10, 30]);
    assert_eq!(api.calls_for("legacy"), 0);
}

#[tokio::test]
async fn progress_channel_sees_the_scan_start() {
    let monitor = Monitor::new(Arc::new(organization()), &fast_config()).unwrap();
    let (sender, mut receiver) = mpsc::channel(32);

    monitor.get_pending_jobs_with_progress(&CancellationToken::new(), sender).await.unwrap();

    let first = receiver.recv().await.unwrap();
    assert_eq!(first.scan_mode, ScanMode::ScanningSmart);
    assert_eq!(first.completed_repos, 0);
    assert_eq!(first.active_repos, 3);

    let mut last = first;
    while let Ok(snapshot) = receiver.try_recv() {
        assert!(snapshot.completed_repos >= last.completed_repos);
        last = snapshot;
    }
    assert_eq!(last.completed_repos, 3);
}

#[tokio::test(start_paused = true)]
async fn monitoring_survives_a_failed_cycle_and_stops_on_cancel() {
    let api = Arc::new(organization().fail_listings(1));
    let monitor = Arc::new(Monitor::new(api, &fast_config()).unwrap());
    let token = CancellationToken::new();
    let (sender, mut receiver) = mpsc::channel(4);

    let handle = {
        let monitor = Arc::clone(&monitor);
        let token = token.clone();
        tokio::spawn(async move { monitor.start_monitoring(&token, sender).await })
    };

    let first = receiver.recv().await.unwrap();
    assert_eq!(first.cycle, 1);
    assert!(first.error().is_some());

    let second = receiver.recv().await.unwrap();
    assert_eq!(second.cycle, 2);
    assert_eq!(second.jobs().len(), 3);
    assert_eq!(monitor.get_scan_progress().scan_cycle_count, 2);

    token.cancel();
    handle.await.unwrap();
    assert!(receiver.recv().await.is_none());
}

#[tokio::test]
async fn cancelled_token_stops_a_pending_scan() {
    let monitor = Monitor::new(Arc::new(organization()), &fast_config()).unwrap();
    let token = CancellationToken::new();
    token.cancel();

    let error = monitor.get_pending_jobs(&token).await.unwrap_err();
    assert!(error.is_cancellation());
    assert_eq!(monitor.get_scan_progress().scan_mode, ScanMode::Idle);
}
