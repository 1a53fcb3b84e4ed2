//! Poll session behavior against scripted backends

use gq_core::{
    ClientConfig, CorrelationMatrix, CorrelationMetrics, Correlations, Entities, Threats,
};
use gq_poll::{
    DataStatus, PollController, PollPhase, SessionRegistry, SharedGenerator, TickOutcome,
};
use gq_synth::FixtureGenerator;
use gq_test_utils::{
    malformed_pairs_payloads, sample_entities_payload, sample_pairs_payload, Reply,
    ScriptedFetcher,
};
use gq_validate::Validate;
use parking_lot::Mutex;
use pretty_assertions::assert_eq;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

fn generator() -> SharedGenerator {
    Arc::new(Mutex::new(FixtureGenerator::seeded(7)))
}

fn config() -> ClientConfig {
    ClientConfig::new().with_poll_interval_secs(10)
}

#[tokio::test]
async fn server_error_on_correlation_yields_unit_diagonal_matrix() {
    let fetcher = Arc::new(ScriptedFetcher::always(Reply::status(500)));
    let controller = PollController::<Correlations>::new(&config(), fetcher.clone(), generator());

    assert_eq!(controller.tick().await, TickOutcome::Synthetic);

    let state = controller.current();
    assert_eq!(state.status, Some(DataStatus::Synthetic));
    let snapshot = state.snapshot.expect("synthetic snapshot committed");
    assert!(snapshot.is_synthetic());

    let matrix = CorrelationMatrix::from_pairs(&snapshot.records);
    assert_eq!(matrix.size(), 10);
    for asset in &matrix.assets {
        assert_eq!(matrix.get(asset, asset), Some(1.0));
    }
    assert_eq!(fetcher.paths(), vec!["/gq-core/correlation/matrix".to_string()]);
}

#[tokio::test]
async fn empty_pairs_give_zero_rows_and_zero_metrics() {
    let fetcher = Arc::new(ScriptedFetcher::always(Reply::ok(json!({ "pairs": [] }))));
    let controller = PollController::<Correlations>::new(&config(), fetcher, generator());

    assert_eq!(controller.tick().await, TickOutcome::Live);

    let state = controller.current();
    let snapshot = state.snapshot.unwrap();
    assert_eq!(snapshot.len(), 0);
    assert_eq!(snapshot.metrics, CorrelationMetrics::default());
    assert!(!snapshot.metrics.avg_coefficient.is_nan());
    assert_eq!(state.status, Some(DataStatus::Live));
}

#[tokio::test]
async fn valid_payload_commits_records_unchanged() {
    let payload = sample_pairs_payload();
    let expected = Correlations::validate(&payload).unwrap();
    let fetcher = Arc::new(ScriptedFetcher::always(Reply::ok(payload)));
    let controller = PollController::<Correlations>::new(&config(), fetcher, generator());

    assert_eq!(controller.tick().await, TickOutcome::Live);

    let snapshot = controller.current().snapshot.unwrap();
    assert_eq!(snapshot.records, expected);
    assert_eq!(snapshot.metrics.pair_count, 3);
    assert_eq!(snapshot.metrics.strong_pair_count, 1);
}

#[tokio::test]
async fn malformed_payloads_fall_back_to_synthetic() {
    for payload in malformed_pairs_payloads() {
        let fetcher = Arc::new(ScriptedFetcher::always(Reply::ok(payload.clone())));
        let controller = PollController::<Correlations>::new(&config(), fetcher, generator());

        assert_eq!(controller.tick().await, TickOutcome::Synthetic, "{payload}");
        let state = controller.current();
        assert!(state.record_count() > 0, "{payload}");
        assert_eq!(state.phase, PollPhase::Synthetic);
        let error = state.last_error.unwrap();
        assert!(error.starts_with("invalid payload"), "{payload}: {error}");
    }
}

#[tokio::test]
async fn recovery_clears_error_after_live_data() {
    let fetcher = Arc::new(ScriptedFetcher::sequence(
        [Reply::status(502)],
        Reply::ok(sample_entities_payload()),
    ));
    let controller = PollController::<Entities>::new(&config(), fetcher, generator());

    assert_eq!(controller.tick().await, TickOutcome::Synthetic);
    assert!(controller.current().last_error.is_some());

    assert_eq!(controller.tick().await, TickOutcome::Live);
    let state = controller.current();
    assert_eq!(state.status, Some(DataStatus::Live));
    assert_eq!(state.record_count(), 2);
    assert!(state.last_error.is_none());
    assert_eq!(state.generation, 2);
}

#[tokio::test]
async fn disabled_fallback_keeps_previous_snapshot() {
    let fetcher = Arc::new(ScriptedFetcher::sequence(
        [Reply::ok(sample_pairs_payload())],
        Reply::status(503),
    ));
    let config = config().with_synthetic_fallback(false);
    let controller = PollController::<Correlations>::new(&config, fetcher, generator());

    assert_eq!(controller.tick().await, TickOutcome::Live);
    assert_eq!(controller.tick().await, TickOutcome::Error);

    let state = controller.current();
    assert_eq!(state.status, Some(DataStatus::Error));
    assert_eq!(state.phase, PollPhase::Populated);
    let snapshot = state.snapshot.unwrap();
    assert!(!snapshot.is_synthetic());
    assert_eq!(snapshot.len(), 3);
    assert!(state.last_error.unwrap().contains("503"));
}

#[tokio::test(start_paused = true)]
async fn slow_stale_response_is_discarded() {
    let slow = json!({ "pairs": [
        { "asset_a": "OLD", "asset_b": "DATA", "coefficient": 0.1, "strength": "weak" }
    ]});
    let fetcher = Arc::new(ScriptedFetcher::sequence(
        [
            Reply::ok(slow).after(Duration::from_secs(5)),
            Reply::ok(sample_pairs_payload()),
        ],
        Reply::status(500),
    ));
    let controller = PollController::<Correlations>::new(&config(), fetcher, generator());

    let (first, second) = tokio::join!(controller.tick(), controller.tick());
    assert_eq!(first, TickOutcome::Stale);
    assert_eq!(second, TickOutcome::Live);

    let state = controller.current();
    assert_eq!(state.generation, 2);
    let snapshot = state.snapshot.unwrap();
    assert_eq!(snapshot.records[0].asset_a, "BTC");
}

#[tokio::test(start_paused = true)]
async fn spawned_session_polls_on_interval() {
    let fetcher = Arc::new(ScriptedFetcher::always(Reply::ok(sample_pairs_payload())));
    let controller = Arc::new(PollController::<Correlations>::new(&config(), fetcher.clone(), generator()));
    let handle = controller.spawn();

    let mut rx = handle.subscribe();
    rx.wait_for(|state| state.status == Some(DataStatus::Live))
        .await
        .unwrap();
    assert_eq!(fetcher.calls(), 1);

    tokio::time::sleep(Duration::from_secs(25)).await;
    assert_eq!(fetcher.calls(), 3);
    assert_eq!(handle.current().generation, 3);

    handle.stop().await;
}

#[tokio::test(start_paused = true)]
async fn stop_during_inflight_request_commits_nothing() {
    let fetcher = Arc::new(ScriptedFetcher::always(
        Reply::ok(sample_pairs_payload()).after(Duration::from_secs(5)),
    ));
    let controller = Arc::new(PollController::<Correlations>::new(&config(), fetcher.clone(), generator()));
    let handle = controller.spawn();

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(fetcher.calls(), 1);
    assert!(handle.current().is_loading());

    let controller = Arc::clone(handle.controller());
    handle.stop().await;
    tokio::time::sleep(Duration::from_secs(60)).await;

    let state = controller.current();
    assert_eq!(state.phase, PollPhase::Terminal);
    assert!(state.snapshot.is_none());
    assert_eq!(state.generation, 0);
    assert_eq!(fetcher.calls(), 1);
    assert_eq!(controller.tick().await, TickOutcome::Stopped);
}

#[tokio::test(start_paused = true)]
async fn dropping_handle_stops_polling() {
    let fetcher = Arc::new(ScriptedFetcher::always(Reply::status(500)));
    let controller = Arc::new(PollController::<Threats>::new(&config(), fetcher.clone(), generator()));
    let handle = controller.spawn();

    tokio::time::sleep(Duration::from_millis(10)).await;
    assert_eq!(fetcher.calls(), 1);
    drop(handle);

    tokio::time::sleep(Duration::from_secs(60)).await;
    assert_eq!(fetcher.calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn registry_remount_replaces_running_session() {
    let first = Arc::new(ScriptedFetcher::always(Reply::ok(sample_pairs_payload())));
    let second = Arc::new(ScriptedFetcher::always(Reply::ok(sample_pairs_payload())));
    let registry = SessionRegistry::new();

    let a = Arc::new(PollController::<Correlations>::new(&config(), first.clone(), generator()).with_name("matrix"));
    registry.mount(a.spawn());
    tokio::time::sleep(Duration::from_millis(10)).await;

    let b = Arc::new(PollController::<Correlations>::new(&config(), second.clone(), generator()).with_name("matrix"));
    registry.mount(b.spawn());
    assert_eq!(registry.len(), 1);

    tokio::time::sleep(Duration::from_secs(35)).await;
    assert_eq!(first.calls(), 1);
    assert_eq!(second.calls(), 4);
    assert_eq!(registry.requests_issued("matrix"), Some(4));

    assert!(registry.unmount("matrix"));
    tokio::time::sleep(Duration::from_secs(30)).await;
    assert_eq!(second.calls(), 4);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn overlapping_ticks_never_leave_panel_loading() {
    let replies = (0..24u64).map(|n| Reply::ok(sample_pairs_payload()).after(Duration::from_millis((n * 7) % 5)));
    let fetcher = Arc::new(ScriptedFetcher::sequence(replies, Reply::ok(sample_pairs_payload())));
    let controller = Arc::new(PollController::<Correlations>::new(&config(), fetcher, generator()));

    let mut ticks = tokio::task::JoinSet::new();
    for _ in 0..24 {
        let c = Arc::clone(&controller);
        ticks.spawn(async move { c.tick().await });
    }
    let mut live = 0;
    while let Some(outcome) = ticks.join_next().await {
        if outcome.unwrap() == TickOutcome::Live {
            live += 1;
        }
    }

    let state = controller.current();
    assert!(live >= 1);
    assert_eq!(state.phase, PollPhase::Populated);
    assert_eq!(state.status, Some(DataStatus::Live));
}
