//! HttpFetcher against a local warp server

use gq_core::{ClientConfig, CorrelationMatrix, Correlations, Entities, Query};
use gq_poll::{DataStatus, FetchError, Fetcher, HttpFetcher, PollController, TickOutcome};
use gq_synth::FixtureGenerator;
use gq_test_utils::sample_entities_payload;
use parking_lot::Mutex;
use pretty_assertions::assert_eq;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use warp::http::StatusCode;
use warp::Filter;

async fn start_server() -> SocketAddr {
    let matrix = warp::path!("gq-core" / "correlation" / "matrix")
        .map(|| warp::reply::with_status("upstream exploded", StatusCode::INTERNAL_SERVER_ERROR));

    let entities = warp::path!("gq-core" / "entities")
        .and(warp::query::<HashMap<String, String>>())
        .map(|query: HashMap<String, String>| {
            let mut payload = sample_entities_payload();
            if let Some(chain) = query.get("chain") {
                let filtered: Vec<serde_json::Value> = payload["entities"]
                    .as_array()
                    .unwrap()
                    .iter()
                    .filter(|e| e["chain"] == chain.as_str())
                    .cloned()
                    .collect();
                payload["entities"] = serde_json::Value::Array(filtered);
            }
            warp::reply::json(&payload)
        });

    let empty = warp::path!("contracts" / "list").map(|| "   ");

    let (addr, server) = warp::serve(matrix.or(entities).or(empty)).bind_ephemeral(([127, 0, 0, 1], 0));
    tokio::spawn(server);
    addr
}

fn config_for(addr: SocketAddr) -> ClientConfig {
    ClientConfig::new()
        .with_api_base(format!("http://{addr}"))
        .with_request_timeout_secs(5)
}

#[tokio::test]
async fn status_500_is_reported_with_url() {
    let addr = start_server().await;
    let fetcher = HttpFetcher::new(&config_for(addr)).unwrap();

    let err = fetcher
        .fetch("/gq-core/correlation/matrix", &Query::new())
        .await
        .unwrap_err();
    match err {
        FetchError::Status { status, url } => {
            assert_eq!(status, 500);
            assert!(url.ends_with("/gq-core/correlation/matrix"));
        }
        other => panic!("expected status error, got {other:?}"),
    }
}

#[tokio::test]
async fn status_500_on_correlation_falls_back_to_matrix() {
    let addr = start_server().await;
    let config = config_for(addr);
    let fetcher = Arc::new(HttpFetcher::new(&config).unwrap());
    let generator = Arc::new(Mutex::new(FixtureGenerator::new()));
    let controller = PollController::<Correlations>::new(&config, fetcher, generator);

    assert_eq!(controller.tick().await, TickOutcome::Synthetic);

    let snapshot = controller.current().snapshot.unwrap();
    let matrix = CorrelationMatrix::from_pairs(&snapshot.records);
    assert_eq!(matrix.size(), 10);
    for (i, row) in matrix.values.iter().enumerate() {
        assert_eq!(row[i], 1.0);
    }
}

#[tokio::test]
async fn query_filters_reach_the_server() {
    let addr = start_server().await;
    let config = config_for(addr);
    let fetcher = Arc::new(HttpFetcher::new(&config).unwrap());
    let generator = Arc::new(Mutex::new(FixtureGenerator::seeded(3)));
    let controller = PollController::<Entities>::new(&config, fetcher, generator)
        .with_query(Query::new().with_chain("solana"));

    assert_eq!(controller.tick().await, TickOutcome::Live);

    let state = controller.current();
    assert_eq!(state.status, Some(DataStatus::Live));
    let snapshot = state.snapshot.unwrap();
    assert_eq!(snapshot.len(), 1);
    assert_eq!(snapshot.records[0].chain, "solana");
}

#[tokio::test]
async fn blank_body_is_empty_body_error() {
    let addr = start_server().await;
    let fetcher = HttpFetcher::new(&config_for(addr)).unwrap();

    let err = fetcher.fetch("/contracts/list", &Query::new()).await.unwrap_err();
    assert_eq!(err, FetchError::EmptyBody);
}
