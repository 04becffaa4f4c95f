use std::sync::Arc;
use std::time::Duration;

use chainstats::config::DisplaySettings;
use chainstats::{
    ChainRegistry, ChainValue, HttpTransport, MetricKind, MetricSubscription, PerChainAggregator,
    RemoteFetcher, Settings,
};
use num_bigint::BigInt;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn stats_backend() -> MockServer {
    let server = MockServer::start().await;

    let routes = [
        (
            "/arbitrum/volume",
            ResponseTemplate::new(200)
                .set_body_json(json!({ "totalVolume": "2500000000000000000000000000000000" })),
        ),
        ("/avalanche/volume", ResponseTemplate::new(500)),
        (
            "/optimism/volume",
            ResponseTemplate::new(200)
                .set_body_json(json!({ "totalVolume": "500000000000000000000000000000000" })),
        ),
        (
            "/arbitrum/users",
            ResponseTemplate::new(200).set_body_json(json!({ "totalUniqueUsers": 1200 })),
        ),
        (
            "/avalanche/users",
            ResponseTemplate::new(200).set_body_json(json!({ "totalUniqueUsers": "300" })),
        ),
        (
            "/optimism/users",
            ResponseTemplate::new(200).set_body_json(json!({ "unexpected": true })),
        ),
    ];

    for (route, response) in routes {
        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(response)
            .mount(&server)
            .await;
    }

    server
}

fn settings(server: &MockServer) -> Settings {
    let base = server.uri();
    Settings::from_yaml_str(&format!(
        r#"
chains:
  - chain_id: 42161
    name: arbitrum
    stats_base_url: "{base}/arbitrum"
  - chain_id: 43114
    name: avalanche
    stats_base_url: "{base}/avalanche"
  - chain_id: 10
    name: optimism
    stats_base_url: "{base}/optimism"
"#
    ))
    .unwrap()
}

fn aggregator(settings: &Settings) -> PerChainAggregator {
    let registry = Arc::new(ChainRegistry::from_settings(settings).unwrap());
    let transport = Arc::new(HttpTransport::from_settings(&settings.fetcher).unwrap());
    let fetcher = RemoteFetcher::new(transport, &settings.fetcher).unwrap();
    PerChainAggregator::new(registry, fetcher)
}

#[tokio::test]
async fn test_volume_snapshot_with_one_chain_down() {
    let server = stats_backend().await;
    let settings = settings(&server);

    let mut subscription = MetricSubscription::spawn(
        aggregator(&settings),
        MetricKind::Volume,
        Duration::from_secs(60),
    );
    let snapshot = subscription.changed().await.unwrap();

    let ids: Vec<u64> = snapshot.entries.iter().map(|e| e.chain.chain_id).collect();
    assert_eq!(ids, vec![42161, 43114, 10]);
    assert_eq!(snapshot.get(43114), Some(&ChainValue::Absent));
    assert_eq!(
        snapshot.total,
        "3000000000000000000000000000000000".parse::<BigInt>().unwrap()
    );
    assert_eq!(snapshot.format_total(&DisplaySettings::default()), "3,000.00");

    subscription.unsubscribe().await;
}

#[tokio::test]
async fn test_user_snapshot_with_malformed_payload() {
    let server = stats_backend().await;
    let settings = settings(&server);

    let results = aggregator(&settings)
        .aggregate(MetricKind::UniqueUsers)
        .await
        .unwrap();
    let snapshot = chainstats::reduce(MetricKind::UniqueUsers, &results, chrono::Utc::now());

    assert_eq!(snapshot.get(42161), Some(&ChainValue::Present(BigInt::from(1200))));
    assert_eq!(snapshot.get(43114), Some(&ChainValue::Present(BigInt::from(300))));
    assert_eq!(snapshot.get(10), Some(&ChainValue::Absent));
    assert_eq!(snapshot.total, BigInt::from(1500));
}
