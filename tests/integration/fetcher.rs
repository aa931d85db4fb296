//! Integration tests for snapshot assembly against mocked providers

use indicatrix::config::RetryConfig;
use indicatrix::error::FetchAbandoned;
use indicatrix::models::Symbol;
use indicatrix::services::{
    FetcherConfig, IndicatorFetcher, KeyRateLimiter, PriceFeedClient, SnapshotSource, TaapiClient,
};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Fetcher wired to mock servers, with retry delays and request
/// timeouts shrunk so failure paths run in milliseconds rather than
/// waiting out the production 10s/30s limits.
fn build_fetcher(taapi: &MockServer, prices: &MockServer, pacing: Duration) -> IndicatorFetcher {
    let limiter = Arc::new(KeyRateLimiter::new(1000, Duration::from_secs(1)));
    let indicators = TaapiClient::new(taapi.uri(), limiter).with_timeout(Duration::from_secs(2));
    let price_feed = PriceFeedClient::new(prices.uri()).with_timeout(Duration::from_secs(2));
    let config = FetcherConfig {
        pacing,
        retry: RetryConfig {
            max_attempts: 3,
            min_delay: Duration::from_millis(10),
            factor: 2.0,
        },
    };
    IndicatorFetcher::new(indicators, price_feed, config)
}

fn btc() -> Symbol {
    Symbol::parse("BTC/USDT").unwrap()
}

async fn mock_price_list(server: &MockServer, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

async fn mock_indicator(server: &MockServer, endpoint: &str, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path(format!("/{endpoint}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

/// Mounts all eight indicator endpoints with a coherent set of readings.
async fn mock_all_indicators(server: &MockServer) {
    mock_indicator(server, "rsi", json!({"value": 30.0})).await;
    mock_indicator(
        server,
        "macd",
        json!({"valueMACD": -0.5, "valueMACDSignal": -1.0, "valueMACDHist": 0.5}),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/ema"))
        .and(query_param("optInTimePeriod", "9"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"value": 105.0})))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/ema"))
        .and(query_param("optInTimePeriod", "21"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"value": 100.0})))
        .mount(server)
        .await;
    mock_indicator(
        server,
        "adx",
        json!({"value": 30.0, "plusDI": 25.0, "minusDI": 15.0}),
    )
    .await;
    mock_indicator(
        server,
        "stochrsi",
        json!({"valueFastK": 15.0, "valueFastD": 10.0}),
    )
    .await;
    mock_indicator(
        server,
        "bbands",
        json!({"valueUpperBand": 110.0, "valueMiddleBand": 103.0, "valueLowerBand": 96.0}),
    )
    .await;
    mock_indicator(server, "vwma", json!({"value": 1000.0})).await;
}

#[tokio::test]
async fn full_snapshot_assembles_from_all_endpoints() {
    let taapi = MockServer::start().await;
    let prices = MockServer::start().await;

    mock_price_list(
        &prices,
        json!([
            {"symbol": "ETH", "current_price": 2500.0},
            {"symbol": "BTC", "current_price": 45000.0},
        ]),
    )
    .await;

    // The RSI mock pins down the full query contract; the others match
    // on path alone.
    Mock::given(method("GET"))
        .and(path("/rsi"))
        .and(query_param("secret", "test-key"))
        .and(query_param("exchange", "binance"))
        .and(query_param("symbol", "BTC/USDT"))
        .and(query_param("interval", "1m"))
        .and(query_param("optInTimePeriod", "14"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"value": 30.0})))
        .expect(1)
        .mount(&taapi)
        .await;
    mock_indicator(
        &taapi,
        "macd",
        json!({"valueMACD": -0.5, "valueMACDSignal": -1.0, "valueMACDHist": 0.5}),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/ema"))
        .and(query_param("optInTimePeriod", "9"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"value": 105.0})))
        .mount(&taapi)
        .await;
    Mock::given(method("GET"))
        .and(path("/ema"))
        .and(query_param("optInTimePeriod", "21"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"value": 100.0})))
        .mount(&taapi)
        .await;
    mock_indicator(
        &taapi,
        "adx",
        json!({"value": 30.0, "plusDI": 25.0, "minusDI": 15.0}),
    )
    .await;
    mock_indicator(
        &taapi,
        "stochrsi",
        json!({"valueFastK": 15.0, "valueFastD": 10.0}),
    )
    .await;
    mock_indicator(
        &taapi,
        "bbands",
        json!({"valueUpperBand": 110.0, "valueMiddleBand": 103.0, "valueLowerBand": 96.0}),
    )
    .await;
    mock_indicator(&taapi, "vwma", json!({"value": 1000.0})).await;

    let fetcher = build_fetcher(&taapi, &prices, Duration::ZERO);
    let snapshot = fetcher.fetch(&btc(), "test-key").await.unwrap();

    assert_eq!(snapshot.symbol, "BTC/USDT");
    assert_eq!(snapshot.price, 45000.0);
    assert_eq!(snapshot.rsi, Some(30.0));
    assert_eq!(snapshot.ema9, Some(105.0));
    assert_eq!(snapshot.ema21, Some(100.0));
    assert_eq!(snapshot.volume, Some(1000.0));

    let macd = snapshot.macd.unwrap();
    assert_eq!(macd.value, -0.5);
    assert_eq!(macd.signal, -1.0);
    assert_eq!(macd.histogram, 0.5);

    let adx = snapshot.adx.unwrap();
    assert_eq!(adx.adx, 30.0);
    assert_eq!(adx.plus_di, 25.0);
    assert_eq!(adx.minus_di, 15.0);

    let stoch = snapshot.stoch_rsi.unwrap();
    assert_eq!(stoch.k, 15.0);
    assert_eq!(stoch.d, 10.0);

    let bands = snapshot.bollinger.unwrap();
    assert_eq!(bands.upper, 110.0);
    assert_eq!(bands.middle, 103.0);
    assert_eq!(bands.lower, 96.0);

    assert_eq!(snapshot.retrieved_count(), 8);
    assert!(!snapshot.is_partial());
}

#[tokio::test]
async fn failing_indicator_leaves_its_field_unset() {
    let taapi = MockServer::start().await;
    let prices = MockServer::start().await;

    mock_price_list(&prices, json!([{"symbol": "BTC", "current_price": 45000.0}])).await;

    // Mounted first, so it shadows the healthy RSI mock below. The
    // expectation pins the retry budget to exactly three attempts.
    Mock::given(method("GET"))
        .and(path("/rsi"))
        .respond_with(ResponseTemplate::new(500))
        .expect(3)
        .mount(&taapi)
        .await;
    mock_all_indicators(&taapi).await;

    let fetcher = build_fetcher(&taapi, &prices, Duration::ZERO);
    let started = std::time::Instant::now();
    let snapshot = fetcher.fetch(&btc(), "test-key").await.unwrap();

    assert_eq!(snapshot.rsi, None);
    assert_eq!(snapshot.retrieved_count(), 7);
    assert!(snapshot.is_partial());
    assert_eq!(snapshot.missing(), vec!["rsi"]);

    // Two backoff sleeps at 10ms and 20ms sit between the attempts.
    assert!(started.elapsed() >= Duration::from_millis(30));
}

#[tokio::test]
async fn price_feed_outage_abandons_the_symbol() {
    let taapi = MockServer::start().await;
    let prices = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(500))
        .expect(3)
        .mount(&prices)
        .await;

    let fetcher = build_fetcher(&taapi, &prices, Duration::ZERO);
    let err = fetcher.fetch(&btc(), "test-key").await.unwrap_err();

    assert!(matches!(err, FetchAbandoned::PriceUnavailable(_)));

    // No indicator request goes out when the price gate fails.
    let requests = taapi.received_requests().await.unwrap();
    assert!(requests.is_empty());
}

#[tokio::test]
async fn unlisted_symbol_is_abandoned_without_retry() {
    let taapi = MockServer::start().await;
    let prices = MockServer::start().await;

    // An answered-but-empty feed is not a transport failure, so exactly
    // one request is made.
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&prices)
        .await;

    let fetcher = build_fetcher(&taapi, &prices, Duration::ZERO);
    let err = fetcher.fetch(&btc(), "test-key").await.unwrap_err();

    assert!(matches!(err, FetchAbandoned::SymbolNotFound));
    assert!(taapi.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn listed_symbol_without_price_is_abandoned() {
    let taapi = MockServer::start().await;
    let prices = MockServer::start().await;

    // A null price is an answered feed, not a transport failure: one
    // request, no retry, and the symbol is skipped for the sweep.
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([{"symbol": "BTC", "current_price": null}])),
        )
        .expect(1)
        .mount(&prices)
        .await;
    mock_all_indicators(&taapi).await;

    let fetcher = build_fetcher(&taapi, &prices, Duration::ZERO);
    let err = fetcher.fetch(&btc(), "test-key").await.unwrap_err();

    assert!(matches!(err, FetchAbandoned::SymbolNotFound));
    assert!(taapi.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn snapshot_with_no_indicators_is_discarded() {
    let taapi = MockServer::start().await;
    let prices = MockServer::start().await;

    mock_price_list(&prices, json!([{"symbol": "BTC", "current_price": 45000.0}])).await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&taapi)
        .await;

    let fetcher = build_fetcher(&taapi, &prices, Duration::ZERO);
    let err = fetcher.fetch(&btc(), "test-key").await.unwrap_err();

    assert!(matches!(err, FetchAbandoned::EmptySnapshot));
}

#[tokio::test]
async fn indicator_requests_are_paced() {
    let taapi = MockServer::start().await;
    let prices = MockServer::start().await;

    mock_price_list(&prices, json!([{"symbol": "BTC", "current_price": 45000.0}])).await;
    mock_all_indicators(&taapi).await;

    let fetcher = build_fetcher(&taapi, &prices, Duration::from_millis(20));
    let started = std::time::Instant::now();
    let snapshot = fetcher.fetch(&btc(), "test-key").await.unwrap();

    assert_eq!(snapshot.retrieved_count(), 8);
    // Eight pacing pauses of 20ms; allow some slack for the mock I/O.
    assert!(started.elapsed() >= Duration::from_millis(150));
}
