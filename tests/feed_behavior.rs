//! Behavior-driven tests for feed loading
//!
//! These tests verify HOW the feed orchestrator turns upstream payloads and
//! upstream failures into per-source state, and what the view can render in
//! each case.

mod common;

use std::sync::Arc;
use std::time::Duration;

use common::*;
use screener_core::{
    fallback_cards, FeedErrorKind, FeedStatus, HttpError, HttpMethod, RetryPolicy, Screener,
};
use serde_json::json;

// =============================================================================
// Feeds: Normalization
// =============================================================================

#[tokio::test]
async fn when_equities_are_fetched_twice_system_produces_identical_rows() {
    // Given: An upstream that serves the same equity list twice
    let client = ScriptedHttpClient::new();
    client
        .reply_json(HttpMethod::Get, EQUITIES, equities_body())
        .reply_json(HttpMethod::Get, EQUITIES, equities_body());
    let screener = screener(&client);

    // When: The list is loaded, then re-loaded
    let first = screener.feeds().load_equities().await;
    let second = screener.feeds().load_equities().await;

    // Then: Both loads yield the same rows and keys, and the store holds the latest
    assert_eq!(first.status(), FeedStatus::Ready);
    assert_eq!(first.data(), second.data());
    let keys: Vec<usize> = screener.snapshot().rows().iter().map(|row| row.key).collect();
    assert_eq!(keys, vec![1, 2, 3]);
}

#[tokio::test]
async fn when_records_are_flagged_or_malformed_system_skips_them_and_renumbers() {
    // Given: A flagged record, a record missing its price, and an unqualified ticker
    let client = ScriptedHttpClient::new();
    let mut flagged = equity("GARAN.IS", "Garanti Bankasi", 118.4);
    flagged["error"] = json!(true);
    let mut malformed = equity("ASELS.IS", "Aselsan", 0.0);
    malformed
        .as_object_mut()
        .expect("record is an object")
        .remove("price");
    let body = json!([
        equity("THYAO.IS", "Turk Hava Yollari", 301.25),
        flagged,
        malformed,
        equity("kchol", "Koc Holding", 170.0),
        equity("AKBNK.IS", "Akbank", 57.05),
    ]);
    client.reply_json(HttpMethod::Get, EQUITIES, body.to_string());
    let screener = screener(&client);

    // When: The list is loaded
    let state = screener.feeds().load_equities().await;

    // Then: Only valid rows remain, keyed by their position after filtering
    let rows = state.data().expect("ready rows");
    let summary: Vec<(usize, &str)> = rows
        .iter()
        .map(|row| (row.key, row.ticker.as_str()))
        .collect();
    assert_eq!(summary, vec![(1, "THYAO.IS"), (2, "AKBNK.IS")]);
    assert!((rows[0].month_change - 4.0).abs() < 1e-9);
    assert!((rows[0].year_change - 25.0).abs() < 1e-9);
    assert_eq!(rows[0].day_change, 1.5);
}

#[tokio::test]
async fn when_a_series_starts_at_zero_system_reports_zero_change() {
    // Given: A currency payload whose second series starts at 0
    let client = ScriptedHttpClient::new();
    client.reply_json(HttpMethod::Get, CURRENCY, currency_body());
    let screener = screener(&client);

    // When: The cards are loaded
    let state = screener.feeds().load_currency_series().await;

    // Then: Upstream order is kept and the zero-start series has 0% change
    let cards = state.data().expect("ready cards");
    assert_eq!(cards[0].symbol, "USD/TRY");
    assert_eq!(cards[1].symbol, "BIST 100");
    assert_eq!(cards[1].change_percent, 0.0);
    assert_eq!(cards[1].display_change(), "+0.00%");
    assert_eq!(cards[1].latest_value, 9800.0);
}

// =============================================================================
// Feeds: Failure and Fallback
// =============================================================================

#[tokio::test]
async fn when_currency_fails_and_equities_succeed_system_shows_both_rows_and_fallback_cards() {
    // Given: Equities return 3 rows, the currency endpoint is down
    let client = ScriptedHttpClient::new();
    client
        .reply_json(HttpMethod::Get, EQUITIES, equities_body())
        .reply_status(HttpMethod::Get, CURRENCY, 502)
        .reply_json(HttpMethod::Get, FAVORITES_GET, favorites_body(&[]));
    let screener = screener(&client);

    // When: All sources load
    let report = screener.load_all().await;

    // Then: Rows render, cards fall back, and only the currency source failed
    assert_eq!(report.equities, FeedStatus::Ready);
    assert_eq!(report.currency, FeedStatus::Failed);
    assert!(report.any_failed());

    let snapshot = screener.snapshot();
    assert_eq!(snapshot.rows().len(), 3);
    assert_eq!(snapshot.cards(), fallback_cards().as_slice());
    assert_eq!(
        snapshot.cards.error().map(|error| error.status_code()),
        Some(Some(502))
    );
    assert_eq!(screener.projection().all.len(), 3);
}

#[tokio::test]
async fn when_currency_returns_no_usable_series_system_shows_fallback_cards_as_ready() {
    // Given: A currency payload where no series is usable
    let client = ScriptedHttpClient::new();
    client.reply_json(
        HttpMethod::Get,
        CURRENCY,
        json!({ "USD/TRY": "n/a", "EUR/TRY": [] }).to_string(),
    );
    let screener = screener(&client);

    // When: The cards are loaded
    let state = screener.feeds().load_currency_series().await;

    // Then: The fallback cards are shown without a failure status
    assert_eq!(state.status(), FeedStatus::Ready);
    assert_eq!(state.data().map(|cards| cards.len()), Some(3));
}

#[tokio::test]
async fn when_equities_fail_system_shows_an_empty_table_without_panicking() {
    // Given: The equity endpoint returns malformed JSON
    let client = ScriptedHttpClient::new();
    client.reply_json(HttpMethod::Get, EQUITIES, "<html>502</html>");
    let screener = screener(&client);

    // When: The list is loaded
    let state = screener.feeds().load_equities().await;

    // Then: The source is failed with a parse error and an empty fallback
    assert_eq!(state.status(), FeedStatus::Failed);
    assert_eq!(state.error().map(|e| e.kind()), Some(FeedErrorKind::Parse));
    assert!(screener.projection().all.is_empty());
}

#[tokio::test]
async fn when_feed_fails_transiently_system_retries_get_requests() {
    // Given: A feed that fails once with a retryable transport error
    let client = ScriptedHttpClient::new();
    client
        .reply(HttpMethod::Get, EQUITIES, Err(HttpError::new("connection reset")))
        .reply_json(HttpMethod::Get, EQUITIES, equities_body());
    let api = api(&client).with_retry(RetryPolicy::fixed(Duration::ZERO, 2));
    let screener = Screener::new(Arc::new(api));

    // When: The list is loaded
    let state = screener.feeds().load_equities().await;

    // Then: The second attempt succeeds
    assert_eq!(state.status(), FeedStatus::Ready);
    assert_eq!(client.requests_to(HttpMethod::Get, EQUITIES).len(), 2);
}

#[tokio::test]
async fn when_feeds_are_loaded_system_sends_credentials_only_to_favorites() {
    // Given: Healthy feeds and a session cookie
    let client = ScriptedHttpClient::new();
    script_healthy_feeds(&client, &["THYAO.IS"]);
    let screener = screener(&client);

    // When: All sources load
    screener.load_all().await;

    // Then: Only the favorites call carries the cookie
    for request in client.requests() {
        let has_cookie = request.headers.get("cookie").map(String::as_str) == Some(SESSION_COOKIE);
        assert_eq!(has_cookie, request.url.ends_with(FAVORITES_GET), "{}", request.url);
    }
}

// =============================================================================
// Feeds: Lifecycle
// =============================================================================

#[tokio::test]
async fn when_instance_closes_before_a_fetch_resolves_system_discards_the_result() {
    // Given: An equity request held in flight
    let client = ScriptedHttpClient::new();
    let gate = client.gate(HttpMethod::Get, EQUITIES);
    let screener = screener(&client);
    let store = screener.store().clone();
    let feeds = tokio::spawn({
        let screener = screener.clone();
        async move { screener.feeds().load_equities().await }
    });
    eventually(|| !client.requests_to(HttpMethod::Get, EQUITIES).is_empty()).await;

    // When: The instance is torn down, then the response arrives
    screener.close();
    gate.release_json(equities_body());
    let state = feeds.await.expect("fetch task");

    // Then: The fetch itself resolved, but the closed store was left untouched
    assert_eq!(state.status(), FeedStatus::Ready);
    assert!(store.is_closed());
    assert!(store.snapshot().equities.is_pending());
    assert!(store.snapshot().rows().is_empty());
}

#[tokio::test]
async fn when_a_screener_is_mounted_system_loads_in_the_background() {
    // Given: Healthy feeds
    let client = ScriptedHttpClient::new();
    script_healthy_feeds(&client, &[]);
    let screener = screener(&client);
    let mut updates = screener.store().subscribe();

    // When: The screener is mounted
    let report = screener.mount().await.expect("load task");

    // Then: Every source is ready and subscribers were notified
    assert!(!report.any_failed());
    assert!(updates.has_changed().expect("store alive"));
    assert!(!updates.borrow_and_update().projection().loading);
}
