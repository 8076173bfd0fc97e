//! REST client for the five screener resources.
//!
//! | Operation | Method | Path | Credentials |
//! |-----------|--------|------|-------------|
//! | [`list_equities`](ScreenerApi::list_equities) | GET | `/api/stocks/` | no |
//! | [`list_currency_series`](ScreenerApi::list_currency_series) | GET | `/api/currency/` | no |
//! | [`get_favorites`](ScreenerApi::get_favorites) | GET | `/api/favorites/get` | yes |
//! | [`add_favorite`](ScreenerApi::add_favorite) | POST | `/api/favorites/add` | yes |
//! | [`remove_favorite`](ScreenerApi::remove_favorite) | POST | `/api/favorites/remove` | yes |
//!
//! The client returns raw payloads; shaping them into rows and cards is the
//! feed orchestrator's job.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::config::ScreenerConfig;
use crate::http_client::{HttpAuth, HttpClient, HttpRequest, ReqwestHttpClient};
use crate::retry::RetryPolicy;
use crate::{FavoriteSet, FeedError, Ticker};

const EQUITIES_PATH: &str = "/api/stocks/";
const CURRENCY_PATH: &str = "/api/currency/";
const FAVORITES_GET_PATH: &str = "/api/favorites/get";
const FAVORITES_ADD_PATH: &str = "/api/favorites/add";
const FAVORITES_REMOVE_PATH: &str = "/api/favorites/remove";

#[derive(Debug, Deserialize)]
struct FavoritesResponse {
    #[serde(rename = "favoriteCompanies", default)]
    favorite_companies: Option<Vec<String>>,
}

impl FavoritesResponse {
    fn into_set(self) -> FavoriteSet {
        self.favorite_companies
            .unwrap_or_default()
            .iter()
            .filter_map(|raw| match Ticker::parse(raw) {
                Ok(ticker) => Some(ticker),
                Err(error) => {
                    debug!(raw = raw.as_str(), %error, "ignoring invalid favorite ticker");
                    None
                }
            })
            .collect()
    }
}

/// Screener backend client.
#[derive(Clone)]
pub struct ScreenerApi {
    http_client: Arc<dyn HttpClient>,
    base_url: String,
    auth: HttpAuth,
    timeout_ms: u64,
    retry: RetryPolicy,
}

impl ScreenerApi {
    pub fn new(http_client: Arc<dyn HttpClient>, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_owned(),
            auth: HttpAuth::None,
            timeout_ms: 10_000,
            retry: RetryPolicy::default(),
        }
    }

    /// Production client over `reqwest`.
    pub fn from_config(config: &ScreenerConfig) -> Self {
        Self::new(Arc::new(ReqwestHttpClient::new()), config.api_base.clone())
            .with_auth(config.auth())
            .with_timeout_ms(config.timeout_ms)
            .with_retry(config.retry_policy())
    }

    pub fn with_auth(mut self, auth: HttpAuth) -> Self {
        self.auth = auth;
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Raw equity records, one JSON value per record so a malformed entry
    /// cannot fail the batch.
    pub async fn list_equities(&self) -> Result<Vec<Value>, FeedError> {
        self.get_json(EQUITIES_PATH, false).await
    }

    /// Raw `symbol -> observations` map in upstream key order.
    pub async fn list_currency_series(&self) -> Result<Map<String, Value>, FeedError> {
        self.get_json(CURRENCY_PATH, false).await
    }

    pub async fn get_favorites(&self) -> Result<FavoriteSet, FeedError> {
        let response: FavoritesResponse = self.get_json(FAVORITES_GET_PATH, true).await?;
        Ok(response.into_set())
    }

    /// Returns the server's authoritative set after the addition.
    pub async fn add_favorite(&self, ticker: &Ticker) -> Result<FavoriteSet, FeedError> {
        self.post_favorite(FAVORITES_ADD_PATH, ticker).await
    }

    /// Returns the server's authoritative set after the removal.
    pub async fn remove_favorite(&self, ticker: &Ticker) -> Result<FavoriteSet, FeedError> {
        self.post_favorite(FAVORITES_REMOVE_PATH, ticker).await
    }

    async fn post_favorite(&self, path: &str, ticker: &Ticker) -> Result<FavoriteSet, FeedError> {
        let request = HttpRequest::post(self.url(path))
            .with_form(&[("company", ticker.as_str())])
            .with_auth(&self.auth)
            .with_timeout_ms(self.timeout_ms);

        let body = self.send(request).await?;
        let response: FavoritesResponse = parse_body(path, &body)?;
        Ok(response.into_set())
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        authenticated: bool,
    ) -> Result<T, FeedError> {
        let mut attempt = 0;
        loop {
            let mut request = HttpRequest::get(self.url(path)).with_timeout_ms(self.timeout_ms);
            if authenticated {
                request = request.with_auth(&self.auth);
            }

            match self.send(request).await {
                Ok(body) => return parse_body(path, &body),
                Err(error) if self.retry.should_retry(&error, attempt) => {
                    let delay = self.retry.delay_for_attempt(attempt);
                    warn!(path, attempt, %error, delay_ms = delay.as_millis() as u64, "retrying feed request");
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(error) => return Err(error),
            }
        }
    }

    async fn send(&self, request: HttpRequest) -> Result<String, FeedError> {
        let method = request.method;
        let url = request.url.clone();
        debug!(method = method.as_str(), url = url.as_str(), "sending request");

        let response = self
            .http_client
            .execute(request)
            .await
            .map_err(|error| FeedError::transport(error.message(), error.retryable()))?;

        if !response.is_success() {
            return Err(FeedError::status(response.status));
        }

        Ok(response.body)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

fn parse_body<T: DeserializeOwned>(path: &str, body: &str) -> Result<T, FeedError> {
    serde_json::from_str(body)
        .map_err(|e| FeedError::parse(format!("failed to parse {path} response: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http_client::{HttpError, HttpResponse};
    use crate::FeedErrorKind;
    use std::collections::VecDeque;
    use std::future::Future;
    use std::pin::Pin;
    use std::sync::Mutex;

    #[derive(Debug)]
    struct RecordingHttpClient {
        responses: Mutex<VecDeque<Result<HttpResponse, HttpError>>>,
        requests: Mutex<Vec<HttpRequest>>,
    }

    impl RecordingHttpClient {
        fn replying(responses: Vec<Result<HttpResponse, HttpError>>) -> Self {
            Self {
                responses: Mutex::new(responses.into()),
                requests: Mutex::new(Vec::new()),
            }
        }

        fn recorded_requests(&self) -> Vec<HttpRequest> {
            self.requests
                .lock()
                .expect("request store should not be poisoned")
                .clone()
        }
    }

    impl HttpClient for RecordingHttpClient {
        fn execute<'a>(
            &'a self,
            request: HttpRequest,
        ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, HttpError>> + Send + 'a>> {
            self.requests
                .lock()
                .expect("request store should not be poisoned")
                .push(request);
            let response = self
                .responses
                .lock()
                .expect("response store should not be poisoned")
                .pop_front()
                .unwrap_or_else(|| Err(HttpError::non_retryable("no scripted response")));
            Box::pin(async move { response })
        }
    }

    fn api(client: Arc<RecordingHttpClient>) -> ScreenerApi {
        ScreenerApi::new(client, "http://screener.test/")
            .with_auth(HttpAuth::Cookie(String::from("session=abc")))
            .with_retry(RetryPolicy::none())
    }

    #[tokio::test]
    async fn favorites_calls_carry_the_session_cookie() {
        let client = Arc::new(RecordingHttpClient::replying(vec![Ok(HttpResponse::ok_json(
            r#"{"favoriteCompanies":["THYAO.IS","garan"]}"#,
        ))]));

        let set = api(client.clone()).get_favorites().await.expect("favorites");
        assert_eq!(set.len(), 2);
        assert!(set.contains(&Ticker::parse("GARAN.IS").expect("valid")));

        let requests = client.recorded_requests();
        assert_eq!(requests[0].url, "http://screener.test/api/favorites/get");
        assert_eq!(
            requests[0].headers.get("cookie").map(String::as_str),
            Some("session=abc")
        );
    }

    #[tokio::test]
    async fn feed_calls_do_not_carry_credentials() {
        let client = Arc::new(RecordingHttpClient::replying(vec![Ok(HttpResponse::ok_json(
            "[]",
        ))]));

        let records = api(client.clone()).list_equities().await.expect("equities");
        assert!(records.is_empty());
        assert!(!client.recorded_requests()[0].headers.contains_key("cookie"));
    }

    #[tokio::test]
    async fn add_posts_a_single_company_field() {
        let client = Arc::new(RecordingHttpClient::replying(vec![Ok(HttpResponse::ok_json(
            r#"{"favoriteCompanies":["THYAO.IS"]}"#,
        ))]));
        let ticker = Ticker::parse("THYAO.IS").expect("valid");

        api(client.clone()).add_favorite(&ticker).await.expect("add");

        let request = &client.recorded_requests()[0];
        assert_eq!(request.url, "http://screener.test/api/favorites/add");
        assert_eq!(request.body.as_deref(), Some("company=THYAO.IS"));
    }

    #[tokio::test]
    async fn missing_favorites_field_reads_as_empty() {
        let client = Arc::new(RecordingHttpClient::replying(vec![Ok(HttpResponse::ok_json(
            r#"{"detail":"ok"}"#,
        ))]));

        let set = api(client).get_favorites().await.expect("favorites");
        assert!(set.is_empty());
    }

    #[tokio::test]
    async fn unauthenticated_status_is_classified() {
        let client = Arc::new(RecordingHttpClient::replying(vec![Ok(
            HttpResponse::with_status(401, r#"{"detail":"not logged in"}"#),
        )]));

        let error = api(client).get_favorites().await.expect_err("must fail");
        assert_eq!(error.kind(), FeedErrorKind::Unauthenticated);
    }

    #[tokio::test]
    async fn retries_retryable_get_failures() {
        let client = Arc::new(RecordingHttpClient::replying(vec![
            Ok(HttpResponse::with_status(503, "")),
            Ok(HttpResponse::ok_json("{}")),
        ]));
        let api = api(client.clone()).with_retry(RetryPolicy::fixed(std::time::Duration::ZERO, 1));

        let series = api.list_currency_series().await.expect("second attempt succeeds");
        assert!(series.is_empty());
        assert_eq!(client.recorded_requests().len(), 2);
    }

    #[tokio::test]
    async fn malformed_body_is_a_parse_failure() {
        let client = Arc::new(RecordingHttpClient::replying(vec![Ok(HttpResponse::ok_json(
            "<html>",
        ))]));

        let error = api(client).list_equities().await.expect_err("must fail");
        assert_eq!(error.kind(), FeedErrorKind::Parse);
    }
}
