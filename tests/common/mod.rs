//! Shared fixtures for the behaviour tests: a scripted `HttpClient` keyed by
//! `"METHOD /path"`, gates for holding a response in flight, and canned
//! screener payloads.

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use screener_core::{
    HttpAuth, HttpClient, HttpError, HttpMethod, HttpRequest, HttpResponse, RetryPolicy,
    Screener, ScreenerApi, Ticker,
};
use serde_json::{json, Value};
use tokio::sync::oneshot;

pub const BASE_URL: &str = "http://screener.test";
pub const SESSION_COOKIE: &str = "session=test-user";

pub const EQUITIES: &str = "/api/stocks/";
pub const CURRENCY: &str = "/api/currency/";
pub const FAVORITES_GET: &str = "/api/favorites/get";
pub const FAVORITES_ADD: &str = "/api/favorites/add";
pub const FAVORITES_REMOVE: &str = "/api/favorites/remove";

type Reply = Result<HttpResponse, HttpError>;

enum Scripted {
    Ready(Reply),
    Gated(oneshot::Receiver<Reply>),
}

/// Holds one scripted response until [`Gate::release`] is called.
pub struct Gate {
    sender: oneshot::Sender<Reply>,
}

impl Gate {
    pub fn release(self, reply: Reply) {
        // The request may already have been dropped; nothing to deliver then.
        let _ = self.sender.send(reply);
    }

    pub fn release_json(self, body: impl Into<String>) {
        self.release(Ok(HttpResponse::ok_json(body)));
    }
}

/// Replays scripted responses per route, in order, and records every request.
#[derive(Default)]
pub struct ScriptedHttpClient {
    routes: Mutex<HashMap<String, VecDeque<Scripted>>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl ScriptedHttpClient {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn reply(&self, method: HttpMethod, path: &str, reply: Reply) -> &Self {
        self.push(method, path, Scripted::Ready(reply));
        self
    }

    pub fn reply_json(&self, method: HttpMethod, path: &str, body: impl Into<String>) -> &Self {
        self.reply(method, path, Ok(HttpResponse::ok_json(body)))
    }

    pub fn reply_status(&self, method: HttpMethod, path: &str, status: u16) -> &Self {
        self.reply(method, path, Ok(HttpResponse::with_status(status, "")))
    }

    /// Queues a response that stays in flight until the returned gate opens.
    pub fn gate(&self, method: HttpMethod, path: &str) -> Gate {
        let (sender, receiver) = oneshot::channel();
        self.push(method, path, Scripted::Gated(receiver));
        Gate { sender }
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().expect("requests lock").clone()
    }

    pub fn requests_to(&self, method: HttpMethod, path: &str) -> Vec<HttpRequest> {
        let url = format!("{BASE_URL}{path}");
        self.requests()
            .into_iter()
            .filter(|request| request.method == method && request.url == url)
            .collect()
    }

    fn push(&self, method: HttpMethod, path: &str, scripted: Scripted) {
        self.routes
            .lock()
            .expect("routes lock")
            .entry(route_key(method, path))
            .or_default()
            .push_back(scripted);
    }
}

impl HttpClient for ScriptedHttpClient {
    fn execute<'a>(
        &'a self,
        request: HttpRequest,
    ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, HttpError>> + Send + 'a>> {
        let path = request
            .url
            .strip_prefix(BASE_URL)
            .unwrap_or(&request.url)
            .to_owned();
        let key = route_key(request.method, &path);
        self.requests.lock().expect("requests lock").push(request);

        let scripted = self
            .routes
            .lock()
            .expect("routes lock")
            .get_mut(&key)
            .and_then(VecDeque::pop_front);

        Box::pin(async move {
            match scripted {
                Some(Scripted::Ready(reply)) => reply,
                Some(Scripted::Gated(receiver)) => receiver
                    .await
                    .unwrap_or_else(|_| Err(HttpError::new("gate dropped"))),
                None => Err(HttpError::non_retryable(format!("no scripted response for {key}"))),
            }
        })
    }
}

fn route_key(method: HttpMethod, path: &str) -> String {
    format!("{} {path}", method.as_str())
}

/// A screener over `client` with a session cookie and no retries.
pub fn screener(client: &Arc<ScriptedHttpClient>) -> Screener {
    Screener::new(Arc::new(api(client)))
}

pub fn api(client: &Arc<ScriptedHttpClient>) -> ScreenerApi {
    ScreenerApi::new(client.clone(), BASE_URL)
        .with_auth(HttpAuth::Cookie(String::from(SESSION_COOKIE)))
        .with_retry(RetryPolicy::none())
}

pub fn ticker(raw: &str) -> Ticker {
    Ticker::parse(raw).expect("valid ticker")
}

pub fn equity(ticker: &str, company: &str, price: f64) -> Value {
    json!({
        "ticker": ticker,
        "company": company,
        "price": price,
        "dayChange": 1.5,
        "monthChange": 0.04,
        "yearChange": 0.25,
        "marketCap": "10.2B",
    })
}

/// Three listed equities in upstream order.
pub fn equities_body() -> String {
    json!([
        equity("THYAO.IS", "Turk Hava Yollari", 301.25),
        equity("GARAN.IS", "Garanti Bankasi", 118.4),
        equity("AKBNK.IS", "Akbank", 57.05),
    ])
    .to_string()
}

pub fn currency_body() -> String {
    json!({
        "USD/TRY": [32.1, 32.4, 32.9],
        "BIST 100": [0.0, 9800.0],
    })
    .to_string()
}

pub fn favorites_body(tickers: &[&str]) -> String {
    json!({ "favoriteCompanies": tickers }).to_string()
}

/// Scripts the three GET feeds with healthy responses.
pub fn script_healthy_feeds(client: &ScriptedHttpClient, favorites: &[&str]) {
    client
        .reply_json(HttpMethod::Get, EQUITIES, equities_body())
        .reply_json(HttpMethod::Get, CURRENCY, currency_body())
        .reply_json(HttpMethod::Get, FAVORITES_GET, favorites_body(favorites));
}

/// Yields to the runtime until `condition` holds.
pub async fn eventually(mut condition: impl FnMut() -> bool) {
    for _ in 0..1_000 {
        if condition() {
            return;
        }
        tokio::task::yield_now().await;
    }
    panic!("condition not reached");
}
