// src/checker/http.rs
// =============================================================================
// This module probes external URLs, one domain at a time.
//
// Key functionality:
// - GET every URL of a domain and keep only the status code
// - Throttle: wait before handing each URL to the workers
// - 429 Too Many Requests: wait the throttle interval and try again
// - Transport failure: back off (1x, 4x, 16x, ... the base delay) and retry
// - Out of retries: the URL gets status code 0
//
// Nothing in here returns an error. A host that is down is just a URL with
// code 0 in the results.
//
// The HTTP client and the clock are behind two small traits (Transport and
// Sleeper) so tests can script responses and record pauses without touching
// the network.
//
// Layout of one domain probe:
//
//   feeder task --(url channel, bounded)--> N workers --(result channel)--> caller
// =============================================================================

use crate::config::ProbeConfig;
use anyhow::{Context, Result};
use futures::future::{BoxFuture, FutureExt};
use reqwest::{Client, StatusCode};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Mutex};
use tracing::debug;

/// Some hosts refuse anything that does not look like a browser
pub const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36";

/// Per-request timeout of the real client
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Issues one GET and returns the status code.
pub trait Transport: Send + Sync {
    fn get<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<u16>>;
}

/// Waits for a while.
pub trait Sleeper: Send + Sync {
    fn sleep(&self, duration: Duration) -> BoxFuture<'static, ()>;
}

/// The production transport, a shared reqwest client.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new() -> Result<Self> {
        // Create an HTTP client with reasonable settings
        // We'll reuse this client for all requests (connection pooling)
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .redirect(reqwest::redirect::Policy::limited(5))
            .user_agent(USER_AGENT)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(ReqwestTransport { client })
    }
}

impl Transport for ReqwestTransport {
    fn get<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<u16>> {
        async move {
            let response = self.client.get(url).send().await?;
            Ok(response.status().as_u16())
        }
        .boxed()
    }
}

/// The production clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

impl Sleeper for TokioSleeper {
    fn sleep(&self, duration: Duration) -> BoxFuture<'static, ()> {
        tokio::time::sleep(duration).boxed()
    }
}

/// Status code of one probed URL, 0 when no answer was ever received.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProbeResult {
    pub url: String,
    pub code: u16,
}

impl ProbeResult {
    /// Only a plain 200 counts as alive
    pub fn is_ok(&self) -> bool {
        self.code == StatusCode::OK.as_u16()
    }
}

/// Probes the URLs of a single domain.
#[derive(Clone)]
pub struct DomainClient {
    domain: String,
    config: ProbeConfig,
    transport: Arc<dyn Transport>,
    sleeper: Arc<dyn Sleeper>,
}

impl DomainClient {
    pub fn new(
        domain: impl Into<String>,
        config: ProbeConfig,
        transport: Arc<dyn Transport>,
        sleeper: Arc<dyn Sleeper>,
    ) -> Self {
        DomainClient {
            domain: domain.into(),
            config,
            transport,
            sleeper,
        }
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    /// GETs `url` until it answers with something other than 429, or the
    /// retries run out (code 0). No pause follows the final attempt.
    pub async fn fetch_page(&self, url: &str) -> u16 {
        let retries = self.config.retries;

        for attempt in 0..=retries {
            let last = attempt == retries;

            match self.transport.get(url).await {
                Ok(code) if code == StatusCode::TOO_MANY_REQUESTS.as_u16() => {
                    debug!(domain = %self.domain, url, attempt, "429, waiting");
                    if !last {
                        self.sleeper.sleep(self.config.throttle).await;
                    }
                }
                Ok(code) => return code,
                Err(err) => {
                    debug!(domain = %self.domain, url, attempt, "request failed: {err:#}");
                    if !last {
                        self.sleeper.sleep(self.config.backoff_for(attempt)).await;
                    }
                }
            }
        }

        0
    }

    /// Probes every URL through a pool of `config.workers` workers.
    ///
    /// A feeder sleeps the throttle interval before handing out each URL.
    /// Results come back in the order of `urls`.
    pub async fn fetch_pages(&self, urls: Vec<String>) -> Vec<ProbeResult> {
        let width = self.config.workers.max(1);
        let (url_tx, url_rx) = mpsc::channel::<(usize, String)>(width);
        let (result_tx, mut result_rx) = mpsc::channel::<(usize, ProbeResult)>(width);

        // workers take turns on the single receiver
        let url_rx = Arc::new(Mutex::new(url_rx));

        for _ in 0..width {
            let client = self.clone();
            let url_rx = Arc::clone(&url_rx);
            let result_tx = result_tx.clone();

            tokio::spawn(async move {
                loop {
                    let next = url_rx.lock().await.recv().await;
                    let Some((index, url)) = next else {
                        break;
                    };

                    let code = client.fetch_page(&url).await;
                    if result_tx.send((index, ProbeResult { url, code })).await.is_err() {
                        break;
                    }
                }
            });
        }
        // the channel closes once the last worker is done
        drop(result_tx);

        let sleeper = Arc::clone(&self.sleeper);
        let throttle = self.config.throttle;
        tokio::spawn(async move {
            for item in urls.into_iter().enumerate() {
                sleeper.sleep(throttle).await;
                if url_tx.send(item).await.is_err() {
                    break;
                }
            }
        });

        let mut results = Vec::new();
        while let Some(result) = result_rx.recv().await {
            results.push(result);
        }

        results.sort_by_key(|(index, _)| *index);
        results.into_iter().map(|(_, result)| result).collect()
    }
}

#[cfg(test)]
pub(crate) mod fakes {
    use super::*;
    use std::collections::{HashMap, VecDeque};

    /// Answers from a script per URL; unscripted calls fail.
    #[derive(Default)]
    pub struct ScriptedTransport {
        scripts: std::sync::Mutex<HashMap<String, VecDeque<Result<u16, String>>>>,
        calls: std::sync::Mutex<Vec<String>>,
    }

    impl ScriptedTransport {
        pub fn script(self, url: &str, answers: Vec<Result<u16, String>>) -> Self {
            self.scripts
                .lock()
                .unwrap()
                .insert(url.to_string(), answers.into());
            self
        }

        pub fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl Transport for ScriptedTransport {
        fn get<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<u16>> {
            self.calls.lock().unwrap().push(url.to_string());

            let answer = self
                .scripts
                .lock()
                .unwrap()
                .get_mut(url)
                .and_then(VecDeque::pop_front)
                .unwrap_or_else(|| Err("operation timed out".to_string()));

            futures::future::ready(answer.map_err(anyhow::Error::msg)).boxed()
        }
    }

    /// Records every pause instead of waiting.
    #[derive(Default)]
    pub struct RecordingSleeper {
        pub pauses: std::sync::Mutex<Vec<Duration>>,
    }

    impl RecordingSleeper {
        pub fn pauses(&self) -> Vec<Duration> {
            self.pauses.lock().unwrap().clone()
        }
    }

    impl Sleeper for RecordingSleeper {
        fn sleep(&self, duration: Duration) -> BoxFuture<'static, ()> {
            self.pauses.lock().unwrap().push(duration);
            futures::future::ready(()).boxed()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fakes::*;
    use super::*;

    const URL1: &str = "https://go.dev/doc/";
    const URL2: &str = "https://go.dev/blog/";
    const BACKOFF: Duration = Duration::from_millis(7);

    fn config() -> ProbeConfig {
        ProbeConfig {
            throttle: Duration::ZERO,
            retries: 1,
            backoff: BACKOFF,
            ..ProbeConfig::default()
        }
    }

    fn client(transport: Arc<ScriptedTransport>, sleeper: Arc<RecordingSleeper>) -> DomainClient {
        DomainClient::new("go.dev", config(), transport, sleeper)
    }

    #[tokio::test]
    async fn test_retry_after_429_and_timeouts() {
        let transport = Arc::new(
            ScriptedTransport::default().script(URL1, vec![Ok(429), Ok(200)]),
        );
        let sleeper = Arc::new(RecordingSleeper::default());

        let results = client(transport.clone(), sleeper.clone())
            .fetch_pages(vec![URL1.to_string(), URL2.to_string()])
            .await;

        assert_eq!(
            results,
            vec![
                ProbeResult { url: URL1.to_string(), code: 200 },
                ProbeResult { url: URL2.to_string(), code: 0 },
            ]
        );
        assert!(results[0].is_ok());
        assert!(!results[1].is_ok());

        // two feeder pauses, one 429 pause, one backoff before the last attempt
        let pauses = sleeper.pauses();
        assert_eq!(pauses.iter().filter(|p| p.is_zero()).count(), 3);
        assert_eq!(pauses.iter().filter(|p| **p == BACKOFF).count(), 1);
        assert_eq!(transport.calls().len(), 4);
    }

    #[tokio::test]
    async fn test_429_path_sleeps_twice() {
        let transport = Arc::new(
            ScriptedTransport::default().script(URL1, vec![Ok(429), Ok(200)]),
        );
        let sleeper = Arc::new(RecordingSleeper::default());

        let results = client(transport, sleeper.clone())
            .fetch_pages(vec![URL1.to_string()])
            .await;

        assert_eq!(results[0].code, 200);
        assert_eq!(sleeper.pauses().len(), 2);
    }

    #[tokio::test]
    async fn test_backoff_grows() {
        let transport = Arc::new(ScriptedTransport::default());
        let sleeper = Arc::new(RecordingSleeper::default());
        let client = DomainClient::new(
            "go.dev",
            ProbeConfig {
                retries: 3,
                ..config()
            },
            transport.clone(),
            sleeper.clone(),
        );

        assert_eq!(client.fetch_page(URL2).await, 0);
        assert_eq!(transport.calls().len(), 4);
        assert_eq!(
            sleeper.pauses(),
            vec![BACKOFF, BACKOFF * 4, BACKOFF * 16]
        );
    }

    #[tokio::test]
    async fn test_other_codes_are_returned_as_is() {
        let transport = Arc::new(ScriptedTransport::default().script(URL1, vec![Ok(404)]));
        let sleeper = Arc::new(RecordingSleeper::default());

        assert_eq!(client(transport.clone(), sleeper.clone()).fetch_page(URL1).await, 404);
        assert_eq!(transport.calls().len(), 1);
        assert!(sleeper.pauses().is_empty());
    }

    #[tokio::test]
    async fn test_results_keep_input_order() {
        let urls: Vec<String> = (0..10).map(|i| format!("https://go.dev/{i}")).collect();
        let mut transport = ScriptedTransport::default();
        for url in &urls {
            transport = transport.script(url, vec![Ok(200)]);
        }
        let sleeper = Arc::new(RecordingSleeper::default());

        let results = client(Arc::new(transport), sleeper).fetch_pages(urls.clone()).await;
        let returned: Vec<String> = results.into_iter().map(|r| r.url).collect();
        assert_eq!(returned, urls);
    }

    #[tokio::test]
    async fn test_no_urls() {
        let transport = Arc::new(ScriptedTransport::default());
        let sleeper = Arc::new(RecordingSleeper::default());
        assert!(client(transport, sleeper).fetch_pages(Vec::new()).await.is_empty());
    }
}
