// src/net/http.rs — HTTP helper for plugin authors
//
// Plugin code is synchronous, so the async reqwest client is driven by a
// private single-worker tokio runtime. Every transport failure is retried
// up to `max_retries` times; HTTP status codes are returned as-is.

use std::time::Duration;

use anyhow::Context;

use crate::infra::config::HttpConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    fn as_reqwest(self) -> reqwest::Method {
        match self {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Delete => reqwest::Method::DELETE,
        }
    }
}

#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

pub struct HttpClient {
    client: reqwest::Client,
    runtime: tokio::runtime::Runtime,
    config: HttpConfig,
}

impl HttpClient {
    pub fn new(config: HttpConfig) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("failed to build HTTP client")?;

        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .thread_name("luna-http")
            .enable_all()
            .build()
            .context("failed to start HTTP runtime")?;

        Ok(Self {
            client,
            runtime,
            config,
        })
    }

    pub fn config(&self) -> &HttpConfig {
        &self.config
    }

    /// Join relative URLs onto the configured base URL.
    pub fn resolve_url(&self, url: &str) -> String {
        match self.config.base_url.as_deref() {
            Some(base) if !base.is_empty() && !url.starts_with("http") => format!(
                "{}/{}",
                base.trim_end_matches('/'),
                url.trim_start_matches('/')
            ),
            _ => url.to_string(),
        }
    }

    pub fn get(&self, url: &str, headers: &[(String, String)]) -> anyhow::Result<HttpResponse> {
        self.request(Method::Get, url, None, headers)
    }

    pub fn post(
        &self,
        url: &str,
        body: &str,
        headers: &[(String, String)],
    ) -> anyhow::Result<HttpResponse> {
        self.request(Method::Post, url, Some(body), headers)
    }

    pub fn put(
        &self,
        url: &str,
        body: &str,
        headers: &[(String, String)],
    ) -> anyhow::Result<HttpResponse> {
        self.request(Method::Put, url, Some(body), headers)
    }

    pub fn delete(&self, url: &str, headers: &[(String, String)]) -> anyhow::Result<HttpResponse> {
        self.request(Method::Delete, url, None, headers)
    }

    /// Send a request, retrying on any transport error.
    pub fn request(
        &self,
        method: Method,
        url: &str,
        body: Option<&str>,
        headers: &[(String, String)],
    ) -> anyhow::Result<HttpResponse> {
        let url = self.resolve_url(url);
        let interval = Duration::from_millis(self.config.retry_interval_ms);

        self.runtime.block_on(async {
            let mut attempt = 0;
            loop {
                if attempt > 0 {
                    tokio::time::sleep(interval).await;
                }

                match self.send_once(method, &url, body, headers).await {
                    Ok(resp) => return Ok(resp),
                    Err(e) if attempt < self.config.max_retries => {
                        tracing::debug!(
                            "HTTP {:?} {} failed (attempt {}): {}",
                            method,
                            url,
                            attempt + 1,
                            e
                        );
                        attempt += 1;
                    }
                    Err(e) => {
                        return Err(anyhow::Error::new(e)
                            .context(format!("{:?} {} failed after {} attempt(s)", method, url, attempt + 1)));
                    }
                }
            }
        })
    }

    async fn send_once(
        &self,
        method: Method,
        url: &str,
        body: Option<&str>,
        headers: &[(String, String)],
    ) -> Result<HttpResponse, reqwest::Error> {
        let mut req = self.client.request(method.as_reqwest(), url);

        for (k, v) in &self.config.headers {
            req = req.header(k.as_str(), v.as_str());
        }
        for (k, v) in headers {
            req = req.header(k.as_str(), v.as_str());
        }
        if let Some(body) = body {
            req = req.body(body.to_string());
        }

        let resp = req.send().await?;
        let status = resp.status().as_u16();
        let headers = resp
            .headers()
            .iter()
            .map(|(k, v)| {
                (
                    k.as_str().to_string(),
                    String::from_utf8_lossy(v.as_bytes()).into_owned(),
                )
            })
            .collect();
        let body = resp.text().await?;

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}
