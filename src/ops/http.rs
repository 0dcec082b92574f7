use anyhow::Context;
use anyhow::Result;
use anyhow::bail;
use reqwest::RequestBuilder;
use serde::de::DeserializeOwned;

/// Thin wrapper around a shared reqwest client for CI provider APIs
#[derive(Clone)]
pub struct HttpClient {
    inner: reqwest::Client,
}

impl HttpClient {
    pub fn new() -> Result<Self> {
        let inner = reqwest::Client::builder()
            .user_agent("ci-release-build")
            .build()
            .context("Failed to create HTTP client")?;
        Ok(Self { inner })
    }

    /// Underlying client, for building requests
    pub fn client(&self) -> &reqwest::Client {
        &self.inner
    }

    /// Send a request and return the body of a 2xx response.
    /// Errors never contain the request URL, which may carry tokens.
    pub async fn send(&self, request: RequestBuilder) -> Result<String> {
        let response = request
            .send()
            .await
            .map_err(reqwest::Error::without_url)
            .context("Failed to send HTTP request")?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(reqwest::Error::without_url)
            .context("Failed to read HTTP response body")?;

        if !status.is_success() {
            bail!("(status {}) {}", status.as_u16(), body.trim());
        }

        Ok(body)
    }

    /// Send a request and parse the body of a 2xx response as JSON
    pub async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let body = self.send(request).await?;
        serde_json::from_str(&body).with_context(|| format!("Failed to parse response: {}", body))
    }
}
