use std::time::Duration;

use async_trait::async_trait;
use reqwest::redirect;

use crate::pipeline::Transport;
use crate::{ClientOptions, Result, SturdyError};

/// Default base transport: a configured `reqwest::Client`.
///
/// Redirect following, cookie persistence, and request-body preparation
/// (`Content-Length`, connection pooling) are reqwest's responsibility; this
/// type only executes requests and sorts failures into the crate taxonomy.
pub struct HttpTransport {
    http: reqwest::Client,
}

impl HttpTransport {
    /// Wraps an already-configured `reqwest::Client`.
    pub fn new(http: reqwest::Client) -> Self {
        Self { http }
    }

    /// Builds the transport from options, starting from the given builder.
    ///
    /// Transport settings already on the builder (TLS, proxies, default
    /// headers) pass through unmodified; the timeout, redirect, and cookie
    /// settings that [`ClientOptions`] owns are applied on top.
    pub fn from_builder(builder: reqwest::ClientBuilder, options: &ClientOptions) -> Result<Self> {
        let http = builder
            .connect_timeout(Duration::from_millis(options.connect_timeout_ms))
            .timeout(Duration::from_millis(options.request_timeout_ms))
            .redirect(redirect::Policy::default())
            .cookie_store(true)
            .build()
            .map_err(SturdyError::Builder)?;
        Ok(Self { http })
    }

    pub(crate) fn client(&self) -> &reqwest::Client {
        &self.http
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: reqwest::Request) -> Result<reqwest::Response> {
        self.http
            .execute(request)
            .await
            .map_err(SturdyError::from_reqwest)
    }
}
