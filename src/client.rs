use std::fmt;
use std::sync::Arc;

use reqwest::{IntoUrl, Method};

use crate::http_errors::HttpErrorStage;
use crate::pipeline::Pipeline;
use crate::retry::RetryStage;
use crate::transport::HttpTransport;
use crate::{ClientOptions, Result, RetryPolicy, SturdyError};

/// Configured HTTP client with the layered pipeline installed.
///
/// Cheap to clone; clones share the same pipeline and connection pool. The
/// client is safe to use from any number of concurrent tasks; retry state
/// is per request, never shared.
#[derive(Clone)]
pub struct SturdyClient {
    pipeline: Arc<Pipeline>,
    // Request factory only; requests are executed through the pipeline.
    http: reqwest::Client,
}

impl fmt::Debug for SturdyClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SturdyClient")
            .field("pipeline", &self.pipeline)
            .finish_non_exhaustive()
    }
}

impl SturdyClient {
    /// Creates a client with default options.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use sturdy_http::SturdyClient;
    ///
    /// # async fn run() -> sturdy_http::Result<()> {
    /// let client = SturdyClient::new()?;
    /// let response = client.get("https://example.com").await?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn new() -> Result<Self> {
        Self::with_options(ClientOptions::default())
    }

    /// Creates a client from options.
    ///
    /// The transport is a `reqwest::Client` with the configured timeouts,
    /// redirect following, and a cookie store. Non-success statuses are
    /// translated into [`SturdyError::Http`] failures, and transient
    /// failures are retried per the options' [`RetryPolicy`].
    pub fn with_options(options: ClientOptions) -> Result<Self> {
        Self::from_builder(reqwest::Client::builder(), options)
    }

    /// Creates a client from options, seeding the transport with a
    /// caller-supplied `reqwest::ClientBuilder`.
    ///
    /// Use this to pass transport settings (TLS, proxies, default headers)
    /// through to reqwest unmodified. The settings that [`ClientOptions`]
    /// owns (timeouts, redirects, cookies) are applied on top of the builder.
    pub fn from_builder(builder: reqwest::ClientBuilder, options: ClientOptions) -> Result<Self> {
        let transport = HttpTransport::from_builder(builder, &options)?;
        let http = transport.client().clone();
        let pipeline = Pipeline::new(transport).with_stage(HttpErrorStage);
        Ok(Self {
            pipeline: Arc::new(with_retry(pipeline, options.retry)),
            http,
        })
    }

    /// Wraps a caller-supplied pipeline with just the retry stage.
    ///
    /// None of the default stages are added: the supplied pipeline is
    /// responsible for error translation and anything else it wants. Raw
    /// non-success responses coming back through it are still judged by
    /// status for retry purposes. Mixing this mode with the option-driven
    /// defaults is unsupported: supply either options or a pipeline.
    pub fn with_pipeline(pipeline: Pipeline, retry: RetryPolicy) -> Result<Self> {
        let http = reqwest::Client::builder()
            .build()
            .map_err(SturdyError::Builder)?;
        Ok(Self {
            pipeline: Arc::new(with_retry(pipeline, retry)),
            http,
        })
    }

    /// Builds a bare request for this client.
    pub fn request(&self, method: Method, url: impl IntoUrl) -> Result<reqwest::Request> {
        self.http
            .request(method, url)
            .build()
            .map_err(SturdyError::Builder)
    }

    /// Sends a request through the pipeline.
    ///
    /// This is the single core capability; everything else is convenience.
    pub async fn send(&self, request: reqwest::Request) -> Result<reqwest::Response> {
        self.pipeline.execute(request).await
    }

    /// Sends a GET request.
    pub async fn get(&self, url: impl IntoUrl) -> Result<reqwest::Response> {
        self.send(self.request(Method::GET, url)?).await
    }

    /// Sends a POST request with the given body.
    pub async fn post(
        &self,
        url: impl IntoUrl,
        body: impl Into<reqwest::Body>,
    ) -> Result<reqwest::Response> {
        let mut request = self.request(Method::POST, url)?;
        *request.body_mut() = Some(body.into());
        self.send(request).await
    }
}

/// Appends the retry stage on top of the pipeline, unless retries are
/// disabled entirely. `max_retries == 0` means no wrapping at all.
fn with_retry(pipeline: Pipeline, policy: RetryPolicy) -> Pipeline {
    if policy.max_retries == 0 {
        return pipeline;
    }
    pipeline.wrapped_in(RetryStage::new(policy))
}
