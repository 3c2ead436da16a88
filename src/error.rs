/// Error type returned by this crate.
#[derive(Debug, thiserror::Error)]
pub enum SturdyError {
    /// Connection-level failure from `reqwest`: DNS, TCP, TLS, or timeout.
    #[error("connection error: {0}")]
    Connect(reqwest::Error),
    /// Any other transport failure, such as a malformed response or a body
    /// stream error.
    #[error("transport error: {0}")]
    Transport(reqwest::Error),
    /// Non-success HTTP status with a truncated response-body summary.
    #[error("http error {status}: {summary}")]
    Http { status: u16, summary: String },
    /// Invalid request URL or client construction failure.
    #[error("builder error: {0}")]
    Builder(reqwest::Error),
}

impl SturdyError {
    /// HTTP status carried by the error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether this is a connection-level failure.
    ///
    /// Connection-level failures are the only transport errors the retry
    /// stage treats as transient.
    pub fn is_connect(&self) -> bool {
        matches!(self, Self::Connect(_))
    }

    /// Sorts a `reqwest` failure into the crate taxonomy.
    ///
    /// Timeouts count as connection-level: the transport could not complete
    /// the exchange.
    pub(crate) fn from_reqwest(err: reqwest::Error) -> Self {
        if err.is_connect() || err.is_timeout() {
            Self::Connect(err)
        } else {
            Self::Transport(err)
        }
    }
}
