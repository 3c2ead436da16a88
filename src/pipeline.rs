use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

use crate::Result;

/// A pipeline stage: intercepts a request, forwards it down the chain, and
/// may inspect or replace the outcome on the way back up.
#[async_trait]
pub trait Stage: Send + Sync + 'static {
    async fn handle(&self, request: reqwest::Request, next: Next<'_>) -> Result<reqwest::Response>;
}

/// The innermost collaborator: actually executes a request.
///
/// Implementations map their failures into the crate taxonomy. In
/// particular, connection-level failures become
/// [`SturdyError::Connect`](crate::SturdyError::Connect) so the retry stage
/// can treat them as transient.
#[async_trait]
pub trait Transport: Send + Sync + 'static {
    async fn send(&self, request: reqwest::Request) -> Result<reqwest::Response>;
}

/// The rest of the chain as seen from one stage: the stages below it plus
/// the transport at the bottom.
#[derive(Clone)]
pub struct Next<'a> {
    transport: &'a dyn Transport,
    stages: &'a [Arc<dyn Stage>],
}

impl<'a> Next<'a> {
    pub(crate) fn new(transport: &'a dyn Transport, stages: &'a [Arc<dyn Stage>]) -> Self {
        Self { transport, stages }
    }

    /// Forwards the request to the next stage, or to the transport once no
    /// stages remain.
    pub async fn run(self, request: reqwest::Request) -> Result<reqwest::Response> {
        match self.stages.split_first() {
            Some((stage, rest)) => {
                stage
                    .handle(request, Next::new(self.transport, rest))
                    .await
            }
            None => self.transport.send(request).await,
        }
    }
}

/// An ordered chain of stages around a base transport, assembled once at
/// configuration time. The first stage is outermost (closest to the caller).
///
/// Construction performs no I/O; nothing touches the network until
/// [`execute`](Self::execute).
pub struct Pipeline {
    transport: Arc<dyn Transport>,
    stages: Vec<Arc<dyn Stage>>,
}

impl Pipeline {
    /// Creates a pipeline with no stages around the given transport.
    pub fn new(transport: impl Transport) -> Self {
        Self {
            transport: Arc::new(transport),
            stages: Vec::new(),
        }
    }

    /// Adds a stage inside the existing ones, closer to the transport.
    pub fn with_stage(mut self, stage: impl Stage) -> Self {
        self.stages.push(Arc::new(stage));
        self
    }

    /// Wraps the whole pipeline in a new outermost stage.
    pub(crate) fn wrapped_in(mut self, stage: impl Stage) -> Self {
        self.stages.insert(0, Arc::new(stage));
        self
    }

    pub(crate) fn stage_count(&self) -> usize {
        self.stages.len()
    }

    /// Drives one request through every stage down to the transport.
    pub async fn execute(&self, request: reqwest::Request) -> Result<reqwest::Response> {
        Next::new(self.transport.as_ref(), &self.stages)
            .run(request)
            .await
    }
}

impl fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("stages", &self.stages.len())
            .finish_non_exhaustive()
    }
}
