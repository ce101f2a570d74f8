//! Sequential text translation.
//!
//! [`TranslationQueue`] fronts a [`Translator`] backend with a strictly FIFO
//! work queue: one worker task takes jobs off an `mpsc` channel and runs
//! them one at a time, in submission order. Each job carries a `oneshot`
//! completion handle, so callers await their own result while the backend
//! only ever sees a single request in flight.

mod http;

pub use http::HttpTranslator;

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, warn};

use crate::{FeedError, Result};

/// Default number of jobs that may wait in the queue.
pub const DEFAULT_QUEUE_CAPACITY: usize = 256;

/// One piece of text to translate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationRequest {
    pub text: String,
    /// Target language code, e.g. `"de"`.
    pub target: String,
    /// Source language code; `None` lets the backend detect it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

impl TranslationRequest {
    pub fn new(text: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            target: target.into(),
            source: None,
        }
    }

    pub fn source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Reject requests no backend could serve.
    pub fn validate(&self) -> Result<()> {
        if self.target.trim().is_empty() {
            return Err(FeedError::Validation("target language is required".into()));
        }
        if self.text.trim().is_empty() {
            return Err(FeedError::Validation("text is required".into()));
        }
        Ok(())
    }
}

/// A translation backend.
#[async_trait]
pub trait Translator: Send + Sync {
    /// Backend name for logging.
    fn name(&self) -> &str;

    async fn translate(&self, request: &TranslationRequest) -> Result<String>;
}

struct Job {
    request: TranslationRequest,
    reply: oneshot::Sender<Result<String>>,
}

/// Completion handle for a submitted job.
pub struct TranslationHandle {
    rx: oneshot::Receiver<Result<String>>,
}

impl TranslationHandle {
    /// Wait for the job to finish.
    pub async fn wait(self) -> Result<String> {
        self.rx
            .await
            .map_err(|_| FeedError::Translation("translation worker stopped".into()))?
    }
}

/// FIFO queue in front of a [`Translator`].
///
/// Cloning shares the same queue and worker.
#[derive(Clone)]
pub struct TranslationQueue {
    tx: mpsc::Sender<Job>,
}

impl TranslationQueue {
    /// Start the worker with the default capacity.
    ///
    /// # Panics
    ///
    /// Requires a tokio runtime context.
    pub fn new(translator: Arc<dyn Translator>) -> Self {
        Self::with_capacity(translator, DEFAULT_QUEUE_CAPACITY)
    }

    /// Start the worker; `capacity` bounds the number of waiting jobs, and
    /// submitters wait for room once it is reached.
    ///
    /// # Panics
    ///
    /// Requires a tokio runtime context.
    pub fn with_capacity(translator: Arc<dyn Translator>, capacity: usize) -> Self {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        tokio::spawn(run_worker(translator, rx));
        Self { tx }
    }

    /// Append a job to the queue and return its completion handle.
    ///
    /// Jobs complete in submission order.
    pub async fn submit(&self, request: TranslationRequest) -> Result<TranslationHandle> {
        request.validate()?;
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(Job { request, reply })
            .await
            .map_err(|_| FeedError::Translation("translation queue closed".into()))?;
        Ok(TranslationHandle { rx })
    }

    /// Submit a job and wait for its result.
    pub async fn enqueue(&self, request: TranslationRequest) -> Result<String> {
        self.submit(request).await?.wait().await
    }
}

/// Drain the queue one job at a time until every sender is gone.
async fn run_worker(translator: Arc<dyn Translator>, mut rx: mpsc::Receiver<Job>) {
    while let Some(Job { request, reply }) = rx.recv().await {
        let result = translator.translate(&request).await;
        if let Err(e) = &result {
            warn!(backend = translator.name(), target = %request.target, error = %e, "translation failed");
        }
        if reply.send(result).is_err() {
            debug!("translation caller went away before completion");
        }
    }
    debug!(backend = translator.name(), "translation worker stopped");
}
