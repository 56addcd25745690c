//! Model runtime integration.
//!
//! Bridges the sync game loop with async model calls. The game submits jobs
//! tagged with a ticket and polls for replies once per frame; nothing here
//! ever blocks a frame.

use std::time::{Duration, Instant};

use tokio::runtime::Runtime;
use tokio::sync::mpsc;

use crate::client::ModelClient;
use crate::config::ModelConfig;
use crate::error::ModelError;
use crate::offline::OfflineResponder;
use crate::responder::Responder;
use crate::types::{ModelOutput, ModelRequest};

/// After a failed connect, answer offline for this long before retrying.
const RECONNECT_BACKOFF: Duration = Duration::from_secs(5);

/// Upper bound on a connect attempt, independent of the request timeout.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(2);

/// Reply delivered to the game loop.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelReply {
    pub ticket: u64,
    pub result: Result<ModelOutput, String>,
}

#[derive(Debug)]
struct Job {
    ticket: u64,
    request: ModelRequest,
}

/// Running model bridge.
pub struct ModelRuntime {
    _rt: Runtime,
    job_tx: mpsc::UnboundedSender<Job>,
    reply_rx: mpsc::UnboundedReceiver<ModelReply>,
}

impl ModelRuntime {
    /// Start from environment variables (see [`ModelConfig::from_env`]).
    pub fn start_from_env() -> anyhow::Result<Self> {
        Self::start(ModelConfig::from_env())
    }

    pub fn start(config: ModelConfig) -> anyhow::Result<Self> {
        let rt = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .thread_name("bear-models")
            .enable_all()
            .build()?;

        if config.disabled {
            log::info!("model service disabled; answering offline");
        } else {
            log::info!("model service at {}", config.endpoint());
        }

        let (job_tx, job_rx) = mpsc::unbounded_channel::<Job>();
        let (reply_tx, reply_rx) = mpsc::unbounded_channel::<ModelReply>();
        rt.spawn(worker(config, job_rx, reply_tx));

        Ok(Self {
            _rt: rt,
            job_tx,
            reply_rx,
        })
    }

    /// Queue a request. Returns false if the worker has stopped.
    pub fn submit(&self, ticket: u64, request: ModelRequest) -> bool {
        self.job_tx.send(Job { ticket, request }).is_ok()
    }

    pub fn try_recv(&mut self) -> Option<ModelReply> {
        self.reply_rx.try_recv().ok()
    }
}

async fn worker(
    config: ModelConfig,
    mut job_rx: mpsc::UnboundedReceiver<Job>,
    reply_tx: mpsc::UnboundedSender<ModelReply>,
) {
    let offline = OfflineResponder::new();
    let mut remote = Remote::new(config);

    while let Some(job) = job_rx.recv().await {
        let result = match remote.call(&job.request).await {
            Some(Ok(output)) => Ok(output),
            Some(Err(e)) => {
                log::warn!(
                    "model service failed on ticket {}: {}; answering offline",
                    job.ticket,
                    e
                );
                offline.respond(&job.request)
            }
            None => offline.respond(&job.request),
        };

        let reply = ModelReply {
            ticket: job.ticket,
            result: result.map_err(|e| e.to_string()),
        };
        if reply_tx.send(reply).is_err() {
            break;
        }
    }
}

/// Lazily connected model service.
struct Remote {
    config: ModelConfig,
    client: Option<ModelClient>,
    retry_at: Option<Instant>,
}

impl Remote {
    fn new(config: ModelConfig) -> Self {
        Self {
            config,
            client: None,
            retry_at: None,
        }
    }

    /// `None` when the service is disabled or currently unreachable.
    async fn call(&mut self, request: &ModelRequest) -> Option<Result<ModelOutput, ModelError>> {
        if self.config.disabled {
            return None;
        }

        if self.client.is_none() {
            if self.retry_at.is_some_and(|t| Instant::now() < t) {
                return None;
            }
            let connect_timeout = self.config.timeout.min(CONNECT_TIMEOUT);
            match ModelClient::connect(&self.config.host, self.config.port, connect_timeout).await
            {
                Ok(mut client) => {
                    log::info!("connected to model service at {}", self.config.endpoint());
                    client.set_timeout(self.config.timeout);
                    self.client = Some(client);
                    self.retry_at = None;
                }
                Err(e) => {
                    log::warn!(
                        "model service at {} unavailable: {}",
                        self.config.endpoint(),
                        e
                    );
                    self.retry_at = Some(Instant::now() + RECONNECT_BACKOFF);
                    return None;
                }
            }
        }

        let client = self.client.as_mut()?;
        let result = client.request(request.clone()).await;
        if let Err(e) = &result {
            if e.is_connection_error() {
                self.client = None;
            }
        }
        Some(result)
    }
}
