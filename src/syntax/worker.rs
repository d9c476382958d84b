//! Background tokenization task.
//!
//! A [`TokenizeWorker`] owns one [`LineCache`] inside a tokio task and talks
//! to its host over a pair of mpsc channels.

use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

use super::Language;
use super::cache::LineCache;
use super::debounce::{TokenizeRequest, TokenizeResponse};

/// Channel capacity in each direction.
const CHANNEL_CAPACITY: usize = 32;

/// Commands accepted by the worker task.
#[derive(Debug, Clone)]
pub enum WorkerCommand {
    Tokenize(TokenizeRequest),
    SetLanguage(Language),
    Clear,
    Shutdown,
}

/// Worker errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum WorkerError {
    #[error("tokenize worker has stopped")]
    Closed,
}

/// Handle to a running tokenize task.
#[derive(Debug)]
pub struct TokenizeWorker {
    commands: mpsc::Sender<WorkerCommand>,
    responses: mpsc::Receiver<TokenizeResponse>,
    handle: JoinHandle<()>,
}

impl TokenizeWorker {
    /// Spawns the task on the current tokio runtime.
    #[must_use]
    pub fn spawn(language: Language) -> Self {
        let (command_tx, command_rx) = mpsc::channel(CHANNEL_CAPACITY);
        let (response_tx, response_rx) = mpsc::channel(CHANNEL_CAPACITY);
        let handle = tokio::spawn(run(LineCache::new(language), command_rx, response_tx));
        Self {
            commands: command_tx,
            responses: response_rx,
            handle,
        }
    }

    /// Queues a tokenize request.
    pub async fn submit(&self, request: TokenizeRequest) -> Result<(), WorkerError> {
        self.send(WorkerCommand::Tokenize(request)).await
    }

    pub async fn set_language(&self, language: Language) -> Result<(), WorkerError> {
        self.send(WorkerCommand::SetLanguage(language)).await
    }

    pub async fn clear(&self) -> Result<(), WorkerError> {
        self.send(WorkerCommand::Clear).await
    }

    /// Waits for the next response. `None` once the task has stopped.
    pub async fn recv(&mut self) -> Option<TokenizeResponse> {
        self.responses.recv().await
    }

    /// Returns a response if one is ready.
    pub fn try_recv(&mut self) -> Result<Option<TokenizeResponse>, WorkerError> {
        match self.responses.try_recv() {
            Ok(response) => Ok(Some(response)),
            Err(mpsc::error::TryRecvError::Empty) => Ok(None),
            Err(mpsc::error::TryRecvError::Disconnected) => Err(WorkerError::Closed),
        }
    }

    /// Stops the task and waits for it to finish.
    pub async fn shutdown(self) {
        // A closed channel means the task is already gone.
        let _ = self.commands.send(WorkerCommand::Shutdown).await;
        let _ = self.handle.await;
    }

    async fn send(&self, command: WorkerCommand) -> Result<(), WorkerError> {
        self.commands
            .send(command)
            .await
            .map_err(|_| WorkerError::Closed)
    }
}

async fn run(
    mut cache: LineCache,
    mut commands: mpsc::Receiver<WorkerCommand>,
    responses: mpsc::Sender<TokenizeResponse>,
) {
    while let Some(command) = commands.recv().await {
        match command {
            WorkerCommand::Tokenize(request) => {
                cache.set_language(request.language);
                let tokens = cache.tokenize(&request.content);
                let response = TokenizeResponse {
                    id: request.id,
                    tokens,
                    stats: cache.get_stats(),
                };
                if responses.send(response).await.is_err() {
                    break;
                }
            }
            WorkerCommand::SetLanguage(language) => cache.set_language(language),
            WorkerCommand::Clear => cache.clear(),
            WorkerCommand::Shutdown => break,
        }
    }
    debug!(language = %cache.language(), "tokenize worker stopped");
}
