//! Background task that carries out the wizard's outbound commands.

use intake_core::FileRef;
use intake_submit::{AttachmentResolver, Submitter};
use intake_wizard::Command;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Result of a command, fed back into the wizard on the next tick
#[derive(Debug)]
pub enum WorkerResponse {
    Submitted {
        attempt: u32,
        outcome: Result<(), String>,
    },
    Resolved {
        field: String,
        file: FileRef,
        outcome: Result<String, String>,
    },
}

pub struct SubmissionWorker {
    request_tx: mpsc::Sender<Command>,
    response_rx: mpsc::Receiver<WorkerResponse>,
}

impl SubmissionWorker {
    /// Commands run one at a time, in the order the wizard issued them.
    pub fn spawn(submitter: Arc<dyn Submitter>, resolver: Arc<dyn AttachmentResolver>) -> Self {
        let (request_tx, mut request_rx) = mpsc::channel::<Command>(16);
        let (response_tx, response_rx) = mpsc::channel::<WorkerResponse>(16);

        tokio::spawn(async move {
            tracing::debug!(submitter = submitter.name(), "submission worker started");
            while let Some(command) = request_rx.recv().await {
                let response = match command {
                    Command::Submit { attempt, payload } => {
                        let outcome = submitter.submit(&payload).await.map(|receipt| {
                            tracing::info!(attempt, attempt_id = %receipt.attempt_id, status = receipt.status, "submitted");
                        });
                        WorkerResponse::Submitted {
                            attempt,
                            outcome: outcome.map_err(|e| {
                                tracing::warn!(attempt, error = %e, "submission failed");
                                e.summary()
                            }),
                        }
                    }
                    Command::ResolveAttachment { field, file } => {
                        let outcome = resolver.resolve(&file).await.map_err(|e| {
                            tracing::warn!(file = %file.name, error = %e, "attachment failed");
                            e.summary()
                        });
                        WorkerResponse::Resolved {
                            field,
                            file,
                            outcome,
                        }
                    }
                };
                if response_tx.send(response).await.is_err() {
                    break;
                }
            }
        });

        Self {
            request_tx,
            response_rx,
        }
    }

    pub fn send(&self, command: Command) -> Result<(), mpsc::error::TrySendError<Command>> {
        self.request_tx.try_send(command)
    }

    pub fn try_recv(&mut self) -> Option<WorkerResponse> {
        self.response_rx.try_recv().ok()
    }
}
