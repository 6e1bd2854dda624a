//! Serialized export queue.
//!
//! A single worker task drains export requests in submission order, so two
//! exports issued back to back can never race at the sink. Each request gets
//! a ticket that resolves once its write has finished or failed.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::{ExportArtifacts, ExportSink};
use crate::error::PersistError;

/// Unique identifier for an export request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ExportId(pub Uuid);

impl ExportId {
    /// Create a new random export ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ExportId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ExportId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Confirmation that an export reached the sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportReceipt {
    pub id: ExportId,
    /// Position of this export in the queue, starting at 1.
    pub sequence: u64,
    pub files: Vec<PathBuf>,
}

struct ExportJob {
    id: ExportId,
    artifacts: ExportArtifacts,
    reply: oneshot::Sender<Result<ExportReceipt, PersistError>>,
}

impl std::fmt::Debug for ExportJob {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExportJob").field("id", &self.id).finish()
    }
}

/// Handle to a submitted export.
#[derive(Debug)]
pub struct ExportTicket {
    id: ExportId,
    receiver: oneshot::Receiver<Result<ExportReceipt, PersistError>>,
}

impl ExportTicket {
    pub fn id(&self) -> ExportId {
        self.id
    }

    /// Wait for the export to finish.
    pub async fn wait(self) -> Result<ExportReceipt, PersistError> {
        self.receiver.await.map_err(|_| PersistError::QueueClosed)?
    }
}

/// Front end of the export worker.
#[derive(Debug, Clone)]
pub struct ExportQueue {
    sender: mpsc::UnboundedSender<ExportJob>,
}

impl ExportQueue {
    /// Start a worker writing to `sink`.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn<S: ExportSink>(sink: S) -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        tokio::spawn(run_worker(sink, receiver));
        Self { sender }
    }

    /// Queue an export. Never blocks.
    pub fn submit(&self, artifacts: ExportArtifacts) -> Result<ExportTicket, PersistError> {
        let id = ExportId::new();
        let (reply, receiver) = oneshot::channel();

        self.sender
            .send(ExportJob {
                id,
                artifacts,
                reply,
            })
            .map_err(|_| PersistError::QueueClosed)?;
        debug!(export = %id, "export queued");

        Ok(ExportTicket { id, receiver })
    }
}

async fn run_worker<S: ExportSink>(sink: S, mut jobs: mpsc::UnboundedReceiver<ExportJob>) {
    let mut sequence = 0u64;

    while let Some(job) = jobs.recv().await {
        sequence += 1;
        let result = sink.write(job.artifacts).await.map(|files| ExportReceipt {
            id: job.id,
            sequence,
            files,
        });

        match &result {
            Ok(receipt) => info!(
                export = %job.id,
                sequence,
                files = receipt.files.len(),
                "export written"
            ),
            Err(err) => warn!(export = %job.id, sequence, error = %err, "export failed"),
        }

        // The submitter may have dropped its ticket; the write still happened.
        let _ = job.reply.send(result);
    }

    debug!("export queue closed");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::future::Future;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use dialogue_graph::Condition;

    /// Records the condition names of each export it receives.
    #[derive(Clone, Default)]
    struct RecordingSink {
        writes: Arc<Mutex<Vec<Vec<String>>>>,
    }

    impl ExportSink for RecordingSink {
        fn write(
            &self,
            artifacts: ExportArtifacts,
        ) -> impl Future<Output = Result<Vec<PathBuf>, PersistError>> + Send {
            let writes = self.writes.clone();
            async move {
                // Later exports finish faster, so ordering comes from the queue alone.
                let delay = 30u64.saturating_sub(10 * artifacts.conditions.len() as u64);
                tokio::time::sleep(Duration::from_millis(delay)).await;

                let names = artifacts.conditions.into_iter().map(|c| c.name).collect();
                writes.lock().unwrap().push(names);
                Ok(vec![PathBuf::from("memory")])
            }
        }
    }

    struct FailingSink;

    impl ExportSink for FailingSink {
        fn write(
            &self,
            _artifacts: ExportArtifacts,
        ) -> impl Future<Output = Result<Vec<PathBuf>, PersistError>> + Send {
            async {
                Err(PersistError::SinkWriteFailure {
                    path: PathBuf::from("/unwritable"),
                    source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
                })
            }
        }
    }

    fn artifacts_with(count: usize) -> ExportArtifacts {
        ExportArtifacts {
            conditions: (0..count)
                .map(|i| Condition::new(format!("C{}", i), true))
                .collect(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_exports_are_serialized() {
        let sink = RecordingSink::default();
        let queue = ExportQueue::spawn(sink.clone());

        let first = queue.submit(artifacts_with(1)).unwrap();
        let second = queue.submit(artifacts_with(2)).unwrap();
        let third = queue.submit(artifacts_with(3)).unwrap();

        let third = third.wait().await.unwrap();
        let first = first.wait().await.unwrap();
        let second = second.wait().await.unwrap();

        assert_eq!(
            (first.sequence, second.sequence, third.sequence),
            (1, 2, 3)
        );

        let writes = sink.writes.lock().unwrap().clone();
        let sizes: Vec<_> = writes.iter().map(|w| w.len()).collect();
        assert_eq!(sizes, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_ticket_carries_id() {
        let queue = ExportQueue::spawn(RecordingSink::default());
        let ticket = queue.submit(artifacts_with(0)).unwrap();
        let id = ticket.id();

        let receipt = ticket.wait().await.unwrap();
        assert_eq!(receipt.id, id);
        assert_eq!(receipt.files, vec![PathBuf::from("memory")]);
    }

    #[tokio::test]
    async fn test_failure_reaches_caller() {
        let queue = ExportQueue::spawn(FailingSink);

        let err = queue.submit(artifacts_with(1)).unwrap().wait().await.unwrap_err();
        assert!(matches!(err, PersistError::SinkWriteFailure { .. }));

        // The worker keeps serving after a failed write.
        let err = queue.submit(artifacts_with(1)).unwrap().wait().await.unwrap_err();
        assert!(matches!(err, PersistError::SinkWriteFailure { .. }));
    }
}
