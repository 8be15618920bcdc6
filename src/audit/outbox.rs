//! Audit Outbox
//!
//! Bounded channel between request handlers and a single background worker
//! that appends records to the audit sink. Enqueueing never waits: when the
//! queue is full or the worker is gone the record is dropped and logged.

use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use super::{AuditRecord, AuditSink, AuditWriteError};

/// Sender side, held by the balance service
#[derive(Clone)]
pub struct AuditOutbox {
    tx: mpsc::Sender<AuditRecord>,
}

impl AuditOutbox {
    /// Queue a record for the worker. Never blocks.
    pub fn enqueue(&self, record: AuditRecord) -> Result<(), AuditWriteError> {
        let target_id = record.target_id.clone();
        let result = self.tx.try_send(record).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => AuditWriteError::QueueFull,
            mpsc::error::TrySendError::Closed(_) => AuditWriteError::QueueClosed,
        });
        if let Err(ref e) = result {
            warn!(target_id = %target_id, error = %e, "Audit record dropped");
        }
        result
    }
}

/// Receiver side, drains the queue into the sink
pub struct AuditWorker {
    rx: mpsc::Receiver<AuditRecord>,
    sink: Arc<dyn AuditSink>,
}

impl AuditWorker {
    /// Run until every [`AuditOutbox`] clone is dropped and the queue is empty.
    ///
    /// Returns the number of records appended.
    pub async fn run(mut self) -> usize {
        info!("Starting audit worker");
        let mut written = 0;

        while let Some(record) = self.rx.recv().await {
            match self.sink.append(&record).await {
                Ok(()) => {
                    written += 1;
                    debug!(
                        admin_user_id = %record.admin_user_id,
                        target_id = %record.target_id,
                        action = %record.action,
                        "Audit record written"
                    );
                }
                Err(e) => {
                    error!(
                        admin_user_id = %record.admin_user_id,
                        target_id = %record.target_id,
                        error = %e,
                        "Failed to write audit record"
                    );
                }
            }
        }

        info!(written, "Audit worker stopped");
        written
    }
}

/// Create a new outbox/worker pair
pub fn audit_outbox(capacity: usize, sink: Arc<dyn AuditSink>) -> (AuditOutbox, AuditWorker) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    (AuditOutbox { tx }, AuditWorker { rx, sink })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::MemoryAuditSink;
    use crate::audit::tests::sample_record;
    use async_trait::async_trait;

    struct FailingSink;

    #[async_trait]
    impl AuditSink for FailingSink {
        async fn append(&self, _record: &AuditRecord) -> Result<(), AuditWriteError> {
            Err(AuditWriteError::Database("relation does not exist".into()))
        }

        async fn recent(
            &self,
            _target_id: &str,
            _limit: u32,
        ) -> Result<Vec<AuditRecord>, AuditWriteError> {
            Ok(vec![])
        }
    }

    #[tokio::test]
    async fn test_worker_drains_queue() {
        let sink = Arc::new(MemoryAuditSink::new());
        let (outbox, worker) = audit_outbox(8, sink.clone());
        let handle = tokio::spawn(worker.run());

        outbox.enqueue(sample_record("u1", "a")).unwrap();
        outbox.enqueue(sample_record("u1", "b")).unwrap();
        drop(outbox);

        assert_eq!(handle.await.unwrap(), 2);
        assert_eq!(sink.len().await, 2);
    }

    #[tokio::test]
    async fn test_full_queue_drops_record() {
        let (outbox, _worker) = audit_outbox(1, Arc::new(MemoryAuditSink::new()));
        outbox.enqueue(sample_record("u1", "a")).unwrap();
        assert_eq!(
            outbox.enqueue(sample_record("u1", "b")),
            Err(AuditWriteError::QueueFull)
        );
    }

    #[tokio::test]
    async fn test_closed_queue_drops_record() {
        let (outbox, worker) = audit_outbox(4, Arc::new(MemoryAuditSink::new()));
        drop(worker);
        assert_eq!(
            outbox.enqueue(sample_record("u1", "a")),
            Err(AuditWriteError::QueueClosed)
        );
    }

    #[tokio::test]
    async fn test_sink_failure_keeps_worker_running() {
        let (outbox, worker) = audit_outbox(4, Arc::new(FailingSink));
        let handle = tokio::spawn(worker.run());
        outbox.enqueue(sample_record("u1", "a")).unwrap();
        outbox.enqueue(sample_record("u1", "b")).unwrap();
        drop(outbox);
        assert_eq!(handle.await.unwrap(), 0);
    }
}
