//! Durable transaction audit sink.
//!
//! Every submitted hash and settled receipt is handed to the sink for
//! record-keeping. The sink is side-effect only: the orchestrator never
//! relies on a return value, and a sink that drops records cannot fail
//! an operation.

use std::sync::Mutex;

use tracing::info;

use crate::client::{Receipt, TxHash};

/// Accepts transaction handles and receipts for durable record-keeping.
pub trait TxAudit: Send + Sync {
    /// Records a freshly submitted transaction hash.
    fn record_submission(&self, tx: &TxHash);

    /// Records the settled receipt of a transaction.
    fn record_receipt(&self, receipt: &Receipt);
}

/// Audit sink that writes to the dedicated `txlog` tracing target.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingTxAudit;

impl TxAudit for TracingTxAudit {
    fn record_submission(&self, tx: &TxHash) {
        info!(target: "txlog", tx_hash = %tx, "submitted");
    }

    fn record_receipt(&self, receipt: &Receipt) {
        info!(
            target: "txlog",
            tx_hash = %receipt.tx_hash,
            status = ?receipt.status,
            block_number = receipt.block_number,
            gas_used = receipt.gas_used,
            "settled"
        );
    }
}

/// One entry recorded by [`RecordingTxAudit`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuditEntry {
    /// A submitted hash.
    Submission(TxHash),
    /// A settled receipt.
    Receipt(Receipt),
}

/// Recording audit sink for tests.
#[derive(Debug, Default)]
pub struct RecordingTxAudit {
    entries: Mutex<Vec<AuditEntry>>,
}

impl RecordingTxAudit {
    /// Creates an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of recorded entries, in order.
    #[must_use]
    pub fn entries(&self) -> Vec<AuditEntry> {
        self.entries
            .lock()
            .map(|entries| entries.clone())
            .unwrap_or_default()
    }
}

impl TxAudit for RecordingTxAudit {
    fn record_submission(&self, tx: &TxHash) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.push(AuditEntry::Submission(tx.clone()));
        }
    }

    fn record_receipt(&self, receipt: &Receipt) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.push(AuditEntry::Receipt(receipt.clone()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::ReceiptStatus;

    #[test]
    fn recording_sink_keeps_order() {
        let audit = RecordingTxAudit::new();
        let tx = TxHash::new("0x01");
        audit.record_submission(&tx);
        audit.record_receipt(&Receipt {
            tx_hash: tx.clone(),
            status: ReceiptStatus::Success,
            block_number: None,
            gas_used: None,
        });

        let entries = audit.entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0], AuditEntry::Submission(tx));
        assert!(matches!(entries[1], AuditEntry::Receipt(_)));
    }
}
