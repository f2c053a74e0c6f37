//! Transaction outcome classification and reporting.
//!
//! Every submitted transaction is settled by [`settle_submission`]: the
//! receipt is awaited and audited, a success is logged at info, and any
//! other outcome is logged at error and raised to the operator through
//! the alert channel - exactly one alert per failed item. Failures never
//! propagate to the caller; the batch loop only learns whether the item
//! succeeded.

use tracing::{error, info};

use crate::alert::AlertSink;
use crate::audit::TxAudit;
use crate::client::{ClientError, GameTxClient, TxHash};

/// Classified outcome of one submitted transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxOutcome {
    /// The receipt reported success.
    Confirmed,
    /// The transaction was mined but did not succeed.
    Reverted,
    /// Submission or the receipt wait failed client-side.
    Failed,
}

impl TxOutcome {
    /// Whether the acted-on item counts toward the success total.
    #[must_use]
    pub const fn is_success(self) -> bool {
        matches!(self, Self::Confirmed)
    }
}

/// Awaits, audits, and classifies one submitted transaction.
///
/// `action` names the operation for logs and alerts ("closing",
/// "dispatching", "reinforcing"); `subject` is the acted-on mine or
/// team id.
pub(crate) async fn settle_submission(
    tx_client: &dyn GameTxClient,
    audit: &dyn TxAudit,
    alerts: &dyn AlertSink,
    action: &str,
    subject: u64,
    submission: Result<TxHash, ClientError>,
) -> TxOutcome {
    let tx_hash = match submission {
        Ok(tx_hash) => tx_hash,
        Err(err) => {
            error!(action, subject, error = %err, "transaction submission failed");
            alerts.send(&format!(
                "minewatch: ERROR {action} {subject}: submission failed"
            ));
            return TxOutcome::Failed;
        },
    };
    audit.record_submission(&tx_hash);

    let receipt = match tx_client.wait_for_receipt(&tx_hash).await {
        Ok(receipt) => receipt,
        Err(err) => {
            error!(action, subject, tx_hash = %tx_hash, error = %err, "receipt wait failed");
            alerts.send(&format!("minewatch: ERROR {action} > {tx_hash}"));
            return TxOutcome::Failed;
        },
    };
    audit.record_receipt(&receipt);

    if receipt.status.is_success() {
        info!(action, subject, tx_hash = %tx_hash, "transaction confirmed");
        TxOutcome::Confirmed
    } else {
        error!(action, subject, tx_hash = %tx_hash, "transaction reverted");
        alerts.send(&format!("minewatch: ERROR {action} > {tx_hash}"));
        TxOutcome::Reverted
    }
}
