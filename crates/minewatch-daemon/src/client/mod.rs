//! Collaborator contracts for the remote game services.
//!
//! The query service reads game state; the transaction service submits
//! chain transactions and waits for receipts. Both are opaque
//! request/response collaborators: their network implementations live
//! outside this crate, and tests substitute [`MockGameService`].
//!
//! # Limitations
//!
//! Listings are single-page. Accounts with more than
//! [`DEFAULT_PAGE_LIMIT`] open mines or teams are served whatever the
//! remote service's default ordering puts on the first page.

use std::fmt;

use async_trait::async_trait;
use minewatch_core::game::{Mine, MineStatus, Recruit, Team};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod mock;

pub use mock::MockGameService;

/// Listing page size used by the orchestrator.
pub const DEFAULT_PAGE_LIMIT: u32 = 200;

// =============================================================================
// Filters
// =============================================================================

/// Filter for mine listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MineFilter {
    /// Maximum entries per page.
    pub limit: u32,
    /// Page number, starting at 1.
    pub page: u32,
    /// Restrict to mines with this status.
    pub status: Option<MineStatus>,
    /// Restrict to mines owned by this address.
    pub owner: Option<String>,
}

impl MineFilter {
    /// First page of a user's open mines.
    #[must_use]
    pub fn open_for(owner: &str) -> Self {
        Self {
            limit: DEFAULT_PAGE_LIMIT,
            page: 1,
            status: Some(MineStatus::Open),
            owner: Some(owner.to_string()),
        }
    }
}

/// Filter for team listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TeamFilter {
    /// Maximum entries per page.
    pub limit: u32,
    /// Page number, starting at 1.
    pub page: u32,
    /// Only teams not committed to an open mine.
    pub available_only: bool,
    /// Owning address.
    pub owner: String,
}

impl TeamFilter {
    /// First page of a user's available teams.
    #[must_use]
    pub fn available_for(owner: &str) -> Self {
        Self {
            limit: DEFAULT_PAGE_LIMIT,
            page: 1,
            available_only: true,
            owner: owner.to_string(),
        }
    }
}

// =============================================================================
// Transactions
// =============================================================================

/// Handle of a submitted transaction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TxHash(String);

impl TxHash {
    /// Wraps a transaction hash string.
    #[must_use]
    pub fn new(hash: impl Into<String>) -> Self {
        Self(hash.into())
    }

    /// The hash as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TxHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Execution status carried by a receipt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReceiptStatus {
    /// The transaction executed successfully.
    Success,
    /// The transaction was mined but reverted.
    Reverted,
}

impl ReceiptStatus {
    /// Whether this status counts as a success.
    #[must_use]
    pub const fn is_success(self) -> bool {
        matches!(self, Self::Success)
    }
}

/// Outcome record of a submitted transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receipt {
    /// The transaction this receipt settles.
    pub tx_hash: TxHash,
    /// Execution status.
    pub status: ReceiptStatus,
    /// Block the transaction was mined in, when known.
    #[serde(default)]
    pub block_number: Option<u64>,
    /// Gas consumed, when known.
    #[serde(default)]
    pub gas_used: Option<u64>,
}

/// Errors from the remote game services.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ClientError {
    /// Transport-level failure reaching the service.
    #[error("transport error: {0}")]
    Transport(String),

    /// The service answered with an error.
    #[error("service error: {message}")]
    Api {
        /// Protocol-level status code, if available.
        status: Option<u16>,
        /// Error message from the service.
        message: String,
    },

    /// The response could not be decoded.
    #[error("malformed response: {0}")]
    Decode(String),

    /// The transaction was rejected before it reached the chain.
    #[error("transaction rejected: {0}")]
    Rejected(String),
}

// =============================================================================
// Service Traits
// =============================================================================

/// Read side of the remote game state.
#[async_trait]
pub trait GameQueryClient: Send + Sync {
    /// Lists mines matching `filter` (first page only).
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] if the service cannot be reached or
    /// answers with an error.
    async fn list_mines(&self, filter: &MineFilter) -> Result<Vec<Mine>, ClientError>;

    /// Lists teams matching `filter` (first page only).
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] if the service cannot be reached or
    /// answers with an error.
    async fn list_teams(&self, filter: &TeamFilter) -> Result<Vec<Team>, ClientError>;

    /// Fetches a fresh snapshot of one mine.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] if the mine is unknown or the service
    /// cannot be reached.
    async fn get_mine(&self, game_id: u64) -> Result<Mine, ClientError>;

    /// Lists the live pool of lendable recruits for one mine.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] if the service cannot be reached or
    /// answers with an error.
    async fn list_recruits(&self, game_id: u64) -> Result<Vec<Recruit>, ClientError>;
}

/// Write side: submits transactions and waits for receipts.
#[async_trait]
pub trait GameTxClient: Send + Sync {
    /// Submits a close for a finished mine.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] if the submission is rejected or the
    /// service cannot be reached.
    async fn close_game(&self, game_id: u64) -> Result<TxHash, ClientError>;

    /// Dispatches a team into a new mine.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] if the submission is rejected or the
    /// service cannot be reached.
    async fn start_game(&self, team_id: u64) -> Result<TxHash, ClientError>;

    /// Borrows `recruit_id` into `game_id` at `price` base units.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] if the submission is rejected or the
    /// service cannot be reached.
    async fn reinforce_defense(
        &self,
        game_id: u64,
        recruit_id: u64,
        price: u128,
    ) -> Result<TxHash, ClientError>;

    /// Waits until `tx` is mined and returns its receipt.
    ///
    /// Blocks for as long as the chain takes; no timeout is imposed
    /// here. Callers wanting one wrap the call in their own deadline.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] if the transaction is unknown or the
    /// service cannot be reached.
    async fn wait_for_receipt(&self, tx: &TxHash) -> Result<Receipt, ClientError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_filter_targets_first_page_of_open_mines() {
        let filter = MineFilter::open_for("0xAbCd");
        assert_eq!(filter.limit, DEFAULT_PAGE_LIMIT);
        assert_eq!(filter.page, 1);
        assert_eq!(filter.status, Some(MineStatus::Open));
        assert_eq!(filter.owner.as_deref(), Some("0xAbCd"));
    }

    #[test]
    fn team_filter_requests_available_only() {
        let filter = TeamFilter::available_for("0xAbCd");
        assert!(filter.available_only);
        assert_eq!(filter.page, 1);
    }

    #[test]
    fn receipt_status_classification() {
        assert!(ReceiptStatus::Success.is_success());
        assert!(!ReceiptStatus::Reverted.is_success());
    }

    #[test]
    fn tx_hash_displays_verbatim() {
        let hash = TxHash::new("0xdeadbeef");
        assert_eq!(hash.to_string(), "0xdeadbeef");
        assert_eq!(hash.as_str(), "0xdeadbeef");
    }
}
