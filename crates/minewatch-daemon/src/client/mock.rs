//! In-memory game service double for tests.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use minewatch_core::game::{Mine, MineStatus, Recruit, Team};

use super::{
    ClientError, GameQueryClient, GameTxClient, MineFilter, Receipt, ReceiptStatus, TeamFilter,
    TxHash,
};

/// Transaction kinds the mock accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxAction {
    /// A close submitted for a mine.
    Close {
        /// Mine acted on.
        game_id: u64,
    },
    /// A dispatch submitted for a team.
    Dispatch {
        /// Team acted on.
        team_id: u64,
    },
    /// A reinforcement borrow submitted for a mine.
    Reinforce {
        /// Mine acted on.
        game_id: u64,
        /// Borrowed recruit.
        recruit_id: u64,
        /// Agreed price in base units.
        price: u128,
    },
}

impl TxAction {
    /// The mine or team id the action acts on.
    #[must_use]
    pub const fn subject(self) -> u64 {
        match self {
            Self::Close { game_id }
            | Self::Reinforce { game_id, .. } => game_id,
            Self::Dispatch { team_id } => team_id,
        }
    }
}

/// One transaction the mock accepted, in submission order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmittedTx {
    /// What was submitted.
    pub action: TxAction,
    /// The minted hash.
    pub tx_hash: TxHash,
}

#[derive(Debug, Default)]
struct MockState {
    mines: Vec<Mine>,
    teams: Vec<Team>,
    recruits: HashMap<u64, Vec<Recruit>>,
    failing_submissions: HashSet<u64>,
    reverting_subjects: HashSet<u64>,
    outcomes: HashMap<TxHash, ReceiptStatus>,
    submitted: Vec<SubmittedTx>,
}

/// Scriptable in-memory stand-in for both remote game services.
///
/// Listings serve the configured records through the same filters the
/// real service applies. Submissions mint sequential hashes and settle
/// immediately with the scripted outcome: ids registered via
/// [`MockGameService::fail_submission_for`] are rejected at submission,
/// ids registered via [`MockGameService::revert_receipt_for`] settle
/// with a reverted receipt, and a confirmed close marks the mine closed
/// so later listings no longer report it open.
#[derive(Debug, Default)]
pub struct MockGameService {
    state: Mutex<MockState>,
    tx_counter: AtomicU64,
}

impl MockGameService {
    /// Creates an empty service.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a mine.
    pub fn add_mine(&self, mine: Mine) {
        if let Ok(mut state) = self.state.lock() {
            state.mines.push(mine);
        }
    }

    /// Registers a team.
    pub fn add_team(&self, team: Team) {
        if let Ok(mut state) = self.state.lock() {
            state.teams.push(team);
        }
    }

    /// Sets the lending pool served for `game_id`.
    pub fn set_recruits(&self, game_id: u64, recruits: Vec<Recruit>) {
        if let Ok(mut state) = self.state.lock() {
            state.recruits.insert(game_id, recruits);
        }
    }

    /// Rejects future submissions acting on `subject` (mine or team id).
    pub fn fail_submission_for(&self, subject: u64) {
        if let Ok(mut state) = self.state.lock() {
            state.failing_submissions.insert(subject);
        }
    }

    /// Settles future submissions acting on `subject` with a reverted
    /// receipt.
    pub fn revert_receipt_for(&self, subject: u64) {
        if let Ok(mut state) = self.state.lock() {
            state.reverting_subjects.insert(subject);
        }
    }

    /// Snapshot of accepted submissions, in order.
    #[must_use]
    pub fn submissions(&self) -> Vec<SubmittedTx> {
        self.state
            .lock()
            .map(|state| state.submitted.clone())
            .unwrap_or_default()
    }

    /// Current snapshot of one mine, if registered.
    #[must_use]
    pub fn mine(&self, game_id: u64) -> Option<Mine> {
        self.state
            .lock()
            .ok()
            .and_then(|state| state.mines.iter().find(|m| m.game_id == game_id).cloned())
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, MockState>, ClientError> {
        self.state
            .lock()
            .map_err(|_| ClientError::Transport("mock state lock poisoned".to_string()))
    }

    fn submit(&self, action: TxAction) -> Result<TxHash, ClientError> {
        let mut state = self.lock()?;
        let subject = action.subject();
        if state.failing_submissions.contains(&subject) {
            return Err(ClientError::Rejected(format!(
                "injected submission failure for {subject}"
            )));
        }
        let n = self.tx_counter.fetch_add(1, Ordering::SeqCst);
        let tx_hash = TxHash::new(format!("0x{n:064x}"));
        let status = if state.reverting_subjects.contains(&subject) {
            ReceiptStatus::Reverted
        } else {
            ReceiptStatus::Success
        };
        if status.is_success() {
            if let TxAction::Close { game_id } = action {
                if let Some(mine) = state.mines.iter_mut().find(|m| m.game_id == game_id) {
                    mine.status = MineStatus::Closed;
                }
            }
        }
        state.outcomes.insert(tx_hash.clone(), status);
        state.submitted.push(SubmittedTx {
            action,
            tx_hash: tx_hash.clone(),
        });
        Ok(tx_hash)
    }
}

#[async_trait]
impl GameQueryClient for MockGameService {
    async fn list_mines(&self, filter: &MineFilter) -> Result<Vec<Mine>, ClientError> {
        let state = self.lock()?;
        let mut mines: Vec<Mine> = state
            .mines
            .iter()
            .filter(|m| {
                filter
                    .owner
                    .as_deref()
                    .is_none_or(|owner| m.owner.eq_ignore_ascii_case(owner))
            })
            .filter(|m| filter.status.is_none_or(|status| m.status == status))
            .cloned()
            .collect();
        mines.truncate(filter.limit as usize);
        Ok(mines)
    }

    async fn list_teams(&self, filter: &TeamFilter) -> Result<Vec<Team>, ClientError> {
        let state = self.lock()?;
        let mut teams: Vec<Team> = state
            .teams
            .iter()
            .filter(|t| t.owner.eq_ignore_ascii_case(&filter.owner))
            .filter(|t| !filter.available_only || t.available)
            .cloned()
            .collect();
        teams.truncate(filter.limit as usize);
        Ok(teams)
    }

    async fn get_mine(&self, game_id: u64) -> Result<Mine, ClientError> {
        self.lock()?
            .mines
            .iter()
            .find(|m| m.game_id == game_id)
            .cloned()
            .ok_or_else(|| ClientError::Api {
                status: None,
                message: format!("unknown mine {game_id}"),
            })
    }

    async fn list_recruits(&self, game_id: u64) -> Result<Vec<Recruit>, ClientError> {
        Ok(self
            .lock()?
            .recruits
            .get(&game_id)
            .cloned()
            .unwrap_or_default())
    }
}

#[async_trait]
impl GameTxClient for MockGameService {
    async fn close_game(&self, game_id: u64) -> Result<TxHash, ClientError> {
        self.submit(TxAction::Close { game_id })
    }

    async fn start_game(&self, team_id: u64) -> Result<TxHash, ClientError> {
        self.submit(TxAction::Dispatch { team_id })
    }

    async fn reinforce_defense(
        &self,
        game_id: u64,
        recruit_id: u64,
        price: u128,
    ) -> Result<TxHash, ClientError> {
        self.submit(TxAction::Reinforce {
            game_id,
            recruit_id,
            price,
        })
    }

    async fn wait_for_receipt(&self, tx: &TxHash) -> Result<Receipt, ClientError> {
        let state = self.lock()?;
        let status = state
            .outcomes
            .get(tx)
            .copied()
            .ok_or_else(|| ClientError::Api {
                status: None,
                message: format!("unknown transaction {tx}"),
            })?;
        Ok(Receipt {
            tx_hash: tx.clone(),
            status,
            block_number: Some(1),
            gas_used: Some(21_000),
        })
    }
}
