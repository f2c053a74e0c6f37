//! Mine lifecycle orchestration.
//!
//! Three independently invokable operations share one shape: fetch
//! candidate state from the query service, filter by the relevant
//! predicate, act per candidate through the transaction service, and
//! aggregate outcomes. Each operation takes one user address as its unit
//! of work; there is no batching across users.
//!
//! # Execution Model
//!
//! Candidates are processed strictly one at a time, in the order the
//! query service listed them, and each receipt wait blocks until the
//! chain answers - the orchestrator imposes no timeout, so a hung wait
//! blocks the rest of the batch (accepted limitation). One candidate's
//! failure never stops the rest; only a failed fetch aborts an
//! operation. Every operation returns a definite success count.
//!
//! The orchestrator only ever attempts the `finished -> closed` and
//! `reinforceable -> defended` transitions. `unfinished -> finished` is
//! purely a function of elapsed time and is never acted on.

use std::sync::Arc;

use minewatch_core::clock::Clock;
use minewatch_core::config::UsersConfig;
use minewatch_core::game::{Mine, format_token_amount, next_to_finish};
use minewatch_core::strategy::{ReinforceStrategy, SelectOptions, StrategyError};
use tracing::{info, warn};

use crate::alert::AlertSink;
use crate::audit::TxAudit;
use crate::client::{ClientError, GameQueryClient, GameTxClient, MineFilter, TeamFilter};
use crate::outcome::settle_submission;

// =============================================================================
// Orchestrator
// =============================================================================

/// Orchestrates the recurring mine chores for configured users.
///
/// Collaborators are injected explicitly; the orchestrator holds no
/// global state, and an invocation is self-contained given its user
/// address and freshly fetched remote state.
pub struct MineOrchestrator {
    query: Arc<dyn GameQueryClient>,
    tx: Arc<dyn GameTxClient>,
    audit: Arc<dyn TxAudit>,
    alerts: Arc<dyn AlertSink>,
    clock: Arc<dyn Clock>,
    users: UsersConfig,
    strategy: ReinforceStrategy,
    strict_reinforce: bool,
}

impl MineOrchestrator {
    /// Creates an orchestrator over the given collaborators.
    ///
    /// The reinforcement policy defaults to highest power, non-strict.
    #[must_use]
    pub fn new(
        query: Arc<dyn GameQueryClient>,
        tx: Arc<dyn GameTxClient>,
        audit: Arc<dyn TxAudit>,
        alerts: Arc<dyn AlertSink>,
        clock: Arc<dyn Clock>,
        users: UsersConfig,
    ) -> Self {
        Self {
            query,
            tx,
            audit,
            alerts,
            clock,
            users,
            strategy: ReinforceStrategy::HighestPower,
            strict_reinforce: false,
        }
    }

    /// Overrides the reinforcement policy.
    ///
    /// `strict` forwards into the [`SelectOptions`] handed to the
    /// policy: a strict policy skips a mine instead of borrowing over
    /// the ceiling.
    #[must_use]
    pub fn with_reinforce_policy(mut self, strategy: ReinforceStrategy, strict: bool) -> Self {
        self.strategy = strategy;
        self.strict_reinforce = strict;
        self
    }

    // =========================================================================
    // Close
    // =========================================================================

    /// Closes every open mine of `user` whose end time is due.
    ///
    /// Returns the number of mines actually closed. With nothing to
    /// close, logs the time remaining to the next finisher (if any) and
    /// returns 0.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] only when the mine listing itself fails;
    /// per-mine transaction failures are alerted and skipped.
    pub async fn close_finished_mines(&self, user: &str) -> Result<usize, ClientError> {
        let open_mines = self.query.list_mines(&MineFilter::open_for(user)).await?;
        let now = self.clock.now_unix();
        let finished: Vec<&Mine> = open_mines.iter().filter(|m| m.is_finished(now)).collect();

        if finished.is_empty() {
            match next_to_finish(&open_mines, now) {
                Some(next) => info!(
                    user,
                    next_game_id = next.game_id,
                    remaining = %next.remaining_time_formatted(now),
                    "no mines to close"
                ),
                None => info!(user, "no mines to close"),
            }
            return Ok(0);
        }

        let mut closed = 0;
        for mine in finished {
            info!(user, game_id = mine.game_id, "closing mine");
            let submission = self.tx.close_game(mine.game_id).await;
            let outcome = settle_submission(
                self.tx.as_ref(),
                self.audit.as_ref(),
                self.alerts.as_ref(),
                "closing",
                mine.game_id,
                submission,
            )
            .await;
            if outcome.is_success() {
                closed += 1;
            }
        }
        Ok(closed)
    }

    // =========================================================================
    // Dispatch
    // =========================================================================

    /// Dispatches every available team of `user` into a new mine.
    ///
    /// Returns the number of teams actually dispatched. The mine a
    /// successful dispatch creates is not tracked here; it shows up in
    /// the next listing.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] only when the team listing itself fails;
    /// per-team transaction failures are alerted and skipped.
    pub async fn dispatch_available_teams(&self, user: &str) -> Result<usize, ClientError> {
        let teams = self
            .query
            .list_teams(&TeamFilter::available_for(user))
            .await?;

        if teams.is_empty() {
            info!(user, "no teams to dispatch");
            return Ok(0);
        }

        let mut dispatched = 0;
        for team in &teams {
            info!(user, team_id = team.team_id, "dispatching team");
            let submission = self.tx.start_game(team.team_id).await;
            let outcome = settle_submission(
                self.tx.as_ref(),
                self.audit.as_ref(),
                self.alerts.as_ref(),
                "dispatching",
                team.team_id,
                submission,
            )
            .await;
            if outcome.is_success() {
                dispatched += 1;
            }
        }
        Ok(dispatched)
    }

    // =========================================================================
    // Reinforce
    // =========================================================================

    /// Borrows a reinforcement for every open mine of `user` whose
    /// defense can still accept one.
    ///
    /// The recruit is picked by the configured policy against the live
    /// lending pool of each mine, under the user's configured price
    /// ceiling (no entry, or no ceiling in the entry, leaves the price
    /// unbounded). A mine the policy declines - ceiling exceeded under a
    /// strict policy, or an empty pool - is skipped with a warning and
    /// does not count as a failure.
    ///
    /// Returns the number of mines actually reinforced.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] when the mine listing or a lending-pool
    /// fetch fails; per-mine transaction failures are alerted and
    /// skipped.
    pub async fn reinforce_open_mines(&self, user: &str) -> Result<usize, ClientError> {
        let ceiling = self
            .users
            .user(user)
            .and_then(|u| u.max_reinforce_price_base_units());
        let open_mines = self.query.list_mines(&MineFilter::open_for(user)).await?;
        let eligible: Vec<&Mine> = open_mines.iter().filter(|m| m.reinforceable).collect();

        if eligible.is_empty() {
            info!(user, "no mines to reinforce");
            return Ok(0);
        }

        let options = SelectOptions {
            strict: self.strict_reinforce,
            max_price: ceiling,
        };

        let mut reinforced = 0;
        for mine in eligible {
            let pool = self.query.list_recruits(mine.game_id).await?;
            let recruit = match self.strategy.select_recruit(&pool, options) {
                Ok(recruit) => recruit,
                Err(StrategyError::PriceTooHigh { price, ceiling }) => {
                    warn!(
                        user,
                        game_id = mine.game_id,
                        price = %format_token_amount(price),
                        ceiling = %format_token_amount(ceiling),
                        "cheapest recruit is over the configured ceiling; skipping"
                    );
                    continue;
                },
                Err(StrategyError::NoRecruitAvailable) => {
                    warn!(
                        user,
                        game_id = mine.game_id,
                        "no recruit available to borrow; skipping"
                    );
                    continue;
                },
                Err(err) => {
                    warn!(
                        user,
                        game_id = mine.game_id,
                        error = %err,
                        "recruit selection failed; skipping"
                    );
                    continue;
                },
            };

            info!(
                user,
                game_id = mine.game_id,
                recruit_id = recruit.recruit_id,
                price = %format_token_amount(recruit.price),
                "borrowing recruit"
            );
            let submission = self
                .tx
                .reinforce_defense(mine.game_id, recruit.recruit_id, recruit.price)
                .await;
            let outcome = settle_submission(
                self.tx.as_ref(),
                self.audit.as_ref(),
                self.alerts.as_ref(),
                "reinforcing",
                mine.game_id,
                submission,
            )
            .await;
            if outcome.is_success() {
                reinforced += 1;
            }
        }
        Ok(reinforced)
    }

    // =========================================================================
    // Read-through
    // =========================================================================

    /// Re-queries `game_id` and reports whether the fresh snapshot is
    /// closed.
    ///
    /// The remote service owns the record; this read-through refreshes
    /// it before judging, and judges the refreshed snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] if the mine is unknown or the query
    /// fails.
    pub async fn fresh_mine_is_closed(&self, game_id: u64) -> Result<bool, ClientError> {
        let mine = self.query.get_mine(game_id).await?;
        Ok(mine.is_closed())
    }
}
