//! Game records and time predicates.
//!
//! Every record here is a read-only snapshot of remote game-state
//! service responses. The remote service owns the records; this layer
//! never mutates one beyond re-querying for a fresh snapshot. A mine's
//! lifecycle is `open(unfinished) -> open(finished) -> closed`, with an
//! orthogonal `reinforceable` axis gated by in-game defense state. The
//! `unfinished -> finished` transition is purely a function of elapsed
//! time and is judged locally by the predicates below.

use serde::{Deserialize, Serialize};

/// Number of base currency units in one whole token (18 decimals).
pub const BASE_UNITS_PER_TOKEN: u128 = 1_000_000_000_000_000_000;

/// Lifecycle status of a mine as reported by the query service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MineStatus {
    /// The round is running or resolvable; the reward is unclaimed.
    Open,
    /// The reward has been claimed.
    Closed,
}

/// One round of the game committed by a team.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mine {
    /// Opaque identifier assigned by the remote service.
    pub game_id: u64,
    /// Unix timestamp the round was opened.
    pub start_time: i64,
    /// Unix timestamp after which the round is resolvable.
    pub end_time: i64,
    /// Reported lifecycle status.
    pub status: MineStatus,
    /// Chain address of the owning user.
    pub owner: String,
    /// Whether the defending team can still accept a reinforcement.
    ///
    /// Computed by the remote service from in-game defense state; this
    /// layer only reads it.
    #[serde(default)]
    pub reinforceable: bool,
}

impl Mine {
    /// Seconds until `end_time`; negative once the round is due.
    #[must_use]
    pub const fn remaining_time(&self, now: i64) -> i64 {
        self.end_time.saturating_sub(now)
    }

    /// A mine is finished once its end time is due.
    #[must_use]
    pub const fn is_finished(&self, now: i64) -> bool {
        self.remaining_time(now) <= 0
    }

    /// Whether this snapshot reports the reward as claimed.
    ///
    /// Judges only the snapshot at hand; callers that need a current
    /// answer must re-query the service first.
    #[must_use]
    pub const fn is_closed(&self) -> bool {
        matches!(self.status, MineStatus::Closed)
    }

    /// Remaining time rendered as hours, minutes and seconds.
    #[must_use]
    pub fn remaining_time_formatted(&self, now: i64) -> String {
        pretty_seconds(self.remaining_time(now))
    }
}

/// A group of participants owned by a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    /// Opaque identifier assigned by the remote service.
    pub team_id: u64,
    /// Chain address of the owning user.
    pub owner: String,
    /// Whether the team is free to be dispatched into a new mine.
    #[serde(default)]
    pub available: bool,
}

/// A lendable participant offered for reinforcement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recruit {
    /// Opaque identifier assigned by the remote service.
    pub recruit_id: u64,
    /// Borrowing price in base currency units.
    pub price: u128,
    /// Capability metric used by the highest-power policy.
    pub mining_power: u32,
}

/// Among `mines` not yet finished, the one with the earliest end time.
///
/// Returns `None` when the slice is empty or every mine is finished.
/// Ties keep the earlier-listed mine.
#[must_use]
pub fn next_to_finish<'a>(mines: &'a [Mine], now: i64) -> Option<&'a Mine> {
    // Explicit first-wins scan: `Iterator::min_by_key` keeps the *last*
    // minimum on ties, which would break the stable tie-break contract.
    let mut next: Option<&Mine> = None;
    for mine in mines {
        if mine.is_finished(now) {
            continue;
        }
        match next {
            Some(best) if best.end_time <= mine.end_time => {},
            _ => next = Some(mine),
        }
    }
    next
}

/// Renders a second count as hours, minutes and seconds.
///
/// Negative counts render as `0s`.
#[must_use]
pub fn pretty_seconds(seconds: i64) -> String {
    let total = seconds.max(0);
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let secs = total % 60;
    if hours > 0 {
        format!("{hours}h {minutes:02}m {secs:02}s")
    } else if minutes > 0 {
        format!("{minutes}m {secs:02}s")
    } else {
        format!("{secs}s")
    }
}

/// Renders an amount of base units as whole tokens for log output.
#[must_use]
pub fn format_token_amount(base_units: u128) -> String {
    let whole = base_units / BASE_UNITS_PER_TOKEN;
    let frac = base_units % BASE_UNITS_PER_TOKEN;
    if frac == 0 {
        return whole.to_string();
    }
    let frac = format!("{frac:018}");
    format!("{whole}.{}", frac.trim_end_matches('0'))
}
