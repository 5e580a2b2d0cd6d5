use serde::{Deserialize, Serialize};
use thiserror::Error;

// ── Constants ──────────────────────────────────────────────────────────

pub const DEFAULT_STARTING_ROUND: u32 = 1;

// ── Core domain types ──────────────────────────────────────────────────

/// Seed-ordered player identifier: seed 1 is the top seed. Count-based
/// generation synthesizes ids 1..=N; the generic entry points map these back
/// to caller-supplied players at the end.
pub type PlayerId = u32;

/// Value address of a match slot. Pointers in the layout are plain
/// `{round, match}` pairs resolved through a lookup, never object references.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchRef {
    pub round: u32,
    #[serde(rename = "match")]
    pub number: u32,
}

impl MatchRef {
    pub fn new(round: u32, number: u32) -> Self {
        MatchRef { round, number }
    }
}

/// One slot in the generated layout.
///
/// `player1`/`player2` are `None` when the slot is filled later by an
/// advancing winner, or when a bye vacated it. `win` is the destination of
/// this match's winner and is present on every match except the terminal
/// decider slot. `loss` is present only on winners-bracket matches and bye
/// matches; losing anywhere in the losers bracket is elimination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchSlot<P = PlayerId> {
    pub round: u32,
    #[serde(rename = "match")]
    pub number: u32,
    pub player1: Option<P>,
    pub player2: Option<P>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub win: Option<MatchRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loss: Option<MatchRef>,
}

impl<P> MatchSlot<P> {
    pub fn empty(round: u32, number: u32) -> Self {
        MatchSlot {
            round,
            number,
            player1: None,
            player2: None,
            win: None,
            loss: None,
        }
    }
}

// ── Options ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BracketOptions {
    /// Round number assigned to the first generated round.
    pub starting_round: u32,
}

impl Default for BracketOptions {
    fn default() -> Self {
        BracketOptions {
            starting_round: DEFAULT_STARTING_ROUND,
        }
    }
}

// ── Errors ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BracketError {
    #[error("bracket needs at least one player, got {0}")]
    InvalidPlayerCount(u32),
    #[error("starting round must be at least 1, got {0}")]
    InvalidStartingRound(u32),
}
