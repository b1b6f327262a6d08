//! Victory conditions and end-of-episode bookkeeping (spec §4.11).

use crate::types::constants::{MAP_ROOM_OBJECTS_TEAMS, VICTORY_HOLD_INTERVAL};
use crate::types::TeamId;

/// Which condition ends the episode (spec §4.11, §9 open question: the
/// config names exactly one active condition per episode rather than an
/// always-on combination, since the source gates them behind a single
/// scenario switch).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum VictoryCondition {
    /// No mid-episode victory; the episode only ends by `maxSteps`.
    None,
    /// Last team with a living King wins.
    Regicide,
    /// First team to finish constructing a Wonder and hold it unconquered for
    /// [`VICTORY_HOLD_INTERVAL`] ticks wins.
    Wonder,
    /// First team to accumulate and hold all spawned relics for
    /// [`VICTORY_HOLD_INTERVAL`] ticks wins.
    Relic,
    /// First team to hold the map's marked hill cells continuously for
    /// [`VICTORY_HOLD_INTERVAL`] ticks wins.
    Hill,
    /// Tie-broken only at `maxSteps`, by flood-fill territory ownership
    /// (spec §4.11 "Territory").
    Territory,
}

impl Default for VictoryCondition {
    fn default() -> Self {
        Self::None
    }
}

/// Per-team running tick count toward a hold-based victory, plus which teams
/// have ever registered a King agent (spec §4.11 "Regicide": a unique
/// surviving king only wins once >=2 teams have registered one).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VictoryStates {
    pub hold_ticks: [u64; MAP_ROOM_OBJECTS_TEAMS],
    pub king_registered: [bool; MAP_ROOM_OBJECTS_TEAMS],
}

impl VictoryStates {
    /// Marks `team` as having fielded a King agent at least once this
    /// episode. Idempotent; never un-registers (spec §4.11).
    pub fn register_king(&mut self, team: TeamId) {
        if let Some(slot) = self.king_registered.get_mut(team.0 as usize % MAP_ROOM_OBJECTS_TEAMS) {
            *slot = true;
        }
    }

    pub fn registered_king_count(&self) -> usize {
        self.king_registered.iter().filter(|&&r| r).count()
    }

    /// Advances `team`'s hold streak, resetting every other team's (spec
    /// §4.11: holding is exclusive — a contested objective advances no one).
    pub fn advance_hold(&mut self, team: TeamId) -> bool {
        for (i, ticks) in self.hold_ticks.iter_mut().enumerate() {
            if i == team.0 as usize {
                *ticks += 1;
            } else {
                *ticks = 0;
            }
        }
        self.hold_ticks[team.0 as usize % MAP_ROOM_OBJECTS_TEAMS] >= VICTORY_HOLD_INTERVAL
    }

    /// No team currently holds the objective: every streak resets.
    pub fn reset_all(&mut self) {
        self.hold_ticks = [0; MAP_ROOM_OBJECTS_TEAMS];
    }
}
