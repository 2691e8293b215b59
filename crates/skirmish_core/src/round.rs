//! Round and series state machine.
//!
//! ```text
//! Active --(roster empty / bomb planted)--> RoundOver{delay}
//! RoundOver --(delay elapsed, no majority)--> Active   (respawn)
//! RoundOver --(delay elapsed, majority)-----> MatchOver (terminal)
//! ```

use serde::{Deserialize, Serialize};

use crate::config::Tuning;
use crate::math::FrameScale;
use crate::team::TeamColor;

/// Rounds won per team.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Score {
    /// Red rounds.
    pub red: u32,
    /// Blue rounds.
    pub blue: u32,
}

impl Score {
    /// Rounds won by `team`.
    #[must_use]
    pub const fn of(&self, team: TeamColor) -> u32 {
        match team {
            TeamColor::Red => self.red,
            TeamColor::Blue => self.blue,
        }
    }

    /// Credit a round to `team`.
    pub fn credit(&mut self, team: TeamColor) {
        match team {
            TeamColor::Red => self.red += 1,
            TeamColor::Blue => self.blue += 1,
        }
    }

    /// Rounds played so far.
    #[must_use]
    pub const fn total(&self) -> u32 {
        self.red + self.blue
    }

    /// Team that has reached `needed` wins, if any.
    #[must_use]
    pub fn leader_at(&self, needed: u32) -> Option<TeamColor> {
        if self.red >= needed {
            Some(TeamColor::Red)
        } else if self.blue >= needed {
            Some(TeamColor::Blue)
        } else {
            None
        }
    }
}

impl std::fmt::Display for Score {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.red, self.blue)
    }
}

/// Why a round ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RoundEndReason {
    /// A roster was wiped out.
    Elimination,
    /// The bomb was planted.
    ObjectivePlanted,
}

/// Current phase of the series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum RoundPhase {
    /// Agents are fighting.
    Active,
    /// A round has been decided; waiting before the next one.
    RoundOver {
        /// Team credited with the round.
        winner: TeamColor,
        /// Ticks until the transition.
        remaining: f32,
    },
    /// The series is decided. Terminal.
    MatchOver {
        /// Series winner.
        winner: TeamColor,
    },
}

/// Result of [`RoundState::evaluate`] the driver must act on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundTransition {
    /// Nothing changed.
    None,
    /// The round was just decided and a team credited.
    RoundEnded {
        /// Team credited.
        winner: TeamColor,
        /// Why.
        reason: RoundEndReason,
    },
    /// The inter-round delay elapsed; rosters must be regenerated.
    Respawn,
    /// The series was just decided.
    MatchEnded {
        /// Series winner.
        winner: TeamColor,
    },
}

/// Round bookkeeping for a best-of-N series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundState {
    /// Current phase.
    pub phase: RoundPhase,
    /// Rounds won.
    pub score: Score,
    /// One-based index of the current round.
    pub round: u32,
    /// Wins needed to take the series.
    pub rounds_to_win: u32,
}

impl RoundState {
    /// Start a series needing `rounds_to_win` rounds.
    #[must_use]
    pub const fn new(rounds_to_win: u32) -> Self {
        Self {
            phase: RoundPhase::Active,
            score: Score { red: 0, blue: 0 },
            round: 1,
            rounds_to_win,
        }
    }

    /// Whether agents should be simulated.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        matches!(self.phase, RoundPhase::Active)
    }

    /// Whether the series is decided.
    #[must_use]
    pub const fn is_match_over(&self) -> bool {
        matches!(self.phase, RoundPhase::MatchOver { .. })
    }

    /// Series winner, once decided.
    #[must_use]
    pub const fn match_winner(&self) -> Option<TeamColor> {
        match self.phase {
            RoundPhase::MatchOver { winner } => Some(winner),
            _ => None,
        }
    }

    /// Advance the state machine given the living roster sizes.
    ///
    /// A plant takes precedence over elimination. When both rosters are
    /// empty at once, red is credited.
    pub fn evaluate(
        &mut self,
        red_alive: usize,
        blue_alive: usize,
        planted_by: Option<TeamColor>,
        frame_scale: FrameScale,
        tuning: &Tuning,
    ) -> RoundTransition {
        match self.phase {
            RoundPhase::Active => {
                let decided = if let Some(team) = planted_by {
                    Some((team, RoundEndReason::ObjectivePlanted, tuning.plant_delay))
                } else if blue_alive == 0 {
                    Some((TeamColor::Red, RoundEndReason::Elimination, tuning.round_over_delay))
                } else if red_alive == 0 {
                    Some((TeamColor::Blue, RoundEndReason::Elimination, tuning.round_over_delay))
                } else {
                    None
                };
                let Some((winner, reason, delay)) = decided else {
                    return RoundTransition::None;
                };
                self.score.credit(winner);
                self.phase = RoundPhase::RoundOver {
                    winner,
                    remaining: delay,
                };
                tracing::info!(
                    round = self.round,
                    winner = %winner,
                    reason = ?reason,
                    score = %self.score,
                    "Round decided"
                );
                RoundTransition::RoundEnded { winner, reason }
            }
            RoundPhase::RoundOver { winner, remaining } => {
                let remaining = remaining - frame_scale.get();
                if remaining > 0.0 {
                    self.phase = RoundPhase::RoundOver { winner, remaining };
                    return RoundTransition::None;
                }
                if let Some(champion) = self.score.leader_at(self.rounds_to_win) {
                    self.phase = RoundPhase::MatchOver { winner: champion };
                    tracing::info!(winner = %champion, score = %self.score, "Match decided");
                    return RoundTransition::MatchEnded { winner: champion };
                }
                self.round += 1;
                self.phase = RoundPhase::Active;
                RoundTransition::Respawn
            }
            RoundPhase::MatchOver { .. } => RoundTransition::None,
        }
    }
}
