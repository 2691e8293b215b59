//! Teams, objective sides and the roster factory.

use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};

use crate::agent::{Agent, Appearance, IdGen};
use crate::config::Tuning;
use crate::geometry::WorldBounds;
use crate::math::Vec2;
use crate::rng::{self, SimRng};
use crate::role::Role;

/// Team membership.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TeamColor {
    /// Spawns on the left.
    Red,
    /// Spawns on the right.
    Blue,
}

impl TeamColor {
    /// Both teams, red first.
    pub const BOTH: [Self; 2] = [Self::Red, Self::Blue];

    /// The opposing team.
    #[must_use]
    pub const fn opponent(self) -> Self {
        match self {
            Self::Red => Self::Blue,
            Self::Blue => Self::Red,
        }
    }

    /// Lowercase label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Red => "red",
            Self::Blue => "blue",
        }
    }
}

impl std::fmt::Display for TeamColor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Objective-mode side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    /// Carries and plants the bomb ("T").
    Attacker,
    /// Holds the bomb site ("CT").
    Defender,
}

impl Side {
    /// Conventional short tag.
    #[must_use]
    pub const fn tag(self) -> &'static str {
        match self {
            Self::Attacker => "T",
            Self::Defender => "CT",
        }
    }
}

/// Horizontal range agents of one team spawn in.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpawnBand {
    /// Left edge.
    pub x_min: f32,
    /// Right edge.
    pub x_max: f32,
}

impl SpawnBand {
    /// Margin kept between spawns and the world edge.
    pub const EDGE_MARGIN: f32 = 50.0;

    /// The default band for a team: the outer quarter of the world on its side.
    #[must_use]
    pub fn for_team(team: TeamColor, bounds: &WorldBounds) -> Self {
        match team {
            TeamColor::Red => Self {
                x_min: Self::EDGE_MARGIN,
                x_max: bounds.width * 0.25,
            },
            TeamColor::Blue => Self {
                x_min: bounds.width * 0.75,
                x_max: bounds.width - Self::EDGE_MARGIN,
            },
        }
    }

    /// Random point in the band, vertically inside the edge margin.
    pub fn sample(&self, bounds: &WorldBounds, rng: &mut SimRng) -> Vec2 {
        let x = rng::uniform(rng, self.x_min, self.x_max);
        let y = rng::uniform(
            rng,
            Self::EDGE_MARGIN,
            bounds.height - Self::EDGE_MARGIN,
        );
        Vec2::new(x, y)
    }
}

const CALL_SIGNS: [&str; 24] = [
    "Ash", "Bishop", "Cobalt", "Dagger", "Echo", "Flint", "Gunner", "Hawk", "Ivy", "Jackal",
    "Kestrel", "Lynx", "Mako", "Nomad", "Onyx", "Pike", "Quill", "Raven", "Slate", "Tango",
    "Umber", "Viper", "Wren", "Zulu",
];

/// Cosmetic names handed to freshly spawned agents.
#[derive(Debug, Clone, Default)]
pub struct NamePool {
    issued: u32,
}

impl NamePool {
    /// Draw a name. Names repeat eventually; a numeric suffix keeps them distinct.
    pub fn draw(&mut self, rng: &mut SimRng) -> String {
        self.issued += 1;
        let base = CALL_SIGNS.choose(rng).copied().unwrap_or("Grunt");
        format!("{base}-{}", self.issued)
    }
}

/// Parameters for spawning one team's roster.
#[derive(Debug, Clone)]
pub struct TeamSpec<'a> {
    /// Where agents appear.
    pub band: SpawnBand,
    /// Team color.
    pub team: TeamColor,
    /// Roster size.
    pub size: usize,
    /// Objective side, if any.
    pub side: Option<Side>,
    /// Presentation handles copied onto every agent.
    pub appearance: Option<&'a Appearance>,
    /// Roles drawn uniformly at random.
    pub roles: &'a [Role],
}

/// Shared state the roster factory draws from.
pub struct SpawnContext<'a> {
    /// World the agents are placed in.
    pub bounds: WorldBounds,
    /// Gameplay constants.
    pub tuning: &'a Tuning,
    /// Random source.
    pub rng: &'a mut SimRng,
    /// Id allocator.
    pub ids: &'a mut IdGen,
    /// Name source.
    pub names: &'a mut NamePool,
}

/// Create a roster of fresh agents for `spec`.
pub fn spawn_team(spec: &TeamSpec<'_>, ctx: &mut SpawnContext<'_>) -> Vec<Agent> {
    (0..spec.size)
        .map(|_| {
            let role = spec.roles.choose(ctx.rng).copied().unwrap_or(Role::Rifle);
            let position = spec.band.sample(&ctx.bounds, ctx.rng);
            let mut agent = Agent::new(ctx.ids.next_id(), spec.team, role, position, ctx.tuning)
                .with_name(ctx.names.draw(ctx.rng))
                .with_side(spec.side);
            if let Some(appearance) = spec.appearance {
                agent.appearance = appearance.clone();
            }
            agent.clamp_to(&ctx.bounds);
            agent
        })
        .collect()
}
