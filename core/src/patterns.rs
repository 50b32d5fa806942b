//! Static catalogue of the named cell patterns used on the battlefield.

use serde::{Deserialize, Serialize};

use crate::{CellCoord, CellRect, CellRectSize, Owner};

/// Identifies every pattern known to the engine.
///
/// Wire names are kebab-case. Only the first four variants may be placed by
/// players; the remaining ones are spawned exclusively by the engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PatternKind {
    /// Glider travelling one cell down and one cell right every four generations.
    Glider,
    /// Period-2 oscillator, horizontal in its initial phase.
    Blinker,
    /// Period-2 oscillator.
    Toad,
    /// Period-2 oscillator made of two diagonal blocks.
    Beacon,
    /// Enemy glider heading down and right.
    EnemyGliderSe,
    /// Enemy glider heading up and right.
    EnemyGliderNe,
    /// Lightweight spaceship travelling right two cells every four generations.
    LightweightSpaceship,
    /// Middleweight spaceship travelling right two cells every four generations.
    MiddleweightSpaceship,
}

impl PatternKind {
    /// Patterns accepted in placement requests.
    pub const PLAYER: [PatternKind; 4] = [Self::Glider, Self::Blinker, Self::Toad, Self::Beacon];

    /// Patterns the spawn scheduler may choose from.
    pub const ENEMY: [PatternKind; 4] = [
        Self::EnemyGliderSe,
        Self::EnemyGliderNe,
        Self::LightweightSpaceship,
        Self::MiddleweightSpaceship,
    ];

    /// Wire name of the pattern.
    #[must_use]
    pub fn name(self) -> &'static str {
        self.pattern().name
    }

    /// Side allowed to introduce the pattern.
    #[must_use]
    pub const fn owner(self) -> Owner {
        match self {
            Self::Glider | Self::Blinker | Self::Toad | Self::Beacon => Owner::Player,
            Self::EnemyGliderSe
            | Self::EnemyGliderNe
            | Self::LightweightSpaceship
            | Self::MiddleweightSpaceship => Owner::Enemy,
        }
    }

    /// Template backing the pattern.
    #[must_use]
    pub fn pattern(self) -> &'static Pattern {
        match self {
            Self::Glider => &GLIDER,
            Self::Blinker => &BLINKER,
            Self::Toad => &TOAD,
            Self::Beacon => &BEACON,
            Self::EnemyGliderSe => &ENEMY_GLIDER_SE,
            Self::EnemyGliderNe => &ENEMY_GLIDER_NE,
            Self::LightweightSpaceship => &LIGHTWEIGHT_SPACESHIP,
            Self::MiddleweightSpaceship => &MIDDLEWEIGHT_SPACESHIP,
        }
    }

    /// Resolves a player-placeable pattern from its wire name.
    ///
    /// Enemy-only names resolve to `None` so that they are indistinguishable
    /// from unknown names at the placement boundary.
    #[must_use]
    pub fn from_player_name(name: &str) -> Option<Self> {
        Self::PLAYER.into_iter().find(|kind| kind.name() == name)
    }
}

/// Immutable named template of live cells relative to an anchor.
#[derive(Debug, PartialEq, Eq)]
pub struct Pattern {
    name: &'static str,
    cells: &'static [(u32, u32)],
    width: u32,
    height: u32,
}

impl Pattern {
    /// Wire name of the pattern.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Live cells as `(row, column)` offsets from the anchor, in row-major order.
    #[must_use]
    pub const fn offsets(&self) -> &'static [(u32, u32)] {
        self.cells
    }

    /// Size of the pattern's bounding box.
    #[must_use]
    pub const fn size(&self) -> CellRectSize {
        CellRectSize::new(self.width, self.height)
    }

    /// Bounding box of the pattern when anchored at the provided cell.
    #[must_use]
    pub const fn footprint(&self, anchor: CellCoord) -> CellRect {
        CellRect::from_origin_and_size(anchor, self.size())
    }

    /// Absolute live cells of the pattern anchored at the provided cell.
    ///
    /// Callers must ensure the footprint fits on the grid.
    pub fn cells_at(&self, anchor: CellCoord) -> impl Iterator<Item = CellCoord> + '_ {
        self.cells
            .iter()
            .map(move |&(row, column)| CellCoord::new(anchor.row() + row, anchor.column() + column))
    }
}

/// Lookup facade over the static pattern catalogue.
#[derive(Clone, Copy, Debug, Default)]
pub struct PatternLibrary;

impl PatternLibrary {
    /// Looks up a player-placeable pattern by wire name.
    #[must_use]
    pub fn player(name: &str) -> Option<&'static Pattern> {
        PatternKind::from_player_name(name).map(PatternKind::pattern)
    }

    /// Iterates over every pattern in the catalogue.
    pub fn iter() -> impl Iterator<Item = (PatternKind, &'static Pattern)> {
        PatternKind::PLAYER
            .into_iter()
            .chain(PatternKind::ENEMY)
            .map(|kind| (kind, kind.pattern()))
    }
}

const GLIDER_CELLS: [(u32, u32); 5] = [(0, 1), (1, 2), (2, 0), (2, 1), (2, 2)];

static GLIDER: Pattern = Pattern {
    name: "glider",
    cells: &GLIDER_CELLS,
    width: 3,
    height: 3,
};

static BLINKER: Pattern = Pattern {
    name: "blinker",
    cells: &[(0, 0), (0, 1), (0, 2)],
    width: 3,
    height: 1,
};

static TOAD: Pattern = Pattern {
    name: "toad",
    cells: &[(0, 1), (0, 2), (0, 3), (1, 0), (1, 1), (1, 2)],
    width: 4,
    height: 2,
};

static BEACON: Pattern = Pattern {
    name: "beacon",
    cells: &[
        (0, 0),
        (0, 1),
        (1, 0),
        (1, 1),
        (2, 2),
        (2, 3),
        (3, 2),
        (3, 3),
    ],
    width: 4,
    height: 4,
};

static ENEMY_GLIDER_SE: Pattern = Pattern {
    name: "enemy-glider-se",
    cells: &GLIDER_CELLS,
    width: 3,
    height: 3,
};

static ENEMY_GLIDER_NE: Pattern = Pattern {
    name: "enemy-glider-ne",
    cells: &[(0, 0), (0, 1), (0, 2), (1, 2), (2, 1)],
    width: 3,
    height: 3,
};

static LIGHTWEIGHT_SPACESHIP: Pattern = Pattern {
    name: "lightweight-spaceship",
    cells: &[
        (0, 0),
        (0, 3),
        (1, 4),
        (2, 0),
        (2, 4),
        (3, 1),
        (3, 2),
        (3, 3),
        (3, 4),
    ],
    width: 5,
    height: 4,
};

static MIDDLEWEIGHT_SPACESHIP: Pattern = Pattern {
    name: "middleweight-spaceship",
    cells: &[
        (0, 2),
        (1, 0),
        (1, 4),
        (2, 5),
        (3, 0),
        (3, 5),
        (4, 1),
        (4, 2),
        (4, 3),
        (4, 4),
        (4, 5),
    ],
    width: 6,
    height: 5,
};
