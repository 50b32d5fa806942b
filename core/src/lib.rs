#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Life Defence engine.
//!
//! This crate defines the message surface that connects the session layer,
//! the authoritative world, and the pure systems. The session submits
//! [`Command`] values describing desired mutations, the world executes those
//! commands via its `apply` entry point, and then broadcasts [`Event`] values
//! that systems and adapters react to deterministically. Systems consume
//! immutable views and respond exclusively with new command batches.

use std::fmt;

use serde::{Deserialize, Serialize};

pub mod patterns;

pub use patterns::{Pattern, PatternKind, PatternLibrary};

/// Number of rows on every battlefield.
pub const GRID_ROWS: u32 = 200;

/// Number of columns on every battlefield.
pub const GRID_COLUMNS: u32 = 200;

/// First column that belongs to the player zone. Lower columns form the enemy zone.
pub const PLAYER_ZONE_START_COLUMN: u32 = GRID_COLUMNS / 2;

/// Column an enemy instance must reach to escape.
pub const ESCAPE_COLUMN: u32 = GRID_COLUMNS - 1;

/// Score awarded for every enemy/player collision.
pub const COLLISION_REWARD: i64 = 10;

/// Score deducted for every escaped enemy.
pub const ESCAPE_PENALTY: i64 = 5;

/// Number of escapes that ends the game.
pub const ESCAPE_LIMIT: u32 = 5;

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Requests that an enemy instance of the given pattern be spawned.
    SpawnEnemy {
        /// Enemy pattern to spawn.
        pattern: PatternKind,
        /// Top-left cell of the pattern's bounding box.
        anchor: CellCoord,
    },
    /// Raises the wave counter to the provided value.
    AdvanceWave {
        /// Wave the world should enter. Lower values are ignored.
        wave: u32,
    },
    /// Requests placement of a player pattern by its wire name.
    PlacePattern {
        /// Name supplied by the caller, validated against the pattern library.
        pattern: String,
        /// Row of the anchor cell; may lie outside the grid.
        row: i64,
        /// Column of the anchor cell; may lie outside the grid.
        col: i64,
    },
    /// Applies the evolution rule once and propagates instance ownership.
    Evolve,
    /// Destroys every listed enemy/player pair.
    ResolveCollisions {
        /// Pairs reported by collision detection.
        pairs: Vec<CollisionPair>,
    },
    /// Removes every listed enemy instance as escaped.
    ResolveEscapes {
        /// Enemy instances reported by escape detection.
        enemies: Vec<InstanceId>,
    },
    /// Closes the tick: latches game over when due and advances the generation.
    CompleteTick,
    /// Sets the paused flag.
    SetPaused {
        /// New value for the flag.
        paused: bool,
    },
    /// Sets the advisory polling speed.
    SetSpeed {
        /// New speed.
        speed: Speed,
    },
    /// Reinitialises the world while keeping its difficulty.
    Reset {
        /// Paused flag the world restarts with.
        paused: bool,
        /// Replacement speed, or `None` to keep the current one.
        speed: Option<Speed>,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Confirms that an enemy instance entered the battlefield.
    EnemySpawned {
        /// Identifier assigned to the instance.
        instance: InstanceId,
        /// Pattern the instance was created from.
        pattern: PatternKind,
        /// Anchor cell of the spawn.
        anchor: CellCoord,
    },
    /// Reports a spawn attempt that was skipped because its footprint was invalid.
    SpawnSkipped {
        /// Pattern the spawn would have used.
        pattern: PatternKind,
        /// Anchor cell that was rejected.
        anchor: CellCoord,
    },
    /// Announces that a new wave started.
    WaveAdvanced {
        /// Wave now in effect.
        wave: u32,
    },
    /// Confirms that a player pattern was placed.
    PatternPlaced {
        /// Identifier assigned to the instance.
        instance: InstanceId,
        /// Pattern that was placed.
        pattern: PatternKind,
        /// Anchor cell of the placement.
        anchor: CellCoord,
    },
    /// Reports that a placement request was rejected.
    PlacementRejected {
        /// Name supplied with the request.
        pattern: String,
        /// Requested anchor row.
        row: i64,
        /// Requested anchor column.
        col: i64,
        /// Specific reason the placement failed.
        reason: PlacementError,
    },
    /// Confirms that the grid evolved by one generation.
    GridEvolved {
        /// Number of live cells after evolution.
        population: usize,
    },
    /// Reports that every tracked cell of an instance died out.
    InstanceDissipated {
        /// Identifier of the instance.
        instance: InstanceId,
        /// Side that owned the instance.
        owner: Owner,
    },
    /// Confirms that an enemy and a player instance destroyed each other.
    CollisionResolved {
        /// Enemy half of the pair.
        enemy: InstanceId,
        /// Player half of the pair.
        player: InstanceId,
    },
    /// Confirms that an enemy escaped through the rightmost column.
    EnemyEscaped {
        /// Identifier of the escaped instance.
        enemy: InstanceId,
    },
    /// Announces that the escape limit was reached.
    GameOver {
        /// Generation during which the game ended.
        generation: u64,
    },
    /// Confirms that a full tick completed.
    TickCompleted {
        /// Generation counter after the tick.
        generation: u64,
    },
    /// Confirms a change of the paused flag.
    PausedChanged {
        /// New value of the flag.
        paused: bool,
    },
    /// Confirms a change of the advisory speed.
    SpeedChanged {
        /// New speed.
        speed: Speed,
    },
    /// Confirms that the world was reinitialised.
    WorldReset,
}

/// Enemy/player instance pair whose cell sets intersect.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CollisionPair {
    /// Enemy-owned instance.
    pub enemy: InstanceId,
    /// Player-owned instance.
    pub player: InstanceId,
}

/// Side that owns a pattern instance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Owner {
    /// Spawned by the engine and advancing towards the right edge.
    Enemy,
    /// Placed by the player as a defence.
    Player,
}

/// Half of the battlefield a column belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Zone {
    /// Columns `0..PLAYER_ZONE_START_COLUMN`.
    Enemy,
    /// Columns `PLAYER_ZONE_START_COLUMN..GRID_COLUMNS`.
    Player,
}

impl Zone {
    /// Classifies the provided column.
    #[must_use]
    pub const fn of_column(column: u32) -> Self {
        if column < PLAYER_ZONE_START_COLUMN {
            Self::Enemy
        } else {
            Self::Player
        }
    }

    /// Reports whether the whole rectangle lies inside this zone.
    #[must_use]
    pub const fn contains(self, rect: CellRect) -> bool {
        let first = rect.origin().column();
        let last = first + rect.size().width().saturating_sub(1);
        match self {
            Self::Enemy => last < PLAYER_ZONE_START_COLUMN,
            Self::Player => first >= PLAYER_ZONE_START_COLUMN,
        }
    }
}

/// Unique identifier assigned to a pattern instance within one session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct InstanceId(u32);

impl InstanceId {
    /// Creates a new instance identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Location of a single grid cell expressed as row and column coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    row: u32,
    column: u32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(row: u32, column: u32) -> Self {
        Self { row, column }
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Converts signed coordinates into a cell when both lie on the grid.
    #[must_use]
    pub fn from_signed(row: i64, column: i64) -> Option<Self> {
        let row = u32::try_from(row).ok()?;
        let column = u32::try_from(column).ok()?;
        (row < GRID_ROWS && column < GRID_COLUMNS).then_some(Self { row, column })
    }

    /// Offsets the cell, returning `None` when the result leaves the grid.
    #[must_use]
    pub fn offset(self, row_delta: i32, column_delta: i32) -> Option<Self> {
        let row = self.row.checked_add_signed(row_delta)?;
        let column = self.column.checked_add_signed(column_delta)?;
        (row < GRID_ROWS && column < GRID_COLUMNS).then_some(Self { row, column })
    }

    /// Iterates over the cell and its up to eight in-bounds neighbours.
    pub fn neighbourhood(self) -> impl Iterator<Item = CellCoord> {
        (-1..=1).flat_map(move |row_delta| {
            (-1..=1).filter_map(move |column_delta| self.offset(row_delta, column_delta))
        })
    }
}

/// Axis-aligned rectangle expressed in cell coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellRect {
    origin: CellCoord,
    size: CellRectSize,
}

impl CellRect {
    /// Constructs a rectangle from an origin cell and size.
    #[must_use]
    pub const fn from_origin_and_size(origin: CellCoord, size: CellRectSize) -> Self {
        Self { origin, size }
    }

    /// Builds the rectangle anchored at signed coordinates when it fits on the grid.
    #[must_use]
    pub fn within_grid(row: i64, column: i64, size: CellRectSize) -> Option<Self> {
        let origin = CellCoord::from_signed(row, column)?;
        let last_row = u64::from(origin.row()) + u64::from(size.height());
        let last_column = u64::from(origin.column()) + u64::from(size.width());
        (size.width() > 0
            && size.height() > 0
            && last_row <= u64::from(GRID_ROWS)
            && last_column <= u64::from(GRID_COLUMNS))
        .then_some(Self { origin, size })
    }

    /// Upper-left cell that anchors the rectangle.
    #[must_use]
    pub const fn origin(&self) -> CellCoord {
        self.origin
    }

    /// Dimensions of the rectangle measured in whole cells.
    #[must_use]
    pub const fn size(&self) -> CellRectSize {
        self.size
    }

    /// Iterates over every cell covered by the rectangle in row-major order.
    pub fn cells(self) -> impl Iterator<Item = CellCoord> {
        let origin = self.origin;
        let size = self.size;
        (0..size.height()).flat_map(move |row| {
            (0..size.width())
                .map(move |column| CellCoord::new(origin.row() + row, origin.column() + column))
        })
    }
}

/// Size of a [`CellRect`] measured in whole cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellRectSize {
    width: u32,
    height: u32,
}

impl CellRectSize {
    /// Creates a new size descriptor with explicit dimensions.
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Width of the rectangle in cells.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Height of the rectangle in cells.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }
}

/// Advisory polling speed. The engine stores it but never acts on it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Speed {
    /// Clients poll every 500 ms.
    Slow,
    /// Clients poll every 200 ms.
    #[default]
    Normal,
    /// Clients poll every 100 ms.
    Fast,
}

/// Difficulty chosen when a game is created. Controls the spawn cadence.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    /// Sparse enemy waves.
    Easy,
    /// Default cadence.
    #[default]
    Normal,
    /// Dense enemy waves.
    Hard,
}

/// Reasons a placement request may be rejected by the world.
///
/// Variants are listed in the order validation checks them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, thiserror::Error)]
pub enum PlacementError {
    /// The game-over latch is set.
    #[error("game is over")]
    GameOver,
    /// The name does not match a player-placeable pattern.
    #[error("unknown pattern")]
    UnknownPattern,
    /// The pattern's bounding box extends beyond the grid.
    #[error("pattern does not fit inside the grid")]
    OutOfBounds,
    /// The pattern's bounding box reaches into the enemy zone.
    #[error("patterns may only be placed in the player zone")]
    WrongZone,
    /// The pattern's bounding box covers a live cell.
    #[error("pattern overlaps live cells")]
    Overlap,
}

/// Reasons a step request may be turned away without touching the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StepRejection {
    /// The session is paused.
    Paused,
    /// The game-over latch is set.
    GameOver,
}

impl fmt::Display for StepRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Paused => f.write_str("game is paused"),
            Self::GameOver => f.write_str("game is over"),
        }
    }
}

/// Cumulative counters maintained alongside the score.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GameStats {
    /// Number of enemy/player collisions resolved.
    pub patterns_destroyed: u32,
    /// Number of enemies that reached the escape column.
    pub enemies_escaped: u32,
}

/// Immutable representation of a single instance used for queries.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InstanceSnapshot {
    /// Identifier allocated by the world.
    pub id: InstanceId,
    /// Pattern the instance originated from.
    pub pattern: PatternKind,
    /// Side owning the instance.
    pub owner: Owner,
    /// Live cells currently attributed to the instance, sorted.
    pub cells: Vec<CellCoord>,
}

impl InstanceSnapshot {
    /// Reports whether any attributed cell lies in the given column.
    #[must_use]
    pub fn touches_column(&self, column: u32) -> bool {
        self.cells.iter().any(|cell| cell.column() == column)
    }
}

/// Read-only snapshot describing all live instances.
#[derive(Clone, Debug, Default)]
pub struct InstanceView {
    snapshots: Vec<InstanceSnapshot>,
}

impl InstanceView {
    /// Creates a new instance view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<InstanceSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured snapshots in ascending identifier order.
    pub fn iter(&self) -> impl Iterator<Item = &InstanceSnapshot> {
        self.snapshots.iter()
    }

    /// Iterator over the snapshots owned by the given side.
    pub fn owned_by(&self, owner: Owner) -> impl Iterator<Item = &InstanceSnapshot> {
        self.snapshots
            .iter()
            .filter(move |snapshot| snapshot.owner == owner)
    }

    /// Looks up a snapshot by identifier.
    #[must_use]
    pub fn get(&self, id: InstanceId) -> Option<&InstanceSnapshot> {
        self.snapshots
            .binary_search_by_key(&id, |snapshot| snapshot.id)
            .ok()
            .map(|index| &self.snapshots[index])
    }

    /// Number of captured snapshots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether the view is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::{
        CellCoord, CellRect, CellRectSize, Difficulty, PlacementError, Speed, Zone,
        ESCAPE_COLUMN, PLAYER_ZONE_START_COLUMN,
    };
    use serde::{de::DeserializeOwned, Serialize};

    fn assert_round_trip<T>(value: &T)
    where
        T: Serialize + DeserializeOwned + PartialEq + std::fmt::Debug,
    {
        let bytes = bincode::serialize(value).expect("serialize");
        let restored: T = bincode::deserialize(&bytes).expect("deserialize");
        assert_eq!(&restored, value);
    }

    #[test]
    fn placement_error_round_trips_through_bincode() {
        assert_round_trip(&PlacementError::Overlap);
    }

    #[test]
    fn speed_and_difficulty_use_lowercase_wire_names() {
        assert_eq!(serde_json::to_string(&Speed::Fast).expect("json"), "\"fast\"");
        let parsed: Difficulty = serde_json::from_str("\"hard\"").expect("json");
        assert_eq!(parsed, Difficulty::Hard);
        assert!(serde_json::from_str::<Speed>("\"warp\"").is_err());
    }

    #[test]
    fn zones_split_the_grid_in_half() {
        assert_eq!(Zone::of_column(0), Zone::Enemy);
        assert_eq!(Zone::of_column(PLAYER_ZONE_START_COLUMN - 1), Zone::Enemy);
        assert_eq!(Zone::of_column(PLAYER_ZONE_START_COLUMN), Zone::Player);
        assert_eq!(Zone::of_column(ESCAPE_COLUMN), Zone::Player);
    }

    #[test]
    fn straddling_rect_belongs_to_neither_zone() {
        let rect = CellRect::from_origin_and_size(
            CellCoord::new(10, PLAYER_ZONE_START_COLUMN - 1),
            CellRectSize::new(3, 3),
        );
        assert!(!Zone::Enemy.contains(rect));
        assert!(!Zone::Player.contains(rect));
    }

    #[test]
    fn within_grid_rejects_boxes_crossing_the_edge() {
        let size = CellRectSize::new(3, 3);
        assert!(CellRect::within_grid(197, 197, size).is_some());
        assert!(CellRect::within_grid(197, 198, size).is_none());
        assert!(CellRect::within_grid(-1, 150, size).is_none());
    }

    #[test]
    fn neighbourhood_is_clipped_at_corners() {
        assert_eq!(CellCoord::new(0, 0).neighbourhood().count(), 4);
        assert_eq!(CellCoord::new(5, 5).neighbourhood().count(), 9);
        assert_eq!(CellCoord::new(199, 100).neighbourhood().count(), 6);
    }

    #[test]
    fn rect_cells_are_row_major() {
        let rect = CellRect::from_origin_and_size(CellCoord::new(4, 7), CellRectSize::new(2, 2));
        let cells: Vec<_> = rect.cells().collect();
        assert_eq!(
            cells,
            vec![
                CellCoord::new(4, 7),
                CellCoord::new(4, 8),
                CellCoord::new(5, 7),
                CellCoord::new(5, 8),
            ]
        );
    }
}
