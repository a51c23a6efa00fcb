#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Collie Defence simulation.
//!
//! This crate defines the vocabulary that connects the authoritative world,
//! the pure systems, and the adapters that drive frames. Entities are
//! addressed through generation-checked handles so that a stale reference to
//! a destroyed enemy is detected instead of dereferenced. Every tick appends
//! [`Event`] values to a caller-owned buffer which presentation layers drain
//! between frames.

use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Simulation time measured in whole frames since a level became active.
pub type Tick = u64;

/// Amount of simulated time advanced by a single frame.
pub const TICK_DT: f32 = 1.0;

/// Side length of the square footprint occupied by every tower.
pub const TOWER_FOOTPRINT: f32 = 16.0;

slotmap::new_key_type! {
    /// Generation-checked handle to an enemy owned by a level.
    pub struct EnemyId;
    /// Generation-checked handle to a tower owned by a level.
    pub struct TowerId;
    /// Generation-checked handle to a bullet owned by a level.
    pub struct BulletId;
}

/// Classification of a single grid cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GridTileType {
    /// Neither walkable nor buildable. Everything outside the grid is blocked.
    Blocked,
    /// Part of an enemy route.
    Path,
    /// Open ground that accepts towers.
    Buildable,
}

impl GridTileType {
    /// Decodes the compact tile code used by level data.
    ///
    /// `0` is blocked, `1` is path and `2` is buildable.
    #[must_use]
    pub const fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Self::Blocked),
            1 => Some(Self::Path),
            2 => Some(Self::Buildable),
            _ => None,
        }
    }

    /// Encodes the tile into the compact level-data representation.
    #[must_use]
    pub const fn code(self) -> u8 {
        match self {
            Self::Blocked => 0,
            Self::Path => 1,
            Self::Buildable => 2,
        }
    }
}

/// Axis-aligned rectangle in world units. `min` is inclusive, `max` exclusive.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rect {
    min: Vec2,
    max: Vec2,
}

impl Rect {
    /// Creates a rectangle from its two corners.
    #[must_use]
    pub fn from_corners(a: Vec2, b: Vec2) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    /// Creates a rectangle centred on `center`.
    #[must_use]
    pub fn from_center_size(center: Vec2, size: Vec2) -> Self {
        let half = size * 0.5;
        Self {
            min: center - half,
            max: center + half,
        }
    }

    /// Upper-left corner.
    #[must_use]
    pub const fn min(&self) -> Vec2 {
        self.min
    }

    /// Lower-right corner.
    #[must_use]
    pub const fn max(&self) -> Vec2 {
        self.max
    }

    /// Reports whether the two rectangles share interior area.
    ///
    /// Rectangles that merely touch along an edge do not overlap.
    #[must_use]
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.min.x < other.max.x
            && other.min.x < self.max.x
            && self.min.y < other.max.y
            && other.min.y < self.max.y
    }

}

/// Types of towers that can be constructed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TowerKind {
    /// Fires a single bullet at the captured position of the nearest enemy.
    Basic,
    /// Bullet bursts on impact and damages every enemy inside its blast radius.
    Area,
    /// Bullet re-tracks its live target every tick ("sticky").
    Homing,
}

impl TowerKind {
    /// Every tower kind in the order the shop lists them.
    pub const ALL: [TowerKind; 3] = [TowerKind::Basic, TowerKind::Area, TowerKind::Homing];

    /// Stat table entry for this tower kind.
    #[must_use]
    pub const fn stats(self) -> TowerStats {
        match self {
            Self::Basic => TowerStats {
                range: 32.0,
                damage: 2,
                fire_interval: 30,
                cost: 80,
                bullet_delta: 0.1,
                blast_radius: 0.0,
            },
            Self::Area => TowerStats {
                range: 40.0,
                damage: 1,
                fire_interval: 45,
                cost: 120,
                bullet_delta: 0.05,
                blast_radius: 16.0,
            },
            Self::Homing => TowerStats {
                range: 48.0,
                damage: 2,
                fire_interval: 40,
                cost: 100,
                bullet_delta: 0.08,
                blast_radius: 0.0,
            },
        }
    }

    /// Whether bullets fired by this kind follow a live enemy.
    #[must_use]
    pub const fn is_homing(self) -> bool {
        matches!(self, Self::Homing)
    }
}

/// Static combat parameters attached to a tower kind.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TowerStats {
    /// Targeting radius measured from the tower centre.
    pub range: f32,
    /// Health removed from each enemy struck by a bullet.
    pub damage: u32,
    /// Ticks between consecutive shots.
    pub fire_interval: u32,
    /// Money required to place the tower.
    pub cost: u32,
    /// Progress added to a bullet on each tick.
    pub bullet_delta: f32,
    /// Radius of the impact burst; zero for single-target bullets.
    pub blast_radius: f32,
}

/// Enemy species that can appear in a spawn schedule.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnemyKind {
    /// Baseline walker.
    Tiger,
    /// Fast and fragile.
    Wolf,
    /// Slow and sturdy; costs the player more when it leaks.
    Boar,
}

impl EnemyKind {
    /// Stat table entry for this species.
    #[must_use]
    pub const fn stats(self) -> EnemyStats {
        match self {
            Self::Tiger => EnemyStats {
                health: 6,
                speed: 1.0,
                leak_damage: 1,
                bounty: 10,
            },
            Self::Wolf => EnemyStats {
                health: 3,
                speed: 1.5,
                leak_damage: 1,
                bounty: 6,
            },
            Self::Boar => EnemyStats {
                health: 12,
                speed: 0.5,
                leak_damage: 2,
                bounty: 20,
            },
        }
    }
}

/// Static parameters attached to an enemy species.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EnemyStats {
    /// Health on spawn.
    pub health: u32,
    /// Distance covered per tick.
    pub speed: f32,
    /// Player health removed when the enemy reaches the end of its path.
    pub leak_damage: u32,
    /// Money credited to the player when the enemy is killed.
    pub bounty: u32,
}

/// Facing derived from an enemy's most recent velocity. Presentation only.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum Facing {
    /// Moving toward decreasing y.
    Up,
    /// Moving toward increasing y.
    #[default]
    Down,
    /// Moving toward decreasing x.
    Left,
    /// Moving toward increasing x.
    Right,
}

impl Facing {
    /// Derives a facing from a velocity vector, keeping `previous` when still.
    #[must_use]
    pub fn from_velocity(velocity: Vec2, previous: Facing) -> Self {
        if velocity == Vec2::ZERO {
            return previous;
        }
        if velocity.x.abs() >= velocity.y.abs() {
            if velocity.x > 0.0 {
                Self::Right
            } else {
                Self::Left
            }
        } else if velocity.y > 0.0 {
            Self::Down
        } else {
            Self::Up
        }
    }
}

/// Discrete, edge-triggered input signals polled once per tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Signal {
    /// Move the cursor or shop highlight up.
    Up,
    /// Move the cursor or shop highlight down.
    Down,
    /// Move the cursor or shop highlight left.
    Left,
    /// Move the cursor or shop highlight right.
    Right,
    /// Confirm the current selection.
    Confirm,
    /// Cancel the pending selection, or open/close the shop.
    Cancel,
}

impl Signal {
    const fn bit(self) -> u8 {
        match self {
            Self::Up => 1,
            Self::Down => 1 << 1,
            Self::Left => 1 << 2,
            Self::Right => 1 << 3,
            Self::Confirm => 1 << 4,
            Self::Cancel => 1 << 5,
        }
    }
}

/// Opaque input capability polled by the simulation.
pub trait InputSource {
    /// Reports whether `signal` was pressed on this frame.
    fn pressed(&self, signal: Signal) -> bool;
}

/// Set of signals pressed during a single frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct InputFrame {
    bits: u8,
}

impl InputFrame {
    /// Frame without any pressed signal.
    pub const EMPTY: InputFrame = InputFrame { bits: 0 };

    /// Returns a copy of the frame with `signal` pressed.
    #[must_use]
    pub const fn with(self, signal: Signal) -> Self {
        Self {
            bits: self.bits | signal.bit(),
        }
    }

    /// Creates a frame from a list of pressed signals.
    #[must_use]
    pub fn from_signals(signals: &[Signal]) -> Self {
        signals
            .iter()
            .fold(Self::EMPTY, |frame, signal| frame.with(*signal))
    }
}

impl InputSource for InputFrame {
    fn pressed(&self, signal: Signal) -> bool {
        self.bits & signal.bit() != 0
    }
}

/// Presentation viewport bound to a level when it starts.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Camera {
    /// World position of the viewport's upper-left corner.
    pub origin: Vec2,
    /// Viewport dimensions in world units.
    pub size: Vec2,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            origin: Vec2::ZERO,
            size: Vec2::new(240.0, 160.0),
        }
    }
}

/// Lifecycle of a single level.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LevelState {
    /// Freshly loaded or reset; nothing is simulated.
    Loading,
    /// Spawning and simulating.
    Active,
    /// Spawn schedule exhausted and no enemy remains.
    Won,
    /// The player died while the level was active.
    Lost,
}

/// Top-level game flow.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GameState {
    /// Launch screen waiting for the player to start.
    Menu,
    /// Simulating the level at the provided campaign index.
    Playing {
        /// Zero-based campaign index of the running level.
        level: usize,
    },
    /// The player ran out of health.
    GameOver,
    /// Every level of the campaign was won.
    Victory,
}

/// Reasons a tower placement request may be rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Error)]
pub enum PlacementError {
    /// Part of the footprint covers a cell that is not buildable.
    #[error("footprint covers a cell that is not buildable")]
    NotBuildable,
    /// The footprint overlaps an existing tower.
    #[error("footprint overlaps an existing tower")]
    Overlapping,
    /// The player cannot pay for the tower.
    #[error("insufficient funds")]
    InsufficientFunds,
    /// No tower selection is pending.
    #[error("no tower selected")]
    NoSelection,
    /// The level is not accepting towers.
    #[error("level is not active")]
    LevelInactive,
}

/// Reasons a money transaction may be rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Error)]
pub enum EconomyError {
    /// The requested amount exceeds the balance.
    #[error("cannot spend {required}, only {available} available")]
    InsufficientFunds {
        /// Amount requested.
        required: u32,
        /// Balance at the time of the request.
        available: u32,
    },
}

/// Fatal configuration problems detected while loading level data.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum ConfigError {
    /// A waypoint path has fewer than two points.
    #[error("path {path} has {points} point(s); at least 2 are required")]
    PathTooShort {
        /// Index of the offending path.
        path: usize,
        /// Number of points supplied.
        points: usize,
    },
    /// A waypoint lies outside the level grid or has a non-finite coordinate.
    #[error("point {point} of path {path} lies outside the grid")]
    WaypointOutOfBounds {
        /// Index of the offending path.
        path: usize,
        /// Index of the offending point inside the path.
        point: usize,
    },
    /// A spawn entry references a path that does not exist.
    #[error("spawn entry {entry} references missing path {path}")]
    UnknownPath {
        /// Index of the offending spawn entry.
        entry: usize,
        /// Path index it references.
        path: usize,
    },
    /// The grid cell list does not match the declared dimensions.
    #[error("grid declares {expected} cells but {actual} were supplied")]
    GridSizeMismatch {
        /// `columns * rows`.
        expected: usize,
        /// Number of cells supplied.
        actual: usize,
    },
    /// The grid has zero columns or rows.
    #[error("grid has no cells")]
    EmptyGrid,
    /// A grid cell uses an unknown tile code.
    #[error("grid cell {cell} uses unknown tile code {code}")]
    UnknownTile {
        /// Row-major index of the cell.
        cell: usize,
        /// Code found in the data.
        code: u8,
    },
    /// Cell size is zero, negative or not finite.
    #[error("grid cell size must be positive")]
    NonPositiveCellSize,
    /// The grid origin has a non-finite coordinate.
    #[error("grid origin must be finite")]
    NonFiniteOrigin,
    /// A level was requested beyond the end of the campaign.
    #[error("level {index} requested but the campaign has {count} level(s)")]
    LevelOutOfRange {
        /// Requested level index.
        index: usize,
        /// Number of levels in the campaign.
        count: usize,
    },
    /// The campaign contains no levels.
    #[error("campaign contains no levels")]
    EmptyCampaign,
}

/// Read-only snapshot of a live enemy taken after movement.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EnemySnapshot {
    /// Handle of the enemy.
    pub id: EnemyId,
    /// Spawn order; lower values were spawned earlier.
    pub spawn_seq: u64,
    /// Position after this tick's movement.
    pub position: Vec2,
    /// Remaining health.
    pub health: u32,
}

/// Borrowed, spawn-ordered view over the live enemies of a level.
#[derive(Clone, Copy, Debug)]
pub struct EnemyView<'a> {
    snapshots: &'a [EnemySnapshot],
}

impl<'a> EnemyView<'a> {
    /// Wraps snapshots that are already sorted by `spawn_seq`.
    #[must_use]
    pub fn new(snapshots: &'a [EnemySnapshot]) -> Self {
        debug_assert!(
            snapshots
                .windows(2)
                .all(|pair| pair[0].spawn_seq < pair[1].spawn_seq),
            "enemy snapshots must be sorted by spawn order"
        );
        Self { snapshots }
    }

    /// Iterator over the snapshots in spawn order.
    pub fn iter(&self) -> impl Iterator<Item = &'a EnemySnapshot> {
        self.snapshots.iter()
    }

    /// Looks up a live enemy by handle.
    #[must_use]
    pub fn get(&self, id: EnemyId) -> Option<&'a EnemySnapshot> {
        self.snapshots.iter().find(|snapshot| snapshot.id == id)
    }

    /// Reports whether the handle still refers to a live enemy.
    #[must_use]
    pub fn still_valid(&self, id: EnemyId) -> bool {
        self.get(id).is_some()
    }

    /// Number of live enemies.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Whether no enemy is alive.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }
}

/// Events broadcast by the simulation for presentation and logging.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// A level changed lifecycle state.
    LevelStateChanged {
        /// State the level entered.
        state: LevelState,
    },
    /// The game changed top-level state.
    GameStateChanged {
        /// State the game entered.
        state: GameState,
    },
    /// An enemy entered the level at the start of its path.
    EnemySpawned {
        /// Handle of the new enemy.
        enemy: EnemyId,
        /// Species of the new enemy.
        kind: EnemyKind,
        /// Spawn position.
        position: Vec2,
    },
    /// An enemy reached the end of its path and was removed.
    EnemyLeaked {
        /// Handle of the enemy that leaked.
        enemy: EnemyId,
        /// Player health removed by the leak.
        damage: u32,
    },
    /// An enemy's health reached zero and it was removed.
    EnemyKilled {
        /// Handle of the destroyed enemy.
        enemy: EnemyId,
        /// Money credited to the player.
        bounty: u32,
    },
    /// A tower was committed to the level.
    TowerPlaced {
        /// Handle of the new tower.
        tower: TowerId,
        /// Kind of tower placed.
        kind: TowerKind,
        /// Centre of the tower footprint.
        position: Vec2,
    },
    /// A placement attempt was rejected without mutating any state.
    TowerPlacementRejected {
        /// Kind of tower requested.
        kind: TowerKind,
        /// Requested footprint centre.
        position: Vec2,
        /// Reason for the rejection.
        reason: PlacementError,
    },
    /// A tower fired a bullet.
    BulletFired {
        /// Handle of the new bullet.
        bullet: BulletId,
        /// Tower that fired.
        tower: TowerId,
        /// Enemy engaged by the tower.
        target: EnemyId,
    },
    /// A bullet reached its destination.
    BulletHit {
        /// Handle of the bullet.
        bullet: BulletId,
        /// Impact position.
        position: Vec2,
    },
    /// A homing bullet lost its target and was discarded without damage.
    BulletDiscarded {
        /// Handle of the bullet.
        bullet: BulletId,
    },
    /// The player's balance changed.
    MoneyChanged {
        /// Balance after the change.
        money: u32,
    },
    /// The player lost health.
    PlayerDamaged {
        /// Health remaining after the hit.
        health: u32,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
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
        assert_round_trip(&PlacementError::Overlapping);
        assert_round_trip(&EconomyError::InsufficientFunds {
            required: 80,
            available: 20,
        });
    }

    #[test]
    fn tile_codes_are_stable() {
        for tile in [GridTileType::Blocked, GridTileType::Path, GridTileType::Buildable] {
            assert_eq!(GridTileType::from_code(tile.code()), Some(tile));
        }
        assert_eq!(GridTileType::from_code(7), None);
    }

    #[test]
    fn removed_enemy_handle_is_no_longer_valid() {
        let mut keys: slotmap::SlotMap<EnemyId, ()> = slotmap::SlotMap::with_key();
        let gone = keys.insert(());
        let _ = keys.remove(gone);
        let reused = keys.insert(());
        let snapshots = [EnemySnapshot {
            id: reused,
            spawn_seq: 0,
            position: Vec2::ZERO,
            health: 1,
        }];
        let view = EnemyView::new(&snapshots);

        assert!(view.still_valid(reused));
        assert!(!view.still_valid(gone), "a recycled slot must not revive the old handle");
    }

    #[test]
    fn touching_rectangles_do_not_overlap() {
        let left = Rect::from_center_size(Vec2::new(8.0, 8.0), Vec2::splat(TOWER_FOOTPRINT));
        let right = Rect::from_center_size(Vec2::new(24.0, 8.0), Vec2::splat(TOWER_FOOTPRINT));
        let shifted = Rect::from_center_size(Vec2::new(16.0, 8.0), Vec2::splat(TOWER_FOOTPRINT));

        assert!(!left.overlaps(&right));
        assert!(left.overlaps(&shifted));
        assert!(shifted.overlaps(&right));
    }

    #[test]
    fn facing_follows_dominant_axis() {
        assert_eq!(Facing::from_velocity(Vec2::new(1.0, 0.2), Facing::Up), Facing::Right);
        assert_eq!(Facing::from_velocity(Vec2::new(-0.1, -2.0), Facing::Right), Facing::Up);
        assert_eq!(Facing::from_velocity(Vec2::ZERO, Facing::Left), Facing::Left);
    }

    #[test]
    fn input_frame_reports_only_pressed_signals() {
        let frame = InputFrame::from_signals(&[Signal::Confirm, Signal::Left]);
        assert!(frame.pressed(Signal::Confirm));
        assert!(frame.pressed(Signal::Left));
        assert!(!frame.pressed(Signal::Cancel));
        assert!(!InputFrame::EMPTY.pressed(Signal::Up));
    }

    #[test]
    fn basic_tower_matches_documented_stats() {
        let stats = TowerKind::Basic.stats();
        assert_eq!(stats.cost, 80);
        assert_eq!(stats.fire_interval, 30);
        assert!((stats.range - 32.0).abs() < f32::EPSILON);
        assert!(TowerKind::Homing.is_homing());
        assert!(!TowerKind::Area.is_homing());
    }
}
