//! Enemies walking a shared waypoint path.

use std::rc::Rc;

use collie_defence_core::{EnemyId, EnemyKind, EnemySnapshot, Facing};
use glam::Vec2;

use crate::path::WaypointPath;

/// Tolerance used when deciding whether an enemy stands on a waypoint.
const ARRIVAL_EPSILON: f32 = 1e-4;

/// Lifecycle of an enemy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EnemyStatus {
    /// Walking its path.
    Walking,
    /// Completed its path; the level treats this as a leak.
    ReachedEnd,
    /// Health reached zero.
    Dead,
}

/// Enemy following a waypoint path.
#[derive(Clone, Debug)]
pub struct Enemy {
    id: EnemyId,
    kind: EnemyKind,
    spawn_seq: u64,
    path: Rc<WaypointPath>,
    step_index: usize,
    position: Vec2,
    velocity: Vec2,
    facing: Facing,
    speed: f32,
    health: u32,
    status: EnemyStatus,
}

impl Enemy {
    /// Spawns an enemy of `kind` on the first waypoint of `path`.
    #[must_use]
    pub fn spawn(id: EnemyId, kind: EnemyKind, spawn_seq: u64, path: Rc<WaypointPath>) -> Self {
        let stats = kind.stats();
        let position = path.start();
        let facing = path
            .point(1)
            .map_or(Facing::default(), |next| {
                Facing::from_velocity(next - position, Facing::default())
            });
        Self {
            id,
            kind,
            spawn_seq,
            path,
            step_index: 0,
            position,
            velocity: Vec2::ZERO,
            facing,
            speed: stats.speed,
            health: stats.health,
            status: EnemyStatus::Walking,
        }
    }

    /// Moves toward the current waypoint by `speed * dt`.
    ///
    /// An enemy within one step of the waypoint snaps onto it and retargets
    /// the next one; leftover movement is discarded. Once the last waypoint
    /// is reached the enemy is marked [`EnemyStatus::ReachedEnd`].
    pub fn advance(&mut self, dt: f32) {
        if self.status != EnemyStatus::Walking {
            return;
        }

        let Some(waypoint) = self.path.point(self.step_index + 1) else {
            self.status = EnemyStatus::ReachedEnd;
            return;
        };

        let step = self.speed * dt;
        let delta = waypoint - self.position;
        let distance = delta.length();

        if distance <= step + ARRIVAL_EPSILON {
            self.velocity = delta;
            self.position = waypoint;
            self.step_index = (self.step_index + 1).min(self.path.final_step());
            if self.step_index == self.path.final_step() {
                self.status = EnemyStatus::ReachedEnd;
            }
        } else {
            self.velocity = delta / distance * step;
            self.position += self.velocity;
        }

        self.facing = Facing::from_velocity(self.velocity, self.facing);
    }

    /// Removes `amount` health. Returns `true` if this call killed the enemy.
    pub fn apply_damage(&mut self, amount: u32) -> bool {
        if self.status != EnemyStatus::Walking {
            return false;
        }

        self.health = self.health.saturating_sub(amount);
        if self.health == 0 {
            self.status = EnemyStatus::Dead;
            return true;
        }
        false
    }

    /// Whether the enemy is still walking its path with health left.
    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.status == EnemyStatus::Walking
    }

    /// Whether the enemy completed its path.
    #[must_use]
    pub fn reached_end(&self) -> bool {
        self.status == EnemyStatus::ReachedEnd
    }

    /// Captures the state consumed by targeting and bullets.
    #[must_use]
    pub fn snapshot(&self) -> EnemySnapshot {
        EnemySnapshot {
            id: self.id,
            spawn_seq: self.spawn_seq,
            position: self.position,
            health: self.health,
        }
    }

    /// Handle of this enemy.
    #[must_use]
    pub const fn id(&self) -> EnemyId {
        self.id
    }

    /// Species of this enemy.
    #[must_use]
    pub const fn kind(&self) -> EnemyKind {
        self.kind
    }

    /// Spawn order within the level.
    #[must_use]
    pub const fn spawn_seq(&self) -> u64 {
        self.spawn_seq
    }

    /// Current position.
    #[must_use]
    pub const fn position(&self) -> Vec2 {
        self.position
    }

    /// Displacement applied on the last tick.
    #[must_use]
    pub const fn velocity(&self) -> Vec2 {
        self.velocity
    }

    /// Presentation facing derived from velocity.
    #[must_use]
    pub const fn facing(&self) -> Facing {
        self.facing
    }

    /// Number of path legs completed.
    #[must_use]
    pub const fn step_index(&self) -> usize {
        self.step_index
    }

    /// Remaining health.
    #[must_use]
    pub const fn health(&self) -> u32 {
        self.health
    }

    /// Current lifecycle state.
    #[must_use]
    pub const fn status(&self) -> EnemyStatus {
        self.status
    }

    /// Shared path this enemy follows.
    #[must_use]
    pub fn path(&self) -> &WaypointPath {
        &self.path
    }
}
