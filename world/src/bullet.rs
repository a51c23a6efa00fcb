//! Bullets travelling from a tower toward a captured target.

use collie_defence_core::{BulletId, EnemyId, EnemyView, TowerId, TowerKind};
use glam::Vec2;

use crate::tower::FireOrder;

/// What a bullet is aimed at.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum BulletTarget {
    /// Snapshot of the enemy position when the shot was taken.
    Point {
        /// Destination of the bullet.
        point: Vec2,
        /// Enemy engaged when firing; struck on arrival if still alive.
        enemy: EnemyId,
    },
    /// Live enemy re-read every tick.
    Tracking(EnemyId),
}

/// Lifecycle of a bullet.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BulletStatus {
    /// Still travelling.
    InFlight,
    /// Progress reached one; the impact is pending resolution.
    Arrived,
    /// The tracked enemy vanished; the bullet deals no damage.
    Discarded,
}

/// Damage to apply once a bullet arrives.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Impact {
    /// Damage a single enemy if it is still alive.
    Single {
        /// Enemy struck.
        enemy: EnemyId,
        /// Health removed.
        damage: u32,
    },
    /// Damage every live enemy within `radius` of `center`.
    Blast {
        /// Impact point.
        center: Vec2,
        /// Burst radius.
        radius: f32,
        /// Health removed from each enemy caught in the burst.
        damage: u32,
    },
}

/// Projectile owned by a level.
#[derive(Clone, Debug)]
pub struct Bullet {
    id: BulletId,
    tower: TowerId,
    kind: TowerKind,
    origin: Vec2,
    position: Vec2,
    target: BulletTarget,
    progress: f32,
    delta: f32,
    damage: u32,
    blast_radius: f32,
    status: BulletStatus,
}

impl Bullet {
    /// Creates the bullet described by a tower's fire order.
    #[must_use]
    pub fn from_order(id: BulletId, order: &FireOrder) -> Self {
        let stats = order.kind.stats();
        let target = if order.kind.is_homing() {
            BulletTarget::Tracking(order.target)
        } else {
            BulletTarget::Point {
                point: order.target_point,
                enemy: order.target,
            }
        };

        Self {
            id,
            tower: order.tower,
            kind: order.kind,
            origin: order.origin,
            position: order.origin,
            target,
            progress: 0.0,
            delta: stats.bullet_delta,
            damage: stats.damage,
            blast_radius: stats.blast_radius,
            status: BulletStatus::InFlight,
        }
    }

    /// Advances progress by one tick's worth and recomputes the position.
    ///
    /// A tracking bullet whose enemy no longer appears in `enemies` is
    /// discarded on the spot without touching progress.
    pub fn advance(&mut self, dt: f32, enemies: EnemyView<'_>) {
        if self.status != BulletStatus::InFlight {
            return;
        }

        let destination = match self.target {
            BulletTarget::Point { point, .. } => point,
            BulletTarget::Tracking(enemy) if !enemies.still_valid(enemy) => {
                self.status = BulletStatus::Discarded;
                return;
            }
            BulletTarget::Tracking(enemy) => enemies
                .get(enemy)
                .map_or(self.position, |snapshot| snapshot.position),
        };

        self.progress = (self.progress + self.delta * dt).clamp(self.progress, 1.0);
        self.position = self.origin.lerp(destination, self.progress);
        if self.progress >= 1.0 {
            self.position = destination;
            self.status = BulletStatus::Arrived;
        }
    }

    /// Damage to resolve, available once the bullet has arrived.
    #[must_use]
    pub fn impact(&self) -> Option<Impact> {
        if self.status != BulletStatus::Arrived {
            return None;
        }

        let impact = match self.target {
            BulletTarget::Point { point, .. } if self.blast_radius > 0.0 => Impact::Blast {
                center: point,
                radius: self.blast_radius,
                damage: self.damage,
            },
            BulletTarget::Point { enemy, .. } | BulletTarget::Tracking(enemy) => Impact::Single {
                enemy,
                damage: self.damage,
            },
        };
        Some(impact)
    }

    /// Whether the bullet should be pruned at the end of the tick.
    #[must_use]
    pub fn to_be_destroyed(&self) -> bool {
        self.status != BulletStatus::InFlight
    }

    /// Handle of this bullet.
    #[must_use]
    pub const fn id(&self) -> BulletId {
        self.id
    }

    /// Tower that fired this bullet.
    #[must_use]
    pub const fn tower(&self) -> TowerId {
        self.tower
    }

    /// Kind of the firing tower.
    #[must_use]
    pub const fn kind(&self) -> TowerKind {
        self.kind
    }

    /// Current position.
    #[must_use]
    pub const fn position(&self) -> Vec2 {
        self.position
    }

    /// Fraction of the flight completed, in `[0, 1]`.
    #[must_use]
    pub const fn progress(&self) -> f32 {
        self.progress
    }

    /// Captured target.
    #[must_use]
    pub const fn target(&self) -> BulletTarget {
        self.target
    }

    /// Current lifecycle state.
    #[must_use]
    pub const fn status(&self) -> BulletStatus {
        self.status
    }
}
