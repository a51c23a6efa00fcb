//! Towers: fixed emplacements that scan for enemies and fire on a cooldown.

use collie_defence_core::{
    EnemyId, EnemyView, Rect, TowerId, TowerKind, TowerStats, TOWER_FOOTPRINT,
};
use collie_defence_system_targeting::nearest_in_range;
use glam::Vec2;

/// Request produced by a tower that decided to shoot this tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FireOrder {
    /// Tower that fired.
    pub tower: TowerId,
    /// Kind of the firing tower; drives bullet behaviour.
    pub kind: TowerKind,
    /// Bullet origin (the tower centre).
    pub origin: Vec2,
    /// Enemy engaged.
    pub target: EnemyId,
    /// Position of the engaged enemy when the shot was taken.
    pub target_point: Vec2,
}

/// Tower placed in a level.
#[derive(Clone, Debug)]
pub struct Tower {
    id: TowerId,
    kind: TowerKind,
    position: Vec2,
    stats: TowerStats,
    cooldown: u32,
    target: Option<EnemyId>,
}

impl Tower {
    /// Creates a ready-to-fire tower centred on `position`.
    #[must_use]
    pub fn new(id: TowerId, kind: TowerKind, position: Vec2) -> Self {
        Self {
            id,
            kind,
            position,
            stats: kind.stats(),
            cooldown: 0,
            target: None,
        }
    }

    /// Footprint of a tower of any kind centred on `position`.
    #[must_use]
    pub fn footprint_at(position: Vec2) -> Rect {
        Rect::from_center_size(position, Vec2::splat(TOWER_FOOTPRINT))
    }

    /// Advances the cooldown and fires at the nearest enemy in range.
    ///
    /// A positive cooldown is decremented first; the tower then fires only
    /// when the cooldown is zero and an enemy lies within range. An idle tower
    /// holds at zero instead of banking shots.
    pub fn tick(&mut self, enemies: EnemyView<'_>) -> Option<FireOrder> {
        self.cooldown = self.cooldown.saturating_sub(1);

        self.target = self.target.filter(|&target| enemies.still_valid(target));
        if let Some(snapshot) = self.target.and_then(|target| enemies.get(target)) {
            let range = self.stats.range;
            if self.position.distance_squared(snapshot.position) > range * range {
                self.target = None;
            }
        }

        if self.cooldown > 0 {
            return None;
        }

        let Some(snapshot) = nearest_in_range(self.position, self.stats.range, enemies) else {
            self.target = None;
            return None;
        };

        self.target = Some(snapshot.id);
        self.cooldown = self.stats.fire_interval;

        Some(FireOrder {
            tower: self.id,
            kind: self.kind,
            origin: self.position,
            target: snapshot.id,
            target_point: snapshot.position,
        })
    }

    /// Targeting radius.
    #[must_use]
    pub const fn get_range(&self) -> f32 {
        self.stats.range
    }

    /// Money paid to place the tower.
    #[must_use]
    pub const fn get_cost(&self) -> u32 {
        self.stats.cost
    }

    /// Footprint used by placement overlap checks.
    #[must_use]
    pub fn get_hitbox(&self) -> Rect {
        Self::footprint_at(self.position)
    }

    /// Handle of this tower.
    #[must_use]
    pub const fn id(&self) -> TowerId {
        self.id
    }

    /// Kind of this tower.
    #[must_use]
    pub const fn kind(&self) -> TowerKind {
        self.kind
    }

    /// Centre of the footprint.
    #[must_use]
    pub const fn position(&self) -> Vec2 {
        self.position
    }

    /// Ticks left before the tower may fire again.
    #[must_use]
    pub const fn cooldown(&self) -> u32 {
        self.cooldown
    }

    /// Enemy currently engaged, revalidated every tick.
    #[must_use]
    pub const fn target(&self) -> Option<EnemyId> {
        self.target
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use collie_defence_core::EnemySnapshot;
    use slotmap::SlotMap;

    fn tower(kind: TowerKind) -> Tower {
        let mut keys: SlotMap<TowerId, ()> = SlotMap::with_key();
        Tower::new(keys.insert(()), kind, Vec2::ZERO)
    }

    #[test]
    fn fires_on_entry_then_every_fire_interval() {
        let mut keys: SlotMap<EnemyId, ()> = SlotMap::with_key();
        let enemy = keys.insert(());
        let mut tower = tower(TowerKind::Basic);
        assert!((tower.get_range() - 32.0).abs() < f32::EPSILON);

        let mut fired_on = Vec::new();
        for tick in 1..=75_u32 {
            let x = if tick < 10 { 100.0 } else { 20.0 };
            let snapshots = [EnemySnapshot {
                id: enemy,
                spawn_seq: 0,
                position: Vec2::new(x, 0.0),
                health: 5,
            }];
            if let Some(order) = tower.tick(EnemyView::new(&snapshots)) {
                assert_eq!(order.target, enemy);
                assert_eq!(order.target_point, Vec2::new(20.0, 0.0));
                fired_on.push(tick);
            }
        }

        assert_eq!(fired_on, vec![10, 40, 70]);
    }

    #[test]
    fn idle_tower_does_not_bank_shots() {
        let mut keys: SlotMap<EnemyId, ()> = SlotMap::with_key();
        let enemy = keys.insert(());
        let mut tower = tower(TowerKind::Basic);
        let empty: [EnemySnapshot; 0] = [];

        for _ in 0..200 {
            assert!(tower.tick(EnemyView::new(&empty)).is_none());
            assert_eq!(tower.cooldown(), 0);
        }

        let snapshots = [EnemySnapshot {
            id: enemy,
            spawn_seq: 0,
            position: Vec2::new(5.0, 5.0),
            health: 5,
        }];
        assert!(tower.tick(EnemyView::new(&snapshots)).is_some());
        assert!(
            tower.tick(EnemyView::new(&snapshots)).is_none(),
            "one shot per fire interval after an idle period"
        );
    }

    #[test]
    fn target_is_dropped_when_enemy_disappears() {
        let mut keys: SlotMap<EnemyId, ()> = SlotMap::with_key();
        let enemy = keys.insert(());
        let mut tower = tower(TowerKind::Homing);
        let snapshots = [EnemySnapshot {
            id: enemy,
            spawn_seq: 0,
            position: Vec2::new(10.0, 0.0),
            health: 5,
        }];

        let _ = tower.tick(EnemyView::new(&snapshots));
        assert_eq!(tower.target(), Some(enemy));

        let _ = tower.tick(EnemyView::new(&[]));
        assert_eq!(tower.target(), None);
    }

    #[test]
    fn target_is_dropped_when_enemy_leaves_range() {
        let mut keys: SlotMap<EnemyId, ()> = SlotMap::with_key();
        let enemy = keys.insert(());
        let mut tower = tower(TowerKind::Homing);
        let at = |x: f32| {
            [EnemySnapshot {
                id: enemy,
                spawn_seq: 0,
                position: Vec2::new(x, 0.0),
                health: 5,
            }]
        };

        let _ = tower.tick(EnemyView::new(&at(10.0)));
        assert_eq!(tower.target(), Some(enemy));

        let _ = tower.tick(EnemyView::new(&at(100.0)));
        assert_eq!(tower.target(), None);
    }

    #[test]
    fn hitbox_is_centred_on_position() {
        let tower = tower(TowerKind::Area);
        let hitbox = tower.get_hitbox();
        assert_eq!(hitbox.min(), Vec2::splat(-8.0));
        assert_eq!(hitbox.max(), Vec2::splat(8.0));
        assert_eq!(tower.get_cost(), TowerKind::Area.stats().cost);
    }
}
