//! Level state machine owning the grid, entity sets and spawn timeline.

use std::rc::Rc;

use collie_defence_core::{
    BulletId, Camera, ConfigError, EnemyId, EnemySnapshot, EnemyView, Event, GridTileType,
    LevelState, PlacementError, Tick, TowerId, TowerKind, TICK_DT,
};
use collie_defence_system_spawning::{SpawnEntry, SpawnSchedule, Spawning};
use collie_defence_system_targeting::enemies_within;
use glam::Vec2;
use slotmap::SlotMap;
use tracing::{debug, info, trace};

use crate::{
    bullet::{Bullet, BulletStatus, Impact},
    enemy::Enemy,
    grid::Grid,
    path::WaypointPath,
    player::Player,
    tower::{FireOrder, Tower},
};

/// Validated, immutable description of a level.
#[derive(Clone, Debug)]
pub struct LevelBlueprint {
    name: String,
    grid: Grid,
    paths: Vec<Rc<WaypointPath>>,
    schedule: SpawnSchedule,
}

impl LevelBlueprint {
    /// Validates that every waypoint is finite and lies on the grid, and that
    /// every spawn references an existing path.
    pub fn new(
        name: impl Into<String>,
        grid: Grid,
        paths: Vec<WaypointPath>,
        spawns: Vec<SpawnEntry>,
    ) -> Result<Self, ConfigError> {
        let bounds = grid.bounds();
        for (path_index, path) in paths.iter().enumerate() {
            let outside = path.points().iter().position(|point| {
                !point.is_finite()
                    || point.x < bounds.min().x
                    || point.y < bounds.min().y
                    || point.x > bounds.max().x
                    || point.y > bounds.max().y
            });
            if let Some(point) = outside {
                return Err(ConfigError::WaypointOutOfBounds {
                    path: path_index,
                    point,
                });
            }
        }

        if let Some((entry, spawn)) = spawns
            .iter()
            .enumerate()
            .find(|(_, spawn)| spawn.path >= paths.len())
        {
            return Err(ConfigError::UnknownPath {
                entry,
                path: spawn.path,
            });
        }

        Ok(Self {
            name: name.into(),
            grid,
            paths: paths.into_iter().map(Rc::new).collect(),
            schedule: SpawnSchedule::new(spawns),
        })
    }

    /// Display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Tile classification.
    #[must_use]
    pub const fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Shared waypoint paths.
    #[must_use]
    pub fn paths(&self) -> &[Rc<WaypointPath>] {
        &self.paths
    }

    /// Wave timeline.
    #[must_use]
    pub const fn schedule(&self) -> &SpawnSchedule {
        &self.schedule
    }
}

/// Runtime level: live enemies, towers and bullets advanced once per tick.
#[derive(Debug)]
pub struct Level {
    blueprint: LevelBlueprint,
    state: LevelState,
    tick: Tick,
    camera: Option<Camera>,
    spawning: Spawning,
    next_spawn_seq: u64,
    enemies: SlotMap<EnemyId, Enemy>,
    towers: SlotMap<TowerId, Tower>,
    bullets: SlotMap<BulletId, Bullet>,
    scratch: Scratch,
}

/// Buffers reused across ticks.
#[derive(Debug, Default)]
struct Scratch {
    due: Vec<SpawnEntry>,
    snapshots: Vec<EnemySnapshot>,
    fire_orders: Vec<FireOrder>,
    impacts: Vec<Impact>,
    blast: Vec<EnemyId>,
    leaked: Vec<EnemyId>,
    killed: Vec<EnemyId>,
    finished: Vec<BulletId>,
}

impl Level {
    /// Creates a level in the [`LevelState::Loading`] state.
    #[must_use]
    pub fn new(blueprint: LevelBlueprint) -> Self {
        Self {
            blueprint,
            state: LevelState::Loading,
            tick: 0,
            camera: None,
            spawning: Spawning::new(),
            next_spawn_seq: 0,
            enemies: SlotMap::with_key(),
            towers: SlotMap::with_key(),
            bullets: SlotMap::with_key(),
            scratch: Scratch::default(),
        }
    }

    /// Binds the presentation camera and starts the spawn timeline from tick 0.
    ///
    /// A level that already ran is reset first.
    pub fn init(&mut self, camera: Camera, out: &mut Vec<Event>) {
        if self.state != LevelState::Loading {
            self.reset();
        }

        self.camera = Some(camera);
        self.state = LevelState::Active;
        info!(level = %self.blueprint.name, "level started");
        out.push(Event::LevelStateChanged {
            state: LevelState::Active,
        });
    }

    /// Clears every entity and rewinds the spawn timeline. The grid and paths
    /// are preserved.
    pub fn reset(&mut self) {
        self.state = LevelState::Loading;
        self.tick = 0;
        self.spawning.reset();
        self.next_spawn_seq = 0;
        self.enemies.clear();
        self.towers.clear();
        self.bullets.clear();
        info!(level = %self.blueprint.name, "level reset");
    }

    /// Marks an active level as lost.
    pub fn fail(&mut self, out: &mut Vec<Event>) {
        if self.state != LevelState::Active {
            return;
        }

        self.state = LevelState::Lost;
        info!(level = %self.blueprint.name, tick = self.tick, "level lost");
        out.push(Event::LevelStateChanged {
            state: LevelState::Lost,
        });
    }

    /// Advances the level by one tick.
    ///
    /// Every component reads the state left by the previous phase; removals
    /// and insertions are deferred to the final apply phase. Leaks damage
    /// `player` and kills credit their bounty.
    pub fn tick(&mut self, player: &mut Player, out: &mut Vec<Event>) {
        if self.state != LevelState::Active {
            return;
        }

        self.spawn_due(out);

        let scratch = &mut self.scratch;
        scratch.leaked.clear();
        for (id, enemy) in &mut self.enemies {
            enemy.advance(TICK_DT);
            if enemy.reached_end() {
                scratch.leaked.push(id);
            }
        }

        scratch.snapshots.clear();
        scratch.snapshots.extend(
            self.enemies
                .values()
                .filter(|enemy| enemy.is_alive())
                .map(Enemy::snapshot),
        );
        scratch.snapshots.sort_unstable_by_key(|snapshot| snapshot.spawn_seq);
        let view = EnemyView::new(&scratch.snapshots);

        scratch.fire_orders.clear();
        scratch
            .fire_orders
            .extend(self.towers.values_mut().filter_map(|tower| tower.tick(view)));

        scratch.impacts.clear();
        scratch.finished.clear();
        for (id, bullet) in &mut self.bullets {
            bullet.advance(TICK_DT, view);
            match bullet.status() {
                BulletStatus::InFlight => continue,
                BulletStatus::Arrived => {
                    scratch.impacts.extend(bullet.impact());
                    out.push(Event::BulletHit {
                        bullet: id,
                        position: bullet.position(),
                    });
                }
                BulletStatus::Discarded => {
                    trace!(?id, "homing bullet lost its target");
                    out.push(Event::BulletDiscarded { bullet: id });
                }
            }
            scratch.finished.push(id);
        }

        scratch.killed.clear();
        for impact in &scratch.impacts {
            match *impact {
                Impact::Single { enemy, damage } => {
                    if let Some(target) = self.enemies.get_mut(enemy) {
                        if target.apply_damage(damage) {
                            scratch.killed.push(enemy);
                        }
                    }
                }
                Impact::Blast {
                    center,
                    radius,
                    damage,
                } => {
                    enemies_within(center, radius, view, &mut scratch.blast);
                    for &enemy in &scratch.blast {
                        if let Some(target) = self.enemies.get_mut(enemy) {
                            if target.apply_damage(damage) {
                                scratch.killed.push(enemy);
                            }
                        }
                    }
                }
            }
        }

        self.apply(player, out);
        self.tick += 1;

        if self.spawning.is_exhausted(&self.blueprint.schedule) && self.enemies.is_empty() {
            self.state = LevelState::Won;
            info!(level = %self.blueprint.name, tick = self.tick, "level won");
            out.push(Event::LevelStateChanged {
                state: LevelState::Won,
            });
        }
    }

    fn spawn_due(&mut self, out: &mut Vec<Event>) {
        self.spawning
            .handle(&self.blueprint.schedule, self.tick, &mut self.scratch.due);

        for entry in &self.scratch.due {
            let Some(path) = self.blueprint.paths.get(entry.path) else {
                continue;
            };
            let spawn_seq = self.next_spawn_seq;
            self.next_spawn_seq += 1;

            let id = self
                .enemies
                .insert_with_key(|id| Enemy::spawn(id, entry.enemy, spawn_seq, Rc::clone(path)));
            trace!(?id, kind = ?entry.enemy, spawn_seq, "enemy spawned");
            out.push(Event::EnemySpawned {
                enemy: id,
                kind: entry.enemy,
                position: path.start(),
            });
        }
    }

    fn apply(&mut self, player: &mut Player, out: &mut Vec<Event>) {
        for &id in &self.scratch.leaked {
            let Some(enemy) = self.enemies.remove(id) else {
                continue;
            };
            let damage = enemy.kind().stats().leak_damage;
            player.take_damage(damage);
            debug!(?id, damage, health = player.health(), "enemy leaked");
            out.push(Event::EnemyLeaked { enemy: id, damage });
            out.push(Event::PlayerDamaged {
                health: player.health(),
            });
        }

        for &id in &self.scratch.killed {
            let Some(enemy) = self.enemies.remove(id) else {
                continue;
            };
            let bounty = enemy.kind().stats().bounty;
            player.earn(bounty);
            debug!(?id, bounty, "enemy killed");
            out.push(Event::EnemyKilled { enemy: id, bounty });
            out.push(Event::MoneyChanged {
                money: player.get_money(),
            });
        }

        for &id in &self.scratch.finished {
            let _ = self.bullets.remove(id);
        }

        for order in &self.scratch.fire_orders {
            let bullet = self
                .bullets
                .insert_with_key(|id| Bullet::from_order(id, order));
            out.push(Event::BulletFired {
                bullet,
                tower: order.tower,
                target: order.target,
            });
        }
    }

    /// Checks whether a tower footprint centred on `position` may be placed.
    pub fn check_placement(&self, position: Vec2) -> Result<(), PlacementError> {
        if self.state != LevelState::Active {
            return Err(PlacementError::LevelInactive);
        }

        let footprint = Tower::footprint_at(position);
        if !self.blueprint.grid.is_region_buildable(&footprint) {
            return Err(PlacementError::NotBuildable);
        }
        if self
            .towers
            .values()
            .any(|tower| tower.get_hitbox().overlaps(&footprint))
        {
            return Err(PlacementError::Overlapping);
        }
        Ok(())
    }

    /// Commits a tower after an authoritative placement recheck.
    ///
    /// A rejected placement leaves the tower set untouched.
    pub fn add_tower(
        &mut self,
        kind: TowerKind,
        position: Vec2,
        out: &mut Vec<Event>,
    ) -> Result<TowerId, PlacementError> {
        if let Err(reason) = self.check_placement(position) {
            debug!(?kind, %position, %reason, "tower placement rejected");
            out.push(Event::TowerPlacementRejected {
                kind,
                position,
                reason,
            });
            return Err(reason);
        }

        let id = self
            .towers
            .insert_with_key(|id| Tower::new(id, kind, position));
        debug!(?id, ?kind, %position, "tower placed");
        out.push(Event::TowerPlaced {
            tower: id,
            kind,
            position,
        });
        Ok(id)
    }

    /// Classifies the grid cell containing world point (`x`, `y`).
    #[must_use]
    pub fn get_map_cell(&self, x: f32, y: f32) -> GridTileType {
        self.blueprint.grid.classify(Vec2::new(x, y))
    }

    /// Placed towers.
    pub fn get_towers(&self) -> impl Iterator<Item = &Tower> + '_ {
        self.towers.values()
    }

    /// Looks up a tower by handle.
    #[must_use]
    pub fn tower(&self, id: TowerId) -> Option<&Tower> {
        self.towers.get(id)
    }

    /// Live enemies.
    pub fn enemies(&self) -> impl Iterator<Item = &Enemy> + '_ {
        self.enemies.values()
    }

    /// Looks up an enemy by handle.
    #[must_use]
    pub fn enemy(&self, id: EnemyId) -> Option<&Enemy> {
        self.enemies.get(id)
    }

    /// Bullets in flight.
    pub fn bullets(&self) -> impl Iterator<Item = &Bullet> + '_ {
        self.bullets.values()
    }

    /// Looks up a bullet by handle.
    #[must_use]
    pub fn bullet(&self, id: BulletId) -> Option<&Bullet> {
        self.bullets.get(id)
    }

    /// Number of live enemies.
    #[must_use]
    pub fn enemy_count(&self) -> usize {
        self.enemies.len()
    }

    /// Spawns still waiting in the timeline.
    #[must_use]
    pub fn remaining_spawns(&self) -> usize {
        self.spawning.remaining(&self.blueprint.schedule)
    }

    /// Current lifecycle state.
    #[must_use]
    pub const fn state(&self) -> LevelState {
        self.state
    }

    /// Whether the level has been won.
    #[must_use]
    pub fn is_won(&self) -> bool {
        self.state == LevelState::Won
    }

    /// Ticks simulated since the level started.
    #[must_use]
    pub const fn current_tick(&self) -> Tick {
        self.tick
    }

    /// Camera bound by [`Level::init`].
    #[must_use]
    pub const fn camera(&self) -> Option<Camera> {
        self.camera
    }

    /// Tile classification.
    #[must_use]
    pub const fn grid(&self) -> &Grid {
        &self.blueprint.grid
    }

    /// Display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.blueprint.name
    }

    /// Immutable level description.
    #[must_use]
    pub const fn blueprint(&self) -> &LevelBlueprint {
        &self.blueprint
    }
}
