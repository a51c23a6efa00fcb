//! Serde-facing level and campaign data plus validation into runtime types.

use collie_defence_core::{ConfigError, EnemyKind, GridTileType, Tick};
use collie_defence_system_spawning::SpawnEntry;
use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::{
    grid::Grid,
    level::LevelBlueprint,
    path::WaypointPath,
    player::{Income, PlayerSettings},
};

/// Grid section of a level file.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GridConfig {
    /// Number of columns.
    pub columns: u32,
    /// Number of rows.
    pub rows: u32,
    /// Side length of a cell in world units.
    pub cell_size: f32,
    /// World position of the upper-left corner.
    #[serde(default)]
    pub origin: [f32; 2],
    /// Row-major tile codes: 0 blocked, 1 path, 2 buildable.
    pub cells: Vec<u8>,
}

impl GridConfig {
    /// Creates a grid of `columns` by `rows` cells that are all `tile`.
    #[must_use]
    pub fn filled(columns: u32, rows: u32, cell_size: f32, tile: GridTileType) -> Self {
        Self {
            columns,
            rows,
            cell_size,
            origin: [0.0, 0.0],
            cells: vec![tile.code(); columns as usize * rows as usize],
        }
    }

    /// Decodes the tile codes into a [`Grid`].
    pub fn build(&self) -> Result<Grid, ConfigError> {
        let cells = self
            .cells
            .iter()
            .enumerate()
            .map(|(cell, &code)| {
                GridTileType::from_code(code).ok_or(ConfigError::UnknownTile { cell, code })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Grid::new(
            self.columns,
            self.rows,
            self.cell_size,
            Vec2::from(self.origin),
            cells,
        )
    }
}

/// Marks every cell crossed by the polyline `points` as path.
///
/// Cells outside the grid are ignored.
pub fn carve_path(grid: &mut GridConfig, points: &[[f32; 2]]) {
    if grid.cell_size <= 0.0 {
        return;
    }

    let origin = Vec2::from(grid.origin);
    let sample = grid.cell_size * 0.25;
    for leg in points.windows(2) {
        let (from, to) = (Vec2::from(leg[0]), Vec2::from(leg[1]));
        let samples = ((from.distance(to) / sample).ceil() as usize).max(1);

        for step in 0..=samples {
            let point = from.lerp(to, step as f32 / samples as f32);
            let local = (point - origin) / grid.cell_size;
            if local.x < 0.0 || local.y < 0.0 {
                continue;
            }
            let (column, row) = (local.x.floor() as u32, local.y.floor() as u32);
            if column >= grid.columns || row >= grid.rows {
                continue;
            }
            let index = row as usize * grid.columns as usize + column as usize;
            if let Some(cell) = grid.cells.get_mut(index) {
                *cell = GridTileType::Path.code();
            }
        }
    }
}

/// One level of a campaign file.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LevelConfig {
    /// Display name.
    pub name: String,
    /// Waypoint paths as lists of `[x, y]` points.
    pub paths: Vec<Vec<[f32; 2]>>,
    /// Tile layout.
    pub grid: GridConfig,
    /// Wave timeline.
    #[serde(default)]
    pub spawns: Vec<SpawnEntry>,
}

impl LevelConfig {
    /// Validates the level data.
    pub fn build(&self) -> Result<LevelBlueprint, ConfigError> {
        let grid = self.grid.build()?;
        let paths = self
            .paths
            .iter()
            .enumerate()
            .map(|(index, points)| {
                WaypointPath::new(index, points.iter().copied().map(Vec2::from).collect())
            })
            .collect::<Result<Vec<_>, _>>()?;

        LevelBlueprint::new(self.name.clone(), grid, paths, self.spawns.clone())
    }
}

/// Campaign file: starting resources and the ordered level list.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CampaignConfig {
    /// Money available when a run starts.
    pub starting_money: u32,
    /// Health available when a run starts.
    pub starting_health: u32,
    /// Optional passive income.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub income: Option<Income>,
    /// Levels played in order.
    pub levels: Vec<LevelConfig>,
}

/// Validated campaign.
#[derive(Clone, Debug)]
pub struct Campaign {
    /// Resources handed to every new player.
    pub player: PlayerSettings,
    /// Levels in play order.
    pub levels: Vec<LevelBlueprint>,
}

impl CampaignConfig {
    /// Validates every level, failing on the first configuration error.
    pub fn build(&self) -> Result<Campaign, ConfigError> {
        if self.levels.is_empty() {
            return Err(ConfigError::EmptyCampaign);
        }

        let levels = self
            .levels
            .iter()
            .map(LevelConfig::build)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Campaign {
            player: PlayerSettings {
                starting_money: self.starting_money,
                starting_health: self.starting_health,
                income: self.income,
            },
            levels,
        })
    }

    /// Two-level campaign used when no campaign file is supplied.
    #[must_use]
    pub fn builtin() -> Self {
        Self {
            starting_money: 200,
            starting_health: 10,
            income: Some(Income {
                amount: 5,
                interval: 120,
            }),
            levels: vec![meadow(), ridge()],
        }
    }
}

fn wave(start: Tick, spacing: Tick, count: u64, enemy: EnemyKind, path: usize) -> Vec<SpawnEntry> {
    (0..count)
        .map(|index| SpawnEntry {
            tick: start + index * spacing,
            enemy,
            path,
        })
        .collect()
}

fn level(name: &str, paths: Vec<Vec<[f32; 2]>>, spawns: Vec<SpawnEntry>) -> LevelConfig {
    let mut grid = GridConfig::filled(15, 10, 16.0, GridTileType::Buildable);
    for path in &paths {
        carve_path(&mut grid, path);
    }
    LevelConfig {
        name: name.to_owned(),
        paths,
        grid,
        spawns,
    }
}

fn meadow() -> LevelConfig {
    let path = vec![[0.0, 72.0], [120.0, 72.0], [120.0, 120.0], [239.0, 120.0]];
    let mut spawns = wave(0, 40, 5, EnemyKind::Tiger, 0);
    spawns.extend(wave(300, 30, 3, EnemyKind::Wolf, 0));
    level("meadow", vec![path], spawns)
}

fn ridge() -> LevelConfig {
    let north = vec![[0.0, 24.0], [200.0, 24.0], [200.0, 136.0], [239.0, 136.0]];
    let south = vec![[0.0, 136.0], [88.0, 136.0], [88.0, 72.0], [200.0, 72.0]];
    let mut spawns = wave(0, 45, 6, EnemyKind::Tiger, 0);
    spawns.extend(wave(120, 60, 3, EnemyKind::Boar, 1));
    spawns.extend(wave(400, 20, 6, EnemyKind::Wolf, 1));
    level("ridge", vec![north, south], spawns)
}
