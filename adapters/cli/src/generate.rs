//! Seeded random level generator.

use anyhow::{bail, Context, Result};
use collie_defence_core::{EnemyKind, GridTileType};
use collie_defence_system_spawning::SpawnEntry;
use collie_defence_world::{carve_path, GridConfig, LevelConfig};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

const CELL_SIZE: f32 = 16.0;
const SPECIES: [EnemyKind; 3] = [EnemyKind::Tiger, EnemyKind::Wolf, EnemyKind::Boar];

/// Builds a level whose single path snakes from the left edge to the right
/// edge, turning at random columns. The same seed always yields the same level.
pub(crate) fn level(seed: u64, columns: u32, rows: u32) -> Result<LevelConfig> {
    if columns < 4 || rows < 3 {
        bail!("levels need at least 4 columns and 3 rows, got {columns}x{rows}");
    }

    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let centre = |cell: u32| (cell as f32 + 0.5) * CELL_SIZE;
    let last_column = columns - 1;

    let mut row = rng.gen_range(0..rows);
    let mut path = vec![[0.0, centre(row)]];
    let mut column = 0;
    loop {
        column = (column + rng.gen_range(2..=4)).min(last_column);
        if column == last_column {
            break;
        }
        path.push([centre(column), centre(row)]);

        let mut next_row = rng.gen_range(0..rows - 1);
        if next_row >= row {
            next_row += 1;
        }
        row = next_row;
        path.push([centre(column), centre(row)]);
    }
    path.push([columns as f32 * CELL_SIZE - 1.0, centre(row)]);

    let mut grid = GridConfig::filled(columns, rows, CELL_SIZE, GridTileType::Buildable);
    carve_path(&mut grid, &path);

    let count = rng.gen_range(6..=12);
    let mut tick = 0;
    let spawns = (0..count)
        .map(|_| {
            let entry = SpawnEntry {
                tick,
                enemy: SPECIES[rng.gen_range(0..SPECIES.len())],
                path: 0,
            };
            tick += rng.gen_range(30..=60);
            entry
        })
        .collect();

    let level = LevelConfig {
        name: format!("generated-{seed}"),
        paths: vec![path],
        grid,
        spawns,
    };
    let _ = level
        .build()
        .context("generated level failed validation")?;
    Ok(level)
}
